/* src/client/core/rust/src/guard.rs */

//! Commit guards: the check every asynchronous continuation performs before
//! writing to the view.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic counter shared by one owner (a page controller) and the
/// generations it hands out.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter(Arc<AtomicU64>);

impl GenerationCounter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start a new generation, superseding every previously issued one.
  pub fn advance(&self) -> Generation {
    let captured = self.0.fetch_add(1, Ordering::SeqCst) + 1;
    Generation { counter: self.0.clone(), captured }
  }

  /// Supersede all outstanding generations without issuing a new one.
  pub fn invalidate(&self) {
    self.0.fetch_add(1, Ordering::SeqCst);
  }

  pub fn current(&self) -> u64 {
    self.0.load(Ordering::SeqCst)
  }
}

/// A captured value of a `GenerationCounter`.
#[derive(Debug, Clone)]
pub struct Generation {
  counter: Arc<AtomicU64>,
  captured: u64,
}

impl Generation {
  pub fn value(&self) -> u64 {
    self.captured
  }

  pub fn is_current(&self) -> bool {
    self.counter.load(Ordering::SeqCst) == self.captured
  }
}

/// Cancellation token plus an optional generation.
///
/// The token aborts network work; the generation discards results of
/// superseded requests that were not aborted in time. A write is allowed only
/// while both are current.
#[derive(Debug, Clone)]
pub struct CommitGuard {
  cancel: CancellationToken,
  generation: Option<Generation>,
}

impl CommitGuard {
  pub fn new(cancel: CancellationToken) -> Self {
    Self { cancel, generation: None }
  }

  /// A guard that never expires, for content hydrated outside any navigation.
  pub fn detached() -> Self {
    Self::new(CancellationToken::new())
  }

  pub fn with_generation(mut self, generation: Generation) -> Self {
    self.generation = Some(generation);
    self
  }

  pub fn cancel_token(&self) -> &CancellationToken {
    &self.cancel
  }

  pub fn is_current(&self) -> bool {
    !self.cancel.is_cancelled() && self.generation.as_ref().is_none_or(Generation::is_current)
  }
}
