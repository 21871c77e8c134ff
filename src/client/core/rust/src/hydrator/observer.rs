/* src/client/core/rust/src/hydrator/observer.rs */

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Hydrator;
use crate::guard::CommitGuard;
use crate::surface::Scope;

/// Hydrates placeholders as soon as they are injected into the surface,
/// whoever injected them. Stops when dropped.
pub struct AutoHydrator {
  cancel: CancellationToken,
  task: JoinHandle<()>,
}

impl AutoHydrator {
  pub fn spawn(hydrator: Arc<Hydrator>) -> Self {
    let mut inserted = hydrator.surface().subscribe();
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let task = tokio::spawn(async move {
      loop {
        let ids = tokio::select! {
          _ = token.cancelled() => break,
          next = inserted.recv() => match next {
            Some(ids) => ids,
            None => break,
          },
        };
        debug!(sections = ids.len(), "placeholders injected");
        let hydrator = hydrator.clone();
        let guard = CommitGuard::new(token.child_token());
        tokio::spawn(async move {
          hydrator.hydrate_all(&Scope::Slots(ids), &guard).await;
        });
      }
    });
    Self { cancel, task }
  }

  pub fn stop(&self) {
    self.cancel.cancel();
  }

  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }
}

impl Drop for AutoHydrator {
  fn drop(&mut self) {
    self.cancel.cancel();
  }
}
