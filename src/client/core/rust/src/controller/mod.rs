/* src/client/core/rust/src/controller/mod.rs */

//! Per-route lifecycle hooks for pages that need more than generic hydration.

mod category;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::errors::ControllerError;
use crate::fetch::BoxFuture;
use crate::hydrator::Hydrator;
use crate::route::Query;
use crate::surface::SlotId;

pub use category::{CATEGORY_FILTER, CategoryFilter, DEFAULT_FILTER_LIMIT};

/// Hooks of a mounted page. All have no-op defaults.
pub trait PageController: Send + Sync {
  /// Called once after the route content is mounted.
  fn init(&self) -> BoxFuture<Result<(), ControllerError>> {
    Box::pin(async { Ok(()) })
  }

  /// The same route was entered again with a different query.
  fn on_route_change(&self, _query: Query) -> BoxFuture<()> {
    Box::pin(async {})
  }

  /// Cancel outstanding work. Must be idempotent and safe before `init`
  /// has completed.
  fn destroy(&self) {}
}

/// What a controller is handed when its route mounts.
pub struct ControllerCtx {
  pub path: String,
  pub query: Query,
  /// Placeholders of the freshly mounted content, in document order.
  pub slots: Vec<SlotId>,
  pub hydrator: Arc<Hydrator>,
  /// Cancelled when the navigation that mounted the route is superseded.
  pub cancel: CancellationToken,
}

pub type ControllerFactory = Arc<dyn Fn(ControllerCtx) -> Box<dyn PageController> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ControllerRegistry {
  factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry with the built-in controllers.
  pub fn with_builtin() -> Self {
    Self::new().register(CATEGORY_FILTER, |ctx| Box::new(CategoryFilter::new(ctx)))
  }

  pub fn register<F>(mut self, key: &str, factory: F) -> Self
  where
    F: Fn(ControllerCtx) -> Box<dyn PageController> + Send + Sync + 'static,
  {
    self.factories.insert(key.to_string(), Arc::new(factory));
    self
  }

  pub fn contains(&self, key: &str) -> bool {
    self.factories.contains_key(key)
  }

  pub fn create(&self, key: &str, ctx: ControllerCtx) -> Option<Box<dyn PageController>> {
    self.factories.get(key).map(|factory| factory(ctx))
  }
}

impl fmt::Debug for ControllerRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut keys: Vec<_> = self.factories.keys().collect();
    keys.sort();
    f.debug_struct("ControllerRegistry").field("keys", &keys).finish()
  }
}
