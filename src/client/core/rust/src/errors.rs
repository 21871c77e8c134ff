/* src/client/core/rust/src/errors.rs */

use thiserror::Error;

/// A section descriptor that cannot produce a request URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
  #[error("section has no endpoint: set data-api, data-type, or data-main + data-sub")]
  MissingEndpoint,
  #[error("feed {0:?} is not registered")]
  UnknownFeed(String),
  #[error("invalid section endpoint {api:?}: {reason}")]
  InvalidEndpoint { api: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  #[error("request cancelled")]
  Cancelled,
  #[error("request to {url} failed: {reason}")]
  Transport { url: String, reason: String },
  #[error("HTTP {status} from {url}")]
  Status { url: String, status: u16 },
  #[error("invalid JSON from {url}: {reason}")]
  Decode { url: String, reason: String },
}

impl FetchError {
  pub fn is_cancelled(&self) -> bool {
    matches!(self, Self::Cancelled)
  }
}

/// Failure confined to one section placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrateError {
  #[error("invalid section: {0}")]
  InvalidSection(#[from] DescriptorError),
  #[error(transparent)]
  Fetch(#[from] FetchError),
  #[error("card renderer {0:?} is not registered")]
  MissingRenderer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
  #[error("route {0:?} is declared twice")]
  DuplicateRoute(String),
  #[error("route path {0:?} must start with '/'")]
  InvalidPath(String),
  #[error("route {route:?} names unknown parent {parent:?}")]
  UnknownParent { route: String, parent: String },
  #[error("parent chain of {0:?} does not terminate")]
  ParentCycle(String),
  #[error("route {route:?} lists child {child:?} which does not exist")]
  UnknownChild { route: String, child: String },
  #[error("route {route:?} lists child {child:?} whose parent is {actual:?}")]
  ChildParentMismatch { route: String, child: String, actual: Option<String> },
  #[error("alias {0:?} resolves back to itself")]
  AliasCycle(String),
  #[error("alias {0:?} shadows a declared route")]
  AliasShadowsRoute(String),
  #[error("alias {alias:?} points to unknown route {target:?}")]
  UnknownAliasTarget { alias: String, target: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
  #[error("default route {0:?} is not in the route table")]
  UnknownDefaultRoute(String),
  #[error("not-found route {0:?} is not in the route table")]
  UnknownNotFoundRoute(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page controller failed: {0}")]
pub struct ControllerError(pub String);

/// Why a navigation could not mount its route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
  #[error("navigation superseded")]
  Cancelled,
  #[error("no route matches {0:?} and no fallback is available")]
  NoRoute(String),
  #[error("failed to load page fragment: {0}")]
  Fragment(FetchError),
  #[error("page controller {0:?} is not registered")]
  UnknownController(String),
  #[error(transparent)]
  Controller(#[from] ControllerError),
}

impl From<FetchError> for LoadError {
  fn from(err: FetchError) -> Self {
    match err {
      FetchError::Cancelled => Self::Cancelled,
      other => Self::Fragment(other),
    }
  }
}
