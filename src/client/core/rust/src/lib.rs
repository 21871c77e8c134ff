/* src/client/core/rust/src/lib.rs */

pub mod controller;
pub mod descriptor;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod fragment;
pub mod guard;
pub mod hydrator;
pub mod route;
pub mod router;
pub mod surface;

mod sync;
#[cfg(test)]
mod testing;

// Re-exports for ergonomic use
pub use controller::{
  CATEGORY_FILTER, CategoryFilter, ControllerCtx, ControllerFactory, ControllerRegistry,
  DEFAULT_FILTER_LIMIT, PageController,
};
pub use descriptor::{DEFAULT_DAYS, DEFAULT_LIMIT, Endpoints, Feed, SectionDescriptor};
pub use errors::{
  ControllerError, DescriptorError, FetchError, HydrateError, LoadError, RouteTableError,
  RouterError,
};
pub use extract::{backend_failure, category_url, extract_items};
pub use fetch::{BoxFuture, Fetch, FetchResponse, or_cancel};
pub use guard::{CommitGuard, Generation, GenerationCounter};
pub use hydrator::{
  AutoHydrator, CardFn, CardRegistry, HydrateOutcome, HydrationReport, Hydrator, SeeAll,
  SkipReason,
};
pub use route::{
  Location, MAX_DEPTH, Query, RouteContent, RouteDescriptor, RouteHeader, RouteTable,
  normalize_path,
};
pub use router::{LinkDisposition, NavigationOutcome, Router, RouterConfig, RouterEvent};
pub use surface::{Placeholder, Scope, SectionRenderRecord, SharedSurface, SlotId, Surface};
