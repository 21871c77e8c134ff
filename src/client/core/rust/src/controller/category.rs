/* src/client/core/rust/src/controller/category.rs */

use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ControllerCtx, PageController};
use crate::descriptor::{DEFAULT_DAYS, SectionDescriptor};
use crate::errors::ControllerError;
use crate::fetch::BoxFuture;
use crate::guard::{CommitGuard, GenerationCounter};
use crate::hydrator::{Hydrator, SeeAll};
use crate::route::Query;
use crate::surface::SlotId;
use crate::sync::lock;

pub const CATEGORY_FILTER: &str = "category-filter";
/// Page size when a single sub-category is selected.
pub const DEFAULT_FILTER_LIMIT: u32 = 100;

/// Category page with one section per sub-category. The `sub` query
/// parameter selects which section is visible; without it every section is
/// shown.
pub struct CategoryFilter {
  inner: Arc<Inner>,
}

struct Inner {
  hydrator: Arc<Hydrator>,
  sections: Vec<(SlotId, SectionDescriptor)>,
  initial: Query,
  generations: GenerationCounter,
  root: CancellationToken,
  active: Mutex<CancellationToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterState {
  sub: Option<String>,
  limit: u32,
}

impl FilterState {
  fn from_query(query: &Query) -> Self {
    let sub = query.get("sub").map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string);
    let limit = query
      .get("limit")
      .and_then(|l| l.trim().parse().ok())
      .filter(|n: &u32| *n > 0)
      .unwrap_or(DEFAULT_FILTER_LIMIT);
    Self { sub, limit }
  }

  fn shows(&self, descriptor: &SectionDescriptor) -> bool {
    match &self.sub {
      None => true,
      Some(sub) => descriptor.sub.as_deref().is_some_and(|s| s.trim().eq_ignore_ascii_case(sub)),
    }
  }

  /// Request for a visible section: the query limit applies only when one
  /// sub-category is selected; `days` always has a value.
  fn request(&self, descriptor: &SectionDescriptor) -> SectionDescriptor {
    SectionDescriptor {
      limit: if self.sub.is_some() { self.limit } else { descriptor.limit },
      days: Some(descriptor.days.unwrap_or(DEFAULT_DAYS)),
      ..descriptor.clone()
    }
  }
}

impl CategoryFilter {
  /// Claim every placeholder of the mounted page that names a sub-category.
  pub fn new(ctx: ControllerCtx) -> Self {
    let sections = ctx.hydrator.surface().with(|s| {
      ctx
        .slots
        .iter()
        .filter_map(|id| {
          let p = s.placeholder_mut(*id)?;
          let descriptor = p.descriptor.as_ref().ok().filter(|d| d.sub.is_some())?.clone();
          p.managed = true;
          Some((*id, descriptor))
        })
        .collect()
    });
    let root = ctx.cancel.child_token();
    let inner = Inner {
      hydrator: ctx.hydrator,
      sections,
      initial: ctx.query,
      generations: GenerationCounter::new(),
      active: Mutex::new(root.child_token()),
      root,
    };
    Self { inner: Arc::new(inner) }
  }

  pub fn claimed(&self) -> Vec<SlotId> {
    self.inner.sections.iter().map(|(id, _)| *id).collect()
  }
}

impl Inner {
  /// Start a new generation and cancel the previous request. Runs when the
  /// hook is called, not when its future is first polled, so hooks called
  /// in order supersede each other in order.
  fn supersede(&self) -> CommitGuard {
    let generation = self.generations.advance();
    let token = {
      let mut active = lock(&self.active);
      active.cancel();
      *active = self.root.child_token();
      active.clone()
    };
    CommitGuard::new(token).with_generation(generation)
  }

  async fn apply(&self, guard: CommitGuard, query: &Query) {
    let state = FilterState::from_query(query);
    debug!(sub = ?state.sub, limit = state.limit, "applying category filter");

    let requests: Vec<(SlotId, SectionDescriptor)> = self.hydrator.surface().with(|s| {
      if !guard.is_current() {
        return Vec::new();
      }
      let mut requests = Vec::new();
      for (id, descriptor) in &self.sections {
        let show = state.shows(descriptor);
        if let Some(p) = s.placeholder_mut(*id) {
          p.hidden = !show;
        }
        if show {
          requests.push((*id, state.request(descriptor)));
        }
      }
      requests
    });

    join_all(
      requests.iter().map(|(id, d)| self.hydrator.render_with(*id, d, &guard, SeeAll::CategoryUrl)),
    )
    .await;
  }
}

impl PageController for CategoryFilter {
  fn init(&self) -> BoxFuture<Result<(), ControllerError>> {
    let guard = self.inner.supersede();
    let inner = self.inner.clone();
    Box::pin(async move {
      let query = inner.initial.clone();
      inner.apply(guard, &query).await;
      Ok(())
    })
  }

  fn on_route_change(&self, query: Query) -> BoxFuture<()> {
    let guard = self.inner.supersede();
    let inner = self.inner.clone();
    Box::pin(async move { inner.apply(guard, &query).await })
  }

  fn destroy(&self) {
    self.inner.generations.invalidate();
    self.inner.root.cancel();
  }
}
