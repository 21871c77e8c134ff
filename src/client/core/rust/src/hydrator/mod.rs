/* src/client/core/rust/src/hydrator/mod.rs */

//! Section hydration: placeholder -> request URL -> fetched items -> cards.

mod observer;
mod render;


use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::descriptor::{Endpoints, SectionDescriptor};
use crate::errors::{DescriptorError, FetchError, HydrateError};
use crate::extract::{backend_failure, category_url, extract_items};
use crate::fetch::{Fetch, FetchResponse};
use crate::guard::CommitGuard;
use crate::surface::{Scope, SectionRenderRecord, SharedSurface, SlotId, Surface};

pub use observer::AutoHydrator;

const LOADING_TEXT: &str = "Carregando produtos...";

pub type CardFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Card renderers by key. `Default` registers the product card.
#[derive(Clone)]
pub struct CardRegistry {
  renderers: HashMap<String, CardFn>,
}

impl CardRegistry {
  pub const PRODUCT: &'static str = "product";

  pub fn empty() -> Self {
    Self { renderers: HashMap::new() }
  }

  pub fn with(
    mut self,
    key: &str,
    render: impl Fn(&Value) -> String + Send + Sync + 'static,
  ) -> Self {
    self.renderers.insert(key.to_string(), Arc::new(render));
    self
  }

  pub fn get(&self, key: &str) -> Option<&CardFn> {
    self.renderers.get(key)
  }
}

impl Default for CardRegistry {
  fn default() -> Self {
    Self::empty().with(Self::PRODUCT, vitrine_card::render_card)
  }
}

impl fmt::Debug for CardRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut keys: Vec<_> = self.renderers.keys().collect();
    keys.sort();
    f.debug_struct("CardRegistry").field("keys", &keys).finish()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// Already rendered from the same resolved URL.
  Unchanged,
  /// A fetch for the same URL is still running.
  InFlight,
  /// Claimed by a page controller.
  Managed,
  /// The placeholder is no longer on the surface.
  Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrateOutcome {
  Skipped(SkipReason),
  Rendered { url: String, cards: usize },
  /// The backend answered `ok: false`; its message was rendered.
  Declined { message: String },
  /// The guard expired before the result could be written.
  Discarded,
  /// Rendered as an inline error in that section only.
  Failed(HydrateError),
}

impl HydrateOutcome {
  pub fn is_rendered(&self) -> bool {
    matches!(self, Self::Rendered { .. })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
  pub outcomes: Vec<(SlotId, HydrateOutcome)>,
}

impl HydrationReport {
  pub fn get(&self, id: SlotId) -> Option<&HydrateOutcome> {
    self.outcomes.iter().find(|(slot, _)| *slot == id).map(|(_, o)| o)
  }

  pub fn rendered(&self) -> usize {
    self.outcomes.iter().filter(|(_, o)| o.is_rendered()).count()
  }

  pub fn failed(&self) -> usize {
    self.outcomes.iter().filter(|(_, o)| matches!(o, HydrateOutcome::Failed(_))).count()
  }
}

/// Source of a section's "see all" button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeeAll {
  /// The descriptor's `link` / `button_text`.
  Descriptor,
  /// The category page reported by the response, opened externally.
  CategoryUrl,
}

struct Started {
  descriptor: SectionDescriptor,
  url: String,
  card: CardFn,
}

enum Composed {
  Cards { html: String, count: usize },
  Declined(String),
}

pub struct Hydrator {
  surface: SharedSurface,
  fetcher: Arc<dyn Fetch>,
  endpoints: Endpoints,
  cards: CardRegistry,
}

impl Hydrator {
  pub fn new(surface: SharedSurface, fetcher: Arc<dyn Fetch>, endpoints: Endpoints) -> Self {
    Self { surface, fetcher, endpoints, cards: CardRegistry::default() }
  }

  pub fn with_cards(mut self, cards: CardRegistry) -> Self {
    self.cards = cards;
    self
  }

  pub fn surface(&self) -> &SharedSurface {
    &self.surface
  }

  pub fn endpoints(&self) -> &Endpoints {
    &self.endpoints
  }

  pub fn fetcher(&self) -> &Arc<dyn Fetch> {
    &self.fetcher
  }

  /// Hydrate one placeholder from its own descriptor, skipping it when its
  /// resolved URL matches the last successful render.
  pub async fn hydrate_one(&self, id: SlotId, guard: &CommitGuard) -> HydrateOutcome {
    self.run(id, None, guard, SeeAll::Descriptor).await
  }

  /// Render `descriptor` into a placeholder unconditionally. Used by page
  /// controllers, which own the placeholder and its filter state.
  pub async fn render_with(
    &self,
    id: SlotId,
    descriptor: &SectionDescriptor,
    guard: &CommitGuard,
    see_all: SeeAll,
  ) -> HydrateOutcome {
    self.run(id, Some(descriptor), guard, see_all).await
  }

  /// Hydrate every placeholder in `scope` concurrently. One section's
  /// failure never affects the others.
  pub async fn hydrate_all(&self, scope: &Scope, guard: &CommitGuard) -> HydrationReport {
    let ids = self.surface.with(|s| s.slots(scope));
    if ids.is_empty() {
      return HydrationReport::default();
    }
    debug!(sections = ids.len(), "hydrating sections");
    let outcomes = join_all(ids.iter().map(|id| self.hydrate_one(*id, guard))).await;
    HydrationReport { outcomes: ids.into_iter().zip(outcomes).collect() }
  }

  /// Forget previous renders in `scope`, then hydrate it.
  pub async fn rehydrate(&self, scope: &Scope, guard: &CommitGuard) -> HydrationReport {
    self.surface.with(|s| s.reset_hydration(scope));
    self.hydrate_all(scope, guard).await
  }

  async fn run(
    &self,
    id: SlotId,
    forced: Option<&SectionDescriptor>,
    guard: &CommitGuard,
    see_all: SeeAll,
  ) -> HydrateOutcome {
    let started = self.surface.with(|s| self.begin(s, id, forced, guard));
    let Started { descriptor, url, card } = match started {
      Ok(started) => started,
      Err(outcome) => return outcome,
    };
    let response = self.fetcher.get(&url, guard.cancel_token().clone()).await;
    let composed = compose(&descriptor, &url, &card, response, see_all);
    self.surface.with(|s| commit(s, id, &descriptor, url, composed, guard))
  }

  fn begin(
    &self,
    surface: &mut Surface,
    id: SlotId,
    forced: Option<&SectionDescriptor>,
    guard: &CommitGuard,
  ) -> Result<Started, HydrateOutcome> {
    let Some(p) = surface.placeholder_mut(id) else {
      return Err(HydrateOutcome::Skipped(SkipReason::Missing));
    };
    if forced.is_none() && p.managed {
      return Err(HydrateOutcome::Skipped(SkipReason::Managed));
    }
    if !guard.is_current() {
      return Err(HydrateOutcome::Discarded);
    }

    let descriptor = match forced {
      Some(d) => Ok(d.clone()),
      None => p.descriptor.clone(),
    };
    let resolved = descriptor.and_then(|d| {
      let url = d.resolve_url(&self.endpoints)?;
      Ok((d.with_feed_defaults(&self.endpoints), url))
    });
    let (descriptor, url) = match resolved {
      Ok((d, url)) => (d, url.to_string()),
      Err(err) => {
        warn!(error = %err, "invalid section placeholder");
        let notice = match &err {
          DescriptorError::UnknownFeed(key) => render::unknown_feed(key),
          _ => render::invalid_section(),
        };
        p.set_content(notice);
        return Err(HydrateOutcome::Failed(err.into()));
      }
    };

    if forced.is_none() {
      if p.record.as_ref().is_some_and(|r| r.last_resolved_url == url) {
        debug!(%url, "section unchanged, skipping");
        return Err(HydrateOutcome::Skipped(SkipReason::Unchanged));
      }
      if p.pending.as_deref() == Some(url.as_str()) {
        return Err(HydrateOutcome::Skipped(SkipReason::InFlight));
      }
    }

    let key = descriptor.card.as_deref().unwrap_or(CardRegistry::PRODUCT);
    let Some(card) = self.cards.get(key).cloned() else {
      warn!(card = key, "card renderer not registered");
      p.set_content(render::missing_renderer(key));
      return Err(HydrateOutcome::Failed(HydrateError::MissingRenderer(key.to_string())));
    };

    p.pending = Some(url.clone());
    let loading = descriptor
      .feed
      .as_deref()
      .and_then(|key| self.endpoints.feed(key))
      .and_then(|feed| feed.loader.as_deref())
      .unwrap_or(LOADING_TEXT);
    p.set_content(render::loader(loading));
    Ok(Started { descriptor, url, card })
  }
}

fn compose(
  descriptor: &SectionDescriptor,
  url: &str,
  card: &CardFn,
  response: Result<FetchResponse, FetchError>,
  see_all: SeeAll,
) -> Result<Composed, HydrateError> {
  let response = response?;
  let status_error = || FetchError::Status { url: url.to_string(), status: response.status };
  let body: Value = match serde_json::from_str(&response.body) {
    Ok(body) => body,
    Err(_) if !response.is_success() => return Err(status_error().into()),
    Err(e) => return Err(FetchError::Decode { url: url.to_string(), reason: e.to_string() }.into()),
  };
  if let Some(message) = backend_failure(&body) {
    return Ok(Composed::Declined(message));
  }
  if !response.is_success() {
    return Err(status_error().into());
  }

  let items = extract_items(&body);
  let shown = &items[..items.len().min(descriptor.effective_limit())];
  let cards = if shown.is_empty() {
    render::empty_grid()
  } else {
    shown.iter().map(|item| card(item)).collect::<String>()
  };

  let text = descriptor
    .button_text
    .as_deref()
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .unwrap_or(render::DEFAULT_SEE_ALL_TEXT);
  let button = match see_all {
    SeeAll::Descriptor => descriptor
      .link
      .as_deref()
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .map(|link| render::see_all(link, text, render::is_internal_link(link))),
    SeeAll::CategoryUrl => category_url(&body).map(|link| render::see_all(&link, text, false)),
  }
  .unwrap_or_default();

  Ok(Composed::Cards {
    html: render::section_body(&descriptor.title(), &button, &cards),
    count: shown.len(),
  })
}

fn commit(
  surface: &mut Surface,
  id: SlotId,
  descriptor: &SectionDescriptor,
  url: String,
  composed: Result<Composed, HydrateError>,
  guard: &CommitGuard,
) -> HydrateOutcome {
  let Some(p) = surface.placeholder_mut(id) else {
    return HydrateOutcome::Discarded;
  };
  if p.pending.as_deref() == Some(url.as_str()) {
    p.pending = None;
  }
  if !guard.is_current() {
    debug!(%url, "discarding superseded section result");
    return HydrateOutcome::Discarded;
  }

  match composed {
    Ok(Composed::Cards { html, count }) => {
      p.set_content(html);
      p.reveal();
      p.record =
        Some(SectionRenderRecord {
          last_resolved_url: url.clone(),
          last_rendered_at: SystemTime::now(),
        });
      debug!(%url, cards = count, "section rendered");
      HydrateOutcome::Rendered { url, cards: count }
    }
    Ok(Composed::Declined(message)) => {
      p.set_content(render::declined(&message));
      HydrateOutcome::Declined { message }
    }
    Err(HydrateError::Fetch(FetchError::Cancelled)) => HydrateOutcome::Discarded,
    Err(err) => {
      warn!(%url, error = %err, "section failed to load");
      let name = descriptor.label.as_deref().or(descriptor.sub.as_deref()).unwrap_or(url.as_str());
      p.set_content(render::section_error(name));
      HydrateOutcome::Failed(err)
    }
  }
}
