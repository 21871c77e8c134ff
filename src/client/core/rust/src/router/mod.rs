/* src/client/core/rust/src/router/mod.rs */

//! Hash router: location -> route -> mounted, hydrated content.
//!
//! Every navigation owns a fresh `CancellationToken`. Starting a navigation
//! cancels the previous one, and each write to the surface re-checks the
//! token under the state lock, so only the latest navigation commits.
//! Locks are always taken state first, then surface.

mod shell;


use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::controller::{ControllerCtx, ControllerRegistry, PageController};
use crate::errors::{FetchError, LoadError, RouterError};
use crate::fetch::BoxFuture;
use crate::guard::CommitGuard;
use crate::hydrator::Hydrator;
use crate::route::{Location, Query, RouteContent, RouteDescriptor, RouteTable};
use crate::surface::{Scope, SharedSurface, SlotId};
use crate::sync::lock;

#[derive(Debug, Clone)]
pub struct RouterConfig {
  pub app_title: String,
  pub default_route: String,
  /// Route shown for unknown paths; `None` falls back to `default_route`.
  pub not_found_route: Option<String>,
  /// Keep fetched page fragments for the lifetime of the router.
  pub cache_html: bool,
  /// Base for relative fragment URLs.
  pub html_base: Option<Url>,
}

impl Default for RouterConfig {
  fn default() -> Self {
    Self {
      app_title: "Vitrine dos Links".to_string(),
      default_route: "/inicio".to_string(),
      not_found_route: None,
      cache_html: true,
      html_base: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
  /// A route was loaded, mounted and hydrated.
  Mounted { path: String },
  /// Same route, new query: forwarded to the mounted controller.
  Updated { path: String },
  /// Superseded by a newer navigation; nothing was committed.
  Cancelled,
  /// The error state is shown and no route is mounted.
  Failed { path: String, error: LoadError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDisposition {
  /// Not an internal link; the default action applies.
  PassThrough,
  Navigated(NavigationOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterEvent {
  /// The visible location changed to the given hash.
  LocationChanged(String),
  /// A link was activated; `marked` when it carries the internal-link marker.
  LinkActivated { href: String, marked: bool },
}

#[derive(Default)]
struct NavigationState {
  current_path: Option<String>,
  current_query: Query,
  abort: CancellationToken,
  controller: Option<Arc<dyn PageController>>,
  generation: u64,
  styles: Vec<String>,
}

enum Plan {
  Update(Option<Arc<dyn PageController>>),
  Load { token: CancellationToken, generation: u64 },
}

/// A navigation whose synchronous part already ran.
struct Started {
  target: String,
  location: Location,
  step: Step,
}

enum Step {
  /// The controller's pending `on_route_change`, if one is mounted.
  Update(Option<BoxFuture<()>>),
  Load(CancellationToken),
}

pub struct Router {
  table: RouteTable,
  config: RouterConfig,
  hydrator: Arc<Hydrator>,
  controllers: ControllerRegistry,
  html_cache: Mutex<HashMap<String, String>>,
  state: Mutex<NavigationState>,
}

impl Router {
  pub fn new(
    table: RouteTable,
    config: RouterConfig,
    hydrator: Arc<Hydrator>,
  ) -> Result<Self, RouterError> {
    if !table.contains(&config.default_route) {
      return Err(RouterError::UnknownDefaultRoute(config.default_route));
    }
    if let Some(nf) = &config.not_found_route
      && !table.contains(nf)
    {
      return Err(RouterError::UnknownNotFoundRoute(nf.clone()));
    }
    Ok(Self {
      table,
      config,
      hydrator,
      controllers: ControllerRegistry::with_builtin(),
      html_cache: Mutex::new(HashMap::new()),
      state: Mutex::new(NavigationState::default()),
    })
  }

  pub fn with_controllers(mut self, controllers: ControllerRegistry) -> Self {
    self.controllers = controllers;
    self
  }

  pub fn table(&self) -> &RouteTable {
    &self.table
  }

  pub fn surface(&self) -> &SharedSurface {
    self.hydrator.surface()
  }

  pub fn current_path(&self) -> Option<String> {
    lock(&self.state).current_path.clone()
  }

  pub fn current_query(&self) -> Query {
    lock(&self.state).current_query.clone()
  }

  /// Mount the route named by the current location, defaulting an empty
  /// location to the default route.
  pub async fn start(&self) -> NavigationOutcome {
    let default = format!("#{}", self.config.default_route);
    let raw = self.surface().with(|s| {
      if s.location.trim_start_matches('#').trim().is_empty() {
        s.location = default;
      }
      s.location.clone()
    });
    self.navigate(&raw).await
  }

  /// Cancel in-flight work and unmount the current route.
  pub fn stop(&self) {
    let mut state = lock(&self.state);
    state.abort.cancel();
    if let Some(controller) = state.controller.take() {
      controller.destroy();
    }
    let styles = std::mem::take(&mut state.styles);
    self.surface().with(|s| s.detach_styles(&styles));
    state.current_path = None;
    state.current_query.clear();
    debug!("router stopped");
  }

  /// Programmatic navigation: update the visible location, then navigate.
  pub async fn go(&self, path: &str) -> NavigationOutcome {
    let hash = Location::parse(path).to_hash();
    self.surface().with(|s| s.location = hash.clone());
    self.navigate(&hash).await
  }

  pub async fn on_location_change(&self) -> NavigationOutcome {
    let raw = self.surface().with(|s| s.location.clone());
    self.navigate(&raw).await
  }

  /// Intercept a link activation. Internal links (`#/x`, `/x`, or anything
  /// carrying the marker) navigate; everything else passes through.
  pub async fn activate_link(&self, href: &str, marked: bool) -> LinkDisposition {
    match internal_target(href, marked) {
      Some(path) => LinkDisposition::Navigated(self.go(&path).await),
      None => LinkDisposition::PassThrough,
    }
  }

  /// Consume router events in order. Each event starts its navigation
  /// before the next event is read, so the latest event always wins; only
  /// the loading runs in a spawned task.
  pub fn spawn_listener(
    self: Arc<Self>,
    mut events: mpsc::UnboundedReceiver<RouterEvent>,
  ) -> JoinHandle<()> {
    tokio::spawn(async move {
      while let Some(event) = events.recv().await {
        let raw = match event {
          RouterEvent::LocationChanged(hash) => hash,
          RouterEvent::LinkActivated { href, marked } => match internal_target(&href, marked) {
            Some(path) => Location::parse(&path).to_hash(),
            None => continue,
          },
        };
        match self.begin(&raw) {
          Ok(started) => {
            let router = self.clone();
            tokio::spawn(async move {
              router.finish(started).await;
            });
          }
          Err(outcome) => debug!(?outcome, "navigation not started"),
        }
      }
    })
  }

  /// Resolve `raw` and run the navigation lifecycle.
  pub async fn navigate(&self, raw: &str) -> NavigationOutcome {
    match self.begin(raw) {
      Ok(started) => self.finish(started).await,
      Err(outcome) => outcome,
    }
  }

  /// Synchronous half of a navigation: resolve, then either hand the query
  /// to the mounted controller or tear the current route down. Calls made
  /// in sequence take effect in sequence.
  fn begin(&self, raw: &str) -> Result<Started, NavigationOutcome> {
    let parsed = Location::parse(raw);
    let requested =
      if parsed.path.is_empty() { self.config.default_route.clone() } else { parsed.path.clone() };
    let canonical = self.table.canonicalize(&requested);
    let target = if self.table.contains(&canonical) {
      canonical
    } else {
      let fallback =
        self.config.not_found_route.clone().unwrap_or_else(|| self.config.default_route.clone());
      debug!(path = %requested, fallback = %fallback, "unknown route");
      fallback
    };
    let Some(route) = self.table.get(&target) else {
      let error = LoadError::NoRoute(target.clone());
      return Err(NavigationOutcome::Failed { path: target, error });
    };
    let location = parsed.with_path(&target);

    let step = match self.plan(route, &location) {
      Plan::Update(controller) => {
        debug!(path = %target, "same route, forwarding query");
        Step::Update(controller.map(|c| c.on_route_change(location.query.clone())))
      }
      Plan::Load { token, generation } => {
        debug!(path = %target, generation, "navigating");
        Step::Load(token)
      }
    };
    Ok(Started { target, location, step })
  }

  async fn finish(&self, started: Started) -> NavigationOutcome {
    let Started { target, location, step } = started;
    match step {
      Step::Update(forward) => {
        if let Some(forward) = forward {
          forward.await;
        }
        NavigationOutcome::Updated { path: target }
      }
      Step::Load(token) => {
        let Some(route) = self.table.get(&target) else {
          let error = LoadError::NoRoute(target.clone());
          return NavigationOutcome::Failed { path: target, error };
        };
        match self.load(route, &location, &token).await {
          Ok(outcome) => outcome,
          Err(LoadError::Cancelled) => NavigationOutcome::Cancelled,
          Err(err) => self.fail(&token, target, err),
        }
      }
    }
  }

  /// Under the state lock: either forward to the mounted route, or tear the
  /// current one down and show the loading state.
  fn plan(&self, route: &RouteDescriptor, location: &Location) -> Plan {
    let mut state = lock(&self.state);
    let hash = location.to_hash();

    if state.current_path.as_deref() == Some(route.path.as_str()) {
      state.current_query = location.query.clone();
      self.surface().with(|s| s.location = hash);
      return Plan::Update(state.controller.clone());
    }

    state.abort.cancel();
    let token = CancellationToken::new();
    state.abort = token.clone();
    state.generation += 1;
    state.current_path = None;
    state.current_query = location.query.clone();
    if let Some(controller) = state.controller.take() {
      controller.destroy();
    }
    let styles = std::mem::take(&mut state.styles);

    let title = format!("{} | {}", route.title, self.config.app_title);
    self.surface().with(|s| {
      s.location = hash;
      s.detach_styles(&styles);
      s.set_message(&shell::loading(&route.title));
      s.busy = true;
      s.title = title;
    });
    Plan::Load { token, generation: state.generation }
  }

  async fn load(
    &self,
    route: &RouteDescriptor,
    location: &Location,
    token: &CancellationToken,
  ) -> Result<NavigationOutcome, LoadError> {
    let html = match route.content() {
      RouteContent::Fragment(url) => self.fetch_fragment(url, token).await?,
      RouteContent::Sections(_) => shell::render(&self.table, route),
    };

    let slots = self.mount(route, &html, token)?;

    if let Some(key) = &route.controller {
      let ctx = ControllerCtx {
        path: route.path.clone(),
        query: location.query.clone(),
        slots: slots.clone(),
        hydrator: self.hydrator.clone(),
        cancel: token.clone(),
      };
      let controller: Arc<dyn PageController> = self
        .controllers
        .create(key, ctx)
        .ok_or_else(|| LoadError::UnknownController(key.clone()))?
        .into();
      {
        let mut state = lock(&self.state);
        if token.is_cancelled() {
          controller.destroy();
          return Err(LoadError::Cancelled);
        }
        state.controller = Some(controller.clone());
      }
      if let Err(err) = controller.init().await {
        return Err(if token.is_cancelled() { LoadError::Cancelled } else { err.into() });
      }
    }

    let report =
      self.hydrator.hydrate_all(&Scope::Slots(slots), &CommitGuard::new(token.clone())).await;

    let mut state = lock(&self.state);
    if token.is_cancelled() {
      return Err(LoadError::Cancelled);
    }
    state.current_path = Some(route.path.clone());
    self.surface().with(|s| {
      s.busy = false;
      s.scroll_top = 0;
    });
    info!(
      path = %route.path,
      rendered = report.rendered(),
      failed = report.failed(),
      "route mounted"
    );
    Ok(NavigationOutcome::Mounted { path: route.path.clone() })
  }

  fn mount(
    &self,
    route: &RouteDescriptor,
    html: &str,
    token: &CancellationToken,
  ) -> Result<Vec<SlotId>, LoadError> {
    let mut state = lock(&self.state);
    if token.is_cancelled() {
      return Err(LoadError::Cancelled);
    }
    state.styles = route.css.clone();
    Ok(self.surface().with(|s| {
      for href in &route.css {
        s.attach_style(href);
      }
      s.mount(html)
    }))
  }

  async fn fetch_fragment(
    &self,
    url: &str,
    token: &CancellationToken,
  ) -> Result<String, LoadError> {
    let url = match &self.config.html_base {
      Some(base) => base
        .join(url)
        .map_err(|e| FetchError::Transport { url: url.to_string(), reason: e.to_string() })?
        .to_string(),
      None => url.to_string(),
    };

    if self.config.cache_html
      && let Some(html) = lock(&self.html_cache).get(&url)
    {
      debug!(%url, "fragment cache hit");
      return Ok(html.clone());
    }

    let response = self.hydrator.fetcher().get(&url, token.clone()).await?;
    if !response.is_success() {
      return Err(FetchError::Status { url, status: response.status }.into());
    }
    if self.config.cache_html {
      lock(&self.html_cache).insert(url, response.body.clone());
    }
    Ok(response.body)
  }

  fn fail(&self, token: &CancellationToken, path: String, err: LoadError) -> NavigationOutcome {
    let mut state = lock(&self.state);
    if token.is_cancelled() {
      return NavigationOutcome::Cancelled;
    }
    if let Some(controller) = state.controller.take() {
      controller.destroy();
    }
    state.current_path = None;
    self.surface().with(|s| {
      s.set_message(&shell::load_error());
      s.busy = false;
    });
    match &err {
      LoadError::Fragment(_) => error!(%path, error = %err, "failed to load route"),
      _ => warn!(%path, error = %err, "route could not be mounted"),
    }
    NavigationOutcome::Failed { path, error: err }
  }
}

/// Route path for an intercepted link, if it is internal.
fn internal_target(href: &str, marked: bool) -> Option<String> {
  let href = href.trim();
  let path = href.strip_prefix('#').unwrap_or(href);
  if path.is_empty() || path.contains("://") {
    return None;
  }
  (marked || path.starts_with('/')).then(|| path.to_string())
}
