/* src/client/core/rust/src/route/mod.rs */

mod location;


use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;

use crate::descriptor::SectionDescriptor;
use crate::errors::RouteTableError;

pub use location::{Location, Query, normalize_path};

/// Maximum length of a parent chain.
pub const MAX_DEPTH: usize = 16;

/// Header overrides for the declarative route shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RouteHeader {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default, alias = "buttonText")]
  pub button_text: Option<String>,
  #[serde(default)]
  pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteDescriptor {
  pub path: String,
  pub title: String,
  #[serde(default)]
  pub parent: Option<String>,
  #[serde(default)]
  pub children: Vec<String>,
  #[serde(default)]
  pub sections: Vec<SectionDescriptor>,
  /// Server fragment URL; takes precedence over `sections`.
  #[serde(default)]
  pub html: Option<String>,
  /// Stylesheets attached while the route is mounted.
  #[serde(default)]
  pub css: Vec<String>,
  #[serde(default)]
  pub header: Option<RouteHeader>,
  /// Page controller key.
  #[serde(default)]
  pub controller: Option<String>,
}

/// How a route's content is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteContent<'a> {
  Fragment(&'a str),
  Sections(&'a [SectionDescriptor]),
}

impl RouteDescriptor {
  pub fn new(path: &str, title: &str) -> Self {
    Self {
      path: path.to_string(),
      title: title.to_string(),
      parent: None,
      children: Vec::new(),
      sections: Vec::new(),
      html: None,
      css: Vec::new(),
      header: None,
      controller: None,
    }
  }

  pub fn content(&self) -> RouteContent<'_> {
    match self.html.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
      Some(html) => RouteContent::Fragment(html),
      None => RouteContent::Sections(&self.sections),
    }
  }

  pub fn is_parent(&self) -> bool {
    !self.children.is_empty()
  }
}

/// Validated, immutable route table with flattened aliases.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
  order: Vec<String>,
  routes: HashMap<String, RouteDescriptor>,
  aliases: BTreeMap<String, String>,
}

impl RouteTable {
  pub fn new<A>(routes: Vec<RouteDescriptor>, aliases: A) -> Result<Self, RouteTableError>
  where
    A: IntoIterator<Item = (String, String)>,
  {
    let mut order = Vec::with_capacity(routes.len());
    let mut by_path = HashMap::with_capacity(routes.len());
    for route in routes {
      if !route.path.starts_with('/') {
        return Err(RouteTableError::InvalidPath(route.path));
      }
      if by_path.contains_key(&route.path) {
        return Err(RouteTableError::DuplicateRoute(route.path));
      }
      order.push(route.path.clone());
      by_path.insert(route.path.clone(), route);
    }

    for path in &order {
      check_family(&by_path, path)?;
    }

    let raw: HashMap<String, String> =
      aliases.into_iter().map(|(from, to)| (normalize_path(&from), normalize_path(&to))).collect();
    let mut flat = BTreeMap::new();
    for from in raw.keys() {
      if by_path.contains_key(from) {
        return Err(RouteTableError::AliasShadowsRoute(from.clone()));
      }
      let target = follow_alias(&raw, from)?;
      if !by_path.contains_key(&target) {
        return Err(RouteTableError::UnknownAliasTarget { alias: from.clone(), target });
      }
      flat.insert(from.clone(), target);
    }

    Ok(Self { order, routes: by_path, aliases: flat })
  }

  pub fn get(&self, path: &str) -> Option<&RouteDescriptor> {
    self.routes.get(path)
  }

  pub fn contains(&self, path: &str) -> bool {
    self.routes.contains_key(path)
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Routes in declaration order.
  pub fn routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
    self.order.iter().filter_map(|p| self.routes.get(p))
  }

  /// Flattened aliases, sorted by alias.
  pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
    self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
  }

  /// Canonical spelling of `path`. Idempotent.
  pub fn canonicalize(&self, path: &str) -> String {
    let path = normalize_path(path);
    self.aliases.get(&path).cloned().unwrap_or(path)
  }

  /// Look up a raw location (`#/path?query` or `/path`), resolving aliases.
  pub fn resolve(&self, raw: &str) -> Option<(&RouteDescriptor, Location)> {
    let location = Location::parse(raw);
    let canonical = self.canonicalize(&location.path);
    self.get(&canonical).map(|route| (route, location.with_path(&canonical)))
  }

  /// Breadcrumb chain from the root down to `path`.
  pub fn trail(&self, path: &str) -> Vec<&RouteDescriptor> {
    let mut trail = Vec::new();
    let mut current = self.get(path);
    while let Some(route) = current {
      if trail.len() > MAX_DEPTH {
        break;
      }
      trail.push(route);
      current = route.parent.as_deref().and_then(|p| self.get(p));
    }
    trail.reverse();
    trail
  }

  /// Routes with no parent, in declaration order.
  pub fn roots(&self) -> Vec<&RouteDescriptor> {
    self.routes().filter(|r| r.parent.is_none()).collect()
  }

  /// Routes naming `path` as their parent, in declaration order.
  pub fn children_of(&self, path: &str) -> Vec<&RouteDescriptor> {
    self.routes().filter(|r| r.parent.as_deref() == Some(path)).collect()
  }
}

fn check_family(
  routes: &HashMap<String, RouteDescriptor>,
  path: &str,
) -> Result<(), RouteTableError> {
  let Some(route) = routes.get(path) else {
    return Ok(());
  };

  let mut current = route;
  let mut hops = 0;
  while let Some(parent) = current.parent.as_deref() {
    current = routes.get(parent).ok_or_else(|| RouteTableError::UnknownParent {
      route: current.path.clone(),
      parent: parent.to_string(),
    })?;
    hops += 1;
    if hops > MAX_DEPTH {
      return Err(RouteTableError::ParentCycle(path.to_string()));
    }
  }

  for child in &route.children {
    let found = routes
      .get(child)
      .ok_or_else(|| RouteTableError::UnknownChild {
        route: path.to_string(),
        child: child.clone(),
      })?;
    if found.parent.as_deref() != Some(path) {
      return Err(RouteTableError::ChildParentMismatch {
        route: path.to_string(),
        child: child.clone(),
        actual: found.parent.clone(),
      });
    }
  }
  Ok(())
}

fn follow_alias(raw: &HashMap<String, String>, from: &str) -> Result<String, RouteTableError> {
  let mut seen = HashSet::from([from]);
  let mut current = raw.get(from).map(String::as_str).unwrap_or(from);
  while let Some(next) = raw.get(current) {
    if !seen.insert(current) {
      return Err(RouteTableError::AliasCycle(from.to_string()));
    }
    current = next;
  }
  Ok(current.to_string())
}
