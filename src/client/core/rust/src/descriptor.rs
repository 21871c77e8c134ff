/* src/client/core/rust/src/descriptor.rs */

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;
use vitrine_card::escape_html;

use crate::errors::DescriptorError;

pub const DEFAULT_LIMIT: u32 = 10;
/// Freshness window (days) used when a category query does not set one.
pub const DEFAULT_DAYS: u32 = 5;

/// A named listing (`data-type="mais-vendidos"`): its endpoint plus the
/// title and loader text used when the section does not set its own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Feed {
  pub url: String,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub loader: Option<String>,
}

/// Where relative and derived section endpoints resolve.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
  /// Base for relative `api` and feed URLs.
  pub base_url: Option<Url>,
  /// Endpoint used by sections that only set `main` + `sub`.
  pub products_api: Option<String>,
  /// Feeds by `data-type` key.
  pub feeds: BTreeMap<String, Feed>,
}

impl Endpoints {
  pub fn feed(&self, key: &str) -> Option<&Feed> {
    self.feeds.get(key.trim())
  }
}

/// Declarative description of one product grid.
///
/// Deserialized from the route table (TOML) or from the `data-*` attributes
/// of a `<section>` placeholder; everything downstream works on this value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionDescriptor {
  #[serde(default)]
  pub api: Option<String>,
  /// Feed key; `api` still wins when both are set.
  #[serde(default, alias = "type")]
  pub feed: Option<String>,
  #[serde(default = "default_limit")]
  pub limit: u32,
  #[serde(default)]
  pub days: Option<u32>,
  #[serde(default)]
  pub main: Option<String>,
  #[serde(default)]
  pub sub: Option<String>,
  #[serde(default)]
  pub root: Option<String>,
  #[serde(default, alias = "title")]
  pub label: Option<String>,
  #[serde(default)]
  pub link: Option<String>,
  #[serde(default, alias = "buttonText")]
  pub button_text: Option<String>,
  #[serde(default)]
  pub divider: bool,
  /// Card renderer key; `None` selects the product card.
  #[serde(default)]
  pub card: Option<String>,
}

fn default_limit() -> u32 {
  DEFAULT_LIMIT
}

impl Default for SectionDescriptor {
  fn default() -> Self {
    Self {
      api: None,
      feed: None,
      limit: DEFAULT_LIMIT,
      days: None,
      main: None,
      sub: None,
      root: None,
      label: None,
      link: None,
      button_text: None,
      divider: false,
      card: None,
    }
  }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
  value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl SectionDescriptor {
  /// Build from decoded placeholder attributes (`data-api`, `data-limit`, ...).
  pub fn from_attrs<'a, I>(attrs: I) -> Result<Self, DescriptorError>
  where
    I: IntoIterator<Item = (&'a str, &'a str)>,
  {
    let mut d = Self::default();
    let mut title = None;
    for (name, value) in attrs {
      let value = value.trim();
      let owned = (!value.is_empty()).then(|| value.to_string());
      match name.to_ascii_lowercase().as_str() {
        "data-api" => d.api = owned,
        "data-type" => d.feed = owned,
        "data-limit" => d.limit = value.parse().ok().filter(|n| *n > 0).unwrap_or(DEFAULT_LIMIT),
        "data-days" => {
          d.days = owned.map(|v| v.parse().ok().filter(|n| *n > 0).unwrap_or(DEFAULT_DAYS));
        }
        "data-main" => d.main = owned,
        "data-sub" => d.sub = owned,
        "data-root" => d.root = owned,
        "data-label" => d.label = owned,
        "data-title" => title = owned,
        "data-link" => d.link = owned,
        "data-link-text" => d.button_text = owned,
        "data-card" => d.card = owned,
        "data-divider" => d.divider = value != "0" && value != "false",
        _ => {}
      }
    }
    if d.label.is_none() {
      d.label = title;
    }
    if d.api.is_none() && d.feed.is_none() && (d.main.is_none() || d.sub.is_none()) {
      return Err(DescriptorError::MissingEndpoint);
    }
    Ok(d)
  }

  /// `limit` as a positive count.
  pub fn effective_limit(&self) -> usize {
    if self.limit == 0 { DEFAULT_LIMIT as usize } else { self.limit as usize }
  }

  /// Display title: upper-cased label, else the sub-category, else a generic name.
  pub fn title(&self) -> String {
    non_empty(self.label.as_ref())
      .or_else(|| non_empty(self.sub.as_ref()))
      .unwrap_or("SEÇÃO")
      .to_uppercase()
  }

  /// Fill in what the section's feed provides: the label, when unset.
  pub fn with_feed_defaults(mut self, endpoints: &Endpoints) -> Self {
    if non_empty(self.label.as_ref()).is_none()
      && let Some(feed) = non_empty(self.feed.as_ref()).and_then(|key| endpoints.feed(key))
    {
      self.label = feed.title.clone();
    }
    self
  }

  /// Fully resolved request URL; doubles as the section's cache key.
  ///
  /// Endpoint precedence: `api`, then the feed's URL, then the products
  /// endpoint for `main` + `sub`.
  pub fn resolve_url(&self, endpoints: &Endpoints) -> Result<Url, DescriptorError> {
    let category =
      non_empty(self.main.as_ref()).is_some() && non_empty(self.sub.as_ref()).is_some();
    let base = match (non_empty(self.api.as_ref()), non_empty(self.feed.as_ref())) {
      (Some(api), _) => api,
      (None, Some(key)) => endpoints
        .feed(key)
        .map(|feed| feed.url.trim())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| DescriptorError::UnknownFeed(key.to_string()))?,
      (None, None) if category => {
        non_empty(endpoints.products_api.as_ref()).ok_or(DescriptorError::MissingEndpoint)?
      }
      (None, None) => return Err(DescriptorError::MissingEndpoint),
    };

    let mut url = Url::options().base_url(endpoints.base_url.as_ref()).parse(base).map_err(|e| {
      DescriptorError::InvalidEndpoint { api: base.to_string(), reason: e.to_string() }
    })?;

    set_param(&mut url, "limit", &self.effective_limit().to_string());
    for (key, value) in [("root", &self.root), ("main", &self.main), ("sub", &self.sub)] {
      if let Some(v) = non_empty(value.as_ref()) {
        set_param(&mut url, key, v);
      }
    }
    if let Some(days) = self.days.filter(|d| *d > 0) {
      set_param(&mut url, "days", &days.to_string());
    }
    Ok(url)
  }

  /// Attribute text (leading space included) that round-trips through `from_attrs`.
  pub fn to_attrs(&self) -> String {
    let mut out = String::new();
    let mut push = |name: &str, value: Option<&str>| {
      if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        out.push_str(&format!(r#" data-{name}="{}""#, escape_html(v)));
      }
    };
    push("api", self.api.as_deref());
    push("type", self.feed.as_deref());
    push("limit", Some(self.effective_limit().to_string().as_str()));
    push("days", self.days.map(|d| d.to_string()).as_deref());
    push("label", self.label.as_deref());
    push("link", self.link.as_deref());
    push("link-text", self.button_text.as_deref());
    push("root", self.root.as_deref());
    push("main", self.main.as_deref());
    push("sub", self.sub.as_deref());
    push("card", self.card.as_deref());
    if self.divider {
      out.push_str(r#" data-divider="1""#);
    }
    out
  }
}

/// Set `key`, replacing any value already present in the query.
fn set_param(url: &mut Url, key: &str, value: &str) {
  let kept: Vec<(String, String)> = url
    .query_pairs()
    .filter(|(k, _)| k != key)
    .map(|(k, v)| (k.into_owned(), v.into_owned()))
    .collect();
  url.query_pairs_mut().clear().extend_pairs(kept).append_pair(key, value);
}
