/* src/cli/core/src/config/types.rs */

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;
use vitrine_client::{Endpoints, Feed, RouteDescriptor, RouteTable, RouterConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct VitrineConfig {
  #[serde(default)]
  pub app: AppSection,
  /// Alias path -> target path; chains are flattened when the table is built.
  #[serde(default)]
  pub aliases: BTreeMap<String, String>,
  /// Feeds by `data-type` key.
  #[serde(default)]
  pub feeds: BTreeMap<String, Feed>,
  #[serde(default)]
  pub routes: Vec<RouteDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  #[serde(default = "default_title")]
  pub title: String,
  #[serde(default = "default_route")]
  pub default_route: String,
  pub not_found_route: Option<String>,
  #[serde(default = "default_true")]
  pub cache_html: bool,
  /// Base for relative `api` URLs in section descriptors.
  pub base_url: Option<String>,
  /// Endpoint used by sections that only name `main` + `sub`.
  pub products_api: Option<String>,
  /// Base for relative route `html` URLs; defaults to `base_url`.
  pub html_base: Option<String>,
}

fn default_title() -> String {
  "Vitrine dos Links".to_string()
}

fn default_route() -> String {
  "/inicio".to_string()
}

fn default_true() -> bool {
  true
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      title: default_title(),
      default_route: default_route(),
      not_found_route: None,
      cache_html: true,
      base_url: None,
      products_api: None,
      html_base: None,
    }
  }
}

fn parse_url(field: &str, raw: Option<&str>) -> Result<Option<Url>> {
  raw
    .map(|s| Url::parse(s).with_context(|| format!("app.{field} is not an absolute URL: {s:?}")))
    .transpose()
}

impl VitrineConfig {
  pub fn route_table(&self) -> Result<RouteTable> {
    let aliases = self.aliases.iter().map(|(from, to)| (from.clone(), to.clone()));
    RouteTable::new(self.routes.clone(), aliases).context("invalid route table")
  }

  pub fn endpoints(&self) -> Result<Endpoints> {
    Ok(Endpoints {
      base_url: parse_url("base_url", self.app.base_url.as_deref())?,
      products_api: self.app.products_api.clone(),
      feeds: self.feeds.clone(),
    })
  }

  pub fn router_config(&self) -> Result<RouterConfig> {
    let html_base = match parse_url("html_base", self.app.html_base.as_deref())? {
      Some(url) => Some(url),
      None => parse_url("base_url", self.app.base_url.as_deref())?,
    };
    Ok(RouterConfig {
      app_title: self.app.title.clone(),
      default_route: self.app.default_route.clone(),
      not_found_route: self.app.not_found_route.clone(),
      cache_html: self.app.cache_html,
      html_base,
    })
  }
}
