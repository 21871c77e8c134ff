/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::VitrineConfig;

pub const CONFIG_FILE: &str = "vitrine.toml";

/// Walk upward from `start` to find `vitrine.toml`, like Cargo.toml discovery
pub fn find_vitrine_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

pub fn load_vitrine_config(path: &Path) -> Result<VitrineConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  parse_vitrine_config(&content).with_context(|| format!("failed to load {}", path.display()))
}

/// Parse and validate: the route table must build and `[app]` must point into it.
pub fn parse_vitrine_config(content: &str) -> Result<VitrineConfig> {
  let config: VitrineConfig = toml::from_str(content).context("failed to parse config")?;
  if config.routes.is_empty() {
    bail!("no [[routes]] defined");
  }
  let table = config.route_table()?;
  let app = &config.app;
  if !table.contains(&app.default_route) {
    bail!("app.default_route {:?} is not a declared route", app.default_route);
  }
  if let Some(nf) = &app.not_found_route
    && !table.contains(nf)
  {
    bail!("app.not_found_route {nf:?} is not a declared route");
  }
  for route in &config.routes {
    for section in &route.sections {
      if let Some(key) = section.feed.as_deref()
        && !config.feeds.contains_key(key.trim())
      {
        bail!("route {:?} uses feed {key:?}, which has no [feeds] entry", route.path);
      }
    }
  }
  config.endpoints()?;
  config.router_config()?;
  Ok(config)
}
