/* src/client/core/rust/src/route/location.rs */

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Query parameters of a location; a repeated key keeps its last value.
pub type Query = BTreeMap<String, String>;

/// A hash location split into its path and query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
  pub path: String,
  pub query: Query,
}

impl Location {
  /// Parse `#/path?query`, `/path?query` or `path`. The path is normalized
  /// with [`normalize_path`]; an empty path stays empty.
  pub fn parse(raw: &str) -> Self {
    let raw = raw.trim();
    let raw = raw.strip_prefix('#').unwrap_or(raw);
    let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
    let query = form_urlencoded::parse(query.as_bytes()).into_owned().collect();
    Self { path: normalize_path(path), query }
  }

  pub fn with_path(&self, path: &str) -> Self {
    Self { path: path.to_string(), query: self.query.clone() }
  }

  /// Hash form, e.g. `#/suplementos?sub=whey`.
  pub fn to_hash(&self) -> String {
    if self.query.is_empty() {
      return format!("#{}", self.path);
    }
    let query = form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.query).finish();
    format!("#{}?{query}", self.path)
  }
}

/// Leading `/` added, trailing `/` removed; the empty path stays empty.
pub fn normalize_path(raw: &str) -> String {
  let trimmed = raw.trim().trim_end_matches('/');
  if trimmed.is_empty() {
    return if raw.trim().starts_with('/') { "/".to_string() } else { String::new() };
  }
  if trimmed.starts_with('/') { trimmed.to_string() } else { format!("/{trimmed}") }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn parses_hash_forms() {
    let loc = Location::parse("#/suplementos?sub=whey&limit=100");
    assert_eq!(loc.path, "/suplementos");
    assert_eq!(loc.query.get("sub").map(String::as_str), Some("whey"));
    assert_eq!(loc.query.get("limit").map(String::as_str), Some("100"));

    assert_eq!(Location::parse("inicio").path, "/inicio");
    assert_eq!(Location::parse("/inicio/").path, "/inicio");
    assert_eq!(Location::parse("#").path, "");
    assert_eq!(Location::parse("#/").path, "/");
  }

  #[test]
  fn query_decoding_and_last_value_wins() {
    let loc = Location::parse("#/busca?q=whey+protein&q=creatina%20pura");
    assert_eq!(loc.query.get("q").map(String::as_str), Some("creatina pura"));
  }

  #[test]
  fn hash_round_trip() {
    assert_eq!(Location::parse("/inicio").to_hash(), "#/inicio");
    assert_eq!(Location::parse("#/suplementos?sub=whey").to_hash(), "#/suplementos?sub=whey");
  }
}
