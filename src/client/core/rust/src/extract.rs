/* src/client/core/rust/src/extract.rs */

//! Tolerant readers for the listing endpoints' JSON envelope.

use serde_json::Value;

const LIST_FIELDS: &[&str] = &["items", "products", "data", "rows", "results"];
const ENVELOPES: &[&str] = &["payload", "result"];

/// Item list of a listing response: the first array found among the known
/// field names, at the top level and then one level under each envelope.
/// No array anywhere yields an empty list.
pub fn extract_items(body: &Value) -> &[Value] {
  let top = std::iter::once(body);
  let nested = ENVELOPES.iter().filter_map(|env| body.get(env));
  top
    .chain(nested)
    .flat_map(|scope| LIST_FIELDS.iter().filter_map(move |field| scope.get(field)))
    .find_map(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or(&[])
}

/// Category page link: `category_url`, then `filters.category_url`, then the
/// first item that carries one.
pub fn category_url(body: &Value) -> Option<String> {
  let non_empty = |v: Option<&Value>| {
    v.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
  };
  non_empty(body.get("category_url"))
    .or_else(|| non_empty(body.get("filters").and_then(|f| f.get("category_url"))))
    .or_else(|| extract_items(body).iter().find_map(|item| non_empty(item.get("category_url"))))
}

/// Application-level failure declared by the backend (`ok: false`), with its
/// message. Anything other than an explicit `false` counts as success.
pub fn backend_failure(body: &Value) -> Option<String> {
  if body.get("ok").and_then(Value::as_bool) != Some(false) {
    return None;
  }
  let message = body.get("message").and_then(Value::as_str).map(str::trim).unwrap_or_default();
  Some(if message.is_empty() { "Não foi possível carregar os produtos.".to_string() } else {
    message.to_string()
  })
}
