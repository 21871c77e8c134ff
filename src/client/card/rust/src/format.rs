/* src/client/card/rust/src/format.rs */

//! Display formatting for product record fields.
//!
//! Backend rows arrive with loosely typed values (decimal columns are often
//! serialized as strings), so every helper accepts any JSON value and falls
//! back to an empty display value instead of failing.

use serde_json::Value;

/// Render a scalar for display. Null, arrays and objects become empty.
pub fn text(value: Option<&Value>) -> String {
  match value {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) => n.to_string(),
    Some(Value::Bool(b)) => b.to_string(),
    _ => String::new(),
  }
}

/// First non-empty text among `keys`, in order.
pub fn first_text(item: &Value, keys: &[&str]) -> String {
  keys.iter().map(|k| text(item.get(*k))).find(|s| !s.is_empty()).unwrap_or_default()
}

/// Swap the decimal point for the Brazilian comma separator.
/// Only the first point is touched; the digits are never re-rounded.
pub fn money(value: Option<&Value>) -> String {
  let s = text(value);
  s.replacen('.', ",", 1)
}

/// `-15%` for a positive discount, empty otherwise.
pub fn discount(value: Option<&Value>) -> String {
  match number(value) {
    Some(n) if n > 0.0 => format!("-{}%", trim_float(n)),
    _ => String::new(),
  }
}

/// `12x` when a positive installment count is present.
pub fn installments(value: Option<&Value>) -> String {
  match number(value) {
    Some(n) if n > 0.0 => format!("{}x", trim_float(n)),
    _ => String::new(),
  }
}

/// Badge columns come back as `"1"`, `1` or `true`.
pub fn flag(value: Option<&Value>) -> bool {
  match value {
    Some(Value::Bool(b)) => *b,
    Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
    Some(Value::String(s)) => s.trim() == "1" || s.trim().eq_ignore_ascii_case("true"),
    _ => false,
  }
}

fn number(value: Option<&Value>) -> Option<f64> {
  match value? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  }
  .filter(|n| n.is_finite())
}

fn trim_float(n: f64) -> String {
  if n.fract() == 0.0 { format!("{}", n as i64) } else { n.to_string() }
}
