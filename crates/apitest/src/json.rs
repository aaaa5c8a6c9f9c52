//! JSON front-end: decode to the common tree and pretty-print for diffs.

use crate::error::ParseError;
use apitest_match::Value;

pub fn decode(text: &str) -> Result<Value, ParseError> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ParseError::Json(e.to_string()))?;
    Ok(from_json(&json))
}

/// Re-encode with stable two-space indentation for diff display. Key order
/// is the decoder's document order, never sorted: object matching is
/// key-based, and the diff must line up with the source.
pub fn pretty(text: &str) -> Result<String, ParseError> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ParseError::Json(e.to_string()))?;
    serde_json::to_string_pretty(&json).map_err(|e| ParseError::Json(e.to_string()))
}

fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                // u64 beyond i64::MAX or a fraction/exponent.
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}
