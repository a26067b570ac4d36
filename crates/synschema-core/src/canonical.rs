//! # Deterministic JSON Text
//!
//! Every JSON artifact this workspace writes goes through
//! [`to_canonical_string`]: keys sorted recursively, two-space indentation,
//! one trailing newline. Two semantically equal values always produce the
//! same bytes, which is what normalizer check mode and report diffs rely on.
//!
//! Sorting is applied explicitly rather than relying on the map
//! implementation `serde_json` happens to be built with.

use serde_json::{Map, Value};

/// Rebuild `value` with every object's keys in sorted order.
pub fn sorted_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted_value(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_value).collect()),
        other => other.clone(),
    }
}

/// Render `value` as sorted, pretty-printed JSON with a trailing newline.
pub fn to_canonical_string(value: &Value) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(&sorted_value(value))?;
    text.push('\n');
    Ok(text)
}
