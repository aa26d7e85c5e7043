//! Coercion rules for loosely-typed request fields.

use serde_json::Value;

// Stringify a scalar the way the wire format expects it; structured values
// fall back to their JSON text
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// Coerce a scalar-or-list value into a deduplicated list of non-empty strings,
// keeping first-occurrence order. Used for pendingTasks.
pub fn coerce_string_list(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().map(value_to_string).collect(),
        Value::Null => Vec::new(),
        scalar => vec![value_to_string(scalar)],
    };

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

// Coerce a boolean from a bool or a string; only a case-insensitive "true"
// string reads as true, any other string reads as false
pub fn coerce_bool(value: &Value, default: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => default,
    }
}
