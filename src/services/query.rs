//! Filter matching, sort ordering, and field projection over JSON documents.
//! Pure functions; the store applies them, handlers never touch them directly.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// Check a document against a filter object. Every entry must hold; a scalar
/// entry means deep equality, an object entry whose keys start with `$` is an
/// operator document. A non-object filter matches nothing.
pub fn matches(doc: &Value, filter: &Value) -> bool {
    let Some(conditions) = filter.as_object() else {
        return false;
    };
    let empty = Map::new();
    let fields = doc.as_object().unwrap_or(&empty);

    conditions.iter().all(|(key, condition)| {
        let actual = fields.get(key);
        match condition.as_object() {
            Some(ops) if ops.keys().any(|k| k.starts_with('$')) => {
                ops.iter().all(|(op, expected)| {
                    matches_operator(actual, op, expected)
                })
            }
            // A missing field compares equal to an explicit null
            _ => actual.unwrap_or(&Value::Null) == condition,
        }
    })
}

fn matches_operator(actual: Option<&Value>, op: &str, expected: &Value) -> bool {
    let value = actual.unwrap_or(&Value::Null);
    match op {
        "$ne" => value != expected,
        "$in" => expected
            .as_array()
            .map_or(false, |candidates| candidates.contains(value)),
        "$nin" => expected
            .as_array()
            .map_or(false, |candidates| !candidates.contains(value)),
        "$gt" => actual.is_some() && compare_values(value, expected) == Ordering::Greater,
        "$gte" => actual.is_some() && compare_values(value, expected) != Ordering::Less,
        "$lt" => actual.is_some() && compare_values(value, expected) == Ordering::Less,
        "$lte" => actual.is_some() && compare_values(value, expected) != Ordering::Greater,
        "$exists" => {
            let want = matches!(expected, Value::Bool(true));
            actual.is_some() == want
        }
        // Unknown operators match nothing rather than everything
        _ => false,
    }
}

/// Total order over JSON scalars for sorting: Null < Bool < Number < String.
/// Arrays and objects rank above scalars and tie with each other.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let rank_a = type_rank(a);
    let rank_b = type_rank(b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Stable multi-key sort per a `{field: 1 | -1}` specification.
pub fn apply_sort(docs: &mut [Value], spec: &Value) {
    let Some(keys) = spec.as_object() else {
        return;
    };
    let directions: Vec<(&String, bool)> = keys
        .iter()
        .map(|(field, dir)| (field, dir.as_f64().map_or(true, |d| d >= 0.0)))
        .collect();

    docs.sort_by(|a, b| {
        for (field, ascending) in &directions {
            let left = a.get(field.as_str()).unwrap_or(&Value::Null);
            let right = b.get(field.as_str()).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right);
            if ordering != Ordering::Equal {
                return if *ascending { ordering } else { ordering.reverse() };
            }
        }
        Ordering::Equal
    });
}

/// Apply a `{field: 1 | 0}` projection. Any truthy entry selects include mode
/// (listed fields plus `id`, unless `id` is explicitly excluded); otherwise
/// the listed fields are dropped.
pub fn project(doc: &Value, select: &Value) -> Value {
    let (Some(spec), Some(fields)) = (select.as_object(), doc.as_object()) else {
        return doc.clone();
    };
    if spec.is_empty() {
        return doc.clone();
    }

    let include_mode = spec.values().any(truthy);
    let mut out = Map::new();

    if include_mode {
        let keep_id = spec.get("id").map_or(true, truthy);
        if keep_id {
            if let Some(id) = fields.get("id") {
                out.insert("id".to_string(), id.clone());
            }
        }
        for (field, flag) in spec {
            if truthy(flag) {
                if let Some(value) = fields.get(field) {
                    out.insert(field.clone(), value.clone());
                }
            }
        }
    } else {
        for (field, value) in fields {
            if !spec.contains_key(field) {
                out.insert(field.clone(), value.clone());
            }
        }
    }

    Value::Object(out)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        _ => false,
    }
}
