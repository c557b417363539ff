// SPDX-License-Identifier: MIT

//! Dotted-path lookup over JSON value trees

use serde_json::{Map, Value};

/// Look up a dotted path (e.g. `"result.data.value"`) inside `value`.
///
/// An exact key match wins over splitting on dots, so keys that themselves
/// contain dots (`"is_greater.result"`) stay addressable. Array segments are
/// numeric indexes.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => lookup_in(map, path),
        Value::Array(items) => {
            let (head, rest) = match path.split_once('.') {
                Some((head, rest)) => (head, Some(rest)),
                None => (path, None),
            };
            let item = items.get(head.parse::<usize>().ok()?)?;
            match rest {
                Some(rest) => lookup_path(item, rest),
                None => Some(item),
            }
        }
        _ => None,
    }
}

/// Same as [`lookup_path`], starting from an object's fields
pub fn lookup_in<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    if let Some(found) = map.get(path) {
        return Some(found);
    }
    for (idx, _) in path.match_indices('.') {
        let Some(child) = map.get(&path[..idx]) else {
            continue;
        };
        if let Some(found) = lookup_path(child, &path[idx + 1..]) {
            return Some(found);
        }
    }
    None
}

/// Render a value as text; strings are unquoted, containers are JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerce a value to an integer; anything unconvertible is 0
pub fn value_to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => parse_int(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn parse_int(s: &str) -> i64 {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        .unwrap_or(0)
}
