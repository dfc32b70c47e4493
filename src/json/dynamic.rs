//! Purpose: Forgiving accessors over untyped JSON.
//! Exports: `JsonExt`, `Json`.
//! Role: The "convenience wrapper" style: index freely, default on mismatch.
//! Invariants: Accessors never panic; missing or mistyped values yield `None` or a default.
//! Notes: Indexing reuses `serde_json::Value`'s `Index`, which yields `null` for misses.
use serde_json::Value;

use super::parse;
use crate::core::error::Error;

pub trait JsonExt {
    fn int(&self) -> Option<i64>;
    fn int_value(&self) -> i64;
    fn string(&self) -> Option<&str>;
    fn string_value(&self) -> String;
    fn count(&self) -> usize;
    /// Object members, or array elements keyed by their index.
    fn entries(&self) -> Vec<(String, &Value)>;
    fn raw_string(&self) -> String;
}

impl JsonExt for Value {
    fn int(&self) -> Option<i64> {
        self.as_i64()
    }

    fn int_value(&self) -> i64 {
        match self {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Value::Bool(b) => i64::from(*b),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn string(&self) -> Option<&str> {
        self.as_str()
    }

    fn string_value(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    fn count(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn entries(&self) -> Vec<(String, &Value)> {
        match self {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| (idx.to_string(), item))
                .collect(),
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            _ => Vec::new(),
        }
    }

    fn raw_string(&self) -> String {
        self.to_string()
    }
}

/// A parsed document that remembers why parsing failed instead of returning early.
#[derive(Debug)]
pub struct Json {
    value: Value,
    error: Option<Error>,
}

impl Json {
    pub fn parse(bytes: &[u8]) -> Self {
        match parse::from_slice::<Value>(bytes) {
            Ok(value) => Self { value, error: None },
            Err(err) => Self {
                value: Value::Null,
                error: Some(parse::decode_error("invalid json document", err)),
            },
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}

impl std::ops::Deref for Json {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::{Json, JsonExt};
    use serde_json::json;

    #[test]
    fn accessors_default_instead_of_failing() {
        let doc = json!({"a": 100, "b": 200, "s": "7", "f": 1.9, "t": true});
        assert_eq!(doc["a"].int_value(), 100);
        assert_eq!(doc["b"].int(), Some(200));
        assert_eq!(doc["missing"].int(), None);
        assert_eq!(doc["missing"].int_value(), 0);
        assert_eq!(doc["s"].int_value(), 7);
        assert_eq!(doc["f"].int_value(), 1);
        assert_eq!(doc["t"].string_value(), "true");
        assert_eq!(doc["a"]["deeper"]["still"].string_value(), "");
        assert_eq!(doc["a"].string(), None);
    }

    #[test]
    fn entries_and_count_cover_arrays_and_objects() {
        let doc = json!({"tags": ["x", "y"], "n": 1});
        assert_eq!(doc.count(), 2);
        assert_eq!(doc["tags"].count(), 2);
        assert_eq!(doc["n"].count(), 0);

        let tags: Vec<_> = doc["tags"]
            .entries()
            .into_iter()
            .map(|(k, v)| (k, v.string_value()))
            .collect();
        assert_eq!(
            tags,
            vec![("0".to_string(), "x".to_string()), ("1".to_string(), "y".to_string())]
        );
    }

    #[test]
    fn parse_keeps_error_and_yields_null() {
        let bad = Json::parse(b"{\"a\": ");
        assert!(bad.is_null());
        assert!(bad.error().is_some());
        assert_eq!(bad["a"].int_value(), 0);

        let good = Json::parse(br#"{"json": {"bar": {"baz": "qux"}}}"#);
        assert!(good.error().is_none());
        assert_eq!(good["json"]["bar"]["baz"].string_value(), "qux");
    }
}
