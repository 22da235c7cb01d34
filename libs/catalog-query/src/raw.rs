//! Untyped listing input.
//!
//! Both input channels (query string and JSON body) reduce to the same
//! multimap so the filter builder only ever sees one shape.

use std::collections::BTreeMap;

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams(BTreeMap<String, Vec<String>>);

fn normalize_key(key: &str) -> &str {
    key.strip_suffix("[]").unwrap_or(key)
}

impl RawParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .entry(normalize_key(key).to_owned())
            .or_default()
            .push(value.into());
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    #[must_use]
    pub fn all(&self, key: &str) -> &[String] {
        self.0.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode `a=1&b=x&b=y` (or `b[]=x`). Undecodable input yields no params.
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable query string");
                Vec::new()
            }
        };
        let mut params = Self::new();
        for (k, v) in pairs {
            params.push(&k, v);
        }
        params
    }

    /// Flatten a JSON object body. Arrays contribute one value per scalar
    /// element; nulls and nested objects are skipped; anything other than an
    /// object yields no params.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let mut params = Self::new();
        let Some(obj) = body.as_object() else {
            return params;
        };
        for (key, value) in obj {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(s) = scalar_to_string(item) {
                            params.push(key, s);
                        }
                    }
                }
                other => {
                    if let Some(s) = scalar_to_string(other) {
                        params.push(key, s);
                    }
                }
            }
        }
        params
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 {
                        format!("{f:.0}")
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_string_repeats_and_brackets_collapse() {
        let p = RawParams::from_query_str("level=Beginner&level[]=Advanced&page=2&search=rust%20web");
        assert_eq!(p.all("level"), ["Beginner", "Advanced"]);
        assert_eq!(p.first("page"), Some("2"));
        assert_eq!(p.first("search"), Some("rust web"));
        assert!(p.all("missing").is_empty());
    }

    #[test]
    fn json_arrays_and_numbers_flatten() {
        let p = RawParams::from_json(&json!({
            "level": ["Beginner", "Advanced"],
            "page": 2,
            "limit": 10.0,
            "ratio": 1.5,
            "free": true,
            "skip": null,
            "nested": {"a": 1},
            "mixed": ["x", {"y": 1}, 3]
        }));
        assert_eq!(p.all("level"), ["Beginner", "Advanced"]);
        assert_eq!(p.first("page"), Some("2"));
        assert_eq!(p.first("limit"), Some("10"));
        assert_eq!(p.first("ratio"), Some("1.5"));
        assert_eq!(p.first("free"), Some("true"));
        assert_eq!(p.first("skip"), None);
        assert_eq!(p.first("nested"), None);
        assert_eq!(p.all("mixed"), ["x", "3"]);
    }

    #[test]
    fn non_object_body_is_empty() {
        assert!(RawParams::from_json(&json!(["page", 2])).is_empty());
        assert!(RawParams::from_json(&json!("page=2")).is_empty());
    }
}
