//! Extract-with-default access to an untyped parameter bag
//!
//! Missing or mistyped entries never fail a request: every accessor falls
//! back to the supplied default (or `None`).

use serde_json::{Map, Value};

/// Untyped request parameters
pub type Parameters = Map<String, Value>;

#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    map: &'a Parameters,
}

impl<'a> Params<'a> {
    pub fn new(map: &'a Parameters) -> Self {
        Self { map }
    }

    /// Raw value, `Null` when absent
    pub fn raw(&self, key: &str) -> Value {
        self.map.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn str_opt(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).and_then(Value::as_str)
    }

    /// String value, ignoring empty strings
    pub fn non_empty_str(&self, key: &str) -> Option<&'a str> {
        self.str_opt(key).filter(|s| !s.is_empty())
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.str_opt(key).unwrap_or(default).to_string()
    }

    /// Like [`str_or`](Self::str_or) with a lazily built default
    pub fn str_or_else(&self, key: &str, default: impl FnOnce() -> String) -> String {
        match self.str_opt(key) {
            Some(s) => s.to_string(),
            None => default(),
        }
    }

    /// Non-negative integer; integral floats are accepted
    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        match self.map.get(key) {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                        .map(|f| f as u64)
                })
                .unwrap_or(default),
            _ => default,
        }
    }

    pub fn bool_opt(&self, key: &str) -> Option<bool> {
        self.map.get(key).and_then(Value::as_bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_string_defaults() {
        let map = bag(json!({"name": "b1", "region": 42, "empty": ""}));
        let params = Params::new(&map);

        assert_eq!(params.str_or("name", "x"), "b1");
        assert_eq!(params.str_or("region", "us-west-2"), "us-west-2");
        assert_eq!(params.str_or("missing", "d"), "d");
        assert_eq!(params.non_empty_str("empty"), None);
        assert_eq!(params.str_opt("empty"), Some(""));
        assert_eq!(params.str_or_else("missing", || "lazy".into()), "lazy");
    }

    #[test]
    fn test_numeric_defaults() {
        let map = bag(json!({"a": 5, "b": 7.0, "c": -1, "d": "5", "e": 2.5}));
        let params = Params::new(&map);

        assert_eq!(params.u64_or("a", 3), 5);
        assert_eq!(params.u64_or("b", 3), 7);
        assert_eq!(params.u64_or("c", 3), 3);
        assert_eq!(params.u64_or("d", 3), 3);
        assert_eq!(params.u64_or("e", 3), 3);
        assert_eq!(params.u64_or("missing", 3), 3);
    }

    #[test]
    fn test_raw_and_bool() {
        let map = bag(json!({"policy": {"Version": "2012-10-17"}, "enabled": true}));
        let params = Params::new(&map);

        assert_eq!(params.raw("policy")["Version"], json!("2012-10-17"));
        assert_eq!(params.raw("missing"), Value::Null);
        assert_eq!(params.bool_opt("enabled"), Some(true));
        assert_eq!(params.bool_opt("policy"), None);
    }
}
