//! Heterogeneous attribute values carried in a handler's config and state.
//!
//! The original tooling this engine is modeled on hands providers an
//! untyped `map[string]interface{}`. We keep that flexibility but make the
//! shape explicit: a tagged variant over the handful of kinds a provider
//! wire format actually needs.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render a scalar as a string for use as a resolved config substitution.
    /// Non-scalar values (`List`, `Object`) return `None`; callers fall back
    /// to assigning the value directly rather than stringifying it.
    pub fn as_stringable_scalar(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::List(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_stringable_scalar() {
            Some(s) => f.write_str(&s),
            None => write!(f, "{self:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// A handler's config: attribute name to desired value, which may be a
/// literal or a symbolic reference string (see [`crate::reference`]).
pub type Config = BTreeMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringable_scalar_skips_collections() {
        assert_eq!(Value::from("x").as_stringable_scalar(), Some("x".to_string()));
        assert_eq!(Value::from(true).as_stringable_scalar(), Some("true".to_string()));
        assert_eq!(Value::List(vec![]).as_stringable_scalar(), None);
    }

    #[test]
    fn round_trips_through_json() {
        let v = Value::Object(BTreeMap::from([("a".to_string(), Value::from(1i64))]));
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
