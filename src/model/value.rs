//! Attribute value type for the open `additional_fields` bag on assets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A metadata value attached to an asset.
///
/// Deliberately has no null variant: an absent attribute is simply not in
/// the map, so `additional_fields` can never carry a null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

// ============================================================================
// Validation
// ============================================================================

impl Value {
    /// Floats must be finite; everything else is always valid.
    pub(crate) fn is_finite(&self) -> bool {
        match self {
            Value::Float(f) => f.is_finite(),
            _ => true,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(2.5), Value::Float(2.5));
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("COMEX").to_string(), "COMEX");
        assert_eq!(Value::from(100i64).to_string(), "100");
        assert_eq!(Value::from(false).to_string(), "false");
    }

    #[test]
    fn test_untagged_serde() {
        let json = serde_json::to_string(&Value::from(1.5)).unwrap();
        assert_eq!(json, "1.5");
        let back: Value = serde_json::from_str("\"AA\"").unwrap();
        assert_eq!(back, Value::from("AA"));
        let int: Value = serde_json::from_str("7").unwrap();
        assert_eq!(int, Value::Int(7));
    }

    #[test]
    fn test_finiteness() {
        assert!(!Value::Float(f64::NAN).is_finite());
        assert!(Value::Int(i64::MAX).is_finite());
    }
}
