//! Claim values and the maps that hold them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One header field or claim: exactly five kinds, no nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

impl ClaimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integers, plus doubles holding an exact integer in `i64` range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Int(value) => Some(*value),
            ClaimValue::Double(value) => exact_integer(*value),
            _ => None,
        }
    }

    /// Doubles, plus integers widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ClaimValue::Double(value) => Some(*value),
            ClaimValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClaimValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ClaimValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClaimValue::Null => "null",
            ClaimValue::Bool(_) => "bool",
            ClaimValue::Int(_) => "int",
            ClaimValue::Double(_) => "double",
            ClaimValue::Text(_) => "text",
        }
    }
}

fn exact_integer(value: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if value.is_finite() && value.fract() == 0.0 && value >= -UPPER && value < UPPER {
        Some(value as i64)
    } else {
        None
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::Null => f.write_str("null"),
            ClaimValue::Bool(value) => write!(f, "{value}"),
            ClaimValue::Int(value) => write!(f, "{value}"),
            ClaimValue::Double(value) => write!(f, "{value}"),
            ClaimValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<()> for ClaimValue {
    fn from(_: ()) -> Self {
        ClaimValue::Null
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Int(value)
    }
}

impl From<i32> for ClaimValue {
    fn from(value: i32) -> Self {
        ClaimValue::Int(i64::from(value))
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        ClaimValue::Double(value)
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Text(value)
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

/// Payload claims by name.
pub type ClaimMap = BTreeMap<String, ClaimValue>;

/// Header fields by name. Same shape as claims.
pub type HeaderMap = BTreeMap<String, ClaimValue>;

/// Text value under `key`, if present and textual.
pub fn get_str<'a>(map: &'a BTreeMap<String, ClaimValue>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(ClaimValue::as_str)
}

/// Integer value under `key`; exact-integer doubles count.
pub fn get_int(map: &BTreeMap<String, ClaimValue>, key: &str) -> Option<i64> {
    map.get(key).and_then(ClaimValue::as_i64)
}
