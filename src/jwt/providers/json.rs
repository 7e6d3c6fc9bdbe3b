//! JSON provider over `serde_json`.

use serde_json::{Map, Number, Value};

use crate::jwt::claims::{ClaimMap, ClaimValue, HeaderMap};
use crate::jwt::error::{ErrorCode, JwtError, JwtResult};
use crate::jwt::provider::JsonProvider;

/// Flat JSON objects of scalars. Arrays and nested objects are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonProvider;

impl SerdeJsonProvider {
    pub fn new() -> Self {
        Self
    }

    fn parse_object(&self, text: &str) -> JwtResult<ClaimMap> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| JwtError::new(ErrorCode::InvalidJson, e.to_string()))?;

        let Value::Object(object) = value else {
            return Err(JwtError::new(ErrorCode::InvalidJson, "Expected a JSON object"));
        };

        object
            .into_iter()
            .map(|(key, value)| {
                let claim = from_json_value(&key, value)?;
                Ok((key, claim))
            })
            .collect()
    }
}

fn from_json_value(key: &str, value: Value) -> JwtResult<ClaimValue> {
    match value {
        Value::Null => Ok(ClaimValue::Null),
        Value::Bool(b) => Ok(ClaimValue::Bool(b)),
        Value::String(s) => Ok(ClaimValue::Text(s)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(ClaimValue::Int(i)),
            None => n.as_f64().map(ClaimValue::Double).ok_or_else(|| {
                JwtError::new(ErrorCode::InvalidJson, format!("Number out of range for '{key}'"))
            }),
        },
        Value::Array(_) | Value::Object(_) => Err(JwtError::new(
            ErrorCode::InvalidJson,
            format!("Nested value for '{key}' is not supported"),
        )),
    }
}

fn to_json_value(key: &str, value: &ClaimValue) -> JwtResult<Value> {
    Ok(match value {
        ClaimValue::Null => Value::Null,
        ClaimValue::Bool(b) => Value::Bool(*b),
        ClaimValue::Int(i) => Value::Number(Number::from(*i)),
        ClaimValue::Double(d) => Value::Number(Number::from_f64(*d).ok_or_else(|| {
            JwtError::new(ErrorCode::JsonError, format!("Non-finite number for '{key}'"))
        })?),
        ClaimValue::Text(s) => Value::String(s.clone()),
    })
}

impl JsonProvider for SerdeJsonProvider {
    fn parse_header(&self, text: &str) -> JwtResult<HeaderMap> {
        self.parse_object(text)
    }

    fn parse_claims(&self, text: &str) -> JwtResult<ClaimMap> {
        self.parse_object(text)
    }

    fn to_json(&self, values: &ClaimMap) -> JwtResult<String> {
        let object = values
            .iter()
            .map(|(key, value)| Ok((key.clone(), to_json_value(key, value)?)))
            .collect::<JwtResult<Map<String, Value>>>()?;

        serde_json::to_string(&Value::Object(object))
            .map_err(|e| JwtError::new(ErrorCode::JsonError, e.to_string()))
    }
}
