//! Scalar field values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A configuration field value.
///
/// Serialized as the bare JSON scalar. JSON integers become [`FieldValue::Int`],
/// anything with a fractional part or exponent becomes [`FieldValue::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Integer view. Floats only convert when they have no fractional part.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
            FieldValue::Float(v)
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{:?}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Parses command-line text: integer first, then float, otherwise text.
impl FromStr for FieldValue {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(v) = s.parse::<i64>() {
            return Ok(FieldValue::Int(v));
        }
        if let Ok(v) = s.parse::<f64>() {
            return Ok(FieldValue::Float(v));
        }
        Ok(FieldValue::Text(s.to_string()))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}
