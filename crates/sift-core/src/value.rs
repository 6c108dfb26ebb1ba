//! Tagged value model shared by coercion, validation and filtering
//!
//! `RawValue` is what arrives from an untrusted source: text or nested
//! arrays of text. `Value` is what leaves the filter: one of the five
//! canonical types, or null.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::coercion::{describe_json, normalize_type_name};
use crate::error::{UnsupportedInput, UnsupportedType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of output types every type name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalType {
    Boolean,
    Integer,
    Double,
    String,
    Array,
}

impl CanonicalType {
    /// All canonical types, in declaration order
    pub const ALL: [CanonicalType; 5] = [
        CanonicalType::Boolean,
        CanonicalType::Integer,
        CanonicalType::Double,
        CanonicalType::String,
        CanonicalType::Array,
    ];

    /// The canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalType::Boolean => "boolean",
            CanonicalType::Integer => "integer",
            CanonicalType::Double => "double",
            CanonicalType::String => "string",
            CanonicalType::Array => "array",
        }
    }

    /// The built-in default used when a definition supplies none
    pub fn zero_value(&self) -> Value {
        match self {
            CanonicalType::Boolean => Value::Boolean(false),
            CanonicalType::Integer => Value::Integer(0),
            CanonicalType::Double => Value::Double(0.0),
            CanonicalType::String => Value::String(String::new()),
            CanonicalType::Array => Value::Array(Vec::new()),
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanonicalType {
    type Err = UnsupportedType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_type_name(s).ok_or_else(|| UnsupportedType {
            name: s.to_string(),
        })
    }
}

/// A typed value: the output of coercion, a default, or a member of `validValues`
///
/// Equality is exact-type: `Integer(1)` is not equal to `Double(1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    /// The canonical type of this value; `None` for null
    pub fn canonical_type(&self) -> Option<CanonicalType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(CanonicalType::Boolean),
            Value::Integer(_) => Some(CanonicalType::Integer),
            Value::Double(_) => Some(CanonicalType::Double),
            Value::String(_) => Some(CanonicalType::String),
            Value::Array(_) => Some(CanonicalType::Array),
        }
    }

    /// Type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        self.canonical_type().map_or("null", |kind| kind.name())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
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

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Text(text) => Value::String(text),
            RawValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(n) => serde_json::Value::Number(n.into()),
            Value::Double(n) => serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
        }
    }
}

/// An untrusted input value: text, or arbitrarily nested arrays of text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Array(Vec<RawValue>),
}

impl RawValue {
    pub fn is_array(&self) -> bool {
        matches!(self, RawValue::Array(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            RawValue::Array(_) => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&serde_json::Value> for RawValue {
    type Error = UnsupportedInput;

    fn try_from(json: &serde_json::Value) -> Result<Self, Self::Error> {
        fn convert(json: &serde_json::Value) -> Option<RawValue> {
            match json {
                serde_json::Value::String(text) => Some(RawValue::Text(text.clone())),
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(convert)
                    .collect::<Option<Vec<_>>>()
                    .map(RawValue::Array),
                _ => None,
            }
        }

        convert(json).ok_or_else(|| UnsupportedInput {
            rendered: describe_json(json),
        })
    }
}
