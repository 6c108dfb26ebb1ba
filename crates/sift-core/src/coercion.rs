//! Type-name normalization and conversion of raw input to canonical types
//!
//! Conversion is deliberately strict. Anything that cannot be read
//! unambiguously as the target type fails, including the empty string for
//! every target but `string`; a failure here is never papered over with a
//! default.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::error::TypeConversionError;
use crate::value::{CanonicalType, RawValue, Value};

/// Map a user-supplied type name to its canonical type
///
/// The five canonical names and the aliases `bool`, `int` and `float` are
/// recognized, case-sensitively. Everything else yields `None`.
pub fn normalize_type_name(name: &str) -> Option<CanonicalType> {
    match name {
        "boolean" | "bool" => Some(CanonicalType::Boolean),
        "integer" | "int" => Some(CanonicalType::Integer),
        "double" | "float" => Some(CanonicalType::Double),
        "string" => Some(CanonicalType::String),
        "array" => Some(CanonicalType::Array),
        _ => None,
    }
}

/// Convert a raw value to the target type
///
/// Only an array converts to `array`, and it is returned unchanged. Every
/// other target requires text.
pub fn coerce(raw: &RawValue, target: CanonicalType) -> Result<Value, TypeConversionError> {
    let converted = match (target, raw) {
        (CanonicalType::Array, RawValue::Array(_)) => Some(Value::from(raw.clone())),
        (_, RawValue::Array(_)) | (CanonicalType::Array, RawValue::Text(_)) => None,
        (CanonicalType::Boolean, RawValue::Text(text)) => parse_boolean(text).map(Value::Boolean),
        (CanonicalType::Integer, RawValue::Text(text)) => parse_integer(text).map(Value::Integer),
        (CanonicalType::Double, RawValue::Text(text)) => parse_double(text).map(Value::Double),
        (CanonicalType::String, RawValue::Text(text)) => Some(Value::String(text.clone())),
    };

    converted.ok_or_else(|| TypeConversionError::new(describe_raw(raw), target))
}

/// `"1"` is true and `"0"` is false; nothing else is a Boolean
pub fn parse_boolean(text: &str) -> Option<bool> {
    match text {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Parse a base-10 integer with an optional single sign
///
/// Surrounding whitespace is ignored. Leading zeros (other than `"0"`
/// itself), fractional parts and values outside the `i64` range fail.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = trim_whitespace(text);
    let digits = strip_sign(trimmed);

    if !is_digits(digits) || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }

    trimmed.parse().ok()
}

/// Parse a finite decimal number, optionally signed, with an optional exponent
pub fn parse_double(text: &str) -> Option<f64> {
    let trimmed = trim_whitespace(text);

    if !is_decimal_literal(trimmed) {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a raw value for diagnostics
pub fn describe_raw(raw: &RawValue) -> String {
    match raw {
        RawValue::Text(text) => quote(text),
        RawValue::Array(_) => "[array]".to_string(),
    }
}

/// Rendering of input that is neither text nor an array
pub const UNSUPPORTED: &str = "[unsupported]";

/// Render a JSON value offered as input for diagnostics
pub fn describe_json(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::String(text) => quote(text),
        serde_json::Value::Array(_) => "[array]".to_string(),
        _ => UNSUPPORTED.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("`\"{}\"`", text)
}

fn trim_whitespace(text: &str) -> &str {
    text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b'))
}

fn strip_sign(text: &str) -> &str {
    text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text)
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

// Accepts `1`, `-1.5`, `.5`, `5.`, `1e3`, `+2.5E-4`; rejects `inf`, `nan`,
// hex and anything with a second dot.
fn is_decimal_literal(text: &str) -> bool {
    let body = strip_sign(text);
    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    if let Some(exponent) = exponent {
        if !is_digits(strip_sign(exponent)) {
            return false;
        }
    }

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    !(whole.is_empty() && fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
}
