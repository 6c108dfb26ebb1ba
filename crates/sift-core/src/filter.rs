//! The filter engine: defaults, coercion and validation per field
//!
//! For every compiled field, in schema order: absent input yields the
//! compiled default untouched; present input is converted to the field's
//! type and then checked against `validValues` (which wins) or the
//! validator. The first failure aborts the whole call.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::coercion::{coerce, UNSUPPORTED};
use crate::error::{Error, Result, TypeConversionError};
use crate::schema::{CompiledField, FieldDef, Schema};
use crate::validators::ValidatorRegistry;
use crate::value::{CanonicalType, RawValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Somewhere raw input can be looked up by field name
pub trait InputSource {
    fn lookup(&self, name: &str) -> Option<&RawValue>;
}

impl<S: BuildHasher> InputSource for HashMap<String, RawValue, S> {
    fn lookup(&self, name: &str) -> Option<&RawValue> {
        self.get(name)
    }
}

impl InputSource for BTreeMap<String, RawValue> {
    fn lookup(&self, name: &str) -> Option<&RawValue> {
        self.get(name)
    }
}

impl<T: InputSource + ?Sized> InputSource for &T {
    fn lookup(&self, name: &str) -> Option<&RawValue> {
        (**self).lookup(name)
    }
}

/// Filtered output: one entry per schema field, in schema order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filtered {
    entries: Vec<(String, Value)>,
}

impl Filtered {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.clone().into()))
                .collect(),
        )
    }

    fn push(&mut self, name: &str, value: Value) {
        self.entries.push((name.to_string(), value));
    }
}

impl IntoIterator for Filtered {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Filtered {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A compiled schema plus the validators its fields may name
///
/// Filtering never mutates the filter, so one instance can serve many
/// callers and threads at once.
#[derive(Debug, Clone)]
pub struct Filter {
    schema: Schema,
    validators: ValidatorRegistry,
}

impl Filter {
    /// Compile `defs` against `validators`
    pub fn new(defs: &[FieldDef], validators: ValidatorRegistry) -> Result<Self> {
        let schema = Schema::compile(defs, &validators)?;
        Ok(Self { schema, validators })
    }

    /// Compile `defs` against the built-in validators
    pub fn create(defs: &[FieldDef]) -> Result<Self> {
        Self::new(defs, ValidatorRegistry::new())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Filter raw input; keys not named by the schema are ignored
    pub fn filter<I: InputSource + ?Sized>(&self, input: &I) -> Result<Filtered> {
        self.filter_with(|field| {
            input
                .lookup(field.name())
                .map(|raw| coerce(raw, field.kind()))
        })
    }

    /// Filter a decoded JSON object
    ///
    /// Array fields take any JSON array as is. Other fields take strings
    /// and arrays of strings; numbers, booleans, null and objects fail
    /// conversion like any other unconvertible input.
    pub fn filter_json(&self, input: &serde_json::Map<String, serde_json::Value>) -> Result<Filtered> {
        self.filter_with(|field| {
            input
                .get(field.name())
                .map(|json| convert_json(json, field.kind()))
        })
    }

    // `convert` yields None for absent input, otherwise the converted value
    fn filter_with<F>(&self, mut convert: F) -> Result<Filtered>
    where
        F: FnMut(&CompiledField) -> Option<std::result::Result<Value, TypeConversionError>>,
    {
        let mut filtered = Filtered::default();

        for field in &self.schema {
            let value = match convert(field) {
                Some(converted) => {
                    let value = converted.map_err(|e| e.for_field(field.name()))?;
                    self.accept(field, value)?
                }
                None => self.default_for(field),
            };
            filtered.push(field.name(), value);
        }

        Ok(filtered)
    }

    fn default_for(&self, field: &CompiledField) -> Value {
        log::trace!("Field `{}` absent; using its default", field.name());
        field.default().clone()
    }

    fn accept(&self, field: &CompiledField, value: Value) -> Result<Value> {
        // Arrays are accepted without consulting validValues or the validator
        if field.kind() == CanonicalType::Array {
            log::trace!("Field `{}` accepted as an array", field.name());
            return Ok(value);
        }

        if !self.is_acceptable(field, &value)? {
            return Err(Error::ValueInvalid {
                field: field.name().to_string(),
            });
        }

        log::trace!("Field `{}` accepted", field.name());
        Ok(value)
    }

    fn is_acceptable(&self, field: &CompiledField, value: &Value) -> Result<bool> {
        if let Some(valid_values) = field.valid_values() {
            return Ok(valid_values.contains(value));
        }

        match field.validator() {
            Some(validator) => Ok(self.validators.invoke(validator, value)?),
            None => Ok(true),
        }
    }
}

fn convert_json(
    json: &serde_json::Value,
    target: CanonicalType,
) -> std::result::Result<Value, TypeConversionError> {
    match (target, json) {
        // Elements are kept as they are; only objects have no `Value` form
        (CanonicalType::Array, serde_json::Value::Array(_)) => {
            serde_json::from_value::<Value>(json.clone())
                .map_err(|_| TypeConversionError::new(UNSUPPORTED, target))
        }
        _ => {
            let raw = RawValue::try_from(json)
                .map_err(|e| TypeConversionError::new(e.rendered, target))?;
            coerce(&raw, target)
        }
    }
}
