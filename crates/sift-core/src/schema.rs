//! Field definitions and their compilation into an immutable schema
//!
//! A [`FieldDef`] is what a caller writes: every attribute but `name` is
//! optional. Compiling a list of them resolves each type name to its
//! canonical type and each default to a value of that type, producing a
//! [`Schema`] that a filter holds for its whole lifetime. The caller's
//! definitions are never modified.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::error::{DefinitionError, SchemaError};
use crate::validators::{ValidatorRef, ValidatorRegistry};
use crate::value::{CanonicalType, Value};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

/// Keys every definition must carry
pub const REQUIRED_KEYS: [&str; 1] = ["name"];

/// A field definition as supplied by the caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    #[serde(default)]
    pub name: Option<String>,

    /// Type name; `string` when absent
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,

    /// `Some(Value::Null)` is an explicit null default, `None` means absent
    #[serde(default, deserialize_with = "explicit_value")]
    pub default: Option<Value>,

    #[serde(default)]
    pub validator: Option<ValidatorRef>,

    /// Takes precedence over `validator` when both are present
    #[serde(default, rename = "validValues")]
    pub valid_values: Option<Vec<Value>>,
}

fn explicit_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FieldDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_null_default(mut self) -> Self {
        self.default = Some(Value::Null);
        self
    }

    pub fn with_validator(mut self, validator: impl Into<ValidatorRef>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    pub fn with_valid_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.valid_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .into_iter()
            .filter(|key| match *key {
                "name" => self.name.is_none(),
                _ => false,
            })
            .collect()
    }
}

/// A validated, normalized field definition
#[derive(Debug, Clone)]
pub struct CompiledField {
    name: String,
    kind: CanonicalType,
    default: Value,
    valid_values: Option<Vec<Value>>,
    validator: Option<ValidatorRef>,
}

impl CompiledField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CanonicalType {
        self.kind
    }

    /// Either null or a value of [`kind`](Self::kind)
    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn valid_values(&self) -> Option<&[Value]> {
        self.valid_values.as_deref()
    }

    pub fn validator(&self) -> Option<&ValidatorRef> {
        self.validator.as_ref()
    }
}

/// An ordered, non-empty list of compiled field definitions
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<CompiledField>,
}

impl Schema {
    /// Compile raw definitions, checking named validators against `validators`
    ///
    /// Only validators that can run are checked: a field with `validValues`
    /// or of type `array` never consults its validator.
    pub fn compile(defs: &[FieldDef], validators: &ValidatorRegistry) -> Result<Self, SchemaError> {
        if defs.is_empty() {
            return Err(SchemaError::NoDefinitions);
        }

        let mut seen = HashSet::with_capacity(defs.len());
        let fields = defs
            .iter()
            .enumerate()
            .map(|(index, def)| compile_definition(index, def, validators, &mut seen))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Compiled schema with {} field(s)", fields.len());

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a compiled schema
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a CompiledField;
    type IntoIter = std::slice::Iter<'a, CompiledField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn compile_definition(
    index: usize,
    def: &FieldDef,
    validators: &ValidatorRegistry,
    seen: &mut HashSet<String>,
) -> Result<CompiledField, SchemaError> {
    let name = match &def.name {
        Some(name) => name.clone(),
        None => {
            return Err(SchemaError::MissingElements {
                index,
                missing: def.missing_keys(),
            })
        }
    };

    if !seen.insert(name.clone()) {
        return Err(SchemaError::invalid(index, DefinitionError::DuplicateName(name)));
    }

    let kind = match &def.type_name {
        Some(type_name) => type_name
            .parse::<CanonicalType>()
            .map_err(|e| SchemaError::invalid(index, e))?,
        None => CanonicalType::String,
    };

    let default = resolve_default(kind, def.default.as_ref())
        .map_err(|e| SchemaError::invalid(index, e))?;

    // A validator shadowed by validValues, or on an array field, never runs
    let validator_runs = def.valid_values.is_none() && kind != CanonicalType::Array;
    if let Some(validator) = def.validator.as_ref().filter(|_| validator_runs) {
        validators
            .check(validator)
            .map_err(|e| SchemaError::invalid(index, e))?;
    }

    Ok(CompiledField {
        name,
        kind,
        default,
        valid_values: def.valid_values.clone(),
        validator: def.validator.clone(),
    })
}

fn resolve_default(kind: CanonicalType, supplied: Option<&Value>) -> Result<Value, DefinitionError> {
    match supplied {
        None => Ok(kind.zero_value()),
        Some(Value::Null) => Ok(Value::Null),
        Some(value) if value.canonical_type() == Some(kind) => Ok(value.clone()),
        Some(value) => Err(DefinitionError::DefaultTypeMismatch {
            expected: kind,
            found: value.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::Predicate;
    use serde_json::json;

    fn compile(defs: &[FieldDef]) -> Result<Schema, SchemaError> {
        Schema::compile(defs, &ValidatorRegistry::new())
    }

    #[test]
    fn test_default_type_is_string() {
        let schema = compile(&[FieldDef::new("foo")]).unwrap();
        let field = &schema.fields()[0];

        assert_eq!(field.name(), "foo");
        assert_eq!(field.kind(), CanonicalType::String);
        assert_eq!(field.default(), &Value::from(""));
    }

    #[test]
    fn test_normalizes_type_names() {
        let schema = compile(&[
            FieldDef::new("foo").with_type("bool"),
            FieldDef::new("bar").with_type("int"),
            FieldDef::new("baz").with_type("float"),
        ])
        .unwrap();

        let kinds: Vec<_> = schema.iter().map(CompiledField::kind).collect();
        assert_eq!(
            kinds,
            vec![CanonicalType::Boolean, CanonicalType::Integer, CanonicalType::Double]
        );
        assert_eq!(schema.get("foo").unwrap().default(), &Value::Boolean(false));
        assert_eq!(schema.get("bar").unwrap().default(), &Value::Integer(0));
        assert_eq!(schema.get("baz").unwrap().default(), &Value::Double(0.0));
    }

    #[test]
    fn test_synthesizes_defaults_for_every_type() {
        let names = ["boolean", "integer", "double", "string", "array"];
        let defs: Vec<_> = names
            .iter()
            .map(|name| FieldDef::new(*name).with_type(*name))
            .collect();
        let schema = compile(&defs).unwrap();

        for field in &schema {
            assert_eq!(field.default(), &field.kind().zero_value());
        }
    }

    #[test]
    fn test_rejects_empty_definitions() {
        assert_eq!(compile(&[]).unwrap_err(), SchemaError::NoDefinitions);
    }

    #[test]
    fn test_rejects_missing_name() {
        let err = compile(&[FieldDef::default().with_type("int")]).unwrap_err();
        assert_eq!(err.to_string(), "Definition [0] is missing elements: `name`");

        let err = compile(&[FieldDef::new("ok"), FieldDef::default()]).unwrap_err();
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn test_rejects_unsupported_types() {
        for name in ["BOOLEAN", "BOOL", "INT", "DOUBLE", "object", "resource", "null"] {
            let err = compile(&[FieldDef::new("foo").with_type(name)]).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Definition [0] is invalid: The output-type `{name}` is not supported")
            );
        }
    }

    #[test]
    fn test_rejects_mismatched_default() {
        let err = compile(&[FieldDef::new("a_number").with_default(123)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Definition [0] is invalid: The type of the default value must be string|null"
        );

        let err = compile(&[FieldDef::new("n").with_type("float").with_default(1)]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidDefinition {
                index: 0,
                cause: DefinitionError::DefaultTypeMismatch {
                    expected: CanonicalType::Double,
                    found: "integer"
                }
            }
        ));
    }

    #[test]
    fn test_accepts_null_and_matching_defaults() {
        let schema = compile(&[
            FieldDef::new("a").with_type("bool").with_null_default(),
            FieldDef::new("b").with_type("int").with_default(999),
            FieldDef::new("c").with_type("array").with_default(vec!["something"]),
        ])
        .unwrap();

        assert_eq!(schema.get("a").unwrap().default(), &Value::Null);
        assert_eq!(schema.get("b").unwrap().default(), &Value::Integer(999));
        assert_eq!(
            schema.get("c").unwrap().default(),
            &Value::from(vec!["something"])
        );
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = compile(&[FieldDef::new("x"), FieldDef::new("y"), FieldDef::new("x")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Definition [2] is invalid: The name `x` is already defined"
        );
    }

    #[test]
    fn test_rejects_unknown_validator_names_early() {
        let err = compile(&[FieldDef::new("n").with_validator("noSuchCheck")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Definition [0] is invalid: The validator, `noSuchCheck`, cannot be invoked"
        );

        let schema = compile(&[
            FieldDef::new("n").with_validator(Predicate::new(|_| true)),
        ]);
        assert!(schema.is_ok());
    }

    #[test]
    fn test_unreachable_validators_are_not_resolved() {
        let schema = compile(&[
            FieldDef::new("list")
                .with_type("array")
                .with_validator("noSuchCheck"),
            FieldDef::new("choice")
                .with_valid_values(["a"])
                .with_validator("noSuchCheck"),
        ])
        .unwrap();

        assert_eq!(
            schema.get("choice").and_then(|f| f.validator()).and_then(ValidatorRef::name),
            Some("noSuchCheck")
        );
    }

    #[test]
    fn test_deserialize_definitions() {
        let defs: Vec<FieldDef> = serde_json::from_value(json!([
            {"name": "n", "type": "int", "default": 7, "validator": "positiveInteger"},
            {"name": "x", "validValues": ["a", "b"]},
            {"name": "z", "type": "bool", "default": null}
        ]))
        .unwrap();

        assert_eq!(defs[0].default, Some(Value::Integer(7)));
        assert_eq!(defs[0].validator.as_ref().and_then(ValidatorRef::name), Some("positiveInteger"));
        assert_eq!(defs[1].default, None);
        assert_eq!(defs[1].valid_values, Some(vec![Value::from("a"), Value::from("b")]));
        assert_eq!(defs[2].default, Some(Value::Null));

        let schema = compile(&defs).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.get("z").unwrap().default(), &Value::Null);
    }

    #[test]
    fn test_deserialize_rejects_unknown_keys() {
        let result = serde_json::from_value::<FieldDef>(json!({"name": "n", "valid_values": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_compile_leaves_definitions_untouched() {
        let defs = vec![FieldDef::new("n").with_type("int")];
        let _ = compile(&defs).unwrap();

        assert_eq!(defs[0].type_name.as_deref(), Some("int"));
        assert_eq!(defs[0].default, None);
    }
}
