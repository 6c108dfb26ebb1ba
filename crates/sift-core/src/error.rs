//! Error types for the Sift core library
//!
//! Failures fall into disjoint classes, all fatal to the current call:
//! schema problems found while compiling definitions, input that cannot be
//! converted to its declared type, converted input that is not acceptable,
//! and validator references or predicates that break their contract.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::value::CanonicalType;
use thiserror::Error;

/// Main error type for Sift operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The field definitions could not be compiled
    #[error(transparent)]
    SchemaInvalid(#[from] SchemaError),

    /// A present input value could not be converted to its field's type
    #[error(transparent)]
    TypeConversionFailed(#[from] TypeConversionError),

    /// A converted value was rejected by `validValues` or its validator
    #[error("The value of `{field}` is invalid")]
    ValueInvalid { field: String },

    /// A validator reference or predicate is broken
    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error points at a programming or configuration defect
    /// rather than at bad end-user input
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::SchemaInvalid(_) | Error::Validator(_))
    }

    /// The name of the field the error concerns, when known
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::ValueInvalid { field } => Some(field),
            Error::TypeConversionFailed(err) => err.field.as_deref(),
            _ => None,
        }
    }
}

/// Raised while compiling a list of field definitions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The definition list is empty
    #[error("There are no defs")]
    NoDefinitions,

    /// A definition lacks required keys
    #[error("Definition [{index}] is missing elements: {}", quote_keys(.missing))]
    MissingElements {
        index: usize,
        missing: Vec<&'static str>,
    },

    /// A definition is present but unusable
    #[error("Definition [{index}] is invalid: {cause}")]
    InvalidDefinition {
        index: usize,
        #[source]
        cause: DefinitionError,
    },
}

impl SchemaError {
    /// Zero-based position of the offending definition, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            SchemaError::NoDefinitions => None,
            SchemaError::MissingElements { index, .. } => Some(*index),
            SchemaError::InvalidDefinition { index, .. } => Some(*index),
        }
    }

    pub(crate) fn invalid(index: usize, cause: impl Into<DefinitionError>) -> Self {
        SchemaError::InvalidDefinition {
            index,
            cause: cause.into(),
        }
    }
}

fn quote_keys(keys: &[&'static str]) -> String {
    keys.iter()
        .map(|key| format!("`{}`", key))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Underlying reason a single definition was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedType),

    #[error("The type of the default value must be {expected}|null")]
    DefaultTypeMismatch {
        expected: CanonicalType,
        found: &'static str,
    },

    #[error("The name `{0}` is already defined")]
    DuplicateName(String),

    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

/// A type name that does not normalize to a canonical type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("The output-type `{name}` is not supported")]
pub struct UnsupportedType {
    pub name: String,
}

/// A present value could not be converted to the target type
///
/// `value` holds a rendering of the offending input rather than the input
/// itself: strings are quoted, arrays and anything else are replaced by a
/// marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Failed to convert the variable, {value}, to {} {target}",
    indefinite_article(.target.name())
)]
pub struct TypeConversionError {
    pub value: String,
    pub target: CanonicalType,
    pub field: Option<String>,
}

impl TypeConversionError {
    pub fn new(value: impl Into<String>, target: CanonicalType) -> Self {
        Self {
            value: value.into(),
            target,
            field: None,
        }
    }

    /// Attach the name of the field whose value failed to convert
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// A value offered as input that is neither a string nor an array
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("The incoming value, {rendered}, is neither a string nor an array")]
pub struct UnsupportedInput {
    pub rendered: String,
}

/// Errors from resolving or invoking validators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// The name does not resolve to an invocable check
    #[error("The validator, `{name}`, cannot be invoked")]
    InvalidReference { name: String },

    /// A predicate returned something other than a Boolean
    #[error("The validator `{name}` returned {returned}, not a Boolean")]
    Contract { name: String, returned: &'static str },

    /// A named predicate could not be added to a registry
    #[error("The validator `{name}` cannot be registered: {reason}")]
    Registration { name: String, reason: &'static str },
}

/// "an" before a, e, i, o, u and h; "a" otherwise
pub fn indefinite_article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u' | 'h') => "an",
        _ => "a",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indefinite_article() {
        assert_eq!(indefinite_article("array"), "an");
        assert_eq!(indefinite_article("integer"), "an");
        assert_eq!(indefinite_article("boolean"), "a");
        assert_eq!(indefinite_article("double"), "a");
        assert_eq!(indefinite_article("string"), "a");
        assert_eq!(indefinite_article("hour"), "an");
        assert_eq!(indefinite_article(""), "a");
    }

    #[test]
    fn test_type_conversion_message() {
        let err = TypeConversionError::new("`\"123\"`", CanonicalType::Array);
        assert_eq!(
            err.to_string(),
            "Failed to convert the variable, `\"123\"`, to an array"
        );

        let err = TypeConversionError::new("[array]", CanonicalType::Boolean);
        assert_eq!(
            err.to_string(),
            "Failed to convert the variable, [array], to a boolean"
        );
    }

    #[test]
    fn test_schema_error_messages() {
        assert_eq!(SchemaError::NoDefinitions.to_string(), "There are no defs");

        let missing = SchemaError::MissingElements {
            index: 0,
            missing: vec!["name"],
        };
        assert_eq!(missing.to_string(), "Definition [0] is missing elements: `name`");
        assert_eq!(missing.index(), Some(0));

        let invalid = SchemaError::invalid(
            3,
            UnsupportedType {
                name: "BOOL".to_string(),
            },
        );
        assert_eq!(
            invalid.to_string(),
            "Definition [3] is invalid: The output-type `BOOL` is not supported"
        );
        assert_eq!(invalid.index(), Some(3));
    }

    #[test]
    fn test_default_mismatch_message() {
        let err = SchemaError::invalid(
            0,
            DefinitionError::DefaultTypeMismatch {
                expected: CanonicalType::String,
                found: "integer",
            },
        );
        assert_eq!(
            err.to_string(),
            "Definition [0] is invalid: The type of the default value must be string|null"
        );
    }

    #[test]
    fn test_error_classification() {
        let schema: Error = SchemaError::NoDefinitions.into();
        assert!(schema.is_defect());

        let reference: Error = ValidatorError::InvalidReference {
            name: "nope".to_string(),
        }
        .into();
        assert!(reference.is_defect());

        let invalid = Error::ValueInvalid {
            field: "n".to_string(),
        };
        assert!(!invalid.is_defect());
        assert_eq!(invalid.field(), Some("n"));
        assert_eq!(invalid.to_string(), "The value of `n` is invalid");

        let conversion: Error = TypeConversionError::new("`\"x\"`", CanonicalType::Integer)
            .for_field("d")
            .into();
        assert!(!conversion.is_defect());
        assert_eq!(conversion.field(), Some("d"));
    }
}
