//! Sift Core - schema-driven filtering of untrusted input
//!
//! Given a list of field definitions (name, type, default, and an optional
//! validity constraint) and a mapping of raw values such as arrive with an
//! HTTP request, a [`Filter`] produces a mapping of the same names to typed,
//! validated values, substituting defaults where input is absent.
//!
//! # Main Components
//!
//! - **Coercion**: Strict conversion of raw text and arrays to canonical types
//! - **Validators**: Named built-in checks and caller-supplied predicates
//! - **Schema**: One-time compilation of field definitions
//! - **Filter**: Per-request defaults, coercion and validation
//! - **Error Handling**: Disjoint error classes using `thiserror`
//!
//! # Example
//!
//! ```
//! use sift_core::{FieldDef, Filter, RawValue, Value};
//! use std::collections::HashMap;
//!
//! let filter = Filter::create(&[
//!     FieldDef::new("location_id")
//!         .with_type("int")
//!         .with_default(7)
//!         .with_validator("positiveInteger"),
//!     FieldDef::new("num_rooms")
//!         .with_type("int")
//!         .with_valid_values([0, 1, 2, 3]),
//!     FieldDef::new("show_retirement").with_type("bool"),
//! ])?;
//!
//! let mut input = HashMap::new();
//! input.insert("num_rooms".to_string(), RawValue::from("2"));
//! input.insert("show_retirement".to_string(), RawValue::from("1"));
//!
//! let filtered = filter.filter(&input)?;
//! assert_eq!(filtered.get("location_id"), Some(&Value::Integer(7)));
//! assert_eq!(filtered.get("num_rooms"), Some(&Value::Integer(2)));
//! assert_eq!(filtered.get("show_retirement"), Some(&Value::Boolean(true)));
//! # Ok::<(), sift_core::Error>(())
//! ```
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

pub mod coercion;
pub mod error;
pub mod filter;
pub mod schema;
pub mod validators;
pub mod value;

// Re-export main types for convenience
pub use coercion::{coerce, normalize_type_name};
pub use error::{
    DefinitionError, Error, Result, SchemaError, TypeConversionError, UnsupportedInput,
    UnsupportedType, ValidatorError,
};
pub use filter::{Filter, Filtered, InputSource};
pub use schema::{CompiledField, FieldDef, Schema};
pub use validators::{Predicate, ValidatorRef, ValidatorRegistry};
pub use value::{CanonicalType, RawValue, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_filter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Filter>();
        assert_send_sync::<Error>();
    }
}
