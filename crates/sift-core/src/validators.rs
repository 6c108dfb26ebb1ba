//! Validator registry: named built-in checks and caller-supplied predicates
//!
//! Named validators are looked up by exact name in an explicit table that
//! starts out holding the built-ins. The registry's dispatch entry point is
//! never resolvable as a validator name.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::error::ValidatorError;
use crate::value::Value;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Name of the registry's dispatch entry point; reserved
pub const DISPATCH_NAME: &str = "invokeValidator";

/// Name of the built-in positive-integer check
pub const POSITIVE_INTEGER: &str = "positiveInteger";

/// Name of the built-in non-negative-integer check
pub const NON_NEGATIVE_INTEGER: &str = "nonNegativeInteger";

/// Integer greater than zero
pub fn positive_integer(value: &Value) -> bool {
    matches!(value, Value::Integer(n) if *n > 0)
}

/// Integer greater than or equal to zero
pub fn non_negative_integer(value: &Value) -> bool {
    positive_integer(value) || matches!(value, Value::Integer(0))
}

type PredicateFn = dyn Fn(&Value) -> Value + Send + Sync;

/// A validity check over a converted value
///
/// Typed predicates return `bool` and cannot break the Boolean contract.
/// Dynamic predicates return a [`Value`], which is checked on every call.
#[derive(Clone)]
pub struct Predicate {
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Create a predicate from a Boolean function
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |value: &Value| Value::Boolean(func(value))),
        }
    }

    /// Create a predicate whose result is only known to be a `Value`
    pub fn dynamic<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Run the predicate, requiring a Boolean result
    pub fn test(&self, name: &str, value: &Value) -> Result<bool, ValidatorError> {
        match (self.func)(value) {
            Value::Boolean(verdict) => Ok(verdict),
            other => Err(ValidatorError::Contract {
                name: name.to_string(),
                returned: other.type_name(),
            }),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// How a field definition refers to its validator
#[derive(Debug, Clone)]
pub enum ValidatorRef {
    /// A name registered in the [`ValidatorRegistry`]
    Named(String),
    /// A predicate supplied directly with the definition
    Custom(Predicate),
}

impl ValidatorRef {
    /// The registry name, for named references
    pub fn name(&self) -> Option<&str> {
        match self {
            ValidatorRef::Named(name) => Some(name),
            ValidatorRef::Custom(_) => None,
        }
    }
}

impl From<&str> for ValidatorRef {
    fn from(name: &str) -> Self {
        ValidatorRef::Named(name.to_string())
    }
}

impl From<String> for ValidatorRef {
    fn from(name: String) -> Self {
        ValidatorRef::Named(name)
    }
}

impl From<Predicate> for ValidatorRef {
    fn from(predicate: Predicate) -> Self {
        ValidatorRef::Custom(predicate)
    }
}

// Serialized definitions can only name validators
impl<'de> Deserialize<'de> for ValidatorRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(ValidatorRef::Named)
    }
}

/// Table of named validators
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    entries: BTreeMap<String, Predicate>,
}

impl ValidatorRegistry {
    /// Create a registry holding the built-in validators
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(POSITIVE_INTEGER.to_string(), Predicate::new(positive_integer));
        entries.insert(
            NON_NEGATIVE_INTEGER.to_string(),
            Predicate::new(non_negative_integer),
        );
        Self { entries }
    }

    /// Add a named validator; existing names are not overwritten
    pub fn register(
        &mut self,
        name: impl Into<String>,
        predicate: Predicate,
    ) -> Result<(), ValidatorError> {
        let name = Self::check_name(name.into())?;

        if self.entries.contains_key(&name) {
            return Err(ValidatorError::Registration {
                name,
                reason: "the name is already registered",
            });
        }

        self.entries.insert(name, predicate);
        Ok(())
    }

    /// Add or overwrite a named validator, returning the one it replaced
    pub fn replace(
        &mut self,
        name: impl Into<String>,
        predicate: Predicate,
    ) -> Result<Option<Predicate>, ValidatorError> {
        let name = Self::check_name(name.into())?;
        Ok(self.entries.insert(name, predicate))
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(
        mut self,
        name: impl Into<String>,
        predicate: Predicate,
    ) -> Result<Self, ValidatorError> {
        self.register(name, predicate)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Registered names, in lexical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Look up a named validator
    pub fn resolve(&self, name: &str) -> Result<&Predicate, ValidatorError> {
        if name == DISPATCH_NAME {
            return Err(Self::unresolved(name));
        }

        self.entries.get(name).ok_or_else(|| Self::unresolved(name))
    }

    /// Confirm that a reference can be invoked, without invoking it
    pub fn check(&self, reference: &ValidatorRef) -> Result<(), ValidatorError> {
        match reference {
            ValidatorRef::Named(name) => self.resolve(name).map(|_| ()),
            ValidatorRef::Custom(_) => Ok(()),
        }
    }

    /// Invoke the referenced validator on a value
    pub fn invoke(&self, reference: &ValidatorRef, value: &Value) -> Result<bool, ValidatorError> {
        match reference {
            ValidatorRef::Named(name) => self.resolve(name)?.test(name, value),
            ValidatorRef::Custom(predicate) => predicate.test("closure", value),
        }
    }

    fn check_name(name: String) -> Result<String, ValidatorError> {
        if name.is_empty() {
            return Err(ValidatorError::Registration {
                name,
                reason: "the name is empty",
            });
        }

        if name == DISPATCH_NAME {
            return Err(ValidatorError::Registration {
                name,
                reason: "the name is reserved",
            });
        }

        Ok(name)
    }

    fn unresolved(name: &str) -> ValidatorError {
        ValidatorError::InvalidReference {
            name: name.to_string(),
        }
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
