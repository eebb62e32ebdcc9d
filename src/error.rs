//! Error taxonomy for validation and registry operations.
//!
//! Validation reports every violated constraint at once; registry operations
//! fail with a single specific reason. I/O boundaries wrap these in
//! `anyhow::Error`, so callers can still `downcast_ref` to the typed variants.

use crate::catalog::identity::{EntryName, Field};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("record must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("missing required field '{field}'")]
    Missing { field: Field },

    #[error("field '{field}' must be {expected}, got {found}")]
    WrongType {
        field: Field,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}' item {index} must be a string, got {found}")]
    WrongElementType {
        field: Field,
        index: usize,
        found: &'static str,
    },

    #[error("field '{field}' must not be empty")]
    EmptyString { field: Field },

    #[error("field 'url' is not a well-formed absolute URL ({value}): {reason}")]
    MalformedUrl { value: String, reason: String },

    #[error("field 'url' must use http or https, got '{scheme}'")]
    UnsupportedScheme { scheme: String },

    #[error("field '{field}' item {index} is empty")]
    EmptyStringInSet { field: Field, index: usize },

    #[error("field '{field}' must contain at least {min_items} value(s)")]
    EmptySet { field: Field, min_items: usize },

    #[error("unknown field '{key}'")]
    UnknownField { key: String },
}

impl ValidationError {
    /// Field the violation refers to, when it refers to a known one.
    pub fn field(&self) -> Option<Field> {
        match self {
            ValidationError::Missing { field }
            | ValidationError::WrongType { field, .. }
            | ValidationError::WrongElementType { field, .. }
            | ValidationError::EmptyString { field }
            | ValidationError::EmptyStringInSet { field, .. }
            | ValidationError::EmptySet { field, .. } => Some(*field),
            ValidationError::MalformedUrl { .. } | ValidationError::UnsupportedScheme { .. } => {
                Some(Field::Url)
            }
            ValidationError::NotAnObject { .. } | ValidationError::UnknownField { .. } => None,
        }
    }
}

/// Complete, non-empty list of violations for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// True when any violation is a `Missing` for `field`.
    pub fn reports_missing(&self, field: Field) -> bool {
        self.0
            .iter()
            .any(|err| matches!(err, ValidationError::Missing { field: f } if *f == field))
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{} violation(s): {joined}", self.0.len())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Failure of a single registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("entry '{0}' is already registered")]
    DuplicateName(EntryName),

    #[error("entry '{0}' not found")]
    NotFound(String),
}

/// Every invalid record found while loading a document.
///
/// `location` names the record: its zero-based position within a document,
/// its NDJSON line, or the directory it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordErrors(pub Vec<RecordError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub location: String,
    pub errors: ValidationErrors,
}

impl fmt::Display for RecordErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid record(s):", self.0.len())?;
        for record in &self.0 {
            write!(f, "\n  {}: {}", record.location, record.errors)?;
        }
        Ok(())
    }
}

impl std::error::Error for RecordErrors {}
