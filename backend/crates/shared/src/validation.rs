//! Field-level validation
//!
//! Entities validate themselves through explicit functions that collect
//! every violation instead of stopping at the first one.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} has an invalid format")]
    InvalidFormat { field: &'static str },

    #[error("{field} must contain at least one item")]
    Empty { field: &'static str },
}

impl Violation {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Violation::Required { field }
            | Violation::TooShort { field, .. }
            | Violation::TooLong { field, .. }
            | Violation::InvalidFormat { field }
            | Violation::Empty { field } => field,
        }
    }
}

/// Aggregated list of violations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Whether any violation concerns `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field() == field)
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Check a required, length-bounded text field
    pub fn check_text(&mut self, field: &'static str, value: &str, max: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(Violation::Required { field });
        } else if trimmed.chars().count() > max {
            self.push(Violation::TooLong { field, max });
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Violation> for ValidationErrors {
    fn from(violation: Violation) -> Self {
        Self(vec![violation])
    }
}
