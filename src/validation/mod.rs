// ============================================================================
// Validation - Field Error Collection and Reusable Checks
// ============================================================================
//
// Validators are pure: they read an entity and push field errors into a
// `ValidationErrors` accumulator. Entities turn a non-empty accumulator into
// their own error type at the end of `validate()`.
//
// ============================================================================

pub mod patterns;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single violated invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found by one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Push `message` for `field` when `condition` does not hold
    pub fn ensure(&mut self, condition: bool, field: &str, message: impl Into<String>) {
        if !condition {
            self.add(field, message);
        }
    }

    /// Merge errors from a nested value, prefixing their field names
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for e in other.errors {
            self.add(format!("{}.{}", prefix, e.field), e.message);
        }
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_errors_are_joined() {
        let mut errors = ValidationErrors::new();
        errors.add("sku", "must not be empty");
        errors.ensure(false, "price", "must be greater than zero");
        errors.ensure(true, "cost", "never recorded");

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.has_field("price"));
        assert!(!err.has_field("cost"));
        assert_eq!(
            err.to_string(),
            "validation failed: sku: must not be empty; price: must be greater than zero"
        );
    }

    #[test]
    fn test_merge_prefixed() {
        let mut inner = ValidationErrors::new();
        inner.add("quantity", "out of range");

        let mut outer = ValidationErrors::new();
        outer.merge_prefixed("items[0]", inner);
        assert!(outer.has_field("items[0].quantity"));
    }
}
