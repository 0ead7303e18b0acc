use regex::Regex;
use rust_decimal::Decimal;

use super::ValidationErrors;
use crate::primitives::{EntityId, Money};

// ============================================================================
// Reusable Field Checks
// ============================================================================

/// Non-blank and at most `max` characters
pub fn required_text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, "is required");
    } else if value.chars().count() > max {
        errors.add(field, format!("must be at most {} characters", max));
    }
}

/// At most `max` characters when present
pub fn optional_text(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.add(field, format!("must be at most {} characters", max));
        }
    }
}

pub fn matches_pattern(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    pattern: &Regex,
    message: &str,
) {
    if !pattern.is_match(value) {
        errors.add(field, message);
    }
}

/// Pattern check that only applies when a non-empty value is present
pub fn optional_pattern(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    pattern: &Regex,
    message: &str,
) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        matches_pattern(errors, field, v, pattern, message);
    }
}

pub fn non_nil(errors: &mut ValidationErrors, field: &str, id: EntityId) {
    if id.is_nil() {
        errors.add(field, "must not be nil");
    }
}

pub fn non_negative(errors: &mut ValidationErrors, field: &str, amount: Money) {
    if amount.is_negative() {
        errors.add(field, "must not be negative");
    }
}

/// `min <= amount <= max`
pub fn money_within(errors: &mut ValidationErrors, field: &str, amount: Money, min: Money, max: Money) {
    if amount < min {
        errors.add(field, format!("must be at least {}", min));
    } else if amount > max {
        errors.add(field, format!("must not exceed {}", max));
    }
}

/// Rate expressed as a percentage in `[0, 100]`
pub fn percentage(errors: &mut ValidationErrors, field: &str, rate: Decimal) {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        errors.add(field, "must be between 0 and 100");
    }
}

/// Non-negative, finite measurement bounded by `max`
pub fn measurement(errors: &mut ValidationErrors, field: &str, value: f64, max: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.add(field, "must be a non-negative number");
    } else if value > max {
        errors.add(field, format!("must not exceed {}", max));
    }
}
