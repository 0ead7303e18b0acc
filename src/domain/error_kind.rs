use serde::{Deserialize, Serialize};

// ============================================================================
// Error Taxonomy
// ============================================================================
//
// Every aggregate has its own error enum; all of them map onto one of these
// kinds so callers can react without matching on each enum.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// One or more invariants violated
    Validation,
    /// Illegal status change
    InvalidTransition,
    /// Payment would exceed the outstanding amount
    ExceedsBalance,
    /// Refund would exceed the paid amount
    ExceedsPaid,
    /// Credit request beyond what is available
    InsufficientCredit,
    /// Ship/return or stock change would cross a quantity bound
    QuantityBound,
    /// Non-positive amount, bad quantity, nil id
    Argument,
}
