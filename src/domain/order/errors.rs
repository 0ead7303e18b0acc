use super::value_objects::{ItemStatus, OrderStatus};
use crate::domain::error_kind::ErrorKind;
use crate::primitives::{EntityId, Money};
use crate::validation::ValidationErrors;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Payment of {amount} exceeds outstanding balance {outstanding}")]
    ExceedsBalance { amount: Money, outstanding: Money },

    #[error("Refund of {amount} exceeds refundable amount {refundable}")]
    ExceedsPaid { amount: Money, refundable: Money },

    #[error("Quantity {requested} exceeds the remaining {available}")]
    QuantityBound { requested: i32, available: i32 },

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(i32),

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Cannot modify order in status: {0}")]
    NotModifiable(OrderStatus),

    #[error("Order item not found: {0}")]
    ItemNotFound(EntityId),

    #[error("Item status {0} does not allow this operation")]
    ItemStatusConflict(ItemStatus),
}

impl OrderError {
    /// Validation error for an amount whose arithmetic leaves the decimal range
    pub(crate) fn out_of_range(field: &str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, "is out of range");
        OrderError::Validation(errors)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::Validation(_) => ErrorKind::Validation,
            OrderError::InvalidTransition { .. }
            | OrderError::NotModifiable(_)
            | OrderError::ItemStatusConflict(_) => ErrorKind::InvalidTransition,
            OrderError::ExceedsBalance { .. } => ErrorKind::ExceedsBalance,
            OrderError::ExceedsPaid { .. } => ErrorKind::ExceedsPaid,
            OrderError::QuantityBound { .. } => ErrorKind::QuantityBound,
            OrderError::NonPositiveAmount(_)
            | OrderError::NonPositiveQuantity(_)
            | OrderError::EmptyItems
            | OrderError::ItemNotFound(_) => ErrorKind::Argument,
        }
    }
}

// ============================================================================
// Order Address Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl AddressError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AddressError::Validation(_) => ErrorKind::Validation,
        }
    }
}
