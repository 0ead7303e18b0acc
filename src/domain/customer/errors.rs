use crate::domain::error_kind::ErrorKind;
use crate::primitives::Money;
use crate::validation::ValidationErrors;

// ============================================================================
// Customer Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    #[error("Insufficient credit: requested {requested}, available {available}")]
    InsufficientCredit { requested: Money, available: Money },

    #[error("Cannot release {requested}: only {used} credit is in use")]
    ReleaseExceedsUsed { requested: Money, used: Money },

    #[error("Credit limit {limit} is below credit in use {used}")]
    LimitBelowUsage { limit: Money, used: Money },
}

impl CustomerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CustomerError::Validation(_) | CustomerError::LimitBelowUsage { .. } => ErrorKind::Validation,
            CustomerError::NonPositiveAmount(_) | CustomerError::ReleaseExceedsUsed { .. } => ErrorKind::Argument,
            CustomerError::InsufficientCredit { .. } => ErrorKind::InsufficientCredit,
        }
    }
}
