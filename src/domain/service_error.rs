use crate::domain::catalog::CatalogError;
use crate::domain::customer::CustomerError;
use crate::domain::error_kind::ErrorKind;
use crate::domain::order::{AddressError, OrderError};
use crate::ports::{AuditError, RepositoryError};
use crate::primitives::EntityId;

// ============================================================================
// Command Handler Errors
// ============================================================================
//
// Domain failures keep their taxonomy kind; collaborator failures have none.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Order rule violated: {0}")]
    Order(#[from] OrderError),

    #[error("Customer rule violated: {0}")]
    Customer(#[from] CustomerError),

    #[error("Address rule violated: {0}")]
    Address(#[from] AddressError),

    #[error("Catalog rule violated: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Customer is not active: {0}")]
    InactiveCustomer(EntityId),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Audit log error: {0}")]
    Audit(#[from] AuditError),
}

impl ServiceError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ServiceError::Order(e) => Some(e.kind()),
            ServiceError::Customer(e) => Some(e.kind()),
            ServiceError::Address(e) => Some(e.kind()),
            ServiceError::Catalog(e) => Some(e.kind()),
            ServiceError::InactiveCustomer(_) => Some(ErrorKind::Argument),
            ServiceError::Repository(_) | ServiceError::Audit(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Repository(RepositoryError::NotFound(_)))
    }
}
