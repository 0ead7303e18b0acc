use crate::domain::error_kind::ErrorKind;
use crate::primitives::EntityId;
use crate::validation::ValidationErrors;

// ============================================================================
// Catalog Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("Category {0} cannot be its own parent")]
    SelfParent(EntityId),

    #[error("Category {category} cannot move under its own descendant {parent}")]
    CyclicParent { category: EntityId, parent: EntityId },

    #[error("Category depth limit of {max} levels reached")]
    DepthLimit { max: u32 },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) | CatalogError::DepthLimit { .. } => ErrorKind::Validation,
            CatalogError::InsufficientStock { .. } => ErrorKind::QuantityBound,
            CatalogError::InvalidArgument(_)
            | CatalogError::SelfParent(_)
            | CatalogError::CyclicParent { .. } => ErrorKind::Argument,
        }
    }
}
