// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Errors
// - Entities with their invariant validators
// - Commands and command handler (order, customer)
//
// Entities are plain synchronous values: they never log and never touch
// a collaborator. Command handlers do both.
//
// ============================================================================

pub mod catalog;
pub mod customer;
pub mod error_kind;
pub mod order;
pub mod service_error;

// Re-export for convenience
pub use error_kind::ErrorKind;
pub use service_error::ServiceError;
