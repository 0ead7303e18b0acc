// ============================================================================
// ERP Order Core
// ============================================================================
//
// Domain-entity layer of a commerce backend: catalogue, customers with a
// credit ledger, and orders with their status machine, payment ledger,
// calculation engine and validator. Collaborators (persistence, order
// numbering, audit) are reached through the traits in `ports`.
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod ports;
pub mod primitives;
pub mod validation;

pub use config::CoreConfig;
pub use domain::{ErrorKind, ServiceError};
pub use primitives::{Clock, EntityId, IdGenerator, Money};
pub use validation::ValidationErrors;
