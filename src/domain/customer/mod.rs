// ============================================================================
// Customer Domain - Profile and Credit Ledger
// ============================================================================
//
// This module contains ALL Customer-specific code:
// - Value objects (CustomerType, CustomerSource)
// - Commands (UseCredit, ReleaseCredit, ...)
// - Errors (CustomerError enum)
// - Aggregate (Customer with its credit ledger)
// - Command Handler (CustomerCommandHandler)
//
// ============================================================================

pub mod aggregate;
pub mod command_handler;
pub mod commands;
pub mod errors;
pub mod value_objects;

// Re-export for convenience
pub use aggregate::*;
pub use command_handler::*;
pub use commands::*;
pub use errors::*;
pub use value_objects::*;
