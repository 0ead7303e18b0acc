// ============================================================================
// Ports - Collaborator Contracts
// ============================================================================
//
// Interfaces the core needs from the outside world, each with an in-memory
// adapter for tests and the demo binary:
// - Repository (generic CRUD + list/count with filters and pagination)
// - Order number sequence
// - Audit log for status changes
//
// ============================================================================

pub mod audit;
pub mod in_memory;
pub mod repository;
pub mod sequence;

// Re-export for convenience
pub use audit::*;
pub use in_memory::*;
pub use repository::*;
pub use sequence::*;
