// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderStatus, PaymentStatus, ItemStatus, ...)
// - Status machine (transition table, terminal set)
// - Entities (Order, OrderItem, OrderAddress)
// - Calculation engine and whole-order validator
// - Events (StatusChange), Commands, Errors
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod address;
pub mod aggregate;
pub mod calculation;
pub mod command_handler;
pub mod commands;
pub mod errors;
pub mod events;
pub mod item;
pub mod number;
pub mod status;
pub mod validator;
pub mod value_objects;

// Re-export for convenience
pub use address::*;
pub use aggregate::*;
pub use calculation::*;
pub use command_handler::*;
pub use commands::*;
pub use errors::*;
pub use events::*;
pub use item::*;
pub use number::*;
pub use status::*;
pub use validator::*;
pub use value_objects::*;
