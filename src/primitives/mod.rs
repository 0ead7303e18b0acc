// ============================================================================
// Primitives - Money, Identifiers, Clock
// ============================================================================
//
// Leaf building blocks shared by every entity. No domain rules live here.
//
// ============================================================================

pub mod clock;
pub mod id;
pub mod money;

pub use clock::{Clock, FixedClock, SystemClock};
pub use id::{EntityId, IdGenerator, RandomIds, TimeOrderedIds};
pub use money::Money;
