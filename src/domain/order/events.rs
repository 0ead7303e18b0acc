use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::OrderStatus;
use crate::primitives::EntityId;

// ============================================================================
// Order Events - Facts Emitted by Order Mutators
// ============================================================================
//
// The order never stores the reason for a status change. Mutators hand back
// a `StatusChange` and the caller decides whether to forward it to the audit
// log.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub order_id: EntityId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    /// The order landed in REFUNDED through a full refund rather than `change_status`
    pub fn is_refund_skip_ahead(&self) -> bool {
        self.to == OrderStatus::Refunded && !self.from.can_transition_to(OrderStatus::Refunded)
    }
}

/// Outcome of `Order::add_refund`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub fully_refunded: bool,
    pub status_change: Option<StatusChange>,
}
