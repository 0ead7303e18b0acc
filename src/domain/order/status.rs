use super::value_objects::OrderStatus;

// ============================================================================
// Order Status State Machine
// ============================================================================
//
// The single authoritative definition of which status changes are legal.
// `Order::change_status` and the order validator both consult this table.
//
//   DRAFT             -> PENDING, CANCELLED
//   PENDING           -> CONFIRMED, CANCELLED, ON_HOLD
//   CONFIRMED         -> PROCESSING, CANCELLED, ON_HOLD
//   PROCESSING        -> SHIPPED, PARTIALLY_SHIPPED, CANCELLED, ON_HOLD
//   PARTIALLY_SHIPPED -> SHIPPED, PROCESSING, CANCELLED, ON_HOLD
//   SHIPPED           -> DELIVERED, RETURNED, ON_HOLD
//   DELIVERED         -> RETURNED, REFUNDED
//   ON_HOLD           -> PENDING, CONFIRMED, PROCESSING, CANCELLED
//   CANCELLED         -> REFUNDED
//   RETURNED          -> REFUNDED
//   REFUNDED          -> (none)
//
// ============================================================================

use OrderStatus::*;

/// Statuses after which fulfilment is over: no cancellation, no edits.
pub const TERMINAL_STATUSES: [OrderStatus; 3] = [Delivered, Cancelled, Refunded];

/// Allowed successors of `from`
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        Draft => &[Pending, Cancelled],
        Pending => &[Confirmed, Cancelled, OnHold],
        Confirmed => &[Processing, Cancelled, OnHold],
        Processing => &[Shipped, PartiallyShipped, Cancelled, OnHold],
        PartiallyShipped => &[Shipped, Processing, Cancelled, OnHold],
        Shipped => &[Delivered, Returned, OnHold],
        Delivered => &[Returned, Refunded],
        OnHold => &[Pending, Confirmed, Processing, Cancelled],
        Cancelled => &[Refunded],
        Returned => &[Refunded],
        Refunded => &[],
    }
}

pub fn is_valid(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// No outgoing transitions at all
pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_transitions(status).is_empty()
}

pub fn terminal_statuses() -> &'static [OrderStatus] {
    &TERMINAL_STATUSES
}

impl OrderStatus {
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        is_valid(self, to)
    }

    pub fn allowed_next(self) -> &'static [OrderStatus] {
        allowed_transitions(self)
    }

    pub fn is_terminal(self) -> bool {
        is_terminal(self)
    }

    /// Member of `TERMINAL_STATUSES`
    pub fn is_closed(self) -> bool {
        TERMINAL_STATUSES.contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_happy_path_is_legal() {
        let path = [Draft, Pending, Confirmed, Processing, PartiallyShipped, Shipped, Delivered, Returned, Refunded];
        for pair in path.windows(2) {
            assert!(is_valid(pair[0], pair[1]), "{} -> {} should be legal", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_jumps() {
        assert!(!is_valid(Draft, Shipped));
        assert!(!is_valid(Pending, Delivered));
        assert!(!is_valid(Shipped, Cancelled));
        assert!(!is_valid(Delivered, Cancelled));
        assert!(!is_valid(Refunded, Pending));
    }

    #[test]
    fn test_no_self_transitions() {
        for status in OrderStatus::iter() {
            assert!(!is_valid(status, status), "{} -> itself should be illegal", status);
        }
    }

    #[test]
    fn test_terminal_by_table() {
        let terminal: Vec<_> = OrderStatus::iter().filter(|s| is_terminal(*s)).collect();
        assert_eq!(terminal, vec![Refunded]);
    }

    #[test]
    fn test_closed_set() {
        assert_eq!(terminal_statuses(), &[Delivered, Cancelled, Refunded]);
        assert!(Delivered.is_closed());
        assert!(!Delivered.is_terminal());
        assert!(Refunded.is_closed() && Refunded.is_terminal());
        assert!(!Shipped.is_closed());
    }

    #[test]
    fn test_on_hold_can_resume() {
        for next in [Pending, Confirmed, Processing, Cancelled] {
            assert!(OnHold.can_transition_to(next));
        }
        assert!(!OnHold.can_transition_to(Shipped));
    }
}
