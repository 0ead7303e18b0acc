use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ============================================================================
// Order Value Objects
// ============================================================================
//
// Closed enumerations; the upper-case tokens are used for serialization only.
//
// ============================================================================

/// Lifecycle status of an order. Legal moves live in `status::allowed_transitions`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Draft,
    Pending,
    Confirmed,
    Processing,
    PartiallyShipped,
    Shipped,
    Delivered,
    OnHold,
    Cancelled,
    Returned,
    Refunded,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    Standard,
    Rush,
    Wholesale,
    Preorder,
    Backorder,
    Sample,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
    Refunded,
    Failed,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Overnight,
    Ground,
    Freight,
    Pickup,
    Digital,
}

/// Fulfilment status of a single order line
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Ordered,
    PartiallyShipped,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressType {
    #[default]
    Shipping,
    Billing,
    Both,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_order_status_tokens() {
        assert_eq!(OrderStatus::PartiallyShipped.to_string(), "PARTIALLY_SHIPPED");
        assert_eq!(OrderStatus::OnHold.to_string(), "ON_HOLD");
        assert_eq!(OrderStatus::from_str("REFUNDED").unwrap(), OrderStatus::Refunded);
        assert!(OrderStatus::from_str("Shipped").is_err());
    }

    #[test]
    fn test_all_order_statuses_round_trip() {
        for status in OrderStatus::iter() {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
            let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, deserialized);
        }
        assert_eq!(OrderStatus::iter().count(), 11);
    }

    #[test]
    fn test_other_tokens() {
        assert_eq!(PaymentStatus::PartiallyPaid.to_string(), "PARTIALLY_PAID");
        assert_eq!(ShippingMethod::Digital.to_string(), "DIGITAL");
        assert_eq!(ItemStatus::PartiallyShipped.to_string(), "PARTIALLY_SHIPPED");
        assert_eq!(AddressType::Both.to_string(), "BOTH");
        assert_eq!(OrderPriority::Urgent.to_string(), "URGENT");
        assert_eq!(OrderType::Preorder.to_string(), "PREORDER");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Draft);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(OrderPriority::default(), OrderPriority::Normal);
        assert_eq!(ItemStatus::default(), ItemStatus::Ordered);
    }
}
