use chrono::{DateTime, Utc};

use super::item::NewOrderItem;
use super::value_objects::{OrderPriority, OrderStatus, OrderType, ShippingMethod};
use crate::primitives::{EntityId, Money};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Everything needed to place a new order
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer_id: EntityId,
    pub shipping_address_id: EntityId,
    pub billing_address_id: EntityId,
    pub created_by: EntityId,
    pub priority: OrderPriority,
    pub order_type: OrderType,
    pub shipping_method: ShippingMethod,
    pub currency: String,
    pub required_date: Option<DateTime<Utc>>,
    pub items: Vec<NewOrderItem>,
    /// Falls back to the configured default shipping cost
    pub shipping_amount: Option<Money>,
}

#[derive(Debug, Clone)]
pub enum OrderCommand {
    AddItem {
        item: NewOrderItem,
    },
    RemoveItem {
        item_id: EntityId,
    },
    ChangeStatus {
        status: OrderStatus,
        reason: Option<String>,
    },
    RecordPayment {
        amount: Money,
    },
    RecordRefund {
        amount: Money,
    },
    ShipItem {
        item_id: EntityId,
        quantity: i32,
    },
    ReturnItem {
        item_id: EntityId,
        quantity: i32,
    },
    SetCharges {
        shipping: Money,
        discount: Money,
    },
    SetTracking {
        tracking_number: String,
        carrier: String,
    },
    Approve,
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::AddItem { .. } => "AddItem",
            OrderCommand::RemoveItem { .. } => "RemoveItem",
            OrderCommand::ChangeStatus { .. } => "ChangeStatus",
            OrderCommand::RecordPayment { .. } => "RecordPayment",
            OrderCommand::RecordRefund { .. } => "RecordRefund",
            OrderCommand::ShipItem { .. } => "ShipItem",
            OrderCommand::ReturnItem { .. } => "ReturnItem",
            OrderCommand::SetCharges { .. } => "SetCharges",
            OrderCommand::SetTracking { .. } => "SetTracking",
            OrderCommand::Approve => "Approve",
        }
    }
}
