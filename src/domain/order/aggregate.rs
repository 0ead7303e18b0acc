use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calculation::OrderCalculation;
use super::errors::OrderError;
use super::events::{RefundOutcome, StatusChange};
use super::item::OrderItem;
use super::value_objects::{OrderPriority, OrderStatus, OrderType, PaymentStatus, ShippingMethod};
use crate::primitives::{Clock, EntityId, IdGenerator, Money};
use crate::validation::{patterns, rules, ValidationErrors};

// ============================================================================
// Order Aggregate - Status Machine, Payment Ledger, Totals
// ============================================================================
//
// Invariants held after every successful mutator:
//
//   total_amount == subtotal + tax_amount + shipping_amount − discount_amount
//   0 <= paid_amount <= total_amount
//   0 <= refunded_amount <= paid_amount
//
// Every mutator works on a clone and only swaps it in once the clone
// validates, so a failed call leaves the order untouched.
//
// ============================================================================

pub const DEFAULT_ORDER_CURRENCY: &str = "USD";
pub const MAX_NOTES_LENGTH: usize = 2_000;
pub const MAX_TRACKING_NUMBER_LENGTH: usize = 100;
pub const MAX_CARRIER_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: EntityId,
    pub order_number: String,
    pub customer_id: EntityId,

    // Classification
    pub status: OrderStatus,
    pub previous_status: Option<OrderStatus>,
    pub priority: OrderPriority,
    pub order_type: OrderType,
    pub payment_status: PaymentStatus,
    pub shipping_method: ShippingMethod,

    // Money
    pub subtotal: Money,
    pub tax_amount: Money,
    pub shipping_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub refunded_amount: Money,
    pub currency: String,

    // Dates
    pub order_date: DateTime<Utc>,
    pub required_date: Option<DateTime<Utc>>,
    pub shipping_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub cancelled_date: Option<DateTime<Utc>>,

    // Addresses (by id)
    pub shipping_address_id: EntityId,
    pub billing_address_id: EntityId,

    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub customer_notes: Option<String>,

    // Fulfilment
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,

    // Actors
    pub created_by: EntityId,
    pub approved_by: Option<EntityId>,
    pub shipped_by: Option<EntityId>,

    pub items: Vec<OrderItem>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `Order::create`
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_id: EntityId,
    pub shipping_address_id: EntityId,
    pub billing_address_id: EntityId,
    pub created_by: EntityId,
    pub priority: OrderPriority,
    pub order_type: OrderType,
    pub shipping_method: ShippingMethod,
    pub currency: String,
    pub required_date: Option<DateTime<Utc>>,
}

impl Order {
    /// New DRAFT order with no items and zero totals
    pub fn create(new: NewOrder, ids: &dyn IdGenerator, clock: &dyn Clock) -> Result<Self, OrderError> {
        let now = clock.now();
        let order = Self {
            id: ids.next_id(),
            order_number: new.order_number,
            customer_id: new.customer_id,
            status: OrderStatus::Draft,
            previous_status: None,
            priority: new.priority,
            order_type: new.order_type,
            payment_status: PaymentStatus::Pending,
            shipping_method: new.shipping_method,
            subtotal: Money::ZERO,
            tax_amount: Money::ZERO,
            shipping_amount: Money::ZERO,
            discount_amount: Money::ZERO,
            total_amount: Money::ZERO,
            paid_amount: Money::ZERO,
            refunded_amount: Money::ZERO,
            currency: new.currency,
            order_date: now,
            required_date: new.required_date,
            shipping_date: None,
            delivery_date: None,
            cancelled_date: None,
            shipping_address_id: new.shipping_address_id,
            billing_address_id: new.billing_address_id,
            notes: None,
            internal_notes: None,
            customer_notes: None,
            tracking_number: None,
            carrier: None,
            created_by: new.created_by,
            approved_by: None,
            shipped_by: None,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        order.validate(clock)?;
        Ok(order)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    pub fn validate(&self, clock: &dyn Clock) -> Result<(), OrderError> {
        let mut errors = ValidationErrors::new();
        self.collect_errors(clock.now(), &mut errors);
        errors.into_result().map_err(OrderError::from)
    }

    /// Entity-level rules for the order and each of its items
    pub(crate) fn collect_errors(&self, now: DateTime<Utc>, errors: &mut ValidationErrors) {
        rules::non_nil(errors, "id", self.id);
        rules::non_nil(errors, "customer_id", self.customer_id);
        rules::non_nil(errors, "shipping_address_id", self.shipping_address_id);
        rules::non_nil(errors, "billing_address_id", self.billing_address_id);
        rules::non_nil(errors, "created_by", self.created_by);

        rules::matches_pattern(
            errors,
            "order_number",
            &self.order_number,
            &patterns::ORDER_NUMBER,
            "must look like YYYY-NNNNNN",
        );
        rules::matches_pattern(
            errors,
            "currency",
            &self.currency,
            &patterns::CURRENCY_CODE,
            "must be a 3-letter upper-case currency code",
        );

        for (field, amount) in [
            ("subtotal", self.subtotal),
            ("tax_amount", self.tax_amount),
            ("shipping_amount", self.shipping_amount),
            ("discount_amount", self.discount_amount),
            ("total_amount", self.total_amount),
            ("paid_amount", self.paid_amount),
            ("refunded_amount", self.refunded_amount),
        ] {
            rules::non_negative(errors, field, amount);
        }

        match self.expected_total() {
            Some(expected) if expected == self.total_amount => {}
            Some(expected) => errors.add(
                "total_amount",
                format!(
                    "expected {} (subtotal + tax + shipping − discount), found {}",
                    expected, self.total_amount
                ),
            ),
            None => errors.add("total_amount", "is out of range"),
        }
        errors.ensure(self.paid_amount <= self.total_amount, "paid_amount", "must not exceed total_amount");
        errors.ensure(
            self.refunded_amount <= self.paid_amount,
            "refunded_amount",
            "must not exceed paid_amount",
        );

        errors.ensure(self.order_date <= now, "order_date", "must not be in the future");
        for (field, date) in [
            ("required_date", self.required_date),
            ("shipping_date", self.shipping_date),
            ("cancelled_date", self.cancelled_date),
        ] {
            if let Some(date) = date {
                errors.ensure(date >= self.order_date, field, "must not be before order_date");
            }
        }
        if let (Some(shipped), Some(delivered)) = (self.shipping_date, self.delivery_date) {
            errors.ensure(delivered >= shipped, "delivery_date", "must not be before shipping_date");
        }

        rules::optional_text(errors, "notes", self.notes.as_deref(), MAX_NOTES_LENGTH);
        rules::optional_text(errors, "internal_notes", self.internal_notes.as_deref(), MAX_NOTES_LENGTH);
        rules::optional_text(errors, "customer_notes", self.customer_notes.as_deref(), MAX_NOTES_LENGTH);
        rules::optional_text(
            errors,
            "tracking_number",
            self.tracking_number.as_deref(),
            MAX_TRACKING_NUMBER_LENGTH,
        );
        rules::optional_text(errors, "carrier", self.carrier.as_deref(), MAX_CARRIER_LENGTH);

        for (index, item) in self.items.iter().enumerate() {
            let mut item_errors = ValidationErrors::new();
            item.collect_errors(&mut item_errors);
            if item.order_id != self.id {
                item_errors.add("order_id", "does not match the owning order");
            }
            errors.merge_prefixed(&format!("items[{}]", index), item_errors);
        }
    }

    fn expected_total(&self) -> Option<Money> {
        self.subtotal
            .checked_add(self.tax_amount)?
            .checked_add(self.shipping_amount)?
            .checked_sub(self.discount_amount)
    }

    /// Run `change` on a copy and keep it only if the copy still validates
    fn apply<T, F>(&mut self, clock: &dyn Clock, change: F) -> Result<T, OrderError>
    where
        F: FnOnce(&mut Order, DateTime<Utc>) -> Result<T, OrderError>,
    {
        let now = clock.now();
        let mut candidate = self.clone();
        let outcome = change(&mut candidate, now)?;
        candidate.updated_at = now;
        candidate.validate(clock)?;
        *self = candidate;
        Ok(outcome)
    }

    // ========================================================================
    // Status Machine
    // ========================================================================

    pub fn change_status(
        &mut self,
        new_status: OrderStatus,
        reason: Option<String>,
        clock: &dyn Clock,
    ) -> Result<StatusChange, OrderError> {
        let from = self.status;
        if !from.can_transition_to(new_status) {
            return Err(OrderError::InvalidTransition { from, to: new_status });
        }

        let order_id = self.id;
        self.apply(clock, |order, now| {
            order.previous_status = Some(from);
            order.status = new_status;
            match new_status {
                OrderStatus::Cancelled => order.cancelled_date = Some(now),
                OrderStatus::Shipped => order.shipping_date = Some(now),
                OrderStatus::Delivered => order.delivery_date = Some(now),
                _ => {}
            }
            Ok(StatusChange { order_id, from, to: new_status, reason, at: now })
        })
    }

    pub fn can_be_cancelled(&self) -> bool {
        !self.status.is_closed() && !matches!(self.status, OrderStatus::Shipped | OrderStatus::Delivered)
    }

    pub fn can_be_modified(&self) -> bool {
        !self.status.is_closed() && !matches!(self.status, OrderStatus::Shipped | OrderStatus::PartiallyShipped)
    }

    // ========================================================================
    // Payment Ledger
    // ========================================================================

    pub fn outstanding_balance(&self) -> Money {
        self.total_amount - self.paid_amount
    }

    pub fn refundable_amount(&self) -> Money {
        self.paid_amount - self.refunded_amount
    }

    pub fn is_fully_paid(&self) -> bool {
        self.paid_amount == self.total_amount
    }

    pub fn add_payment(&mut self, amount: Money, clock: &dyn Clock) -> Result<(), OrderError> {
        if !amount.is_positive() {
            return Err(OrderError::NonPositiveAmount(amount));
        }
        if amount > self.outstanding_balance() {
            return Err(OrderError::ExceedsBalance { amount, outstanding: self.outstanding_balance() });
        }
        self.apply(clock, |order, _| {
            order.paid_amount += amount;
            if order.paid_amount == order.total_amount {
                order.payment_status = PaymentStatus::Paid;
            } else if order.paid_amount.is_positive() {
                order.payment_status = PaymentStatus::PartiallyPaid;
            }
            Ok(())
        })
    }

    /// A refund that brings `refunded_amount` up to `paid_amount` also moves
    /// the order straight to REFUNDED, whatever its current status.
    pub fn add_refund(&mut self, amount: Money, clock: &dyn Clock) -> Result<RefundOutcome, OrderError> {
        if !amount.is_positive() {
            return Err(OrderError::NonPositiveAmount(amount));
        }
        if amount > self.refundable_amount() {
            return Err(OrderError::ExceedsPaid { amount, refundable: self.refundable_amount() });
        }
        let order_id = self.id;
        self.apply(clock, |order, now| {
            order.refunded_amount += amount;
            if order.refunded_amount != order.paid_amount {
                return Ok(RefundOutcome { fully_refunded: false, status_change: None });
            }

            order.payment_status = PaymentStatus::Refunded;
            let status_change = (order.status != OrderStatus::Refunded).then(|| {
                let from = order.status;
                order.previous_status = Some(from);
                order.status = OrderStatus::Refunded;
                StatusChange {
                    order_id,
                    from,
                    to: OrderStatus::Refunded,
                    reason: Some("full refund".to_string()),
                    at: now,
                }
            });
            Ok(RefundOutcome { fully_refunded: true, status_change })
        })
    }

    // ========================================================================
    // Totals
    // ========================================================================

    fn refresh_total(&mut self) -> Result<(), OrderError> {
        self.subtotal = Money::checked_sum(self.items.iter().map(|item| item.total_price))
            .ok_or_else(|| OrderError::out_of_range("subtotal"))?;
        self.total_amount = self
            .expected_total()
            .ok_or_else(|| OrderError::out_of_range("total_amount"))?;
        Ok(())
    }

    /// Recompute subtotal from the line totals, then the grand total.
    /// Item totals must already be current.
    pub fn calculate_totals(&mut self, clock: &dyn Clock) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        self.apply(clock, |order, _| order.refresh_total())
    }

    /// Set shipping and order-level discount, then recompute the total
    pub fn set_charges(&mut self, shipping: Money, discount: Money, clock: &dyn Clock) -> Result<(), OrderError> {
        self.apply(clock, |order, _| {
            order.shipping_amount = shipping;
            order.discount_amount = discount;
            order.refresh_total()
        })
    }

    /// Store the figures produced by the calculation engine
    pub fn apply_calculation(&mut self, calculation: &OrderCalculation, clock: &dyn Clock) -> Result<(), OrderError> {
        self.apply(clock, |order, _| {
            order.subtotal = calculation.subtotal;
            order.tax_amount = calculation.tax_amount;
            order.shipping_amount = calculation.shipping_amount;
            order.discount_amount = calculation.discount_amount;
            order.total_amount = calculation.total_amount;
            Ok(())
        })
    }

    // ========================================================================
    // Items
    // ========================================================================

    fn ensure_modifiable(&self) -> Result<(), OrderError> {
        if !self.can_be_modified() {
            return Err(OrderError::NotModifiable(self.status));
        }
        Ok(())
    }

    pub fn item(&self, item_id: EntityId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    fn item_mut(&mut self, item_id: EntityId) -> Result<&mut OrderItem, OrderError> {
        self.items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(OrderError::ItemNotFound(item_id))
    }

    pub fn add_item(&mut self, item: OrderItem, clock: &dyn Clock) -> Result<(), OrderError> {
        self.ensure_modifiable()?;
        self.apply(clock, |order, _| {
            order.items.push(item);
            order.refresh_total()
        })
    }

    pub fn remove_item(&mut self, item_id: EntityId, clock: &dyn Clock) -> Result<OrderItem, OrderError> {
        self.ensure_modifiable()?;
        self.apply(clock, |order, _| {
            let index = order
                .items
                .iter()
                .position(|item| item.id == item_id)
                .ok_or(OrderError::ItemNotFound(item_id))?;
            let removed = order.items.remove(index);
            order.refresh_total()?;
            Ok(removed)
        })
    }

    pub fn ship_item(&mut self, item_id: EntityId, quantity: i32, clock: &dyn Clock) -> Result<(), OrderError> {
        self.apply(clock, |order, _| order.item_mut(item_id)?.ship_item(quantity, clock))
    }

    pub fn return_item(&mut self, item_id: EntityId, quantity: i32, clock: &dyn Clock) -> Result<(), OrderError> {
        self.apply(clock, |order, _| order.item_mut(item_id)?.return_item(quantity, clock))
    }

    pub fn all_items_shipped(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.is_fully_shipped())
    }

    // ========================================================================
    // Fulfilment & Approval
    // ========================================================================

    pub fn set_tracking(
        &mut self,
        tracking_number: String,
        carrier: String,
        shipped_by: EntityId,
        clock: &dyn Clock,
    ) -> Result<(), OrderError> {
        self.apply(clock, |order, _| {
            order.tracking_number = Some(tracking_number);
            order.carrier = Some(carrier);
            order.shipped_by = Some(shipped_by);
            Ok(())
        })
    }

    pub fn approve(&mut self, approver: EntityId, clock: &dyn Clock) -> Result<(), OrderError> {
        if approver.is_nil() {
            let mut errors = ValidationErrors::new();
            errors.add("approved_by", "must not be nil");
            return Err(errors.into());
        }
        self.apply(clock, |order, _| {
            order.approved_by = Some(approver);
            Ok(())
        })
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.required_date.map_or(false, |required| required < now) && !self.status.is_closed()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
