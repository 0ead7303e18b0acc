use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::ItemStatus;
use crate::domain::catalog::{Product, MAX_PRICE};
use crate::primitives::{Clock, EntityId, IdGenerator, Money};
use crate::validation::{patterns, rules, ValidationErrors};

// ============================================================================
// Order Item - One Line of an Order
// ============================================================================
//
// `discount_amount` is a per-unit discount. Line totals follow
//
//   total_price = unit_price·qty − discount_amount·qty + tax_amount
//
// and `calculate_totals` must run before the owning order recomputes its
// own totals from the line `total_price`s.
//
// ============================================================================

pub const MIN_ITEM_QUANTITY: i32 = 1;
pub const MAX_ITEM_QUANTITY: i32 = 9_999;
pub const MAX_ITEM_NAME_LENGTH: usize = 200;
pub const MAX_ITEM_NOTES_LENGTH: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: EntityId,
    pub order_id: EntityId,
    pub product_id: EntityId,
    pub product_sku: String,
    pub product_name: String,

    pub quantity: i32,
    pub unit_price: Money,
    pub discount_amount: Money,
    pub tax_rate: Decimal,
    pub tax_amount: Money,
    pub total_price: Money,

    pub weight: f64,
    pub dimensions: Option<String>,
    pub barcode: Option<String>,
    pub notes: Option<String>,

    pub status: ItemStatus,
    pub quantity_shipped: i32,
    pub quantity_returned: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `OrderItem::create`
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: EntityId,
    pub product_sku: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub discount_amount: Money,
    pub tax_rate: Decimal,
    pub weight: f64,
}

impl OrderItem {
    /// Build a line with its totals already calculated
    pub fn create(
        order_id: EntityId,
        new: NewOrderItem,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Self, OrderError> {
        let now = clock.now();
        let mut item = Self {
            id: ids.next_id(),
            order_id,
            product_id: new.product_id,
            product_sku: new.product_sku,
            product_name: new.product_name,
            quantity: new.quantity,
            unit_price: new.unit_price,
            discount_amount: new.discount_amount,
            tax_rate: new.tax_rate,
            tax_amount: Money::ZERO,
            total_price: Money::ZERO,
            weight: new.weight,
            dimensions: None,
            barcode: None,
            notes: None,
            status: ItemStatus::Ordered,
            quantity_shipped: 0,
            quantity_returned: 0,
            created_at: now,
            updated_at: now,
        };
        let mut errors = ValidationErrors::new();
        item.collect_input_errors(&mut errors);
        errors.into_result()?;

        item.recalculate()?;
        item.validate()?;
        Ok(item)
    }

    /// Snapshot a catalogue product into a new line
    pub fn from_product(
        order_id: EntityId,
        product: &Product,
        quantity: i32,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Self, OrderError> {
        let mut item = Self::create(
            order_id,
            NewOrderItem {
                product_id: product.id,
                product_sku: product.sku.clone(),
                product_name: product.name.clone(),
                quantity,
                unit_price: product.pricing.price,
                discount_amount: Money::ZERO,
                tax_rate: if product.pricing.taxable { product.pricing.tax_rate } else { Decimal::ZERO },
                weight: product.physical.weight,
            },
            ids,
            clock,
        )?;
        item.dimensions = product.physical.dimensions.clone();
        item.barcode = product.barcode.clone();
        Ok(item)
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        let mut errors = ValidationErrors::new();
        self.collect_errors(&mut errors);
        errors.into_result().map_err(OrderError::from)
    }

    pub(crate) fn collect_errors(&self, errors: &mut ValidationErrors) {
        self.collect_input_errors(errors);

        match self.expected_total() {
            Some(expected) if expected == self.total_price => {}
            Some(expected) => errors.add(
                "total_price",
                format!(
                    "expected {} (unit_price·quantity − discount·quantity + tax), found {}",
                    expected, self.total_price
                ),
            ),
            None => errors.add("total_price", "is out of range"),
        }
    }

    /// Every rule except the stored-total equation
    fn collect_input_errors(&self, errors: &mut ValidationErrors) {
        rules::non_nil(errors, "id", self.id);
        rules::non_nil(errors, "order_id", self.order_id);
        rules::non_nil(errors, "product_id", self.product_id);
        rules::required_text(errors, "product_sku", &self.product_sku, 100);
        rules::required_text(errors, "product_name", &self.product_name, MAX_ITEM_NAME_LENGTH);

        if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&self.quantity) {
            errors.add(
                "quantity",
                format!("must be between {} and {}", MIN_ITEM_QUANTITY, MAX_ITEM_QUANTITY),
            );
        }

        rules::money_within(errors, "unit_price", self.unit_price, Money::ZERO, MAX_PRICE);
        rules::non_negative(errors, "discount_amount", self.discount_amount);
        errors.ensure(
            self.discount_amount <= self.unit_price,
            "discount_amount",
            "must not exceed unit_price",
        );
        rules::percentage(errors, "tax_rate", self.tax_rate);
        rules::non_negative(errors, "tax_amount", self.tax_amount);

        if self.quantity_shipped < 0 || self.quantity_shipped > self.quantity {
            errors.add("quantity_shipped", "must be between 0 and quantity");
        }
        if self.quantity_returned < 0 || self.quantity_returned > self.quantity_shipped {
            errors.add("quantity_returned", "must be between 0 and quantity_shipped");
        }

        rules::measurement(errors, "weight", self.weight, f64::MAX);
        rules::optional_pattern(
            errors,
            "dimensions",
            self.dimensions.as_deref(),
            &patterns::DIMENSIONS,
            "must look like 'L x W x H'",
        );
        rules::optional_pattern(
            errors,
            "barcode",
            self.barcode.as_deref(),
            &patterns::CATALOG_CODE,
            "may only contain letters, digits, '-' and '_'",
        );
        rules::optional_text(errors, "notes", self.notes.as_deref(), MAX_ITEM_NOTES_LENGTH);
    }

    // ========================================================================
    // Totals
    // ========================================================================

    /// `unit_price · quantity`
    pub fn subtotal(&self) -> Money {
        self.unit_price.times(i64::from(self.quantity))
    }

    /// `discount_amount · quantity`
    pub fn total_discount(&self) -> Money {
        self.discount_amount.times(i64::from(self.quantity))
    }

    pub fn taxable_amount(&self) -> Money {
        self.subtotal() - self.total_discount()
    }

    fn checked_taxable_amount(&self) -> Option<Money> {
        let quantity = i64::from(self.quantity);
        self.unit_price
            .checked_times(quantity)?
            .checked_sub(self.discount_amount.checked_times(quantity)?)
    }

    fn expected_total(&self) -> Option<Money> {
        self.checked_taxable_amount()?.checked_add(self.tax_amount)
    }

    fn recalculate(&mut self) -> Result<(), OrderError> {
        let after_discount = self
            .checked_taxable_amount()
            .ok_or_else(|| OrderError::out_of_range("total_price"))?;
        let tax_amount = after_discount
            .checked_percent(self.tax_rate)
            .ok_or_else(|| OrderError::out_of_range("tax_amount"))?;
        self.total_price = after_discount
            .checked_add(tax_amount)
            .ok_or_else(|| OrderError::out_of_range("total_price"))?;
        self.tax_amount = tax_amount;
        Ok(())
    }

    /// Recompute `tax_amount` and `total_price` from price, discount and rate
    pub fn calculate_totals(&mut self, clock: &dyn Clock) -> Result<(), OrderError> {
        let mut candidate = self.clone();
        candidate.recalculate()?;
        candidate.updated_at = clock.now();
        *self = candidate;
        Ok(())
    }

    // ========================================================================
    // Line Edits (only before anything ships)
    // ========================================================================

    fn ensure_editable(&self) -> Result<(), OrderError> {
        if self.status != ItemStatus::Ordered || self.quantity_shipped > 0 {
            return Err(OrderError::ItemStatusConflict(self.status));
        }
        Ok(())
    }

    pub fn update_quantity(&mut self, quantity: i32, clock: &dyn Clock) -> Result<(), OrderError> {
        self.ensure_editable()?;
        if quantity < MIN_ITEM_QUANTITY {
            return Err(OrderError::NonPositiveQuantity(quantity));
        }
        let mut candidate = self.clone();
        candidate.quantity = quantity;
        candidate.recalculate()?;
        candidate.validate()?;
        candidate.updated_at = clock.now();
        *self = candidate;
        Ok(())
    }

    /// Set the per-unit discount and recalculate
    pub fn apply_discount(&mut self, per_unit: Money, clock: &dyn Clock) -> Result<(), OrderError> {
        self.ensure_editable()?;
        let mut candidate = self.clone();
        candidate.discount_amount = per_unit;
        candidate.recalculate()?;
        candidate.validate()?;
        candidate.updated_at = clock.now();
        *self = candidate;
        Ok(())
    }

    // ========================================================================
    // Fulfilment Tracking
    // ========================================================================

    pub fn remaining_to_ship(&self) -> i32 {
        self.quantity - self.quantity_shipped
    }

    pub fn is_fully_shipped(&self) -> bool {
        self.quantity_shipped == self.quantity
    }

    pub fn can_be_shipped(&self) -> bool {
        self.status == ItemStatus::Ordered && self.quantity_shipped < self.quantity
    }

    pub fn can_be_returned(&self) -> bool {
        self.quantity_returned < self.quantity_shipped && self.status != ItemStatus::Cancelled
    }

    pub fn ship_item(&mut self, quantity: i32, clock: &dyn Clock) -> Result<(), OrderError> {
        if quantity <= 0 {
            return Err(OrderError::NonPositiveQuantity(quantity));
        }
        if self.status == ItemStatus::Cancelled {
            return Err(OrderError::ItemStatusConflict(self.status));
        }
        if quantity > self.remaining_to_ship() {
            return Err(OrderError::QuantityBound {
                requested: quantity,
                available: self.remaining_to_ship(),
            });
        }
        self.quantity_shipped += quantity;
        self.status = if self.is_fully_shipped() {
            ItemStatus::Shipped
        } else {
            ItemStatus::PartiallyShipped
        };
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn return_item(&mut self, quantity: i32, clock: &dyn Clock) -> Result<(), OrderError> {
        if quantity <= 0 {
            return Err(OrderError::NonPositiveQuantity(quantity));
        }
        if quantity > self.quantity_shipped - self.quantity_returned {
            return Err(OrderError::QuantityBound {
                requested: quantity,
                available: self.quantity_shipped - self.quantity_returned,
            });
        }
        self.quantity_returned += quantity;
        if self.quantity_returned == self.quantity_shipped {
            self.status = ItemStatus::Returned;
        }
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn cancel(&mut self, clock: &dyn Clock) -> Result<(), OrderError> {
        self.ensure_editable()?;
        self.status = ItemStatus::Cancelled;
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn mark_delivered(&mut self, clock: &dyn Clock) -> Result<(), OrderError> {
        if self.status != ItemStatus::Shipped {
            return Err(OrderError::ItemStatusConflict(self.status));
        }
        self.status = ItemStatus::Delivered;
        self.updated_at = clock.now();
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
