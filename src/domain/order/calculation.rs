use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aggregate::Order;
use super::item::OrderItem;
use crate::config::CalculationSettings;
use crate::primitives::Money;

// ============================================================================
// Calculation Engine - Order-Wide Totals with Breakdowns
// ============================================================================
//
// Pure function of the order: nothing is mutated, so running it twice gives
// the same record. Unlike `OrderItem::calculate_totals`, the engine reads an
// item's `discount_amount` as a line-level amount.
//
//   subtotal = Σ unit_price·quantity
//   tax_i    = (unit_price_i·quantity_i − discount_i) · rate_i / 100
//   total    = subtotal + Σ tax_i + shipping − Σ discounts
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    ItemDiscount,
    OrderDiscount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub tax_rate: Decimal,
    pub tax_amount: Money,
    pub taxable_amount: Money,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountBreakdown {
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub amount: Money,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCalculation {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub shipping_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub tax_breakdown: Vec<TaxBreakdown>,
    pub discount_breakdown: Vec<DiscountBreakdown>,
}

/// Items without their own rate fall back to a positive default
fn effective_tax_rate(item: &OrderItem, default_tax_rate: Decimal) -> Decimal {
    if item.tax_rate > Decimal::ZERO {
        item.tax_rate
    } else if default_tax_rate > Decimal::ZERO {
        default_tax_rate
    } else {
        Decimal::ZERO
    }
}

pub fn calculate_order_totals(order: &Order, default_tax_rate: Decimal, shipping_cost: Money) -> OrderCalculation {
    let mut subtotal = Money::ZERO;
    let mut tax_amount = Money::ZERO;
    let mut discount_amount = Money::ZERO;
    let mut tax_breakdown = Vec::new();
    let mut discount_breakdown = Vec::new();

    for item in &order.items {
        let line_subtotal = item.subtotal();
        subtotal += line_subtotal;

        if item.discount_amount.is_positive() {
            discount_amount += item.discount_amount;
            discount_breakdown.push(DiscountBreakdown {
                discount_type: DiscountType::ItemDiscount,
                amount: item.discount_amount,
                description: format!("Discount on {}", item.product_name),
            });
        }

        let rate = effective_tax_rate(item, default_tax_rate);
        if rate > Decimal::ZERO {
            let taxable_amount = line_subtotal - item.discount_amount;
            let line_tax = taxable_amount.percent(rate);
            tax_amount += line_tax;
            tax_breakdown.push(TaxBreakdown {
                tax_rate: rate,
                tax_amount: line_tax,
                taxable_amount,
                name: format!("Tax ({}%) on {}", rate.normalize(), item.product_sku),
            });
        }
    }

    if order.discount_amount.is_positive() {
        discount_amount += order.discount_amount;
        discount_breakdown.push(DiscountBreakdown {
            discount_type: DiscountType::OrderDiscount,
            amount: order.discount_amount,
            description: "Order discount".to_string(),
        });
    }

    OrderCalculation {
        subtotal,
        tax_amount,
        shipping_amount: shipping_cost,
        discount_amount,
        total_amount: subtotal + tax_amount + shipping_cost - discount_amount,
        tax_breakdown,
        discount_breakdown,
    }
}

/// Same engine, defaults taken from configuration
pub fn calculate_with(order: &Order, settings: &CalculationSettings) -> OrderCalculation {
    calculate_order_totals(order, settings.default_tax_rate, settings.default_shipping_cost)
}

/// Σ weight·quantity, a mass rather than money
pub fn calculate_shipping_weight(order: &Order) -> f64 {
    order
        .items
        .iter()
        .map(|item| item.weight * f64::from(item.quantity))
        .sum()
}
