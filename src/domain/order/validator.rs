use serde::{Deserialize, Serialize};

use super::aggregate::Order;
use super::status;
use super::value_objects::{OrderStatus, PaymentStatus, ShippingMethod};
use crate::config::ValidationSettings;
use crate::primitives::{Clock, Money};
use crate::validation::ValidationErrors;

// ============================================================================
// Order Validator - Advisory Whole-Order Report
// ============================================================================
//
// Never fails: errors and warnings are both returned so that warnings reach
// the caller even for a valid order.
//
// ============================================================================

pub const WARNING_REQUIRED_DATE_PASSED: &str = "required_date_has_passed";
pub const WARNING_DIGITAL_SHIPPING: &str = "digital_order_with_non_digital_shipping_method";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w == code)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderValidator {
    settings: ValidationSettings,
}

impl OrderValidator {
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    /// Warning code for orders above the configured threshold
    pub fn large_order_warning(&self) -> String {
        format!("total_exceeds_{}", self.settings.large_order_threshold.amount().normalize())
    }

    pub fn validate(&self, order: &Order, clock: &dyn Clock) -> ValidationReport {
        let now = clock.now();
        let mut errors = ValidationErrors::new();
        order.collect_errors(now, &mut errors);

        if order.items.is_empty() {
            errors.add("items", "order must contain at least one item");
        } else if order.subtotal <= Money::ZERO {
            errors.add("subtotal", "must be positive when the order has items");
        }

        if let Some(previous) = order.previous_status {
            if !is_reachable(previous, order.status, order.payment_status) {
                errors.add(
                    "status",
                    format!("illegal transition {} -> {}", previous, order.status),
                );
            }
        }

        let mut warnings = Vec::new();
        if order.required_date.map_or(false, |required| required < now) {
            warnings.push(WARNING_REQUIRED_DATE_PASSED.to_string());
        }
        if order.total_amount > self.settings.large_order_threshold {
            warnings.push(self.large_order_warning());
        }
        // Heuristic: a physical line is one that carries a weight.
        if is_digital_order(order) && order.items.iter().any(|item| item.weight > 0.0) {
            warnings.push(WARNING_DIGITAL_SHIPPING.to_string());
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors: errors.messages(),
            warnings,
        }
    }
}

/// Table transition, or the full-refund skip-ahead
fn is_reachable(previous: OrderStatus, current: OrderStatus, payment: PaymentStatus) -> bool {
    status::is_valid(previous, current)
        || (current == OrderStatus::Refunded && payment == PaymentStatus::Refunded)
}

/// Items count as digital only on a DIGITAL shipping method with items present
fn is_digital_order(order: &Order) -> bool {
    order.shipping_method == ShippingMethod::Digital && !order.items.is_empty()
}

pub fn validate_order(order: &Order, clock: &dyn Clock) -> ValidationReport {
    OrderValidator::default().validate(order, clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::aggregate::NewOrder;
    use crate::domain::order::item::{NewOrderItem, OrderItem};
    use crate::domain::order::value_objects::{OrderPriority, OrderType};
    use crate::primitives::{EntityId, FixedClock, RandomIds};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 8, 15, 14, 0, 0).unwrap())
    }

    fn create_test_order(clock: &FixedClock, method: ShippingMethod) -> Order {
        Order::create(
            NewOrder {
                order_number: "2024-000777".to_string(),
                customer_id: EntityId::new(),
                shipping_address_id: EntityId::new(),
                billing_address_id: EntityId::new(),
                created_by: EntityId::new(),
                priority: OrderPriority::High,
                order_type: OrderType::Standard,
                shipping_method: method,
                currency: "USD".to_string(),
                required_date: Some(clock.now() + Duration::days(1)),
            },
            &RandomIds,
            clock,
        )
        .unwrap()
    }

    fn with_item(clock: &FixedClock, mut order: Order, price: Decimal, weight: f64) -> Order {
        let item = OrderItem::create(
            order.id,
            NewOrderItem {
                product_id: EntityId::new(),
                product_sku: "E-BOOK".to_string(),
                product_name: "Handbook".to_string(),
                quantity: 1,
                unit_price: Money::new(price),
                discount_amount: Money::ZERO,
                tax_rate: Decimal::ZERO,
                weight,
            },
            &RandomIds,
            clock,
        )
        .unwrap();
        order.add_item(item, clock).unwrap();
        order
    }

    #[test]
    fn test_valid_order_no_warnings() {
        let clock = clock();
        let order = with_item(&clock, create_test_order(&clock, ShippingMethod::Ground), dec!(20), 1.0);
        let report = validate_order(&order, &clock);
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_order_is_invalid() {
        let clock = clock();
        let report = validate_order(&create_test_order(&clock, ShippingMethod::Ground), &clock);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.starts_with("items:")));
    }

    #[test]
    fn test_zero_subtotal_with_items() {
        let clock = clock();
        let order = with_item(&clock, create_test_order(&clock, ShippingMethod::Ground), dec!(0), 0.0);
        let report = validate_order(&order, &clock);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.starts_with("subtotal:")));
    }

    #[test]
    fn test_total_drift_reported() {
        let clock = clock();
        let mut order = with_item(&clock, create_test_order(&clock, ShippingMethod::Ground), dec!(20), 1.0);
        order.total_amount += Money::new(dec!(0.01));
        let report = validate_order(&order, &clock);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.starts_with("total_amount:")));
    }

    #[test]
    fn test_item_errors_are_prefixed() {
        let clock = clock();
        let mut order = with_item(&clock, create_test_order(&clock, ShippingMethod::Ground), dec!(20), 1.0);
        order.items[0].quantity_shipped = 5;
        let report = validate_order(&order, &clock);
        assert!(report.errors.iter().any(|e| e.starts_with("items[0].quantity_shipped")));
    }

    #[test]
    fn test_illegal_status_pair() {
        let clock = clock();
        let mut order = with_item(&clock, create_test_order(&clock, ShippingMethod::Ground), dec!(20), 1.0);
        order.previous_status = Some(OrderStatus::Draft);
        order.status = OrderStatus::Delivered;
        let report = validate_order(&order, &clock);
        assert!(report.errors.iter().any(|e| e.contains("DRAFT -> DELIVERED")));
    }

    #[test]
    fn test_refund_skip_ahead_accepted() {
        let clock = clock();
        let mut order = with_item(&clock, create_test_order(&clock, ShippingMethod::Ground), dec!(20), 1.0);
        order.add_payment(Money::new(dec!(20)), &clock).unwrap();
        order.add_refund(Money::new(dec!(20)), &clock).unwrap();
        assert_eq!(order.previous_status, Some(OrderStatus::Draft));

        let report = validate_order(&order, &clock);
        assert!(report.is_valid, "{:?}", report.errors);
    }

    #[test]
    fn test_warnings() {
        let clock = clock();
        let mut order = with_item(&clock, create_test_order(&clock, ShippingMethod::Digital), dec!(12000), 0.3);

        clock.advance(Duration::days(2));
        let report = validate_order(&order, &clock);
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.has_warning(WARNING_REQUIRED_DATE_PASSED));
        assert!(report.has_warning("total_exceeds_10000"));
        assert!(report.has_warning(WARNING_DIGITAL_SHIPPING));

        order.items[0].weight = 0.0;
        let report = validate_order(&order, &clock);
        assert!(!report.has_warning(WARNING_DIGITAL_SHIPPING));
    }

    #[test]
    fn test_configurable_threshold() {
        let clock = clock();
        let order = with_item(&clock, create_test_order(&clock, ShippingMethod::Ground), dec!(600), 1.0);
        let validator = OrderValidator::new(ValidationSettings { large_order_threshold: Money::new(dec!(500)) });

        let report = validator.validate(&order, &clock);
        assert_eq!(validator.large_order_warning(), "total_exceeds_500");
        assert!(report.has_warning("total_exceeds_500"));
    }
}
