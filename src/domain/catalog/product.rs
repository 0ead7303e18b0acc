use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use super::value_objects::{
    validate_sellable, DigitalSettings, InventorySettings, PhysicalAttributes, PricingInfo,
};
use crate::primitives::{Clock, EntityId, IdGenerator, Money};
use crate::validation::{rules, ValidationErrors};

// ============================================================================
// Product Entity
// ============================================================================

pub const MAX_PRODUCT_NAME_LENGTH: usize = 200;
pub const MAX_SHORT_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_LONG_DESCRIPTION_LENGTH: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub sku: String,
    pub name: String,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub category_id: EntityId,

    #[serde(flatten)]
    pub pricing: PricingInfo,
    #[serde(flatten)]
    pub physical: PhysicalAttributes,
    pub barcode: Option<String>,
    #[serde(flatten)]
    pub inventory: InventorySettings,
    #[serde(flatten)]
    pub digital: DigitalSettings,

    pub is_active: bool,
    pub is_featured: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal input for `Product::create`; everything else starts at defaults
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category_id: EntityId,
    pub price: Money,
    pub cost: Money,
}

impl Product {
    pub fn create(
        new: NewProduct,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Self, CatalogError> {
        let now = clock.now();
        let product = Self {
            id: ids.next_id(),
            sku: new.sku,
            name: new.name,
            short_description: None,
            long_description: None,
            category_id: new.category_id,
            pricing: PricingInfo::new(new.price, new.cost),
            physical: PhysicalAttributes::default(),
            barcode: None,
            inventory: InventorySettings::default(),
            digital: DigitalSettings::default(),
            is_active: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        };
        product.validate()?;
        Ok(product)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut errors = ValidationErrors::new();
        self.collect_errors(&mut errors);
        errors.into_result().map_err(CatalogError::from)
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) {
        rules::non_nil(errors, "id", self.id);
        rules::non_nil(errors, "category_id", self.category_id);
        rules::required_text(errors, "name", &self.name, MAX_PRODUCT_NAME_LENGTH);
        rules::optional_text(
            errors,
            "short_description",
            self.short_description.as_deref(),
            MAX_SHORT_DESCRIPTION_LENGTH,
        );
        rules::optional_text(
            errors,
            "long_description",
            self.long_description.as_deref(),
            MAX_LONG_DESCRIPTION_LENGTH,
        );
        validate_sellable(
            errors,
            &self.sku,
            self.barcode.as_deref(),
            &self.pricing,
            &self.physical,
            &self.inventory,
            &self.digital,
        );
    }

    /// Run `change` on a copy and keep it only if the result is still valid
    fn apply(
        &mut self,
        clock: &dyn Clock,
        change: impl FnOnce(&mut Self) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        let mut candidate = self.clone();
        change(&mut candidate)?;
        candidate.validate()?;
        candidate.updated_at = clock.now();
        *self = candidate;
        Ok(())
    }

    pub fn update_pricing(&mut self, price: Money, cost: Money, clock: &dyn Clock) -> Result<(), CatalogError> {
        self.apply(clock, |p| {
            p.pricing.price = price;
            p.pricing.cost = cost;
            Ok(())
        })
    }

    pub fn set_tax_rate(&mut self, tax_rate: Option<Decimal>, clock: &dyn Clock) -> Result<(), CatalogError> {
        self.apply(clock, |p| {
            p.pricing.taxable = tax_rate.is_some();
            p.pricing.tax_rate = tax_rate.unwrap_or(Decimal::ZERO);
            Ok(())
        })
    }

    /// Turn the product into a downloadable good; it stops requiring shipping
    pub fn make_digital(&mut self, settings: DigitalSettings, clock: &dyn Clock) -> Result<(), CatalogError> {
        self.apply(clock, |p| {
            p.digital = settings;
            p.physical.requires_shipping = !p.digital.is_digital;
            Ok(())
        })
    }

    /// Signed stock movement; returns the new level
    pub fn adjust_stock(&mut self, delta: i32, clock: &dyn Clock) -> Result<i32, CatalogError> {
        if delta == 0 {
            return Err(CatalogError::InvalidArgument("stock adjustment must not be zero".to_string()));
        }
        let next = self.inventory.adjusted(delta)?;
        self.inventory.stock_quantity = next;
        self.updated_at = clock.now();
        Ok(next)
    }

    pub fn activate(&mut self, clock: &dyn Clock) {
        self.is_active = true;
        self.updated_at = clock.now();
    }

    pub fn deactivate(&mut self, clock: &dyn Clock) {
        self.is_active = false;
        self.updated_at = clock.now();
    }

    pub fn is_in_stock(&self) -> bool {
        self.inventory.is_in_stock()
    }

    pub fn is_low_stock(&self) -> bool {
        self.inventory.is_low_stock()
    }

    pub fn can_fulfill(&self, quantity: i32) -> bool {
        self.is_active && self.inventory.can_fulfill(quantity)
    }

    pub fn margin_percent(&self) -> Option<Decimal> {
        self.pricing.margin_percent()
    }

    pub fn price_with_tax(&self) -> Money {
        self.pricing.price_with_tax()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error_kind::ErrorKind;
    use crate::primitives::{FixedClock, RandomIds};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
    }

    fn create_test_product(clock: &FixedClock) -> Product {
        Product::create(
            NewProduct {
                sku: "WIDGET-001".to_string(),
                name: "Blue Widget".to_string(),
                category_id: EntityId::new(),
                price: Money::new(dec!(25.00)),
                cost: Money::new(dec!(10.00)),
            },
            &RandomIds,
            clock,
        )
        .unwrap()
    }

    #[test]
    fn test_create_product_defaults() {
        let clock = clock();
        let product = create_test_product(&clock);

        assert!(!product.id.is_nil());
        assert!(product.is_active);
        assert!(product.physical.requires_shipping);
        assert!(!product.digital.is_digital);
        assert_eq!(product.created_at, clock.now());
        assert_eq!(product.updated_at, clock.now());
    }

    #[test]
    fn test_create_rejects_nil_category_and_bad_sku() {
        let result = Product::create(
            NewProduct {
                sku: "has space".to_string(),
                name: "Widget".to_string(),
                category_id: EntityId::nil(),
                price: Money::from_major(5),
                cost: Money::ZERO,
            },
            &RandomIds,
            &clock(),
        );

        match result {
            Err(CatalogError::Validation(errors)) => {
                assert!(errors.has_field("sku"));
                assert!(errors.has_field("category_id"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_pricing_is_atomic() {
        let clock = clock();
        let mut product = create_test_product(&clock);
        let before = product.clone();

        clock.advance(Duration::minutes(5));
        let err = product
            .update_pricing(Money::from_major(5), Money::from_major(6), &clock)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(product, before);

        product
            .update_pricing(Money::from_major(30), Money::from_major(6), &clock)
            .unwrap();
        assert_eq!(product.pricing.price, Money::from_major(30));
        assert_eq!(product.updated_at, clock.now());
    }

    #[test]
    fn test_tax_rate() {
        let clock = clock();
        let mut product = create_test_product(&clock);

        product.set_tax_rate(Some(dec!(8)), &clock).unwrap();
        assert!(product.pricing.taxable);
        assert_eq!(product.price_with_tax(), Money::new(dec!(27.00)));

        assert!(product.set_tax_rate(Some(dec!(120)), &clock).is_err());
        assert_eq!(product.pricing.tax_rate, dec!(8));

        product.set_tax_rate(None, &clock).unwrap();
        assert!(!product.pricing.taxable);
        assert_eq!(product.pricing.tax_rate, Decimal::ZERO);
    }

    #[test]
    fn test_make_digital() {
        let clock = clock();
        let mut product = create_test_product(&clock);

        product
            .make_digital(DigitalSettings::digital("https://dl.example.com/widget.zip", 5, 30), &clock)
            .unwrap();
        assert!(product.digital.is_digital);
        assert!(!product.physical.requires_shipping);

        let result = product.make_digital(
            DigitalSettings {
                is_digital: true,
                download_url: None,
                max_downloads: 0,
                expiry_days: 0,
            },
            &clock,
        );
        assert!(result.is_err());
        assert!(product.digital.download_url.is_some());
    }

    #[test]
    fn test_adjust_stock() {
        let clock = clock();
        let mut product = create_test_product(&clock);

        assert_eq!(product.adjust_stock(10, &clock).unwrap(), 10);
        assert_eq!(product.adjust_stock(-4, &clock).unwrap(), 6);

        let err = product.adjust_stock(-7, &clock).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuantityBound);
        assert_eq!(product.inventory.stock_quantity, 6);

        assert_eq!(product.adjust_stock(0, &clock).unwrap_err().kind(), ErrorKind::Argument);

        product.inventory.allow_backorder = true;
        assert_eq!(product.adjust_stock(-7, &clock).unwrap(), -1);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_fulfilment_respects_active_flag() {
        let clock = clock();
        let mut product = create_test_product(&clock);
        product.adjust_stock(3, &clock).unwrap();
        assert!(product.can_fulfill(3));

        product.deactivate(&clock);
        assert!(!product.can_fulfill(1));
        product.activate(&clock);
        assert!(product.can_fulfill(1));
    }

    #[test]
    fn test_margin_percent() {
        let product = create_test_product(&clock());
        assert_eq!(product.margin_percent(), Some(dec!(60)));
    }

    #[test]
    fn test_product_json_is_flat_snake_case() {
        let product = create_test_product(&clock());
        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(value["sku"], "WIDGET-001");
        assert_eq!(value["price"], "25.00");
        assert_eq!(value["requires_shipping"], true);
        assert_eq!(value["track_inventory"], true);
        assert_eq!(value["is_digital"], false);

        let back: Product = serde_json::from_value(value).unwrap();
        assert_eq!(back, product);
    }
}
