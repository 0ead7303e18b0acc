use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use crate::primitives::Money;
use crate::validation::{patterns, rules, ValidationErrors};

// ============================================================================
// Catalog Value Objects
// ============================================================================
//
// Products and variants share more than 90% of their rules. Those rules live
// on the value objects below, which both entities embed (and flatten into
// their JSON), so each rule is written once.
//
// ============================================================================

pub const MAX_PRICE: Money = Money::new(dec!(999999.99));
pub const MAX_WEIGHT: f64 = 99_999.99;
pub const MAX_DIMENSION: f64 = 9_999.99;
pub const MAX_SKU_LENGTH: usize = 100;
pub const MAX_BARCODE_LENGTH: usize = 50;
pub const MAX_DOWNLOAD_URL_LENGTH: usize = 500;

/// Selling price, cost and tax treatment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInfo {
    pub price: Money,
    pub cost: Money,
    pub taxable: bool,
    pub tax_rate: Decimal,
}

impl PricingInfo {
    pub fn new(price: Money, cost: Money) -> Self {
        Self {
            price,
            cost,
            taxable: false,
            tax_rate: Decimal::ZERO,
        }
    }

    pub fn with_tax(mut self, tax_rate: Decimal) -> Self {
        self.taxable = true;
        self.tax_rate = tax_rate;
        self
    }

    pub fn validate(&self, errors: &mut ValidationErrors) {
        if !self.price.is_positive() {
            errors.add("price", "must be greater than zero");
        } else if self.price > MAX_PRICE {
            errors.add("price", format!("must not exceed {}", MAX_PRICE));
        }

        rules::money_within(errors, "cost", self.cost, Money::ZERO, MAX_PRICE);
        if !self.cost.is_negative() && self.cost > self.price {
            errors.add("cost", "must not exceed price");
        }

        if self.taxable {
            rules::percentage(errors, "tax_rate", self.tax_rate);
        } else if !self.tax_rate.is_zero() {
            errors.add("tax_rate", "must be zero when the item is not taxable");
        }
    }

    pub fn margin(&self) -> Money {
        self.price - self.cost
    }

    /// `(price − cost) × 100 ÷ price`; `None` for a zero price
    pub fn margin_percent(&self) -> Option<Decimal> {
        self.margin().percent_of(self.price)
    }

    pub fn tax_amount(&self) -> Money {
        if self.taxable {
            self.price.percent(self.tax_rate)
        } else {
            Money::ZERO
        }
    }

    pub fn price_with_tax(&self) -> Money {
        self.price + self.tax_amount()
    }
}

/// Mass, size and whether the item ships physically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalAttributes {
    pub weight: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Free-form `L x W x H`
    pub dimensions: Option<String>,
    pub requires_shipping: bool,
}

impl Default for PhysicalAttributes {
    fn default() -> Self {
        Self {
            weight: 0.0,
            length: 0.0,
            width: 0.0,
            height: 0.0,
            dimensions: None,
            requires_shipping: true,
        }
    }
}

impl PhysicalAttributes {
    pub fn validate(&self, errors: &mut ValidationErrors) {
        rules::measurement(errors, "weight", self.weight, MAX_WEIGHT);
        rules::measurement(errors, "length", self.length, MAX_DIMENSION);
        rules::measurement(errors, "width", self.width, MAX_DIMENSION);
        rules::measurement(errors, "height", self.height, MAX_DIMENSION);
        rules::optional_pattern(
            errors,
            "dimensions",
            self.dimensions.as_deref(),
            &patterns::DIMENSIONS,
            "must look like 'L x W x H'",
        );
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Stock tracking configuration and current level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySettings {
    pub track_inventory: bool,
    pub stock_quantity: i32,
    pub min_stock_level: Option<i32>,
    pub max_stock_level: Option<i32>,
    pub allow_backorder: bool,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            track_inventory: true,
            stock_quantity: 0,
            min_stock_level: None,
            max_stock_level: None,
            allow_backorder: false,
        }
    }
}

impl InventorySettings {
    pub fn validate(&self, errors: &mut ValidationErrors) {
        if self.stock_quantity < 0 && !self.allow_backorder {
            errors.add("stock_quantity", "must not be negative unless backorders are allowed");
        }
        if let Some(min) = self.min_stock_level {
            errors.ensure(min >= 0, "min_stock_level", "must not be negative");
        }
        if let Some(max) = self.max_stock_level {
            errors.ensure(max >= 0, "max_stock_level", "must not be negative");
        }
        if let (Some(min), Some(max)) = (self.min_stock_level, self.max_stock_level) {
            errors.ensure(min <= max, "min_stock_level", "must not exceed max_stock_level");
        }
    }

    pub fn is_in_stock(&self) -> bool {
        !self.track_inventory || self.stock_quantity > 0 || self.allow_backorder
    }

    pub fn is_low_stock(&self) -> bool {
        self.track_inventory
            && self
                .min_stock_level
                .map_or(false, |min| self.stock_quantity <= min)
    }

    pub fn can_fulfill(&self, quantity: i32) -> bool {
        !self.track_inventory || self.allow_backorder || self.stock_quantity >= quantity
    }

    /// Apply a signed stock movement and return the new level
    pub fn adjusted(&self, delta: i32) -> Result<i32, CatalogError> {
        let next = self
            .stock_quantity
            .checked_add(delta)
            .ok_or_else(|| CatalogError::InvalidArgument("stock adjustment overflows".to_string()))?;
        if next < 0 && !self.allow_backorder {
            return Err(CatalogError::InsufficientStock {
                requested: delta.saturating_neg(),
                available: self.stock_quantity,
            });
        }
        Ok(next)
    }
}

/// Download delivery settings for digital goods
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSettings {
    pub is_digital: bool,
    pub download_url: Option<String>,
    pub max_downloads: i32,
    pub expiry_days: i32,
}

impl DigitalSettings {
    pub fn digital(download_url: impl Into<String>, max_downloads: i32, expiry_days: i32) -> Self {
        Self {
            is_digital: true,
            download_url: Some(download_url.into()),
            max_downloads,
            expiry_days,
        }
    }

    pub fn validate(&self, errors: &mut ValidationErrors) {
        errors.ensure(self.max_downloads >= 0, "max_downloads", "must not be negative");
        errors.ensure(self.expiry_days >= 0, "expiry_days", "must not be negative");

        let url = self.download_url.as_deref().filter(|u| !u.is_empty());
        if self.is_digital {
            match url {
                None => errors.add("download_url", "is required for digital items"),
                Some(u) => {
                    rules::matches_pattern(errors, "download_url", u, &patterns::HTTP_URL, "must be an http(s) URL");
                    rules::optional_text(errors, "download_url", Some(u), MAX_DOWNLOAD_URL_LENGTH);
                }
            }
        } else {
            errors.ensure(url.is_none(), "download_url", "is only allowed for digital items");
            errors.ensure(self.max_downloads == 0, "max_downloads", "must be zero for non-digital items");
            errors.ensure(self.expiry_days == 0, "expiry_days", "must be zero for non-digital items");
        }
    }
}

// ============================================================================
// Shared Sellable-Item Rules
// ============================================================================

/// Rules common to products and variants
pub fn validate_sellable(
    errors: &mut ValidationErrors,
    sku: &str,
    barcode: Option<&str>,
    pricing: &PricingInfo,
    physical: &PhysicalAttributes,
    inventory: &InventorySettings,
    digital: &DigitalSettings,
) {
    rules::required_text(errors, "sku", sku, MAX_SKU_LENGTH);
    if !sku.trim().is_empty() {
        rules::matches_pattern(errors, "sku", sku, &patterns::CATALOG_CODE, "may only contain letters, digits, '-' and '_'");
    }

    if let Some(code) = barcode.filter(|b| !b.is_empty()) {
        rules::optional_text(errors, "barcode", Some(code), MAX_BARCODE_LENGTH);
        rules::matches_pattern(errors, "barcode", code, &patterns::CATALOG_CODE, "may only contain letters, digits, '-' and '_'");
    }

    pricing.validate(errors);
    physical.validate(errors);
    inventory.validate(errors);
    digital.validate(errors);

    if digital.is_digital && physical.requires_shipping {
        errors.add("requires_shipping", "digital items must not require shipping");
    }
}
