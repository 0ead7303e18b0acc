use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use super::product::{Product, MAX_PRODUCT_NAME_LENGTH};
use super::value_objects::{
    validate_sellable, DigitalSettings, InventorySettings, PhysicalAttributes, PricingInfo,
};
use crate::primitives::{Clock, EntityId, IdGenerator, Money};
use crate::validation::{patterns, rules, ValidationErrors};

// ============================================================================
// Product Variant Entity
// ============================================================================
//
// A sellable flavour of a product (size, colour, ...). Carries its own
// pricing, inventory and digital settings, validated by the same rules as
// `Product`.
//
// ============================================================================

pub const MAX_IMAGE_URL_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: EntityId,
    pub product_id: EntityId,
    pub sku: String,
    pub name: String,

    #[serde(flatten)]
    pub pricing: PricingInfo,
    #[serde(flatten)]
    pub physical: PhysicalAttributes,
    pub barcode: Option<String>,
    #[serde(flatten)]
    pub inventory: InventorySettings,
    #[serde(flatten)]
    pub digital: DigitalSettings,

    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductVariant {
    /// New variant inheriting the parent's pricing, physical and digital
    /// settings. Inventory starts empty.
    pub fn for_product(
        product: &Product,
        sku: impl Into<String>,
        name: impl Into<String>,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Self, CatalogError> {
        let now = clock.now();
        let variant = Self {
            id: ids.next_id(),
            product_id: product.id,
            sku: sku.into(),
            name: name.into(),
            pricing: product.pricing.clone(),
            physical: product.physical.clone(),
            barcode: None,
            inventory: InventorySettings {
                stock_quantity: 0,
                ..product.inventory.clone()
            },
            digital: product.digital.clone(),
            image_url: None,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        variant.validate()?;
        Ok(variant)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut errors = ValidationErrors::new();
        rules::non_nil(&mut errors, "id", self.id);
        rules::non_nil(&mut errors, "product_id", self.product_id);
        rules::required_text(&mut errors, "name", &self.name, MAX_PRODUCT_NAME_LENGTH);
        validate_sellable(
            &mut errors,
            &self.sku,
            self.barcode.as_deref(),
            &self.pricing,
            &self.physical,
            &self.inventory,
            &self.digital,
        );
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            rules::optional_text(&mut errors, "image_url", Some(url), MAX_IMAGE_URL_LENGTH);
            rules::matches_pattern(
                &mut errors,
                "image_url",
                url,
                &patterns::IMAGE_URL,
                "must be an http(s) link to a .jpg, .jpeg, .png, .gif, .webp or .svg image",
            );
        }
        errors.into_result().map_err(CatalogError::from)
    }

    pub fn update_pricing(&mut self, price: Money, cost: Money, clock: &dyn Clock) -> Result<(), CatalogError> {
        let mut candidate = self.clone();
        candidate.pricing.price = price;
        candidate.pricing.cost = cost;
        candidate.validate()?;
        candidate.updated_at = clock.now();
        *self = candidate;
        Ok(())
    }

    pub fn adjust_stock(&mut self, delta: i32, clock: &dyn Clock) -> Result<i32, CatalogError> {
        if delta == 0 {
            return Err(CatalogError::InvalidArgument("stock adjustment must not be zero".to_string()));
        }
        let next = self.inventory.adjusted(delta)?;
        self.inventory.stock_quantity = next;
        self.updated_at = clock.now();
        Ok(next)
    }

    pub fn is_in_stock(&self) -> bool {
        self.inventory.is_in_stock()
    }

    pub fn can_fulfill(&self, quantity: i32) -> bool {
        self.is_active && self.inventory.can_fulfill(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::product::NewProduct;
    use crate::primitives::{FixedClock, RandomIds};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn setup() -> (FixedClock, Product) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let mut product = Product::create(
            NewProduct {
                sku: "TSHIRT".to_string(),
                name: "T-Shirt".to_string(),
                category_id: EntityId::new(),
                price: Money::new(dec!(19.99)),
                cost: Money::new(dec!(7.50)),
            },
            &RandomIds,
            &clock,
        )
        .unwrap();
        product.adjust_stock(40, &clock).unwrap();
        (clock, product)
    }

    #[test]
    fn test_variant_inherits_product_settings() {
        let (clock, product) = setup();
        let variant = ProductVariant::for_product(&product, "TSHIRT-L-RED", "Large / Red", &RandomIds, &clock).unwrap();

        assert_eq!(variant.product_id, product.id);
        assert_eq!(variant.pricing, product.pricing);
        assert_eq!(variant.inventory.stock_quantity, 0);
        assert!(variant.inventory.track_inventory);
        assert!(!variant.is_in_stock());
    }

    #[test]
    fn test_variant_rejects_bad_image_url() {
        let (clock, product) = setup();
        let mut variant = ProductVariant::for_product(&product, "TSHIRT-S", "Small", &RandomIds, &clock).unwrap();

        variant.image_url = Some("https://cdn.example.com/tshirt-small.webp".to_string());
        assert!(variant.validate().is_ok());

        variant.image_url = Some("https://cdn.example.com/tshirt-small.bmp".to_string());
        match variant.validate() {
            Err(CatalogError::Validation(errors)) => assert!(errors.has_field("image_url")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_variant_requires_product_id() {
        let (clock, product) = setup();
        let mut variant = ProductVariant::for_product(&product, "TSHIRT-M", "Medium", &RandomIds, &clock).unwrap();
        variant.product_id = EntityId::nil();
        assert!(variant.validate().is_err());
    }

    #[test]
    fn test_variant_pricing_and_stock() {
        let (clock, product) = setup();
        let mut variant = ProductVariant::for_product(&product, "TSHIRT-XL", "XL", &RandomIds, &clock).unwrap();

        assert!(variant.update_pricing(Money::from_major(5), Money::from_major(8), &clock).is_err());
        assert_eq!(variant.pricing.price, Money::new(dec!(19.99)));

        variant.update_pricing(Money::new(dec!(21.99)), Money::new(dec!(8)), &clock).unwrap();
        assert_eq!(variant.pricing.price, Money::new(dec!(21.99)));

        variant.adjust_stock(2, &clock).unwrap();
        assert!(variant.can_fulfill(2));
        assert!(!variant.can_fulfill(3));
    }
}
