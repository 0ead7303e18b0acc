use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::ProductCategory;
use super::product::Product;
use super::variant::ProductVariant;
use crate::primitives::{EntityId, Money};

// ============================================================================
// Safe Projections
// ============================================================================
//
// Read-only views for outward distribution. Each struct lists exactly what is
// exposed; anything not listed never leaves the core through these types.
//
// ============================================================================

/// Public view of a product.
///
/// Omitted: `cost`, the stock level and its min/max thresholds, and the
/// `download_url` of digital goods (handed out only after purchase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeProduct {
    pub id: EntityId,
    pub sku: String,
    pub name: String,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub category_id: EntityId,
    pub price: Money,
    pub taxable: bool,
    pub tax_rate: Decimal,
    pub weight: f64,
    pub dimensions: Option<String>,
    pub barcode: Option<String>,
    pub in_stock: bool,
    pub requires_shipping: bool,
    pub is_featured: bool,
    pub is_digital: bool,
    pub max_downloads: i32,
    pub expiry_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for SafeProduct {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            sku: p.sku.clone(),
            name: p.name.clone(),
            short_description: p.short_description.clone(),
            long_description: p.long_description.clone(),
            category_id: p.category_id,
            price: p.pricing.price,
            taxable: p.pricing.taxable,
            tax_rate: p.pricing.tax_rate,
            weight: p.physical.weight,
            dimensions: p.physical.dimensions.clone(),
            barcode: p.barcode.clone(),
            in_stock: p.is_in_stock(),
            requires_shipping: p.physical.requires_shipping,
            is_featured: p.is_featured,
            is_digital: p.digital.is_digital,
            max_downloads: p.digital.max_downloads,
            expiry_days: p.digital.expiry_days,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Public view of a variant. Omits the same fields as `SafeProduct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeVariant {
    pub id: EntityId,
    pub product_id: EntityId,
    pub sku: String,
    pub name: String,
    pub price: Money,
    pub taxable: bool,
    pub tax_rate: Decimal,
    pub weight: f64,
    pub dimensions: Option<String>,
    pub in_stock: bool,
    pub is_digital: bool,
    pub image_url: Option<String>,
    pub sort_order: i32,
}

impl From<&ProductVariant> for SafeVariant {
    fn from(v: &ProductVariant) -> Self {
        Self {
            id: v.id,
            product_id: v.product_id,
            sku: v.sku.clone(),
            name: v.name.clone(),
            price: v.pricing.price,
            taxable: v.pricing.taxable,
            tax_rate: v.pricing.tax_rate,
            weight: v.physical.weight,
            dimensions: v.physical.dimensions.clone(),
            in_stock: v.is_in_stock(),
            is_digital: v.digital.is_digital,
            image_url: v.image_url.clone(),
            sort_order: v.sort_order,
        }
    }
}

/// Public view of a category.
///
/// Omitted: `is_active`, `sort_order` and the audit timestamps, which only
/// matter to catalogue administration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeCategory {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<EntityId>,
    pub level: u32,
    pub path: String,
    pub image_url: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
}

impl From<&ProductCategory> for SafeCategory {
    fn from(c: &ProductCategory) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            description: c.description.clone(),
            parent_id: c.parent_id,
            level: c.level,
            path: c.path.clone(),
            image_url: c.image_url.clone(),
            seo_title: c.seo_title.clone(),
            seo_description: c.seo_description.clone(),
            seo_keywords: c.seo_keywords.clone(),
        }
    }
}
