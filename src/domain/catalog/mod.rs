// ============================================================================
// Catalog Domain - Products, Variants, Categories
// ============================================================================
//
// This module contains the catalogue entities an order line refers to:
// - Value objects shared by products and variants (pricing, physical,
//   inventory, digital settings)
// - Product, ProductVariant, ProductCategory entities
// - Safe projections for outward distribution
// - Errors (CatalogError enum)
//
// ============================================================================

pub mod category;
pub mod errors;
pub mod product;
pub mod projections;
pub mod value_objects;
pub mod variant;

// Re-export for convenience
pub use category::*;
pub use errors::*;
pub use product::*;
pub use projections::*;
pub use value_objects::*;
pub use variant::*;
