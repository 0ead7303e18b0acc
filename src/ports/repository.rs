use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Product, ProductCategory, ProductVariant};
use crate::domain::customer::{Customer, CustomerSource, CustomerType};
use crate::domain::order::{Order, OrderAddress, OrderStatus, PaymentStatus};
use crate::primitives::{EntityId, Money};

// ============================================================================
// Repository Port - Persistence Contract
// ============================================================================
//
// Generic over the stored entity. Backends enforce uniqueness of the
// entity's natural key (sku, customer_code, order_number) and report
// violations as `RepositoryError::Duplicate`.
//
// ============================================================================

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Entity already exists: {0}")]
    AlreadyExists(EntityId),

    #[error("Duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Anything a repository can store
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> EntityId;

    /// Natural key that must be unique within one repository
    fn unique_key(&self) -> Option<(&'static str, String)> {
        None
    }
}

/// Plain-record filter evaluated against a stored entity
pub trait EntityFilter<T>: Send + Sync {
    fn matches(&self, entity: &T) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit.max(1));
        let total_pages = total_count.div_ceil(limit) as u32;
        Self {
            items,
            total_count,
            page: request.page,
            limit: request.limit,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    type Filter: EntityFilter<T>;

    async fn create(&self, entity: T) -> Result<T, RepositoryError>;
    async fn get_by_id(&self, id: EntityId) -> Result<T, RepositoryError>;
    async fn update(&self, entity: T) -> Result<T, RepositoryError>;
    async fn delete(&self, id: EntityId) -> Result<(), RepositoryError>;
    async fn list(&self, filter: &Self::Filter, page: PageRequest) -> Result<Page<T>, RepositoryError>;
    async fn count(&self, filter: &Self::Filter) -> Result<u64, RepositoryError>;
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn within(amount: Money, min: Option<Money>, max: Option<Money>) -> bool {
    min.map_or(true, |m| amount >= m) && max.map_or(true, |m| amount <= m)
}

// ============================================================================
// Filters
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Matches sku or name
    pub search: Option<String>,
    pub category_id: Option<EntityId>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub is_active: Option<bool>,
    pub in_stock: Option<bool>,
}

impl EntityFilter<Product> for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        self.search
            .as_deref()
            .map_or(true, |s| contains_ignore_case(&product.sku, s) || contains_ignore_case(&product.name, s))
            && self.category_id.map_or(true, |id| product.category_id == id)
            && within(product.pricing.price, self.min_price, self.max_price)
            && self.is_active.map_or(true, |active| product.is_active == active)
            && self.in_stock.map_or(true, |in_stock| product.is_in_stock() == in_stock)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFilter {
    /// Matches code, names or company
    pub search: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub source: Option<CustomerSource>,
    pub is_active: Option<bool>,
}

impl EntityFilter<Customer> for CustomerFilter {
    fn matches(&self, customer: &Customer) -> bool {
        self.search.as_deref().map_or(true, |s| {
            contains_ignore_case(&customer.customer_code, s)
                || contains_ignore_case(&customer.display_name(), s)
        }) && self.customer_type.map_or(true, |t| customer.customer_type == t)
            && self.source.map_or(true, |source| customer.source == source)
            && self.is_active.map_or(true, |active| customer.is_active == active)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub customer_id: Option<EntityId>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub min_total: Option<Money>,
    pub max_total: Option<Money>,
    pub ordered_from: Option<DateTime<Utc>>,
    pub ordered_to: Option<DateTime<Utc>>,
}

impl EntityFilter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        self.customer_id.map_or(true, |id| order.customer_id == id)
            && self.status.map_or(true, |status| order.status == status)
            && self.payment_status.map_or(true, |status| order.payment_status == status)
            && within(order.total_amount, self.min_total, self.max_total)
            && self.ordered_from.map_or(true, |from| order.order_date >= from)
            && self.ordered_to.map_or(true, |to| order.order_date <= to)
    }
}

/// Matches everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyFilter;

impl<T> EntityFilter<T> for AnyFilter {
    fn matches(&self, _: &T) -> bool {
        true
    }
}

// ============================================================================
// Entity Bindings
// ============================================================================

impl Entity for Product {
    fn id(&self) -> EntityId {
        self.id
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("sku", self.sku.clone()))
    }
}

impl Entity for ProductVariant {
    fn id(&self) -> EntityId {
        self.id
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("sku", self.sku.clone()))
    }
}

impl Entity for ProductCategory {
    fn id(&self) -> EntityId {
        self.id
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("path", self.path.clone()))
    }
}

impl Entity for Customer {
    fn id(&self) -> EntityId {
        self.id
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("customer_code", self.customer_code.clone()))
    }
}

impl Entity for OrderAddress {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Order {
    fn id(&self) -> EntityId {
        self.id
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("order_number", self.order_number.clone()))
    }
}
