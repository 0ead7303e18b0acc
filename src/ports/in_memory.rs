use async_trait::async_trait;
use std::marker::PhantomData;
use tokio::sync::RwLock;

use super::repository::{Entity, EntityFilter, Page, PageRequest, Repository, RepositoryError};
use crate::primitives::EntityId;

// ============================================================================
// In-Memory Repository
// ============================================================================
//
// Reference implementation of the repository port. Linear scans over an
// insertion-ordered Vec; writes hold the lock for the whole check-then-act,
// so uniqueness checks cannot race.
//
// ============================================================================

pub struct InMemoryRepository<T: Entity, F> {
    entity_name: &'static str,
    rows: RwLock<Vec<T>>,
    _filter: PhantomData<fn(&F)>,
}

impl<T: Entity, F> InMemoryRepository<T, F> {
    pub fn new(entity_name: &'static str) -> Self {
        Self {
            entity_name,
            rows: RwLock::new(Vec::new()),
            _filter: PhantomData,
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_unique(&self, rows: &[T], entity: &T) -> Result<(), RepositoryError> {
        let Some((field, value)) = entity.unique_key() else {
            return Ok(());
        };
        let taken = rows
            .iter()
            .filter(|row| row.id() != entity.id())
            .filter_map(|row| row.unique_key())
            .any(|(_, other)| other == value);
        if taken {
            tracing::warn!(entity = self.entity_name, field = field, value = %value, "Uniqueness violation");
            return Err(RepositoryError::Duplicate { field, value });
        }
        Ok(())
    }
}

#[async_trait]
impl<T, F> Repository<T> for InMemoryRepository<T, F>
where
    T: Entity,
    F: EntityFilter<T> + 'static,
{
    type Filter = F;

    async fn create(&self, entity: T) -> Result<T, RepositoryError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == entity.id()) {
            return Err(RepositoryError::AlreadyExists(entity.id()));
        }
        self.check_unique(&rows, &entity)?;
        rows.push(entity.clone());
        tracing::debug!(entity = self.entity_name, id = %entity.id(), "Created");
        Ok(entity)
    }

    async fn get_by_id(&self, id: EntityId) -> Result<T, RepositoryError> {
        self.rows
            .read()
            .await
            .iter()
            .find(|row| row.id() == id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn update(&self, entity: T) -> Result<T, RepositoryError> {
        let mut rows = self.rows.write().await;
        self.check_unique(&rows, &entity)?;
        let slot = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or(RepositoryError::NotFound(entity.id()))?;
        *slot = entity.clone();
        tracing::debug!(entity = self.entity_name, id = %entity.id(), "Updated");
        Ok(entity)
    }

    async fn delete(&self, id: EntityId) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or(RepositoryError::NotFound(id))?;
        rows.remove(index);
        tracing::debug!(entity = self.entity_name, id = %id, "Deleted");
        Ok(())
    }

    async fn list(&self, filter: &F, page: PageRequest) -> Result<Page<T>, RepositoryError> {
        let rows = self.rows.read().await;
        let matching: Vec<&T> = rows.iter().filter(|row| filter.matches(row)).collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn count(&self, filter: &F) -> Result<u64, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|row| filter.matches(row)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{Customer, CustomerSource, CustomerType, NewCustomer};
    use crate::ports::repository::{AnyFilter, CustomerFilter};
    use crate::primitives::{FixedClock, Money, RandomIds};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    type CustomerRepo = InMemoryRepository<Customer, CustomerFilter>;

    fn create_test_customer(code: &str, customer_type: CustomerType) -> Customer {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        Customer::create(
            NewCustomer {
                customer_code: code.to_string(),
                customer_type,
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: None,
                company_name: customer_type.is_organisation().then(|| "Navy Labs".to_string()),
                credit_limit: Money::new(dec!(1000)),
                source: CustomerSource::Referral,
            },
            &RandomIds,
            &clock,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let repo = CustomerRepo::new("customer");
        let mut customer = create_test_customer("C-001", CustomerType::Individual);
        repo.create(customer.clone()).await.unwrap();

        let loaded = repo.get_by_id(customer.id).await.unwrap();
        assert_eq!(loaded, customer);

        customer.notes = Some("prefers email".to_string());
        repo.update(customer.clone()).await.unwrap();
        assert_eq!(repo.get_by_id(customer.id).await.unwrap().notes.as_deref(), Some("prefers email"));

        repo.delete(customer.id).await.unwrap();
        assert!(matches!(repo.get_by_id(customer.id).await, Err(RepositoryError::NotFound(_))));
        assert!(repo.delete(customer.id).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_natural_key() {
        let repo = CustomerRepo::new("customer");
        repo.create(create_test_customer("C-001", CustomerType::Individual)).await.unwrap();

        let err = repo.create(create_test_customer("C-001", CustomerType::Business)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { field: "customer_code", .. }));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_id() {
        let repo = CustomerRepo::new("customer");
        let customer = create_test_customer("C-001", CustomerType::Individual);
        repo.create(customer.clone()).await.unwrap();
        assert!(matches!(repo.create(customer).await, Err(RepositoryError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let repo = CustomerRepo::new("customer");
        let customer = create_test_customer("C-404", CustomerType::Individual);
        assert!(matches!(repo.update(customer).await, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filter_and_paginate() {
        let repo = CustomerRepo::new("customer");
        for i in 0..5 {
            repo.create(create_test_customer(&format!("B-{:03}", i), CustomerType::Business)).await.unwrap();
        }
        repo.create(create_test_customer("I-001", CustomerType::Individual)).await.unwrap();

        let filter = CustomerFilter {
            customer_type: Some(CustomerType::Business),
            ..Default::default()
        };
        assert_eq!(repo.count(&filter).await.unwrap(), 5);

        let page = repo.list(&filter, PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].customer_code, "B-002");
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next && page.has_prev);

        let search = CustomerFilter {
            search: Some("i-00".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&search).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_any_filter() {
        let repo: InMemoryRepository<Customer, AnyFilter> = InMemoryRepository::new("customer");
        repo.create(create_test_customer("C-1", CustomerType::Individual)).await.unwrap();
        assert_eq!(repo.count(&AnyFilter).await.unwrap(), 1);
    }
}
