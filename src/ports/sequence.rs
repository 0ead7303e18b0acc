use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

use super::repository::RepositoryError;
use crate::domain::order::{format_order_number, order_number_from_clock, ORDER_SEQUENCE_MODULUS};

// ============================================================================
// Order Number Sequence Port
// ============================================================================

#[async_trait]
pub trait OrderNumberSequence: Send + Sync {
    /// Next `YYYY-NNNNNN` number for an order placed at `now`
    async fn next_order_number(&self, now: DateTime<Utc>) -> Result<String, RepositoryError>;
}

/// Monotonic counter; collision-free within one process
#[derive(Debug, Default)]
pub struct InMemoryOrderSequence {
    counter: AtomicU64,
}

impl InMemoryOrderSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after the last number already handed out
    pub fn starting_after(last: u64) -> Self {
        Self {
            counter: AtomicU64::new(last),
        }
    }
}

#[async_trait]
impl OrderNumberSequence for InMemoryOrderSequence {
    async fn next_order_number(&self, now: DateTime<Utc>) -> Result<String, RepositoryError> {
        let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if next >= ORDER_SEQUENCE_MODULUS {
            return Err(RepositoryError::Backend(format!(
                "order sequence exhausted after {}",
                ORDER_SEQUENCE_MODULUS - 1
            )));
        }
        Ok(format_order_number(now.year(), next))
    }
}

/// Seconds-based numbers; only safe for tests and demos
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockOrderSequence;

#[async_trait]
impl OrderNumberSequence for ClockOrderSequence {
    async fn next_order_number(&self, now: DateTime<Utc>) -> Result<String, RepositoryError> {
        Ok(order_number_from_clock(now))
    }
}
