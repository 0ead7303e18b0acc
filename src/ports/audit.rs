use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::order::StatusChange;
use crate::primitives::EntityId;

// ============================================================================
// Audit Log Port
// ============================================================================
//
// Receives status changes together with the reason and the acting user,
// which the entities themselves never store.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeRecord {
    pub entity_id: EntityId,
    pub previous_status: String,
    pub new_status: String,
    pub reason: Option<String>,
    pub actor_id: EntityId,
    pub at: DateTime<Utc>,
}

impl StatusChangeRecord {
    pub fn from_change(change: &StatusChange, actor_id: EntityId) -> Self {
        Self {
            entity_id: change.order_id,
            previous_status: change.from.to_string(),
            new_status: change.to.to_string(),
            reason: change.reason.clone(),
            actor_id,
            at: change.at,
        }
    }
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, record: StatusChangeRecord) -> Result<(), AuditError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: RwLock<Vec<StatusChangeRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<StatusChangeRecord> {
        self.records.read().await.clone()
    }

    pub async fn for_entity(&self, entity_id: EntityId) -> Vec<StatusChangeRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.entity_id == entity_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, record: StatusChangeRecord) -> Result<(), AuditError> {
        tracing::debug!(
            entity_id = %record.entity_id,
            from = %record.previous_status,
            to = %record.new_status,
            "Status change recorded"
        );
        self.records.write().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_record_and_query() {
        let log = InMemoryAuditLog::new();
        let order_id = EntityId::new();
        let actor = EntityId::new();
        let change = StatusChange {
            order_id,
            from: OrderStatus::Pending,
            to: OrderStatus::OnHold,
            reason: Some("address check".to_string()),
            at: Utc.with_ymd_and_hms(2024, 9, 1, 10, 0, 0).unwrap(),
        };

        log.record(StatusChangeRecord::from_change(&change, actor)).await.unwrap();
        log.record(StatusChangeRecord::from_change(
            &StatusChange { order_id: EntityId::new(), ..change.clone() },
            actor,
        ))
        .await
        .unwrap();

        let records = log.for_entity(order_id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].previous_status, "PENDING");
        assert_eq!(records[0].new_status, "ON_HOLD");
        assert_eq!(records[0].reason.as_deref(), Some("address check"));
        assert_eq!(log.records().await.len(), 2);
    }
}
