use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Entity Identifier
// ============================================================================
//
// Opaque 128-bit key with a distinguished nil value. Identity fields must
// never hold nil; validators reject it.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::nil()
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ============================================================================
// Id Generation
// ============================================================================

/// Source of fresh identifiers, injected into factories
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> EntityId;
}

/// Random (v4) identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> EntityId {
        EntityId::new()
    }
}

/// Time-ordered (v7) identifiers, handy when ids double as insertion order
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
    fn next_id(&self) -> EntityId {
        EntityId(Uuid::now_v7())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_is_distinguished() {
        assert!(EntityId::nil().is_nil());
        assert!(!EntityId::new().is_nil());
        assert_eq!(EntityId::default(), EntityId::nil());
    }

    #[test]
    fn test_generators_produce_distinct_ids() {
        let a = RandomIds.next_id();
        let b = RandomIds.next_id();
        assert_ne!(a, b);

        let c = TimeOrderedIds.next_id();
        let d = TimeOrderedIds.next_id();
        assert_ne!(c, d);
        assert!(!c.is_nil());
    }

    #[test]
    fn test_parse_and_display() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_uuid() {
        let id = EntityId::nil();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
