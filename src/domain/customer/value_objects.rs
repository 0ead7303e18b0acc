use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ============================================================================
// Customer Value Objects
// ============================================================================

/// Legal form of the customer
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    #[default]
    Individual,
    Business,
    Government,
    NonProfit,
}

impl CustomerType {
    /// Organisations are invoiced under a company name
    pub fn is_organisation(&self) -> bool {
        !matches!(self, CustomerType::Individual)
    }
}

/// Acquisition channel
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerSource {
    #[default]
    Web,
    Phone,
    Email,
    Referral,
    WalkIn,
    Social,
    Advertisement,
    Other,
}

// ============================================================================
// Unit Tests
// ============================================================================
