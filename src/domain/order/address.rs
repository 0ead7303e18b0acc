use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::AddressError;
use super::value_objects::AddressType;
use crate::primitives::{Clock, EntityId, IdGenerator};
use crate::validation::{patterns, rules, ValidationErrors};

// ============================================================================
// Order Address - Shipping / Billing Destination
// ============================================================================

pub const MAX_ADDRESS_NAME_LENGTH: usize = 100;
pub const MAX_COMPANY_LENGTH: usize = 200;
pub const MAX_ADDRESS_LINE_LENGTH: usize = 255;
pub const MAX_CITY_LENGTH: usize = 100;
pub const MAX_STATE_LENGTH: usize = 100;
pub const MAX_COUNTRY_LENGTH: usize = 100;
pub const MAX_INSTRUCTIONS_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAddress {
    pub id: EntityId,
    pub customer_id: Option<EntityId>,
    pub order_id: Option<EntityId>,
    pub address_type: AddressType,

    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,

    pub phone: Option<String>,
    pub email: Option<String>,
    pub instructions: Option<String>,

    pub is_default: bool,
    pub is_active: bool,
    pub is_validated: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `OrderAddress::create`
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub customer_id: Option<EntityId>,
    pub order_id: Option<EntityId>,
    pub address_type: AddressType,
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Postal-code rule families, chosen by country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostalRegion {
    UnitedStates,
    Canada,
    UnitedKingdom,
    Other,
}

impl PostalRegion {
    pub fn for_country(country: &str) -> Self {
        match country.trim().to_ascii_uppercase().as_str() {
            "US" | "USA" | "UNITED STATES" | "UNITED STATES OF AMERICA" => PostalRegion::UnitedStates,
            "CA" | "CAN" | "CANADA" => PostalRegion::Canada,
            "GB" | "GBR" | "UK" | "UNITED KINGDOM" | "GREAT BRITAIN" => PostalRegion::UnitedKingdom,
            _ => PostalRegion::Other,
        }
    }

    pub fn accepts(self, postal_code: &str) -> bool {
        let code = postal_code.trim();
        match self {
            PostalRegion::UnitedStates => patterns::US_POSTAL_CODE.is_match(code),
            PostalRegion::Canada => patterns::CA_POSTAL_CODE.is_match(code),
            PostalRegion::UnitedKingdom => patterns::GB_POSTCODE.is_match(code),
            PostalRegion::Other => patterns::GENERIC_POSTAL_CODE.is_match(code),
        }
    }
}

/// Country-aware postal code check
pub fn is_valid_postal_code(country: &str, postal_code: &str) -> bool {
    PostalRegion::for_country(country).accepts(postal_code)
}

impl OrderAddress {
    pub fn create(new: NewAddress, ids: &dyn IdGenerator, clock: &dyn Clock) -> Result<Self, AddressError> {
        let now = clock.now();
        let address = Self {
            id: ids.next_id(),
            customer_id: new.customer_id,
            order_id: new.order_id,
            address_type: new.address_type,
            first_name: new.first_name,
            last_name: new.last_name,
            company: None,
            address_line1: new.address_line1,
            address_line2: None,
            city: new.city,
            state: new.state,
            postal_code: new.postal_code,
            country: new.country,
            phone: None,
            email: None,
            instructions: None,
            is_default: false,
            is_active: true,
            is_validated: false,
            created_at: now,
            updated_at: now,
        };
        address.validate()?;
        Ok(address)
    }

    pub fn validate(&self) -> Result<(), AddressError> {
        let mut errors = ValidationErrors::new();
        rules::non_nil(&mut errors, "id", self.id);

        if self.customer_id.is_none() && self.order_id.is_none() {
            errors.add("customer_id", "either customer_id or order_id is required");
        }
        if let Some(customer_id) = self.customer_id {
            rules::non_nil(&mut errors, "customer_id", customer_id);
        }
        if let Some(order_id) = self.order_id {
            rules::non_nil(&mut errors, "order_id", order_id);
        }

        rules::required_text(&mut errors, "first_name", &self.first_name, MAX_ADDRESS_NAME_LENGTH);
        rules::required_text(&mut errors, "last_name", &self.last_name, MAX_ADDRESS_NAME_LENGTH);
        rules::optional_text(&mut errors, "company", self.company.as_deref(), MAX_COMPANY_LENGTH);
        rules::required_text(&mut errors, "address_line1", &self.address_line1, MAX_ADDRESS_LINE_LENGTH);
        rules::optional_text(&mut errors, "address_line2", self.address_line2.as_deref(), MAX_ADDRESS_LINE_LENGTH);
        rules::required_text(&mut errors, "city", &self.city, MAX_CITY_LENGTH);
        rules::required_text(&mut errors, "state", &self.state, MAX_STATE_LENGTH);
        rules::required_text(&mut errors, "country", &self.country, MAX_COUNTRY_LENGTH);

        if self.postal_code.trim().is_empty() {
            errors.add("postal_code", "is required");
        } else if !is_valid_postal_code(&self.country, &self.postal_code) {
            errors.add(
                "postal_code",
                format!("'{}' is not a valid postal code for {}", self.postal_code, self.country),
            );
        }

        rules::optional_pattern(&mut errors, "phone", self.phone.as_deref(), &patterns::PHONE, "is not a valid phone number");
        rules::optional_pattern(&mut errors, "email", self.email.as_deref(), &patterns::EMAIL, "is not a valid email address");
        rules::optional_text(&mut errors, "instructions", self.instructions.as_deref(), MAX_INSTRUCTIONS_LENGTH);

        errors.into_result().map_err(AddressError::from)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Multi-line postal rendering, empty parts skipped
    pub fn formatted(&self) -> String {
        let mut lines = vec![self.full_name()];
        if let Some(company) = self.company.as_deref().filter(|c| !c.trim().is_empty()) {
            lines.push(company.to_string());
        }
        lines.push(self.address_line1.clone());
        if let Some(line2) = self.address_line2.as_deref().filter(|l| !l.trim().is_empty()) {
            lines.push(line2.to_string());
        }
        lines.push(format!("{}, {} {}", self.city, self.state, self.postal_code));
        lines.push(self.country.clone());
        lines.join("\n")
    }

    pub fn serves_shipping(&self) -> bool {
        matches!(self.address_type, AddressType::Shipping | AddressType::Both)
    }

    pub fn serves_billing(&self) -> bool {
        matches!(self.address_type, AddressType::Billing | AddressType::Both)
    }

    /// Recorded after an external verification service accepted the address
    pub fn mark_validated(&mut self, clock: &dyn Clock) {
        self.is_validated = true;
        self.updated_at = clock.now();
    }

    pub fn set_default(&mut self, is_default: bool, clock: &dyn Clock) {
        self.is_default = is_default;
        self.updated_at = clock.now();
    }
}
