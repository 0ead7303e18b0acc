use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::errors::CustomerError;
use super::value_objects::{CustomerSource, CustomerType};
use crate::primitives::{Clock, EntityId, IdGenerator, Money};
use crate::validation::{patterns, rules, ValidationErrors};

// ============================================================================
// Customer Aggregate - Profile and Credit Ledger
// ============================================================================
//
// The customer owns its credit ledger: `credit_used` only moves through
// `use_credit` / `release_credit`, which keep 0 <= credit_used <= credit_limit.
//
// ============================================================================

pub const MAX_CREDIT_LIMIT: Money = Money::new(dec!(999999999.99));
pub const MAX_CUSTOMER_CODE_LENGTH: usize = 50;
pub const MAX_PERSON_NAME_LENGTH: usize = 100;
pub const MAX_COMPANY_NAME_LENGTH: usize = 200;
pub const DEFAULT_PAYMENT_TERMS: &str = "NET30";
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    // Identity
    pub id: EntityId,
    pub customer_code: String,
    pub customer_type: CustomerType,

    // Contact
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,

    // Organisation
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub industry: Option<String>,

    // Credit & billing
    pub credit_limit: Money,
    pub credit_used: Money,
    pub terms: String,
    pub is_active: bool,
    pub is_vat_exempt: bool,
    pub preferred_currency: String,

    pub notes: Option<String>,
    pub source: CustomerSource,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal input for `Customer::create`
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub customer_code: String,
    pub customer_type: CustomerType,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub credit_limit: Money,
    pub source: CustomerSource,
}

impl Customer {
    pub fn create(new: NewCustomer, ids: &dyn IdGenerator, clock: &dyn Clock) -> Result<Self, CustomerError> {
        let now = clock.now();
        let customer = Self {
            id: ids.next_id(),
            customer_code: new.customer_code,
            customer_type: new.customer_type,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: None,
            website: None,
            company_name: new.company_name,
            tax_id: None,
            industry: None,
            credit_limit: new.credit_limit,
            credit_used: Money::ZERO,
            terms: DEFAULT_PAYMENT_TERMS.to_string(),
            is_active: true,
            is_vat_exempt: false,
            preferred_currency: DEFAULT_CURRENCY.to_string(),
            notes: None,
            source: new.source,
            created_at: now,
            updated_at: now,
        };
        customer.validate()?;
        Ok(customer)
    }

    pub fn validate(&self) -> Result<(), CustomerError> {
        let mut errors = ValidationErrors::new();
        rules::non_nil(&mut errors, "id", self.id);

        rules::required_text(&mut errors, "customer_code", &self.customer_code, MAX_CUSTOMER_CODE_LENGTH);
        if !self.customer_code.trim().is_empty() {
            rules::matches_pattern(
                &mut errors,
                "customer_code",
                &self.customer_code,
                &patterns::CUSTOMER_CODE,
                "may only contain upper-case letters, digits, '-' and '_'",
            );
        }

        rules::required_text(&mut errors, "first_name", &self.first_name, MAX_PERSON_NAME_LENGTH);
        rules::required_text(&mut errors, "last_name", &self.last_name, MAX_PERSON_NAME_LENGTH);

        rules::optional_pattern(&mut errors, "email", self.email.as_deref(), &patterns::EMAIL, "is not a valid email address");
        rules::optional_pattern(&mut errors, "phone", self.phone.as_deref(), &patterns::PHONE, "is not a valid phone number");
        rules::optional_pattern(&mut errors, "website", self.website.as_deref(), &patterns::WEBSITE, "is not a valid website");

        rules::optional_text(&mut errors, "company_name", self.company_name.as_deref(), MAX_COMPANY_NAME_LENGTH);
        if self.customer_type.is_organisation() {
            let has_company = self.company_name.as_deref().map_or(false, |c| !c.trim().is_empty());
            errors.ensure(
                has_company,
                "company_name",
                format!("is required for {} customers", self.customer_type),
            );
        }

        rules::money_within(&mut errors, "credit_limit", self.credit_limit, Money::ZERO, MAX_CREDIT_LIMIT);
        rules::non_negative(&mut errors, "credit_used", self.credit_used);
        errors.ensure(
            self.credit_used <= self.credit_limit,
            "credit_used",
            "must not exceed credit_limit",
        );

        rules::matches_pattern(&mut errors, "terms", &self.terms, &patterns::PAYMENT_TERMS, "must look like NET<days>");
        rules::matches_pattern(
            &mut errors,
            "preferred_currency",
            &self.preferred_currency,
            &patterns::CURRENCY_CODE,
            "must be a 3-letter upper-case currency code",
        );

        errors.into_result().map_err(CustomerError::from)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Company name for organisations, person name otherwise
    pub fn display_name(&self) -> String {
        match self.company_name.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(company) if self.customer_type.is_organisation() => company.to_string(),
            _ => self.full_name(),
        }
    }

    /// Days from `NET<days>` terms
    pub fn payment_terms_days(&self) -> Option<u32> {
        self.terms.strip_prefix("NET").and_then(|d| d.parse().ok())
    }

    // ========================================================================
    // Credit Ledger
    // ========================================================================

    pub fn available_credit(&self) -> Money {
        self.credit_limit - self.credit_used
    }

    pub fn has_available_credit(&self, amount: Money) -> bool {
        self.available_credit() >= amount
    }

    pub fn use_credit(&mut self, amount: Money, clock: &dyn Clock) -> Result<(), CustomerError> {
        if !amount.is_positive() {
            return Err(CustomerError::NonPositiveAmount(amount));
        }
        if !self.has_available_credit(amount) {
            return Err(CustomerError::InsufficientCredit {
                requested: amount,
                available: self.available_credit(),
            });
        }
        self.credit_used += amount;
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn release_credit(&mut self, amount: Money, clock: &dyn Clock) -> Result<(), CustomerError> {
        if !amount.is_positive() {
            return Err(CustomerError::NonPositiveAmount(amount));
        }
        if amount > self.credit_used {
            return Err(CustomerError::ReleaseExceedsUsed {
                requested: amount,
                used: self.credit_used,
            });
        }
        self.credit_used -= amount;
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn update_credit_limit(&mut self, limit: Money, clock: &dyn Clock) -> Result<(), CustomerError> {
        if limit < self.credit_used {
            return Err(CustomerError::LimitBelowUsage {
                limit,
                used: self.credit_used,
            });
        }
        let mut candidate = self.clone();
        candidate.credit_limit = limit;
        candidate.validate()?;
        candidate.updated_at = clock.now();
        *self = candidate;
        Ok(())
    }

    pub fn activate(&mut self, clock: &dyn Clock) {
        self.is_active = true;
        self.updated_at = clock.now();
    }

    pub fn deactivate(&mut self, clock: &dyn Clock) {
        self.is_active = false;
        self.updated_at = clock.now();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
