use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::primitives::Money;

// ============================================================================
// Core Configuration
// ============================================================================
//
// Tunable defaults for the calculation engine and the order validator.
// Loaded from JSON or from ERP_* environment variables; anything missing
// falls back to `Default`.
//
// ============================================================================

pub const ENV_DEFAULT_TAX_RATE: &str = "ERP_DEFAULT_TAX_RATE";
pub const ENV_DEFAULT_SHIPPING_COST: &str = "ERP_DEFAULT_SHIPPING_COST";
pub const ENV_LARGE_ORDER_THRESHOLD: &str = "ERP_LARGE_ORDER_THRESHOLD";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange { name: String, value: Decimal, min: Decimal, max: Decimal },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationSettings {
    /// Percentage applied to items without their own tax rate
    pub default_tax_rate: Decimal,
    /// Shipping charged when the caller supplies none
    pub default_shipping_cost: Money,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            default_tax_rate: Decimal::ZERO,
            default_shipping_cost: Money::ZERO,
        }
    }
}

impl CalculationSettings {
    /// Flat-rate profile: every untaxed item pays the standard rate
    pub fn flat_rate(rate: Decimal, shipping: Money) -> Self {
        Self {
            default_tax_rate: rate,
            default_shipping_cost: shipping,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Totals above this raise a large-order warning
    pub large_order_threshold: Money,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            large_order_threshold: Money::new(dec!(10000)),
        }
    }
}

impl ValidationSettings {
    /// Flag more orders for manual review
    pub fn strict() -> Self {
        Self {
            large_order_threshold: Money::new(dec!(1000)),
        }
    }

    /// Wholesale-sized orders are routine
    pub fn lenient() -> Self {
        Self {
            large_order_threshold: Money::new(dec!(100000)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub calculation: CalculationSettings,
    pub validation: ValidationSettings,
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Defaults overridden by whichever ERP_* variables are set
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `from_env` over an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CoreConfig::default();
        if let Some(raw) = lookup(ENV_DEFAULT_TAX_RATE) {
            config.calculation.default_tax_rate = parse_decimal(ENV_DEFAULT_TAX_RATE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_SHIPPING_COST) {
            config.calculation.default_shipping_cost = parse_decimal(ENV_DEFAULT_SHIPPING_COST, &raw)?.into();
        }
        if let Some(raw) = lookup(ENV_LARGE_ORDER_THRESHOLD) {
            config.validation.large_order_threshold = parse_decimal(ENV_LARGE_ORDER_THRESHOLD, &raw)?.into();
        }
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        ensure_range(
            "default_tax_rate",
            self.calculation.default_tax_rate,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        )?;
        ensure_range(
            "default_shipping_cost",
            self.calculation.default_shipping_cost.amount(),
            Decimal::ZERO,
            Decimal::MAX,
        )?;
        ensure_range(
            "large_order_threshold",
            self.validation.large_order_threshold.amount(),
            Decimal::ZERO,
            Decimal::MAX,
        )
    }
}

fn parse_decimal(name: &str, raw: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

fn ensure_range(name: &str, value: Decimal, min: Decimal, max: Decimal) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { name: name.to_string(), value, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.calculation.default_tax_rate, Decimal::ZERO);
        assert_eq!(config.validation.large_order_threshold, Money::new(dec!(10000)));
    }

    #[test]
    fn test_presets() {
        assert!(ValidationSettings::strict().large_order_threshold < ValidationSettings::default().large_order_threshold);
        assert!(ValidationSettings::lenient().large_order_threshold > ValidationSettings::default().large_order_threshold);
        let flat = CalculationSettings::flat_rate(dec!(7.25), Money::new(dec!(4.99)));
        assert_eq!(flat.default_tax_rate, dec!(7.25));
    }

    #[test]
    fn test_from_json_partial() {
        let config = CoreConfig::from_json(r#"{"calculation": {"default_tax_rate": "8.5"}}"#).unwrap();
        assert_eq!(config.calculation.default_tax_rate, dec!(8.5));
        assert_eq!(config.calculation.default_shipping_cost, Money::ZERO);
        assert_eq!(config.validation, ValidationSettings::default());
    }

    #[test]
    fn test_from_json_rejects_out_of_range() {
        let err = CoreConfig::from_json(r#"{"calculation": {"default_tax_rate": "120"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        assert!(matches!(CoreConfig::from_json("{not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_DEFAULT_TAX_RATE, "6"),
            (ENV_DEFAULT_SHIPPING_COST, " 12.50 "),
        ]);
        let config = CoreConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.calculation.default_tax_rate, dec!(6));
        assert_eq!(config.calculation.default_shipping_cost, Money::new(dec!(12.50)));
        assert_eq!(config.validation.large_order_threshold, Money::new(dec!(10000)));
    }

    #[test]
    fn test_from_lookup_invalid_value() {
        let err = CoreConfig::from_lookup(|name| (name == ENV_LARGE_ORDER_THRESHOLD).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == ENV_LARGE_ORDER_THRESHOLD));
    }
}
