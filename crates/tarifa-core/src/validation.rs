//! # Validation Module
//!
//! Range checks for request values and pricing policy.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (booking API, CLI)                                    │
//! │  ├── Deserialization (is it a number at all?)                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Request checks  → PricingError::InvalidInput                      │
//! │  └── Policy checks   → PricingError::InvalidConfiguration              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine                                                       │
//! │  └── Gross-up denominator, cent overflow                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal_macros::dec;
//! use tarifa_core::validation::{validate_provider_price, validate_visit_split};
//!
//! assert!(validate_provider_price(dec!(350)).is_ok());
//! assert!(validate_provider_price(dec!(0)).is_err());
//! assert!(validate_visit_split(dec!(100), dec!(150)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::config::{PricingConfig, VisitPreauthConfig};
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a provider price for the sliding engine.
///
/// ## Rules
/// - Must be strictly positive
pub fn validate_provider_price(price_pesos: Decimal) -> ValidationResult<()> {
    if price_pesos <= Decimal::ZERO {
        return Err(ValidationError::must_be_positive("provider_price_pesos"));
    }

    Ok(())
}

/// Validates the split of a fixed-price product.
///
/// ## Rules
/// - Total must be positive
/// - Provider share must be positive
/// - Provider share must be strictly below the total
pub fn validate_visit_split(total_pesos: Decimal, provider_pesos: Decimal) -> ValidationResult<()> {
    if total_pesos <= Decimal::ZERO {
        return Err(ValidationError::must_be_positive("total_pesos"));
    }

    if provider_pesos <= Decimal::ZERO {
        return Err(ValidationError::must_be_positive("provider_pesos"));
    }

    if provider_pesos >= total_pesos {
        return Err(ValidationError::MustBeLessThan {
            field: "provider_pesos".to_string(),
            other: "total_pesos".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Policy Validators
// =============================================================================

/// Validates a rate that must lie in `[0, 1)`.
pub fn validate_rate(field: &str, rate: Decimal) -> ValidationResult<()> {
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(ValidationError::out_of_range(field, "0", "1 (exclusive)"));
    }

    Ok(())
}

fn validate_unit_interval(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::out_of_range(field, 0, 1));
    }

    Ok(())
}

fn validate_positive_f64(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value <= 0.0 {
        return Err(ValidationError::must_be_positive(field));
    }

    Ok(())
}

fn validate_non_negative(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::out_of_range(field, 0, "any"));
    }

    Ok(())
}

/// Validates the sliding-engine policy.
///
/// ## Rules
/// - `alpha_max`, `alpha_min` in [0, 1] with `alpha_min < alpha_max`
/// - `alpha_p0`, `alpha_gamma` positive and finite
/// - `vat_rate`, `stripe_percent`, `stripe_fee_vat_rate` in [0, 1)
/// - `stripe_fixed`, `guardrail_floor_pesos` non-negative
/// - `guardrail_cap_pesos`, `fee_increment_pesos` positive
/// - `guardrail_cap_ratio` in (0, 1]
pub fn validate_pricing_config(config: &PricingConfig) -> ValidationResult<()> {
    validate_unit_interval("alpha_max", config.alpha_max)?;
    validate_unit_interval("alpha_min", config.alpha_min)?;
    if config.alpha_min >= config.alpha_max {
        return Err(ValidationError::MustBeLessThan {
            field: "alpha_min".to_string(),
            other: "alpha_max".to_string(),
        });
    }
    validate_positive_f64("alpha_p0", config.alpha_p0)?;
    validate_positive_f64("alpha_gamma", config.alpha_gamma)?;

    validate_rate("vat_rate", config.vat_rate)?;
    validate_rate("stripe_percent", config.stripe_percent)?;
    validate_rate("stripe_fee_vat_rate", config.stripe_fee_vat_rate)?;
    validate_non_negative("stripe_fixed", config.stripe_fixed)?;

    validate_non_negative("guardrail_floor_pesos", config.guardrail_floor_pesos)?;
    if config.guardrail_cap_pesos <= Decimal::ZERO {
        return Err(ValidationError::must_be_positive("guardrail_cap_pesos"));
    }
    if config.guardrail_cap_ratio <= Decimal::ZERO || config.guardrail_cap_ratio > Decimal::ONE {
        return Err(ValidationError::out_of_range(
            "guardrail_cap_ratio",
            "0 (exclusive)",
            1,
        ));
    }
    if config.fee_increment_pesos <= Decimal::ZERO {
        return Err(ValidationError::must_be_positive("fee_increment_pesos"));
    }

    Ok(())
}

/// Validates the rate fields of the visit product.
pub fn validate_visit_rates(config: &VisitPreauthConfig) -> ValidationResult<()> {
    validate_rate("stripe_percent", config.stripe_percent)?;
    validate_rate("vat_rate", config.vat_rate)?;
    validate_non_negative("stripe_fixed", config.stripe_fixed)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_provider_price() {
        assert!(validate_provider_price(dec!(0.01)).is_ok());
        assert!(validate_provider_price(dec!(1500)).is_ok());

        assert!(validate_provider_price(dec!(0)).is_err());
        assert!(validate_provider_price(dec!(-5)).is_err());
    }

    #[test]
    fn test_validate_visit_split() {
        assert!(validate_visit_split(dec!(140), dec!(90)).is_ok());

        assert!(validate_visit_split(dec!(0), dec!(90)).is_err());
        assert!(validate_visit_split(dec!(140), dec!(0)).is_err());
        assert!(validate_visit_split(dec!(140), dec!(140)).is_err());
        assert_eq!(
            validate_visit_split(dec!(100), dec!(150)),
            Err(ValidationError::MustBeLessThan {
                field: "provider_pesos".to_string(),
                other: "total_pesos".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate("vat_rate", dec!(0)).is_ok());
        assert!(validate_rate("vat_rate", dec!(0.16)).is_ok());
        assert!(validate_rate("vat_rate", dec!(1)).is_err());
        assert!(validate_rate("vat_rate", dec!(-0.01)).is_err());
    }

    #[test]
    fn test_alpha_bounds_must_be_ordered() {
        let config = PricingConfig {
            alpha_min: 0.2,
            alpha_max: 0.1,
            ..Default::default()
        };
        assert!(matches!(
            validate_pricing_config(&config),
            Err(ValidationError::MustBeLessThan { .. })
        ));
    }

    #[test]
    fn test_alpha_params_must_be_finite() {
        let config = PricingConfig {
            alpha_gamma: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            validate_pricing_config(&config),
            Err(ValidationError::NotFinite { .. })
        ));

        let config = PricingConfig {
            alpha_p0: 0.0,
            ..Default::default()
        };
        assert!(validate_pricing_config(&config).is_err());
    }

    #[test]
    fn test_guardrail_values() {
        let config = PricingConfig {
            guardrail_cap_ratio: dec!(0),
            ..Default::default()
        };
        assert!(validate_pricing_config(&config).is_err());

        let config = PricingConfig {
            fee_increment_pesos: dec!(0),
            ..Default::default()
        };
        assert!(validate_pricing_config(&config).is_err());

        let config = PricingConfig {
            guardrail_cap_pesos: dec!(399),
            ..Default::default()
        };
        assert!(validate_pricing_config(&config).is_ok());
    }
}
