//! # Sliding Pricing Engine
//!
//! Turns a provider price into a booking fee, a grossed-up processing fee and
//! VAT.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  P (provider price, pesos)                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  alpha = a_min + (a_max - a_min) / (1 + (P / p0)^gamma)     (f64)      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  raw   = alpha * P + beta                                               │
//! │  fee   = clamp(raw, floor, min(cap, 0.20 * P))                          │
//! │  fee   = ceil(fee / 5) * 5                          → booking cents    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  p_eff = pct * (1 + fee_vat)      f_eff = fixed * (1 + fee_vat)         │
//! │  proc  = (p_eff*P + p_eff*(1+vat)*fee + f_eff) / (1 - p_eff*(1+vat))    │
//! │                                                     → ceil cents       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  vat   = ceil((booking + proc) * vat_rate)          → cents            │
//! │  total = provider + booking + proc + vat            (exact sum)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why gross up?
//! The processor takes `p_eff * total + f_eff` out of the charge. Solving for
//! the processing fee that exactly covers that cut leaves the provider price
//! and the booking fee intact after settlement.
//!
//! ## Example
//! ```rust
//! use rust_decimal_macros::dec;
//! use tarifa_core::config::PricingConfig;
//! use tarifa_core::pricing::compute_pricing;
//! use tarifa_core::types::PricingInput;
//!
//! let result = compute_pricing(&PricingInput::new(dec!(500)), &PricingConfig::default()).unwrap();
//! assert_eq!(result.provider_amount_cents, 50_000);
//! assert_eq!(result.booking_fee_amount_cents, 8_500);
//! assert!(result.is_reconciled());
//! ```

use rust_decimal::prelude::*;
use tracing::debug;

use crate::config::PricingConfig;
use crate::error::{CoreResult, PricingError, ValidationError};
use crate::money::{Money, Rounding};
use crate::types::{PricingComponents, PricingInput, PricingResult, SlidingComponents};
use crate::validation::validate_provider_price;

// =============================================================================
// Entry Point
// =============================================================================

/// Computes the itemized charge for a provider price.
///
/// `policy` is the deployment policy; `input.overrides` are layered on top for
/// this call only.
///
/// ## Errors
/// - [`PricingError::InvalidInput`] when the price is not positive or the
///   amounts overflow `i64` cents
/// - [`PricingError::InvalidConfiguration`] when the effective policy is out
///   of range or the gross-up has no positive solution
pub fn compute_pricing(input: &PricingInput, policy: &PricingConfig) -> CoreResult<PricingResult> {
    validate_provider_price(input.provider_price_pesos).map_err(PricingError::InvalidInput)?;

    if !input.overrides.is_empty() {
        debug!(overrides = ?input.overrides, "Applying per-call policy overrides");
    }
    let config = policy.with_overrides(&input.overrides);
    config.validate()?;

    let price = input.provider_price_pesos;

    // Booking fee
    let price_f64 = price.to_f64().ok_or_else(|| too_large("provider_price_pesos"))?;
    let alpha = alpha_rate(price_f64, &config);
    let alpha_dec = Decimal::from_f64(alpha).ok_or_else(|| {
        PricingError::InvalidConfiguration(ValidationError::NotFinite {
            field: "alpha".to_string(),
        })
    })?;

    let raw_fee = alpha_dec
        .checked_mul(price)
        .and_then(|fee| fee.checked_add(config.beta))
        .ok_or_else(|| too_large("booking_fee"))?;

    let guardrail = Guardrail::for_price(price, &config);
    let clamped_fee = guardrail.clamp(raw_fee);
    let booking_fee_pesos = round_up_to_increment(clamped_fee, config.fee_increment_pesos)
        .ok_or_else(|| policy_overflow("fee_increment_pesos"))?;
    let booking_fee = Money::from_pesos(booking_fee_pesos, Rounding::HalfAwayFromZero)
        .ok_or_else(|| too_large("booking_fee"))?;

    // Processing fee
    let gross_up = GrossUp::new(&config)?;
    let processing_fee_pesos = gross_up
        .processing_fee(price, booking_fee.to_pesos())
        .ok_or_else(|| too_large("processing_fee"))?;
    let processing_fee = Money::from_pesos(processing_fee_pesos, Rounding::Up)
        .ok_or_else(|| too_large("processing_fee"))?;

    // VAT on everything the platform bills
    let vat = booking_fee
        .checked_add(processing_fee)
        .and_then(|platform_fees| platform_fees.apply_rate_ceil(config.vat_rate))
        .ok_or_else(|| too_large("vat"))?;

    let provider = Money::from_pesos(price, Rounding::HalfAwayFromZero)
        .ok_or_else(|| too_large("provider_price_pesos"))?;

    debug!(
        provider_price = %price,
        alpha,
        raw_fee = %raw_fee,
        booking_fee_cents = booking_fee.cents(),
        processing_fee_cents = processing_fee.cents(),
        vat_cents = vat.cents(),
        "Computed sliding pricing"
    );

    let components = SlidingComponents {
        alpha,
        raw_booking_fee_pesos: raw_fee,
        guardrail_floor_pesos: guardrail.floor,
        guardrail_upper_pesos: guardrail.upper,
        clamped_booking_fee_pesos: clamped_fee,
        booking_fee_pesos,
        stripe_percent: config.stripe_percent,
        effective_processing_rate: gross_up.rate,
        effective_processing_fixed_pesos: gross_up.fixed,
        processing_fee_pesos,
        vat_rate: config.vat_rate,
    };

    PricingResult::from_parts(
        provider,
        booking_fee,
        processing_fee,
        vat,
        PricingComponents::Sliding(components),
    )
    .ok_or_else(|| too_large("total"))
}

fn too_large(field: &str) -> PricingError {
    PricingError::InvalidInput(ValidationError::TooLarge {
        field: field.to_string(),
    })
}

/// A policy value in range on its own that still overflows the arithmetic.
fn policy_overflow(field: &str) -> PricingError {
    PricingError::InvalidConfiguration(ValidationError::TooLarge {
        field: field.to_string(),
    })
}

// =============================================================================
// Alpha Curve
// =============================================================================

/// Booking-fee rate for a provider price.
///
/// Decreasing in the price: cheap tickets pay close to `alpha_max`, expensive
/// ones approach `alpha_min`. At `P = alpha_p0` the rate sits halfway.
///
/// ## Precision
/// Evaluated in `f64`. The result stays strictly inside
/// `(alpha_min, alpha_max)` only while `f64` can still resolve the tail of
/// the curve; with the default policy that holds at least up to
/// `P = 1e15` pesos. Far beyond that the rate rounds to exactly `alpha_min`,
/// which is harmless because the guardrail cap governs the booking fee there.
///
/// ## Example
/// ```rust
/// use tarifa_core::config::PricingConfig;
/// use tarifa_core::pricing::alpha_rate;
///
/// let config = PricingConfig::default();
/// let midpoint = (config.alpha_max + config.alpha_min) / 2.0;
/// assert!((alpha_rate(config.alpha_p0, &config) - midpoint).abs() < 1e-12);
/// ```
pub fn alpha_rate(price_pesos: f64, config: &PricingConfig) -> f64 {
    let scaled = (price_pesos / config.alpha_p0).powf(config.alpha_gamma);
    config.alpha_min + (config.alpha_max - config.alpha_min) / (1.0 + scaled)
}

// =============================================================================
// Guardrail
// =============================================================================

/// Floor and ceiling for the booking fee at one price.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Guardrail {
    floor: Decimal,
    upper: Decimal,
}

impl Guardrail {
    fn for_price(price: Decimal, config: &PricingConfig) -> Self {
        let proportional_cap = config.guardrail_cap_ratio * price;
        Guardrail {
            floor: config.guardrail_floor_pesos,
            upper: config.guardrail_cap_pesos.min(proportional_cap),
        }
    }

    /// Clamps into `[floor, upper]`.
    ///
    /// Below `floor / cap_ratio` the bounds invert (`upper < floor`); the
    /// ceiling wins so cheap tickets never pay more than `cap_ratio` of P.
    fn clamp(&self, fee: Decimal) -> Decimal {
        fee.max(self.floor).min(self.upper)
    }
}

/// `ceil(fee / increment) * increment`, `None` on overflow.
fn round_up_to_increment(fee: Decimal, increment: Decimal) -> Option<Decimal> {
    fee.checked_div(increment)?.ceil().checked_mul(increment)
}

// =============================================================================
// Processing-Fee Gross-Up
// =============================================================================

/// Effective processor parameters, VAT on the processor fee included.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GrossUp {
    rate: Decimal,
    fixed: Decimal,
    vat_factor: Decimal,
    denominator: Decimal,
}

impl GrossUp {
    fn new(config: &PricingConfig) -> CoreResult<Self> {
        let fee_vat_factor = Decimal::ONE + config.stripe_fee_vat_rate;
        let rate = config.stripe_percent * fee_vat_factor;
        let fixed = config
            .stripe_fixed
            .checked_mul(fee_vat_factor)
            .ok_or_else(|| policy_overflow("stripe_fixed"))?;
        let vat_factor = Decimal::ONE + config.vat_rate;
        let denominator = Decimal::ONE - rate * vat_factor;

        if denominator <= Decimal::ZERO {
            return Err(PricingError::InvalidConfiguration(
                ValidationError::NonPositiveDenominator {
                    denominator: denominator.to_string(),
                },
            ));
        }

        Ok(GrossUp {
            rate,
            fixed,
            vat_factor,
            denominator,
        })
    }

    /// Processing fee (pesos) that covers the processor's cut of the whole
    /// charge, including the VAT on the platform fees.
    fn processing_fee(&self, price: Decimal, booking_fee: Decimal) -> Option<Decimal> {
        let numerator = self
            .rate
            .checked_mul(price)?
            .checked_add(self.rate.checked_mul(self.vat_factor)?.checked_mul(booking_fee)?)?
            .checked_add(self.fixed)?;
        numerator.checked_div(self.denominator)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingOverrides;
    use rust_decimal_macros::dec;

    fn quote(price: Decimal) -> PricingResult {
        compute_pricing(&PricingInput::new(price), &PricingConfig::default()).unwrap()
    }

    fn sliding(result: &PricingResult) -> &SlidingComponents {
        match &result.components {
            PricingComponents::Sliding(components) => components,
            other => panic!("expected sliding components, got {:?}", other),
        }
    }

    #[test]
    fn test_mid_price_quote() {
        // P = 500: alpha ≈ 0.1454, raw ≈ 81.69 → 85 pesos
        let result = quote(dec!(500));
        assert_eq!(result.provider_amount_cents, 50_000);
        assert_eq!(result.booking_fee_amount_cents, 8_500);
        // (0.04756*500 + 0.04756*1.16*85 + 3.48) / (1 - 0.04756*1.16) = 33.81497.. → 3382
        assert_eq!(result.processing_fee_amount_cents, 3_382);
        // (8500 + 3382) * 0.16 = 1901.12 → 1902
        assert_eq!(result.vat_amount_cents, 1_902);
        assert_eq!(result.total_amount_cents, 63_784);
        assert!(result.is_reconciled());
    }

    #[test]
    fn test_cheap_ticket_uses_proportional_ceiling() {
        // P = 100: floor 40 > 0.20 * 100 = 20, ceiling wins
        let result = quote(dec!(100));
        let components = sliding(&result);
        assert_eq!(components.guardrail_upper_pesos, dec!(20.00));
        assert_eq!(components.clamped_booking_fee_pesos, dec!(20.00));
        assert_eq!(result.booking_fee_amount_cents, 2_000);
    }

    #[test]
    fn test_floor_applies_above_crossover() {
        // P = 250: raw ≈ 0.17 * 250 + 9 ≈ 48 → upper = 50, fee rounds to 50
        let result = quote(dec!(250));
        let components = sliding(&result);
        assert!(components.clamped_booking_fee_pesos >= dec!(40));
        assert!(components.clamped_booking_fee_pesos <= dec!(50));
        assert_eq!(result.booking_fee_amount_cents % 500, 0);
    }

    #[test]
    fn test_expensive_ticket_hits_fixed_cap() {
        let result = quote(dec!(10000));
        let components = sliding(&result);
        assert_eq!(components.guardrail_upper_pesos, dec!(500));
        assert_eq!(result.booking_fee_amount_cents, 50_000);
    }

    #[test]
    fn test_lower_cap_policy() {
        let policy = PricingConfig {
            guardrail_cap_pesos: dec!(399),
            ..Default::default()
        };
        let result = compute_pricing(&PricingInput::new(dec!(10000)), &policy).unwrap();
        // 399 rounds up to the next multiple of 5
        assert_eq!(result.booking_fee_amount_cents, 40_000);
    }

    #[test]
    fn test_rejects_non_positive_price() {
        for price in [dec!(0), dec!(-5)] {
            let err = compute_pricing(&PricingInput::new(price), &PricingConfig::default())
                .unwrap_err();
            assert!(err.is_input_error(), "price {} gave {:?}", price, err);
        }
    }

    #[test]
    fn test_rejects_impossible_gross_up() {
        let policy = PricingConfig {
            stripe_percent: dec!(0.9),
            ..Default::default()
        };
        let err = compute_pricing(&PricingInput::new(dec!(500)), &policy).unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration(ValidationError::NonPositiveDenominator { .. })
        ));
    }

    #[test]
    fn test_override_out_of_range_is_configuration_error() {
        let input = PricingInput::new(dec!(500)).with_overrides(PricingOverrides {
            vat_rate: Some(dec!(1.5)),
            ..Default::default()
        });
        let err = compute_pricing(&input, &PricingConfig::default()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_overrides_change_the_quote() {
        let no_vat = PricingInput::new(dec!(500)).with_overrides(PricingOverrides {
            vat_rate: Some(dec!(0)),
            ..Default::default()
        });
        let result = compute_pricing(&no_vat, &PricingConfig::default()).unwrap();
        assert_eq!(result.vat_amount_cents, 0);
        assert!(result.is_reconciled());
    }

    #[test]
    fn test_fractional_price_rounds_provider_half_up() {
        let result = quote(dec!(333.335));
        assert_eq!(result.provider_amount_cents, 33_334);
        assert!(result.is_reconciled());
    }

    #[test]
    fn test_gross_up_solves_fixed_point() {
        // F = p_eff * (P + B + F + vat * (B + F)) + f_eff
        let result = quote(dec!(1234.56));
        let c = sliding(&result);
        let price = dec!(1234.56);
        let booking = c.booking_fee_pesos;
        let fee = c.processing_fee_pesos;
        let charge = price + booking + fee + c.vat_rate * (booking + fee);
        let processor_cut = c.effective_processing_rate * charge + c.effective_processing_fixed_pesos;
        assert!((fee - processor_cut).abs() < dec!(0.000000001));
        assert_eq!(result.processing_fee_amount_cents, 7_517);
    }

    #[test]
    fn test_alpha_is_decreasing() {
        let config = PricingConfig::default();
        let cheap = alpha_rate(50.0, &config);
        let mid = alpha_rate(1200.0, &config);
        let dear = alpha_rate(50_000.0, &config);
        assert!(cheap > mid && mid > dear);
        assert!(cheap < config.alpha_max);
        assert!(dear > config.alpha_min);
    }

    #[test]
    fn test_alpha_reaches_min_only_for_absurd_prices() {
        let config = PricingConfig::default();
        assert!(alpha_rate(1e12, &config) > config.alpha_min);
        assert!(alpha_rate(1e30, &config) >= config.alpha_min);
    }

    #[test]
    fn test_round_up_to_increment() {
        assert_eq!(round_up_to_increment(dec!(40), dec!(5)), Some(dec!(40)));
        assert_eq!(round_up_to_increment(dec!(40.01), dec!(5)), Some(dec!(45)));
        assert_eq!(round_up_to_increment(dec!(81.69), dec!(5)), Some(dec!(85)));
        assert_eq!(round_up_to_increment(dec!(500), Decimal::new(1, 28)), None);
    }

    #[test]
    fn test_total_overflow_is_input_error() {
        // Every line item fits in i64 cents, their sum does not
        let err = compute_pricing(
            &PricingInput::new(dec!(88000000000000000)),
            &PricingConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidInput(ValidationError::TooLarge {
                field: "total".to_string()
            })
        );
    }

    #[test]
    fn test_tiny_fee_increment_is_configuration_error() {
        let policy = PricingConfig {
            fee_increment_pesos: Decimal::new(1, 28),
            ..Default::default()
        };
        assert!(policy.validate().is_ok());
        let err = compute_pricing(&PricingInput::new(dec!(10000)), &policy).unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidConfiguration(ValidationError::TooLarge {
                field: "fee_increment_pesos".to_string()
            })
        );
    }

    #[test]
    fn test_huge_processor_fixed_fee_is_configuration_error() {
        let policy = PricingConfig {
            stripe_fixed: Decimal::MAX,
            ..Default::default()
        };
        assert!(policy.validate().is_ok());
        let err = compute_pricing(&PricingInput::new(dec!(500)), &policy).unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration(_)));
    }
}
