//! # Visit Preauthorization Splitter
//!
//! Splits the fixed price of the flat-fee visit product into provider payout,
//! processing fee, booking fee and VAT.
//!
//! ## Residual Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total (fixed)                                                          │
//! │  ├── provider (fixed)                                                   │
//! │  └── non-provider = total - provider                                    │
//! │       ├── processing = round(pct * total + fixed)     (on the total)   │
//! │       ├── base       = round(non-provider / (1 + vat))                  │
//! │       ├── booking    = max(0, base - processing)      ← SLACK LINE     │
//! │       └── vat        = max(0, non-provider - base)                      │
//! │                                                                         │
//! │  Each step rounds on its own, so the parts are reconciled afterwards:  │
//! │  pass 1: residue → booking (floored at 0)                              │
//! │  pass 2: if the floor kicked in, residue → booking again (no floor)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The booking fee absorbs all rounding noise. It only goes negative when the
//! processing fee alone exceeds the non-provider remainder, which means the
//! product is mispriced; that case is logged.
//!
//! ## Example
//! ```rust
//! use tarifa_core::config::VisitPreauthConfig;
//! use tarifa_core::preauth::compute_visit_preauth;
//!
//! let result = compute_visit_preauth(&VisitPreauthConfig::default()).unwrap();
//! assert_eq!(result.total_amount_cents, 14_000);
//! assert_eq!(result.provider_amount_cents, 9_000);
//! ```

use rust_decimal::prelude::*;
use tracing::{debug, warn};

use crate::config::VisitPreauthConfig;
use crate::error::{CoreResult, PricingError, ValidationError};
use crate::money::{Money, Rounding};
use crate::types::{PreauthComponents, PricingComponents, PricingResult};
use crate::validation::validate_visit_split;

/// Splits the visit price described by `visit`.
///
/// ## Errors
/// - [`PricingError::InvalidInput`] when the total or provider share is not
///   positive, or the share is not strictly below the total (also after
///   rounding to cents)
/// - [`PricingError::InvalidConfiguration`] when a rate is out of range
pub fn compute_visit_preauth(visit: &VisitPreauthConfig) -> CoreResult<PricingResult> {
    validate_visit_split(visit.total_pesos, visit.provider_pesos)
        .map_err(PricingError::InvalidInput)?;
    visit.validate()?;

    let total = to_cents(visit.total_pesos, "total_pesos")?;
    let provider = to_cents(visit.provider_pesos, "provider_pesos")?;
    if !provider.is_positive() || provider >= total {
        return Err(PricingError::InvalidInput(ValidationError::MustBeLessThan {
            field: "provider_pesos".to_string(),
            other: "total_pesos".to_string(),
        }));
    }

    // 0 < provider < total, cannot overflow
    let non_provider = total - provider;

    // Processing fee on the whole charge; a fixed price needs no gross-up.
    let fixed_cents = visit
        .stripe_fixed
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| policy_overflow("stripe_fixed"))?;
    let processing_exact = visit
        .stripe_percent
        .checked_mul(Decimal::from(total.cents()))
        .and_then(|fee| fee.checked_add(fixed_cents))
        .ok_or_else(|| policy_overflow("stripe_fixed"))?;
    let processing = Money::from_fractional_cents(processing_exact, Rounding::HalfAwayFromZero)
        .ok_or_else(|| policy_overflow("stripe_fixed"))?;

    // Back the VAT out of the non-provider remainder.
    let base_exact = Decimal::from(non_provider.cents()) / (Decimal::ONE + visit.vat_rate);
    let base_before_vat = Money::from_fractional_cents(base_exact, Rounding::HalfAwayFromZero)
        .ok_or_else(|| too_large("base_before_vat"))?;

    // base and processing are non-negative, so this difference cannot overflow
    let mut booking = floor_at_zero(base_before_vat - processing);
    let vat = floor_at_zero(non_provider - base_before_vat);

    // Pass 1
    let first_residue = Money::checked_sum([processing, booking, vat])
        .and_then(|allocated| non_provider.checked_sub(allocated))
        .ok_or_else(|| policy_overflow("stripe_fixed"))?;
    booking = booking
        .checked_add(first_residue)
        .map(floor_at_zero)
        .ok_or_else(|| policy_overflow("stripe_fixed"))?;

    // Pass 2
    let second_residue = Money::checked_sum([provider, processing, booking, vat])
        .and_then(|grand_total| total.checked_sub(grand_total))
        .ok_or_else(|| policy_overflow("stripe_fixed"))?;
    if !second_residue.is_zero() {
        booking = booking
            .checked_add(second_residue)
            .ok_or_else(|| policy_overflow("stripe_fixed"))?;
    }

    if booking.is_negative() {
        warn!(
            total = %total,
            provider = %provider,
            processing_fee = %processing,
            booking_fee = %booking,
            "Processing fee exceeds the non-provider share; booking fee is negative"
        );
    }

    debug!(
        total_cents = total.cents(),
        provider_cents = provider.cents(),
        processing_cents = processing.cents(),
        booking_cents = booking.cents(),
        vat_cents = vat.cents(),
        first_residue = first_residue.cents(),
        second_residue = second_residue.cents(),
        "Computed visit preauthorization split"
    );

    let components = PreauthComponents {
        non_provider_cents: non_provider.cents(),
        base_before_vat_cents: base_before_vat.cents(),
        first_residue_cents: first_residue.cents(),
        second_residue_cents: second_residue.cents(),
    };

    PricingResult::from_parts(
        provider,
        booking,
        processing,
        vat,
        PricingComponents::VisitPreauth(components),
    )
    .ok_or_else(|| too_large("total"))
}

fn to_cents(pesos: Decimal, field: &str) -> CoreResult<Money> {
    Money::from_pesos(pesos, Rounding::HalfAwayFromZero).ok_or_else(|| too_large(field))
}

fn floor_at_zero(amount: Money) -> Money {
    amount.max(Money::zero())
}

fn too_large(field: &str) -> PricingError {
    PricingError::InvalidInput(ValidationError::TooLarge {
        field: field.to_string(),
    })
}

fn policy_overflow(field: &str) -> PricingError {
    PricingError::InvalidConfiguration(ValidationError::TooLarge {
        field: field.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn components(result: &PricingResult) -> &PreauthComponents {
        match &result.components {
            PricingComponents::VisitPreauth(components) => components,
            other => panic!("expected preauth components, got {:?}", other),
        }
    }

    #[test]
    fn test_default_visit_split() {
        let result = compute_visit_preauth(&VisitPreauthConfig::default()).unwrap();

        // processing = 0.041 * 14000 + 300 = 874
        assert_eq!(result.processing_fee_amount_cents, 874);
        // base = round(5000 / 1.16) = 4310, vat = 690
        assert_eq!(result.vat_amount_cents, 690);
        assert_eq!(result.booking_fee_amount_cents, 3_436);
        assert_eq!(result.total_amount_cents, 14_000);
        assert!(result.is_reconciled());

        let c = components(&result);
        assert_eq!(c.non_provider_cents, 5_000);
        assert_eq!(c.base_before_vat_cents, 4_310);
        assert_eq!(c.first_residue_cents, 0);
        assert_eq!(c.second_residue_cents, 0);
    }

    #[test]
    fn test_domestic_rate_visit() {
        let visit = VisitPreauthConfig {
            stripe_percent: dec!(0.036),
            ..Default::default()
        };
        let result = compute_visit_preauth(&visit).unwrap();
        // processing = 0.036 * 14000 + 300 = 804
        assert_eq!(result.processing_fee_amount_cents, 804);
        assert_eq!(result.booking_fee_amount_cents, 3_506);
        assert_eq!(result.total_amount_cents, 14_000);
    }

    #[test]
    fn test_mispriced_product_still_reconciles() {
        // non-provider = 100 cents, processing = 341 cents
        let visit = VisitPreauthConfig::with_split(dec!(10), dec!(9));
        let result = compute_visit_preauth(&visit).unwrap();

        assert_eq!(result.total_amount_cents, 1_000);
        assert!(result.is_reconciled());
        assert_eq!(result.processing_fee_amount_cents, 341);
        assert_eq!(result.vat_amount_cents, 14);
        assert_eq!(result.booking_fee_amount_cents, -255);

        let c = components(&result);
        assert_eq!(c.first_residue_cents, -255);
        assert_eq!(c.second_residue_cents, -255);
    }

    #[test]
    fn test_rejects_bad_splits() {
        for (total, provider) in [
            (dec!(100), dec!(150)),
            (dec!(100), dec!(100)),
            (dec!(0), dec!(0)),
            (dec!(-10), dec!(5)),
            (dec!(100), dec!(-1)),
        ] {
            let err = compute_visit_preauth(&VisitPreauthConfig::with_split(total, provider))
                .unwrap_err();
            assert!(err.is_input_error(), "{} / {} gave {:?}", total, provider, err);
        }
    }

    #[test]
    fn test_rejects_split_that_collapses_in_cents() {
        // 100.004 and 100.001 both round to 10000 cents
        let visit = VisitPreauthConfig::with_split(dec!(100.004), dec!(100.001));
        let err = compute_visit_preauth(&visit).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_rejects_bad_rates() {
        let visit = VisitPreauthConfig {
            vat_rate: dec!(1),
            ..Default::default()
        };
        let err = compute_visit_preauth(&visit).unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_huge_processor_fixed_fee_is_configuration_error() {
        for stripe_fixed in [Decimal::MAX, Decimal::from(1_000_000_000_000_000_000_i64)] {
            let visit = VisitPreauthConfig {
                stripe_fixed,
                ..Default::default()
            };
            assert!(visit.validate().is_ok());
            let err = compute_visit_preauth(&visit).unwrap_err();
            assert_eq!(
                err,
                PricingError::InvalidConfiguration(ValidationError::TooLarge {
                    field: "stripe_fixed".to_string()
                }),
                "stripe_fixed = {}",
                stripe_fixed
            );
        }
    }
}
