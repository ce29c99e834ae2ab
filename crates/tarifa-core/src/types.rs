//! # Domain Types
//!
//! Requests and results shared by the pricing engines and the fee resolver.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌───────────────────────┐   ┌────────────────┐  │
//! │  │  PricingInput   │   │    PricingResult      │   │   CardInfo     │  │
//! │  │  ─────────────  │   │  ───────────────────  │   │  ────────────  │  │
//! │  │  provider price │──►│  provider cents       │   │  brand?        │  │
//! │  │  overrides      │   │  booking fee cents    │   │  funding?      │  │
//! │  └─────────────────┘   │  processing fee cents │   │  country?      │  │
//! │                        │  vat cents            │   └───────┬────────┘  │
//! │                        │  total cents          │           │           │
//! │                        │  components           │           ▼           │
//! │                        └───────────────────────┘   ┌────────────────┐  │
//! │                                                     │ProcessingFeeRule│ │
//! │                                                     │ id, match,     │  │
//! │                                                     │ percent, fixed │  │
//! │                                                     └────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All of these are ephemeral: built from one request, consumed by one
//! computation, then dropped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::PricingOverrides;
use crate::money::Money;

// =============================================================================
// Pricing Input
// =============================================================================

/// A request to the sliding pricing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInput {
    /// What the provider quoted, pesos. Must be positive.
    pub provider_price_pesos: Decimal,

    /// Per-call policy overrides. Empty means "use the configured policy".
    #[serde(flatten)]
    pub overrides: PricingOverrides,
}

impl PricingInput {
    /// A request with no overrides.
    pub fn new(provider_price_pesos: Decimal) -> Self {
        PricingInput {
            provider_price_pesos,
            overrides: PricingOverrides::default(),
        }
    }

    /// Same request with overrides attached.
    pub fn with_overrides(mut self, overrides: PricingOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

// =============================================================================
// Pricing Result
// =============================================================================

/// An itemized customer charge, in integer cents.
///
/// ## Invariant
/// `provider + booking_fee + processing_fee + vat == total`, always. The only
/// constructor, [`PricingResult::from_parts`], derives the total from the parts.
///
/// ## Persistence
/// Callers store the `*_amount_cents` fields verbatim (e.g. in a bookings row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub provider_amount_cents: i64,
    pub booking_fee_amount_cents: i64,
    pub processing_fee_amount_cents: i64,
    pub vat_amount_cents: i64,
    pub total_amount_cents: i64,
    /// Intermediate values of the engine that produced this result.
    pub components: PricingComponents,
}

impl PricingResult {
    /// Builds a result whose total is the exact sum of the four parts.
    ///
    /// Returns `None` when the total does not fit in `i64` cents.
    pub fn from_parts(
        provider: Money,
        booking_fee: Money,
        processing_fee: Money,
        vat: Money,
        components: PricingComponents,
    ) -> Option<Self> {
        let total = Money::checked_sum([provider, booking_fee, processing_fee, vat])?;
        Some(PricingResult {
            provider_amount_cents: provider.cents(),
            booking_fee_amount_cents: booking_fee.cents(),
            processing_fee_amount_cents: processing_fee.cents(),
            vat_amount_cents: vat.cents(),
            total_amount_cents: total.cents(),
            components,
        })
    }

    #[inline]
    pub fn provider_amount(&self) -> Money {
        Money::from_cents(self.provider_amount_cents)
    }

    #[inline]
    pub fn booking_fee_amount(&self) -> Money {
        Money::from_cents(self.booking_fee_amount_cents)
    }

    #[inline]
    pub fn processing_fee_amount(&self) -> Money {
        Money::from_cents(self.processing_fee_amount_cents)
    }

    #[inline]
    pub fn vat_amount(&self) -> Money {
        Money::from_cents(self.vat_amount_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Everything the platform keeps or passes to the processor/tax
    /// authority: booking fee + processing fee + VAT.
    ///
    /// `None` only for tampered or corrupted amounts that overflow `i64`.
    pub fn platform_amount(&self) -> Option<Money> {
        Money::checked_sum([
            self.booking_fee_amount(),
            self.processing_fee_amount(),
            self.vat_amount(),
        ])
    }

    /// Checks the reconciliation invariant.
    ///
    /// Always true for results built by this crate; useful for callers that
    /// read results back from storage.
    pub fn is_reconciled(&self) -> bool {
        self.platform_amount()
            .and_then(|platform| platform.checked_add(self.provider_amount()))
            == Some(self.total_amount())
    }
}

/// Engine-specific intermediate values, kept for audit and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum PricingComponents {
    /// Produced by [`crate::pricing::compute_pricing`].
    Sliding(SlidingComponents),
    /// Produced by [`crate::preauth::compute_visit_preauth`].
    VisitPreauth(PreauthComponents),
}

/// Intermediate values of the sliding engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SlidingComponents {
    /// Booking-fee rate from the curve.
    pub alpha: f64,
    /// `alpha * P + beta`, pesos.
    #[ts(as = "String")]
    pub raw_booking_fee_pesos: Decimal,
    /// Lower guardrail bound, pesos.
    #[ts(as = "String")]
    pub guardrail_floor_pesos: Decimal,
    /// `min(cap, cap_ratio * P)`, pesos.
    #[ts(as = "String")]
    pub guardrail_upper_pesos: Decimal,
    /// Raw fee after the clamp, pesos.
    #[ts(as = "String")]
    pub clamped_booking_fee_pesos: Decimal,
    /// Clamped fee rounded up to the increment, pesos.
    #[ts(as = "String")]
    pub booking_fee_pesos: Decimal,
    /// Processor percent used (the pinned worst case).
    #[ts(as = "String")]
    pub stripe_percent: Decimal,
    /// `stripe_percent * (1 + stripe_fee_vat_rate)`.
    #[ts(as = "String")]
    pub effective_processing_rate: Decimal,
    /// `stripe_fixed * (1 + stripe_fee_vat_rate)`, pesos.
    #[ts(as = "String")]
    pub effective_processing_fixed_pesos: Decimal,
    /// Grossed-up processing fee before rounding, pesos.
    #[ts(as = "String")]
    pub processing_fee_pesos: Decimal,
    /// VAT rate applied to the platform fees.
    #[ts(as = "String")]
    pub vat_rate: Decimal,
}

/// Intermediate values of the fixed-price splitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PreauthComponents {
    /// `total - provider`, cents.
    pub non_provider_cents: i64,
    /// Non-provider remainder with VAT backed out, cents.
    pub base_before_vat_cents: i64,
    /// First residue folded into the booking fee, cents.
    pub first_residue_cents: i64,
    /// Second residue, non-zero only when the first pass hit the zero floor.
    pub second_residue_cents: i64,
}

// =============================================================================
// Card Metadata
// =============================================================================

/// Card metadata as received from a payment-method object.
///
/// Every field is free-form and optional; the resolver normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CardInfo {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub funding: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl CardInfo {
    pub fn new(brand: Option<&str>, funding: Option<&str>, country: Option<&str>) -> Self {
        CardInfo {
            brand: brand.map(str::to_string),
            funding: funding.map(str::to_string),
            country: country.map(str::to_string),
        }
    }
}

// =============================================================================
// Processing Fee Rule
// =============================================================================

/// Conditions a card must satisfy for a rule to apply.
///
/// Absent fields match anything. `country = "*"` also matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuleMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// One row of the processing-fee table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProcessingFeeRule {
    /// Stable identifier, e.g. `mx_domestic_debit`.
    pub id: String,
    /// Human-readable description.
    pub label: String,
    #[serde(rename = "match", default)]
    pub matcher: RuleMatch,
    /// Percent of the charge, as a fraction (0.036 = 3.6%).
    #[ts(as = "String")]
    pub percent: Decimal,
    /// Fixed fee per charge, pesos.
    #[ts(as = "String")]
    pub fixed: Decimal,
}

impl ProcessingFeeRule {
    /// Cost used to rank rules: `percent + fixed / 100`.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tarifa_core::types::{ProcessingFeeRule, RuleMatch};
    ///
    /// let rule = ProcessingFeeRule {
    ///     id: "international".into(),
    ///     label: "International cards".into(),
    ///     matcher: RuleMatch::default(),
    ///     percent: dec!(0.041),
    ///     fixed: dec!(3),
    /// };
    /// assert_eq!(rule.combined_cost(), dec!(0.071));
    /// ```
    pub fn combined_cost(&self) -> Decimal {
        self.percent + self.fixed / Decimal::ONE_HUNDRED
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn preauth_components() -> PricingComponents {
        PricingComponents::VisitPreauth(PreauthComponents {
            non_provider_cents: 5000,
            base_before_vat_cents: 4310,
            first_residue_cents: 0,
            second_residue_cents: 0,
        })
    }

    #[test]
    fn test_from_parts_derives_total() {
        let result = PricingResult::from_parts(
            Money::from_cents(9000),
            Money::from_cents(3436),
            Money::from_cents(874),
            Money::from_cents(690),
            preauth_components(),
        )
        .unwrap();
        assert_eq!(result.total_amount_cents, 14000);
        assert_eq!(result.platform_amount().unwrap().cents(), 5000);
        assert!(result.is_reconciled());
    }

    #[test]
    fn test_tampered_result_is_not_reconciled() {
        let mut result = PricingResult::from_parts(
            Money::from_cents(100),
            Money::from_cents(1),
            Money::from_cents(1),
            Money::from_cents(1),
            preauth_components(),
        )
        .unwrap();
        result.total_amount_cents += 1;
        assert!(!result.is_reconciled());

        result.vat_amount_cents = i64::MAX;
        assert!(result.platform_amount().is_none());
        assert!(!result.is_reconciled());
    }

    #[test]
    fn test_from_parts_rejects_total_overflow() {
        let result = PricingResult::from_parts(
            Money::from_cents(i64::MAX - 100),
            Money::from_cents(50),
            Money::from_cents(50),
            Money::from_cents(1),
            preauth_components(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_components_are_tagged() {
        let json = serde_json::to_value(preauth_components()).unwrap();
        assert_eq!(json["engine"], "visit_preauth");
        assert_eq!(json["base_before_vat_cents"], 4310);
    }

    #[test]
    fn test_rule_match_keyword_field() {
        let rule: ProcessingFeeRule = serde_json::from_str(
            r#"{
                "id": "mx_domestic_debit",
                "label": "Mexican debit",
                "match": { "funding": "debit", "country": "MX" },
                "percent": "0.036",
                "fixed": "3"
            }"#,
        )
        .unwrap();
        assert_eq!(rule.matcher.funding.as_deref(), Some("debit"));
        assert_eq!(rule.matcher.brand, None);
    }

    #[test]
    fn test_pricing_input_flattens_overrides() {
        let input: PricingInput =
            serde_json::from_str(r#"{ "provider_price_pesos": "350", "vat_rate": "0.08" }"#)
                .unwrap();
        assert_eq!(input.provider_price_pesos, Decimal::from(350));
        assert_eq!(input.overrides.vat_rate, Some(Decimal::new(8, 2)));
        assert_eq!(input.overrides.beta, None);
    }
}
