//! # Pricing Policy
//!
//! The explicit, immutable configuration every pricing call runs against.
//!
//! ## Policy Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Policy Values Come From                        │
//! │                                                                         │
//! │  1. Named defaults (this file)          DEFAULT_VAT_RATE = 0.16, ...   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. Deployment policy (PricingConfig)   tarifa.toml [pricing] section  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. Per-call overrides (PricingOverrides)  A/B variants, tests         │
//! │                                                                         │
//! │  stripe_percent exists only at layer 1-2: a single request can never   │
//! │  lower the processor percent below the worst case.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Policy File Format
//! ```toml
//! [pricing]
//! alpha_max = 0.17
//! alpha_min = 0.075
//! vat_rate = 0.16
//! guardrail_cap_pesos = 500
//!
//! [visit]
//! total_pesos = 140
//! provider_pesos = 90
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, PricingError};
use crate::validation::{validate_pricing_config, validate_visit_rates};

// =============================================================================
// Default Constants
// =============================================================================

/// Booking-fee rate applied to the cheapest tickets.
pub const DEFAULT_ALPHA_MAX: f64 = 0.17;

/// Rate the curve relaxes toward on expensive tickets.
pub const DEFAULT_ALPHA_MIN: f64 = 0.075;

/// Provider price (pesos) at which the rate sits halfway between max and min.
pub const DEFAULT_ALPHA_P0: f64 = 1200.0;

/// Curve steepness.
pub const DEFAULT_ALPHA_GAMMA: f64 = 1.2;

/// Additive booking-fee offset, pesos.
pub const DEFAULT_BETA_PESOS: Decimal = dec!(9);

/// Mexican IVA.
pub const DEFAULT_VAT_RATE: Decimal = dec!(0.16);

/// Worst-case processor percent (international cards).
///
/// Pinned so a quote never depends on which card the customer ends up using.
pub const DEFAULT_STRIPE_PERCENT: Decimal = dec!(0.041);

/// Processor fixed fee per charge, pesos.
pub const DEFAULT_STRIPE_FIXED_PESOS: Decimal = dec!(3);

/// VAT the processor adds on top of its own fee.
pub const DEFAULT_STRIPE_FEE_VAT_RATE: Decimal = dec!(0.16);

/// Booking fee never goes below this, pesos.
pub const DEFAULT_GUARDRAIL_FLOOR_PESOS: Decimal = dec!(40);

/// Fixed booking-fee ceiling, pesos.
///
/// Two historical policies used 500 and 399. 500 is the current one; override
/// `guardrail_cap_pesos` to run the other.
pub const DEFAULT_GUARDRAIL_CAP_PESOS: Decimal = dec!(500);

/// Booking fee never exceeds this share of the provider price.
pub const DEFAULT_GUARDRAIL_CAP_RATIO: Decimal = dec!(0.20);

/// Booking fees are presented as multiples of this many pesos.
pub const DEFAULT_FEE_INCREMENT_PESOS: Decimal = dec!(5);

/// Price of the flat-fee visit product, pesos.
pub const DEFAULT_VISIT_TOTAL_PESOS: Decimal = dec!(140);

/// Provider payout for the visit product, pesos.
pub const DEFAULT_VISIT_PROVIDER_PESOS: Decimal = dec!(90);

// =============================================================================
// Pricing Config
// =============================================================================

/// Deployment-level policy for the sliding pricing engine.
///
/// Every field has a serde default, so a policy file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Booking-fee rate for tiny prices, in [0, 1].
    #[serde(default = "default_alpha_max")]
    pub alpha_max: f64,

    /// Asymptotic booking-fee rate, in [0, 1] and below `alpha_max`.
    #[serde(default = "default_alpha_min")]
    pub alpha_min: f64,

    /// Curve scale, pesos. Must be positive.
    #[serde(default = "default_alpha_p0")]
    pub alpha_p0: f64,

    /// Curve steepness. Must be positive.
    #[serde(default = "default_alpha_gamma")]
    pub alpha_gamma: f64,

    /// Additive fee offset, pesos.
    #[serde(default = "default_beta")]
    pub beta: Decimal,

    /// VAT on platform fees, in [0, 1).
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,

    /// Processor percent used in the gross-up, in [0, 1).
    #[serde(default = "default_stripe_percent")]
    pub stripe_percent: Decimal,

    /// Processor fixed fee, pesos.
    #[serde(default = "default_stripe_fixed")]
    pub stripe_fixed: Decimal,

    /// VAT charged on the processor fee, in [0, 1).
    #[serde(default = "default_stripe_fee_vat_rate")]
    pub stripe_fee_vat_rate: Decimal,

    /// Booking-fee floor, pesos.
    #[serde(default = "default_guardrail_floor")]
    pub guardrail_floor_pesos: Decimal,

    /// Fixed booking-fee ceiling, pesos.
    #[serde(default = "default_guardrail_cap")]
    pub guardrail_cap_pesos: Decimal,

    /// Maximum booking fee as a share of the provider price, in (0, 1].
    #[serde(default = "default_guardrail_cap_ratio")]
    pub guardrail_cap_ratio: Decimal,

    /// Rounding increment for the booking fee, pesos.
    #[serde(default = "default_fee_increment")]
    pub fee_increment_pesos: Decimal,
}

fn default_alpha_max() -> f64 {
    DEFAULT_ALPHA_MAX
}
fn default_alpha_min() -> f64 {
    DEFAULT_ALPHA_MIN
}
fn default_alpha_p0() -> f64 {
    DEFAULT_ALPHA_P0
}
fn default_alpha_gamma() -> f64 {
    DEFAULT_ALPHA_GAMMA
}
fn default_beta() -> Decimal {
    DEFAULT_BETA_PESOS
}
fn default_vat_rate() -> Decimal {
    DEFAULT_VAT_RATE
}
fn default_stripe_percent() -> Decimal {
    DEFAULT_STRIPE_PERCENT
}
fn default_stripe_fixed() -> Decimal {
    DEFAULT_STRIPE_FIXED_PESOS
}
fn default_stripe_fee_vat_rate() -> Decimal {
    DEFAULT_STRIPE_FEE_VAT_RATE
}
fn default_guardrail_floor() -> Decimal {
    DEFAULT_GUARDRAIL_FLOOR_PESOS
}
fn default_guardrail_cap() -> Decimal {
    DEFAULT_GUARDRAIL_CAP_PESOS
}
fn default_guardrail_cap_ratio() -> Decimal {
    DEFAULT_GUARDRAIL_CAP_RATIO
}
fn default_fee_increment() -> Decimal {
    DEFAULT_FEE_INCREMENT_PESOS
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            alpha_max: DEFAULT_ALPHA_MAX,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_p0: DEFAULT_ALPHA_P0,
            alpha_gamma: DEFAULT_ALPHA_GAMMA,
            beta: DEFAULT_BETA_PESOS,
            vat_rate: DEFAULT_VAT_RATE,
            stripe_percent: DEFAULT_STRIPE_PERCENT,
            stripe_fixed: DEFAULT_STRIPE_FIXED_PESOS,
            stripe_fee_vat_rate: DEFAULT_STRIPE_FEE_VAT_RATE,
            guardrail_floor_pesos: DEFAULT_GUARDRAIL_FLOOR_PESOS,
            guardrail_cap_pesos: DEFAULT_GUARDRAIL_CAP_PESOS,
            guardrail_cap_ratio: DEFAULT_GUARDRAIL_CAP_RATIO,
            fee_increment_pesos: DEFAULT_FEE_INCREMENT_PESOS,
        }
    }
}

impl PricingConfig {
    /// Returns a copy with the given per-call overrides applied.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tarifa_core::config::{PricingConfig, PricingOverrides};
    ///
    /// let base = PricingConfig::default();
    /// let variant = base.with_overrides(&PricingOverrides {
    ///     vat_rate: Some(dec!(0.08)),
    ///     ..Default::default()
    /// });
    /// assert_eq!(variant.vat_rate, dec!(0.08));
    /// assert_eq!(variant.beta, base.beta);
    /// ```
    pub fn with_overrides(&self, overrides: &PricingOverrides) -> PricingConfig {
        PricingConfig {
            alpha_max: overrides.alpha_max.unwrap_or(self.alpha_max),
            alpha_min: overrides.alpha_min.unwrap_or(self.alpha_min),
            alpha_p0: overrides.alpha_p0.unwrap_or(self.alpha_p0),
            alpha_gamma: overrides.alpha_gamma.unwrap_or(self.alpha_gamma),
            beta: overrides.beta.unwrap_or(self.beta),
            vat_rate: overrides.vat_rate.unwrap_or(self.vat_rate),
            stripe_fixed: overrides.stripe_fixed.unwrap_or(self.stripe_fixed),
            stripe_fee_vat_rate: overrides
                .stripe_fee_vat_rate
                .unwrap_or(self.stripe_fee_vat_rate),
            ..self.clone()
        }
    }

    /// Checks every value is in range.
    ///
    /// Does not check the gross-up denominator; that depends on the rates
    /// together and is checked where it is used.
    pub fn validate(&self) -> CoreResult<()> {
        validate_pricing_config(self).map_err(PricingError::InvalidConfiguration)
    }
}

// =============================================================================
// Per-Call Overrides
// =============================================================================

/// Optional per-call replacements for policy values.
///
/// Processor percent is intentionally absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_gamma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_fixed: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_fee_vat_rate: Option<Decimal>,
}

impl PricingOverrides {
    /// Returns true when no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == PricingOverrides::default()
    }
}

// =============================================================================
// Visit Preauthorization Config
// =============================================================================

/// The fixed split of the flat-fee visit product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitPreauthConfig {
    /// What the customer is charged, pesos.
    #[serde(default = "default_visit_total")]
    pub total_pesos: Decimal,

    /// What the provider receives, pesos. Must be below `total_pesos`.
    #[serde(default = "default_visit_provider")]
    pub provider_pesos: Decimal,

    /// Processor percent on the total, in [0, 1).
    #[serde(default = "default_stripe_percent")]
    pub stripe_percent: Decimal,

    /// Processor fixed fee, pesos.
    #[serde(default = "default_stripe_fixed")]
    pub stripe_fixed: Decimal,

    /// VAT contained in the non-provider remainder, in [0, 1).
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,
}

fn default_visit_total() -> Decimal {
    DEFAULT_VISIT_TOTAL_PESOS
}
fn default_visit_provider() -> Decimal {
    DEFAULT_VISIT_PROVIDER_PESOS
}

impl Default for VisitPreauthConfig {
    fn default() -> Self {
        VisitPreauthConfig {
            total_pesos: DEFAULT_VISIT_TOTAL_PESOS,
            provider_pesos: DEFAULT_VISIT_PROVIDER_PESOS,
            stripe_percent: DEFAULT_STRIPE_PERCENT,
            stripe_fixed: DEFAULT_STRIPE_FIXED_PESOS,
            vat_rate: DEFAULT_VAT_RATE,
        }
    }
}

impl VisitPreauthConfig {
    /// Same rates as the default product, different price split.
    pub fn with_split(total_pesos: Decimal, provider_pesos: Decimal) -> Self {
        VisitPreauthConfig {
            total_pesos,
            provider_pesos,
            ..Default::default()
        }
    }

    /// Checks the rate fields. The split itself is request input and is
    /// validated by the splitter.
    pub fn validate(&self) -> CoreResult<()> {
        validate_visit_rates(self).map_err(PricingError::InvalidConfiguration)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
