//! # tarifa-core: Pure Pricing Engine
//!
//! Converts a provider's quoted price into a fully itemized customer charge
//! (provider payout, booking fee, processing fee, VAT) whose parts always add
//! up to the total, to the cent.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Booking Platform                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Callers (booking API, payment webhooks, quote CLI)       │   │
//! │  │   load policy ──► call engine ──► persist *_amount_cents        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tarifa-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │  preauth  │  │ fee_rules │  │   money   │  │   │
//! │  │   │  sliding  │  │  fixed    │  │ card →    │  │  cents +  │  │   │
//! │  │   │  fee      │  │  split    │  │ fee rule  │  │  rounding │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO RANDOMNESS • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - Sliding booking-fee engine with processing-fee gross-up
//! - [`preauth`] - Fixed-price visit split with residue reconciliation
//! - [`fee_rules`] - Card metadata → processing-fee rule
//! - [`config`] - Pricing policy and its named defaults
//! - [`money`] - Integer-cent money type with directional rounding
//! - [`types`] - Requests, results, rules
//! - [`validation`] - Request and policy range checks
//! - [`error`] - Error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, byte for byte
//! 2. **Explicit Policy**: configuration is a value passed per call
//! 3. **Integer Money Out**: decimals inside, cents outside
//! 4. **Directional Rounding**: fees owed to the platform round up
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use tarifa_core::{compute_pricing, compute_visit_preauth, PricingConfig, PricingInput, VisitPreauthConfig};
//!
//! let quote = compute_pricing(&PricingInput::new(dec!(1200)), &PricingConfig::default()).unwrap();
//! assert_eq!(quote.booking_fee_amount_cents, 16_000);
//! assert_eq!(
//!     quote.total_amount_cents,
//!     quote.provider_amount_cents
//!         + quote.booking_fee_amount_cents
//!         + quote.processing_fee_amount_cents
//!         + quote.vat_amount_cents
//! );
//!
//! let visit = compute_visit_preauth(&VisitPreauthConfig::default()).unwrap();
//! assert_eq!(visit.total_amount_cents, 14_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod fee_rules;
pub mod money;
pub mod preauth;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{PricingConfig, PricingOverrides, VisitPreauthConfig};
pub use error::{CoreResult, PricingError, ValidationError};
pub use fee_rules::FeeRuleTable;
pub use money::{Money, Rounding};
pub use preauth::compute_visit_preauth;
pub use pricing::compute_pricing;
pub use types::*;
