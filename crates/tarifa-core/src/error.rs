//! # Error Types
//!
//! Domain-specific error types for tarifa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tarifa-core errors (this file)                                        │
//! │  ├── PricingError     - What a pricing call can fail with              │
//! │  │   ├── InvalidInput          (bad price / bad split)                 │
//! │  │   └── InvalidConfiguration  (bad policy / gross-up impossible)      │
//! │  └── ValidationError  - The concrete rule that was violated            │
//! │                                                                         │
//! │  tarifa-quote errors (CLI crate)                                       │
//! │  └── QuoteError       - Policy file, I/O, JSON output                  │
//! │                                                                         │
//! │  Flow: ValidationError → PricingError → caller (HTTP 4xx/5xx, CLI)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending field and bound in every message
//! 3. Errors are enum variants, never String
//! 4. A failed computation returns an error and nothing else

use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors returned by the pricing engines and the fee-rule table.
///
/// There are exactly two kinds. Neither is transient, so callers never retry;
/// they translate the error into a user-facing message or an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The request itself is unusable.
    ///
    /// ## When This Occurs
    /// - Provider price is zero or negative
    /// - Visit total or provider share is non-positive
    /// - Provider share is not strictly below the visit total
    /// - An amount does not fit in `i64` cents
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationError),

    /// The pricing policy is unusable, whatever the request.
    ///
    /// ## When This Occurs
    /// - Alpha curve parameters out of range
    /// - VAT or processor rates out of range
    /// - Processor cut would consume the whole charge (gross-up denominator <= 0)
    /// - Empty processing-fee rule table
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(ValidationError),
}

impl PricingError {
    /// Returns true for request errors (as opposed to policy errors).
    pub fn is_input_error(&self) -> bool {
        matches!(self, PricingError::InvalidInput(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single violated rule, with enough context to explain it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be strictly less than another value.
    #[error("{field} must be less than {other}")]
    MustBeLessThan { field: String, other: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Amount does not fit in integer cents.
    #[error("{field} is too large to represent in cents")]
    TooLarge { field: String },

    /// The processing-fee gross-up has no positive solution.
    ///
    /// ## Example
    /// ```text
    /// stripe_percent = 0.90, stripe_fee_vat_rate = 0.16, vat_rate = 0.16
    /// p_eff * (1 + vat) = 0.90 * 1.16 * 1.16 = 1.211 >= 1
    /// → the processor's cut alone exceeds the whole charge
    /// ```
    #[error("processing-fee gross-up denominator must be positive, got {denominator}")]
    NonPositiveDenominator { denominator: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::MustBePositive`].
    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    /// Shorthand for [`ValidationError::OutOfRange`].
    pub(crate) fn out_of_range(field: &str, min: impl ToString, max: impl ToString) -> Self {
        ValidationError::OutOfRange {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with PricingError.
pub type CoreResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
