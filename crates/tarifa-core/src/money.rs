//! # Money Module
//!
//! Provides the `Money` type for the amounts that leave the engine.
//!
//! ## Pesos In, Cents Out
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING HAPPENS                                                 │
//! │                                                                         │
//! │  Policy + provider price          Decimal pesos (exact algebra)        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Fee curve, clamp, gross-up       Decimal pesos                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Money::from_pesos(.., Rounding)  i64 cents  ← ONE explicit rounding   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Sum of line items                i64 cents  (exact, never re-rounded) │
//! │                                                                         │
//! │  Fees owed to the platform round UP, display amounts round half away   │
//! │  from zero.                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal_macros::dec;
//! use tarifa_core::money::{Money, Rounding};
//!
//! let fee = Money::from_pesos(dec!(12.341), Rounding::Up).unwrap();
//! assert_eq!(fee.cents(), 1235);
//!
//! let provider = Money::from_pesos(dec!(12.345), Rounding::HalfAwayFromZero).unwrap();
//! assert_eq!(provider.cents(), 1235);
//! assert_eq!((fee + provider).cents(), 2470);
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Rounding Direction
// =============================================================================

/// Direction used when a peso amount is converted to whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Ceiling. Used for every fee the platform is owed so it is never
    /// under-covered.
    Up,
    /// Standard rounding (0.5 goes away from zero). Used for amounts that are
    /// passed through, such as the provider payout.
    HalfAwayFromZero,
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (centavos for MXN).
///
/// ## Design Decisions
/// - **i64 (signed)**: the preauth slack line may go negative in degenerate
///   splits, so sign is representable
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No float constructor**: the only way in from pesos is
///   [`Money::from_pesos`], which names its rounding direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tarifa_core::money::Money;
    ///
    /// let fee = Money::from_cents(4500); // $45.00
    /// assert_eq!(fee.cents(), 4500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a peso amount to cents with an explicit rounding direction.
    ///
    /// Returns `None` when the amount does not fit in `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tarifa_core::money::{Money, Rounding};
    ///
    /// assert_eq!(Money::from_pesos(dec!(0.001), Rounding::Up).unwrap().cents(), 1);
    /// assert_eq!(Money::from_pesos(dec!(0.004), Rounding::HalfAwayFromZero).unwrap().cents(), 0);
    /// assert_eq!(Money::from_pesos(dec!(0.005), Rounding::HalfAwayFromZero).unwrap().cents(), 1);
    /// ```
    pub fn from_pesos(pesos: Decimal, rounding: Rounding) -> Option<Self> {
        let cents = pesos.checked_mul(Decimal::ONE_HUNDRED)?;
        Self::from_fractional_cents(cents, rounding)
    }

    /// Converts an amount already expressed in (fractional) cents.
    pub fn from_fractional_cents(cents: Decimal, rounding: Rounding) -> Option<Self> {
        let whole = match rounding {
            Rounding::Up => cents.ceil(),
            Rounding::HalfAwayFromZero => {
                cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            }
        };
        whole.to_i64().map(Money)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the exact value in pesos.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tarifa_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4550).to_pesos(), dec!(45.50));
    /// ```
    #[inline]
    pub fn to_pesos(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds, returning `None` on `i64` overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts, returning `None` on `i64` overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums line items, returning `None` if the total leaves `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use tarifa_core::money::Money;
    ///
    /// let parts = [Money::from_cents(9000), Money::from_cents(5000)];
    /// assert_eq!(Money::checked_sum(parts), Some(Money::from_cents(14000)));
    /// assert_eq!(Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]), None);
    /// ```
    pub fn checked_sum(parts: impl IntoIterator<Item = Money>) -> Option<Money> {
        parts
            .into_iter()
            .try_fold(Money::zero(), |total, part| total.checked_add(part))
    }

    /// Applies a rate and rounds the result up to the next cent.
    ///
    /// Used for VAT on platform fees: the tax authority is owed at least the
    /// exact amount, so fractions of a cent are never dropped.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tarifa_core::money::Money;
    ///
    /// // 16% of $63.03 = $10.0848 → $10.09
    /// let vat = Money::from_cents(6303).apply_rate_ceil(dec!(0.16)).unwrap();
    /// assert_eq!(vat.cents(), 1009);
    /// ```
    pub fn apply_rate_ceil(&self, rate: Decimal) -> Option<Money> {
        let exact = Decimal::from(self.0).checked_mul(rate)?;
        Money::from_fractional_cents(exact, Rounding::Up)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$1234.50` for logs and debugging.
///
/// ## Note
/// Use frontend formatting for customer-facing display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}


// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pesos_and_cents_parts() {
        let fee = Money::from_cents(3382);
        assert_eq!(fee.cents(), 3382);
        assert_eq!(fee.pesos(), 33);
        assert_eq!(fee.cents_part(), 82);
    }

    #[test]
    fn test_display_uses_peso_sign() {
        assert_eq!(Money::from_cents(63784).to_string(), "$637.84");
        assert_eq!(Money::from_cents(-255).to_string(), "-$2.55");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_residue_arithmetic() {
        let total = Money::from_cents(14000);
        let provider = Money::from_cents(9000);
        let mut remainder = total - provider;
        assert_eq!(remainder.cents(), 5000);

        remainder -= Money::from_cents(874);
        remainder += Money::from_cents(0);
        assert_eq!((remainder + provider).cents(), 13126);
    }

    #[test]
    fn test_checked_sum_of_visit_parts() {
        let parts = [
            Money::from_cents(9000),
            Money::from_cents(3436),
            Money::from_cents(874),
            Money::from_cents(690),
        ];
        assert_eq!(Money::checked_sum(parts).unwrap().cents(), 14000);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let near_max = Money::from_cents(i64::MAX - 10);
        assert_eq!(near_max.checked_add(Money::from_cents(10)).unwrap().cents(), i64::MAX);
        assert!(near_max.checked_add(Money::from_cents(11)).is_none());
        assert!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)).is_none());
        assert!(Money::checked_sum([near_max, near_max]).is_none());
    }

    #[test]
    fn test_rounding_up_never_drops_a_fraction() {
        assert_eq!(Money::from_pesos(dec!(10.001), Rounding::Up).unwrap().cents(), 1001);
        assert_eq!(Money::from_pesos(dec!(10.00), Rounding::Up).unwrap().cents(), 1000);
        assert_eq!(Money::from_pesos(dec!(0.0000001), Rounding::Up).unwrap().cents(), 1);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(
            Money::from_pesos(dec!(0.125), Rounding::HalfAwayFromZero).unwrap().cents(),
            13
        );
        assert_eq!(
            Money::from_pesos(dec!(0.135), Rounding::HalfAwayFromZero).unwrap().cents(),
            14
        );
        assert_eq!(
            Money::from_pesos(dec!(0.1249), Rounding::HalfAwayFromZero).unwrap().cents(),
            12
        );
    }

    #[test]
    fn test_to_pesos_is_exact() {
        assert_eq!(Money::from_cents(1).to_pesos(), dec!(0.01));
        assert_eq!(Money::from_cents(-250).to_pesos(), dec!(-2.50));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(Money::from_pesos(Decimal::MAX, Rounding::Up).is_none());
    }

    #[test]
    fn test_apply_rate_ceil() {
        // 16% of $100.00 is exact
        let vat = Money::from_cents(10000).apply_rate_ceil(dec!(0.16)).unwrap();
        assert_eq!(vat.cents(), 1600);

        // 16% of $0.01 = 0.16 cents → 1 cent
        let vat = Money::from_cents(1).apply_rate_ceil(dec!(0.16)).unwrap();
        assert_eq!(vat.cents(), 1);
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(874).is_positive());
        assert!(Money::from_cents(-255).is_negative());
        assert!(!Money::from_cents(-255).is_positive());
    }
}
