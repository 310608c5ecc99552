//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Fixed-Point Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    12.345 is stored as 12.3449999... → rounds to 12.34  ❌              │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                   │
//! │    12.345 is exactly 12345 × 10^-3                                     │
//! │    round half-up to cents → 12.35  ✓                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orderdesk_core::money::Money;
//! use rust_decimal_macros::dec;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let total = price + Money::from_decimal(dec!(5.005)); // 5.005 → 5.01
//! assert_eq!(total.amount(), dec!(16.00));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Number of fractional digits every `Money` value carries.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a decimal to cents using round-half-up.
///
/// A value exactly halfway between two cents rounds away from zero:
/// `12.345 → 12.35`, `-12.345 → -12.35`. Zero is always positive zero.
///
/// Values with more than 26 integer digits cannot carry two fractional
/// digits and come back with a smaller scale; [`Money::try_from_decimal`]
/// rejects those.
pub fn round_to_cents(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the base currency unit, always rounded to cents.
///
/// ## Design Decisions
/// - **Decimal (signed)**: Allows negative values for differences (e.g. a discount delta)
/// - **Scale 2 invariant**: Every constructor rounds half-up to cents
/// - **Serde as decimal string**: `"57.50"`, never a float
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  OrderItem.price ──► Subtotal ──► Discount ──► Tax ──► Order.total      │
/// │                                                                         │
/// │  Stored as *_cents INTEGER columns; converted back with from_cents     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Creates Money from an arbitrary decimal, rounding half-up to cents.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::from_decimal(dec!(12.345)).amount(), dec!(12.35));
    /// assert_eq!(Money::from_decimal(dec!(12.344)).amount(), dec!(12.34));
    /// ```
    pub fn from_decimal(value: Decimal) -> Self {
        Money(round_to_cents(value))
    }

    /// Like [`Money::from_decimal`], but `None` when the value is too large
    /// to keep two fractional digits.
    ///
    /// ```rust
    /// use orderdesk_core::money::Money;
    /// use rust_decimal::Decimal;
    /// use rust_decimal_macros::dec;
    ///
    /// assert!(Money::try_from_decimal(dec!(0.125)).is_some());
    /// assert!(Money::try_from_decimal(Decimal::MAX).is_none());
    /// ```
    pub fn try_from_decimal(value: Decimal) -> Option<Self> {
        let rounded = round_to_cents(value);
        (rounded.scale() == MONEY_SCALE).then_some(Money(rounded))
    }

    /// Creates a Money value from integer cents (the storage representation).
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.amount(), dec!(10.99));
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns zero money value.
    #[inline]
    pub fn zero() -> Self {
        Money::from_cents(0)
    }

    /// Returns the decimal amount (scale 2).
    #[inline]
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the value in integer cents, or `None` if it does not fit in i64.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::from_decimal(dec!(57.5)).to_cents(), Some(5750));
    /// ```
    pub fn to_cents(&self) -> Option<i64> {
        let mut scaled = self.0;
        scaled.rescale(MONEY_SCALE);
        i64::try_from(scaled.mantissa()).ok()
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$57.50` (debugging and CLI output).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}${}", sign, self.0.abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
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
    fn test_round_half_up() {
        assert_eq!(round_to_cents(dec!(12.345)), dec!(12.35));
        assert_eq!(round_to_cents(dec!(12.3449)), dec!(12.34));
        assert_eq!(round_to_cents(dec!(0.005)), dec!(0.01));
        assert_eq!(round_to_cents(dec!(-12.345)), dec!(-12.35));
    }

    #[test]
    fn test_rounding_pads_scale() {
        let rounded = round_to_cents(dec!(57.5));
        assert_eq!(rounded.scale(), 2);
        assert_eq!(rounded.to_string(), "57.50");
    }

    #[test]
    fn test_negative_zero_rounds_to_zero() {
        let rounded = round_to_cents(-dec!(0.001));
        assert!(rounded.is_sign_positive());
        assert_eq!(rounded.to_string(), "0.00");
        assert_eq!(Money::from_decimal(-dec!(0)).to_string(), "$0.00");
    }

    #[test]
    fn test_try_from_decimal_rejects_lost_scale() {
        assert_eq!(
            Money::try_from_decimal(dec!(12.345)).map(|m| m.amount()),
            Some(dec!(12.35))
        );
        assert!(Money::try_from_decimal(dec!(10000000000000000000000000000)).is_none());
        assert!(Money::try_from_decimal(Decimal::MAX).is_none());
    }

    #[test]
    fn test_from_cents_and_back() {
        let money = Money::from_cents(1099);
        assert_eq!(money.amount(), dec!(10.99));
        assert_eq!(money.to_cents(), Some(1099));
        assert_eq!(Money::from_decimal(dec!(0)).to_cents(), Some(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!((a + b).to_cents(), Some(1250));
        assert_eq!((a - b).to_cents(), Some(750));

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.amount(), dec!(15.00));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
    }

    #[test]
    fn test_serde_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_decimal(dec!(57.5))).unwrap();
        assert_eq!(json, "\"57.50\"");

        let parsed: Money = serde_json::from_str("\"12.345\"").unwrap();
        assert_eq!(parsed.amount(), dec!(12.35));
    }
}
