//! # Pricing Engine
//!
//! Turns a pre-discount, pre-tax subtotal into the final payable total.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      calculate_final_total                             │
//! │                                                                         │
//! │  subtotal (≥ 0)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply_tiered_discount ── tier picked from the subtotal itself         │
//! │       │                   round half-up to cents  ◄── rounding #1      │
//! │       ▼                                                                 │
//! │  apply_tax (15%) ──────── tax on the DISCOUNTED amount                 │
//! │       │                   round half-up to cents  ◄── rounding #2      │
//! │       ▼                                                                 │
//! │  final total                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount Tiers
//! Evaluated top-down, first match wins, lower bound inclusive:
//!
//! | Subtotal            | Tier      | Rate |
//! |---------------------|-----------|------|
//! | `>= 1000`           | Premium   | 15%  |
//! | `500 ..< 1000`      | Medium    | 10%  |
//! | `100 ..< 500`       | Basic     | 5%   |
//! | `< 100`             | NoDiscount| 0%   |
//!
//! The whole amount is discounted at the single matched rate; tiers are
//! not marginal brackets.
//!
//! ## Two-Stage Rounding
//! The discounted amount is rounded to cents before tax is computed on it.
//! Rounding once at the end can differ by a cent:
//! `100.10 → 95.095 → 95.10 → 109.365 → 109.37`, whereas exact arithmetic
//! gives `109.35925 → 109.36`. The two-stage result is the correct one.
//!
//! Every function here is pure and safe to call from any thread.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PricingError;
use crate::money::Money;

// =============================================================================
// Rates and Thresholds
// =============================================================================

/// Flat tax rate applied after discount (15%).
pub const TAX_RATE: Decimal = dec!(0.15);

/// Discount for subtotals of at least [`BASIC_THRESHOLD`] (5%).
pub const BASIC_DISCOUNT_RATE: Decimal = dec!(0.05);

/// Discount for subtotals of at least [`MEDIUM_THRESHOLD`] (10%).
pub const MEDIUM_DISCOUNT_RATE: Decimal = dec!(0.10);

/// Discount for subtotals of at least [`PREMIUM_THRESHOLD`] (15%).
pub const PREMIUM_DISCOUNT_RATE: Decimal = dec!(0.15);

/// Lowest subtotal that earns [`BASIC_DISCOUNT_RATE`] (inclusive).
pub const BASIC_THRESHOLD: Decimal = dec!(100);

/// Lowest subtotal that earns [`MEDIUM_DISCOUNT_RATE`] (inclusive).
pub const MEDIUM_THRESHOLD: Decimal = dec!(500);

/// Lowest subtotal that earns [`PREMIUM_DISCOUNT_RATE`] (inclusive).
pub const PREMIUM_THRESHOLD: Decimal = dec!(1000);

// =============================================================================
// Discount Tier
// =============================================================================

/// A discount tier, selected by the magnitude of the pre-discount amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTier {
    /// Below 100: no discount.
    NoDiscount,
    /// 100 up to (not including) 500: 5%.
    Basic,
    /// 500 up to (not including) 1000: 10%.
    Medium,
    /// 1000 and above: 15%.
    Premium,
}

impl DiscountTier {
    /// All tiers in evaluation order (highest threshold first).
    pub const ALL: [DiscountTier; 4] = [
        DiscountTier::Premium,
        DiscountTier::Medium,
        DiscountTier::Basic,
        DiscountTier::NoDiscount,
    ];

    /// Discount rate for this tier.
    pub const fn rate(self) -> Decimal {
        match self {
            DiscountTier::NoDiscount => Decimal::ZERO,
            DiscountTier::Basic => BASIC_DISCOUNT_RATE,
            DiscountTier::Medium => MEDIUM_DISCOUNT_RATE,
            DiscountTier::Premium => PREMIUM_DISCOUNT_RATE,
        }
    }

    /// Inclusive lower bound an amount must reach to qualify for this tier.
    pub const fn threshold(self) -> Decimal {
        match self {
            DiscountTier::NoDiscount => Decimal::ZERO,
            DiscountTier::Basic => BASIC_THRESHOLD,
            DiscountTier::Medium => MEDIUM_THRESHOLD,
            DiscountTier::Premium => PREMIUM_THRESHOLD,
        }
    }

    /// Selects the tier for an amount: first tier (top-down) whose
    /// threshold the amount reaches.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::pricing::DiscountTier;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(DiscountTier::for_amount(dec!(99.99)), DiscountTier::NoDiscount);
    /// assert_eq!(DiscountTier::for_amount(dec!(100)), DiscountTier::Basic);
    /// assert_eq!(DiscountTier::for_amount(dec!(999.99)), DiscountTier::Medium);
    /// ```
    pub fn for_amount(amount: Decimal) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| amount >= tier.threshold())
            .unwrap_or(DiscountTier::NoDiscount)
    }

    /// Short human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            DiscountTier::NoDiscount => "none",
            DiscountTier::Basic => "basic",
            DiscountTier::Medium => "medium",
            DiscountTier::Premium => "premium",
        }
    }
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Every intermediate value of one pricing run.
///
/// `total` is always identical to [`calculate_final_total`] for the same
/// subtotal. `discount` and `tax` are derived as differences so that
/// `subtotal - discount + tax == total` holds to the cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub tier: DiscountTier,
    pub discount: Money,
    pub discounted: Money,
    pub tax: Money,
    pub total: Money,
}

// =============================================================================
// Operations
// =============================================================================

fn ensure_non_negative(amount: Decimal) -> Result<(), PricingError> {
    if amount < Decimal::ZERO {
        return Err(PricingError::InvalidAmount(amount));
    }
    Ok(())
}

/// Adds the flat 15% tax to a non-negative subtotal.
///
/// Returns `subtotal + subtotal × 0.15`, rounded half-up to cents.
///
/// ## Example
/// ```rust
/// use orderdesk_core::pricing::apply_tax;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(apply_tax(dec!(50)).unwrap().amount(), dec!(57.50));
/// assert!(apply_tax(dec!(-0.01)).is_err());
/// ```
pub fn apply_tax(subtotal: Decimal) -> Result<Money, PricingError> {
    ensure_non_negative(subtotal)?;

    let tax = subtotal
        .checked_mul(TAX_RATE)
        .ok_or(PricingError::InvalidAmount(subtotal))?;
    let gross = subtotal
        .checked_add(tax)
        .ok_or(PricingError::InvalidAmount(subtotal))?;
    let total = Money::try_from_decimal(gross).ok_or(PricingError::InvalidAmount(subtotal))?;

    debug!(%subtotal, %tax, %total, "Applied tax");
    Ok(total)
}

/// Applies the single tier discount matched by the amount's own magnitude.
///
/// Returns `amount - amount × rate`, rounded half-up to cents.
///
/// ## Example
/// ```rust
/// use orderdesk_core::pricing::apply_tiered_discount;
/// use rust_decimal_macros::dec;
///
/// // $999 is in the 10% tier: all of it is discounted at 10%
/// assert_eq!(apply_tiered_discount(dec!(999)).unwrap().amount(), dec!(899.10));
/// ```
pub fn apply_tiered_discount(amount: Decimal) -> Result<Money, PricingError> {
    ensure_non_negative(amount)?;

    let tier = DiscountTier::for_amount(amount);
    let discount = amount
        .checked_mul(tier.rate())
        .ok_or(PricingError::InvalidAmount(amount))?;
    let discounted = amount
        .checked_sub(discount)
        .and_then(Money::try_from_decimal)
        .ok_or(PricingError::InvalidAmount(amount))?;

    debug!(
        %amount,
        tier = tier.label(),
        rate = %tier.rate(),
        %discount,
        %discounted,
        "Applied tiered discount"
    );
    Ok(discounted)
}

/// Computes the final payable total: tier discount first, then tax on the
/// discounted amount, rounding to cents after each step.
///
/// ## Example
/// ```rust
/// use orderdesk_core::pricing::calculate_final_total;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(calculate_final_total(dec!(600)).unwrap().amount(), dec!(621.00));
/// assert_eq!(calculate_final_total(dec!(1200)).unwrap().amount(), dec!(1173.00));
/// ```
pub fn calculate_final_total(subtotal: Decimal) -> Result<Money, PricingError> {
    ensure_non_negative(subtotal)?;

    let discounted = apply_tiered_discount(subtotal)?;
    let total = apply_tax(discounted.amount())?;

    debug!(%subtotal, %discounted, %total, "Calculated final total");
    Ok(total)
}

/// Runs the full pipeline and returns every intermediate value.
///
/// Used by the order service to persist subtotal, discount, tax and total
/// side by side.
pub fn quote(subtotal: Decimal) -> Result<PriceBreakdown, PricingError> {
    ensure_non_negative(subtotal)?;

    let tier = DiscountTier::for_amount(subtotal);
    let discounted = apply_tiered_discount(subtotal)?;
    let total = apply_tax(discounted.amount())?;
    let subtotal = Money::try_from_decimal(subtotal).ok_or(PricingError::InvalidAmount(subtotal))?;

    Ok(PriceBreakdown {
        subtotal,
        tier,
        discount: subtotal - discounted,
        discounted,
        tax: total - discounted,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::money::round_to_cents;
    use proptest::prelude::*;

    fn cents() -> impl Strategy<Value = Decimal> {
        (0i64..=100_000_000i64).prop_map(|c| Decimal::new(c, 2))
    }

    proptest! {
        /// apply_tax(x) == round2(x × 1.15) for every non-negative x
        #[test]
        fn prop_tax_matches_definition(x in cents()) {
            let total = apply_tax(x).unwrap();
            prop_assert_eq!(total.amount(), round_to_cents(x * dec!(1.15)));
        }

        /// Same property for amounts with sub-cent precision
        #[test]
        fn prop_tax_matches_definition_fine_grained(mills in 0i64..=10_000_000i64) {
            let x = Decimal::new(mills, 3);
            prop_assert_eq!(apply_tax(x).unwrap().amount(), round_to_cents(x * dec!(1.15)));
        }

        #[test]
        fn prop_negative_always_rejected(c in 1i64..=100_000_000i64) {
            let x = Decimal::new(-c, 2);
            prop_assert!(apply_tax(x).is_err());
            prop_assert!(apply_tiered_discount(x).is_err());
            prop_assert!(calculate_final_total(x).is_err());
        }

        #[test]
        fn prop_final_total_is_discount_then_tax(x in cents()) {
            let discounted = apply_tiered_discount(x).unwrap();
            let expected = apply_tax(discounted.amount()).unwrap();
            prop_assert_eq!(calculate_final_total(x).unwrap(), expected);
        }

        #[test]
        fn prop_quote_total_matches_final_total(x in cents()) {
            let breakdown = quote(x).unwrap();
            prop_assert_eq!(breakdown.total, calculate_final_total(x).unwrap());
            prop_assert_eq!(breakdown.subtotal - breakdown.discount, breakdown.discounted);
            prop_assert_eq!(breakdown.discounted + breakdown.tax, breakdown.total);
        }

        #[test]
        fn prop_discount_never_increases_amount(x in cents()) {
            let discounted = apply_tiered_discount(x).unwrap();
            prop_assert!(discounted.amount() <= x);
            prop_assert!(!discounted.is_negative());
        }
    }
}
