//! # Money Module
//!
//! Prices, costs and totals as exact decimals.
//!
//! ## Scale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  menu prices        3.50          cents are enough                      │
//! │  unit costs         0.001 /ml     water, per millilitre                 │
//! │                     0.002 /g      sugar, per gram                       │
//! │  purchase lines     0.06 × 2000 = 120.00                                │
//! │                                                                         │
//! │  Integer cents cannot hold the unit costs, and binary floats drift on  │
//! │  every sum. `Decimal` keeps both exact.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use barista_core::money::Money;
//!
//! // Create from cents (preferred for prices)
//! let price = Money::from_cents(350); // $3.50
//!
//! // Arithmetic operations
//! let doubled = price * 2;                    // $7.00
//! let total = price + Money::from_cents(50);  // $4.00
//! assert_eq!(doubled, Money::from_cents(700));
//! assert_eq!(total.to_string(), "$4.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value held as an exact decimal.
///
/// Signed, so intermediate results such as `subtotal - discount` may dip
/// below zero. Serializes as the decimal string (`"3.50"`) with its scale.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──┬──► CartItem snapshot ──► TransactionItem.totalPrice
///                 │
/// Product.costPrice ─► TransactionItem.profit
///
/// RawMaterial.unitCost ◄── PurchaseItem.unitCost (overwrite on receipt)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use barista_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
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

    /// Multiplies money by a whole-unit quantity.
    ///
    /// ## Example
    /// ```rust
    /// use barista_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(350);
    /// assert_eq!(unit_price.multiply_quantity(2), Money::from_cents(700));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Multiplies money by a fractional quantity (e.g. 2000 g × $0.06/g).
    #[inline]
    pub fn times(&self, quantity: Decimal) -> Self {
        Money(self.0 * quantity)
    }

    /// `self + other`, or `None` past the range of `Decimal`.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// [`Money::times`] without the overflow panic.
    pub fn checked_times(&self, quantity: Decimal) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// [`Money::multiply_quantity`] without the overflow panic.
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        self.checked_times(Decimal::from(qty))
    }

    /// Rounds to whole cents using Bankers Rounding (round half to even).
    ///
    /// ```text
    /// 0.125 → 0.12    0.135 → 0.14    (ties go to the even cent)
    /// ```
    ///
    /// Only used for display and summaries; stored values keep full precision.
    pub fn round_to_cents(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with at least two decimal places.
///
/// ## Note
/// This is for logs and debugging. Sub-cent unit costs keep their precision
/// (`$0.001`), whole amounts are padded (`$7` → `$7.00`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0.abs();
        if value.scale() < 2 {
            value.rescale(2);
        }
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}${}", sign, value)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
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

/// Multiplication by a whole quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Multiplication by a decimal quantity.
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, quantity: Decimal) -> Self {
        self.times(quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
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
    fn test_from_cents() {
        let m = Money::from_cents(350);
        assert_eq!(m.amount(), dec!(3.50));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!(a + b, Money::from_cents(1250));
        assert_eq!(a - b, Money::from_cents(750));
        assert_eq!(b * 3, Money::from_cents(750));
    }

    #[test]
    fn test_sub_cent_precision() {
        let water = Money::new(dec!(0.001));
        assert_eq!(water.times(dec!(40)), Money::new(dec!(0.04)));
        assert_eq!(Money::new(dec!(0.06)).times(dec!(2000)), Money::new(dec!(120)));
    }

    #[test]
    fn test_sum() {
        let items = vec![
            Money::from_cents(700),
            Money::from_cents(300),
            Money::from_cents(50),
        ];
        let total: Money = items.iter().sum();
        assert_eq!(total, Money::from_cents(1050));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(750).to_string(), "$7.50");
        assert_eq!(Money::new(dec!(7)).to_string(), "$7.00");
        assert_eq!(Money::new(dec!(0.001)).to_string(), "$0.001");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
    }

    #[test]
    fn test_round_to_cents_is_bankers() {
        assert_eq!(Money::new(dec!(0.125)).round_to_cents(), Money::from_cents(12));
        assert_eq!(Money::new(dec!(0.135)).round_to_cents(), Money::from_cents(14));
    }

    #[test]
    fn test_serde_keeps_scale() {
        let m = Money::from_cents(350);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"3.50\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }
}
