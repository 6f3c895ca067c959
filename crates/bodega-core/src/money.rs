//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A credit ledger that drifts by a centavo per payment never             │
//! │  reconciles to zero, and a zero balance is exactly what gates           │
//! │  customer deletion.                                                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    Every amount, price, total, and balance is an i64 count of the       │
//! │    smallest currency unit. The database stores the same integer.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bodega_core::money::Money;
//!
//! // Create from centavos (the only way in)
//! let price = Money::from_cents(1550); // ₱15.50
//!
//! // Arithmetic operations
//! let line_total = price * 3;                      // ₱46.50
//! let with_fee = price + Money::from_cents(200);   // ₱17.50
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (balance deltas, cash variance) can dip
///   below zero even though stored amounts never do
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serialization**: documents and columns see a plain number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// let price = Money::from_cents(1550); // Represents ₱15.50
    /// assert_eq!(price.cents(), 1550);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99, sign dropped).
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

    /// Subtraction that stops at zero.
    ///
    /// FIFO payoff math never produces a negative remainder: a credit paid
    /// beyond its amount is simply fully paid.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// let credit = Money::from_cents(5000);
    /// let payment = Money::from_cents(8000);
    /// assert_eq!(credit.saturating_sub(payment), Money::zero());
    /// ```
    #[inline]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is what failure messages surface to the caller, e.g.
/// "Customer has an outstanding balance of ₱50.00".
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (line totals, balances).
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

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1550);
        assert_eq!(money.cents(), 1550);
        assert_eq!(money.pesos(), 15);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1550)), "₱15.50");
        assert_eq!(format!("{}", Money::from_cents(500)), "₱5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-₱5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "₱0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_saturating_sub() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(1500);

        assert_eq!(a.saturating_sub(b), Money::zero());
        assert_eq!(b.saturating_sub(a).cents(), 500);
        assert_eq!(a.saturating_sub(a), Money::zero());
    }

    #[test]
    fn test_ord_gives_min_for_allocation_math() {
        // FIFO applies min(payment remainder, credit remainder) per credit
        let remainder = Money::from_cents(2000);
        let open = Money::from_cents(12000);
        assert_eq!(remainder.min(open), remainder);
        assert_eq!(open.min(remainder), remainder);
    }

    #[test]
    fn test_sum() {
        let totals = [Money::from_cents(100), Money::from_cents(250), Money::from_cents(50)];
        let sum: Money = totals.iter().copied().sum();
        assert_eq!(sum.cents(), 400);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let price = Money::from_cents(1550);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "1550");

        let back: Money = serde_json::from_str("1550").unwrap();
        assert_eq!(back, price);
    }
}
