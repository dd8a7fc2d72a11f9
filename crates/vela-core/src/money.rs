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
//! │  OUR SOLUTION: integer minor units                                      │
//! │    Every amount is an i64 count of the smallest currency unit           │
//! │    (1 for LAK which has no minor unit, cents for USD, satang for THB).  │
//! │    Rounding happens at explicitly named steps, never implicitly.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vela_core::money::Money;
//!
//! let cost = Money::from_minor(1099);
//! let line = cost.multiply_quantity(3);
//! assert_eq!(line.minor(), 3297);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections and refunds
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Currency-agnostic**: the owning record carries the currency
///   (`PurchaseCurrency`); arithmetic never crosses currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps the value to be at least zero.
    #[inline]
    pub const fn floor_at_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// VAT carried on top of this amount (exclusive mode).
    ///
    /// `rate_bps` is basis points: 700 = 7.00%.
    ///
    /// ## Rounding
    /// Half-up via integer math: `(amount * bps + 5000) / 10000`. The
    /// `+5000` term is half the divisor, so exact halves round up. All
    /// amounts this is called on are non-negative (inputs are pre-clamped),
    /// which keeps the idiom correct.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let gross = Money::from_minor(10000);
    /// assert_eq!(gross.vat_on_top(700).minor(), 700); // 7%
    /// ```
    pub fn vat_on_top(&self, rate_bps: u32) -> Money {
        // i128 intermediate to prevent overflow on large amounts
        let vat = (self.0 as i128 * rate_bps as i128 + 5000) / 10_000;
        Money(vat as i64)
    }

    /// VAT already embedded in this amount (inclusive mode).
    ///
    /// Returns `(net_before_vat, vat_amount)` such that
    /// `net_before_vat + vat_amount == self` always. Only the net is
    /// rounded; the VAT is the exact remainder, so the pair reconstructs
    /// the gross without drift.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let gross = Money::from_minor(10000);
    /// let (net, vat) = gross.vat_extracted(700);
    /// assert_eq!(net.minor(), 9346);
    /// assert_eq!(vat.minor(), 654);
    /// assert_eq!(net + vat, gross);
    /// ```
    pub fn vat_extracted(&self, rate_bps: u32) -> (Money, Money) {
        let divisor = 10_000i128 + rate_bps as i128;
        let net = (self.0 as i128 * 10_000 + divisor / 2) / divisor;
        let net = Money(net as i64);
        (net, *self - net)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let unit_cost = Money::from_minor(1000);
    /// assert_eq!(unit_cost.multiply_quantity(50).minor(), 50_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the raw minor-unit amount.
///
/// Currency formatting (symbol, grouping, decimal placement) is locale
/// work that belongs to the presentation layer; this is for logs and
/// debugging only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default money is zero.
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

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Money::from_minor(-5).floor_at_zero(), Money::zero());
        assert_eq!(Money::from_minor(5).floor_at_zero().minor(), 5);
    }

    #[test]
    fn test_vat_on_top_basic() {
        // 10000 at 7% = 700
        let amount = Money::from_minor(10000);
        assert_eq!(amount.vat_on_top(700).minor(), 700);
    }

    #[test]
    fn test_vat_on_top_rounds_half_up() {
        // 999 at 7% = 69.93 -> 70
        assert_eq!(Money::from_minor(999).vat_on_top(700).minor(), 70);
        // 50 at 1% = 0.5 -> rounds up to 1
        assert_eq!(Money::from_minor(50).vat_on_top(100).minor(), 1);
    }

    #[test]
    fn test_vat_extracted_reconstructs_gross() {
        let gross = Money::from_minor(10000);
        let (net, vat) = gross.vat_extracted(700);
        assert_eq!(net.minor(), 9346);
        assert_eq!(vat.minor(), 654);
        assert_eq!(net + vat, gross);
    }

    #[test]
    fn test_vat_extracted_always_sums() {
        // Round-trip must hold for awkward amounts too, not just even ones
        for gross in [1i64, 3, 7, 99, 101, 12345, 999_999_999] {
            let gross = Money::from_minor(gross);
            let (net, vat) = gross.vat_extracted(700);
            assert_eq!(net + vat, gross, "gross {gross} failed round-trip");
        }
    }

    #[test]
    fn test_vat_extracted_zero_rate() {
        let (net, vat) = Money::from_minor(5000).vat_extracted(0);
        assert_eq!(net.minor(), 5000);
        assert!(vat.is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_minor(100).is_positive());
        assert!(Money::from_minor(-100).is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_cost = Money::from_minor(1000);
        assert_eq!(unit_cost.multiply_quantity(50).minor(), 50_000);
    }
}
