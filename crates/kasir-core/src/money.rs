//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Rounding Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING HAPPENS                                                 │
//! │                                                                         │
//! │  Intermediate math (line subtotals, discount bases, tax bases)          │
//! │    → full decimal precision, NO rounding                               │
//! │                                                                         │
//! │  Persistence boundary (values written to a Sale / SaleItem row)         │
//! │    → round2(): half-up to 2 decimal places                             │
//! │                                                                         │
//! │  Terminal cash display                                                  │
//! │    → round_whole(): nearest whole currency unit, presentation only     │
//! │      (the server's 2-decimal total stays authoritative)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Decimal, Not Float?
//! `0.1 + 0.2 != 0.3` in binary floating point. Every monetary value in the
//! system flows through `rust_decimal::Decimal`, which is exact for the
//! scales a till ever sees.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value with full decimal precision.
///
/// ## Design Decisions
/// - **Newtype over `Decimal`**: zero-cost, keeps rounding policy in one place
/// - **Signed**: `change` math produces negatives before sufficiency checks
/// - **`serde(transparent)`**: serializes as a plain decimal string in JSON
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a raw decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Rounds to 2 decimal places, half-up (midpoint away from zero).
    ///
    /// This is the persistence rounding: applied exactly once, at the point
    /// a computed amount becomes a stored `Sale`/`SaleItem` column or is
    /// compared for payment sufficiency.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let m = Money::new("10.005".parse::<Decimal>().unwrap());
    /// assert_eq!(m.round2().amount(), "10.01".parse::<Decimal>().unwrap());
    /// ```
    #[inline]
    pub fn round2(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Rounds to the nearest whole currency unit, half-up.
    ///
    /// Used by the terminal for cash handling only. The backend never stores
    /// whole-unit rounded totals.
    #[inline]
    pub fn round_whole(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Clamps negative amounts to zero.
    ///
    /// Discounts larger than the amount they apply to floor at zero rather
    /// than producing a negative charge.
    #[inline]
    pub fn clamp_non_negative(&self) -> Money {
        if self.0.is_sign_negative() {
            Money::zero()
        } else {
            *self
        }
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(Decimal::from(units))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the 2-decimal rendering used in error messages and logs.
///
/// Frontend formatting (currency symbol, thousand separators) is out of
/// scope here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.round2().0)
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

/// Scaling by a decimal factor (discount/tax rates).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
