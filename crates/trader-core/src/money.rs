//! # Money Module
//!
//! Provides the `Money` and `Percentage` types every derived order figure is
//! computed with.
//!
//! ## Splitting a VAT-Inclusive Amount
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  €200.00 incl. 21% VAT                                                  │
//! │                                                                         │
//! │    20000 × 100 / 121 = 16528.925...  → half-up → 16529 cents excl       │
//! │    20000 - 16529                     =             3471 cents VAT       │
//! │                                                                         │
//! │  Amounts are whole cents (i64), rates are decimal strings ("21",        │
//! │  "8.25"). Only the final division rounds, and excl + vat == incl.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Rule
//! There is exactly ONE rounding rule in this crate: half-up (midpoint away
//! from zero) at the minor currency unit, implemented by [`round_half_up`].
//! Every percentage and proportion goes through it.
//!
//! ## Usage
//! ```rust
//! use trader_core::money::{Money, Percentage};
//!
//! let incl = Money::from_cents(20000);
//! let rate: Percentage = "21".parse().unwrap();
//!
//! let excl = incl.subtract_tax_percentage(&rate);
//! assert_eq!(excl.cents(), 16529);
//! assert_eq!((incl - excl).cents(), 3471);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Rounding
// =============================================================================

/// Divides `numerator` by `denominator`, rounding half-up (away from zero).
///
/// `denominator` must be positive.
///
/// ```text
///  7 / 2 =  3.5 →  4
/// -7 / 2 = -3.5 → -4
///  5 / 3 =  1.6 →  2
///  4 / 3 =  1.3 →  1
/// ```
pub fn round_half_up(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0, "denominator must be positive");
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for EUR).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences may be negative; stored
///   discount magnitudes never are
/// - **Newtype over cents**: `Copy`, ordered, serializes as a bare integer
/// - **No tax knowledge**: pairing an amount with a VAT rate is the job of
///   [`crate::price::Price`]
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  PriceLookup ──► Line.unit_price ──► Line totals (excl / incl / vat)   │
/// │                                                                         │
/// │  Promo engine ──► Discount.amount ──► VAT allocator ──► VAT lines       │
/// │                                                                         │
/// │  EVERY monetary value on an order flows through this type              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use trader_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // €10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use trader_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(10000);
    /// assert_eq!(unit_price.multiply(2).cents(), 20000);
    /// ```
    #[inline]
    pub const fn multiply(&self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }

    /// Returns `percentage` percent of this amount, rounded half-up.
    ///
    /// ## Example
    /// ```rust
    /// use trader_core::money::{Money, Percentage};
    ///
    /// let base = Money::from_cents(1000);
    /// let rate: Percentage = "8.25".parse().unwrap();
    /// // 1000 × 8.25% = 82.5 → 83
    /// assert_eq!(base.percentage(&rate).cents(), 83);
    /// ```
    pub fn percentage(&self, percentage: &Percentage) -> Money {
        let (numerator, denominator) = percentage.ratio();
        Money::from_i128(round_half_up(
            self.0 as i128 * numerator,
            denominator * 100,
        ))
    }

    /// Adds `percentage` percent on top of this amount.
    ///
    /// Used to go from a VAT-exclusive amount to the VAT-inclusive one:
    /// `excl × (100 + rate) / 100`.
    pub fn add_percentage(&self, percentage: &Percentage) -> Money {
        let (numerator, denominator) = percentage.ratio();
        let hundred = denominator * 100;
        Money::from_i128(round_half_up(
            self.0 as i128 * (hundred + numerator),
            hundred,
        ))
    }

    /// Strips an included tax percentage from this amount.
    ///
    /// Used to go from a VAT-inclusive amount to the VAT-exclusive one:
    /// `incl × 100 / (100 + rate)`.
    ///
    /// ## Example
    /// ```rust
    /// use trader_core::money::{Money, Percentage};
    ///
    /// let incl = Money::from_cents(12100);
    /// let rate: Percentage = "21".parse().unwrap();
    /// assert_eq!(incl.subtract_tax_percentage(&rate).cents(), 10000);
    /// ```
    pub fn subtract_tax_percentage(&self, percentage: &Percentage) -> Money {
        let (numerator, denominator) = percentage.ratio();
        let hundred = denominator * 100;
        Money::from_i128(round_half_up(
            self.0 as i128 * hundred,
            hundred + numerator,
        ))
    }

    /// Returns `self × part / whole`, rounded half-up.
    ///
    /// A zero (or negative) `whole` yields zero: there is nothing to take a
    /// proportion of.
    ///
    /// ## Example
    /// ```rust
    /// use trader_core::money::Money;
    ///
    /// let shipping = Money::from_cents(500);
    /// let share = shipping.proportion_of(Money::from_cents(2000), Money::from_cents(3000));
    /// assert_eq!(share.cents(), 333);
    /// ```
    pub fn proportion_of(&self, part: Money, whole: Money) -> Money {
        if whole.0 <= 0 {
            return Money::zero();
        }
        Money::from_i128(round_half_up(
            self.0 as i128 * part.0 as i128,
            whole.0 as i128,
        ))
    }

    fn from_i128(value: i128) -> Money {
        Money(value as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with two decimals and no currency symbol.
///
/// ## Note
/// This is for logs and debugging. Rendering money for shoppers is not the
/// concern of this crate.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
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
        Money(self.0 * qty)
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
// Percentage
// =============================================================================

/// Maximum number of decimal places a percentage may carry ("5.5", "8.25").
pub const MAX_PERCENTAGE_SCALE: u32 = 4;

/// A percentage between 0 and 100 stored as an exact decimal.
///
/// ## Why a Decimal String?
/// VAT rates and discount percentages arrive as strings ("21", "5.5") from
/// configuration and promo data. They are kept as [`Decimal`] and converted
/// to an integer ratio (`mantissa / 10^scale`) before any money math, so no
/// binary float ever touches an amount.
///
/// Serialized as its string form: `"21"`, `"5.5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Percentage(Decimal);

impl Percentage {
    /// Creates a validated percentage.
    ///
    /// ## Errors
    /// `InvalidPercentage` when negative, above 100 or with more than
    /// [`MAX_PERCENTAGE_SCALE`] decimals.
    pub fn new(value: Decimal) -> CoreResult<Self> {
        let value = value.normalize();
        let invalid = |reason: &str| CoreError::InvalidPercentage {
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if value.is_sign_negative() && !value.is_zero() {
            return Err(invalid("must not be negative"));
        }
        if value > Decimal::ONE_HUNDRED {
            return Err(invalid("must not exceed 100"));
        }
        if value.scale() > MAX_PERCENTAGE_SCALE {
            return Err(invalid("too many decimal places"));
        }
        Ok(Percentage(value))
    }

    /// Creates a whole-number percentage (21 → 21%).
    ///
    /// Values above 100 are capped at 100.
    pub fn from_whole(value: u32) -> Self {
        Percentage(Decimal::from(value.min(100)))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(Decimal::ZERO)
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns the underlying decimal.
    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns the percentage as `(numerator, denominator)` with
    /// `percentage == numerator / denominator`.
    pub fn ratio(&self) -> (i128, i128) {
        (self.0.mantissa(), 10_i128.pow(self.0.scale()))
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Percentage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str(trimmed).map_err(|e| CoreError::InvalidPercentage {
            value: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        Percentage::new(value)
    }
}

impl TryFrom<String> for Percentage {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Percentage> for String {
    fn from(value: Percentage) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
