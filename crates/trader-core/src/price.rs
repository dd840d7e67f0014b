//! # Price
//!
//! A `Price` is an amount of money together with the VAT rate it is taxed at
//! and whether the amount already includes that VAT.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Price { money: 10000, vat: 21%, includes_vat: true }                  │
//! │                                                                         │
//! │    including_vat() = 10000                                              │
//! │    excluding_vat() = round(10000 × 100 / 121) = 8264                   │
//! │    vat_amount()    = 10000 - 8264 = 1736                               │
//! │                                                                         │
//! │  Price { money: 8264, vat: 21%, includes_vat: false }                  │
//! │                                                                         │
//! │    excluding_vat() = 8264                                               │
//! │    vat_amount()    = round(8264 × 21 / 100) = 1735                     │
//! │    including_vat() = 8264 + 1735 = 9999                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stored amount is authoritative; the other side is derived with the
//! crate-wide half-up rule, so `excl + vat == incl` always holds exactly.

use serde::{Deserialize, Serialize};

use crate::money::{Money, Percentage};
use crate::types::VatPercentage;

/// An amount with its VAT treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub money: Money,
    pub vat: VatPercentage,
    pub includes_vat: bool,
}

impl Price {
    pub const fn new(money: Money, vat: VatPercentage, includes_vat: bool) -> Self {
        Price {
            money,
            vat,
            includes_vat,
        }
    }

    /// A VAT-exclusive price.
    pub const fn excl(money: Money, vat: VatPercentage) -> Self {
        Price::new(money, vat, false)
    }

    /// A VAT-inclusive price.
    pub const fn incl(money: Money, vat: VatPercentage) -> Self {
        Price::new(money, vat, true)
    }

    /// Zero in the given mode.
    pub const fn zero(vat: VatPercentage, includes_vat: bool) -> Self {
        Price::new(Money::zero(), vat, includes_vat)
    }

    pub fn excluding_vat(&self) -> Money {
        if self.includes_vat {
            self.money.subtract_tax_percentage(self.vat.percentage())
        } else {
            self.money
        }
    }

    pub fn including_vat(&self) -> Money {
        if self.includes_vat {
            self.money
        } else {
            self.money.add_percentage(self.vat.percentage())
        }
    }

    pub fn vat_amount(&self) -> Money {
        self.including_vat() - self.excluding_vat()
    }

    /// Amount in the requested VAT mode.
    pub fn in_mode(&self, includes_vat: bool) -> Money {
        if includes_vat {
            self.including_vat()
        } else {
            self.excluding_vat()
        }
    }

    /// Multiplies the stored amount by a quantity, before any VAT split.
    pub fn multiply(&self, quantity: i64) -> Price {
        Price {
            money: self.money.multiply(quantity),
            ..*self
        }
    }

    /// `percentage` percent of this price, in the same VAT mode.
    pub fn percentage(&self, percentage: &Percentage) -> Price {
        Price {
            money: self.money.percentage(percentage),
            ..*self
        }
    }

    /// Subtracts an amount expressed in this price's mode, never going below
    /// zero.
    pub fn subtract(&self, amount: Money) -> Price {
        Price {
            money: (self.money - amount).non_negative(),
            ..*self
        }
    }

    /// Re-rates the price, keeping the VAT-exclusive amount.
    ///
    /// A VAT-inclusive 12100 at 21% re-rated to 0% becomes 10000.
    pub fn with_vat_percentage(&self, vat: VatPercentage) -> Price {
        if vat == self.vat {
            return *self;
        }
        if self.includes_vat {
            let excl = self.excluding_vat();
            Price::incl(excl.add_percentage(vat.percentage()), vat)
        } else {
            Price::excl(self.money, vat)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(whole: u32) -> VatPercentage {
        VatPercentage::from_whole(whole)
    }

    #[test]
    fn test_vat_inclusive_split() {
        let price = Price::incl(Money::from_cents(10000), rate(21));
        assert_eq!(price.excluding_vat().cents(), 8264);
        assert_eq!(price.vat_amount().cents(), 1736);
        assert_eq!(price.including_vat().cents(), 10000);
    }

    #[test]
    fn test_vat_exclusive_split() {
        let price = Price::excl(Money::from_cents(8264), rate(21));
        assert_eq!(price.vat_amount().cents(), 1735);
        assert_eq!(price.including_vat().cents(), 9999);
    }

    #[test]
    fn test_multiply_before_split() {
        // 2 × 100.00 incl: split on 20000, not twice on 10000
        let line = Price::incl(Money::from_cents(10000), rate(21)).multiply(2);
        assert_eq!(line.excluding_vat().cents(), 16529);
        assert_eq!(line.vat_amount().cents(), 3471);
    }

    #[test]
    fn test_with_vat_percentage_keeps_excl() {
        let price = Price::incl(Money::from_cents(12100), rate(21));
        let exempt = price.with_vat_percentage(VatPercentage::zero());
        assert_eq!(exempt.including_vat().cents(), 10000);
        assert_eq!(exempt.excluding_vat().cents(), 10000);

        let excl = Price::excl(Money::from_cents(10000), rate(21)).with_vat_percentage(rate(6));
        assert_eq!(excl.including_vat().cents(), 10600);
    }

    #[test]
    fn test_subtract_clamps_at_zero() {
        let price = Price::incl(Money::from_cents(500), rate(21));
        assert_eq!(price.subtract(Money::from_cents(800)).money, Money::zero());
        assert_eq!(price.subtract(Money::from_cents(200)).money.cents(), 300);
    }

    #[test]
    fn test_in_mode() {
        let price = Price::excl(Money::from_cents(1000), rate(6));
        assert_eq!(price.in_mode(true).cents(), 1060);
        assert_eq!(price.in_mode(false).cents(), 1000);
    }
}
