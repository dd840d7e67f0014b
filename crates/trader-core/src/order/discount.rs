//! Discounts attached to an order, a line, the shipping or the payment.

use serde::{Deserialize, Serialize};

use crate::ids::{DiscountId, OrderId, PromoDiscountId, PromoId};
use crate::money::Money;
use crate::price::Price;
use crate::types::{DiscountableType, VatPercentage};

/// A computed reduction granted by one promo discount to one discountable.
///
/// `amount` is always a positive magnitude; it reduces its target and is
/// never stored as a signed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub discount_id: DiscountId,
    pub discountable_type: DiscountableType,
    /// Id of the order, line, shipping or payment this discount reduces.
    pub discountable_id: String,
    pub promo_id: PromoId,
    pub promo_discount_id: PromoDiscountId,
    pub amount: Money,
    /// Whether `amount` is VAT-inclusive (the order's price mode).
    pub amount_includes_vat: bool,
    /// Rate of the target. `None` for order-level discounts: their VAT is
    /// spread over the order's rates by the VAT snapshot.
    pub vat: Option<VatPercentage>,
    pub totals: DiscountTotals,
}

/// Derived excl / incl figures of a discount, written by the VAT snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscountTotals {
    pub total_excl: Money,
    pub total_incl: Money,
}

impl Discount {
    /// Deterministic id: the same promo discount on the same target always
    /// produces the same discount id, which keeps refreshes idempotent.
    pub fn id_for(
        order_id: &OrderId,
        promo_discount_id: &PromoDiscountId,
        discountable_type: DiscountableType,
        discountable_id: &str,
    ) -> DiscountId {
        DiscountId::new(format!(
            "{}:{}:{}:{}",
            order_id, promo_discount_id, discountable_type, discountable_id
        ))
    }

    /// The amount in the requested VAT mode.
    pub fn amount_in_mode(&self, includes_vat: bool) -> Money {
        if includes_vat == self.amount_includes_vat {
            return self.amount;
        }
        match self.vat {
            Some(vat) => {
                Price::new(self.amount, vat, self.amount_includes_vat).in_mode(includes_vat)
            }
            None if includes_vat => self.totals.total_incl,
            None => self.totals.total_excl,
        }
    }

    pub fn total_vat(&self) -> Money {
        self.totals.total_incl - self.totals.total_excl
    }
}
