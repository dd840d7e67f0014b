//! Shipping and payment: the two optional, independently discountable
//! charges of an order.

use serde::{Deserialize, Serialize};

use crate::ids::{PaymentId, PaymentMethodId, ShippingId, ShippingProfileId};
use crate::money::Money;
use crate::order::discount::Discount;
use crate::price::Price;

/// Derived figures of a shipping or payment charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChargeTotals {
    pub cost_excl: Money,
    pub cost_incl: Money,
    pub discount_excl: Money,
    pub discount_incl: Money,
    /// Cost after discounts.
    pub total_excl: Money,
    pub total_incl: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub shipping_id: ShippingId,
    pub profile_id: ShippingProfileId,
    /// Tariff as last returned by the shipping rate lookup.
    pub cost: Price,
    pub discounts: Vec<Discount>,
    pub totals: ChargeTotals,
}

impl Shipping {
    pub fn new(shipping_id: ShippingId, profile_id: ShippingProfileId, cost: Price) -> Self {
        Shipping {
            shipping_id,
            profile_id,
            cost,
            discounts: Vec::new(),
            totals: ChargeTotals::default(),
        }
    }

    pub fn discount_total(&self, includes_vat: bool) -> Money {
        self.discounts
            .iter()
            .map(|d| d.amount_in_mode(includes_vat))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub method_id: PaymentMethodId,
    /// Fee as chosen with the payment method.
    pub base_cost: Price,
    /// `base_cost` at the order's current VAT rate.
    pub cost: Price,
    pub discounts: Vec<Discount>,
    pub totals: ChargeTotals,
}

impl Payment {
    pub fn new(payment_id: PaymentId, method_id: PaymentMethodId, cost: Price) -> Self {
        Payment {
            payment_id,
            method_id,
            base_cost: cost,
            cost,
            discounts: Vec::new(),
            totals: ChargeTotals::default(),
        }
    }

    pub fn discount_total(&self, includes_vat: bool) -> Money {
        self.discounts
            .iter()
            .map(|d| d.amount_in_mode(includes_vat))
            .sum()
    }
}
