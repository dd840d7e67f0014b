//! The order's VAT snapshot: per-rate VAT lines and top-level totals.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::VatPercentage;

/// Tax summary for one rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatLine {
    pub vat: VatPercentage,
    pub total_excl: Money,
    pub total_vat: Money,
    pub total_incl: Money,
}

/// Top-level order totals.
///
/// ```text
/// total = subtotal - discount_total + shipping_cost + payment_cost
///
/// subtotal        Σ lines before line discounts
/// discount_total  Σ line discounts + Σ order discounts
/// shipping_cost   shipping tariff net of shipping discounts
/// payment_cost    payment fee net of payment discounts
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal_excl: Money,
    pub subtotal_incl: Money,
    pub discount_total_excl: Money,
    pub discount_total_incl: Money,
    pub shipping_cost_excl: Money,
    pub shipping_cost_incl: Money,
    pub payment_cost_excl: Money,
    pub payment_cost_incl: Money,
    pub total_excl: Money,
    pub total_incl: Money,
    pub total_vat: Money,
}
