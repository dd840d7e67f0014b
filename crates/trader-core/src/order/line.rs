//! Order lines.

use serde::{Deserialize, Serialize};

use crate::ids::{LineId, ProductId, PurchasableRef};
use crate::money::Money;
use crate::order::discount::Discount;
use crate::price::Price;
use crate::types::VatPercentage;

/// One purchasable on the order, with its quantity and derived totals.
///
/// Everything but `line_id`, `purchasable_ref` and `quantity` is rewritten
/// by the refresh pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub line_id: LineId,
    pub purchasable_ref: PurchasableRef,
    pub quantity: i64,
    /// Resolved by the price lookup; drives the VAT rate lookup.
    pub product_id: Option<ProductId>,
    pub title: Option<String>,
    /// Authoritative unit price as last seen by the price lookup.
    pub unit_price: Price,
    /// Reduced unit price when the purchasable is on sale.
    pub sale_price: Option<Price>,
    /// Rate the line is taxed at for this order, when it differs from the
    /// catalog rate on `unit_price`. Applied to `unit × quantity`, never to
    /// the unit.
    #[serde(default)]
    pub vat_rate: Option<VatPercentage>,
    pub discounts: Vec<Discount>,
    pub totals: LineTotals,
}

/// Derived money figures of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineTotals {
    /// Before line discounts.
    pub subtotal_excl: Money,
    pub subtotal_incl: Money,
    pub discount_excl: Money,
    pub discount_incl: Money,
    /// After line discounts.
    pub total_excl: Money,
    pub total_incl: Money,
    pub total_vat: Money,
}

impl Line {
    /// A fresh line; prices are filled in by the next refresh.
    pub fn new(line_id: LineId, purchasable_ref: PurchasableRef, quantity: i64) -> Self {
        Line {
            line_id,
            purchasable_ref,
            quantity,
            product_id: None,
            title: None,
            unit_price: Price::zero(VatPercentage::zero(), true),
            sale_price: None,
            vat_rate: None,
            discounts: Vec::new(),
            totals: LineTotals::default(),
        }
    }

    /// `unit_price × quantity` at the line's rate. The multiplication
    /// happens before any VAT split or re-rating.
    pub fn total(&self) -> Price {
        self.unit_price
            .multiply(self.quantity)
            .with_vat_percentage(self.vat())
    }

    pub fn vat(&self) -> VatPercentage {
        self.vat_rate.unwrap_or(self.unit_price.vat)
    }

    /// How much cheaper the whole line is at its sale price, in the requested
    /// VAT mode. Zero when not on sale.
    pub fn sale_reduction(&self, includes_vat: bool) -> Money {
        match &self.sale_price {
            Some(sale) => {
                let regular = self.total().in_mode(includes_vat);
                let reduced = sale
                    .multiply(self.quantity)
                    .with_vat_percentage(self.vat())
                    .in_mode(includes_vat);
                (regular - reduced).non_negative()
            }
            None => Money::zero(),
        }
    }

    /// Sum of the attached discounts in the requested VAT mode.
    pub fn discount_total(&self, includes_vat: bool) -> Money {
        self.discounts
            .iter()
            .map(|d| d.amount_in_mode(includes_vat))
            .sum()
    }
}
