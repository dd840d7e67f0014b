//! Builds the order's VAT lines and top-level totals.
//!
//! ## Contributions Per Rate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line           + (subtotal - line discounts)   at the line's rate     │
//! │  order discount - allocated over line weights   at each bucket rate    │
//! │  shipping       + allocated over line weights   at each bucket rate    │
//! │  shipping disc. - allocated over line weights   at each bucket rate    │
//! │  payment        + allocated over line weights   at each bucket rate    │
//! │  payment disc.  - allocated over line weights   at each bucket rate    │
//! │                                                                         │
//! │  weight = line subtotal before discounts, in the price mode            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every contribution is split into excl/incl once, and those same figures
//! feed both the VAT lines and the totals, so
//! `Σ vat_lines.total_excl == totals.total_excl` and
//! `Σ vat_lines.total_vat == totals.total_vat` hold exactly.

use std::collections::BTreeMap;

use crate::adjusters::{AdjustContext, Adjuster};
use crate::config::TraderConfig;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::{ChargeTotals, Discount, DiscountTotals, LineTotals, Order, OrderTotals, VatLine};
use crate::price::Price;
use crate::types::VatPercentage;
use crate::vat::{AllocationBucket, VatAllocator};

/// Running excl / incl sums of one rate.
#[derive(Debug, Clone, Copy, Default)]
struct RateSum {
    excl: Money,
    incl: Money,
}

type RateSums = BTreeMap<VatPercentage, RateSum>;

pub struct AdjustOrderVatSnapshot {
    config: TraderConfig,
}

impl AdjustOrderVatSnapshot {
    pub fn new(config: TraderConfig) -> Self {
        AdjustOrderVatSnapshot { config }
    }
}

impl Adjuster for AdjustOrderVatSnapshot {
    fn name(&self) -> &'static str {
        "adjust_order_vat_snapshot"
    }

    fn adjust(&self, order: &mut Order, _ctx: &mut AdjustContext) -> CoreResult<()> {
        let mode = self.config.prices_include_vat;
        let allocator =
            VatAllocator::new(self.config.fallback_vat_percentage(order.is_vat_exempt()));
        let mut sums = RateSums::new();
        let mut totals = OrderTotals::default();
        let mut weights = Vec::with_capacity(order.lines().len());

        // Lines and their own discounts
        for line in order.lines_mut() {
            let vat = line.vat();
            let subtotal = line.total();
            let (subtotal_excl, subtotal_incl) =
                (subtotal.excluding_vat(), subtotal.including_vat());

            let mut discount_excl = Money::zero();
            let mut discount_incl = Money::zero();
            for discount in &mut line.discounts {
                let amount = Price::new(discount.amount, vat, discount.amount_includes_vat);
                discount.vat = Some(vat);
                discount.totals = DiscountTotals {
                    total_excl: amount.excluding_vat(),
                    total_incl: amount.including_vat(),
                };
                discount_excl += discount.totals.total_excl;
                discount_incl += discount.totals.total_incl;
            }

            let total_excl = subtotal_excl - discount_excl;
            let total_incl = subtotal_incl - discount_incl;
            line.totals = LineTotals {
                subtotal_excl,
                subtotal_incl,
                discount_excl,
                discount_incl,
                total_excl,
                total_incl,
                total_vat: total_incl - total_excl,
            };

            add(&mut sums, vat, total_excl, total_incl);
            weights.push(AllocationBucket::new(vat, subtotal.in_mode(mode)));
            totals.subtotal_excl += subtotal_excl;
            totals.subtotal_incl += subtotal_incl;
            totals.discount_total_excl += discount_excl;
            totals.discount_total_incl += discount_incl;
        }

        // Order-level discounts
        let (excl, incl) =
            allocate_discounts(&allocator, &weights, order.discounts_mut(), &mut sums)?;
        totals.discount_total_excl += excl;
        totals.discount_total_incl += incl;

        // Shipping and payment
        if let Some(shipping) = order.shipping_mut() {
            shipping.totals = allocate_charge(
                &allocator,
                &weights,
                shipping.cost,
                &mut shipping.discounts,
                &mut sums,
            )?;
            totals.shipping_cost_excl = shipping.totals.total_excl;
            totals.shipping_cost_incl = shipping.totals.total_incl;
        }
        if let Some(payment) = order.payment_mut() {
            payment.totals = allocate_charge(
                &allocator,
                &weights,
                payment.cost,
                &mut payment.discounts,
                &mut sums,
            )?;
            totals.payment_cost_excl = payment.totals.total_excl;
            totals.payment_cost_incl = payment.totals.total_incl;
        }

        totals.total_excl = totals.subtotal_excl - totals.discount_total_excl
            + totals.shipping_cost_excl
            + totals.payment_cost_excl;
        totals.total_incl = totals.subtotal_incl - totals.discount_total_incl
            + totals.shipping_cost_incl
            + totals.payment_cost_incl;
        totals.total_vat = totals.total_incl - totals.total_excl;

        let vat_lines: Vec<VatLine> = sums
            .into_iter()
            .filter(|(_, sum)| !(sum.excl.is_zero() && sum.incl.is_zero()))
            .map(|(vat, sum)| VatLine {
                vat,
                total_excl: sum.excl,
                total_vat: sum.incl - sum.excl,
                total_incl: sum.incl,
            })
            .collect();

        verify(&vat_lines, &totals)?;

        tracing::debug!(
            order_id = %order.order_id(),
            total_excl = totals.total_excl.cents(),
            total_incl = totals.total_incl.cents(),
            total_vat = totals.total_vat.cents(),
            vat_lines = vat_lines.len(),
            "VAT snapshot rebuilt"
        );
        order.set_vat_snapshot(vat_lines, totals);
        Ok(())
    }
}

fn add(sums: &mut RateSums, vat: VatPercentage, excl: Money, incl: Money) {
    let sum = sums.entry(vat).or_default();
    sum.excl += excl;
    sum.incl += incl;
}

/// Allocates `amount` over the line weights and splits every share at its
/// own rate. Returns the summed `(excl, incl)` and the per-rate parts.
fn split_over_rates(
    allocator: &VatAllocator,
    weights: &[AllocationBucket],
    amount: Money,
    includes_vat: bool,
) -> CoreResult<Vec<(VatPercentage, Money, Money)>> {
    Ok(allocator
        .allocate(amount, weights)?
        .into_iter()
        .map(|share| {
            let price = Price::new(share.amount, share.vat, includes_vat);
            (share.vat, price.excluding_vat(), price.including_vat())
        })
        .collect())
}

/// Discounts without a rate of their own: allocated, then subtracted.
fn allocate_discounts(
    allocator: &VatAllocator,
    weights: &[AllocationBucket],
    discounts: &mut [Discount],
    sums: &mut RateSums,
) -> CoreResult<(Money, Money)> {
    let mut total_excl = Money::zero();
    let mut total_incl = Money::zero();
    for discount in discounts {
        let parts = split_over_rates(
            allocator,
            weights,
            discount.amount,
            discount.amount_includes_vat,
        )?;
        let mut totals = DiscountTotals::default();
        for (vat, excl, incl) in parts {
            add(sums, vat, -excl, -incl);
            totals.total_excl += excl;
            totals.total_incl += incl;
        }
        discount.totals = totals;
        total_excl += totals.total_excl;
        total_incl += totals.total_incl;
    }
    Ok((total_excl, total_incl))
}

/// Shipping or payment: cost allocated and added, discounts allocated and
/// subtracted.
fn allocate_charge(
    allocator: &VatAllocator,
    weights: &[AllocationBucket],
    cost: Price,
    discounts: &mut [Discount],
    sums: &mut RateSums,
) -> CoreResult<ChargeTotals> {
    let mut charge = ChargeTotals::default();
    for (vat, excl, incl) in split_over_rates(allocator, weights, cost.money, cost.includes_vat)? {
        add(sums, vat, excl, incl);
        charge.cost_excl += excl;
        charge.cost_incl += incl;
    }

    let (discount_excl, discount_incl) = allocate_discounts(allocator, weights, discounts, sums)?;
    charge.discount_excl = discount_excl;
    charge.discount_incl = discount_incl;
    charge.total_excl = charge.cost_excl - discount_excl;
    charge.total_incl = charge.cost_incl - discount_incl;
    Ok(charge)
}

fn verify(vat_lines: &[VatLine], totals: &OrderTotals) -> CoreResult<()> {
    let excl: Money = vat_lines.iter().map(|l| l.total_excl).sum();
    let vat: Money = vat_lines.iter().map(|l| l.total_vat).sum();

    for (expected, actual) in [(totals.total_excl, excl), (totals.total_vat, vat)] {
        if expected != actual {
            tracing::error!(
                expected = expected.cents(),
                actual = actual.cents(),
                "VAT lines do not add up to order totals"
            );
            return Err(CoreError::RoundingInvariantViolation {
                expected: expected.cents(),
                actual: actual.cents(),
            });
        }
    }
    Ok(())
}
