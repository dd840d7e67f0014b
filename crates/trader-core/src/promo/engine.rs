//! # Promo Engine
//!
//! Decides which promo discounts an order receives and how much each one
//! is worth.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  promos (store order)                                                   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  1. applicable?   online, in window, coupon match or system promo      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  2. qualifies?    discount data resolves AND every condition holds     │
//! │     │             (malformed data = does not apply, logged)            │
//! │     ▼                                                                   │
//! │  3. amount        per target, in price mode, capped at what is left    │
//! │     │             of the target (and of the order for line targets)    │
//! │     ▼                                                                   │
//! │  4. combinable?   every combinable promo is kept; of the               │
//! │                   non-combinable ones only the FIRST that grants a     │
//! │                   positive amount, with all of its definitions         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::order::{Discount, DiscountTotals, Order};
use crate::promo::{Condition, ConditionContext, DiscountBase, DiscountKind, Promo, PromoDiscount};
use crate::types::{DiscountableType, VatPercentage};

/// A discount definition that passed its conditions.
struct Candidate<'a> {
    definition: &'a PromoDiscount,
    kind: DiscountKind,
}

/// An applicable promo with the definitions that qualified.
struct Qualified<'a> {
    promo: &'a Promo,
    candidates: Vec<Candidate<'a>>,
}

/// What is left to discount, per target.
type Remaining = HashMap<(DiscountableType, String), Money>;

/// One thing a discount can be attached to, with its base.
struct Target {
    kind: DiscountableType,
    id: String,
    base: DiscountBase,
    vat: Option<VatPercentage>,
}

#[derive(Debug, Clone, Copy)]
pub struct PromoEngine {
    prices_include_vat: bool,
}

impl PromoEngine {
    /// `prices_include_vat` sets the mode discount amounts are computed in.
    pub fn new(prices_include_vat: bool) -> Self {
        PromoEngine { prices_include_vat }
    }

    /// Computes the discounts `promos` grant to `order` at `now`.
    ///
    /// Existing discounts on the order are ignored; the result replaces them.
    pub fn evaluate(&self, order: &Order, promos: &[Promo], now: DateTime<Utc>) -> Vec<Discount> {
        let order_key = (DiscountableType::Order, order.order_id().to_string());
        let mut remaining = Remaining::new();
        remaining.insert(order_key, order.lines_subtotal(self.prices_include_vat));

        let mut non_combinable_taken = false;
        let mut discounts = Vec::new();
        for qualified in self.qualifying(order, promos, now) {
            let promo = qualified.promo;
            if !promo.is_combinable && non_combinable_taken {
                tracing::debug!(
                    promo_id = %promo.promo_id,
                    "Non-combinable promo ignored, another one already applies"
                );
                continue;
            }

            let mut tentative = remaining.clone();
            let granted = self.grant(order, &qualified, &mut tentative);
            if granted.is_empty() {
                continue;
            }
            if !promo.is_combinable {
                non_combinable_taken = true;
            }
            remaining = tentative;
            discounts.extend(granted);
        }
        discounts
    }

    /// Step 3 for one promo: every qualifying definition, on every target,
    /// capped by `remaining`. Only positive amounts are returned.
    fn grant(
        &self,
        order: &Order,
        qualified: &Qualified<'_>,
        remaining: &mut Remaining,
    ) -> Vec<Discount> {
        let order_key = (DiscountableType::Order, order.order_id().to_string());
        let mut discounts = Vec::new();

        for candidate in &qualified.candidates {
            for target in self.targets(order, candidate.definition.applies_to) {
                let key = (target.kind, target.id.clone());
                let left = *remaining.entry(key.clone()).or_insert(target.base.amount);
                let mut amount = candidate.kind.compute_amount(&target.base).min(left);
                if target.kind == DiscountableType::Line {
                    let order_left = remaining.get(&order_key).copied().unwrap_or_default();
                    amount = amount.min(order_left);
                }
                if !amount.is_positive() {
                    continue;
                }

                remaining.insert(key, left - amount);
                if target.kind == DiscountableType::Line {
                    if let Some(order_left) = remaining.get_mut(&order_key) {
                        *order_left -= amount;
                    }
                }

                tracing::debug!(
                    order_id = %order.order_id(),
                    promo_id = %qualified.promo.promo_id,
                    discount = candidate.kind.key(),
                    discountable = %target.kind,
                    amount = amount.cents(),
                    "Promo discount granted"
                );
                discounts.push(Discount {
                    discount_id: Discount::id_for(
                        order.order_id(),
                        &candidate.definition.promo_discount_id,
                        target.kind,
                        &target.id,
                    ),
                    discountable_type: target.kind,
                    discountable_id: target.id,
                    promo_id: qualified.promo.promo_id.clone(),
                    promo_discount_id: candidate.definition.promo_discount_id.clone(),
                    amount,
                    amount_includes_vat: self.prices_include_vat,
                    vat: target.vat,
                    totals: DiscountTotals::default(),
                });
            }
        }
        discounts
    }

    /// Steps 1 and 2: applicable promos with their qualifying definitions,
    /// in store order. Promos with no qualifying definition are left out.
    fn qualifying<'a>(
        &self,
        order: &Order,
        promos: &'a [Promo],
        now: DateTime<Utc>,
    ) -> Vec<Qualified<'a>> {
        let ctx = ConditionContext {
            order,
            prices_include_vat: self.prices_include_vat,
        };
        let mut qualified = Vec::new();

        for promo in promos {
            if !promo.is_applicable(order.coupon_code(), now) {
                tracing::debug!(promo_id = %promo.promo_id, "Promo not applicable");
                continue;
            }
            let mut candidates = Vec::new();
            for definition in &promo.discounts {
                let kind = match DiscountKind::from_mapped_data(&definition.discount) {
                    Ok(kind) => kind,
                    Err(e) => {
                        tracing::warn!(
                            promo_id = %promo.promo_id,
                            promo_discount_id = %definition.promo_discount_id,
                            error = %e,
                            "Skipping misconfigured promo discount"
                        );
                        continue;
                    }
                };
                if definition
                    .conditions
                    .iter()
                    .all(|mapped| match Condition::from_mapped_data(mapped) {
                        Ok(condition) => condition.evaluate(&ctx),
                        Err(e) => {
                            tracing::warn!(
                                promo_id = %promo.promo_id,
                                promo_discount_id = %definition.promo_discount_id,
                                error = %e,
                                "Misconfigured condition evaluates to false"
                            );
                            false
                        }
                    })
                {
                    candidates.push(Candidate { definition, kind });
                }
            }
            if !candidates.is_empty() {
                qualified.push(Qualified { promo, candidates });
            }
        }
        qualified
    }

    fn targets(&self, order: &Order, applies_to: DiscountableType) -> Vec<Target> {
        let mode = self.prices_include_vat;
        match applies_to {
            DiscountableType::Order => vec![Target {
                kind: DiscountableType::Order,
                id: order.order_id().to_string(),
                base: DiscountBase {
                    amount: order.lines_subtotal(mode),
                    sale_reduction: order.lines().iter().map(|l| l.sale_reduction(mode)).sum(),
                },
                vat: None,
            }],
            DiscountableType::Line => order
                .lines()
                .iter()
                .map(|line| Target {
                    kind: DiscountableType::Line,
                    id: line.line_id.to_string(),
                    base: DiscountBase {
                        amount: line.total().in_mode(mode),
                        sale_reduction: line.sale_reduction(mode),
                    },
                    vat: Some(line.vat()),
                })
                .collect(),
            DiscountableType::Shipping => order
                .shipping()
                .map(|shipping| Target {
                    kind: DiscountableType::Shipping,
                    id: shipping.shipping_id.to_string(),
                    base: DiscountBase {
                        amount: shipping.cost.in_mode(mode),
                        sale_reduction: Money::zero(),
                    },
                    vat: Some(shipping.cost.vat),
                })
                .into_iter()
                .collect(),
            DiscountableType::Payment => order
                .payment()
                .map(|payment| Target {
                    kind: DiscountableType::Payment,
                    id: payment.payment_id.to_string(),
                    base: DiscountBase {
                        amount: payment.cost.in_mode(mode),
                        sale_reduction: Money::zero(),
                    },
                    vat: Some(payment.cost.vat),
                })
                .into_iter()
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
