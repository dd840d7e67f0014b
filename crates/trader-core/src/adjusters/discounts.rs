//! Re-evaluates every promo against the order.

use std::sync::Arc;

use crate::adjusters::{AdjustContext, Adjuster};
use crate::error::CoreResult;
use crate::order::Order;
use crate::ports::PromoStore;
use crate::promo::PromoEngine;

/// Replaces all discounts with what the promo engine grants now.
///
/// Discounts are cleared before evaluation, so a discount whose line,
/// shipping or payment has disappeared never survives a refresh. A computed
/// discount whose target cannot be resolved is dropped with a warning.
pub struct AdjustDiscounts {
    promos: Arc<dyn PromoStore>,
    engine: PromoEngine,
}

impl AdjustDiscounts {
    pub fn new(promos: Arc<dyn PromoStore>, engine: PromoEngine) -> Self {
        AdjustDiscounts { promos, engine }
    }
}

impl Adjuster for AdjustDiscounts {
    fn name(&self) -> &'static str {
        "adjust_discounts"
    }

    fn adjust(&self, order: &mut Order, ctx: &mut AdjustContext) -> CoreResult<()> {
        let promos = self.promos.active_promos(order.coupon_code(), ctx.now)?;

        order.clear_discounts();
        let discounts = self.engine.evaluate(order, &promos, ctx.now);
        for discount in discounts {
            let discount_id = discount.discount_id.clone();
            if let Err(e) = order.attach_discount(discount) {
                tracing::warn!(
                    order_id = %order.order_id(),
                    discount_id = %discount_id,
                    error = %e,
                    "Dropping discount without target"
                );
            }
        }
        Ok(())
    }
}
