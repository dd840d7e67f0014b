//! Re-prices every line from the catalog.

use std::sync::Arc;

use crate::adjusters::{AdjustContext, Adjuster};
use crate::error::CoreResult;
use crate::events::OrderEvent;
use crate::order::Order;
use crate::ports::PriceLookup;

/// Refreshes unit prices and drops lines whose purchasable is gone or no
/// longer available.
pub struct AdjustLines {
    prices: Arc<dyn PriceLookup>,
}

impl AdjustLines {
    pub fn new(prices: Arc<dyn PriceLookup>) -> Self {
        AdjustLines { prices }
    }
}

impl Adjuster for AdjustLines {
    fn name(&self) -> &'static str {
        "adjust_lines"
    }

    fn adjust(&self, order: &mut Order, ctx: &mut AdjustContext) -> CoreResult<()> {
        // All lookups first: a failing lookup leaves the order untouched.
        let mut resolved = Vec::with_capacity(order.lines().len());
        for line in order.lines() {
            resolved.push(self.prices.find(&line.purchasable_ref)?);
        }

        let order_id = order.order_id().clone();
        let lines = std::mem::take(order.lines_mut());
        for (mut line, found) in lines.into_iter().zip(resolved) {
            match found {
                Some(purchasable) if purchasable.available => {
                    line.product_id = Some(purchasable.product_id);
                    line.title = Some(purchasable.title);
                    line.unit_price = purchasable.unit_price;
                    line.sale_price = purchasable.sale_price;
                    line.vat_rate = None;
                    order.lines_mut().push(line);
                }
                _ => {
                    tracing::info!(
                        order_id = %order_id,
                        line_id = %line.line_id,
                        purchasable_ref = %line.purchasable_ref,
                        "Dropping line: purchasable missing or unavailable"
                    );
                    ctx.events.push(OrderEvent::LineDropped {
                        order_id: order_id.clone(),
                        line_id: line.line_id,
                        purchasable_ref: line.purchasable_ref,
                    });
                }
            }
        }
        Ok(())
    }
}
