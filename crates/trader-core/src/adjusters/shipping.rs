//! Re-derives the shipping tariff.

use std::sync::Arc;

use crate::adjusters::{AdjustContext, Adjuster};
use crate::error::{CoreError, CoreResult};
use crate::order::Order;
use crate::ports::ShippingRateLookup;

/// Asks the shipping rate lookup for the tariff of the selected profile.
///
/// A profile that no longer exists is an order-level dependency: the
/// refresh aborts with `ShippingProfileNotFound`.
pub struct AdjustShipping {
    rates: Arc<dyn ShippingRateLookup>,
}

impl AdjustShipping {
    pub fn new(rates: Arc<dyn ShippingRateLookup>) -> Self {
        AdjustShipping { rates }
    }
}

impl Adjuster for AdjustShipping {
    fn name(&self) -> &'static str {
        "adjust_shipping"
    }

    fn adjust(&self, order: &mut Order, _ctx: &mut AdjustContext) -> CoreResult<()> {
        let Some(profile_id) = order.shipping().map(|s| s.profile_id.clone()) else {
            return Ok(());
        };

        let cost = self
            .rates
            .rate(&profile_id, order.shipping_address())?
            .ok_or_else(|| CoreError::ShippingProfileNotFound(profile_id.to_string()))?;

        if let Some(shipping) = order.shipping_mut() {
            shipping.cost = cost;
        }
        Ok(())
    }
}
