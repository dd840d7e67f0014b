//! Decides the VAT rate of every line, the shipping and the payment.

use std::sync::Arc;

use crate::adjusters::{AdjustContext, Adjuster};
use crate::config::TraderConfig;
use crate::error::CoreResult;
use crate::ids::CountryId;
use crate::order::Order;
use crate::ports::VatRateLookup;
use crate::types::VatPercentage;

/// Re-rates the order for the shopper's VAT country.
///
/// ## Rules
/// - VAT country: billing address, else shipping address, else the primary
///   VAT country.
/// - The order is VAT exempt when exemption is allowed, the shopper is a
///   business with a VAT number and the VAT country is not the primary one.
/// - Lines take the looked-up rate (0 when exempt, either way). Shipping and
///   payment take the fallback standard rate (0 when exempt); the VAT
///   snapshot spreads them over the line rates anyway.
/// - Re-rating keeps the VAT-exclusive amount. Line prices stay as the
///   catalog gave them; the rate is applied to `unit × quantity`.
pub struct AdjustVatRates {
    vat_rates: Arc<dyn VatRateLookup>,
    config: TraderConfig,
}

impl AdjustVatRates {
    pub fn new(vat_rates: Arc<dyn VatRateLookup>, config: TraderConfig) -> Self {
        AdjustVatRates { vat_rates, config }
    }

    fn vat_country(&self, order: &Order) -> CountryId {
        order
            .billing_address()
            .or(order.shipping_address())
            .map(|address| address.country_id.clone())
            .unwrap_or_else(|| self.config.primary_vat_country.clone())
    }

    fn is_exempt(&self, order: &Order, country: &CountryId) -> bool {
        self.config.allow_vat_exemption
            && order.shopper().is_some_and(|s| s.claims_vat_exemption())
            && country != &self.config.primary_vat_country
    }
}

impl Adjuster for AdjustVatRates {
    fn name(&self) -> &'static str {
        "adjust_vat_rates"
    }

    fn adjust(&self, order: &mut Order, _ctx: &mut AdjustContext) -> CoreResult<()> {
        let country = self.vat_country(order);
        let exempt = self.is_exempt(order, &country);

        let mut line_rates = Vec::with_capacity(order.lines().len());
        for line in order.lines() {
            let resolution = self.vat_rates.rate(&country, line.product_id.as_ref())?;
            line_rates.push(if exempt || resolution.is_exempt {
                VatPercentage::zero()
            } else {
                resolution.percentage
            });
        }

        for (line, rate) in order.lines_mut().iter_mut().zip(line_rates) {
            line.vat_rate = Some(rate);
        }

        let charge_rate = self.config.fallback_vat_percentage(exempt);
        if let Some(shipping) = order.shipping_mut() {
            shipping.cost = shipping.cost.with_vat_percentage(charge_rate);
        }
        if let Some(payment) = order.payment_mut() {
            payment.cost = payment.base_cost.with_vat_percentage(charge_rate);
        }

        if exempt != order.is_vat_exempt() {
            tracing::debug!(
                order_id = %order.order_id(),
                country = %country,
                exempt,
                "VAT exemption changed"
            );
        }
        order.set_vat_exempt(exempt);
        Ok(())
    }
}
