//! # VAT Rate Repository
//!
//! ## Resolution Order
//! ```text
//! (country, product) override ──► country standard rate ──► fallback rate
//! ```
//!
//! A product override may mark the product exempt in that country, which
//! yields a 0% rate with `is_exempt` set.

use std::collections::HashMap;
use std::sync::RwLock;

use trader_core::error::CoreResult;
use trader_core::ids::{CountryId, ProductId};
use trader_core::ports::{VatRateLookup, VatRateResolution};
use trader_core::VatPercentage;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Rates {
    standard: HashMap<CountryId, VatPercentage>,
    products: HashMap<(CountryId, ProductId), VatRateResolution>,
}

#[derive(Debug)]
pub struct InMemoryVatRates {
    fallback: VatPercentage,
    rates: RwLock<Rates>,
}

impl InMemoryVatRates {
    /// `fallback` applies to countries without a standard rate.
    pub fn new(fallback: VatPercentage) -> Self {
        InMemoryVatRates {
            fallback,
            rates: RwLock::new(Rates::default()),
        }
    }

    pub fn set_standard_rate(&self, country_id: CountryId, rate: VatPercentage) -> StoreResult<()> {
        let mut rates = self.rates.write().map_err(|_| StoreError::poisoned("vat_rates"))?;
        rates.standard.insert(country_id, rate);
        Ok(())
    }

    pub fn set_product_rate(
        &self,
        country_id: CountryId,
        product_id: ProductId,
        rate: VatPercentage,
    ) -> StoreResult<()> {
        self.set_product(
            country_id,
            product_id,
            VatRateResolution {
                percentage: rate,
                is_exempt: false,
            },
        )
    }

    pub fn set_product_exempt(
        &self,
        country_id: CountryId,
        product_id: ProductId,
    ) -> StoreResult<()> {
        self.set_product(
            country_id,
            product_id,
            VatRateResolution {
                percentage: VatPercentage::zero(),
                is_exempt: true,
            },
        )
    }

    fn set_product(
        &self,
        country_id: CountryId,
        product_id: ProductId,
        resolution: VatRateResolution,
    ) -> StoreResult<()> {
        let mut rates = self.rates.write().map_err(|_| StoreError::poisoned("vat_rates"))?;
        rates.products.insert((country_id, product_id), resolution);
        Ok(())
    }

    pub fn reset(&self) {
        if let Ok(mut rates) = self.rates.write() {
            *rates = Rates::default();
        }
    }
}

impl VatRateLookup for InMemoryVatRates {
    fn rate(
        &self,
        country_id: &CountryId,
        product_id: Option<&ProductId>,
    ) -> CoreResult<VatRateResolution> {
        let rates = self.rates.read().map_err(|_| StoreError::poisoned("vat_rates"))?;

        let product_rate = product_id
            .and_then(|product| rates.products.get(&(country_id.clone(), product.clone())));
        if let Some(resolution) = product_rate {
            return Ok(*resolution);
        }

        Ok(VatRateResolution {
            percentage: rates
                .standard
                .get(country_id)
                .copied()
                .unwrap_or(self.fallback),
            is_exempt: false,
        })
    }
}
