//! # Store
//!
//! Owns one instance of every repository and hands them to the core as
//! [`Collaborators`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store::new(&config)                                                    │
//! │     ├── orders     Arc<InMemoryOrderStore>                              │
//! │     ├── promos     Arc<InMemoryPromoStore>                              │
//! │     ├── catalog    Arc<InMemoryCatalog>                                 │
//! │     ├── shipping   Arc<InMemoryShippingProfiles>                        │
//! │     └── vat_rates  Arc<InMemoryVatRates>                                │
//! │            │                                                            │
//! │            ▼  store.collaborators()                                     │
//! │  CartApplication / RefreshCart                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two `Store`s never share data, so parallel tests each build their own.

use std::sync::Arc;

use trader_core::ports::Collaborators;
use trader_core::{CartApplication, TraderConfig};

use crate::repository::catalog::InMemoryCatalog;
use crate::repository::orders::InMemoryOrderStore;
use crate::repository::promos::InMemoryPromoStore;
use crate::repository::shipping::InMemoryShippingProfiles;
use crate::repository::vat_rates::InMemoryVatRates;

pub struct Store {
    orders: Arc<InMemoryOrderStore>,
    promos: Arc<InMemoryPromoStore>,
    catalog: Arc<InMemoryCatalog>,
    shipping: Arc<InMemoryShippingProfiles>,
    vat_rates: Arc<InMemoryVatRates>,
}

impl Store {
    /// Empty repositories. Tariffs and unknown countries use the configured
    /// fallback standard rate.
    pub fn new(config: &TraderConfig) -> Self {
        Store {
            orders: Arc::new(InMemoryOrderStore::new()),
            promos: Arc::new(InMemoryPromoStore::new()),
            catalog: Arc::new(InMemoryCatalog::new()),
            shipping: Arc::new(InMemoryShippingProfiles::new(
                config.fallback_standard_vat_rate,
                config.tariffs_include_vat,
            )),
            vat_rates: Arc::new(InMemoryVatRates::new(config.fallback_standard_vat_rate)),
        }
    }

    pub fn orders(&self) -> &InMemoryOrderStore {
        &self.orders
    }

    pub fn promos(&self) -> &InMemoryPromoStore {
        &self.promos
    }

    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    pub fn shipping(&self) -> &InMemoryShippingProfiles {
        &self.shipping
    }

    pub fn vat_rates(&self) -> &InMemoryVatRates {
        &self.vat_rates
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            orders: self.orders.clone(),
            prices: self.catalog.clone(),
            shipping_rates: self.shipping.clone(),
            vat_rates: self.vat_rates.clone(),
            promos: self.promos.clone(),
        }
    }

    /// A cart application wired to this store.
    pub fn cart(&self, config: &TraderConfig) -> CartApplication {
        CartApplication::new(self.collaborators(), config)
    }

    /// Empties every repository.
    pub fn reset(&self) {
        self.orders.reset();
        self.promos.reset();
        self.catalog.reset();
        self.shipping.reset();
        self.vat_rates.reset();
        tracing::debug!("Store reset");
    }
}
