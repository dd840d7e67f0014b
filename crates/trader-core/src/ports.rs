//! # Collaborator Traits
//!
//! Everything the refresh pipeline needs from the outside world. The core
//! only defines these traits; trader-store implements them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RefreshCart                                                            │
//! │     │                                                                   │
//! │     ├── OrderStore          load(order_id) / save(order)               │
//! │     ├── PriceLookup         current unit price + availability          │
//! │     ├── ShippingRateLookup  tariff for profile + address               │
//! │     ├── VatRateLookup       rate for country + product                 │
//! │     └── PromoStore          active promos for coupon + time            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls are synchronous and return a single result or failure. Retries,
//! caching and locking belong to the implementation. `OrderStore` is
//! responsible for serializing refreshes of the same order; the in-memory
//! store does this with an optimistic version check.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::ids::{CountryId, OrderId, ProductId, PurchasableRef, ShippingProfileId};
use crate::order::Order;
use crate::price::Price;
use crate::promo::Promo;
use crate::types::{Address, VatPercentage};

/// Loads and atomically persists whole orders.
pub trait OrderStore: Send + Sync {
    /// ## Errors
    /// `OrderNotFound` when no order has this id.
    fn load(&self, order_id: &OrderId) -> CoreResult<Order>;

    /// Persists the order and returns its new version.
    ///
    /// ## Errors
    /// `VersionConflict` when the stored version differs from
    /// `order.version()`.
    fn save(&self, order: &Order) -> CoreResult<u64>;
}

/// What the catalog knows about a purchasable right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasableForCart {
    pub purchasable_ref: PurchasableRef,
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    pub sale_price: Option<Price>,
    pub available: bool,
}

pub trait PriceLookup: Send + Sync {
    /// `Ok(None)` when the purchasable no longer exists.
    fn find(&self, purchasable_ref: &PurchasableRef) -> CoreResult<Option<PurchasableForCart>>;
}

pub trait ShippingRateLookup: Send + Sync {
    /// `Ok(None)` when the profile does not exist (anymore); the refresh
    /// then aborts.
    fn rate(
        &self,
        profile_id: &ShippingProfileId,
        address: Option<&Address>,
    ) -> CoreResult<Option<Price>>;
}

/// Result of a VAT rate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatRateResolution {
    pub percentage: VatPercentage,
    pub is_exempt: bool,
}

pub trait VatRateLookup: Send + Sync {
    fn rate(
        &self,
        country_id: &CountryId,
        product_id: Option<&ProductId>,
    ) -> CoreResult<VatRateResolution>;
}

pub trait PromoStore: Send + Sync {
    /// Promos that may apply at `now`: online, inside their window, and
    /// either system promos or matching `coupon_code`. Order is significant:
    /// it decides which non-combinable discount wins.
    fn active_promos(&self, coupon_code: Option<&str>, now: DateTime<Utc>)
        -> CoreResult<Vec<Promo>>;
}

/// The full set of collaborators, shared between pipelines.
#[derive(Clone)]
pub struct Collaborators {
    pub orders: Arc<dyn OrderStore>,
    pub prices: Arc<dyn PriceLookup>,
    pub shipping_rates: Arc<dyn ShippingRateLookup>,
    pub vat_rates: Arc<dyn VatRateLookup>,
    pub promos: Arc<dyn PromoStore>,
}
