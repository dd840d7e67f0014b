//! # Promo Repository
//!
//! Promos are returned in insertion order. That order is significant: the
//! promo engine lets the first non-combinable discount win.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;
use trader_core::error::CoreResult;
use trader_core::ids::PromoId;
use trader_core::ports::PromoStore;
use trader_core::promo::Promo;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct InMemoryPromoStore {
    promos: RwLock<Vec<Promo>>,
}

impl InMemoryPromoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a promo, replacing one with the same id in place.
    pub fn insert(&self, promo: Promo) -> StoreResult<()> {
        let mut promos = self.promos.write().map_err(|_| StoreError::poisoned("promos"))?;
        match promos.iter_mut().find(|p| p.promo_id == promo.promo_id) {
            Some(existing) => *existing = promo,
            None => promos.push(promo),
        }
        Ok(())
    }

    pub fn remove(&self, promo_id: &PromoId) -> StoreResult<Promo> {
        let mut promos = self.promos.write().map_err(|_| StoreError::poisoned("promos"))?;
        let index = promos
            .iter()
            .position(|p| &p.promo_id == promo_id)
            .ok_or_else(|| StoreError::not_found("promo", promo_id.as_str()))?;
        Ok(promos.remove(index))
    }

    pub fn reset(&self) {
        if let Ok(mut promos) = self.promos.write() {
            promos.clear();
        }
    }
}

impl PromoStore for InMemoryPromoStore {
    fn active_promos(
        &self,
        coupon_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<Promo>> {
        let promos = self.promos.read().map_err(|_| StoreError::poisoned("promos"))?;
        let active: Vec<Promo> = promos
            .iter()
            .filter(|promo| promo.is_applicable(coupon_code, now))
            .cloned()
            .collect();
        debug!(
            coupon_code = coupon_code.unwrap_or(""),
            stored = promos.len(),
            active = active.len(),
            "Active promos resolved"
        );
        Ok(active)
    }
}
