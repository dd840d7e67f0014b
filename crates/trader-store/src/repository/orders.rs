//! # Order Repository
//!
//! Orders are kept as JSON snapshots next to their version.
//!
//! ## Optimistic Versioning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load(o1)  ──► Order { version: 3 }                                     │
//! │                     │ refresh                                           │
//! │                     ▼                                                   │
//! │  save(order)  stored version == 3 ?                                     │
//! │     ├── yes ──► store snapshot as version 4, return 4                   │
//! │     └── no  ──► VersionConflict, nothing written                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A never saved order has version 0 and may only be saved when the id is
//! unknown.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;
use trader_core::error::CoreResult;
use trader_core::ids::OrderId;
use trader_core::ports::OrderStore;
use trader_core::Order;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
struct StoredOrder {
    version: u64,
    snapshot: String,
}

/// Order store backed by a map of JSON snapshots.
///
/// ## Usage
/// ```rust,ignore
/// let orders = InMemoryOrderStore::new();
/// let version = orders.save(&order)?;
/// let loaded = orders.load(order.order_id())?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<OrderId, StoredOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, order_id: &OrderId) -> StoreResult<Order> {
        let orders = self.orders.lock().map_err(|_| StoreError::poisoned("orders"))?;
        let stored = orders
            .get(order_id)
            .ok_or_else(|| StoreError::not_found("order", order_id.as_str()))?;
        let order: Order = serde_json::from_str(&stored.snapshot)?;
        Ok(order.with_version(stored.version))
    }

    pub fn put(&self, order: &Order) -> StoreResult<u64> {
        let snapshot = serde_json::to_string(order)?;
        let mut orders = self.orders.lock().map_err(|_| StoreError::poisoned("orders"))?;

        let found = orders.get(order.order_id()).map_or(0, |s| s.version);
        if found != order.version() {
            debug!(
                order_id = %order.order_id(),
                expected = order.version(),
                found,
                "Rejecting stale order save"
            );
            return Err(StoreError::VersionConflict {
                order_id: order.order_id().to_string(),
                expected: order.version(),
                found,
            });
        }

        let version = found + 1;
        orders.insert(order.order_id().clone(), StoredOrder { version, snapshot });
        Ok(version)
    }

    pub fn len(&self) -> usize {
        self.orders.lock().map_or(0, |orders| orders.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every order.
    pub fn reset(&self) {
        if let Ok(mut orders) = self.orders.lock() {
            orders.clear();
        }
    }
}

impl OrderStore for InMemoryOrderStore {
    fn load(&self, order_id: &OrderId) -> CoreResult<Order> {
        Ok(self.get(order_id)?)
    }

    fn save(&self, order: &Order) -> CoreResult<u64> {
        Ok(self.put(order)?)
    }
}
