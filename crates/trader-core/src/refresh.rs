//! # Refresh Pipeline
//!
//! Recomputes every derived figure of an order and persists it once.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  refresh(order_id)                                                      │
//! │     │                                                                   │
//! │     ├── orders.load(order_id)                                           │
//! │     ├── AdjustLines ─► AdjustShipping ─► AdjustVatRates                 │
//! │     │        ─► AdjustDiscounts ─► AdjustOrderVatSnapshot               │
//! │     │             (any error: abort, nothing is written)                │
//! │     └── orders.save(order) ──► OrderRefreshed                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline itself holds no per-order state, so one `RefreshCart` can
//! serve many orders concurrently. Two refreshes of the same order are
//! serialized by the store's version check.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adjusters::{
    AdjustContext, AdjustDiscounts, AdjustLines, AdjustOrderVatSnapshot, AdjustShipping,
    AdjustVatRates, Adjuster,
};
use crate::config::TraderConfig;
use crate::error::CoreResult;
use crate::events::OrderEvent;
use crate::ids::OrderId;
use crate::order::Order;
use crate::ports::{Collaborators, OrderStore};
use crate::promo::PromoEngine;

pub struct RefreshCart {
    orders: Arc<dyn OrderStore>,
    adjusters: Vec<Box<dyn Adjuster>>,
}

impl RefreshCart {
    /// Builds the pipeline with its fixed adjuster order.
    pub fn new(collaborators: &Collaborators, config: &TraderConfig) -> Self {
        let adjusters: Vec<Box<dyn Adjuster>> = vec![
            Box::new(AdjustLines::new(collaborators.prices.clone())),
            Box::new(AdjustShipping::new(collaborators.shipping_rates.clone())),
            Box::new(AdjustVatRates::new(
                collaborators.vat_rates.clone(),
                config.clone(),
            )),
            Box::new(AdjustDiscounts::new(
                collaborators.promos.clone(),
                PromoEngine::new(config.prices_include_vat),
            )),
            Box::new(AdjustOrderVatSnapshot::new(config.clone())),
        ];
        RefreshCart {
            orders: collaborators.orders.clone(),
            adjusters,
        }
    }

    pub fn adjuster_names(&self) -> Vec<&'static str> {
        self.adjusters.iter().map(|a| a.name()).collect()
    }

    /// Runs every adjuster against `order` without touching the store.
    ///
    /// ## Errors
    /// The first adjuster error. `order` may then be partially adjusted and
    /// must be discarded.
    pub fn recalculate(
        &self,
        order: &mut Order,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<OrderEvent>> {
        let mut ctx = AdjustContext::new(now);
        for adjuster in &self.adjusters {
            tracing::debug!(
                order_id = %order.order_id(),
                adjuster = adjuster.name(),
                "Running adjuster"
            );
            if let Err(e) = adjuster.adjust(order, &mut ctx) {
                tracing::warn!(
                    order_id = %order.order_id(),
                    adjuster = adjuster.name(),
                    error = %e,
                    "Refresh aborted"
                );
                return Err(e);
            }
        }
        Ok(ctx.events)
    }

    /// Loads, recalculates and persists an order.
    pub fn refresh(&self, order_id: &OrderId) -> CoreResult<(Order, Vec<OrderEvent>)> {
        self.refresh_at(order_id, Utc::now())
    }

    /// [`refresh`](Self::refresh) at a fixed point in time.
    pub fn refresh_at(
        &self,
        order_id: &OrderId,
        now: DateTime<Utc>,
    ) -> CoreResult<(Order, Vec<OrderEvent>)> {
        let mut order = self.orders.load(order_id)?;
        let events = self.recalculate(&mut order, now)?;
        self.persist(order, events)
    }

    /// Saves an adjusted order and appends `OrderRefreshed`.
    ///
    /// ## Errors
    /// Whatever the store returns, typically `VersionConflict`.
    pub fn persist(
        &self,
        mut order: Order,
        mut events: Vec<OrderEvent>,
    ) -> CoreResult<(Order, Vec<OrderEvent>)> {
        let version = self.orders.save(&order)?;
        order.set_version(version);
        events.push(OrderEvent::OrderRefreshed {
            order_id: order.order_id().clone(),
            version,
            total_incl: order.totals().total_incl,
        });

        tracing::info!(
            order_id = %order.order_id(),
            version,
            total_incl = order.totals().total_incl.cents(),
            events = events.len(),
            "Order refreshed"
        );
        Ok((order, events))
    }
}
