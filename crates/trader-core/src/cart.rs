//! # Cart Operations
//!
//! Entry points a storefront calls. Every operation follows the same shape:
//!
//! ```text
//! load ──► mutate inputs ──► recalculate ──► save (once) ──► (Order, events)
//! ```
//!
//! The mutation's own event comes first, followed by the events raised by the
//! adjusters and finally `OrderRefreshed`. A failure anywhere leaves the
//! stored order untouched.

use chrono::{DateTime, Utc};

use crate::config::TraderConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::OrderEvent;
use crate::ids::{LineId, OrderId, PaymentMethodId, PurchasableRef, ShippingProfileId};
use crate::order::Order;
use crate::ports::Collaborators;
use crate::price::Price;
use crate::refresh::RefreshCart;
use crate::types::{Address, Shopper};
use crate::validation::validate_coupon_code;

/// Result of every cart operation.
pub type CartOutcome = CoreResult<(Order, Vec<OrderEvent>)>;

pub struct CartApplication {
    pipeline: RefreshCart,
    collaborators: Collaborators,
}

impl CartApplication {
    pub fn new(collaborators: Collaborators, config: &TraderConfig) -> Self {
        CartApplication {
            pipeline: RefreshCart::new(&collaborators, config),
            collaborators,
        }
    }

    pub fn pipeline(&self) -> &RefreshCart {
        &self.pipeline
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Creates and persists an empty order with a fresh id.
    pub fn start_order(&self) -> CartOutcome {
        let order = Order::new(OrderId::generate());
        tracing::info!(order_id = %order.order_id(), "Order started");
        self.pipeline.persist(order, Vec::new())
    }

    pub fn add_or_update_line(
        &self,
        order_id: &OrderId,
        line_id: LineId,
        purchasable_ref: PurchasableRef,
        quantity: i64,
    ) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| {
            order.add_or_update_line(line_id, purchasable_ref, quantity)
        })
    }

    pub fn remove_line(&self, order_id: &OrderId, line_id: &LineId) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| order.remove_line(line_id))
    }

    pub fn update_shipping_address(&self, order_id: &OrderId, address: Address) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| {
            Ok(order.update_shipping_address(address))
        })
    }

    pub fn update_billing_address(&self, order_id: &OrderId, address: Address) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| {
            Ok(order.update_billing_address(address))
        })
    }

    pub fn update_shopper(&self, order_id: &OrderId, shopper: Shopper) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| Ok(order.update_shopper(shopper)))
    }

    pub fn choose_shipping_profile(
        &self,
        order_id: &OrderId,
        profile_id: ShippingProfileId,
    ) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| {
            Ok(order.choose_shipping_profile(profile_id))
        })
    }

    pub fn choose_payment_method(
        &self,
        order_id: &OrderId,
        method_id: PaymentMethodId,
        cost: Price,
    ) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| {
            Ok(order.choose_payment_method(method_id, cost))
        })
    }

    /// Stores a coupon code, provided an active promo honours it.
    pub fn enter_coupon(&self, order_id: &OrderId, code: &str) -> CartOutcome {
        self.enter_coupon_at(order_id, code, Utc::now())
    }

    /// [`enter_coupon`](Self::enter_coupon) at a fixed point in time.
    ///
    /// ## Errors
    /// - `Validation` for a malformed code
    /// - `CouponNotFound` when no active promo carries the code
    pub fn enter_coupon_at(
        &self,
        order_id: &OrderId,
        code: &str,
        now: DateTime<Utc>,
    ) -> CartOutcome {
        let code = validate_coupon_code(code)?;
        let honoured = self
            .collaborators
            .promos
            .active_promos(Some(&code), now)?
            .iter()
            .any(|promo| promo.is_active(now) && promo.matches_coupon(&code));
        if !honoured {
            tracing::info!(order_id = %order_id, coupon_code = %code, "Unknown coupon");
            return Err(CoreError::CouponNotFound(code));
        }

        self.mutate(order_id, now, |order| order.enter_coupon(&code))
    }

    pub fn remove_coupon(&self, order_id: &OrderId) -> CartOutcome {
        self.mutate(order_id, Utc::now(), |order| Ok(order.remove_coupon()))
    }

    /// Recomputes an order without changing its inputs.
    pub fn refresh(&self, order_id: &OrderId) -> CartOutcome {
        self.pipeline.refresh(order_id)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn mutate<F>(&self, order_id: &OrderId, now: DateTime<Utc>, change: F) -> CartOutcome
    where
        F: FnOnce(&mut Order) -> CoreResult<OrderEvent>,
    {
        let mut order = self.collaborators.orders.load(order_id)?;
        let mut events = vec![change(&mut order)?];
        events.extend(self.pipeline.recalculate(&mut order, now)?);
        self.pipeline.persist(order, events)
    }
}
