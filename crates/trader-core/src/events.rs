//! # Order Events
//!
//! Every mutating operation returns the events it caused instead of
//! recording them on the aggregate. Callers collect them next to the
//! resulting order: `(Order, Vec<OrderEvent>)`.

use serde::{Deserialize, Serialize};

use crate::ids::{LineId, OrderId, PaymentMethodId, PurchasableRef, ShippingProfileId};
use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    LineAdded {
        order_id: OrderId,
        line_id: LineId,
        purchasable_ref: PurchasableRef,
        quantity: i64,
    },
    LineQuantityUpdated {
        order_id: OrderId,
        line_id: LineId,
        quantity: i64,
    },
    LineRemoved {
        order_id: OrderId,
        line_id: LineId,
    },
    /// The refresh dropped a line whose purchasable is gone or unavailable.
    LineDropped {
        order_id: OrderId,
        line_id: LineId,
        purchasable_ref: PurchasableRef,
    },
    ShippingAddressUpdated {
        order_id: OrderId,
    },
    BillingAddressUpdated {
        order_id: OrderId,
    },
    ShopperUpdated {
        order_id: OrderId,
    },
    ShippingProfileChosen {
        order_id: OrderId,
        profile_id: ShippingProfileId,
    },
    PaymentMethodChosen {
        order_id: OrderId,
        method_id: PaymentMethodId,
    },
    CouponEntered {
        order_id: OrderId,
        coupon_code: String,
    },
    CouponRemoved {
        order_id: OrderId,
    },
    /// A refresh finished and was persisted.
    OrderRefreshed {
        order_id: OrderId,
        version: u64,
        total_incl: Money,
    },
}

impl OrderEvent {
    pub fn order_id(&self) -> &OrderId {
        match self {
            OrderEvent::LineAdded { order_id, .. }
            | OrderEvent::LineQuantityUpdated { order_id, .. }
            | OrderEvent::LineRemoved { order_id, .. }
            | OrderEvent::LineDropped { order_id, .. }
            | OrderEvent::ShippingAddressUpdated { order_id }
            | OrderEvent::BillingAddressUpdated { order_id }
            | OrderEvent::ShopperUpdated { order_id }
            | OrderEvent::ShippingProfileChosen { order_id, .. }
            | OrderEvent::PaymentMethodChosen { order_id, .. }
            | OrderEvent::CouponEntered { order_id, .. }
            | OrderEvent::CouponRemoved { order_id }
            | OrderEvent::OrderRefreshed { order_id, .. } => order_id,
        }
    }
}
