//! # Adjusters
//!
//! One adjuster per derived aspect of order pricing. The refresh pipeline
//! runs them in a fixed order against one in-memory order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AdjustLines             unit prices, availability, line totals     │
//! │  2. AdjustShipping          shipping tariff for profile + address      │
//! │  3. AdjustVatRates          rate per line / shipping / payment,        │
//! │                             VAT exemption                              │
//! │  4. AdjustDiscounts         promo engine, discounts re-attached        │
//! │  5. AdjustOrderVatSnapshot  VAT allocation, VAT lines, order totals    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Discounts must see post-price, post-rate amounts and the snapshot must
//! see the discounts, so the order above is fixed. Adjusters never persist;
//! a failing adjuster aborts the whole refresh.

mod discounts;
mod lines;
mod shipping;
mod vat_rates;
mod vat_snapshot;

pub use discounts::AdjustDiscounts;
pub use lines::AdjustLines;
pub use shipping::AdjustShipping;
pub use vat_rates::AdjustVatRates;
pub use vat_snapshot::AdjustOrderVatSnapshot;

use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::events::OrderEvent;
use crate::order::Order;

/// State shared by the adjusters of one refresh.
#[derive(Debug, Clone)]
pub struct AdjustContext {
    pub now: DateTime<Utc>,
    /// Events raised by adjusters (e.g. a dropped line).
    pub events: Vec<OrderEvent>,
}

impl AdjustContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        AdjustContext {
            now,
            events: Vec::new(),
        }
    }
}

/// One step of the refresh pipeline.
///
/// Implementations must be idempotent: adjusting an already adjusted order
/// with unchanged collaborators changes nothing.
pub trait Adjuster: Send + Sync {
    fn name(&self) -> &'static str;

    fn adjust(&self, order: &mut Order, ctx: &mut AdjustContext) -> CoreResult<()>;
}
