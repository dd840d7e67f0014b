//! # Order Aggregate
//!
//! The order owns its lines, shipping, payment, order-level discounts,
//! shopper, addresses and the VAT snapshot.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order                                                                  │
//! │  ├── lines[]      ── discounts[]                                        │
//! │  ├── shipping?    ── discounts[]                                        │
//! │  ├── payment?     ── discounts[]                                        │
//! │  ├── discounts[]  (order level, no VAT rate)                            │
//! │  ├── shopper?, shipping_address?, billing_address?, coupon_code?        │
//! │  └── vat_lines[], totals            ◄── written ONLY by the pipeline    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutation Rules
//! - Public mutators change *inputs* (lines, addresses, coupon, ...) and
//!   return the [`OrderEvent`] they caused.
//! - Derived money fields are only written by the adjusters through
//!   crate-private methods. After any public mutation the order must be
//!   refreshed before its totals mean anything.

mod charge;
mod discount;
mod line;
mod totals;

pub use charge::{ChargeTotals, Payment, Shipping};
pub use discount::{Discount, DiscountTotals};
pub use line::{Line, LineTotals};
pub use totals::{OrderTotals, VatLine};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::events::OrderEvent;
use crate::ids::{
    LineId, OrderId, PaymentId, PaymentMethodId, PurchasableRef, ShippingId, ShippingProfileId,
};
use crate::money::Money;
use crate::price::Price;
use crate::types::{Address, DiscountableType, Shopper, VatPercentage};
use crate::validation::{validate_coupon_code, validate_line_count, validate_quantity};

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    version: u64,
    lines: Vec<Line>,
    shipping: Option<Shipping>,
    payment: Option<Payment>,
    discounts: Vec<Discount>,
    shopper: Option<Shopper>,
    shipping_address: Option<Address>,
    billing_address: Option<Address>,
    coupon_code: Option<String>,
    vat_exempt: bool,
    vat_lines: Vec<VatLine>,
    totals: OrderTotals,
}

impl Order {
    /// An empty, never persisted order (version 0).
    pub fn new(order_id: OrderId) -> Self {
        Order {
            order_id,
            version: 0,
            lines: Vec::new(),
            shipping: None,
            payment: None,
            discounts: Vec::new(),
            shopper: None,
            shipping_address: None,
            billing_address: None,
            coupon_code: None,
            vat_exempt: false,
            vat_lines: Vec::new(),
            totals: OrderTotals::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Version of the persisted state this order was loaded from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The same order stamped with a stored version. Order stores call this
    /// when handing out a snapshot.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, line_id: &LineId) -> Option<&Line> {
        self.lines.iter().find(|l| &l.line_id == line_id)
    }

    pub fn shipping(&self) -> Option<&Shipping> {
        self.shipping.as_ref()
    }

    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }

    /// Order-level discounts.
    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    /// Every discount on the order, whatever it is attached to.
    pub fn all_discounts(&self) -> impl Iterator<Item = &Discount> {
        self.discounts
            .iter()
            .chain(self.lines.iter().flat_map(|l| l.discounts.iter()))
            .chain(self.shipping.iter().flat_map(|s| s.discounts.iter()))
            .chain(self.payment.iter().flat_map(|p| p.discounts.iter()))
    }

    pub fn shopper(&self) -> Option<&Shopper> {
        self.shopper.as_ref()
    }

    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    pub fn billing_address(&self) -> Option<&Address> {
        self.billing_address.as_ref()
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn is_vat_exempt(&self) -> bool {
        self.vat_exempt
    }

    /// One entry per rate, ascending.
    pub fn vat_lines(&self) -> &[VatLine] {
        &self.vat_lines
    }

    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// Sum of all line quantities.
    pub fn quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line totals before any discount, in the requested VAT mode.
    pub fn lines_subtotal(&self, includes_vat: bool) -> Money {
        self.lines.iter().map(|l| l.total().in_mode(includes_vat)).sum()
    }

    // =========================================================================
    // Input Mutators
    // =========================================================================

    /// Adds a line, or sets the quantity of an existing one.
    ///
    /// ## Errors
    /// - `Validation` when the quantity is out of range or the order is full
    pub fn add_or_update_line(
        &mut self,
        line_id: LineId,
        purchasable_ref: PurchasableRef,
        quantity: i64,
    ) -> CoreResult<OrderEvent> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.line_id == line_id) {
            line.quantity = quantity;
            line.purchasable_ref = purchasable_ref;
            return Ok(OrderEvent::LineQuantityUpdated {
                order_id: self.order_id.clone(),
                line_id,
                quantity,
            });
        }

        validate_line_count(self.lines.len())?;
        self.lines
            .push(Line::new(line_id.clone(), purchasable_ref.clone(), quantity));
        Ok(OrderEvent::LineAdded {
            order_id: self.order_id.clone(),
            line_id,
            purchasable_ref,
            quantity,
        })
    }

    pub fn remove_line(&mut self, line_id: &LineId) -> CoreResult<OrderEvent> {
        let index = self
            .lines
            .iter()
            .position(|l| &l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound {
                order_id: self.order_id.to_string(),
                line_id: line_id.to_string(),
            })?;
        self.lines.remove(index);
        Ok(OrderEvent::LineRemoved {
            order_id: self.order_id.clone(),
            line_id: line_id.clone(),
        })
    }

    pub fn update_shipping_address(&mut self, address: Address) -> OrderEvent {
        self.shipping_address = Some(address);
        OrderEvent::ShippingAddressUpdated {
            order_id: self.order_id.clone(),
        }
    }

    pub fn update_billing_address(&mut self, address: Address) -> OrderEvent {
        self.billing_address = Some(address);
        OrderEvent::BillingAddressUpdated {
            order_id: self.order_id.clone(),
        }
    }

    pub fn update_shopper(&mut self, shopper: Shopper) -> OrderEvent {
        self.shopper = Some(shopper);
        OrderEvent::ShopperUpdated {
            order_id: self.order_id.clone(),
        }
    }

    /// Selects a shipping profile. The tariff is resolved on refresh.
    pub fn choose_shipping_profile(&mut self, profile_id: ShippingProfileId) -> OrderEvent {
        let unchanged = self
            .shipping
            .as_ref()
            .is_some_and(|s| s.profile_id == profile_id);
        if !unchanged {
            let shipping_id = ShippingId::new(format!("{}:shipping", self.order_id));
            self.shipping = Some(Shipping::new(
                shipping_id,
                profile_id.clone(),
                Price::zero(VatPercentage::zero(), true),
            ));
        }
        OrderEvent::ShippingProfileChosen {
            order_id: self.order_id.clone(),
            profile_id,
        }
    }

    /// Selects a payment method with its fee.
    pub fn choose_payment_method(&mut self, method_id: PaymentMethodId, cost: Price) -> OrderEvent {
        let payment_id = PaymentId::new(format!("{}:payment", self.order_id));
        self.payment = Some(Payment::new(payment_id, method_id.clone(), cost));
        OrderEvent::PaymentMethodChosen {
            order_id: self.order_id.clone(),
            method_id,
        }
    }

    /// Stores a coupon code. Whether a promo honours it is decided by the
    /// caller before and by the promo engine on every refresh.
    pub fn enter_coupon(&mut self, code: &str) -> CoreResult<OrderEvent> {
        let code = validate_coupon_code(code)?;
        self.coupon_code = Some(code.clone());
        Ok(OrderEvent::CouponEntered {
            order_id: self.order_id.clone(),
            coupon_code: code,
        })
    }

    pub fn remove_coupon(&mut self) -> OrderEvent {
        self.coupon_code = None;
        OrderEvent::CouponRemoved {
            order_id: self.order_id.clone(),
        }
    }

    // =========================================================================
    // Pipeline Mutators (crate-private)
    // =========================================================================

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<Line> {
        &mut self.lines
    }

    pub(crate) fn shipping_mut(&mut self) -> Option<&mut Shipping> {
        self.shipping.as_mut()
    }

    pub(crate) fn payment_mut(&mut self) -> Option<&mut Payment> {
        self.payment.as_mut()
    }

    pub(crate) fn discounts_mut(&mut self) -> &mut Vec<Discount> {
        &mut self.discounts
    }

    pub(crate) fn set_vat_exempt(&mut self, exempt: bool) {
        self.vat_exempt = exempt;
    }

    pub(crate) fn set_vat_snapshot(&mut self, vat_lines: Vec<VatLine>, totals: OrderTotals) {
        self.vat_lines = vat_lines;
        self.totals = totals;
    }

    /// Removes every discount from the order and its children.
    pub(crate) fn clear_discounts(&mut self) {
        self.discounts.clear();
        for line in &mut self.lines {
            line.discounts.clear();
        }
        if let Some(shipping) = &mut self.shipping {
            shipping.discounts.clear();
        }
        if let Some(payment) = &mut self.payment {
            payment.discounts.clear();
        }
    }

    /// Attaches a discount to the discountable it references.
    ///
    /// ## Errors
    /// `DiscountableNotFound` when the target is not on the order.
    pub(crate) fn attach_discount(&mut self, discount: Discount) -> CoreResult<()> {
        let not_found = || CoreError::DiscountableNotFound {
            kind: discount.discountable_type.to_string(),
            id: discount.discountable_id.clone(),
        };
        match discount.discountable_type {
            DiscountableType::Order => {
                if self.order_id.as_str() != discount.discountable_id {
                    return Err(not_found());
                }
                self.discounts.push(discount);
            }
            DiscountableType::Line => {
                let line = self
                    .lines
                    .iter_mut()
                    .find(|l| l.line_id.as_str() == discount.discountable_id)
                    .ok_or_else(not_found)?;
                line.discounts.push(discount);
            }
            DiscountableType::Shipping => {
                let shipping = self
                    .shipping
                    .as_mut()
                    .filter(|s| s.shipping_id.as_str() == discount.discountable_id)
                    .ok_or_else(not_found)?;
                shipping.discounts.push(discount);
            }
            DiscountableType::Payment => {
                let payment = self
                    .payment
                    .as_mut()
                    .filter(|p| p.payment_id.as_str() == discount.discountable_id)
                    .ok_or_else(not_found)?;
                payment.discounts.push(discount);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PromoDiscountId, PromoId};

    fn order() -> Order {
        Order::new(OrderId::new("order-1"))
    }

    fn discount(kind: DiscountableType, target: &str) -> Discount {
        Discount {
            discount_id: Discount::id_for(
                &OrderId::new("order-1"),
                &PromoDiscountId::new("pd"),
                kind,
                target,
            ),
            discountable_type: kind,
            discountable_id: target.to_string(),
            promo_id: PromoId::new("promo"),
            promo_discount_id: PromoDiscountId::new("pd"),
            amount: Money::from_cents(100),
            amount_includes_vat: true,
            vat: None,
            totals: DiscountTotals::default(),
        }
    }

    #[test]
    fn test_add_then_update_line() {
        let mut order = order();
        let event = order
            .add_or_update_line(LineId::new("l1"), PurchasableRef::new("p1"), 2)
            .unwrap();
        assert!(matches!(event, OrderEvent::LineAdded { quantity: 2, .. }));

        let event = order
            .add_or_update_line(LineId::new("l1"), PurchasableRef::new("p1"), 5)
            .unwrap();
        assert!(matches!(
            event,
            OrderEvent::LineQuantityUpdated { quantity: 5, .. }
        ));
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.quantity(), 5);
    }

    #[test]
    fn test_add_line_rejects_invalid_quantity() {
        let mut order = order();
        let result = order.add_or_update_line(LineId::new("l1"), PurchasableRef::new("p1"), 0);
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(order.lines().is_empty());
    }

    #[test]
    fn test_remove_unknown_line() {
        let mut order = order();
        let result = order.remove_line(&LineId::new("nope"));
        assert!(matches!(result, Err(CoreError::LineNotFound { .. })));
    }

    #[test]
    fn test_attach_discount_requires_existing_target() {
        let mut order = order();
        order
            .add_or_update_line(LineId::new("l1"), PurchasableRef::new("p1"), 1)
            .unwrap();

        assert!(order
            .attach_discount(discount(DiscountableType::Line, "l1"))
            .is_ok());
        assert!(order
            .attach_discount(discount(DiscountableType::Order, "order-1"))
            .is_ok());

        let missing_line = order.attach_discount(discount(DiscountableType::Line, "l2"));
        assert!(matches!(
            missing_line,
            Err(CoreError::DiscountableNotFound { .. })
        ));
        let missing_shipping =
            order.attach_discount(discount(DiscountableType::Shipping, "order-1:shipping"));
        assert!(missing_shipping.is_err());

        assert_eq!(order.all_discounts().count(), 2);
        order.clear_discounts();
        assert_eq!(order.all_discounts().count(), 0);
    }

    #[test]
    fn test_choose_same_shipping_profile_keeps_shipping() {
        let mut order = order();
        order.choose_shipping_profile(ShippingProfileId::new("bpost"));
        order
            .attach_discount(discount(DiscountableType::Shipping, "order-1:shipping"))
            .unwrap();

        order.choose_shipping_profile(ShippingProfileId::new("bpost"));
        assert_eq!(order.shipping().map(|s| s.discounts.len()), Some(1));

        order.choose_shipping_profile(ShippingProfileId::new("dhl"));
        assert_eq!(order.shipping().map(|s| s.discounts.len()), Some(0));
    }

    #[test]
    fn test_coupon_is_trimmed() {
        let mut order = order();
        order.enter_coupon("  SUMMER ").unwrap();
        assert_eq!(order.coupon_code(), Some("SUMMER"));
        order.remove_coupon();
        assert_eq!(order.coupon_code(), None);
        assert!(order.enter_coupon("").is_err());
    }

    #[test]
    fn test_order_snapshot_roundtrip() {
        let mut order = order();
        order
            .add_or_update_line(LineId::new("l1"), PurchasableRef::new("p1"), 3)
            .unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
