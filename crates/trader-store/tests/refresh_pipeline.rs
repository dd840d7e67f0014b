//! End-to-end tests of the cart operations against the in-memory store.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use trader_core::ids::{
    CountryId, LineId, OrderId, PaymentMethodId, ProductId, PromoDiscountId, PromoId,
    PurchasableRef, ShippingProfileId,
};
use trader_core::ports::PurchasableForCart;
use trader_core::promo::{MappedData, Promo, PromoDiscount, PromoState};
use trader_core::{
    Address, CartApplication, CoreError, DiscountableType, Money, Order, OrderEvent, Price,
    Shopper, TraderConfig, VatPercentage,
};
use trader_store::{init_test_tracing, ShippingProfile, Store, StoreError};

// =============================================================================
// Fixtures
// =============================================================================

fn rate(whole: u32) -> VatPercentage {
    VatPercentage::from_whole(whole)
}

fn purchasable(reference: &str, unit_incl: i64, vat: u32) -> PurchasableForCart {
    PurchasableForCart {
        purchasable_ref: PurchasableRef::new(reference),
        product_id: ProductId::new(reference),
        title: reference.to_string(),
        unit_price: Price::incl(Money::from_cents(unit_incl), rate(vat)),
        sale_price: None,
        available: true,
    }
}

fn setup(config: TraderConfig) -> (Store, CartApplication) {
    init_test_tracing();
    let store = Store::new(&config);
    store.catalog().upsert(purchasable("widget", 10000, 21)).unwrap();
    store.catalog().upsert(purchasable("lamp", 12100, 21)).unwrap();
    store.catalog().upsert(purchasable("book", 10600, 6)).unwrap();
    store
        .vat_rates()
        .set_standard_rate(CountryId::new("BE"), rate(21))
        .unwrap();
    store
        .vat_rates()
        .set_product_rate(CountryId::new("BE"), ProductId::new("book"), rate(6))
        .unwrap();
    store
        .shipping()
        .upsert(ShippingProfile::new("standard", Money::from_cents(500)))
        .unwrap();
    let cart = store.cart(&config);
    (store, cart)
}

fn promo(id: &str, combinable: bool, applies_to: DiscountableType, discount: MappedData) -> Promo {
    Promo {
        promo_id: PromoId::new(id),
        coupon_code: None,
        state: PromoState::Online,
        is_combinable: combinable,
        is_system_promo: true,
        start_at: None,
        end_at: None,
        discounts: vec![PromoDiscount {
            promo_discount_id: PromoDiscountId::new(format!("{}-d", id)),
            applies_to,
            discount,
            conditions: Vec::new(),
        }],
    }
}

fn percentage_off(pct: &str) -> MappedData {
    MappedData::new("percentage_off", json!({ "percentage": pct }))
}

fn order_with(cart: &CartApplication, lines: &[(&str, i64)]) -> Order {
    let (mut order, _) = cart.start_order().unwrap();
    for (reference, quantity) in lines {
        let id = order.order_id().clone();
        order = cart
            .add_or_update_line(
                &id,
                LineId::new(*reference),
                PurchasableRef::new(*reference),
                *quantity,
            )
            .unwrap()
            .0;
    }
    order
}

fn assert_vat_lines_add_up(order: &Order) {
    let excl: Money = order.vat_lines().iter().map(|l| l.total_excl).sum();
    let vat: Money = order.vat_lines().iter().map(|l| l.total_vat).sum();
    let incl: Money = order.vat_lines().iter().map(|l| l.total_incl).sum();
    assert_eq!(excl, order.totals().total_excl);
    assert_eq!(vat, order.totals().total_vat);
    assert_eq!(incl, order.totals().total_incl);
}

// =============================================================================
// Pricing Scenarios
// =============================================================================

#[test]
fn test_single_line_vat_inclusive() {
    let (_store, cart) = setup(TraderConfig::default());
    let order = order_with(&cart, &[("widget", 2)]);

    let totals = order.totals();
    assert_eq!(totals.subtotal_incl.cents(), 20000);
    assert_eq!(totals.subtotal_excl.cents(), 16529);
    assert_eq!(totals.total_vat.cents(), 3471);
    assert_eq!(totals.total_incl.cents(), 20000);
    assert_vat_lines_add_up(&order);
}

#[test]
fn test_percentage_off_order() {
    let (store, cart) = setup(TraderConfig::default());
    store
        .promos()
        .insert(promo("p15", false, DiscountableType::Order, percentage_off("15")))
        .unwrap();
    let order = order_with(&cart, &[("widget", 2)]);

    let totals = order.totals();
    assert_eq!(totals.discount_total_incl.cents(), 3000);
    assert_eq!(totals.total_incl.cents(), 17000);
    assert_eq!(totals.total_excl.cents(), 14050);
    assert_eq!(totals.total_vat.cents(), 2950);
    assert_vat_lines_add_up(&order);
}

#[test]
fn test_shipping_spread_over_two_rates() {
    let config = TraderConfig {
        tariffs_include_vat: false,
        ..TraderConfig::default()
    };
    let (_store, cart) = setup(config);
    let order = order_with(&cart, &[("lamp", 1), ("book", 1)]);
    let (order, _) = cart
        .choose_shipping_profile(order.order_id(), ShippingProfileId::new("standard"))
        .unwrap();

    let vat_lines = order.vat_lines();
    assert_eq!(vat_lines.len(), 2);
    assert_eq!(vat_lines[0].vat, rate(6));
    assert_eq!(vat_lines[0].total_excl.cents(), 10233);
    assert_eq!(vat_lines[1].vat, rate(21));
    assert_eq!(vat_lines[1].total_excl.cents(), 10267);
    assert_eq!(order.totals().shipping_cost_excl.cents(), 500);
    assert_eq!(order.totals().total_incl.cents(), 23270);
    assert_vat_lines_add_up(&order);
}

#[test]
fn test_first_non_combinable_promo_wins() {
    let (store, cart) = setup(TraderConfig::default());
    store
        .promos()
        .insert(promo("first", false, DiscountableType::Order, percentage_off("10")))
        .unwrap();
    store
        .promos()
        .insert(promo("second", false, DiscountableType::Order, percentage_off("20")))
        .unwrap();
    let order = order_with(&cart, &[("widget", 2)]);

    assert_eq!(order.discounts().len(), 1);
    assert_eq!(order.discounts()[0].promo_id.as_str(), "first");
    assert_eq!(order.totals().total_incl.cents(), 18000);
}

#[test]
fn test_non_combinable_without_target_does_not_block_next() {
    let (store, cart) = setup(TraderConfig::default());
    store
        .promos()
        .insert(promo("free-shipping", false, DiscountableType::Shipping, percentage_off("100")))
        .unwrap();
    store
        .promos()
        .insert(promo("p15", false, DiscountableType::Order, percentage_off("15")))
        .unwrap();
    let order = order_with(&cart, &[("widget", 2)]);

    assert_eq!(order.discounts().len(), 1);
    assert_eq!(order.discounts()[0].promo_id.as_str(), "p15");
    assert_eq!(order.totals().total_incl.cents(), 17000);

    // once there is shipping to discount, the first promo takes the slot
    let (order, _) = cart
        .choose_shipping_profile(order.order_id(), ShippingProfileId::new("standard"))
        .unwrap();
    assert!(order.discounts().is_empty());
    assert_eq!(order.shipping().unwrap().discounts.len(), 1);
    assert_eq!(order.totals().total_incl.cents(), 20000);
}

#[test]
fn test_combinable_promos_stack_within_base() {
    let (store, cart) = setup(TraderConfig::default());
    store
        .promos()
        .insert(promo("sixty", true, DiscountableType::Order, percentage_off("60")))
        .unwrap();
    store
        .promos()
        .insert(promo("fifty", true, DiscountableType::Order, percentage_off("50")))
        .unwrap();
    let order = order_with(&cart, &[("widget", 1)]);

    let amounts: Vec<i64> = order.discounts().iter().map(|d| d.amount.cents()).collect();
    assert_eq!(amounts, vec![6000, 4000]);
    assert!(order.totals().total_incl.is_zero());
    assert_vat_lines_add_up(&order);
}

#[test]
fn test_condition_gates_promo() {
    let (store, cart) = setup(TraderConfig::default());
    let mut gated = promo("bulk", true, DiscountableType::Order, percentage_off("10"));
    gated.discounts[0].conditions = vec![MappedData::new(
        "minimum_lines_quantity",
        json!({ "minimum_quantity": 3 }),
    )];
    store.promos().insert(gated).unwrap();

    let order = order_with(&cart, &[("widget", 2)]);
    assert!(order.discounts().is_empty());

    let (order, _) = cart
        .add_or_update_line(
            order.order_id(),
            LineId::new("widget"),
            PurchasableRef::new("widget"),
            3,
        )
        .unwrap();
    assert_eq!(order.discounts().len(), 1);
    assert_eq!(order.totals().discount_total_incl.cents(), 3000);
}

fn dutch_business() -> Shopper {
    Shopper {
        email: "buyer@example.nl".to_string(),
        is_business: true,
        vat_number: Some("NL123456789B01".to_string()),
        locale: None,
    }
}

fn exempt_order(cart: &CartApplication, lines: &[(&str, i64)]) -> Order {
    let order = order_with(cart, lines);
    let id = order.order_id().clone();
    cart.update_shopper(&id, dutch_business()).unwrap();
    cart.update_billing_address(&id, Address::in_country("NL"))
        .unwrap()
        .0
}

#[test]
fn test_vat_exemption_for_foreign_business() {
    let (_store, cart) = setup(TraderConfig::default());
    let order = exempt_order(&cart, &[("widget", 2)]);

    assert!(order.is_vat_exempt());
    assert!(order.totals().total_vat.is_zero());
    // 20000 × 100 / 121 = 16528.9
    assert_eq!(order.totals().total_excl.cents(), 16529);
    assert_eq!(order.vat_lines().len(), 1);
    assert!(order.vat_lines()[0].vat.is_zero());
}

#[test]
fn test_exemption_keeps_excl_of_large_line() {
    let (_store, cart) = setup(TraderConfig::default());
    let taxed = order_with(&cart, &[("widget", 999)]);
    let exempt = exempt_order(&cart, &[("widget", 999)]);

    // 9_990_000 × 100 / 121 = 8_256_198.3
    assert_eq!(taxed.totals().subtotal_excl.cents(), 8_256_198);
    assert_eq!(exempt.totals().total_excl, taxed.totals().subtotal_excl);
    assert_eq!(exempt.totals().total_incl.cents(), 8_256_198);
    assert!(exempt.totals().total_vat.is_zero());
    assert_eq!(exempt.lines()[0].unit_price.vat, rate(21));
}

#[test]
fn test_business_in_primary_country_pays_vat() {
    let (_store, cart) = setup(TraderConfig::default());
    let order = order_with(&cart, &[("widget", 2)]);
    let id = order.order_id().clone();

    cart.update_shopper(
        &id,
        Shopper {
            email: "buyer@example.be".to_string(),
            is_business: true,
            vat_number: Some("BE0123456789".to_string()),
            locale: None,
        },
    )
    .unwrap();
    let (order, _) = cart
        .update_billing_address(&id, Address::in_country("BE"))
        .unwrap();

    assert!(!order.is_vat_exempt());
    assert_eq!(order.totals().total_vat.cents(), 3471);
}

// =============================================================================
// Refresh Behaviour
// =============================================================================

#[test]
fn test_refresh_is_idempotent() {
    let (store, cart) = setup(TraderConfig::default());
    store
        .promos()
        .insert(promo("p15", false, DiscountableType::Order, percentage_off("15")))
        .unwrap();
    let order = order_with(&cart, &[("widget", 2), ("book", 3)]);
    let id = order.order_id().clone();
    cart.choose_shipping_profile(&id, ShippingProfileId::new("standard"))
        .unwrap();

    let (first, _) = cart.refresh(&id).unwrap();
    let (second, events) = cart.refresh(&id).unwrap();

    assert_eq!(second.version(), first.version() + 1);
    assert_eq!(second.clone().with_version(first.version()), first);
    assert!(matches!(events.as_slice(), [OrderEvent::OrderRefreshed { .. }]));
}

#[test]
fn test_unavailable_line_is_dropped() {
    let (store, cart) = setup(TraderConfig::default());
    let order = order_with(&cart, &[("widget", 1), ("book", 1)]);

    store
        .catalog()
        .set_available(&PurchasableRef::new("book"), false)
        .unwrap();
    let (order, events) = cart.refresh(order.order_id()).unwrap();

    assert_eq!(order.lines().len(), 1);
    assert_eq!(order.totals().total_incl.cents(), 10000);
    assert!(events
        .iter()
        .any(|e| matches!(
            e,
            OrderEvent::LineDropped { line_id, .. } if line_id.as_str() == "book"
        )));
}

#[test]
fn test_failed_refresh_persists_nothing() {
    let (store, cart) = setup(TraderConfig::default());
    let order = order_with(&cart, &[("widget", 1)]);
    let id = order.order_id().clone();
    let (before, _) = cart
        .choose_shipping_profile(&id, ShippingProfileId::new("standard"))
        .unwrap();

    store
        .shipping()
        .remove(&ShippingProfileId::new("standard"))
        .unwrap();
    let err = cart
        .add_or_update_line(&id, LineId::new("widget"), PurchasableRef::new("widget"), 5)
        .unwrap_err();

    assert!(matches!(err, CoreError::ShippingProfileNotFound(_)));
    let stored = store.orders().get(&id).unwrap();
    assert_eq!(stored, before);
}

#[test]
fn test_line_discount_follows_removed_line() {
    let (store, cart) = setup(TraderConfig::default());
    store
        .promos()
        .insert(promo("lines", true, DiscountableType::Line, percentage_off("10")))
        .unwrap();
    let order = order_with(&cart, &[("widget", 1), ("book", 1)]);
    assert_eq!(order.lines().iter().map(|l| l.discounts.len()).sum::<usize>(), 2);

    let (order, _) = cart
        .remove_line(order.order_id(), &LineId::new("book"))
        .unwrap();
    assert_eq!(order.lines().len(), 1);
    assert_eq!(order.lines()[0].discounts.len(), 1);
    assert_eq!(order.totals().discount_total_incl.cents(), 1000);
}

#[test]
fn test_payment_fee_is_part_of_total() {
    let (_store, cart) = setup(TraderConfig::default());
    let order = order_with(&cart, &[("widget", 1)]);
    let (order, _) = cart
        .choose_payment_method(
            order.order_id(),
            PaymentMethodId::new("card"),
            Price::incl(Money::from_cents(121), rate(21)),
        )
        .unwrap();

    assert_eq!(order.totals().payment_cost_incl.cents(), 121);
    assert_eq!(order.totals().total_incl.cents(), 10121);
    assert_vat_lines_add_up(&order);
}

// =============================================================================
// Coupons
// =============================================================================

#[test]
fn test_coupon_lifecycle() {
    let (store, cart) = setup(TraderConfig::default());
    let mut spring = promo("spring", false, DiscountableType::Order, percentage_off("15"));
    spring.is_system_promo = false;
    spring.coupon_code = Some("SPRING".to_string());
    store.promos().insert(spring).unwrap();

    let order = order_with(&cart, &[("widget", 2)]);
    let id = order.order_id().clone();
    assert!(order.discounts().is_empty());

    let err = cart.enter_coupon(&id, "WINTER").unwrap_err();
    assert!(matches!(err, CoreError::CouponNotFound(code) if code == "WINTER"));

    let (order, events) = cart.enter_coupon(&id, "  spring ").unwrap();
    assert_eq!(order.coupon_code(), Some("spring"));
    assert_eq!(order.totals().discount_total_incl.cents(), 3000);
    assert!(matches!(events.first(), Some(OrderEvent::CouponEntered { .. })));

    let (order, _) = cart.remove_coupon(&id).unwrap();
    assert!(order.discounts().is_empty());
    assert_eq!(order.totals().total_incl.cents(), 20000);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_stale_save_is_rejected() {
    let (store, cart) = setup(TraderConfig::default());
    let order = order_with(&cart, &[("widget", 1)]);
    let stale = store.orders().get(order.order_id()).unwrap();

    cart.refresh(order.order_id()).unwrap();
    let err = store.orders().put(&stale).unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_orders_refresh_in_parallel() {
    let (_store, cart) = setup(TraderConfig::default());
    let cart = Arc::new(cart);

    let mut handles = Vec::new();
    for quantity in 1..=8_i64 {
        let cart = cart.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let (order, _) = cart.start_order()?;
            let (order, _) = cart.add_or_update_line(
                order.order_id(),
                LineId::new("widget"),
                PurchasableRef::new("widget"),
                quantity,
            )?;
            Ok::<_, CoreError>((quantity, order))
        }));
    }

    for handle in handles {
        let (quantity, order) = handle.await.unwrap().unwrap();
        assert_eq!(order.totals().total_incl.cents(), 10000 * quantity);
        assert_eq!(order.version(), 2);
    }
}

#[test]
fn test_reset_empties_store() {
    let (store, cart) = setup(TraderConfig::default());
    let order = order_with(&cart, &[("widget", 1)]);
    store.reset();

    let err = cart.refresh(order.order_id()).unwrap_err();
    assert!(matches!(err, CoreError::OrderNotFound(_)));
    assert!(matches!(
        cart.refresh(&OrderId::new("missing")),
        Err(CoreError::OrderNotFound(_))
    ));
}

// =============================================================================
// Properties
// =============================================================================

fn assert_refresh_is_stable(cart: &CartApplication, order: &Order) {
    let (again, _) = cart.refresh(order.order_id()).unwrap();
    assert_eq!(&again.with_version(order.version()), order);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_vat_lines_match_totals(
        widgets in 1i64..20,
        books in 0i64..20,
        order_pct in 0u32..=100,
        line_pct in 0u32..=100,
        shipping_pct in 0u32..=100,
        tariff in 0i64..5000,
        fee in 0i64..500,
        prices_include_vat in any::<bool>(),
    ) {
        let config = TraderConfig {
            prices_include_vat,
            ..TraderConfig::default()
        };
        let (store, cart) = setup(config.clone());
        store
            .shipping()
            .upsert(ShippingProfile::new("standard", Money::from_cents(tariff)))
            .unwrap();
        let promos = [
            ("order", DiscountableType::Order, order_pct),
            ("lines", DiscountableType::Line, line_pct),
            ("shipping", DiscountableType::Shipping, shipping_pct),
        ];
        for (id, applies_to, pct) in promos {
            store
                .promos()
                .insert(promo(id, true, applies_to, percentage_off(&pct.to_string())))
                .unwrap();
        }

        let mut lines = vec![("widget", widgets)];
        if books > 0 {
            lines.push(("book", books));
        }
        let order = order_with(&cart, &lines);
        let id = order.order_id().clone();
        cart.choose_shipping_profile(&id, ShippingProfileId::new("standard"))
            .unwrap();
        let (order, _) = cart
            .choose_payment_method(
                &id,
                PaymentMethodId::new("card"),
                Price::new(Money::from_cents(fee), rate(21), config.tariffs_include_vat),
            )
            .unwrap();

        let excl: Money = order.vat_lines().iter().map(|l| l.total_excl).sum();
        let vat: Money = order.vat_lines().iter().map(|l| l.total_vat).sum();
        let incl: Money = order.vat_lines().iter().map(|l| l.total_incl).sum();
        prop_assert_eq!(excl, order.totals().total_excl);
        prop_assert_eq!(vat, order.totals().total_vat);
        prop_assert_eq!(incl, order.totals().total_incl);
        if prices_include_vat {
            prop_assert!(!order.totals().total_incl.is_negative());
        } else {
            prop_assert!(!order.totals().total_excl.is_negative());
        }
        assert_refresh_is_stable(&cart, &order);
    }

    #[test]
    fn prop_lines_only_excl_is_subtotal_minus_discounts(
        widgets in 1i64..50,
        books in 1i64..50,
        order_pct in 0u32..=100,
        line_pct in 0u32..=100,
        prices_include_vat in any::<bool>(),
    ) {
        let (store, cart) = setup(TraderConfig {
            prices_include_vat,
            ..TraderConfig::default()
        });
        for (id, applies_to, pct) in [
            ("lines", DiscountableType::Line, line_pct),
            ("order", DiscountableType::Order, order_pct),
        ] {
            store
                .promos()
                .insert(promo(id, true, applies_to, percentage_off(&pct.to_string())))
                .unwrap();
        }

        let order = order_with(&cart, &[("widget", widgets), ("book", books)]);
        let totals = order.totals();
        let excl: Money = order.vat_lines().iter().map(|l| l.total_excl).sum();
        prop_assert_eq!(excl, totals.subtotal_excl - totals.discount_total_excl);
        prop_assert_eq!(totals.total_excl, totals.subtotal_excl - totals.discount_total_excl);
        assert_refresh_is_stable(&cart, &order);
    }
}
