//! # Cart Walkthrough
//!
//! Seeds a store, fills a cart and prints the order after every step.
//!
//! ## Usage
//! ```bash
//! cargo run -p trader-store --bin demo
//!
//! # With a config file and more logging
//! RUST_LOG=debug cargo run -p trader-store --bin demo -- ./trader.toml
//! ```

use std::env;
use std::error::Error;

use serde_json::json;
use trader_core::ids::{
    CountryId, LineId, PaymentMethodId, ProductId, PurchasableRef, ShippingProfileId,
};
use trader_core::ports::PurchasableForCart;
use trader_core::promo::Promo;
use trader_core::{Address, Money, Order, Price, TraderConfig, VatPercentage};
use trader_store::{init_tracing, load_config, ShippingProfile, Store};

/// Promos as an admin would store them.
fn promos() -> serde_json::Value {
    json!([
        {
            "promo_id": "sale-prices",
            "coupon_code": null,
            "state": "online",
            "is_combinable": true,
            "is_system_promo": true,
            "start_at": null,
            "end_at": null,
            "discounts": [{
                "promo_discount_id": "sale-prices-lines",
                "applies_to": "line",
                "discount": { "key": "sale_price", "data": {} }
            }]
        },
        {
            "promo_id": "spring",
            "coupon_code": "SPRING",
            "state": "online",
            "is_combinable": false,
            "is_system_promo": false,
            "start_at": null,
            "end_at": null,
            "discounts": [{
                "promo_discount_id": "spring-15",
                "applies_to": "order",
                "discount": { "key": "percentage_off", "data": { "percentage": "15" } },
                "conditions": [{ "key": "minimum_amount", "data": { "amount": "5000" } }]
            }]
        },
        {
            "promo_id": "free-shipping",
            "coupon_code": null,
            "state": "online",
            "is_combinable": true,
            "is_system_promo": true,
            "start_at": null,
            "end_at": null,
            "discounts": [{
                "promo_discount_id": "free-shipping-be",
                "applies_to": "shipping",
                "discount": { "key": "percentage_off", "data": { "percentage": "100" } },
                "conditions": [{ "key": "shipping_country", "data": { "countries": ["BE"] } }]
            }]
        }
    ])
}

fn seed(store: &Store, config: &TraderConfig) -> Result<(), Box<dyn Error>> {
    let rate = |whole| VatPercentage::from_whole(whole);
    let price = |cents| Price::new(Money::from_cents(cents), rate(21), config.prices_include_vat);

    store.catalog().upsert(PurchasableForCart {
        purchasable_ref: PurchasableRef::new("mug"),
        product_id: ProductId::new("mug"),
        title: "Mug".to_string(),
        unit_price: price(1500),
        sale_price: None,
        available: true,
    })?;
    store.catalog().upsert(PurchasableForCart {
        purchasable_ref: PurchasableRef::new("cookbook"),
        product_id: ProductId::new("cookbook"),
        title: "Cookbook".to_string(),
        unit_price: price(3000),
        sale_price: Some(price(2500)),
        available: true,
    })?;

    store.vat_rates().set_standard_rate(CountryId::new("BE"), rate(21))?;
    store
        .vat_rates()
        .set_product_rate(CountryId::new("BE"), ProductId::new("cookbook"), rate(6))?;
    store
        .shipping()
        .upsert(ShippingProfile::new("standard", Money::from_cents(695)))?;

    let promos: Vec<Promo> = serde_json::from_value(promos())?;
    for promo in promos {
        store.promos().insert(promo)?;
    }
    Ok(())
}

fn print_order(step: &str, order: &Order) {
    let totals = order.totals();
    println!("── {} (version {})", step, order.version());
    for line in order.lines() {
        println!(
            "   {:<10} x{:<3} {:>8} incl",
            line.title.as_deref().unwrap_or("?"),
            line.quantity,
            line.totals.total_incl
        );
    }
    for vat_line in order.vat_lines() {
        println!(
            "   VAT {:<6} excl {:>8}  vat {:>8}",
            vat_line.vat.to_string(),
            vat_line.total_excl,
            vat_line.total_vat
        );
    }
    println!(
        "   discounts {:>8}  shipping {:>8}  total {:>8} incl / {:>8} excl",
        totals.discount_total_incl, totals.shipping_cost_incl, totals.total_incl, totals.total_excl
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config_path = env::args().nth(1).unwrap_or_else(|| "trader.toml".to_string());
    let config = load_config(&config_path)?;
    let store = Store::new(&config);
    seed(&store, &config)?;
    let cart = store.cart(&config);

    let (order, _) = cart.start_order()?;
    let id = order.order_id().clone();

    let (order, _) =
        cart.add_or_update_line(&id, LineId::generate(), PurchasableRef::new("mug"), 2)?;
    print_order("two mugs", &order);

    let (order, _) =
        cart.add_or_update_line(&id, LineId::generate(), PurchasableRef::new("cookbook"), 1)?;
    print_order("plus a cookbook on sale", &order);

    cart.update_shipping_address(&id, Address::in_country("BE"))?;
    let (order, _) = cart.choose_shipping_profile(&id, ShippingProfileId::new("standard"))?;
    print_order("shipping to BE", &order);

    let (order, _) = cart.choose_payment_method(
        &id,
        PaymentMethodId::new("card"),
        Price::new(
            Money::from_cents(25),
            VatPercentage::from_whole(21),
            config.tariffs_include_vat,
        ),
    )?;
    print_order("card payment", &order);

    let (order, events) = cart.enter_coupon(&id, "spring")?;
    print_order("coupon SPRING", &order);
    println!("   events: {}", serde_json::to_string(&events)?);

    Ok(())
}
