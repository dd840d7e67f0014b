//! # Conditions
//!
//! Predicates over order state that gate a promo discount. A discount
//! applies only when all of its conditions hold.
//!
//! | Key                      | Data                              |
//! |--------------------------|-----------------------------------|
//! | `minimum_lines_quantity` | `{"minimum_quantity": 3}`         |
//! | `minimum_amount`         | `{"amount": "5000"}`              |
//! | `shipping_country`       | `{"countries": ["BE", "NL"]}`     |
//!
//! Missing order data (no shipping address yet) makes a condition false;
//! it is never an error.

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::ids::CountryId;
use crate::money::Money;
use crate::order::Order;
use crate::promo::discount_kind::integer_field;
use crate::promo::MappedData;

/// The order state conditions are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub order: &'a Order,
    pub prices_include_vat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Sum of line quantities is at least `quantity`.
    MinimumLinesQuantity { quantity: i64 },
    /// Line subtotal (price mode, before discounts) is at least `amount`.
    MinimumAmount { amount: Money },
    /// Shipping address is in one of `countries`.
    ShippingCountry { countries: Vec<CountryId> },
}

type ConditionFactory = fn(&Value) -> CoreResult<Condition>;

static CONDITIONS: &[(&str, ConditionFactory)] = &[
    ("minimum_lines_quantity", minimum_lines_quantity_from_data),
    ("minimum_amount", minimum_amount_from_data),
    ("shipping_country", shipping_country_from_data),
];

impl Condition {
    /// Resolves mapped data through the registry.
    ///
    /// ## Errors
    /// `InvalidCondition` for an unknown key or malformed data.
    pub fn from_mapped_data(mapped: &MappedData) -> CoreResult<Self> {
        let factory = CONDITIONS
            .iter()
            .find(|(key, _)| *key == mapped.key)
            .map(|(_, factory)| *factory)
            .ok_or_else(|| CoreError::invalid_condition(&mapped.key, "unknown condition"))?;
        factory(&mapped.data)
    }

    pub fn key(&self) -> &'static str {
        match self {
            Condition::MinimumLinesQuantity { .. } => "minimum_lines_quantity",
            Condition::MinimumAmount { .. } => "minimum_amount",
            Condition::ShippingCountry { .. } => "shipping_country",
        }
    }

    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> bool {
        match self {
            Condition::MinimumLinesQuantity { quantity } => ctx.order.quantity() >= *quantity,
            Condition::MinimumAmount { amount } => {
                ctx.order.lines_subtotal(ctx.prices_include_vat) >= *amount
            }
            Condition::ShippingCountry { countries } => ctx
                .order
                .shipping_address()
                .is_some_and(|address| countries.contains(&address.country_id)),
        }
    }
}

// =============================================================================
// Factories
// =============================================================================

fn minimum_lines_quantity_from_data(data: &Value) -> CoreResult<Condition> {
    let quantity = integer_field(data, "minimum_quantity")
        .map_err(|reason| CoreError::invalid_condition("minimum_lines_quantity", reason))?;
    if quantity < 0 {
        return Err(CoreError::invalid_condition(
            "minimum_lines_quantity",
            "minimum_quantity must not be negative",
        ));
    }
    Ok(Condition::MinimumLinesQuantity { quantity })
}

fn minimum_amount_from_data(data: &Value) -> CoreResult<Condition> {
    let cents = integer_field(data, "amount")
        .map_err(|reason| CoreError::invalid_condition("minimum_amount", reason))?;
    Ok(Condition::MinimumAmount {
        amount: Money::from_cents(cents),
    })
}

fn shipping_country_from_data(data: &Value) -> CoreResult<Condition> {
    let invalid = || {
        CoreError::invalid_condition(
            "shipping_country",
            "countries must be a list of country codes",
        )
    };
    let countries = data
        .get("countries")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(|code| CountryId::new(code.trim().to_uppercase())))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;
    Ok(Condition::ShippingCountry { countries })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{LineId, OrderId, PurchasableRef};
    use crate::types::Address;
    use serde_json::json;

    fn order_with_quantity(quantity: i64) -> Order {
        let mut order = Order::new(OrderId::new("o1"));
        order
            .add_or_update_line(LineId::new("l1"), PurchasableRef::new("p1"), quantity)
            .unwrap();
        order
    }

    fn ctx(order: &Order) -> ConditionContext<'_> {
        ConditionContext {
            order,
            prices_include_vat: true,
        }
    }

    #[test]
    fn test_minimum_lines_quantity_gating() {
        let condition = Condition::from_mapped_data(&MappedData::new(
            "minimum_lines_quantity",
            json!({"minimum_quantity": 3}),
        ))
        .unwrap();

        assert!(!condition.evaluate(&ctx(&order_with_quantity(2))));
        assert!(condition.evaluate(&ctx(&order_with_quantity(3))));
    }

    #[test]
    fn test_shipping_country_without_address_is_false() {
        let condition = Condition::from_mapped_data(&MappedData::new(
            "shipping_country",
            json!({"countries": ["be", "NL"]}),
        ))
        .unwrap();

        let mut order = order_with_quantity(1);
        assert!(!condition.evaluate(&ctx(&order)));

        order.update_shipping_address(Address::in_country("BE"));
        assert!(condition.evaluate(&ctx(&order)));

        order.update_shipping_address(Address::in_country("FR"));
        assert!(!condition.evaluate(&ctx(&order)));
    }

    #[test]
    fn test_malformed_conditions() {
        let cases = [
            MappedData::new("minimum_lines_quantity", json!({})),
            MappedData::new("minimum_lines_quantity", json!({"minimum_quantity": "lots"})),
            MappedData::new("shipping_country", json!({"countries": "BE"})),
            MappedData::new("shipping_country", json!({"countries": [1, 2]})),
            MappedData::new("weather_is_nice", json!({})),
        ];
        for mapped in cases {
            assert!(matches!(
                Condition::from_mapped_data(&mapped),
                Err(CoreError::InvalidCondition { .. })
            ));
        }
    }
}
