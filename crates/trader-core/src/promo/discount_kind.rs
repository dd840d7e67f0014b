//! # Discount Kinds
//!
//! The closed set of discount types a promo can grant, resolved from mapped
//! data through a static registry keyed by tag.
//!
//! | Key              | Data                       | Amount                         |
//! |------------------|----------------------------|--------------------------------|
//! | `fixed_amount`   | `{"amount": "500"}`        | the amount, capped at the base |
//! | `percentage_off` | `{"percentage": "15"}`     | percentage of the base         |
//! | `sale_price`     | `{}`                       | `(unit - sale) × quantity`     |
//!
//! Adding a kind means adding a variant and one registry row; the promo
//! engine does not change.

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percentage};
use crate::promo::MappedData;

/// What a discount is computed from, in the order's price mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscountBase {
    /// The discountable's amount before any discount.
    pub amount: Money,
    /// How much cheaper the discountable is at sale prices.
    pub sale_reduction: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountKind {
    FixedAmount { amount: Money },
    PercentageOff { percentage: Percentage },
    SalePrice,
}

type DiscountFactory = fn(&Value) -> CoreResult<DiscountKind>;

static DISCOUNT_KINDS: &[(&str, DiscountFactory)] = &[
    ("fixed_amount", fixed_amount_from_data),
    ("percentage_off", percentage_off_from_data),
    ("sale_price", sale_price_from_data),
];

impl DiscountKind {
    /// Resolves mapped data through the registry.
    ///
    /// ## Errors
    /// `InvalidDiscount` for an unknown key or malformed data.
    pub fn from_mapped_data(mapped: &MappedData) -> CoreResult<Self> {
        let factory = DISCOUNT_KINDS
            .iter()
            .find(|(key, _)| *key == mapped.key)
            .map(|(_, factory)| *factory)
            .ok_or_else(|| CoreError::invalid_discount(&mapped.key, "unknown discount type"))?;
        factory(&mapped.data)
    }

    /// Registered keys, in registry order.
    pub fn keys() -> impl Iterator<Item = &'static str> {
        DISCOUNT_KINDS.iter().map(|(key, _)| *key)
    }

    pub fn key(&self) -> &'static str {
        match self {
            DiscountKind::FixedAmount { .. } => "fixed_amount",
            DiscountKind::PercentageOff { .. } => "percentage_off",
            DiscountKind::SalePrice => "sale_price",
        }
    }

    /// The discount magnitude for `base`, never above `base.amount`.
    pub fn compute_amount(&self, base: &DiscountBase) -> Money {
        let amount = match self {
            DiscountKind::FixedAmount { amount } => *amount,
            DiscountKind::PercentageOff { percentage } => base.amount.percentage(percentage),
            DiscountKind::SalePrice => base.sale_reduction,
        };
        amount.non_negative().min(base.amount.non_negative())
    }
}

// =============================================================================
// Factories
// =============================================================================

fn fixed_amount_from_data(data: &Value) -> CoreResult<DiscountKind> {
    let cents = integer_field(data, "amount")
        .map_err(|reason| CoreError::invalid_discount("fixed_amount", reason))?;
    if cents < 0 {
        return Err(CoreError::invalid_discount(
            "fixed_amount",
            "amount must not be negative",
        ));
    }
    Ok(DiscountKind::FixedAmount {
        amount: Money::from_cents(cents),
    })
}

fn percentage_off_from_data(data: &Value) -> CoreResult<DiscountKind> {
    let raw = match data.get("percentage") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(CoreError::invalid_discount(
                "percentage_off",
                "missing percentage",
            ))
        }
    };
    let percentage = raw
        .parse::<Percentage>()
        .map_err(|e| CoreError::invalid_discount("percentage_off", e.to_string()))?;
    Ok(DiscountKind::PercentageOff { percentage })
}

fn sale_price_from_data(_data: &Value) -> CoreResult<DiscountKind> {
    Ok(DiscountKind::SalePrice)
}

/// Reads an integer that may be stored as a JSON number or a numeric string.
pub(crate) fn integer_field(data: &Value, field: &str) -> Result<i64, String> {
    match data.get(field) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| format!("{} must be a whole number", field)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{} must be a whole number", field)),
        Some(_) => Err(format!("{} must be a whole number", field)),
        None => Err(format!("missing {}", field)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
