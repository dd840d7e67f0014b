//! # Identifiers
//!
//! Strongly typed string identifiers. Every entity id is its own type so a
//! line id can never be passed where a promo id is expected.
//!
//! Ids are opaque strings: collaborators may use UUIDs, SKUs or slugs.
//! [`OrderId::generate`] and [`LineId::generate`] hand out UUID v4 values for
//! callers without their own scheme.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }
    };
}

string_id!(
    /// Identifies an order (the cart before checkout).
    OrderId
);
string_id!(
    /// Identifies a line within an order.
    LineId
);
string_id!(
    /// Identifies a discount attached to an order, line, shipping or payment.
    DiscountId
);
string_id!(
    /// Identifies a promo aggregate.
    PromoId
);
string_id!(
    /// Identifies one discount definition inside a promo.
    PromoDiscountId
);
string_id!(
    /// Reference to something that can be put in a cart (a product variant).
    PurchasableRef
);
string_id!(ProductId);
string_id!(
    /// A shipping profile (tariff table) in the catalog.
    ShippingProfileId
);
string_id!(PaymentMethodId);
string_id!(ShippingId);
string_id!(PaymentId);
string_id!(
    /// ISO 3166-1 alpha-2 country code.
    CountryId
);

impl OrderId {
    /// Generates a random (UUID v4) order id.
    pub fn generate() -> Self {
        OrderId(uuid::Uuid::new_v4().to_string())
    }
}

impl LineId {
    /// Generates a random (UUID v4) line id.
    pub fn generate() -> Self {
        LineId(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
        assert_eq!(LineId::generate().as_str().len(), 36);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = PromoId::new("summer-sale");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"summer-sale\"");
        assert_eq!(id.to_string(), "summer-sale");
    }
}
