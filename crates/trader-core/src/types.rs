//! # Domain Types
//!
//! Small value types shared by the order aggregate, the promo engine and the
//! collaborator traits.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │  VatPercentage  │   │ DiscountableType │   │     Shopper     │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  "21", "6"      │   │  Order           │   │  email          │      │
//! │  │  "5.5"          │   │  Line            │   │  is_business    │      │
//! │  │  Ord (map key)  │   │  Shipping        │   │  vat_number     │      │
//! │  └─────────────────┘   │  Payment         │   └─────────────────┘      │
//! │                        └──────────────────┘                             │
//! │  ┌─────────────────┐                                                    │
//! │  │     Address     │   Billing address decides the VAT country,        │
//! │  │  ─────────────  │   shipping address decides the shipping tariff.   │
//! │  │  country_id     │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::ids::CountryId;
use crate::money::Percentage;

// =============================================================================
// VAT Percentage
// =============================================================================

/// A VAT rate such as 21% or 5.5%.
///
/// Ordered so it can key the per-rate buckets of the VAT snapshot; VAT lines
/// are always listed in ascending rate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatPercentage(Percentage);

impl VatPercentage {
    /// Wraps a validated percentage.
    #[inline]
    pub const fn new(percentage: Percentage) -> Self {
        VatPercentage(percentage)
    }

    /// Whole-number rate (21 → 21%).
    pub fn from_whole(rate: u32) -> Self {
        VatPercentage(Percentage::from_whole(rate))
    }

    /// Zero rate, used for VAT-exempt orders.
    #[inline]
    pub const fn zero() -> Self {
        VatPercentage(Percentage::zero())
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns the rate as a percentage for money math.
    #[inline]
    pub fn percentage(&self) -> &Percentage {
        &self.0
    }
}

impl fmt::Display for VatPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for VatPercentage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(VatPercentage(s.parse()?))
    }
}

// =============================================================================
// Discountable Type
// =============================================================================

/// What a discount is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountableType {
    /// The order as a whole. Carries no VAT rate of its own.
    Order,
    /// One order line.
    Line,
    /// The order's shipping.
    Shipping,
    /// The order's payment.
    Payment,
}

impl DiscountableType {
    /// Tag used in discount ids and promo data.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountableType::Order => "order",
            DiscountableType::Line => "line",
            DiscountableType::Shipping => "shipping",
            DiscountableType::Payment => "payment",
        }
    }
}

impl fmt::Display for DiscountableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shopper & Address
// =============================================================================

/// The person (or business) placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Shopper {
    pub email: String,
    /// Business shoppers with a VAT number may be exempt from VAT.
    pub is_business: bool,
    pub vat_number: Option<String>,
    pub locale: Option<String>,
}

impl Shopper {
    /// Whether the shopper can claim an intra-community VAT exemption.
    pub fn claims_vat_exemption(&self) -> bool {
        self.is_business
            && self
                .vat_number
                .as_deref()
                .is_some_and(|number| !number.trim().is_empty())
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// ISO 3166-1 alpha-2 code ("BE", "NL").
    pub country_id: CountryId,
    pub line_1: Option<String>,
    pub line_2: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl Address {
    /// An address known only by its country.
    pub fn in_country(country_id: impl Into<CountryId>) -> Self {
        Address {
            country_id: country_id.into(),
            line_1: None,
            line_2: None,
            postal_code: None,
            city: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
