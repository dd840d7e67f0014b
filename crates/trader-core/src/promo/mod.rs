//! # Promos
//!
//! A promo is a campaign (a coupon code or an automatic system promo) that
//! carries one or more discount definitions, each guarded by conditions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Promo "SUMMER"  online, 2026-06-01 ..= 2026-08-31, not combinable      │
//! │  └── PromoDiscount "summer-15"  applies to: order                       │
//! │      ├── discount:   { key: "percentage_off", data: {"percentage":"15"}}│
//! │      └── conditions: [{ key: "minimum_lines_quantity",                  │
//! │                         data: {"minimum_quantity": 3} }]                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Discounts and conditions are stored as mapped data (`key` + JSON `data`)
//! and resolved through the static registries in [`discount_kind`] and
//! [`condition`].

pub mod condition;
pub mod discount_kind;
mod engine;

pub use condition::{Condition, ConditionContext};
pub use discount_kind::{DiscountBase, DiscountKind};
pub use engine::PromoEngine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PromoDiscountId, PromoId};
use crate::types::DiscountableType;

// =============================================================================
// Mapped Data
// =============================================================================

/// A registry entry as stored: a tag plus its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedData {
    pub key: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl MappedData {
    pub fn new(key: impl Into<String>, data: serde_json::Value) -> Self {
        MappedData {
            key: key.into(),
            data,
        }
    }
}

// =============================================================================
// Promo
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoState {
    Online,
    #[default]
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    pub promo_id: PromoId,
    pub coupon_code: Option<String>,
    pub state: PromoState,
    /// Combinable promos stack; at most one non-combinable discount is
    /// granted per order.
    pub is_combinable: bool,
    /// Applies without a coupon (e.g. the sale price promo).
    pub is_system_promo: bool,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub discounts: Vec<PromoDiscount>,
}

/// One discount definition inside a promo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoDiscount {
    pub promo_discount_id: PromoDiscountId,
    /// What the discount reduces.
    pub applies_to: DiscountableType,
    pub discount: MappedData,
    #[serde(default)]
    pub conditions: Vec<MappedData>,
}

impl Promo {
    /// Online and inside its validity window (both bounds inclusive).
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state == PromoState::Online
            && self.start_at.map_or(true, |start| start <= now)
            && self.end_at.map_or(true, |end| now <= end)
    }

    /// Trimmed, case-insensitive coupon comparison.
    pub fn matches_coupon(&self, code: &str) -> bool {
        match &self.coupon_code {
            Some(own) => {
                let own = own.trim();
                !own.is_empty() && own.to_lowercase() == code.trim().to_lowercase()
            }
            None => false,
        }
    }

    /// Whether this promo may grant discounts to an order carrying `coupon`.
    pub fn is_applicable(&self, coupon: Option<&str>, now: DateTime<Utc>) -> bool {
        self.is_active(now)
            && (self.is_system_promo || coupon.is_some_and(|code| self.matches_coupon(code)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn promo() -> Promo {
        Promo {
            promo_id: PromoId::new("summer"),
            coupon_code: Some("Summer".to_string()),
            state: PromoState::Online,
            is_combinable: false,
            is_system_promo: false,
            start_at: Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()),
            end_at: Some(Utc.with_ymd_and_hms(2026, 8, 31, 23, 59, 59).unwrap()),
            discounts: Vec::new(),
        }
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let promo = promo();
        assert!(promo.is_active(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()));
        assert!(promo.is_active(Utc.with_ymd_and_hms(2026, 8, 31, 23, 59, 59).unwrap()));
        assert!(!promo.is_active(Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()));
        assert!(!promo.is_active(Utc.with_ymd_and_hms(2026, 5, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_offline_promo_is_not_active() {
        let mut promo = promo();
        promo.state = PromoState::Offline;
        assert!(!promo.is_active(Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_coupon_matching() {
        let promo = promo();
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        assert!(promo.is_applicable(Some(" summer "), now));
        assert!(promo.is_applicable(Some("SUMMER"), now));
        assert!(!promo.is_applicable(Some("winter"), now));
        assert!(!promo.is_applicable(None, now));
    }

    #[test]
    fn test_system_promo_needs_no_coupon() {
        let mut promo = promo();
        promo.coupon_code = None;
        promo.is_system_promo = true;
        promo.start_at = None;
        promo.end_at = None;
        assert!(promo.is_applicable(None, Utc::now()));
    }
}
