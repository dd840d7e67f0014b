//! # trader-core: Order Pricing for Trader
//!
//! This crate owns the order aggregate and the refresh pipeline that derives
//! every price, discount, VAT line and total of an order from its inputs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Trader Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront / API caller                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartApplication                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ trader-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   order   │  │ adjusters │  │   promo   │  │    vat    │  │   │
//! │  │   │   Order   │  │  Refresh  │  │  Engine   │  │ Allocator │  │   │
//! │  │   │   Line    │  │   Cart    │  │ Condition │  │   Price   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • COLLABORATORS BEHIND TRAITS (ports)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          trader-store (in-memory stores, config loading)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` in minor units and exact `Percentage`s
//! - [`price`] - amounts with their VAT treatment
//! - [`vat`] - sum-preserving VAT allocation
//! - [`order`] - the order aggregate
//! - [`promo`] - promos, conditions and the promo engine
//! - [`adjusters`] - the steps of the refresh pipeline
//! - [`refresh`] / [`cart`] - load, adjust, persist
//! - [`ports`] - traits implemented by the storage layer
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: every amount is an `i64` of minor units
//! 2. **One Rounding Rule**: half-up, away from zero, everywhere
//! 3. **Derived State Is Rebuilt**: a refresh recomputes, never patches
//! 4. **Explicit Errors**: typed errors, never panics
//!
//! ## Example Usage
//!
//! ```rust
//! use trader_core::money::Money;
//! use trader_core::price::Price;
//! use trader_core::types::VatPercentage;
//!
//! let price = Price::incl(Money::from_cents(20000), VatPercentage::from_whole(21));
//! assert_eq!(price.excluding_vat().cents(), 16529);
//! assert_eq!(price.vat_amount().cents(), 3471);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adjusters;
pub mod cart;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod money;
pub mod order;
pub mod ports;
pub mod price;
pub mod promo;
pub mod refresh;
pub mod types;
pub mod validation;
pub mod vat;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartApplication, CartOutcome};
pub use config::TraderConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::OrderEvent;
pub use money::{Money, Percentage};
pub use order::Order;
pub use price::Price;
pub use refresh::RefreshCart;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines in a single order.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typos such as 1000 instead of 10.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of a coupon code, in characters.
pub const MAX_COUPON_CODE_LENGTH: usize = 64;
