//! # Repository Module
//!
//! In-memory implementations of the collaborator traits.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  trait (trader-core)      implementation (here)                         │
//! │  ────────────────────     ─────────────────────────                     │
//! │  OrderStore           ◄── InMemoryOrderStore       (orders.rs)         │
//! │  PromoStore           ◄── InMemoryPromoStore       (promos.rs)         │
//! │  PriceLookup          ◄── InMemoryCatalog          (catalog.rs)        │
//! │  ShippingRateLookup   ◄── InMemoryShippingProfiles (shipping.rs)       │
//! │  VatRateLookup        ◄── InMemoryVatRates         (vat_rates.rs)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository is owned by a [`Store`](crate::Store) value rather than
//! living in a static, and offers `reset()` to empty it between runs.

pub mod catalog;
pub mod orders;
pub mod promos;
pub mod shipping;
pub mod vat_rates;
