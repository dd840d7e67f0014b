//! # trader-store: Collaborators for Trader
//!
//! In-memory implementations of every trait the refresh pipeline depends
//! on, plus configuration loading.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartApplication (trader-core)                                          │
//! │       │ Collaborators                                                   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   trader-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │ Repositories  │    │    Config    │  │   │
//! │  │   │  (store.rs)   │───►│ orders        │    │ trader.toml  │  │   │
//! │  │   │               │    │ promos        │    │ TRADER_*     │  │   │
//! │  │   │ reset()       │    │ catalog, ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trader_store::{load_config, Store};
//!
//! let config = load_config("trader.toml")?;
//! let store = Store::new(&config);
//! let cart = store.cart(&config);
//!
//! let (order, _events) = cart.start_order()?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{load_config, load_config_with};
pub use error::{StoreError, StoreResult};
pub use logging::{init_test_tracing, init_tracing};
pub use store::Store;

pub use repository::catalog::InMemoryCatalog;
pub use repository::orders::InMemoryOrderStore;
pub use repository::promos::InMemoryPromoStore;
pub use repository::shipping::{InMemoryShippingProfiles, ShippingProfile};
pub use repository::vat_rates::InMemoryVatRates;
