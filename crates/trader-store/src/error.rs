//! # Store Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  serde_json / toml / std::io error                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CoreError ← What the refresh pipeline sees through the traits         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use trader_core::CoreError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Optimistic concurrency check failed on save.
    ///
    /// ## When This Occurs
    /// - Two refreshes of the same order raced and the other one saved first
    /// - An order was saved from a stale snapshot
    #[error("Version conflict on order {order_id}: expected {expected}, found {found}")]
    VersionConflict {
        order_id: String,
        expected: u64,
        found: u64,
    },

    /// An order snapshot could not be (de)serialized.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// A lock was poisoned by a panicking writer.
    #[error("Store lock poisoned: {0}")]
    Poisoned(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn poisoned(store: &str) -> Self {
        StoreError::Poisoned(store.to_string())
    }
}

/// Maps store failures onto the errors the core understands.
///
/// ```text
/// NotFound { entity: "order", .. }  → CoreError::OrderNotFound
/// VersionConflict                   → CoreError::VersionConflict
/// Config                            → CoreError::Config
/// Other                             → CoreError::Lookup
/// ```
impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } if entity == "order" => {
                CoreError::OrderNotFound(id)
            }
            StoreError::VersionConflict {
                order_id,
                expected,
                found,
            } => CoreError::VersionConflict {
                order_id,
                expected,
                found,
            },
            StoreError::Config(message) => CoreError::Config(message),
            other => CoreError::lookup("store", other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_not_found_maps_to_core() {
        let err: CoreError = StoreError::not_found("order", "o1").into();
        assert!(matches!(err, CoreError::OrderNotFound(id) if id == "o1"));
    }

    #[test]
    fn test_other_not_found_is_lookup_failure() {
        let err: CoreError = StoreError::not_found("promo", "p1").into();
        assert!(matches!(err, CoreError::Lookup { .. }));
    }

    #[test]
    fn test_version_conflict_maps_to_core() {
        let err: CoreError = StoreError::VersionConflict {
            order_id: "o1".to_string(),
            expected: 1,
            found: 2,
        }
        .into();
        assert!(matches!(
            err,
            CoreError::VersionConflict { expected: 1, found: 2, .. }
        ));
    }
}
