//! Document store abstractions
//!
//! Defines the DocumentStore trait the dashboard reads through. Matches,
//! players and predictions are owned by other processes; this crate only reads.

use crate::models::{MatchDocument, Player, Prediction};
use async_trait::async_trait;
use thiserror::Error;

pub mod circuit_breaker;
pub mod memory;
pub mod rest;
pub mod retry;

pub use circuit_breaker::{StoreCircuitBreaker, StoreCircuitBreakerConfig, StoreCircuitState};
pub use memory::InMemoryStore;
pub use rest::{RestDocumentStore, StoreConfig};
pub use retry::{with_retry, RetryPolicy};

/// Failure of a single remote read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document store request timed out: {0}")]
    Timeout(String),

    #[error("document store returned HTTP {status} for {collection}")]
    Http { status: u16, collection: String },

    #[error("failed to decode {collection} documents: {message}")]
    Decode { collection: String, message: String },

    #[error("document store circuit breaker '{0}' is open")]
    CircuitOpen(String),
}

impl StoreError {
    /// Whether retrying the same read could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Unavailable(_) | StoreError::Timeout(_) => true,
            StoreError::Http { status, .. } => *status == 429 || *status >= 500,
            StoreError::Decode { .. } | StoreError::CircuitOpen(_) => false,
        }
    }
}

/// Read interface over the remote document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All match documents, ordered ascending by their stored timestamp
    async fn list_matches(&self) -> Result<Vec<MatchDocument>, StoreError>;

    /// The full player collection
    async fn list_players(&self) -> Result<Vec<Player>, StoreError>;

    /// Players available for one match.
    ///
    /// Rosters are not scoped per match in the current data model, so the
    /// default reads the whole player collection.
    async fn list_roster(&self, _match_id: &str) -> Result<Vec<Player>, StoreError> {
        self.list_players().await
    }

    /// Predictions whose owning user is `user_id`
    async fn list_predictions_for_user(&self, user_id: &str)
        -> Result<Vec<Prediction>, StoreError>;

    /// Store name for logging
    fn store_name(&self) -> &str;
}
