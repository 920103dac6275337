//! HTTP/JSON document store client.
//!
//! Reads the `matches`, `players` and `predictions` collections from the
//! document API. Every request goes through a `StoreCircuitBreaker` and is
//! bounded by the configured timeout.

use super::circuit_breaker::{StoreCircuitBreaker, StoreCircuitBreakerConfig, StoreCircuitState};
use super::{DocumentStore, StoreError};
use crate::models::{MatchDocument, Player, Prediction};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default document API root
pub const DEFAULT_STORE_BASE_URL: &str = "http://localhost:8080/v1";

/// Default per-request timeout in seconds
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub circuit_breaker: StoreCircuitBreakerConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            circuit_breaker: StoreCircuitBreakerConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("STORE_BASE_URL").unwrap_or(defaults.base_url),
            timeout: env::var("STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            circuit_breaker: StoreCircuitBreakerConfig {
                failure_threshold: env::var("STORE_CB_FAILURE_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.circuit_breaker.failure_threshold),
                recovery_timeout: env::var("STORE_CB_RECOVERY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.circuit_breaker.recovery_timeout),
                success_threshold: defaults.circuit_breaker.success_threshold,
            },
        }
    }
}

/// Collection listing as returned by the document API. Both a bare array and
/// a `{ "documents": [...] }` envelope are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionResponse<T> {
    Envelope { documents: Vec<T> },
    Bare(Vec<T>),
}

/// Document store reached over HTTP/JSON.
#[derive(Clone)]
pub struct RestDocumentStore {
    client: Client,
    base_url: String,
    circuit_breaker: Arc<StoreCircuitBreaker>,
}

impl std::fmt::Debug for RestDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestDocumentStore")
            .field("base_url", &self.base_url)
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl RestDocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            circuit_breaker: Arc::new(StoreCircuitBreaker::new("document_store", config.circuit_breaker)),
        }
    }

    pub fn circuit_state(&self) -> StoreCircuitState {
        self.circuit_breaker.state()
    }

    pub fn reset_circuit_breaker(&self) {
        self.circuit_breaker.reset();
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    async fn get_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, StoreError> {
        self.circuit_breaker.admit()?;

        let result = self.fetch_collection_internal(collection, query).await;
        self.circuit_breaker.record(&result);
        result
    }

    async fn fetch_collection_internal<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.collection_url(collection);
        debug!("GET {} {:?}", url, query);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(collection, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Http {
                status: status.as_u16(),
                collection: collection.to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| transport_error(collection, e))?;
        parse_collection(collection, &body)
    }
}

fn transport_error(collection: &str, e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout(format!("{}: {}", collection, e))
    } else {
        StoreError::Unavailable(format!("{}: {}", collection, e))
    }
}

fn parse_collection<T: DeserializeOwned>(collection: &str, body: &str) -> Result<Vec<T>, StoreError> {
    match serde_json::from_str::<CollectionResponse<T>>(body) {
        Ok(CollectionResponse::Envelope { documents }) => Ok(documents),
        Ok(CollectionResponse::Bare(documents)) => Ok(documents),
        Err(e) => Err(StoreError::Decode {
            collection: collection.to_string(),
            message: e.to_string(),
        }),
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn list_matches(&self) -> Result<Vec<MatchDocument>, StoreError> {
        self.get_collection("matches", &[("orderBy", "timestamp"), ("direction", "asc")])
            .await
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        self.get_collection("players", &[]).await
    }

    async fn list_predictions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Prediction>, StoreError> {
        self.get_collection("predictions", &[("userId", user_id)]).await
    }

    fn store_name(&self) -> &str {
        "rest"
    }
}
