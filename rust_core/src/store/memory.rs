//! In-process document store.
//!
//! Backs tests and local demos. Supports:
//! - Seeding from a JSON fixture file
//! - Failing any collection on demand
//! - Delaying prediction reads per user (to reproduce overlapping loads)

use super::{DocumentStore, StoreError};
use crate::models::{MatchDocument, Player, Prediction};
use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Collections that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Matches,
    Players,
    Predictions,
}

/// Fixture file layout: `{ "matches": [...], "players": [...], "predictions": [...] }`
#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    matches: Vec<MatchDocument>,
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    matches: RwLock<Vec<MatchDocument>>,
    players: RwLock<Vec<Player>>,
    predictions: RwLock<Vec<Prediction>>,
    failures: RwLock<HashMap<Collection, StoreError>>,
    prediction_delays: RwLock<HashMap<String, Duration>>,
    roster_reads: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fixture file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let seed: Seed = serde_json::from_str(content)?;
        let store = Self::new();
        *store.matches.write() = seed.matches;
        *store.players.write() = seed.players;
        *store.predictions.write() = seed.predictions;
        Ok(store)
    }

    pub fn insert_match(&self, doc: MatchDocument) {
        self.matches.write().push(doc);
    }

    pub fn insert_player(&self, player: Player) {
        self.players.write().push(player);
    }

    pub fn insert_prediction(&self, prediction: Prediction) {
        self.predictions.write().push(prediction);
    }

    /// Make every read of `collection` fail with `error` until cleared
    pub fn fail_collection(&self, collection: Collection, error: StoreError) {
        self.failures.write().insert(collection, error);
    }

    pub fn clear_failure(&self, collection: Collection) {
        self.failures.write().remove(&collection);
    }

    /// Hold prediction reads for `user_id` for `delay` before answering
    pub fn delay_predictions_for(&self, user_id: &str, delay: Duration) {
        self.prediction_delays
            .write()
            .insert(user_id.to_string(), delay);
    }

    /// Number of roster reads served so far
    pub fn roster_reads(&self) -> usize {
        self.roster_reads.load(Ordering::SeqCst)
    }

    fn check(&self, collection: Collection) -> Result<(), StoreError> {
        match self.failures.read().get(&collection) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_matches(&self) -> Result<Vec<MatchDocument>, StoreError> {
        self.check(Collection::Matches)?;

        // Mirror an orderBy on the timestamp field. Documents whose timestamp
        // cannot be read sort last, keeping insertion order among themselves.
        let mut docs = self.matches.read().clone();
        docs.sort_by_key(|d| match d.timestamp.normalize() {
            Ok(ts) => (0, Some(ts)),
            Err(_) => (1, None),
        });
        Ok(docs)
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        self.check(Collection::Players)?;
        Ok(self.players.read().clone())
    }

    async fn list_roster(&self, _match_id: &str) -> Result<Vec<Player>, StoreError> {
        self.roster_reads.fetch_add(1, Ordering::SeqCst);
        self.list_players().await
    }

    async fn list_predictions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Prediction>, StoreError> {
        let delay = self.prediction_delays.read().get(user_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check(Collection::Predictions)?;
        Ok(self
            .predictions
            .read()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}
