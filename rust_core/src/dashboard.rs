//! Dashboard load orchestration.
//!
//! One load = Loader -> Filter -> Classifier, against a single `now` taken
//! from the injected clock. Loads run on activation and on every identity
//! change. Each load is tagged with a generation; a result is applied only if
//! no newer load has started since, so a slow response for a previous user
//! can never overwrite fresher state.

use crate::clock::Clock;
use crate::config::DashboardConfig;
use crate::feed::{classify_all, filter_relevant, load_match_feed, LoadError, MatchAvailability};
use crate::models::{Prediction, UserSession};
use crate::store::{with_retry, DocumentStore};
use chrono::{DateTime, Utc};
use futures_util::future::try_join;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Result of one successful load
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub user: Option<UserSession>,
    pub loaded_at: DateTime<Utc>,
    pub matches: Vec<MatchAvailability>,
    /// All predictions stored for the user, including ones for hidden matches
    pub prediction_count: usize,
}

impl DashboardSnapshot {
    pub fn empty(user: Option<UserSession>, loaded_at: DateTime<Utc>) -> Self {
        Self {
            user,
            loaded_at,
            matches: Vec::new(),
            prediction_count: 0,
        }
    }
}

/// What the dashboard currently shows
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Most recently started load
    pub latest_generation: u64,
    /// Load whose result is on screen (0 = none yet)
    pub applied_generation: u64,
    pub loading: bool,
    pub snapshot: Option<DashboardSnapshot>,
    pub last_error: Option<LoadError>,
}

impl DashboardState {
    pub fn matches(&self) -> &[MatchAvailability] {
        self.snapshot
            .as_ref()
            .map(|s| s.matches.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied { generation: u64, match_count: usize },
    Failed { generation: u64, error: LoadError },
    /// A newer load started while this one was in flight; result discarded
    Stale { generation: u64, latest: u64 },
}

pub struct Dashboard<S: ?Sized, C: ?Sized> {
    store: Arc<S>,
    clock: Arc<C>,
    config: DashboardConfig,
    state: watch::Sender<DashboardState>,
}

impl<S, C> Dashboard<S, C>
where
    S: DocumentStore + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<C>, config: DashboardConfig) -> Self {
        let (state, _rx) = watch::channel(DashboardState::default());
        Self {
            store,
            clock,
            config,
            state,
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Receive every applied state change
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Run one load without touching dashboard state.
    pub async fn fetch(&self, session: Option<&UserSession>) -> Result<DashboardSnapshot, LoadError> {
        let now = self.clock.now();
        let retry = &self.config.retry;

        let feed = load_match_feed(&*self.store, retry);
        let predictions = async {
            match session {
                Some(s) => with_retry("predictions", retry, || {
                    self.store.list_predictions_for_user(&s.user_id)
                })
                .await
                .map_err(|source| LoadError::Predictions {
                    user_id: s.user_id.clone(),
                    source,
                }),
                None => Ok(Vec::<Prediction>::new()),
            }
        };

        let (feed, predictions) = try_join(feed, predictions).await?;
        let total = feed.len();
        let relevant = filter_relevant(feed, now, self.config.relevance_window);
        debug!("{} of {} matches inside relevance window", relevant.len(), total);

        let matches = classify_all(relevant, now, &predictions);

        Ok(DashboardSnapshot {
            user: session.cloned(),
            loaded_at: now,
            matches,
            prediction_count: predictions.len(),
        })
    }

    /// Start a load, run it, and apply the result if it is still the newest.
    ///
    /// On failure the dashboard shows an empty match list and keeps the error
    /// in `last_error`; the error is also returned to the caller.
    pub async fn refresh(&self, session: Option<&UserSession>) -> RefreshOutcome {
        let generation = self.begin_load();
        let result = self.fetch(session).await;
        self.apply(generation, session, result)
    }

    fn begin_load(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.latest_generation += 1;
            state.loading = true;
            generation = state.latest_generation;
        });
        debug!("Dashboard load {} started", generation);
        generation
    }

    fn apply(
        &self,
        generation: u64,
        session: Option<&UserSession>,
        result: Result<DashboardSnapshot, LoadError>,
    ) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::Stale {
            generation,
            latest: generation,
        };

        self.state.send_if_modified(|state| {
            if state.latest_generation != generation {
                outcome = RefreshOutcome::Stale {
                    generation,
                    latest: state.latest_generation,
                };
                return false;
            }

            state.applied_generation = generation;
            state.loading = false;
            match &result {
                Ok(snapshot) => {
                    outcome = RefreshOutcome::Applied {
                        generation,
                        match_count: snapshot.matches.len(),
                    };
                    state.snapshot = Some(snapshot.clone());
                    state.last_error = None;
                }
                Err(e) => {
                    outcome = RefreshOutcome::Failed {
                        generation,
                        error: e.clone(),
                    };
                    state.snapshot = Some(DashboardSnapshot::empty(
                        session.cloned(),
                        self.clock.now(),
                    ));
                    state.last_error = Some(e.clone());
                }
            }
            true
        });

        match &outcome {
            RefreshOutcome::Applied { match_count, .. } => info!(
                "Dashboard load {} applied: {} matches",
                generation, match_count
            ),
            RefreshOutcome::Failed { error: e, .. } => {
                error!("Dashboard load {} failed: {}", generation, e)
            }
            RefreshOutcome::Stale { latest, .. } => debug!(
                "Dashboard load {} discarded, load {} is newer",
                generation, latest
            ),
        }
        outcome
    }
}

impl<S, C> Dashboard<S, C>
where
    S: DocumentStore + ?Sized + 'static,
    C: Clock + ?Sized + 'static,
{
    /// Load now and again on every identity change until the auth context is
    /// dropped. Loads may overlap; only the newest one is applied.
    pub fn watch_sessions(
        self: Arc<Self>,
        mut sessions: watch::Receiver<Option<UserSession>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let session = sessions.borrow_and_update().clone();
                let dashboard = self.clone();
                tokio::spawn(async move {
                    dashboard.refresh(session.as_ref()).await;
                });

                if sessions.changed().await.is_err() {
                    debug!("Auth context closed, dashboard stops watching");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::feed::PredictionAction;
    use crate::models::{MatchDocument, Prediction};
    use crate::store::memory::{Collection, InMemoryStore};
    use crate::store::StoreError;
    use crate::timestamp::RawTimestamp;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 18, 0, 0).unwrap()
    }

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        for (id, offset) in [("a", Duration::minutes(30)), ("b", Duration::hours(-1))] {
            store.insert_match(MatchDocument {
                id: id.to_string(),
                team1: "India".to_string(),
                team2: "Sri Lanka".to_string(),
                venue: "Colombo".to_string(),
                description: String::new(),
                timestamp: RawTimestamp::from(now() + offset),
            });
        }
        store.insert_prediction(Prediction {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            match_id: "a".to_string(),
            selections: serde_json::Value::Null,
            created_at: None,
            updated_at: None,
        });
        Arc::new(store)
    }

    fn dashboard(store: Arc<InMemoryStore>) -> Dashboard<InMemoryStore, FixedClock> {
        Dashboard::new(store, Arc::new(FixedClock::new(now())), DashboardConfig::default())
    }

    #[tokio::test]
    async fn test_signed_out_load_has_no_predictions() {
        let dash = dashboard(seeded_store());
        let snapshot = dash.fetch(None).await.unwrap();

        assert_eq!(snapshot.prediction_count, 0);
        assert_eq!(snapshot.loaded_at, now());
        let a = snapshot.matches.iter().find(|m| m.match_id() == "a").unwrap();
        assert_eq!(a.action(), PredictionAction::Create);
    }

    #[tokio::test]
    async fn test_refresh_applies_and_tracks_generation() {
        let dash = dashboard(seeded_store());
        let session = UserSession::new("u1");

        let outcome = dash.refresh(Some(&session)).await;
        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                generation: 1,
                match_count: 2
            }
        );

        let state = dash.state();
        assert_eq!(state.latest_generation, 1);
        assert_eq!(state.applied_generation, 1);
        assert!(!state.loading);
        assert!(state.last_error.is_none());
        assert_eq!(state.snapshot.unwrap().prediction_count, 1);
    }

    #[tokio::test]
    async fn test_predictions_failure_fails_closed() {
        let store = seeded_store();
        store.fail_collection(
            Collection::Predictions,
            StoreError::Unavailable("down".into()),
        );
        let dash = dashboard(store);

        let outcome = dash.refresh(Some(&UserSession::new("u1"))).await;
        assert!(matches!(
            outcome,
            RefreshOutcome::Failed {
                error: LoadError::Predictions { .. },
                ..
            }
        ));

        let state = dash.state();
        assert!(state.matches().is_empty());
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let store = seeded_store();
        store.fail_collection(Collection::Matches, StoreError::Timeout("matches".into()));
        let dash = dashboard(store.clone());

        dash.refresh(None).await;
        assert!(dash.state().last_error.is_some());

        store.clear_failure(Collection::Matches);
        dash.refresh(None).await;
        let state = dash.state();
        assert!(state.last_error.is_none());
        assert_eq!(state.matches().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let store = seeded_store();
        store.delay_predictions_for("slow", std::time::Duration::from_millis(100));
        let dash = dashboard(store);

        let slow = UserSession::new("slow");
        let fast = UserSession::new("u1");

        let (first, second) = tokio::join!(dash.refresh(Some(&slow)), async {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            dash.refresh(Some(&fast)).await
        });

        assert_eq!(
            first,
            RefreshOutcome::Stale {
                generation: 1,
                latest: 2
            }
        );
        assert!(matches!(second, RefreshOutcome::Applied { generation: 2, .. }));

        let state = dash.state();
        assert_eq!(state.applied_generation, 2);
        assert_eq!(
            state.snapshot.and_then(|s| s.user).map(|u| u.user_id),
            Some("u1".to_string())
        );
    }
}
