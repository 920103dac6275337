//! Match feed pipeline: load -> filter -> classify.
//!
//! - `loader` reads matches and rosters and normalizes start times
//! - `filter` drops matches that started more than the relevance window ago
//! - `classify` decides what the user may do for each remaining match

use crate::store::StoreError;
use thiserror::Error;

pub mod classify;
pub mod filter;
pub mod loader;

pub use classify::{
    classify, classify_all, find_prediction, is_started, time_status, Availability,
    MatchAvailability, PredictionAction, TimeStatus,
};
pub use filter::{filter_relevant, is_relevant, relevance_cutoff, DEFAULT_RELEVANCE_WINDOW_HOURS};
pub use loader::{load_match_feed, normalize_matches};

/// Why a dashboard load produced no data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to list matches: {0}")]
    Matches(#[source] StoreError),

    #[error("failed to load roster for match {match_id}: {source}")]
    Roster {
        match_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to list predictions for user {user_id}: {source}")]
    Predictions {
        user_id: String,
        #[source]
        source: StoreError,
    },
}
