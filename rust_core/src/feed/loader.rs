//! Match Feed Loader
//!
//! Reads every match, normalizes its start time, and attaches a roster.
//! Roster reads run concurrently; any failed read fails the whole load.

use super::LoadError;
use crate::models::{Match, MatchDocument, RosteredMatch};
use crate::store::{with_retry, DocumentStore, RetryPolicy};
use futures_util::future::try_join_all;
use tracing::{debug, warn};

/// Convert stored match documents into matches ordered by start time.
///
/// A document whose timestamp cannot be normalized is dropped (and logged);
/// the rest of the batch is unaffected. The sort is stable, so matches with
/// equal start times keep store order.
pub fn normalize_matches(docs: Vec<MatchDocument>) -> Vec<Match> {
    let mut matches: Vec<Match> = docs
        .into_iter()
        .filter_map(|doc| match doc.timestamp.normalize() {
            Ok(start) => Some(Match {
                id: doc.id,
                team1: doc.team1,
                team2: doc.team2,
                venue: doc.venue,
                description: doc.description,
                start,
            }),
            Err(e) => {
                warn!("Dropping match {} with unusable timestamp: {}", doc.id, e);
                None
            }
        })
        .collect();

    matches.sort_by_key(|m| m.start);
    matches
}

/// Load all matches with their rosters, ordered ascending by start time.
pub async fn load_match_feed<S>(store: &S, retry: &RetryPolicy) -> Result<Vec<RosteredMatch>, LoadError>
where
    S: DocumentStore + ?Sized,
{
    let docs = with_retry("matches", retry, || store.list_matches())
        .await
        .map_err(LoadError::Matches)?;
    let doc_count = docs.len();
    let matches = normalize_matches(docs);

    let rostered = try_join_all(matches.into_iter().map(|match_info| async move {
        let players = with_retry("roster", retry, || store.list_roster(&match_info.id))
            .await
            .map_err(|source| LoadError::Roster {
                match_id: match_info.id.clone(),
                source,
            })?;
        Ok::<_, LoadError>(RosteredMatch {
            match_info,
            players,
        })
    }))
    .await?;

    debug!(
        "Loaded {} matches ({} documents) from {}",
        rostered.len(),
        doc_count,
        store.store_name()
    );
    Ok(rostered)
}
