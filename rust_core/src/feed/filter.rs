//! Relevance Filter
//!
//! Keeps matches that start after `now - window`. The window trails `now`, so
//! a match that kicked off a few hours ago stays on the dashboard (locked)
//! until the window has fully passed.

use crate::models::RosteredMatch;
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_RELEVANCE_WINDOW_HOURS: i64 = 24;

/// Oldest start time (exclusive) still shown. `None` when the window reaches
/// past the earliest representable instant.
pub fn relevance_cutoff(now: DateTime<Utc>, window: Duration) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(window)
}

/// Strictly after the cutoff; a match starting exactly at the cutoff is dropped.
/// With no representable cutoff every match is relevant.
pub fn is_relevant(start: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    match relevance_cutoff(now, window) {
        Some(cutoff) => start > cutoff,
        None => true,
    }
}

/// Retain relevant matches, preserving order.
pub fn filter_relevant(
    matches: Vec<RosteredMatch>,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<RosteredMatch> {
    matches
        .into_iter()
        .filter(|m| is_relevant(m.start(), now, window))
        .collect()
}
