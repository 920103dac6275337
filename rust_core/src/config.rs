//! Dashboard load configuration
//!
//! - Relevance window length
//! - Retry policy for store reads

use crate::feed::DEFAULT_RELEVANCE_WINDOW_HOURS;
use crate::store::RetryPolicy;
use chrono::Duration;
use std::env;

/// Default attempts per store read (1 = no retry)
pub const DEFAULT_LOAD_MAX_ATTEMPTS: u32 = 1;

pub const DEFAULT_LOAD_BACKOFF_BASE_MS: u64 = 100;

pub const DEFAULT_LOAD_BACKOFF_MAX_MS: u64 = 2000;

/// Longest accepted relevance window (one year)
pub const MAX_RELEVANCE_WINDOW_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub relevance_window: Duration,
    pub retry: RetryPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            relevance_window: Duration::hours(DEFAULT_RELEVANCE_WINDOW_HOURS),
            retry: RetryPolicy::new(
                DEFAULT_LOAD_MAX_ATTEMPTS,
                std::time::Duration::from_millis(DEFAULT_LOAD_BACKOFF_BASE_MS),
                std::time::Duration::from_millis(DEFAULT_LOAD_BACKOFF_MAX_MS),
            ),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let max_attempts = env::var("LOAD_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_LOAD_MAX_ATTEMPTS)
            .clamp(1, 10);

        let base_backoff_ms = env::var("LOAD_BACKOFF_BASE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LOAD_BACKOFF_BASE_MS);

        let max_backoff_ms = env::var("LOAD_BACKOFF_MAX_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LOAD_BACKOFF_MAX_MS);

        Self {
            relevance_window: parse_relevance_window(env::var("RELEVANCE_WINDOW_HOURS").ok()),
            retry: RetryPolicy::new(
                max_attempts,
                std::time::Duration::from_millis(base_backoff_ms),
                std::time::Duration::from_millis(max_backoff_ms.max(base_backoff_ms)),
            ),
        }
    }
}

/// Positive hour count, clamped to `MAX_RELEVANCE_WINDOW_HOURS`; anything
/// unparseable or non-positive falls back to the default.
fn parse_relevance_window(raw: Option<String>) -> Duration {
    let hours = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|h| *h > 0)
        .map(|h| h.min(MAX_RELEVANCE_WINDOW_HOURS))
        .unwrap_or(DEFAULT_RELEVANCE_WINDOW_HOURS);
    Duration::try_hours(hours).unwrap_or_else(|| Duration::hours(DEFAULT_RELEVANCE_WINDOW_HOURS))
}
