//! Pick5 Core - match feed loading and prediction availability.
//!
//! This crate provides:
//! - Match feed loading with start-time normalization across stored representations
//! - Relevance filtering over a trailing window
//! - Availability classification (create / update / locked) per match
//! - Dashboard orchestration with generation-sequenced loads
//! - Document store seam with in-memory and HTTP implementations
//! - Retry with exponential backoff and a circuit breaker for store reads
//! - Presentation view models for the dashboard and navigation bar

pub mod auth;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod feed;
pub mod models;
pub mod store;
pub mod timestamp;
pub mod view;

pub use auth::AuthContext;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardSnapshot, DashboardState, RefreshOutcome};
pub use feed::{Availability, LoadError, MatchAvailability, PredictionAction, TimeStatus};
pub use models::{Match, MatchDocument, Player, Prediction, RosteredMatch, UserSession};
pub use store::{DocumentStore, InMemoryStore, RestDocumentStore, StoreError};
pub use timestamp::{RawTimestamp, TimestampError};
pub use view::{DashboardView, MatchCard};
