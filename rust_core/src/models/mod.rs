// Shared models for the Pick5 dashboard
use crate::timestamp::RawTimestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Stored documents (shape as persisted by the document store)
// ============================================================================

/// Match document as read from the `matches` collection.
///
/// The timestamp is kept raw: the store may hold a native timestamp object,
/// epoch milliseconds, or a string, depending on which tool wrote the match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDocument {
    pub id: String,
    #[serde(default)]
    pub team1: String,
    #[serde(default)]
    pub team2: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: RawTimestamp,
}

// ============================================================================
// Normalized entities
// ============================================================================

/// A scheduled match with its start time normalized to UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub description: String,
    pub start: DateTime<Utc>,
}

impl Match {
    /// "Team A vs Team B"
    pub fn headline(&self) -> String {
        format!("{} vs {}", self.team1, self.team2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    /// Target score used by the prediction flow
    #[serde(default)]
    pub target_points: Option<f64>,
}

/// A user's prediction for one match. The selection payload is owned by the
/// prediction-submission flow and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub user_id: String,
    pub match_id: String,
    #[serde(default)]
    pub selections: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
    #[serde(default)]
    pub updated_at: Option<RawTimestamp>,
}

/// A match together with the players available for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosteredMatch {
    pub match_info: Match,
    pub players: Vec<Player>,
}

impl RosteredMatch {
    pub fn id(&self) -> &str {
        &self.match_info.id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.match_info.start
    }
}

// ============================================================================
// Session
// ============================================================================

/// The signed-in user, passed explicitly into every dashboard load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub display_name: Option<String>,
}

impl UserSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}
