//! Presentation view models for the dashboard and navigation bar.
//!
//! Pure data; rendering happens elsewhere.

use crate::dashboard::DashboardState;
use crate::feed::{MatchAvailability, PredictionAction};
use crate::models::UserSession;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

/// One match row on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCard {
    pub match_id: String,
    pub headline: String,
    pub description: String,
    pub venue: String,
    pub kickoff: String,
    pub time_status: String,
    pub action: PredictionAction,
    pub action_label: &'static str,
    /// Where the prediction form lives; absent once the match is locked
    pub link: Option<String>,
    pub player_count: usize,
}

impl MatchCard {
    pub fn from_availability(item: &MatchAvailability) -> Self {
        let m = &item.rostered.match_info;
        let action = item.action();
        Self {
            match_id: m.id.clone(),
            headline: m.headline(),
            description: m.description.clone(),
            venue: m.venue.clone(),
            kickoff: format_kickoff(m.start),
            time_status: item.time_status.to_string(),
            action,
            action_label: action_label(action),
            link: match action {
                PredictionAction::Locked => None,
                _ => Some(prediction_link(&m.id)),
            },
            player_count: item.rostered.players.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub user_label: String,
    pub prediction_count: usize,
    pub loading: bool,
    pub cards: Vec<MatchCard>,
}

impl DashboardView {
    pub fn from_state(state: &DashboardState, session: Option<&UserSession>) -> Self {
        Self {
            user_label: nav_label(session),
            prediction_count: state
                .snapshot
                .as_ref()
                .map(|s| s.prediction_count)
                .unwrap_or(0),
            loading: state.loading,
            cards: state.matches().iter().map(MatchCard::from_availability).collect(),
        }
    }

    /// Nothing to show: render the empty state
    pub fn is_empty(&self) -> bool {
        !self.loading && self.cards.is_empty()
    }
}

pub fn action_label(action: PredictionAction) -> &'static str {
    match action {
        PredictionAction::Create => "Make Prediction",
        PredictionAction::Update => "Update Prediction",
        PredictionAction::Locked => "Match Started",
    }
}

pub fn prediction_link(match_id: &str) -> String {
    format!("/predict/{}", match_id)
}

/// Navigation label: display name, "Dashboard" for a user whose name is
/// absent or empty, "Sign In" when signed out. Names are shown verbatim.
pub fn nav_label(session: Option<&UserSession>) -> String {
    match session {
        Some(s) => match s.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Dashboard".to_string(),
        },
        None => "Sign In".to_string(),
    }
}

/// e.g. "April 29th, 2025 3:00 PM"
pub fn format_kickoff(start: DateTime<Utc>) -> String {
    format!(
        "{} {}{}, {} {}",
        start.format("%B"),
        start.day(),
        ordinal_suffix(start.day()),
        start.year(),
        start.format("%-I:%M %p")
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
