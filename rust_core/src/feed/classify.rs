//! Availability Classifier
//!
//! For each relevant match, combines its start time with `now` and the user's
//! stored predictions to decide whether the user can create a prediction,
//! update one, or nothing at all because the match is locked.
//!
//! The classifier never hides a match; hiding is the filter's job.

use crate::models::{Prediction, RosteredMatch};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Human-facing countdown label. Display only; `started` drives control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TimeStatus {
    Started,
    StartingSoon,
    StartsInHours(i64),
    StartsInDays(i64),
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeStatus::Started => write!(f, "Started"),
            TimeStatus::StartingSoon => write!(f, "Starting soon"),
            TimeStatus::StartsInHours(n) => write!(f, "Starts in {} hours", n),
            TimeStatus::StartsInDays(n) => write!(f, "Starts in {} days", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    OpenNoPrediction,
    OpenHasPrediction,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionAction {
    Create,
    Update,
    Locked,
}

impl Availability {
    pub fn action(&self) -> PredictionAction {
        match self {
            Availability::OpenNoPrediction => PredictionAction::Create,
            Availability::OpenHasPrediction => PredictionAction::Update,
            Availability::Locked => PredictionAction::Locked,
        }
    }
}

/// Per-match result of a dashboard load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAvailability {
    pub rostered: RosteredMatch,
    pub started: bool,
    pub time_status: TimeStatus,
    pub prediction: Option<Prediction>,
    pub availability: Availability,
}

impl MatchAvailability {
    pub fn action(&self) -> PredictionAction {
        self.availability.action()
    }

    pub fn match_id(&self) -> &str {
        self.rostered.id()
    }
}

/// Kickoff instant counts as started.
pub fn is_started(start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= start
}

/// Bucket the time until `start`. Anything in the past, even by a
/// nanosecond, is `Started`; otherwise whole hours are floored.
pub fn time_status(start: DateTime<Utc>, now: DateTime<Utc>) -> TimeStatus {
    let delta = start - now;
    if delta < Duration::zero() {
        return TimeStatus::Started;
    }

    // Non-negative, so truncation is the floor
    let hours = delta.num_milliseconds() / MILLIS_PER_HOUR;
    if hours == 0 {
        TimeStatus::StartingSoon
    } else if hours < 24 {
        TimeStatus::StartsInHours(hours)
    } else {
        TimeStatus::StartsInDays(hours / 24)
    }
}

/// First stored prediction for `match_id`. Duplicates are a data anomaly;
/// lookup order decides which one is used.
pub fn find_prediction<'a>(predictions: &'a [Prediction], match_id: &str) -> Option<&'a Prediction> {
    predictions.iter().find(|p| p.match_id == match_id)
}

pub fn classify(
    rostered: RosteredMatch,
    now: DateTime<Utc>,
    predictions: &[Prediction],
) -> MatchAvailability {
    let start = rostered.start();
    let started = is_started(start, now);
    let prediction = find_prediction(predictions, rostered.id()).cloned();

    let availability = match (started, &prediction) {
        (true, _) => Availability::Locked,
        (false, Some(_)) => Availability::OpenHasPrediction,
        (false, None) => Availability::OpenNoPrediction,
    };

    MatchAvailability {
        rostered,
        started,
        time_status: time_status(start, now),
        prediction,
        availability,
    }
}

pub fn classify_all(
    matches: Vec<RosteredMatch>,
    now: DateTime<Utc>,
    predictions: &[Prediction],
) -> Vec<MatchAvailability> {
    matches
        .into_iter()
        .map(|m| classify(m, now, predictions))
        .collect()
}
