//! Seed Fixture Tests
//!
//! Loads the bundled fixture (mixed timestamp encodings) through the full pipeline.

use chrono::{TimeZone, Utc};
use pick5_core::view::DashboardView;
use pick5_core::{Dashboard, DashboardConfig, FixedClock, InMemoryStore, PredictionAction, UserSession};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("seed.json")
}

#[tokio::test]
async fn test_seed_fixture_dashboard() {
    let store = Arc::new(InMemoryStore::from_json_file(fixture_path()).unwrap());
    let now = Utc.with_ymd_and_hms(2025, 10, 10, 12, 0, 0).unwrap();
    let dash = Dashboard::new(store, Arc::new(FixedClock::new(now)), DashboardConfig::default());
    let session = UserSession::new("demo-user").with_display_name("Demo");

    dash.refresh(Some(&session)).await;
    let state = dash.state();
    let view = DashboardView::from_state(&state, Some(&session));

    // ind-aus-1 started 26h ago, tbd-4 has no usable date
    let ids: Vec<&str> = view.cards.iter().map(|c| c.match_id.as_str()).collect();
    assert_eq!(ids, vec!["sa-pak-3", "eng-nz-2"]);

    let sa = &view.cards[0];
    assert_eq!(sa.time_status, "Starts in 4 hours");
    assert_eq!(sa.action, PredictionAction::Create);
    assert_eq!(sa.kickoff, "October 10th, 2025 4:00 PM");
    assert_eq!(sa.player_count, 3);

    let eng = &view.cards[1];
    assert_eq!(eng.time_status, "Starts in 1 days");
    assert_eq!(eng.action, PredictionAction::Update);
    assert_eq!(eng.action_label, "Update Prediction");
    assert_eq!(eng.link.as_deref(), Some("/predict/eng-nz-2"));

    assert_eq!(view.user_label, "Demo");
    assert_eq!(view.prediction_count, 1);
}
