//! Dashboard Rust Service
//!
//! Renders the Pick5 dashboard for one user from the command line.
//!
//! This service:
//! - Reads matches, players and predictions from the configured document store
//! - Applies the relevance window and availability rules
//! - Prints one card per match (or JSON with PICK5_OUTPUT=json)

mod config;

use anyhow::{Context, Result};
use config::{Config, StoreSource};
use dotenv::dotenv;
use pick5_core::view::DashboardView;
use pick5_core::{
    AuthContext, Dashboard, DocumentStore, InMemoryStore, RefreshOutcome, RestDocumentStore,
    SystemClock,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Dashboard Rust Service...");

    let config = Config::from_env();

    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreSource::SeedFile(path) => Arc::new(
            InMemoryStore::from_json_file(path).context("Failed to load seed data")?,
        ),
        StoreSource::Rest(store_config) => {
            info!("Reading from document API at {}", store_config.base_url);
            Arc::new(RestDocumentStore::new(store_config.clone()))
        }
    };
    info!("Using {} document store", store.store_name());

    let auth = AuthContext::new(config.session.clone());
    let dashboard = Dashboard::new(store, Arc::new(SystemClock), config.dashboard.clone());

    let session = auth.current();
    match dashboard.refresh(session.as_ref()).await {
        RefreshOutcome::Failed { error, .. } => warn!("Dashboard load failed: {}", error),
        RefreshOutcome::Stale { .. } => warn!("Dashboard load was superseded"),
        RefreshOutcome::Applied { .. } => {}
    }

    let view = DashboardView::from_state(&dashboard.state(), session.as_ref());

    if config.json_output {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{} | {} predictions", view.user_label, view.prediction_count);
    if view.is_empty() {
        println!("No upcoming matches");
        return Ok(());
    }

    for card in &view.cards {
        println!();
        println!("{}", card.description);
        println!("{}", card.headline);
        println!("  {} - {}", card.kickoff, card.venue);
        println!("  {}", card.time_status);
        match &card.link {
            Some(link) => println!("  [{}] {}", card.action_label, link),
            None => println!("  [{}]", card.action_label),
        }
    }

    Ok(())
}
