//! Configuration for the dashboard service
//!
//! - Which document store to read (seed file or HTTP API)
//! - Which user the dashboard is rendered for
//! - Load tuning (relevance window, retries)

use pick5_core::store::StoreConfig;
use pick5_core::{DashboardConfig, UserSession};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum StoreSource {
    /// JSON fixture loaded into the in-memory store
    SeedFile(PathBuf),
    Rest(StoreConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreSource,
    pub session: Option<UserSession>,
    pub dashboard: DashboardConfig,
    /// Print the view as JSON instead of text lines
    pub json_output: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let store = match env::var("PICK5_SEED_FILE") {
            Ok(path) if !path.trim().is_empty() => StoreSource::SeedFile(PathBuf::from(path)),
            _ => StoreSource::Rest(StoreConfig::from_env()),
        };

        let session = env::var("PICK5_USER_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .map(|id| {
                let session = UserSession::new(id);
                match env::var("PICK5_DISPLAY_NAME") {
                    Ok(name) => session.with_display_name(name),
                    Err(_) => session,
                }
            });

        let json_output = env::var("PICK5_OUTPUT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self {
            store,
            session,
            dashboard: DashboardConfig::from_env(),
            json_output,
        }
    }
}
