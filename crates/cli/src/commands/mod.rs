//! CLI command implementations.

pub mod account;
pub mod listings;

use std::path::PathBuf;
use std::sync::Arc;

use glokart_marketplace::config::GeminiConfig;
use glokart_marketplace::persistence::{CURRENT_USER_KEY, LISTINGS_KEY, USERS_KEY};
use glokart_marketplace::{
    JsonFileStore, KeyValueStore, Marketplace, MarketplaceConfig, SystemClock,
};
use tracing::debug;

/// Result type shared by every command.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// An opened marketplace plus the settings commands need.
pub struct App {
    pub market: Marketplace<JsonFileStore>,
    pub gemini: Option<GeminiConfig>,
}

impl App {
    /// Load configuration and open the JSON-file store. With `reset`, the
    /// stored collections are dropped first so the demo catalog is installed.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or stored data cannot be
    /// read.
    pub fn open(data_dir: Option<PathBuf>, reset: bool) -> CommandResult<Self> {
        let mut config = MarketplaceConfig::from_env()?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        debug!(data_dir = %config.data_dir.display(), "Opening marketplace");

        let store = JsonFileStore::open(config.data_dir.clone())?;
        if reset {
            for key in [LISTINGS_KEY, USERS_KEY, CURRENT_USER_KEY] {
                store.remove(key)?;
            }
        }
        let market = Marketplace::open_with(store, &config, Arc::new(SystemClock))?;
        Ok(Self {
            market,
            gemini: config.gemini,
        })
    }
}
