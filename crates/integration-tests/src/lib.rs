//! Integration tests for the GloKart marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p glokart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `listing_lifecycle` - Submission, moderation, edits and deletion
//! - `offers_and_reservations` - Offers, the 24-hour hold and checkout
//! - `accounts` - Registration, sessions and profile views
//! - `persistence` - Reloading collections from storage
//! - `enrichment` - Auto-fill through a stub analysis service
//!
//! Every test runs against an in-memory store and a manual clock, so no
//! external services are needed.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use glokart_marketplace::persistence::{LISTINGS_KEY, save_json};
use glokart_marketplace::{
    Listing, ManualClock, Marketplace, MarketplaceConfig, MemoryStore,
};

/// Marketplace over shared in-memory storage with a controllable clock.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub config: MarketplaceConfig,
}

impl TestContext {
    /// Fresh storage, default settings, clock at [`start_time`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MarketplaceConfig::default())
    }

    #[must_use]
    pub fn with_config(config: MarketplaceConfig) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(ManualClock::new(start_time())),
            config,
        }
    }

    /// Open (or re-open) the marketplace over this context's storage.
    ///
    /// # Panics
    ///
    /// Panics if stored data cannot be decoded.
    #[must_use]
    pub fn open(&self) -> Marketplace<Arc<MemoryStore>> {
        Marketplace::open_with(Arc::clone(&self.store), &self.config, self.clock.clone()).unwrap()
    }

    /// Replace the stored listing collection before the next [`open`](Self::open).
    ///
    /// # Panics
    ///
    /// Panics if the listings cannot be encoded.
    pub fn install_listings(&self, listings: &[Listing]) {
        save_json(&self.store, LISTINGS_KEY, listings).unwrap();
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed starting instant for every test clock.
///
/// # Panics
///
/// Only on an invalid calendar date.
#[must_use]
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 10, 30, 0).unwrap()
}
