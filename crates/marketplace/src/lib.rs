//! GloKart marketplace engine.
//!
//! Owns the listing lifecycle for a consumer-to-consumer marketplace:
//! sellers submit listings, admins moderate them, buyers make offers,
//! sellers accept or reject offers, and an accepted offer reserves the item
//! for its bidder for 24 hours. Everything is persisted as JSON documents
//! through a [`KeyValueStore`].
//!
//! # Modules
//!
//! - [`store`] - The [`Marketplace`] aggregate and its clock
//! - [`lifecycle`] - Pure listing and offer transitions
//! - [`accounts`] - Registration, sessions and saved listings
//! - [`catalog`] - Browse, moderation and profile views
//! - [`pricing`] - Delivery fees and checkout totals
//! - [`persistence`] - Key-value storage of the JSON collections
//! - [`enrichment`] - Listing auto-fill from an item photo
//! - [`media`] - Uploaded image handling
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod lifecycle;
pub mod media;
pub mod model;
pub mod persistence;
pub mod pricing;
pub mod seed;
pub mod store;

pub use accounts::RegistrationForm;
pub use catalog::{ListingFilter, ProfileView};
pub use config::{ConfigError, MarketplaceConfig};
pub use enrichment::{EnrichmentError, GeminiClient, ListingEnricher, ListingSuggestion, autofill};
pub use error::{MarketError, Result};
pub use media::ImageUpload;
pub use model::{Listing, ListingDetails, ListingDraft, Offer, Party, User};
pub use persistence::{JsonFileStore, KeyValueStore, MemoryStore, PersistenceError};
pub use pricing::DeliveryQuote;
pub use store::{Clock, ManualClock, Marketplace, SystemClock};
