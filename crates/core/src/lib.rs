//! GloKart Core - Shared domain types.
//!
//! This crate provides the vocabulary used across the GloKart workspace:
//! - `marketplace` - Listing lifecycle, accounts, persistence and enrichment
//! - `cli` - Command-line driver over a JSON-file store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. Everything here is plain data with validation at construction.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, money, statuses and catalog enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
