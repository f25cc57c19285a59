//! Core types for GloKart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use catalog::{Category, Condition, UnknownLabel};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Currency, Money};
pub use status::*;
