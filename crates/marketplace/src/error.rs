//! Unified error handling for marketplace operations.
//!
//! Every store operation returns [`Result<T>`]. Validation, not-found and
//! transition errors carry a message fit to show the user as-is; external
//! service failures are meant to be downgraded by the caller to manual entry.

use glokart_core::{EmailError, UnknownLabel};
use thiserror::Error;

use crate::enrichment::EnrichmentError;
use crate::persistence::PersistenceError;

/// Error type for marketplace operations.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Input failed validation (missing field, blank reason, oversized image).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown listing, offer or user.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The entity is in a status that does not allow the operation.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// No session, or the session is not allowed to do this.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The image analysis service failed or answered nonsense.
    #[error("External service error: {0}")]
    ExternalService(#[from] EnrichmentError),

    /// Stored documents could not be read.
    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl MarketError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition(message.into())
    }

    /// Whether the caller should fall back to manual data entry.
    #[must_use]
    pub const fn is_degradable(&self) -> bool {
        matches!(self, Self::ExternalService(_))
    }
}

impl From<EmailError> for MarketError {
    fn from(err: EmailError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<UnknownLabel> for MarketError {
    fn from(err: UnknownLabel) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for `MarketError`.
pub type Result<T> = std::result::Result<T, MarketError>;
