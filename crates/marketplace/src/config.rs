//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `GLOKART_DATA_DIR` - Directory for the JSON documents (default: ./data)
//! - `GLOKART_ADMIN_USERNAME` - Admin login name (default: admin)
//! - `GLOKART_ADMIN_PASSWORD` - Admin password (default: admin123)
//! - `MODERATION_REVIEW_EDITS` - Send edited listings back to review (default: false)
//! - `GEMINI_API_KEY` - Image analysis API key; auto-fill is disabled without it
//! - `GEMINI_MODEL` - Model id (default: gemini-3-flash-preview)
//! - `GEMINI_BASE_URL` - API base URL (default: <https://generativelanguage.googleapis.com>)
//! - `GEMINI_TIMEOUT_SECS` - Request timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level marketplace configuration.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Where the JSON-file store keeps its documents
    pub data_dir: PathBuf,
    /// Credentials for the admin console
    pub admin: AdminCredentials,
    /// Moderation rules
    pub moderation: ModerationPolicy,
    /// Image analysis client; `None` disables auto-fill
    pub gemini: Option<GeminiConfig>,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            admin: AdminCredentials::default(),
            moderation: ModerationPolicy::default(),
            gemini: None,
        }
    }
}

/// Admin console login.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
}

impl AdminCredentials {
    /// Compare a login attempt against the configured credentials.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username.trim() && self.password.expose_secret() == password
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_owned(),
            password: SecretString::from(DEFAULT_ADMIN_PASSWORD),
        }
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Rules applied by the moderation workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModerationPolicy {
    /// A non-admin edit of an approved or rejected listing returns it to
    /// pending review.
    pub review_edits: bool,
}

/// Gemini image analysis configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MarketplaceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("GLOKART_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let admin = AdminCredentials {
            username: get("GLOKART_ADMIN_USERNAME")
                .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_owned()),
            password: SecretString::from(
                get("GLOKART_ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_owned()),
            ),
        };

        let moderation = ModerationPolicy {
            review_edits: get("MODERATION_REVIEW_EDITS")
                .map(|v| parse_bool("MODERATION_REVIEW_EDITS", &v))
                .transpose()?
                .unwrap_or(false),
        };

        let gemini = get("GEMINI_API_KEY")
            .map(|api_key| GeminiConfig::from_lookup(api_key, &get))
            .transpose()?;

        Ok(Self {
            data_dir,
            admin,
            moderation,
            gemini,
        })
    }
}

impl GeminiConfig {
    fn from_lookup<F>(api_key: String, get: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_owned());
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("GEMINI_BASE_URL".to_owned(), e.to_string()))?;

        let timeout = get("GEMINI_TIMEOUT_SECS")
            .map(|v| {
                v.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("GEMINI_TIMEOUT_SECS".to_owned(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS);

        Ok(Self {
            api_key: SecretString::from(api_key),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned()),
            base_url,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// Parse a boolean flag (`1/0`, `true/false`, `yes/no`, `on/off`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("expected a boolean, got {other}"),
        )),
    }
}
