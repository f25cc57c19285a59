//! Email address type.
//!
//! Emails are the identity key for bidders, buyers and reservations, so
//! comparisons between them are case-insensitive.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace.
    #[error("email cannot contain whitespace")]
    Whitespace,
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain has no dot-separated top-level part.
    #[error("email domain must look like example.com")]
    InvalidDomain,
}

/// A registered email address.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit), surrounding whitespace trimmed
/// - No inner whitespace
/// - Exactly one @ symbol with a non-empty local part
/// - Domain contains a dot with text on both sides
///
/// ## Examples
///
/// ```
/// use glokart_core::Email;
///
/// assert!(Email::parse("user@glokart.ae").is_ok());
/// assert!(Email::parse(" a@x.com ").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("user@localhost").is_err());
/// assert!(Email::parse("two words@x.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::MissingAtSymbol);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        match domain.rsplit_once('.') {
            Some((host, tld)) if !host.is_empty() && !tld.is_empty() => {}
            _ => return Err(EmailError::InvalidDomain),
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Case-insensitive comparison against another address.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.matches_str(&other.0)
    }

    /// Case-insensitive comparison against raw text (e.g. a login form).
    #[must_use]
    pub fn matches_str(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
