//! Registration, sessions and saved listings.
//!
//! There are no passwords for regular users: logging in by email is enough.
//! The admin console is guarded by the configured [`AdminCredentials`].
//!
//! [`AdminCredentials`]: crate::config::AdminCredentials

use std::collections::BTreeSet;

use glokart_core::{Email, ListingId, UserId};
use tracing::{info, warn};

use crate::error::{MarketError, Result};
use crate::model::User;
use crate::persistence::KeyValueStore;
use crate::store::Marketplace;

/// Sign-up form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: String,
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MarketError::validation(format!("{field} is required")));
    }
    Ok(value)
}

impl<S: KeyValueStore> Marketplace<S> {
    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        let id = self.current_user.as_ref()?;
        self.users.iter().find(|u| &u.id == id)
    }

    /// The signed-in user, or `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthorized` when nobody is signed in.
    pub fn require_user(&self) -> Result<&User> {
        self.current_user()
            .ok_or_else(|| MarketError::Unauthorized("please log in first".to_owned()))
    }

    /// The signed-in admin, or `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthorized` unless an admin is signed in.
    pub fn require_admin(&self) -> Result<&User> {
        let user = self.require_user()?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(MarketError::Unauthorized("admin access required".to_owned()))
        }
    }

    /// The signed-in user if they are the listing's seller or an admin.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown listing and
    /// `MarketError::Unauthorized` for anyone else.
    pub fn require_owner(&self, listing_id: &ListingId) -> Result<&User> {
        let listing = self.listing(listing_id)?;
        let user = self.require_user()?;
        if user.is_admin || listing.seller.email.matches(&user.email) {
            Ok(user)
        } else {
            Err(MarketError::Unauthorized(format!(
                "listing {listing_id} belongs to another seller"
            )))
        }
    }

    /// Create a seller account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` for a missing field, a malformed
    /// email or an email that is already registered.
    pub fn register(&mut self, form: RegistrationForm) -> Result<UserId> {
        let name = required("name", &form.name)?.to_owned();
        let email = Email::parse(required("email", &form.email)?)?;
        let address = required("address", &form.address)?.to_owned();
        let phone_number = required("phone number", &form.phone_number)?.to_owned();

        if self.users.iter().any(|u| u.email.matches(&email)) {
            return Err(MarketError::validation(format!(
                "an account with {email} already exists"
            )));
        }

        let user = User {
            id: UserId::generate(),
            name,
            email,
            address,
            phone_number,
            is_seller: true,
            is_admin: false,
            saved_listing_ids: BTreeSet::new(),
        };
        let id = user.id.clone();
        info!(user_id = %id, email = %user.email, "User registered");

        self.users.push(user);
        self.current_user = Some(id.clone());
        self.persist_users();
        self.persist_session();
        Ok(id)
    }

    /// Sign in a regular user by email.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if no regular account has this email.
    pub fn login(&mut self, email: &str) -> Result<&User> {
        let id = self
            .users
            .iter()
            .find(|u| !u.is_admin && u.email.matches_str(email))
            .map(|u| u.id.clone())
            .ok_or_else(|| MarketError::NotFound(format!("user with email {}", email.trim())))?;
        self.sign_in(id)
    }

    /// Sign in to the admin console.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthorized` for wrong credentials and
    /// `MarketError::NotFound` if no admin account exists.
    pub fn admin_login(&mut self, username: &str, password: &str) -> Result<&User> {
        if !self.admin.verify(username, password) {
            warn!(username, "Rejected admin login");
            return Err(MarketError::Unauthorized("invalid admin credentials".to_owned()));
        }
        let id = self
            .users
            .iter()
            .find(|u| u.is_admin)
            .map(|u| u.id.clone())
            .ok_or_else(|| MarketError::NotFound("admin account".to_owned()))?;
        self.sign_in(id)
    }

    /// End the session.
    pub fn logout(&mut self) {
        if let Some(id) = self.current_user.take() {
            info!(user_id = %id, "User logged out");
        }
        self.persist_session();
    }

    /// Add or remove a listing from the signed-in user's saved items.
    /// Returns whether the listing is now saved.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthorized` when nobody is signed in and
    /// `MarketError::NotFound` for an unknown listing.
    pub fn toggle_saved(&mut self, listing_id: &ListingId) -> Result<bool> {
        let user_id = self.require_user()?.id.clone();
        self.listing(listing_id)?;

        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| MarketError::NotFound(format!("user {user_id}")))?;
        let saved = if user.saved_listing_ids.remove(listing_id) {
            false
        } else {
            user.saved_listing_ids.insert(listing_id.clone());
            true
        };
        info!(user_id = %user_id, listing_id = %listing_id, saved, "Wishlist updated");

        self.persist_users();
        self.persist_session();
        Ok(saved)
    }

    fn sign_in(&mut self, id: UserId) -> Result<&User> {
        info!(user_id = %id, "User logged in");
        self.current_user = Some(id);
        self.persist_session();
        self.require_user()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::persistence::{CURRENT_USER_KEY, MemoryStore, load_json};
    use crate::seed::DEMO_USER_EMAIL;

    fn form(email: &str) -> RegistrationForm {
        RegistrationForm {
            name: "Fatima Noor".to_string(),
            email: email.to_string(),
            address: "Al Nahda, Sharjah".to_string(),
            phone_number: "0559876543".to_string(),
        }
    }

    #[test]
    fn test_register_signs_in() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();

        let id = market.register(form("fatima@example.ae")).unwrap();

        assert_eq!(market.current_user().unwrap().id, id);
        let session: User = load_json(&store, CURRENT_USER_KEY).unwrap().unwrap();
        assert_eq!(session.id, id);
    }

    #[test]
    fn test_register_rejects_duplicates_and_blanks() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();

        let err = market.register(form("USER@glokart.ae")).unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));

        let mut blank = form("new@example.ae");
        blank.phone_number = "   ".to_string();
        assert!(matches!(
            market.register(blank),
            Err(MarketError::Validation(_))
        ));

        assert!(matches!(
            market.register(form("not-an-email")),
            Err(MarketError::Validation(_))
        ));
        assert_eq!(market.users().len(), 2);
    }

    #[test]
    fn test_login_logout() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();

        assert_eq!(market.login(" User@Glokart.ae ").unwrap().name, "Demo User");
        assert!(matches!(
            market.login("admin@glokart.ae"),
            Err(MarketError::NotFound(_))
        ));

        market.logout();
        assert!(market.current_user().is_none());
        assert!(store.load(CURRENT_USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_admin_login() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();

        assert!(matches!(
            market.admin_login("admin", "wrong"),
            Err(MarketError::Unauthorized(_))
        ));
        assert!(market.admin_login("admin", "admin123").unwrap().is_admin);
        assert!(market.require_admin().is_ok());
        assert!(market.require_owner(&ListingId::new("1")).is_ok());
    }

    #[test]
    fn test_require_owner() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();
        market.login(DEMO_USER_EMAIL).unwrap();

        assert!(matches!(
            market.require_owner(&ListingId::new("2")),
            Err(MarketError::Unauthorized(_))
        ));
        assert!(matches!(
            market.require_admin(),
            Err(MarketError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_session_survives_reopen() {
        let store = MemoryStore::new();
        Marketplace::open(&store).unwrap().login(DEMO_USER_EMAIL).unwrap();

        let market = Marketplace::open(&store).unwrap();
        assert_eq!(market.current_user().unwrap().email.as_str(), DEMO_USER_EMAIL);
    }

    #[test]
    fn test_toggle_saved() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();
        let rug = ListingId::new("3");

        assert!(matches!(
            market.toggle_saved(&rug),
            Err(MarketError::Unauthorized(_))
        ));

        market.login(DEMO_USER_EMAIL).unwrap();
        assert!(market.toggle_saved(&rug).unwrap());
        assert!(market.current_user().unwrap().saved_listing_ids.contains(&rug));
        assert!(!market.toggle_saved(&rug).unwrap());
        assert!(matches!(
            market.toggle_saved(&ListingId::new("404")),
            Err(MarketError::NotFound(_))
        ));
    }
}
