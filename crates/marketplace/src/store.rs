//! The marketplace store.
//!
//! [`Marketplace`] owns the listing and user collections and applies every
//! transition from [`crate::lifecycle`] to them. After each successful
//! mutation the affected collection is written back through the injected
//! [`KeyValueStore`]. Writes are fire-and-forget: a failed save is logged
//! and the in-memory state stays authoritative.
//!
//! Lapsed reservations are reverted lazily at the start of every mutating
//! operation, and on demand through [`Marketplace::expire_reservations`].

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use glokart_core::{ListingId, OfferAction, OfferId, UserId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::{AdminCredentials, MarketplaceConfig, ModerationPolicy};
use crate::error::{MarketError, Result};
use crate::lifecycle;
use crate::model::{Listing, ListingDraft, User};
use crate::persistence::{
    CURRENT_USER_KEY, KeyValueStore, LISTINGS_KEY, USERS_KEY, load_json, save_json,
};
use crate::pricing::{self, DeliveryQuote};
use crate::seed;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used in tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Listing and user collections plus their persistence.
pub struct Marketplace<S> {
    pub(crate) listings: Vec<Listing>,
    pub(crate) users: Vec<User>,
    pub(crate) current_user: Option<UserId>,
    pub(crate) store: S,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) moderation: ModerationPolicy,
    pub(crate) admin: AdminCredentials,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Marketplace<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marketplace")
            .field("listings", &self.listings.len())
            .field("users", &self.users.len())
            .field("current_user", &self.current_user)
            .field("store", &self.store)
            .field("moderation", &self.moderation)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> Marketplace<S> {
    /// Load the collections from `store`, installing the demo catalog into
    /// empty storage, with default settings and the system clock.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Persistence` if a stored document cannot be read
    /// or decoded.
    pub fn open(store: S) -> Result<Self> {
        Self::open_with(store, &MarketplaceConfig::default(), Arc::new(SystemClock))
    }

    /// Load the collections with explicit settings and clock.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Persistence` if a stored document cannot be read
    /// or decoded.
    pub fn open_with(
        store: S,
        config: &MarketplaceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let now = clock.now();

        let (listings, seeded_listings) = match load_json::<Vec<Listing>, _>(&store, LISTINGS_KEY)? {
            Some(listings) => (listings, false),
            None => (seed::listings(now)?, true),
        };
        let (users, seeded_users) = match load_json::<Vec<User>, _>(&store, USERS_KEY)? {
            Some(users) => (users, false),
            None => (seed::users()?, true),
        };
        let current_user = load_json::<User, _>(&store, CURRENT_USER_KEY)?
            .map(|u| u.id)
            .filter(|id| users.iter().any(|u| &u.id == id));

        let mut market = Self {
            listings,
            users,
            current_user,
            store,
            clock,
            moderation: config.moderation,
            admin: config.admin.clone(),
        };

        if seeded_listings {
            info!(count = market.listings.len(), "Installed demo listings");
            market.persist_listings();
        }
        if seeded_users {
            info!(count = market.users.len(), "Installed demo users");
            market.persist_users();
        }
        market.expire_reservations();

        Ok(market)
    }

    /// Current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Every listing in stored order; new submissions come first.
    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Every registered user.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Look up a listing.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id.
    pub fn listing(&self, id: &ListingId) -> Result<&Listing> {
        self.listings
            .iter()
            .find(|l| &l.id == id)
            .ok_or_else(|| MarketError::NotFound(format!("listing {id}")))
    }

    /// Look up a user.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id.
    pub fn user(&self, id: &UserId) -> Result<&User> {
        self.users
            .iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| MarketError::NotFound(format!("user {id}")))
    }

    pub(crate) fn listing_mut(&mut self, id: &ListingId) -> Result<&mut Listing> {
        self.listings
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| MarketError::NotFound(format!("listing {id}")))
    }

    /// Submit a new listing for review. New listings go to the front.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown seller and
    /// `MarketError::Validation` for an incomplete draft.
    pub fn submit(&mut self, draft: ListingDraft, seller: &UserId) -> Result<ListingId> {
        let now = self.now();
        let listing = lifecycle::submit(draft, self.user(seller)?, now)?;
        let id = listing.id.clone();
        info!(listing_id = %id, seller = %seller, "Listing submitted for review");
        self.listings.insert(0, listing);
        self.persist_listings();
        Ok(id)
    }

    /// Admin approval of a pending listing.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` or `MarketError::InvalidTransition`.
    pub fn approve(&mut self, id: &ListingId) -> Result<()> {
        self.mutate_listing(id, |listing, _| lifecycle::approve(listing))?;
        info!(listing_id = %id, "Listing approved");
        Ok(())
    }

    /// Admin rejection of a pending listing.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound`, `MarketError::Validation` or
    /// `MarketError::InvalidTransition`.
    pub fn reject(&mut self, id: &ListingId, reason: &str) -> Result<()> {
        self.mutate_listing(id, |listing, _| lifecycle::reject(listing, reason))?;
        info!(listing_id = %id, reason, "Listing rejected");
        Ok(())
    }

    /// Replace a listing's descriptive fields.
    ///
    /// Under the review-edits policy, edits by non-admins send approved or
    /// rejected listings back to pending.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown listing or editor,
    /// `MarketError::Validation` or `MarketError::InvalidTransition`.
    pub fn edit(&mut self, id: &ListingId, draft: ListingDraft, editor: &UserId) -> Result<()> {
        let editor_is_admin = self.user(editor)?.is_admin;
        let send_to_review = self.moderation.review_edits && !editor_is_admin;
        self.mutate_listing(id, |listing, now| {
            lifecycle::edit(listing, draft, send_to_review, now)
        })?;
        info!(listing_id = %id, editor = %editor, send_to_review, "Listing updated");
        Ok(())
    }

    /// Remove a listing and everything attached to it.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id.
    pub fn delete(&mut self, id: &ListingId) -> Result<Listing> {
        let index = self
            .listings
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| MarketError::NotFound(format!("listing {id}")))?;
        let removed = self.listings.remove(index);
        info!(listing_id = %id, "Listing deleted");
        self.persist_listings();
        Ok(removed)
    }

    /// Place an offer on behalf of `bidder`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound`, `MarketError::Validation` or
    /// `MarketError::InvalidTransition`.
    pub fn make_offer(
        &mut self,
        id: &ListingId,
        bidder: &UserId,
        amount: Decimal,
    ) -> Result<OfferId> {
        let bidder = self.user(bidder)?.party();
        let offer_id = self.mutate_listing(id, |listing, now| {
            lifecycle::make_offer(listing, bidder, amount, now)
        })?;
        info!(listing_id = %id, offer_id = %offer_id, %amount, "Offer placed");
        Ok(offer_id)
    }

    /// Accept or reject a pending offer.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` or `MarketError::InvalidTransition`.
    pub fn resolve_offer(
        &mut self,
        id: &ListingId,
        offer_id: &OfferId,
        action: OfferAction,
    ) -> Result<()> {
        self.mutate_listing(id, |listing, now| {
            lifecycle::resolve_offer(listing, offer_id, action, now)
        })?;
        info!(listing_id = %id, offer_id = %offer_id, ?action, "Offer resolved");
        Ok(())
    }

    /// Buy a listing on behalf of `buyer`, returning the checkout breakdown.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound`, `MarketError::Validation`,
    /// `MarketError::Unauthorized` (reserved for someone else) or
    /// `MarketError::InvalidTransition`.
    pub fn buy(&mut self, id: &ListingId, buyer: &UserId) -> Result<DeliveryQuote> {
        let buyer = self.user(buyer)?.party();
        let quote = self.mutate_listing(id, |listing, now| {
            let quote = pricing::quote_listing(listing)?;
            lifecycle::buy(listing, buyer, now)?;
            Ok(quote)
        })?;
        info!(listing_id = %id, total = %quote.total, "Listing sold");
        Ok(quote)
    }

    /// Checkout breakdown for a listing at its current price.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id.
    pub fn quote(&self, id: &ListingId) -> Result<DeliveryQuote> {
        pricing::quote_listing(self.listing(id)?)
    }

    /// Time left on a listing's reservation, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id.
    pub fn reservation_remaining(&self, id: &ListingId) -> Result<Option<TimeDelta>> {
        Ok(lifecycle::reservation_remaining(self.listing(id)?, self.now()))
    }

    /// Revert every lapsed reservation; returns the affected listing ids.
    pub fn expire_reservations(&mut self) -> Vec<ListingId> {
        let now = self.now();
        let expired: Vec<ListingId> = self
            .listings
            .iter_mut()
            .filter_map(|l| lifecycle::expire_reservation(l, now).then(|| l.id.clone()))
            .collect();
        if !expired.is_empty() {
            for id in &expired {
                info!(listing_id = %id, "Reservation lapsed, listing back on sale");
            }
            self.persist_listings();
        }
        expired
    }

    /// Run one transition against a listing and persist on success.
    fn mutate_listing<T, F>(&mut self, id: &ListingId, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Listing, DateTime<Utc>) -> Result<T>,
    {
        self.expire_reservations();
        let now = self.now();
        let listing = self.listing_mut(id)?;
        let status = listing.status;
        let out = apply(listing, now).inspect_err(|e| {
            warn!(listing_id = %id, %status, error = %e, "Listing transition refused");
        })?;
        self.persist_listings();
        Ok(out)
    }

    pub(crate) fn persist_listings(&self) {
        if let Err(e) = save_json(&self.store, LISTINGS_KEY, &self.listings) {
            warn!(error = %e, key = LISTINGS_KEY, "Failed to save listings");
        }
    }

    pub(crate) fn persist_users(&self) {
        if let Err(e) = save_json(&self.store, USERS_KEY, &self.users) {
            warn!(error = %e, key = USERS_KEY, "Failed to save users");
        }
    }

    pub(crate) fn persist_session(&self) {
        let result = match self.current_user() {
            Some(user) => save_json(&self.store, CURRENT_USER_KEY, user),
            None => self.store.remove(CURRENT_USER_KEY),
        };
        if let Err(e) = result {
            warn!(error = %e, key = CURRENT_USER_KEY, "Failed to save session");
        }
    }
}
