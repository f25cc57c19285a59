//! Read-only views over the listing collection.

use glokart_core::{Category, ListingStatus, UserId};

use crate::error::Result;
use crate::model::{Listing, User};
use crate::persistence::KeyValueStore;
use crate::store::Marketplace;

/// Marketplace browse filter. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub category: Option<Category>,
    pub query: Option<String>,
}

impl ListingFilter {
    /// Case-insensitive search over title, description and tags.
    #[must_use]
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            category: None,
            query: Some(query.into()),
        }
    }

    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        if self.category.is_some_and(|c| c != listing.category) {
            return false;
        }
        let Some(query) = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
        else {
            return true;
        };
        let query = query.to_lowercase();
        listing.title.to_lowercase().contains(&query)
            || listing.description.to_lowercase().contains(&query)
            || listing.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// Everything shown on a user's profile page.
#[derive(Debug, Clone)]
pub struct ProfileView<'a> {
    pub user: &'a User,
    pub my_listings: Vec<&'a Listing>,
    pub orders_placed: Vec<&'a Listing>,
    pub orders_received: Vec<&'a Listing>,
    pub wishlist: Vec<&'a Listing>,
    pub offers_received: Vec<&'a Listing>,
}

impl<S: KeyValueStore> Marketplace<S> {
    /// Listings open to shoppers: approved or reserved, and not sold.
    #[must_use]
    pub fn marketplace(&self, filter: &ListingFilter) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| l.is_public() && filter.matches(l))
            .collect()
    }

    /// Moderation queue.
    #[must_use]
    pub fn pending_listings(&self) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| l.status == ListingStatus::Pending)
            .collect()
    }

    #[must_use]
    pub fn sold_listings(&self) -> Vec<&Listing> {
        self.listings.iter().filter(|l| l.is_sold).collect()
    }

    /// Unsold listings that have received at least one offer.
    #[must_use]
    pub fn listings_with_offers(&self) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| l.has_open_offers())
            .collect()
    }

    /// Profile page for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown user.
    pub fn profile(&self, user_id: &UserId) -> Result<ProfileView<'_>> {
        let user = self.user(user_id)?;
        let mine = |l: &&Listing| l.seller.email.matches(&user.email);
        let bought = |l: &&Listing| {
            l.is_sold && l.buyer.as_ref().is_some_and(|b| b.email.matches(&user.email))
        };

        Ok(ProfileView {
            user,
            my_listings: self.listings.iter().filter(mine).collect(),
            orders_placed: self.listings.iter().filter(bought).collect(),
            orders_received: self
                .listings
                .iter()
                .filter(|l| mine(l) && l.is_sold)
                .collect(),
            wishlist: self
                .listings
                .iter()
                .filter(|l| user.saved_listing_ids.contains(&l.id))
                .collect(),
            offers_received: self
                .listings
                .iter()
                .filter(|l| mine(l) && l.has_open_offers())
                .collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use glokart_core::ListingId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::model::ListingDraft;
    use crate::persistence::MemoryStore;

    fn ids(listings: &[&Listing]) -> Vec<String> {
        listings.iter().map(|l| l.id.to_string()).collect()
    }

    #[test]
    fn test_marketplace_filters() {
        let store = MemoryStore::new();
        let market = Marketplace::open(&store).unwrap();

        assert_eq!(ids(&market.marketplace(&ListingFilter::default())), ["1", "2", "3"]);

        let furniture = ListingFilter {
            category: Some(Category::Furniture),
            query: None,
        };
        assert_eq!(ids(&market.marketplace(&furniture)), ["3"]);

        assert_eq!(ids(&market.marketplace(&ListingFilter::search("LUXURY"))), ["2"]);
        assert_eq!(ids(&market.marketplace(&ListingFilter::search("  "))).len(), 3);
        assert!(market.marketplace(&ListingFilter::search("bicycle")).is_empty());
    }

    #[test]
    fn test_pending_and_sold_are_hidden() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();
        let seller = UserId::new("user_1");
        let draft = ListingDraft {
            title: "Nintendo Switch".to_string(),
            price: Decimal::from(750),
            category: Category::Toys,
            images: vec!["https://img.example/switch.jpg".to_string()],
            ..ListingDraft::default()
        };
        let pending = market.submit(draft, &seller).unwrap();
        market.buy(&ListingId::new("1"), &seller).unwrap();

        let visible = ids(&market.marketplace(&ListingFilter::default()));
        assert_eq!(visible, ["2", "3"]);
        assert_eq!(ids(&market.pending_listings()), [pending.to_string()]);
        assert_eq!(ids(&market.sold_listings()), ["1"]);
        assert_eq!(ids(&market.listings_with_offers()), ["2"]);
    }

    #[test]
    fn test_profile() {
        let store = MemoryStore::new();
        let mut market = Marketplace::open(&store).unwrap();
        let demo = UserId::new("user_1");
        market.login("user@glokart.ae").unwrap();
        market.toggle_saved(&ListingId::new("2")).unwrap();
        market.buy(&ListingId::new("3"), &demo).unwrap();

        let profile = market.profile(&demo).unwrap();
        assert!(profile.my_listings.is_empty());
        assert_eq!(ids(&profile.orders_placed), ["3"]);
        assert_eq!(ids(&profile.wishlist), ["2"]);
        assert!(profile.offers_received.is_empty());

        assert!(market.profile(&UserId::new("ghost")).is_err());
    }
}
