//! Stored documents: users, listings and offers.
//!
//! Field names serialize in camelCase to match the persisted collections.
//! Optional fields are omitted when empty so a save/load cycle reproduces
//! the collection exactly.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use glokart_core::{
    Category, Condition, Currency, Email, ListingId, ListingStatus, Money, OfferId, OfferStatus,
    UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub phone_number: String,
    pub is_seller: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub saved_listing_ids: BTreeSet<ListingId>,
}

impl User {
    /// Name + email identity used on listings and offers.
    #[must_use]
    pub fn party(&self) -> Party {
        Party {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Someone taking part in a trade: seller, bidder or buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub email: Email,
}

impl Party {
    /// Same person, by case-insensitive email.
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        self.email.matches(&other.email)
    }
}

/// Optional item facts shown on the listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_year: Option<String>,
    /// Only kept for bulky categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    /// Only kept for electronics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,
}

impl ListingDetails {
    /// Drop blank values and the fields that do not apply to `category`.
    #[must_use]
    pub fn for_category(self, category: Category) -> Self {
        Self {
            brand: non_blank(self.brand),
            purchase_year: non_blank(self.purchase_year),
            dimensions: non_blank(self.dimensions).filter(|_| category.is_bulky()),
            specifications: non_blank(self.specifications)
                .filter(|_| category == Category::Electronics),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A bidder's proposed price on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub bidder: Party,
    pub amount: Decimal,
    pub placed_at: DateTime<Utc>,
    pub status: OfferStatus,
}

/// An item for sale with its moderation and sale state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub currency: Currency,
    pub category: Category,
    pub condition: Condition,
    #[serde(default)]
    pub tags: Vec<String>,
    /// URLs or `data:` URIs; the first one is the cover image.
    pub images: Vec<String>,
    pub location: String,
    pub seller: Party,
    pub posted_at: DateTime<Utc>,
    pub status: ListingStatus,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub details: ListingDetails,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_for_email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_accepted_at: Option<DateTime<Utc>>,
    /// Asking price before an accepted offer overwrote `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_price: Option<Decimal>,
}

impl Listing {
    /// Current price with its currency.
    #[must_use]
    pub const fn asking_price(&self) -> Money {
        Money::new(self.price, self.currency)
    }

    /// Visible in the public marketplace.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.status.is_public() && !self.is_sold
    }

    #[must_use]
    pub fn offer(&self, id: &OfferId) -> Option<&Offer> {
        self.offers.iter().find(|o| &o.id == id)
    }

    pub fn offer_mut(&mut self, id: &OfferId) -> Option<&mut Offer> {
        self.offers.iter_mut().find(|o| &o.id == id)
    }

    /// Unsold with at least one offer on it.
    #[must_use]
    pub fn has_open_offers(&self) -> bool {
        !self.offers.is_empty() && !self.is_sold
    }
}

/// Seller-supplied listing fields, used for both submit and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub condition: Condition,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    /// Defaults to the seller's emirate when absent.
    pub location: Option<String>,
    pub details: ListingDetails,
}

impl ListingDraft {
    /// Check the fields a listing cannot exist without.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` for a blank title, a non-positive
    /// price or a draft without images.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(MarketError::validation("title is required"));
        }
        if self.price <= Decimal::ZERO {
            return Err(MarketError::validation("price must be greater than zero"));
        }
        if self.images.is_empty() {
            return Err(MarketError::validation("at least one image is required"));
        }
        Ok(())
    }

    /// Tags trimmed, lowercased and de-duplicated, in first-seen order.
    #[must_use]
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect()
    }
}

impl From<&Listing> for ListingDraft {
    /// Pre-fill an edit form with the listing's current fields.
    fn from(listing: &Listing) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.list_price.unwrap_or(listing.price),
            category: listing.category,
            condition: listing.condition,
            tags: listing.tags.clone(),
            images: listing.images.clone(),
            location: Some(listing.location.clone()),
            details: listing.details.clone(),
        }
    }
}
