//! Listing state transitions.
//!
//! Each function mutates a single [`Listing`] in place and either succeeds
//! completely or leaves the listing untouched. The store wraps these with
//! lookup, persistence and logging, and passes in the current time.
//!
//! ```text
//! pending --approve--> approved
//! pending --reject(reason)--> rejected
//! approved --offer accepted--> offer_accepted
//! offer_accepted --reservation lapsed--> approved
//! ```
//!
//! `is_sold` is a terminal flag set from `approved` or `offer_accepted`.

use chrono::{DateTime, TimeDelta, Utc};
use glokart_core::{
    Currency, Email, ListingId, ListingStatus, OfferAction, OfferId, OfferStatus,
};
use rust_decimal::Decimal;

use crate::error::{MarketError, Result};
use crate::model::{Listing, ListingDraft, Offer, Party, User};

/// How long an accepted offer holds the listing for the winning bidder.
pub const RESERVATION_HOURS: i64 = 24;

/// Emirates recognised when deriving a listing location from an address.
const EMIRATES: [&str; 7] = [
    "Dubai",
    "Abu Dhabi",
    "Sharjah",
    "Ajman",
    "Fujairah",
    "Ras Al Khaimah",
    "Umm Al Quwain",
];

const DEFAULT_LOCATION: &str = "Dubai, UAE";

/// Length of the reservation hold.
#[must_use]
pub fn reservation_hold() -> TimeDelta {
    TimeDelta::hours(RESERVATION_HOURS)
}

/// Listing location for a seller address: "<Emirate>, UAE" when an emirate
/// is named, else the address itself, else Dubai.
#[must_use]
pub fn location_from_address(address: &str) -> String {
    let lower = address.to_lowercase();
    if let Some(emirate) = EMIRATES
        .iter()
        .find(|e| lower.contains(&e.to_lowercase()))
    {
        return format!("{emirate}, UAE");
    }
    let trimmed = address.trim();
    if trimmed.is_empty() {
        DEFAULT_LOCATION.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Build a new pending listing from a seller's draft.
///
/// # Errors
///
/// Returns `MarketError::Validation` if the draft is incomplete.
pub fn submit(draft: ListingDraft, seller: &User, now: DateTime<Utc>) -> Result<Listing> {
    draft.validate()?;
    let tags = draft.normalized_tags();
    let location = draft
        .location
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| location_from_address(&seller.address));

    Ok(Listing {
        id: ListingId::generate(),
        title: draft.title.trim().to_owned(),
        description: draft.description.trim().to_owned(),
        price: draft.price,
        currency: Currency::AED,
        category: draft.category,
        condition: draft.condition,
        tags,
        images: draft.images,
        location,
        seller: seller.party(),
        posted_at: now,
        status: ListingStatus::Pending,
        is_sold: false,
        buyer: None,
        rejection_reason: None,
        details: draft.details.for_category(draft.category),
        offers: Vec::new(),
        reserved_for_email: None,
        offer_accepted_at: None,
        list_price: None,
    })
}

fn require_pending(listing: &Listing, action: &str) -> Result<()> {
    if listing.status == ListingStatus::Pending {
        Ok(())
    } else {
        Err(MarketError::transition(format!(
            "cannot {action} listing {}: status is {}, expected pending",
            listing.id, listing.status
        )))
    }
}

fn require_unsold(listing: &Listing, action: &str) -> Result<()> {
    if listing.is_sold {
        Err(MarketError::transition(format!(
            "cannot {action} listing {}: already sold",
            listing.id
        )))
    } else {
        Ok(())
    }
}

/// `pending → approved`.
///
/// # Errors
///
/// Returns `MarketError::InvalidTransition` from any other status.
pub fn approve(listing: &mut Listing) -> Result<()> {
    require_pending(listing, "approve")?;
    listing.status = ListingStatus::Approved;
    listing.rejection_reason = None;
    Ok(())
}

/// `pending → rejected`, recording why.
///
/// # Errors
///
/// Returns `MarketError::Validation` for a blank reason and
/// `MarketError::InvalidTransition` from a non-pending status.
pub fn reject(listing: &mut Listing, reason: &str) -> Result<()> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(MarketError::validation("a rejection reason is required"));
    }
    require_pending(listing, "reject")?;
    listing.status = ListingStatus::Rejected;
    listing.rejection_reason = Some(reason.to_owned());
    Ok(())
}

/// Replace the descriptive fields of a listing.
///
/// Identity, seller, status, offers and sale state are preserved. With
/// `send_to_review`, an approved or rejected listing goes back to pending.
///
/// # Errors
///
/// Returns `MarketError::Validation` for an incomplete draft and
/// `MarketError::InvalidTransition` for sold or reserved listings.
pub fn edit(
    listing: &mut Listing,
    draft: ListingDraft,
    send_to_review: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    draft.validate()?;
    require_unsold(listing, "edit")?;
    if reservation_active(listing, now) {
        return Err(MarketError::transition(format!(
            "cannot edit listing {}: reserved for an accepted offer",
            listing.id
        )));
    }

    listing.tags = draft.normalized_tags();
    listing.title = draft.title.trim().to_owned();
    listing.description = draft.description.trim().to_owned();
    listing.price = draft.price;
    listing.category = draft.category;
    listing.condition = draft.condition;
    listing.images = draft.images;
    if let Some(location) = draft.location.filter(|l| !l.trim().is_empty()) {
        listing.location = location;
    }
    listing.details = draft.details.for_category(draft.category);

    if send_to_review
        && matches!(
            listing.status,
            ListingStatus::Approved | ListingStatus::Rejected
        )
    {
        listing.status = ListingStatus::Pending;
        listing.rejection_reason = None;
    }
    Ok(())
}

/// Append a pending offer from `bidder`.
///
/// Repeat offers from the same bidder are allowed and kept separately.
///
/// # Errors
///
/// Returns `MarketError::Validation` for a non-positive amount or a seller
/// bidding on their own listing, and `MarketError::InvalidTransition`
/// unless the listing is approved and unsold.
pub fn make_offer(
    listing: &mut Listing,
    bidder: Party,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<OfferId> {
    if amount <= Decimal::ZERO {
        return Err(MarketError::validation("offer amount must be greater than zero"));
    }
    if listing.seller.is(&bidder) {
        return Err(MarketError::validation("sellers cannot bid on their own listing"));
    }
    require_unsold(listing, "make an offer on")?;
    if listing.status != ListingStatus::Approved {
        return Err(MarketError::transition(format!(
            "cannot make an offer on listing {}: status is {}",
            listing.id, listing.status
        )));
    }

    let id = OfferId::generate();
    listing.offers.push(Offer {
        id: id.clone(),
        bidder,
        amount,
        placed_at: now,
        status: OfferStatus::Pending,
    });
    Ok(id)
}

/// Accept or reject a pending offer.
///
/// Accepting reserves the listing for the bidder: the price becomes the
/// offer amount and the 24-hour hold starts at `now`. Rejecting touches only
/// the offer. Other offers keep their status either way.
///
/// # Errors
///
/// Returns `MarketError::NotFound` for an unknown offer and
/// `MarketError::InvalidTransition` if the offer was already resolved, the
/// listing is sold, or (on accept) the listing is not approved.
pub fn resolve_offer(
    listing: &mut Listing,
    offer_id: &OfferId,
    action: OfferAction,
    now: DateTime<Utc>,
) -> Result<()> {
    let listing_id = listing.id.clone();
    let offer = listing.offer(offer_id).ok_or_else(|| {
        MarketError::NotFound(format!("offer {offer_id} on listing {listing_id}"))
    })?;
    if offer.status != OfferStatus::Pending {
        return Err(MarketError::transition(format!(
            "offer {offer_id} is already {}",
            offer.status
        )));
    }
    let (amount, bidder_email) = (offer.amount, offer.bidder.email.clone());

    require_unsold(listing, "resolve offers on")?;
    if action == OfferAction::Accept && listing.status != ListingStatus::Approved {
        return Err(MarketError::transition(format!(
            "cannot accept an offer on listing {listing_id}: status is {}",
            listing.status
        )));
    }

    if action == OfferAction::Accept {
        listing.list_price = Some(listing.price);
        listing.price = amount;
        listing.status = ListingStatus::OfferAccepted;
        listing.reserved_for_email = Some(bidder_email);
        listing.offer_accepted_at = Some(now);
    }
    if let Some(offer) = listing.offer_mut(offer_id) {
        offer.status = action.resulting_status();
    }
    Ok(())
}

/// Mark the listing sold to `buyer`.
///
/// While a reservation is active only the reserved bidder may buy.
///
/// # Errors
///
/// Returns `MarketError::Validation` when the seller tries to buy their own
/// listing, `MarketError::Unauthorized` when someone else holds the
/// reservation, and `MarketError::InvalidTransition` unless the listing is
/// public and unsold.
pub fn buy(listing: &mut Listing, buyer: Party, now: DateTime<Utc>) -> Result<()> {
    require_unsold(listing, "buy")?;
    if !listing.status.is_public() {
        return Err(MarketError::transition(format!(
            "cannot buy listing {}: status is {}",
            listing.id, listing.status
        )));
    }
    if listing.seller.is(&buyer) {
        return Err(MarketError::validation("sellers cannot buy their own listing"));
    }
    if reservation_active(listing, now)
        && !listing
            .reserved_for_email
            .as_ref()
            .is_some_and(|email| email.matches(&buyer.email))
    {
        return Err(MarketError::Unauthorized(format!(
            "listing {} is reserved for another buyer",
            listing.id
        )));
    }

    listing.is_sold = true;
    listing.buyer = Some(buyer);
    Ok(())
}

/// When the current reservation lapses, if there is one.
#[must_use]
pub fn reservation_deadline(listing: &Listing) -> Option<DateTime<Utc>> {
    if listing.status != ListingStatus::OfferAccepted {
        return None;
    }
    listing
        .offer_accepted_at
        .and_then(|at| at.checked_add_signed(reservation_hold()))
}

/// Whether a reservation currently blocks other buyers.
#[must_use]
pub fn reservation_active(listing: &Listing, now: DateTime<Utc>) -> bool {
    !listing.is_sold && reservation_deadline(listing).is_some_and(|deadline| now < deadline)
}

/// Time left on the hold; `None` when there is no reservation, zero once
/// it has lapsed.
#[must_use]
pub fn reservation_remaining(listing: &Listing, now: DateTime<Utc>) -> Option<TimeDelta> {
    reservation_deadline(listing).map(|deadline| (deadline - now).max(TimeDelta::zero()))
}

/// Countdown label: `"5h 12m left"`, or `"EXPIRED"`.
#[must_use]
pub fn format_remaining(remaining: TimeDelta) -> String {
    if remaining <= TimeDelta::zero() {
        return "EXPIRED".to_owned();
    }
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    format!("{hours}h {minutes}m left")
}

/// Revert a lapsed reservation: back to approved at the original asking
/// price, with the winning offer marked expired.
///
/// Returns whether anything changed. Sold listings are never reverted.
pub fn expire_reservation(listing: &mut Listing, now: DateTime<Utc>) -> bool {
    if listing.is_sold {
        return false;
    }
    match reservation_deadline(listing) {
        Some(deadline) if now >= deadline => {}
        _ => return false,
    }

    let reserved: Option<Email> = listing.reserved_for_email.take();
    listing.status = ListingStatus::Approved;
    listing.offer_accepted_at = None;
    if let Some(price) = listing.list_price.take() {
        listing.price = price;
    }
    for offer in &mut listing.offers {
        let winner = reserved
            .as_ref()
            .is_none_or(|email| email.matches(&offer.bidder.email));
        if offer.status == OfferStatus::Accepted && winner {
            offer.status = OfferStatus::Expired;
        }
    }
    true
}
