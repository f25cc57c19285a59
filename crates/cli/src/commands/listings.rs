//! Listing, moderation and checkout commands.
//!
//! Every command acts as the signed-in user; moderation commands need an
//! admin session (`glokart admin-login`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use glokart_core::{Category, Condition, ListingId, OfferAction, OfferId};
use glokart_marketplace::lifecycle::{format_remaining, reservation_remaining};
use glokart_marketplace::{
    GeminiClient, ImageUpload, Listing, ListingDraft, ListingFilter, MarketError, autofill,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{App, CommandResult};

/// Collections shown by `glokart listings`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum View {
    /// Approved or reserved, unsold
    Marketplace,
    /// Awaiting moderation (admin)
    Pending,
    /// Sold (admin)
    Sold,
    /// Unsold with offers (admin)
    Offers,
    /// Everything (admin)
    All,
}

/// Listing fields accepted by `submit` and `edit`.
#[derive(Debug, Default, Args)]
pub struct DraftArgs {
    #[arg(short, long)]
    title: Option<String>,

    #[arg(short, long)]
    description: Option<String>,

    /// Asking price in AED
    #[arg(short, long)]
    price: Option<Decimal>,

    #[arg(short, long)]
    category: Option<Category>,

    #[arg(long)]
    condition: Option<Condition>,

    /// Search tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Image file to upload (repeatable, first is the cover)
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Already-hosted image URL (repeatable)
    #[arg(long = "image-url")]
    image_urls: Vec<String>,

    /// Defaults to the seller's emirate
    #[arg(short, long)]
    location: Option<String>,

    #[arg(long)]
    brand: Option<String>,

    #[arg(long)]
    year: Option<String>,

    /// Furniture only
    #[arg(long)]
    dimensions: Option<String>,

    /// Electronics only
    #[arg(long)]
    specs: Option<String>,
}

impl DraftArgs {
    /// Uploaded files as data URIs followed by the hosted URLs.
    fn load_images(&self) -> Result<Vec<String>, MarketError> {
        let mut images = self
            .images
            .iter()
            .map(|path| ImageUpload::from_path(path).map(|img| img.to_data_uri()))
            .collect::<Result<Vec<_>, _>>()?;
        images.extend(self.image_urls.iter().cloned());
        Ok(images)
    }

    /// Overwrite the draft with every field given on the command line.
    fn apply_to(self, draft: &mut ListingDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(condition) = self.condition {
            draft.condition = condition;
        }
        if !self.tags.is_empty() {
            draft.tags = self.tags;
        }
        if self.location.is_some() {
            draft.location = self.location;
        }
        let details = &mut draft.details;
        details.brand = self.brand.or(details.brand.take());
        details.purchase_year = self.year.or(details.purchase_year.take());
        details.dimensions = self.dimensions.or(details.dimensions.take());
        details.specifications = self.specs.or(details.specifications.take());
    }
}

fn show(listing: &Listing, now: DateTime<Utc>) {
    let reservation = reservation_remaining(listing, now).map(format_remaining);
    info!(
        listing_id = %listing.id,
        title = %listing.title,
        price = %listing.asking_price(),
        category = %listing.category,
        status = %listing.status,
        sold = listing.is_sold,
        offers = listing.offers.len(),
        reservation = reservation.as_deref().unwrap_or("-"),
        location = %listing.location,
        "Listing"
    );
}

fn show_offers(listing: &Listing) {
    for offer in &listing.offers {
        info!(
            listing_id = %listing.id,
            offer_id = %offer.id,
            bidder = %offer.bidder.email,
            amount = %offer.amount,
            status = %offer.status,
            "Offer"
        );
    }
}

/// Report what `App::open` installed after a reset.
pub fn seed(app: &App) {
    info!(
        listings = app.market.listings().len(),
        users = app.market.users().len(),
        "Storage reset to demo data"
    );
}

/// Print one of the listing collections.
///
/// # Errors
///
/// Returns an error if an admin view is requested without an admin session.
pub fn list(
    app: &App,
    category: Option<Category>,
    query: Option<String>,
    view: View,
) -> CommandResult {
    let market = &app.market;
    let filter = ListingFilter { category, query };

    let listings: Vec<&Listing> = match view {
        View::Marketplace => market.marketplace(&filter),
        admin_view => {
            market.require_admin()?;
            let all = match admin_view {
                View::Pending => market.pending_listings(),
                View::Sold => market.sold_listings(),
                View::Offers => market.listings_with_offers(),
                View::All | View::Marketplace => market.listings().iter().collect(),
            };
            all.into_iter().filter(|l| filter.matches(l)).collect()
        }
    };

    let now = market.now();
    info!(count = listings.len(), ?view, "Listings");
    for listing in listings {
        show(listing, now);
        if matches!(view, View::Offers) {
            show_offers(listing);
        }
    }
    Ok(())
}

/// Submit a listing as the signed-in user.
///
/// With `use_autofill`, the first image is analyzed and the suggestion fills
/// the draft before explicit arguments are applied. Analysis failures only
/// produce a warning.
///
/// # Errors
///
/// Returns an error without a session, for unreadable images, or if the
/// finished draft is incomplete.
pub async fn submit(app: &mut App, args: DraftArgs, use_autofill: bool) -> CommandResult {
    let seller = app.market.require_user()?.id.clone();
    let mut draft = ListingDraft {
        images: args.load_images()?,
        ..ListingDraft::default()
    };

    if use_autofill {
        match &app.gemini {
            Some(config) => {
                let client = GeminiClient::new(config)?;
                match autofill(&client, &mut draft).await {
                    Ok(_) => {}
                    Err(e) if e.is_degradable() => {
                        warn!(error = %e, "Auto-fill unavailable, using the fields given");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => warn!("GEMINI_API_KEY is not set, skipping auto-fill"),
        }
    }

    args.apply_to(&mut draft);
    let id = app.market.submit(draft, &seller)?;
    info!(listing_id = %id, "Submitted for review");
    Ok(())
}

/// # Errors
///
/// Returns an error without an admin session or if the listing is not pending.
pub fn approve(app: &mut App, id: &ListingId) -> CommandResult {
    app.market.require_admin()?;
    app.market.approve(id)?;
    Ok(())
}

/// # Errors
///
/// Returns an error without an admin session, for a blank reason, or if the
/// listing is not pending.
pub fn reject(app: &mut App, id: &ListingId, reason: &str) -> CommandResult {
    app.market.require_admin()?;
    app.market.reject(id, reason)?;
    Ok(())
}

/// Edit a listing, keeping every field not given on the command line.
///
/// # Errors
///
/// Returns an error unless the seller or an admin is signed in, or if the
/// edit is refused.
pub fn edit(app: &mut App, id: &ListingId, args: DraftArgs) -> CommandResult {
    let editor = app.market.require_owner(id)?.id.clone();
    let mut draft = ListingDraft::from(app.market.listing(id)?);
    let images = args.load_images()?;
    if !images.is_empty() {
        draft.images = images;
    }
    args.apply_to(&mut draft);
    app.market.edit(id, draft, &editor)?;
    Ok(())
}

/// # Errors
///
/// Returns an error unless the seller or an admin is signed in.
pub fn delete(app: &mut App, id: &ListingId) -> CommandResult {
    app.market.require_owner(id)?;
    let removed = app.market.delete(id)?;
    info!(title = %removed.title, "Deleted");
    Ok(())
}

/// # Errors
///
/// Returns an error without a session or if the offer is refused.
pub fn offer(app: &mut App, id: &ListingId, amount: Decimal) -> CommandResult {
    let bidder = app.market.require_user()?.id.clone();
    let offer_id = app.market.make_offer(id, &bidder, amount)?;
    info!(listing_id = %id, offer_id = %offer_id, "Offer sent to the seller");
    Ok(())
}

/// # Errors
///
/// Returns an error unless the seller or an admin is signed in, or if the
/// offer cannot be resolved.
pub fn resolve(
    app: &mut App,
    id: &ListingId,
    offer_id: &OfferId,
    action: OfferAction,
) -> CommandResult {
    app.market.require_owner(id)?;
    app.market.resolve_offer(id, offer_id, action)?;
    if action == OfferAction::Accept
        && let Some(remaining) = app.market.reservation_remaining(id)?
    {
        info!(listing_id = %id, reservation = %format_remaining(remaining), "Reserved for bidder");
    }
    Ok(())
}

/// # Errors
///
/// Returns an error without a session or if the purchase is refused.
pub fn buy(app: &mut App, id: &ListingId) -> CommandResult {
    let buyer = app.market.require_user()?.id.clone();
    let quote = app.market.buy(id, &buyer)?;
    info!(
        item = %quote.item,
        delivery = %quote.delivery,
        total = %quote.total,
        "Order placed"
    );
    Ok(())
}

/// # Errors
///
/// Returns an error for an unknown listing.
pub fn quote(app: &App, id: &ListingId) -> CommandResult {
    let quote = app.market.quote(id)?;
    info!(
        listing_id = %id,
        item = %quote.item,
        delivery = %quote.delivery,
        total = %quote.total,
        "Checkout"
    );
    Ok(())
}

pub fn expire(app: &mut App) {
    let expired = app.market.expire_reservations();
    info!(count = expired.len(), "Reservation sweep finished");
}

/// Print the suggestion for a photo without creating a listing.
///
/// # Errors
///
/// Returns an error if analysis is not configured, the image cannot be read,
/// or the service fails.
pub async fn analyze(app: &App, path: &Path) -> CommandResult {
    let config = app
        .gemini
        .as_ref()
        .ok_or("GEMINI_API_KEY is not set, image analysis is disabled")?;
    let client = GeminiClient::new(config)?;
    let image = ImageUpload::from_path(path)?;

    let suggestion = client.analyze_image(&image).await?;
    info!(
        title = %suggestion.title,
        category = %suggestion.category,
        condition = %suggestion.condition,
        price = %suggestion.suggested_price,
        currency = %suggestion.currency,
        tags = ?suggestion.tags,
        "Suggestion"
    );
    info!(description = %suggestion.description, "Suggested description");
    Ok(())
}
