//! Demo catalog installed into empty storage.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use glokart_core::{
    Category, Condition, Currency, Email, ListingId, ListingStatus, OfferId, OfferStatus, UserId,
};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::{Listing, ListingDetails, Offer, Party, User};

/// Demo buyer/seller account.
pub const DEMO_USER_EMAIL: &str = "user@glokart.ae";
/// Built-in admin account.
pub const ADMIN_EMAIL: &str = "admin@glokart.ae";

fn party(name: &str, email: &str) -> Result<Party> {
    Ok(Party {
        name: name.to_owned(),
        email: Email::parse(email)?,
    })
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| (*t).to_owned()).collect()
}

/// Starter users: one demo seller and the system admin.
///
/// # Errors
///
/// Only fails if a built-in email is malformed.
pub fn users() -> Result<Vec<User>> {
    Ok(vec![
        User {
            id: UserId::new("user_1"),
            name: "Demo User".to_owned(),
            email: Email::parse(DEMO_USER_EMAIL)?,
            address: "Downtown Dubai".to_owned(),
            phone_number: "0501234567".to_owned(),
            is_seller: true,
            is_admin: false,
            saved_listing_ids: BTreeSet::new(),
        },
        User {
            id: UserId::new("admin_1"),
            name: "System Admin".to_owned(),
            email: Email::parse(ADMIN_EMAIL)?,
            address: "GloKart HQ".to_owned(),
            phone_number: "0000000000".to_owned(),
            is_seller: false,
            is_admin: true,
            saved_listing_ids: BTreeSet::new(),
        },
    ])
}

/// Starter listings, all approved; the watch carries one pending offer
/// from the demo user.
///
/// # Errors
///
/// Only fails if a built-in email is malformed.
pub fn listings(now: DateTime<Utc>) -> Result<Vec<Listing>> {
    let macbook = Listing {
        id: ListingId::new("1"),
        title: "Apple MacBook Pro M1 2020".to_owned(),
        description: "Pristine condition MacBook Pro M1. 8GB RAM, 256GB SSD. Battery health \
                      98%. Comes with original box and charger. Used for light office work only."
            .to_owned(),
        price: Decimal::from(3200),
        currency: Currency::AED,
        category: Category::Electronics,
        condition: Condition::LikeNew,
        tags: tags(&["apple", "laptop", "macbook"]),
        images: vec![
            "https://picsum.photos/seed/macbook/800/600".to_owned(),
            "https://picsum.photos/seed/macbook2/800/600".to_owned(),
        ],
        location: "Dubai Marina, Dubai".to_owned(),
        seller: party("Ahmed Al-Farsi", "ahmed@glokart.ae")?,
        posted_at: now - TimeDelta::hours(2),
        status: ListingStatus::Approved,
        is_sold: false,
        buyer: None,
        rejection_reason: None,
        details: ListingDetails {
            brand: Some("Apple".to_owned()),
            purchase_year: Some("2020".to_owned()),
            dimensions: None,
            specifications: Some("8GB RAM, 256GB SSD".to_owned()),
        },
        offers: Vec::new(),
        reserved_for_email: None,
        offer_accepted_at: None,
        list_price: None,
    };

    let rolex = Listing {
        id: ListingId::new("2"),
        title: "Rolex Submariner Date".to_owned(),
        description: "Authentic Rolex Submariner. Excellent condition with box and papers. \
                      2021 Model. Barely worn."
            .to_owned(),
        price: Decimal::from(45_000),
        category: Category::Watches,
        tags: tags(&["rolex", "watch", "luxury"]),
        images: vec!["https://picsum.photos/seed/rolex/800/600".to_owned()],
        location: "Downtown Dubai, UAE".to_owned(),
        seller: party("Sarah Smith", "sarah@glokart.ae")?,
        posted_at: now - TimeDelta::days(1),
        details: ListingDetails {
            brand: Some("Rolex".to_owned()),
            purchase_year: Some("2021".to_owned()),
            ..ListingDetails::default()
        },
        offers: vec![Offer {
            id: OfferId::new("o1"),
            bidder: party("Demo User", DEMO_USER_EMAIL)?,
            amount: Decimal::from(42_000),
            placed_at: now - TimeDelta::minutes(10),
            status: OfferStatus::Pending,
        }],
        ..macbook.clone()
    };

    let rug = Listing {
        id: ListingId::new("3"),
        title: "Vintage Persian Rug".to_owned(),
        description: "Authentic handmade Persian rug. 2x3 meters. Deep reds and blues. \
                      Family heirloom, selling due to moving."
            .to_owned(),
        price: Decimal::from(1200),
        category: Category::Furniture,
        condition: Condition::Good,
        tags: tags(&["rug", "decor", "vintage"]),
        images: vec!["https://picsum.photos/seed/rug/800/600".to_owned()],
        location: "Al Khalidiya, Abu Dhabi".to_owned(),
        seller: party("Khalid Bin S.", "khalid@glokart.ae")?,
        posted_at: now - TimeDelta::days(3),
        details: ListingDetails {
            dimensions: Some("200cm x 300cm".to_owned()),
            ..ListingDetails::default()
        },
        ..macbook.clone()
    };

    Ok(vec![macbook, rolex, rug])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog() {
        let listings = listings(Utc::now()).unwrap();
        assert_eq!(listings.len(), 3);
        assert!(listings.iter().all(Listing::is_public));

        let rolex = listings.iter().find(|l| l.id.as_str() == "2").unwrap();
        assert_eq!(rolex.offers.len(), 1);
        assert_eq!(rolex.condition, Condition::LikeNew);
    }

    #[test]
    fn test_seed_users() {
        let users = users().unwrap();
        assert_eq!(users.iter().filter(|u| u.is_admin).count(), 1);
        assert!(users.iter().any(|u| u.email.as_str() == DEMO_USER_EMAIL));
    }
}
