//! Integration tests for registration, sessions and profile views.

#![allow(clippy::unwrap_used)]

use glokart_core::{ListingId, OfferAction, OfferId};
use glokart_integration_tests::TestContext;
use glokart_marketplace::{MarketError, RegistrationForm};
use rust_decimal::Decimal;

fn form(email: &str) -> RegistrationForm {
    RegistrationForm {
        name: "Omar Haddad".to_string(),
        email: email.to_string(),
        address: "Al Majaz, Sharjah".to_string(),
        phone_number: "0567778899".to_string(),
    }
}

#[test]
fn test_registration_rejects_duplicate_email() {
    let ctx = TestContext::new();
    let mut market = ctx.open();

    market.register(form("omar@example.ae")).unwrap();
    let err = market.register(form("Omar@Example.AE")).unwrap_err();

    assert!(matches!(err, MarketError::Validation(_)));
    assert_eq!(
        market.users().iter().filter(|u| u.email.as_str() == "omar@example.ae").count(),
        1
    );
}

#[test]
fn test_registered_user_sells_and_receives_offers() {
    let ctx = TestContext::new();
    let mut market = ctx.open();
    let seller = market.register(form("omar@example.ae")).unwrap();

    let id = market
        .submit(
            glokart_marketplace::ListingDraft {
                title: "Samsung 55\" QLED".to_string(),
                price: Decimal::from(1900),
                images: vec!["https://img.example/tv.jpg".to_string()],
                ..Default::default()
            },
            &seller,
        )
        .unwrap();
    assert_eq!(market.listing(&id).unwrap().location, "Sharjah, UAE");
    market.approve(&id).unwrap();

    let buyer = market.login("user@glokart.ae").unwrap().id.clone();
    assert!(matches!(
        market.make_offer(&id, &seller, Decimal::from(1500)),
        Err(MarketError::Validation(_))
    ));
    let offer = market.make_offer(&id, &buyer, Decimal::from(1700)).unwrap();

    market.login("omar@example.ae").unwrap();
    market.require_owner(&id).unwrap();
    let profile = market.profile(&seller).unwrap();
    assert_eq!(profile.my_listings.len(), 1);
    assert_eq!(profile.offers_received.len(), 1);

    market.resolve_offer(&id, &offer, OfferAction::Accept).unwrap();
    market.buy(&id, &buyer).unwrap();

    let profile = market.profile(&seller).unwrap();
    assert_eq!(profile.orders_received.len(), 1);
    assert!(profile.offers_received.is_empty());

    let buyer_profile = market.profile(&buyer).unwrap();
    assert_eq!(buyer_profile.orders_placed.len(), 1);
    assert_eq!(buyer_profile.orders_placed[0].price, Decimal::from(1700));
}

#[test]
fn test_session_and_wishlist_persist() {
    let ctx = TestContext::new();
    {
        let mut market = ctx.open();
        market.login("user@glokart.ae").unwrap();
        assert!(market.toggle_saved(&ListingId::new("1")).unwrap());
    }

    let mut market = ctx.open();
    let user = market.current_user().unwrap();
    assert!(user.saved_listing_ids.contains(&ListingId::new("1")));

    market.logout();
    assert!(ctx.open().current_user().is_none());
}

#[test]
fn test_admin_console_login() {
    let ctx = TestContext::new();
    let mut market = ctx.open();

    assert!(matches!(
        market.admin_login("admin", "letmein"),
        Err(MarketError::Unauthorized(_))
    ));
    let admin = market.admin_login("admin", "admin123").unwrap().id.clone();

    // Admins moderate but can also act on any listing.
    market.require_owner(&ListingId::new("2")).unwrap();
    market
        .resolve_offer(&ListingId::new("2"), &OfferId::new("o1"), OfferAction::Reject)
        .unwrap();
    assert_eq!(market.current_user().unwrap().id, admin);
}
