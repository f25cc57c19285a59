//! Integration tests for reloading collections from storage.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use glokart_core::{ListingId, OfferAction, OfferId, UserId};
use glokart_integration_tests::{TestContext, start_time};
use glokart_marketplace::persistence::{LISTINGS_KEY, USERS_KEY};
use glokart_marketplace::{
    JsonFileStore, KeyValueStore, ListingDraft, ManualClock, MarketError, Marketplace,
    MarketplaceConfig,
};
use rust_decimal::Decimal;
use serde_json::Value;

#[test]
fn test_reload_reproduces_collections() {
    let ctx = TestContext::new();
    let mut market = ctx.open();
    let id = market
        .submit(
            ListingDraft {
                title: "Bosch washing machine".to_string(),
                price: Decimal::new(1_250_50, 2),
                images: vec!["https://img.example/bosch.jpg".to_string()],
                tags: vec!["Bosch".to_string(), "washer".to_string()],
                ..ListingDraft::default()
            },
            &UserId::new("user_1"),
        )
        .unwrap();
    market.approve(&id).unwrap();
    market
        .resolve_offer(&ListingId::new("2"), &OfferId::new("o1"), OfferAction::Accept)
        .unwrap();

    let reopened = ctx.open();
    assert_eq!(reopened.listings(), market.listings());
    assert_eq!(reopened.users(), market.users());
}

#[test]
fn test_stored_document_shape() {
    let ctx = TestContext::new();
    let mut market = ctx.open();
    market
        .resolve_offer(&ListingId::new("2"), &OfferId::new("o1"), OfferAction::Accept)
        .unwrap();

    let raw = ctx.store.load(LISTINGS_KEY).unwrap().unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    let rolex = &doc[1];
    assert_eq!(rolex["id"], "2");
    assert_eq!(rolex["status"], "offer_accepted");
    assert_eq!(rolex["reservedForEmail"], "user@glokart.ae");
    assert_eq!(rolex["price"], "42000");
    assert_eq!(rolex["category"], "Watches");
    assert!(rolex.get("buyer").is_none());

    let users: Value = serde_json::from_str(&ctx.store.load(USERS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(users[0]["phoneNumber"], "0501234567");
}

#[test]
fn test_corrupt_document_is_reported() {
    let ctx = TestContext::new();
    ctx.store.save(LISTINGS_KEY, "{ not json").unwrap();

    let err = Marketplace::open_with(
        Arc::clone(&ctx.store),
        &MarketplaceConfig::default(),
        Arc::new(ManualClock::new(start_time())),
    )
    .unwrap_err();

    assert!(matches!(err, MarketError::Persistence(_)));
}

#[test]
fn test_json_file_store_round_trip() {
    let dir = std::env::temp_dir().join(format!("glokart-it-{}", std::process::id()));
    let clock = Arc::new(ManualClock::new(start_time()));
    let config = MarketplaceConfig::default();

    {
        let store = JsonFileStore::open(dir.clone()).unwrap();
        let mut market = Marketplace::open_with(store, &config, clock.clone()).unwrap();
        market.login("user@glokart.ae").unwrap();
        market.buy(&ListingId::new("3"), &UserId::new("user_1")).unwrap();
    }

    let store = JsonFileStore::open(dir.clone()).unwrap();
    assert!(dir.join("products.json").exists());
    assert!(dir.join("currentUser.json").exists());
    let market = Marketplace::open_with(store, &config, clock).unwrap();
    assert!(market.listing(&ListingId::new("3")).unwrap().is_sold);
    assert_eq!(market.current_user().unwrap().name, "Demo User");

    std::fs::remove_dir_all(&dir).ok();
}
