//! Integration tests for listing auto-fill through a stub analysis service.

#![allow(clippy::unwrap_used)]

use glokart_core::{Category, Condition, Currency, ListingStatus, UserId};
use glokart_integration_tests::TestContext;
use glokart_marketplace::enrichment::parse_analysis;
use glokart_marketplace::{
    EnrichmentError, ImageUpload, ListingDraft, ListingEnricher, ListingSuggestion, autofill,
};
use rust_decimal::Decimal;
use serde_json::json;

/// Answers every image with the same model output.
struct StubAnalyzer {
    answer: String,
}

impl ListingEnricher for StubAnalyzer {
    async fn analyze(&self, _image: &ImageUpload) -> Result<ListingSuggestion, EnrichmentError> {
        parse_analysis(&self.answer)
    }
}

/// Always fails like an overloaded service.
struct Unavailable;

impl ListingEnricher for Unavailable {
    async fn analyze(&self, _image: &ImageUpload) -> Result<ListingSuggestion, EnrichmentError> {
        Err(EnrichmentError::RateLimited(30))
    }
}

fn photo_draft() -> ListingDraft {
    let photo = ImageUpload::new("image/png", vec![0x89, b'P', b'N', b'G']).unwrap();
    ListingDraft {
        images: vec![photo.to_data_uri()],
        ..ListingDraft::default()
    }
}

#[tokio::test]
async fn test_autofilled_draft_can_be_submitted() {
    let analyzer = StubAnalyzer {
        answer: json!({
            "title": "LG Inverter Split AC 1.5 Ton",
            "description": "Quiet inverter unit, removed during renovation.",
            "category": "home appliances",
            "suggestedPrice": 1450.5,
            "currency": "AED",
            "condition": "Good",
            "tags": ["lg", "air conditioner", "inverter"]
        })
        .to_string(),
    };
    let mut draft = photo_draft();

    let suggestion = autofill(&analyzer, &mut draft).await.unwrap();
    assert_eq!(suggestion.currency, Currency::AED);
    assert_eq!(draft.category, Category::HomeAppliances);
    assert_eq!(draft.condition, Condition::Good);
    assert_eq!(draft.price, Decimal::new(1_450_50, 2));

    let ctx = TestContext::new();
    let mut market = ctx.open();
    let id = market.submit(draft, &UserId::new("user_1")).unwrap();
    let listing = market.listing(&id).unwrap();
    assert_eq!(listing.status, ListingStatus::Pending);
    assert_eq!(listing.tags, vec!["lg", "air conditioner", "inverter"]);
    assert!(listing.cover_image().unwrap().starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_unknown_category_falls_back_to_others() {
    let analyzer = StubAnalyzer {
        answer: json!({
            "title": "Yoga mat",
            "description": "Barely used.",
            "category": "Sports & Fitness",
            "suggestedPrice": 60,
            "condition": "Like New",
            "tags": ["yoga"]
        })
        .to_string(),
    };
    let mut draft = photo_draft();

    autofill(&analyzer, &mut draft).await.unwrap();

    assert_eq!(draft.category, Category::Others);
    assert_eq!(draft.condition, Condition::LikeNew);
}

#[tokio::test]
async fn test_failures_fall_back_to_manual_entry() {
    let malformed = StubAnalyzer {
        answer: json!({ "title": "Chair", "condition": "Mint" }).to_string(),
    };

    for result in [
        autofill(&malformed, &mut photo_draft()).await,
        autofill(&Unavailable, &mut photo_draft()).await,
    ] {
        let err = result.unwrap_err();
        assert!(err.is_degradable(), "{err}");
    }

    let mut draft = photo_draft();
    draft.title = "Office chair".to_string();
    draft.price = Decimal::from(150);
    let before = draft.clone();
    autofill(&Unavailable, &mut draft).await.unwrap_err();
    assert_eq!(draft, before);

    let ctx = TestContext::new();
    let mut market = ctx.open();
    market.submit(draft, &UserId::new("user_1")).unwrap();
}
