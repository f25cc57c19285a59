//! Listing auto-fill from an item photo.
//!
//! A [`ListingEnricher`] looks at the first uploaded image and suggests a
//! title, description, category, price, condition and tags. Answers are
//! checked against a strict schema at this boundary; anything that does not
//! fit becomes [`EnrichmentError::Malformed`]. Failures never block a
//! listing: the seller keeps whatever they typed and fills the rest in.

pub mod error;
pub mod gemini;

use std::future::Future;

use glokart_core::{Category, Condition, Currency};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::media::ImageUpload;
use crate::model::ListingDraft;

pub use error::EnrichmentError;
pub use gemini::GeminiClient;

/// Something that can turn an item photo into listing fields.
pub trait ListingEnricher {
    /// Analyze one image.
    fn analyze(
        &self,
        image: &ImageUpload,
    ) -> impl Future<Output = Result<ListingSuggestion, EnrichmentError>> + Send;
}

/// Validated listing fields suggested for a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSuggestion {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub suggested_price: Decimal,
    pub currency: Currency,
    pub condition: Condition,
    pub tags: Vec<String>,
}

impl ListingSuggestion {
    /// Overwrite the draft's descriptive fields with the suggestion.
    ///
    /// Images, location and item details are left as the seller set them.
    pub fn apply_to(&self, draft: &mut ListingDraft) {
        draft.title.clone_from(&self.title);
        draft.description.clone_from(&self.description);
        draft.price = self.suggested_price;
        draft.category = self.category;
        draft.condition = self.condition;
        draft.tags.clone_from(&self.tags);
    }
}

/// Answer schema requested from the analysis model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub title: String,
    pub description: String,
    pub category: String,
    pub suggested_price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub condition: String,
    pub tags: Vec<String>,
}

impl TryFrom<AnalysisResponse> for ListingSuggestion {
    type Error = EnrichmentError;

    fn try_from(raw: AnalysisResponse) -> Result<Self, Self::Error> {
        let title = raw.title.trim().to_owned();
        if title.is_empty() {
            return Err(EnrichmentError::Malformed("empty title".to_owned()));
        }

        let suggested_price = Decimal::try_from(raw.suggested_price)
            .map_err(|e| EnrichmentError::Malformed(format!("suggestedPrice: {e}")))?
            .round_dp(2);
        if suggested_price < Decimal::ZERO {
            return Err(EnrichmentError::Malformed(format!(
                "negative suggestedPrice {suggested_price}"
            )));
        }

        let currency = match raw.currency.as_deref().map(str::trim) {
            None | Some("" | "AED") => Currency::AED,
            Some(other) => {
                return Err(EnrichmentError::Malformed(format!(
                    "unsupported currency {other}"
                )));
            }
        };

        let condition: Condition = raw
            .condition
            .parse()
            .map_err(|e: glokart_core::UnknownLabel| EnrichmentError::Malformed(e.to_string()))?;

        Ok(Self {
            title,
            description: raw.description.trim().to_owned(),
            category: Category::from_label_or_default(&raw.category),
            suggested_price,
            currency,
            condition,
            tags: raw
                .tags
                .into_iter()
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect(),
        })
    }
}

/// Decode the model's JSON answer into a suggestion.
///
/// # Errors
///
/// Returns `EnrichmentError::Malformed` if the text is not JSON matching
/// [`AnalysisResponse`] or fails validation.
pub fn parse_analysis(text: &str) -> Result<ListingSuggestion, EnrichmentError> {
    let raw: AnalysisResponse = serde_json::from_str(text.trim())
        .map_err(|e| EnrichmentError::Malformed(e.to_string()))?;
    ListingSuggestion::try_from(raw)
}

/// Fill a draft from the analysis of its cover image.
///
/// On success the draft is updated in place. On failure the draft is left
/// exactly as it was and the error is returned for the caller to report;
/// `MarketError::is_degradable` tells whether manual entry should continue.
///
/// # Errors
///
/// Returns `MarketError::Validation` if the draft has no uploaded cover
/// image, and `MarketError::ExternalService` if the analysis fails.
pub async fn autofill<E: ListingEnricher>(
    enricher: &E,
    draft: &mut ListingDraft,
) -> crate::Result<ListingSuggestion> {
    let cover = draft
        .images
        .first()
        .ok_or_else(|| crate::MarketError::Validation("upload an image first".to_owned()))?;
    let image = ImageUpload::from_data_uri(cover)?;

    match enricher.analyze(&image).await {
        Ok(suggestion) => {
            info!(
                category = %suggestion.category,
                price = %suggestion.suggested_price,
                "Applied image analysis to draft"
            );
            suggestion.apply_to(draft);
            Ok(suggestion)
        }
        Err(e) => {
            warn!(error = %e, "Image analysis failed, falling back to manual entry");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::MarketError;

    struct Canned(Result<ListingSuggestion, fn() -> EnrichmentError>);

    impl ListingEnricher for Canned {
        async fn analyze(&self, _image: &ImageUpload) -> Result<ListingSuggestion, EnrichmentError> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn suggestion() -> ListingSuggestion {
        parse_analysis(
            &json!({
                "title": "IKEA Poäng Armchair",
                "description": "Comfortable bentwood armchair.",
                "category": "Furniture",
                "suggestedPrice": 250,
                "currency": "AED",
                "condition": "Good",
                "tags": ["ikea", "chair", " "]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn uploaded_draft() -> ListingDraft {
        let image = ImageUpload::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]).unwrap();
        ListingDraft {
            images: vec![image.to_data_uri()],
            ..ListingDraft::default()
        }
    }

    #[test]
    fn test_parse_analysis() {
        let s = suggestion();
        assert_eq!(s.category, Category::Furniture);
        assert_eq!(s.suggested_price, Decimal::from(250));
        assert_eq!(s.condition, Condition::Good);
        assert_eq!(s.tags, vec!["ikea", "chair"]);
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let s = parse_analysis(
            &json!({
                "title": "Mountain bike",
                "description": "",
                "category": "Sports",
                "suggestedPrice": 799.999,
                "condition": "Fair",
                "tags": []
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(s.category, Category::Others);
        assert_eq!(s.suggested_price, Decimal::new(800_00, 2));
        assert_eq!(s.currency, Currency::AED);
    }

    #[test]
    fn test_malformed_answers() {
        let missing_tags = json!({
            "title": "x", "description": "", "category": "Toys",
            "suggestedPrice": 1, "condition": "New"
        });
        let bad_condition = json!({
            "title": "x", "description": "", "category": "Toys",
            "suggestedPrice": 1, "condition": "Mint", "tags": []
        });
        let wrong_currency = json!({
            "title": "x", "description": "", "category": "Toys",
            "suggestedPrice": 1, "currency": "USD", "condition": "New", "tags": []
        });
        let string_price = json!({
            "title": "x", "description": "", "category": "Toys",
            "suggestedPrice": "cheap", "condition": "New", "tags": []
        });
        for answer in [missing_tags, bad_condition, wrong_currency, string_price] {
            let err = parse_analysis(&answer.to_string()).unwrap_err();
            assert!(matches!(err, EnrichmentError::Malformed(_)), "{answer}");
        }
        assert!(parse_analysis("not json").is_err());
    }

    #[tokio::test]
    async fn test_autofill_applies_suggestion() {
        let mut draft = uploaded_draft();
        let enricher = Canned(Ok(suggestion()));

        autofill(&enricher, &mut draft).await.unwrap();

        assert_eq!(draft.title, "IKEA Poäng Armchair");
        assert_eq!(draft.category, Category::Furniture);
        assert_eq!(draft.price, Decimal::from(250));
        assert_eq!(draft.images.len(), 1);
    }

    #[tokio::test]
    async fn test_autofill_failure_leaves_draft_untouched() {
        let mut draft = uploaded_draft();
        draft.title = "My chair".to_string();
        let before = draft.clone();
        let enricher = Canned(Err(|| EnrichmentError::EmptyResponse));

        let err = autofill(&enricher, &mut draft).await.unwrap_err();

        assert!(err.is_degradable());
        assert_eq!(draft, before);
    }

    #[tokio::test]
    async fn test_autofill_needs_uploaded_image() {
        let enricher = Canned(Ok(suggestion()));

        let mut empty = ListingDraft::default();
        let err = autofill(&enricher, &mut empty).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));

        let mut linked = ListingDraft {
            images: vec!["https://picsum.photos/seed/rug/800/600".to_string()],
            ..ListingDraft::default()
        };
        let err = autofill(&enricher, &mut linked).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }
}
