//! Gemini image analysis client.
//!
//! Sends one inline image plus a fixed appraisal prompt to the
//! `generateContent` endpoint in JSON response mode, then validates the
//! returned text against [`AnalysisResponse`](super::AnalysisResponse).

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use crate::config::GeminiConfig;
use crate::media::ImageUpload;

use super::error::{ApiErrorResponse, EnrichmentError};
use super::{ListingEnricher, ListingSuggestion, parse_analysis};

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

const APPRAISAL_PROMPT: &str = "\
You are an expert appraiser for a C2C marketplace in the UAE (United Arab Emirates).
Analyze the provided image of a used item to be sold.

1. Identify the item.
2. Write a catchy, professional title.
3. Write a detailed description highlighting key features and condition based on visual cues.
4. Categorize it into one of: Electronics, Furniture, Home Appliances, Fashion, Watches, Toys, Accessories, Others.
5. Suggest a fair market price in AED (United Arab Emirates Dirham).
6. Estimate the condition (New, Like New, Good, Fair).
7. Generate 3-5 relevant search tags.

Ensure the tone is helpful and sales-oriented.";

/// Gemini API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value, the
    /// endpoint URL cannot be built, or the HTTP client fails to initialize.
    pub fn new(config: &GeminiConfig) -> Result<Self, EnrichmentError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| EnrichmentError::Unauthorized(format!("invalid API key: {e}")))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let endpoint = config
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", config.model))
            .map_err(|e| EnrichmentError::Malformed(format!("invalid endpoint: {e}")))?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                endpoint,
                model: config.model.clone(),
            }),
        })
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Analyze an item photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API returns an error
    /// status, or the answer does not match the suggestion schema.
    #[instrument(skip(self, image), fields(model = %self.inner.model, mime = image.mime_type()))]
    pub async fn analyze_image(
        &self,
        image: &ImageUpload,
    ) -> Result<ListingSuggestion, EnrichmentError> {
        let request = build_request(image);

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Malformed(format!("unexpected response body: {e}")))?;
        let text = body.into_text()?;
        debug!(len = text.len(), "Received analysis");
        parse_analysis(&text)
    }
}

impl ListingEnricher for GeminiClient {
    async fn analyze(&self, image: &ImageUpload) -> Result<ListingSuggestion, EnrichmentError> {
        self.analyze_image(image).await
    }
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// `generateContent` response body (only the parts we read).
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, EnrichmentError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            Err(EnrichmentError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "category": { "type": "STRING" },
            "suggestedPrice": { "type": "NUMBER" },
            "currency": { "type": "STRING", "enum": ["AED"] },
            "condition": { "type": "STRING", "enum": ["New", "Like New", "Good", "Fair"] },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["title", "description", "category", "suggestedPrice", "condition", "tags"]
    })
}

fn build_request(image: &ImageUpload) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part {
                    inline_data: Some(InlineData {
                        mime_type: image.mime_type().to_owned(),
                        data: image.to_base64(),
                    }),
                    text: None,
                },
                Part {
                    inline_data: None,
                    text: Some(APPRAISAL_PROMPT.to_owned()),
                },
            ],
        }],
        generation_config: json!({
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }),
    }
}

async fn handle_error_status(status: StatusCode, response: reqwest::Response) -> EnrichmentError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return EnrichmentError::RateLimited(retry_after);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return EnrichmentError::Unauthorized("API key rejected".to_owned());
    }

    match response.text().await {
        Ok(body) => parse_error_body(status, &body),
        Err(e) => EnrichmentError::Http(e),
    }
}

fn parse_error_body(status: StatusCode, body: &str) -> EnrichmentError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map_or_else(|_| body.to_owned(), |api| api.error.message);
    EnrichmentError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn config() -> GeminiConfig {
        GeminiConfig {
            api_key: SecretString::from("test-key"),
            model: "gemini-3-flash-preview".to_string(),
            base_url: Url::parse("https://generativelanguage.googleapis.com").unwrap(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let image = ImageUpload::new("image/jpeg", vec![1, 2, 3]).unwrap();
        let body = serde_json::to_value(build_request(&image)).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "AQID");
        assert!(parts[0].get("text").is_none());
        assert!(parts[1]["text"].as_str().unwrap().contains("Home Appliances"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"]
                .as_array()
                .unwrap()
                .len(),
            6
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "{\"title\":\"Sony WH-1000XM4\",\"description\":\"Noise cancelling\"," },
                        { "text": "\"category\":\"Electronics\",\"suggestedPrice\":650,\"condition\":\"Like New\",\"tags\":[\"sony\"]}" }
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let suggestion = parse_analysis(&body.into_text().unwrap()).unwrap();
        assert_eq!(suggestion.title, "Sony WH-1000XM4");
        assert_eq!(suggestion.category, glokart_core::Category::Electronics);
    }

    #[test]
    fn test_empty_candidates() {
        let body: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(matches!(body.into_text(), Err(EnrichmentError::EmptyResponse)));

        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert!(matches!(body.into_text(), Err(EnrichmentError::EmptyResponse)));
    }

    #[test]
    fn test_parse_error_body() {
        let err = parse_error_body(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"Unable to process input image.","status":"INVALID_ARGUMENT"}}"#,
        );
        assert!(matches!(
            err,
            EnrichmentError::Api { status: 400, ref message } if message == "Unable to process input image."
        ));

        let err = parse_error_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            EnrichmentError::Api { status: 502, ref message } if message == "upstream down"
        ));
    }

    #[test]
    fn test_gemini_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GeminiClient>();
    }

    #[test]
    fn test_gemini_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiClient>();
    }
}
