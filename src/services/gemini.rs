//! Gemini provider adapter
//!
//! Image-capable generative adapter wrapping the Google Gemini REST API.
//! When the request carries an image URL, the image is downloaded, base64
//! encoded, and inlined next to the text prompt.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::Settings;
use crate::schemas::gemini::{extract_candidates, GeminiError, GeminiRequest};
use crate::schemas::AdapterResult;
use crate::services::dispatcher::ProviderAdapter;
use crate::services::image::fetch_image;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Adapter for the Gemini generateContent API
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
    base_url: Option<String>,
    model: String,
    generation_timeout: Duration,
    image_fetch_timeout: Duration,
}

impl GeminiService {
    pub fn new(settings: &Settings, client: Client) -> Self {
        Self {
            client,
            api_key: settings.gemini_api_key.clone(),
            base_url: settings.gemini_base_url.clone(),
            model: settings.gemini_model.clone(),
            generation_timeout: Duration::from_secs(settings.generation_timeout_seconds),
            image_fetch_timeout: Duration::from_secs(settings.image_fetch_timeout_seconds),
        }
    }

    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(GEMINI_API_BASE)
    }

    async fn build_request(
        &self,
        prompt: &str,
        image_url: Option<&str>,
    ) -> Result<GeminiRequest, AdapterResult> {
        let Some(url) = image_url else {
            return Ok(GeminiRequest::text_only(prompt));
        };

        match fetch_image(&self.client, url, self.image_fetch_timeout).await {
            Ok(payload) => Ok(GeminiRequest::with_image(
                prompt,
                payload.mime_type,
                payload.data,
            )),
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "Image fetch failed");
                Err(AdapterResult::failure(format!(
                    "Gemini error: {err}"
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for GeminiService {
    async fn invoke(&self, prompt: &str, image_url: Option<&str>) -> AdapterResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return AdapterResult::failure("GEMINI_API_KEY is not configured");
        };

        let request = match self.build_request(prompt, image_url).await {
            Ok(request) => request,
            Err(failure) => return failure,
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url(),
            self.model
        );

        tracing::debug!(model = %self.model, has_image = image_url.is_some(), "Calling Gemini generateContent API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(self.generation_timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => return AdapterResult::failure(format!("Gemini error: {err}")),
        };

        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            // Prefer the structured error message when the body parses.
            if let Ok(gemini_error) = serde_json::from_str::<GeminiError>(&body_text) {
                return AdapterResult::failure(format!(
                    "Gemini error: {} - {}",
                    gemini_error.error.code, gemini_error.error.message
                ));
            }
            return AdapterResult::failure(format!("Gemini error: {} - {}", status, body_text));
        }

        let body: serde_json::Value = match serde_json::from_str(&body_text) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "Failed to parse Gemini response");
                return AdapterResult::failure(format!("Gemini error: unparseable response: {err}"));
            }
        };

        let candidates = extract_candidates(&body);
        if candidates.is_empty() {
            // The provider answered but generated nothing; keep the raw body
            // around so the caller can see why.
            tracing::warn!("Gemini returned no candidates");
            return AdapterResult::empty("No candidates").with_meta(json!({ "debug": body }));
        }

        let text = candidates[0].joined_text();
        let finish_reason = candidates[0].finish_reason.clone();
        AdapterResult::success(text).with_meta(json!({ "finishReason": finish_reason }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(api_key: Option<&str>) -> GeminiService {
        let settings = Settings {
            gemini_api_key: api_key.map(str::to_string),
            ..Default::default()
        };
        GeminiService::new(&settings, Client::new())
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let result = service(None).invoke("hi", None).await;
        assert!(!result.ok);
        assert!(result.error.unwrap().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_image_url_fails_adapter() {
        let svc = GeminiService {
            image_fetch_timeout: Duration::from_millis(250),
            ..service(Some("test-key"))
        };
        let result = svc
            .invoke("describe", Some("http://192.0.2.1:9/shot.png"))
            .await;
        assert!(!result.ok);
        assert!(result.error.unwrap().contains("Gemini error"));
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(service(Some("k")).base_url(), GEMINI_API_BASE);
    }
}
