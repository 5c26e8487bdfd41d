//! Deepseek provider adapter (via OpenRouter)
//!
//! Text-only chat adapter wrapping the OpenRouter chat-completions API.
//! Image references are ignored upstream of this adapter; it only ever
//! receives the prompt.

use reqwest::Client;
use std::time::Duration;

use crate::config::Settings;
use crate::schemas::openrouter::{ChatCompletionRequest, ChatCompletionResponse};
use crate::schemas::AdapterResult;
use crate::services::dispatcher::ProviderAdapter;
use crate::utils::truncate_str;

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Response bodies with an unexpected shape are stringified and capped at
/// this many characters instead of being treated as failures.
const FALLBACK_TEXT_LIMIT: usize = 2000;

/// Adapter for the OpenRouter chat completion API
pub struct OpenRouterService {
    client: Client,
    api_key: Option<String>,
    base_url: Option<String>,
    model: String,
    generation_timeout: Duration,
}

impl OpenRouterService {
    pub fn new(settings: &Settings, client: Client) -> Self {
        Self {
            client,
            api_key: settings.openrouter_api_key.clone(),
            base_url: settings.openrouter_base_url.clone(),
            model: settings.openrouter_model.clone(),
            generation_timeout: Duration::from_secs(settings.generation_timeout_seconds),
        }
    }

    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENROUTER_API_BASE)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OpenRouterService {
    async fn invoke(&self, prompt: &str, _image_url: Option<&str>) -> AdapterResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return AdapterResult::failure("OPENROUTER_API_KEY is not configured");
        };

        let request = ChatCompletionRequest::user_prompt(&self.model, prompt);
        let url = format!("{}/chat/completions", self.base_url());

        tracing::debug!(model = %self.model, "Calling OpenRouter chat completions API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(self.generation_timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                return AdapterResult::failure_with_detail(
                    "Deepseek error",
                    serde_json::Value::String(err.to_string()),
                )
            }
        };

        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let detail = serde_json::from_str::<serde_json::Value>(&body_text)
                .unwrap_or(serde_json::Value::String(body_text));
            return AdapterResult::failure_with_detail("Deepseek error", detail);
        }

        match serde_json::from_str::<ChatCompletionResponse>(&body_text) {
            Ok(parsed) => {
                // An empty content string counts as "no content": fall back
                // to the raw body rather than returning nothing.
                let text = match parsed.first_content().filter(|content| !content.is_empty()) {
                    Some(content) => content.to_string(),
                    // Unexpected shape: degrade to the raw body rather than
                    // failing a request the provider actually answered.
                    None => truncate_str(&body_text, FALLBACK_TEXT_LIMIT).to_string(),
                };
                let result = AdapterResult::success(text);
                match parsed.usage {
                    Some(usage) => result.with_meta(usage),
                    None => result,
                }
            }
            Err(_) => {
                AdapterResult::success(truncate_str(&body_text, FALLBACK_TEXT_LIMIT).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(api_key: Option<&str>) -> OpenRouterService {
        let settings = Settings {
            openrouter_api_key: api_key.map(str::to_string),
            ..Default::default()
        };
        OpenRouterService::new(&settings, Client::new())
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let result = service(None).invoke("hi", None).await;
        assert!(!result.ok);
        assert!(result.error.unwrap().contains("OPENROUTER_API_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_detail() {
        let svc = OpenRouterService {
            base_url: Some("http://192.0.2.1:9".to_string()),
            generation_timeout: Duration::from_millis(250),
            ..service(Some("test-key"))
        };
        let result = svc.invoke("hi", None).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("Deepseek error"));
        assert!(result.detail.is_some());
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(service(Some("k")).base_url(), OPENROUTER_API_BASE);
    }

    /// Spawn a local server answering POST /chat/completions with `body`.
    async fn stub_server(body: String) -> String {
        let app = axum::Router::new().route(
            "/chat/completions",
            axum::routing::post(move || async move { body }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_stringified_and_capped() {
        let base_url = stub_server("x".repeat(FALLBACK_TEXT_LIMIT + 600)).await;
        let svc = OpenRouterService {
            base_url: Some(base_url),
            ..service(Some("test-key"))
        };

        let result = svc.invoke("hi", None).await;
        assert!(result.ok);
        let text = result.text.unwrap();
        assert_eq!(text.chars().count(), FALLBACK_TEXT_LIMIT);
        assert!(text.starts_with("xxx"));
    }

    #[tokio::test]
    async fn test_empty_content_falls_back_to_raw_body() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        let base_url = stub_server(body.to_string()).await;
        let svc = OpenRouterService {
            base_url: Some(base_url),
            ..service(Some("test-key"))
        };

        let result = svc.invoke("hi", None).await;
        assert!(result.ok);
        // The raw body, not the empty content string.
        assert_eq!(result.text.as_deref(), Some(body));
    }

    #[tokio::test]
    async fn test_missing_choices_falls_back_to_raw_body() {
        let body = r#"{"id":"gen-1","object":"chat.completion"}"#;
        let base_url = stub_server(body.to_string()).await;
        let svc = OpenRouterService {
            base_url: Some(base_url),
            ..service(Some("test-key"))
        };

        let result = svc.invoke("hi", None).await;
        assert!(result.ok);
        assert_eq!(result.text.as_deref(), Some(body));
    }
}
