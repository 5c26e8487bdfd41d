//! Relay endpoint
//!
//! Implements POST / — the single entry point of the relay. An explicit
//! `model` code selects one provider and returns its result flattened into
//! the response; no `model` fans the request out to every provider and
//! returns a per-provider result map.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::schemas::{AdapterResult, GenerateRequest, PromptRequest, ProviderCode};
use crate::server::state::AppState;
use crate::utils::truncate_with_suffix;

/// Prompts can be arbitrarily long; log fields are capped at this many chars.
const LOGGED_PROMPT_LIMIT: usize = 120;

/// Echo of the effective request, so the default-prompt substitution is
/// observable to the caller.
#[derive(Debug, Serialize)]
pub struct EchoedRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'static str>,
}

/// Response for the single-provider path
#[derive(Debug, Serialize)]
pub struct SingleProviderResponse {
    pub model: ProviderCode,
    pub name: &'static str,
    pub request: EchoedRequest,
    #[serde(flatten)]
    pub result: AdapterResult,
}

/// Response for the fan-out path
#[derive(Debug, Serialize)]
pub struct FanOutResponse {
    pub ok: bool,
    pub request: EchoedRequest,
    pub results: BTreeMap<ProviderCode, AdapterResult>,
}

/// POST /
///
/// Body: `{ prompt?, image_url?, model? }`. A blank prompt is replaced with
/// the configured default; an unrecognized `model` is rejected with 400
/// before any adapter runs.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = PromptRequest::normalize(body, &state.settings.default_prompt)?;

    tracing::debug!(
        prompt = %truncate_with_suffix(&request.prompt, LOGGED_PROMPT_LIMIT, "..."),
        has_image = request.image_url.is_some(),
        model = request.provider.map(|code| code.code()).unwrap_or("all"),
        "Relay request normalized"
    );

    match request.provider {
        Some(code) => {
            let result = state.dispatcher.dispatch_single(code, &request).await;
            Ok(Json(SingleProviderResponse {
                model: code,
                name: code.display_name(),
                request: EchoedRequest {
                    prompt: request.prompt,
                    image_url: if code.accepts_image() {
                        request.image_url
                    } else {
                        None
                    },
                    model: None,
                },
                result,
            })
            .into_response())
        }
        None => {
            let results = state.dispatcher.fan_out(&request).await;
            Ok(Json(FanOutResponse {
                ok: true,
                request: EchoedRequest {
                    prompt: request.prompt,
                    image_url: request.image_url,
                    model: Some("all"),
                },
                results,
            })
            .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_provider_response_is_flat() {
        let response = SingleProviderResponse {
            model: ProviderCode::Gemini,
            name: ProviderCode::Gemini.display_name(),
            request: EchoedRequest {
                prompt: "hi".to_string(),
                image_url: None,
                model: None,
            },
            result: AdapterResult::success("answer"),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["model"], "g");
        assert_eq!(value["name"], "GEMINI");
        assert_eq!(value["request"]["prompt"], "hi");
        // AdapterResult fields flatten into the top level
        assert_eq!(value["ok"], true);
        assert_eq!(value["text"], "answer");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_fan_out_response_keys_are_short_codes() {
        let mut results = BTreeMap::new();
        results.insert(ProviderCode::Gemini, AdapterResult::success("a"));
        results.insert(ProviderCode::Deepseek, AdapterResult::failure("down"));

        let response = FanOutResponse {
            ok: true,
            request: EchoedRequest {
                prompt: "hi".to_string(),
                image_url: Some("https://x.io/shot.png".to_string()),
                model: Some("all"),
            },
            results,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["request"]["model"], "all");
        assert_eq!(value["results"]["g"]["ok"], true);
        assert_eq!(value["results"]["d"]["ok"], false);
        assert!(value["results"].get("c").is_none());
    }
}
