//! Relay wire contract
//!
//! This module defines the inbound request shape for the relay endpoint,
//! the normalized request passed to the dispatcher, and the result envelope
//! every provider adapter produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Provider Codes
// ============================================================================

/// Closed set of provider identifiers accepted in the `model` field.
///
/// The short codes ("g", "c", "d") are the wire format; invalid codes are
/// rejected at parse time and never reach an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProviderCode {
    #[serde(rename = "g")]
    Gemini,
    #[serde(rename = "c")]
    ChatGpt,
    #[serde(rename = "d")]
    Deepseek,
}

impl ProviderCode {
    /// All known providers, in fan-out registration order.
    pub const ALL: [ProviderCode; 3] = [
        ProviderCode::Gemini,
        ProviderCode::ChatGpt,
        ProviderCode::Deepseek,
    ];

    /// The short wire code for this provider.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderCode::Gemini => "g",
            ProviderCode::ChatGpt => "c",
            ProviderCode::Deepseek => "d",
        }
    }

    /// Human-readable display name, echoed in single-provider responses.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderCode::Gemini => "GEMINI",
            ProviderCode::ChatGpt => "CHATGPT",
            ProviderCode::Deepseek => "DEEPSEEK",
        }
    }

    /// Whether this provider consumes an inlined image.
    pub fn accepts_image(&self) -> bool {
        !matches!(self, ProviderCode::Deepseek)
    }
}

impl fmt::Display for ProviderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ProviderCode {
    type Err = UnsupportedProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g" => Ok(ProviderCode::Gemini),
            "c" => Ok(ProviderCode::ChatGpt),
            "d" => Ok(ProviderCode::Deepseek),
            other => Err(UnsupportedProviderError {
                code: other.to_string(),
            }),
        }
    }
}

/// Error for a `model` value outside the closed provider set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unsupported model '{code}'. Use 'g', 'c' or 'd'.")]
pub struct UnsupportedProviderError {
    pub code: String,
}

// ============================================================================
// Requests
// ============================================================================

/// Inbound JSON body for POST /.
///
/// All fields are optional; a blank prompt is replaced server-side with the
/// configured default, and an absent `model` selects the fan-out path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    pub model: Option<String>,
}

/// Normalized request handed to the dispatcher. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip)]
    pub provider: Option<ProviderCode>,
}

impl PromptRequest {
    /// Normalize an inbound request.
    ///
    /// Trims the prompt and substitutes `default_prompt` when it is empty or
    /// whitespace-only; empty `image_url` values collapse to `None`. An
    /// explicit but unrecognized `model` is rejected here, before any adapter
    /// is touched.
    pub fn normalize(
        req: GenerateRequest,
        default_prompt: &str,
    ) -> Result<Self, UnsupportedProviderError> {
        let prompt = req
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(default_prompt)
            .to_string();

        let image_url = req.image_url.filter(|u| !u.trim().is_empty());

        let provider = match req.model.as_deref() {
            Some(code) => Some(code.parse::<ProviderCode>()?),
            None => None,
        };

        Ok(Self {
            prompt,
            image_url,
            provider,
        })
    }
}

// ============================================================================
// Result Envelope
// ============================================================================

/// Normalized outcome of one adapter invocation.
///
/// Adapters never fail with an error type; every failure mode is folded into
/// `ok: false` here so one provider cannot abort its siblings.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterResult {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Diagnostic payload accompanying a failure (e.g. the upstream body).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,

    /// Diagnostic note for successful-but-empty outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Provider-specific metadata (finish reason, usage, latency).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl AdapterResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: Some(text.into()),
            error: None,
            detail: None,
            note: None,
            meta: None,
        }
    }

    /// Successful invocation that produced no text. Distinct from a failure:
    /// the provider answered, it just generated nothing.
    pub fn empty(note: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: Some(String::new()),
            error: None,
            detail: None,
            note: Some(note.into()),
            meta: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: None,
            error: Some(error.into()),
            detail: None,
            note: None,
            meta: None,
        }
    }

    pub fn failure_with_detail(error: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            ok: false,
            text: None,
            error: Some(error.into()),
            detail: Some(detail),
            note: None,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}
