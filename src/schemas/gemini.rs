//! Google Gemini API schema definitions
//!
//! Request and response structures for the Gemini `generateContent` REST API,
//! plus a defensive candidate extractor: the response envelope has shifted
//! across API revisions, so candidates are located by probing the shapes
//! observed in the wild rather than assuming a single layout.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Gemini API request body for generateContent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// The content of the conversation
    pub contents: Vec<GeminiContent>,

    /// Generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GeminiRequest {
    /// Build a single-turn, text-only request.
    pub fn text_only(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: None,
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig::text()),
        }
    }

    /// Build a single-turn request carrying the prompt and an inlined image.
    pub fn with_image(
        prompt: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: None,
                parts: vec![Part::text(prompt), Part::inline_data(mime_type, data)],
            }],
            generation_config: Some(GenerationConfig::text()),
        }
    }
}

/// Content block containing an optional role and parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role: "user" or "model"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Content parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A part of the content - either text or inline binary data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Inline data (images, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// Create an inline data part
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

/// Inline data for images and other binary content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,

    /// Base64-encoded data
    pub data: String,
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Response modalities (e.g. ["TEXT"])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

impl GenerationConfig {
    /// Text-only generation.
    pub fn text() -> Self {
        Self {
            response_modalities: Some(vec!["TEXT".to_string()]),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// A candidate response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content
    #[serde(default)]
    pub content: Option<GeminiContent>,

    /// Finish reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// Join the candidate's non-empty text parts with a blank line.
    pub fn joined_text(&self) -> String {
        let parts = match &self.content {
            Some(content) => &content.parts,
            None => return String::new(),
        };
        parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Locate the candidate list within a generateContent response body.
///
/// The envelope has been observed at several paths across API revisions;
/// each is probed in order. An unrecognized shape yields an empty list
/// rather than an error so the caller can report "nothing generated" with
/// the raw body attached for diagnosis.
pub fn extract_candidates(body: &serde_json::Value) -> Vec<Candidate> {
    const PATHS: [&[&str]; 4] = [
        &["candidates"],
        &["response", "candidates"],
        &["response", "output", "candidates"],
        &["output", "candidates"],
    ];

    for path in PATHS {
        let mut cursor = Some(body);
        for key in path {
            cursor = cursor.and_then(|v| v.get(key));
        }
        if let Some(found) = cursor.filter(|v| v.is_array()) {
            if let Ok(candidates) = serde_json::from_value::<Vec<Candidate>>(found.clone()) {
                return candidates;
            }
        }
    }

    Vec::new()
}

// ============================================================================
// Error Types
// ============================================================================

/// Gemini API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiError {
    /// Error details
    pub error: GeminiErrorDetail,
}

/// Gemini error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiErrorDetail {
    /// Error code
    pub code: i32,

    /// Error message
    pub message: String,

    /// Error status
    #[serde(default)]
    pub status: Option<String>,
}
