//! OpenRouter chat completion schema definitions
//!
//! OpenAI-compatible request and response structures for the OpenRouter
//! `/chat/completions` endpoint. Only the fields the relay consumes are
//! modeled; everything else passes through untouched.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Chat completion request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier (e.g. "deepseek/deepseek-chat-v3.1:free")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    /// Build a single user-turn request.
    pub fn user_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.into(),
            }],
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "user", "assistant", or "system"
    pub role: String,

    /// Message text
    pub content: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Chat completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    /// Token usage, passed through as diagnostic metadata
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

impl ChatCompletionResponse {
    /// The first choice's message content, if the response carries one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}

/// A single completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

/// The message within a choice; content may be absent on odd upstream shapes
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
