//! Wire-format schema definitions
//!
//! Contains the relay's own request/response contract and the request and
//! response structures for each upstream provider API.

pub mod gemini;
pub mod openrouter;
pub mod relay;

pub use relay::{
    AdapterResult, GenerateRequest, PromptRequest, ProviderCode, UnsupportedProviderError,
};
