//! Services module
//!
//! Contains the dispatch coordinator, the provider adapters, and the image
//! fetch helper they share.

pub mod dispatcher;
pub mod gemini;
pub mod image;
pub mod openrouter;
pub mod simulated;

pub use dispatcher::{Dispatcher, ProviderAdapter};
pub use gemini::GeminiService;
pub use image::{fetch_image, mime_type_for_url, ImageFetchError, ImagePayload};
pub use openrouter::OpenRouterService;
pub use simulated::SimulatedService;
