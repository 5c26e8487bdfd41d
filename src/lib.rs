//! Prompt relay library
//!
//! HTTP relay that forwards a prompt (and optional image) to one or more
//! external text-generation providers and returns per-provider result
//! envelopes.

// Public modules
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod schemas;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::ApiError;
pub use server::App;
