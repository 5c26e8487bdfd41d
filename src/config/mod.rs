//! Configuration management module
//!
//! Handles loading and validating application configuration from
//! environment variables and .env files.

pub mod settings;

pub use settings::{Environment, Settings};
