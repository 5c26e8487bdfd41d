//! Application state container
//!
//! Shared state handed to every request handler via axum's state
//! extraction. Cheaply cloneable; everything mutable was fixed at startup.

use crate::config::Settings;
use crate::services::Dispatcher;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application settings (immutable after startup)
    pub settings: Arc<Settings>,

    /// Dispatch coordinator owning the provider adapters
    pub dispatcher: Arc<Dispatcher>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create the application state, wiring the shared HTTP client through
    /// the provider adapters.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);

        tracing::debug!("Creating shared HTTP client");
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        tracing::debug!("Initializing provider dispatcher");
        let dispatcher = Arc::new(Dispatcher::new(&settings, client));

        tracing::info!(
            providers = ?dispatcher.registered(),
            "Application state initialized"
        );

        Ok(Self {
            settings,
            dispatcher,
            start_time: Instant::now(),
        })
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
