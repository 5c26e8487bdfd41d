//! Dispatch coordinator
//!
//! Routes a normalized request to one provider adapter (single-provider
//! path) or to every registered adapter concurrently (fan-out path). Each
//! adapter settles independently; the fan-out response is assembled only
//! after all of them have, and one provider's failure never suppresses
//! another's result.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Settings;
use crate::schemas::{AdapterResult, PromptRequest, ProviderCode};
use crate::services::{GeminiService, OpenRouterService, SimulatedService};

/// Common contract for provider adapters.
///
/// `invoke` is infallible by design: every failure mode (missing credential,
/// network error, malformed upstream body) is converted into a failed
/// `AdapterResult` inside the adapter.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn invoke(&self, prompt: &str, image_url: Option<&str>) -> AdapterResult;
}

/// Coordinator owning one adapter per registered provider code.
pub struct Dispatcher {
    adapters: Vec<(ProviderCode, Arc<dyn ProviderAdapter>)>,
}

impl Dispatcher {
    /// Build the production dispatcher with all three providers registered.
    ///
    /// The ChatGPT slot is served by the simulated adapter until a real
    /// integration exists; it satisfies the same contract and can be swapped
    /// here without touching dispatch logic.
    pub fn new(settings: &Settings, client: reqwest::Client) -> Self {
        let adapters: Vec<(ProviderCode, Arc<dyn ProviderAdapter>)> = vec![
            (
                ProviderCode::Gemini,
                Arc::new(GeminiService::new(settings, client.clone())),
            ),
            (ProviderCode::ChatGpt, Arc::new(SimulatedService::default())),
            (
                ProviderCode::Deepseek,
                Arc::new(OpenRouterService::new(settings, client)),
            ),
        ];
        Self { adapters }
    }

    /// Build a dispatcher over an explicit adapter set. Used by tests and by
    /// callers swapping in alternative adapter implementations.
    pub fn with_adapters(adapters: Vec<(ProviderCode, Arc<dyn ProviderAdapter>)>) -> Self {
        Self { adapters }
    }

    /// Provider codes registered with this dispatcher.
    pub fn registered(&self) -> Vec<ProviderCode> {
        self.adapters.iter().map(|(code, _)| *code).collect()
    }

    fn adapter(&self, code: ProviderCode) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters
            .iter()
            .find(|(registered, _)| *registered == code)
            .map(|(_, adapter)| adapter)
    }

    /// Invoke exactly one provider.
    ///
    /// Callers resolve the provider code before reaching here, so an
    /// unrecognized code can never cause an adapter invocation. Text-only
    /// providers are handed no image reference.
    pub async fn dispatch_single(
        &self,
        code: ProviderCode,
        request: &PromptRequest,
    ) -> AdapterResult {
        let Some(adapter) = self.adapter(code) else {
            return AdapterResult::failure(format!(
                "Provider '{}' is not registered",
                code.code()
            ));
        };

        let image_url = if code.accepts_image() {
            request.image_url.as_deref()
        } else {
            None
        };

        tracing::debug!(provider = %code, has_image = image_url.is_some(), "Dispatching to provider");
        adapter.invoke(&request.prompt, image_url).await
    }

    /// Invoke every registered provider concurrently and wait for all of
    /// them to settle.
    ///
    /// Adapters run as independent tasks, all started before any is awaited,
    /// so their wall-clock windows overlap. A panicked task is normalized to
    /// a failed result for that provider alone. The returned map's key set
    /// is exactly the registered provider set.
    pub async fn fan_out(&self, request: &PromptRequest) -> BTreeMap<ProviderCode, AdapterResult> {
        let tasks: Vec<_> = self
            .adapters
            .iter()
            .map(|(code, adapter)| {
                let code = *code;
                let adapter = Arc::clone(adapter);
                let prompt = request.prompt.clone();
                let image_url = if code.accepts_image() {
                    request.image_url.clone()
                } else {
                    None
                };
                let handle = tokio::spawn(async move {
                    adapter.invoke(&prompt, image_url.as_deref()).await
                });
                (code, handle)
            })
            .collect();

        let outcomes = join_all(
            tasks
                .into_iter()
                .map(|(code, handle)| async move { (code, handle.await) }),
        )
        .await;

        let mut results = BTreeMap::new();
        for (code, outcome) in outcomes {
            let result = match outcome {
                Ok(result) => result,
                Err(join_err) => {
                    tracing::error!(provider = %code, error = %join_err, "Provider task failed");
                    AdapterResult::failure_with_detail(
                        "Request failed",
                        serde_json::Value::String(join_err.to_string()),
                    )
                }
            };
            results.insert(code, result);
        }
        results
    }
}
