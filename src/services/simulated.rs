//! Simulated provider adapter
//!
//! Stand-in for a real ChatGPT integration. Makes no external call: it
//! sleeps for a uniformly random interval to emulate provider latency
//! variance, then synthesizes a deterministic reply referencing the input.
//! Because it satisfies `ProviderAdapter`, the dispatcher can exercise and
//! time the aggregation path without a live third provider, and a real
//! adapter can replace it without any dispatch changes.

use rand::Rng;
use serde_json::json;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::schemas::AdapterResult;
use crate::services::dispatcher::ProviderAdapter;

/// Simulated chat adapter with artificial latency
pub struct SimulatedService {
    delay_ms: RangeInclusive<u64>,
}

impl SimulatedService {
    pub fn new(delay_ms: RangeInclusive<u64>) -> Self {
        Self { delay_ms }
    }
}

impl Default for SimulatedService {
    fn default() -> Self {
        Self::new(300..=2800)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for SimulatedService {
    async fn invoke(&self, prompt: &str, image_url: Option<&str>) -> AdapterResult {
        // ThreadRng is not Send; draw the delay before the await point.
        let wait_ms = rand::thread_rng().gen_range(self.delay_ms.clone());
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;

        let mut text = format!("Simulated ChatGPT response to: \"{prompt}\"");
        if let Some(url) = image_url {
            text.push_str(&format!("\n[Simulation detected an image at: {url}]"));
        }
        text.push_str(
            "\n\n(Note: this is a simulated response; no real API is connected yet.)",
        );

        AdapterResult::success(text).with_meta(json!({
            "simulated": true,
            "latencyMs": wait_ms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_response_references_prompt_and_image() {
        let service = SimulatedService::new(0..=0);
        let result = service
            .invoke("solve it", Some("https://x.io/shot.png"))
            .await;

        assert!(result.ok);
        let text = result.text.unwrap();
        assert!(text.contains("solve it"));
        assert!(text.contains("https://x.io/shot.png"));
    }

    #[tokio::test]
    async fn test_no_image_reference_without_image() {
        let service = SimulatedService::new(0..=0);
        let result = service.invoke("solve it", None).await;
        assert!(!result.text.unwrap().contains("image at"));
    }

    #[tokio::test]
    async fn test_latency_within_configured_range() {
        let service = SimulatedService::new(20..=40);
        let started = Instant::now();
        let result = service.invoke("hi", None).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(20));

        let meta = result.meta.unwrap();
        assert_eq!(meta["simulated"], true);
        let latency = meta["latencyMs"].as_u64().unwrap();
        assert!((20..=40).contains(&latency));
    }
}
