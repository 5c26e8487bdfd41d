//! Image fetch helper
//!
//! Retrieves an image from a URL and produces a base64 payload with a
//! best-effort MIME type for adapters that inline images. The MIME type is
//! derived from the URL's path extension via a lookup table; when the
//! extension is absent or unknown the payload falls back to a generic
//! binary type. This is deliberately a heuristic, not content sniffing.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::utils::{with_timeout, TimeoutError};

/// Fallback when the URL carries no recognizable extension.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Errors that can occur while retrieving an image
#[derive(Error, Debug)]
pub enum ImageFetchError {
    #[error("image download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image download returned HTTP {0}")]
    Status(u16),

    #[error("image download timed out after {0:?}")]
    Timeout(Duration),
}

/// An encoded image ready to be inlined into a provider request.
///
/// Ephemeral: owned by the adapter invocation that requested it and dropped
/// after the payload is embedded.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Base64-encoded image bytes
    pub data: String,

    /// Best-effort MIME type derived from the URL
    pub mime_type: String,
}

/// Download `url` and encode the bytes as a base64 payload.
///
/// Fails when the URL is unreachable, the response status is non-2xx, the
/// transfer errors mid-stream, or the whole operation exceeds `timeout`.
pub async fn fetch_image(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<ImagePayload, ImageFetchError> {
    let fetch = async {
        let response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(ImagePayload {
            data: BASE64.encode(&bytes),
            mime_type: mime_type_for_url(url).to_string(),
        })
    };

    match with_timeout(timeout, fetch).await {
        Ok(payload) => Ok(payload),
        Err(TimeoutError::Inner(err)) => Err(err),
        Err(TimeoutError::Timeout(elapsed)) => Err(ImageFetchError::Timeout(elapsed)),
    }
}

/// Resolve a MIME type from the URL's path extension.
pub fn mime_type_for_url(url: &str) -> &'static str {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url);

    let ext = match path.rsplit_once('.') {
        // An extension containing '/' belongs to a path segment, not a file.
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext.to_ascii_lowercase(),
        _ => return DEFAULT_MIME_TYPE,
    };

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_mime_lookup_known_extensions() {
        assert_eq!(mime_type_for_url("https://x.io/shot.png"), "image/png");
        assert_eq!(mime_type_for_url("https://x.io/shot.JPG"), "image/jpeg");
        assert_eq!(mime_type_for_url("https://x.io/shot.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for_url("https://x.io/a/b/c.webp"), "image/webp");
    }

    #[test]
    fn test_mime_lookup_strips_query_and_fragment() {
        assert_eq!(
            mime_type_for_url("https://x.io/shot.png?token=abc.def"),
            "image/png"
        );
        assert_eq!(mime_type_for_url("https://x.io/shot.gif#frame"), "image/gif");
    }

    #[test]
    fn test_mime_lookup_unknown_or_missing_extension() {
        assert_eq!(mime_type_for_url("https://x.io/shot.xyz"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_url("https://x.io/shot"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_url("https://x.io/"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_url(""), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_base64_round_trip_random_buffers() {
        let mut rng = rand::thread_rng();
        for len in [0usize, 1, 2, 3, 64, 1024, 4096] {
            let mut buffer = vec![0u8; len];
            rng.fill_bytes(&mut buffer);

            let encoded = BASE64.encode(&buffer);
            let decoded = BASE64.decode(&encoded).unwrap();
            assert_eq!(decoded, buffer, "round trip mismatch at len {len}");
        }
    }

    #[tokio::test]
    async fn test_fetch_image_unreachable_url() {
        let client = Client::new();
        // Reserved TEST-NET-1 address, nothing listens there.
        let result = fetch_image(
            &client,
            "http://192.0.2.1:9/shot.png",
            Duration::from_millis(250),
        )
        .await;
        assert!(result.is_err());
    }
}
