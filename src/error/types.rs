//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::schemas::UnsupportedProviderError;

/// Errors surfaced to the HTTP caller.
///
/// Upstream provider failures never appear here: adapters fold them into
/// failed `AdapterResult`s so one provider cannot abort a response for the
/// others. This type covers only caller mistakes and unexpected internal
/// failures at the dispatch boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    UnsupportedProvider(#[from] UnsupportedProviderError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            ApiError::UnsupportedProvider(err) => {
                (StatusCode::BAD_REQUEST, err.to_string(), None)
            }
            ApiError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(err.to_string()),
            ),
        };

        let body = Json(ErrorResponse {
            ok: false,
            error,
            detail,
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_unsupported_provider_maps_to_400() {
        let err: ApiError = "x".parse::<crate::schemas::ProviderCode>().unwrap_err().into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let err = ApiError::Internal(anyhow::anyhow!("worker pool exhausted"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
