use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::export::ExportError;
use crate::llm_client::LlmError;
use crate::tailoring::extractor::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only `Validation` and `NotFound` messages reach the client verbatim; every
/// other variant is logged and answered with a fixed message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Generation error: {0}")]
    Generation(LlmError),

    #[error("Generation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout(deadline) => AppError::Timeout(deadline),
            other => AppError::Generation(other),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Internal(anyhow::Error::new(e))
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Internal(anyhow::Error::new(e).context("session store failure"))
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(e) => {
                tracing::warn!("PDF extraction failed: {e}");
                (
                    StatusCode::BAD_REQUEST,
                    "EXTRACTION_ERROR",
                    "Could not read text from the uploaded PDF".to_string(),
                )
            }
            AppError::Generation(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_ERROR",
                    "Generation failed".to_string(),
                )
            }
            AppError::Timeout(deadline) => {
                tracing::error!("LLM call exceeded deadline of {deadline:?}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "GENERATION_TIMEOUT",
                    "Generation timed out".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_message_is_returned_verbatim() {
        let (status, body) = render(AppError::validation("File must be a PDF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File must be a PDF");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generation_detail_is_not_leaked() {
        let err = AppError::from(LlmError::Api {
            status: 401,
            message: "invalid x-api-key sk-secret".to_string(),
        });
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Generation failed");
        assert!(!body.to_string().contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_llm_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(LlmError::Timeout(std::time::Duration::from_secs(5)));
        assert!(matches!(err, AppError::Timeout(_)));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["code"], "GENERATION_TIMEOUT");
    }

    #[tokio::test]
    async fn test_extraction_failure_is_bad_request() {
        let err = AppError::from(ExtractionError::Malformed("bad xref".to_string()));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EXTRACTION_ERROR");
        assert!(!body.to_string().contains("xref"));
    }
}
