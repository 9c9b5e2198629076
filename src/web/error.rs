//! Web error types for the CodeLoop API.
//!
//! The taxonomy mirrors how failures surface to the user: validation is
//! resolved before any network call, not-found is a terminal view, and
//! store/generation failures are reported without automatic retry. No error
//! here is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ai::PromptError;
use crate::data::ValidationError;

/// Error type for web API operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Caller-supplied fields fail minimum constraints.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No trusted user identity on the request.
    #[error("Not signed in")]
    Unauthorized,

    /// The caller is signed in but does not own the record.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested id has no record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The prompt service errored or returned unusable output.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Transport or permission failure talking to the record store.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Generation succeeded but the save did not. The generated code rides
    /// along so the client can offer retry-save without regenerating.
    #[error("Loop was generated but could not be saved")]
    SaveFailedAfterGeneration { generated_code: String },
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_code: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, error_message, details, generated_code) = match self {
            WebError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "Validation Failed", Some(msg), None)
            }
            WebError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not Signed In", None, None),
            WebError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", Some(msg), None),
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", Some(msg), None),
            WebError::Generation(msg) => {
                tracing::error!("Generation failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Generation Failed", Some(msg), None)
            }
            WebError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Store Unavailable",
                    None,
                    None,
                )
            }
            WebError::SaveFailedAfterGeneration { generated_code } => {
                tracing::error!("Loop save failed after successful generation");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Save Failed",
                    Some("Your code was generated but could not be saved. Retry saving without regenerating.".to_string()),
                    Some(generated_code),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            details,
            generated_code,
        });

        (status, body).into_response()
    }
}

impl From<ValidationError> for WebError {
    fn from(err: ValidationError) -> Self {
        WebError::Validation(err.to_string())
    }
}

impl From<PromptError> for WebError {
    fn from(err: PromptError) -> Self {
        WebError::Generation(err.to_string())
    }
}
