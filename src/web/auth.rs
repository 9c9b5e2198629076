//! Request identity for the CodeLoop API.
//!
//! Identity and session management live upstream (the deployment fronts the
//! server with an authenticating proxy). That layer places the verified user
//! identifier on each request; this extractor trusts it as the write-owner
//! for the records the handler touches. A request without the header is
//! treated as signed out.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::WebError;

/// Header carrying the verified user identifier.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The signed-in user making the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CurrentUser(id.to_string()))
            .ok_or(WebError::Unauthorized)
    }
}
