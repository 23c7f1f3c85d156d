//! Custom Axum extractors.
//!
//! - [`AuthenticatedUser`]: the caller from the `X-User-Id` header, required
//! - [`OptionalUser`]: the same header, optional (anonymous browsing)
//! - [`CorrelationId`]: the request's correlation ID
//!
//! Authentication itself happens upstream; the gateway forwards the verified
//! user id in `X-User-Id`.

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use eventdeck_core::types::UserId;
use uuid::Uuid;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Parse the user header. `Ok(None)` if absent, `Err` if malformed.
fn user_from_headers(headers: &HeaderMap) -> Result<Option<UserId>, AppError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .map(|uuid| Some(UserId::from_uuid(uuid)))
        .ok_or_else(|| AppError::unauthorized(format!("Malformed {USER_ID_HEADER} header")))
}

/// Authenticated caller.
///
/// Rejects with 401 if the header is missing or not a UUID.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers)?
            .map(Self)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// Caller if identified, `None` for anonymous requests.
///
/// A present but malformed header is still rejected.
#[derive(Debug, Clone, Copy)]
pub struct OptionalUser(pub Option<UserId>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers).map(Self)
    }
}

/// Correlation ID for request tracing.
///
/// Taken from the request extensions when `correlation_id_layer` is
/// installed, otherwise from the `X-Correlation-ID` header, otherwise a new
/// UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}
