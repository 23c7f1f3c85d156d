//! Health check endpoints.
//!
//! Used by load balancers and orchestrators to probe the service.

use crate::error::AppError;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use eventdeck_core::providers::{EventStore, RateLimiter};
use serde_json::{Value, json};

/// Liveness. Does not touch the database.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness: 200 when the store answers, 503 otherwise.
///
/// ```text
/// GET /ready
/// ```
pub async fn readiness<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
) -> Result<Json<Value>, AppError> {
    match state.engine.store().health_check().await {
        Ok(()) => Ok(Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            Err(AppError::unavailable("Store is not reachable"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
