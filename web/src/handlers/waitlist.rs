//! Waitlist endpoints.

use crate::error::AppError;
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use eventdeck_core::providers::{EventStore, RateLimiter};
use eventdeck_core::types::{WaitlistEntry, WaitlistStatus};

/// Join the waitlist of a full event. Joining twice returns the same entry.
pub async fn join_waitlist<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
) -> Result<Json<WaitlistEntry>, AppError> {
    state.throttle(user_id).await?;
    Ok(Json(state.engine.join_waitlist(user_id, &event_id).await?))
}

/// Leave the waitlist.
pub async fn leave_waitlist<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.throttle(user_id).await?;
    state.engine.leave_waitlist(user_id, &event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's place in the queue and the queue length.
pub async fn waitlist_status<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
) -> Result<Json<WaitlistStatus>, AppError> {
    Ok(Json(state.engine.waitlist_status(user_id, &event_id).await?))
}
