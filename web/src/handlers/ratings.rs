//! Rating endpoints.

use crate::error::AppError;
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use eventdeck_core::eligibility::RatingEligibility;
use eventdeck_core::providers::{EventStore, RateLimiter};
use eventdeck_core::types::{OrganizerRatingSummary, RatingReceipt, UserId};
use serde::Deserialize;
use uuid::Uuid;

/// Body of `POST /api/events/:id/ratings`.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    /// 1 to 5
    pub rating: i64,
    /// Optional free text
    pub comment: Option<String>,
}

/// Whether the caller may rate the event now, and why not.
pub async fn rating_eligibility<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
) -> Result<Json<RatingEligibility>, AppError> {
    Ok(Json(
        state
            .engine
            .check_rating_eligibility(user_id, &event_id)
            .await?,
    ))
}

/// Create or replace the caller's rating.
pub async fn submit_rating<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<RatingReceipt>, AppError> {
    state.throttle(user_id).await?;
    let receipt = state
        .engine
        .submit_rating(user_id, &event_id, request.rating, request.comment.as_deref())
        .await?;
    Ok(Json(receipt))
}

/// Average rating across all of an organizer's events.
pub async fn organizer_summary<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    Path(organizer_id): Path<Uuid>,
) -> Result<Json<OrganizerRatingSummary>, AppError> {
    Ok(Json(
        state
            .engine
            .organizer_rating_summary(UserId::from_uuid(organizer_id))
            .await?,
    ))
}
