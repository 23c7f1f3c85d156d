//! Interaction endpoint.

use crate::error::AppError;
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use eventdeck_core::providers::{EventStore, RateLimiter};
use eventdeck_core::types::Interaction;
use serde::Deserialize;

/// Body of `POST /api/events/:id/interactions`.
#[derive(Debug, Deserialize)]
pub struct InteractRequest {
    /// `going`, `like` or `pass`
    #[serde(rename = "type")]
    pub kind: String,
}

/// Record or overwrite the caller's interaction.
///
/// `going` on a full event answers 400 with code `CAPACITY_EXCEEDED`.
pub async fn interact<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
    Json(request): Json<InteractRequest>,
) -> Result<Json<Interaction>, AppError> {
    state.throttle(user_id).await?;
    let interaction = state
        .engine
        .interact(user_id, &event_id, &request.kind)
        .await?;
    Ok(Json(interaction))
}
