//! Event discovery and organizer endpoints.

use crate::error::AppError;
use crate::extractors::{AuthenticatedUser, CorrelationId, OptionalUser};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use eventdeck_core::providers::{EventStore, RateLimiter};
use eventdeck_core::query::{ListEventsQuery, SortBy};
use eventdeck_core::types::{EventDefinition, EventDetail, EventOccurrence, GeoPoint, NewEvent};
use serde::Deserialize;

/// Query string of `GET /api/events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    /// Category, or `all`
    pub category: Option<String>,
    /// Viewer latitude
    pub lat: Option<f64>,
    /// Viewer longitude
    pub lng: Option<f64>,
    /// Drop occurrences that already started
    #[serde(default)]
    pub hide_past: bool,
    /// Radius in km around (`lat`, `lng`)
    pub radius: Option<f64>,
    /// Free-text search
    pub search: Option<String>,
    /// First date, `YYYY-MM-DD`
    pub date_from: Option<NaiveDate>,
    /// Last date, `YYYY-MM-DD`
    pub date_to: Option<NaiveDate>,
    /// `date`, `distance` or `popularity`
    pub sort_by: Option<String>,
}

impl ListEventsParams {
    fn into_query(self, viewer: OptionalUser) -> Result<ListEventsQuery, AppError> {
        let user_location = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            (None, None) => None,
            _ => return Err(AppError::validation("lat and lng must be given together")),
        };
        let sort_by: SortBy = self.sort_by.as_deref().unwrap_or_default().parse()?;

        Ok(ListEventsQuery {
            category: self.category,
            user_id: viewer.0,
            user_location,
            hide_past: self.hide_past,
            radius_km: self.radius,
            search: self.search.filter(|s| !s.trim().is_empty()),
            date_from: self.date_from,
            date_to: self.date_to,
            sort_by,
        })
    }
}

/// List upcoming occurrences.
///
/// ```text
/// GET /api/events?category=music&lat=52.5&lng=13.4&radius=10&sort_by=distance
/// ```
pub async fn list_events<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    viewer: OptionalUser,
    Query(params): Query<ListEventsParams>,
) -> Result<Json<Vec<EventOccurrence>>, AppError> {
    let query = params.into_query(viewer)?;
    Ok(Json(state.engine.list_events(&query).await?))
}

/// Create an event owned by the caller.
pub async fn create_event<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    CorrelationId(correlation_id): CorrelationId,
    Json(new_event): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventDefinition>), AppError> {
    state.throttle(user_id).await?;
    let event = state.engine.create_event(user_id, new_event).await?;

    tracing::debug!(%correlation_id, event_id = %event.id, "Create request served");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Event with live counts. Accepts occurrence ids.
pub async fn get_event<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    Path(event_id): Path<String>,
) -> Result<Json<EventDetail>, AppError> {
    Ok(Json(state.engine.get_event(&event_id).await?))
}

/// Cancel one of the caller's events.
pub async fn cancel_event<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
) -> Result<Json<EventDefinition>, AppError> {
    state.throttle(user_id).await?;
    Ok(Json(state.engine.cancel_event(user_id, &event_id).await?))
}

/// Delete one of the caller's events.
pub async fn delete_event<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(event_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.throttle(user_id).await?;
    state.engine.delete_event(user_id, &event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every event the caller organizes, cancelled ones included.
pub async fn my_events<S: EventStore, L: RateLimiter>(
    State(state): State<AppState<S, L>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<EventDetail>>, AppError> {
    Ok(Json(state.engine.organizer_events(user_id).await?))
}
