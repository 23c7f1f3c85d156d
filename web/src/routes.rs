//! Router assembly.

use crate::handlers::{events, health, interactions, ratings, waitlist};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use eventdeck_core::providers::{EventStore, RateLimiter};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the HTTP router over `state`.
///
/// | Method | Path | Handler |
/// |--------|------|---------|
/// | GET | `/health` | liveness |
/// | GET | `/ready` | store health |
/// | GET, POST | `/api/events` | list, create |
/// | GET, DELETE | `/api/events/:id` | detail, delete |
/// | POST | `/api/events/:id/cancel` | cancel |
/// | POST | `/api/events/:id/interactions` | going / like / pass |
/// | GET, POST, DELETE | `/api/events/:id/waitlist` | status, join, leave |
/// | GET | `/api/events/:id/rating-eligibility` | eligibility |
/// | POST | `/api/events/:id/ratings` | submit rating |
/// | GET | `/api/organizers/:id/rating-summary` | organizer average |
/// | GET | `/api/me/events` | caller's own events |
pub fn router<S, L>(state: AppState<S, L>) -> Router
where
    S: EventStore + 'static,
    L: RateLimiter + 'static,
{
    let api = Router::new()
        .route(
            "/events",
            get(events::list_events::<S, L>).post(events::create_event::<S, L>),
        )
        .route(
            "/events/:id",
            get(events::get_event::<S, L>).delete(events::delete_event::<S, L>),
        )
        .route("/events/:id/cancel", post(events::cancel_event::<S, L>))
        .route(
            "/events/:id/interactions",
            post(interactions::interact::<S, L>),
        )
        .route(
            "/events/:id/waitlist",
            get(waitlist::waitlist_status::<S, L>)
                .post(waitlist::join_waitlist::<S, L>)
                .delete(waitlist::leave_waitlist::<S, L>),
        )
        .route(
            "/events/:id/rating-eligibility",
            get(ratings::rating_eligibility::<S, L>),
        )
        .route("/events/:id/ratings", post(ratings::submit_rating::<S, L>))
        .route(
            "/organizers/:id/rating-summary",
            get(ratings::organizer_summary::<S, L>),
        )
        .route("/me/events", get(events::my_events::<S, L>));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness::<S, L>))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(correlation_id_layer())
        .with_state(state)
}
