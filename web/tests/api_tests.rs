//! HTTP tests for the Eventdeck router.
//!
//! Drives the full router with `tower::ServiceExt::oneshot` over the
//! in-memory store, a fixed clock at 2025-01-01 00:00 UTC and the mock
//! rate limiter.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use eventdeck_core::providers::EventRepository;
use eventdeck_core::types::{EventDefinition, UserId};
use eventdeck_testing::fixtures::{EventBuilder, hm, ymd};
use eventdeck_testing::{InMemoryEventStore, MockRateLimiter, engine_with, test_clock};
use eventdeck_web::config::RateLimitConfig;
use eventdeck_web::{AppState, CORRELATION_ID_HEADER, USER_ID_HEADER, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with_limit(rate_limit: RateLimitConfig) -> (Router, InMemoryEventStore) {
    let (engine, store) = engine_with(test_clock());
    let limiter = Arc::new(MockRateLimiter::with_clock(Arc::new(test_clock())));
    (router(AppState::new(engine, limiter, rate_limit)), store)
}

fn app() -> (Router, InMemoryEventStore) {
    app_with_limit(RateLimitConfig::default())
}

async fn seed(store: &InMemoryEventStore, event: EventDefinition) -> EventDefinition {
    store.insert_event(&event).await.unwrap();
    event
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<UserId>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (app, _) = app();

    let (status, headers, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(CORRELATION_ID_HEADER));

    let (status, _, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_anonymous_listing() {
    let (app, store) = app();
    let event = seed(&store, EventBuilder::new().title("Jazz night").category("music").build()).await;
    seed(&store, EventBuilder::new().category("sports").build()).await;

    let (status, _, body) = send(&app, Method::GET, "/api/events?category=Music", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], event.id.to_string());
    assert_eq!(listed[0]["title"], "Jazz night");
}

#[tokio::test]
async fn test_listing_rejects_bad_parameters() {
    let (app, _) = app();

    let (status, _, body) = send(&app, Method::GET, "/api/events?sort_by=random", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _, _) = send(&app, Method::GET, "/api/events?lat=52.5", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_writes_require_identity() {
    let (app, store) = app();
    let event = seed(&store, EventBuilder::new().build()).await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        &format!("/api/events/{}/interactions", event.id),
        None,
        Some(json!({ "type": "like" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["code"].is_string());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/me/events")
        .header(USER_ID_HEADER, "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_then_fetch() {
    let (app, _) = app();
    let organizer = UserId::new();

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(organizer),
        Some(json!({
            "title": "Board games",
            "category": "social",
            "date": "2025-02-01",
            "time": "18:30:00",
            "capacity": 12
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["organizer_id"], organizer.to_string());
    assert_eq!(created["status"], "active");

    let id = created["id"].as_str().unwrap();
    let (status, _, detail) = send(&app, Method::GET, &format!("/api/events/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["event"]["title"], "Board games");
    assert_eq!(detail["waitlist_count"], 0);

    let (status, _, mine) = send(&app, Method::GET, "/api/me/events", Some(organizer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_rejects_past_dates() {
    let (app, _) = app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(UserId::new()),
        Some(json!({
            "title": "Yesterday",
            "category": "social",
            "date": "2024-12-31",
            "time": "18:30:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_lookup_errors() {
    let (app, _) = app();

    let (status, _, body) = send(&app, Method::GET, "/api/events/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_EVENT_ID");

    let missing = EventBuilder::new().build().id;
    let (status, _, body) = send(&app, Method::GET, &format!("/api/events/{missing}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "EVENT_NOT_FOUND");
}

#[tokio::test]
async fn test_full_event_flows_into_waitlist() {
    let (app, store) = app();
    let event = seed(&store, EventBuilder::new().capacity(1).build()).await;
    let interactions = format!("/api/events/{}/interactions", event.id);
    let waitlist = format!("/api/events/{}/waitlist", event.id);
    let (first, second) = (UserId::new(), UserId::new());

    let (status, _, body) = send(&app, Method::POST, &interactions, Some(first), Some(json!({ "type": "going" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "going");

    let (status, _, body) = send(&app, Method::POST, &interactions, Some(second), Some(json!({ "type": "going" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");

    let (status, _, body) = send(&app, Method::POST, &waitlist, Some(second), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"], 1);

    let (status, _, body) = send(&app, Method::GET, &waitlist, Some(second), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["on_waitlist"], true);
    assert_eq!(body["total_count"], 1);

    let (status, _, body) = send(&app, Method::POST, &waitlist, Some(first), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ALREADY_GOING");

    let (status, _, _) = send(&app, Method::DELETE, &waitlist, Some(second), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, Method::DELETE, &waitlist, Some(second), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_ON_WAITLIST");
}

#[tokio::test]
async fn test_unknown_interaction_type() {
    let (app, store) = app();
    let event = seed(&store, EventBuilder::new().build()).await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        &format!("/api/events/{}/interactions", event.id),
        Some(UserId::new()),
        Some(json!({ "type": "maybe" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_TYPE");
}

#[tokio::test]
async fn test_rating_before_the_window_opens() {
    let (app, store) = app();
    let event = seed(&store, EventBuilder::new().build()).await;
    let attendee = UserId::new();
    send(
        &app,
        Method::POST,
        &format!("/api/events/{}/interactions", event.id),
        Some(attendee),
        Some(json!({ "type": "going" })),
    )
    .await;

    let (status, _, body) = send(
        &app,
        Method::GET,
        &format!("/api/events/{}/rating-eligibility", event.id),
        Some(attendee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_rate"], false);
    assert_eq!(body["code"], "TOO_EARLY");

    let (status, _, body) = send(
        &app,
        Method::POST,
        &format!("/api/events/{}/ratings", event.id),
        Some(attendee),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "TOO_EARLY");
    assert!(body["details"]["hours_remaining"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_rating_a_past_event() {
    let (app, store) = app();
    let organizer = UserId::new();
    let event = seed(
        &store,
        EventBuilder::new()
            .organizer(organizer)
            .starts(ymd(2024, 12, 30), hm(10, 0))
            .build(),
    )
    .await;
    let attendee = UserId::new();
    send(
        &app,
        Method::POST,
        &format!("/api/events/{}/interactions", event.id),
        Some(attendee),
        Some(json!({ "type": "going" })),
    )
    .await;
    let ratings = format!("/api/events/{}/ratings", event.id);

    let (status, _, body) = send(&app, Method::POST, &ratings, Some(attendee), Some(json!({ "rating": 6 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_RATING");

    let (status, _, body) = send(&app, Method::POST, &ratings, Some(organizer), Some(json!({ "rating": 5 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INVALID_SELF_RATING");

    let (status, _, body) = send(
        &app,
        Method::POST,
        &ratings,
        Some(attendee),
        Some(json!({ "rating": 4, "comment": "Great host" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"]["rating"], 4);
    assert_eq!(body["organizer_summary"]["rating_count"], 1);

    let (status, _, summary) = send(
        &app,
        Method::GET,
        &format!("/api/organizers/{organizer}/rating-summary"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["rating_count"], 1);
    assert!((summary["average_rating"].as_f64().unwrap() - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_organizer_only_cancel() {
    let (app, store) = app();
    let organizer = UserId::new();
    let event = seed(&store, EventBuilder::new().organizer(organizer).build()).await;
    let cancel = format!("/api/events/{}/cancel", event.id);

    let (status, _, body) = send(&app, Method::POST, &cancel, Some(UserId::new()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_ORGANIZER");

    let (status, _, body) = send(&app, Method::POST, &cancel, Some(organizer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, _, listed) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());

    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/events/{}", event.id), Some(organizer), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_writes_are_rate_limited() {
    let (app, store) = app_with_limit(RateLimitConfig {
        max_requests: 2,
        window_secs: 60,
    });
    let event = seed(&store, EventBuilder::new().build()).await;
    let uri = format!("/api/events/{}/interactions", event.id);
    let user = UserId::new();

    for kind in ["like", "pass"] {
        let (status, _, _) = send(&app, Method::POST, &uri, Some(user), Some(json!({ "type": kind }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = send(&app, Method::POST, &uri, Some(user), Some(json!({ "type": "like" }))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");
    assert!(headers.contains_key(header::RETRY_AFTER));

    // Reads are not counted
    let (status, _, _) = send(&app, Method::GET, &format!("/api/events/{}", event.id), Some(user), None).await;
    assert_eq!(status, StatusCode::OK);

    // Other users have their own window
    let (status, _, _) = send(&app, Method::POST, &uri, Some(UserId::new()), Some(json!({ "type": "like" }))).await;
    assert_eq!(status, StatusCode::OK);
}
