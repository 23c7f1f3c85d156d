//! Rating eligibility and submission.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use eventdeck_core::environment::Clock;
use eventdeck_core::error::EngineError;
use eventdeck_core::providers::EventRepository;
use eventdeck_core::types::{EventDefinition, UserId};
use eventdeck_testing::fixtures::{EventBuilder, hm, new_event, ymd};
use eventdeck_testing::{ManualClock, engine_with, test_clock};

fn start_of(event: &EventDefinition) -> chrono::DateTime<chrono::Utc> {
    NaiveDateTime::new(event.date, event.time).and_utc()
}

#[tokio::test]
async fn eligibility_opens_exactly_eight_hours_after_start() {
    let clock = ManualClock::new(test_clock().now());
    let (engine, store) = engine_with(clock.clone());
    let event = EventBuilder::new().starts(ymd(2025, 1, 10), hm(19, 0)).build();
    store.insert_event(&event).await.unwrap();
    let id = event.id.to_string();
    let attendee = UserId::new();
    engine.interact(attendee, &id, "going").await.unwrap();

    clock.set(start_of(&event) + Duration::hours(7) + Duration::minutes(59));
    let early = engine.check_rating_eligibility(attendee, &id).await.unwrap();
    assert!(!early.can_rate);
    assert_eq!(early.code.as_deref(), Some("TOO_EARLY"));
    assert_eq!(early.hours_remaining, Some(1));

    clock.set(start_of(&event) + Duration::hours(8));
    let open = engine.check_rating_eligibility(attendee, &id).await.unwrap();
    assert!(open.can_rate);
    assert!(open.reason.is_none());
}

#[tokio::test]
async fn eligibility_reasons_in_order() {
    let clock = ManualClock::new(test_clock().now());
    let (engine, store) = engine_with(clock.clone());
    let organizer = UserId::new();
    let event = EventBuilder::new().organizer(organizer).build();
    store.insert_event(&event).await.unwrap();
    let id = event.id.to_string();
    clock.set(start_of(&event) + Duration::days(1));

    let own = engine.check_rating_eligibility(organizer, &id).await.unwrap();
    assert_eq!(own.code.as_deref(), Some("INVALID_SELF_RATING"));

    let liker = UserId::new();
    engine.interact(liker, &id, "like").await.unwrap();
    let liked = engine.check_rating_eligibility(liker, &id).await.unwrap();
    assert_eq!(liked.code.as_deref(), Some("NOT_ATTENDING"));

    assert!(matches!(
        engine
            .check_rating_eligibility(liker, &UserId::new().to_string())
            .await,
        Err(EngineError::EventNotFound(_))
    ));
}

#[tokio::test]
async fn submission_is_gated_by_eligibility() {
    let clock = ManualClock::new(test_clock().now());
    let (engine, store) = engine_with(clock.clone());
    let event = EventBuilder::new().build();
    store.insert_event(&event).await.unwrap();
    let id = event.id.to_string();
    let attendee = UserId::new();
    engine.interact(attendee, &id, "going").await.unwrap();

    clock.set(start_of(&event) + Duration::hours(2));
    assert!(matches!(
        engine.submit_rating(attendee, &id, 5, None).await,
        Err(EngineError::TooEarly { hours_remaining: 6 })
    ));

    assert!(matches!(
        engine.submit_rating(UserId::new(), &id, 5, None).await,
        Err(EngineError::NotAttending)
    ));
    assert!(matches!(
        engine.submit_rating(event.organizer_id, &id, 5, None).await,
        Err(EngineError::InvalidSelfRating)
    ));
    assert!(matches!(
        engine.submit_rating(attendee, &id, 7, None).await,
        Err(EngineError::InvalidRating(7))
    ));
}

#[tokio::test]
async fn resubmission_updates_in_place_and_summary_spans_events() {
    let clock = ManualClock::new(test_clock().now());
    let (engine, store) = engine_with(clock.clone());
    let organizer = UserId::new();
    let first = EventBuilder::new().organizer(organizer).build();
    let second = EventBuilder::new()
        .organizer(organizer)
        .starts(ymd(2025, 1, 12), hm(10, 0))
        .build();
    store.insert_event(&first).await.unwrap();
    store.insert_event(&second).await.unwrap();
    let (alice, bob) = (UserId::new(), UserId::new());
    for event in [&first, &second] {
        engine.interact(alice, &event.id.to_string(), "going").await.unwrap();
    }
    engine.interact(bob, &first.id.to_string(), "going").await.unwrap();
    clock.set(start_of(&second) + Duration::days(1));

    engine.submit_rating(alice, &first.id.to_string(), 2, Some("meh")).await.unwrap();
    let updated = engine
        .submit_rating(alice, &first.id.to_string(), 4, Some("  better on reflection "))
        .await
        .unwrap();
    assert_eq!(updated.rating.rating, 4);
    assert_eq!(updated.rating.comment.as_deref(), Some("better on reflection"));
    assert_eq!(updated.organizer_summary.rating_count, 1);
    assert_eq!(store.rating_rows(first.id).unwrap(), 1);

    engine.submit_rating(bob, &first.id.to_string(), 5, None).await.unwrap();
    let receipt = engine
        .submit_rating(alice, &second.id.to_string(), 3, None)
        .await
        .unwrap();

    assert_eq!(receipt.organizer_summary.rating_count, 3);
    assert!((receipt.organizer_summary.average_rating - 4.0).abs() < f64::EPSILON);
    assert_eq!(
        engine.organizer_rating_summary(organizer).await.unwrap(),
        receipt.organizer_summary
    );
}

#[tokio::test]
async fn recurring_events_are_rated_from_the_first_start() {
    let clock = ManualClock::new(test_clock().now());
    let (engine, store) = engine_with(clock.clone());
    let event = EventBuilder::new()
        .starts(ymd(2025, 1, 6), hm(18, 0))
        .recurring(eventdeck_core::types::Frequency::Weekly, ymd(2025, 2, 24))
        .build();
    store.insert_event(&event).await.unwrap();
    let attendee = UserId::new();
    let occurrence = format!("{}_2025-01-13", event.id);
    engine.interact(attendee, &occurrence, "going").await.unwrap();

    clock.set(start_of(&event) + Duration::hours(8));
    let receipt = engine.submit_rating(attendee, &occurrence, 5, None).await.unwrap();

    assert_eq!(receipt.rating.event_id, event.id);
}

#[tokio::test]
async fn event_on_the_last_representable_date_stays_too_early() {
    let (engine, _) = engine_with(test_clock());
    let mut new = new_event("Far future");
    new.date = NaiveDate::MAX;
    new.time = hm(23, 0);
    let event = engine.create_event(UserId::new(), new).await.unwrap();
    let id = event.id.to_string();
    let attendee = UserId::new();
    engine.interact(attendee, &id, "going").await.unwrap();

    let view = engine.check_rating_eligibility(attendee, &id).await.unwrap();
    assert!(!view.can_rate);
    assert_eq!(view.code.as_deref(), Some("TOO_EARLY"));

    let err = engine.submit_rating(attendee, &id, 5, None).await.unwrap_err();
    assert!(matches!(err, EngineError::TooEarly { .. }));
}
