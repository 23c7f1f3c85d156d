//! Capacity enforcement through the engine.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use eventdeck_core::error::EngineError;
use eventdeck_core::providers::EventRepository;
use eventdeck_core::types::{Frequency, InteractionType, UserId};
use eventdeck_testing::fixtures::{EventBuilder, hm, ymd};
use eventdeck_testing::{engine_with, test_clock};
use futures::future::join_all;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_concurrent_going_requests_for_two_spots() {
    let (engine, store) = engine_with(test_clock());
    let event = EventBuilder::new().title("Dinner for two").capacity(2).build();
    store.insert_event(&event).await.unwrap();
    let event_id = event.id.to_string();

    let users: Vec<UserId> = (0..3).map(|_| UserId::new()).collect();
    let handles: Vec<_> = users
        .iter()
        .map(|&user| {
            let engine = engine.clone();
            let event_id = event_id.clone();
            tokio::spawn(async move { (user, engine.interact(user, &event_id, "going").await) })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked"))
        .collect();

    let succeeded = results.iter().filter(|(_, r)| r.is_ok()).count();
    let rejected: Vec<UserId> = results
        .iter()
        .filter(|(_, r)| matches!(r, Err(EngineError::CapacityExceeded { capacity: 2, .. })))
        .map(|(user, _)| *user)
        .collect();

    assert_eq!(succeeded, 2);
    assert_eq!(rejected.len(), 1);

    let entry = engine
        .join_waitlist(rejected[0], &event_id)
        .await
        .expect("full event accepts waitlist joins");
    assert_eq!(entry.position, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn going_count_never_exceeds_capacity_under_load() {
    let (engine, store) = engine_with(test_clock());
    let event = EventBuilder::new().capacity(7).build();
    store.insert_event(&event).await.unwrap();
    let event_id = event.id.to_string();

    let handles: Vec<_> = (0..60)
        .map(|i| {
            let engine = engine.clone();
            let event_id = event_id.clone();
            let kind = if i % 5 == 0 { "like" } else { "going" };
            tokio::spawn(async move { engine.interact(UserId::new(), &event_id, kind).await })
        })
        .collect();
    let outcomes: Vec<_> = join_all(handles).await.into_iter().map(Result::unwrap).collect();

    let going = store
        .interactions_for_event(event.id)
        .unwrap()
        .into_iter()
        .filter(|i| i.kind == InteractionType::Going)
        .count();
    assert_eq!(going, 7);
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 12 + 7);
}

#[tokio::test]
async fn like_then_going_overwrites_the_single_row() {
    let (engine, store) = engine_with(test_clock());
    let event = EventBuilder::new().capacity(5).build();
    store.insert_event(&event).await.unwrap();
    let user = UserId::new();

    engine.interact(user, &event.id.to_string(), "like").await.unwrap();
    let interaction = engine.interact(user, &event.id.to_string(), "going").await.unwrap();

    let rows = store.interactions_for_event(event.id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, InteractionType::Going);
    assert_eq!(interaction.kind, InteractionType::Going);
}

#[tokio::test]
async fn going_user_can_reassert_and_switch_on_a_full_event() {
    let (engine, store) = engine_with(test_clock());
    let event = EventBuilder::new().capacity(1).build();
    store.insert_event(&event).await.unwrap();
    let id = event.id.to_string();
    let attendee = UserId::new();
    let other = UserId::new();

    engine.interact(attendee, &id, "going").await.unwrap();
    engine.interact(attendee, &id, "going").await.expect("already going is not recounted");
    assert!(matches!(
        engine.interact(other, &id, "going").await,
        Err(EngineError::CapacityExceeded { .. })
    ));

    engine.interact(attendee, &id, "pass").await.unwrap();
    engine.interact(other, &id, "going").await.expect("freed slot is available");
}

#[tokio::test]
async fn like_and_pass_are_accepted_on_a_full_event() {
    let (engine, store) = engine_with(test_clock());
    let event = EventBuilder::new().capacity(1).build();
    store.insert_event(&event).await.unwrap();
    let id = event.id.to_string();

    engine.interact(UserId::new(), &id, "going").await.unwrap();

    assert!(engine.interact(UserId::new(), &id, "like").await.is_ok());
    assert!(engine.interact(UserId::new(), &id, "pass").await.is_ok());
}

#[tokio::test]
async fn unlimited_events_accept_everyone() {
    let (engine, store) = engine_with(test_clock());
    let event = EventBuilder::new().build();
    store.insert_event(&event).await.unwrap();

    for _ in 0..25 {
        engine.interact(UserId::new(), &event.id.to_string(), "going").await.unwrap();
    }
    assert_eq!(store.interactions_for_event(event.id).unwrap().len(), 25);
}

#[tokio::test]
async fn occurrence_ids_record_against_the_parent() {
    let (engine, store) = engine_with(test_clock());
    let event = EventBuilder::new()
        .starts(ymd(2025, 1, 6), hm(18, 0))
        .recurring(Frequency::Weekly, ymd(2025, 2, 24))
        .capacity(1)
        .build();
    store.insert_event(&event).await.unwrap();

    let first = format!("{}_2025-01-06", event.id);
    let later = format!("{}_2025-01-20", event.id);

    let interaction = engine.interact(UserId::new(), &first, "going").await.unwrap();
    assert_eq!(interaction.event_id, event.id);

    // Occurrences share one capacity: the parent is already full.
    assert!(matches!(
        engine.interact(UserId::new(), &later, "going").await,
        Err(EngineError::CapacityExceeded { .. })
    ));
}

#[tokio::test]
async fn interaction_failures_are_distinguishable() {
    let (engine, store) = engine_with(test_clock());
    let cancelled = EventBuilder::new().cancelled().build();
    store.insert_event(&cancelled).await.unwrap();
    let user = UserId::new();

    assert!(matches!(
        engine.interact(user, &cancelled.id.to_string(), "maybe").await,
        Err(EngineError::InvalidType(t)) if t == "maybe"
    ));
    assert!(matches!(
        engine.interact(user, &UserId::new().to_string(), "going").await,
        Err(EngineError::EventNotFound(_))
    ));
    assert!(matches!(
        engine.interact(user, "nonsense", "going").await,
        Err(EngineError::InvalidEventId(_))
    ));
    assert!(matches!(
        engine.interact(user, &cancelled.id.to_string(), "going").await,
        Err(EngineError::EventCancelled(_))
    ));
}
