//! # Eventdeck Testing
//!
//! Testing utilities for the event engine.
//!
//! This crate provides:
//! - [`mocks::InMemoryEventStore`]: every storage provider behind one mutex
//! - [`mocks::FixedClock`] and [`mocks::ManualClock`]: deterministic time
//! - [`mocks::MockRateLimiter`]: sliding window on the injected clock
//! - [`fixtures`]: event builders and date helpers
//!
//! ## Example
//!
//! ```ignore
//! use eventdeck_testing::{engine_with, fixtures::EventBuilder, test_clock};
//!
//! #[tokio::test]
//! async fn going_is_recorded() {
//!     let (engine, store) = engine_with(test_clock());
//!     let event = EventBuilder::new().capacity(2).build();
//!     store.insert_event(&event).await.unwrap();
//!
//!     engine.interact(UserId::new(), &event.id.to_string(), "going").await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod mocks;

use eventdeck_core::config::EngineConfig;
use eventdeck_core::environment::Clock;
use eventdeck_core::service::EventEngine;
use std::sync::Arc;

// Re-export commonly used items
pub use mocks::{FixedClock, InMemoryEventStore, ManualClock, MockRateLimiter, test_clock};

/// Engine over a fresh in-memory store with default configuration.
///
/// Returns the store too so tests can seed and inspect it.
#[must_use]
pub fn engine_with(clock: impl Clock + 'static) -> (EventEngine<InMemoryEventStore>, InMemoryEventStore) {
    let store = InMemoryEventStore::new();
    let engine = EventEngine::new(
        Arc::new(store.clone()),
        Arc::new(clock),
        EngineConfig::default(),
    );
    (engine, store)
}
