//! # Eventdeck Core
//!
//! Event query and capacity engine for an event-discovery platform.
//!
//! Attendees browse events near them and mark them going, liked or passed;
//! organizers create possibly-recurring events with an optional attendee cap.
//! This crate holds every rule of that system and no I/O:
//!
//! - [`geo`]: Haversine distance
//! - [`recurrence`]: expansion of recurring definitions into dated occurrences
//! - [`query`]: candidate filtering, per-occurrence filters and sorting
//! - [`capacity`]: the going-capacity and waitlist admission rules
//! - [`eligibility`]: the time- and attendance-gated rating check
//! - [`service::EventEngine`]: the operations, orchestrated over the
//!   [`providers`] traits
//!
//! ## Architecture
//!
//! - Functional core: filtering, expansion, sorting and admission rules are
//!   pure functions over domain types.
//! - Imperative shell: stores implement [`providers::EventStore`] and run the
//!   capacity rules inside their own lock-and-recheck transactions.
//! - Dependencies (store, clock, rate limiter) are injected, never global.
//!
//! ## Example
//!
//! ```ignore
//! use eventdeck_core::prelude::*;
//!
//! let engine = EventEngine::new(store, Arc::new(SystemClock), EngineConfig::default());
//!
//! let nearby = engine
//!     .list_events(&ListEventsQuery {
//!         user_location: Some(GeoPoint::new(52.52, 13.405)),
//!         radius_km: Some(25.0),
//!         sort_by: SortBy::Distance,
//!         ..ListEventsQuery::default()
//!     })
//!     .await?;
//!
//! engine.interact(user_id, &nearby[0].id.to_string(), "going").await?;
//! ```

pub mod capacity;
pub mod config;
pub mod eligibility;
pub mod environment;
pub mod error;
pub mod geo;
pub mod metrics;
pub mod providers;
pub mod query;
pub mod recurrence;
pub mod service;
pub mod types;
pub mod validation;

/// Commonly used types.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::eligibility::RatingEligibility;
    pub use crate::environment::{Clock, SystemClock};
    pub use crate::error::{EngineError, ErrorKind, Result};
    pub use crate::providers::{
        EventRepository, EventStore, InteractionRepository, RateLimiter, RatingRepository,
        WaitlistRepository,
    };
    pub use crate::query::{CandidateFilter, ListEventsQuery, SortBy};
    pub use crate::recurrence::DateWindow;
    pub use crate::service::EventEngine;
    pub use crate::types::{
        EventDefinition, EventDetail, EventId, EventOccurrence, EventStatus, Frequency, GeoPoint,
        Interaction, InteractionCounts, InteractionType, NewEvent, OccurrenceId,
        OrganizerRatingSummary, Rating, RatingReceipt, RecurrenceRule, UserId, WaitlistEntry,
        WaitlistStatus,
    };
}
