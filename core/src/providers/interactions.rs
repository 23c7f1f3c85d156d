//! Interaction repository trait.

use crate::error::Result;
use crate::types::{EventId, Interaction, InteractionCounts, InteractionType, UserId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Persistence of (user, event) interactions.
pub trait InteractionRepository: Send + Sync {
    /// Create or overwrite the user's interaction with an event, enforcing
    /// capacity for going.
    ///
    /// Must run as one transaction: read the event, and when
    /// [`crate::capacity::requires_capacity_check`] holds, lock the event row,
    /// count going interactions and apply
    /// [`crate::capacity::ensure_interaction_admissible`] before writing.
    ///
    /// # Errors
    ///
    /// - `EngineError::EventNotFound` if the event does not exist
    /// - `EngineError::EventCancelled` if the event was cancelled
    /// - `EngineError::CapacityExceeded` if the event is full
    /// - `EngineError::Storage` if the store fails
    fn record_interaction(
        &self,
        user_id: UserId,
        event_id: EventId,
        kind: InteractionType,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Interaction>> + Send;

    /// The user's current interaction with an event.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn get_interaction(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<Option<Interaction>>> + Send;

    /// Counts per event. Events without interactions may be absent.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn interaction_counts(
        &self,
        event_ids: &[EventId],
    ) -> impl std::future::Future<Output = Result<HashMap<EventId, InteractionCounts>>> + Send;
}
