//! Event definition repository trait.

use crate::error::Result;
use crate::query::CandidateFilter;
use crate::types::{EventDefinition, EventId, EventStatus, UserId};

/// Persistence of event definitions.
pub trait EventRepository: Send + Sync {
    /// Store a new definition.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn insert_event(
        &self,
        event: &EventDefinition,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch a definition by parent id.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails. A missing event is `Ok(None)`.
    fn get_event(
        &self,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<Option<EventDefinition>>> + Send;

    /// Change the lifecycle status. Returns `false` if the event does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn set_event_status(
        &self,
        event_id: EventId,
        status: EventStatus,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Delete an event together with its interactions, waitlist and ratings.
    /// Returns `false` if the event does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn delete_event(
        &self,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Definitions matching [`CandidateFilter::matches`].
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn find_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> impl std::future::Future<Output = Result<Vec<EventDefinition>>> + Send;

    /// Every definition owned by `organizer_id`, any status.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn events_by_organizer(
        &self,
        organizer_id: UserId,
    ) -> impl std::future::Future<Output = Result<Vec<EventDefinition>>> + Send;

    /// Verify the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn health_check(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
