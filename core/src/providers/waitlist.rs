//! Waitlist repository trait.

use crate::error::Result;
use crate::types::{EventId, UserId, WaitlistEntry};
use chrono::{DateTime, Utc};

/// Per-event FIFO queue of users waiting for a going slot.
///
/// Order is insertion order, tracked by a monotonic sequence rather than by
/// timestamp. Leaving and rejoining puts the user at the end.
pub trait WaitlistRepository: Send + Sync {
    /// Join the waitlist, or return the existing entry.
    ///
    /// Must run as one transaction that locks the event row, re-reads the
    /// going count and the user's interaction, and applies
    /// [`crate::capacity::ensure_waitlist_joinable`].
    ///
    /// # Errors
    ///
    /// - `EngineError::EventNotFound` if the event does not exist
    /// - `EngineError::EventCancelled` if the event was cancelled
    /// - `EngineError::WaitlistNotApplicable`, `EngineError::AlreadyGoing`,
    ///   `EngineError::EventNotFull` per the join preconditions
    /// - `EngineError::Storage` if the store fails
    fn join_waitlist(
        &self,
        user_id: UserId,
        event_id: EventId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<WaitlistEntry>> + Send;

    /// Remove the user's entry. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn leave_waitlist(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// 1-indexed rank of the user, `None` if not queued.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn waitlist_position(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<Option<u32>>> + Send;

    /// Number of queued users.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn waitlist_count(
        &self,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<u32>> + Send;
}
