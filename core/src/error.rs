//! Error types for the event engine.
//!
//! Every business-rule failure has its own variant so callers can branch on
//! [`EngineError::code`] instead of parsing messages. Store failures are
//! collapsed into [`EngineError::Storage`] and surface as internal errors.

use crate::types::EventId;
use std::time::Duration;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Broad category of an [`EngineError`].
///
/// The HTTP shell maps each kind to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced event (or waitlist entry) does not exist.
    NotFound,
    /// A capacity or waitlist precondition failed.
    Conflict,
    /// The caller may not perform this action (yet).
    Forbidden,
    /// Malformed identifier, interaction type, rating value or event payload.
    InvalidArgument,
    /// The caller exceeded the request rate.
    RateLimited,
    /// Store or infrastructure failure.
    Internal,
}

/// Errors produced by the event engine.
#[derive(Debug, Error)]
pub enum EngineError {
    // ═══════════════════════════════════════════════════════════════════════
    // Not found
    // ═══════════════════════════════════════════════════════════════════════
    /// Event does not exist.
    #[error("Event {0} not found")]
    EventNotFound(EventId),

    /// Leave or status lookup for a user who is not on the waitlist.
    #[error("User is not on the waitlist for event {0}")]
    NotOnWaitlist(EventId),

    // ═══════════════════════════════════════════════════════════════════════
    // Capacity and waitlist conflicts
    // ═══════════════════════════════════════════════════════════════════════
    /// The event already has `capacity` going attendees.
    #[error("Event is at capacity ({capacity} attendees)")]
    CapacityExceeded {
        /// Event that is full.
        event_id: EventId,
        /// Declared capacity.
        capacity: u32,
    },

    /// Waitlist requested for an event without a capacity limit.
    #[error("Event has unlimited capacity and no waitlist")]
    WaitlistNotApplicable(EventId),

    /// Waitlist requested by a user who is already going.
    #[error("You are already going to this event")]
    AlreadyGoing(EventId),

    /// Waitlist requested while free spots remain.
    #[error("Event still has {available} spot(s) available, join directly instead")]
    EventNotFull {
        /// Event with free spots.
        event_id: EventId,
        /// Number of free spots.
        available: u32,
    },

    /// Interaction with a cancelled event.
    #[error("Event {0} has been cancelled")]
    EventCancelled(EventId),

    // ═══════════════════════════════════════════════════════════════════════
    // Forbidden
    // ═══════════════════════════════════════════════════════════════════════
    /// Organizers cannot rate their own events.
    #[error("You cannot rate your own event")]
    InvalidSelfRating,

    /// Only users who marked themselves as going may rate.
    #[error("Only attendees who were going can rate this event")]
    NotAttending,

    /// The rating window has not opened yet.
    #[error("Ratings are not open yet ({hours_remaining} hour(s) remaining)")]
    TooEarly {
        /// Whole hours (rounded up) until ratings open.
        hours_remaining: i64,
    },

    /// Mutation of an event by someone other than its organizer.
    #[error("Only the organizer can modify this event")]
    NotOrganizer,

    // ═══════════════════════════════════════════════════════════════════════
    // Invalid arguments
    // ═══════════════════════════════════════════════════════════════════════
    /// Event or occurrence identifier could not be parsed.
    #[error("Invalid event id: {0}")]
    InvalidEventId(String),

    /// Interaction type is not one of going, like or pass.
    #[error("Invalid interaction type: {0}")]
    InvalidType(String),

    /// Rating outside 1..=5.
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),

    /// Event payload or comment failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════════════════
    /// Too many requests in the current window.
    #[error("Too many requests, retry after {retry_after:?}")]
    RateLimited {
        /// Time until the window frees up.
        retry_after: Duration,
    },

    /// Store failure. Details are logged, not shown to callers.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EventNotFound(_) | Self::NotOnWaitlist(_) => ErrorKind::NotFound,
            Self::CapacityExceeded { .. }
            | Self::WaitlistNotApplicable(_)
            | Self::AlreadyGoing(_)
            | Self::EventNotFull { .. }
            | Self::EventCancelled(_) => ErrorKind::Conflict,
            Self::InvalidSelfRating
            | Self::NotAttending
            | Self::TooEarly { .. }
            | Self::NotOrganizer => ErrorKind::Forbidden,
            Self::InvalidEventId(_)
            | Self::InvalidType(_)
            | Self::InvalidRating(_)
            | Self::Validation(_) => ErrorKind::InvalidArgument,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::NotOnWaitlist(_) => "NOT_ON_WAITLIST",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::WaitlistNotApplicable(_) => "WAITLIST_NOT_APPLICABLE",
            Self::AlreadyGoing(_) => "ALREADY_GOING",
            Self::EventNotFull { .. } => "EVENT_NOT_FULL",
            Self::EventCancelled(_) => "EVENT_CANCELLED",
            Self::InvalidSelfRating => "INVALID_SELF_RATING",
            Self::NotAttending => "NOT_ATTENDING",
            Self::TooEarly { .. } => "TOO_EARLY",
            Self::NotOrganizer => "NOT_ORGANIZER",
            Self::InvalidEventId(_) => "INVALID_EVENT_ID",
            Self::InvalidType(_) => "INVALID_TYPE",
            Self::InvalidRating(_) => "INVALID_RATING",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller caused this error (as opposed to the store).
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }
}
