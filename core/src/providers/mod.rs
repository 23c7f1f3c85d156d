//! Storage and infrastructure providers.
//!
//! The engine depends on these traits; backends supply implementations
//! (`PostgreSQL` and `Redis` in production, in-memory mocks in tests).
//!
//! # Serialization points
//!
//! [`InteractionRepository::record_interaction`] and
//! [`WaitlistRepository::join_waitlist`] are the two writes guarded by the
//! capacity rule. Implementations must run them as a single transaction that
//! locks the event row, re-reads the going count and then applies
//! [`crate::capacity`]:
//!
//! ```text
//! BEGIN
//!   SELECT ... FROM events WHERE id = $1 FOR UPDATE   -- serialize going writers
//!   SELECT COUNT(*) ... WHERE kind = 'going'          -- re-read under the lock
//!   capacity::ensure_interaction_admissible(..)?      -- shared rule
//!   INSERT ... ON CONFLICT DO UPDATE                   -- write
//! COMMIT
//! ```
//!
//! An in-process mutex is not a substitute: several server instances may
//! share one database.

pub mod events;
pub mod interactions;
pub mod rate_limiter;
pub mod ratings;
pub mod waitlist;

pub use events::EventRepository;
pub use interactions::InteractionRepository;
pub use rate_limiter::RateLimiter;
pub use ratings::RatingRepository;
pub use waitlist::WaitlistRepository;

/// Everything the engine needs from a store.
pub trait EventStore:
    EventRepository + InteractionRepository + WaitlistRepository + RatingRepository
{
}

impl<T> EventStore for T where
    T: EventRepository + InteractionRepository + WaitlistRepository + RatingRepository
{
}
