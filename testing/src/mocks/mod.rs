//! Mock implementations of the engine's providers.

mod clock;
mod rate_limiter;
mod store;

pub use clock::{FixedClock, ManualClock, test_clock};
pub use rate_limiter::MockRateLimiter;
pub use store::InMemoryEventStore;
