//! Application state for Axum handlers.

use crate::config::RateLimitConfig;
use eventdeck_core::error::Result;
use eventdeck_core::providers::{EventStore, RateLimiter};
use eventdeck_core::service::EventEngine;
use eventdeck_core::types::UserId;
use std::sync::Arc;

/// State shared across all HTTP handlers.
///
/// Generic over the store and the rate limiter so the router runs against
/// `PostgreSQL` and Redis in production and in-memory doubles in tests.
pub struct AppState<S, L> {
    /// Engine operations
    pub engine: EventEngine<S>,
    /// Per-user write limiter
    pub rate_limiter: Arc<L>,
    /// Limits applied to writes
    pub rate_limit: RateLimitConfig,
}

impl<S, L> Clone for AppState<S, L> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            rate_limiter: Arc::clone(&self.rate_limiter),
            rate_limit: self.rate_limit,
        }
    }
}

impl<S: EventStore, L: RateLimiter> AppState<S, L> {
    /// Create the state.
    #[must_use]
    pub const fn new(engine: EventEngine<S>, rate_limiter: Arc<L>, rate_limit: RateLimitConfig) -> Self {
        Self {
            engine,
            rate_limiter,
            rate_limit,
        }
    }

    /// Count a write by `user_id` against its window.
    ///
    /// All writes share one window per user.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::RateLimited` once the window is full.
    pub async fn throttle(&self, user_id: UserId) -> Result<()> {
        self.rate_limiter
            .check_and_record(
                &format!("writes:{user_id}"),
                self.rate_limit.max_requests,
                self.rate_limit.window(),
            )
            .await
    }
}
