//! Rate limiter trait for write operations.
//!
//! Per-user request counters live behind this trait so handlers stay
//! testable and several server instances can share one window.

use crate::error::Result;
use std::time::Duration;

/// Sliding-window rate limiter.
pub trait RateLimiter: Send + Sync {
    /// Record a request for `key` and fail if the window already holds
    /// `max_requests` requests.
    ///
    /// # Errors
    ///
    /// - `EngineError::RateLimited` if the limit is exceeded
    /// - `EngineError::Storage` if the backing store fails
    fn check_and_record(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
