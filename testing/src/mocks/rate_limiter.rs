//! Mock rate limiter for testing.

use eventdeck_core::environment::{Clock, SystemClock};
use eventdeck_core::error::{EngineError, Result};
use eventdeck_core::providers::RateLimiter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory sliding-window rate limiter.
///
/// Timestamps come from the injected [`Clock`], so tests can step a
/// `ManualClock` past the window instead of sleeping. Old entries are only
/// pruned when their key is touched.
#[derive(Clone)]
pub struct MockRateLimiter {
    /// Map of key -> request timestamps in milliseconds
    attempts: Arc<Mutex<HashMap<String, Vec<i64>>>>,
    clock: Arc<dyn Clock>,
}

impl MockRateLimiter {
    /// Create a limiter on the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a limiter on `clock`
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn window_start(&self, window: Duration) -> (i64, i64) {
        let now_ms = self.clock.now().timestamp_millis();
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        (now_ms, now_ms.saturating_sub(window_ms))
    }
}

impl Default for MockRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRateLimiter").finish_non_exhaustive()
    }
}

impl RateLimiter for MockRateLimiter {
    async fn check_and_record(&self, key: &str, max_requests: u32, window: Duration) -> Result<()> {
        let (now_ms, window_start) = self.window_start(window);
        let mut attempts = self
            .attempts
            .lock()
            .map_err(|_| EngineError::Storage("Mutex lock failed".into()))?;

        let timestamps = attempts.entry(key.to_string()).or_default();
        timestamps.retain(|&ts| ts > window_start);

        if timestamps.len() >= usize::try_from(max_requests).unwrap_or(usize::MAX) {
            let oldest = timestamps.iter().min().copied().unwrap_or(now_ms);
            let retry_ms = oldest.saturating_sub(window_start).max(0);
            tracing::warn!(
                rate_limit_exceeded = true,
                key = %key,
                max_requests,
                "Mock rate limit exceeded"
            );
            return Err(EngineError::RateLimited {
                retry_after: Duration::from_millis(retry_ms.unsigned_abs()),
            });
        }

        timestamps.push(now_ms);
        Ok(())
    }
}
