//! Redis-based rate limiter.
//!
//! Sliding window over a sorted set per key: each request is a member scored
//! by its timestamp in milliseconds. Trimming, counting and recording run in
//! one Lua script, so server instances sharing the Redis see one window and a
//! rejected request never occupies a slot.

use eventdeck_core::error::{EngineError, Result};
use eventdeck_core::providers::RateLimiter;
use redis::Client;
use redis::aio::ConnectionManager;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Trim, count, then record only if under the limit.
///
/// Returns `{allowed, count, oldest_score}`.
const SLIDING_WINDOW_SCRIPT: &str = r"
    local key = KEYS[1]
    local now_ms = tonumber(ARGV[1])
    local window_start = tonumber(ARGV[2])
    local max_requests = tonumber(ARGV[3])

    redis.call('ZREMRANGEBYSCORE', key, 0, window_start)
    local count = redis.call('ZCARD', key)

    if count >= max_requests then
        local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
        local oldest_ms = now_ms
        if oldest[2] then
            oldest_ms = tonumber(oldest[2])
        end
        return {0, count, oldest_ms}
    end

    redis.call('ZADD', key, now_ms, ARGV[4])
    redis.call('EXPIRE', key, ARGV[5])
    return {1, count + 1, 0}
";

/// `Redis`-backed sliding-window rate limiter.
///
/// ```no_run
/// use eventdeck_core::providers::RateLimiter;
/// use eventdeck_web::rate_limiter_redis::RedisRateLimiter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = RedisRateLimiter::new("redis://127.0.0.1:6379").await?;
/// limiter.check_and_record("writes:alice", 30, std::time::Duration::from_secs(60)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn_manager: ConnectionManager,
}

impl RedisRateLimiter {
    /// Connect to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| EngineError::Storage(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            EngineError::Storage(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    fn rate_limit_key(key: &str) -> String {
        format!("eventdeck:rate_limit:{key}")
    }

    fn now_ms() -> i64 {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
    }

    fn window_ms(window: Duration) -> i64 {
        i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter").finish_non_exhaustive()
    }
}

impl RateLimiter for RedisRateLimiter {
    async fn check_and_record(&self, key: &str, max_requests: u32, window: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let rate_key = Self::rate_limit_key(key);
        let now_ms = Self::now_ms();
        let window_ms = Self::window_ms(window);
        let window_start = now_ms.saturating_sub(window_ms);
        // Unique member so two requests in the same millisecond both count
        let member = format!("{now_ms}-{}", Uuid::new_v4());
        let ttl_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX).saturating_add(1);

        let (allowed, count, oldest_ms): (i64, i64, i64) = redis::Script::new(SLIDING_WINDOW_SCRIPT)
            .key(&rate_key)
            .arg(now_ms)
            .arg(window_start)
            .arg(max_requests)
            .arg(&member)
            .arg(ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Redis script failed during rate limit check");
                EngineError::Storage(format!("Failed to check and record rate limit: {e}"))
            })?;

        if allowed == 0 {
            let retry_ms = oldest_ms.saturating_sub(window_start).max(0);

            tracing::warn!(
                rate_limit_exceeded = true,
                key = %key,
                count,
                max_requests,
                window_ms,
                "Rate limit exceeded"
            );

            return Err(EngineError::RateLimited {
                retry_after: Duration::from_millis(retry_ms.unsigned_abs()),
            });
        }

        tracing::debug!(key = %key, count, max_requests, "Rate limit check passed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // Needs a running Redis: docker run -d -p 6379:6379 redis:7-alpine

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_window_limits_per_key() {
        let limiter = RedisRateLimiter::new("redis://127.0.0.1:6379").await.unwrap();
        let key = format!("test:{}", Uuid::new_v4());
        let window = Duration::from_secs(60);

        for _ in 0..3 {
            limiter.check_and_record(&key, 3, window).await.unwrap();
        }
        for _ in 0..2 {
            let err = limiter.check_and_record(&key, 3, window).await.unwrap_err();
            assert!(matches!(err, EngineError::RateLimited { retry_after } if retry_after <= window));
        }

        // A larger limit on the same key sees only the three accepted requests
        limiter.check_and_record(&key, 4, window).await.unwrap();

        let other = format!("test:{}", Uuid::new_v4());
        limiter.check_and_record(&other, 3, window).await.unwrap();
    }

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(
            RedisRateLimiter::rate_limit_key("writes:42"),
            "eventdeck:rate_limit:writes:42"
        );
    }
}
