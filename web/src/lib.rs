//! Axum HTTP shell for the Eventdeck engine.
//!
//! Handlers are thin: they extract the caller and parameters, apply the
//! per-user write limit, call one [`eventdeck_core::service::EventEngine`]
//! operation and map its error to a status with [`AppError`].
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP shell (this crate)         │  ← routing, JSON, identity
//! │                                         │  ← rate limiting, tracing
//! ├─────────────────────────────────────────┤
//! │         eventdeck-core                  │  ← listing, capacity, rating rules
//! ├─────────────────────────────────────────┤
//! │         eventdeck-postgres              │  ← row-locked transactions
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let state = AppState::new(engine, Arc::new(limiter), config.rate_limit);
//! let app = eventdeck_web::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod rate_limiter_redis;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use extractors::{AuthenticatedUser, CorrelationId, OptionalUser, USER_ID_HEADER};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use rate_limiter_redis::RedisRateLimiter;
pub use routes::router;
pub use state::AppState;
