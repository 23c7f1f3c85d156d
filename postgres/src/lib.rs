//! `PostgreSQL` storage backend for the Eventdeck engine.
//!
//! [`PostgresStore`] implements every repository trait from
//! `eventdeck_core::providers` over a single connection pool:
//!
//! - Event definitions with soft cancellation and cascading deletes
//! - Interactions keyed by `(user_id, event_id)`, overwritten on change
//! - A FIFO waitlist ordered by a `BIGSERIAL` sequence
//! - Ratings keyed by `(event_id, attendee_id)`
//!
//! Capacity-sensitive writes run in one transaction that takes
//! `SELECT ... FOR UPDATE` on the event row, re-reads the going count and
//! applies the shared rules from `eventdeck_core::capacity` before writing.
//!
//! # Example
//!
//! ```ignore
//! use eventdeck_postgres::{PoolSettings, PostgresStore};
//!
//! let store = PostgresStore::connect("postgres://localhost/eventdeck", &PoolSettings::default()).await?;
//! store.migrate().await?;
//! ```

mod events;
mod interactions;
mod ratings;
mod rows;
mod waitlist;

use eventdeck_core::error::{EngineError, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Connections kept open when idle
    pub min_connections: u32,
    /// How long to wait for a connection
    pub connect_timeout: Duration,
    /// Server-side limit for a single statement
    pub statement_timeout: Duration,
    /// Idle connections are closed after this long
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            statement_timeout: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// `PostgreSQL`-backed event store.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the URL is malformed or the
    /// database is unreachable.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)
            .map_err(|e| EngineError::Storage(format!("Invalid database URL: {e}")))?
            .options([(
                "statement_timeout",
                format!("{}ms", settings.statement_timeout.as_millis()),
            )]);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .idle_timeout(Some(settings.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| EngineError::Storage(format!("Failed to connect: {e}")))?;

        tracing::info!(
            max_connections = settings.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| EngineError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }
}

/// Map a sqlx error to a storage error naming the failed action.
fn db_err(action: &'static str) -> impl FnOnce(sqlx::Error) -> EngineError {
    move |e| EngineError::Storage(format!("Failed to {action}: {e}"))
}
