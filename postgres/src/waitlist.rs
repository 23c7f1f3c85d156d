//! FIFO waitlist storage.

use crate::interactions::{existing_kind, going_count, lock_event};
use crate::rows::count_from_db;
use crate::{PostgresStore, db_err};
use chrono::{DateTime, Utc};
use eventdeck_core::capacity;
use eventdeck_core::error::{EngineError, Result};
use eventdeck_core::providers::WaitlistRepository;
use eventdeck_core::types::{EventId, EventStatus, UserId, WaitlistEntry};

// Position is the number of entries for the event with a sequence at or
// below the user's own, so it is 1-based and closes gaps left by leavers.
const POSITION_QUERY: &str = "SELECT w.created_at,
        (SELECT COUNT(*) FROM waitlist_entries o
         WHERE o.event_id = w.event_id AND o.seq <= w.seq) AS position
    FROM waitlist_entries w
    WHERE w.user_id = $1 AND w.event_id = $2";

#[derive(Debug, sqlx::FromRow)]
struct PositionRow {
    created_at: DateTime<Utc>,
    position: i64,
}

impl WaitlistRepository for PostgresStore {
    async fn join_waitlist(
        &self,
        user_id: UserId,
        event_id: EventId,
        at: DateTime<Utc>,
    ) -> Result<WaitlistEntry> {
        let mut tx = self.pool.begin().await.map_err(db_err("start transaction"))?;

        let (status, capacity) = lock_event(&mut tx, event_id)
            .await?
            .ok_or(EngineError::EventNotFound(event_id))?;
        if status == EventStatus::Cancelled {
            return Err(EngineError::EventCancelled(event_id));
        }
        let existing = existing_kind(&mut tx, user_id, event_id).await?;
        let going = going_count(&mut tx, event_id).await?;
        capacity::ensure_waitlist_joinable(event_id, capacity, existing, going)?;

        sqlx::query(
            "INSERT INTO waitlist_entries (user_id, event_id, created_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, event_id) DO NOTHING",
        )
        .bind(user_id.as_uuid())
        .bind(event_id.as_uuid())
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("insert waitlist entry"))?;

        let row: PositionRow = sqlx::query_as(POSITION_QUERY)
            .bind(user_id.as_uuid())
            .bind(event_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err("load waitlist position"))?;

        tx.commit().await.map_err(db_err("commit waitlist entry"))?;

        Ok(WaitlistEntry {
            user_id,
            event_id,
            position: count_from_db(row.position),
            created_at: row.created_at,
        })
    }

    async fn leave_waitlist(&self, user_id: UserId, event_id: EventId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM waitlist_entries WHERE user_id = $1 AND event_id = $2")
            .bind(user_id.as_uuid())
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete waitlist entry"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn waitlist_position(&self, user_id: UserId, event_id: EventId) -> Result<Option<u32>> {
        let row: Option<PositionRow> = sqlx::query_as(POSITION_QUERY)
            .bind(user_id.as_uuid())
            .bind(event_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("load waitlist position"))?;

        Ok(row.map(|r| count_from_db(r.position)))
    }

    async fn waitlist_count(&self, event_id: EventId) -> Result<u32> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist_entries WHERE event_id = $1")
            .bind(event_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count waitlist entries"))?;

        Ok(count_from_db(count))
    }
}
