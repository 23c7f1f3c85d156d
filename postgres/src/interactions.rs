//! Interaction storage with the capacity check under an event row lock.

use crate::rows::{CountRow, InteractionRow, capacity_from_db, count_from_db};
use crate::{PostgresStore, db_err};
use chrono::{DateTime, Utc};
use eventdeck_core::capacity;
use eventdeck_core::error::{EngineError, Result};
use eventdeck_core::providers::InteractionRepository;
use eventdeck_core::types::{
    EventId, EventStatus, Interaction, InteractionCounts, InteractionType, UserId,
};
use sqlx::{PgConnection, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

/// Lock the event row for the rest of the transaction.
///
/// Returns the event's status and capacity, or `None` if it does not exist.
pub(crate) async fn lock_event(
    tx: &mut Transaction<'_, Postgres>,
    event_id: EventId,
) -> Result<Option<(EventStatus, Option<u32>)>> {
    let row: Option<(String, Option<i32>)> =
        sqlx::query_as("SELECT status, capacity FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err("lock event"))?;

    row.map(|(status, capacity)| {
        Ok((status.parse()?, capacity.map(capacity_from_db).transpose()?))
    })
    .transpose()
}

pub(crate) async fn going_count(conn: &mut PgConnection, event_id: EventId) -> Result<u32> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM interactions WHERE event_id = $1 AND kind = 'going'",
    )
    .bind(event_id.as_uuid())
    .fetch_one(conn)
    .await
    .map_err(db_err("count going interactions"))?;

    Ok(count_from_db(count))
}

pub(crate) async fn existing_kind(
    conn: &mut PgConnection,
    user_id: UserId,
    event_id: EventId,
) -> Result<Option<InteractionType>> {
    let kind: Option<String> =
        sqlx::query_scalar("SELECT kind FROM interactions WHERE user_id = $1 AND event_id = $2")
            .bind(user_id.as_uuid())
            .bind(event_id.as_uuid())
            .fetch_optional(conn)
            .await
            .map_err(db_err("load interaction"))?;

    kind.map(|k| {
        k.parse()
            .map_err(|_| EngineError::Storage(format!("Unknown interaction kind: {k}")))
    })
    .transpose()
}

impl InteractionRepository for PostgresStore {
    async fn record_interaction(
        &self,
        user_id: UserId,
        event_id: EventId,
        kind: InteractionType,
        at: DateTime<Utc>,
    ) -> Result<Interaction> {
        let mut tx = self.pool.begin().await.map_err(db_err("start transaction"))?;

        // Every writer takes the event row lock, so the count read below
        // cannot change until this transaction commits.
        let (status, capacity) = lock_event(&mut tx, event_id)
            .await?
            .ok_or(EngineError::EventNotFound(event_id))?;
        if status != EventStatus::Active {
            return Err(EngineError::EventCancelled(event_id));
        }

        if capacity::requires_capacity_check(kind, capacity) {
            let existing = existing_kind(&mut tx, user_id, event_id).await?;
            let going = going_count(&mut tx, event_id).await?;
            capacity::ensure_interaction_admissible(event_id, existing, kind, capacity, going)?;
        }

        let row: InteractionRow = sqlx::query_as(
            "INSERT INTO interactions (user_id, event_id, kind, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             ON CONFLICT (user_id, event_id) DO UPDATE
             SET kind = EXCLUDED.kind, updated_at = EXCLUDED.updated_at
             RETURNING user_id, event_id, kind, created_at, updated_at",
        )
        .bind(user_id.as_uuid())
        .bind(event_id.as_uuid())
        .bind(kind.as_str())
        .bind(at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("store interaction"))?;

        tx.commit().await.map_err(db_err("commit interaction"))?;

        Interaction::try_from(row)
    }

    async fn get_interaction(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Option<Interaction>> {
        let row: Option<InteractionRow> = sqlx::query_as(
            "SELECT user_id, event_id, kind, created_at, updated_at
             FROM interactions WHERE user_id = $1 AND event_id = $2",
        )
        .bind(user_id.as_uuid())
        .bind(event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("load interaction"))?;

        row.map(Interaction::try_from).transpose()
    }

    async fn interaction_counts(
        &self,
        event_ids: &[EventId],
    ) -> Result<HashMap<EventId, InteractionCounts>> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Uuid> = event_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<CountRow> = sqlx::query_as(
            "SELECT event_id, kind, COUNT(*) AS count
             FROM interactions WHERE event_id = ANY($1)
             GROUP BY event_id, kind",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("count interactions"))?;

        let mut counts: HashMap<EventId, InteractionCounts> = HashMap::new();
        for row in rows {
            let kind: InteractionType = row
                .kind
                .parse()
                .map_err(|_| EngineError::Storage(format!("Unknown interaction kind: {}", row.kind)))?;
            counts
                .entry(EventId::from_uuid(row.event_id))
                .or_default()
                .add(kind, count_from_db(row.count));
        }
        Ok(counts)
    }
}
