//! Event definition storage.

use crate::rows::{EVENT_COLUMNS, EventRow, capacity_to_db};
use crate::{PostgresStore, db_err};
use eventdeck_core::error::Result;
use eventdeck_core::providers::EventRepository;
use eventdeck_core::query::CandidateFilter;
use eventdeck_core::types::{EventDefinition, EventId, EventStatus, UserId};
use sqlx::{Postgres, QueryBuilder};

/// Escape `LIKE` metacharacters so user input only matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn into_events(rows: Vec<EventRow>) -> Result<Vec<EventDefinition>> {
    rows.into_iter().map(EventDefinition::try_from).collect()
}

impl EventRepository for PostgresStore {
    async fn insert_event(&self, event: &EventDefinition) -> Result<()> {
        let capacity = event.capacity.map(capacity_to_db).transpose()?;

        sqlx::query(
            "INSERT INTO events (
                id, organizer_id, title, description, category, event_date, event_time,
                latitude, longitude, location_name, capacity, recurrence_kind, recurrence_end,
                status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(event.id.as_uuid())
        .bind(event.organizer_id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(event.date)
        .bind(event.time)
        .bind(event.location.map(|l| l.latitude))
        .bind(event.location.map(|l| l.longitude))
        .bind(&event.location_name)
        .bind(capacity)
        .bind(event.recurrence.map(|r| r.frequency.as_str()))
        .bind(event.recurrence.map(|r| r.end_date))
        .bind(event.status.as_str())
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("insert event"))?;

        Ok(())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<EventDefinition>> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = $1"))
                .bind(event_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err("load event"))?;

        row.map(EventDefinition::try_from).transpose()
    }

    async fn set_event_status(&self, event_id: EventId, status: EventStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE events SET status = $2 WHERE id = $1")
            .bind(event_id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err("update event status"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_event(&self, event_id: EventId) -> Result<bool> {
        // Interactions, waitlist entries and ratings go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete event"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_candidates(&self, filter: &CandidateFilter) -> Result<Vec<EventDefinition>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.status = 'active'"
        ));

        if let Some(category) = &filter.category {
            query.push(" AND LOWER(e.category) = LOWER(");
            query.push_bind(category.clone());
            query.push(")");
        }

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            query.push(" AND (e.title ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR e.description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        if let Some(viewer) = filter.viewer {
            let viewer = *viewer.as_uuid();
            query.push(" AND e.organizer_id <> ");
            query.push_bind(viewer);
            query.push(
                " AND NOT EXISTS (SELECT 1 FROM interactions i WHERE i.event_id = e.id AND i.user_id = ",
            );
            query.push_bind(viewer);
            query.push(")");
        }

        let rows = query
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("query candidate events"))?;

        tracing::debug!(candidates = rows.len(), "Loaded candidate events");
        into_events(rows)
    }

    async fn events_by_organizer(&self, organizer_id: UserId) -> Result<Vec<EventDefinition>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.organizer_id = $1
             ORDER BY e.event_date, e.event_time, e.id"
        ))
        .bind(organizer_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("load organizer events"))?;

        into_events(rows)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err("reach database"))?;
        Ok(())
    }
}
