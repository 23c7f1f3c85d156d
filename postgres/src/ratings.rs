//! Rating storage and organizer aggregates.

use crate::rows::{RatingRow, count_from_db};
use crate::{PostgresStore, db_err};
use eventdeck_core::error::Result;
use eventdeck_core::providers::RatingRepository;
use eventdeck_core::types::{OrganizerRatingSummary, Rating, UserId};

impl RatingRepository for PostgresStore {
    async fn upsert_rating(&self, rating: &Rating) -> Result<Rating> {
        // created_at and organizer_id keep their first-written values
        let row: RatingRow = sqlx::query_as(
            "INSERT INTO ratings
                (event_id, attendee_id, organizer_id, rating, comment, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (event_id, attendee_id) DO UPDATE
             SET rating = EXCLUDED.rating,
                 comment = EXCLUDED.comment,
                 updated_at = EXCLUDED.updated_at
             RETURNING event_id, attendee_id, organizer_id, rating, comment, created_at, updated_at",
        )
        .bind(rating.event_id.as_uuid())
        .bind(rating.attendee_id.as_uuid())
        .bind(rating.organizer_id.as_uuid())
        .bind(i16::from(rating.rating))
        .bind(&rating.comment)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("store rating"))?;

        Rating::try_from(row)
    }

    async fn organizer_summary(&self, organizer_id: UserId) -> Result<OrganizerRatingSummary> {
        let (average, count): (f64, i64) = sqlx::query_as(
            "SELECT COALESCE(AVG(rating)::float8, 0) AS average, COUNT(*) AS count
             FROM ratings WHERE organizer_id = $1",
        )
        .bind(organizer_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("summarize ratings"))?;

        Ok(OrganizerRatingSummary::new(
            organizer_id,
            average,
            count_from_db(count),
        ))
    }
}
