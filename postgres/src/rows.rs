//! Database rows and their conversion into domain types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eventdeck_core::error::{EngineError, Result};
use eventdeck_core::types::{
    EventDefinition, EventId, GeoPoint, Interaction, Rating, RecurrenceRule, UserId,
};
use uuid::Uuid;

/// Column list matching [`EventRow`], qualified by the `e` alias.
pub(crate) const EVENT_COLUMNS: &str = "e.id, e.organizer_id, e.title, e.description, \
    e.category, e.event_date, e.event_time, e.latitude, e.longitude, e.location_name, \
    e.capacity, e.recurrence_kind, e.recurrence_end, e.status, e.created_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventRow {
    id: Uuid,
    organizer_id: Uuid,
    title: String,
    description: String,
    category: String,
    event_date: NaiveDate,
    event_time: NaiveTime,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location_name: Option<String>,
    capacity: Option<i32>,
    recurrence_kind: Option<String>,
    recurrence_end: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for EventDefinition {
    type Error = EngineError;

    fn try_from(row: EventRow) -> Result<Self> {
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        };
        let recurrence = match (row.recurrence_kind, row.recurrence_end) {
            (Some(kind), Some(end_date)) => Some(RecurrenceRule {
                frequency: kind.parse()?,
                end_date,
            }),
            _ => None,
        };

        Ok(Self {
            id: EventId::from_uuid(row.id),
            organizer_id: UserId::from_uuid(row.organizer_id),
            title: row.title,
            description: row.description,
            category: row.category,
            date: row.event_date,
            time: row.event_time,
            location,
            location_name: row.location_name,
            capacity: row.capacity.map(capacity_from_db).transpose()?,
            recurrence,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

pub(crate) fn capacity_from_db(value: i32) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| EngineError::Storage(format!("Negative capacity in database: {value}")))
}

pub(crate) fn capacity_to_db(value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| EngineError::Validation(format!("capacity {value} is too large")))
}

pub(crate) fn count_from_db(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct InteractionRow {
    user_id: Uuid,
    event_id: Uuid,
    kind: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for Interaction {
    type Error = EngineError;

    fn try_from(row: InteractionRow) -> Result<Self> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            event_id: EventId::from_uuid(row.event_id),
            kind: row
                .kind
                .parse()
                .map_err(|_| EngineError::Storage(format!("Unknown interaction kind: {}", row.kind)))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CountRow {
    pub event_id: Uuid,
    pub kind: String,
    pub count: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RatingRow {
    event_id: Uuid,
    attendee_id: Uuid,
    organizer_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = EngineError;

    fn try_from(row: RatingRow) -> Result<Self> {
        Ok(Self {
            event_id: EventId::from_uuid(row.event_id),
            attendee_id: UserId::from_uuid(row.attendee_id),
            organizer_id: UserId::from_uuid(row.organizer_id),
            rating: u8::try_from(row.rating).map_err(|_| {
                EngineError::Storage(format!("Rating out of range in database: {}", row.rating))
            })?,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
