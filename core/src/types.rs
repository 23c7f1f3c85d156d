//! Domain types for event discovery, attendance and ratings.
//!
//! Persisted state (interactions, waitlist entries, ratings) is always keyed on
//! the parent [`EventId`]. Occurrences of a recurring event are derived views
//! identified by an [`OccurrenceId`] and never stored.

use crate::error::{EngineError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event definition
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user (attendee or organizer)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one occurrence: the parent event plus, for recurring events,
/// the occurrence date.
///
/// The wire form is `{parentId}` for a one-off event and
/// `{parentId}_{YYYY-MM-DD}` for an expanded occurrence.
/// [`OccurrenceId::parse`] is the single place that form is decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OccurrenceId {
    /// Event definition all state is recorded against.
    pub parent: EventId,
    /// Occurrence date for expanded recurring events.
    pub date: Option<NaiveDate>,
}

impl OccurrenceId {
    /// Identity of a one-off event.
    #[must_use]
    pub const fn single(parent: EventId) -> Self {
        Self { parent, date: None }
    }

    /// Identity of one expanded occurrence of a recurring event.
    #[must_use]
    pub const fn recurring(parent: EventId, date: NaiveDate) -> Self {
        Self {
            parent,
            date: Some(date),
        }
    }

    /// Parse a caller-supplied event id, with or without a date suffix.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEventId`] if the parent part is not a UUID
    /// or the suffix is not an ISO date.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = || EngineError::InvalidEventId(raw.to_string());

        match raw.rsplit_once('_') {
            Some((parent, date)) => {
                let parent = Uuid::parse_str(parent).map_err(|_| invalid())?;
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
                Ok(Self::recurring(EventId::from_uuid(parent), date))
            }
            None => {
                let parent = Uuid::parse_str(raw).map_err(|_| invalid())?;
                Ok(Self::single(EventId::from_uuid(parent)))
            }
        }
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{}_{}", self.parent, date.format("%Y-%m-%d")),
            None => write!(f, "{}", self.parent),
        }
    }
}

impl FromStr for OccurrenceId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for OccurrenceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OccurrenceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Event definitions
// ============================================================================

/// WGS84 coordinates in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, -90..=90
    pub latitude: f64,
    /// Longitude, -180..=180
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Lifecycle status of an event definition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Listed and open for interactions
    Active,
    /// Soft-terminated by the organizer
    Cancelled,
}

impl EventStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for EventStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Storage(format!("Unknown event status: {other}"))),
        }
    }
}

/// How often a recurring event repeats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day
    Daily,
    /// Every 7 days
    Weekly,
    /// Every 14 days
    Biweekly,
    /// Same day of every calendar month
    Monthly,
}

impl Frequency {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::Validation(format!(
                "Unknown recurrence type: {other}"
            ))),
        }
    }
}

/// Recurrence of an event definition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// Step between occurrences
    pub frequency: Frequency,
    /// Last date an occurrence may fall on (inclusive)
    pub end_date: NaiveDate,
}

/// An event as created by its organizer.
///
/// `date` is the first occurrence; `date` and `time` are interpreted in UTC.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Event identifier
    pub id: EventId,
    /// Owner of the event
    pub organizer_id: UserId,
    /// Title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Category name
    pub category: String,
    /// Date of the first occurrence
    pub date: NaiveDate,
    /// Start time of day
    pub time: NaiveTime,
    /// Coordinates, if the event has a physical location
    pub location: Option<GeoPoint>,
    /// Human-readable venue
    pub location_name: Option<String>,
    /// Maximum going attendees, `None` means unlimited
    pub capacity: Option<u32>,
    /// Recurrence, `None` for one-off events
    pub recurrence: Option<RecurrenceRule>,
    /// Lifecycle status
    pub status: EventStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl EventDefinition {
    /// Start instant of the first occurrence
    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }

    /// Whether interactions are accepted
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EventStatus::Active
    }

    /// Materialize the occurrence of this event on `date`.
    ///
    /// Recurring events get a date-suffixed id; one-off events keep the parent id.
    #[must_use]
    pub fn occurrence_on(&self, date: NaiveDate) -> EventOccurrence {
        let id = if self.recurrence.is_some() {
            OccurrenceId::recurring(self.id, date)
        } else {
            OccurrenceId::single(self.id)
        };

        EventOccurrence {
            id,
            event_id: self.id,
            organizer_id: self.organizer_id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            date,
            time: self.time,
            location: self.location,
            location_name: self.location_name.clone(),
            capacity: self.capacity,
            recurrence: self.recurrence,
            status: self.status,
            interaction_counts: InteractionCounts::default(),
            distance_km: None,
        }
    }
}

/// Payload for creating an event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Category name
    pub category: String,
    /// Date of the first occurrence
    pub date: NaiveDate,
    /// Start time of day
    pub time: NaiveTime,
    /// Coordinates
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Human-readable venue
    #[serde(default)]
    pub location_name: Option<String>,
    /// Maximum going attendees
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Recurrence
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
}

/// One concrete, listable instance of an event definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventOccurrence {
    /// Composite identity
    pub id: OccurrenceId,
    /// Parent event id
    pub event_id: EventId,
    /// Owner of the parent event
    pub organizer_id: UserId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Category
    pub category: String,
    /// Date of this occurrence
    pub date: NaiveDate,
    /// Start time of day
    pub time: NaiveTime,
    /// Coordinates
    pub location: Option<GeoPoint>,
    /// Human-readable venue
    pub location_name: Option<String>,
    /// Capacity of the parent event
    pub capacity: Option<u32>,
    /// Recurrence of the parent event
    pub recurrence: Option<RecurrenceRule>,
    /// Status of the parent event
    pub status: EventStatus,
    /// Counts for the parent event, shared by all its occurrences
    pub interaction_counts: InteractionCounts,
    /// Distance from the requesting user, when both sides have coordinates
    pub distance_km: Option<f64>,
}

/// An event with its live counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    /// Definition
    pub event: EventDefinition,
    /// Interaction counts
    pub interaction_counts: InteractionCounts,
    /// Number of users on the waitlist
    pub waitlist_count: u32,
}

// ============================================================================
// Interactions
// ============================================================================

/// A user's relationship to an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    /// Attending; counts against capacity
    Going,
    /// Interested
    Like,
    /// Not interested
    Pass,
}

impl InteractionType {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Like => "like",
            Self::Pass => "pass",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "going" => Ok(Self::Going),
            "like" => Ok(Self::Like),
            "pass" => Ok(Self::Pass),
            _ => Err(EngineError::InvalidType(s.to_string())),
        }
    }
}

/// At most one per (user, event); re-interacting overwrites `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Acting user
    pub user_id: UserId,
    /// Parent event
    pub event_id: EventId,
    /// Current interaction type
    #[serde(rename = "type")]
    pub kind: InteractionType,
    /// First interaction
    pub created_at: DateTime<Utc>,
    /// Last change of `kind`
    pub updated_at: DateTime<Utc>,
}

/// Per-event interaction tallies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionCounts {
    /// Going attendees
    pub going: u32,
    /// Likes
    pub like: u32,
    /// Passes
    pub pass: u32,
}

impl InteractionCounts {
    /// Popularity score used for sorting: going plus likes
    #[must_use]
    pub const fn popularity(&self) -> u32 {
        self.going.saturating_add(self.like)
    }

    /// Add `count` interactions of `kind`
    pub const fn add(&mut self, kind: InteractionType, count: u32) {
        match kind {
            InteractionType::Going => self.going += count,
            InteractionType::Like => self.like += count,
            InteractionType::Pass => self.pass += count,
        }
    }
}

// ============================================================================
// Waitlist
// ============================================================================

/// A user's place in an event's waitlist
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Waiting user
    pub user_id: UserId,
    /// Parent event
    pub event_id: EventId,
    /// 1-indexed rank
    pub position: u32,
    /// Join time (informational, ordering uses insertion sequence)
    pub created_at: DateTime<Utc>,
}

/// Waitlist view for one user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistStatus {
    /// Whether the user is queued
    pub on_waitlist: bool,
    /// 1-indexed rank, if queued
    pub position: Option<u32>,
    /// Total queued users
    pub total_count: u32,
}

// ============================================================================
// Ratings
// ============================================================================

/// An attendee's rating of an event's organizer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Rated event
    pub event_id: EventId,
    /// Rating attendee
    pub attendee_id: UserId,
    /// Organizer being rated
    pub organizer_id: UserId,
    /// 1..=5
    pub rating: u8,
    /// Optional comment
    pub comment: Option<String>,
    /// First submission
    pub created_at: DateTime<Utc>,
    /// Last resubmission
    pub updated_at: DateTime<Utc>,
}

/// Aggregate of every rating across an organizer's events
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganizerRatingSummary {
    /// Organizer
    pub organizer_id: UserId,
    /// Mean rating, 0 when unrated
    pub average_rating: f64,
    /// Number of ratings
    pub rating_count: u32,
}

impl OrganizerRatingSummary {
    /// Build a summary, rounding the mean to two decimals
    #[must_use]
    pub fn new(organizer_id: UserId, average_rating: f64, rating_count: u32) -> Self {
        Self {
            organizer_id,
            average_rating: (average_rating * 100.0).round() / 100.0,
            rating_count,
        }
    }
}

/// Result of a rating submission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingReceipt {
    /// Stored rating
    pub rating: Rating,
    /// Organizer aggregate including this rating
    pub organizer_summary: OrganizerRatingSummary,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn occurrence_id_round_trips_through_wire_form() {
        let parent = EventId::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let id = OccurrenceId::recurring(parent, date);

        let wire = id.to_string();
        assert_eq!(wire, format!("{parent}_2024-01-08"));
        assert_eq!(OccurrenceId::parse(&wire).ok(), Some(id));
    }

    #[test]
    fn bare_parent_id_parses_without_date() {
        let parent = EventId::new();
        let id = OccurrenceId::parse(&parent.to_string()).ok();
        assert_eq!(id, Some(OccurrenceId::single(parent)));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        for raw in ["", "not-a-uuid", "x_2024-01-01"] {
            assert!(matches!(
                OccurrenceId::parse(raw),
                Err(EngineError::InvalidEventId(_))
            ));
        }
        let bad_date = format!("{}_2024-13-01", EventId::new());
        assert!(OccurrenceId::parse(&bad_date).is_err());
    }

    #[test]
    fn interaction_type_parsing() {
        assert_eq!("going".parse::<InteractionType>().ok(), Some(InteractionType::Going));
        assert_eq!(" Like ".parse::<InteractionType>().ok(), Some(InteractionType::Like));
        assert!(matches!(
            "maybe".parse::<InteractionType>(),
            Err(EngineError::InvalidType(t)) if t == "maybe"
        ));
    }

    #[test]
    fn wire_shapes() {
        let parent = EventId::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let id = serde_json::to_value(OccurrenceId::recurring(parent, date)).unwrap();
        assert_eq!(id, serde_json::json!(format!("{parent}_2024-01-08")));

        let status = serde_json::to_value(EventStatus::Cancelled).unwrap();
        assert_eq!(status, serde_json::json!("cancelled"));

        let back: OccurrenceId = serde_json::from_value(id).unwrap();
        assert_eq!(back.parent, parent);
    }

    #[test]
    fn popularity_ignores_passes() {
        let counts = InteractionCounts {
            going: 3,
            like: 2,
            pass: 10,
        };
        assert_eq!(counts.popularity(), 5);
    }

    #[test]
    fn summary_rounds_to_two_decimals() {
        let summary = OrganizerRatingSummary::new(UserId::new(), 13.0 / 3.0, 3);
        assert!((summary.average_rating - 4.33).abs() < f64::EPSILON);
    }
}
