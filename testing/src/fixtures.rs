//! Builders for test data.

use chrono::{NaiveDate, NaiveTime};
use eventdeck_core::types::{
    EventDefinition, EventId, EventStatus, Frequency, GeoPoint, NewEvent, RecurrenceRule, UserId,
};

use crate::mocks::test_clock;
use eventdeck_core::environment::Clock;

/// Builder for [`EventDefinition`] with sensible defaults: an active,
/// unlimited, one-off "Test event" on 2025-01-10 at 19:00 with no location.
///
/// # Example
///
/// ```
/// use eventdeck_testing::fixtures::EventBuilder;
///
/// let event = EventBuilder::new().title("Open mic").capacity(2).build();
/// assert_eq!(event.capacity, Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: EventDefinition,
}

impl EventBuilder {
    /// Start from the defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            event: EventDefinition {
                id: EventId::new(),
                organizer_id: UserId::new(),
                title: "Test event".into(),
                description: String::new(),
                category: "social".into(),
                date: ymd(2025, 1, 10),
                time: hm(19, 0),
                location: None,
                location_name: None,
                capacity: None,
                recurrence: None,
                status: EventStatus::Active,
                created_at: test_clock().now(),
            },
        }
    }

    /// Set the organizer
    #[must_use]
    pub const fn organizer(mut self, organizer_id: UserId) -> Self {
        self.event.organizer_id = organizer_id;
        self
    }

    /// Set the title
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.event.title = title.to_string();
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.event.description = description.to_string();
        self
    }

    /// Set the category
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.event.category = category.to_string();
        self
    }

    /// Set date and time of the first occurrence
    #[must_use]
    pub const fn starts(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.event.date = date;
        self.event.time = time;
        self
    }

    /// Set coordinates
    #[must_use]
    pub const fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.event.location = Some(GeoPoint::new(latitude, longitude));
        self
    }

    /// Limit going attendees
    #[must_use]
    pub const fn capacity(mut self, capacity: u32) -> Self {
        self.event.capacity = Some(capacity);
        self
    }

    /// Make the event recur until `end_date`
    #[must_use]
    pub const fn recurring(mut self, frequency: Frequency, end_date: NaiveDate) -> Self {
        self.event.recurrence = Some(RecurrenceRule {
            frequency,
            end_date,
        });
        self
    }

    /// Mark cancelled
    #[must_use]
    pub const fn cancelled(mut self) -> Self {
        self.event.status = EventStatus::Cancelled;
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> EventDefinition {
        self.event
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid creation payload dated after [`test_clock`].
#[must_use]
pub fn new_event(title: &str) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: String::new(),
        category: "social".into(),
        date: ymd(2025, 2, 1),
        time: hm(20, 0),
        location: None,
        location_name: None,
        capacity: None,
        recurrence: None,
    }
}

/// Calendar date; out-of-range input yields the minimum date.
#[must_use]
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Time of day; out-of-range input yields midnight.
#[must_use]
pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
