//! Rating eligibility.
//!
//! An attendee may rate an event's organizer once they were going and the
//! rating window has opened (by default 8 hours after the event started).
//! Existence of the event is checked by the caller before these rules run.

use crate::error::{EngineError, Result};
use crate::types::{EventDefinition, InteractionType, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Apply the eligibility rules in order: not the organizer, was going,
/// window open.
///
/// # Errors
///
/// - [`EngineError::InvalidSelfRating`] if `rater` organized the event
/// - [`EngineError::NotAttending`] unless `interaction` is going
/// - [`EngineError::TooEarly`] before `starts_at + delay`
pub fn ensure_can_rate(
    event: &EventDefinition,
    rater: UserId,
    interaction: Option<InteractionType>,
    now: DateTime<Utc>,
    delay: Duration,
) -> Result<()> {
    if event.organizer_id == rater {
        return Err(EngineError::InvalidSelfRating);
    }
    if interaction != Some(InteractionType::Going) {
        return Err(EngineError::NotAttending);
    }

    let starts_at = event.starts_at();
    let remaining = match starts_at.checked_add_signed(delay) {
        Some(opens_at) if now >= opens_at => return Ok(()),
        Some(opens_at) => opens_at - now,
        // Opens past the last representable instant
        None => (starts_at - now).checked_add(&delay).unwrap_or(Duration::MAX),
    };
    Err(EngineError::TooEarly {
        hours_remaining: hours_rounded_up(remaining),
    })
}

fn hours_rounded_up(remaining: Duration) -> i64 {
    let seconds = remaining.num_seconds().max(1);
    (seconds + 3599) / 3600
}

/// Answer to "may this user rate this event now?".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEligibility {
    /// Whether a rating would be accepted
    pub can_rate: bool,
    /// Human-readable reason when `can_rate` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Machine-readable reason code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Hours until the window opens, for `TOO_EARLY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<i64>,
}

impl RatingEligibility {
    /// Eligible
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            can_rate: true,
            reason: None,
            code: None,
            hours_remaining: None,
        }
    }

    /// Not eligible because of `error`
    #[must_use]
    pub fn denied(error: &EngineError) -> Self {
        let hours_remaining = match error {
            EngineError::TooEarly { hours_remaining } => Some(*hours_remaining),
            _ => None,
        };
        Self {
            can_rate: false,
            reason: Some(error.to_string()),
            code: Some(error.code().to_string()),
            hours_remaining,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{EventId, EventStatus};
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    fn event(organizer: UserId) -> EventDefinition {
        EventDefinition {
            id: EventId::new(),
            organizer_id: organizer,
            title: "Gallery opening".into(),
            description: String::new(),
            category: "art".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            location: None,
            location_name: None,
            capacity: Some(40),
            recurrence: None,
            status: EventStatus::Active,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        // The event starts 2024-05-10 18:00, so +8h is 2024-05-11 02:00.
        Utc.with_ymd_and_hms(2024, 5, 11, h, m, 0).unwrap()
    }

    #[test]
    fn window_opens_exactly_eight_hours_after_start() {
        let ev = event(UserId::new());
        let attendee = UserId::new();
        let going = Some(InteractionType::Going);

        let early = ensure_can_rate(&ev, attendee, going, at(1, 59), Duration::hours(8));
        assert!(matches!(early, Err(EngineError::TooEarly { hours_remaining: 1 })));

        assert!(ensure_can_rate(&ev, attendee, going, at(2, 0), Duration::hours(8)).is_ok());
    }

    #[test]
    fn hours_remaining_rounds_up() {
        let ev = event(UserId::new());
        let just_started = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();

        let err = ensure_can_rate(&ev, UserId::new(), Some(InteractionType::Going), just_started, Duration::hours(8));
        assert!(matches!(err, Err(EngineError::TooEarly { hours_remaining: 8 })));

        let half_past = Utc.with_ymd_and_hms(2024, 5, 10, 18, 30, 0).unwrap();
        let err = ensure_can_rate(&ev, UserId::new(), Some(InteractionType::Going), half_past, Duration::hours(8));
        assert!(matches!(err, Err(EngineError::TooEarly { hours_remaining: 8 })));
    }

    #[test]
    fn organizer_cannot_rate_even_when_going() {
        let organizer = UserId::new();
        let ev = event(organizer);

        let err = ensure_can_rate(&ev, organizer, Some(InteractionType::Going), at(5, 0), Duration::hours(8));
        assert!(matches!(err, Err(EngineError::InvalidSelfRating)));
    }

    #[test]
    fn likes_and_passes_do_not_qualify() {
        let ev = event(UserId::new());
        for interaction in [None, Some(InteractionType::Like), Some(InteractionType::Pass)] {
            let err = ensure_can_rate(&ev, UserId::new(), interaction, at(5, 0), Duration::hours(8));
            assert!(matches!(err, Err(EngineError::NotAttending)));
        }
    }

    #[test]
    fn not_attending_is_reported_before_too_early() {
        let ev = event(UserId::new());
        let err = ensure_can_rate(&ev, UserId::new(), None, at(0, 0), Duration::hours(8));
        assert!(matches!(err, Err(EngineError::NotAttending)));
    }

    #[test]
    fn event_at_the_end_of_time_is_too_early() {
        let mut ev = event(UserId::new());
        ev.date = NaiveDate::MAX;
        ev.time = NaiveTime::from_hms_opt(23, 0, 0).unwrap();

        let err = ensure_can_rate(&ev, UserId::new(), Some(InteractionType::Going), at(5, 0), Duration::hours(8));
        assert!(matches!(err, Err(EngineError::TooEarly { hours_remaining }) if hours_remaining > 0));
    }

    #[test]
    fn denied_carries_code_and_hours() {
        let view = RatingEligibility::denied(&EngineError::TooEarly { hours_remaining: 3 });
        assert!(!view.can_rate);
        assert_eq!(view.code.as_deref(), Some("TOO_EARLY"));
        assert_eq!(view.hours_remaining, Some(3));
        assert!(RatingEligibility::allowed().can_rate);
    }
}
