//! Input validation for event creation and ratings.

use crate::error::{EngineError, Result};
use crate::types::NewEvent;
use chrono::{Months, NaiveDate};

const MAX_TITLE_LENGTH: usize = 200;

/// Check a new event before it is stored.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] describing the first failed check.
pub fn validate_new_event(event: &NewEvent, today: NaiveDate, max_recurrence_months: u32) -> Result<()> {
    let title = event.title.trim();
    if title.is_empty() {
        return Err(invalid("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(invalid(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    if event.category.trim().is_empty() {
        return Err(invalid("category is required"));
    }
    if event.date < today {
        return Err(invalid("event date cannot be in the past"));
    }
    if event.capacity == Some(0) {
        return Err(invalid("capacity must be at least 1"));
    }
    if let Some(location) = event.location {
        if !(-90.0..=90.0).contains(&location.latitude) {
            return Err(invalid("latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&location.longitude) {
            return Err(invalid("longitude must be between -180 and 180"));
        }
    }
    if let Some(rule) = event.recurrence {
        if rule.end_date < event.date {
            return Err(invalid("recurrence end date is before the event date"));
        }
        let latest = event
            .date
            .checked_add_months(Months::new(max_recurrence_months))
            .unwrap_or(NaiveDate::MAX);
        if rule.end_date > latest {
            return Err(invalid(format!(
                "recurrence cannot extend more than {max_recurrence_months} months past the event date"
            )));
        }
    }
    Ok(())
}

/// Check a rating value and normalize its comment.
///
/// Blank comments become `None`.
///
/// # Errors
///
/// - [`EngineError::InvalidRating`] unless `value` is 1..=5
/// - [`EngineError::Validation`] if the comment exceeds `max_comment_length`
pub fn validate_rating(
    value: i64,
    comment: Option<&str>,
    max_comment_length: usize,
) -> Result<(u8, Option<String>)> {
    let rating = u8::try_from(value)
        .ok()
        .filter(|v| (1..=5).contains(v))
        .ok_or(EngineError::InvalidRating(value))?;

    let comment = comment.map(str::trim).filter(|c| !c.is_empty());
    if let Some(c) = comment {
        if c.chars().count() > max_comment_length {
            return Err(invalid(format!(
                "comment must be at most {max_comment_length} characters"
            )));
        }
    }

    Ok((rating, comment.map(str::to_string)))
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::Validation(message.into())
}
