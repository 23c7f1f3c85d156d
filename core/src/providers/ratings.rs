//! Rating repository trait.

use crate::error::Result;
use crate::types::{OrganizerRatingSummary, Rating, UserId};

/// Persistence of organizer ratings.
pub trait RatingRepository: Send + Sync {
    /// Insert the rating, or overwrite value and comment of the existing
    /// (event, attendee) rating. Returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn upsert_rating(
        &self,
        rating: &Rating,
    ) -> impl std::future::Future<Output = Result<Rating>> + Send;

    /// Average and count over every rating of the organizer's events.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn organizer_summary(
        &self,
        organizer_id: UserId,
    ) -> impl std::future::Future<Output = Result<OrganizerRatingSummary>> + Send;
}
