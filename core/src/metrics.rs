//! Business metrics for the event engine.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `eventdeck_events_created_total` - Events created
//! - `eventdeck_interactions_total{kind}` - Interactions recorded, by type
//! - `eventdeck_capacity_rejections_total` - Going requests refused because the event was full
//! - `eventdeck_waitlist_joins_total` - Waitlist joins
//! - `eventdeck_waitlist_leaves_total` - Waitlist leaves
//! - `eventdeck_ratings_submitted_total{rating}` - Ratings stored, by value
//!
//! ## Histograms
//! - `eventdeck_listing_results` - Occurrences returned per listing
//! - `eventdeck_listing_duration_seconds` - Listing latency

use crate::types::InteractionType;
use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

/// Register metric descriptions. Call once at startup.
pub fn register_business_metrics() {
    describe_counter!("eventdeck_events_created_total", "Total number of events created");
    describe_counter!(
        "eventdeck_interactions_total",
        "Total interactions recorded by type (going, like, pass)"
    );
    describe_counter!(
        "eventdeck_capacity_rejections_total",
        "Going requests rejected because the event was at capacity"
    );
    describe_counter!("eventdeck_waitlist_joins_total", "Total waitlist joins");
    describe_counter!("eventdeck_waitlist_leaves_total", "Total waitlist leaves");
    describe_counter!(
        "eventdeck_ratings_submitted_total",
        "Total ratings stored by value"
    );
    describe_histogram!(
        "eventdeck_listing_results",
        "Number of occurrences returned by a listing"
    );
    describe_histogram!(
        "eventdeck_listing_duration_seconds",
        "Time taken to assemble a listing"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a created event.
pub fn record_event_created() {
    metrics::counter!("eventdeck_events_created_total").increment(1);
}

/// Record a stored interaction.
pub fn record_interaction(kind: InteractionType) {
    metrics::counter!("eventdeck_interactions_total", "kind" => kind.as_str()).increment(1);
}

/// Record a going request refused for capacity.
pub fn record_capacity_rejection() {
    metrics::counter!("eventdeck_capacity_rejections_total").increment(1);
}

/// Record a waitlist join.
pub fn record_waitlist_join() {
    metrics::counter!("eventdeck_waitlist_joins_total").increment(1);
}

/// Record a waitlist leave.
pub fn record_waitlist_leave() {
    metrics::counter!("eventdeck_waitlist_leaves_total").increment(1);
}

/// Record a stored rating.
pub fn record_rating(rating: u8) {
    metrics::counter!("eventdeck_ratings_submitted_total", "rating" => rating.to_string())
        .increment(1);
}

/// Record a completed listing.
#[allow(clippy::cast_precision_loss)] // Result counts are far below 2^52
pub fn record_listing(results: usize, elapsed: Duration) {
    metrics::histogram!("eventdeck_listing_results").record(results as f64);
    metrics::histogram!("eventdeck_listing_duration_seconds").record(elapsed.as_secs_f64());
}
