//! Listing assembly: expand, filter and sort occurrences.
//!
//! Listing runs in two halves. The store answers the definition-level part of
//! the query ([`CandidateFilter`]: active status, category, free-text search,
//! and exclusion of the viewer's own and already-acted-on events) and returns
//! the live interaction counts. [`assemble`] then does the per-occurrence work
//! in memory:
//!
//! 1. expand every candidate over the query window,
//! 2. drop past, out-of-range and out-of-radius occurrences,
//! 3. attach the parent's counts and the viewer distance,
//! 4. sort the whole expanded set.

use crate::geo;
use crate::recurrence::{self, DateWindow};
use crate::types::{EventDefinition, EventId, EventOccurrence, GeoPoint, InteractionCounts, UserId};
use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// Ordering of a listing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Soonest first
    #[default]
    Date,
    /// Nearest first, events without coordinates last
    Distance,
    /// Most going + likes first
    Popularity,
}

impl FromStr for SortBy {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "date" => Ok(Self::Date),
            "distance" => Ok(Self::Distance),
            "popularity" => Ok(Self::Popularity),
            other => Err(crate::error::EngineError::Validation(format!(
                "Unknown sort order: {other}"
            ))),
        }
    }
}

/// Parameters of a discovery listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListEventsQuery {
    /// Category filter; `None` or `"all"` lists every category
    pub category: Option<String>,
    /// Viewer, whose own and acted-on events are excluded
    pub user_id: Option<UserId>,
    /// Viewer position for distance sort and radius filter
    pub user_location: Option<GeoPoint>,
    /// Drop occurrences that already started
    pub hide_past: bool,
    /// Radius filter in km; requires `user_location`
    pub radius_km: Option<f64>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    /// First date to include
    pub date_from: Option<NaiveDate>,
    /// Last date to include
    pub date_to: Option<NaiveDate>,
    /// Result ordering
    pub sort_by: SortBy,
}

impl ListEventsQuery {
    /// Definition-level filter the store must apply.
    #[must_use]
    pub fn candidate_filter(&self) -> CandidateFilter {
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_string);
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        CandidateFilter {
            category,
            search,
            viewer: self.user_id,
        }
    }

    /// Expansion window: `date_from` (or today) through `date_to` (or
    /// `horizon_days` after the start).
    #[must_use]
    pub fn window(&self, today: NaiveDate, horizon_days: u32) -> DateWindow {
        let start = self.date_from.unwrap_or(today);
        let end = self.date_to.unwrap_or_else(|| {
            start
                .checked_add_days(Days::new(u64::from(horizon_days)))
                .unwrap_or(NaiveDate::MAX)
        });
        DateWindow::new(start, end)
    }
}

/// Filter applied to event definitions before expansion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    /// Exact category, compared case-insensitively
    pub category: Option<String>,
    /// Substring of title or description, compared case-insensitively
    pub search: Option<String>,
    /// Viewer to exclude own and interacted events for
    pub viewer: Option<UserId>,
}

impl CandidateFilter {
    /// Whether `event` is a candidate.
    ///
    /// `viewer_interacted` tells whether the viewer already has any interaction
    /// with the event. SQL stores express the same predicate in their query.
    #[must_use]
    pub fn matches(&self, event: &EventDefinition, viewer_interacted: bool) -> bool {
        if !event.is_active() {
            return false;
        }
        if let Some(category) = &self.category {
            if !event.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !event.title.to_lowercase().contains(&needle)
                && !event.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(viewer) = self.viewer {
            if event.organizer_id == viewer || viewer_interacted {
                return false;
            }
        }
        true
    }
}

/// Expand, filter, annotate and sort candidate events.
#[must_use]
pub fn assemble(
    candidates: &[EventDefinition],
    counts: &HashMap<EventId, InteractionCounts>,
    query: &ListEventsQuery,
    now: DateTime<Utc>,
    horizon_days: u32,
) -> Vec<EventOccurrence> {
    let window = query.window(now.date_naive(), horizon_days);
    let now_key = (now.date_naive(), now.time().num_seconds_from_midnight() / 60);

    let mut occurrences: Vec<EventOccurrence> = candidates
        .iter()
        .flat_map(|event| recurrence::expand(event, window))
        .filter(|o| !query.hide_past || minute_key(o) >= now_key)
        .filter(|o| query.date_from.is_none_or(|from| o.date >= from))
        .filter(|o| query.date_to.is_none_or(|to| o.date <= to))
        .filter_map(|mut o| {
            o.distance_km = query
                .user_location
                .zip(o.location)
                .map(|(from, to)| geo::distance_between(from, to));

            match (query.user_location, query.radius_km) {
                (Some(_), Some(radius)) => match o.distance_km {
                    Some(d) if d <= radius => Some(o),
                    _ => None,
                },
                _ => Some(o),
            }
        })
        .map(|mut o| {
            o.interaction_counts = counts.get(&o.event_id).copied().unwrap_or_default();
            o
        })
        .collect();

    sort_occurrences(&mut occurrences, query.sort_by);
    occurrences
}

/// Sort across the whole expanded set. Ties fall back to chronological
/// order and then to the occurrence id.
pub fn sort_occurrences(occurrences: &mut [EventOccurrence], sort_by: SortBy) {
    match sort_by {
        SortBy::Date => occurrences.sort_by(chronological),
        SortBy::Distance => occurrences.sort_by(|a, b| {
            let da = a.distance_km.unwrap_or(f64::INFINITY);
            let db = b.distance_km.unwrap_or(f64::INFINITY);
            da.total_cmp(&db).then_with(|| chronological(a, b))
        }),
        SortBy::Popularity => occurrences.sort_by(|a, b| {
            b.interaction_counts
                .popularity()
                .cmp(&a.interaction_counts.popularity())
                .then_with(|| chronological(a, b))
        }),
    }
}

fn minute_key(o: &EventOccurrence) -> (NaiveDate, u32) {
    (o.date, o.time.num_seconds_from_midnight() / 60)
}

fn chronological(a: &EventOccurrence, b: &EventOccurrence) -> Ordering {
    minute_key(a)
        .cmp(&minute_key(b))
        .then_with(|| a.id.cmp(&b.id))
}
