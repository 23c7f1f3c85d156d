//! The event engine: the operations exposed to the HTTP shell.
//!
//! `EventEngine` owns no state of its own. It normalizes caller-supplied ids
//! to parent events, runs the pure rules in [`crate::query`],
//! [`crate::eligibility`] and [`crate::validation`], and delegates every
//! write that must be serialized to the store.

use crate::config::EngineConfig;
use crate::eligibility::{self, RatingEligibility};
use crate::environment::Clock;
use crate::error::{EngineError, Result};
use crate::metrics;
use crate::providers::EventStore;
use crate::query::{self, ListEventsQuery};
use crate::types::{
    EventDefinition, EventDetail, EventId, EventOccurrence, EventStatus, Interaction,
    InteractionType, NewEvent, OccurrenceId, OrganizerRatingSummary, Rating, RatingReceipt,
    UserId, WaitlistEntry, WaitlistStatus,
};
use crate::validation;
use std::sync::Arc;
use std::time::Instant;

/// Event discovery, attendance, waitlist and rating operations.
pub struct EventEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<S> Clone for EventEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S: EventStore> EventEngine<S> {
    /// Create an engine over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// List occurrences for discovery.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the store fails.
    pub async fn list_events(&self, query: &ListEventsQuery) -> Result<Vec<EventOccurrence>> {
        let started = Instant::now();
        let filter = query.candidate_filter();

        let candidates = self.store.find_candidates(&filter).await?;
        let ids: Vec<EventId> = candidates.iter().map(|e| e.id).collect();
        let counts = self.store.interaction_counts(&ids).await?;

        let occurrences = query::assemble(
            &candidates,
            &counts,
            query,
            self.clock.now(),
            self.config.discovery_horizon_days,
        );

        metrics::record_listing(occurrences.len(), started.elapsed());
        tracing::debug!(
            candidates = candidates.len(),
            occurrences = occurrences.len(),
            sort_by = ?query.sort_by,
            "Listed events"
        );
        Ok(occurrences)
    }

    /// Fetch one event with its counters. Occurrence ids resolve to the parent.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidEventId` for malformed ids
    /// - `EngineError::EventNotFound` if the event does not exist
    pub async fn get_event(&self, event_id: &str) -> Result<EventDetail> {
        let event = self.require_event(parent_of(event_id)?).await?;
        self.detail(event).await
    }

    // ========================================================================
    // Organizer operations
    // ========================================================================

    /// Validate and store a new event owned by `organizer_id`.
    ///
    /// # Errors
    ///
    /// - `EngineError::Validation` if the payload is invalid
    /// - `EngineError::Storage` if the store fails
    pub async fn create_event(&self, organizer_id: UserId, new: NewEvent) -> Result<EventDefinition> {
        let now = self.clock.now();
        validation::validate_new_event(&new, now.date_naive(), self.config.max_recurrence_months)?;

        let event = EventDefinition {
            id: EventId::new(),
            organizer_id,
            title: new.title.trim().to_string(),
            description: new.description.trim().to_string(),
            category: new.category.trim().to_string(),
            date: new.date,
            time: new.time,
            location: new.location,
            location_name: new.location_name,
            capacity: new.capacity,
            recurrence: new.recurrence,
            status: EventStatus::Active,
            created_at: now,
        };
        self.store.insert_event(&event).await?;

        metrics::record_event_created();
        tracing::info!(
            event_id = %event.id,
            organizer_id = %organizer_id,
            recurring = event.recurrence.is_some(),
            capacity = ?event.capacity,
            "Event created"
        );
        Ok(event)
    }

    /// Cancel an event. Cancelled events disappear from listings and refuse
    /// new interactions.
    ///
    /// # Errors
    ///
    /// - `EngineError::EventNotFound` if the event does not exist
    /// - `EngineError::NotOrganizer` if `organizer_id` does not own it
    pub async fn cancel_event(&self, organizer_id: UserId, event_id: &str) -> Result<EventDefinition> {
        let mut event = self.owned_event(organizer_id, event_id).await?;

        if !self
            .store
            .set_event_status(event.id, EventStatus::Cancelled)
            .await?
        {
            return Err(EngineError::EventNotFound(event.id));
        }
        event.status = EventStatus::Cancelled;

        tracing::info!(event_id = %event.id, organizer_id = %organizer_id, "Event cancelled");
        Ok(event)
    }

    /// Delete an event and everything recorded against it.
    ///
    /// # Errors
    ///
    /// - `EngineError::EventNotFound` if the event does not exist
    /// - `EngineError::NotOrganizer` if `organizer_id` does not own it
    pub async fn delete_event(&self, organizer_id: UserId, event_id: &str) -> Result<()> {
        let event = self.owned_event(organizer_id, event_id).await?;

        if !self.store.delete_event(event.id).await? {
            return Err(EngineError::EventNotFound(event.id));
        }

        tracing::info!(event_id = %event.id, organizer_id = %organizer_id, "Event deleted");
        Ok(())
    }

    /// Every event of an organizer with live counters, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the store fails.
    pub async fn organizer_events(&self, organizer_id: UserId) -> Result<Vec<EventDetail>> {
        let mut events = self.store.events_by_organizer(organizer_id).await?;
        events.sort_by_key(|e| (e.date, e.time, e.id));

        let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
        let counts = self.store.interaction_counts(&ids).await?;

        let mut details = Vec::with_capacity(events.len());
        for event in events {
            let waitlist_count = self.store.waitlist_count(event.id).await?;
            details.push(EventDetail {
                interaction_counts: counts.get(&event.id).copied().unwrap_or_default(),
                waitlist_count,
                event,
            });
        }
        Ok(details)
    }

    // ========================================================================
    // Interactions
    // ========================================================================

    /// Create or overwrite the user's interaction with an event.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidType` if `kind` is not going, like or pass
    /// - `EngineError::InvalidEventId` / `EngineError::EventNotFound`
    /// - `EngineError::EventCancelled` for cancelled events
    /// - `EngineError::CapacityExceeded` when going to a full event
    pub async fn interact(&self, user_id: UserId, event_id: &str, kind: &str) -> Result<Interaction> {
        let kind: InteractionType = kind.parse()?;
        let event_id = parent_of(event_id)?;

        match self
            .store
            .record_interaction(user_id, event_id, kind, self.clock.now())
            .await
        {
            Ok(interaction) => {
                metrics::record_interaction(kind);
                tracing::info!(
                    event_id = %event_id,
                    user_id = %user_id,
                    kind = %kind,
                    "Interaction recorded"
                );
                Ok(interaction)
            }
            Err(err @ EngineError::CapacityExceeded { .. }) => {
                metrics::record_capacity_rejection();
                tracing::warn!(
                    event_id = %event_id,
                    user_id = %user_id,
                    "Going rejected, event at capacity"
                );
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    // ========================================================================
    // Waitlist
    // ========================================================================

    /// Join a full event's waitlist. Joining twice returns the same entry.
    ///
    /// # Errors
    ///
    /// - `EngineError::EventNotFound` if the event does not exist
    /// - `EngineError::WaitlistNotApplicable` for unlimited events
    /// - `EngineError::AlreadyGoing` if the user is going
    /// - `EngineError::EventNotFull` while spots remain
    /// - `EngineError::EventCancelled` for cancelled events
    pub async fn join_waitlist(&self, user_id: UserId, event_id: &str) -> Result<WaitlistEntry> {
        let event_id = parent_of(event_id)?;
        let entry = self
            .store
            .join_waitlist(user_id, event_id, self.clock.now())
            .await?;

        metrics::record_waitlist_join();
        tracing::info!(
            event_id = %event_id,
            user_id = %user_id,
            position = entry.position,
            "Joined waitlist"
        );
        Ok(entry)
    }

    /// Leave an event's waitlist.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotOnWaitlist` if the user was not queued
    pub async fn leave_waitlist(&self, user_id: UserId, event_id: &str) -> Result<()> {
        let event_id = parent_of(event_id)?;
        if !self.store.leave_waitlist(user_id, event_id).await? {
            return Err(EngineError::NotOnWaitlist(event_id));
        }

        metrics::record_waitlist_leave();
        tracing::info!(event_id = %event_id, user_id = %user_id, "Left waitlist");
        Ok(())
    }

    /// The user's waitlist position and the queue length.
    ///
    /// # Errors
    ///
    /// - `EngineError::EventNotFound` if the event does not exist
    pub async fn waitlist_status(&self, user_id: UserId, event_id: &str) -> Result<WaitlistStatus> {
        let event = self.require_event(parent_of(event_id)?).await?;
        let position = self.store.waitlist_position(user_id, event.id).await?;
        let total_count = self.store.waitlist_count(event.id).await?;

        Ok(WaitlistStatus {
            on_waitlist: position.is_some(),
            position,
            total_count,
        })
    }

    // ========================================================================
    // Ratings
    // ========================================================================

    /// Whether the user may rate the event's organizer now.
    ///
    /// # Errors
    ///
    /// - `EngineError::EventNotFound` if the event does not exist
    pub async fn check_rating_eligibility(&self, user_id: UserId, event_id: &str) -> Result<RatingEligibility> {
        let event = self.require_event(parent_of(event_id)?).await?;

        match self.ensure_can_rate(&event, user_id).await {
            Ok(()) => Ok(RatingEligibility::allowed()),
            Err(err) if err.is_user_error() => Ok(RatingEligibility::denied(&err)),
            Err(err) => Err(err),
        }
    }

    /// Rate the organizer of an attended event. Resubmitting overwrites.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidRating` / `EngineError::Validation` for bad input
    /// - `EngineError::EventNotFound` if the event does not exist
    /// - `EngineError::InvalidSelfRating`, `EngineError::NotAttending`,
    ///   `EngineError::TooEarly` per the eligibility rules
    pub async fn submit_rating(
        &self,
        user_id: UserId,
        event_id: &str,
        rating: i64,
        comment: Option<&str>,
    ) -> Result<RatingReceipt> {
        let (rating, comment) =
            validation::validate_rating(rating, comment, self.config.max_comment_length)?;
        let event = self.require_event(parent_of(event_id)?).await?;

        if let Err(err) = self.ensure_can_rate(&event, user_id).await {
            tracing::warn!(
                event_id = %event.id,
                user_id = %user_id,
                reason = err.code(),
                "Rating rejected"
            );
            return Err(err);
        }

        let now = self.clock.now();
        let stored = self
            .store
            .upsert_rating(&Rating {
                event_id: event.id,
                attendee_id: user_id,
                organizer_id: event.organizer_id,
                rating,
                comment,
                created_at: now,
                updated_at: now,
            })
            .await?;
        let organizer_summary = self.store.organizer_summary(event.organizer_id).await?;

        metrics::record_rating(rating);
        tracing::info!(
            event_id = %event.id,
            user_id = %user_id,
            rating,
            organizer_average = organizer_summary.average_rating,
            "Rating stored"
        );
        Ok(RatingReceipt {
            rating: stored,
            organizer_summary,
        })
    }

    /// Aggregate rating of an organizer.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the store fails.
    pub async fn organizer_rating_summary(&self, organizer_id: UserId) -> Result<OrganizerRatingSummary> {
        self.store.organizer_summary(organizer_id).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn require_event(&self, event_id: EventId) -> Result<EventDefinition> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or(EngineError::EventNotFound(event_id))
    }

    async fn owned_event(&self, organizer_id: UserId, event_id: &str) -> Result<EventDefinition> {
        let event = self.require_event(parent_of(event_id)?).await?;
        if event.organizer_id != organizer_id {
            tracing::warn!(
                event_id = %event.id,
                user_id = %organizer_id,
                "Event mutation by non-organizer rejected"
            );
            return Err(EngineError::NotOrganizer);
        }
        Ok(event)
    }

    async fn detail(&self, event: EventDefinition) -> Result<EventDetail> {
        let counts = self.store.interaction_counts(&[event.id]).await?;
        let waitlist_count = self.store.waitlist_count(event.id).await?;
        Ok(EventDetail {
            interaction_counts: counts.get(&event.id).copied().unwrap_or_default(),
            waitlist_count,
            event,
        })
    }

    async fn ensure_can_rate(&self, event: &EventDefinition, user_id: UserId) -> Result<()> {
        let interaction = self
            .store
            .get_interaction(user_id, event.id)
            .await?
            .map(|i| i.kind);

        eligibility::ensure_can_rate(
            event,
            user_id,
            interaction,
            self.clock.now(),
            self.config.rating_delay(),
        )
    }
}

/// Resolve a caller-supplied event or occurrence id to its parent event.
fn parent_of(raw: &str) -> Result<EventId> {
    Ok(OccurrenceId::parse(raw)?.parent)
}
