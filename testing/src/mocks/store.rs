//! In-memory implementation of every storage provider.
//!
//! All tables live behind one mutex. Each operation takes the lock once and
//! performs its whole read-check-write under it, which gives the same
//! serialization point the `PostgreSQL` store gets from `SELECT ... FOR UPDATE`.

use chrono::{DateTime, Utc};
use eventdeck_core::capacity;
use eventdeck_core::error::{EngineError, Result};
use eventdeck_core::providers::{
    EventRepository, InteractionRepository, RatingRepository, WaitlistRepository,
};
use eventdeck_core::query::CandidateFilter;
use eventdeck_core::types::{
    EventDefinition, EventId, EventStatus, Interaction, InteractionCounts, InteractionType,
    OrganizerRatingSummary, Rating, UserId, WaitlistEntry,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct WaitlistRow {
    seq: u64,
    user_id: UserId,
    event_id: EventId,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, EventDefinition>,
    interactions: HashMap<(UserId, EventId), Interaction>,
    waitlist: Vec<WaitlistRow>,
    next_waitlist_seq: u64,
    ratings: HashMap<(EventId, UserId), Rating>,
}

impl Tables {
    fn going_count(&self, event_id: EventId) -> u32 {
        let count = self
            .interactions
            .values()
            .filter(|i| i.event_id == event_id && i.kind == InteractionType::Going)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn existing_kind(&self, user_id: UserId, event_id: EventId) -> Option<InteractionType> {
        self.interactions.get(&(user_id, event_id)).map(|i| i.kind)
    }

    fn position(&self, user_id: UserId, event_id: EventId) -> Option<u32> {
        let own = self
            .waitlist
            .iter()
            .find(|r| r.user_id == user_id && r.event_id == event_id)?;
        let ahead = self
            .waitlist
            .iter()
            .filter(|r| r.event_id == event_id && r.seq <= own.seq)
            .count();
        u32::try_from(ahead).ok()
    }

    fn waitlist_count(&self, event_id: EventId) -> u32 {
        let count = self.waitlist.iter().filter(|r| r.event_id == event_id).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// In-memory event store for tests.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryEventStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| EngineError::Storage("Mutex lock failed".into()))
    }

    /// Every interaction row recorded for `event_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the mutex is poisoned.
    pub fn interactions_for_event(&self, event_id: EventId) -> Result<Vec<Interaction>> {
        Ok(self
            .lock()?
            .interactions
            .values()
            .filter(|i| i.event_id == event_id)
            .cloned()
            .collect())
    }

    /// Number of stored ratings for `event_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the mutex is poisoned.
    pub fn rating_rows(&self, event_id: EventId) -> Result<usize> {
        Ok(self
            .lock()?
            .ratings
            .keys()
            .filter(|(e, _)| *e == event_id)
            .count())
    }
}

impl EventRepository for InMemoryEventStore {
    async fn insert_event(&self, event: &EventDefinition) -> Result<()> {
        self.lock()?.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<EventDefinition>> {
        Ok(self.lock()?.events.get(&event_id).cloned())
    }

    async fn set_event_status(&self, event_id: EventId, status: EventStatus) -> Result<bool> {
        let mut tables = self.lock()?;
        match tables.events.get_mut(&event_id) {
            Some(event) => {
                event.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_event(&self, event_id: EventId) -> Result<bool> {
        let mut tables = self.lock()?;
        if tables.events.remove(&event_id).is_none() {
            return Ok(false);
        }
        tables.interactions.retain(|(_, e), _| *e != event_id);
        tables.waitlist.retain(|r| r.event_id != event_id);
        tables.ratings.retain(|(e, _), _| *e != event_id);
        Ok(true)
    }

    async fn find_candidates(&self, filter: &CandidateFilter) -> Result<Vec<EventDefinition>> {
        let tables = self.lock()?;
        Ok(tables
            .events
            .values()
            .filter(|event| {
                let interacted = filter.viewer.is_some_and(|viewer| {
                    tables.interactions.contains_key(&(viewer, event.id))
                });
                filter.matches(event, interacted)
            })
            .cloned()
            .collect())
    }

    async fn events_by_organizer(&self, organizer_id: UserId) -> Result<Vec<EventDefinition>> {
        Ok(self
            .lock()?
            .events
            .values()
            .filter(|e| e.organizer_id == organizer_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}

impl InteractionRepository for InMemoryEventStore {
    async fn record_interaction(
        &self,
        user_id: UserId,
        event_id: EventId,
        kind: InteractionType,
        at: DateTime<Utc>,
    ) -> Result<Interaction> {
        let mut tables = self.lock()?;

        let event = tables
            .events
            .get(&event_id)
            .ok_or(EngineError::EventNotFound(event_id))?;
        if !event.is_active() {
            return Err(EngineError::EventCancelled(event_id));
        }
        let capacity = event.capacity;

        if capacity::requires_capacity_check(kind, capacity) {
            capacity::ensure_interaction_admissible(
                event_id,
                tables.existing_kind(user_id, event_id),
                kind,
                capacity,
                tables.going_count(event_id),
            )?;
        }

        let interaction = tables
            .interactions
            .entry((user_id, event_id))
            .and_modify(|i| {
                i.kind = kind;
                i.updated_at = at;
            })
            .or_insert_with(|| Interaction {
                user_id,
                event_id,
                kind,
                created_at: at,
                updated_at: at,
            })
            .clone();
        Ok(interaction)
    }

    async fn get_interaction(&self, user_id: UserId, event_id: EventId) -> Result<Option<Interaction>> {
        Ok(self.lock()?.interactions.get(&(user_id, event_id)).cloned())
    }

    async fn interaction_counts(&self, event_ids: &[EventId]) -> Result<HashMap<EventId, InteractionCounts>> {
        let tables = self.lock()?;
        let mut counts: HashMap<EventId, InteractionCounts> = HashMap::new();
        for interaction in tables.interactions.values() {
            if event_ids.contains(&interaction.event_id) {
                counts
                    .entry(interaction.event_id)
                    .or_default()
                    .add(interaction.kind, 1);
            }
        }
        Ok(counts)
    }
}

impl WaitlistRepository for InMemoryEventStore {
    async fn join_waitlist(&self, user_id: UserId, event_id: EventId, at: DateTime<Utc>) -> Result<WaitlistEntry> {
        let mut tables = self.lock()?;

        let event = tables
            .events
            .get(&event_id)
            .ok_or(EngineError::EventNotFound(event_id))?;
        if !event.is_active() {
            return Err(EngineError::EventCancelled(event_id));
        }
        let capacity = event.capacity;
        capacity::ensure_waitlist_joinable(
            event_id,
            capacity,
            tables.existing_kind(user_id, event_id),
            tables.going_count(event_id),
        )?;

        if tables.position(user_id, event_id).is_none() {
            let seq = tables.next_waitlist_seq;
            tables.next_waitlist_seq += 1;
            tables.waitlist.push(WaitlistRow {
                seq,
                user_id,
                event_id,
                created_at: at,
            });
        }

        let created_at = tables
            .waitlist
            .iter()
            .find(|r| r.user_id == user_id && r.event_id == event_id)
            .map_or(at, |r| r.created_at);
        let position = tables
            .position(user_id, event_id)
            .ok_or_else(|| EngineError::Storage("waitlist row vanished".into()))?;

        Ok(WaitlistEntry {
            user_id,
            event_id,
            position,
            created_at,
        })
    }

    async fn leave_waitlist(&self, user_id: UserId, event_id: EventId) -> Result<bool> {
        let mut tables = self.lock()?;
        let before = tables.waitlist.len();
        tables
            .waitlist
            .retain(|r| !(r.user_id == user_id && r.event_id == event_id));
        Ok(tables.waitlist.len() != before)
    }

    async fn waitlist_position(&self, user_id: UserId, event_id: EventId) -> Result<Option<u32>> {
        Ok(self.lock()?.position(user_id, event_id))
    }

    async fn waitlist_count(&self, event_id: EventId) -> Result<u32> {
        Ok(self.lock()?.waitlist_count(event_id))
    }
}

impl RatingRepository for InMemoryEventStore {
    async fn upsert_rating(&self, rating: &Rating) -> Result<Rating> {
        let mut tables = self.lock()?;
        let stored = tables
            .ratings
            .entry((rating.event_id, rating.attendee_id))
            .and_modify(|r| {
                r.rating = rating.rating;
                r.comment.clone_from(&rating.comment);
                r.updated_at = rating.updated_at;
            })
            .or_insert_with(|| rating.clone())
            .clone();
        Ok(stored)
    }

    async fn organizer_summary(&self, organizer_id: UserId) -> Result<OrganizerRatingSummary> {
        let tables = self.lock()?;
        let values: Vec<f64> = tables
            .ratings
            .values()
            .filter(|r| r.organizer_id == organizer_id)
            .map(|r| f64::from(r.rating))
            .collect();

        let count = u32::try_from(values.len()).unwrap_or(u32::MAX);
        let average = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / f64::from(count)
        };
        Ok(OrganizerRatingSummary::new(organizer_id, average, count))
    }
}
