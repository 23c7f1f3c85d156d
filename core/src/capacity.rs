//! Capacity and waitlist admission rules.
//!
//! These are the checks a store runs *after* it has locked the event row and
//! re-read the going count, inside the same transaction as the write. Keeping
//! them here means every backend enforces the same rule at its own
//! serialization point.

use crate::error::{EngineError, Result};
use crate::types::{EventId, InteractionType};

/// Whether a write of `requested` needs the event lock and a going count.
#[must_use]
pub fn requires_capacity_check(requested: InteractionType, capacity: Option<u32>) -> bool {
    requested == InteractionType::Going && capacity.is_some()
}

/// Admit or reject an interaction write.
///
/// A user who is already going may re-assert or switch freely. Anyone else
/// asking to go is rejected once `going_count` has reached `capacity`.
///
/// # Errors
///
/// Returns [`EngineError::CapacityExceeded`] when the event is full.
pub fn ensure_interaction_admissible(
    event_id: EventId,
    existing: Option<InteractionType>,
    requested: InteractionType,
    capacity: Option<u32>,
    going_count: u32,
) -> Result<()> {
    let Some(capacity) = capacity else {
        return Ok(());
    };
    if requested != InteractionType::Going || existing == Some(InteractionType::Going) {
        return Ok(());
    }
    if going_count >= capacity {
        return Err(EngineError::CapacityExceeded { event_id, capacity });
    }
    Ok(())
}

/// Preconditions for joining an event's waitlist, checked in order:
/// the event must be capacity-limited, the user must not already be going,
/// and the event must actually be full.
///
/// # Errors
///
/// - [`EngineError::WaitlistNotApplicable`] for unlimited events
/// - [`EngineError::AlreadyGoing`] if the user holds a going slot
/// - [`EngineError::EventNotFull`] while spots remain
pub fn ensure_waitlist_joinable(
    event_id: EventId,
    capacity: Option<u32>,
    existing: Option<InteractionType>,
    going_count: u32,
) -> Result<()> {
    let Some(capacity) = capacity else {
        return Err(EngineError::WaitlistNotApplicable(event_id));
    };
    if existing == Some(InteractionType::Going) {
        return Err(EngineError::AlreadyGoing(event_id));
    }
    if going_count < capacity {
        return Err(EngineError::EventNotFull {
            event_id,
            available: capacity - going_count,
        });
    }
    Ok(())
}
