//! Tunables for the event engine.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Days listed when a query gives no end date (default: 60)
    pub discovery_horizon_days: u32,
    /// Hours after an event starts before attendees may rate (default: 8)
    pub rating_delay_hours: u32,
    /// Maximum span of a recurrence rule in calendar months (default: 2)
    pub max_recurrence_months: u32,
    /// Maximum rating comment length in characters (default: 1000)
    pub max_comment_length: usize,
}

impl EngineConfig {
    /// Rating delay as a duration
    #[must_use]
    pub fn rating_delay(&self) -> Duration {
        Duration::hours(i64::from(self.rating_delay_hours))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            discovery_horizon_days: 60,
            rating_delay_hours: 8,
            max_recurrence_months: 2,
            max_comment_length: 1000,
        }
    }
}
