use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Category, TimerState};

/// Every state change in the system produces an Event.
/// The CLI prints them as JSON; a GUI shell would poll for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        category: Category,
        duration_ms: u64,
        end_epoch_ms: u64,
        at: DateTime<Utc>,
    },
    /// Waiting period elapsed; emitted exactly once per timer.
    TimerExpired {
        category: Category,
        at: DateTime<Utc>,
    },
    TimerCancelled {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        category: Option<Category>,
        end_epoch_ms: Option<u64>,
        remaining_ms: u64,
        /// `HH:MM:SS` render of `remaining_ms`.
        countdown: String,
        at: DateTime<Utc>,
    },
}
