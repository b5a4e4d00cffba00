//! Expiry alert fan-out.
//!
//! Four channels, fired once per expiry, each independently toggleable and
//! each allowed to fail without affecting the others:
//!
//! 1. Visual completion message (always produced, rendered by the caller)
//! 2. System notification
//! 3. Audible alert, optionally repeating until stopped
//! 4. Haptic pulse, where the platform has a vibration capability
//!
//! Channel failures are swallowed and logged; a missed alert channel is the
//! worst case, never an error surfaced to the user.

pub mod haptics;
mod sound;
mod worker;

pub use haptics::{Haptics, SystemHaptics, COMPLETION_PATTERN, FEEDBACK_PULSE_MS};
pub use sound::SoundHandle;
pub use worker::{spawn_worker, AlertHandle, AlertMessage};

use std::time::Duration;

use tracing::warn;

use crate::storage::Settings;
use crate::timer::Category;

/// Repeat interval of the continuous alert tone.
const REPEAT_INTERVAL: Duration = Duration::from_millis(2_500);
/// Continuous tone auto-stops after this many repetitions.
const MAX_REPEATS: u32 = 8;

/// What actually fired for one expiry.
pub struct AlertReport {
    /// Completion message for the display. Always present.
    pub message: String,
    pub notification_shown: bool,
    /// Handle to a playing (possibly repeating) alert tone.
    pub sound: Option<SoundHandle>,
    pub vibrated: bool,
}

/// Fans an expiry event out to the alert channels.
pub struct AlertDispatcher {
    haptics: Box<dyn Haptics + Send + Sync>,
    /// Disabled in tests to keep them from popping real notifications.
    show_notifications: bool,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self {
            haptics: Box::new(SystemHaptics),
            show_notifications: true,
        }
    }

    #[cfg(test)]
    fn silent(haptics: Box<dyn Haptics + Send + Sync>) -> Self {
        Self {
            haptics,
            show_notifications: false,
        }
    }

    /// The always-shown completion message.
    pub fn completion_message(category: Category) -> String {
        match category {
            Category::Debug => "Test timer finished.".to_string(),
            _ => "The wait is over - you are dairy now!".to_string(),
        }
    }

    /// Fire all channels for one expiry. Never fails; individual channel
    /// failures are logged and skipped.
    pub fn dispatch(&self, settings: &Settings, category: Category) -> AlertReport {
        let message = Self::completion_message(category);

        let notification_shown = if self.show_notifications {
            self.show_notification(&message)
        } else {
            false
        };

        let sound = if settings.alerts.sound {
            let repeats = if settings.alerts.continuous {
                MAX_REPEATS
            } else {
                1
            };
            Some(sound::play_alert(
                settings.alerts.volume,
                repeats,
                REPEAT_INTERVAL,
            ))
        } else {
            None
        };

        let vibrated = settings.alerts.vibrate && self.haptics.vibrate(COMPLETION_PATTERN);

        AlertReport {
            message,
            notification_shown,
            sound,
            vibrated,
        }
    }

    /// Short haptic feedback for UI actions (timer start, settings taps).
    pub fn feedback_pulse(&self, settings: &Settings) {
        if settings.alerts.vibrate {
            self.haptics.vibrate(&[FEEDBACK_PULSE_MS]);
        }
    }

    fn show_notification(&self, body: &str) -> bool {
        let result = notify_rust::Notification::new()
            .summary("Timer finished")
            .body(body)
            .appname("milchig")
            .icon("alarm-clock")
            .show();
        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "system notification failed, continuing");
                false
            }
        }
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
