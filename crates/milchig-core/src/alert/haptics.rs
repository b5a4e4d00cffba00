//! Haptic feedback seam.
//!
//! The vibration capability is platform-provided and usually absent on
//! desktop. The trait keeps the dispatcher testable and lets a mobile or GUI
//! shell plug a real implementation in.

use tracing::debug;

/// Pulse pattern played on expiry: on/off milliseconds.
pub const COMPLETION_PATTERN: &[u32] = &[200, 100, 200, 100, 200];

/// Single short pulse for UI feedback (timer start, settings taps).
pub const FEEDBACK_PULSE_MS: u32 = 200;

pub trait Haptics {
    /// Play an on/off millisecond pattern. Returns `false` when the platform
    /// exposes no vibration capability or the pulse could not be delivered;
    /// callers treat that as a silent skip.
    fn vibrate(&self, pattern_ms: &[u32]) -> bool;
}

/// Default capability probe. Desktop platforms expose no vibration
/// interface, so this always reports unavailable.
pub struct SystemHaptics;

impl Haptics for SystemHaptics {
    fn vibrate(&self, pattern_ms: &[u32]) -> bool {
        debug!(?pattern_ms, "no vibration capability on this platform");
        false
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingHaptics;
