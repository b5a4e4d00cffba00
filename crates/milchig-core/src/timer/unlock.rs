//! Hidden debug-mode unlock gesture.
//!
//! Five rapid taps on the title toggle debug mode, which exposes the
//! short-duration test timer. The accumulator is serializable so the CLI can
//! persist it in the key-value store between invocations (each `debug tap`
//! invocation is one "tap").

use serde::{Deserialize, Serialize};

const TAPS_REQUIRED: usize = 5;
const WINDOW_MS: u64 = 3_000;

/// Outcome of registering one tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapProgress {
    /// Taps registered so far within the window.
    Counted(usize),
    /// Fifth tap landed inside the window; debug mode should be toggled.
    Toggled,
}

/// Rolling tap accumulator for the debug-mode gesture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapUnlock {
    taps: Vec<u64>,
}

impl TapUnlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tap at `now_ms`. Taps older than the window are dropped
    /// first; when the fifth in-window tap lands the accumulator resets and
    /// `Toggled` is returned.
    pub fn register_tap(&mut self, now_ms: u64) -> TapProgress {
        self.taps
            .retain(|&t| now_ms.saturating_sub(t) < WINDOW_MS);
        self.taps.push(now_ms);
        if self.taps.len() >= TAPS_REQUIRED {
            self.taps.clear();
            TapProgress::Toggled
        } else {
            TapProgress::Counted(self.taps.len())
        }
    }
}
