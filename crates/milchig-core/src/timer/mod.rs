mod engine;
mod format;
mod unlock;

pub use engine::{ActiveTimer, StartOutcome, Tick, TimerEngine, TimerState, DEBUG_DURATION_MS};
pub use format::{format_countdown, format_end_clock, format_hours};
pub use unlock::{TapProgress, TapUnlock};

use serde::{Deserialize, Serialize};

/// The food category a waiting timer measures.
///
/// `Meat` is the combined category used when per-category times are switched
/// off; `Debug` is a short test timer only available while debug mode is
/// unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Chicken,
    Beef,
    Meat,
    Debug,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chicken => "chicken",
            Category::Beef => "beef",
            Category::Meat => "meat",
            Category::Debug => "debug",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chicken" => Ok(Category::Chicken),
            "beef" => Ok(Category::Beef),
            "meat" => Ok(Category::Meat),
            "debug" => Ok(Category::Debug),
            other => Err(format!("unknown category: {other}")),
        }
    }
}
