//! # Milchig Core Library
//!
//! Core business logic for Milchig, a timer that tracks the waiting period
//! between eating meat and dairy. All operations are available through a
//! standalone CLI binary; any GUI shell would be a thin layer over this
//! library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates
//! - **Storage**: SQLite key-value persistence for the active timer and
//!   TOML-based settings
//! - **Alerts**: Independent notification / sound / haptic channels fired
//!   once per expiry
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Settings`]: User preferences (waiting hours, alert toggles)
//! - [`Database`]: Persisted mirror of the active timer
//! - [`AlertDispatcher`]: Expiry alert fan-out

pub mod alert;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use alert::{AlertDispatcher, AlertHandle, AlertMessage, AlertReport, Haptics};
pub use error::{ConfigError, StorageError};
pub use events::Event;
pub use storage::{Database, Settings};
pub use timer::{ActiveTimer, Category, StartOutcome, Tick, TimerEngine, TimerState};
