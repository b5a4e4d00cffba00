//! Display formatting for the countdown and settings screens.

use chrono::{DateTime, Local, TimeZone};

/// Format a remaining duration as zero-padded `HH:MM:SS`.
///
/// Hours are not wrapped at 24; the longest configurable wait is 6 hours so
/// this never matters in practice, but a clamp would hide bugs.
pub fn format_countdown(remaining_ms: u64) -> String {
    let hours = remaining_ms / (1000 * 60 * 60);
    let minutes = (remaining_ms % (1000 * 60 * 60)) / (1000 * 60);
    let seconds = (remaining_ms % (1000 * 60)) / 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Local wall-clock `HH:MM` at which the wait ends ("you will be dairy at
/// 15:00"). Returns `None` for end times outside the representable range.
pub fn format_end_clock(end_epoch_ms: u64) -> Option<String> {
    let end: DateTime<Local> = Local.timestamp_millis_opt(end_epoch_ms as i64).single()?;
    Some(end.format("%H:%M").to_string())
}

/// Format a waiting time in hours for display: whole hours as `5`,
/// half hours as `5:30`.
pub fn format_hours(hours: f64) -> String {
    if hours == hours.floor() {
        format!("{}", hours as u64)
    } else {
        format!("{}:30", hours.floor() as u64)
    }
}
