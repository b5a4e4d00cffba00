//! TOML-based user settings.
//!
//! Stores the waiting-period preferences:
//! - Per-category waiting hours (chicken / beef / combined meat)
//! - Whether chicken and beef get separate waiting times
//! - Alert channel toggles (sound, volume, vibration, continuous beep)
//!
//! Settings are stored at `~/.config/milchig/config.toml`. They only affect
//! future timer starts: adjusting a waiting time never touches a timer that
//! is already running, because the end time was fixed at start.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{Category, DEBUG_DURATION_MS};

pub const MIN_HOURS: f64 = 1.0;
pub const MAX_HOURS: f64 = 6.0;
pub const HOURS_STEP: f64 = 0.5;

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

/// Alert channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default)]
    pub sound: bool,
    /// Playback volume, 0.0 - 1.0.
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub vibrate: bool,
    /// Repeat the alert tone every few seconds until stopped (bounded).
    #[serde(default = "default_true")]
    pub continuous: bool,
}

/// Waiting-period configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursConfig {
    #[serde(default = "default_chicken_hours")]
    pub chicken: f64,
    #[serde(default = "default_beef_hours")]
    pub beef: f64,
    /// Combined waiting time, used when `separate_times` is off.
    #[serde(default = "default_meat_hours")]
    pub meat: f64,
    /// Offer separate chicken/beef timers instead of one combined timer.
    #[serde(default = "default_true")]
    pub separate_times: bool,
}

/// User settings.
///
/// Serialized to/from TOML at `~/.config/milchig/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hours: HoursConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

fn default_volume() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_chicken_hours() -> f64 {
    5.0
}
fn default_beef_hours() -> f64 {
    6.0
}
fn default_meat_hours() -> f64 {
    6.0
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            sound: false,
            volume: default_volume(),
            vibrate: false,
            continuous: true,
        }
    }
}

impl Default for HoursConfig {
    fn default() -> Self {
        Self {
            chicken: default_chicken_hours(),
            beef: default_beef_hours(),
            meat: default_meat_hours(),
            separate_times: true,
        }
    }
}

/// Clamp a waiting time to the allowed range on a half-hour grid.
fn clamp_hours(hours: f64) -> f64 {
    let snapped = (hours / HOURS_STEP).round() * HOURS_STEP;
    snapped.clamp(MIN_HOURS, MAX_HOURS)
}

impl Settings {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/milchig"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be parsed,
    /// or if the default settings cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let settings = Self::default();
                settings.save()?;
                Ok(settings)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning defaults on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Configured waiting time in hours for a category.
    ///
    /// Both the separate and the combined times are always configured; the
    /// `separate_times` flag only decides which categories the UI offers.
    pub fn waiting_hours(&self, category: Category) -> Option<f64> {
        match category {
            Category::Chicken => Some(self.hours.chicken),
            Category::Beef => Some(self.hours.beef),
            Category::Meat => Some(self.hours.meat),
            Category::Debug => None,
        }
    }

    /// Timer duration in milliseconds for a category.
    ///
    /// The debug category has a fixed short duration and is only startable
    /// while debug mode is unlocked.
    pub fn duration_ms(&self, category: Category, debug_unlocked: bool) -> Result<u64, ConfigError> {
        if category == Category::Debug {
            if debug_unlocked {
                return Ok(DEBUG_DURATION_MS);
            }
            return Err(ConfigError::InvalidValue {
                key: "category".into(),
                message: "debug timer requires debug mode".into(),
            });
        }
        let hours = self
            .waiting_hours(category)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "category".into(),
                message: format!("no configured duration for {category}"),
            })?;
        Ok((hours * HOUR_MS) as u64)
    }

    /// Step a category's waiting time up or down by half an hour, clamped to
    /// the allowed range. Takes effect for future starts only.
    pub fn adjust_hours(&mut self, category: Category, up: bool) -> Result<f64, ConfigError> {
        let delta = if up { HOURS_STEP } else { -HOURS_STEP };
        let slot = match category {
            Category::Chicken => &mut self.hours.chicken,
            Category::Beef => &mut self.hours.beef,
            Category::Meat => &mut self.hours.meat,
            Category::Debug => {
                return Err(ConfigError::InvalidValue {
                    key: "category".into(),
                    message: "debug timer duration is fixed".into(),
                })
            }
        };
        *slot = clamp_hours(*slot + delta);
        Ok(*slot)
    }

    /// Categories the UI should offer, given the separate-times mode and the
    /// debug flag.
    pub fn offered_categories(&self, debug_unlocked: bool) -> Vec<Category> {
        let mut cats = if self.hours.separate_times {
            vec![Category::Chicken, Category::Beef]
        } else {
            vec![Category::Meat]
        };
        if debug_unlocked {
            cats.push(Category::Debug);
        }
        cats
    }

    // ── Dot-path access for the CLI ──────────────────────────────────

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let bad_value = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| bad_value(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    bad_value(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(bad_value(format!("cannot parse '{value}' as number")));
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Get a settings value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by key and persist. Hours and volume are snapped
    /// back into their valid ranges.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.normalize();
        self.save()
    }

    fn normalize(&mut self) {
        self.hours.chicken = clamp_hours(self.hours.chicken);
        self.hours.beef = clamp_hours(self.hours.beef);
        self.hours.meat = clamp_hours(self.hours.meat);
        self.alerts.volume = self.alerts.volume.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 60 * 60 * 1000;

    #[test]
    fn default_settings_roundtrip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.hours.chicken, 5.0);
        assert_eq!(parsed.hours.beef, 6.0);
        assert!(!parsed.alerts.sound);
        assert_eq!(parsed.alerts.volume, 0.5);
    }

    #[test]
    fn duration_from_hours() {
        let settings = Settings::default();
        assert_eq!(settings.duration_ms(Category::Chicken, false).unwrap(), 5 * HOUR);
        assert_eq!(settings.duration_ms(Category::Beef, false).unwrap(), 6 * HOUR);
        assert_eq!(settings.duration_ms(Category::Meat, false).unwrap(), 6 * HOUR);
    }

    #[test]
    fn half_hour_durations() {
        let mut settings = Settings::default();
        settings.hours.chicken = 2.5;
        assert_eq!(
            settings.duration_ms(Category::Chicken, false).unwrap(),
            2 * HOUR + HOUR / 2
        );
    }

    #[test]
    fn debug_duration_requires_unlock() {
        let settings = Settings::default();
        assert!(settings.duration_ms(Category::Debug, false).is_err());
        assert_eq!(
            settings.duration_ms(Category::Debug, true).unwrap(),
            DEBUG_DURATION_MS
        );
    }

    #[test]
    fn adjust_steps_by_half_hour_and_clamps() {
        let mut settings = Settings::default();
        assert_eq!(settings.adjust_hours(Category::Chicken, true).unwrap(), 5.5);
        assert_eq!(settings.adjust_hours(Category::Chicken, true).unwrap(), 6.0);
        // Clamped at the top.
        assert_eq!(settings.adjust_hours(Category::Chicken, true).unwrap(), 6.0);

        settings.hours.beef = 1.0;
        assert_eq!(settings.adjust_hours(Category::Beef, false).unwrap(), 1.0);
    }

    #[test]
    fn adjust_rejects_debug() {
        let mut settings = Settings::default();
        assert!(settings.adjust_hours(Category::Debug, true).is_err());
    }

    #[test]
    fn offered_categories_follow_separate_times_mode() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.offered_categories(false),
            vec![Category::Chicken, Category::Beef]
        );
        settings.hours.separate_times = false;
        assert_eq!(settings.offered_categories(false), vec![Category::Meat]);
        assert_eq!(
            settings.offered_categories(true),
            vec![Category::Meat, Category::Debug]
        );
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let settings = Settings::default();
        assert_eq!(settings.get("alerts.sound").as_deref(), Some("false"));
        assert_eq!(settings.get("hours.chicken").as_deref(), Some("5.0"));
        assert!(settings.get("hours.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Settings::default()).unwrap();
        Settings::set_json_value_by_path(&mut json, "alerts.sound", "true").unwrap();
        assert_eq!(
            Settings::get_json_value_by_path(&json, "alerts.sound").unwrap(),
            &serde_json::Value::Bool(true)
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Settings::default()).unwrap();
        let result = Settings::set_json_value_by_path(&mut json, "alerts.nonexistent", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Settings::default()).unwrap();
        let result = Settings::set_json_value_by_path(&mut json, "alerts.sound", "not_a_bool");
        assert!(result.is_err());
    }

    #[test]
    fn normalize_snaps_out_of_range_values() {
        let mut settings = Settings::default();
        settings.hours.chicken = 9.75;
        settings.alerts.volume = 3.0;
        settings.normalize();
        assert_eq!(settings.hours.chicken, 6.0);
        assert_eq!(settings.alerts.volume, 1.0);
    }
}
