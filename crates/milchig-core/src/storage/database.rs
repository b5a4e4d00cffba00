//! SQLite-backed key-value persistence.
//!
//! Holds the small pieces of state that must survive a restart:
//! - The active timer mirror (`timer_end_ms` + `timer_category`)
//! - The debug-mode flag
//! - The debug-gesture tap accumulator
//!
//! A corrupt or partial mirror is treated as "no active timer", never as an
//! error; the recovery path clears it.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use super::data_dir;
use crate::error::StorageError;
use crate::timer::{ActiveTimer, Category, TapUnlock};

const KEY_TIMER_END_MS: &str = "timer_end_ms";
const KEY_TIMER_CATEGORY: &str = "timer_category";
const KEY_DEBUG_MODE: &str = "debug_mode";
const KEY_DEBUG_TAPS: &str = "debug_taps";

/// SQLite database holding the persisted timer state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/milchig/milchig.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?
            .join("milchig.db");
        Self::open_path(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_path(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    // ── Raw key-value access ─────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    // ── Active timer mirror ──────────────────────────────────────────

    /// Read the persisted active-timer mirror.
    ///
    /// Absent or unparseable values read as `None`; the caller decides
    /// whether to clear the mirror (recovery does).
    pub fn load_active_timer(&self) -> Result<Option<ActiveTimer>, StorageError> {
        let end = self.kv_get(KEY_TIMER_END_MS)?;
        let category = self.kv_get(KEY_TIMER_CATEGORY)?;
        let (Some(end), Some(category)) = (end, category) else {
            return Ok(None);
        };
        let Ok(end_epoch_ms) = end.parse::<u64>() else {
            debug!(%end, "unparseable persisted end time, treating as no timer");
            return Ok(None);
        };
        let Ok(category) = category.parse::<Category>() else {
            debug!(%category, "unknown persisted category, treating as no timer");
            return Ok(None);
        };
        Ok(Some(ActiveTimer {
            category,
            end_epoch_ms,
        }))
    }

    pub fn save_active_timer(&self, timer: &ActiveTimer) -> Result<(), StorageError> {
        self.kv_set(KEY_TIMER_END_MS, &timer.end_epoch_ms.to_string())?;
        self.kv_set(KEY_TIMER_CATEGORY, timer.category.as_str())?;
        Ok(())
    }

    pub fn clear_active_timer(&self) -> Result<(), StorageError> {
        self.kv_delete(KEY_TIMER_END_MS)?;
        self.kv_delete(KEY_TIMER_CATEGORY)?;
        Ok(())
    }

    // ── Debug mode ───────────────────────────────────────────────────

    pub fn debug_mode(&self) -> Result<bool, StorageError> {
        Ok(self.kv_get(KEY_DEBUG_MODE)?.as_deref() == Some("true"))
    }

    pub fn set_debug_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.kv_set(KEY_DEBUG_MODE, if enabled { "true" } else { "false" })
    }

    /// Load the gesture accumulator, starting fresh if absent or corrupt.
    pub fn load_taps(&self) -> Result<TapUnlock, StorageError> {
        match self.kv_get(KEY_DEBUG_TAPS)? {
            Some(json) => Ok(serde_json::from_str(&json).unwrap_or_default()),
            None => Ok(TapUnlock::new()),
        }
    }

    pub fn save_taps(&self, taps: &TapUnlock) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(taps).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.kv_set(KEY_DEBUG_TAPS, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "world").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "world");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn active_timer_mirror_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_active_timer().unwrap().is_none());

        let timer = ActiveTimer {
            category: Category::Beef,
            end_epoch_ms: 1_700_000_123_456,
        };
        db.save_active_timer(&timer).unwrap();
        assert_eq!(db.load_active_timer().unwrap(), Some(timer));

        db.clear_active_timer().unwrap();
        assert!(db.load_active_timer().unwrap().is_none());
    }

    #[test]
    fn corrupt_mirror_reads_as_no_timer() {
        let db = Database::open_memory().unwrap();
        db.kv_set(KEY_TIMER_END_MS, "not-a-number").unwrap();
        db.kv_set(KEY_TIMER_CATEGORY, "beef").unwrap();
        assert!(db.load_active_timer().unwrap().is_none());

        db.kv_set(KEY_TIMER_END_MS, "123456").unwrap();
        db.kv_set(KEY_TIMER_CATEGORY, "lamb").unwrap();
        assert!(db.load_active_timer().unwrap().is_none());
    }

    #[test]
    fn partial_mirror_reads_as_no_timer() {
        let db = Database::open_memory().unwrap();
        db.kv_set(KEY_TIMER_END_MS, "123456").unwrap();
        assert!(db.load_active_timer().unwrap().is_none());
    }

    #[test]
    fn debug_mode_defaults_off() {
        let db = Database::open_memory().unwrap();
        assert!(!db.debug_mode().unwrap());
        db.set_debug_mode(true).unwrap();
        assert!(db.debug_mode().unwrap());
        db.set_debug_mode(false).unwrap();
        assert!(!db.debug_mode().unwrap());
    }

    #[test]
    fn taps_roundtrip_and_survive_corruption() {
        let db = Database::open_memory().unwrap();
        let mut taps = db.load_taps().unwrap();
        taps.register_tap(1000);
        db.save_taps(&taps).unwrap();
        let mut restored = db.load_taps().unwrap();
        // Second tap inside the window counts as 2: the first survived.
        assert_eq!(
            restored.register_tap(1100),
            crate::timer::TapProgress::Counted(2)
        );

        db.kv_set(KEY_DEBUG_TAPS, "{broken").unwrap();
        // Corrupt accumulator starts fresh rather than erroring.
        assert_eq!(
            db.load_taps().unwrap().register_tap(0),
            crate::timer::TapProgress::Counted(1)
        );
    }

    #[test]
    fn file_backed_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("milchig.db");
        {
            let db = Database::open_path(&path).unwrap();
            db.save_active_timer(&ActiveTimer {
                category: Category::Chicken,
                end_epoch_ms: 42,
            })
            .unwrap();
        }
        let db = Database::open_path(&path).unwrap();
        assert_eq!(
            db.load_active_timer().unwrap().map(|t| t.end_epoch_ms),
            Some(42)
        );
    }
}
