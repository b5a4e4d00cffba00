mod config;
pub mod database;

pub use config::Settings;
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/milchig[-dev]/` based on MILCHIG_ENV.
///
/// Set MILCHIG_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MILCHIG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("milchig-dev")
    } else {
        base_dir.join("milchig")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
