use clap::Subcommand;
use milchig_core::timer::format_hours;
use milchig_core::{Category, Settings};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "alerts.sound", "hours.chicken")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
    /// Step a waiting time up or down by half an hour
    Adjust {
        /// Food category: chicken, beef, or meat
        category: String,
        /// Direction: up or down
        direction: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let settings = Settings::load_or_default();
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load_or_default();
            settings.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            let settings = Settings::load_or_default();
            let json = serde_json::to_string_pretty(&settings)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let settings = Settings::default();
            settings.save()?;
            println!("settings reset to defaults");
        }
        ConfigAction::Adjust {
            category,
            direction,
        } => {
            let category: Category = category.parse()?;
            let up = match direction.as_str() {
                "up" => true,
                "down" => false,
                other => return Err(format!("direction must be up or down, got {other}").into()),
            };
            let mut settings = Settings::load_or_default();
            // Only future starts are affected; a running timer keeps the end
            // time it was started with.
            let hours = settings.adjust_hours(category, up)?;
            settings.save()?;
            println!("{category} waiting time: {} hours", format_hours(hours));
        }
    }
    Ok(())
}
