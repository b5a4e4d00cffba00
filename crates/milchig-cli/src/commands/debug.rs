use clap::Subcommand;
use milchig_core::storage::Database;
use milchig_core::timer::TapProgress;

#[derive(Subcommand)]
pub enum DebugAction {
    /// Register one tap of the unlock gesture (5 rapid taps toggle)
    Tap,
    /// Show whether debug mode is unlocked
    Status,
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn run(action: DebugAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        DebugAction::Tap => {
            let mut taps = db.load_taps()?;
            match taps.register_tap(now_ms()) {
                TapProgress::Toggled => {
                    let enabled = !db.debug_mode()?;
                    db.set_debug_mode(enabled)?;
                    println!(
                        "debug mode {}",
                        if enabled { "unlocked" } else { "locked" }
                    );
                }
                TapProgress::Counted(n) => {
                    println!("tap {n}/5");
                }
            }
            db.save_taps(&taps)?;
        }
        DebugAction::Status => {
            println!(
                "debug mode {}",
                if db.debug_mode()? { "unlocked" } else { "locked" }
            );
        }
    }
    Ok(())
}
