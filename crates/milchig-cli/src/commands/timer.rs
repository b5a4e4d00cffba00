use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use milchig_core::alert::spawn_worker;
use milchig_core::storage::Database;
use milchig_core::timer::{format_countdown, format_end_clock};
use milchig_core::{
    AlertDispatcher, Category, Event, Settings, StartOutcome, Tick, TimerEngine, TimerState,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a waiting timer for a food category
    Start {
        /// Food category: chicken, beef, meat, or debug
        category: String,
        /// Replace a running timer without prompting
        #[arg(long)]
        yes: bool,
    },
    /// Print current timer state as JSON
    Status,
    /// Cancel the running timer
    Cancel {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Follow the countdown live and fire alerts on expiry
    Watch,
}

/// Rebuild the engine from the persisted mirror, clearing it when it turned
/// out stale or corrupt. Run at the start of every command, so the mirror
/// and the in-memory state always agree.
fn recover_engine(db: &Database) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let mirror = db.load_active_timer()?;
    let engine = TimerEngine::recover(mirror);
    if engine.active().is_none() {
        db.clear_active_timer()?;
    }
    Ok(engine)
}

fn persist_engine(db: &Database, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    match engine.active() {
        Some(active) if engine.state() == TimerState::Running => db.save_active_timer(active)?,
        _ => db.clear_active_timer()?,
    }
    Ok(())
}

fn print_end_message(engine: &TimerEngine) {
    if let Some(clock) = engine.end_epoch_ms().and_then(format_end_clock) {
        println!("You will be dairy at {clock}");
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let db = Database::open()?;
    let mut engine = recover_engine(&db)?;

    match action {
        TimerAction::Start { category, yes } => {
            let category: Category = category.parse()?;
            let debug_unlocked = db.debug_mode()?;
            let duration_ms = settings.duration_ms(category, debug_unlocked)?;
            if !settings.offered_categories(debug_unlocked).contains(&category) {
                eprintln!("note: {category} is not offered in the current separate-times mode");
            }

            let event = match engine.start(category, duration_ms) {
                StartOutcome::Started(event) => event,
                StartOutcome::NeedsConfirmation { running } => {
                    let replace = yes
                        || super::confirm(&format!(
                            "A {running} timer is already running. Replace it?"
                        ));
                    if !replace {
                        // Declined: the running timer is untouched.
                        println!("Keeping the running {running} timer.");
                        return Ok(());
                    }
                    engine.start_replacing(category, duration_ms)
                }
            };

            persist_engine(&db, &engine)?;
            AlertDispatcher::new().feedback_pulse(&settings);
            print_end_message(&engine);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Status => {
            let snapshot = engine.snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        TimerAction::Cancel { yes } => {
            if engine.state() == TimerState::Idle {
                println!("No timer running.");
                return Ok(());
            }
            if !yes && !super::confirm("Cancel the timer?") {
                return Ok(());
            }
            let event = engine.cancel();
            persist_engine(&db, &engine)?;
            match event {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("No timer running."),
            }
        }
        TimerAction::Watch => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(settings, db, engine))?;
        }
    }
    Ok(())
}

/// Live countdown loop: one 1-second ticker, owned here, so there is never
/// more than one active tick driving the engine.
async fn watch(
    settings: Settings,
    db: Database,
    mut engine: TimerEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    if engine.state() != TimerState::Running {
        println!("No timer running.");
        return Ok(());
    }
    print_end_message(&engine);

    let sound_enabled = settings.alerts.sound;
    let alerts = spawn_worker(AlertDispatcher::new(), settings);

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        match engine.tick() {
            Tick::Remaining(ms) => {
                print!("\r{}", format_countdown(ms));
                std::io::stdout().flush()?;
            }
            Tick::Expired(Event::TimerExpired { category, .. }) => {
                db.clear_active_timer()?;
                println!("\r{}", format_countdown(0));
                println!("{}", AlertDispatcher::completion_message(category));
                alerts.timer_finished(category);
                break;
            }
            _ => break,
        }
    }

    if sound_enabled {
        // The tone stops itself after its bounded repetitions; Enter stops
        // it early and resets the display.
        println!("Press Enter to stop the alert.");
        wait_for_enter_or(Duration::from_secs(25)).await;
        alerts.stop_sound();
    }
    alerts.flush().await;

    engine.cancel();
    persist_engine(&db, &engine)?;
    Ok(())
}

/// Wait for Enter on stdin, giving up after `limit`.
///
/// The stdin read happens on a detached plain thread, not on the runtime's
/// blocking pool: dropping the runtime waits for blocking-pool tasks, and a
/// stuck stdin read there would keep the process alive after the deadline
/// passed. A detached thread just dies with the process.
async fn wait_for_enter_or(limit: Duration) {
    let (tx, rx) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        let _ = tx.send(());
    });
    tokio::select! {
        _ = rx => {}
        _ = tokio::time::sleep(limit) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enter_wait_respects_the_deadline() {
        // Stdin delivers nothing here; the deadline alone must release the
        // wait, and promptly enough that process exit is not held hostage.
        let started = std::time::Instant::now();
        wait_for_enter_or(Duration::from_millis(100)).await;
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "bounded stdin wait did not return at the deadline"
        );
    }
}
