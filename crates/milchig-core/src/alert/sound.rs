//! Audible alert playback.
//!
//! Plays the system alert sound through whichever player is installed,
//! repeating on an interval until the repetition bound or an early stop.
//! Playback problems (no player, no sound files, audio refused) are silent:
//! the tone is one alert channel among several, never a hard requirement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

/// paplay volume scale: 65536 is 100%.
const PAPLAY_FULL_VOLUME: f64 = 65536.0;

/// Handle to a playing alert tone. Dropping it does not stop playback; the
/// tone is bounded and stops itself after the last repetition.
pub struct SoundHandle {
    stop: Arc<AtomicBool>,
    player: std::thread::JoinHandle<()>,
}

impl SoundHandle {
    /// Request an early stop. The current repetition finishes; no further
    /// ones start.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Whether playback (all repetitions) has finished.
    pub(crate) fn finished(&self) -> bool {
        self.player.is_finished()
    }
}

/// Start the alert tone: `repeats` plays spaced `interval` apart, at
/// `volume` (0.0 - 1.0) where the player supports it.
pub fn play_alert(volume: f64, repeats: u32, interval: Duration) -> SoundHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    let player = std::thread::spawn(move || {
        for i in 0..repeats {
            if flag.load(Ordering::Relaxed) {
                break;
            }
            play_once(volume);
            if i + 1 < repeats {
                sleep_interruptible(interval, &flag);
            }
        }
    });
    SoundHandle { stop, player }
}

/// Sleep for `interval`, waking early when a stop is requested.
fn sleep_interruptible(interval: Duration, stop: &AtomicBool) {
    let step = Duration::from_millis(100);
    let mut slept = Duration::ZERO;
    while slept < interval {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let chunk = step.min(interval - slept);
        std::thread::sleep(chunk);
        slept += chunk;
    }
}

fn play_once(volume: f64) {
    let paplay_volume = ((volume.clamp(0.0, 1.0)) * PAPLAY_FULL_VOLUME) as u32;
    let candidates: [(&str, &str, Vec<String>); 3] = [
        (
            "paplay",
            "/usr/share/sounds/freedesktop/stereo/complete.oga",
            vec![format!("--volume={paplay_volume}")],
        ),
        ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav", vec![]),
        ("aplay", "/usr/share/sounds/generic.wav", vec![]),
    ];

    for (cmd, sound_file, extra) in candidates {
        if std::path::Path::new(sound_file).exists() {
            let _ = std::process::Command::new(cmd)
                .args(&extra)
                .arg(sound_file)
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null())
                .spawn();
            return;
        }
    }
    debug!("no system alert sound found, skipping audible alert");
}
