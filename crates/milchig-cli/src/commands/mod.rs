pub mod config;
pub mod debug;
pub mod timer;

use std::io::Write;

/// Ask a yes/no question on the terminal. Anything but an explicit yes
/// counts as a decline.
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
