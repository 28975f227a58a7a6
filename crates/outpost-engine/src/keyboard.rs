//! Line-buffered keyboard routing.
//!
//! The terminal delivers input a line at a time. Each character of a line
//! is one key press: movement and ability keys go to the core's input
//! gate, digits answer an open choice prompt. Stdin is read on a plain OS
//! thread so a pending read never holds up runtime shutdown.
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `w` `a` `s` `d` | move up, left, down, right |
//! | `f` | forage (forager) or revive (security) |
//! | `e` | scan |
//! | `r` | push |
//! | `1`..`9` | pick option 1..9 |

use std::io::BufRead;
use std::thread::JoinHandle;

use outpost_core::HumanInput;
use outpost_types::{Direction, InputIntent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One interpreted key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// A game key.
    Intent(InputIntent),
    /// A 0-based choice index.
    Choice(usize),
}

/// Interpret one character. Case-insensitive; unknown keys yield `None`.
pub fn parse_key(key: char) -> Option<Keystroke> {
    let intent = match key.to_ascii_lowercase() {
        'w' => InputIntent::Move(Direction::Up),
        'a' => InputIntent::Move(Direction::Left),
        's' => InputIntent::Move(Direction::Down),
        'd' => InputIntent::Move(Direction::Right),
        'f' => InputIntent::Primary,
        'e' => InputIntent::Scan,
        'r' => InputIntent::Push,
        digit @ '1'..='9' => {
            let index = digit.to_digit(10)?.checked_sub(1)?;
            return usize::try_from(index).ok().map(Keystroke::Choice);
        }
        _ => return None,
    };
    Some(Keystroke::Intent(intent))
}

/// Counters reported when the input stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStats {
    /// Intents the gate accepted.
    pub accepted: u64,
    /// Intents dropped because the gate was closed.
    pub dropped: u64,
    /// Choice digits forwarded.
    pub choices: u64,
    /// Characters with no meaning.
    pub unknown: u64,
}

/// Read stdin on a background thread until it closes.
///
/// # Errors
///
/// Returns the I/O error if the thread cannot be started.
pub fn spawn(
    input: HumanInput,
    choices: mpsc::UnboundedSender<usize>,
) -> std::io::Result<JoinHandle<RouteStats>> {
    std::thread::Builder::new()
        .name(String::from("keyboard"))
        .spawn(move || {
            let stats = route_lines(std::io::stdin().lock(), &input, &choices);
            info!(
                accepted = stats.accepted,
                dropped = stats.dropped,
                "Keyboard input closed"
            );
            stats
        })
}

/// Route every key of every line from `reader` until end of stream.
pub fn route_lines<R: BufRead>(
    reader: R,
    input: &HumanInput,
    choices: &mpsc::UnboundedSender<usize>,
) -> RouteStats {
    let mut stats = RouteStats::default();
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read keyboard input");
                break;
            }
        };
        for key in line.chars().filter(|c| !c.is_whitespace()) {
            match parse_key(key) {
                Some(Keystroke::Intent(intent)) => {
                    if input.submit(intent) {
                        stats.accepted = stats.accepted.saturating_add(1);
                    } else {
                        stats.dropped = stats.dropped.saturating_add(1);
                    }
                }
                Some(Keystroke::Choice(index)) => {
                    // Nobody listening once the run is past the choice prompt.
                    if choices.send(index).is_ok() {
                        stats.choices = stats.choices.saturating_add(1);
                    }
                }
                None => {
                    debug!(%key, "Unmapped key");
                    stats.unknown = stats.unknown.saturating_add(1);
                }
            }
        }
    }
    stats
}
