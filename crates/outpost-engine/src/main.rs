//! Terminal binary for the Outpost cooperation game.
//!
//! Wires the game core to a console presenter, line-buffered keyboard
//! input and a JSON-lines event log, then runs one participant through
//! the demonstrations, the pair choice and the main session.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$OUTPOST_CONFIG` or `outpost-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the event log
//! 4. Start the keyboard thread
//! 5. Build and run the experiment
//! 6. Wait for the event log to flush and log the result
//!
//! The participant id comes from the first command-line argument, falling
//! back to `session.participant_id` in the config.

mod console;
mod error;
mod event_log;
mod keyboard;

use std::path::PathBuf;

use outpost_core::{Experiment, GameConfig, TracingSink, input_channel};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::ConsolePresenter;
use crate::error::EngineError;
use crate::event_log::JsonlSink;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "OUTPOST_CONFIG";

/// Config file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG: &str = "outpost-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if startup fails or the experiment aborts.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so the source is
    //    reported once it is.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("outpost-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        seed = ?config.session.seed,
        observe_rounds = config.session.observe_rounds,
        repetitions = config.session.repetitions,
        rounds_per_repetition = config.session.rounds_per_repetition,
        max_moves_per_turn = config.session.max_moves_per_turn,
        "Session parameters"
    );

    let participant = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.session.participant_id.clone());

    // 3. Open the event log.
    let (event_log, writer) = JsonlSink::create(&config.logging.event_log)
        .await
        .map_err(EngineError::from)?;

    // 4. Start the keyboard thread.
    let (input, receiver) = input_channel();
    let (choice_tx, choice_rx) = mpsc::unbounded_channel();
    // Detached: a pending stdin read must not hold up exit.
    let _keyboard = keyboard::spawn(input, choice_tx).map_err(EngineError::from)?;
    println!("Keys: w a s d move, f forage/revive, e scan, r push, then Enter");

    // 5. Build and run the experiment.
    let experiment = Experiment::builder()
        .config(config)
        .participant_id(participant)
        .presenter(ConsolePresenter::new(choice_rx))
        .sink((event_log, TracingSink))
        .input(receiver)
        .build()
        .map_err(EngineError::from)?;
    info!(run_id = %experiment.run_id(), "Experiment ready");

    let outcome = experiment.run().await;

    // 6. The experiment owned the last sink handle; the writer drains and
    //    exits.
    match writer.await {
        Ok(records) => info!(records, "Event log flushed"),
        Err(e) => warn!(error = %e, "Event log writer failed"),
    }

    let summary = outcome.map_err(EngineError::from)?;
    for session in &summary.sessions {
        info!(
            session = ?session.session,
            gold = session.gold,
            turns = session.turns,
            "Session result"
        );
    }
    info!(
        chosen_pair = ?summary.chosen_pair,
        partner_order = ?summary.partner_order,
        records = summary.records,
        "outpost-engine finished"
    );
    Ok(())
}

/// Load configuration from [`CONFIG_ENV`] or [`DEFAULT_CONFIG`].
///
/// A missing default file yields the defaults; a missing file named by
/// the environment is an error. The result is validated either way.
fn load_config() -> Result<(GameConfig, Option<PathBuf>), EngineError> {
    let (path, required) = std::env::var_os(CONFIG_ENV).map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG), false),
        |p| (PathBuf::from(p), true),
    );
    let (config, source) = if required || path.exists() {
        (GameConfig::from_file(&path)?, Some(path))
    } else {
        (GameConfig::default(), None)
    };
    config.validate()?;
    Ok((config, source))
}
