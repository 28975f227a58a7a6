//! Error types for the outpost-core crate.
//!
//! Invalid actions and stale continuations are not errors. Everything here
//! is fatal: it ends the run, is logged once as a `fatal_error` event, and
//! surfaces on the presenter's error state.

use std::path::PathBuf;

use outpost_agents::AgentError;
use outpost_world::WorldError;

use crate::config::ConfigError;

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The map source failed to parse or build.
    #[error("map error: {0}")]
    World(#[from] WorldError),

    /// An agent or resolver invariant was broken.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// The configured map file could not be read.
    #[error("failed to read map file {}: {source}", path.display())]
    MapRead {
        /// The configured path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No participant identifier was supplied.
    #[error("participant id is required")]
    MissingParticipant,

    /// A required collaborator was not supplied.
    #[error("missing required port: {port}")]
    MissingPort {
        /// Name of the missing collaborator.
        port: &'static str,
    },

    /// The choice modal returned an option that does not exist.
    #[error("choice {index} is out of range ({options} options)")]
    InvalidChoice {
        /// The returned index.
        index: usize,
        /// Number of options offered.
        options: usize,
    },

    /// A scheduler counter overflowed.
    #[error("counter overflow: {counter}")]
    CounterOverflow {
        /// Which counter.
        counter: &'static str,
    },
}
