//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run, so
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: outpost_core::ConfigError,
    },

    /// The experiment aborted.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: outpost_core::SessionError,
    },

    /// The event log file or the keyboard thread could not be set up.
    #[error("io error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
