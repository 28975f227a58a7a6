//! Configuration loading and typed config structures for the Outpost game.
//!
//! The canonical configuration lives in `outpost-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file is a valid configuration.
//!
//! Depletion and attack probabilities are game constants and are not
//! configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use outpost_agents::NoticeKind;
use outpost_types::{PartnerPair, PolicyId, Position};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `outpost-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Participant, seed, and session lengths.
    #[serde(default)]
    pub session: SessionConfig,

    /// Banner, notification, thinking, and idle durations.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Agent start tiles.
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// Map source.
    #[serde(default)]
    pub map: MapConfig,

    /// Diagnostic and event logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check value ranges before any session state is created.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero rounds, moves or
    /// repetitions, for more repetitions than synthetic partners, and for
    /// a zero idle timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.session;
        let checks = [
            (s.observe_rounds == 0, "session.observe_rounds must be at least 1"),
            (s.repetitions == 0, "session.repetitions must be at least 1"),
            (
                s.rounds_per_repetition == 0,
                "session.rounds_per_repetition must be at least 1",
            ),
            (
                s.max_moves_per_turn == 0,
                "session.max_moves_per_turn must be at least 1",
            ),
            (
                !usize::try_from(s.repetitions).is_ok_and(|n| n <= PolicyId::ALL.len()),
                "session.repetitions cannot exceed the number of partners (6)",
            ),
            (
                self.timing.idle_timeout_ms == 0,
                "timing.idle_timeout_ms must be at least 1",
            ),
        ];
        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, reason)) => Err(ConfigError::Invalid {
                reason: (*reason).to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// Session-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Participant identifier written on every log record.
    #[serde(default)]
    pub participant_id: String,

    /// Seed for partner shuffling and probability draws. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Rounds per observation demo.
    #[serde(default = "default_observe_rounds")]
    pub observe_rounds: u32,

    /// Number of main-phase repetitions (one partner each).
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,

    /// Rounds per main-phase repetition.
    #[serde(default = "default_rounds_per_repetition")]
    pub rounds_per_repetition: u32,

    /// Moves each agent may use per turn.
    #[serde(default = "default_max_moves_per_turn")]
    pub max_moves_per_turn: u32,

    /// Pick this pair without showing the choice modal (headless runs).
    #[serde(default)]
    pub auto_choice: Option<PartnerPair>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            participant_id: String::new(),
            seed: None,
            observe_rounds: default_observe_rounds(),
            repetitions: default_repetitions(),
            rounds_per_repetition: default_rounds_per_repetition(),
            max_moves_per_turn: default_max_moves_per_turn(),
            auto_choice: None,
        }
    }
}

/// Durations, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// "X's turn" banner.
    #[serde(default = "default_turn_banner_ms")]
    pub turn_banner_ms: u64,

    /// Stun-remaining banner on a skipped turn.
    #[serde(default = "default_stun_banner_ms")]
    pub stun_banner_ms: u64,

    /// Pause before each scripted action.
    #[serde(default = "default_thinking_ms")]
    pub thinking_ms: u64,

    /// Time a participant has to act before the turn ends.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Non-blocking repetition-change banner.
    #[serde(default = "default_repetition_banner_ms")]
    pub repetition_banner_ms: u64,

    /// Non-blocking flash for a rejected participant action.
    #[serde(default = "default_rejection_flash_ms")]
    pub rejection_flash_ms: u64,

    /// "Resource found" notification.
    #[serde(default = "default_resource_found_ms")]
    pub resource_found_ms: u64,

    /// "Collecting" notification.
    #[serde(default = "default_forage_ms")]
    pub forage_ms: u64,

    /// "Fully depleted" notification.
    #[serde(default = "default_depletion_ms")]
    pub depletion_ms: u64,

    /// Attack and stun sequence.
    #[serde(default = "default_attack_ms")]
    pub attack_ms: u64,

    /// Scan result notification.
    #[serde(default = "default_scan_ms")]
    pub scan_ms: u64,

    /// Push notification.
    #[serde(default = "default_push_ms")]
    pub push_ms: u64,

    /// Revive notification.
    #[serde(default = "default_revive_ms")]
    pub revive_ms: u64,
}

impl TimingConfig {
    /// Every duration set to zero.
    pub const fn instant() -> Self {
        Self {
            turn_banner_ms: 0,
            stun_banner_ms: 0,
            thinking_ms: 0,
            idle_timeout_ms: 1,
            repetition_banner_ms: 0,
            rejection_flash_ms: 0,
            resource_found_ms: 0,
            forage_ms: 0,
            depletion_ms: 0,
            attack_ms: 0,
            scan_ms: 0,
            push_ms: 0,
            revive_ms: 0,
        }
    }

    /// Duration of a blocking notification.
    pub const fn notice(&self, kind: NoticeKind) -> Duration {
        let ms = match kind {
            NoticeKind::ResourceFound => self.resource_found_ms,
            NoticeKind::Forage => self.forage_ms,
            NoticeKind::Depletion => self.depletion_ms,
            NoticeKind::Attack => self.attack_ms,
            NoticeKind::Scan => self.scan_ms,
            NoticeKind::Push => self.push_ms,
            NoticeKind::Revive => self.revive_ms,
        };
        Duration::from_millis(ms)
    }

    /// Turn banner duration.
    pub const fn turn_banner(&self) -> Duration {
        Duration::from_millis(self.turn_banner_ms)
    }

    /// Stun banner duration.
    pub const fn stun_banner(&self) -> Duration {
        Duration::from_millis(self.stun_banner_ms)
    }

    /// Scripted thinking delay.
    pub const fn thinking(&self) -> Duration {
        Duration::from_millis(self.thinking_ms)
    }

    /// Idle timeout for participant turns.
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Repetition banner duration.
    pub const fn repetition_banner(&self) -> Duration {
        Duration::from_millis(self.repetition_banner_ms)
    }

    /// Rejection flash duration.
    pub const fn rejection_flash(&self) -> Duration {
        Duration::from_millis(self.rejection_flash_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            turn_banner_ms: default_turn_banner_ms(),
            stun_banner_ms: default_stun_banner_ms(),
            thinking_ms: default_thinking_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            repetition_banner_ms: default_repetition_banner_ms(),
            rejection_flash_ms: default_rejection_flash_ms(),
            resource_found_ms: default_resource_found_ms(),
            forage_ms: default_forage_ms(),
            depletion_ms: default_depletion_ms(),
            attack_ms: default_attack_ms(),
            scan_ms: default_scan_ms(),
            push_ms: default_push_ms(),
            revive_ms: default_revive_ms(),
        }
    }
}

/// Agent start tiles, used at the start of every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpawnConfig {
    /// Forager start tile.
    #[serde(default = "default_forager_spawn")]
    pub forager: Position,

    /// Security start tile.
    #[serde(default = "default_security_spawn")]
    pub security: Position,
}

impl SpawnConfig {
    /// Forager and security start tiles.
    pub const fn tiles(&self) -> (Position, Position) {
        (self.forager, self.security)
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            forager: default_forager_spawn(),
            security: default_security_spawn(),
        }
    }
}

/// Map source configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MapConfig {
    /// YAML row file. The built-in map is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Diagnostic log level (`trace`, `debug`, `info`, `warn`, `error`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON-lines event log file.
    #[serde(default = "default_event_log")]
    pub event_log: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            event_log: default_event_log(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_observe_rounds() -> u32 {
    3
}

const fn default_repetitions() -> u32 {
    6
}

const fn default_rounds_per_repetition() -> u32 {
    5
}

const fn default_max_moves_per_turn() -> u32 {
    5
}

const fn default_turn_banner_ms() -> u64 {
    1200
}

const fn default_stun_banner_ms() -> u64 {
    1500
}

const fn default_thinking_ms() -> u64 {
    600
}

const fn default_idle_timeout_ms() -> u64 {
    10_000
}

const fn default_repetition_banner_ms() -> u64 {
    2000
}

const fn default_rejection_flash_ms() -> u64 {
    800
}

const fn default_resource_found_ms() -> u64 {
    1200
}

const fn default_forage_ms() -> u64 {
    900
}

const fn default_depletion_ms() -> u64 {
    1200
}

const fn default_attack_ms() -> u64 {
    1800
}

const fn default_scan_ms() -> u64 {
    1000
}

const fn default_push_ms() -> u64 {
    1000
}

const fn default_revive_ms() -> u64 {
    1000
}

const fn default_forager_spawn() -> Position {
    Position::new(0, 0)
}

const fn default_security_spawn() -> Position {
    Position::new(1, 0)
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_event_log() -> PathBuf {
    PathBuf::from("outpost-events.jsonl")
}
