//! Turn scheduling, the async turn flow, and session orchestration for the
//! Outpost cooperation game.
//!
//! This crate owns everything that moves a session forward in time:
//! banners, the stun skip, the human wait with its idle timer, the
//! scripted thinking loop, and the round and repetition boundaries.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `outpost-config.yaml` into
//!   strongly-typed structs.
//! - [`driver`] -- [`Experiment`] and its builder: demos, pair choice, and
//!   the main phase.
//! - [`error`] -- [`SessionError`].
//! - [`flow`] -- The async turn flow with turn and flow token checks.
//! - [`input`] -- The participant input gate.
//! - [`ports`] -- Presenter, event sink, timer, and observer traits with
//!   in-memory implementations.
//! - [`recorder`] -- Log record construction.
//! - [`replay`] -- Rebuilding session outcomes from the event log.
//! - [`scheduler`] -- The per-session turn/round/repetition state machine.
//! - [`summary`] -- Session and run summaries.
//! - [`turn`] -- Checked turn, round, and repetition counters.
//!
//! [`Experiment`]: driver::Experiment
//! [`SessionError`]: error::SessionError

pub mod config;
pub mod driver;
pub mod error;
pub mod flow;
pub mod input;
pub mod ports;
pub mod recorder;
pub mod replay;
pub mod scheduler;
pub mod summary;
pub mod turn;

pub use config::{ConfigError, GameConfig};
pub use driver::{Experiment, ExperimentBuilder, partner_order};
pub use error::SessionError;
pub use flow::TurnFlow;
pub use input::{HumanInput, InputReceiver, input_channel};
pub use ports::{
    EventSink, InstantTimer, MemorySink, NoOpObserver, Presenter, PresenterCall,
    ScriptedPresenter, SessionObserver, Timer, TokioTimer, TracingSink,
};
pub use recorder::Recorder;
pub use replay::replay;
pub use scheduler::{SessionContext, TurnBoundary};
pub use summary::{ExperimentSummary, HazardState, SessionSummary};
