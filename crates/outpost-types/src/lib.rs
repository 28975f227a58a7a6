//! Shared type definitions for the Outpost cooperation game.
//!
//! This crate is the single source of truth for all types used across the
//! Outpost workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the browser front-end that renders the grid.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier wrappers (sessions, hazards)
//! - [`enums`] -- Roles, directions, ability keys, synthetic partners,
//!   rejection reasons, turn end causes
//! - [`actions`] -- The action value produced by policies and human input
//! - [`structs`] -- Positions and the positional/counter snapshot
//! - [`events`] -- The append-only event log record stream

pub mod actions;
pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, InputIntent};
pub use enums::{
    AbilityKey, CompletionReason, Controller, Direction, PartnerPair, PolicyId, RejectionReason,
    ResourceKind, Role, ScanOutcome, SessionMode, TurnEndCause,
};
pub use events::{GameEvent, LogRecord, SessionLabel};
pub use ids::{HazardId, SessionId};
pub use structs::{Position, Snapshot};
