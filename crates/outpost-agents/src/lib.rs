//! Agent state, scripted policies, and the action resolver for the Outpost
//! cooperation game.
//!
//! This crate contains the logic layer for the two agents -- everything that
//! operates on the board without touching I/O or timing. It sits between
//! `outpost-world` (the grid) and `outpost-core` (turn scheduling and the
//! async turn flow).
//!
//! # Modules
//!
//! - [`actions`] -- Action validation, execution, probability constants, and
//!   the random draw source.
//! - [`agent`] -- The two agents and the forager's stun counter ([`Crew`]).
//! - [`board`] -- The mutable state of one session ([`Board`]).
//! - [`error`] -- Error types for resolver operations ([`AgentError`]).
//! - [`policy`] -- The six scripted decision policies.

pub mod actions;
pub mod agent;
pub mod board;
pub mod error;
pub mod policy;

// Re-export primary types at crate root for convenience.
pub use actions::draws::{Draws, FixedDraws, RngDraws};
pub use actions::handlers::{Notice, NoticeKind, Resolution};
pub use actions::{ActionSource, resolve};
pub use agent::{Agent, Crew};
pub use board::Board;
pub use error::AgentError;
pub use policy::{PolicyView, decide};
