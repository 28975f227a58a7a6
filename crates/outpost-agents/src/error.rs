//! Error types for the outpost-agents crate.
//!
//! Invalid actions are not errors: they come back as a rejected
//! [`Resolution`](crate::Resolution). The variants here cover broken
//! invariants only.

use outpost_types::Position;
use outpost_world::WorldError;

/// Errors that can occur while applying an action.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A world mutation failed.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// An agent stands outside the grid.
    #[error("agent position {at} is outside the grid")]
    OffGrid {
        /// The offending position.
        at: Position,
    },

    /// A validated push found no hazard on the tile.
    #[error("no hazard center at {at}")]
    NoHazardAt {
        /// The security agent's tile.
        at: Position,
    },

    /// An arithmetic overflow occurred in a counter.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
