//! Error types for the `outpost-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use outpost_types::{HazardId, Position};

/// Errors that can occur while building or mutating the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The map source contained no rows.
    #[error("map source contains no rows")]
    EmptyMap,

    /// Two rows described the same coordinates.
    #[error("duplicate map row at {0}")]
    DuplicateTile(Position),

    /// Two rows declared the same hazard center id.
    #[error("duplicate hazard id: {0}")]
    DuplicateHazard(HazardId),

    /// A coordinate lies outside the grid.
    #[error("position {at} is outside the {size}x{size} grid")]
    OutOfBounds {
        /// The offending position.
        at: Position,
        /// Side length of the grid.
        size: u32,
    },

    /// A hazard id was not found in the registry.
    #[error("hazard not found: {0}")]
    HazardNotFound(HazardId),

    /// A hazard was removed before being discovered.
    #[error("hazard {0} cannot be removed before it is discovered")]
    HazardNotDiscovered(HazardId),

    /// The map source could not be parsed.
    #[error("failed to parse map source: {0}")]
    Parse(#[from] serde_yml::Error),

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
