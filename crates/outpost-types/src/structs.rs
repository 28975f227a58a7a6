//! Positions and the positional/counter snapshot attached to every log
//! record.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Controller, PolicyId, Role};

/// A tile coordinate. The origin is the top-left tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Chebyshev (king-move) distance.
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Apply a unit offset and clamp the result to a `size x size` grid.
    ///
    /// Returns the clamped destination and whether clamping changed it.
    pub fn offset_clamped(self, dx: i32, dy: i32, size: u32) -> (Self, bool) {
        let max = i64::from(size.saturating_sub(1));
        let want_x = i64::from(self.x).saturating_add(i64::from(dx));
        let want_y = i64::from(self.y).saturating_add(i64::from(dy));
        let x = want_x.clamp(0, max);
        let y = want_y.clamp(0, max);
        let clamped = x != want_x || y != want_y;
        // Both values are within 0..=u32::MAX after clamping to the grid.
        let pos = Self {
            x: u32::try_from(x).unwrap_or(self.x),
            y: u32::try_from(y).unwrap_or(self.y),
        };
        (pos, clamped)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Full positional and counter state at the moment an event was logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Forager position.
    pub forager: Position,
    /// Security position.
    pub security: Position,
    /// Who controls the forager.
    pub forager_controller: Controller,
    /// Who controls security.
    pub security_controller: Controller,
    /// Remaining stun turns of the forager.
    pub stun_turns: u32,
    /// Session gold total.
    pub gold: u32,
    /// Session-wide turn index (0-based).
    pub turn_index: u64,
    /// Moves used in the current turn.
    pub moves_used: u32,
    /// Move budget per turn.
    pub max_moves: u32,
    /// Current round (1-based).
    pub round: u32,
    /// Rounds per session (observe) or per repetition (main).
    pub rounds_total: u32,
    /// Current repetition in the main phase.
    pub repetition: Option<u32>,
    /// Total repetitions in the main phase.
    pub repetitions_total: Option<u32>,
    /// The role the participant plays, if any.
    pub human_role: Option<Role>,
    /// The synthetic partner bound for the current repetition.
    pub partner: Option<PolicyId>,
}
