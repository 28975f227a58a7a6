//! Hazard centers and their lifecycle.
//!
//! A center is created undiscovered. A successful scan discovers it and a
//! successful push on a discovered center removes it. Removal is terminal,
//! and `removed` implies `discovered` at all times.

use outpost_types::{HazardId, Position};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// An authored hazard center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardCenter {
    /// Authored identifier.
    pub id: HazardId,
    /// Tile the center sits on.
    pub at: Position,
    discovered: bool,
    removed: bool,
}

impl HazardCenter {
    /// Create an undiscovered, active hazard center.
    pub const fn new(id: HazardId, at: Position) -> Self {
        Self {
            id,
            at,
            discovered: false,
            removed: false,
        }
    }

    /// Whether a scan has found this center.
    pub const fn discovered(&self) -> bool {
        self.discovered
    }

    /// Whether a push has removed this center.
    pub const fn removed(&self) -> bool {
        self.removed
    }

    /// Whether the center can still attack or be scanned.
    pub const fn is_live(&self) -> bool {
        !self.removed
    }

    /// Mark the center discovered. Returns `true` if it was undiscovered.
    pub const fn discover(&mut self) -> bool {
        let newly = !self.discovered;
        self.discovered = true;
        newly
    }

    /// Mark the center removed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HazardNotDiscovered`] if the center has not
    /// been discovered yet.
    pub fn remove(&mut self) -> Result<(), WorldError> {
        if !self.discovered {
            return Err(WorldError::HazardNotDiscovered(self.id));
        }
        self.removed = true;
        Ok(())
    }
}
