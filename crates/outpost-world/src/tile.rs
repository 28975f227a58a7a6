//! A single grid cell.
//!
//! Resources are depleted, never replenished: once `has_resource` turns
//! false it stays false for the rest of the session.

use outpost_types::{HazardId, ResourceKind};
use serde::{Deserialize, Serialize};

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Whether any agent has stepped on (or spawned on) this tile.
    pub revealed: bool,
    /// Whether the tile still holds a resource.
    pub has_resource: bool,
    /// Authored resource class. Kept after depletion for logging.
    pub resource_kind: Option<ResourceKind>,
    /// Whether the tile lies in the 3x3 neighbourhood of any hazard center.
    pub is_hazard_zone: bool,
    /// The hazard center placed on this tile, if any.
    pub hazard_center: Option<HazardId>,
}

impl Tile {
    /// Create a tile holding a resource of the given kind.
    pub const fn with_resource(kind: ResourceKind) -> Self {
        Self {
            revealed: false,
            has_resource: true,
            resource_kind: Some(kind),
            is_hazard_zone: false,
            hazard_center: None,
        }
    }

    /// Whether a forager standing here could forage.
    pub const fn has_revealed_resource(&self) -> bool {
        self.revealed && self.has_resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_tiles_start_hidden_with_resource() {
        let tile = Tile::with_resource(ResourceKind::B);
        assert!(tile.has_resource);
        assert!(!tile.revealed);
        assert!(!tile.has_revealed_resource());
        assert_eq!(tile.resource_kind, Some(ResourceKind::B));
    }

    #[test]
    fn default_tile_is_empty() {
        let tile = Tile::default();
        assert!(!tile.has_resource);
        assert_eq!(tile.resource_kind, None);
        assert_eq!(tile.hazard_center, None);
    }
}
