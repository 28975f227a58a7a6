//! The immutable parsed world and its per-session factory.
//!
//! A [`WorldBaseline`] is built once from the map source and never mutated.
//! Every demo and the main session call [`WorldBaseline::fresh`] to get an
//! independent working copy, so no session can leak state into another.

use std::collections::BTreeSet;

use outpost_types::Position;
use tracing::debug;

use crate::error::WorldError;
use crate::hazard::HazardCenter;
use crate::map_rows::MapRow;
use crate::tile::Tile;
use crate::world_map::WorldMap;

/// Read-only world built from authored rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldBaseline {
    map: WorldMap,
}

impl WorldBaseline {
    /// Build the baseline from authored rows.
    ///
    /// The grid side is `max(max_x, max_y) + 1`. Resource tiles are placed
    /// first, then hazard centers, then the hazard zone is derived.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyMap`] for an empty row list,
    /// [`WorldError::DuplicateTile`] if two rows share coordinates, and
    /// [`WorldError::DuplicateHazard`] if two rows share a hazard id.
    pub fn from_rows(rows: &[MapRow]) -> Result<Self, WorldError> {
        let max_coord = rows
            .iter()
            .map(|r| r.x.max(r.y))
            .max()
            .ok_or(WorldError::EmptyMap)?;
        let size = max_coord
            .checked_add(1)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let mut map = WorldMap::empty(size)?;

        let mut seen = BTreeSet::new();
        for row in rows {
            let at = row.position();
            if !seen.insert(at) {
                return Err(WorldError::DuplicateTile(at));
            }
            if let Some(kind) = row.resource_kind() {
                map.set_tile(at, Tile::with_resource(kind))?;
            }
        }
        for row in rows {
            if let Some(id) = row.hazard_center() {
                map.add_hazard(HazardCenter::new(id, row.position()))?;
            }
        }
        map.compute_hazard_zone();

        debug!(
            size,
            rows = rows.len(),
            hazards = map.hazards().count(),
            "World baseline built"
        );
        Ok(Self { map })
    }

    /// Side length of the grid.
    pub const fn grid_size(&self) -> u32 {
        self.map.size()
    }

    /// Read-only view of the pristine map.
    pub const fn map(&self) -> &WorldMap {
        &self.map
    }

    /// Whether a position lies on the grid.
    pub const fn contains(&self, at: Position) -> bool {
        self.map.contains(at)
    }

    /// An independent working copy for one session.
    pub fn fresh(&self) -> WorldMap {
        self.map.clone()
    }
}
