//! The square tile grid and hazard registry.
//!
//! Tiles are stored row-major (`y * size + x`). Hazards are kept in a
//! [`BTreeMap`] so every iteration visits them in ascending id order, which
//! is also the tie-break order for "nearest hazard" searches.
//!
//! Only the action resolver mutates a [`WorldMap`], through the primitives
//! at the bottom of this file.

use std::collections::{BTreeMap, BTreeSet};

use outpost_types::{HazardId, Position};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::hazard::HazardCenter;
use crate::tile::Tile;

/// The playable board of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldMap {
    /// Side length of the square grid.
    size: u32,
    /// Row-major tiles.
    tiles: Vec<Tile>,
    /// Hazard centers by id.
    hazards: BTreeMap<HazardId, HazardCenter>,
}

impl WorldMap {
    /// Create an empty, fully hidden `size x size` grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if `size * size` does not
    /// fit in memory addressing.
    pub fn empty(size: u32) -> Result<Self, WorldError> {
        let count = usize::try_from(size)
            .ok()
            .and_then(|side| side.checked_mul(side))
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(Self {
            size,
            tiles: vec![Tile::default(); count],
            hazards: BTreeMap::new(),
        })
    }

    /// Side length of the grid.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Whether a position lies on the grid.
    pub const fn contains(&self, at: Position) -> bool {
        at.x < self.size && at.y < self.size
    }

    fn index(&self, at: Position) -> Option<usize> {
        if !self.contains(at) {
            return None;
        }
        let row = usize::try_from(at.y).ok()?;
        let col = usize::try_from(at.x).ok()?;
        let side = usize::try_from(self.size).ok()?;
        row.checked_mul(side)?.checked_add(col)
    }

    fn out_of_bounds(&self, at: Position) -> WorldError {
        WorldError::OutOfBounds {
            at,
            size: self.size,
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The tile at a position, or `None` off the grid.
    pub fn tile_at(&self, at: Position) -> Option<&Tile> {
        self.index(at).and_then(|i| self.tiles.get(i))
    }

    /// Look up a hazard center by id.
    pub fn hazard_by_id(&self, id: HazardId) -> Option<&HazardCenter> {
        self.hazards.get(&id)
    }

    /// The hazard center placed on a tile, if any (removed or not).
    pub fn hazard_at(&self, at: Position) -> Option<&HazardCenter> {
        self.tile_at(at)
            .and_then(|t| t.hazard_center)
            .and_then(|id| self.hazards.get(&id))
    }

    /// All hazard centers in ascending id order.
    pub fn hazards(&self) -> impl Iterator<Item = &HazardCenter> {
        self.hazards.values()
    }

    /// The lowest-id live hazard within Chebyshev distance `radius`.
    pub fn live_hazard_near(&self, at: Position, radius: u32) -> Option<&HazardCenter> {
        self.hazards
            .values()
            .find(|h| h.is_live() && h.at.chebyshev(at) <= radius)
    }

    /// Every grid position in row-major order (y, then x).
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |y| (0..self.size).map(move |x| Position::new(x, y)))
    }

    /// Every position paired with its tile, in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.positions().zip(self.tiles.iter())
    }

    /// The set of revealed positions.
    pub fn revealed_positions(&self) -> BTreeSet<Position> {
        self.tiles()
            .filter(|(_, t)| t.revealed)
            .map(|(p, _)| p)
            .collect()
    }

    /// Positions whose authored resource has been destroyed.
    pub fn depleted_positions(&self) -> BTreeSet<Position> {
        self.tiles()
            .filter(|(_, t)| t.resource_kind.is_some() && !t.has_resource)
            .map(|(p, _)| p)
            .collect()
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Overwrite the tile at a position.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `at` is off the grid.
    pub fn set_tile(&mut self, at: Position, tile: Tile) -> Result<(), WorldError> {
        let err = self.out_of_bounds(at);
        let slot = self
            .index(at)
            .and_then(|i| self.tiles.get_mut(i))
            .ok_or(err)?;
        *slot = tile;
        Ok(())
    }

    /// Register a hazard center on its tile.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateHazard`] if the id is already taken,
    /// or [`WorldError::OutOfBounds`] if the tile is off the grid.
    pub fn add_hazard(&mut self, hazard: HazardCenter) -> Result<(), WorldError> {
        if self.hazards.contains_key(&hazard.id) {
            return Err(WorldError::DuplicateHazard(hazard.id));
        }
        let err = self.out_of_bounds(hazard.at);
        let slot = self
            .index(hazard.at)
            .and_then(|i| self.tiles.get_mut(i))
            .ok_or(err)?;
        slot.hazard_center = Some(hazard.id);
        self.hazards.insert(hazard.id, hazard);
        Ok(())
    }

    /// Mark the union of every hazard's 3x3 neighbourhood, clipped to the
    /// grid, as hazard zone.
    pub fn compute_hazard_zone(&mut self) {
        let centers: Vec<Position> = self.hazards.values().map(|h| h.at).collect();
        for center in centers {
            for y in center.y.saturating_sub(1)..=center.y.saturating_add(1) {
                for x in center.x.saturating_sub(1)..=center.x.saturating_add(1) {
                    if let Some(tile) = self
                        .index(Position::new(x, y))
                        .and_then(|i| self.tiles.get_mut(i))
                    {
                        tile.is_hazard_zone = true;
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------
    // Mutation primitives
    // -------------------------------------------------------------------

    /// Reveal a tile. Returns `true` only if it was hidden before.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `at` is off the grid.
    pub fn reveal_tile(&mut self, at: Position) -> Result<bool, WorldError> {
        let err = self.out_of_bounds(at);
        let tile = self
            .index(at)
            .and_then(|i| self.tiles.get_mut(i))
            .ok_or(err)?;
        let newly = !tile.revealed;
        tile.revealed = true;
        Ok(newly)
    }

    /// Permanently destroy the resource on a tile. Returns `true` if a
    /// resource was present.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `at` is off the grid.
    pub fn deplete_resource_at(&mut self, at: Position) -> Result<bool, WorldError> {
        let err = self.out_of_bounds(at);
        let tile = self
            .index(at)
            .and_then(|i| self.tiles.get_mut(i))
            .ok_or(err)?;
        let had = tile.has_resource;
        tile.has_resource = false;
        Ok(had)
    }

    /// Mark a hazard discovered. Returns `true` if it was undiscovered.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HazardNotFound`] for an unknown id.
    pub fn discover_hazard(&mut self, id: HazardId) -> Result<bool, WorldError> {
        self.hazards
            .get_mut(&id)
            .map(HazardCenter::discover)
            .ok_or(WorldError::HazardNotFound(id))
    }

    /// Remove a discovered hazard.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HazardNotFound`] for an unknown id and
    /// [`WorldError::HazardNotDiscovered`] if it was never scanned.
    pub fn remove_hazard(&mut self, id: HazardId) -> Result<(), WorldError> {
        self.hazards
            .get_mut(&id)
            .ok_or(WorldError::HazardNotFound(id))?
            .remove()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::ResourceKind;

    use super::*;

    fn three_by_three() -> WorldMap {
        let mut map = WorldMap::empty(3).unwrap();
        map.set_tile(Position::new(1, 1), Tile::with_resource(ResourceKind::A))
            .unwrap();
        map.add_hazard(HazardCenter::new(HazardId(7), Position::new(2, 2)))
            .unwrap();
        map.compute_hazard_zone();
        map
    }

    #[test]
    fn lookups_respect_bounds() {
        let map = three_by_three();
        assert!(map.tile_at(Position::new(1, 1)).unwrap().has_resource);
        assert!(map.tile_at(Position::new(3, 0)).is_none());
        assert_eq!(map.hazard_at(Position::new(2, 2)).unwrap().id, HazardId(7));
        assert!(map.hazard_at(Position::new(0, 0)).is_none());
        assert!(map.hazard_by_id(HazardId(8)).is_none());
    }

    #[test]
    fn hazard_zone_is_clipped_neighbourhood() {
        let map = three_by_three();
        let zone: Vec<Position> = map
            .tiles()
            .filter(|(_, t)| t.is_hazard_zone)
            .map(|(p, _)| p)
            .collect();
        assert_eq!(
            zone,
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(1, 2),
                Position::new(2, 2),
            ]
        );
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut map = three_by_three();
        assert!(map.reveal_tile(Position::new(0, 0)).unwrap());
        assert!(!map.reveal_tile(Position::new(0, 0)).unwrap());
        assert!(map.reveal_tile(Position::new(5, 5)).is_err());
        assert_eq!(map.revealed_positions().len(), 1);
    }

    #[test]
    fn depletion_is_terminal() {
        let mut map = three_by_three();
        let at = Position::new(1, 1);
        assert!(map.deplete_resource_at(at).unwrap());
        assert!(!map.deplete_resource_at(at).unwrap());
        let tile = map.tile_at(at).unwrap();
        assert!(!tile.has_resource);
        assert_eq!(tile.resource_kind, Some(ResourceKind::A));
        assert!(map.depleted_positions().contains(&at));
    }

    #[test]
    fn hazard_lifecycle_through_map() {
        let mut map = three_by_three();
        assert!(map.remove_hazard(HazardId(7)).is_err());
        assert!(map.discover_hazard(HazardId(7)).unwrap());
        assert!(!map.discover_hazard(HazardId(7)).unwrap());
        map.remove_hazard(HazardId(7)).unwrap();
        assert!(map.hazard_by_id(HazardId(7)).unwrap().removed());
        assert!(map.discover_hazard(HazardId(9)).is_err());
    }

    #[test]
    fn nearby_hazard_prefers_lowest_live_id() {
        let mut map = WorldMap::empty(5).unwrap();
        map.add_hazard(HazardCenter::new(HazardId(4), Position::new(1, 1)))
            .unwrap();
        map.add_hazard(HazardCenter::new(HazardId(2), Position::new(3, 1)))
            .unwrap();
        let at = Position::new(2, 1);
        assert_eq!(map.live_hazard_near(at, 1).unwrap().id, HazardId(2));

        map.discover_hazard(HazardId(2)).unwrap();
        map.remove_hazard(HazardId(2)).unwrap();
        assert_eq!(map.live_hazard_near(at, 1).unwrap().id, HazardId(4));
        assert!(map.live_hazard_near(Position::new(4, 4), 1).is_none());
    }

    #[test]
    fn duplicate_hazard_rejected() {
        let mut map = WorldMap::empty(3).unwrap();
        map.add_hazard(HazardCenter::new(HazardId(1), Position::new(0, 0)))
            .unwrap();
        let err = map
            .add_hazard(HazardCenter::new(HazardId(1), Position::new(1, 1)))
            .unwrap_err();
        assert!(matches!(err, WorldError::DuplicateHazard(HazardId(1))));
    }
}
