//! The mutable state of one session.

use outpost_types::{Controller, Position, Role};
use outpost_world::WorldMap;
use tracing::debug;

use crate::agent::Crew;
use crate::error::AgentError;

/// World, agents, and the shared gold total of one session.
///
/// Gold is never reset between repetitions; a new session starts from a
/// new board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// The working copy of the world.
    pub world: WorldMap,
    /// Both agents.
    pub crew: Crew,
    /// Gold collected so far.
    pub gold: u32,
}

impl Board {
    /// Put both agents on their spawn tiles and reveal those tiles.
    ///
    /// Returns the board and the spawn tiles that were newly revealed, in
    /// role order.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OffGrid`] if a spawn tile lies outside the
    /// grid.
    pub fn spawn(
        mut world: WorldMap,
        forager_at: Position,
        security_at: Position,
        forager: Controller,
        security: Controller,
    ) -> Result<(Self, Vec<Position>), AgentError> {
        let mut revealed = Vec::new();
        for at in [forager_at, security_at] {
            if !world.contains(at) {
                return Err(AgentError::OffGrid { at });
            }
            if world.reveal_tile(at)? {
                revealed.push(at);
            }
        }
        debug!(%forager_at, %security_at, "Agents spawned");
        let crew = Crew::new(forager_at, forager, security_at, security);
        Ok((
            Self {
                world,
                crew,
                gold: 0,
            },
            revealed,
        ))
    }

    /// Position of the agent playing `role`.
    pub const fn position(&self, role: Role) -> Position {
        self.crew.position(role)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::PolicyId;

    use super::*;

    #[test]
    fn spawn_reveals_each_tile_once() {
        let world = WorldMap::empty(3).unwrap();
        let (board, revealed) = Board::spawn(
            world,
            Position::new(1, 1),
            Position::new(1, 1),
            Controller::Policy(PolicyId::Miner),
            Controller::Policy(PolicyId::Defender),
        )
        .unwrap();
        assert_eq!(revealed, vec![Position::new(1, 1)]);
        assert!(board.world.tile_at(Position::new(1, 1)).unwrap().revealed);
        assert_eq!(board.gold, 0);
    }

    #[test]
    fn spawn_off_grid_fails() {
        let world = WorldMap::empty(3).unwrap();
        let result = Board::spawn(
            world,
            Position::new(0, 0),
            Position::new(3, 0),
            Controller::Human,
            Controller::Policy(PolicyId::Hunter),
        );
        assert!(matches!(result, Err(AgentError::OffGrid { .. })));
    }
}
