//! The six scripted decision policies.
//!
//! Each policy is a pure function of a read-only [`PolicyView`] and returns
//! the next action for its agent, or `None` when it has nothing legal or
//! useful to do. Policies keep no state between calls.
//!
//! Movement toward a target steps along the axis with the larger absolute
//! delta; ties step along x. "Nearest" searches use Manhattan distance and
//! break ties in row-major order (y, then x); hazard searches break ties by
//! ascending id.

use outpost_types::{AbilityKey, Action, Direction, PolicyId, Position, Role};
use outpost_world::WorldMap;

use crate::board::Board;

/// Read-only inputs to a policy decision.
#[derive(Debug, Clone, Copy)]
pub struct PolicyView<'a> {
    /// The session's world.
    pub world: &'a WorldMap,
    /// Forager position.
    pub forager: Position,
    /// Security position.
    pub security: Position,
    /// Remaining stun turns of the forager.
    pub stun_turns: u32,
}

impl<'a> PolicyView<'a> {
    /// Build a view of the current board.
    pub const fn of(board: &'a Board) -> Self {
        Self {
            world: &board.world,
            forager: board.crew.position(Role::Forager),
            security: board.crew.position(Role::Security),
            stun_turns: board.crew.stun_turns(),
        }
    }

    const fn forager_stunned(&self) -> bool {
        self.stun_turns > 0
    }

    fn on_revealed_resource(&self, at: Position) -> bool {
        self.world
            .tile_at(at)
            .is_some_and(outpost_world::Tile::has_revealed_resource)
    }
}

/// Evaluate the policy of a synthetic agent.
pub fn decide(policy: PolicyId, view: &PolicyView<'_>) -> Option<Action> {
    match policy {
        PolicyId::Miner => miner(view),
        PolicyId::CautiousMiner => cautious_miner(view),
        PolicyId::Escort => escort(view),
        PolicyId::Defender => defender(view),
        PolicyId::Hunter => hunter(view),
        PolicyId::Scout => scout(view),
    }
}

/// One axis-priority step from `from` toward `to`. `None` when co-located.
pub fn step_toward(from: Position, to: Position) -> Option<Action> {
    let dx = i64::from(to.x).saturating_sub(i64::from(from.x));
    let dy = i64::from(to.y).saturating_sub(i64::from(from.y));
    if dx == 0 && dy == 0 {
        return None;
    }
    let direction = if dx.unsigned_abs() >= dy.unsigned_abs() {
        if dx > 0 { Direction::Right } else { Direction::Left }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    };
    Some(Action::step(direction))
}

/// The tile minimizing `score`, ties broken by row-major order.
fn best_tile(
    world: &WorldMap,
    mut keep: impl FnMut(Position) -> bool,
    mut score: impl FnMut(Position) -> i64,
) -> Option<Position> {
    let mut best: Option<(i64, Position)> = None;
    for at in world.positions() {
        if !keep(at) {
            continue;
        }
        let s = score(at);
        if best.is_none_or(|(b, _)| s < b) {
            best = Some((s, at));
        }
    }
    best.map(|(_, at)| at)
}

fn nearest_tile(
    world: &WorldMap,
    origin: Position,
    keep: impl FnMut(Position) -> bool,
) -> Option<Position> {
    best_tile(world, keep, |at| i64::from(origin.manhattan(at)))
}

/// Security's response to a stunned forager: go to it, then revive.
fn seek_revive(view: &PolicyView<'_>) -> Option<Action> {
    if view.security == view.forager {
        Some(Action::ability(AbilityKey::Revive))
    } else {
        step_toward(view.security, view.forager)
    }
}

// ---------------------------------------------------------------------------
// Foragers
// ---------------------------------------------------------------------------

/// Forage when possible, else head for the nearest resource, revealed or
/// not.
fn miner(view: &PolicyView<'_>) -> Option<Action> {
    if view.on_revealed_resource(view.forager) {
        return Some(Action::ability(AbilityKey::Forage));
    }
    let target = nearest_tile(view.world, view.forager, |at| {
        view.world.tile_at(at).is_some_and(|t| t.has_resource)
    })?;
    step_toward(view.forager, target)
}

/// Forage when possible, else take one revealed-only step that brings the
/// nearest revealed resource closer. Never steps onto hidden ground.
fn cautious_miner(view: &PolicyView<'_>) -> Option<Action> {
    if view.on_revealed_resource(view.forager) {
        return Some(Action::ability(AbilityKey::Forage));
    }
    let target = nearest_tile(view.world, view.forager, |at| view.on_revealed_resource(at))?;
    let current = view.forager.manhattan(target);
    let size = view.world.size();

    let mut best: Option<(u32, Direction)> = None;
    for direction in Direction::ALL {
        let (dx, dy) = direction.delta();
        let (next, clamped) = view.forager.offset_clamped(dx, dy, size);
        if clamped || !view.world.tile_at(next).is_some_and(|t| t.revealed) {
            continue;
        }
        let d = next.manhattan(target);
        if d < current && best.is_none_or(|(b, _)| d < b) {
            best = Some((d, direction));
        }
    }
    best.map(|(_, direction)| Action::step(direction))
}

/// Forage only when near security; otherwise follow security.
fn escort(view: &PolicyView<'_>) -> Option<Action> {
    if view.on_revealed_resource(view.forager) && view.forager.chebyshev(view.security) <= 2 {
        return Some(Action::ability(AbilityKey::Forage));
    }
    step_toward(view.forager, view.security)
}

// ---------------------------------------------------------------------------
// Security
// ---------------------------------------------------------------------------

/// Revive a stunned forager, otherwise shadow it.
fn defender(view: &PolicyView<'_>) -> Option<Action> {
    if view.forager_stunned() {
        return seek_revive(view);
    }
    step_toward(view.security, view.forager)
}

/// Revive first, then clear every live hazard, then explore, then shadow.
fn hunter(view: &PolicyView<'_>) -> Option<Action> {
    if view.forager_stunned() {
        return seek_revive(view);
    }

    let mut target = None;
    for hazard in view.world.hazards().filter(|h| h.is_live()) {
        let d = view.security.manhattan(hazard.at);
        if target.is_none_or(|(best, _)| d < best) {
            target = Some((d, hazard));
        }
    }
    if let Some((_, hazard)) = target {
        if hazard.at == view.security {
            let key = if hazard.discovered() {
                AbilityKey::Push
            } else {
                AbilityKey::Scan
            };
            return Some(Action::ability(key));
        }
        return step_toward(view.security, hazard.at);
    }

    if let Some(hidden) = nearest_tile(view.world, view.security, |at| {
        view.world.tile_at(at).is_some_and(|t| !t.revealed)
    }) {
        return step_toward(view.security, hidden);
    }
    step_toward(view.security, view.forager)
}

/// Deal with a hazard underfoot, otherwise explore with a bias toward the
/// hazard zone, otherwise shadow.
fn scout(view: &PolicyView<'_>) -> Option<Action> {
    if let Some(hazard) = view.world.hazard_at(view.security).filter(|h| h.is_live()) {
        let key = if hazard.discovered() {
            AbilityKey::Push
        } else {
            AbilityKey::Scan
        };
        return Some(Action::ability(key));
    }

    let target = best_tile(
        view.world,
        |at| view.world.tile_at(at).is_some_and(|t| !t.revealed),
        |at| {
            let zone = view.world.tile_at(at).is_some_and(|t| t.is_hazard_zone);
            i64::from(view.security.manhattan(at)).saturating_sub(if zone { 2 } else { 0 })
        },
    );
    match target {
        Some(at) => step_toward(view.security, at),
        None => step_toward(view.security, view.forager),
    }
}
