//! Execution logic for each action.
//!
//! Handlers assume the action already passed
//! [`validate_action`](super::validation::validate_action). Each handler
//! mutates the board completely before returning; the notices it collects
//! are played by the caller afterwards, so no suspension ever happens in
//! the middle of a mutation.

use outpost_types::{
    Direction, GameEvent, HazardId, Position, RejectionReason, Role, ScanOutcome,
    TurnEndCause,
};
use tracing::{debug, info};

use crate::board::Board;
use crate::error::AgentError;

use super::draws::Draws;
use super::odds;

/// Category of a blocking notification, used to pick its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// A resource tile was revealed.
    ResourceFound,
    /// Gold collected.
    Forage,
    /// A resource was destroyed.
    Depletion,
    /// The forager was attacked.
    Attack,
    /// A scan resolved.
    Scan,
    /// A hazard was removed.
    Push,
    /// The forager was revived.
    Revive,
}

/// A blocking notification the caller must play after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A newly revealed tile holds a resource.
    ResourceFound {
        /// The tile.
        at: Position,
    },
    /// The forager collected gold.
    Collecting {
        /// Gold total after collecting.
        gold: u32,
    },
    /// The foraged resource is gone.
    FullyDepleted {
        /// The tile.
        at: Position,
    },
    /// A hazard attacked the forager.
    Attacked {
        /// The attacking hazard.
        hazard: HazardId,
        /// Stun turns after the attack.
        stun_turns: u32,
    },
    /// Result of a scan.
    Scanned {
        /// What the scan found.
        outcome: ScanOutcome,
    },
    /// A hazard was pushed away.
    Pushed {
        /// The removed hazard.
        hazard: HazardId,
    },
    /// Security revived the forager.
    Revived,
}

impl Notice {
    /// Category of the notice.
    pub const fn kind(&self) -> NoticeKind {
        match self {
            Self::ResourceFound { .. } => NoticeKind::ResourceFound,
            Self::Collecting { .. } => NoticeKind::Forage,
            Self::FullyDepleted { .. } => NoticeKind::Depletion,
            Self::Attacked { .. } => NoticeKind::Attack,
            Self::Scanned { .. } => NoticeKind::Scan,
            Self::Pushed { .. } => NoticeKind::Push,
            Self::Revived => NoticeKind::Revive,
        }
    }

    /// Headline text.
    pub const fn text(&self) -> &'static str {
        match self {
            Self::ResourceFound { .. } => "Resource found!",
            Self::Collecting { .. } => "Collecting...",
            Self::FullyDepleted { .. } => "Mine fully depleted",
            Self::Attacked { .. } => "Alien attack!",
            Self::Scanned {
                outcome: ScanOutcome::NewlyFound,
            } => "Alien nest detected!",
            Self::Scanned {
                outcome: ScanOutcome::AlreadyKnown,
            } => "Nest already known",
            Self::Scanned {
                outcome: ScanOutcome::NoneFound,
            } => "Nothing found",
            Self::Pushed { .. } => "Nest cleared",
            Self::Revived => "Forager revived",
        }
    }

    /// Secondary line.
    pub fn subtext(&self) -> String {
        match self {
            Self::ResourceFound { at } => format!("A deposit lies at {at}"),
            Self::Collecting { gold } => format!("Gold: {gold}"),
            Self::FullyDepleted { at } => format!("The deposit at {at} is gone"),
            Self::Attacked { stun_turns, .. } => {
                format!("The forager is stunned for {stun_turns} turns")
            }
            Self::Scanned { .. } => String::from("Scan complete"),
            Self::Pushed { hazard } => format!("Nest {hazard} will not attack again"),
            Self::Revived => String::from("The forager can act again"),
        }
    }
}

/// The result of resolving one action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    /// Why the action was rejected, if it was.
    pub rejected: Option<RejectionReason>,
    /// Whether the action used one of the turn's moves.
    pub consumed_move: bool,
    /// Set when the action ends the turn regardless of moves left.
    pub end_turn: Option<TurnEndCause>,
    /// Events to log, in order.
    pub events: Vec<GameEvent>,
    /// Blocking notifications to play, in order.
    pub notices: Vec<Notice>,
}

impl Resolution {
    /// Whether the action was applied.
    pub const fn applied(&self) -> bool {
        self.rejected.is_none()
    }
}

/// Step an agent one tile, clamped to the grid, and reveal the destination.
pub(crate) fn handle_move(
    board: &mut Board,
    role: Role,
    direction: Direction,
    human: bool,
    out: &mut Resolution,
) -> Result<(), AgentError> {
    let from = board.position(role);
    let (dx, dy) = direction.delta();
    let (to, clamped) = from.offset_clamped(dx, dy, board.world.size());
    board.crew.relocate(role, to);
    out.consumed_move = true;
    out.events.push(GameEvent::Moved {
        from,
        to,
        direction,
        clamped,
        human,
    });

    if board.world.reveal_tile(to)? {
        let has_resource = board.world.tile_at(to).is_some_and(|t| t.has_resource);
        out.events.push(GameEvent::TileRevealed { at: to, has_resource });
        if has_resource {
            out.notices.push(Notice::ResourceFound { at: to });
        }
    }
    debug!(?role, %from, %to, clamped, "Agent moved");
    Ok(())
}

/// Collect gold, then roll depletion, then roll an attack if a live hazard
/// is adjacent.
pub(crate) fn handle_forage(
    board: &mut Board,
    draws: &mut impl Draws,
    out: &mut Resolution,
) -> Result<(), AgentError> {
    let at = board.position(Role::Forager);
    board.gold = board
        .gold
        .checked_add(1)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: String::from("gold total overflow"),
        })?;
    out.consumed_move = true;
    out.events.push(GameEvent::ForageSucceeded {
        at,
        gold: board.gold,
    });
    out.notices.push(Notice::Collecting { gold: board.gold });

    let kind = board.world.tile_at(at).and_then(|t| t.resource_kind);
    let probability = odds::depletion_probability(kind);
    let draw = draws.uniform();
    let depleted = draw < probability;
    out.events.push(GameEvent::DepletionCheck {
        at,
        kind,
        probability,
        draw,
        depleted,
    });
    if depleted && board.world.deplete_resource_at(at)? {
        out.events.push(GameEvent::ResourceDepleted { at });
        out.notices.push(Notice::FullyDepleted { at });
    }

    let nearby = board
        .world
        .live_hazard_near(at, odds::ATTACK_RADIUS)
        .map(|h| h.id);
    if let Some(hazard) = nearby {
        let draw = draws.uniform();
        let attacked = draw < odds::ATTACK_PROBABILITY;
        out.events.push(GameEvent::AttackCheck {
            hazard,
            probability: odds::ATTACK_PROBABILITY,
            draw,
            attacked,
        });
        if attacked {
            let stun_turns = board.crew.apply_stun(odds::STUN_TURNS);
            out.events.push(GameEvent::ForagerStunned { hazard, stun_turns });
            out.notices.push(Notice::Attacked { hazard, stun_turns });
            out.end_turn = Some(TurnEndCause::StunnedByAlien);
            info!(%hazard, stun_turns, "Forager attacked");
        }
    }
    Ok(())
}

/// Check the security agent's tile for a live hazard center.
pub(crate) fn handle_scan(board: &mut Board, out: &mut Resolution) -> Result<(), AgentError> {
    let at = board.position(Role::Security);
    let live = board
        .world
        .hazard_at(at)
        .filter(|h| h.is_live())
        .map(|h| h.id);
    let (outcome, found_id) = match live {
        Some(id) => {
            if board.world.discover_hazard(id)? {
                (ScanOutcome::NewlyFound, Some(id))
            } else {
                (ScanOutcome::AlreadyKnown, Some(id))
            }
        }
        None => (ScanOutcome::NoneFound, None),
    };
    out.consumed_move = true;
    out.events.push(GameEvent::ScanResolved {
        at,
        outcome,
        newly_found: outcome == ScanOutcome::NewlyFound,
        found_id,
    });
    out.notices.push(Notice::Scanned { outcome });
    debug!(%at, ?outcome, "Scan resolved");
    Ok(())
}

/// Remove the discovered hazard under the security agent.
pub(crate) fn handle_push(board: &mut Board, out: &mut Resolution) -> Result<(), AgentError> {
    let at = board.position(Role::Security);
    let hazard = board
        .world
        .hazard_at(at)
        .map(|h| h.id)
        .ok_or(AgentError::NoHazardAt { at })?;
    board.world.remove_hazard(hazard)?;
    out.consumed_move = true;
    out.events.push(GameEvent::HazardRemoved { hazard, at });
    out.notices.push(Notice::Pushed { hazard });
    info!(%hazard, %at, "Hazard removed");
    Ok(())
}

/// Clear the co-located forager's stun.
pub(crate) fn handle_revive(board: &mut Board, out: &mut Resolution) {
    let at = board.position(Role::Security);
    board.crew.revive();
    out.consumed_move = true;
    out.events.push(GameEvent::ForagerRevived { at });
    out.notices.push(Notice::Revived);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_carry_kinds_and_text() {
        let notice = Notice::Scanned {
            outcome: ScanOutcome::NewlyFound,
        };
        assert_eq!(notice.kind(), NoticeKind::Scan);
        assert_eq!(notice.text(), "Alien nest detected!");
        assert_eq!(Notice::Collecting { gold: 4 }.subtext(), "Gold: 4");
    }
}
