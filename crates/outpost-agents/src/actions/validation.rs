//! Precondition checks for role abilities.
//!
//! Checks run in order:
//! 1. Role -- does the ability belong to the acting role?
//! 2. Precondition -- does the board allow the ability right now?
//!
//! Moves and scans are never rejected. Each stage returns `Ok(())` on
//! success or a [`RejectionReason`] on failure.

use outpost_types::{AbilityKey, Action, RejectionReason, Role};

use crate::board::Board;

/// Validate an action for the acting role against the current board.
pub fn validate_action(board: &Board, role: Role, action: Action) -> Result<(), RejectionReason> {
    match action {
        Action::Move { .. } => Ok(()),
        Action::Ability { key } => {
            validate_role(role, key)?;
            validate_precondition(board, key)
        }
    }
}

/// Stage 1: the ability must belong to the acting role.
fn validate_role(role: Role, key: AbilityKey) -> Result<(), RejectionReason> {
    if key.role() == role {
        Ok(())
    } else {
        Err(RejectionReason::WrongRole)
    }
}

/// Stage 2: ability-specific board checks.
fn validate_precondition(board: &Board, key: AbilityKey) -> Result<(), RejectionReason> {
    match key {
        AbilityKey::Forage => {
            let here = board.position(Role::Forager);
            let ok = board
                .world
                .tile_at(here)
                .is_some_and(outpost_world::Tile::has_revealed_resource);
            if ok {
                Ok(())
            } else {
                Err(RejectionReason::NoResourceHere)
            }
        }
        AbilityKey::Scan => Ok(()),
        AbilityKey::Push => {
            let here = board.position(Role::Security);
            let ok = board
                .world
                .hazard_at(here)
                .is_some_and(|h| h.is_live() && h.discovered());
            if ok {
                Ok(())
            } else {
                Err(RejectionReason::NoRevealedHazardToPush)
            }
        }
        AbilityKey::Revive => {
            if board.crew.is_stunned() && board.crew.colocated() {
                Ok(())
            } else {
                Err(RejectionReason::ForagerNotDownOrNotColocated)
            }
        }
    }
}
