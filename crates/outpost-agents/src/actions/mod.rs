//! Action validation and execution.
//!
//! [`resolve`] is the only entry point that mutates a [`Board`]. It runs
//! the validation stages, then the matching handler, and returns a
//! [`Resolution`] describing what happened.
//!
//! # Submodules
//!
//! - [`draws`] -- The uniform draw source behind depletion and attacks.
//! - [`handlers`] -- Execution logic for each action.
//! - [`odds`] -- Fixed probabilities and stun length.
//! - [`validation`] -- Role and precondition checks.

pub mod draws;
pub mod handlers;
pub mod odds;
pub mod validation;

use outpost_types::{AbilityKey, Action, GameEvent, Role};
use tracing::debug;

use crate::board::Board;
use crate::error::AgentError;

use draws::Draws;
use handlers::Resolution;

/// Who produced the action being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    /// A participant key press.
    Human,
    /// A scripted policy decision.
    Scripted,
}

/// Validate and apply one action for the acting role.
///
/// Rejected abilities leave the board untouched and consume no move.
///
/// # Errors
///
/// Returns [`AgentError`] only if a board invariant is broken (an agent
/// off the grid, a counter overflow).
pub fn resolve(
    board: &mut Board,
    role: Role,
    action: Action,
    source: ActionSource,
    draws: &mut impl Draws,
) -> Result<Resolution, AgentError> {
    let mut out = Resolution {
        events: vec![GameEvent::ActionAttempted { action }],
        ..Resolution::default()
    };

    let key = match action {
        Action::Move { direction } => {
            handlers::handle_move(
                board,
                role,
                direction,
                source == ActionSource::Human,
                &mut out,
            )?;
            return Ok(out);
        }
        Action::Ability { key } => key,
    };

    if let Err(reason) = validation::validate_action(board, role, action) {
        debug!(?role, ability = key.as_str(), reason = reason.as_str(), "Action rejected");
        out.rejected = Some(reason);
        out.events.push(GameEvent::ActionRejected {
            ability: key,
            reason,
        });
        return Ok(out);
    }

    match key {
        AbilityKey::Forage => handlers::handle_forage(board, draws, &mut out)?,
        AbilityKey::Scan => handlers::handle_scan(board, &mut out)?,
        AbilityKey::Push => handlers::handle_push(board, &mut out)?,
        AbilityKey::Revive => handlers::handle_revive(board, &mut out),
    }
    Ok(out)
}
