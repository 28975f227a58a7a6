//! Action values exchanged between policies, human input, and the
//! action resolver.
//!
//! An [`Action`] is what the resolver executes; an [`InputIntent`] is what
//! a key press means before the active role is known.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AbilityKey, Direction, Role};

/// A single candidate action for the active agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// Step one tile in a cardinal direction.
    Move {
        /// Direction of the step.
        direction: Direction,
    },
    /// Use a role ability on the current tile.
    Ability {
        /// Which ability.
        key: AbilityKey,
    },
}

impl Action {
    /// Shorthand for a move action.
    pub const fn step(direction: Direction) -> Self {
        Self::Move { direction }
    }

    /// Shorthand for an ability action.
    pub const fn ability(key: AbilityKey) -> Self {
        Self::Ability { key }
    }
}

/// A raw participant intent, independent of the role being played.
///
/// The primary key means "forage" for the forager and "revive" for
/// security; scan and push only apply to security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum InputIntent {
    /// Directional key.
    Move(Direction),
    /// Shared forage / revive key.
    Primary,
    /// Scan key.
    Scan,
    /// Push key.
    Push,
}

impl InputIntent {
    /// Interpret the intent for the role the participant is playing.
    ///
    /// Returns `None` when the key has no meaning for that role.
    pub const fn to_action(self, role: Role) -> Option<Action> {
        match (self, role) {
            (Self::Move(direction), _) => Some(Action::step(direction)),
            (Self::Primary, Role::Forager) => Some(Action::ability(AbilityKey::Forage)),
            (Self::Primary, Role::Security) => Some(Action::ability(AbilityKey::Revive)),
            (Self::Scan, Role::Security) => Some(Action::ability(AbilityKey::Scan)),
            (Self::Push, Role::Security) => Some(Action::ability(AbilityKey::Push)),
            (Self::Scan | Self::Push, Role::Forager) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_is_contextual() {
        assert_eq!(
            InputIntent::Primary.to_action(Role::Forager),
            Some(Action::ability(AbilityKey::Forage))
        );
        assert_eq!(
            InputIntent::Primary.to_action(Role::Security),
            Some(Action::ability(AbilityKey::Revive))
        );
        assert_eq!(InputIntent::Scan.to_action(Role::Forager), None);
        assert_eq!(
            InputIntent::Push.to_action(Role::Security),
            Some(Action::ability(AbilityKey::Push))
        );
    }

    #[test]
    fn action_serializes_with_kind_tag() {
        let json = serde_json::to_value(Action::ability(AbilityKey::Scan)).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({"kind": "ability", "key": "scan"}))
        );
    }
}
