//! The two agents on the board.
//!
//! Each role has exactly one agent. Who controls it (the participant or a
//! named synthetic partner) can change at a repetition boundary; the
//! display name and tag follow the controller.
//!
//! The forager additionally carries a stun counter. It only decreases via
//! [`Crew::tick_stun`] at the start of the forager's own turn, only
//! increases via [`Crew::apply_stun`], and [`Crew::revive`] clears it.

use outpost_types::{Controller, Position, Role};
use serde::{Deserialize, Serialize};

/// Display name shown for the participant's agent.
pub const HUMAN_DISPLAY_NAME: &str = "You";

/// Token tag drawn for the participant's agent.
pub const HUMAN_TAG: &str = "P";

/// One agent on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// The role this agent plays.
    pub role: Role,
    /// Current tile.
    pub at: Position,
    /// Who decides this agent's actions.
    pub controller: Controller,
}

impl Agent {
    /// Name shown to the participant.
    pub const fn display_name(&self) -> &'static str {
        match self.controller {
            Controller::Human => HUMAN_DISPLAY_NAME,
            Controller::Policy(id) => id.display_name(),
        }
    }

    /// Short token label.
    pub const fn tag(&self) -> &'static str {
        match self.controller {
            Controller::Human => HUMAN_TAG,
            Controller::Policy(id) => id.tag(),
        }
    }
}

/// Both agents plus the forager's stun counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    forager: Agent,
    security: Agent,
    stun_turns: u32,
}

impl Crew {
    /// Place both agents.
    pub const fn new(
        forager_at: Position,
        forager: Controller,
        security_at: Position,
        security: Controller,
    ) -> Self {
        Self {
            forager: Agent {
                role: Role::Forager,
                at: forager_at,
                controller: forager,
            },
            security: Agent {
                role: Role::Security,
                at: security_at,
                controller: security,
            },
            stun_turns: 0,
        }
    }

    /// The agent playing a role.
    pub const fn agent(&self, role: Role) -> &Agent {
        match role {
            Role::Forager => &self.forager,
            Role::Security => &self.security,
        }
    }

    /// Position of the agent playing a role.
    pub const fn position(&self, role: Role) -> Position {
        self.agent(role).at
    }

    /// Move an agent. Only the action resolver calls this.
    pub const fn relocate(&mut self, role: Role, to: Position) {
        match role {
            Role::Forager => self.forager.at = to,
            Role::Security => self.security.at = to,
        }
    }

    /// Rebind the controller of a role.
    pub const fn bind(&mut self, role: Role, controller: Controller) {
        match role {
            Role::Forager => self.forager.controller = controller,
            Role::Security => self.security.controller = controller,
        }
    }

    /// Whether both agents share a tile.
    pub fn colocated(&self) -> bool {
        self.forager.at == self.security.at
    }

    /// Remaining stun turns of the forager.
    pub const fn stun_turns(&self) -> u32 {
        self.stun_turns
    }

    /// Whether the forager is stunned.
    pub const fn is_stunned(&self) -> bool {
        self.stun_turns > 0
    }

    /// Raise the stun counter to at least `turns`. Returns the new value.
    pub fn apply_stun(&mut self, turns: u32) -> u32 {
        self.stun_turns = self.stun_turns.max(turns);
        self.stun_turns
    }

    /// Consume one stun turn. Returns the remaining count.
    pub const fn tick_stun(&mut self) -> u32 {
        self.stun_turns = self.stun_turns.saturating_sub(1);
        self.stun_turns
    }

    /// Clear the stun counter.
    pub const fn revive(&mut self) {
        self.stun_turns = 0;
    }
}

#[cfg(test)]
mod tests {
    use outpost_types::PolicyId;

    use super::*;

    fn crew() -> Crew {
        Crew::new(
            Position::new(0, 0),
            Controller::Human,
            Position::new(1, 0),
            Controller::Policy(PolicyId::Defender),
        )
    }

    #[test]
    fn identity_follows_controller() {
        let mut crew = crew();
        assert_eq!(crew.agent(Role::Forager).display_name(), "You");
        assert_eq!(crew.agent(Role::Security).tag(), "S1");

        crew.bind(Role::Forager, Controller::Policy(PolicyId::Escort));
        assert_eq!(crew.agent(Role::Forager).display_name(), "Tagalong");
    }

    #[test]
    fn stun_counter_rules() {
        let mut crew = crew();
        assert_eq!(crew.apply_stun(3), 3);
        assert_eq!(crew.tick_stun(), 2);
        // An attack while stunned raises to at least three, never lowers.
        assert_eq!(crew.apply_stun(3), 3);
        crew.stun_turns = 5;
        assert_eq!(crew.apply_stun(3), 5);
        crew.revive();
        assert!(!crew.is_stunned());
        assert_eq!(crew.tick_stun(), 0);
    }

    #[test]
    fn relocate_moves_one_agent() {
        let mut crew = crew();
        assert!(!crew.colocated());
        crew.relocate(Role::Security, Position::new(0, 0));
        assert!(crew.colocated());
        assert_eq!(crew.position(Role::Forager), Position::new(0, 0));
    }
}
