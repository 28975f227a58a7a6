//! Move, turn, round, and repetition counters.
//!
//! All counters advance with checked arithmetic and surface overflow as
//! [`SessionError::CounterOverflow`]. The turn index is the single source
//! of truth for whose turn it is: even indices are forager turns, odd
//! indices are security turns, and a round completes every time the index
//! returns to an even value.

use outpost_types::{PolicyId, Role};

use crate::error::SessionError;

fn bump(value: u64, counter: &'static str) -> Result<u64, SessionError> {
    value
        .checked_add(1)
        .ok_or(SessionError::CounterOverflow { counter })
}

fn bump32(value: u32, counter: &'static str) -> Result<u32, SessionError> {
    value
        .checked_add(1)
        .ok_or(SessionError::CounterOverflow { counter })
}

/// Per-turn counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    turn_index: u64,
    moves_used: u32,
    max_moves: u32,
    turn_token: u64,
    human_role: Option<Role>,
}

impl TurnState {
    /// Counters at the start of a session.
    pub const fn new(max_moves: u32, human_role: Option<Role>) -> Self {
        Self {
            turn_index: 0,
            moves_used: 0,
            max_moves,
            turn_token: 0,
            human_role,
        }
    }

    /// Session-wide turn index.
    pub const fn turn_index(&self) -> u64 {
        self.turn_index
    }

    /// Role whose turn it is.
    pub const fn active_role(&self) -> Role {
        Role::for_turn_index(self.turn_index)
    }

    /// Moves used in the current turn.
    pub const fn moves_used(&self) -> u32 {
        self.moves_used
    }

    /// Move budget per turn.
    pub const fn max_moves(&self) -> u32 {
        self.max_moves
    }

    /// Generation counter of the current turn.
    pub const fn token(&self) -> u64 {
        self.turn_token
    }

    /// Role the participant plays, if any.
    pub const fn human_role(&self) -> Option<Role> {
        self.human_role
    }

    /// Change the participant's role (repetition boundary).
    pub const fn set_human_role(&mut self, role: Option<Role>) {
        self.human_role = role;
    }

    /// Whether the move budget is spent.
    pub const fn moves_exhausted(&self) -> bool {
        self.moves_used >= self.max_moves
    }

    /// Count one consumed move. Returns `true` once the budget is spent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] if the counter overflows.
    pub fn record_move(&mut self) -> Result<bool, SessionError> {
        self.moves_used = bump32(self.moves_used, "moves_used")?;
        Ok(self.moves_exhausted())
    }

    /// Close the current turn: bump the token and the index, reset moves.
    ///
    /// Returns `true` if the closed turn completed a round.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] if a counter overflows.
    pub fn close(&mut self) -> Result<bool, SessionError> {
        self.turn_token = bump(self.turn_token, "turn_token")?;
        self.turn_index = bump(self.turn_index, "turn_index")?;
        self.moves_used = 0;
        Ok(self.turn_index % 2 == 0)
    }
}

/// Round counter within a session or repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundState {
    current: u32,
    total: u32,
}

impl RoundState {
    /// Start at round 1 of `total`.
    pub const fn new(total: u32) -> Self {
        Self { current: 1, total }
    }

    /// Current 1-based round.
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Rounds in this block.
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Advance one round. Returns `true` when the block is complete.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] if the counter overflows.
    pub fn advance(&mut self) -> Result<bool, SessionError> {
        self.current = bump32(self.current, "round")?;
        Ok(self.current > self.total)
    }

    /// Restart at round 1.
    pub const fn reset(&mut self) {
        self.current = 1;
    }
}

/// Main-phase repetition counter and partner schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepetitionState {
    current: u32,
    total: u32,
    partner_order: Vec<PolicyId>,
}

impl RepetitionState {
    /// Start at repetition 1 of `total`.
    pub const fn new(total: u32, partner_order: Vec<PolicyId>) -> Self {
        Self {
            current: 1,
            total,
            partner_order,
        }
    }

    /// Current 1-based repetition.
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Repetitions in the main phase.
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// The full partner schedule.
    pub fn partner_order(&self) -> &[PolicyId] {
        &self.partner_order
    }

    /// Partner bound to the current repetition.
    pub fn partner(&self) -> Option<PolicyId> {
        let index = usize::try_from(self.current.saturating_sub(1)).ok()?;
        self.partner_order.get(index).copied()
    }

    /// Advance one repetition. Returns `true` when the main phase is over.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] if the counter overflows.
    pub fn advance(&mut self) -> Result<bool, SessionError> {
        self.current = bump32(self.current, "repetition")?;
        Ok(self.current > self.total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rounds_complete_every_two_turns() {
        let mut turn = TurnState::new(5, None);
        assert_eq!(turn.active_role(), Role::Forager);
        assert!(!turn.close().unwrap());
        assert_eq!(turn.active_role(), Role::Security);
        assert!(turn.close().unwrap());
        assert_eq!(turn.turn_index(), 2);
        assert_eq!(turn.token(), 2);
    }

    #[test]
    fn move_budget() {
        let mut turn = TurnState::new(2, Some(Role::Forager));
        assert!(!turn.record_move().unwrap());
        assert!(turn.record_move().unwrap());
        turn.close().unwrap();
        assert_eq!(turn.moves_used(), 0);
        assert!(!turn.moves_exhausted());
    }

    #[test]
    fn round_block_completion() {
        let mut round = RoundState::new(2);
        assert!(!round.advance().unwrap());
        assert!(round.advance().unwrap());
        round.reset();
        assert_eq!(round.current(), 1);
    }

    #[test]
    fn repetition_partners_follow_schedule() {
        let mut reps = RepetitionState::new(2, vec![PolicyId::Hunter, PolicyId::CautiousMiner]);
        assert_eq!(reps.partner(), Some(PolicyId::Hunter));
        assert!(!reps.advance().unwrap());
        assert_eq!(reps.partner(), Some(PolicyId::CautiousMiner));
        assert!(reps.advance().unwrap());
    }
}
