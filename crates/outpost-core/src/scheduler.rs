//! The turn/round/repetition state machine of one session.
//!
//! A [`SessionContext`] owns everything a running session mutates: the
//! board, the counters, and the flow token that identifies it. Each demo
//! and the main session get their own context, so no state leaks between
//! sessions. The context is purely synchronous; the async turn flow drives
//! it through [`SessionContext::end_turn`].

use outpost_agents::{Board, PolicyView};
use outpost_types::{
    Controller, PartnerPair, PolicyId, Position, Role, SessionLabel, SessionMode, Snapshot,
    TurnEndCause,
};
use outpost_world::WorldMap;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::turn::{RepetitionState, RoundState, TurnState};

/// What closing a turn changed above the turn level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnBoundary {
    /// The round that just completed, if any.
    pub round_ended: Option<u32>,
    /// The repetition that just completed, if any.
    pub repetition_ended: Option<u32>,
    /// The newly bound partner and the participant's new role, if a new
    /// repetition started.
    pub next_partner: Option<(u32, PolicyId, Role)>,
    /// Whether the session is over.
    pub session_ended: bool,
}

/// State of one running session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    label: SessionLabel,
    /// The session's board.
    pub board: Board,
    turn: TurnState,
    round: RoundState,
    repetition: Option<RepetitionState>,
    flow_token: u64,
    ended: bool,
}

impl SessionContext {
    /// A fully scripted demonstration of one pair.
    ///
    /// Returns the context and the spawn tiles that were revealed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Agent`] if a spawn tile is off the grid.
    pub fn observe(
        demo: u32,
        pair: PartnerPair,
        world: WorldMap,
        spawn: (Position, Position),
        rounds: u32,
        max_moves: u32,
        flow_token: u64,
    ) -> Result<(Self, Vec<Position>), SessionError> {
        let (board, revealed) = Board::spawn(
            world,
            spawn.0,
            spawn.1,
            Controller::Policy(pair.forager()),
            Controller::Policy(pair.security()),
        )?;
        info!(demo, pair = %pair.label(), rounds, "Observation session created");
        Ok((
            Self {
                label: SessionLabel::Observe { demo, pair },
                board,
                turn: TurnState::new(max_moves, None),
                round: RoundState::new(rounds),
                repetition: None,
                flow_token,
                ended: false,
            },
            revealed,
        ))
    }

    /// The main phase: the participant plays against each partner in
    /// `partner_order`, one repetition each.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Agent`] if a spawn tile is off the grid, or
    /// [`SessionError::InvalidChoice`] if the schedule is shorter than the
    /// number of repetitions.
    pub fn main(
        world: WorldMap,
        spawn: (Position, Position),
        partner_order: Vec<PolicyId>,
        repetitions: u32,
        rounds_per_repetition: u32,
        max_moves: u32,
        flow_token: u64,
    ) -> Result<(Self, Vec<Position>), SessionError> {
        let scheduled = usize::try_from(repetitions).unwrap_or(usize::MAX);
        if partner_order.len() < scheduled {
            return Err(SessionError::InvalidChoice {
                index: scheduled,
                options: partner_order.len(),
            });
        }
        let repetition = RepetitionState::new(repetitions, partner_order);
        let first = repetition.partner().ok_or(SessionError::InvalidChoice {
            index: 0,
            options: 0,
        })?;
        let human_role = first.role().partner();
        let (forager, security) = match human_role {
            Role::Forager => (Controller::Human, Controller::Policy(first)),
            Role::Security => (Controller::Policy(first), Controller::Human),
        };
        let (board, revealed) = Board::spawn(world, spawn.0, spawn.1, forager, security)?;
        info!(
            repetitions,
            rounds_per_repetition,
            first_partner = first.display_name(),
            "Main session created"
        );
        Ok((
            Self {
                label: SessionLabel::Main,
                board,
                turn: TurnState::new(max_moves, Some(human_role)),
                round: RoundState::new(rounds_per_repetition),
                repetition: Some(repetition),
                flow_token,
                ended: false,
            },
            revealed,
        ))
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Which session this is.
    pub const fn label(&self) -> SessionLabel {
        self.label
    }

    /// Session mode.
    pub const fn mode(&self) -> SessionMode {
        self.label.mode()
    }

    /// Flow generation of this session.
    pub const fn flow_token(&self) -> u64 {
        self.flow_token
    }

    /// Generation counter of the current turn.
    pub const fn turn_token(&self) -> u64 {
        self.turn.token()
    }

    /// Session-wide turn index.
    pub const fn turn_index(&self) -> u64 {
        self.turn.turn_index()
    }

    /// Role whose turn it is.
    pub const fn active_role(&self) -> Role {
        self.turn.active_role()
    }

    /// Controller of a role.
    pub const fn controller(&self, role: Role) -> Controller {
        self.board.crew.agent(role).controller
    }

    /// Role the participant plays, if any.
    pub const fn human_role(&self) -> Option<Role> {
        self.turn.human_role()
    }

    /// Current 1-based round.
    pub const fn round(&self) -> u32 {
        self.round.current()
    }

    /// Current repetition state (main session only).
    pub const fn repetition(&self) -> Option<&RepetitionState> {
        self.repetition.as_ref()
    }

    /// Moves used in the current turn.
    pub const fn moves_used(&self) -> u32 {
        self.turn.moves_used()
    }

    /// Whether the current turn's move budget is spent.
    pub const fn moves_exhausted(&self) -> bool {
        self.turn.moves_exhausted()
    }

    /// Whether the session has ended.
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Read-only view for policy evaluation.
    pub const fn policy_view(&self) -> PolicyView<'_> {
        PolicyView::of(&self.board)
    }

    /// Positions and counters for logging and rendering.
    pub fn snapshot(&self) -> Snapshot {
        let crew = &self.board.crew;
        Snapshot {
            forager: crew.position(Role::Forager),
            security: crew.position(Role::Security),
            forager_controller: crew.agent(Role::Forager).controller,
            security_controller: crew.agent(Role::Security).controller,
            stun_turns: crew.stun_turns(),
            gold: self.board.gold,
            turn_index: self.turn.turn_index(),
            moves_used: self.turn.moves_used(),
            max_moves: self.turn.max_moves(),
            round: self.round.current(),
            rounds_total: self.round.total(),
            repetition: self.repetition.as_ref().map(RepetitionState::current),
            repetitions_total: self.repetition.as_ref().map(RepetitionState::total),
            human_role: self.turn.human_role(),
            partner: self.repetition.as_ref().and_then(RepetitionState::partner),
        }
    }

    // -------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------

    /// Count one consumed move. Returns `true` once the budget is spent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] on overflow.
    pub fn record_move(&mut self) -> Result<bool, SessionError> {
        self.turn.record_move()
    }

    /// Consume one stun turn of the forager. Returns the remaining count.
    pub const fn tick_stun(&mut self) -> u32 {
        self.board.crew.tick_stun()
    }

    /// Close the current turn and cascade into round, repetition, and
    /// session boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] on overflow.
    pub fn end_turn(&mut self, cause: TurnEndCause) -> Result<TurnBoundary, SessionError> {
        let mut boundary = TurnBoundary::default();
        debug!(
            turn_index = self.turn.turn_index(),
            cause = cause.as_str(),
            "Turn closing"
        );
        if !self.turn.close()? {
            return Ok(boundary);
        }

        boundary.round_ended = Some(self.round.current());
        if !self.round.advance()? {
            return Ok(boundary);
        }

        let Some(repetition) = self.repetition.as_mut() else {
            self.ended = true;
            boundary.session_ended = true;
            return Ok(boundary);
        };
        boundary.repetition_ended = Some(repetition.current());
        if repetition.advance()? {
            self.ended = true;
            boundary.session_ended = true;
            return Ok(boundary);
        }

        let number = repetition.current();
        let partner = repetition.partner().ok_or_else(|| SessionError::InvalidChoice {
            index: usize::try_from(number).unwrap_or(usize::MAX),
            options: repetition.partner_order().len(),
        })?;
        self.round.reset();
        let human_role = self.bind_partner(partner);
        boundary.next_partner = Some((number, partner, human_role));
        Ok(boundary)
    }

    /// Put `partner` on its role and the participant on the other.
    /// Returns the participant's new role.
    fn bind_partner(&mut self, partner: PolicyId) -> Role {
        let partner_role = partner.role();
        let human_role = partner_role.partner();
        self.board.crew.bind(partner_role, Controller::Policy(partner));
        self.board.crew.bind(human_role, Controller::Human);
        self.turn.set_human_role(Some(human_role));
        info!(
            partner = partner.display_name(),
            human_role = human_role.label(),
            "Partner bound"
        );
        human_role
    }
}
