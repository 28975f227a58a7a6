//! End-of-session and end-of-run summaries.
//!
//! [`SessionSummary`] is what both a live session and a replay of its
//! event records produce, so the two can be compared directly.

use std::collections::BTreeSet;

use outpost_types::{
    CompletionReason, HazardId, PartnerPair, PolicyId, Position, SessionId, SessionLabel,
};
use outpost_world::{HazardCenter, WorldMap};
use serde::Serialize;

/// Final lifecycle flags of one hazard center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HazardState {
    /// Hazard id.
    pub id: HazardId,
    /// Center tile.
    pub at: Position,
    /// Whether security found it.
    pub discovered: bool,
    /// Whether security pushed it away.
    pub removed: bool,
}

impl From<&HazardCenter> for HazardState {
    fn from(hazard: &HazardCenter) -> Self {
        Self {
            id: hazard.id,
            at: hazard.at,
            discovered: hazard.discovered(),
            removed: hazard.removed(),
        }
    }
}

/// Final state of one demo or main session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Which session.
    pub session: SessionLabel,
    /// Final gold total.
    pub gold: u32,
    /// Turns played.
    pub turns: u64,
    /// Every revealed tile.
    pub revealed: BTreeSet<Position>,
    /// Resource tiles that were depleted.
    pub depleted: BTreeSet<Position>,
    /// Hazard flags in ascending id order.
    pub hazards: Vec<HazardState>,
}

impl SessionSummary {
    /// Summarize a world at the end of a session.
    pub fn from_world(session: SessionLabel, world: &WorldMap, gold: u32, turns: u64) -> Self {
        Self {
            session,
            gold,
            turns,
            revealed: world.revealed_positions(),
            depleted: world.depleted_positions(),
            hazards: world.hazards().map(HazardState::from).collect(),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentSummary {
    /// Identity of the run.
    pub run_id: SessionId,
    /// Whether the main phase completed.
    pub reason: CompletionReason,
    /// Pair the participant picked.
    pub chosen_pair: Option<PartnerPair>,
    /// Partner schedule of the main phase.
    pub partner_order: Vec<PolicyId>,
    /// Demo sessions followed by the main session, in play order.
    pub sessions: Vec<SessionSummary>,
    /// Number of event records emitted.
    pub records: u64,
}

impl ExperimentSummary {
    /// Summary of the main session, if it finished.
    pub fn main(&self) -> Option<&SessionSummary> {
        self.sessions
            .iter()
            .find(|s| s.session == SessionLabel::Main)
    }

    /// Turns played across every session.
    pub fn total_turns(&self) -> u64 {
        self.sessions
            .iter()
            .fold(0_u64, |acc, s| acc.saturating_add(s.turns))
    }
}
