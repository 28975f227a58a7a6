//! The append-only event log record stream.
//!
//! The core emits exactly one [`LogRecord`] per discrete occurrence. Every
//! record carries the trial index, the acting controller and a full
//! [`Snapshot`], so the stream alone is enough to reconstruct the final
//! gold total, hazard flags and revealed tile set of each session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::actions::Action;
use crate::enums::{
    AbilityKey, CompletionReason, Controller, Direction, PartnerPair, PolicyId, RejectionReason,
    ResourceKind, Role, ScanOutcome, SessionMode, TurnEndCause,
};
use crate::ids::{HazardId, SessionId};
use crate::structs::{Position, Snapshot};

/// Which session of the run a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "mode", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SessionLabel {
    /// Before any session starts (configuration and map failures).
    Init,
    /// A scripted demonstration.
    Observe {
        /// 1-based demo number.
        demo: u32,
        /// The pair being demonstrated.
        pair: PartnerPair,
    },
    /// The main phase.
    Main,
}

impl SessionLabel {
    /// The session mode this label belongs to.
    pub const fn mode(self) -> SessionMode {
        match self {
            Self::Init => SessionMode::Init,
            Self::Observe { .. } => SessionMode::Observe,
            Self::Main => SessionMode::Main,
        }
    }
}

/// One discrete occurrence in the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameEvent {
    /// A demo or main session began on a fresh world.
    SessionStarted {
        /// Session mode.
        mode: SessionMode,
        /// Side length of the square grid.
        grid_size: u32,
        /// Flow generation of this session.
        flow_token: u64,
    },
    /// A demo or main session finished.
    SessionEnded {
        /// Final gold total of the session.
        gold: u32,
        /// Number of turns played.
        turns: u64,
    },
    /// The participant picked a partner pair.
    PartnerChosen {
        /// Chosen pair.
        pair: PartnerPair,
        /// Partner schedule for the main phase.
        partner_order: Vec<PolicyId>,
    },
    /// A main-phase repetition began with a new partner.
    RepetitionStarted {
        /// 1-based repetition number.
        repetition: u32,
        /// Bound partner.
        partner: PolicyId,
        /// Role the participant plays in this repetition.
        human_role: Role,
    },
    /// A main-phase repetition finished.
    RepetitionEnded {
        /// 1-based repetition number.
        repetition: u32,
    },
    /// Both roles have played one turn.
    RoundEnded {
        /// 1-based number of the round that just ended.
        round: u32,
    },
    /// A turn began (after its banner).
    TurnStarted {
        /// Active role.
        role: Role,
        /// Generation counter of this turn.
        turn_token: u64,
    },
    /// A turn ended.
    TurnEnded {
        /// Why it ended.
        cause: TurnEndCause,
        /// Moves used before it ended.
        moves_used: u32,
    },
    /// A stunned forager lost its turn.
    StunTick {
        /// Stun turns left after this tick.
        remaining: u32,
    },
    /// A tile was revealed for the first time.
    TileRevealed {
        /// Revealed tile.
        at: Position,
        /// Whether the tile holds a resource.
        has_resource: bool,
    },
    /// An agent moved.
    Moved {
        /// Start tile.
        from: Position,
        /// End tile (after clamping).
        to: Position,
        /// Requested direction.
        direction: Direction,
        /// Whether the destination was clamped to the grid.
        clamped: bool,
        /// Whether the move came from the participant.
        human: bool,
    },
    /// An action candidate was submitted to the resolver.
    ActionAttempted {
        /// The candidate.
        action: Action,
    },
    /// An ability attempt failed its precondition.
    ActionRejected {
        /// The attempted ability.
        ability: AbilityKey,
        /// Reason code.
        reason: RejectionReason,
    },
    /// The forager collected gold.
    ForageSucceeded {
        /// Foraged tile.
        at: Position,
        /// Gold total after collecting.
        gold: u32,
    },
    /// The depletion draw for a forage.
    DepletionCheck {
        /// Foraged tile.
        at: Position,
        /// Resource kind of the tile.
        kind: Option<ResourceKind>,
        /// Depletion probability for that kind.
        probability: f64,
        /// The uniform draw.
        draw: f64,
        /// Whether the resource was destroyed.
        depleted: bool,
    },
    /// A resource was permanently destroyed.
    ResourceDepleted {
        /// The tile.
        at: Position,
    },
    /// The attack draw for a forage next to a live hazard.
    AttackCheck {
        /// The nearby hazard.
        hazard: HazardId,
        /// Attack probability.
        probability: f64,
        /// The uniform draw.
        draw: f64,
        /// Whether the forager was attacked.
        attacked: bool,
    },
    /// The forager was stunned by a hazard.
    ForagerStunned {
        /// The attacking hazard.
        hazard: HazardId,
        /// Stun turns after the attack.
        stun_turns: u32,
    },
    /// A scan resolved.
    ScanResolved {
        /// Scanned tile.
        at: Position,
        /// Scan result.
        outcome: ScanOutcome,
        /// Whether a hazard became discovered.
        newly_found: bool,
        /// The hazard on the tile, if any.
        found_id: Option<HazardId>,
    },
    /// A discovered hazard was pushed away.
    HazardRemoved {
        /// Removed hazard.
        hazard: HazardId,
        /// Its tile.
        at: Position,
    },
    /// Security revived the forager.
    ForagerRevived {
        /// Shared tile.
        at: Position,
    },
    /// Participant input arrived while input was closed and was dropped.
    HumanInputIgnored {
        /// Number of dropped intents since input last opened.
        count: u64,
    },
    /// The experiment finished.
    ExperimentEnded {
        /// Completion reason.
        reason: CompletionReason,
    },
    /// A fatal error ended the run.
    FatalError {
        /// Error description.
        message: String,
    },
}

impl GameEvent {
    /// Stable event name (matches the serialized `type` tag).
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::SessionEnded { .. } => "session_ended",
            Self::PartnerChosen { .. } => "partner_chosen",
            Self::RepetitionStarted { .. } => "repetition_started",
            Self::RepetitionEnded { .. } => "repetition_ended",
            Self::RoundEnded { .. } => "round_ended",
            Self::TurnStarted { .. } => "turn_started",
            Self::TurnEnded { .. } => "turn_ended",
            Self::StunTick { .. } => "stun_tick",
            Self::TileRevealed { .. } => "tile_revealed",
            Self::Moved { .. } => "moved",
            Self::ActionAttempted { .. } => "action_attempted",
            Self::ActionRejected { .. } => "action_rejected",
            Self::ForageSucceeded { .. } => "forage_succeeded",
            Self::DepletionCheck { .. } => "depletion_check",
            Self::ResourceDepleted { .. } => "resource_depleted",
            Self::AttackCheck { .. } => "attack_check",
            Self::ForagerStunned { .. } => "forager_stunned",
            Self::ScanResolved { .. } => "scan_resolved",
            Self::HazardRemoved { .. } => "hazard_removed",
            Self::ForagerRevived { .. } => "forager_revived",
            Self::HumanInputIgnored { .. } => "human_input_ignored",
            Self::ExperimentEnded { .. } => "experiment_ended",
            Self::FatalError { .. } => "fatal_error",
        }
    }
}

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogRecord {
    /// Strictly increasing sequence number within the run.
    pub seq: u64,
    /// Wall-clock time the record was created.
    pub at: DateTime<Utc>,
    /// Run identifier.
    pub run_id: SessionId,
    /// Participant identifier.
    pub participant_id: String,
    /// Session the record belongs to.
    pub session: SessionLabel,
    /// Run-wide trial (turn) counter.
    pub trial_index: u64,
    /// Role active when the event happened, if a turn was running.
    pub active_role: Option<Role>,
    /// Controller of the active role, if a turn was running.
    pub controller: Option<Controller>,
    /// The event itself.
    pub event: GameEvent,
    /// Positions and counters at the time of the event.
    pub snapshot: Option<Snapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = GameEvent::ScanResolved {
            at: Position::new(2, 2),
            outcome: ScanOutcome::NewlyFound,
            newly_found: true,
            found_id: Some(HazardId(7)),
        };
        let json = serde_json::to_value(&event).ok();
        let tag = json
            .as_ref()
            .and_then(|v| v.get("type"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(tag, Some(event.name()));
        let found = json
            .as_ref()
            .and_then(|v| v.get("found_id"))
            .and_then(serde_json::Value::as_u64);
        assert_eq!(found, Some(7));
    }

    #[test]
    fn session_label_mode() {
        let label = SessionLabel::Observe {
            demo: 2,
            pair: PartnerPair::CautiousMinerHunter,
        };
        assert_eq!(label.mode(), SessionMode::Observe);
        assert_eq!(SessionLabel::Main.mode(), SessionMode::Main);
    }
}
