//! Enumeration types for the Outpost cooperation game.
//!
//! All enums serialize in `snake_case` so that the exported event log
//! carries the same codes the study analysis expects (`idle_timeout`,
//! `no_resource_here`, ...).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// One of the two cooperating roles.
///
/// Turn order within a round is fixed: forager first, then security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Collects resources from revealed resource tiles.
    Forager,
    /// Scans for and removes hazards, revives a stunned forager.
    Security,
}

impl Role {
    /// Fixed turn order within a round.
    pub const ORDER: [Self; 2] = [Self::Forager, Self::Security];

    /// Return the complementary role.
    pub const fn partner(self) -> Self {
        match self {
            Self::Forager => Self::Security,
            Self::Security => Self::Forager,
        }
    }

    /// Human-readable role name used in banners.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forager => "Forager",
            Self::Security => "Security",
        }
    }

    /// The role whose turn it is for a given session-wide turn index.
    pub const fn for_turn_index(turn_index: u64) -> Self {
        if turn_index % 2 == 0 {
            Self::Forager
        } else {
            Self::Security
        }
    }
}

// ---------------------------------------------------------------------------
// Movement and abilities
// ---------------------------------------------------------------------------

/// A cardinal movement direction on the grid.
///
/// The grid origin is the top-left tile; `Up` decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Toward `y - 1`.
    Up,
    /// Toward `y + 1`.
    Down,
    /// Toward `x - 1`.
    Left,
    /// Toward `x + 1`.
    Right,
}

impl Direction {
    /// All directions, in the tie-break order used by step searches.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The `(dx, dy)` unit offset of this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// A role ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AbilityKey {
    /// Forager: collect gold from the current revealed resource tile.
    Forage,
    /// Security: check the current tile for a hazard center.
    Scan,
    /// Security: remove a discovered hazard on the current tile.
    Push,
    /// Security: clear the forager's stun while co-located.
    Revive,
}

impl AbilityKey {
    /// The role allowed to use this ability.
    pub const fn role(self) -> Role {
        match self {
            Self::Forage => Role::Forager,
            Self::Scan | Self::Push | Self::Revive => Role::Security,
        }
    }

    /// Stable string key used in logs and key bindings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forage => "forage",
            Self::Scan => "scan",
            Self::Push => "push",
            Self::Revive => "revive",
        }
    }
}

// ---------------------------------------------------------------------------
// Synthetic partners
// ---------------------------------------------------------------------------

/// The six named synthetic agents, each bound to one role and one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PolicyId {
    /// Forager heading for the nearest resource, revealed or not.
    Miner,
    /// Forager that only walks over already revealed ground.
    CautiousMiner,
    /// Forager that stays close to the security agent.
    Escort,
    /// Security that shadows the forager and revives it.
    Defender,
    /// Security that hunts down every hazard.
    Hunter,
    /// Security that explores toward risky territory.
    Scout,
}

impl PolicyId {
    /// All six synthetic agents.
    pub const ALL: [Self; 6] = [
        Self::Miner,
        Self::CautiousMiner,
        Self::Escort,
        Self::Defender,
        Self::Hunter,
        Self::Scout,
    ];

    /// The role this agent always plays.
    pub const fn role(self) -> Role {
        match self {
            Self::Miner | Self::CautiousMiner | Self::Escort => Role::Forager,
            Self::Defender | Self::Hunter | Self::Scout => Role::Security,
        }
    }

    /// Display name shown to the participant.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Miner => "Digger",
            Self::CautiousMiner => "Prospector",
            Self::Escort => "Tagalong",
            Self::Defender => "Guardian",
            Self::Hunter => "Tracker",
            Self::Scout => "Ranger",
        }
    }

    /// Short tag drawn on the agent's token.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Miner => "F1",
            Self::CautiousMiner => "F2",
            Self::Escort => "F3",
            Self::Defender => "S1",
            Self::Hunter => "S2",
            Self::Scout => "S3",
        }
    }
}

/// The three fixed forager/security pairings.
///
/// Observation demos show each pair once, in [`PartnerPair::ALL`] order;
/// the participant then chooses one pair to start the main phase with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PartnerPair {
    /// [`PolicyId::Miner`] with [`PolicyId::Defender`].
    MinerDefender,
    /// [`PolicyId::CautiousMiner`] with [`PolicyId::Hunter`].
    CautiousMinerHunter,
    /// [`PolicyId::Escort`] with [`PolicyId::Scout`].
    EscortScout,
}

impl PartnerPair {
    /// All pairs in demonstration order.
    pub const ALL: [Self; 3] = [
        Self::MinerDefender,
        Self::CautiousMinerHunter,
        Self::EscortScout,
    ];

    /// The forager member of the pair.
    pub const fn forager(self) -> PolicyId {
        match self {
            Self::MinerDefender => PolicyId::Miner,
            Self::CautiousMinerHunter => PolicyId::CautiousMiner,
            Self::EscortScout => PolicyId::Escort,
        }
    }

    /// The security member of the pair.
    pub const fn security(self) -> PolicyId {
        match self {
            Self::MinerDefender => PolicyId::Defender,
            Self::CautiousMinerHunter => PolicyId::Hunter,
            Self::EscortScout => PolicyId::Scout,
        }
    }

    /// Both members, forager first.
    pub const fn members(self) -> [PolicyId; 2] {
        [self.forager(), self.security()]
    }

    /// Label used in the choice modal, e.g. `"Digger & Guardian"`.
    pub fn label(self) -> String {
        format!(
            "{} & {}",
            self.forager().display_name(),
            self.security().display_name()
        )
    }
}

// ---------------------------------------------------------------------------
// World content
// ---------------------------------------------------------------------------

/// Depletion class of a resource tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Sturdy deposit.
    A,
    /// Average deposit.
    B,
    /// Fragile deposit.
    C,
    /// Authored with a code other than A/B/C; never depletes.
    Unclassified,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why an ability attempt was rejected.
///
/// Rejections never consume a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// Forage attempted off a revealed resource tile.
    NoResourceHere,
    /// Push attempted without a discovered, un-removed hazard underfoot.
    NoRevealedHazardToPush,
    /// Revive attempted while the forager is not stunned or not co-located.
    ForagerNotDownOrNotColocated,
    /// The ability belongs to the other role.
    WrongRole,
}

impl RejectionReason {
    /// Stable reason code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoResourceHere => "no_resource_here",
            Self::NoRevealedHazardToPush => "no_revealed_hazard_to_push",
            Self::ForagerNotDownOrNotColocated => "forager_not_down_or_not_colocated",
            Self::WrongRole => "wrong_role",
        }
    }
}

/// Why a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TurnEndCause {
    /// The active agent used all of its moves.
    MaxMoves,
    /// The human did not act before the idle timer fired.
    IdleTimeout,
    /// The forager was stunned at the start of its turn.
    StunnedSkipTurn,
    /// The forager was attacked while foraging.
    StunnedByAlien,
    /// A scripted agent had no legal or useful action left.
    NoAction,
}

impl TurnEndCause {
    /// Stable cause code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaxMoves => "max_moves",
            Self::IdleTimeout => "idle_timeout",
            Self::StunnedSkipTurn => "stunned_skip_turn",
            Self::StunnedByAlien => "stunned_by_alien",
            Self::NoAction => "no_action",
        }
    }
}

/// Result of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ScanOutcome {
    /// The tile's hazard was undiscovered and is now discovered.
    NewlyFound,
    /// The tile's hazard had already been discovered.
    AlreadyKnown,
    /// No live hazard on this tile.
    NoneFound,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// The mode of the currently running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SessionMode {
    /// Nothing running yet.
    Init,
    /// Fully scripted demonstration.
    Observe,
    /// One side human, partner rotating across repetitions.
    Main,
}

/// Who is producing the actions for the active role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Controller {
    /// The participant.
    Human,
    /// A synthetic agent.
    Policy(PolicyId),
}

/// Why the experiment stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CompletionReason {
    /// Every repetition of the main phase was played.
    Completed,
    /// A fatal error stopped the session.
    Aborted,
}
