//! Rebuild session outcomes from the event log alone.
//!
//! Starting from the same baseline, applying every logged reveal, scan,
//! push, and depletion in order reproduces each session's final world.
//! Random draws are not needed: their outcomes are in the records.

use outpost_types::{GameEvent, LogRecord, SessionLabel};
use outpost_world::{WorldBaseline, WorldMap};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::summary::SessionSummary;

/// A session being rebuilt.
struct Replaying {
    session: SessionLabel,
    world: WorldMap,
    gold: u32,
}

/// Replay `records` against `baseline` and summarize every session that
/// both started and ended in the stream.
///
/// # Errors
///
/// Returns [`SessionError::World`] if a record refers to a tile or hazard
/// the baseline does not have, or removes an undiscovered hazard.
pub fn replay(
    baseline: &WorldBaseline,
    records: &[LogRecord],
) -> Result<Vec<SessionSummary>, SessionError> {
    let mut summaries = Vec::new();
    let mut current: Option<Replaying> = None;

    for record in records {
        if matches!(record.event, GameEvent::SessionStarted { .. }) {
            if let Some(open) = &current {
                warn!(session = ?open.session, "Session never ended, discarding");
            }
            current = Some(Replaying {
                session: record.session,
                world: baseline.fresh(),
                gold: 0,
            });
            continue;
        }
        let Some(state) = current.as_mut() else {
            continue;
        };
        if record.session != state.session {
            continue;
        }

        match &record.event {
            GameEvent::TileRevealed { at, .. } => {
                state.world.reveal_tile(*at)?;
            }
            GameEvent::ScanResolved {
                newly_found: true,
                found_id: Some(id),
                ..
            } => {
                state.world.discover_hazard(*id)?;
            }
            GameEvent::HazardRemoved { hazard, .. } => {
                state.world.remove_hazard(*hazard)?;
            }
            GameEvent::ResourceDepleted { at } => {
                state.world.deplete_resource_at(*at)?;
            }
            GameEvent::ForageSucceeded { gold, .. } => {
                state.gold = *gold;
            }
            GameEvent::SessionEnded { turns, .. } => {
                if let Some(done) = current.take() {
                    debug!(session = ?done.session, gold = done.gold, "Session replayed");
                    summaries.push(SessionSummary::from_world(
                        done.session,
                        &done.world,
                        done.gold,
                        *turns,
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(summaries)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use outpost_types::{HazardId, Position, ScanOutcome, SessionId, SessionMode};
    use outpost_world::MapRow;

    use super::*;

    fn rec(seq: u64, session: SessionLabel, event: GameEvent) -> LogRecord {
        LogRecord {
            seq,
            at: Utc::now(),
            run_id: SessionId::new(),
            participant_id: "p".to_owned(),
            session,
            trial_index: 0,
            active_role: None,
            controller: None,
            event,
            snapshot: None,
        }
    }

    #[test]
    fn rebuilds_flags_gold_and_reveals() {
        let baseline = WorldBaseline::from_rows(&[
            MapRow::with_resource(1, 1, "A"),
            MapRow::with_hazard(2, 2, 7),
        ])
        .unwrap();
        let main = SessionLabel::Main;
        let events = [
            GameEvent::SessionStarted {
                mode: SessionMode::Main,
                grid_size: 3,
                flow_token: 1,
            },
            GameEvent::TileRevealed {
                at: Position::new(1, 1),
                has_resource: true,
            },
            GameEvent::ForageSucceeded {
                at: Position::new(1, 1),
                gold: 1,
            },
            GameEvent::ResourceDepleted {
                at: Position::new(1, 1),
            },
            GameEvent::ScanResolved {
                at: Position::new(2, 2),
                outcome: ScanOutcome::NewlyFound,
                newly_found: true,
                found_id: Some(HazardId(7)),
            },
            GameEvent::HazardRemoved {
                hazard: HazardId(7),
                at: Position::new(2, 2),
            },
            GameEvent::SessionEnded { gold: 1, turns: 4 },
        ];
        let records: Vec<_> = events
            .into_iter()
            .zip(0..)
            .map(|(event, seq)| rec(seq, main, event))
            .collect();

        let summaries = replay(&baseline, &records).unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = summaries.first().unwrap();
        assert_eq!(summary.gold, 1);
        assert_eq!(summary.turns, 4);
        assert!(summary.revealed.contains(&Position::new(1, 1)));
        assert!(summary.depleted.contains(&Position::new(1, 1)));
        let hazard = summary.hazards.first().unwrap();
        assert!(hazard.discovered && hazard.removed);
    }

    #[test]
    fn removing_an_undiscovered_hazard_fails() {
        let baseline = WorldBaseline::from_rows(&[MapRow::with_hazard(2, 2, 7)]).unwrap();
        let records = [
            rec(
                0,
                SessionLabel::Main,
                GameEvent::SessionStarted {
                    mode: SessionMode::Main,
                    grid_size: 3,
                    flow_token: 1,
                },
            ),
            rec(
                1,
                SessionLabel::Main,
                GameEvent::HazardRemoved {
                    hazard: HazardId(7),
                    at: Position::new(2, 2),
                },
            ),
        ];
        assert!(matches!(
            replay(&baseline, &records),
            Err(SessionError::World(_))
        ));
    }
}
