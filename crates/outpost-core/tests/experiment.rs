//! End-to-end tests for whole experiment runs.
//!
//! Every run goes through the public builder with in-memory ports: a
//! [`ScriptedPresenter`] answering the choice modal, a [`MemorySink`]
//! collecting the event log, and either the instant timer (headless) or
//! the tokio timer under a paused clock.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use outpost_core::config::TimingConfig;
use outpost_core::{
    Experiment, ExperimentBuilder, GameConfig, InstantTimer, MemorySink, PresenterCall,
    ScriptedPresenter, SessionError, SessionObserver, input_channel, replay,
};
use outpost_types::{
    CompletionReason, Controller, Direction, GameEvent, InputIntent, LogRecord, PartnerPair,
    PolicyId, SessionLabel, TurnEndCause,
};
use outpost_world::{WorldBaseline, starting_map};

#[derive(Debug, Clone, Default)]
struct RecordingObserver {
    calls: Arc<Mutex<Vec<CompletionReason>>>,
}

impl RecordingObserver {
    fn calls(&self) -> Vec<CompletionReason> {
        self.calls.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_complete(&self, reason: CompletionReason) {
        self.calls.lock().unwrap().push(reason);
    }
}

fn short_config(extra: &str) -> GameConfig {
    let yaml = format!(
        "session:
  participant_id: p-42
  seed: 42
  observe_rounds: 1
  repetitions: 2
  rounds_per_repetition: 2
{extra}"
    );
    GameConfig::parse(&yaml).unwrap()
}

fn headless_config() -> GameConfig {
    GameConfig {
        timing: TimingConfig::instant(),
        ..short_config("  auto_choice: miner_defender\n")
    }
}

fn events(records: &[LogRecord]) -> Vec<&GameEvent> {
    records.iter().map(|r| &r.event).collect()
}

fn end_causes(records: &[LogRecord]) -> Vec<TurnEndCause> {
    records
        .iter()
        .filter_map(|r| match r.event {
            GameEvent::TurnEnded { cause, .. } => Some(cause),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn headless_run_completes_every_phase() {
    let sink = MemorySink::new();
    let presenter = ScriptedPresenter::new();
    let observer = RecordingObserver::default();

    let summary = Experiment::builder()
        .config(headless_config())
        .presenter(presenter.clone())
        .sink(sink.clone())
        .timer(InstantTimer)
        .observer(observer.clone())
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.reason, CompletionReason::Completed);
    assert_eq!(summary.chosen_pair, Some(PartnerPair::MinerDefender));
    assert_eq!(summary.sessions.len(), 4);
    // Three one-round demos, then two repetitions of two rounds.
    assert_eq!(summary.total_turns(), 14);
    let (head, _) = summary.partner_order.split_at(2);
    assert!(head.contains(&PolicyId::Miner));
    assert!(head.contains(&PolicyId::Defender));
    assert_eq!(observer.calls(), vec![CompletionReason::Completed]);

    // No modal in headless mode.
    assert!(
        !presenter
            .calls()
            .iter()
            .any(|c| matches!(c, PresenterCall::Choice { .. }))
    );

    let records = sink.records();
    assert_eq!(summary.records, u64::try_from(records.len()).unwrap());
    for (expected, record) in (0_u64..).zip(&records) {
        assert_eq!(record.seq, expected);
        assert_eq!(record.participant_id, "p-42");
        assert_eq!(record.run_id, summary.run_id);
    }
    assert!(
        records
            .windows(2)
            .all(|w| w.first().unwrap().trial_index <= w.last().unwrap().trial_index)
    );
    assert!(matches!(
        events(&records).last(),
        Some(GameEvent::ExperimentEnded {
            reason: CompletionReason::Completed
        })
    ));

    let demos: Vec<_> = summary
        .sessions
        .iter()
        .filter_map(|s| match s.session {
            SessionLabel::Observe { demo, pair } => Some((demo, pair)),
            _ => None,
        })
        .collect();
    assert_eq!(
        demos,
        vec![
            (1, PartnerPair::MinerDefender),
            (2, PartnerPair::CautiousMinerHunter),
            (3, PartnerPair::EscortScout),
        ]
    );
}

#[tokio::test]
async fn replaying_the_log_reproduces_every_session() {
    let sink = MemorySink::new();
    let summary = Experiment::builder()
        .config(headless_config())
        .presenter(ScriptedPresenter::new())
        .sink(sink.clone())
        .timer(InstantTimer)
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    let baseline = WorldBaseline::from_rows(&starting_map()).unwrap();
    let rebuilt = replay(&baseline, &sink.records()).unwrap();
    assert_eq!(rebuilt, summary.sessions);
}

#[tokio::test]
async fn same_seed_same_outcome() {
    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let summary = Experiment::builder()
            .config(headless_config())
            .presenter(ScriptedPresenter::new())
            .sink(MemorySink::new())
            .timer(InstantTimer)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();
        outcomes.push((summary.partner_order, summary.sessions));
    }
    assert_eq!(outcomes.first(), outcomes.last());
}

#[tokio::test]
async fn modal_selects_the_pair() {
    let presenter = ScriptedPresenter::with_choices([1]);
    let summary = Experiment::builder()
        .config(GameConfig {
            timing: TimingConfig::instant(),
            ..short_config("")
        })
        .presenter(presenter.clone())
        .sink(MemorySink::new())
        .timer(InstantTimer)
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.chosen_pair, Some(PartnerPair::CautiousMinerHunter));
    let (head, _) = summary.partner_order.split_at(2);
    assert!(head.contains(&PolicyId::CautiousMiner));
    assert!(head.contains(&PolicyId::Hunter));
    let options = presenter.calls().into_iter().find_map(|c| match c {
        PresenterCall::Choice { options, .. } => Some(options),
        _ => None,
    });
    assert_eq!(options.map(|o| o.len()), Some(3));
}

#[tokio::test]
async fn out_of_range_choice_aborts_once() {
    let sink = MemorySink::new();
    let presenter = ScriptedPresenter::with_choices([9]);
    let observer = RecordingObserver::default();
    let result = Experiment::builder()
        .config(GameConfig {
            timing: TimingConfig::instant(),
            ..short_config("")
        })
        .presenter(presenter.clone())
        .sink(sink.clone())
        .timer(InstantTimer)
        .observer(observer.clone())
        .build()
        .unwrap()
        .run()
        .await;

    assert!(matches!(
        result,
        Err(SessionError::InvalidChoice {
            index: 9,
            options: 3
        })
    ));
    assert_eq!(observer.calls(), vec![CompletionReason::Aborted]);
    let fatal = sink
        .records()
        .into_iter()
        .filter(|r| matches!(r.event, GameEvent::FatalError { .. }))
        .count();
    assert_eq!(fatal, 1);
    assert!(
        presenter
            .calls()
            .iter()
            .any(|c| matches!(c, PresenterCall::Error { .. }))
    );
}

#[tokio::test]
async fn missing_map_file_aborts_before_any_session() {
    let sink = MemorySink::new();
    let config = GameConfig {
        timing: TimingConfig::instant(),
        ..short_config("map:\n  path: /nonexistent/outpost-map.yaml\n")
    };
    let result = Experiment::builder()
        .config(config)
        .presenter(ScriptedPresenter::new())
        .sink(sink.clone())
        .timer(InstantTimer)
        .build()
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(SessionError::MapRead { .. })));
    let records = sink.records();
    assert_eq!(records.len(), 1);
    let only = records.first().unwrap();
    assert!(matches!(only.event, GameEvent::FatalError { .. }));
    assert_eq!(only.session, SessionLabel::Init);
    assert!(only.snapshot.is_none());
}

#[test]
fn builder_rejects_missing_inputs() {
    let no_participant = ExperimentBuilder::<ScriptedPresenter, MemorySink>::new()
        .presenter(ScriptedPresenter::new())
        .sink(MemorySink::new())
        .build();
    assert!(matches!(
        no_participant,
        Err(SessionError::MissingParticipant)
    ));

    let blank = ExperimentBuilder::<ScriptedPresenter, MemorySink>::new()
        .participant_id("   ")
        .presenter(ScriptedPresenter::new())
        .sink(MemorySink::new())
        .build();
    assert!(matches!(blank, Err(SessionError::MissingParticipant)));

    let no_presenter = ExperimentBuilder::<ScriptedPresenter, MemorySink>::new()
        .participant_id("p-1")
        .sink(MemorySink::new())
        .build();
    assert!(matches!(
        no_presenter,
        Err(SessionError::MissingPort { port: "presenter" })
    ));

    let no_sink = ExperimentBuilder::<ScriptedPresenter, MemorySink>::new()
        .participant_id("p-1")
        .presenter(ScriptedPresenter::new())
        .build();
    assert!(matches!(
        no_sink,
        Err(SessionError::MissingPort { port: "sink" })
    ));
}

#[test]
fn builder_rejects_invalid_config() {
    let sink = MemorySink::new();
    let config = GameConfig::parse("session:\n  rounds_per_repetition: 0\n").unwrap();
    let result = ExperimentBuilder::<ScriptedPresenter, MemorySink>::new()
        .config(config)
        .participant_id("p-1")
        .presenter(ScriptedPresenter::new())
        .sink(sink.clone())
        .build();
    assert!(matches!(result, Err(SessionError::Config(_))));
    assert!(sink.is_empty());
}

#[tokio::test(start_paused = true)]
async fn idle_human_turns_time_out_one_turn_at_a_time() {
    let sink = MemorySink::new();
    let config = short_config("  auto_choice: escort_scout\n");
    let idle = config.timing.idle_timeout();
    let (_keys, receiver) = input_channel();

    let started = tokio::time::Instant::now();
    Experiment::builder()
        .config(config)
        .presenter(ScriptedPresenter::new())
        .sink(sink.clone())
        .input(receiver)
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    let records = sink.records();
    let timeouts: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            matches!(
                r.event,
                GameEvent::TurnEnded {
                    cause: TurnEndCause::IdleTimeout,
                    ..
                }
            )
        })
        .map(|(index, _)| index)
        .collect();
    // Two repetitions of two rounds, one human turn per round.
    assert_eq!(timeouts.len(), 4);

    for index in timeouts {
        let ended = records.get(index).unwrap();
        assert_eq!(ended.controller, Some(Controller::Human));
        let before = ended.snapshot.as_ref().unwrap().turn_index;
        let next = records
            .iter()
            .skip(index)
            .find(|r| matches!(r.event, GameEvent::TurnStarted { .. }));
        if let Some(next) = next {
            let after = next.snapshot.as_ref().unwrap().turn_index;
            assert_eq!(after.checked_sub(before), Some(1));
        }
    }
    assert!(started.elapsed() >= idle.checked_mul(4).unwrap());
}

#[tokio::test(start_paused = true)]
async fn participant_keys_drive_human_turns() {
    let sink = MemorySink::new();
    let (keys, receiver) = input_channel();
    let presser = tokio::spawn(async move {
        loop {
            if keys.is_open() {
                keys.submit(InputIntent::Move(Direction::Down));
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    });

    let summary = Experiment::builder()
        .config(short_config("  auto_choice: miner_defender\n"))
        .presenter(ScriptedPresenter::new())
        .sink(sink.clone())
        .input(receiver)
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();
    presser.abort();

    let records = sink.records();
    let human_moves = records
        .iter()
        .filter(|r| matches!(r.event, GameEvent::Moved { human: true, .. }))
        .count();
    // Four human turns of five moves each.
    assert_eq!(human_moves, 20);
    assert!(!end_causes(&records).contains(&TurnEndCause::IdleTimeout));
    assert_eq!(summary.main().unwrap().turns, 8);
}
