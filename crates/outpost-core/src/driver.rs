//! Top-level experiment driver.
//!
//! An [`Experiment`] runs the whole study for one participant:
//!
//! 1. Three observation demos, one per [`PartnerPair`], each on a fresh
//!    world.
//! 2. The participant picks a pair (modal, or `session.auto_choice`).
//! 3. The main phase on another fresh world: one repetition per scheduled
//!    partner, the chosen pair first.
//!
//! Any [`SessionError`] ends the run: it is logged once as a
//! `fatal_error` record, shown on the presenter, and reported to the
//! observer as [`CompletionReason::Aborted`].

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

use outpost_agents::RngDraws;
use outpost_types::{
    CompletionReason, GameEvent, PartnerPair, PolicyId, Position, SessionId, SessionLabel,
};
use outpost_world::{MapRow, WorldBaseline, rows_from_yaml, starting_map};

use crate::config::GameConfig;
use crate::error::SessionError;
use crate::flow::TurnFlow;
use crate::input::{InputReceiver, input_channel};
use crate::ports::{EventSink, NoOpObserver, Presenter, SessionObserver, Timer, TokioTimer};
use crate::recorder::Recorder;
use crate::scheduler::SessionContext;
use crate::summary::{ExperimentSummary, SessionSummary};

/// Build the main-phase partner schedule.
///
/// The chosen pair's two members come first in random order, followed by
/// the remaining four partners in random order.
pub fn partner_order<R: Rng + ?Sized>(chosen: PartnerPair, rng: &mut R) -> Vec<PolicyId> {
    let mut order = chosen.members().to_vec();
    order.shuffle(rng);
    let mut rest: Vec<PolicyId> = PolicyId::ALL
        .into_iter()
        .filter(|p| !order.contains(p))
        .collect();
    rest.shuffle(rng);
    order.extend(rest);
    order
}

/// Builder for an [`Experiment`].
///
/// Participant id, presenter and sink are required. The timer defaults to
/// [`TokioTimer`], the observer to [`NoOpObserver`], and the map to the
/// configured file or the built-in map.
pub struct ExperimentBuilder<P, S, T = TokioTimer, O = NoOpObserver> {
    config: GameConfig,
    participant_id: Option<String>,
    rows: Option<Vec<MapRow>>,
    presenter: Option<P>,
    sink: Option<S>,
    timer: T,
    observer: O,
    input: Option<InputReceiver>,
}

impl<P, S> ExperimentBuilder<P, S> {
    /// Start a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            participant_id: None,
            rows: None,
            presenter: None,
            sink: None,
            timer: TokioTimer,
            observer: NoOpObserver,
            input: None,
        }
    }
}

impl<P, S> Default for ExperimentBuilder<P, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, S, T, O> ExperimentBuilder<P, S, T, O>
where
    P: Presenter,
    S: EventSink,
    T: Timer,
    O: SessionObserver,
{
    /// Use this configuration. A non-empty `session.participant_id` also
    /// sets the participant.
    #[must_use]
    pub fn config(mut self, config: GameConfig) -> Self {
        if !config.session.participant_id.is_empty() {
            self.participant_id = Some(config.session.participant_id.clone());
        }
        self.config = config;
        self
    }

    /// Set the participant identifier.
    #[must_use]
    pub fn participant_id(mut self, id: impl Into<String>) -> Self {
        self.participant_id = Some(id.into());
        self
    }

    /// Use these map rows instead of the configured map source.
    #[must_use]
    pub fn map_rows(mut self, rows: Vec<MapRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Set the presenter.
    #[must_use]
    pub fn presenter(mut self, presenter: P) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Set the event sink.
    #[must_use]
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Receive participant input from this gate.
    #[must_use]
    pub fn input(mut self, input: InputReceiver) -> Self {
        self.input = Some(input);
        self
    }

    /// Replace the timer.
    pub fn timer<T2: Timer>(self, timer: T2) -> ExperimentBuilder<P, S, T2, O> {
        ExperimentBuilder {
            config: self.config,
            participant_id: self.participant_id,
            rows: self.rows,
            presenter: self.presenter,
            sink: self.sink,
            timer,
            observer: self.observer,
            input: self.input,
        }
    }

    /// Replace the lifecycle observer.
    pub fn observer<O2: SessionObserver>(self, observer: O2) -> ExperimentBuilder<P, S, T, O2> {
        ExperimentBuilder {
            config: self.config,
            participant_id: self.participant_id,
            rows: self.rows,
            presenter: self.presenter,
            sink: self.sink,
            timer: self.timer,
            observer,
            input: self.input,
        }
    }

    /// Validate the inputs and create the experiment.
    ///
    /// No session state exists until this succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingParticipant`] without a participant
    /// id, [`SessionError::MissingPort`] without a presenter or sink, and
    /// [`SessionError::Config`] if the configuration is out of range.
    pub fn build(self) -> Result<Experiment<P, S, T, O>, SessionError> {
        let participant_id = self
            .participant_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(SessionError::MissingParticipant)?;
        let presenter = self
            .presenter
            .ok_or(SessionError::MissingPort { port: "presenter" })?;
        let sink = self
            .sink
            .ok_or(SessionError::MissingPort { port: "sink" })?;
        self.config.validate()?;

        // Without a front-end the gate never receives anything and every
        // human turn ends on the idle timer.
        let input = self.input.unwrap_or_else(|| input_channel().1);

        let mut order_rng = self
            .config
            .session
            .seed
            .map_or_else(|| SmallRng::from_rng(&mut rand::rng()), SmallRng::seed_from_u64);
        let draws = RngDraws::new(SmallRng::from_rng(&mut order_rng));

        let run_id = SessionId::new();
        info!(
            %participant_id,
            run_id = %run_id.into_inner(),
            seed = ?self.config.session.seed,
            "Experiment created"
        );

        Ok(Experiment {
            recorder: Recorder::new(sink, run_id, participant_id),
            config: self.config,
            rows: self.rows,
            presenter,
            timer: self.timer,
            observer: self.observer,
            input,
            order_rng,
            draws,
            flow_token: 0,
            current: SessionLabel::Init,
        })
    }
}

/// One participant's run through demos and the main phase.
pub struct Experiment<P, S, T, O> {
    config: GameConfig,
    rows: Option<Vec<MapRow>>,
    presenter: P,
    timer: T,
    observer: O,
    recorder: Recorder<S>,
    input: InputReceiver,
    order_rng: SmallRng,
    draws: RngDraws<SmallRng>,
    flow_token: u64,
    current: SessionLabel,
}

impl<P, S> Experiment<P, S, TokioTimer, NoOpObserver>
where
    P: Presenter,
    S: EventSink,
{
    /// Start building an experiment.
    pub fn builder() -> ExperimentBuilder<P, S> {
        ExperimentBuilder::new()
    }
}

impl<P, S, T, O> Experiment<P, S, T, O>
where
    P: Presenter,
    S: EventSink,
    T: Timer,
    O: SessionObserver,
{
    /// Identity of this run.
    pub const fn run_id(&self) -> SessionId {
        self.recorder.run_id()
    }

    /// Run demos, pair choice, and the main phase to completion.
    ///
    /// The observer is notified exactly once, whether the run completes or
    /// aborts.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] that aborted the run.
    pub async fn run(mut self) -> Result<ExperimentSummary, SessionError> {
        match self.run_phases().await {
            Ok(summary) => {
                info!(
                    gold = summary.main().map_or(0, |s| s.gold),
                    turns = summary.total_turns(),
                    records = summary.records,
                    "Experiment completed"
                );
                self.observer.on_complete(CompletionReason::Completed);
                Ok(summary)
            }
            Err(err) => {
                let message = err.to_string();
                error!(error = %message, session = ?self.current, "Experiment aborted");
                self.input.close();
                let fatal = GameEvent::FatalError {
                    message: message.clone(),
                };
                if let Err(log_err) = self.recorder.record_detached(self.current, fatal) {
                    error!(error = %log_err, "Failed to log fatal error");
                }
                self.presenter.show_error(&message);
                self.observer.on_complete(CompletionReason::Aborted);
                Err(err)
            }
        }
    }

    async fn run_phases(&mut self) -> Result<ExperimentSummary, SessionError> {
        let baseline = self.load_baseline()?;
        let mut sessions = Vec::new();

        for (pair, demo) in PartnerPair::ALL.into_iter().zip(1_u32..) {
            self.current = SessionLabel::Observe { demo, pair };
            self.presenter
                .show_message(
                    &format!("Demonstration {demo} of {}", PartnerPair::ALL.len()),
                    &format!("Watch {}", pair.label()),
                    self.config.timing.repetition_banner(),
                )
                .await;
            let flow_token = self.next_flow_token()?;
            let (mut ctx, revealed) = SessionContext::observe(
                demo,
                pair,
                baseline.fresh(),
                self.config.spawn.tiles(),
                self.config.session.observe_rounds,
                self.config.session.max_moves_per_turn,
                flow_token,
            )?;
            sessions.push(self.play(&mut ctx, &revealed).await?);
        }

        self.current = SessionLabel::Main;
        let pair = self.choose_pair().await?;
        let order = partner_order(pair, &mut self.order_rng);
        self.recorder.record_detached(
            SessionLabel::Main,
            GameEvent::PartnerChosen {
                pair,
                partner_order: order.clone(),
            },
        )?;
        info!(
            pair = %pair.label(),
            order = ?order.iter().map(|p| p.display_name()).collect::<Vec<_>>(),
            "Partner order fixed"
        );

        let flow_token = self.next_flow_token()?;
        let (mut ctx, revealed) = SessionContext::main(
            baseline.fresh(),
            self.config.spawn.tiles(),
            order.clone(),
            self.config.session.repetitions,
            self.config.session.rounds_per_repetition,
            self.config.session.max_moves_per_turn,
            flow_token,
        )?;
        sessions.push(self.play(&mut ctx, &revealed).await?);

        self.input.close();
        self.recorder.record_detached(
            SessionLabel::Main,
            GameEvent::ExperimentEnded {
                reason: CompletionReason::Completed,
            },
        )?;

        Ok(ExperimentSummary {
            run_id: self.recorder.run_id(),
            reason: CompletionReason::Completed,
            chosen_pair: Some(pair),
            partner_order: order,
            sessions,
            records: self.recorder.emitted(),
        })
    }

    async fn play(
        &mut self,
        ctx: &mut SessionContext,
        revealed: &[Position],
    ) -> Result<SessionSummary, SessionError> {
        TurnFlow::new(
            &self.presenter,
            &self.timer,
            &mut self.recorder,
            &mut self.input,
            &mut self.draws,
            &self.config.timing,
        )
        .run_session(ctx, revealed)
        .await
    }

    /// Pick the main-phase pair, from configuration or the choice modal.
    async fn choose_pair(&self) -> Result<PartnerPair, SessionError> {
        if let Some(pair) = self.config.session.auto_choice {
            info!(pair = %pair.label(), "Pair chosen automatically");
            return Ok(pair);
        }
        let options: Vec<String> = PartnerPair::ALL.iter().map(|p| p.label()).collect();
        let index = self
            .presenter
            .show_choice_modal(
                "Choose your partners",
                "Pick the pair you want to start the main game with",
                &options,
            )
            .await;
        PartnerPair::ALL
            .get(index)
            .copied()
            .ok_or_else(|| SessionError::InvalidChoice {
                index,
                options: options.len(),
            })
    }

    /// Build the immutable baseline from explicit rows, the configured
    /// file, or the built-in map.
    fn load_baseline(&self) -> Result<WorldBaseline, SessionError> {
        let rows = match (&self.rows, &self.config.map.path) {
            (Some(rows), _) => rows.clone(),
            (None, Some(path)) => {
                let source = std::fs::read_to_string(path).map_err(|source| {
                    SessionError::MapRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                rows_from_yaml(&source)?
            }
            (None, None) => starting_map(),
        };
        Ok(WorldBaseline::from_rows(&rows)?)
    }

    fn next_flow_token(&mut self) -> Result<u64, SessionError> {
        self.flow_token = self
            .flow_token
            .checked_add(1)
            .ok_or(SessionError::CounterOverflow {
                counter: "flow_token",
            })?;
        Ok(self.flow_token)
    }
}
