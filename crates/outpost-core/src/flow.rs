//! The async turn flow.
//!
//! One [`TurnFlow`] drives one session at a time through its turns:
//!
//! 1. **Banner** -- "X's turn", non-cancellable.
//! 2. **Stun skip** -- a stunned forager loses the turn and one stun tick.
//! 3. **Human wait** -- the input gate opens and the idle timer runs.
//! 4. **Scripted loop** -- decide, think, re-check, resolve, repeat.
//! 5. **Turn end** -- cascades into round, repetition, and session ends.
//!
//! Suspension only happens at banners, notifications, the thinking pause,
//! and the idle wait. After every suspension the flow compares the turn
//! and flow tokens it captured against the session's current ones and
//! abandons the step if they moved on. The input gate is closed during
//! every suspension except the idle wait itself.

use outpost_agents::{ActionSource, Draws, Resolution, decide, resolve};
use outpost_types::{
    Action, Controller, GameEvent, InputIntent, PolicyId, Position, RejectionReason, Role,
    TurnEndCause,
};
use tracing::{debug, info, warn};

use crate::config::TimingConfig;
use crate::error::SessionError;
use crate::input::InputReceiver;
use crate::ports::{EventSink, Presenter, Timer};
use crate::recorder::Recorder;
use crate::scheduler::SessionContext;
use crate::summary::SessionSummary;

/// Tokens captured when a turn starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TurnGuard {
    turn_token: u64,
    flow_token: u64,
}

impl TurnGuard {
    const fn capture(ctx: &SessionContext) -> Self {
        Self {
            turn_token: ctx.turn_token(),
            flow_token: ctx.flow_token(),
        }
    }

    const fn is_current(self, ctx: &SessionContext) -> bool {
        !ctx.is_ended()
            && ctx.turn_token() == self.turn_token
            && ctx.flow_token() == self.flow_token
    }
}

/// What the turn does after one resolved action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Keep acting.
    Continue,
    /// End the turn with this cause.
    End(TurnEndCause),
    /// The turn ended elsewhere; drop this continuation.
    Abandon,
}

/// Borrowed collaborators for running sessions.
pub struct TurnFlow<'a, P, T, S, D> {
    presenter: &'a P,
    timer: &'a T,
    recorder: &'a mut Recorder<S>,
    input: &'a mut InputReceiver,
    draws: &'a mut D,
    timing: &'a TimingConfig,
}

impl<'a, P, T, S, D> TurnFlow<'a, P, T, S, D>
where
    P: Presenter,
    T: Timer,
    S: EventSink,
    D: Draws,
{
    /// Bundle the collaborators.
    pub const fn new(
        presenter: &'a P,
        timer: &'a T,
        recorder: &'a mut Recorder<S>,
        input: &'a mut InputReceiver,
        draws: &'a mut D,
        timing: &'a TimingConfig,
    ) -> Self {
        Self {
            presenter,
            timer,
            recorder,
            input,
            draws,
            timing,
        }
    }

    /// Play a session from its first turn until it ends.
    ///
    /// `revealed` are the spawn tiles uncovered when the session's board
    /// was created.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if a board invariant or counter breaks.
    pub async fn run_session(
        &mut self,
        ctx: &mut SessionContext,
        revealed: &[Position],
    ) -> Result<SessionSummary, SessionError> {
        self.input.close();
        self.recorder.record(
            ctx,
            GameEvent::SessionStarted {
                mode: ctx.mode(),
                grid_size: ctx.board.world.size(),
                flow_token: ctx.flow_token(),
            },
        )?;
        for &at in revealed {
            let has_resource = ctx
                .board
                .world
                .tile_at(at)
                .is_some_and(|tile| tile.has_resource);
            self.recorder
                .record(ctx, GameEvent::TileRevealed { at, has_resource })?;
        }
        let opening = ctx
            .repetition()
            .and_then(|r| Some((r.current(), r.partner()?, ctx.human_role()?)));
        if let Some((number, partner, human_role)) = opening {
            self.recorder.record(
                ctx,
                GameEvent::RepetitionStarted {
                    repetition: number,
                    partner,
                    human_role,
                },
            )?;
            self.announce_partner(number, partner, human_role);
        }
        self.render(ctx);

        while !ctx.is_ended() {
            self.play_turn(ctx).await?;
        }

        let turns = ctx.turn_index();
        self.recorder.record(
            ctx,
            GameEvent::SessionEnded {
                gold: ctx.board.gold,
                turns,
            },
        )?;
        self.recorder.close_session(turns);
        info!(
            session = ?ctx.label(),
            gold = ctx.board.gold,
            turns,
            "Session ended"
        );
        Ok(SessionSummary::from_world(
            ctx.label(),
            &ctx.board.world,
            ctx.board.gold,
            turns,
        ))
    }

    /// Play one turn of the active role.
    async fn play_turn(&mut self, ctx: &mut SessionContext) -> Result<(), SessionError> {
        let role = ctx.active_role();
        let guard = TurnGuard::capture(ctx);
        self.input.close();
        self.render(ctx);

        let agent = *ctx.board.crew.agent(role);
        let headline = match agent.controller {
            Controller::Human => String::from("Your turn"),
            Controller::Policy(_) => format!("{}'s turn", agent.display_name()),
        };
        self.presenter
            .show_message(&headline, role.label(), self.timing.turn_banner())
            .await;
        if !guard.is_current(ctx) {
            return Ok(());
        }
        self.recorder.record(
            ctx,
            GameEvent::TurnStarted {
                role,
                turn_token: guard.turn_token,
            },
        )?;
        debug!(
            turn_index = ctx.turn_index(),
            role = role.label(),
            "Turn started"
        );

        let step = if role == Role::Forager && ctx.board.crew.is_stunned() {
            self.stun_skip(ctx, guard).await?
        } else {
            match agent.controller {
                Controller::Human => self.human_turn(ctx, guard).await?,
                Controller::Policy(policy) => self.scripted_turn(ctx, policy, guard).await?,
            }
        };

        match step {
            Step::End(cause) => self.finish_turn(ctx, cause),
            Step::Continue | Step::Abandon => Ok(()),
        }
    }

    /// The forager is stunned: show the banner, consume one stun turn.
    async fn stun_skip(
        &mut self,
        ctx: &mut SessionContext,
        guard: TurnGuard,
    ) -> Result<Step, SessionError> {
        let stun = ctx.board.crew.stun_turns();
        self.presenter
            .show_message(
                "Forager is stunned",
                &format!("{stun} turn(s) remaining"),
                self.timing.stun_banner(),
            )
            .await;
        if !guard.is_current(ctx) {
            return Ok(Step::Abandon);
        }
        let remaining = ctx.tick_stun();
        self.recorder
            .record(ctx, GameEvent::StunTick { remaining })?;
        Ok(Step::End(TurnEndCause::StunnedSkipTurn))
    }

    /// Wait for participant actions until the moves run out, an action
    /// ends the turn, or the idle timer fires.
    ///
    /// The idle timer is re-armed after every applied action. Rejected
    /// actions and keys without meaning for the role leave it running.
    async fn human_turn(
        &mut self,
        ctx: &mut SessionContext,
        guard: TurnGuard,
    ) -> Result<Step, SessionError> {
        let role = ctx.active_role();
        let timer = self.timer;
        let idle_timeout = self.timing.idle_timeout();
        let mut idle = Box::pin(timer.after(idle_timeout));
        let mut stale = self.input.discard_pending();

        loop {
            let ignored = self.input.open().saturating_add(stale);
            stale = 0;
            if ignored > 0 {
                self.recorder
                    .record(ctx, GameEvent::HumanInputIgnored { count: ignored })?;
            }

            let action = loop {
                tokio::select! {
                    biased;
                    Some(intent) = self.input.recv() => {
                        if let Some(action) = intent_action(intent, role) {
                            break Some(action);
                        }
                    }
                    () = &mut idle => break None,
                }
            };
            self.input.close();

            let Some(action) = action else {
                info!(turn_index = ctx.turn_index(), "Idle timeout");
                return Ok(Step::End(TurnEndCause::IdleTimeout));
            };
            if !guard.is_current(ctx) {
                return Ok(Step::Abandon);
            }

            let resolution = resolve(
                &mut ctx.board,
                role,
                action,
                ActionSource::Human,
                self.draws,
            )?;
            let applied = resolution.applied();
            let overlaid = !resolution.notices.is_empty();
            match self.apply(ctx, resolution, guard).await? {
                Step::Continue => {}
                other => return Ok(other),
            }
            // Keys queued before a notification must not act after it.
            if overlaid {
                stale = stale.saturating_add(self.input.discard_pending());
            }
            if applied {
                idle = Box::pin(timer.after(idle_timeout));
            }
        }
    }

    /// Let a policy act until its moves run out or it has nothing to do.
    async fn scripted_turn(
        &mut self,
        ctx: &mut SessionContext,
        policy: PolicyId,
        guard: TurnGuard,
    ) -> Result<Step, SessionError> {
        let role = ctx.active_role();
        loop {
            let Some(action) = decide(policy, &ctx.policy_view()) else {
                debug!(policy = policy.display_name(), "Policy has no action");
                return Ok(Step::End(TurnEndCause::NoAction));
            };
            self.timer.after(self.timing.thinking()).await;
            if !guard.is_current(ctx) || ctx.active_role() != role {
                return Ok(Step::Abandon);
            }

            let resolution = resolve(
                &mut ctx.board,
                role,
                action,
                ActionSource::Scripted,
                self.draws,
            )?;
            let rejected = resolution.rejected;
            match self.apply(ctx, resolution, guard).await? {
                Step::Continue if rejected.is_some() => {
                    warn!(
                        policy = policy.display_name(),
                        ?action,
                        "Scripted action rejected, ending turn"
                    );
                    return Ok(Step::End(TurnEndCause::NoAction));
                }
                Step::Continue => {}
                other => return Ok(other),
            }
        }
    }

    /// Log a resolution, play its notifications, and decide whether the
    /// turn goes on.
    async fn apply(
        &mut self,
        ctx: &mut SessionContext,
        resolution: Resolution,
        guard: TurnGuard,
    ) -> Result<Step, SessionError> {
        let exhausted = if resolution.consumed_move {
            ctx.record_move()?
        } else {
            false
        };
        for event in resolution.events {
            self.recorder.record(ctx, event)?;
        }
        self.render(ctx);

        if let Some(reason) = resolution.rejected {
            self.presenter
                .flash(rejection_text(reason), self.timing.rejection_flash());
            return Ok(Step::Continue);
        }

        for notice in &resolution.notices {
            self.presenter
                .show_message(
                    notice.text(),
                    &notice.subtext(),
                    self.timing.notice(notice.kind()),
                )
                .await;
            if !guard.is_current(ctx) {
                return Ok(Step::Abandon);
            }
        }

        if let Some(cause) = resolution.end_turn {
            return Ok(Step::End(cause));
        }
        if exhausted {
            return Ok(Step::End(TurnEndCause::MaxMoves));
        }
        Ok(Step::Continue)
    }

    /// Close the turn and log every boundary it crossed.
    fn finish_turn(
        &mut self,
        ctx: &mut SessionContext,
        cause: TurnEndCause,
    ) -> Result<(), SessionError> {
        self.input.close();
        self.recorder.record(
            ctx,
            GameEvent::TurnEnded {
                cause,
                moves_used: ctx.moves_used(),
            },
        )?;
        let boundary = ctx.end_turn(cause)?;
        if let Some(round) = boundary.round_ended {
            self.recorder.record(ctx, GameEvent::RoundEnded { round })?;
        }
        if let Some(repetition) = boundary.repetition_ended {
            self.recorder
                .record(ctx, GameEvent::RepetitionEnded { repetition })?;
        }
        if let Some((repetition, partner, human_role)) = boundary.next_partner {
            self.recorder.record(
                ctx,
                GameEvent::RepetitionStarted {
                    repetition,
                    partner,
                    human_role,
                },
            )?;
            self.announce_partner(repetition, partner, human_role);
        }
        self.render(ctx);
        Ok(())
    }

    fn announce_partner(&self, repetition: u32, partner: PolicyId, human_role: Role) {
        self.presenter.flash(
            &format!(
                "Round block {repetition}: your partner is {} ({}), you play {}",
                partner.display_name(),
                partner.role().label(),
                human_role.label(),
            ),
            self.timing.repetition_banner(),
        );
    }

    fn render(&self, ctx: &SessionContext) {
        self.presenter.render_now(&ctx.board, &ctx.snapshot());
    }
}

/// Translate a key press for the acting role.
fn intent_action(intent: InputIntent, role: Role) -> Option<Action> {
    let action = intent.to_action(role);
    if action.is_none() {
        debug!(?intent, role = role.label(), "Key has no meaning for role");
    }
    action
}

/// Short banner text for a rejected ability.
const fn rejection_text(reason: RejectionReason) -> &'static str {
    match reason {
        RejectionReason::NoResourceHere => "Nothing to forage here",
        RejectionReason::NoRevealedHazardToPush => "No known nest here to push",
        RejectionReason::ForagerNotDownOrNotColocated => {
            "The forager must be down and on your tile"
        }
        RejectionReason::WrongRole => "Your role cannot do that",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use outpost_agents::FixedDraws;
    use outpost_types::{Direction, PartnerPair, SessionId};
    use outpost_world::{MapRow, WorldBaseline, starting_map};

    use super::*;
    use crate::input::input_channel;
    use crate::ports::{InstantTimer, MemorySink, ScriptedPresenter, TokioTimer};

    const SPAWN: (Position, Position) = (Position::new(0, 0), Position::new(1, 0));

    fn events(sink: &MemorySink) -> Vec<GameEvent> {
        sink.records().into_iter().map(|r| r.event).collect()
    }

    fn end_causes(sink: &MemorySink) -> Vec<TurnEndCause> {
        events(sink)
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::TurnEnded { cause, .. } => Some(cause),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn observe_session_plays_every_turn() {
        let world = WorldBaseline::from_rows(&starting_map()).unwrap().fresh();
        let (mut ctx, revealed) =
            SessionContext::observe(1, PartnerPair::MinerDefender, world, SPAWN, 2, 5, 1)
                .unwrap();
        let presenter = ScriptedPresenter::new();
        let sink = MemorySink::new();
        let mut recorder = Recorder::new(sink.clone(), SessionId::new(), "p".to_owned());
        let (_input, mut receiver) = input_channel();
        let mut draws = FixedDraws::constant(0.99);
        let timing = TimingConfig::default();

        let summary = TurnFlow::new(
            &presenter,
            &TokioTimer,
            &mut recorder,
            &mut receiver,
            &mut draws,
            &timing,
        )
        .run_session(&mut ctx, &revealed)
        .await
        .unwrap();

        assert_eq!(summary.turns, 4);
        assert_eq!(end_causes(&sink).len(), 4);
        let all = events(&sink);
        assert!(matches!(all.first(), Some(GameEvent::SessionStarted { .. })));
        assert!(matches!(all.last(), Some(GameEvent::SessionEnded { turns: 4, .. })));
        let rounds = all
            .iter()
            .filter(|e| matches!(e, GameEvent::RoundEnded { .. }))
            .count();
        assert_eq!(rounds, 2);
        assert!(presenter.messages().iter().any(|m| m == "Digger's turn"));
    }

    #[tokio::test(start_paused = true)]
    async fn stunned_forager_skips_and_ticks() {
        let world = WorldBaseline::from_rows(&starting_map()).unwrap().fresh();
        let (mut ctx, _) =
            SessionContext::observe(1, PartnerPair::MinerDefender, world, SPAWN, 1, 5, 1)
                .unwrap();
        ctx.board.crew.apply_stun(3);
        let presenter = ScriptedPresenter::new();
        let sink = MemorySink::new();
        let mut recorder = Recorder::new(sink.clone(), SessionId::new(), "p".to_owned());
        let (_input, mut receiver) = input_channel();
        let mut draws = FixedDraws::constant(0.99);
        let timing = TimingConfig::default();

        TurnFlow::new(
            &presenter,
            &TokioTimer,
            &mut recorder,
            &mut receiver,
            &mut draws,
            &timing,
        )
        .run_session(&mut ctx, &[])
        .await
        .unwrap();

        let first_end = events(&sink)
            .into_iter()
            .find(|e| matches!(e, GameEvent::TurnEnded { .. }));
        assert_eq!(
            first_end,
            Some(GameEvent::TurnEnded {
                cause: TurnEndCause::StunnedSkipTurn,
                moves_used: 0,
            })
        );
        assert!(
            events(&sink)
                .iter()
                .any(|e| *e == GameEvent::StunTick { remaining: 2 })
        );
        assert_eq!(ctx.board.crew.stun_turns(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timeout_ends_the_human_turn() {
        let order = PolicyId::ALL.to_vec();
        let world = WorldBaseline::from_rows(&starting_map()).unwrap().fresh();
        // Miner first: the participant plays security, the forager moves first.
        let (mut ctx, _) = SessionContext::main(world, SPAWN, order, 1, 1, 5, 1).unwrap();
        let presenter = ScriptedPresenter::new();
        let sink = MemorySink::new();
        let mut recorder = Recorder::new(sink.clone(), SessionId::new(), "p".to_owned());
        let (_input, mut receiver) = input_channel();
        let mut draws = FixedDraws::constant(0.99);
        let timing = TimingConfig::default();

        let started = tokio::time::Instant::now();
        TurnFlow::new(
            &presenter,
            &TokioTimer,
            &mut recorder,
            &mut receiver,
            &mut draws,
            &timing,
        )
        .run_session(&mut ctx, &[])
        .await
        .unwrap();

        assert_eq!(end_causes(&sink).last(), Some(&TurnEndCause::IdleTimeout));
        assert_eq!(ctx.turn_index(), 2);
        assert!(started.elapsed() >= timing.idle_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn human_moves_until_budget_spent() {
        let baseline = WorldBaseline::from_rows(&[MapRow::with_hazard(4, 4, 1)]).unwrap();
        // Defender first: the participant plays the forager and moves first.
        let order = vec![PolicyId::Defender];
        let (mut ctx, _) =
            SessionContext::main(baseline.fresh(), SPAWN, order, 1, 1, 2, 1).unwrap();
        let presenter = ScriptedPresenter::new();
        let sink = MemorySink::new();
        let mut recorder = Recorder::new(sink.clone(), SessionId::new(), "p".to_owned());
        let (input, mut receiver) = input_channel();
        let mut draws = FixedDraws::constant(0.99);
        let timing = TimingConfig::default();

        let driver = async {
            TurnFlow::new(
                &presenter,
                &TokioTimer,
                &mut recorder,
                &mut receiver,
                &mut draws,
                &timing,
            )
            .run_session(&mut ctx, &[])
            .await
            .unwrap()
        };
        let keys = async {
            while !input.is_open() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            // Scan means nothing to the forager and is skipped.
            assert!(input.submit(InputIntent::Scan));
            assert!(input.submit(InputIntent::Move(Direction::Down)));
            assert!(input.submit(InputIntent::Move(Direction::Down)));
        };
        let (summary, ()) = tokio::join!(driver, keys);

        let causes = end_causes(&sink);
        assert_eq!(causes.first(), Some(&TurnEndCause::MaxMoves));
        assert!(summary.revealed.contains(&Position::new(0, 2)));
        let human_moves = events(&sink)
            .iter()
            .filter(|e| matches!(e, GameEvent::Moved { human: true, .. }))
            .count();
        assert_eq!(human_moves, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_queued_before_a_notice_are_dropped() {
        let baseline = WorldBaseline::from_rows(&[
            MapRow::with_resource(0, 1, "A"),
            MapRow::with_hazard(4, 4, 1),
        ])
        .unwrap();
        let order = vec![PolicyId::Defender];
        let (mut ctx, _) =
            SessionContext::main(baseline.fresh(), SPAWN, order, 1, 1, 5, 1).unwrap();
        let presenter = ScriptedPresenter::new();
        let sink = MemorySink::new();
        let mut recorder = Recorder::new(sink.clone(), SessionId::new(), "p".to_owned());
        let (input, mut receiver) = input_channel();
        let mut draws = FixedDraws::constant(0.99);
        let timing = TimingConfig::default();

        let driver = async {
            TurnFlow::new(
                &presenter,
                &TokioTimer,
                &mut recorder,
                &mut receiver,
                &mut draws,
                &timing,
            )
            .run_session(&mut ctx, &[])
            .await
            .unwrap()
        };
        let keys = async {
            while !input.is_open() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            // One burst: the first step uncovers the resource.
            assert!(input.submit(InputIntent::Move(Direction::Down)));
            assert!(input.submit(InputIntent::Move(Direction::Down)));
        };
        let (_, ()) = tokio::join!(driver, keys);

        let human_moves: Vec<Position> = events(&sink)
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Moved { to, human: true, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(human_moves, vec![Position::new(0, 1)]);
        assert!(
            events(&sink)
                .iter()
                .any(|e| *e == GameEvent::HumanInputIgnored { count: 1 })
        );
        assert_eq!(end_causes(&sink).first(), Some(&TurnEndCause::IdleTimeout));
    }

    #[tokio::test]
    async fn instant_timer_runs_headless() {
        let world = WorldBaseline::from_rows(&starting_map()).unwrap().fresh();
        let (mut ctx, revealed) =
            SessionContext::main(world, SPAWN, PolicyId::ALL.to_vec(), 6, 2, 5, 1).unwrap();
        let presenter = ScriptedPresenter::new();
        let sink = MemorySink::new();
        let mut recorder = Recorder::new(sink.clone(), SessionId::new(), "p".to_owned());
        let (_input, mut receiver) = input_channel();
        let mut draws = FixedDraws::constant(0.99);
        let timing = TimingConfig::instant();

        let summary = TurnFlow::new(
            &presenter,
            &InstantTimer,
            &mut recorder,
            &mut receiver,
            &mut draws,
            &timing,
        )
        .run_session(&mut ctx, &revealed)
        .await
        .unwrap();

        assert_eq!(summary.turns, 24);
        let started = events(&sink)
            .iter()
            .filter(|e| matches!(e, GameEvent::RepetitionStarted { .. }))
            .count();
        assert_eq!(started, 6);
        let idle = end_causes(&sink)
            .into_iter()
            .filter(|c| *c == TurnEndCause::IdleTimeout)
            .count();
        assert_eq!(idle, 12);
    }
}
