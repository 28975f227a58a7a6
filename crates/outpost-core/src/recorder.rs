//! Builds [`LogRecord`]s and hands them to the event sink.

use chrono::Utc;
use outpost_types::{GameEvent, LogRecord, SessionId, SessionLabel};

use crate::error::SessionError;
use crate::ports::EventSink;
use crate::scheduler::SessionContext;

/// Stamps events with sequence numbers, run identity, trial index and
/// the current snapshot.
#[derive(Debug)]
pub struct Recorder<S> {
    sink: S,
    run_id: SessionId,
    participant_id: String,
    seq: u64,
    /// Turns played by sessions that already ended.
    trial_base: u64,
}

impl<S: EventSink> Recorder<S> {
    /// Create a recorder for one run.
    pub const fn new(sink: S, run_id: SessionId, participant_id: String) -> Self {
        Self {
            sink,
            run_id,
            participant_id,
            seq: 0,
            trial_base: 0,
        }
    }

    /// Identity of this run.
    pub const fn run_id(&self) -> SessionId {
        self.run_id
    }

    /// Number of records emitted so far.
    pub const fn emitted(&self) -> u64 {
        self.seq
    }

    /// Log an event inside a running session, with its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] if a counter overflows.
    pub fn record(&mut self, ctx: &SessionContext, event: GameEvent) -> Result<(), SessionError> {
        let role = ctx.active_role();
        let trial_index = self
            .trial_base
            .checked_add(ctx.turn_index())
            .ok_or(SessionError::CounterOverflow {
                counter: "trial_index",
            })?;
        let record = LogRecord {
            seq: self.seq,
            at: Utc::now(),
            run_id: self.run_id,
            participant_id: self.participant_id.clone(),
            session: ctx.label(),
            trial_index,
            active_role: Some(role),
            controller: Some(ctx.controller(role)),
            event,
            snapshot: Some(ctx.snapshot()),
        };
        self.emit(record)
    }

    /// Log an event that belongs to no running session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CounterOverflow`] if the sequence overflows.
    pub fn record_detached(
        &mut self,
        session: SessionLabel,
        event: GameEvent,
    ) -> Result<(), SessionError> {
        let record = LogRecord {
            seq: self.seq,
            at: Utc::now(),
            run_id: self.run_id,
            participant_id: self.participant_id.clone(),
            session,
            trial_index: self.trial_base,
            active_role: None,
            controller: None,
            event,
            snapshot: None,
        };
        self.emit(record)
    }

    /// Fold a finished session's turn count into the trial index.
    pub const fn close_session(&mut self, turns: u64) {
        self.trial_base = self.trial_base.saturating_add(turns);
    }

    fn emit(&mut self, record: LogRecord) -> Result<(), SessionError> {
        self.seq = self
            .seq
            .checked_add(1)
            .ok_or(SessionError::CounterOverflow { counter: "seq" })?;
        self.sink.log(record);
        Ok(())
    }
}
