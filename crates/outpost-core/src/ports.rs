//! Collaborators the core calls against.
//!
//! The turn flow never touches a terminal, a clock, or a file directly.
//! It renders and notifies through a [`Presenter`], waits through a
//! [`Timer`], appends records to an [`EventSink`], and reports completion
//! to a [`SessionObserver`]. The binary supplies real implementations;
//! tests use [`ScriptedPresenter`], [`MemorySink`], and [`InstantTimer`].

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use outpost_agents::Board;
use outpost_types::{CompletionReason, LogRecord, Role, Snapshot};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Rendering and notification collaborator.
///
/// `show_message` and `show_choice_modal` are the only suspension points
/// the presenter owns. Everything else must return immediately.
pub trait Presenter {
    /// Redraw the board from current state. Idempotent.
    fn render_now(&self, board: &Board, snapshot: &Snapshot);

    /// Show a blocking notification and resolve once `duration` elapsed.
    fn show_message(
        &self,
        text: &str,
        subtext: &str,
        duration: Duration,
    ) -> impl Future<Output = ()>;

    /// Show a non-blocking banner that disappears on its own.
    fn flash(&self, text: &str, duration: Duration);

    /// Ask the participant to pick one of `options`. Resolves with the
    /// selected index.
    fn show_choice_modal(
        &self,
        title: &str,
        body: &str,
        options: &[String],
    ) -> impl Future<Output = usize>;

    /// Enter the visible fatal error state.
    fn show_error(&self, message: &str);
}

/// One call observed by a [`ScriptedPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    /// `render_now` with the snapshot's turn index.
    Render {
        /// Turn index at render time.
        turn_index: u64,
    },
    /// A blocking notification.
    Message {
        /// Headline.
        text: String,
        /// Detail line.
        subtext: String,
        /// Requested duration.
        duration: Duration,
    },
    /// A non-blocking banner.
    Flash {
        /// Banner text.
        text: String,
    },
    /// A choice modal.
    Choice {
        /// Modal title.
        title: String,
        /// Offered options.
        options: Vec<String>,
    },
    /// The fatal error state.
    Error {
        /// Error text.
        message: String,
    },
}

/// A presenter that records every call and answers choice modals from a
/// queue of scripted selections.
///
/// Blocking notifications sleep on the tokio clock for their duration, so
/// tests running with paused time observe the same ordering as real runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPresenter {
    calls: Arc<Mutex<Vec<PresenterCall>>>,
    choices: Arc<Mutex<VecDeque<usize>>>,
}

impl ScriptedPresenter {
    /// Create a presenter that selects option 0 for every modal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a presenter that answers modals with `choices` in order,
    /// then falls back to option 0.
    pub fn with_choices(choices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            calls: Arc::default(),
            choices: Arc::new(Mutex::new(choices.into_iter().collect())),
        }
    }

    /// Every call observed so far.
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Headlines of every blocking notification, in order.
    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: PresenterCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Presenter for ScriptedPresenter {
    fn render_now(&self, _board: &Board, snapshot: &Snapshot) {
        self.push(PresenterCall::Render {
            turn_index: snapshot.turn_index,
        });
    }

    async fn show_message(&self, text: &str, subtext: &str, duration: Duration) {
        self.push(PresenterCall::Message {
            text: text.to_owned(),
            subtext: subtext.to_owned(),
            duration,
        });
        tokio::time::sleep(duration).await;
    }

    fn flash(&self, text: &str, _duration: Duration) {
        self.push(PresenterCall::Flash {
            text: text.to_owned(),
        });
    }

    async fn show_choice_modal(&self, title: &str, _body: &str, options: &[String]) -> usize {
        self.push(PresenterCall::Choice {
            title: title.to_owned(),
            options: options.to_vec(),
        });
        self.choices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(0)
    }

    fn show_error(&self, message: &str) {
        self.push(PresenterCall::Error {
            message: message.to_owned(),
        });
    }
}

// ---------------------------------------------------------------------------
// Event sink
// ---------------------------------------------------------------------------

/// Append-only destination for the study's event log.
///
/// `log` must never block and never reject a record.
pub trait EventSink {
    /// Append one record.
    fn log(&self, record: LogRecord);
}

/// In-memory sink. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every record appended so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn log(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Echoes every record to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, record: LogRecord) {
        debug!(
            seq = record.seq,
            trial_index = record.trial_index,
            event = record.event.name(),
            role = record.active_role.map(Role::label),
            "event"
        );
    }
}

impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn log(&self, record: LogRecord) {
        self.0.log(record.clone());
        self.1.log(record);
    }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Scheduling port for the thinking delay and the idle timer.
pub trait Timer {
    /// Resolve once `duration` has elapsed.
    fn after(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Timer backed by the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn after(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

/// Timer whose every delay resolves immediately.
///
/// Human turns time out at once, so a run with this timer and no input
/// is fully scripted.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTimer;

impl Timer for InstantTimer {
    fn after(&self, _duration: Duration) -> impl Future<Output = ()> {
        std::future::ready(())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle callback invoked once when the run finishes.
pub trait SessionObserver {
    /// The main phase ended, or the run was aborted.
    fn on_complete(&self, reason: CompletionReason);
}

/// Observer that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl SessionObserver for NoOpObserver {
    fn on_complete(&self, reason: CompletionReason) {
        info!(?reason, "Run complete");
    }
}
