//! Participant input gate.
//!
//! The front-end holds a [`HumanInput`] and submits intents whenever a key
//! is pressed. The core holds the matching [`InputReceiver`] and opens the
//! gate only while it is waiting for a human action. Intents submitted
//! while the gate is closed are dropped and counted, so the event log can
//! report them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use outpost_types::InputIntent;
use tokio::sync::mpsc;
use tracing::trace;

/// Create a connected input handle and receiver. The gate starts closed.
pub fn input_channel() -> (HumanInput, InputReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let gate = Arc::new(AtomicBool::new(false));
    let ignored = Arc::new(AtomicU64::new(0));
    (
        HumanInput {
            gate: Arc::clone(&gate),
            ignored: Arc::clone(&ignored),
            tx,
        },
        InputReceiver { gate, ignored, rx },
    )
}

/// Front-end side of the input gate. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HumanInput {
    gate: Arc<AtomicBool>,
    ignored: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<InputIntent>,
}

impl HumanInput {
    /// Offer an intent to the core.
    ///
    /// Returns `true` if the intent was accepted. Intents are dropped while
    /// no human action is awaited, during overlays, and after the run ended.
    pub fn submit(&self, intent: InputIntent) -> bool {
        if !self.gate.load(Ordering::Acquire) {
            self.ignored.fetch_add(1, Ordering::Relaxed);
            trace!(?intent, "Input ignored, gate closed");
            return false;
        }
        self.tx.send(intent).is_ok()
    }

    /// Whether the core is currently waiting for a human action.
    pub fn is_open(&self) -> bool {
        self.gate.load(Ordering::Acquire)
    }
}

/// Core side of the input gate.
#[derive(Debug)]
pub struct InputReceiver {
    gate: Arc<AtomicBool>,
    ignored: Arc<AtomicU64>,
    rx: mpsc::UnboundedReceiver<InputIntent>,
}

impl InputReceiver {
    /// Open the gate.
    ///
    /// Returns the number of intents dropped since the gate last opened.
    pub fn open(&self) -> u64 {
        self.gate.store(true, Ordering::Release);
        self.ignored.swap(0, Ordering::Relaxed)
    }

    /// Drop intents accepted during an earlier wait that were never
    /// consumed. Returns how many were dropped.
    pub fn discard_pending(&mut self) -> u64 {
        let mut stale: u64 = 0;
        while self.rx.try_recv().is_ok() {
            stale = stale.saturating_add(1);
        }
        stale
    }

    /// Close the gate.
    pub fn close(&self) {
        self.gate.store(false, Ordering::Release);
    }

    /// Wait for the next accepted intent. Resolves to `None` once every
    /// [`HumanInput`] handle has been dropped.
    pub async fn recv(&mut self) -> Option<InputIntent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::Direction;

    use super::*;

    #[tokio::test]
    async fn closed_gate_drops_and_counts() {
        let (input, mut receiver) = input_channel();
        assert!(!input.is_open());
        assert!(!input.submit(InputIntent::Scan));
        assert!(!input.submit(InputIntent::Push));

        assert_eq!(receiver.open(), 2);
        assert!(input.submit(InputIntent::Move(Direction::Left)));
        assert_eq!(
            receiver.recv().await,
            Some(InputIntent::Move(Direction::Left))
        );

        receiver.close();
        assert!(!input.submit(InputIntent::Primary));
        assert_eq!(receiver.open(), 1);
    }

    #[tokio::test]
    async fn leftover_intents_are_discarded() {
        let (input, mut receiver) = input_channel();
        receiver.open();
        assert!(input.submit(InputIntent::Primary));
        assert!(input.submit(InputIntent::Scan));
        receiver.close();
        assert_eq!(receiver.discard_pending(), 2);
        assert_eq!(receiver.open(), 0);
        drop(input);
        assert_eq!(receiver.recv().await, None);
    }
}
