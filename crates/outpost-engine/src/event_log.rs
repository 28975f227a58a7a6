//! JSON-lines event log.
//!
//! [`JsonlSink::log`] never blocks: records go over an unbounded channel
//! to a writer task that appends one JSON object per line. Dropping the
//! sink closes the channel; the writer then flushes and exits.

use std::path::Path;

use outpost_core::EventSink;
use outpost_types::LogRecord;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Event sink appending to a JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    tx: mpsc::UnboundedSender<LogRecord>,
}

impl JsonlSink {
    /// Open `path` for appending and start the writer task.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub async fn create(path: &Path) -> Result<(Self, JoinHandle<u64>), std::io::Error> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        info!(path = %path.display(), "Event log opened");
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let (written, _) = write_records(BufWriter::new(file), rx).await;
            written
        });
        Ok((Self { tx }, handle))
    }
}

impl EventSink for JsonlSink {
    fn log(&self, record: LogRecord) {
        if self.tx.send(record).is_err() {
            warn!("Event log writer stopped, record dropped");
        }
    }
}

/// Drain `rx` into `out`, one JSON object per line, until every sender is
/// dropped. Returns the number of lines written and the writer.
async fn write_records<W>(mut out: W, mut rx: mpsc::UnboundedReceiver<LogRecord>) -> (u64, W)
where
    W: AsyncWrite + Unpin,
{
    let mut written: u64 = 0;
    while let Some(record) = rx.recv().await {
        let mut line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!(seq = record.seq, error = %e, "Failed to serialize event record");
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = out.write_all(line.as_bytes()).await {
            warn!(seq = record.seq, error = %e, "Failed to write event record");
            continue;
        }
        written = written.saturating_add(1);
    }
    if let Err(e) = out.flush().await {
        warn!(error = %e, "Failed to flush event log");
    }
    info!(records = written, "Event log closed");
    (written, out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::{GameEvent, SessionId, SessionLabel};

    use super::*;

    fn record(seq: u64) -> LogRecord {
        LogRecord {
            seq,
            at: "2026-01-01T00:00:00Z".parse().unwrap(),
            run_id: SessionId::new(),
            participant_id: String::from("p-1"),
            session: SessionLabel::Main,
            trial_index: 3,
            active_role: None,
            controller: None,
            event: GameEvent::HumanInputIgnored { count: 2 },
            snapshot: None,
        }
    }

    #[tokio::test]
    async fn writes_one_json_object_per_line() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = JsonlSink { tx };
        sink.log(record(0));
        sink.log(record(1));
        drop(sink);

        let (written, buf) = write_records(Vec::new(), rx).await;
        assert_eq!(written, 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines.first().unwrap()).unwrap();
        assert_eq!(first["seq"], 0);
        assert_eq!(first["event"]["type"], "human_input_ignored");
        assert_eq!(first["session"]["mode"], "main");
    }

    #[tokio::test]
    async fn log_after_writer_stops_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = JsonlSink { tx };
        sink.log(record(0));
    }
}
