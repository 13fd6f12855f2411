//! Paced delivery of formatted log lines into the view queue.
//!
//! Upstream sources often deliver lines in bursts (a forwarder flushing once a
//! second hands over a dozen lines at once). `PacedFeed` formats each line as
//! it arrives, queues it on one FIFO and lets a single worker release lines to
//! the view with a fixed pause before each. A burst therefore scrolls in line
//! by line, and since there is exactly one queue and one worker the view sees
//! lines in acceptance order.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::format::{format_line, LineFormat};
use crate::interrupt::InterruptSignal;
use crate::line::DisplayLine;
use crate::source::{LabelSet, LogEntry, LogSource};
use crate::view::Event;

/// Default pause before each delivered line.
pub const DEFAULT_PACE: Duration = Duration::from_millis(10);

/// Sending half of the view's event queue.
pub type EventSender = mpsc::UnboundedSender<Event>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReport {
    /// Content lines handed to the view (the terminal line is not counted).
    pub delivered: usize,
}

pub struct PacedFeed {
    queue: mpsc::UnboundedSender<DisplayLine>,
    format: LineFormat,
    rush: CancellationToken,
    worker: JoinHandle<usize>,
}

impl PacedFeed {
    /// Starts the delivery worker on the current tokio runtime.
    ///
    /// A zero `pace` forwards lines as soon as they are queued.
    pub fn spawn(sink: EventSender, pace: Duration, format: LineFormat) -> Self {
        let (queue, pending) = mpsc::unbounded_channel();
        let rush = CancellationToken::new();
        let worker = tokio::spawn(deliver(pending, sink, pace, rush.clone()));
        Self {
            queue,
            format,
            rush,
            worker,
        }
    }

    /// Formats one upstream line and queues it for paced delivery.
    ///
    /// Returns `false` if the feed has already been closed.
    pub fn on_line(
        &self,
        timestamp: Option<DateTime<Utc>>,
        labels: &LabelSet,
        max_label_width: usize,
        raw: &str,
    ) -> bool {
        let entry = LogEntry {
            timestamp,
            labels: labels.clone(),
            max_label_width,
            line: raw.to_owned(),
        };
        self.on_entry(&entry)
    }

    pub fn on_entry(&self, entry: &LogEntry) -> bool {
        self.queue.send(format_line(entry, self.format)).is_ok()
    }

    /// Drops the pause for everything still queued.
    pub fn hurry(&self) {
        self.rush.cancel();
    }

    /// Byte sink whose lines take the same paced path as `on_line`.
    pub fn writer(&self) -> FeedWriter {
        FeedWriter {
            queue: self.queue.clone(),
            format: self.format,
            pending: Vec::new(),
        }
    }

    /// Queues the terminal line and waits until the worker has drained.
    pub async fn close(self) -> FeedReport {
        let _ = self.queue.send(DisplayLine::terminal());
        drop(self.queue);
        let delivered = match self.worker.await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(error = %err, "feed worker stopped abnormally");
                0
            }
        };
        FeedReport { delivered }
    }
}

async fn deliver(
    mut pending: mpsc::UnboundedReceiver<DisplayLine>,
    sink: EventSender,
    pace: Duration,
    rush: CancellationToken,
) -> usize {
    let mut delivered = 0usize;
    while let Some(line) = pending.recv().await {
        let terminal = line.is_terminal();
        if !terminal && !pace.is_zero() && !rush.is_cancelled() {
            tokio::select! {
                _ = tokio::time::sleep(pace) => {}
                _ = rush.cancelled() => {}
            }
        }
        if sink.send(Event::Content(line)).is_err() {
            tracing::debug!(delivered, "log view closed; dropping remaining lines");
            break;
        }
        if terminal {
            break;
        }
        delivered += 1;
        tracing::trace!(delivered, "line delivered");
    }
    delivered
}

/// `io::Write` adapter routing written lines through a `PacedFeed`.
///
/// Each complete line is stamped with the time it was written. A trailing
/// partial line is held until its newline arrives, `flush` is called or the
/// writer is dropped.
pub struct FeedWriter {
    queue: mpsc::UnboundedSender<DisplayLine>,
    format: LineFormat,
    pending: Vec<u8>,
}

impl FeedWriter {
    fn emit_pending(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let rest = std::mem::take(&mut self.pending);
        self.emit(&rest)
    }

    fn emit(&self, raw: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(raw);
        let entry = LogEntry::now(LabelSet::new(), text.as_ref());
        self.queue
            .send(format_line(&entry, self.format))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "log feed closed"))
    }
}

impl Write for FeedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_pending()
    }
}

impl Drop for FeedWriter {
    fn drop(&mut self) {
        let _ = self.emit_pending();
    }
}

/// How a pumped stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEnd {
    /// The source ran out of entries.
    Exhausted,
    /// The interrupt signal fired first.
    Interrupted,
    /// The view stopped taking lines.
    ViewClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpReport {
    pub accepted: usize,
    pub delivered: usize,
    pub end: FeedEnd,
}

/// Moves entries from `source` into `feed` until the source ends, fails,
/// `interrupt` fires or the view goes away.
///
/// The feed is always closed, so the view always receives its terminal line.
/// On interruption the remaining backlog is flushed without pacing. A source
/// error is returned after the feed has drained.
pub async fn pump(
    source: &mut dyn LogSource,
    feed: PacedFeed,
    interrupt: &InterruptSignal,
) -> Result<PumpReport, SourceError> {
    let cancel = interrupt.token();
    let mut accepted = 0usize;

    let outcome = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(FeedEnd::Interrupted),
            next = source.next() => match next {
                Some(Ok(entry)) => {
                    if !feed.on_entry(&entry) {
                        tracing::debug!(accepted, "log view closed; stopping source");
                        break Ok(FeedEnd::ViewClosed);
                    }
                    accepted += 1;
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, accepted, "log source failed");
                    break Err(err);
                }
                None => break Ok(FeedEnd::Exhausted),
            },
        }
    };

    if matches!(outcome, Ok(FeedEnd::Interrupted)) {
        tracing::debug!(accepted, "log source cancelled");
        feed.hurry();
    }
    let report = feed.close().await;
    outcome.map(|end| PumpReport {
        accepted,
        delivered: report.delivered,
        end,
    })
}
