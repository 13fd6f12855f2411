//! Upstream log sources.
//!
//! A `LogSource` yields timestamped, labelled raw lines. Implementations can be
//! backed by:
//! - any async line reader (stdin, a file read once)
//! - a polled file that keeps growing (follow mode)
//! - in-memory sequences for testing

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::SourceError;

/// Ordered label set attached to a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Width of the rendered label set in characters.
    pub fn display_width(&self) -> usize {
        self.to_string().chars().count()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value:?}")?;
        }
        f.write_str("}")
    }
}

/// One upstream tuple: `(timestamp, labels, max label width, raw line)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub labels: LabelSet,
    /// Widest rendered label set in the batch this entry belongs to.
    pub max_label_width: usize,
    pub line: String,
}

impl LogEntry {
    pub fn new(
        timestamp: Option<DateTime<Utc>>,
        labels: LabelSet,
        line: impl Into<String>,
    ) -> Self {
        let max_label_width = labels.display_width();
        Self {
            timestamp,
            labels,
            max_label_width,
            line: line.into(),
        }
    }

    /// Entry stamped with the current time.
    pub fn now(labels: LabelSet, line: impl Into<String>) -> Self {
        Self::new(Some(Utc::now()), labels, line)
    }
}

/// A stream of upstream log entries.
#[async_trait]
pub trait LogSource: Send {
    /// Wait for and return the next entry.
    ///
    /// Returns `None` when the stream is exhausted. Consumers stop calling
    /// after `None`, after an error, or once they are cancelled.
    async fn next(&mut self) -> Option<Result<LogEntry, SourceError>>;
}

/// In-memory log source for testing.
///
/// Yields pre-configured entries in order, with optional delays before each
/// one to simulate bursty or slow upstream delivery.
pub struct MockLogSource {
    entries: VecDeque<(Duration, Result<LogEntry, SourceError>)>,
}

impl MockLogSource {
    /// Create a source that yields entries immediately.
    pub fn from_entries(entries: Vec<Result<LogEntry, SourceError>>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (Duration::ZERO, e)).collect(),
        }
    }

    /// Create a source yielding plain lines with no timestamp or labels.
    pub fn from_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::from_entries(
            lines
                .into_iter()
                .map(|line| Ok(LogEntry::new(None, LabelSet::new(), line)))
                .collect(),
        )
    }

    /// Create a source with explicit delays before each entry.
    pub fn with_delays(entries: Vec<(Duration, Result<LogEntry, SourceError>)>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn next(&mut self) -> Option<Result<LogEntry, SourceError>> {
        let (delay, entry) = self.entries.pop_front()?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Some(entry)
    }
}

/// Source reading newline-delimited text from any async reader.
///
/// Each line is stamped with its receive time. Invalid UTF-8 is replaced
/// rather than rejected.
pub struct LineReaderSource<R> {
    reader: R,
    labels: LabelSet,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin + Send> LineReaderSource<R> {
    pub fn new(reader: R, source_name: &str) -> Self {
        Self {
            reader,
            labels: LabelSet::from_pairs([("source", source_name)]),
            buf: Vec::new(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LogSource for LineReaderSource<R> {
    async fn next(&mut self) -> Option<Result<LogEntry, SourceError>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.buf).into_owned();
                Some(Ok(LogEntry::now(self.labels.clone(), line)))
            }
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// Polls a file and yields lines as they are appended.
///
/// The first read yields the last `tail` complete lines. Only complete lines
/// are ever yielded; a partial trailing line is carried as raw bytes until its
/// newline arrives, so a multibyte character split across writes decodes
/// whole. A file that shrinks is treated as replaced and read from the
/// start. The stream never ends on its own.
pub struct FollowFileSource {
    path: PathBuf,
    labels: LabelSet,
    tail: usize,
    poll_interval: Duration,
    offset: usize,
    started: bool,
    carry: Vec<u8>,
    pending: VecDeque<LogEntry>,
}

impl FollowFileSource {
    pub fn new(path: impl AsRef<Path>, tail: usize, poll_interval: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        let labels = LabelSet::from_pairs([("filename", path.display().to_string())]);
        Self {
            path,
            labels,
            tail,
            poll_interval,
            offset: 0,
            started: false,
            carry: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    async fn read_all(&self) -> Result<Vec<u8>, SourceError> {
        tokio::fs::read(&self.path).await.map_err(SourceError::from)
    }

    fn queue_initial(&mut self, content: &[u8]) {
        self.offset = content.len();
        let (complete, rest) = split_complete_lines(content);
        self.carry = rest.to_vec();
        let text = String::from_utf8_lossy(complete);
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(self.tail);
        for line in &lines[start..] {
            self.pending
                .push_back(LogEntry::now(self.labels.clone(), *line));
        }
    }

    fn queue_delta(&mut self, content: &[u8]) {
        let delta = if content.len() < self.offset {
            tracing::debug!(path = %self.path.display(), "followed file shrank; rereading");
            self.carry.clear();
            content
        } else {
            &content[self.offset..]
        };
        self.offset = content.len();
        if delta.is_empty() {
            return;
        }

        let mut chunk = std::mem::take(&mut self.carry);
        chunk.extend_from_slice(delta);
        let (complete, rest) = split_complete_lines(&chunk);
        self.carry = rest.to_vec();
        for line in String::from_utf8_lossy(complete).lines() {
            self.pending
                .push_back(LogEntry::now(self.labels.clone(), line));
        }
    }
}

#[async_trait]
impl LogSource for FollowFileSource {
    async fn next(&mut self) -> Option<Result<LogEntry, SourceError>> {
        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(Ok(entry));
            }

            if !self.started {
                self.started = true;
                match self.read_all().await {
                    Ok(content) => self.queue_initial(&content),
                    Err(err) => return Some(Err(err)),
                }
                continue;
            }

            tokio::time::sleep(self.poll_interval).await;
            match self.read_all().await {
                Ok(content) => self.queue_delta(&content),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Splits `chunk` into the part ending with the last newline and the rest.
fn split_complete_lines(chunk: &[u8]) -> (&[u8], &[u8]) {
    match chunk.iter().rposition(|byte| *byte == b'\n') {
        Some(index) => chunk.split_at(index + 1),
        None => (&b""[..], chunk),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::{split_complete_lines, LabelSet, LineReaderSource, LogEntry, LogSource};

    #[test]
    fn label_set_renders_sorted_quoted_pairs() {
        let labels = LabelSet::from_pairs([("pod", "web-1"), ("app", "web")]);
        assert_eq!(labels.to_string(), "{app=\"web\", pod=\"web-1\"}");
        assert_eq!(labels.display_width(), 24);
        assert_eq!(LabelSet::new().to_string(), "");
    }

    #[test]
    fn entry_width_defaults_to_own_labels() {
        let entry = LogEntry::new(None, LabelSet::from_pairs([("a", "b")]), "x");
        assert_eq!(entry.max_label_width, "{a=\"b\"}".len());
    }

    #[test]
    fn split_complete_lines_carries_partial_tail() {
        assert_eq!(
            split_complete_lines(b"a\nb\npar"),
            (&b"a\nb\n"[..], &b"par"[..])
        );
        assert_eq!(split_complete_lines(b"a\n"), (&b"a\n"[..], &b""[..]));
        assert_eq!(split_complete_lines(b"caf\xc3"), (&b""[..], &b"caf\xc3"[..]));
    }

    #[tokio::test]
    async fn line_reader_yields_lines_then_ends() {
        let input: &[u8] = b"first\nsecond\n\xffbad\nlast";
        let mut source = LineReaderSource::new(input, "stdin");

        let mut lines = Vec::new();
        while let Some(entry) = source.next().await {
            let entry = entry.unwrap();
            assert_eq!(entry.labels.get("source"), Some("stdin"));
            assert!(entry.timestamp.is_some());
            lines.push(entry.line.trim_end().to_owned());
        }
        assert_eq!(lines, vec!["first", "second", "\u{fffd}bad", "last"]);
    }
}
