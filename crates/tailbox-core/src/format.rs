//! Formatting of upstream entries into display text.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use crossterm::style::Stylize;

use crate::line::DisplayLine;
use crate::source::LogEntry;

/// Rendering switches for formatted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineFormat {
    /// Emit plain text with no ANSI styling.
    pub no_color: bool,
    /// Put the entry's label set, padded to the batch's widest label set,
    /// between the timestamp and the text.
    pub show_labels: bool,
}

/// Renders `ts` in the local zone as RFC 3339 with second precision.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats one entry: accent timestamp, optional labels, trimmed text.
///
/// Missing pieces render as nothing; the entry is never rejected.
pub fn format_entry(entry: &LogEntry, format: LineFormat) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);

    if let Some(ts) = entry.timestamp {
        let stamp = format_timestamp(ts);
        parts.push(if format.no_color {
            stamp
        } else {
            stamp.blue().to_string()
        });
    }

    if format.show_labels {
        let labels = entry.labels.to_string();
        let width = entry.max_label_width.max(labels.chars().count());
        if width > 0 {
            parts.push(format!("{labels:<width$}"));
        }
    }

    let text = entry.line.trim();
    if !text.is_empty() {
        parts.push(text.to_owned());
    }

    parts.join(" ")
}

pub fn format_line(entry: &LogEntry, format: LineFormat) -> DisplayLine {
    DisplayLine::content(format_entry(entry, format))
}
