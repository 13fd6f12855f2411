//! Fixed-capacity, oldest-evicting line buffer.

use std::collections::VecDeque;

use crate::line::DisplayLine;

/// Ordered buffer holding at most `height` lines, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollBuffer {
    height: usize,
    lines: VecDeque<DisplayLine>,
}

impl ScrollBuffer {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            lines: VecDeque::with_capacity(height),
        }
    }

    /// Appends `line`, evicting the oldest entry when the buffer is full.
    ///
    /// Returns the evicted line, if any. A zero-height buffer keeps nothing and
    /// hands the pushed line straight back.
    pub fn push(&mut self, line: DisplayLine) -> Option<DisplayLine> {
        if self.height == 0 {
            return Some(line);
        }
        let evicted = if self.lines.len() >= self.height {
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(line);
        evicted
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.height
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayLine> {
        self.lines.iter()
    }

    /// Buffered texts in display order.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(DisplayLine::text).collect()
    }
}
