//! Frame output.
//!
//! The view is drawn inline below the shell prompt rather than on an alternate
//! screen: each draw moves the cursor back over the previous frame, clears to
//! the end of the screen and prints the new rows. `finish` leaves the last
//! frame in place so it stays in the scrollback.
//!
//! A frame taller than the terminal keeps its header row and the newest rows
//! that fit; the cursor cannot move back above the top of the screen.

use std::io::{self, Write};

use crossterm::cursor::{MoveToColumn, MoveToPreviousLine};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use tailbox_core::view::ViewFrame;
use unicode_width::UnicodeWidthChar;

use crate::error::TermError;

const FALLBACK_WIDTH: u16 = 80;
const RESET: &str = "\x1b[0m";

pub trait Renderer {
    fn draw(&mut self, frame: &ViewFrame) -> Result<(), TermError>;

    /// Draws the final frame and releases it to the scrollback.
    fn finish(&mut self, frame: &ViewFrame) -> Result<(), TermError>;
}

/// Blank cells around the frame, in rows (top, bottom) and columns (left, right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margin {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Margin {
    /// Margin around the log view.
    pub const VIEW: Self = Self::new(0, 2, 1, 1);

    pub const fn new(top: u16, right: u16, bottom: u16, left: u16) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

pub struct InlineRenderer<W: Write> {
    out: W,
    margin: Margin,
    width: Option<u16>,
    height: Option<u16>,
    drawn: u16,
}

impl<W: Write> InlineRenderer<W> {
    /// Renderer sized from the live terminal on every draw.
    pub fn new(out: W) -> Self {
        Self {
            out,
            margin: Margin::VIEW,
            width: None,
            height: None,
            drawn: 0,
        }
    }

    /// Renderer with a fixed total width.
    pub fn with_width(out: W, width: u16) -> Self {
        Self {
            width: Some(width),
            ..Self::new(out)
        }
    }

    /// Renderer with a fixed total width and height.
    pub fn with_size(out: W, width: u16, height: u16) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::new(out)
        }
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn content_width(&self) -> usize {
        let total = self
            .width
            .or_else(|| terminal::size().ok().map(|(width, _)| width))
            .unwrap_or(FALLBACK_WIDTH);
        usize::from(total)
            .saturating_sub(usize::from(self.margin.left) + usize::from(self.margin.right))
    }

    /// Frame rows that fit on screen, or `None` when the height is unknown.
    fn row_budget(&self) -> Option<usize> {
        let total = self
            .height
            .or_else(|| terminal::size().ok().map(|(_, height)| height))?;
        // the cursor ends one row below the frame
        let margins = usize::from(self.margin.top) + usize::from(self.margin.bottom) + 1;
        Some(usize::from(total).saturating_sub(margins))
    }

    fn paint(&mut self, frame: &ViewFrame) -> io::Result<()> {
        if self.drawn > 0 {
            queue!(self.out, MoveToPreviousLine(self.drawn))?;
        } else {
            queue!(self.out, MoveToColumn(0))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;

        let width = self.content_width();
        let pad = " ".repeat(usize::from(self.margin.left));
        let mut rows: u16 = 0;

        for _ in 0..self.margin.top {
            queue!(self.out, Print("\r\n"))?;
            rows = rows.saturating_add(1);
        }
        for row in fit_rows(frame.rows(), self.row_budget()) {
            queue!(
                self.out,
                Print(&pad),
                Print(clip_to_width(row, width)),
                Print("\r\n")
            )?;
            rows = rows.saturating_add(1);
        }
        for _ in 0..self.margin.bottom {
            queue!(self.out, Print("\r\n"))?;
            rows = rows.saturating_add(1);
        }

        self.drawn = rows;
        self.out.flush()
    }
}

impl<W: Write> Renderer for InlineRenderer<W> {
    fn draw(&mut self, frame: &ViewFrame) -> Result<(), TermError> {
        self.paint(frame)?;
        Ok(())
    }

    fn finish(&mut self, frame: &ViewFrame) -> Result<(), TermError> {
        self.paint(frame)?;
        self.drawn = 0;
        Ok(())
    }
}

/// Renderer that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    frames: Vec<ViewFrame>,
    finished: Option<ViewFrame>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[ViewFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&ViewFrame> {
        self.finished.as_ref().or_else(|| self.frames.last())
    }

    pub fn finished(&self) -> Option<&ViewFrame> {
        self.finished.as_ref()
    }
}

impl Renderer for MemoryRenderer {
    fn draw(&mut self, frame: &ViewFrame) -> Result<(), TermError> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self, frame: &ViewFrame) -> Result<(), TermError> {
        self.finished = Some(frame.clone());
        Ok(())
    }
}

/// Keeps the header row and the newest rows when `rows` exceeds `budget`.
fn fit_rows(rows: &[String], budget: Option<usize>) -> Vec<&str> {
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let Some(budget) = budget else {
        return rows;
    };
    if rows.len() <= budget {
        return rows;
    }
    match budget {
        0 => Vec::new(),
        1 => rows[..1].to_vec(),
        _ => {
            let mut kept = Vec::with_capacity(budget);
            kept.push(rows[0]);
            kept.extend_from_slice(&rows[rows.len() - (budget - 1)..]);
            kept
        }
    }
}

/// Cuts `text` to at most `width` display columns.
///
/// Escape sequences pass through and take no columns. A cut styled row gets a
/// trailing reset so the color cannot bleed into the margin.
pub fn clip_to_width(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut used = 0usize;
    let mut styled = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            styled = true;
            out.push(ch);
            if chars.peek() == Some(&'[') {
                // CSI runs until a final byte in 0x40..=0x7e
                for next in chars.by_ref() {
                    out.push(next);
                    if next != '[' && ('\x40'..='\x7e').contains(&next) {
                        break;
                    }
                }
            } else if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }

        let cells = ch.width().unwrap_or(0);
        if used + cells > width {
            if styled {
                out.push_str(RESET);
            }
            return out;
        }
        used += cells;
        out.push(ch);
    }
    out
}

/// Display columns taken by `text`, ignoring escape sequences.
pub fn visible_width(text: &str) -> usize {
    let mut width = 0usize;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                for next in chars.by_ref() {
                    if next != '[' && ('\x40'..='\x7e').contains(&next) {
                        break;
                    }
                }
            } else {
                chars.next();
            }
            continue;
        }
        width += ch.width().unwrap_or(0);
    }
    width
}
