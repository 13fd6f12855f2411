//! Renderable log lines exchanged between producers and the view.

use std::fmt;

/// One unit of renderable text plus the "stream complete" flag.
///
/// `terminal == true` is a sentinel: the producer has nothing more to send and
/// the view must stop accepting content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    text: String,
    terminal: bool,
}

impl DisplayLine {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            terminal: false,
        }
    }

    pub fn terminal() -> Self {
        Self {
            text: String::new(),
            terminal: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::DisplayLine;

    #[test]
    fn content_line_is_not_terminal() {
        let line = DisplayLine::content("hello");
        assert_eq!(line.text(), "hello");
        assert!(!line.is_terminal());
        assert_eq!(line.to_string(), "hello");
    }

    #[test]
    fn terminal_line_has_no_text() {
        let line = DisplayLine::terminal();
        assert!(line.is_terminal());
        assert!(line.text().is_empty());
    }
}
