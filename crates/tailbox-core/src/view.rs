//! Live log view state machine.
//!
//! The view starts in `Waiting` with a spinner and a wait message, moves to
//! `Streaming` on the first content line and ends in `Done` on the terminal
//! line. Every input (keys, spinner ticks, content) arrives as an [`Event`]
//! through one ordered queue; `update` is a pure transition apart from the
//! interrupt write and returns the [`Command`] the host should run next.

use std::time::Duration;

use crate::buffer::ScrollBuffer;
use crate::input::KeyEvent;
use crate::interrupt::InterruptSignal;
use crate::line::DisplayLine;
use crate::spinner::{Spinner, SpinnerTick};

/// Mark replacing the spinner once the stream is complete.
pub const DONE_MARK: &str = "✓";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Tick(SpinnerTick),
    Content(DisplayLine),
}

/// Follow-up work requested by `init`/`update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    Quit,
    /// Deliver `Event::Tick(tick)` after `after` has elapsed.
    Tick {
        tick: SpinnerTick,
        after: Duration,
    },
    Batch(Vec<Command>),
}

impl Command {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn is_quit(&self) -> bool {
        match self {
            Self::Quit => true,
            Self::Batch(commands) => commands.iter().any(Command::is_quit),
            Self::None | Self::Tick { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Waiting,
    Streaming,
    Done,
}

/// Text frame produced by `render`; one entry per output row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewFrame {
    rows: Vec<String>,
}

impl ViewFrame {
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn snapshot(&self) -> String {
        self.rows.join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct ViewModel {
    message: String,
    buffer: ScrollBuffer,
    state: ViewState,
    spinner: Spinner,
    interrupt: InterruptSignal,
    interrupted: bool,
}

impl ViewModel {
    /// Creates a view holding at most `height` lines.
    ///
    /// `interrupt` is written when the user presses a quit key.
    pub fn new(height: usize, message: impl Into<String>, interrupt: InterruptSignal) -> Self {
        Self {
            message: message.into(),
            buffer: ScrollBuffer::new(height),
            state: ViewState::Waiting,
            spinner: Spinner::mini_dot(),
            interrupt,
            interrupted: false,
        }
    }

    /// Starts the spinner animation.
    pub fn init(&self) -> Command {
        self.next_tick(self.spinner.tick())
    }

    pub fn update(&mut self, event: Event) -> Command {
        match event {
            Event::Key(key) => self.update_key(key),
            Event::Tick(tick) => self.update_tick(tick),
            Event::Content(line) => self.update_content(line),
        }
    }

    fn update_key(&mut self, key: KeyEvent) -> Command {
        if !key.is_quit() || self.interrupted {
            return Command::None;
        }
        self.interrupted = true;
        self.interrupt.signal();
        tracing::debug!(key = %key, "quit requested");
        Command::Quit
    }

    fn update_tick(&mut self, tick: SpinnerTick) -> Command {
        if self.state == ViewState::Done || self.interrupted {
            return Command::None;
        }
        match self.spinner.advance(tick) {
            Some(next) => self.next_tick(next),
            None => Command::None,
        }
    }

    fn update_content(&mut self, line: DisplayLine) -> Command {
        if self.state == ViewState::Done || self.interrupted {
            return Command::None;
        }
        if line.is_terminal() {
            tracing::debug!(lines = self.buffer.len(), "log stream complete");
            self.state = ViewState::Done;
            return Command::Quit;
        }
        if self.state == ViewState::Waiting {
            tracing::debug!("first log line received");
            self.state = ViewState::Streaming;
        }
        self.buffer.push(line);
        Command::None
    }

    fn next_tick(&self, tick: SpinnerTick) -> Command {
        Command::Tick {
            tick,
            after: self.spinner.interval(),
        }
    }

    pub fn render(&self) -> ViewFrame {
        let mut rows = Vec::with_capacity(self.buffer.len() + 2);
        let mark = if self.state == ViewState::Done {
            DONE_MARK
        } else {
            self.spinner.view()
        };
        rows.push(format!("{mark} {}", self.message));

        if !self.buffer.is_empty() {
            rows.push(String::new());
            rows.extend(self.buffer.iter().map(|line| line.text().to_owned()));
        }
        ViewFrame::new(rows)
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ViewState::Done
    }

    /// True once a quit key has been handled.
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn buffer(&self) -> &ScrollBuffer {
        &self.buffer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::{Command, Event, ViewModel, ViewState};
    use crate::input::{Key, KeyEvent};
    use crate::interrupt::InterruptSignal;
    use crate::line::DisplayLine;

    fn content(text: &str) -> Event {
        Event::Content(DisplayLine::content(text))
    }

    fn tick_of(command: &Command) -> Event {
        match command {
            Command::Tick { tick, .. } => Event::Tick(*tick),
            other => panic!("expected tick command, got {other:?}"),
        }
    }

    #[test]
    fn init_requests_tick_and_starts_waiting() {
        let view = ViewModel::new(3, "waiting", InterruptSignal::new());
        assert!(matches!(view.init(), Command::Tick { .. }));
        assert_eq!(view.state(), ViewState::Waiting);
        assert!(view.buffer().is_empty());
    }

    #[test]
    fn first_content_line_starts_streaming() {
        let mut view = ViewModel::new(3, "waiting", InterruptSignal::new());
        assert_eq!(view.update(content("a")), Command::None);
        assert_eq!(view.state(), ViewState::Streaming);
        assert_eq!(view.buffer().texts(), vec!["a"]);
    }

    #[test]
    fn terminal_line_finishes_and_quits() {
        let mut view = ViewModel::new(3, "waiting", InterruptSignal::new());
        view.update(content("a"));
        let command = view.update(Event::Content(DisplayLine::terminal()));
        assert_eq!(command, Command::Quit);
        assert!(view.is_done());
    }

    #[test]
    fn terminal_line_while_waiting_finishes_with_empty_buffer() {
        let mut view = ViewModel::new(3, "waiting", InterruptSignal::new());
        assert_eq!(
            view.update(Event::Content(DisplayLine::terminal())),
            Command::Quit
        );
        assert_eq!(view.state(), ViewState::Done);
        assert!(view.buffer().is_empty());
    }

    #[test]
    fn ticks_chain_and_stop_after_done() {
        let mut view = ViewModel::new(3, "waiting", InterruptSignal::new());
        let first = view.init();
        let second = view.update(tick_of(&first));
        assert!(matches!(second, Command::Tick { .. }));
        assert_eq!(view.spinner().frame_index(), 1);

        view.update(Event::Content(DisplayLine::terminal()));
        assert_eq!(view.update(tick_of(&second)), Command::None);
        assert_eq!(view.spinner().frame_index(), 1);
    }

    #[test]
    fn stale_tick_does_not_start_second_chain() {
        let mut view = ViewModel::new(3, "waiting", InterruptSignal::new());
        let first = view.init();
        let _ = view.update(tick_of(&first));
        assert_eq!(view.update(tick_of(&first)), Command::None);
    }

    #[test]
    fn other_keys_are_ignored() {
        let signal = InterruptSignal::new();
        let mut view = ViewModel::new(3, "waiting", signal.clone());
        assert_eq!(
            view.update(Event::Key(KeyEvent::plain(Key::Char('q')))),
            Command::None
        );
        assert!(!signal.is_signaled());
        assert!(!view.interrupted());
    }

    #[test]
    fn render_waiting_shows_spinner_and_message_only() {
        let view = ViewModel::new(3, "waiting for logs", InterruptSignal::new());
        assert_eq!(view.render().snapshot(), "⠋ waiting for logs");
    }

    #[test]
    fn render_streaming_separates_lines_with_blank_row() {
        let mut view = ViewModel::new(3, "waiting for logs", InterruptSignal::new());
        view.update(content("one"));
        view.update(content("two"));
        assert_eq!(
            view.render().snapshot(),
            "⠋ waiting for logs\n\none\ntwo"
        );
    }

    #[test]
    fn render_done_swaps_spinner_for_mark() {
        let mut view = ViewModel::new(2, "waiting for logs", InterruptSignal::new());
        view.update(content("one"));
        view.update(Event::Content(DisplayLine::terminal()));
        assert_eq!(view.render().snapshot(), "✓ waiting for logs\n\none");
    }

    #[test]
    fn batch_quit_detection() {
        assert!(Command::Batch(vec![Command::None, Command::Quit]).is_quit());
        assert!(!Command::Batch(vec![Command::None]).is_quit());
        assert!(Command::None.is_none());
    }
}
