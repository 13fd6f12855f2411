//! Terminal key input.

use std::time::Duration;

use crossterm::event::{
    self, Event as TerminalEvent, KeyCode as TerminalKeyCode, KeyEvent as TerminalKeyEvent,
    KeyEventKind, KeyModifiers,
};
use tailbox_core::feed::EventSender;
use tailbox_core::input::{Key, KeyEvent, Modifiers};
use tailbox_core::view::Event;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::TermError;

/// How long one blocking poll waits before re-checking the stop token.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn map_terminal_event(event: TerminalEvent) -> Option<KeyEvent> {
    match event {
        TerminalEvent::Key(key_event) => map_key_event(key_event),
        _ => None,
    }
}

pub fn map_key_event(key_event: TerminalKeyEvent) -> Option<KeyEvent> {
    if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }

    let key = match key_event.code {
        TerminalKeyCode::Char(ch) => Key::Char(ch),
        TerminalKeyCode::Enter => Key::Enter,
        TerminalKeyCode::Esc => Key::Escape,
        TerminalKeyCode::Tab | TerminalKeyCode::BackTab => Key::Tab,
        TerminalKeyCode::Backspace => Key::Backspace,
        TerminalKeyCode::Up => Key::Up,
        TerminalKeyCode::Down => Key::Down,
        TerminalKeyCode::Left => Key::Left,
        TerminalKeyCode::Right => Key::Right,
        _ => return None,
    };

    let mut modifiers = Modifiers {
        shift: key_event.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: key_event.modifiers.contains(KeyModifiers::CONTROL),
        alt: key_event.modifiers.contains(KeyModifiers::ALT),
    };
    if matches!(key_event.code, TerminalKeyCode::BackTab) {
        modifiers.shift = true;
    }

    Some(KeyEvent { key, modifiers })
}

/// Blocking crossterm reader forwarding keys into the view queue.
pub struct KeyReader {
    stop: CancellationToken,
    handle: JoinHandle<Result<(), TermError>>,
}

impl KeyReader {
    /// Starts reading on a blocking task. Requires raw mode to see ctrl keys.
    pub fn spawn(queue: EventSender) -> Self {
        let stop = CancellationToken::new();
        let token = stop.clone();
        let handle = tokio::task::spawn_blocking(move || read_keys(&queue, &token));
        Self { stop, handle }
    }

    /// Stops the reader and waits for the blocking task to return.
    pub async fn stop(self) -> Result<(), TermError> {
        self.stop.cancel();
        self.handle.await?
    }
}

fn read_keys(queue: &EventSender, stop: &CancellationToken) -> Result<(), TermError> {
    while !stop.is_cancelled() {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Some(key) = map_terminal_event(event::read()?) else {
            continue;
        };
        if queue.send(Event::Key(key)).is_err() {
            break;
        }
    }
    tracing::trace!("key reader stopped");
    Ok(())
}
