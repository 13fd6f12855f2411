//! Canonical key input consumed by the view.
//!
//! Terminal hosts map their native events onto these types so the view never
//! depends on a terminal backend.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    #[must_use]
    pub const fn ctrl() -> Self {
        Self {
            shift: false,
            ctrl: true,
            alt: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::none(),
        }
    }

    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            key: Key::Char(ch),
            modifiers: Modifiers::ctrl(),
        }
    }

    /// ctrl+c and ctrl+d end the viewer.
    #[must_use]
    pub fn is_quit(&self) -> bool {
        self.modifiers.ctrl && matches!(self.key, Key::Char('c' | 'C' | 'd' | 'D'))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("alt+")?;
        }
        match self.key {
            Key::Char(ch) => write!(f, "{}", ch.to_ascii_lowercase()),
            Key::Enter => f.write_str("enter"),
            Key::Escape => f.write_str("esc"),
            Key::Tab if self.modifiers.shift => f.write_str("shift+tab"),
            Key::Tab => f.write_str("tab"),
            Key::Backspace => f.write_str("backspace"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::{Key, KeyEvent, Modifiers};

    #[test]
    fn ctrl_c_and_ctrl_d_quit() {
        assert!(KeyEvent::ctrl('c').is_quit());
        assert!(KeyEvent::ctrl('d').is_quit());
    }

    #[test]
    fn plain_letters_do_not_quit() {
        assert!(!KeyEvent::plain(Key::Char('c')).is_quit());
        assert!(!KeyEvent::plain(Key::Char('q')).is_quit());
        assert!(!KeyEvent::plain(Key::Escape).is_quit());
        assert!(!KeyEvent::ctrl('x').is_quit());
    }

    #[test]
    fn key_names_snapshot() {
        let snapshot = format!(
            "{}|{}|{}|{}",
            KeyEvent::ctrl('c'),
            KeyEvent::plain(Key::Enter),
            KeyEvent::plain(Key::Char('q')),
            KeyEvent {
                key: Key::Tab,
                modifiers: Modifiers {
                    shift: true,
                    ctrl: false,
                    alt: false,
                },
            },
        );
        assert_eq!(snapshot, "ctrl+c|enter|q|shift+tab");
    }
}
