use std::io;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::style::{Attribute, SetAttribute};
use crossterm::terminal;

/// Raw mode with a hidden cursor for as long as the guard lives.
///
/// The view is drawn inline, so the main screen is kept.
pub struct TerminalSession {
    stdout: io::Stdout,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { stdout })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, SetAttribute(Attribute::Reset), Show);
        let _ = terminal::disable_raw_mode();
    }
}
