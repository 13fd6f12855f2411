//! tailbox-term: terminal host for the tailbox log view.
//!
//! Drives a `tailbox_core::view::ViewModel` against a real terminal:
//! - `program::Program`: the single consumer loop over the view event queue.
//! - `render`: in-place inline redraw and an in-memory renderer for tests.
//! - `keys`: crossterm key mapping and the blocking key reader.
//! - `session::TerminalSession`: raw-mode guard.

pub mod error;
pub mod keys;
pub mod program;
pub mod render;
pub mod session;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "tailbox-term"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "tailbox-term");
    }
}
