//! tailbox-core: engine behind the live scrolling log viewer.
//!
//! The crate is transport-agnostic and terminal-agnostic:
//! - `view::ViewModel`: single-threaded state machine (`Waiting` → `Streaming` → `Done`)
//!   driven by key, tick and content events.
//! - `feed::PacedFeed`: formats upstream entries and releases them to the view
//!   queue through one paced FIFO worker.
//! - `source::LogSource`: seam for upstream log producers.
//! - `interrupt::InterruptSignal`: one-shot cancellation from the UI to the producer.

pub mod buffer;
pub mod error;
pub mod feed;
pub mod format;
pub mod input;
pub mod interrupt;
pub mod line;
pub mod source;
pub mod spinner;
pub mod view;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "tailbox-core"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "tailbox-core");
    }
}
