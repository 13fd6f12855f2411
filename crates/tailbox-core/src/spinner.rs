//! Braille spinner shown while the viewer waits for content.

use std::time::Duration;

/// Braille "mini dot" frames.
pub const MINI_DOT_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval: twelve frames per second.
pub const MINI_DOT_INTERVAL: Duration = Duration::from_millis(83);

/// Timer event addressed to a spinner.
///
/// Each accepted tick bumps the spinner tag, so a tick from an older chain
/// (a duplicate `init`, a late timer) no longer matches and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinnerTick {
    pub tag: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spinner {
    frames: &'static [&'static str],
    interval: Duration,
    frame: usize,
    tag: u64,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::mini_dot()
    }
}

impl Spinner {
    pub fn mini_dot() -> Self {
        Self {
            frames: &MINI_DOT_FRAMES,
            interval: MINI_DOT_INTERVAL,
            frame: 0,
            tag: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The tick that the spinner currently expects.
    pub fn tick(&self) -> SpinnerTick {
        SpinnerTick { tag: self.tag }
    }

    /// Advances one frame if `tick` is current and returns the next tick to schedule.
    pub fn advance(&mut self, tick: SpinnerTick) -> Option<SpinnerTick> {
        if tick.tag != self.tag {
            return None;
        }
        self.frame = (self.frame + 1) % self.frames.len();
        self.tag = self.tag.wrapping_add(1);
        Some(self.tick())
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn view(&self) -> &'static str {
        self.frames[self.frame]
    }
}
