//! Event loop hosting a `ViewModel`.
//!
//! `Program` is the only consumer of the view queue. Producers (the paced
//! feed worker, the key reader, tick timers) hold clones of its sender. Every
//! event goes through `update`, the returned command is dispatched and the
//! view is redrawn, until a command asks to quit.

use tailbox_core::feed::EventSender;
use tailbox_core::view::{Command, Event, ViewFrame, ViewModel};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::TermError;
use crate::render::Renderer;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// The stream reached its terminal line.
    Completed,
    /// The user pressed a quit key.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramReport {
    pub outcome: ViewOutcome,
    pub frame: ViewFrame,
}

pub struct Program<R: Renderer> {
    view: ViewModel,
    renderer: R,
    sender: EventSender,
    events: mpsc::UnboundedReceiver<Event>,
    timers: CancellationToken,
}

impl<R: Renderer> Program<R> {
    pub fn new(view: ViewModel, renderer: R) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        Self {
            view,
            renderer,
            sender,
            events,
            timers: CancellationToken::new(),
        }
    }

    /// Sender for producers feeding the view.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Runs until the view quits and returns the final frame.
    pub async fn run(&mut self) -> Result<ProgramReport, TermError> {
        let init = self.view.init();
        if !self.dispatch(init) {
            self.renderer.draw(&self.view.render())?;
            while let Some(event) = self.events.recv().await {
                let command = self.view.update(event);
                if self.dispatch(command) {
                    break;
                }
                self.renderer.draw(&self.view.render())?;
            }
        }
        self.timers.cancel();

        let frame = self.view.render();
        self.renderer.finish(&frame)?;
        let outcome = if self.view.interrupted() {
            ViewOutcome::Interrupted
        } else {
            ViewOutcome::Completed
        };
        tracing::debug!(?outcome, lines = self.view.buffer().len(), "log view closed");
        Ok(ProgramReport { outcome, frame })
    }

    /// Runs `command`; returns true if the loop should stop.
    fn dispatch(&self, command: Command) -> bool {
        match command {
            Command::None => false,
            Command::Quit => true,
            Command::Tick { tick, after } => {
                let sender = self.sender.clone();
                let stop = self.timers.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => {}
                        _ = tokio::time::sleep(after) => {
                            let _ = sender.send(Event::Tick(tick));
                        }
                    }
                });
                false
            }
            Command::Batch(commands) => {
                let mut quit = false;
                for child in commands {
                    quit |= self.dispatch(child);
                }
                quit
            }
        }
    }
}
