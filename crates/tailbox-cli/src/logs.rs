//! `tailbox logs`: stream lines from stdin or a file into the live view.
//!
//! When stdout is a terminal the lines scroll through the inline view.
//! Otherwise they are formatted and printed as they arrive, with no pacing
//! and no spinner, so `tailbox logs | grep` still works.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;
use tailbox_core::error::SourceError;
use tailbox_core::feed::{pump, PacedFeed, PumpReport};
use tailbox_core::format::{format_entry, LineFormat};
use tailbox_core::interrupt::InterruptSignal;
use tailbox_core::source::{FollowFileSource, LineReaderSource, LogSource};
use tailbox_core::view::ViewModel;
use tailbox_term::error::TermError;
use tailbox_term::keys::KeyReader;
use tailbox_term::program::{Program, ProgramReport, ViewOutcome};
use tailbox_term::render::InlineRenderer;
use tailbox_term::session::TerminalSession;
use tokio::io::BufReader;
use tokio::task::JoinHandle;

use crate::config::Config;

/// Poll interval for `--follow`.
pub const FOLLOW_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct LogsArgs {
    /// Log file to read; stdin when omitted
    pub file: Option<PathBuf>,

    /// Keep polling FILE for appended lines
    #[arg(short, long)]
    pub follow: bool,

    /// Lines read back from the end of FILE before following
    #[arg(long)]
    pub tail: Option<usize>,

    /// Lines kept on screen
    #[arg(long)]
    pub height: Option<usize>,

    /// Message shown next to the spinner
    #[arg(short, long)]
    pub message: Option<String>,

    /// Pause before each line in milliseconds (0 disables pacing)
    #[arg(long)]
    pub pace_ms: Option<u64>,

    /// Disable colored timestamps
    #[arg(long)]
    pub no_color: bool,

    /// Show each line's label set
    #[arg(long)]
    pub labels: bool,
}

/// Config values with command-line overrides applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsSettings {
    pub height: usize,
    pub message: String,
    pub pace: Duration,
    pub tail: usize,
    pub format: LineFormat,
}

impl LogsSettings {
    pub fn resolve(config: &Config, args: &LogsArgs) -> Self {
        Self {
            height: args.height.unwrap_or(config.height),
            message: args
                .message
                .clone()
                .unwrap_or_else(|| config.wait_message.clone()),
            pace: Duration::from_millis(args.pace_ms.unwrap_or(config.pace_ms)),
            tail: args.tail.unwrap_or(config.tail),
            format: LineFormat {
                no_color: args.no_color || config.no_color,
                show_labels: args.labels || config.show_labels,
            },
        }
    }
}

fn colors_enabled(no_color: bool) -> bool {
    if no_color {
        return false;
    }
    std::env::var_os("NO_COLOR").is_none()
}

pub async fn open_source(args: &LogsArgs, tail: usize) -> anyhow::Result<Box<dyn LogSource>> {
    match (&args.file, args.follow) {
        (None, true) => bail!("--follow needs a FILE"),
        (None, false) => Ok(Box::new(LineReaderSource::new(
            BufReader::new(tokio::io::stdin()),
            "stdin",
        ))),
        (Some(path), true) => {
            if !path.is_file() {
                bail!("log file {} not found", path.display());
            }
            Ok(Box::new(FollowFileSource::new(
                path,
                tail,
                FOLLOW_POLL_INTERVAL,
            )))
        }
        (Some(path), false) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("open log file {}", path.display()))?;
            let name = path.display().to_string();
            Ok(Box::new(LineReaderSource::new(BufReader::new(file), &name)))
        }
    }
}

pub async fn run(args: &LogsArgs, config: &Config) -> anyhow::Result<()> {
    let mut settings = LogsSettings::resolve(config, args);
    settings.format.no_color = !colors_enabled(settings.format.no_color);

    let mut source = open_source(args, settings.tail).await?;
    let interrupt = InterruptSignal::new();
    let sigint = spawn_sigint_handler(interrupt.clone());

    let result = if io::stdout().is_terminal() {
        run_interactive(source, &settings, &interrupt).await
    } else {
        let mut stdout = io::stdout();
        run_plain(source.as_mut(), settings.format, &interrupt, &mut stdout)
            .await
            .map(|lines| tracing::debug!(lines, "plain output finished"))
            .context("log source failed")
    };
    sigint.abort();
    result
}

fn spawn_sigint_handler(interrupt: InterruptSignal) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::debug!("SIGINT received");
                interrupt.signal();
            }
            Err(err) => tracing::warn!(error = %err, "listen for SIGINT"),
        }
    })
}

/// Prints formatted lines until the source ends or `interrupt` fires.
///
/// Returns the number of lines written.
pub async fn run_plain(
    source: &mut dyn LogSource,
    format: LineFormat,
    interrupt: &InterruptSignal,
    out: &mut dyn Write,
) -> Result<usize, SourceError> {
    let cancel = interrupt.token();
    let mut written = 0usize;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = source.next() => next,
        };
        match next {
            Some(Ok(entry)) => {
                writeln!(out, "{}", format_entry(&entry, format))?;
                out.flush()?;
                written += 1;
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, written, "log source failed");
                return Err(err);
            }
            None => break,
        }
    }
    Ok(written)
}

async fn run_interactive(
    mut source: Box<dyn LogSource>,
    settings: &LogsSettings,
    interrupt: &InterruptSignal,
) -> anyhow::Result<()> {
    let view = ViewModel::new(settings.height, settings.message.clone(), interrupt.clone());
    let session = TerminalSession::enter().context("enter raw terminal mode")?;
    let mut program = Program::new(view, InlineRenderer::new(io::stdout()));

    let feed = PacedFeed::spawn(program.sender(), settings.pace, settings.format);
    let keys = KeyReader::spawn(program.sender());
    let signal = interrupt.clone();
    let producer = tokio::spawn(async move { pump(source.as_mut(), feed, &signal).await });

    let report = program.run().await;
    if let Err(err) = keys.stop().await {
        tracing::warn!(error = %err, "key reader failed");
    }
    drop(session);

    settle(report, producer, interrupt).await
}

/// Joins the producer once the view loop has returned.
///
/// A failed render cancels the source first so the producer can finish.
async fn settle(
    report: Result<ProgramReport, TermError>,
    producer: JoinHandle<Result<PumpReport, SourceError>>,
    interrupt: &InterruptSignal,
) -> anyhow::Result<()> {
    let report = match report {
        Ok(report) => report,
        Err(err) => {
            interrupt.signal();
            if let Err(join) = producer.await {
                tracing::warn!(error = %join, "log producer task failed");
            }
            return Err(err).context("render log view");
        }
    };
    if report.outcome == ViewOutcome::Interrupted {
        tracing::info!("log view interrupted");
    }

    let pumped = producer.await.context("log producer task")?;
    match pumped {
        Ok(pumped) => {
            tracing::info!(
                accepted = pumped.accepted,
                delivered = pumped.delivered,
                end = ?pumped.end,
                "log stream closed"
            );
            Ok(())
        }
        Err(err) => Err(err).context("log source failed"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::time::Duration;

    use tailbox_core::feed::{pump, PacedFeed};
    use tailbox_core::format::LineFormat;
    use tailbox_core::interrupt::InterruptSignal;
    use tailbox_core::source::{LabelSet, LogEntry, MockLogSource};
    use tailbox_term::error::TermError;
    use tokio::sync::mpsc;

    use super::{settle, LogsArgs, LogsSettings};
    use crate::config::Config;

    #[test]
    fn flags_override_config() {
        let config = Config {
            height: 4,
            show_labels: true,
            ..Config::default()
        };
        let args = LogsArgs {
            height: Some(7),
            pace_ms: Some(0),
            message: Some("tailing".to_owned()),
            no_color: true,
            ..LogsArgs::default()
        };

        let settings = LogsSettings::resolve(&config, &args);
        assert_eq!(settings.height, 7);
        assert_eq!(settings.pace, Duration::ZERO);
        assert_eq!(settings.message, "tailing");
        assert_eq!(settings.tail, 50);
        assert!(settings.format.no_color);
        assert!(settings.format.show_labels);
    }

    #[test]
    fn config_used_when_flags_absent() {
        let settings = LogsSettings::resolve(&Config::default(), &LogsArgs::default());
        assert_eq!(settings.height, 10);
        assert_eq!(settings.message, "waiting for logs");
        assert_eq!(settings.pace, Duration::from_millis(10));
        assert!(!settings.format.no_color);
    }

    #[tokio::test]
    async fn render_failure_cancels_source_and_joins_producer() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let feed = PacedFeed::spawn(tx, Duration::ZERO, LineFormat::default());
        let interrupt = InterruptSignal::new();
        let signal = interrupt.clone();
        let producer = tokio::spawn(async move {
            let mut source = MockLogSource::with_delays(vec![
                (Duration::ZERO, Ok(LogEntry::new(None, LabelSet::new(), "a"))),
                (
                    Duration::from_secs(3600),
                    Ok(LogEntry::new(None, LabelSet::new(), "never read")),
                ),
            ]);
            pump(&mut source, feed, &signal).await
        });

        let failed = Err(TermError::Io(std::io::Error::other("tty gone")));
        let err = tokio::time::timeout(
            Duration::from_secs(5),
            settle(failed, producer, &interrupt),
        )
        .await
        .expect("producer left running")
        .unwrap_err();

        assert!(interrupt.is_signaled());
        assert!(format!("{err:#}").contains("tty gone"));
    }
}
