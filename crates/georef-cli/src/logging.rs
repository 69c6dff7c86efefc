//! Tracing subscriber setup for the `georef` binary.
//!
//! Workspace crates log at the level chosen on the command line; everything
//! else stays at `warn`. Per-value conversion events are emitted at `trace`
//! and show record values only when `--log-data` is given.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use georef_model::redact::set_log_data_enabled;

pub use georef_model::redact::{REDACTED_VALUE, log_data_enabled, redact_value};

/// Crates whose events follow the configured level.
const WORKSPACE_TARGETS: [&str; 4] = [
    "georef_cli",
    "georef_geometry",
    "georef_model",
    "georef_normalization",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event, with span close events.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    /// Let `RUST_LOG` replace the directives derived from `level`.
    pub respect_rust_log: bool,
    pub format: LogFormat,
    pub ansi: bool,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
    pub log_data: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
            respect_rust_log: true,
            format: LogFormat::default(),
            ansi: false,
            log_file: None,
            log_data: false,
        }
    }
}

impl LogConfig {
    /// `(timestamps, ansi)`: file logs are stamped and plain, terminal logs
    /// are unstamped and colored only when asked.
    fn decorations(&self) -> (bool, bool) {
        match self.log_file {
            Some(_) => (true, false),
            None => (false, self.ansi),
        }
    }

    fn filter(&self) -> EnvFilter {
        let directives = || EnvFilter::new(default_directives(self.level));
        if self.respect_rust_log {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| directives())
        } else {
            directives()
        }
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    set_log_data_enabled(config.log_data);
    let layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            fmt_layer(config, Mutex::new(file))
        }
        None => fmt_layer(config, io::stderr),
    };
    tracing_subscriber::registry()
        .with(layer)
        .with(config.filter())
        .try_init()
        .context("install tracing subscriber")
}

fn fmt_layer<S, W>(config: &LogConfig, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let (timestamps, ansi) = config.decorations();
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(ansi);
    match (config.format, timestamps) {
        (LogFormat::Json, _) => layer.json().with_span_events(FmtSpan::CLOSE).boxed(),
        (LogFormat::Compact, true) => layer.compact().boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().boxed(),
        (LogFormat::Pretty, true) => layer.boxed(),
        (LogFormat::Pretty, false) => layer.without_time().boxed(),
    }
}

/// Directive string for the workspace crates at `level`; other crates stay at warn.
pub fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_workspace_crates() {
        insta::assert_snapshot!(
            default_directives(LevelFilter::DEBUG),
            @"warn,georef_cli=debug,georef_geometry=debug,georef_model=debug,georef_normalization=debug"
        );
    }

    #[test]
    fn file_logs_are_stamped_and_plain() {
        let terminal = LogConfig {
            ansi: true,
            ..LogConfig::default()
        };
        assert_eq!(terminal.decorations(), (false, true));

        let file = LogConfig {
            log_file: Some(PathBuf::from("georef.log")),
            ..terminal
        };
        assert_eq!(file.decorations(), (true, false));
    }
}
