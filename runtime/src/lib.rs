//! Process setup shared by the Folio binaries: logging to the console and,
//! optionally, to a daily rolling file.

use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Where console output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// Keeps stdout clean for command output.
    Stderr,
}

/// Logging setup for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Console stream.
    pub console: ConsoleTarget,
    /// Directory for rolling log files; console only when `None`.
    pub log_dir: Option<PathBuf>,
    /// File name prefix of the rolling log files.
    pub file_prefix: String,
}

impl LoggingOptions {
    /// Console logging to stdout with the default filter.
    pub fn new(file_prefix: impl Into<String>) -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            console: ConsoleTarget::default(),
            log_dir: None,
            file_prefix: file_prefix.into(),
        }
    }

    /// Take the log directory from `LOG_DIR` when set and non-empty.
    pub fn with_env_log_dir(mut self) -> Self {
        self.log_dir = env::var("LOG_DIR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        self
    }

    /// Send console output to `console`.
    pub fn with_console(mut self, console: ConsoleTarget) -> Self {
        self.console = console;
        self
    }

    /// Replace the fallback filter directive.
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init_logging(options: &LoggingOptions) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    let console_writer = match options.console {
        ConsoleTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        ConsoleTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
    };
    let console_layer = fmt::layer().with_writer(console_writer);

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, &options.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(dir) = &options.log_dir {
        tracing::info!("Writing logs to {}", dir.display());
    }
    Ok(guard)
}
