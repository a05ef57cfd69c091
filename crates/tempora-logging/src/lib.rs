//! Logging setup for Tempora
//!
//! Builds a global `tracing` subscriber from a [`LogConfig`]:
//!
//! - **Console**: JSONL (default) or human-readable output
//! - **File**: JSONL to a single file or a daily/hourly rolling file, written
//!   through a non-blocking worker
//! - **Filtering**: `RUST_LOG` when set, otherwise the configured level
//!
//! # Quick Start
//!
//! ```ignore
//! use tempora_logging::{LogConfig, TemporaSubscriberBuilder};
//!
//! // Keep the guard alive for as long as file output is needed
//! let _guard = TemporaSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init()?;
//! ```

pub mod config;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{
    self, MakeWriter,
    format::{Format, Json, JsonFields},
};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Log directory or file could not be created
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rolling file appender could not be created
    #[error("File appender error: {0}")]
    Appender(#[from] InitError),

    /// A global subscriber is already installed
    #[error("Subscriber already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Builder for configuring and initializing the Tempora logging subscriber
///
/// By default, console output uses JSONL format. Use
/// `LogConfig::development()` for human-readable output during development.
pub struct TemporaSubscriberBuilder {
    config: LogConfig,
}

impl TemporaSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Switch console output between pretty and JSONL
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.config.console.pretty = pretty;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Install the subscriber globally
    ///
    /// Returns the file writer's guard when file output is configured; it
    /// must be kept alive for buffered lines to be flushed.
    ///
    /// # Errors
    ///
    /// Fails if the log file cannot be created or a global subscriber has
    /// already been set.
    pub fn init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.default_level));

        let console = &self.config.console;
        let pretty_layer = (console.enabled && console.pretty)
            .then(|| fmt::layer().with_ansi(console.ansi).with_target(true));
        let console_layer = (console.enabled && !console.pretty)
            .then(|| jsonl_layer(&self.config.jsonl, std::io::stdout));

        let (file_layer, guard) = match &self.config.file {
            Some(file_config) => {
                let (writer, guard) = file_writer(file_config)?;
                (Some(jsonl_layer(&self.config.jsonl, writer)), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(pretty_layer)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::debug!(level = %self.config.default_level, "Logging initialized");
        Ok(guard)
    }
}

impl Default for TemporaSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn jsonl_layer<S, W>(config: &JsonlConfig, writer: W) -> fmt::Layer<S, JsonFields, Format<Json>, W>
where
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fmt::layer()
        .json()
        .with_current_span(config.include_current_span)
        .with_span_list(config.include_spans)
        .flatten_event(config.flatten_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_names(config.include_thread_info)
        .with_writer(writer)
}

/// Single truncated file for `Never`, rolling appender otherwise
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;

    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            return Ok(tracing_appender::non_blocking(File::create(path)?));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(config.prefix.clone())
        .filename_suffix("log")
        .build(&config.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging for testing (minimal output)
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_testing() {
    let _ = TemporaSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .init();
}
