//! Logging setup for the Robots program
//!
//! This crate wires the process-wide `tracing` subscriber:
//!
//! - **Console Output**: pretty human-readable output (default) or JSONL
//! - **File Output**: JSONL files with daily/hourly rotation via tracing-appender
//! - **Log Window Bridge**: every event is also appended to a
//!   [`robots_log::LogSource`], so the log viewer shows application logs
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use robots_log::LogSource;
//! use robots_logging::{LogConfig, RobotsSubscriberBuilder};
//!
//! let source = Arc::new(LogSource::new(100)?);
//! let _guard = RobotsSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .with_log_source(Arc::clone(&source))
//!     .init();
//!
//! tracing::info!("Robot started");
//! assert_eq!(source.size(), 1);
//! ```

pub mod config;
pub mod layers;

pub use config::{BridgeConfig, ConsoleConfig, ConsoleFormat, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use layers::LogSourceLayer;

use std::fs::{self, File};
use std::io;
use std::sync::Arc;

use robots_log::LogSource;
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, Layered, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to create rolling log appender: {0}")]
    Appender(#[from] InitError),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Builder for configuring and initializing the Robots logging subscriber
///
/// By default, console output is pretty and colored. Use
/// `LogConfig::production()` for JSONL file output only.
pub struct RobotsSubscriberBuilder {
    config: LogConfig,
    log_source: Option<Arc<LogSource>>,
}

impl RobotsSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
            log_source: None,
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

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Forward events into the given log source
    pub fn with_log_source(mut self, source: Arc<LogSource>) -> Self {
        self.log_source = Some(source);
        self
    }

    /// Try to initialize the subscriber globally
    ///
    /// Returns the guard of the non-blocking file writer, which must be kept
    /// alive for the duration of the program when file output is enabled.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let (layers, guard) = self.build_layers()?;

        Registry::default()
            .with(self.env_filter())
            .with(layers)
            .try_init()?;

        Ok(guard)
    }

    /// Initialize the subscriber globally, reporting failures on stderr
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: Failed to initialize logging: {}", e);
                None
            }
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.config.default_level))
    }

    fn build_layers(&self) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>), LoggingError> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if self.config.console.enabled {
            let console = match self.config.console.format {
                ConsoleFormat::Pretty => tracing_subscriber::fmt::layer()
                    .with_ansi(self.config.console.ansi)
                    .with_target(true)
                    .boxed(),
                ConsoleFormat::Json => jsonl_layer(&self.config.jsonl, io::stdout),
            };
            layers.push(console);
        }

        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = create_file_writer(file_config)?;
            guard = Some(file_guard);
            layers.push(jsonl_layer(&self.config.jsonl, writer));
        }

        if let Some(source) = &self.log_source {
            layers.push(LogSourceLayer::from_config(Arc::clone(source), &self.config.bridge).boxed());
        }

        Ok((layers, guard))
    }
}

impl Default for RobotsSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One flat JSON object per event
fn jsonl_layer<W>(config: &JsonlConfig, writer: W) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_span_list(false)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread)
        .with_thread_names(config.include_thread)
        .with_writer(writer)
        .boxed()
}

/// Open the log file writer; `Never` truncates a single file, others roll
fn create_file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            fs::create_dir_all(&config.directory)?;
            let file_path = config.directory.join(format!("{}.log", config.prefix));
            let file = File::create(&file_path)?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&config.prefix)
        .filename_suffix("log")
        .build(&config.directory)?;

    Ok(tracing_appender::non_blocking(appender))
}
