//! Cheap, cloneable handle for appending to a shared log source
//!
//! A [`Logger`] is built once at startup and handed to every component that
//! writes to or reads from the application log, instead of reaching for a
//! process-wide default source.

use std::sync::Arc;

use crate::entry::{LogEntry, LogLevel};
use crate::error::ConfigError;
use crate::ring::{Retention, Strong};
use crate::source::{LogSource, LogSourceConfig};

/// Shared handle to a [`LogSource`]
#[derive(Debug)]
pub struct Logger<R: Retention = Strong> {
    source: Arc<LogSource<R>>,
}

impl<R: Retention> Clone for Logger<R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<R: Retention> Logger<R> {
    /// Wrap an existing source
    pub fn new(source: Arc<LogSource<R>>) -> Self {
        Self { source }
    }

    /// Build a fresh source from configuration
    pub fn from_config(config: &LogSourceConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(LogSource::from_config(config)?)))
    }

    /// The underlying source, for readers and listener registration
    pub fn source(&self) -> &Arc<LogSource<R>> {
        &self.source
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> Arc<LogEntry> {
        self.source.append(level, message)
    }

    pub fn trace(&self, message: impl Into<String>) -> Arc<LogEntry> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: impl Into<String>) -> Arc<LogEntry> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Arc<LogEntry> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: impl Into<String>) -> Arc<LogEntry> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Arc<LogEntry> {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&self, message: impl Into<String>) -> Arc<LogEntry> {
        self.log(LogLevel::Fatal, message)
    }
}
