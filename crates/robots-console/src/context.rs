//! Application context shared by every component
//!
//! Built once in `main` and passed by reference; there is no process-wide
//! default log source.

use std::sync::Arc;

use robots_log::{ConfigError, LogSource, Logger};

use crate::settings::Settings;

#[derive(Debug)]
pub struct AppContext {
    logger: Logger,
    settings: Settings,
}

impl AppContext {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let logger = Logger::from_config(&settings.log_source)?;
        Ok(Self { logger, settings })
    }

    /// Handle for components that write log entries
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The shared store, for viewers and listener registration
    pub fn source(&self) -> &Arc<LogSource> {
        self.logger.source()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
