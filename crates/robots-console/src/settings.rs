//! Application settings loaded from a TOML file
//!
//! ```toml
//! [log_source]
//! capacity = 250
//!
//! [logging]
//! default_level = "debug"
//!
//! [logging.bridge]
//! min_level = "DEBUG"
//! ```

use std::fs;
use std::path::Path;

use robots_log::{ConfigError, LogSourceConfig};
use robots_logging::LogConfig;
use serde::{Deserialize, Serialize};

/// Everything the console reads at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_source: LogSourceConfig,
    pub logging: LogConfig,
}

impl Settings {
    /// Read and validate settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        settings.log_source.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robots_log::{DEFAULT_CAPACITY, LogLevel};

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.log_source.capacity, DEFAULT_CAPACITY);
        assert_eq!(settings.logging.default_level, "info");
    }

    #[test]
    fn test_full_file() {
        let settings = Settings::from_toml(
            r#"
            [log_source]
            capacity = 250

            [logging]
            default_level = "debug"

            [logging.bridge]
            min_level = "DEBUG"
            "#,
        )
        .unwrap();

        assert_eq!(settings.log_source.capacity, 250);
        assert_eq!(settings.logging.default_level, "debug");
        assert_eq!(settings.logging.bridge.min_level, LogLevel::Debug);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = Settings::from_toml("[log_source]\ncapacity = 0\n").unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);
    }

    #[test]
    fn test_malformed_file_rejected() {
        let err = Settings::from_toml("[log_source\ncapacity = ").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("robots.toml");
        fs::write(&path, "[log_source]\ncapacity = 7\n").unwrap();

        assert_eq!(Settings::load(&path).unwrap().log_source.capacity, 7);
        assert!(Settings::load(&dir.path().join("missing.toml")).is_err());
    }
}
