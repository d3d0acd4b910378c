//! Logging configuration
//!
//! Every section deserializes with defaults, so a settings file only needs
//! the keys it changes:
//!
//! ```toml
//! default_level = "debug"
//!
//! [console]
//! format = "json"
//!
//! [file]
//! directory = "./logs"
//! rotation = "hourly"
//! ```

use std::path::PathBuf;

use robots_log::LogLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub default_level: String,
    pub console: ConsoleConfig,
    /// JSONL file output; off when absent
    pub file: Option<FileConfig>,
    pub jsonl: JsonlConfig,
    /// Which events are copied into the log source
    pub bridge: BridgeConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            console: ConsoleConfig::default(),
            file: None,
            jsonl: JsonlConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl LogConfig {
    /// Debug output on a colored console, debug entries in the log window
    pub fn development() -> Self {
        let mut config = Self::default();
        config.default_level = "debug".to_string();
        config.bridge.min_level = LogLevel::Debug;
        config
    }

    /// Daily JSONL files under `log_dir`, nothing on the console
    pub fn production(log_dir: PathBuf) -> Self {
        let mut config = Self::default();
        config.console.enabled = false;
        config.file = Some(FileConfig {
            directory: log_dir,
            ..FileConfig::default()
        });
        config
    }

    /// Warnings only, uncolored JSON on the console
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.default_level = "warn".to_string();
        config.console.format = ConsoleFormat::Json;
        config.console.ansi = false;
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: ConsoleFormat,
    /// Colors; only used by the pretty format
    pub ansi: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: ConsoleFormat::Pretty,
            ansi: true,
        }
    }
}

/// How console lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File names are `<prefix>.<date>.log`, or `<prefix>.log` without rotation
    pub prefix: String,
    pub rotation: RotationStrategy,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "robots".to_string(),
            rotation: RotationStrategy::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    /// One file, truncated at startup
    Never,
}

/// Extra metadata written with each JSON line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonlConfig {
    /// Source file and line of the event
    pub include_location: bool,
    /// Thread id and name of the emitting thread
    pub include_thread: bool,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            include_location: true,
            include_thread: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Least severe level that is forwarded
    pub min_level: LogLevel,
    /// Prefix forwarded messages with the event target
    pub include_target: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            include_target: false,
        }
    }
}
