//! # Robots Log
//!
//! Bounded, concurrent log event store for the Robots program.
//!
//! The store keeps the most recent entries in a fixed-capacity ring,
//! evicting the oldest once full, and tells registered listeners (a log
//! viewer, for instance) about every new entry without keeping them alive.
//!
//! ## Key Types
//!
//! - [`RingStore`]: fixed-capacity circular storage with [`Strong`] or
//!   [`Weak`] element retention
//! - [`ListenerRegistry`]: weakly held listeners with a cached snapshot
//! - [`LogSource`]: the facade collaborators use (append, range, all)
//! - [`Logger`]: cloneable handle passed to components that write logs
//!
//! ```ignore
//! use std::sync::Arc;
//! use robots_log::{LogLevel, LogSource};
//!
//! let source: Arc<LogSource> = Arc::new(LogSource::new(100)?);
//! let viewer = Arc::new(|| println!("log changed"));
//! source.register_listener(&viewer);
//!
//! source.append(LogLevel::Info, "robot started");
//! for entry in source.range(0, 20) {
//!     println!("{entry}");
//! }
//! ```

pub mod entry;
pub mod error;
pub mod listener;
pub mod logger;
pub mod ring;
pub mod source;

pub use entry::{LogEntry, LogLevel};
pub use error::{ConfigError, RangeError};
pub use listener::{ListenerId, ListenerRegistry, LogChangeListener, NotifyReport};
pub use logger::Logger;
pub use ring::{Retention, RingStore, Strong, Weak};
pub use source::{LogSource, LogSourceConfig, DEFAULT_CAPACITY};
