//! The log source: bounded entry storage plus change notification
//!
//! [`LogSource`] is the only type collaborators use. It owns one
//! [`RingStore`] of entries and one [`ListenerRegistry`] and hides both.
//!
//! Reads never fail: `range` clamps to what is currently retained so a
//! viewer polling concurrently with eviction simply gets a shorter result.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entry::{LogEntry, LogLevel};
use crate::error::ConfigError;
use crate::listener::{ListenerId, ListenerRegistry, LogChangeListener, NotifyReport};
use crate::ring::{Iter, Retention, RingStore, Strong};

/// Capacity used by the log window when nothing else is configured
pub const DEFAULT_CAPACITY: usize = 100;

/// Configuration for a [`LogSource`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSourceConfig {
    /// Maximum number of retained entries
    pub capacity: usize,
}

impl Default for LogSourceConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl LogSourceConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Bounded, thread-safe store of log entries with weakly held listeners
///
/// `R` picks whether the store owns its entries ([`Strong`], the default) or
/// only references entries owned elsewhere ([`Weak`](crate::ring::Weak)).
#[derive(Debug)]
pub struct LogSource<R: Retention = Strong> {
    messages: RingStore<LogEntry, R>,
    listeners: ListenerRegistry,
}

impl<R: Retention> LogSource<R> {
    /// Create a source retaining at most `capacity` entries
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            messages: RingStore::new(capacity)?,
            listeners: ListenerRegistry::new(),
        })
    }

    pub fn from_config(config: &LogSourceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.capacity)
    }

    /// Record a new entry and notify listeners
    ///
    /// Listeners run after the store lock is released, on the calling
    /// thread. Under weak retention the returned entry is what keeps the
    /// record alive.
    pub fn append(&self, level: LogLevel, message: impl Into<String>) -> Arc<LogEntry> {
        let entry = Arc::new(LogEntry::new(level, message));
        self.messages.add(Arc::clone(&entry));
        self.listeners.notify_all();
        entry
    }

    /// Store an already built entry and notify listeners
    pub fn append_entry(&self, entry: Arc<LogEntry>) -> NotifyReport {
        self.messages.add(entry);
        self.listeners.notify_all()
    }

    /// Up to `count` entries starting at logical index `start_from`
    ///
    /// Returns an empty vector when `start_from` is past the retained
    /// entries. Reclaimed entries are left out.
    pub fn range(&self, start_from: usize, count: usize) -> Vec<Arc<LogEntry>> {
        let size = self.messages.size();
        if start_from >= size {
            return Vec::new();
        }

        let to = start_from.saturating_add(count).min(size);

        // Another writer can't shrink the store, so this range stays valid
        match self.messages.get_range(start_from, to) {
            Ok(entries) => entries.into_iter().flatten().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Every retained entry, oldest first
    ///
    /// Taken under a single read lock, so the order holds even while other
    /// threads keep appending.
    pub fn all(&self) -> Vec<Arc<LogEntry>> {
        self.messages.snapshot().into_iter().flatten().collect()
    }

    /// Lazily walk the retained entries, oldest first
    ///
    /// The walk does not hold the lock between steps; an entry appended
    /// meanwhile can replace one not yet visited. Use [`all`](Self::all)
    /// when a consistent view matters.
    pub fn iter(&self) -> Iter<'_, LogEntry, R> {
        self.messages.iter()
    }

    pub fn size(&self) -> usize {
        self.messages.size()
    }

    pub fn capacity(&self) -> usize {
        self.messages.capacity()
    }

    pub fn register_listener<L: LogChangeListener + 'static>(&self, listener: &Arc<L>) -> ListenerId {
        self.listeners.register(listener)
    }

    pub fn unregister_listener<L: LogChangeListener>(&self, listener: &Arc<L>) -> bool {
        self.listeners.unregister(listener)
    }

    pub fn unregister_listener_id(&self, id: ListenerId) -> bool {
        self.listeners.unregister_id(id)
    }

    /// Registered listener handles, including dropped ones not yet purged
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Forget listeners that have been dropped; returns how many went
    pub fn purge_listeners(&self) -> usize {
        self.listeners.purge()
    }
}
