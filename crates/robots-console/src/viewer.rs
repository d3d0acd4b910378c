//! Live console view of a log source
//!
//! The listener callback runs on whichever thread appended, so it only
//! signals a [`Notify`]. The render task wakes up, works out which entries
//! it has not printed yet and writes them out.

use std::io::{self, Write};
use std::sync::Arc;

use robots_log::{LogChangeListener, LogEntry, LogSource};
use tokio::sync::{Notify, oneshot};
use tracing::debug;

/// Remembers the last printed entry so each wake-up prints only new ones
#[derive(Debug, Default)]
pub struct LogCursor {
    last: Option<Arc<LogEntry>>,
}

impl LogCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries appended since the previous call
    ///
    /// If the last printed entry was evicted in between, everything still
    /// retained is returned; the evicted ones in the gap are lost to this
    /// view.
    pub fn advance(&mut self, source: &LogSource) -> Vec<Arc<LogEntry>> {
        let mut entries = source.all();

        if let Some(last) = &self.last {
            match entries.iter().rposition(|e| Arc::ptr_eq(e, last)) {
                Some(pos) => {
                    entries.drain(..=pos);
                }
                None => debug!(retained = entries.len(), "Viewer cursor evicted, re-anchoring"),
            }
        }

        if let Some(newest) = entries.last() {
            self.last = Some(Arc::clone(newest));
        }
        entries
    }
}

/// Prints entries as they arrive
#[derive(Debug, Default)]
pub struct LogViewer {
    changed: Notify,
}

impl LogChangeListener for LogViewer {
    fn on_log_changed(&self) {
        // A stored permit coalesces bursts into one wake-up
        self.changed.notify_one();
    }
}

impl LogViewer {
    /// Create a viewer and register it with `source`
    pub fn attach(source: &LogSource) -> Arc<Self> {
        let viewer = Arc::new(Self::default());
        let id = source.register_listener(&viewer);
        debug!(%id, "Log viewer attached");
        viewer
    }

    /// Print new entries until `shutdown` fires; returns how many were printed
    ///
    /// Entries appended before shutdown are always printed.
    pub async fn run<W: Write>(
        &self,
        source: &LogSource,
        out: &mut W,
        mut shutdown: oneshot::Receiver<()>,
    ) -> io::Result<usize> {
        let mut cursor = LogCursor::new();
        let mut printed = render(&mut cursor, source, out)?;

        loop {
            tokio::select! {
                _ = self.changed.notified() => {
                    printed += render(&mut cursor, source, out)?;
                }
                _ = &mut shutdown => {
                    printed += render(&mut cursor, source, out)?;
                    break;
                }
            }
        }

        out.flush()?;
        Ok(printed)
    }
}

fn render<W: Write>(cursor: &mut LogCursor, source: &LogSource, out: &mut W) -> io::Result<usize> {
    let fresh = cursor.advance(source);
    for entry in &fresh {
        writeln!(out, "{entry}")?;
    }
    Ok(fresh.len())
}
