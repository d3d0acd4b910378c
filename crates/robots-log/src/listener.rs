//! Listener registration and change notification
//!
//! The registry holds listeners through `Weak` handles only: registering an
//! observer never extends its lifetime. Handles whose observer has been
//! dropped are skipped during notification and purged afterwards, so an
//! observer does not have to unregister before it goes away.
//!
//! Fan-out walks an immutable snapshot of the membership. The snapshot is
//! cleared on every membership change and rebuilt by the next notification
//! under the membership lock, so the hot path (`notify_all` with unchanged
//! membership) takes no lock at all.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// Something interested in new log entries
///
/// Called synchronously on the appending thread. Implementations that do
/// real work (redrawing, I/O) should hand it off to another thread or task.
pub trait LogChangeListener: Send + Sync {
    fn on_log_changed(&self);
}

impl<F> LogChangeListener for F
where
    F: Fn() + Send + Sync,
{
    fn on_log_changed(&self) {
        self()
    }
}

/// Token identifying a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Outcome of a single notification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Listeners that handled the notification
    pub delivered: usize,
    /// Handles whose listener had already been dropped
    pub skipped: usize,
    /// Listeners that panicked
    pub failed: usize,
}

#[derive(Clone)]
struct Member {
    id: ListenerId,
    handle: Weak<dyn LogChangeListener>,
}

impl Member {
    fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }

    fn refers_to<L: LogChangeListener>(&self, listener: &Arc<L>) -> bool {
        std::ptr::addr_eq(self.handle.as_ptr(), Arc::as_ptr(listener))
    }
}

#[derive(Default)]
struct Membership {
    members: Vec<Member>,
    next_id: u64,
}

/// Set of weakly held listeners with a cached notification snapshot
///
/// Registering the same listener twice is deduplicated: the second call
/// returns the id of the first registration.
#[derive(Default)]
pub struct ListenerRegistry {
    membership: Mutex<Membership>,
    snapshot: ArcSwapOption<Vec<Member>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener without taking ownership of it
    pub fn register<L: LogChangeListener + 'static>(&self, listener: &Arc<L>) -> ListenerId {
        let (id, listeners) = {
            let mut membership = self.membership.lock();

            if let Some(existing) = membership.members.iter().find(|m| m.refers_to(listener)) {
                return existing.id;
            }

            membership.members.retain(Member::is_alive);

            let id = ListenerId(membership.next_id);
            membership.next_id += 1;

            let weak: Weak<L> = Arc::downgrade(listener);
            let handle: Weak<dyn LogChangeListener> = weak;
            membership.members.push(Member { id, handle });
            self.snapshot.store(None);

            (id, membership.members.len())
        };

        // Logged after unlocking: the event may be bridged back into a
        // source whose notification needs this lock
        debug!(listener_id = %id, listeners, "Listener registered");
        id
    }

    /// Remove a listener; returns `false` if it was not registered
    pub fn unregister<L: LogChangeListener>(&self, listener: &Arc<L>) -> bool {
        self.remove_where(|m| m.refers_to(listener))
    }

    /// Remove a registration by its id; returns `false` if it is unknown
    pub fn unregister_id(&self, id: ListenerId) -> bool {
        self.remove_where(|m| m.id == id)
    }

    fn remove_where(&self, predicate: impl Fn(&Member) -> bool) -> bool {
        let (removed, listeners) = {
            let mut membership = self.membership.lock();
            let Some(position) = membership.members.iter().position(predicate) else {
                return false;
            };

            let removed = membership.members.remove(position);
            self.snapshot.store(None);
            (removed, membership.members.len())
        };

        debug!(listener_id = %removed.id, listeners, "Listener unregistered");
        true
    }

    /// Notify every listener that is still alive
    ///
    /// A panicking listener is logged and counted; the remaining listeners
    /// are still notified and the panic does not reach the caller.
    pub fn notify_all(&self) -> NotifyReport {
        let snapshot = self.snapshot();
        let mut report = NotifyReport::default();

        for member in snapshot.iter() {
            let Some(listener) = member.handle.upgrade() else {
                report.skipped += 1;
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_log_changed())) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    report.failed += 1;
                    warn!(listener_id = %member.id, "Log listener panicked during notification");
                }
            }
        }

        if report.skipped > 0 {
            self.purge();
        }

        report
    }

    /// Drop handles whose listener no longer exists; returns how many went
    pub fn purge(&self) -> usize {
        let (removed, remaining) = {
            let mut membership = self.membership.lock();
            let before = membership.members.len();
            membership.members.retain(Member::is_alive);
            let remaining = membership.members.len();

            if remaining < before {
                self.snapshot.store(None);
            }
            (before - remaining, remaining)
        };

        if removed > 0 {
            trace!(removed, remaining, "Purged dropped listeners");
        }
        removed
    }

    /// Registered handles, including dropped ones not yet purged
    pub fn len(&self) -> usize {
        self.membership.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Arc<Vec<Member>> {
        if let Some(snapshot) = self.snapshot.load_full() {
            return snapshot;
        }

        let mut membership = self.membership.lock();

        // Another notifier may have rebuilt it while we waited for the lock
        if let Some(snapshot) = self.snapshot.load_full() {
            return snapshot;
        }

        membership.members.retain(Member::is_alive);
        let snapshot = Arc::new(membership.members.clone());
        self.snapshot.store(Some(Arc::clone(&snapshot)));
        snapshot
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .field("snapshot_cached", &self.snapshot.load().is_some())
            .finish()
    }
}
