//! Fixed-capacity circular storage
//!
//! [`RingStore`] keeps at most `capacity` elements. Adding to a full store
//! overwrites the oldest element, so `add` is O(1) and memory stays bounded
//! no matter how many elements pass through.
//!
//! Logical index `0` is always the oldest retained element and maps to the
//! physical slot `(start + i) % capacity`.
//!
//! How a slot holds its element is chosen by a [`Retention`] policy:
//!
//! - [`Strong`]: the slot owns an `Arc<T>`; elements live until evicted.
//! - [`Weak`]: the slot holds a `std::sync::Weak<T>`; the store never keeps
//!   an element alive, and a reclaimed element reads back as `None`.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ConfigError, RangeError};

/// How a ring slot references its element
pub trait Retention: Send + Sync + 'static {
    /// What a slot physically stores
    type Slot<T>;

    /// Turn an added element into its slot representation
    fn hold<T>(element: Arc<T>) -> Self::Slot<T>;

    /// Resolve a slot back into the element, if it is still alive
    fn resolve<T>(slot: &Self::Slot<T>) -> Option<Arc<T>>;
}

/// Slots own their element
#[derive(Debug, Clone, Copy, Default)]
pub struct Strong;

impl Retention for Strong {
    type Slot<T> = Arc<T>;

    fn hold<T>(element: Arc<T>) -> Arc<T> {
        element
    }

    fn resolve<T>(slot: &Arc<T>) -> Option<Arc<T>> {
        Some(Arc::clone(slot))
    }
}

/// Slots hold a non-owning reference to their element
#[derive(Debug, Clone, Copy, Default)]
pub struct Weak;

impl Retention for Weak {
    type Slot<T> = std::sync::Weak<T>;

    fn hold<T>(element: Arc<T>) -> std::sync::Weak<T> {
        Arc::downgrade(&element)
    }

    fn resolve<T>(slot: &std::sync::Weak<T>) -> Option<Arc<T>> {
        slot.upgrade()
    }
}

struct RingState<S> {
    slots: Vec<Option<S>>,
    start: usize,
    size: usize,
}

/// Thread-safe fixed-capacity circular store
///
/// A single reader/writer lock guards the slots together with `start` and
/// `size`, so every `add` is atomic with respect to readers.
pub struct RingStore<T, R: Retention = Strong> {
    capacity: usize,
    state: RwLock<RingState<R::Slot<T>>>,
    _retention: PhantomData<R>,
}

impl<T, R: Retention> RingStore<T, R> {
    /// Create an empty store
    ///
    /// Fails with [`ConfigError::ZeroCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Ok(Self {
            capacity,
            state: RwLock::new(RingState {
                slots,
                start: 0,
                size: 0,
            }),
            _retention: PhantomData,
        })
    }

    /// Append an element at the logical tail, evicting the oldest when full
    pub fn add(&self, element: Arc<T>) {
        let slot = R::hold(element);

        let evicted = {
            let mut state = self.state.write();
            let index = (state.start + state.size) % self.capacity;
            let evicted = state.slots[index].replace(slot);

            if state.size < self.capacity {
                state.size += 1;
            } else {
                state.start = (state.start + 1) % self.capacity;
            }

            evicted
        };

        // Evicted element is dropped after the lock is released
        drop(evicted);
    }

    /// Elements at logical indices `[from, to)`, oldest first
    ///
    /// Under [`Weak`] retention a reclaimed element shows up as `None` in
    /// its position; callers must tolerate holes.
    pub fn get_range(&self, from: usize, to: usize) -> Result<Vec<Option<Arc<T>>>, RangeError> {
        let state = self.state.read();

        if from > to || to > state.size {
            return Err(RangeError::OutOfBounds {
                from,
                to,
                size: state.size,
            });
        }

        Ok((from..to)
            .map(|i| {
                let index = (state.start + i) % self.capacity;
                state.slots[index].as_ref().and_then(R::resolve)
            })
            .collect())
    }

    /// Element at logical index `index`, if present and still alive
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        let state = self.state.read();
        if index >= state.size {
            return None;
        }
        let physical = (state.start + index) % self.capacity;
        state.slots[physical].as_ref().and_then(R::resolve)
    }

    /// Every retained element, oldest first, read under one lock
    ///
    /// Unlike [`iter`](Self::iter), the result always reflects a single
    /// state of the store: concurrent adds land entirely before or after it.
    pub fn snapshot(&self) -> Vec<Option<Arc<T>>> {
        let state = self.state.read();
        (0..state.size)
            .map(|i| {
                let index = (state.start + i) % self.capacity;
                state.slots[index].as_ref().and_then(R::resolve)
            })
            .collect()
    }

    /// Number of retained elements
    pub fn size(&self) -> usize {
        self.state.read().size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_full(&self) -> bool {
        self.size() == self.capacity
    }

    /// Iterate oldest to newest
    ///
    /// The bounds are fixed when the iterator is created. Each step takes the
    /// read lock only for the slot it reads, so writers are never blocked for
    /// the whole walk; an element added or evicted mid-walk may be observed.
    pub fn iter(&self) -> Iter<'_, T, R> {
        let (start, len) = {
            let state = self.state.read();
            (state.start, state.size)
        };

        Iter {
            store: self,
            start,
            len,
            index: 0,
        }
    }
}

impl<T, R: Retention> fmt::Debug for RingStore<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingStore")
            .field("capacity", &self.capacity)
            .field("size", &self.size())
            .finish()
    }
}

impl<'a, T, R: Retention> IntoIterator for &'a RingStore<T, R> {
    type Item = Option<Arc<T>>;
    type IntoIter = Iter<'a, T, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over a [`RingStore`]
pub struct Iter<'a, T, R: Retention> {
    store: &'a RingStore<T, R>,
    start: usize,
    len: usize,
    index: usize,
}

impl<T, R: Retention> Iterator for Iter<'_, T, R> {
    type Item = Option<Arc<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }

        let physical = (self.start + self.index) % self.store.capacity;
        self.index += 1;

        let state = self.store.state.read();
        Some(state.slots[physical].as_ref().and_then(R::resolve))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl<T, R: Retention> ExactSizeIterator for Iter<'_, T, R> {}

impl<T, R: Retention> FusedIterator for Iter<'_, T, R> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(items: Vec<Option<Arc<T>>>) -> Vec<T> {
        items.into_iter().map(|item| *item.unwrap()).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result: Result<RingStore<u32>, _> = RingStore::new(0);
        assert_eq!(result.unwrap_err(), ConfigError::ZeroCapacity);
    }

    #[test]
    fn test_add_until_full() {
        let ring: RingStore<u32> = RingStore::new(3).unwrap();
        assert!(ring.is_empty());

        ring.add(Arc::new(1));
        ring.add(Arc::new(2));
        assert_eq!(ring.size(), 2);
        assert!(!ring.is_full());

        ring.add(Arc::new(3));
        assert!(ring.is_full());
        assert_eq!(values(ring.get_range(0, 3).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn test_eviction_wraps_around() {
        let ring: RingStore<u32> = RingStore::new(3).unwrap();
        for i in 1..=7 {
            ring.add(Arc::new(i));
        }

        assert_eq!(ring.size(), 3);
        assert_eq!(values(ring.get_range(0, 3).unwrap()), vec![5, 6, 7]);
        assert_eq!(*ring.get(0).unwrap(), 5);
        assert_eq!(*ring.get(2).unwrap(), 7);
        assert!(ring.get(3).is_none());
    }

    #[test]
    fn test_capacity_one() {
        let ring: RingStore<&str> = RingStore::new(1).unwrap();
        ring.add(Arc::new("a"));
        ring.add(Arc::new("b"));

        assert_eq!(ring.size(), 1);
        assert_eq!(values(ring.get_range(0, 1).unwrap()), vec!["b"]);
    }

    #[test]
    fn test_get_range_bounds() {
        let ring: RingStore<u32> = RingStore::new(4).unwrap();
        ring.add(Arc::new(10));
        ring.add(Arc::new(20));

        assert!(ring.get_range(1, 1).unwrap().is_empty());
        assert!(ring.get_range(2, 2).unwrap().is_empty());
        assert_eq!(values(ring.get_range(1, 2).unwrap()), vec![20]);

        assert_eq!(
            ring.get_range(0, 3).unwrap_err(),
            RangeError::OutOfBounds { from: 0, to: 3, size: 2 }
        );
        assert!(ring.get_range(2, 1).is_err());
    }

    #[test]
    fn test_evicted_element_is_released() {
        let ring: RingStore<String> = RingStore::new(2).unwrap();
        let first = Arc::new("first".to_string());

        ring.add(Arc::clone(&first));
        assert_eq!(Arc::strong_count(&first), 2);

        ring.add(Arc::new("second".to_string()));
        ring.add(Arc::new("third".to_string()));
        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn test_iter_oldest_to_newest() {
        let ring: RingStore<u32> = RingStore::new(4).unwrap();
        for i in 0..6 {
            ring.add(Arc::new(i));
        }

        let iter = ring.iter();
        assert_eq!(iter.len(), 4);
        let collected: Vec<u32> = iter.map(|item| *item.unwrap()).collect();
        assert_eq!(collected, vec![2, 3, 4, 5]);

        let via_ref: Vec<u32> = (&ring).into_iter().flatten().map(|v| *v).collect();
        assert_eq!(via_ref, collected);
    }

    #[test]
    fn test_iter_bounds_fixed_at_creation() {
        let ring: RingStore<u32> = RingStore::new(8).unwrap();
        ring.add(Arc::new(1));
        ring.add(Arc::new(2));

        let mut iter = ring.iter();
        ring.add(Arc::new(3));

        assert_eq!(iter.next().flatten().map(|v| *v), Some(1));
        assert_eq!(iter.next().flatten().map(|v| *v), Some(2));
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_snapshot_matches_logical_order() {
        let ring: RingStore<u32> = RingStore::new(3).unwrap();
        assert!(ring.snapshot().is_empty());

        for i in 1..=5 {
            ring.add(Arc::new(i));
        }
        assert_eq!(values(ring.snapshot()), vec![3, 4, 5]);
    }

    #[test]
    fn test_weak_retention_does_not_keep_elements_alive() {
        let ring: RingStore<String, Weak> = RingStore::new(3).unwrap();

        let kept = Arc::new("kept".to_string());
        ring.add(Arc::clone(&kept));
        ring.add(Arc::new("dropped".to_string()));
        ring.add(Arc::clone(&kept));

        assert_eq!(ring.size(), 3);
        assert_eq!(Arc::strong_count(&kept), 1);

        let range = ring.get_range(0, 3).unwrap();
        assert_eq!(range[0].as_deref().map(String::as_str), Some("kept"));
        assert!(range[1].is_none());
        assert_eq!(range[2].as_deref().map(String::as_str), Some("kept"));

        let holes = ring.iter().filter(Option::is_none).count();
        assert_eq!(holes, 1);
    }

    #[test]
    fn test_weak_hole_after_owner_drops() {
        let ring: RingStore<u64, Weak> = RingStore::new(2).unwrap();
        let owner = Arc::new(42);
        ring.add(Arc::clone(&owner));

        assert_eq!(ring.get(0).map(|v| *v), Some(42));
        drop(owner);
        assert!(ring.get(0).is_none());
        assert_eq!(ring.size(), 1);
    }
}
