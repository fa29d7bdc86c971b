//! Bounded concurrent LRU cache with buffered recency and batched drains.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────────┐
//!   │                             Cache<K, V>                               │
//!   │                                                                       │
//!   │   segment table (key-hash sharded)                                    │
//!   │   ┌──────────────────────────┐  ┌──────────────────────────┐          │
//!   │   │ Segment 0                │  │ Segment 1           ...  │          │
//!   │   │  RwLock<FxHashMap<K,     │  │                          │          │
//!   │   │    Arc<Entry<K, V>>>>    │  │                          │          │
//!   │   │  EventBuffer (bounded)   │  │  EventBuffer (bounded)   │          │
//!   │   └───────────┬──────────────┘  └───────────┬──────────────┘          │
//!   │               │ buffered Access/Write/Removal events                  │
//!   │               ▼                             ▼                         │
//!   │   ┌───────────────────────────────────────────────────────────────┐   │
//!   │   │ Mutex<RecencyList<Arc<Entry>>>      (the eviction deque)      │   │
//!   │   │                                                               │   │
//!   │   │   head ──► [k3] ◄──► [k1] ◄──► [k7] ◄── tail                  │   │
//!   │   │   (LRU, evicted first)                 (MRU)                  │   │
//!   │   └───────────────────────────────────────────────────────────────┘   │
//!   └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `get` is served entirely from its segment (read lock only) and appends
//! an access event to that segment's buffer; it never touches the recency
//! list. Writes insert under the segment's write lock and buffer write and
//! removal events. Whenever a buffer fills, or on a fraction of operations,
//! the calling thread tries to become the drainer: a non-blocking
//! `try_lock` on the recency list, replay of all pending events from every
//! segment, then eviction from the head down to the capacity bound. If the
//! lock is contended the thread just moves on; its events stay buffered for
//! whoever drains next.
//!
//! ## Contention profile
//!
//! | Operation   | Locks touched                               |
//! |-------------|---------------------------------------------|
//! | `get`       | segment read lock                           |
//! | `put`       | segment write lock (+ try-lock drain)       |
//! | `remove`    | segment write lock (+ try-lock drain)       |
//! | `len`       | segment read locks                          |
//! | drain       | eviction mutex, then segment write locks    |
//!
//! Lock order is fixed (eviction mutex before segment locks; operation
//! paths release their segment lock before recording events), so the forced
//! drain on buffer overflow cannot deadlock.
//!
//! ## Capacity
//!
//! `maximum_capacity` is enforced at the end of every drain, never
//! continuously: `len()` may transiently exceed the bound between drains,
//! and is exact with respect to the segment table at all times. Access
//! events may be dropped under buffer pressure (recency precision loss);
//! write and removal events are never dropped — a full buffer forces a
//! blocking drain instead.
//!
//! Values are stored as `Arc<V>`, so a `get` either returns a fully
//! constructed value or nothing; eviction can never tear a value a caller
//! still holds.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHasher;

use crate::ds::RecencyList;
use crate::entry::{Entry, Lifecycle, RecencyEvent};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetrics, MetricsSnapshot};
use crate::segment::Segment;

/// Reads between opportunistic drain attempts. Tuning constant; correctness
/// only requires that drains happen eventually.
pub(crate) const READ_DRAIN_THRESHOLD: usize = 64;

struct Inner<K, V> {
    segments: Box<[Segment<K, V>]>,
    segment_mask: usize,
    list: Mutex<RecencyList<Arc<Entry<K, V>>>>,
    maximum_capacity: usize,
    read_ops: AtomicUsize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone,
{
    fn segment(&self, key: &K) -> &Segment<K, V> {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        let idx = (hasher.finish() as usize) & self.segment_mask;
        &self.segments[idx]
    }
}

/// Bounded concurrent cache with strict LRU eviction.
///
/// Cheap to clone: clones share the same underlying cache. Construct via
/// [`CacheBuilder`](crate::builder::CacheBuilder).
///
/// # Example
///
/// ```
/// use memocache::builder::CacheBuilder;
///
/// let cache = CacheBuilder::new()
///     .maximum_capacity(2)
///     .build::<u64, String>();
///
/// cache.put(1, "first".to_string());
/// cache.put(2, "second".to_string());
/// cache.put(3, "third".to_string());
/// cache.drain_buffers();
///
/// // Key 1 was least recently used and has been evicted.
/// assert!(cache.get(&1).is_none());
/// assert_eq!(cache.len(), 2);
/// ```
pub struct Cache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    /// Makes a handle to the same shared cache.
    fn clone(&self) -> Self {
        Cache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("segments", &self.segment_count())
            .finish_non_exhaustive()
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Wires the segments, buffers, and recency list together. Called by the
    /// builder after validation; `segment_count` must be a power of two.
    pub(crate) fn with_settings(
        maximum_capacity: usize,
        segment_count: usize,
        buffer_size: usize,
    ) -> Self {
        debug_assert!(segment_count.is_power_of_two());
        let segments: Box<[Segment<K, V>]> = (0..segment_count)
            .map(|_| Segment::new(buffer_size))
            .collect();
        Cache {
            inner: Arc::new(Inner {
                segments,
                segment_mask: segment_count - 1,
                list: Mutex::new(RecencyList::with_capacity(maximum_capacity)),
                maximum_capacity,
                read_ops: AtomicUsize::new(0),
                #[cfg(feature = "metrics")]
                metrics: CacheMetrics::default(),
            }),
        }
    }

    /// Looks up a value, marking the entry as recently used.
    ///
    /// Never blocks on the eviction lock: the recency bump is buffered and
    /// applied by a later drain.
    ///
    /// # Example
    ///
    /// ```
    /// use memocache::builder::CacheBuilder;
    ///
    /// let cache = CacheBuilder::new().maximum_capacity(10).build::<u64, String>();
    /// cache.put(1, "codec".to_string());
    ///
    /// assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("codec"));
    /// assert!(cache.get(&999).is_none());
    /// ```
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let segment = self.inner.segment(key);
        match segment.get(key) {
            Some(entry) => {
                let value = entry.value();
                #[cfg(feature = "metrics")]
                self.inner.metrics.record_hit();
                self.after_read(segment, entry);
                Some(value)
            },
            None => {
                #[cfg(feature = "metrics")]
                self.inner.metrics.record_miss();
                self.read_tick();
                None
            },
        }
    }

    /// Inserts or replaces a value, returning the previous one if present.
    ///
    /// Replacement retires the old entry; the new entry is linked at the
    /// most-recently-used end by the next drain. May trigger a drain (and
    /// therefore evictions) on the calling thread.
    ///
    /// # Example
    ///
    /// ```
    /// use memocache::builder::CacheBuilder;
    ///
    /// let cache = CacheBuilder::new().maximum_capacity(10).build::<u64, u32>();
    /// assert!(cache.put(1, 10).is_none());
    /// assert_eq!(cache.put(1, 11).as_deref(), Some(&10));
    /// assert_eq!(cache.get(&1).as_deref(), Some(&11));
    /// ```
    pub fn put(&self, key: K, value: V) -> Option<Arc<V>> {
        self.put_arc(key, Arc::new(value))
    }

    /// Inserts a pre-wrapped `Arc<V>` directly (zero-copy variant of
    /// [`put`](Cache::put)).
    pub fn put_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        let segment = self.inner.segment(&key);
        let (entry, previous) = segment.insert(key, value);
        let old_value = previous.as_ref().map(|prev| prev.value());

        #[cfg(feature = "metrics")]
        {
            if previous.is_some() {
                self.inner.metrics.record_update();
            } else {
                self.inner.metrics.record_insert();
            }
        }

        if let Some(prev) = previous {
            self.record_write(segment, RecencyEvent::Removal(prev));
        }
        self.record_write(segment, RecencyEvent::Write(entry));
        self.try_drain();
        old_value
    }

    /// Inserts only if the key is absent; returns the existing value
    /// otherwise.
    ///
    /// The race for a key is decided under the segment lock, so only the
    /// winning thread's value is ever stored. The losing path counts as an
    /// access on the existing entry.
    ///
    /// # Example
    ///
    /// ```
    /// use memocache::builder::CacheBuilder;
    ///
    /// let cache = CacheBuilder::new().maximum_capacity(10).build::<u64, u32>();
    /// assert!(cache.put_if_absent(1, 10).is_none());
    /// assert_eq!(cache.put_if_absent(1, 11).as_deref(), Some(&10));
    /// assert_eq!(cache.get(&1).as_deref(), Some(&10));
    /// ```
    pub fn put_if_absent(&self, key: K, value: V) -> Option<Arc<V>> {
        let segment = self.inner.segment(&key);
        match segment.insert_if_absent(key, Arc::new(value)) {
            Ok(entry) => {
                #[cfg(feature = "metrics")]
                self.inner.metrics.record_insert();
                self.record_write(segment, RecencyEvent::Write(entry));
                self.try_drain();
                None
            },
            Err(existing) => {
                let value = existing.value();
                #[cfg(feature = "metrics")]
                self.inner.metrics.record_hit();
                self.after_read(segment, existing);
                Some(value)
            },
        }
    }

    /// Removes a key, returning its value if present.
    ///
    /// The key stops being visible before this returns; the entry's unlink
    /// from the recency order is completed by a later drain.
    ///
    /// # Example
    ///
    /// ```
    /// use memocache::builder::CacheBuilder;
    ///
    /// let cache = CacheBuilder::new().maximum_capacity(10).build::<u64, u32>();
    /// cache.put(1, 10);
    ///
    /// assert_eq!(cache.remove(&1).as_deref(), Some(&10));
    /// assert!(cache.get(&1).is_none());
    /// assert!(cache.remove(&1).is_none());
    /// ```
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let segment = self.inner.segment(key);
        let entry = segment.remove(key)?;
        let value = entry.value();
        #[cfg(feature = "metrics")]
        self.inner.metrics.record_removal();
        self.record_write(segment, RecencyEvent::Removal(entry));
        self.try_drain();
        Some(value)
    }

    /// Returns `true` if the key is present. Read-only; no recency effect.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.segment(key).contains(key)
    }

    /// Returns the current number of entries.
    ///
    /// Always consistent with the segment table; may transiently exceed
    /// [`capacity`](Cache::capacity) until the next drain.
    pub fn len(&self) -> usize {
        self.inner.segments.iter().map(Segment::len).sum()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured maximum capacity.
    pub fn capacity(&self) -> usize {
        self.inner.maximum_capacity
    }

    /// Returns the number of segments (shards).
    pub fn segment_count(&self) -> usize {
        self.inner.segments.len()
    }

    /// Removes every entry, blocking on the eviction lock.
    ///
    /// Pending events are replayed first so no entry escapes through a
    /// buffer; entries inserted concurrently with `clear` may survive.
    pub fn clear(&self) {
        let mut list = self.inner.list.lock();
        self.drain_events(&mut list);
        while let Some(entry) = list.pop_head() {
            entry.clear_node();
            if entry.retire() {
                self.inner
                    .segment(entry.key())
                    .remove_if_same(entry.key(), &entry);
            }
            entry.kill();
        }
    }

    /// Forces an immediate, blocking drain of every segment's buffer.
    ///
    /// After this returns, recency order reflects every operation that
    /// completed before the call and `len() <= capacity()`. Primarily a
    /// test/diagnostic hook; ordinary operation drains opportunistically.
    pub fn drain_buffers(&self) {
        let mut list = self.inner.list.lock();
        self.drain_locked(&mut list);
    }

    /// Drains, then verifies the recency list and segment table agree.
    ///
    /// Diagnostic only; meaningful when no other thread is mutating the
    /// cache concurrently.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut list = self.inner.list.lock();
        self.drain_locked(&mut list);
        #[cfg(any(test, debug_assertions))]
        list.debug_validate_invariants();

        let table_len: usize = self.inner.segments.iter().map(Segment::len).sum();
        if list.len() != table_len {
            return Err(InvariantError::new(format!(
                "recency list holds {} entries but segments hold {}",
                list.len(),
                table_len
            )));
        }
        if list.len() > self.inner.maximum_capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed maximum capacity {}",
                list.len(),
                self.inner.maximum_capacity
            )));
        }
        for entry in list.iter() {
            if !entry.is_alive() {
                return Err(InvariantError::new(
                    "recency list contains a retired or dead entry",
                ));
            }
        }
        Ok(())
    }

    /// Returns a point-in-time snapshot of the cache's counters.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    // -- recording ---------------------------------------------------------

    /// Buffers an access event; drops it (recency precision loss only) if
    /// the buffer is full, nudging the drainer instead.
    fn after_read(&self, segment: &Segment<K, V>, entry: Arc<Entry<K, V>>) {
        if segment
            .buffer()
            .try_record(RecencyEvent::Access(entry))
            .is_err()
        {
            #[cfg(feature = "metrics")]
            self.inner.metrics.record_dropped_access();
            self.try_drain();
        } else {
            self.read_tick();
        }
    }

    /// Buffers a write-class event, forcing a blocking drain on overflow so
    /// the event is never lost.
    fn record_write(&self, segment: &Segment<K, V>, event: RecencyEvent<K, V>) {
        debug_assert!(!event.is_lossy());
        let mut event = event;
        loop {
            match segment.buffer().try_record(event) {
                Ok(()) => return,
                Err(pending) => {
                    self.drain_buffers();
                    event = pending;
                },
            }
        }
    }

    fn read_tick(&self) {
        let ticks = self.inner.read_ops.fetch_add(1, Ordering::Relaxed);
        if ticks % READ_DRAIN_THRESHOLD == READ_DRAIN_THRESHOLD - 1 {
            self.try_drain();
        }
    }

    // -- draining ----------------------------------------------------------

    /// Opportunistic drain: try the eviction lock, walk away on contention.
    /// The caller's events are already buffered, so correctness only needs
    /// some later drain to observe them.
    fn try_drain(&self) {
        if let Some(mut list) = self.inner.list.try_lock() {
            self.drain_locked(&mut list);
        }
    }

    fn drain_locked(&self, list: &mut RecencyList<Arc<Entry<K, V>>>) {
        self.drain_events(list);
        self.evict(list);
        #[cfg(feature = "metrics")]
        self.inner.metrics.record_drain();
    }

    fn drain_events(&self, list: &mut RecencyList<Arc<Entry<K, V>>>) {
        for segment in self.inner.segments.iter() {
            while let Some(event) = segment.buffer().pop() {
                self.apply_event(list, event);
            }
        }
    }

    fn apply_event(
        &self,
        list: &mut RecencyList<Arc<Entry<K, V>>>,
        event: RecencyEvent<K, V>,
    ) {
        match event {
            RecencyEvent::Access(entry) => {
                if entry.is_alive() {
                    if let Some(id) = entry.node_id() {
                        list.move_to_tail(id);
                    }
                }
            },
            RecencyEvent::Write(entry) => match entry.lifecycle() {
                Lifecycle::Alive => match entry.node_id() {
                    None => {
                        let id = list.push_tail(Arc::clone(&entry));
                        entry.set_node(id);
                    },
                    Some(id) => {
                        list.move_to_tail(id);
                    },
                },
                // Retired between the insert and this drain; the matching
                // removal event finishes the transition.
                Lifecycle::Retired | Lifecycle::Dead => {},
            },
            RecencyEvent::Removal(entry) => {
                if let Some(id) = entry.node_id() {
                    list.unlink(id);
                    entry.clear_node();
                }
                entry.kill();
            },
        }
    }

    /// Evicts from the LRU end until the capacity bound holds again. The
    /// only place entries are evicted.
    fn evict(&self, list: &mut RecencyList<Arc<Entry<K, V>>>) {
        while list.len() > self.inner.maximum_capacity {
            let entry = match list.pop_head() {
                Some(entry) => entry,
                None => break,
            };
            entry.clear_node();
            if entry.retire() {
                self.inner
                    .segment(entry.key())
                    .remove_if_same(entry.key(), &entry);
                #[cfg(feature = "metrics")]
                self.inner.metrics.record_eviction();
            }
            entry.kill();
        }
    }
}
