//! Cache entries and the buffered events that describe them.
//!
//! An [`Entry`] is shared as `Arc<Entry<K, V>>` between the segment table,
//! the recency list, and any in-flight buffered events. Two atomics make
//! that sharing safe without a global lock:
//!
//! - a lifecycle tag: `Alive` (reachable from the table), `Retired` (removed
//!   from the table, still awaiting unlink from the recency list), `Dead`
//!   (fully unlinked). Retirement is a one-way CAS, so exactly one thread
//!   owns each entry's removal.
//! - the recency-list handle, written only by the drainer while it holds the
//!   eviction lock. A cleared handle means "not linked", which lets stale
//!   buffered events be recognized and skipped.
//!
//! Replacing a key's value creates a new entry and retires the old one;
//! values themselves are immutable once cached, so a reader either sees a
//! fully constructed value or nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::ds::NodeId;

const STATE_ALIVE: u8 = 0;
const STATE_RETIRED: u8 = 1;
const STATE_DEAD: u8 = 2;

/// Sentinel for "not linked into the recency list".
const UNLINKED: usize = usize::MAX;

/// Lifecycle of an entry, advancing in one direction only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    /// Reachable from the segment table (and possibly the recency list).
    Alive,
    /// Removed from the table; the unlink is still pending in a drain.
    Retired,
    /// Unlinked from everything; held only by outstanding `Arc`s.
    Dead,
}

/// A single cached key/value pair plus its concurrency bookkeeping.
pub(crate) struct Entry<K, V> {
    key: K,
    value: Arc<V>,
    state: AtomicU8,
    node: AtomicUsize,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: Arc<V>) -> Self {
        Self {
            key,
            value,
            state: AtomicU8::new(STATE_ALIVE),
            node: AtomicUsize::new(UNLINKED),
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    /// Returns a shared handle to the cached value.
    pub(crate) fn value(&self) -> Arc<V> {
        Arc::clone(&self.value)
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        match self.state.load(Ordering::Acquire) {
            STATE_ALIVE => Lifecycle::Alive,
            STATE_RETIRED => Lifecycle::Retired,
            _ => Lifecycle::Dead,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.lifecycle() == Lifecycle::Alive
    }

    /// Attempts the `Alive -> Retired` transition.
    ///
    /// Returns `true` for exactly one caller; the winner is responsible for
    /// the entry's table removal and its buffered removal event.
    pub(crate) fn retire(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_ALIVE,
                STATE_RETIRED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Marks the entry fully unlinked. Idempotent.
    pub(crate) fn kill(&self) {
        self.state.store(STATE_DEAD, Ordering::Release);
    }

    /// Returns the recency-list handle, if linked.
    pub(crate) fn node_id(&self) -> Option<NodeId> {
        match self.node.load(Ordering::Acquire) {
            UNLINKED => None,
            idx => Some(NodeId(idx)),
        }
    }

    /// Records the recency-list handle. Drainer-only, under the eviction lock.
    pub(crate) fn set_node(&self, id: NodeId) {
        self.node.store(id.index(), Ordering::Release);
    }

    /// Clears the recency-list handle. Drainer-only, under the eviction lock.
    pub(crate) fn clear_node(&self) {
        self.node.store(UNLINKED, Ordering::Release);
    }
}

impl<K: std::fmt::Debug, V> std::fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("lifecycle", &self.lifecycle())
            .field("linked", &self.node_id().is_some())
            .finish_non_exhaustive()
    }
}

/// Buffered intent to be replayed into the recency list by the drainer.
pub(crate) enum RecencyEvent<K, V> {
    /// The entry was read; move it to the MRU end. Lossy: may be dropped
    /// when a buffer is full.
    Access(Arc<Entry<K, V>>),
    /// The entry was inserted; link it at the MRU end. Never dropped.
    Write(Arc<Entry<K, V>>),
    /// The entry was retired; unlink it and mark it dead. Never dropped.
    Removal(Arc<Entry<K, V>>),
}

impl<K, V> RecencyEvent<K, V> {
    /// Whether this event may be discarded under buffer pressure.
    pub(crate) fn is_lossy(&self) -> bool {
        matches!(self, RecencyEvent::Access(_))
    }
}
