//! Hash-partitioned shards of the segment table.
//!
//! Each segment owns one slice of the key space: a `RwLock`-guarded
//! `FxHashMap` from key to `Arc<Entry>`, plus the segment's recency event
//! buffer. Lookups take the read lock only; mutation takes the write lock
//! for a constant amount of work and is independent across segments.
//!
//! Invariant: every entry reachable from a segment map is `Alive`. The
//! mutation paths retire displaced entries while still holding the write
//! lock, so retirement and table removal are atomic per key.

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::ds::EventBuffer;
use crate::entry::{Entry, RecencyEvent};

/// One shard of the cache: a keyed map plus its recency buffer.
pub(crate) struct Segment<K, V> {
    map: RwLock<FxHashMap<K, Arc<Entry<K, V>>>>,
    buffer: EventBuffer<RecencyEvent<K, V>>,
}

impl<K, V> Segment<K, V>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn new(buffer_size: usize) -> Self {
        Self {
            map: RwLock::new(FxHashMap::default()),
            buffer: EventBuffer::bounded(buffer_size),
        }
    }

    /// Looks up an entry under the read lock.
    pub(crate) fn get(&self, key: &K) -> Option<Arc<Entry<K, V>>> {
        let map = self.map.read();
        map.get(key).map(Arc::clone)
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        let map = self.map.read();
        map.contains_key(key)
    }

    /// Inserts or replaces an entry.
    ///
    /// Returns the new entry and, if the key was present, the displaced
    /// entry, already retired. The caller buffers the matching events after
    /// releasing its hold on this segment.
    pub(crate) fn insert(
        &self,
        key: K,
        value: Arc<V>,
    ) -> (Arc<Entry<K, V>>, Option<Arc<Entry<K, V>>>) {
        let entry = Arc::new(Entry::new(key.clone(), value));
        let mut map = self.map.write();
        let previous = map.insert(key, Arc::clone(&entry));
        if let Some(prev) = &previous {
            prev.retire();
        }
        (entry, previous)
    }

    /// Inserts only if the key is absent.
    ///
    /// Returns `Ok(new entry)` if this call inserted, `Err(existing entry)`
    /// otherwise. The race for a key is decided under the write lock, so no
    /// duplicate entry is ever constructed into the table.
    pub(crate) fn insert_if_absent(
        &self,
        key: K,
        value: Arc<V>,
    ) -> Result<Arc<Entry<K, V>>, Arc<Entry<K, V>>> {
        let mut map = self.map.write();
        if let Some(existing) = map.get(&key) {
            return Err(Arc::clone(existing));
        }
        let entry = Arc::new(Entry::new(key.clone(), value));
        map.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    /// Removes and retires the entry for `key`, if present.
    pub(crate) fn remove(&self, key: &K) -> Option<Arc<Entry<K, V>>> {
        let mut map = self.map.write();
        let entry = map.remove(key)?;
        entry.retire();
        Some(entry)
    }

    /// Removes `key` only if it still maps to exactly `entry`.
    ///
    /// Used by the eviction path: the table may have been repopulated with a
    /// newer entry for the same key since the victim was chosen.
    pub(crate) fn remove_if_same(&self, key: &K, entry: &Arc<Entry<K, V>>) -> bool {
        let mut map = self.map.write();
        match map.get(key) {
            Some(current) if Arc::ptr_eq(current, entry) => {
                map.remove(key);
                true
            },
            _ => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        let map = self.map.read();
        map.len()
    }

    pub(crate) fn buffer(&self) -> &EventBuffer<RecencyEvent<K, V>> {
        &self.buffer
    }
}
