//! Recency-ordered doubly linked list backed by a slab of stable slots.
//!
//! This is the cache's eviction deque: one global ordering of all live
//! entries from least- to most-recently-used. Nodes live in an internal slab
//! and are linked by `NodeId`, enabling O(1) unlink/move operations with no
//! raw pointers and no aliased references.
//!
//! ## Architecture
//!
//! ```text
//!   slab (Vec<Option<ListNode<T>>> + free list)
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ NodeId │ ListNode { value, prev, next }               │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ id_0   │ { value: A, prev: None, next: Some(id_1) }   │
//!   │ id_1   │ { value: B, prev: Some(id_0), next: id_2 }   │
//!   │ id_2   │ { value: C, prev: Some(id_1), next: None }   │
//!   └────────┴──────────────────────────────────────────────┘
//!
//!   head ──► [id_0] ◄──► [id_1] ◄──► [id_2] ◄── tail
//!   (LRU)                                       (MRU)
//! ```
//!
//! ## Operations
//!
//! | Method            | Complexity | Description                         |
//! |-------------------|------------|-------------------------------------|
//! | `push_tail(v)`    | O(1)       | Link a new node at the MRU end      |
//! | `move_to_tail(id)`| O(1)       | Recency bump for an existing node   |
//! | `unlink(id)`      | O(1)       | Detach and free a node              |
//! | `pop_head()`      | O(1)       | Remove the LRU node (eviction)      |
//! | `peek_head()`     | O(1)       | Inspect the LRU node                |
//!
//! The list itself is single-threaded; the cache serializes all mutation
//! behind its eviction mutex, so no interior locking is needed here.
//! `debug_validate_invariants()` is available in debug/test builds.

/// Stable handle to a node in a [`RecencyList`].
///
/// Handles are only meaningful for the list that issued them and only while
/// the node is linked; slots are recycled after `unlink`/`pop_head`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the underlying slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct ListNode<T> {
    value: T,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly linked recency list over slab-allocated nodes.
///
/// Head is the least-recently-used end, tail the most-recently-used end.
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Option<ListNode<T>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<T> RecencyList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no nodes are linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` refers to a currently linked node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Returns the value stored at `id`, if linked.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0)?.as_ref().map(|node| &node.value)
    }

    /// Returns the value at the head (LRU end) without unlinking it.
    pub fn peek_head(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Returns the value at the tail (MRU end).
    pub fn peek_tail(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    /// Links a new node at the tail (MRU end) and returns its handle.
    pub fn push_tail(&mut self, value: T) -> NodeId {
        let id = self.alloc(ListNode {
            value,
            prev: self.tail,
            next: None,
        });
        if let Some(tail) = self.tail {
            if let Some(node) = self.node_mut(tail) {
                node.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Moves a linked node to the tail; returns `false` if `id` is stale.
    pub fn move_to_tail(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if Some(id) == self.tail {
            return true;
        }
        self.detach(id);
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(id) {
            node.prev = old_tail;
            node.next = None;
        }
        if let Some(tail) = old_tail {
            if let Some(node) = self.node_mut(tail) {
                node.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        true
    }

    /// Unlinks `id` and returns its value, if linked.
    pub fn unlink(&mut self, id: NodeId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        self.release(id)
    }

    /// Unlinks and returns the head (LRU) value.
    pub fn pop_head(&mut self) -> Option<T> {
        let id = self.head?;
        self.detach(id);
        self.release(id)
    }

    /// Unlinks every node and frees all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Returns an iterator over values from head (LRU) to tail (MRU).
    pub fn iter(&self) -> RecencyIter<'_, T> {
        RecencyIter {
            list: self,
            current: self.head,
        }
    }

    fn alloc(&mut self, node: ListNode<T>) -> NodeId {
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        };
        NodeId(idx)
    }

    fn release(&mut self, id: NodeId) -> Option<T> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut ListNode<T>> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    /// Detaches `id` from its neighbors without freeing the slot.
    fn detach(&mut self, id: NodeId) {
        let (prev, next) = match self.slots.get(id.0).and_then(|s| s.as_ref()) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_id) => {
                if let Some(node) = self.node_mut(prev_id) {
                    node.next = next;
                }
            },
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(node) = self.node_mut(next_id) {
                    node.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;

        while let Some(id) = current {
            assert!(seen.insert(id), "cycle at {:?}", id);
            let node = self.slots[id.0].as_ref().expect("linked node missing");
            assert_eq!(node.prev, prev);
            if node.next.is_none() {
                assert_eq!(self.tail, Some(id));
            }
            prev = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len);
        }

        assert_eq!(count, self.len);
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over list values from head (LRU) to tail (MRU).
pub struct RecencyIter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<NodeId>,
}

impl<'a, T> Iterator for RecencyIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.slots[id.0].as_ref()?;
        self.current = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_follow_recency_order() {
        let mut list = RecencyList::new();
        list.push_tail("a");
        list.push_tail("b");
        list.push_tail("c");

        assert_eq!(list.len(), 3);
        assert_eq!(list.peek_head(), Some(&"a"));
        assert_eq!(list.peek_tail(), Some(&"c"));

        assert_eq!(list.pop_head(), Some("a"));
        assert_eq!(list.pop_head(), Some("b"));
        assert_eq!(list.pop_head(), Some("c"));
        assert_eq!(list.pop_head(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn move_to_tail_bumps_recency() {
        let mut list = RecencyList::new();
        let a = list.push_tail(1);
        let _b = list.push_tail(2);
        let c = list.push_tail(3);

        assert!(list.move_to_tail(a));
        let order: Vec<_> = list.iter().copied().collect();
        assert_eq!(order, vec![2, 3, 1]);

        // Moving the tail is a no-op that still succeeds.
        assert!(list.move_to_tail(a));
        assert_eq!(list.peek_tail(), Some(&1));

        assert!(list.move_to_tail(c));
        let order: Vec<_> = list.iter().copied().collect();
        assert_eq!(order, vec![2, 1, 3]);
        list.debug_validate_invariants();
    }

    #[test]
    fn unlink_middle_and_ends() {
        let mut list = RecencyList::new();
        let a = list.push_tail("a");
        let b = list.push_tail("b");
        let c = list.push_tail("c");

        assert_eq!(list.unlink(b), Some("b"));
        let order: Vec<_> = list.iter().copied().collect();
        assert_eq!(order, vec!["a", "c"]);

        assert_eq!(list.unlink(a), Some("a"));
        assert_eq!(list.peek_head(), Some(&"c"));
        assert_eq!(list.peek_tail(), Some(&"c"));

        assert_eq!(list.unlink(c), Some("c"));
        assert!(list.is_empty());
        assert_eq!(list.peek_head(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut list = RecencyList::new();
        let a = list.push_tail(1);
        assert_eq!(list.unlink(a), Some(1));

        assert!(!list.contains(a));
        assert!(!list.move_to_tail(a));
        assert_eq!(list.unlink(a), None);
        assert_eq!(list.get(a), None);
    }

    #[test]
    fn slots_are_recycled() {
        let mut list = RecencyList::new();
        let a = list.push_tail(1);
        list.push_tail(2);
        assert_eq!(list.unlink(a), Some(1));

        let c = list.push_tail(3);
        assert_eq!(c.index(), a.index());
        assert_eq!(list.len(), 2);
        let order: Vec<_> = list.iter().copied().collect();
        assert_eq!(order, vec![2, 3]);
    }

    #[test]
    fn clear_resets_state() {
        let mut list = RecencyList::new();
        list.push_tail(1);
        list.push_tail(2);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.peek_head(), None);
        assert_eq!(list.pop_head(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn interleaved_ops_keep_invariants() {
        let mut list = RecencyList::with_capacity(8);
        let ids: Vec<_> = (0..8).map(|i| list.push_tail(i)).collect();

        list.move_to_tail(ids[0]);
        list.unlink(ids[3]);
        list.pop_head();
        list.move_to_tail(ids[5]);
        list.unlink(ids[7]);

        list.debug_validate_invariants();
        assert_eq!(list.len(), 5);
    }
}
