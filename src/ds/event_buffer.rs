//! Bounded per-segment event queue for deferred recency bookkeeping.
//!
//! Each segment owns one `EventBuffer`. Operation paths append events to it
//! instead of touching the globally locked recency list; the drainer replays
//! them in batches. The buffer is a bounded multi-producer channel, so
//! recording never blocks: on overflow the event is handed back and the
//! caller decides whether to drop it (lossy access events) or to force a
//! blocking drain first (write events, which must never be lost).
//!
//! ```text
//!   get()/put()           EventBuffer            drainer
//!   ──────────►  try_record ─► [e1|e2|e3|..] ─► pop ──► recency list
//!                    │
//!                    └─ Err(event) when full (caller picks the policy)
//! ```
//!
//! Events are consumed in FIFO order per buffer, which is what gives the
//! per-segment event-ordering guarantee.

use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Bounded FIFO event queue shared by many producers and one batch consumer.
#[derive(Debug)]
pub struct EventBuffer<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    capacity: usize,
}

impl<T> EventBuffer<T> {
    /// Creates a buffer holding at most `capacity` pending events.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Appends an event without blocking.
    ///
    /// Returns the event back on overflow so the caller can drop it or drain
    /// first and retry.
    pub fn try_record(&self, event: T) -> Result<(), T> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            // Both ends live in this struct, so the channel can only fail
            // by being full.
            Err(TrySendError::Full(event)) | Err(TrySendError::Disconnected(event)) => Err(event),
        }
    }

    /// Removes and returns the oldest pending event, if any.
    pub fn pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Returns the maximum number of pending events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_pops_in_fifo_order() {
        let buffer = EventBuffer::bounded(4);
        assert!(buffer.try_record(1).is_ok());
        assert!(buffer.try_record(2).is_ok());
        assert!(buffer.try_record(3).is_ok());
        assert_eq!(buffer.len(), 3);

        assert_eq!(buffer.pop(), Some(1));
        assert_eq!(buffer.pop(), Some(2));
        assert_eq!(buffer.pop(), Some(3));
        assert_eq!(buffer.pop(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn overflow_hands_the_event_back() {
        let buffer = EventBuffer::bounded(2);
        assert!(buffer.try_record("a").is_ok());
        assert!(buffer.try_record("b").is_ok());

        assert_eq!(buffer.try_record("c"), Err("c"));
        assert_eq!(buffer.len(), 2);

        // Draining one makes room again.
        assert_eq!(buffer.pop(), Some("a"));
        assert!(buffer.try_record("c").is_ok());
        assert_eq!(buffer.pop(), Some("b"));
        assert_eq!(buffer.pop(), Some("c"));
    }

    #[test]
    fn capacity_is_reported() {
        let buffer: EventBuffer<u8> = EventBuffer::bounded(16);
        assert_eq!(buffer.capacity(), 16);
        assert!(buffer.is_empty());
    }

    #[test]
    fn many_producers_one_consumer() {
        use std::sync::Arc;

        let buffer = Arc::new(EventBuffer::bounded(1024));
        let mut handles = Vec::new();
        for t in 0..4 {
            let buffer = Arc::clone(&buffer);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    buffer.try_record(t * 1000 + i).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut drained = Vec::new();
        while let Some(event) = buffer.pop() {
            drained.push(event);
        }
        assert_eq!(drained.len(), 400);
    }
}
