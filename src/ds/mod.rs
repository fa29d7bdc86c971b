//! Data structures underpinning the cache: the recency list that orders
//! entries for eviction and the bounded event buffers that defer recency
//! updates out of the hot path.

pub mod event_buffer;
pub mod recency_list;

pub use event_buffer::EventBuffer;
pub use recency_list::{NodeId, RecencyList};
