//! memocache: a bounded concurrent cache with strict LRU eviction.
//!
//! Lookups and writes are sharded across independently locked segments;
//! recency bookkeeping is buffered per segment and replayed in batches into
//! a single global recency list by whichever thread wins a non-blocking
//! drain. See the [`cache`] module docs for the architecture.

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;

mod entry;
mod segment;
