//! Builder-style configuration for [`Cache`](crate::cache::Cache).
//!
//! ## Key Components
//!
//! - [`CacheBuilder`]: Fluent builder collecting capacity, concurrency, and
//!   buffer parameters before constructing a cache.
//!
//! Validation is fail-fast: every parameter is checked in
//! [`try_build`](CacheBuilder::try_build) before any cache structure is
//! allocated, so a misconfigured builder can never produce a half-working
//! cache.
//!
//! ## Example Usage
//!
//! ```
//! use memocache::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!     .maximum_capacity(10_000)
//!     .concurrency_level(8)
//!     .recency_buffer_size(64)
//!     .build::<u64, String>();
//!
//! assert_eq!(cache.capacity(), 10_000);
//! assert_eq!(cache.segment_count(), 8);
//! ```

use crate::cache::Cache;
use crate::error::ConfigError;

/// Default number of segments when `concurrency_level` is not set.
pub const DEFAULT_CONCURRENCY_LEVEL: usize = 16;

/// Default per-segment recency buffer capacity.
pub const DEFAULT_RECENCY_BUFFER_SIZE: usize = 128;

/// Upper bound on `concurrency_level`; beyond this, extra segments only
/// cost memory.
pub const MAX_CONCURRENCY_LEVEL: usize = 1 << 16;

/// Fluent builder for [`Cache`].
///
/// `maximum_capacity` is the only required parameter. The concurrency level
/// is rounded up to the next power of two to keep segment selection a mask.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    maximum_capacity: Option<usize>,
    concurrency_level: usize,
    recency_buffer_size: usize,
}

impl CacheBuilder {
    /// Creates a builder with default concurrency and buffer settings.
    pub fn new() -> Self {
        Self {
            maximum_capacity: None,
            concurrency_level: DEFAULT_CONCURRENCY_LEVEL,
            recency_buffer_size: DEFAULT_RECENCY_BUFFER_SIZE,
        }
    }

    /// Sets the maximum number of entries the cache may hold after a drain.
    ///
    /// Required. Zero is legal and yields a cache that evicts everything.
    pub fn maximum_capacity(mut self, capacity: usize) -> Self {
        self.maximum_capacity = Some(capacity);
        self
    }

    /// Sets the expected number of concurrently writing threads.
    ///
    /// Determines the segment count (rounded up to a power of two). Must be
    /// at least 1 and at most [`MAX_CONCURRENCY_LEVEL`].
    pub fn concurrency_level(mut self, level: usize) -> Self {
        self.concurrency_level = level;
        self
    }

    /// Sets the per-segment recency buffer capacity. Must be at least 1.
    ///
    /// Larger buffers batch more recency work per drain; smaller buffers
    /// force drains sooner under write pressure.
    pub fn recency_buffer_size(mut self, size: usize) -> Self {
        self.recency_buffer_size = size;
        self
    }

    /// Validates the configuration and constructs the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `maximum_capacity` was never set, the
    /// concurrency level is zero or above [`MAX_CONCURRENCY_LEVEL`], or the
    /// recency buffer size is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use memocache::builder::CacheBuilder;
    ///
    /// let missing = CacheBuilder::new().try_build::<u64, u64>();
    /// assert!(missing.unwrap_err().message().contains("capacity"));
    ///
    /// let ok = CacheBuilder::new().maximum_capacity(100).try_build::<u64, u64>();
    /// assert!(ok.is_ok());
    /// ```
    pub fn try_build<K, V>(&self) -> Result<Cache<K, V>, ConfigError>
    where
        K: std::hash::Hash + Eq + Clone,
    {
        let maximum_capacity = self
            .maximum_capacity
            .ok_or_else(|| ConfigError::new("maximum capacity must be configured"))?;
        if self.concurrency_level == 0 {
            return Err(ConfigError::new("concurrency level must be at least 1"));
        }
        if self.concurrency_level > MAX_CONCURRENCY_LEVEL {
            return Err(ConfigError::new(format!(
                "concurrency level {} exceeds the maximum of {}",
                self.concurrency_level, MAX_CONCURRENCY_LEVEL
            )));
        }
        if self.recency_buffer_size == 0 {
            return Err(ConfigError::new("recency buffer size must be at least 1"));
        }

        let segment_count = self.concurrency_level.next_power_of_two();
        Ok(Cache::with_settings(
            maximum_capacity,
            segment_count,
            self.recency_buffer_size,
        ))
    }

    /// Constructs the cache, panicking on invalid configuration.
    ///
    /// Convenience for configurations known valid at compile time; prefer
    /// [`try_build`](CacheBuilder::try_build) for user-supplied parameters.
    ///
    /// # Panics
    ///
    /// Panics if the configuration fails validation.
    pub fn build<K, V>(&self) -> Cache<K, V>
    where
        K: std::hash::Hash + Eq + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
