//! Error types for the memocache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are
//!   invalid (e.g. missing capacity, zero concurrency level). Produced only
//!   at construction time; steady-state cache operations never fail.
//! - [`InvariantError`]: Returned by the diagnostic
//!   [`Cache::check_invariants`](crate::cache::Cache::check_invariants) when
//!   the recency list and segment table disagree.
//!
//! ## Example Usage
//!
//! ```
//! use memocache::builder::CacheBuilder;
//! use memocache::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let cache = CacheBuilder::new()
//!     .maximum_capacity(100)
//!     .try_build::<u64, String>();
//! assert!(cache.is_ok());
//!
//! // A missing capacity is caught without panicking
//! let bad: Result<_, ConfigError> = CacheBuilder::new().try_build::<u64, String>();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use memocache::builder::CacheBuilder;
///
/// let err = CacheBuilder::new()
///     .maximum_capacity(10)
///     .concurrency_level(0)
///     .try_build::<u64, u64>()
///     .unwrap_err();
/// assert!(err.to_string().contains("concurrency"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by the diagnostic `check_invariants` method on
/// [`Cache`](crate::cache::Cache). Carries a human-readable description of
/// which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("maximum capacity must be configured");
        assert_eq!(err.to_string(), "maximum capacity must be configured");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("list/table size mismatch");
        assert_eq!(err.to_string(), "list/table size mismatch");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("over capacity");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("over capacity"));
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }
}
