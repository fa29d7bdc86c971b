pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::ds::{EventBuffer, NodeId, RecencyList};
pub use crate::error::{ConfigError, InvariantError};

#[cfg(feature = "metrics")]
pub use crate::metrics::MetricsSnapshot;
