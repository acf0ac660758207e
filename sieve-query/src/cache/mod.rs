//! Tag-addressable result caching.
//!
//! Compiled list queries can carry a [`CacheDirective`] describing whether
//! and how long their result may be cached, under which tags, and under
//! which key. The cache itself is behind the [`CacheStore`] trait; a
//! process-local [`MemoryStore`] ships here, and disabling caching falls
//! back to [`NoopStore`].
//!
//! Invalidation is tag-based: every cached list query carries its entity's
//! base tag, and mutating operations flush everything under that tag.

pub mod directive;
pub mod key;
pub mod memory;
pub mod store;
pub mod tags;

pub use directive::{CacheDirective, CacheLifetime};
pub use key::CacheKey;
pub use memory::MemoryStore;
pub use store::{CacheError, CacheResult, CacheStore, NoopStore};
pub use tags::CacheTag;

use std::time::Duration;

/// Cache layer configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied by [`CacheDirective::default_ttl`] plans.
    pub default_ttl: Duration,
    /// Key prefix separating this application's entries in a shared store.
    pub prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            prefix: "sieve".to_string(),
        }
    }
}

impl CacheConfig {
    /// Set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}
