//! Per-query cache directives.

use std::time::Duration;

use super::CacheConfig;
use super::tags::CacheTag;
use crate::error::{CompileError, CompileResult};

/// How long a cached result may live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheLifetime {
    /// Do not cache this query.
    #[default]
    Disabled,
    /// Cache with a bounded time-to-live.
    Ttl(Duration),
    /// Cache without expiry; only tag invalidation removes the entry.
    Forever,
}

impl CacheLifetime {
    /// Check if caching is enabled.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// The TTL to store the entry with; `None` means no expiry.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Ttl(duration) => Some(*duration),
            _ => None,
        }
    }
}

/// Cache behavior attached to a single query compile-and-execute cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDirective {
    /// Lifetime of the cached entry.
    pub lifetime: CacheLifetime,
    /// Tags for bulk invalidation.
    pub tags: Vec<CacheTag>,
    /// Explicit key override; derived from the query shape when absent.
    pub key: Option<String>,
    /// Named store override, for applications running several stores.
    pub store: Option<String>,
}

impl CacheDirective {
    /// Create a disabled directive.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Create a TTL-bounded directive.
    pub fn ttl(duration: Duration) -> Self {
        Self {
            lifetime: CacheLifetime::Ttl(duration),
            ..Self::default()
        }
    }

    /// Create an unbounded directive.
    pub fn forever() -> Self {
        Self {
            lifetime: CacheLifetime::Forever,
            ..Self::default()
        }
    }

    /// Create a TTL-bounded directive using the configured default.
    pub fn default_ttl(config: &CacheConfig) -> Self {
        Self::ttl(config.default_ttl)
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<CacheTag>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add multiple tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = CacheTag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Set an explicit key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set a named store.
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Check if caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.lifetime.is_enabled()
    }

    /// Validate the directive.
    ///
    /// An enabled plan with zero tags could never be invalidated, which is
    /// a configuration error rather than a degraded mode.
    pub fn validate(&self) -> CompileResult<()> {
        if self.is_enabled() && self.tags.is_empty() {
            return Err(CompileError::CacheTagMissing);
        }
        Ok(())
    }
}
