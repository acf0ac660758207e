//! Cache key derivation.

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use crate::value::FilterValue;

/// A cache key, structured as `prefix:entity:identifier`.
///
/// When the caller gives no explicit key, one is derived from the compiled
/// query shape: the same SQL with the same bindings always lands on the
/// same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    prefix: String,
    entity: String,
    identifier: String,
}

impl CacheKey {
    /// Create a key with the default prefix.
    pub fn new(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            prefix: "sieve".to_string(),
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    /// Create a key with a custom prefix.
    pub fn with_prefix(
        prefix: impl Into<String>,
        entity: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    /// Derive a key from a compiled query's SQL and bindings.
    pub fn for_query(prefix: &str, entity: &str, sql: &str, params: &[FilterValue]) -> Self {
        let hash = query_hash(sql, params);
        Self::with_prefix(prefix, entity, format!("query:{:x}", hash))
    }

    /// Wrap a caller-supplied key verbatim.
    pub fn explicit(prefix: &str, entity: &str, key: &str) -> Self {
        Self::with_prefix(prefix, entity, key.to_string())
    }

    /// Get the full key string.
    pub fn as_str(&self) -> String {
        format!("{}:{}:{}", self.prefix, self.entity, self.identifier)
    }

    /// Get the entity segment.
    pub fn entity(&self) -> &str {
        &self.entity
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hash a compiled query's shape and bindings.
pub fn query_hash(sql: &str, params: &[FilterValue]) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    // FilterValue carries floats, so hash its serialized form instead of
    // requiring Hash on the value type.
    serde_json::to_string(params)
        .unwrap_or_default()
        .hash(&mut hasher);
    hasher.finish()
}
