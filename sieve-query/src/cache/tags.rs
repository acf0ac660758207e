//! Cache tags for bulk invalidation.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// An opaque label attached to cache entries, enabling invalidation by
/// topic rather than by individual key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheTag(String);

impl CacheTag {
    /// Create a tag from a raw value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The base tag carried by every cached list query of an entity.
    pub fn entity(entity: &str) -> Self {
        Self(format!("entity:{}", entity))
    }

    /// A record-specific tag.
    pub fn record<I: Display>(entity: &str, id: I) -> Self {
        Self(format!("record:{}:{}", entity, id))
    }

    /// Get the tag value.
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CacheTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheTag {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_tag() {
        assert_eq!(CacheTag::entity("User").value(), "entity:User");
    }

    #[test]
    fn test_record_tag() {
        assert_eq!(CacheTag::record("User", 42).value(), "record:User:42");
    }

    #[test]
    fn test_from_str() {
        let tag: CacheTag = "reports:daily".into();
        assert_eq!(tag.value(), "reports:daily");
    }
}
