//! The cache store trait and the no-op store.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use super::key::CacheKey;
use super::tags::CacheTag;

/// Errors from cache store operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored payload could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Store-specific failure.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// A tag-addressable cache store.
///
/// Values are serialized with serde; the store only sees bytes. Entries
/// carry tags so that a mutation can flush every query result touching an
/// entity without knowing individual keys.
pub trait CacheStore: Send + Sync + 'static {
    /// Get a value.
    fn get<T>(&self, key: &CacheKey) -> impl Future<Output = CacheResult<Option<T>>> + Send
    where
        T: serde::de::DeserializeOwned;

    /// Store a value. A `None` TTL means the entry never expires.
    fn put<T>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
        tags: &[CacheTag],
    ) -> impl Future<Output = CacheResult<()>> + Send
    where
        T: serde::Serialize + Sync;

    /// Remove a single entry. Returns whether it existed.
    fn forget(&self, key: &CacheKey) -> impl Future<Output = CacheResult<bool>> + Send;

    /// Remove every entry carrying any of the tags. Returns the number of
    /// entries removed.
    fn invalidate_tags(&self, tags: &[CacheTag]) -> impl Future<Output = CacheResult<u64>> + Send;

    /// Remove all entries.
    fn clear(&self) -> impl Future<Output = CacheResult<()>> + Send;

    /// Approximate number of live entries.
    fn len(&self) -> impl Future<Output = CacheResult<usize>> + Send;

    /// Check if the store is empty.
    fn is_empty(&self) -> impl Future<Output = CacheResult<bool>> + Send {
        async move { Ok(self.len().await? == 0) }
    }
}

/// A store that never caches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl CacheStore for NoopStore {
    async fn get<T>(&self, _key: &CacheKey) -> CacheResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(None)
    }

    async fn put<T>(
        &self,
        _key: &CacheKey,
        _value: &T,
        _ttl: Option<Duration>,
        _tags: &[CacheTag],
    ) -> CacheResult<()>
    where
        T: serde::Serialize + Sync,
    {
        Ok(())
    }

    async fn forget(&self, _key: &CacheKey) -> CacheResult<bool> {
        Ok(false)
    }

    async fn invalidate_tags(&self, _tags: &[CacheTag]) -> CacheResult<u64> {
        Ok(0)
    }

    async fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn len(&self) -> CacheResult<usize> {
        Ok(0)
    }
}
