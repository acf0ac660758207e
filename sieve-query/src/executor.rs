//! The execution seam and the read-through caching decorator.
//!
//! The compiler never touches a data store; execution goes through the
//! [`Executor`] trait owned by the host application. [`CachedExecutor`]
//! decorates any executor with the tag-addressable result cache, consulting
//! the [`CacheStore`] per the compiled query's [`crate::cache::CacheDirective`].

use std::future::Future;

use thiserror::Error;
use tracing::debug;

use crate::builder::CompiledQuery;
use crate::cache::{CacheConfig, CacheError, CacheKey, CacheStore, CacheTag};
use crate::value::FilterValue;

/// A result row, engine-agnostic.
pub type Row = serde_json::Value;

/// Errors from query execution.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Data-store failure, wrapped as text by the hosting executor.
    #[error("execution error: {0}")]
    Backend(String),

    /// Cache store failure.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// The query execution engine contract.
///
/// The builder's output is plain SQL plus bindings; whatever can run those
/// can host the compiler. Methods are listed explicitly — there is no
/// catch-all forwarding.
pub trait Executor: Send + Sync {
    /// Run a SELECT and return its rows.
    fn fetch_rows(
        &self,
        sql: &str,
        params: &[FilterValue],
    ) -> impl Future<Output = Result<Vec<Row>, ExecError>> + Send;

    /// Run a COUNT query and return the count.
    fn count(
        &self,
        sql: &str,
        params: &[FilterValue],
    ) -> impl Future<Output = Result<u64, ExecError>> + Send;
}

/// Read-through caching decorator around an [`Executor`].
///
/// There is no isolation between the read-through fill and a concurrent tag
/// invalidation: a stale value can be written back immediately after an
/// invalidation sweep. Last writer wins; callers needing stronger guarantees
/// need a store with atomic fill semantics.
pub struct CachedExecutor<E, S> {
    inner: E,
    store: S,
    config: CacheConfig,
}

impl<E: Executor, S: CacheStore> CachedExecutor<E, S> {
    /// Wrap an executor with a cache store and default configuration.
    pub fn new(inner: E, store: S) -> Self {
        Self {
            inner,
            store,
            config: CacheConfig::default(),
        }
    }

    /// Wrap with explicit configuration.
    pub fn with_config(inner: E, store: S, config: CacheConfig) -> Self {
        Self {
            inner,
            store,
            config,
        }
    }

    /// Access the wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Access the cache store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn key_for(&self, query: &CompiledQuery) -> CacheKey {
        match &query.cache.key {
            Some(key) => CacheKey::explicit(&self.config.prefix, &query.entity, key),
            None => {
                CacheKey::for_query(&self.config.prefix, &query.entity, &query.sql, &query.params)
            }
        }
    }

    /// Run a compiled list query, consulting the cache per its directive.
    pub async fn fetch_list(&self, query: &CompiledQuery) -> Result<Vec<Row>, ExecError> {
        if !query.cache.is_enabled() {
            return self.inner.fetch_rows(&query.sql, &query.params).await;
        }

        let key = self.key_for(query);
        if let Some(rows) = self.store.get::<Vec<Row>>(&key).await? {
            debug!(key = %key, "cache hit");
            return Ok(rows);
        }

        let rows = self.inner.fetch_rows(&query.sql, &query.params).await?;
        self.store
            .put(&key, &rows, query.cache.lifetime.ttl(), &query.cache.tags)
            .await?;
        Ok(rows)
    }

    /// Run a compiled COUNT query, uncached.
    pub async fn fetch_count(&self, query: &CompiledQuery) -> Result<u64, ExecError> {
        self.inner.count(&query.sql, &query.params).await
    }

    /// Flush every cached query result carrying the entity's base tag.
    ///
    /// Mutating operations (create/update/delete) on an entity must call
    /// this; the compiler tags every cached list query with
    /// `CacheTag::entity(..)` so the sweep reaches them all.
    pub async fn invalidate_entity(&self, entity: &str) -> Result<u64, ExecError> {
        Ok(self
            .store
            .invalidate_tags(&[CacheTag::entity(entity)])
            .await?)
    }

    /// Flush cached entries by explicit tags.
    pub async fn invalidate_tags(&self, tags: &[CacheTag]) -> Result<u64, ExecError> {
        Ok(self.store.invalidate_tags(tags).await?)
    }
}
