//! Process-local in-memory cache store.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use super::key::CacheKey;
use super::store::{CacheError, CacheResult, CacheStore};
use super::tags::CacheTag;

struct Entry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
    tags: Vec<CacheTag>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// An in-memory [`CacheStore`] with per-entry TTL and a tag index.
///
/// Suitable for single-process deployments and tests; a shared deployment
/// wants a store backed by an external system behind the same trait.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    tag_index: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(entry) = entries.remove(key) {
                self.unindex(key, &entry.tags);
            }
        }
        expired.len()
    }

    fn index(&self, key: &str, tags: &[CacheTag]) {
        if tags.is_empty() {
            return;
        }
        let mut index = self.tag_index.write();
        for tag in tags {
            index
                .entry(tag.value().to_string())
                .or_default()
                .insert(key.to_string());
        }
    }

    fn unindex(&self, key: &str, tags: &[CacheTag]) {
        let mut index = self.tag_index.write();
        for tag in tags {
            if let Some(keys) = index.get_mut(tag.value()) {
                keys.remove(key);
                if keys.is_empty() {
                    index.remove(tag.value());
                }
            }
        }
    }
}

impl CacheStore for MemoryStore {
    async fn get<T>(&self, key: &CacheKey) -> CacheResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let key_str = key.as_str();
        let expired = {
            let entries = self.entries.read();
            match entries.get(&key_str) {
                None => return Ok(None),
                Some(entry) if entry.is_expired() => true,
                Some(entry) => {
                    let value = serde_json::from_slice(&entry.data)
                        .map_err(|e| CacheError::Deserialization(e.to_string()))?;
                    return Ok(Some(value));
                }
            }
        };

        if expired {
            let mut entries = self.entries.write();
            if let Some(entry) = entries.remove(&key_str) {
                self.unindex(&key_str, &entry.tags);
            }
        }
        Ok(None)
    }

    async fn put<T>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
        tags: &[CacheTag],
    ) -> CacheResult<()>
    where
        T: serde::Serialize + Sync,
    {
        let data =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let key_str = key.as_str();
        debug!(key = %key_str, tags = tags.len(), "caching entry");

        let previous = self.entries.write().insert(
            key_str.clone(),
            Entry {
                data,
                expires_at: ttl.map(|d| Instant::now() + d),
                tags: tags.to_vec(),
            },
        );
        if let Some(previous) = previous {
            self.unindex(&key_str, &previous.tags);
        }
        self.index(&key_str, tags);
        Ok(())
    }

    async fn forget(&self, key: &CacheKey) -> CacheResult<bool> {
        let key_str = key.as_str();
        match self.entries.write().remove(&key_str) {
            Some(entry) => {
                self.unindex(&key_str, &entry.tags);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn invalidate_tags(&self, tags: &[CacheTag]) -> CacheResult<u64> {
        let keys: HashSet<String> = {
            let index = self.tag_index.read();
            tags.iter()
                .filter_map(|tag| index.get(tag.value()))
                .flatten()
                .cloned()
                .collect()
        };

        let mut removed = 0u64;
        let mut entries = self.entries.write();
        for key in keys {
            if let Some(entry) = entries.remove(&key) {
                self.unindex(&key, &entry.tags);
                removed += 1;
            }
        }
        debug!(removed, "invalidated cache entries by tag");
        Ok(removed)
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.write().clear();
        self.tag_index.write().clear();
        Ok(())
    }

    async fn len(&self) -> CacheResult<usize> {
        Ok(self.entries.read().len())
    }
}
