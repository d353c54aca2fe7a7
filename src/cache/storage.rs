// Cache storage - named partitions of request/response pairs
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{CacheKey, StoredResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A single named partition.
///
/// Writes for the same key race with last-write-wins; entries are only ever
/// removed by deleting the whole partition from [`CacheStorage`].
#[derive(Debug)]
pub struct CachePartition {
    name: String,
    entries: RwLock<HashMap<CacheKey, StoredResponse>>,
}

impl CachePartition {
    fn new(name: String) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored response for a key
    pub async fn get(&self, key: &CacheKey) -> Option<StoredResponse> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store (or overwrite) the response for a key
    pub async fn put(&self, key: CacheKey, response: StoredResponse) {
        debug!("{}: storing {}", self.name, key);
        self.entries.write().await.insert(key, response);
    }

    /// Store several entries under one write lock
    pub async fn put_all(&self, entries: Vec<(CacheKey, StoredResponse)>) {
        let mut map = self.entries.write().await;
        for (key, response) in entries {
            map.insert(key, response);
        }
    }

    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<CacheKey> {
        self.entries.read().await.keys().cloned().collect()
    }
}

/// Directory of partitions, addressed by name.
///
/// Cloning shares the same underlying partitions, so several worker
/// versions can see (and clean up) each other's partitions.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    partitions: Arc<RwLock<HashMap<String, Arc<CachePartition>>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a partition, creating it on first use
    pub async fn open(&self, name: &str) -> Arc<CachePartition> {
        if let Some(partition) = self.partitions.read().await.get(name) {
            return partition.clone();
        }

        let mut partitions = self.partitions.write().await;
        partitions
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating cache partition {}", name);
                Arc::new(CachePartition::new(name.to_string()))
            })
            .clone()
    }

    pub async fn has(&self, name: &str) -> bool {
        self.partitions.read().await.contains_key(name)
    }

    /// Delete a whole partition. Returns whether it existed.
    pub async fn delete(&self, name: &str) -> bool {
        let removed = self.partitions.write().await.remove(name).is_some();
        if removed {
            debug!("Deleted cache partition {}", name);
        }
        removed
    }

    /// Names of all existing partitions, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.partitions.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up a key in one partition without creating it
    pub async fn lookup(&self, partition: &str, key: &CacheKey) -> Option<StoredResponse> {
        let partition = self.partitions.read().await.get(partition).cloned()?;
        partition.get(key).await
    }
}
