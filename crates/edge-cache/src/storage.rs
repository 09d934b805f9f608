//! Named cache buckets.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use edge_core::Response;
use tokio::sync::RwLock;

use crate::key::CacheKey;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Writing would exceed the bucket's entry quota.
    #[error("quota exceeded for cache '{bucket}': {limit} entries")]
    QuotaExceeded { bucket: String, limit: usize },

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// A successful lookup across buckets.
#[derive(Debug, Clone)]
pub struct CacheMatch {
    /// Bucket the entry was found in.
    pub bucket: String,
    /// Stored response.
    pub response: Response,
}

/// A named, isolated store of request → response entries.
///
/// Entries are never mutated in place: `put` replaces the whole entry.
#[async_trait]
pub trait CacheBucket: Send + Sync {
    /// Bucket name (its generation tag).
    fn name(&self) -> &str;

    /// Look up an entry.
    async fn match_key(&self, key: &CacheKey) -> CacheResult<Option<Response>>;

    /// Store an entry, replacing any previous one.
    async fn put(&self, key: CacheKey, response: Response) -> CacheResult<()>;

    /// Store a batch of entries. Either all are stored or none are.
    async fn put_all(&self, entries: Vec<(CacheKey, Response)>) -> CacheResult<()>;

    /// Remove an entry. Returns whether it existed.
    async fn delete(&self, key: &CacheKey) -> CacheResult<bool>;

    /// List stored keys.
    async fn keys(&self) -> CacheResult<Vec<CacheKey>>;
}

/// Registry of named buckets.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a bucket, creating it when missing.
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheBucket>>;

    /// Whether a bucket exists.
    async fn has(&self, name: &str) -> CacheResult<bool>;

    /// Delete a bucket and its entries. Returns whether it existed.
    async fn delete(&self, name: &str) -> CacheResult<bool>;

    /// Bucket names in creation order.
    async fn keys(&self) -> CacheResult<Vec<String>>;

    /// Find an entry in any bucket, searching in creation order.
    async fn match_request(&self, key: &CacheKey) -> CacheResult<Option<CacheMatch>>;
}

/// In-memory bucket.
pub struct MemoryBucket {
    name: String,
    quota: Option<usize>,
    entries: RwLock<HashMap<CacheKey, Response>>,
}

impl MemoryBucket {
    /// Create an empty bucket.
    pub fn new(name: impl Into<String>, quota: Option<usize>) -> Self {
        Self {
            name: name.into(),
            quota,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the bucket holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_quota(
        &self,
        entries: &HashMap<CacheKey, Response>,
        incoming: &[&CacheKey],
    ) -> CacheResult<()> {
        let Some(limit) = self.quota else {
            return Ok(());
        };

        let mut new_keys: Vec<&CacheKey> = incoming
            .iter()
            .copied()
            .filter(|k| !entries.contains_key(*k))
            .collect();
        new_keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        new_keys.dedup();

        if entries.len() + new_keys.len() > limit {
            return Err(CacheError::QuotaExceeded {
                bucket: self.name.clone(),
                limit,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_key(&self, key: &CacheKey) -> CacheResult<Option<Response>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: CacheKey, response: Response) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        self.check_quota(&entries, &[&key])?;
        entries.insert(key, response);
        Ok(())
    }

    async fn put_all(&self, batch: Vec<(CacheKey, Response)>) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        let keys: Vec<&CacheKey> = batch.iter().map(|(k, _)| k).collect();
        self.check_quota(&entries, &keys)?;
        entries.extend(batch);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// In-memory cache storage.
///
/// Buckets are kept in creation order so lookups visit the static
/// generation (created at install) before the dynamic one.
#[derive(Default)]
pub struct MemoryCacheStorage {
    buckets: RwLock<Vec<Arc<MemoryBucket>>>,
    quota: Option<usize>,
}

impl MemoryCacheStorage {
    /// Create an empty storage without quotas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit every bucket to `entries` entries.
    pub fn with_quota(mut self, entries: usize) -> Self {
        self.quota = Some(entries);
        self
    }

    /// Get a bucket without creating it.
    pub async fn bucket(&self, name: &str) -> Option<Arc<MemoryBucket>> {
        self.buckets
            .read()
            .await
            .iter()
            .find(|b| b.name == name)
            .cloned()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheBucket>> {
        if let Some(bucket) = self.bucket(name).await {
            return Ok(bucket);
        }

        let mut buckets = self.buckets.write().await;
        // Another task may have created it between the two locks.
        if let Some(bucket) = buckets.iter().find(|b| b.name == name) {
            return Ok(bucket.clone());
        }

        tracing::debug!(cache = name, "creating cache bucket");
        let bucket = Arc::new(MemoryBucket::new(name, self.quota));
        buckets.push(bucket.clone());
        Ok(bucket)
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        Ok(self.bucket(name).await.is_some())
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|b| b.name != name);
        Ok(buckets.len() != before)
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self
            .buckets
            .read()
            .await
            .iter()
            .map(|b| b.name.clone())
            .collect())
    }

    async fn match_request(&self, key: &CacheKey) -> CacheResult<Option<CacheMatch>> {
        // Snapshot the list so writers are not blocked while we search.
        let buckets: Vec<Arc<MemoryBucket>> = self.buckets.read().await.clone();

        for bucket in buckets {
            if let Some(response) = bucket.match_key(key).await? {
                return Ok(Some(CacheMatch {
                    bucket: bucket.name.clone(),
                    response,
                }));
            }
        }
        Ok(None)
    }
}
