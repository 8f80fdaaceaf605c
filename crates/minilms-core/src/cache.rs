//! Read-through cache for the "classes with occupancy" listing
//!
//! [`ClassListingCache`] is the raw capability: every call may fail, the way a
//! remote key/value store can. [`ListingCache`] is what the services hold; it
//! owns the fixed key, the TTL and the cached window, and it never propagates a
//! cache failure. Failures are logged and the caller carries on as if the cache
//! were absent.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use minilms_common::{CLASSES_CACHE_KEY, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_PAGE_LIMIT};
use minilms_persistence::ClassOccupancy;

/// The cached value: the canonical page of classes with occupancy
pub type ListingSnapshot = Vec<ClassOccupancy>;

/// Key/value store with expiry holding listing snapshots
#[async_trait]
pub trait ClassListingCache: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<ListingSnapshot>>;

    async fn set(&self, key: &str, value: ListingSnapshot, ttl: Duration) -> anyhow::Result<()>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
struct CachedListing {
    snapshot: Arc<ListingSnapshot>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with
struct ListingExpiry;

impl Expiry<String, CachedListing> for ListingExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedListing,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedListing,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by moka
pub struct MokaListingCache {
    inner: Cache<String, CachedListing>,
}

impl MokaListingCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(ListingExpiry)
                .build(),
        }
    }
}

impl Default for MokaListingCache {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl ClassListingCache for MokaListingCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<ListingSnapshot>> {
        Ok(self
            .inner
            .get(key)
            .await
            .map(|cached| cached.snapshot.as_ref().clone()))
    }

    async fn set(&self, key: &str, value: ListingSnapshot, ttl: Duration) -> anyhow::Result<()> {
        self.inner
            .insert(
                key.to_owned(),
                CachedListing {
                    snapshot: Arc::new(value),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}

/// Cache that never holds anything
pub struct NoopListingCache;

#[async_trait]
impl ClassListingCache for NoopListingCache {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<ListingSnapshot>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: ListingSnapshot, _ttl: Duration) -> anyhow::Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Best-effort handle on the listing cache
///
/// None of its methods can fail.
#[derive(Clone)]
pub struct ListingCache {
    backend: Arc<dyn ClassListingCache>,
    key: String,
    ttl: Duration,
    page_limit: u64,
}

impl ListingCache {
    pub fn new(backend: Arc<dyn ClassListingCache>, ttl: Duration, page_limit: u64) -> Self {
        Self {
            backend,
            key: CLASSES_CACHE_KEY.to_string(),
            ttl,
            page_limit,
        }
    }

    /// In-process moka cache with the given TTL
    pub fn in_memory(ttl: Duration, page_limit: u64) -> Self {
        Self::new(Arc::new(MokaListingCache::default()), ttl, page_limit)
    }

    /// Every lookup misses, every write is dropped
    pub fn disabled(page_limit: u64) -> Self {
        Self::new(Arc::new(NoopListingCache), Duration::ZERO, page_limit)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn page_limit(&self) -> u64 {
        self.page_limit
    }

    /// Whether `offset`/`limit` select the single cached window
    pub fn is_canonical(&self, offset: u64, limit: u64) -> bool {
        offset == 0 && limit == self.page_limit
    }

    /// Cached snapshot, `None` on a miss or when the cache is unreachable
    pub async fn fetch(&self) -> Option<ListingSnapshot> {
        match self.backend.get(&self.key).await {
            Ok(Some(snapshot)) => {
                tracing::debug!(key = %self.key, "Class listing cache hit");
                Some(snapshot)
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "Class listing cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Class listing cache read failed");
                None
            }
        }
    }

    /// Write a snapshot back with the configured TTL
    pub async fn store(&self, snapshot: ListingSnapshot) {
        if let Err(e) = self.backend.set(&self.key, snapshot, self.ttl).await {
            tracing::warn!(key = %self.key, error = %e, "Class listing cache write-back failed");
        }
    }

    /// Drop the snapshot after a write that changed occupancy or class data
    pub async fn invalidate(&self) {
        match self.backend.delete(&self.key).await {
            Ok(()) => tracing::debug!(key = %self.key, "Class listing cache invalidated"),
            Err(e) => tracing::warn!(
                key = %self.key,
                error = %e,
                "Class listing cache invalidation failed, entry stays until its TTL expires"
            ),
        }
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::in_memory(
            Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            DEFAULT_PAGE_LIMIT,
        )
    }
}

impl std::fmt::Debug for ListingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingCache")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}
