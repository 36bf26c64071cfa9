//! Key-value cache used by the schema tasks

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;

/// Entries the in-process cache holds before evicting
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Deadlines further out than this are stored without expiry
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Shared key-value store with per-key expiry
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Cache: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> crate::Result<()>;

    /// Expire `key` after `ttl_secs`; returns false when the key is absent
    async fn expire(&self, key: &str, ttl_secs: u64) -> crate::Result<bool>;

    async fn exists(&self, key: &str) -> crate::Result<bool>;

    async fn get(&self, key: &str) -> crate::Result<Option<String>>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
}

/// Every write restarts the entry's clock with the TTL it carries
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// In-process cache backed by moka
#[derive(Debug, Clone)]
pub struct MemoryCache {
    inner: moka::future::Cache<String, Entry>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            inner: moka::future::Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(EntryExpiry)
                .build(),
        }
    }

    /// Number of stored entries once pending evictions have run
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Expire `key` after `ttl`; returns false when the key is absent
    pub async fn expire_in(&self, key: &str, ttl: Duration) -> bool {
        let Some(entry) = self.inner.get(key).await else {
            return false;
        };
        let ttl = (ttl <= MAX_TTL).then_some(ttl);
        if ttl.is_none() {
            tracing::debug!("TTL for cache entry {} exceeds the ceiling, keeping it", key);
        }
        self.inner
            .insert(
                key.to_string(),
                Entry {
                    value: entry.value,
                    ttl,
                },
            )
            .await;
        true
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn set(&self, key: &str, value: &str) -> crate::Result<()> {
        // A plain set clears any previous expiry
        self.inner
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl: None,
                },
            )
            .await;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> crate::Result<bool> {
        Ok(self.expire_in(key, Duration::from_secs(ttl_secs)).await)
    }

    async fn exists(&self, key: &str) -> crate::Result<bool> {
        Ok(self.inner.contains_key(key))
    }

    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.inner.get(key).await.map(|entry| entry.value))
    }
}
