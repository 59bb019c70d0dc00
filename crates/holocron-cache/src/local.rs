//! Bounded in-process cache using moka
//!
//! Each moka entry is a [`Slot`] holding the value together with its own TTL
//! and deadline. Key, value and expiry live in one entry, so capacity
//! eviction, TTL expiry and explicit eviction always drop them together.

use crate::port::{CachePort, MAX_TTL};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Value plus its expiry
#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    ttl: Duration,
    // None when the clock cannot represent the deadline
    deadline: Option<Instant>,
}

impl<V> Slot<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let ttl = ttl.min(MAX_TTL);
        Self {
            value,
            ttl,
            deadline: Instant::now().checked_add(ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// Per-entry expiry policy reading the TTL stored in each slot
struct SlotExpiry;

impl<K, V> Expiry<K, Slot<V>> for SlotExpiry {
    fn expire_after_create(&self, _key: &K, slot: &Slot<V>, _created_at: Instant) -> Option<Duration> {
        Some(slot.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        slot: &Slot<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(slot.ttl)
    }
}

/// Bounded in-process cache with per-key TTL
pub struct LocalCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, Slot<V>>,
    default_ttl: Duration,
}

impl<K, V> Clone for LocalCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

impl<K, V> std::fmt::Debug for LocalCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("max_capacity", &self.inner.policy().max_capacity())
            .field("entry_count", &self.inner.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl<K, V> LocalCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create cache holding at most `max_capacity` entries
    #[must_use]
    pub fn new(max_capacity: u64, default_ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(SlotExpiry)
            .build();

        tracing::debug!(
            max_capacity,
            ttl_seconds = default_ttl.as_secs(),
            "local cache created"
        );

        Self { inner, default_ttl }
    }

    /// Approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Apply pending evictions so counts are exact
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Drop every entry
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[async_trait]
impl<K, V> CachePort<K, V> for LocalCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let slot = self.inner.get(key).await?;
        if slot.is_expired(Instant::now()) {
            // moka's timer wheel may lag the deadline slightly
            self.inner.invalidate(key).await;
            return None;
        }
        Some(slot.value)
    }

    async fn put(&self, key: K, value: V, ttl: Duration) {
        self.inner.insert(key, Slot::new(value, ttl)).await;
    }

    async fn evict(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> LocalCache<String, String> {
        LocalCache::new(100, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn put_then_get() {
        let cache = cache();
        cache.put("k".to_string(), "v".to_string(), Duration::from_secs(60)).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn miss_on_unknown_key() {
        assert_eq!(cache().get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache = cache();
        cache.put("k".to_string(), "v".to_string(), Duration::from_millis(50)).await;
        assert!(cache.get(&"k".to_string()).await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get(&"k".to_string()).await, None);
    }

    #[tokio::test]
    async fn evict_removes_immediately() {
        let cache = cache();
        cache.put("k".to_string(), "v".to_string(), Duration::from_secs(3600)).await;
        cache.evict(&"k".to_string()).await;
        assert_eq!(cache.get(&"k".to_string()).await, None);
    }

    #[tokio::test]
    async fn overwrite_replaces_value_and_ttl() {
        let cache = cache();
        cache.put("k".to_string(), "old".to_string(), Duration::from_millis(30)).await;
        cache.put("k".to_string(), "new".to_string(), Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn put_default_uses_default_ttl() {
        let cache: LocalCache<u32, u32> = LocalCache::new(10, Duration::from_millis(40));
        cache.put_default(1, 10).await;
        assert_eq!(cache.get(&1).await, Some(10));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.get(&1).await, None);
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache: LocalCache<u32, u32> = LocalCache::new(10, Duration::from_secs(60));
        for i in 0..200 {
            cache.put(i, i, Duration::from_secs(60)).await;
        }
        cache.run_pending_tasks().await;
        assert!(cache.entry_count() <= 10);
    }

    #[tokio::test]
    async fn huge_ttl_is_clamped() {
        let cache: LocalCache<u32, u32> = LocalCache::new(10, Duration::from_secs(60));
        cache.put(1, 1, Duration::from_secs(u64::MAX)).await;
        cache.put(2, 2, Duration::MAX).await;
        assert_eq!(cache.get(&1).await, Some(1));
        assert_eq!(cache.get(&2).await, Some(2));

        let slot = Slot::new(0u8, Duration::MAX);
        assert_eq!(slot.ttl, MAX_TTL);
        assert!(!slot.is_expired(Instant::now()));
    }

    #[tokio::test]
    async fn concurrent_access_is_consistent() {
        let cache: LocalCache<u32, u32> = LocalCache::new(1_000, Duration::from_secs(60));
        let mut handles = Vec::new();
        for task in 0..8u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50u32 {
                    let key = task * 100 + i;
                    cache.put(key, key * 2, Duration::from_secs(60)).await;
                    assert_eq!(cache.get(&key).await, Some(key * 2));
                    if i % 2 == 0 {
                        cache.evict(&key).await;
                        assert_eq!(cache.get(&key).await, None);
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
