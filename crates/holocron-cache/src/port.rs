//! The cache port

use async_trait::async_trait;
use std::time::Duration;

/// Longest TTL any backend honors; longer ones are shortened to this
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Time-to-live cache contract
///
/// Every operation is infallible from the caller's point of view. A backend
/// that cannot serve a read reports a miss; one that cannot write drops the
/// write. Implementations must tolerate concurrent use from many tasks.
#[async_trait]
pub trait CachePort<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Cached value, or `None` on miss or expiry
    async fn get(&self, key: &K) -> Option<V>;

    /// Store `value` under `key` until `ttl` elapses
    ///
    /// Replaces any existing entry together with its expiry.
    async fn put(&self, key: K, value: V, ttl: Duration);

    /// Remove `key` immediately
    async fn evict(&self, key: &K);

    /// TTL applied by [`CachePort::put_default`]
    fn default_ttl(&self) -> Duration;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;

    /// Store with the backend's default TTL
    async fn put_default(&self, key: K, value: V) {
        let ttl = self.default_ttl();
        self.put(key, value, ttl).await;
    }
}
