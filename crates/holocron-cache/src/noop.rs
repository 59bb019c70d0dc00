//! Always-miss cache

use crate::port::CachePort;
use async_trait::async_trait;
use std::marker::PhantomData;
use std::time::Duration;

/// Cache that stores nothing
#[derive(Debug)]
pub struct NoopCache<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> NoopCache<K, V> {
    /// Create no-op cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> Default for NoopCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> CachePort<K, V> for NoopCache<K, V>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    async fn get(&self, _key: &K) -> Option<V> {
        None
    }

    async fn put(&self, _key: K, _value: V, _ttl: Duration) {}

    async fn evict(&self, _key: &K) {}

    fn default_ttl(&self) -> Duration {
        Duration::ZERO
    }

    fn backend_name(&self) -> &'static str {
        "noop"
    }
}
