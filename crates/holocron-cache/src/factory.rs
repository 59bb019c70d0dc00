//! Configuration-driven backend selection
//!
//! The factory connects once and then hands out any number of typed caches
//! sharing that connection. A distributed backend that cannot connect at
//! startup degrades to the local backend with a warning.

use crate::config::{CacheBackendKind, CacheConfig};
use crate::local::LocalCache;
use crate::noop::NoopCache;
use crate::port::CachePort;
use crate::redis_backend::RedisBackend;
use crate::shared::{KeyValueBackend, MemoryBackend, SharedCache};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Selected {
    Local,
    Redis(RedisBackend),
    Memory(MemoryBackend),
    Disabled,
}

/// Builds [`CachePort`] instances for the configured backend
#[derive(Debug, Clone)]
pub struct CacheFactory {
    config: CacheConfig,
    selected: Selected,
}

impl CacheFactory {
    /// Create factory from configuration, connecting when distributed
    ///
    /// Never fails. A distributed backend that cannot be reached is replaced
    /// by the local backend; `max_capacity == 0` disables caching.
    pub async fn from_config(config: CacheConfig) -> Self {
        let selected = if config.max_capacity == 0 {
            tracing::info!("cache disabled (max_capacity = 0)");
            Selected::Disabled
        } else {
            match config.backend {
                CacheBackendKind::Local => Selected::Local,
                CacheBackendKind::Distributed => {
                    match RedisBackend::connect(&config.redis_url, config.connect_timeout()).await
                    {
                        Ok(backend) => Selected::Redis(backend),
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                "distributed cache unavailable, falling back to local cache"
                            );
                            Selected::Local
                        }
                    }
                }
            }
        };

        let factory = Self { config, selected };
        tracing::info!(backend = factory.backend_name(), "cache backend selected");
        factory
    }

    /// Factory for the local backend, ignoring the configured kind
    #[must_use]
    pub fn local(config: CacheConfig) -> Self {
        Self {
            config,
            selected: Selected::Local,
        }
    }

    /// Factory over an in-process key-value backend
    #[must_use]
    pub fn with_memory_backend(config: CacheConfig, backend: MemoryBackend) -> Self {
        Self {
            config,
            selected: Selected::Memory(backend),
        }
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Name of the backend every created cache uses
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        match &self.selected {
            Selected::Local => "local",
            Selected::Redis(backend) => backend.name(),
            Selected::Memory(backend) => backend.name(),
            Selected::Disabled => "noop",
        }
    }

    /// Build a typed cache
    #[must_use]
    pub fn create<K, V>(&self) -> Arc<dyn CachePort<K, V>>
    where
        K: Hash + Eq + Display + Send + Sync + 'static,
        V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.build(self.config.key_prefix.clone())
    }

    /// Build a typed cache whose shared keys live under `scope`
    ///
    /// Keeps caches of different value types apart on a shared backend:
    /// keys become `key_prefix + scope + ":" + key`.
    #[must_use]
    pub fn create_scoped<K, V>(&self, scope: &str) -> Arc<dyn CachePort<K, V>>
    where
        K: Hash + Eq + Display + Send + Sync + 'static,
        V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.build(format!("{}{scope}:", self.config.key_prefix))
    }

    fn build<K, V>(&self, prefix: String) -> Arc<dyn CachePort<K, V>>
    where
        K: Hash + Eq + Display + Send + Sync + 'static,
        V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let ttl = self.config.default_ttl();
        match &self.selected {
            Selected::Local => Arc::new(LocalCache::new(self.config.max_capacity, ttl)),
            Selected::Redis(backend) => Arc::new(SharedCache::new(backend.clone(), prefix, ttl)),
            Selected::Memory(backend) => Arc::new(SharedCache::new(backend.clone(), prefix, ttl)),
            Selected::Disabled => Arc::new(NoopCache::new()),
        }
    }
}
