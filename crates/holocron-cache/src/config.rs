//! Cache configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which backend serves the cache port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// Bounded in-process cache
    #[default]
    Local,
    /// Shared key-value store (Redis)
    Distributed,
}

impl CacheBackendKind {
    /// Parse the `CACHE_TYPE` spelling; anything but `distributed` means local
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("distributed") {
            Self::Distributed
        } else {
            Self::Local
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend selection
    pub backend: CacheBackendKind,
    /// Maximum entries held by the local backend; 0 disables caching
    pub max_capacity: u64,
    /// Default TTL in seconds
    pub default_ttl_secs: u64,
    /// Redis connection URL for the distributed backend
    pub redis_url: String,
    /// Prefix prepended to every distributed key
    pub key_prefix: String,
    /// Seconds to wait for the distributed backend at startup
    pub connect_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Local,
            max_capacity: 10_000,
            default_ttl_secs: 3_600,
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "holocron:".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

impl CacheConfig {
    /// Set backend
    #[must_use]
    pub fn with_backend(mut self, backend: CacheBackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set max capacity
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set default TTL
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_secs = ttl.as_secs();
        self
    }

    /// Set Redis URL
    #[must_use]
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    /// Default TTL as a duration
    #[inline]
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Connect timeout as a duration
    #[inline]
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
