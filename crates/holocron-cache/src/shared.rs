//! Shared key-value cache
//!
//! Values are stored as JSON text under `prefix + key`. TTLs are passed to
//! the backend's native expiry in whole seconds, minimum one.

use crate::error::{CacheError, CacheResult};
use crate::port::{CachePort, MAX_TTL};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// String key-value store with native expiry
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Stored text, `None` on miss
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store text expiring after `ttl_seconds`
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()>;

    /// Remove a key
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// TTL in whole seconds, between one and [`MAX_TTL`]
#[inline]
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.min(MAX_TTL).as_secs().max(1)
}

/// Cache port over a [`KeyValueBackend`]
pub struct SharedCache<B, K, V> {
    backend: B,
    prefix: String,
    default_ttl: Duration,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<B: Clone, K, V> Clone for SharedCache<B, K, V> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            prefix: self.prefix.clone(),
            default_ttl: self.default_ttl,
            _marker: PhantomData,
        }
    }
}

impl<B: KeyValueBackend, K, V> std::fmt::Debug for SharedCache<B, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCache")
            .field("backend", &self.backend.name())
            .field("prefix", &self.prefix)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl<B, K, V> SharedCache<B, K, V>
where
    B: KeyValueBackend,
    K: Display,
{
    /// Create cache over `backend`
    #[must_use]
    pub fn new(backend: B, prefix: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            default_ttl,
            _marker: PhantomData,
        }
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn full_key(&self, key: &K) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl<B, K, V> CachePort<K, V> for SharedCache<B, K, V>
where
    B: KeyValueBackend,
    K: Display + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let full_key = self.full_key(key);
        let text = match self.backend.get(&full_key).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %full_key, backend = self.backend.name(), error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "cached value undecodable, treating as miss");
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Duration) {
        let full_key = self.full_key(&key);
        let text = match serde_json::to_string(&value) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "cache value not encodable, skipping write");
                return;
            }
        };

        if let Err(e) = self
            .backend
            .set_ex(&full_key, &text, ttl_seconds(ttl))
            .await
        {
            tracing::warn!(key = %full_key, backend = self.backend.name(), error = %e, "cache write failed");
        }
    }

    async fn evict(&self, key: &K) {
        let full_key = self.full_key(key);
        if let Err(e) = self.backend.delete(&full_key).await {
            tracing::warn!(key = %full_key, backend = self.backend.name(), error = %e, "cache evict failed");
        }
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

/// In-process [`KeyValueBackend`] with lazy expiry
///
/// Stands in for Redis in tests and single-node tooling. Can be switched
/// into an unavailable state where every command fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<DashMap<String, (String, Option<Instant>)>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryBackend {
    /// Create empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent command fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Store raw text, bypassing encoding
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let deadline = Instant::now().checked_add(ttl.min(MAX_TTL));
        self.entries.insert(key.into(), (value.into(), deadline));
    }

    /// Raw text under a full key, ignoring expiry
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.0.clone())
    }

    /// Number of stored keys, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no keys are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Connection("memory backend marked unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_available()?;
        let now = Instant::now();
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.1.map_or(true, |deadline| now < deadline) => {
                return Ok(Some(entry.0.clone()))
            }
            Some(_) => {}
        }
        self.entries
            .remove_if(key, |_, (_, deadline)| deadline.is_some_and(|d| now >= d));
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        self.check_available()?;
        self.insert_raw(key, value, Duration::from_secs(ttl_seconds));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.check_available()?;
        self.entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
