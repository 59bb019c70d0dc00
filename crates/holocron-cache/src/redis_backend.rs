//! Redis key-value backend
//!
//! Uses `redis::aio::ConnectionManager` for a multiplexed connection with
//! automatic reconnection.

use crate::error::{CacheError, CacheResult};
use crate::shared::KeyValueBackend;
use async_trait::async_trait;
use std::time::Duration;

/// Redis-backed [`KeyValueBackend`]
#[derive(Clone)]
pub struct RedisBackend {
    connection_manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisBackend {
    /// Connect to `url`, giving up after `timeout`
    ///
    /// # Errors
    /// [`CacheError::Connection`] when the URL is invalid or the server is unreachable
    pub async fn connect(url: &str, timeout: Duration) -> CacheResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Connection(format!("invalid redis url: {e}")))?;

        let connection_manager =
            tokio::time::timeout(timeout, redis::aio::ConnectionManager::new(client))
                .await
                .map_err(|_| CacheError::Connection(format!("timed out after {timeout:?}")))?
                .map_err(|e| CacheError::Connection(format!("failed to connect to redis: {e}")))?;

        tracing::debug!(url = %redact_url(url), "redis cache backend connected");

        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("GET failed: {e}")))?;

        tracing::debug!(key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_seconds)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("SETEX failed: {e}")))?;

        tracing::debug!(key, ttl_seconds, "redis SETEX");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("DEL failed: {e}")))?;

        tracing::debug!(key, "redis DEL");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Strip credentials from a connection URL before logging it
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
