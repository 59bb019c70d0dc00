//! Holocron Cache
//!
//! A get / put-with-ttl / evict port with interchangeable backends:
//! - [`LocalCache`]: bounded in-process cache, per-key TTL
//! - [`SharedCache`]: JSON values in an external key-value store ([`RedisBackend`])
//! - [`NoopCache`]: always misses, used when caching is disabled
//!
//! The port is fail-open. Backend and serialization failures are logged and
//! surface as a miss, never as an error. There is no read-through: callers
//! own the fetch-then-put sequence.
//!
//! # Example
//!
//! ```rust,ignore
//! use holocron_cache::{CacheConfig, CacheFactory};
//!
//! let factory = CacheFactory::from_config(CacheConfig::default()).await;
//! let cache = factory.create::<String, Template>();
//! cache.put(id.clone(), template, Duration::from_secs(1800)).await;
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod factory;
pub mod local;
pub mod noop;
pub mod port;
pub mod redis_backend;
pub mod shared;

pub use config::{CacheBackendKind, CacheConfig};
pub use error::{CacheError, CacheResult};
pub use factory::CacheFactory;
pub use local::LocalCache;
pub use noop::NoopCache;
pub use port::{CachePort, MAX_TTL};
pub use redis_backend::RedisBackend;
pub use shared::{KeyValueBackend, MemoryBackend, SharedCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
