//! Service configuration
//!
//! Loaded from TOML, then adjusted by environment overrides:
//! - `CACHE_TYPE`: `local` or `distributed`
//! - `REDIS_URI`: Redis connection URL
//! - `HOLOCRON_LOG`: tracing filter directive

use crate::error::ConfigError;
use holocron_cache::{CacheBackendKind, CacheConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// TTLs for the service's caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    /// Template cache TTL in seconds
    pub template_ttl_secs: u64,
    /// Team cache TTL in seconds
    pub team_ttl_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            template_ttl_secs: 30 * 60,
            team_ttl_secs: 30 * 60,
        }
    }
}

impl TtlConfig {
    /// Template cache TTL
    #[inline]
    #[must_use]
    pub fn template_ttl(&self) -> Duration {
        Duration::from_secs(self.template_ttl_secs)
    }

    /// Team cache TTL
    #[inline]
    #[must_use]
    pub fn team_ttl(&self) -> Duration {
        Duration::from_secs(self.team_ttl_secs)
    }
}

/// Notification worker pool sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Bounded queue length; events beyond it are dropped
    pub queue_capacity: usize,
    /// Worker task count
    pub workers: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            workers: 2,
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolocronConfig {
    /// Cache backend
    pub cache: CacheConfig,
    /// Cache TTLs
    pub ttl: TtlConfig,
    /// Notification delivery
    pub notifications: NotificationConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl HolocronConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed input
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] when unreadable, [`ConfigError::Parse`] when malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable source
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(kind) = lookup("CACHE_TYPE") {
            self.cache.backend = CacheBackendKind::from_env_value(&kind);
        }
        if let Some(url) = lookup("REDIS_URI") {
            self.cache.redis_url = url;
        }
        if let Some(filter) = lookup("HOLOCRON_LOG") {
            self.logging.filter = filter;
        }
        self
    }

    /// Set cache config
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set TTLs
    #[must_use]
    pub fn with_ttl(mut self, ttl: TtlConfig) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set notification pool sizing
    #[must_use]
    pub fn with_notifications(mut self, notifications: NotificationConfig) -> Self {
        self.notifications = notifications;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = HolocronConfig::default();
        assert_eq!(config.cache.backend, CacheBackendKind::Local);
        assert_eq!(config.ttl.template_ttl(), Duration::from_secs(1800));
        assert_eq!(config.notifications.queue_capacity, 256);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = HolocronConfig::from_toml_str(
            r#"
            [cache]
            backend = "distributed"
            max_capacity = 50

            [notifications]
            workers = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.backend, CacheBackendKind::Distributed);
        assert_eq!(config.cache.max_capacity, 50);
        assert_eq!(config.cache.default_ttl_secs, 3600);
        assert_eq!(config.notifications.workers, 4);
        assert_eq!(config.notifications.queue_capacity, 256);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = HolocronConfig::from_toml_str("[cache\nbackend = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\njson = true").unwrap();

        let config = HolocronConfig::load(file.path()).unwrap();
        assert!(config.logging.json);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HolocronConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CACHE_TYPE", "Distributed"),
            ("REDIS_URI", "redis://cache:6380"),
            ("HOLOCRON_LOG", "holocron=debug"),
        ]);
        let config = HolocronConfig::default()
            .apply_overrides(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.cache.backend, CacheBackendKind::Distributed);
        assert_eq!(config.cache.redis_url, "redis://cache:6380");
        assert_eq!(config.logging.filter, "holocron=debug");
    }
}
