//! Assembled services

use crate::clock::{Clock, SystemClock};
use crate::config::HolocronConfig;
use crate::context::ServiceContext;
use crate::notifications::{NotificationDispatcher, NotificationStats, NotificationWorkerPool};
use crate::service::CeremonyService;
use crate::store::DocumentStore;
use crate::team::TeamService;
use holocron_cache::CacheFactory;
use std::sync::Arc;

/// Ceremony and team services sharing one context and notification pool
#[derive(Debug)]
pub struct Holocron {
    ceremonies: CeremonyService,
    teams: TeamService,
    notifier: Arc<NotificationWorkerPool>,
    cache_backend: &'static str,
}

impl Holocron {
    /// Wire services from configuration on the wall clock
    ///
    /// Must run inside a tokio runtime; the notification workers are
    /// spawned on it. An unreachable distributed cache falls back to the
    /// local one.
    pub async fn from_config(
        config: &HolocronConfig,
        store: Arc<dyn DocumentStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self::with_clock(config, store, dispatcher, Arc::new(SystemClock)).await
    }

    /// Wire services with an explicit clock
    pub async fn with_clock(
        config: &HolocronConfig,
        store: Arc<dyn DocumentStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let caches = CacheFactory::from_config(config.cache.clone()).await;
        let notifier = Arc::new(NotificationWorkerPool::start(
            &config.notifications,
            dispatcher,
        ));
        let ctx = Arc::new(
            ServiceContext::new(store, &caches, config.ttl.clone(), clock)
                .with_notifier(Arc::clone(&notifier)),
        );

        tracing::info!(
            cache = caches.backend_name(),
            workers = config.notifications.workers,
            "holocron services ready"
        );

        Self {
            ceremonies: CeremonyService::new(Arc::clone(&ctx)),
            teams: TeamService::new(ctx),
            notifier,
            cache_backend: caches.backend_name(),
        }
    }

    /// Template, response and analytics operations
    #[inline]
    #[must_use]
    pub fn ceremonies(&self) -> &CeremonyService {
        &self.ceremonies
    }

    /// Team operations
    #[inline]
    #[must_use]
    pub fn teams(&self) -> &TeamService {
        &self.teams
    }

    /// Name of the selected cache backend
    #[inline]
    #[must_use]
    pub fn cache_backend(&self) -> &'static str {
        self.cache_backend
    }

    /// Notification counters
    #[must_use]
    pub fn notification_stats(&self) -> NotificationStats {
        self.notifier.stats()
    }

    /// Stop accepting events and drain the queue
    pub async fn shutdown(&self) {
        self.notifier.shutdown().await;
        tracing::info!("holocron services stopped");
    }
}
