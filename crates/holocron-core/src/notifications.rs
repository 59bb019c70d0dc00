//! Ceremony notifications
//!
//! Events are handed to a [`NotificationWorkerPool`]: a bounded queue drained
//! by a fixed number of worker tasks, each forwarding to the external
//! [`NotificationDispatcher`]. Enqueueing never blocks the request path. A
//! full queue drops the event with a warning, and dispatch failures are
//! logged without retry.

use crate::config::NotificationConfig;
use crate::error::NotificationError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A template was created
    CeremonyStarted,
    /// A response was submitted
    ResponseSubmitted,
    /// Every team member has responded
    CeremonyCompleted,
}

/// Event payload handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Event kind
    pub kind: EventKind,
    /// Template id
    pub template_id: String,
    /// Template title
    pub template_title: String,
    /// Owning team's display name
    pub team_name: String,
    /// Acting user; absent for anonymous respondents
    pub user_email: Option<String>,
    /// Responses recorded for the template so far
    pub total_responses: usize,
    /// Team membership count
    pub total_members: usize,
    /// Webhook destinations
    pub webhook_urls: Vec<String>,
    /// E-mail destinations
    pub email_addresses: Vec<String>,
    /// When the event was raised
    pub occurred_at: DateTime<Utc>,
}

/// Outbound delivery port
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver one event to all of its destinations
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotificationError>;
}

/// Dispatcher that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        for url in &event.webhook_urls {
            tracing::info!(kind = ?event.kind, template_id = %event.template_id, url = %url, "webhook notification");
        }
        for email in &event.email_addresses {
            tracing::info!(
                kind = ?event.kind,
                template_id = %event.template_id,
                to = %email,
                subject = %format!("[{}] {}", event.team_name, event.template_title),
                "email notification"
            );
        }
        Ok(())
    }
}

/// Pool counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationStats {
    /// Events accepted into the queue
    pub enqueued: u64,
    /// Events rejected (queue full or closed)
    pub dropped: u64,
    /// Events the dispatcher accepted
    pub delivered: u64,
    /// Events the dispatcher failed
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Bounded queue plus worker tasks feeding a dispatcher
pub struct NotificationWorkerPool {
    sender: Mutex<Option<mpsc::Sender<NotificationEvent>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for NotificationWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationWorkerPool")
            .field("open", &self.sender.lock().is_some())
            .field("workers", &self.workers.lock().len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl NotificationWorkerPool {
    /// Spawn workers on the current runtime
    ///
    /// Queue capacity and worker count are clamped to at least one.
    #[must_use]
    pub fn start(config: &NotificationConfig, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let counters = Arc::new(Counters::default());

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                tokio::spawn(worker_task(
                    worker,
                    Arc::clone(&rx),
                    Arc::clone(&dispatcher),
                    Arc::clone(&counters),
                ))
            })
            .collect();

        tracing::debug!(
            workers = config.workers.max(1),
            queue_capacity = config.queue_capacity.max(1),
            "notification pool started"
        );

        Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            counters,
        }
    }

    /// Queue an event without waiting
    ///
    /// Returns `false` when the event was dropped.
    pub fn enqueue(&self, event: NotificationEvent) -> bool {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(kind = ?event.kind, template_id = %event.template_id, "notification pool shut down, dropping event");
            return false;
        };

        match sender.try_send(event) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(kind = ?event.kind, template_id = %event.template_id, "notification queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(kind = ?event.kind, template_id = %event.template_id, "notification queue closed, dropping event");
                false
            }
        }
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Close the queue and wait for workers to drain it
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());
        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "notification worker panicked");
            }
        }
        tracing::debug!(stats = ?self.stats(), "notification pool stopped");
    }
}

/// Worker loop (runs in separate tokio task)
async fn worker_task(
    worker: usize,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<NotificationEvent>>>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    counters: Arc<Counters>,
) {
    loop {
        // Hold the receiver only while waiting, not while dispatching
        let next = rx.lock().await.recv().await;
        let Some(event) = next else { break };

        match dispatcher.dispatch(&event).await {
            Ok(()) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(worker, kind = ?event.kind, template_id = %event.template_id, error = %e, "notification dispatch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_test_utils::epoch;

    fn event(kind: EventKind) -> NotificationEvent {
        NotificationEvent {
            kind,
            template_id: "t1".to_string(),
            template_title: "Standup".to_string(),
            team_name: "Platform".to_string(),
            user_email: Some("dev@x.com".to_string()),
            total_responses: 1,
            total_members: 3,
            webhook_urls: vec!["https://hooks.example.com/x".to_string()],
            email_addresses: Vec::new(),
            occurred_at: epoch(),
        }
    }

    fn config(queue_capacity: usize, workers: usize) -> NotificationConfig {
        NotificationConfig {
            queue_capacity,
            workers,
        }
    }

    #[tokio::test]
    async fn every_event_reaches_the_dispatcher() {
        let mut mock = MockNotificationDispatcher::new();
        mock.expect_dispatch().times(5).returning(|_| Ok(()));
        let dispatcher = Arc::new(mock);

        let pool = NotificationWorkerPool::start(&config(16, 2), dispatcher.clone());
        for _ in 0..5 {
            assert!(pool.enqueue(event(EventKind::ResponseSubmitted)));
        }
        pool.shutdown().await;

        assert_eq!(pool.stats().delivered, 5);
        drop(pool);
        drop(dispatcher);
    }

    #[tokio::test]
    async fn dispatch_failures_are_counted_not_raised() {
        let mut mock = MockNotificationDispatcher::new();
        mock.expect_dispatch()
            .times(2)
            .returning(|_| Err(NotificationError("smtp down".to_string())));

        let pool = NotificationWorkerPool::start(&config(4, 1), Arc::new(mock));
        assert!(pool.enqueue(event(EventKind::CeremonyStarted)));
        assert!(pool.enqueue(event(EventKind::CeremonyCompleted)));
        pool.shutdown().await;

        let stats = pool.stats();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.delivered, 0);
    }

    /// Dispatcher that parks until released
    struct Gate(tokio::sync::Semaphore);

    #[async_trait]
    impl NotificationDispatcher for Gate {
        async fn dispatch(&self, _event: &NotificationEvent) -> Result<(), NotificationError> {
            let _permit = self.0.acquire().await.map_err(|e| NotificationError(e.to_string()))?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let gate = Arc::new(Gate(tokio::sync::Semaphore::new(0)));
        let pool = NotificationWorkerPool::start(&config(1, 1), gate.clone());

        let accepted = (0..10)
            .filter(|_| pool.enqueue(event(EventKind::ResponseSubmitted)))
            .count();
        // One in flight at most plus one queued
        assert!(accepted <= 2, "accepted {accepted}");
        assert!(pool.stats().dropped >= 8);

        gate.0.add_permits(10);
        pool.shutdown().await;
        assert_eq!(pool.stats().delivered as usize, accepted);
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_is_dropped() {
        let pool = NotificationWorkerPool::start(&config(4, 1), Arc::new(LoggingDispatcher));
        pool.shutdown().await;
        assert!(!pool.enqueue(event(EventKind::CeremonyStarted)));
        assert_eq!(pool.stats().dropped, 1);
    }

    #[tokio::test]
    async fn logging_dispatcher_accepts_everything() {
        let mut e = event(EventKind::CeremonyStarted);
        e.email_addresses.push("team@example.com".to_string());
        assert!(LoggingDispatcher.dispatch(&e).await.is_ok());
    }
}
