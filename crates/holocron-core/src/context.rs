//! Shared state behind the services
//!
//! Repositories, typed caches, the clock and the optional notification pool.
//! Caches are a side channel: every read can fall through to the store and
//! every write refreshes the cache after the store write.

use crate::clock::Clock;
use crate::config::TtlConfig;
use crate::error::StoreResult;
use crate::notifications::{EventKind, NotificationEvent, NotificationWorkerPool};
use crate::responses::ResponseStore;
use crate::store::{DocumentQuery, DocumentStore, Repository};
use chrono::{DateTime, Utc};
use holocron_cache::{CacheFactory, CachePort};
use holocron_model::{CeremonyTemplate, Team, TeamMembership, UserId};
use std::sync::Arc;

/// Everything a service needs, shared between services
pub struct ServiceContext {
    pub(crate) templates: Repository<CeremonyTemplate>,
    pub(crate) teams: Repository<Team>,
    pub(crate) memberships: Repository<TeamMembership>,
    pub(crate) responses: ResponseStore,
    pub(crate) template_cache: Arc<dyn CachePort<String, CeremonyTemplate>>,
    pub(crate) team_cache: Arc<dyn CachePort<String, Team>>,
    pub(crate) ttl: TtlConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) notifier: Option<Arc<NotificationWorkerPool>>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("template_cache", &self.template_cache.backend_name())
            .field("team_cache", &self.team_cache.backend_name())
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl ServiceContext {
    /// Context over `store` with caches from `caches`
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        caches: &CacheFactory,
        ttl: TtlConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            templates: Repository::new(Arc::clone(&store)),
            teams: Repository::new(Arc::clone(&store)),
            memberships: Repository::new(Arc::clone(&store)),
            responses: ResponseStore::new(store),
            template_cache: caches.create_scoped("template"),
            team_cache: caches.create_scoped("team"),
            ttl,
            clock,
            notifier: None,
        }
    }

    /// Emit events through `pool`
    #[must_use]
    pub fn with_notifier(mut self, pool: Arc<NotificationWorkerPool>) -> Self {
        self.notifier = Some(pool);
        self
    }

    /// Current instant
    #[inline]
    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Membership of `user` in `team_id`, if any
    pub(crate) async fn membership(
        &self,
        team_id: &str,
        user: Option<&UserId>,
    ) -> StoreResult<Option<TeamMembership>> {
        match user {
            Some(user) if !team_id.is_empty() => {
                self.memberships
                    .find_by_id(&TeamMembership::key_for(team_id, user))
                    .await
            }
            _ => Ok(None),
        }
    }

    /// Template by id, cache first
    pub(crate) async fn load_template(&self, id: &str) -> StoreResult<Option<CeremonyTemplate>> {
        let key = id.to_string();
        if let Some(template) = self.template_cache.get(&key).await {
            tracing::debug!(template_id = %id, "template cache hit");
            return Ok(Some(template));
        }
        tracing::debug!(template_id = %id, "template cache miss");

        let found = self.templates.find_by_id(id).await?;
        if let Some(template) = &found {
            self.cache_template(template).await;
        }
        Ok(found)
    }

    /// Refresh the cached copy of `template`
    pub(crate) async fn cache_template(&self, template: &CeremonyTemplate) {
        self.template_cache
            .put(
                template.id().to_string(),
                template.clone(),
                self.ttl.template_ttl(),
            )
            .await;
    }

    /// Team by id, cache first
    pub(crate) async fn load_team(&self, id: &str) -> StoreResult<Option<Team>> {
        let key = id.to_string();
        if let Some(team) = self.team_cache.get(&key).await {
            tracing::debug!(team_id = %id, "team cache hit");
            return Ok(Some(team));
        }
        tracing::debug!(team_id = %id, "team cache miss");

        let found = self.teams.find_by_id(id).await?;
        if let Some(team) = &found {
            self.cache_team(team).await;
        }
        Ok(found)
    }

    /// Refresh the cached copy of `team`
    pub(crate) async fn cache_team(&self, team: &Team) {
        self.team_cache
            .put(team.id.clone(), team.clone(), self.ttl.team_ttl())
            .await;
    }

    /// Raise `kind` for `template`
    ///
    /// A `ResponseSubmitted` that brings the response count to the team size
    /// also raises `CeremonyCompleted`. Nothing is raised without a pool or
    /// without destinations. Lookup failures are logged and swallowed.
    pub(crate) async fn notify(
        &self,
        kind: EventKind,
        template: &CeremonyTemplate,
        actor: Option<&UserId>,
    ) {
        let Some(pool) = &self.notifier else { return };
        let destinations = template.notification_settings();
        if !destinations.has_destinations() {
            return;
        }

        let (team_name, total_members, total_responses) = match self.event_counts(template).await
        {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(
                    kind = ?kind,
                    template_id = %template.id(),
                    error = %e,
                    "cannot build notification, skipping"
                );
                return;
            }
        };

        let event = NotificationEvent {
            kind,
            template_id: template.id().to_string(),
            template_title: template.title().to_string(),
            team_name,
            user_email: actor
                .filter(|user| !user.is_anonymous())
                .map(ToString::to_string),
            total_responses,
            total_members,
            webhook_urls: destinations.webhook_urls.clone(),
            email_addresses: destinations.email_addresses.clone(),
            occurred_at: self.now(),
        };

        let completes = kind == EventKind::ResponseSubmitted
            && total_members > 0
            && total_responses == total_members;
        let completed = completes.then(|| NotificationEvent {
            kind: EventKind::CeremonyCompleted,
            ..event.clone()
        });
        pool.enqueue(event);
        if let Some(completed) = completed {
            pool.enqueue(completed);
        }
    }

    async fn event_counts(&self, template: &CeremonyTemplate) -> StoreResult<(String, usize, usize)> {
        let team_name = self
            .load_team(template.team_id())
            .await?
            .map(|team| team.display_name)
            .unwrap_or_default();
        let total_members = self
            .memberships
            .count(&DocumentQuery::new().with_parent(template.team_id()))
            .await?;
        let total_responses = self.responses.count_for_template(template.id()).await?;
        Ok((team_name, total_members, total_responses))
    }
}
