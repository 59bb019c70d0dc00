//! Ceremony service
//!
//! Orchestrates access checks, the store, the template cache, the analytics
//! engine and notifications for each ceremony operation. Every operation
//! takes the caller's identity, absent when unauthenticated.

use crate::context::ServiceContext;
use crate::error::{CeremonyError, CeremonyResult};
use crate::notifications::EventKind;
use crate::responses::ResponseSubmission;
use crate::store::{DocumentQuery, TimeRange};
use futures::future::try_join_all;
use holocron_access::{
    can_create_or_edit, can_view, can_view_responses, require_identity, require_member,
    TemplateAction,
};
use holocron_analytics::{
    cross_tabulate, is_active, summarize_questions, team_health, CeremonyStatus, CrossTabGroup,
    HealthSnapshot, QuestionSummary, TeamMetric,
};
use holocron_model::{new_id, CeremonyResponse, CeremonyTemplate, TemplateDraft, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An open ceremony and whether the caller has answered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCeremony {
    /// The ceremony's template
    pub template: CeremonyTemplate,
    /// Caller's status
    pub status: CeremonyStatus,
}

/// Template, response and analytics operations
#[derive(Debug, Clone)]
pub struct CeremonyService {
    ctx: Arc<ServiceContext>,
}

impl CeremonyService {
    /// Service over a shared context
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Create a template for `draft.team_id`
    ///
    /// Fills in the id when empty, the creator and both timestamps.
    ///
    /// # Errors
    /// - [`CeremonyError::AuthenticationRequired`] without identity
    /// - [`CeremonyError::InvalidArgument`] for an empty team, an invalid draft or a taken id
    /// - [`CeremonyError::PermissionDenied`] unless the caller leads the team
    pub async fn create_template(
        &self,
        user: Option<&UserId>,
        mut draft: TemplateDraft,
    ) -> CeremonyResult<CeremonyTemplate> {
        let membership = self.ctx.membership(&draft.team_id, user).await?;
        can_create_or_edit(&draft.team_id, user, membership.as_ref(), TemplateAction::Create)?;
        let creator = require_identity(user)?;

        let now = self.ctx.now();
        if draft.id.trim().is_empty() {
            draft.id = new_id();
        }
        draft.creator_id = Some(creator.clone());
        draft.created_at = now;
        draft.updated_at = now;
        let template = draft.build()?;

        if !self.ctx.templates.create(&template).await? {
            return Err(CeremonyError::InvalidArgument(format!(
                "template {} already exists",
                template.id()
            )));
        }
        self.ctx.cache_template(&template).await;
        tracing::info!(
            template_id = %template.id(),
            team_id = %template.team_id(),
            creator = %creator,
            "template created"
        );

        self.ctx
            .notify(EventKind::CeremonyStarted, &template, Some(creator))
            .await;
        Ok(template)
    }

    /// Replace an existing template
    ///
    /// Id, team, creator and creation time come from the stored copy.
    ///
    /// # Errors
    /// - [`CeremonyError::InvalidArgument`] without an id or for an invalid draft
    /// - [`CeremonyError::NotFound`] when no such template exists
    /// - [`CeremonyError::PermissionDenied`] unless the caller leads the stored template's team
    pub async fn update_template(
        &self,
        user: Option<&UserId>,
        mut draft: TemplateDraft,
    ) -> CeremonyResult<CeremonyTemplate> {
        require_identity(user)?;
        if draft.id.trim().is_empty() {
            return Err(CeremonyError::InvalidArgument("id is required".to_string()));
        }

        // Authorize against the stored copy, never the cache
        let existing = self
            .ctx
            .templates
            .find_by_id(&draft.id)
            .await?
            .ok_or_else(|| CeremonyError::not_found("template", &draft.id))?;
        let membership = self.ctx.membership(existing.team_id(), user).await?;
        can_create_or_edit(
            existing.team_id(),
            user,
            membership.as_ref(),
            TemplateAction::Update,
        )?;

        draft.team_id = existing.team_id().to_string();
        draft.creator_id = existing.creator_id().cloned();
        draft.created_at = existing.created_at();
        draft.updated_at = self.ctx.now().max(existing.created_at());
        let template = draft.build()?;

        self.ctx.templates.save(&template).await?;
        self.ctx.cache_template(&template).await;
        tracing::info!(template_id = %template.id(), team_id = %template.team_id(), "template updated");
        Ok(template)
    }

    /// Template by id
    ///
    /// # Errors
    /// - [`CeremonyError::NotFound`] when absent
    /// - [`CeremonyError::AuthenticationRequired`] / [`CeremonyError::PermissionDenied`] per view rules
    pub async fn get_template(
        &self,
        user: Option<&UserId>,
        template_id: &str,
    ) -> CeremonyResult<CeremonyTemplate> {
        let template = self.viewable_template(user, template_id).await?;
        Ok(template)
    }

    /// The team's templates visible to the caller
    ///
    /// # Errors
    /// Fails unless the caller is a team member
    pub async fn list_templates_for_team(
        &self,
        user: Option<&UserId>,
        team_id: &str,
    ) -> CeremonyResult<Vec<CeremonyTemplate>> {
        let membership = self.ctx.membership(team_id, user).await?;
        let membership = require_member(team_id, user, membership.as_ref())?;

        let templates = self.ctx.templates.find_by_parent(team_id).await?;
        Ok(templates
            .into_iter()
            .filter(|t| can_view(t, user, Some(membership)).is_ok())
            .collect())
    }

    /// The team's open ceremonies with the caller's status
    ///
    /// # Errors
    /// Fails unless the caller is a team member
    pub async fn list_active_ceremonies(
        &self,
        user: Option<&UserId>,
        team_id: &str,
    ) -> CeremonyResult<Vec<ActiveCeremony>> {
        let membership = self.ctx.membership(team_id, user).await?;
        let membership = require_member(team_id, user, membership.as_ref())?;
        let caller = &membership.user_id;

        let now = self.ctx.now();
        let active: Vec<CeremonyTemplate> = self
            .ctx
            .templates
            .find_by_parent(team_id)
            .await?
            .into_iter()
            .filter(|t| is_active(t, now))
            .collect();

        let responded = try_join_all(
            active
                .iter()
                .map(|t| self.ctx.responses.has_responded(caller, t.id())),
        )
        .await?;

        Ok(active
            .into_iter()
            .zip(responded)
            .map(|(template, responded)| ActiveCeremony {
                template,
                status: CeremonyStatus::from_responded(responded),
            })
            .collect())
    }

    /// Record a response
    ///
    /// The stored user is the caller, or anonymous on a public template.
    ///
    /// # Errors
    /// - [`CeremonyError::InvalidArgument`] without a template id
    /// - [`CeremonyError::NotFound`] when the template is absent
    /// - [`CeremonyError::AuthenticationRequired`] / [`CeremonyError::PermissionDenied`] per view rules
    pub async fn submit_response(
        &self,
        user: Option<&UserId>,
        submission: ResponseSubmission,
    ) -> CeremonyResult<CeremonyResponse> {
        if submission.template_id.trim().is_empty() {
            return Err(CeremonyError::InvalidArgument(
                "template_id is required".to_string(),
            ));
        }
        let template = self
            .viewable_template(user, &submission.template_id)
            .await?;

        let response = self
            .ctx
            .responses
            .submit(submission, user, self.ctx.now())
            .await?;

        self.ctx
            .notify(EventKind::ResponseSubmitted, &template, Some(&response.user_id))
            .await;
        Ok(response)
    }

    /// Responses to a template, anonymized for non-leaders when required
    ///
    /// # Errors
    /// - [`CeremonyError::NotFound`] when the template is absent
    /// - [`CeremonyError::PermissionDenied`] unless the caller created the template or it is shared with them
    pub async fn list_responses(
        &self,
        user: Option<&UserId>,
        template_id: &str,
        range: TimeRange,
    ) -> CeremonyResult<Vec<CeremonyResponse>> {
        let (template, responses) = self.readable_responses(user, template_id, range).await?;
        tracing::debug!(template_id = %template.id(), count = responses.len(), "responses listed");
        Ok(responses)
    }

    /// Per-question summaries of a template's responses
    ///
    /// # Errors
    /// As [`CeremonyService::list_responses`]
    pub async fn summarize_responses(
        &self,
        user: Option<&UserId>,
        template_id: &str,
        range: TimeRange,
    ) -> CeremonyResult<Vec<QuestionSummary>> {
        let (template, responses) = self.readable_responses(user, template_id, range).await?;
        Ok(summarize_questions(&template, &responses))
    }

    /// Cross-tabulate two questions of a template
    ///
    /// # Errors
    /// As [`CeremonyService::list_responses`]
    pub async fn cross_tabulate(
        &self,
        user: Option<&UserId>,
        template_id: &str,
        group_question: &str,
        target_question: &str,
        range: TimeRange,
    ) -> CeremonyResult<Vec<CrossTabGroup>> {
        let (_, responses) = self.readable_responses(user, template_id, range).await?;
        Ok(cross_tabulate(group_question, target_question, &responses))
    }

    /// Participation, sentiment and blocker metrics for a team
    ///
    /// Uses every template of the team and their responses inside `range`.
    ///
    /// # Errors
    /// Fails unless the caller is a team member
    pub async fn get_team_health(
        &self,
        user: Option<&UserId>,
        team_id: &str,
        range: TimeRange,
    ) -> CeremonyResult<Vec<TeamMetric>> {
        let membership = self.ctx.membership(team_id, user).await?;
        require_member(team_id, user, membership.as_ref())?;

        let templates = self.ctx.templates.find_by_parent(team_id).await?;
        let team_size = self
            .ctx
            .memberships
            .count(&DocumentQuery::new().with_parent(team_id))
            .await?;
        let responses = try_join_all(
            templates
                .iter()
                .map(|t| self.ctx.responses.list_raw(t.id(), range)),
        )
        .await?
        .into_iter()
        .flatten()
        .collect();

        let snapshot = HealthSnapshot {
            team_size,
            templates,
            responses,
        };
        Ok(team_health(&snapshot, self.ctx.now()))
    }

    async fn viewable_template(
        &self,
        user: Option<&UserId>,
        template_id: &str,
    ) -> CeremonyResult<CeremonyTemplate> {
        let template = self
            .ctx
            .load_template(template_id)
            .await?
            .ok_or_else(|| CeremonyError::not_found("template", template_id))?;
        let membership = self.ctx.membership(template.team_id(), user).await?;
        can_view(&template, user, membership.as_ref())?;
        Ok(template)
    }

    async fn readable_responses(
        &self,
        user: Option<&UserId>,
        template_id: &str,
        range: TimeRange,
    ) -> CeremonyResult<(CeremonyTemplate, Vec<CeremonyResponse>)> {
        let template = self
            .ctx
            .load_template(template_id)
            .await?
            .ok_or_else(|| CeremonyError::not_found("template", template_id))?;
        can_view_responses(&template, user)?;

        let role = self
            .ctx
            .membership(template.team_id(), user)
            .await?
            .map(|m| m.role);
        let responses = self
            .ctx
            .responses
            .list_by_template(&template, range, role)
            .await?;
        Ok((template, responses))
    }
}
