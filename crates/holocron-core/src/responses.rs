//! Response store adapter
//!
//! Submission never trusts the caller's user id: the authenticated identity
//! (or the anonymous sentinel) always replaces it. Submitted responses are
//! never replaced: a taken id is rejected. Reads apply the
//! anonymization projection per reader without touching storage.

use crate::error::{CeremonyError, CeremonyResult, StoreResult};
use crate::store::{DocumentQuery, DocumentStore, Repository, TimeRange};
use chrono::{DateTime, Utc};
use holocron_access::should_anonymize;
use holocron_model::{new_id, Answers, CeremonyResponse, CeremonyTemplate, Role, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A response as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSubmission {
    /// Client-chosen id; generated when absent, rejected when taken
    #[serde(default)]
    pub id: Option<String>,
    /// Answered template
    pub template_id: String,
    /// Ignored; replaced by the authenticated identity
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Client timestamp; server time when absent
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Answers keyed by question id
    #[serde(default)]
    pub answers: Answers,
}

impl ResponseSubmission {
    /// Submission for `template_id`
    #[must_use]
    pub fn new(template_id: impl Into<String>, answers: Answers) -> Self {
        Self {
            template_id: template_id.into(),
            answers,
            ..Self::default()
        }
    }
}

/// Submission, retrieval and anonymization of responses
#[derive(Debug, Clone)]
pub struct ResponseStore {
    repo: Repository<CeremonyResponse>,
}

impl ResponseStore {
    /// Adapter over `store`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    /// Persist a submission
    ///
    /// The stored user is `submitter`, or the anonymous sentinel when absent.
    /// Visibility must already have been checked.
    ///
    /// # Errors
    /// [`CeremonyError::InvalidArgument`] without a template id or when the id
    /// is taken; store failures
    pub async fn submit(
        &self,
        submission: ResponseSubmission,
        submitter: Option<&UserId>,
        now: DateTime<Utc>,
    ) -> CeremonyResult<CeremonyResponse> {
        if submission.template_id.trim().is_empty() {
            return Err(CeremonyError::InvalidArgument(
                "template_id is required".to_string(),
            ));
        }

        let response = CeremonyResponse {
            id: submission
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(new_id),
            template_id: submission.template_id,
            user_id: submitter.cloned().unwrap_or_else(UserId::anonymous),
            submitted_at: submission.submitted_at.unwrap_or(now),
            answers: submission.answers,
        };

        if !self.repo.create(&response).await? {
            return Err(CeremonyError::InvalidArgument(format!(
                "response {} already exists",
                response.id
            )));
        }
        tracing::info!(
            response_id = %response.id,
            template_id = %response.template_id,
            anonymous = response.user_id.is_anonymous(),
            "response submitted"
        );
        Ok(response)
    }

    /// Stored responses for a template, unprojected
    ///
    /// # Errors
    /// Store failures
    pub async fn list_raw(
        &self,
        template_id: &str,
        range: TimeRange,
    ) -> StoreResult<Vec<CeremonyResponse>> {
        self.repo
            .find(&DocumentQuery::new().with_parent(template_id).with_range(range))
            .await
    }

    /// Responses for a template as seen by a reader with `reader_role`
    ///
    /// # Errors
    /// Store failures
    pub async fn list_by_template(
        &self,
        template: &CeremonyTemplate,
        range: TimeRange,
        reader_role: Option<Role>,
    ) -> StoreResult<Vec<CeremonyResponse>> {
        let responses = self.list_raw(template.id(), range).await?;
        if should_anonymize(template, reader_role) {
            Ok(responses.iter().map(CeremonyResponse::anonymized).collect())
        } else {
            Ok(responses)
        }
    }

    /// Check if `user` has answered `template_id`
    ///
    /// # Errors
    /// Store failures
    pub async fn has_responded(&self, user: &UserId, template_id: &str) -> StoreResult<bool> {
        let found = self
            .repo
            .find(
                &DocumentQuery::new()
                    .with_parent(template_id)
                    .with_owner(user.as_str()),
            )
            .await?;
        Ok(!found.is_empty())
    }

    /// Number of stored responses for `template_id`
    ///
    /// # Errors
    /// Store failures
    pub async fn count_for_template(&self, template_id: &str) -> StoreResult<usize> {
        self.repo
            .count(&DocumentQuery::new().with_parent(template_id))
            .await
    }
}
