//! Ceremony templates
//!
//! A [`CeremonyTemplate`] can only be obtained by validating a
//! [`TemplateDraft`]. Deserialization goes through the same path, so a
//! template read back from storage or a cache upholds the same invariants:
//!
//! - `id` is non-empty
//! - `updated_at >= created_at`
//! - question ids are unique across the template (including grouped questions)
//! - item ids are unique
//! - every non-empty `next_section_id` names a page of the template
//! - scale bounds are ordered

use crate::error::{TemplateError, TemplateResult};
use crate::ids::UserId;
use crate::item::{Item, ItemKind, QuestionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-template facilitation flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilitationSettings {
    /// Hide respondent identities from non-leaders
    #[serde(default)]
    pub is_anonymized: bool,
    /// Whether results are meant to be shown to respondents
    #[serde(default)]
    pub responses_visible: bool,
}

/// Where ceremony events are announced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Chat webhooks (Slack, Google Chat, Teams, generic)
    #[serde(default)]
    pub webhook_urls: Vec<String>,
    /// E-mail recipients
    #[serde(default)]
    pub email_addresses: Vec<String>,
}

impl NotificationSettings {
    /// Check if any destination is configured
    #[inline]
    #[must_use]
    pub fn has_destinations(&self) -> bool {
        !self.webhook_urls.is_empty() || !self.email_addresses.is_empty()
    }
}

/// Unvalidated template record
///
/// All fields are public so callers can assemble or edit a template freely;
/// [`CeremonyTemplate::try_from`] turns it into the immutable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDraft {
    /// Template id
    #[serde(default)]
    pub id: String,
    /// Owning team
    #[serde(default)]
    pub team_id: String,
    /// Author identity
    #[serde(default)]
    pub creator_id: Option<UserId>,
    /// Title; "standup" / "daily" in it marks a daily ceremony
    #[serde(default)]
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Ordered items
    #[serde(default)]
    pub items: Vec<Item>,
    /// Readable by anyone, including unauthenticated users
    #[serde(default)]
    pub is_public: bool,
    /// Extra readers outside the team
    #[serde(default)]
    pub shared_with_emails: Vec<String>,
    /// Anonymization / visibility flags
    #[serde(default)]
    pub facilitation_settings: FacilitationSettings,
    /// Notification destinations
    #[serde(default)]
    pub notification_settings: NotificationSettings,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last full-replace save
    pub updated_at: DateTime<Utc>,
}

impl TemplateDraft {
    /// Empty draft stamped with `now`
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            team_id: String::new(),
            creator_id: None,
            title: String::new(),
            description: String::new(),
            items: Vec::new(),
            is_public: false,
            shared_with_emails: Vec::new(),
            facilitation_settings: FacilitationSettings::default(),
            notification_settings: NotificationSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate into an immutable template
    ///
    /// # Errors
    /// Returns the first violated invariant as a [`TemplateError`]
    pub fn build(self) -> TemplateResult<CeremonyTemplate> {
        CeremonyTemplate::try_from(self)
    }

    fn validate(&self) -> TemplateResult<()> {
        if self.id.trim().is_empty() {
            return Err(TemplateError::MissingField("id"));
        }
        if self.updated_at < self.created_at {
            return Err(TemplateError::InvalidTimestamps);
        }

        let mut item_ids = HashSet::new();
        let mut question_ids = HashSet::new();
        for item in &self.items {
            if !item.item_id.is_empty() && !item_ids.insert(item.item_id.as_str()) {
                return Err(TemplateError::DuplicateItemId(item.item_id.clone()));
            }
            for question in item.questions() {
                if !question_ids.insert(question.question_id.as_str()) {
                    return Err(TemplateError::DuplicateQuestionId(
                        question.question_id.clone(),
                    ));
                }
                if let QuestionType::Scale { low, high, .. } = question.kind {
                    if low > high {
                        return Err(TemplateError::InvalidScale {
                            question_id: question.question_id.clone(),
                            low,
                            high,
                        });
                    }
                }
            }
        }

        let sections: HashSet<&str> = self
            .items
            .iter()
            .filter(|item| item.is_page_break())
            .map(|item| item.item_id.as_str())
            .collect();

        for item in &self.items {
            if let ItemKind::PageBreak {
                next_section_id: Some(target),
            } = &item.kind
            {
                if !target.is_empty() && !sections.contains(target.as_str()) {
                    return Err(TemplateError::DanglingSection {
                        referrer: item.item_id.clone(),
                        target: target.clone(),
                    });
                }
            }
            for question in item.questions() {
                if let QuestionType::Choice { options, .. } = &question.kind {
                    for option in options {
                        if let Some(target) = option.branch_target() {
                            if !sections.contains(target) {
                                return Err(TemplateError::DanglingSection {
                                    referrer: format!("{}/{}", question.question_id, option.value),
                                    target: target.to_string(),
                                });
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Validated, immutable ceremony template
///
/// Mutation is full-replace: take [`CeremonyTemplate::to_draft`], edit, rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TemplateDraft", into = "TemplateDraft")]
pub struct CeremonyTemplate {
    inner: TemplateDraft,
}

impl TryFrom<TemplateDraft> for CeremonyTemplate {
    type Error = TemplateError;

    fn try_from(draft: TemplateDraft) -> Result<Self, Self::Error> {
        draft.validate()?;
        Ok(Self { inner: draft })
    }
}

impl From<CeremonyTemplate> for TemplateDraft {
    fn from(template: CeremonyTemplate) -> Self {
        template.inner
    }
}

impl CeremonyTemplate {
    /// Template id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Owning team
    #[inline]
    #[must_use]
    pub fn team_id(&self) -> &str {
        &self.inner.team_id
    }

    /// Author identity
    #[inline]
    #[must_use]
    pub fn creator_id(&self) -> Option<&UserId> {
        self.inner.creator_id.as_ref()
    }

    /// Title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.inner.title
    }

    /// Description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.inner.description
    }

    /// Ordered items
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.inner.items
    }

    /// Public visibility flag
    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.inner.is_public
    }

    /// Extra readers
    #[inline]
    #[must_use]
    pub fn shared_with_emails(&self) -> &[String] {
        &self.inner.shared_with_emails
    }

    /// Check if the user is on the sharing list
    #[must_use]
    pub fn is_shared_with(&self, user: &UserId) -> bool {
        self.inner
            .shared_with_emails
            .iter()
            .any(|email| email.eq_ignore_ascii_case(user.as_str()))
    }

    /// Check if the user authored the template
    #[must_use]
    pub fn is_creator(&self, user: &UserId) -> bool {
        self.inner.creator_id.as_ref() == Some(user)
    }

    /// Facilitation flags
    #[inline]
    #[must_use]
    pub fn facilitation_settings(&self) -> FacilitationSettings {
        self.inner.facilitation_settings
    }

    /// Notification destinations
    #[inline]
    #[must_use]
    pub fn notification_settings(&self) -> &NotificationSettings {
        &self.inner.notification_settings
    }

    /// Creation time
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Last save time
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.inner.updated_at
    }

    /// Most recent of `created_at` and `updated_at`
    #[inline]
    #[must_use]
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.inner.updated_at.max(self.inner.created_at)
    }

    /// Copy out as an editable draft
    #[inline]
    #[must_use]
    pub fn to_draft(&self) -> TemplateDraft {
        self.inner.clone()
    }

    /// Iterate over every question, including grouped ones, in item order
    pub fn questions(&self) -> impl Iterator<Item = &crate::item::Question> {
        self.inner.items.iter().flat_map(Item::questions)
    }
}
