//! Holocron Access Control
//!
//! Side-effect-free predicates deciding who may read a template, author one,
//! read its responses, and see respondent identities.
//!
//! Every check takes the requester's identity (absent when unauthenticated)
//! and, where relevant, the requester's membership in the template's team.
//! Absent identity where one is mandatory yields
//! [`AccessError::AuthenticationRequired`]; a present but unauthorized
//! identity yields [`AccessError::PermissionDenied`].

#![warn(unreachable_pub)]

use holocron_model::{CeremonyTemplate, Role, TeamMembership, UserId};

/// Access check failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// No identity where one is mandatory
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    /// Identity present but not authorized
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Request is missing a required field
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AccessError {
    fn unauthenticated() -> Self {
        Self::AuthenticationRequired("Missing user authentication".to_string())
    }
}

/// Result type alias for access checks
pub type AccessResult<T> = Result<T, AccessError>;

/// Template mutation being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateAction {
    /// First save of a new template
    Create,
    /// Full-replace save of an existing template
    Update,
}

impl TemplateAction {
    fn verb(self) -> &'static str {
        match self {
            TemplateAction::Create => "create",
            TemplateAction::Update => "update",
        }
    }
}

/// Require an authenticated identity
///
/// # Errors
/// [`AccessError::AuthenticationRequired`] when `user` is absent
#[inline]
pub fn require_identity(user: Option<&UserId>) -> AccessResult<&UserId> {
    user.ok_or_else(AccessError::unauthenticated)
}

/// Require membership of `team_id`
///
/// # Errors
/// - [`AccessError::AuthenticationRequired`] when `user` is absent
/// - [`AccessError::PermissionDenied`] when the membership is absent or for another team
pub fn require_member<'m>(
    team_id: &str,
    user: Option<&UserId>,
    membership: Option<&'m TeamMembership>,
) -> AccessResult<&'m TeamMembership> {
    let user = require_identity(user)?;
    membership
        .filter(|m| m.team_id == team_id && &m.user_id == user)
        .ok_or_else(|| AccessError::PermissionDenied("You are not a member of this team".to_string()))
}

/// May the requester read the template?
///
/// Public templates are readable by anyone. Otherwise the requester must be
/// a member of the template's team or be on its sharing list.
///
/// # Errors
/// - [`AccessError::AuthenticationRequired`] for an absent requester on a non-public template
/// - [`AccessError::PermissionDenied`] for a non-member, non-shared requester
pub fn can_view(
    template: &CeremonyTemplate,
    user: Option<&UserId>,
    membership: Option<&TeamMembership>,
) -> AccessResult<()> {
    if template.is_public() {
        return Ok(());
    }
    let user = require_identity(user)?;

    let is_member = membership
        .is_some_and(|m| m.team_id == template.team_id() && &m.user_id == user);
    if is_member || template.is_shared_with(user) {
        Ok(())
    } else {
        Err(AccessError::PermissionDenied(
            "You do not have access to this ceremony".to_string(),
        ))
    }
}

/// May the requester create or update templates for `team_id`?
///
/// # Errors
/// - [`AccessError::AuthenticationRequired`] when `user` is absent
/// - [`AccessError::InvalidArgument`] when `team_id` is empty
/// - [`AccessError::PermissionDenied`] unless the requester leads the team
pub fn can_create_or_edit(
    team_id: &str,
    user: Option<&UserId>,
    membership: Option<&TeamMembership>,
    action: TemplateAction,
) -> AccessResult<()> {
    let user = require_identity(user)?;
    if team_id.trim().is_empty() {
        return Err(AccessError::InvalidArgument("team_id is required".to_string()));
    }

    let leads = membership
        .is_some_and(|m| m.team_id == team_id && &m.user_id == user && m.role.is_leader());
    if leads {
        Ok(())
    } else {
        Err(AccessError::PermissionDenied(format!(
            "Only team leaders can {} templates",
            action.verb()
        )))
    }
}

/// May the requester read the template's responses?
///
/// Only the template's creator and users on its sharing list may.
///
/// # Errors
/// - [`AccessError::AuthenticationRequired`] when `user` is absent
/// - [`AccessError::PermissionDenied`] otherwise
pub fn can_view_responses(template: &CeremonyTemplate, user: Option<&UserId>) -> AccessResult<()> {
    let user = require_identity(user)?;
    if template.is_creator(user) || template.is_shared_with(user) {
        Ok(())
    } else {
        Err(AccessError::PermissionDenied(
            "You do not have permission to view these responses".to_string(),
        ))
    }
}

/// Must respondent identities be hidden from this reader?
///
/// True iff the template is anonymized and the reader does not lead the team.
#[inline]
#[must_use]
pub fn should_anonymize(template: &CeremonyTemplate, requester_role: Option<Role>) -> bool {
    template.facilitation_settings().is_anonymized && requester_role != Some(Role::Leader)
}
