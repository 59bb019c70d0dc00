//! Team management
//!
//! Every operation requires an authenticated caller. Team records are read
//! through the team cache; memberships always come from the store.

use crate::context::ServiceContext;
use crate::error::{CeremonyError, CeremonyResult};
use holocron_access::{require_identity, require_member};
use holocron_model::{Role, Team, TeamMembership, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A team together with the caller's membership in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWithMembership {
    /// The team
    pub team: Team,
    /// Caller's membership
    pub membership: TeamMembership,
}

/// Team and membership operations
#[derive(Debug, Clone)]
pub struct TeamService {
    ctx: Arc<ServiceContext>,
}

impl TeamService {
    /// Service over a shared context
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Create a team led by the caller
    ///
    /// # Errors
    /// - [`CeremonyError::AuthenticationRequired`] without identity
    /// - [`CeremonyError::InvalidArgument`] for a blank name
    pub async fn create_team(
        &self,
        user: Option<&UserId>,
        display_name: &str,
    ) -> CeremonyResult<TeamWithMembership> {
        let user = require_identity(user)?;
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(CeremonyError::InvalidArgument(
                "display_name is required".to_string(),
            ));
        }

        let team = Team::new(display_name, self.ctx.now());
        let membership = TeamMembership::new(team.id.clone(), user.clone(), Role::Leader);
        self.ctx.teams.save(&team).await?;
        self.ctx.memberships.save(&membership).await?;
        self.ctx.cache_team(&team).await;

        tracing::info!(team_id = %team.id, leader = %user, "team created");
        Ok(TeamWithMembership { team, membership })
    }

    /// Join a team as a member
    ///
    /// Joining twice returns the existing membership unchanged.
    ///
    /// # Errors
    /// - [`CeremonyError::AuthenticationRequired`] without identity
    /// - [`CeremonyError::NotFound`] when the team does not exist
    pub async fn join_team(
        &self,
        user: Option<&UserId>,
        team_id: &str,
    ) -> CeremonyResult<TeamMembership> {
        let user = require_identity(user)?;
        if self.ctx.load_team(team_id).await?.is_none() {
            return Err(CeremonyError::not_found("team", team_id));
        }

        if let Some(existing) = self.ctx.membership(team_id, Some(user)).await? {
            return Ok(existing);
        }

        let membership = TeamMembership::new(team_id, user.clone(), Role::Member);
        self.ctx.memberships.save(&membership).await?;
        tracing::info!(team_id = %team_id, member = %user, "team joined");
        Ok(membership)
    }

    /// Teams the caller belongs to
    ///
    /// Memberships whose team record is gone are skipped.
    ///
    /// # Errors
    /// - [`CeremonyError::AuthenticationRequired`] without identity
    pub async fn list_my_teams(
        &self,
        user: Option<&UserId>,
    ) -> CeremonyResult<Vec<TeamWithMembership>> {
        let user = require_identity(user)?;
        let memberships = self.ctx.memberships.find_by_owner(user.as_str()).await?;

        let mut teams = Vec::with_capacity(memberships.len());
        for membership in memberships {
            match self.ctx.load_team(&membership.team_id).await? {
                Some(team) => teams.push(TeamWithMembership { team, membership }),
                None => {
                    tracing::warn!(team_id = %membership.team_id, user = %user, "membership without team");
                }
            }
        }
        Ok(teams)
    }

    /// Every membership of a team
    ///
    /// # Errors
    /// Fails unless the caller is a team member
    pub async fn get_team_roster(
        &self,
        user: Option<&UserId>,
        team_id: &str,
    ) -> CeremonyResult<Vec<TeamMembership>> {
        let membership = self.ctx.membership(team_id, user).await?;
        require_member(team_id, user, membership.as_ref())?;
        Ok(self.ctx.memberships.find_by_parent(team_id).await?)
    }

    /// Change a member's role
    ///
    /// # Errors
    /// - [`CeremonyError::PermissionDenied`] unless the caller leads the team
    /// - [`CeremonyError::NotFound`] when `target` is not a member
    pub async fn update_role(
        &self,
        user: Option<&UserId>,
        team_id: &str,
        target: &UserId,
        role: Role,
    ) -> CeremonyResult<TeamMembership> {
        let membership = self.ctx.membership(team_id, user).await?;
        let caller = require_member(team_id, user, membership.as_ref())?;
        if !caller.role.is_leader() {
            return Err(CeremonyError::PermissionDenied(
                "Only team leaders can change roles".to_string(),
            ));
        }

        let mut updated = self
            .ctx
            .membership(team_id, Some(target))
            .await?
            .ok_or_else(|| {
                CeremonyError::not_found("membership", &TeamMembership::key_for(team_id, target))
            })?;
        updated.role = role;
        self.ctx.memberships.save(&updated).await?;

        tracing::info!(team_id = %team_id, member = %target, role = ?role, "role updated");
        Ok(updated)
    }
}
