//! Teams and memberships

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team owning ceremony templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team id
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create a team with a fresh id
    #[must_use]
    pub fn new(display_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: crate::ids::new_id(),
            display_name: display_name.into(),
            created_at,
        }
    }
}

/// Role of a user within one team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// May create and edit the team's templates
    Leader,
    /// Regular participant
    Member,
}

impl Role {
    /// Check if this role leads the team
    #[inline]
    #[must_use]
    pub fn is_leader(self) -> bool {
        matches!(self, Role::Leader)
    }
}

/// Membership row; at most one per (team, user) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    /// Team id
    pub team_id: String,
    /// Member identity
    pub user_id: UserId,
    /// Role within the team
    pub role: Role,
}

impl TeamMembership {
    /// Create membership
    #[inline]
    #[must_use]
    pub fn new(team_id: impl Into<String>, user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            team_id: team_id.into(),
            user_id: user_id.into(),
            role,
        }
    }

    /// Composite key identifying the (team, user) pair
    #[must_use]
    pub fn pair_key(&self) -> String {
        Self::key_for(&self.team_id, &self.user_id)
    }

    /// Pair key without a membership at hand
    #[must_use]
    pub fn key_for(team_id: &str, user_id: &UserId) -> String {
        format!("{team_id}:{user_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_in_screaming_case() {
        assert_eq!(serde_json::to_string(&Role::Leader).unwrap(), "\"LEADER\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"MEMBER\"").unwrap(),
            Role::Member
        );
    }

    #[test]
    fn pair_key_joins_team_and_user() {
        let m = TeamMembership::new("team1", "dev@example.com", Role::Member);
        assert_eq!(m.pair_key(), "team1:dev@example.com");
        assert!(!m.role.is_leader());
    }
}
