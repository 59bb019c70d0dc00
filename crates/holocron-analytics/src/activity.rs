//! Active-ceremony classification

use chrono::{DateTime, Duration, Utc};
use holocron_model::CeremonyTemplate;
use serde::{Deserialize, Serialize};

/// Whether the requesting user has answered an active ceremony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CeremonyStatus {
    /// No response from the user yet
    Pending,
    /// The user has responded
    Completed,
}

impl CeremonyStatus {
    /// Status for a user who has (or has not) responded
    #[inline]
    #[must_use]
    pub fn from_responded(responded: bool) -> Self {
        if responded {
            Self::Completed
        } else {
            Self::Pending
        }
    }
}

/// How long a ceremony stays open after its last edit
///
/// One day for standups and dailies, a week for everything else.
#[must_use]
pub fn ceremony_window(title: &str) -> Duration {
    let title = title.to_lowercase();
    if title.contains("standup") || title.contains("daily") {
        Duration::hours(24)
    } else {
        Duration::days(7)
    }
}

/// Check if the template was touched within its window before `now`
#[must_use]
pub fn is_active(template: &CeremonyTemplate, now: DateTime<Utc>) -> bool {
    now - template.last_touched() <= ceremony_window(template.title())
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_test_utils::{draft, hours_after, template};

    #[test]
    fn window_depends_on_title() {
        assert_eq!(ceremony_window("Daily Standup"), Duration::hours(24));
        assert_eq!(ceremony_window("DAILY sync"), Duration::hours(24));
        assert_eq!(ceremony_window("Sprint Retro"), Duration::days(7));
    }

    #[test]
    fn standup_expires_after_a_day() {
        let standup = template("t1", "Team Standup");
        assert!(is_active(&standup, hours_after(24)));
        assert!(!is_active(&standup, hours_after(25)));
    }

    #[test]
    fn retro_stays_open_for_a_week() {
        let retro = template("t1", "Retrospective");
        assert!(is_active(&retro, hours_after(7 * 24)));
        assert!(!is_active(&retro, hours_after(7 * 24 + 1)));
    }

    #[test]
    fn window_runs_from_last_update() {
        let mut d = draft("t1", "Standup");
        d.updated_at = hours_after(48);
        let standup = d.build().unwrap();
        assert!(is_active(&standup, hours_after(60)));
    }

    #[test]
    fn status_from_responded() {
        assert_eq!(CeremonyStatus::from_responded(true), CeremonyStatus::Completed);
        assert_eq!(CeremonyStatus::from_responded(false), CeremonyStatus::Pending);
    }
}
