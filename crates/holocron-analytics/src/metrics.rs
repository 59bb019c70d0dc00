//! Team health metrics

use chrono::{DateTime, Utc};
use holocron_model::{Answer, CeremonyResponse, CeremonyTemplate};
use serde::{Deserialize, Serialize};

/// Metric name for [`participation_rate`]
pub const PARTICIPATION_RATE: &str = "Participation Rate";
/// Metric name for [`sentiment_trend`]
pub const SENTIMENT_TREND: &str = "Sentiment Trend";
/// Metric name for [`blocker_count`]
pub const BLOCKER_COUNT: &str = "Blocker Count";

const BLOCKER_KEYWORDS: [&str; 2] = ["blocker", "stuck"];

/// One named metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMetric {
    /// Metric name
    pub name: String,
    /// Metric value
    pub value: f64,
    /// When the metric was computed
    pub timestamp: DateTime<Utc>,
}

/// Everything needed to compute a team's health
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Number of team memberships
    pub team_size: usize,
    /// The team's templates
    pub templates: Vec<CeremonyTemplate>,
    /// Responses to those templates inside the reporting window
    pub responses: Vec<CeremonyResponse>,
}

/// Responses per expected response, as a percentage
///
/// `total_responses / (max(team_size, 1) * template_count) * 100`, or 0
/// without templates. This approximates attendance across all templates
/// together rather than counting it per template, so it can exceed 100 when
/// members answer a template more than once.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn participation_rate(total_responses: usize, team_size: usize, template_count: usize) -> f64 {
    if template_count == 0 {
        return 0.0;
    }
    let expected = team_size.max(1) * template_count;
    total_responses as f64 / expected as f64 * 100.0
}

/// Mean of every scale answer, or 0 without any
#[must_use]
pub fn sentiment_trend(responses: &[CeremonyResponse]) -> f64 {
    let (sum, count) = responses
        .iter()
        .flat_map(|response| response.answers.values())
        .fold((0_i64, 0_u32), |(sum, count), answer| match answer {
            Answer::Scale { value } => (sum + i64::from(*value), count + 1),
            _ => (sum, count),
        });

    if count == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let sum = sum as f64;
        sum / f64::from(count)
    }
}

fn mentions_blocker(value: &str) -> bool {
    let lower = value.to_lowercase();
    BLOCKER_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Text values and choice values mentioning "blocker" or "stuck"
///
/// Counts values, not responses: each matching selected option counts.
#[must_use]
pub fn blocker_count(responses: &[CeremonyResponse]) -> usize {
    responses
        .iter()
        .flat_map(|response| response.answers.values())
        .map(|answer| match answer {
            Answer::Text { value } => usize::from(mentions_blocker(value)),
            Answer::Choice { values } => values.iter().filter(|v| mentions_blocker(v)).count(),
            _ => 0,
        })
        .sum()
}

/// The three health metrics, stamped with `now`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn team_health(snapshot: &HealthSnapshot, now: DateTime<Utc>) -> Vec<TeamMetric> {
    let metric = |name: &str, value: f64| TeamMetric {
        name: name.to_string(),
        value,
        timestamp: now,
    };

    vec![
        metric(
            PARTICIPATION_RATE,
            participation_rate(
                snapshot.responses.len(),
                snapshot.team_size,
                snapshot.templates.len(),
            ),
        ),
        metric(SENTIMENT_TREND, sentiment_trend(&snapshot.responses)),
        metric(BLOCKER_COUNT, blocker_count(&snapshot.responses) as f64),
    ]
}
