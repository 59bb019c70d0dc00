//! Holocron Analytics
//!
//! Pure functions over an immutable snapshot of templates and responses.
//! Nothing here performs I/O or takes locks; callers fetch the snapshot and
//! pass it in.
//!
//! - [`team_health`]: participation rate, sentiment trend, blocker count
//! - [`cross_tabulate`]: one question's answers grouped by another's
//! - [`is_active`]: whether a ceremony is still open for responses
//! - [`summarize_questions`]: per-question answer distributions

#![warn(unreachable_pub)]

pub mod activity;
pub mod crosstab;
pub mod metrics;
pub mod natural;
pub mod summary;

pub use activity::{ceremony_window, is_active, CeremonyStatus};
pub use crosstab::{cross_tabulate, CrossTabGroup};
pub use metrics::{
    blocker_count, participation_rate, sentiment_trend, team_health, HealthSnapshot, TeamMetric,
    BLOCKER_COUNT, PARTICIPATION_RATE, SENTIMENT_TREND,
};
pub use natural::natural_cmp;
pub use summary::{summarize_questions, QuestionSummary, SummaryDetail};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
