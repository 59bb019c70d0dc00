//! Submitted responses and answers

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers keyed by question id
pub type Answers = BTreeMap<String, Answer>;

/// A typed answer to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Answer {
    /// Free text
    Text {
        /// Entered text
        value: String,
    },
    /// Selected option values, in selection order
    Choice {
        /// Selected values
        values: Vec<String>,
    },
    /// Point on a linear scale
    Scale {
        /// Selected point
        value: i32,
    },
    /// Calendar date
    Date {
        /// Year (0 when not asked)
        year: i32,
        /// Month 1-12
        month: u32,
        /// Day 1-31
        day: u32,
    },
    /// Time of day or duration
    Time {
        /// Hours
        hours: u32,
        /// Minutes
        minutes: u32,
    },
}

impl Answer {
    /// Text answer
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Choice answer
    #[must_use]
    pub fn choice<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choice {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Scale answer
    #[inline]
    #[must_use]
    pub fn scale(value: i32) -> Self {
        Self::Scale { value }
    }

    /// Every value this answer contributes when tallied
    ///
    /// Choice answers contribute each selected value; all other kinds a
    /// single rendered value.
    #[must_use]
    pub fn tally_values(&self) -> Vec<String> {
        match self {
            Answer::Choice { values } => values.clone(),
            other => vec![other.render()],
        }
    }

    /// Render as one display string; choice values are joined with `", "`
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Answer::Text { value } => value.clone(),
            Answer::Choice { values } => values.join(", "),
            Answer::Scale { value } => value.to_string(),
            Answer::Date { year, month, day } => format!("{year:04}-{month:02}-{day:02}"),
            Answer::Time { hours, minutes } => format!("{hours:02}:{minutes:02}"),
        }
    }

    /// Check if the answer records the given choice value
    #[must_use]
    pub fn has_choice(&self, value: &str) -> bool {
        matches!(self, Answer::Choice { values } if values.iter().any(|v| v == value))
    }
}

/// A stored submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyResponse {
    /// Response id
    pub id: String,
    /// Answered template
    pub template_id: String,
    /// Respondent, or the anonymous sentinel
    pub user_id: UserId,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
    /// Answers keyed by question id
    #[serde(default)]
    pub answers: Answers,
}

impl CeremonyResponse {
    /// Answers keyed by question id
    #[inline]
    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Answer to one question
    #[inline]
    #[must_use]
    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Copy with the respondent replaced by the anonymous sentinel
    #[must_use]
    pub fn anonymized(&self) -> Self {
        Self {
            user_id: UserId::anonymous(),
            ..self.clone()
        }
    }
}
