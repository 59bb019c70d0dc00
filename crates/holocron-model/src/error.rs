//! Construction errors for ceremony templates
//!
//! Every variant is an invalid-argument condition: the draft describes a
//! template that cannot exist.

/// Errors raised while validating a [`crate::TemplateDraft`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A mandatory field was left empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Two questions share the same id
    #[error("duplicate question id: '{0}'")]
    DuplicateQuestionId(String),

    /// Two items share the same id
    #[error("duplicate item id: '{0}'")]
    DuplicateItemId(String),

    /// A branching target does not name any page of the template
    #[error("'{referrer}' branches to unknown section '{target}'")]
    DanglingSection {
        /// Item or option that declares the branch
        referrer: String,
        /// The unresolved section id
        target: String,
    },

    /// `updated_at` precedes `created_at`
    #[error("updated_at precedes created_at")]
    InvalidTimestamps,

    /// A scale question whose bounds are inverted
    #[error("scale question '{question_id}' has low {low} above high {high}")]
    InvalidScale {
        /// Offending question
        question_id: String,
        /// Lower bound
        low: i32,
        /// Upper bound
        high: i32,
    },
}

/// Result type alias for template construction
pub type TemplateResult<T> = Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_error_display() {
        let err = TemplateError::DanglingSection {
            referrer: "q1/Yes".to_string(),
            target: "sec_9".to_string(),
        };
        assert_eq!(err.to_string(), "'q1/Yes' branches to unknown section 'sec_9'");
    }

    #[test]
    fn missing_field_display() {
        let err = TemplateError::MissingField("id");
        assert_eq!(err.to_string(), "missing required field: id");
    }
}
