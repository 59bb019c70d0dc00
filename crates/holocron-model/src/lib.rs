//! Holocron Model
//!
//! The authoring schema for team ceremonies (standups, retrospectives):
//! - Teams and role-bearing memberships
//! - Ceremony templates built from polymorphic items
//! - Submitted responses and their typed answers
//! - The branching page navigator
//!
//! Templates are immutable values. They are assembled as a [`TemplateDraft`]
//! and validated in one step, so duplicate question ids and dangling
//! section references are rejected at construction rather than at use.
//!
//! # Example
//!
//! ```rust,ignore
//! use holocron_model::prelude::*;
//!
//! let template = CeremonyTemplate::try_from(draft)?;
//! let layout = PageLayout::new(&template);
//! let next = layout.resolve_next_page(0, response.answers());
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod ids;
pub mod item;
pub mod pages;
pub mod response;
pub mod team;
pub mod template;

// Re-exports for convenience
pub use error::{TemplateError, TemplateResult};
pub use ids::{new_id, UserId, ANONYMOUS_USER};
pub use item::{ChoiceOption, ChoiceStyle, Item, ItemKind, Question, QuestionType};
pub use pages::{build_pages, PageLayout};
pub use response::{Answer, Answers, CeremonyResponse};
pub use team::{Role, Team, TeamMembership};
pub use template::{
    CeremonyTemplate, FacilitationSettings, NotificationSettings, TemplateDraft,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with ceremony data
    pub use crate::{
        Answer, Answers, CeremonyResponse, CeremonyTemplate, ChoiceOption, ChoiceStyle, Item,
        ItemKind, PageLayout, Question, QuestionType, Role, Team, TeamMembership, TemplateDraft,
        TemplateError, UserId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
