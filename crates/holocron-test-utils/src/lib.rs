//! Testing utilities for Holocron workspace
//!
//! Shared fixtures for templates, items, answers and responses.

#![allow(missing_docs)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use holocron_model::{
    Answer, Answers, CeremonyResponse, CeremonyTemplate, ChoiceOption, ChoiceStyle, Item, ItemKind,
    Question, QuestionType, TemplateDraft, UserId,
};

pub const LEADER: &str = "leader@example.com";
pub const MEMBER: &str = "member@example.com";
pub const OUTSIDER: &str = "outsider@example.com";
pub const TEAM: &str = "team1";

/// Fixed reference instant so time-window tests are deterministic
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

pub fn hours_after(hours: i64) -> DateTime<Utc> {
    epoch() + Duration::hours(hours)
}

pub fn text_item(question_id: &str) -> Item {
    Item::new(
        format!("item_{question_id}"),
        ItemKind::Question(Question::new(question_id, QuestionType::Text { paragraph: true })),
    )
}

pub fn scale_item(question_id: &str) -> Item {
    Item::new(
        format!("item_{question_id}"),
        ItemKind::Question(Question::new(
            question_id,
            QuestionType::Scale {
                low: 1,
                high: 5,
                low_label: "Bad".to_string(),
                high_label: "Great".to_string(),
            },
        )),
    )
}

pub fn choice_item(question_id: &str, options: Vec<ChoiceOption>) -> Item {
    Item::new(
        format!("item_{question_id}"),
        ItemKind::Question(Question::new(
            question_id,
            QuestionType::Choice {
                style: ChoiceStyle::Checkbox,
                options,
            },
        )),
    )
}

pub fn section(item_id: &str) -> Item {
    Item::new(item_id, ItemKind::PageBreak { next_section_id: None })
}

/// Draft owned by [`TEAM`], created by [`LEADER`] at [`epoch`]
pub fn draft(id: &str, title: &str) -> TemplateDraft {
    let mut draft = TemplateDraft::new(epoch());
    draft.id = id.to_string();
    draft.team_id = TEAM.to_string();
    draft.creator_id = Some(UserId::from(LEADER));
    draft.title = title.to_string();
    draft
}

pub fn template(id: &str, title: &str) -> CeremonyTemplate {
    draft(id, title).build().unwrap()
}

pub fn template_with_items(id: &str, items: Vec<Item>) -> CeremonyTemplate {
    let mut d = draft(id, "Retrospective");
    d.items = items;
    d.build().unwrap()
}

pub fn answers(pairs: Vec<(&str, Answer)>) -> Answers {
    pairs
        .into_iter()
        .map(|(question_id, answer)| (question_id.to_string(), answer))
        .collect()
}

pub fn response(template_id: &str, user: &str, answers: Answers) -> CeremonyResponse {
    CeremonyResponse {
        id: holocron_model::new_id(),
        template_id: template_id.to_string(),
        user_id: UserId::from(user),
        submitted_at: epoch(),
        answers,
    }
}
