//! Template items and question types
//!
//! An [`Item`] is one element of a template page. Its [`ItemKind`] is a
//! closed sum type; questions carry a [`QuestionType`] describing how they
//! are answered.

use serde::{Deserialize, Serialize};

/// One element of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item id; a page break's id is the id of the page it opens
    pub item_id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Display description
    #[serde(default)]
    pub description: String,
    /// What the item is
    pub kind: ItemKind,
}

impl Item {
    /// Create item
    #[inline]
    #[must_use]
    pub fn new(item_id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            item_id: item_id.into(),
            title: String::new(),
            description: String::new(),
            kind,
        }
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check if this item ends the current page
    #[inline]
    #[must_use]
    pub fn is_page_break(&self) -> bool {
        matches!(self.kind, ItemKind::PageBreak { .. })
    }

    /// Questions carried by this item (one for a question, many for a group)
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        match &self.kind {
            ItemKind::Question(q) => std::slice::from_ref(q),
            ItemKind::QuestionGroup { questions } => questions,
            ItemKind::PageBreak { .. }
            | ItemKind::Text
            | ItemKind::Image { .. }
            | ItemKind::Video { .. } => &[],
        }
    }
}

/// Item variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// A single question
    Question(Question),
    /// Ends the current page and opens a new one
    PageBreak {
        /// Page to jump to when leaving the page this break opens
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_section_id: Option<String>,
    },
    /// Static text block
    Text,
    /// Static image
    Image {
        /// Image location
        image_url: String,
        /// Alternative text
        #[serde(default)]
        alt_text: String,
    },
    /// Embedded video
    Video {
        /// Video location
        video_url: String,
        /// Caption
        #[serde(default)]
        caption: String,
    },
    /// Grid of questions sharing one item
    QuestionGroup {
        /// Grouped questions
        questions: Vec<Question>,
    },
}

/// A question and how it is answered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique within a template
    pub question_id: String,
    /// Whether an answer is mandatory
    #[serde(default)]
    pub required: bool,
    /// Answer format
    pub kind: QuestionType,
}

impl Question {
    /// Create optional question
    #[inline]
    #[must_use]
    pub fn new(question_id: impl Into<String>, kind: QuestionType) -> Self {
        Self {
            question_id: question_id.into(),
            required: false,
            kind,
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Answer formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionType {
    /// Free text
    Text {
        /// Multi-line input
        #[serde(default)]
        paragraph: bool,
    },
    /// Pick from options
    Choice {
        /// Presentation style
        style: ChoiceStyle,
        /// Options in display order
        options: Vec<ChoiceOption>,
    },
    /// Linear scale
    Scale {
        /// Lowest value
        low: i32,
        /// Highest value
        high: i32,
        /// Label shown at `low`
        #[serde(default)]
        low_label: String,
        /// Label shown at `high`
        #[serde(default)]
        high_label: String,
    },
    /// Calendar date
    Date {
        /// Ask for the year
        #[serde(default)]
        include_year: bool,
        /// Ask for a time of day as well
        #[serde(default)]
        include_time: bool,
    },
    /// Time of day or duration
    Time {
        /// Interpret as elapsed duration
        #[serde(default)]
        duration: bool,
    },
    /// File attachment (stored externally)
    FileUpload {
        /// Maximum number of files
        max_files: u32,
        /// Maximum size per file
        max_bytes: u64,
        /// Accepted MIME types; empty accepts all
        #[serde(default)]
        allowed_mime_types: Vec<String>,
    },
}

/// Presentation of a choice question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceStyle {
    /// Single selection
    Radio,
    /// Multiple selection
    Checkbox,
    /// Single selection from a list
    Dropdown,
}

/// Selectable option of a choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Recorded answer value
    pub value: String,
    /// Free-text "other" option
    #[serde(default)]
    pub is_other: bool,
    /// Page to jump to when this option is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_section_id: Option<String>,
}

impl ChoiceOption {
    /// Create plain option
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_other: false,
            next_section_id: None,
        }
    }

    /// Branch to section when selected
    #[inline]
    #[must_use]
    pub fn branching_to(mut self, section_id: impl Into<String>) -> Self {
        self.next_section_id = Some(section_id.into());
        self
    }

    /// Branch target, ignoring empty ids
    #[inline]
    #[must_use]
    pub fn branch_target(&self) -> Option<&str> {
        self.next_section_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_group_exposes_all_questions() {
        let item = Item::new(
            "grid",
            ItemKind::QuestionGroup {
                questions: vec![
                    Question::new("g1", QuestionType::Text { paragraph: false }),
                    Question::new("g2", QuestionType::Text { paragraph: true }),
                ],
            },
        );
        let ids: Vec<_> = item.questions().iter().map(|q| q.question_id.as_str()).collect();
        assert_eq!(ids, ["g1", "g2"]);
    }

    #[test]
    fn static_items_have_no_questions() {
        assert!(Item::new("t", ItemKind::Text).questions().is_empty());
        assert!(Item::new("b", ItemKind::PageBreak { next_section_id: None }).is_page_break());
    }

    #[test]
    fn empty_branch_target_is_ignored() {
        let opt = ChoiceOption::new("Yes").branching_to("");
        assert_eq!(opt.branch_target(), None);
        let opt = ChoiceOption::new("Yes").branching_to("sec_2");
        assert_eq!(opt.branch_target(), Some("sec_2"));
    }

    #[test]
    fn item_kind_is_tagged() {
        let item = Item::new("b1", ItemKind::PageBreak { next_section_id: Some("b2".into()) });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"]["type"], "page_break");
        assert_eq!(json["kind"]["next_section_id"], "b2");
        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
