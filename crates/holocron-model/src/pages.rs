//! Branching page navigator
//!
//! Items are grouped into pages by scanning in order: every page break closes
//! the current page and opens a new one that starts with the break itself, so
//! the break's own `next_section_id` travels with the page it opens. The
//! leading page has no break item. A page is addressed by the item id of its
//! opening break.
//!
//! Leaving page `i`:
//! 1. Choice override: the first choice option on the page (item order, then
//!    option order) that the answers selected and that names a section wins.
//! 2. Page-break override: the page's opening break names a section.
//! 3. Otherwise `i + 1`.
//!
//! A section id that does not resolve to a page never wins; resolution falls
//! through to the next rule. Validated templates cannot contain such ids, but
//! layouts built from raw items can.

use crate::item::{Item, ItemKind, QuestionType};
use crate::response::Answers;
use crate::template::CeremonyTemplate;
use std::collections::HashMap;

/// Group items into pages
///
/// An empty item list yields no pages. A template that starts with a page
/// break yields an empty leading page, keeping page `k` opened by break `k`.
#[must_use]
pub fn build_pages(items: &[Item]) -> Vec<&[Item]> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut pages = Vec::new();
    let mut start = 0;
    for (idx, item) in items.iter().enumerate() {
        if item.is_page_break() {
            pages.push(&items[start..idx]);
            start = idx;
        }
    }
    pages.push(&items[start..]);
    pages
}

/// Pages of one template plus the section-id index used for branching
#[derive(Debug, Clone)]
pub struct PageLayout<'a> {
    pages: Vec<&'a [Item]>,
    sections: HashMap<&'a str, usize>,
}

impl<'a> PageLayout<'a> {
    /// Lay out a template
    #[must_use]
    pub fn new(template: &'a CeremonyTemplate) -> Self {
        Self::from_items(template.items())
    }

    /// Lay out raw items
    #[must_use]
    pub fn from_items(items: &'a [Item]) -> Self {
        let pages = build_pages(items);
        let sections = pages
            .iter()
            .enumerate()
            .filter_map(|(idx, page)| {
                page.first()
                    .filter(|item| item.is_page_break())
                    .map(|item| (item.item_id.as_str(), idx))
            })
            .collect();
        Self { pages, sections }
    }

    /// All pages in order
    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[&'a [Item]] {
        &self.pages
    }

    /// Number of pages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if there are no pages
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Items of page `index`
    #[inline]
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&'a [Item]> {
        self.pages.get(index).copied()
    }

    /// Page index for a section id
    #[inline]
    #[must_use]
    pub fn index_of(&self, section_id: &str) -> Option<usize> {
        self.sections.get(section_id).copied()
    }

    /// Check if `index` is the final page
    #[inline]
    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.pages.len()
    }

    /// Page to show after page `current` given the answers so far
    ///
    /// A result equal to [`PageLayout::len`] means the form is finished.
    #[must_use]
    pub fn resolve_next_page(&self, current: usize, answers: &Answers) -> usize {
        let Some(items) = self.page(current) else {
            return current + 1;
        };

        for target in choice_targets(items, answers) {
            match self.index_of(target) {
                Some(idx) => return idx,
                None => tracing::debug!(
                    section = target,
                    "choice branches to unknown section, ignoring"
                ),
            }
        }

        if let Some(Item {
            kind: ItemKind::PageBreak {
                next_section_id: Some(target),
            },
            ..
        }) = items.first()
        {
            if !target.is_empty() {
                match self.index_of(target) {
                    Some(idx) => return idx,
                    None => tracing::debug!(
                        section = target.as_str(),
                        "page break branches to unknown section, ignoring"
                    ),
                }
            }
        }

        current + 1
    }
}

/// Branch targets selected on a page, in item order then option order
fn choice_targets<'i>(items: &'i [Item], answers: &'i Answers) -> impl Iterator<Item = &'i str> {
    items
        .iter()
        .flat_map(Item::questions)
        .filter_map(move |question| {
            let QuestionType::Choice { options, .. } = &question.kind else {
                return None;
            };
            let answer = answers.get(&question.question_id)?;
            Some(options.iter().filter_map(move |option| {
                option
                    .branch_target()
                    .filter(|_| answer.has_choice(&option.value))
            }))
        })
        .flatten()
}
