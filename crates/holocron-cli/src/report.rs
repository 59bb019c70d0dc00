//! Printable reports
//!
//! Each report serializes to JSON and displays as plain text.

use holocron_analytics::{
    cross_tabulate, summarize_questions, CrossTabGroup, HealthSnapshot, QuestionSummary,
    SummaryDetail, TeamMetric,
};
use holocron_model::{Answers, CeremonyTemplate, ItemKind, PageLayout};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One page of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Page index
    pub index: usize,
    /// Section id of the opening page break
    pub section: Option<String>,
    /// Where the page leaves to when no choice branches
    pub next_section: Option<String>,
    /// Item ids, opening break included
    pub items: Vec<String>,
}

/// Page layout plus an optional walk through it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagesReport {
    /// Template id
    pub template_id: String,
    /// Every page
    pub pages: Vec<PageView>,
    /// Pages visited for the given answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<usize>>,
}

/// Lay out `template`, walking it when answers are given
#[must_use]
pub fn pages_report(template: &CeremonyTemplate, answers: Option<&Answers>) -> PagesReport {
    let layout = PageLayout::new(template);
    let pages = layout
        .pages()
        .iter()
        .enumerate()
        .map(|(index, items)| {
            let opening = items.first().filter(|item| item.is_page_break());
            PageView {
                index,
                section: opening.map(|item| item.item_id.clone()),
                next_section: opening.and_then(|item| match &item.kind {
                    ItemKind::PageBreak { next_section_id } => next_section_id
                        .clone()
                        .filter(|target| !target.is_empty()),
                    _ => None,
                }),
                items: items.iter().map(|item| item.item_id.clone()).collect(),
            }
        })
        .collect();

    PagesReport {
        template_id: template.id().to_string(),
        pages,
        path: answers.map(|answers| walk_pages(&layout, answers)),
    }
}

/// Pages a respondent with `answers` sees, in order
///
/// Stops when the form finishes or a branch would revisit a page.
#[must_use]
pub fn walk_pages(layout: &PageLayout<'_>, answers: &Answers) -> Vec<usize> {
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut current = 0;

    while current < layout.len() && seen.insert(current) {
        path.push(current);
        current = layout.resolve_next_page(current, answers);
    }
    if current < layout.len() {
        tracing::warn!(page = current, "branch loops back to a visited page, stopping");
    }
    path
}

impl fmt::Display for PagesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template {}: {} page(s)", self.template_id, self.pages.len())?;
        for page in &self.pages {
            write!(f, "  [{}]", page.index)?;
            if let Some(section) = &page.section {
                write!(f, " section {section}")?;
            }
            if let Some(next) = &page.next_section {
                write!(f, " -> {next}")?;
            }
            writeln!(f, ": {}", page.items.join(", "))?;
        }
        if let Some(path) = &self.path {
            let steps: Vec<String> = path.iter().map(ToString::to_string).collect();
            writeln!(f, "Path: {}", steps.join(" -> "))?;
        }
        Ok(())
    }
}

/// Team health metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricsReport(pub Vec<TeamMetric>);

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for metric in &self.0 {
            writeln!(f, "{:<20} {:>8.2}", metric.name, metric.value)?;
        }
        Ok(())
    }
}

/// Cross-tabulation of two questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTabReport {
    /// Grouping question
    pub group_question: String,
    /// Tallied question
    pub target_question: String,
    /// Groups in natural order
    pub groups: Vec<CrossTabGroup>,
}

/// Cross-tabulate every response in the snapshot
#[must_use]
pub fn cross_tab_report(
    snapshot: &HealthSnapshot,
    group_question: &str,
    target_question: &str,
) -> CrossTabReport {
    CrossTabReport {
        group_question: group_question.to_string(),
        target_question: target_question.to_string(),
        groups: cross_tabulate(group_question, target_question, &snapshot.responses),
    }
}

impl fmt::Display for CrossTabReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} by {}", self.target_question, self.group_question)?;
        if self.groups.is_empty() {
            return writeln!(f, "  (no responses answer both questions)");
        }
        for group in &self.groups {
            let tallies: Vec<String> = group
                .distribution
                .iter()
                .map(|(value, count)| format!("{value}={count}"))
                .collect();
            writeln!(f, "  {} (n={}): {}", group.key, group.count, tallies.join(", "))?;
        }
        Ok(())
    }
}

/// Per-question summaries of one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SummaryReport(pub Vec<QuestionSummary>);

/// Summarize `template_id`'s responses in the snapshot
///
/// `None` when the snapshot has no such template.
#[must_use]
pub fn summary_report(snapshot: &HealthSnapshot, template_id: &str) -> Option<SummaryReport> {
    let template = snapshot.templates.iter().find(|t| t.id() == template_id)?;
    let responses: Vec<_> = snapshot
        .responses
        .iter()
        .filter(|r| r.template_id == template_id)
        .cloned()
        .collect();
    Some(SummaryReport(summarize_questions(template, &responses)))
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for summary in &self.0 {
            let label = if summary.title.is_empty() {
                &summary.question_id
            } else {
                &summary.title
            };
            writeln!(f, "{label}")?;
            match &summary.detail {
                SummaryDetail::Choice { distribution } | SummaryDetail::Scale { distribution } => {
                    for (value, count) in distribution {
                        writeln!(f, "  {value}: {count}")?;
                    }
                }
                SummaryDetail::Text { answers } => {
                    for answer in answers {
                        writeln!(f, "  - {answer}")?;
                    }
                }
                SummaryDetail::Other { answered } => writeln!(f, "  {answered} answer(s)")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_model::{Answer, ChoiceOption, Item};
    use holocron_test_utils::{
        answers, choice_item, epoch, response, scale_item, section, template, template_with_items,
    };
    use pretty_assertions::assert_eq;

    fn branching() -> CeremonyTemplate {
        template_with_items(
            "t1",
            vec![
                choice_item(
                    "route",
                    vec![
                        ChoiceOption::new("skip").branching_to("end"),
                        ChoiceOption::new("stay"),
                    ],
                ),
                section("middle"),
                scale_item("mood"),
                Item::new(
                    "end",
                    ItemKind::PageBreak {
                        next_section_id: None,
                    },
                ),
            ],
        )
    }

    #[test]
    fn pages_list_sections_and_items() {
        let report = pages_report(&branching(), None);
        let sections: Vec<Option<&str>> = report
            .pages
            .iter()
            .map(|p| p.section.as_deref())
            .collect();
        assert_eq!(sections, vec![None, Some("middle"), Some("end")]);
        assert_eq!(report.pages[1].items, vec!["middle", "item_mood"]);
        assert!(report.path.is_none());
    }

    #[test]
    fn walk_follows_choice_branch() {
        let t = branching();
        let skip = answers(vec![("route", Answer::choice(["skip"]))]);
        assert_eq!(pages_report(&t, Some(&skip)).path, Some(vec![0, 2]));

        let stay = answers(vec![("route", Answer::choice(["stay"]))]);
        assert_eq!(pages_report(&t, Some(&stay)).path, Some(vec![0, 1, 2]));
    }

    #[test]
    fn walk_stops_on_loops() {
        let items = vec![
            section("a"),
            Item::new(
                "b",
                ItemKind::PageBreak {
                    next_section_id: Some("a".to_string()),
                },
            ),
        ];
        let layout = PageLayout::from_items(&items);
        assert_eq!(walk_pages(&layout, &Answers::new()), vec![0, 1, 2]);
    }

    #[test]
    fn text_output_is_readable() {
        let text = pages_report(&branching(), None).to_string();
        assert!(text.starts_with("Template t1: 3 page(s)"));
        assert!(text.contains("[1] section middle: middle, item_mood"));
    }

    #[test]
    fn cross_tab_over_snapshot() {
        let snapshot = HealthSnapshot {
            team_size: 2,
            templates: vec![template("t1", "Retro")],
            responses: vec![
                response(
                    "t1",
                    "a@x.com",
                    answers(vec![
                        ("mood", Answer::scale(3)),
                        ("topics", Answer::choice(["A"])),
                    ]),
                ),
                response(
                    "t1",
                    "b@x.com",
                    answers(vec![
                        ("mood", Answer::scale(3)),
                        ("topics", Answer::choice(["A", "B"])),
                    ]),
                ),
            ],
        };

        let report = cross_tab_report(&snapshot, "mood", "topics");
        assert_eq!(report.to_string(), "topics by mood\n  3 (n=2): A=2, B=1\n");
    }

    #[test]
    fn summary_needs_known_template() {
        let snapshot = HealthSnapshot {
            team_size: 1,
            templates: vec![template_with_items("t1", vec![scale_item("mood")])],
            responses: vec![response("t1", "a@x.com", answers(vec![("mood", Answer::scale(4))]))],
        };
        assert!(summary_report(&snapshot, "missing").is_none());

        let report = summary_report(&snapshot, "t1").unwrap();
        assert_eq!(report.0.len(), 1);
        assert_eq!(report.0[0].question_id, "mood");
    }

    #[test]
    fn metrics_serialize_as_a_list() {
        let report = MetricsReport(holocron_analytics::team_health(
            &HealthSnapshot::default(),
            epoch(),
        ));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(3));
    }
}
