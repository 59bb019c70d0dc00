//! Per-question result summaries

use crate::natural::natural_cmp;
use holocron_model::{Answer, CeremonyResponse, CeremonyTemplate, QuestionType};
use serde::{Deserialize, Serialize};

/// What was answered to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryDetail {
    /// Option tallies in first-seen order
    Choice {
        /// `(value, count)` pairs
        distribution: Vec<(String, usize)>,
    },
    /// Point tallies in ascending order
    Scale {
        /// `(point, count)` pairs
        distribution: Vec<(String, usize)>,
    },
    /// Non-empty text answers in response order
    Text {
        /// Answers
        answers: Vec<String>,
    },
    /// Question kinds without an aggregate view
    Other {
        /// Number of answers given
        answered: usize,
    },
}

/// Summary of one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    /// Question id
    pub question_id: String,
    /// Title of the item holding the question
    pub title: String,
    /// Aggregated answers
    pub detail: SummaryDetail,
}

fn tally(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = Vec::new();
    for value in values {
        match out.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => out.push((value, 1)),
        }
    }
    out
}

/// Summarize every question in template order
///
/// Questions nested in groups are included after their group's position.
#[must_use]
pub fn summarize_questions(
    template: &CeremonyTemplate,
    responses: &[CeremonyResponse],
) -> Vec<QuestionSummary> {
    template
        .items()
        .iter()
        .flat_map(|item| item.questions().iter().map(move |q| (item, q)))
        .map(|(item, question)| {
            let given = move || {
                responses
                    .iter()
                    .filter_map(move |response| response.answer(&question.question_id))
            };

            let detail = match &question.kind {
                QuestionType::Choice { .. } => SummaryDetail::Choice {
                    distribution: tally(given().filter_map(|answer| match answer {
                        Answer::Choice { values } => Some(values.clone()),
                        _ => None,
                    })
                    .flatten()),
                },
                QuestionType::Scale { .. } => {
                    let mut distribution = tally(given().filter_map(|answer| match answer {
                        Answer::Scale { value } => Some(value.to_string()),
                        _ => None,
                    }));
                    distribution.sort_by(|a, b| natural_cmp(&a.0, &b.0));
                    SummaryDetail::Scale { distribution }
                }
                QuestionType::Text { .. } => SummaryDetail::Text {
                    answers: given()
                        .filter_map(|answer| match answer {
                            Answer::Text { value } if !value.is_empty() => Some(value.clone()),
                            _ => None,
                        })
                        .collect(),
                },
                _ => SummaryDetail::Other {
                    answered: given().count(),
                },
            };

            QuestionSummary {
                question_id: question.question_id.clone(),
                title: item.title.clone(),
                detail,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_model::ChoiceOption;
    use holocron_test_utils::{
        answers, choice_item, response, scale_item, section, template_with_items, text_item,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn summarizes_each_question_kind() {
        let template = template_with_items(
            "t1",
            vec![
                choice_item("focus", vec![ChoiceOption::new("A"), ChoiceOption::new("B")]),
                section("s2"),
                scale_item("mood"),
                text_item("notes"),
            ],
        );
        let responses = vec![
            response(
                "t1",
                "a@x.com",
                answers(vec![
                    ("focus", Answer::choice(["B", "A"])),
                    ("mood", Answer::scale(10)),
                    ("notes", Answer::text("")),
                ]),
            ),
            response(
                "t1",
                "b@x.com",
                answers(vec![
                    ("focus", Answer::choice(["A"])),
                    ("mood", Answer::scale(2)),
                    ("notes", Answer::text("ship it")),
                ]),
            ),
        ];

        let summaries = summarize_questions(&template, &responses);
        let ids: Vec<&str> = summaries.iter().map(|s| s.question_id.as_str()).collect();
        assert_eq!(ids, ["focus", "mood", "notes"]);

        assert_eq!(
            summaries[0].detail,
            SummaryDetail::Choice {
                distribution: vec![("B".to_string(), 1), ("A".to_string(), 2)],
            }
        );
        assert_eq!(
            summaries[1].detail,
            SummaryDetail::Scale {
                distribution: vec![("2".to_string(), 1), ("10".to_string(), 1)],
            }
        );
        assert_eq!(
            summaries[2].detail,
            SummaryDetail::Text {
                answers: vec!["ship it".to_string()],
            }
        );
    }

    #[test]
    fn unanswered_questions_still_listed() {
        let template = template_with_items("t1", vec![scale_item("mood")]);
        let summaries = summarize_questions(&template, &[]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries[0].detail,
            SummaryDetail::Scale {
                distribution: Vec::new()
            }
        );
    }
}
