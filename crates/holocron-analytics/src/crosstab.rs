//! Cross-tabulation of one question's answers grouped by another's

use crate::natural::natural_cmp;
use holocron_model::CeremonyResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Responses sharing one group-question answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTabGroup {
    /// Rendered group-question answer
    pub key: String,
    /// Responses in this group
    pub count: usize,
    /// Target-question value tallies, in natural order
    pub distribution: Vec<(String, usize)>,
}

/// Tally `target_question` answers per distinct `group_question` answer
///
/// Only responses answering both questions take part. The group key is the
/// rendered answer (choice values joined with `", "`); every value of a
/// multi-valued target answer is tallied. Groups and distributions are in
/// natural order.
#[must_use]
pub fn cross_tabulate(
    group_question: &str,
    target_question: &str,
    responses: &[CeremonyResponse],
) -> Vec<CrossTabGroup> {
    let mut groups: HashMap<String, (usize, HashMap<String, usize>)> = HashMap::new();

    for response in responses {
        let (Some(group), Some(target)) = (
            response.answer(group_question),
            response.answer(target_question),
        ) else {
            continue;
        };

        let (count, tallies) = groups.entry(group.render()).or_default();
        *count += 1;
        for value in target.tally_values() {
            *tallies.entry(value).or_default() += 1;
        }
    }

    let mut out: Vec<CrossTabGroup> = groups
        .into_iter()
        .map(|(key, (count, tallies))| {
            let mut distribution: Vec<(String, usize)> = tallies.into_iter().collect();
            distribution.sort_by(|a, b| natural_cmp(&a.0, &b.0));
            CrossTabGroup {
                key,
                count,
                distribution,
            }
        })
        .collect();
    out.sort_by(|a, b| natural_cmp(&a.key, &b.key));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_model::Answer;
    use holocron_test_utils::{answers, response};
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_by_scale_and_tallies_choices() {
        let responses = vec![
            response(
                "t1",
                "a@x.com",
                answers(vec![("mood", Answer::scale(3)), ("focus", Answer::choice(["A"]))]),
            ),
            response(
                "t1",
                "b@x.com",
                answers(vec![
                    ("mood", Answer::scale(3)),
                    ("focus", Answer::choice(["A", "B"])),
                ]),
            ),
        ];

        assert_eq!(
            cross_tabulate("mood", "focus", &responses),
            vec![CrossTabGroup {
                key: "3".to_string(),
                count: 2,
                distribution: vec![("A".to_string(), 2), ("B".to_string(), 1)],
            }]
        );
    }

    #[test]
    fn responses_missing_either_answer_are_excluded() {
        let responses = vec![
            response("t1", "a@x.com", answers(vec![("mood", Answer::scale(3))])),
            response("t1", "b@x.com", answers(vec![("focus", Answer::choice(["A"]))])),
        ];
        assert!(cross_tabulate("mood", "focus", &responses).is_empty());
    }

    #[test]
    fn groups_sort_naturally() {
        let responses: Vec<_> = [10, 2, 1]
            .into_iter()
            .map(|v| {
                response(
                    "t1",
                    "a@x.com",
                    answers(vec![("mood", Answer::scale(v)), ("note", Answer::text("ok"))]),
                )
            })
            .collect();
        let keys: Vec<String> = cross_tabulate("mood", "note", &responses)
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, ["1", "2", "10"]);
    }

    #[test]
    fn multi_choice_group_key_joins_values() {
        let responses = vec![response(
            "t1",
            "a@x.com",
            answers(vec![
                ("tags", Answer::choice(["x", "y"])),
                ("mood", Answer::scale(4)),
            ]),
        )];
        let groups = cross_tabulate("tags", "mood", &responses);
        assert_eq!(groups[0].key, "x, y");
        assert_eq!(groups[0].distribution, vec![("4".to_string(), 1)]);
    }
}
