//! Ordering and aggregation properties

use holocron_analytics::{cross_tabulate, natural_cmp, participation_rate};
use holocron_model::Answer;
use holocron_test_utils::{answers, response};
use proptest::prelude::*;
use std::cmp::Ordering;

proptest! {
    #[test]
    fn prop_natural_matches_numeric_order(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        prop_assert_eq!(natural_cmp(&a.to_string(), &b.to_string()), a.cmp(&b));
    }

    #[test]
    fn prop_natural_is_antisymmetric(a in "[a-c0-9]{0,6}", b in "[a-c0-9]{0,6}") {
        prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        prop_assert_eq!(natural_cmp(&a, &b) == Ordering::Equal, a == b);
    }

    #[test]
    fn prop_natural_is_transitive(
        a in "[aB0-9]{0,5}",
        b in "[aB0-9]{0,5}",
        c in "[aB0-9]{0,5}",
    ) {
        let mut sorted = vec![a, b, c];
        sorted.sort_by(|x, y| natural_cmp(x, y));
        prop_assert_ne!(natural_cmp(&sorted[0], &sorted[1]), Ordering::Greater);
        prop_assert_ne!(natural_cmp(&sorted[1], &sorted[2]), Ordering::Greater);
        prop_assert_ne!(natural_cmp(&sorted[0], &sorted[2]), Ordering::Greater);
    }

    #[test]
    fn prop_group_counts_cover_complete_responses(scores in proptest::collection::vec(1i32..=5, 0..30)) {
        let responses: Vec<_> = scores
            .iter()
            .map(|score| {
                response(
                    "t1",
                    "a@x.com",
                    answers(vec![("mood", Answer::scale(*score)), ("focus", Answer::choice(["A"]))]),
                )
            })
            .collect();

        let groups = cross_tabulate("mood", "focus", &responses);
        let total: usize = groups.iter().map(|g| g.count).sum();
        prop_assert_eq!(total, scores.len());
        for group in &groups {
            prop_assert_eq!(group.distribution.clone(), vec![("A".to_string(), group.count)]);
        }
    }

    #[test]
    fn prop_participation_is_never_negative(
        responses in 0usize..500,
        team in 0usize..50,
        templates in 0usize..20,
    ) {
        prop_assert!(participation_rate(responses, team, templates) >= 0.0);
    }
}
