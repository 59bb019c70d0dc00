//! Numeric-aware string ordering
//!
//! Strings are split into runs of ASCII digits and runs of everything else.
//! Digit runs compare by numeric value, other runs case-insensitively, and
//! digit runs sort before text runs at the same position. Strings whose runs
//! compare equal ("007" and "7", "a" and "A") fall back to plain byte order,
//! so the result is a total order.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Run<'a> {
    // Field order matters: shorter digit strings (no leading zeros) are smaller numbers
    Number { len: usize, digits: &'a str },
    Text(String),
}

fn runs(s: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let is_digit = bytes[start].is_ascii_digit();
        let end = bytes[start..]
            .iter()
            .position(|b| b.is_ascii_digit() != is_digit)
            .map_or(bytes.len(), |offset| start + offset);

        // Digit runs are ASCII, so both bounds sit on char boundaries
        let chunk = &s[start..end];
        if is_digit {
            let digits = chunk.trim_start_matches('0');
            out.push(Run::Number {
                len: digits.len(),
                digits,
            });
        } else {
            out.push(Run::Text(chunk.to_lowercase()));
        }
        start = end;
    }
    out
}

/// Compare two strings in natural order ("2" < "10", "item9" < "item10")
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    runs(a).cmp(&runs(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "9"), Ordering::Greater);
        assert_eq!(natural_cmp("item9", "item10"), Ordering::Less);
    }

    #[test]
    fn text_ignores_case_then_breaks_ties() {
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(natural_cmp("A", "a"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_only_break_ties() {
        assert_eq!(natural_cmp("007", "8"), Ordering::Less);
        assert_ne!(natural_cmp("007", "7"), Ordering::Equal);
    }

    #[test]
    fn sorts_mixed_labels() {
        let mut labels = vec!["10", "Yes", "2", "1", "No"];
        labels.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(labels, ["1", "2", "10", "No", "Yes"]);
    }

    #[test]
    fn handles_multibyte_text() {
        assert_eq!(natural_cmp("é1", "é2"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }
}
