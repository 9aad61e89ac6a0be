//! Aggregation of `Plan:` tally lines and the flags derived from them

use lazy_static::lazy_static;
use regex::Regex;

use super::constants::{NO_CHANGES, SUMMARY_LINE_PREFIX};

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"[0-9]+").expect("Invalid number pattern regex");
}

/// Resource counts of a plan tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub to_add: u64,
    pub to_change: u64,
    pub to_destroy: u64,
}

impl PlanSummary {
    /// Read counts positionally from a summary sentence.
    ///
    /// Missing counts are zero, so the no-changes sentinel reads as an empty plan.
    /// Returns `None` for an empty sentence or a count that does not fit.
    pub fn from_summary_line(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }

        let mut counts = [0u64; 3];
        for (slot, token) in counts.iter_mut().zip(NUMBER.find_iter(line)) {
            *slot = token.as_str().parse().ok()?;
        }

        Some(Self {
            to_add: counts[0],
            to_change: counts[1],
            to_destroy: counts[2],
        })
    }

    /// Read exactly the first three counts of a `Plan:` line
    fn from_plan_line(line: &str) -> Option<Self> {
        let mut tokens = NUMBER.find_iter(line).map(|m| m.as_str().parse::<u64>());

        Some(Self {
            to_add: tokens.next()?.ok()?,
            to_change: tokens.next()?.ok()?,
            to_destroy: tokens.next()?.ok()?,
        })
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            to_add: self.to_add.checked_add(other.to_add)?,
            to_change: self.to_change.checked_add(other.to_change)?,
            to_destroy: self.to_destroy.checked_add(other.to_destroy)?,
        })
    }

    /// Zero destroys counts as no destroy
    pub fn has_destroy(&self) -> bool {
        self.to_destroy > 0
    }

    pub fn has_no_changes(&self) -> bool {
        self.to_add == 0 && self.to_change == 0 && self.to_destroy == 0
    }

    pub fn has_add_or_update_only(&self) -> bool {
        (self.to_add > 0 || self.to_change > 0) && self.to_destroy == 0
    }

    /// Render as the normalized tally sentence
    pub fn to_sentence(&self) -> String {
        format!(
            "Plan: {} to add, {} to change, {} to destroy.",
            self.to_add, self.to_change, self.to_destroy
        )
    }
}

/// Flags derived from an aggregated summary sentence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub has_destroy: bool,
    pub has_no_changes: bool,
    pub has_add_or_update_only: bool,
}

impl Classification {
    /// Classify an aggregated summary; an unusable summary raises no flag
    pub fn from_summary(summary: &str) -> Self {
        match PlanSummary::from_summary_line(summary) {
            Some(counts) => Self {
                has_destroy: counts.has_destroy(),
                has_no_changes: counts.has_no_changes(),
                has_add_or_update_only: counts.has_add_or_update_only(),
            },
            None => Self::default(),
        }
    }
}

/// Sum every `Plan:` line into one normalized sentence.
///
/// Without any tally line the no-changes sentinel is returned. A tally line
/// without three usable counts makes the whole aggregation come back empty.
pub fn aggregate_plan_lines(lines: &[&str]) -> String {
    let plan_lines: Vec<&str> = lines
        .iter()
        .filter(|line| line.starts_with(SUMMARY_LINE_PREFIX))
        .copied()
        .collect();

    if plan_lines.is_empty() {
        return NO_CHANGES.to_string();
    }

    let mut total = PlanSummary::default();
    for line in plan_lines {
        let Some(summed) = PlanSummary::from_plan_line(line).and_then(|counts| total.checked_add(counts))
        else {
            tracing::debug!(line, "unusable plan summary line");
            return String::new();
        };
        total = summed;
    }

    total.to_sentence()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_single_line() {
        let lines = ["", "Plan: 1 to add, 2 to change, 3 to destroy.", ""];
        assert_eq!(
            aggregate_plan_lines(&lines),
            "Plan: 1 to add, 2 to change, 3 to destroy."
        );
    }

    #[test]
    fn test_aggregate_sums_repeated_lines() {
        let lines = [
            "Plan: 1 to add, 0 to change, 0 to destroy.",
            "something else",
            "Plan: 2 to add, 1 to change, 0 to destroy.",
        ];
        assert_eq!(
            aggregate_plan_lines(&lines),
            "Plan: 3 to add, 1 to change, 0 to destroy."
        );
    }

    #[test]
    fn test_aggregate_without_plan_line_is_no_changes() {
        let lines = ["No changes. Your infrastructure matches the configuration."];
        assert_eq!(aggregate_plan_lines(&lines), NO_CHANGES);
    }

    #[test]
    fn test_aggregate_ignores_indented_plan_text() {
        let lines = ["  Plan: 9 to add, 9 to change, 9 to destroy.", "Plan: 1 to add, 0 to change, 0 to destroy."];
        assert_eq!(
            aggregate_plan_lines(&lines),
            "Plan: 1 to add, 0 to change, 0 to destroy."
        );
    }

    #[test]
    fn test_aggregate_line_with_missing_counts_fails() {
        let lines = ["Plan: 1 to add, 0 to change, 0 to destroy.", "Plan: 5 to add"];
        assert_eq!(aggregate_plan_lines(&lines), "");
    }

    #[test]
    fn test_aggregate_overflowing_count_fails() {
        let lines = ["Plan: 99999999999999999999999 to add, 0 to change, 0 to destroy."];
        assert_eq!(aggregate_plan_lines(&lines), "");
    }

    #[test]
    fn test_classify_no_changes() {
        let flags = Classification::from_summary("Plan: 0 to add, 0 to change, 0 to destroy.");
        assert!(flags.has_no_changes);
        assert!(!flags.has_destroy);
        assert!(!flags.has_add_or_update_only);
    }

    #[test]
    fn test_classify_destroy() {
        let flags = Classification::from_summary("Plan: 0 to add, 0 to change, 1 to destroy.");
        assert!(flags.has_destroy);
        assert!(!flags.has_no_changes);
        assert!(!flags.has_add_or_update_only);
    }

    #[test]
    fn test_classify_zero_destroy_is_not_destructive() {
        let flags = Classification::from_summary("Plan: 3 to add, 1 to change, 0 to destroy.");
        assert!(flags.has_add_or_update_only);
        assert!(!flags.has_destroy);
        assert!(!flags.has_no_changes);
    }

    #[test]
    fn test_classify_mixed_changes_with_destroy() {
        let flags = Classification::from_summary("Plan: 2 to add, 0 to change, 2 to destroy.");
        assert!(flags.has_destroy);
        assert!(!flags.has_add_or_update_only);
    }

    #[test]
    fn test_classify_sentinel_is_no_changes() {
        let flags = Classification::from_summary(NO_CHANGES);
        assert!(flags.has_no_changes);
        assert!(!flags.has_destroy);
    }

    #[test]
    fn test_classify_empty_summary_raises_nothing() {
        assert_eq!(Classification::from_summary(""), Classification::default());
    }

    #[test]
    fn test_summary_from_line() {
        let summary =
            PlanSummary::from_summary_line("Plan: 4 to add, 5 to change, 6 to destroy.").unwrap();
        assert_eq!(summary.to_add, 4);
        assert_eq!(summary.to_change, 5);
        assert_eq!(summary.to_destroy, 6);
        assert_eq!(summary.to_sentence(), "Plan: 4 to add, 5 to change, 6 to destroy.");
    }
}
