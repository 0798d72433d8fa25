//! Estimate list reconciliation.
//!
//! Locally persisted estimates are merged with the static seed set, with the
//! local record winning whenever both carry the same `number`. The merged
//! list is then narrowed by the user's [`FilterSelection`]. Everything here
//! is pure and cheap enough to run on every list refresh.

use std::{cmp::Ordering, collections::HashSet};

use serde::Serialize;

use crate::db::{
    helpers::strict_iso_date,
    models::{Estimate, EstimateType},
};

use super::selection::FilterSelection;

/// Tab badge counts over the merged, unfiltered list.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabCounts {
    pub active: usize,
    pub draft: usize,
}

/// Rows to render plus the tab badges.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateListView {
    pub rows: Vec<Estimate>,
    pub counts: TabCounts,
}

/// `local` in order, followed by every seed record whose number is not
/// already taken by a local record. Duplicates within `local` are kept.
pub fn merge(local: &[Estimate], seed: &[Estimate]) -> Vec<Estimate> {
    let local_numbers: HashSet<&str> = local.iter().map(|e| e.number.as_str()).collect();

    let mut merged = Vec::with_capacity(local.len() + seed.len());
    merged.extend_from_slice(local);
    merged.extend(
        seed.iter()
            .filter(|e| !local_numbers.contains(e.number.as_str()))
            .cloned(),
    );
    merged
}

/// Stable filter: survivors keep their input order.
pub fn filter(records: &[Estimate], selection: &FilterSelection) -> Vec<Estimate> {
    records
        .iter()
        .filter(|record| matches(record, selection))
        .cloned()
        .collect()
}

/// Whether `record` satisfies every active criterion of `selection`.
pub fn matches(record: &Estimate, selection: &FilterSelection) -> bool {
    if !selection.tab.admits(record.estimate_type) {
        return false;
    }

    if let Some(query) = selection.search_query() {
        let query = query.to_lowercase();
        let hit = record.number.to_lowercase().contains(&query)
            || record.customer.to_lowercase().contains(&query);
        if !hit {
            return false;
        }
    }

    if let Some(customer) = selection.customer() {
        if record.customer != customer {
            return false;
        }
    }

    if let Some(status) = selection.status() {
        if record.status != status {
            return false;
        }
    }

    if let Some(from) = selection.date_from() {
        if compare_dates(&record.date, from) == Ordering::Less {
            return false;
        }
    }

    if let Some(to) = selection.date_to() {
        if compare_dates(&record.date, to) == Ordering::Greater {
            return false;
        }
    }

    true
}

pub fn tab_counts(records: &[Estimate]) -> TabCounts {
    records
        .iter()
        .fold(TabCounts::default(), |mut counts, record| {
            match record.estimate_type {
                EstimateType::Active => counts.active += 1,
                EstimateType::Draft => counts.draft += 1,
            }
            counts
        })
}

/// Merge, count, then filter.
pub fn reconcile(
    local: &[Estimate],
    seed: &[Estimate],
    selection: &FilterSelection,
) -> EstimateListView {
    let merged = merge(local, seed);
    let counts = tab_counts(&merged);
    let rows = if selection.is_pass_through() {
        merged
    } else {
        filter(&merged, selection)
    };

    EstimateListView { rows, counts }
}

// Calendar comparison when both sides are zero-padded YYYY-MM-DD; anything
// else falls back to plain string order.
fn compare_dates(left: &str, right: &str) -> Ordering {
    match (strict_iso_date(left), strict_iso_date(right)) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => left.cmp(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimates::selection::Tab;

    fn estimate(
        id: i64,
        number: &str,
        customer: &str,
        date: &str,
        status: &str,
        estimate_type: EstimateType,
    ) -> Estimate {
        Estimate {
            id,
            number: number.into(),
            date: date.into(),
            customer: customer.into(),
            amount: "$450.00".into(),
            status: status.into(),
            estimate_type,
            valid_until: None,
            notes: String::new(),
            customer_id: None,
            customer_obj: None,
            items: Vec::new(),
        }
    }

    fn scenario_seed() -> Vec<Estimate> {
        vec![
            estimate(
                1,
                "45303",
                "Yomal Thushara",
                "2026-02-26",
                "Saved",
                EstimateType::Active,
            ),
            estimate(
                2,
                "45304",
                "Amal Perera",
                "2026-02-25",
                "Draft",
                EstimateType::Draft,
            ),
        ]
    }

    fn numbers(records: &[Estimate]) -> Vec<&str> {
        records.iter().map(|e| e.number.as_str()).collect()
    }

    #[test]
    fn empty_local_keeps_seed_order() {
        let seed = scenario_seed();
        let merged = merge(&[], &seed);

        assert_eq!(merged, seed);
        assert_eq!(tab_counts(&merged), TabCounts { active: 1, draft: 1 });
    }

    #[test]
    fn local_record_shadows_seed_with_same_number() {
        let seed = scenario_seed();
        let local = vec![estimate(
            17,
            "45304",
            "Amal Perera",
            "2026-02-25",
            "Sent",
            EstimateType::Active,
        )];

        let merged = merge(&local, &seed);

        assert_eq!(merged, vec![local[0].clone(), seed[0].clone()]);
        assert_eq!(
            merged.iter().filter(|e| e.number == "45304").count(),
            1
        );
        assert_eq!(tab_counts(&merged), TabCounts { active: 2, draft: 0 });
    }

    #[test]
    fn merge_length_counts_unshadowed_seed() {
        let seed = scenario_seed();
        let local = vec![
            estimate(9, "50000", "Nimal Silva", "2026-03-01", "Draft", EstimateType::Draft),
            estimate(8, "45303", "Yomal Thushara", "2026-02-26", "Sent", EstimateType::Active),
        ];

        let merged = merge(&local, &seed);

        assert_eq!(merged.len(), local.len() + 1);
        assert_eq!(numbers(&merged), vec!["50000", "45303", "45304"]);
        assert_eq!(merged[2], seed[1]);
        let unique: HashSet<&str> = merged.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(unique.len(), merged.len());
    }

    #[test]
    fn duplicates_within_local_are_retained() {
        let local = vec![
            estimate(1, "60000", "A", "2026-01-01", "Draft", EstimateType::Draft),
            estimate(2, "60000", "B", "2026-01-02", "Draft", EstimateType::Draft),
        ];

        let merged = merge(&local, &scenario_seed());
        assert_eq!(numbers(&merged), vec!["60000", "60000", "45303", "45304"]);
    }

    #[test]
    fn draft_tab_selects_drafts() {
        let merged = merge(&[], &scenario_seed());
        let rows = filter(&merged, &FilterSelection::tab(Tab::Draft));
        assert_eq!(numbers(&rows), vec!["45304"]);

        let rows = filter(&merged, &FilterSelection::tab(Tab::Active));
        assert_eq!(numbers(&rows), vec!["45303"]);
    }

    #[test]
    fn search_is_case_insensitive_over_number_and_customer() {
        let merged = merge(&[], &scenario_seed());

        let rows = filter(&merged, &FilterSelection::search("yomal"));
        assert_eq!(numbers(&rows), vec!["45303"]);

        let rows = filter(&merged, &FilterSelection::search("4530"));
        assert_eq!(numbers(&rows), vec!["45303", "45304"]);

        let rows = filter(&merged, &FilterSelection::search("PERERA"));
        assert_eq!(numbers(&rows), vec!["45304"]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let merged = merge(&[], &scenario_seed());

        let rows = filter(
            &merged,
            &FilterSelection::date_range(Some("2026-02-25"), Some("2026-02-26")),
        );
        assert_eq!(rows.len(), 2);

        let rows = filter(&merged, &FilterSelection::date_range(Some("2026-02-27"), None));
        assert!(rows.is_empty());

        let rows = filter(&merged, &FilterSelection::date_range(None, Some("2026-02-25")));
        assert_eq!(numbers(&rows), vec!["45304"]);
    }

    #[test]
    fn malformed_bounds_fall_back_to_string_order() {
        let merged = merge(&[], &scenario_seed());
        // "2026-2-26" sorts after "2026-02-26" as a string.
        let rows = filter(&merged, &FilterSelection::date_range(Some("2026-2-26"), None));
        assert!(rows.is_empty());
    }

    #[test]
    fn unpadded_dates_compare_as_strings() {
        assert_eq!(compare_dates("2026-02-26", "2026-2-26"), Ordering::Less);
        assert_eq!(compare_dates("2026-02-26", "2026-02-26"), Ordering::Equal);
        assert_eq!(compare_dates("2026-02-26", "2026-02-9"), Ordering::Less);
        assert_eq!(compare_dates("2026-03-01", "2026-02-28"), Ordering::Greater);

        let merged = merge(&[], &scenario_seed());
        let rows = filter(&merged, &FilterSelection::date_range(None, Some("2026-2-1")));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn customer_and_status_match_exactly() {
        let merged = merge(&[], &scenario_seed());

        let selection = FilterSelection {
            customer: Some("Yomal Thushara".into()),
            ..FilterSelection::default()
        };
        assert_eq!(numbers(&filter(&merged, &selection)), vec!["45303"]);

        let selection = FilterSelection {
            customer: Some("yomal thushara".into()),
            ..FilterSelection::default()
        };
        assert!(filter(&merged, &selection).is_empty());

        let selection = FilterSelection {
            status: Some("Draft".into()),
            ..FilterSelection::default()
        };
        assert_eq!(numbers(&filter(&merged, &selection)), vec!["45304"]);
    }

    #[test]
    fn criteria_combine_as_conjunction() {
        let merged = merge(&[], &scenario_seed());
        let selection = FilterSelection {
            tab: Tab::Draft,
            search_query: Some("yomal".into()),
            ..FilterSelection::default()
        };
        assert!(filter(&merged, &selection).is_empty());
    }

    #[test]
    fn pass_through_selection_is_identity() {
        let merged = merge(&[], &scenario_seed());
        assert_eq!(filter(&merged, &FilterSelection::default()), merged);
    }

    #[test]
    fn filter_is_idempotent() {
        let merged = merge(&[], &scenario_seed());
        let selection = FilterSelection {
            search_query: Some("a".into()),
            date_to: Some("2026-02-26".into()),
            ..FilterSelection::default()
        };

        let once = filter(&merged, &selection);
        assert_eq!(filter(&once, &selection), once);
    }

    #[test]
    fn combined_filter_is_idempotent() {
        let local = vec![
            estimate(7, "45310", "Amal Perera", "2026-03-02", "Draft", EstimateType::Draft),
            estimate(6, "45309", "Amal Perera", "2026-03-01", "Sent", EstimateType::Active),
        ];
        let merged = merge(&local, &scenario_seed());
        let selection = FilterSelection {
            tab: Tab::Draft,
            customer: Some("Amal Perera".into()),
            status: Some("Draft".into()),
            ..FilterSelection::default()
        };

        let once = filter(&merged, &selection);
        assert_eq!(numbers(&once), vec!["45310", "45304"]);
        assert_eq!(filter(&once, &selection), once);
    }

    #[test]
    fn reconcile_counts_before_filtering() {
        let view = reconcile(&[], &scenario_seed(), &FilterSelection::tab(Tab::Draft));

        assert_eq!(numbers(&view.rows), vec!["45304"]);
        assert_eq!(view.counts, TabCounts { active: 1, draft: 1 });
    }
}
