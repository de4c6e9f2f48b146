//! Assertions over pipeline results.

use crate::aggregate::StatisticsBundle;
use crate::record::EnrichedRecord;
use std::fmt::Debug;

/// Assert that every element satisfies `predicate`.
///
/// # Panics
///
/// Panics naming the first failing element.
///
/// ```
/// use visitbeam::testing::assert_all;
///
/// assert_all(&[2, 4, 6], |x| x % 2 == 0);
/// ```
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    for (i, item) in collection.iter().enumerate() {
        assert!(
            predicate(item),
            "Predicate failed for element at index {i}:\n  Element: {item:?}"
        );
    }
}

/// Assert that the region and grade groups each partition the overall totals.
///
/// # Panics
///
/// Panics if a customer or revenue sum over the groups differs from `overall`.
pub fn assert_groups_partition(stats: &StatisticsBundle) {
    let overall = &stats.overall;

    let region_revenue: i64 = stats.by_region.iter().map(|g| g.revenue).sum();
    let region_customers: u64 = stats.by_region.iter().map(|g| g.customers).sum();
    assert_eq!(region_revenue, overall.total_revenue, "region revenue does not sum to total");
    assert_eq!(region_customers, overall.total_customers, "region customers do not sum to total");

    let age_customers: u64 = stats.by_age_group.iter().map(|g| g.customers).sum();
    assert_eq!(age_customers, overall.total_customers, "age-group customers do not sum to total");

    let grade_revenue: i64 = stats.by_grade.iter().map(|g| g.revenue).sum();
    assert_eq!(grade_revenue, overall.total_revenue, "grade revenue does not sum to total");
    assert!(
        stats.by_grade.iter().all(|g| g.customers > 0),
        "empty grade listed: {:?}",
        stats.by_grade
    );
}

/// Assert the per-record derivation invariants on every record.
///
/// # Panics
///
/// Panics naming the first record that breaks one.
pub fn assert_derivation_invariants(records: &[EnrichedRecord]) {
    assert_all(records, |r| r.payment_per_visit >= 0);
    assert_all(records, |r| r.raw().visits() != 0 || r.payment_per_visit == 0);
    assert_all(records, |r| r.is_churned == !r.raw().retained());
}
