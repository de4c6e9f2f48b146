//! Grouped statistics over the final record set.
//!
//! The [`StatisticsBundle`] holds one overall summary and three group
//! listings:
//!
//! - `by_region`: canonical region-group label (absent labels form their own
//!   group), sorted by revenue descending, ties in first-seen order
//! - `by_age_group`: canonical age-group label (absent as its own group), in
//!   first-seen order
//! - `by_grade`: fixed `VIP, Gold, Silver, Bronze` order, empty grades omitted
//!
//! Groups are only ever built from labels present in the data, so no mean is
//! taken over an empty group.

use crate::combiners::{CombineFn, Count, GroupBy, Mean, Median, Rate, Sum};
use crate::record::{CustomerGrade, EnrichedRecord};
use crate::runner::Runner;
use crate::utils::{percentage, round2, trunc};
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    pub overall: OverallStats,
    pub by_region: Vec<RegionSummary>,
    pub by_age_group: Vec<AgeGroupSummary>,
    pub by_grade: Vec<GradeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_customers: u64,
    pub total_revenue: i64,
    /// Mean payment, truncated to an integer.
    pub avg_revenue: i64,
    /// Median payment, truncated to an integer.
    pub median_revenue: i64,
    pub avg_visits: f64,
    /// Percentage of customers retained at 90 days.
    pub retention_rate_90: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: Option<String>,
    pub customers: u64,
    pub revenue: i64,
    pub avg_revenue: i64,
    pub avg_visits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroupSummary {
    pub age_group: Option<String>,
    pub customers: u64,
    pub revenue: i64,
    pub avg_revenue: i64,
    pub retention_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub grade: CustomerGrade,
    pub customers: u64,
    pub revenue: i64,
    /// Share of all records, in percent.
    pub percentage: f64,
}

/* ===================== GroupTotals ===================== */

/// Running totals for one group of records. Sums saturate at the `i64` bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub customers: u64,
    pub revenue: i64,
    pub visits: i64,
    pub retained: u64,
}

impl Totals {
    #[must_use]
    pub fn avg_revenue(&self) -> i64 {
        if self.customers == 0 {
            0
        } else {
            self.revenue / self.customers as i64
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_visits(&self) -> f64 {
        if self.customers == 0 {
            0.0
        } else {
            round2(self.visits as f64 / self.customers as f64)
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn retention_rate(&self) -> f64 {
        percentage(self.retained as usize, self.customers as usize)
    }
}

/// Combiner producing [`Totals`] for a set of records.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupTotals;

impl<'r> CombineFn<&'r EnrichedRecord, Totals, Totals> for GroupTotals {
    fn create(&self) -> Totals {
        Totals::default()
    }

    fn add_input(&self, acc: &mut Totals, r: &'r EnrichedRecord) {
        let raw = r.raw();
        acc.customers += 1;
        acc.revenue = acc.revenue.saturating_add(raw.payment());
        acc.visits = acc.visits.saturating_add(raw.visits());
        acc.retained += u64::from(raw.retained());
    }

    fn merge(&self, acc: &mut Totals, other: Totals) {
        acc.customers += other.customers;
        acc.revenue = acc.revenue.saturating_add(other.revenue);
        acc.visits = acc.visits.saturating_add(other.visits);
        acc.retained += other.retained;
    }

    fn finish(&self, acc: Totals) -> Totals {
        acc
    }
}

/* ===================== Aggregation ===================== */

/// Build the full statistics bundle.
///
/// # Errors
/// Fails only if the runner cannot build its thread pool.
pub fn aggregate(records: &[EnrichedRecord], runner: &Runner) -> Result<StatisticsBundle> {
    Ok(StatisticsBundle {
        overall: overall(records, runner)?,
        by_region: by_region(records, runner)?,
        by_age_group: by_age_group(records, runner)?,
        by_grade: by_grade(records, runner)?,
    })
}

/// Whole-set summary. An empty set yields all zeros.
///
/// # Errors
/// See [`aggregate`].
pub fn overall(records: &[EnrichedRecord], runner: &Runner) -> Result<OverallStats> {
    let total_customers: u64 = runner.combine(records, &Count)?;
    let total_revenue: i64 = runner.combine(records, &Sum::by(|r: &EnrichedRecord| r.raw().payment()))?;
    let mean_revenue: Option<f64> =
        runner.combine(records, &Mean::by(|r: &EnrichedRecord| r.raw().payment()))?;
    let median_revenue: Option<f64> =
        runner.combine(records, &Median::by(|r: &EnrichedRecord| r.raw().payment()))?;
    let mean_visits: Option<f64> =
        runner.combine(records, &Mean::by(|r: &EnrichedRecord| r.raw().visits()))?;
    let retention: Option<f64> =
        runner.combine(records, &Rate::of(|r: &EnrichedRecord| r.raw().retained()))?;

    Ok(OverallStats {
        total_customers,
        total_revenue,
        avg_revenue: mean_revenue.map_or(0, trunc),
        median_revenue: median_revenue.map_or(0, trunc),
        avg_visits: mean_visits.map_or(0.0, round2),
        retention_rate_90: retention.map_or(0.0, round2),
    })
}

/// Per region-group summaries, revenue descending.
///
/// # Errors
/// See [`aggregate`].
pub fn by_region(records: &[EnrichedRecord], runner: &Runner) -> Result<Vec<RegionSummary>> {
    let groups: Vec<(Option<String>, Totals)> = runner.combine(
        records,
        &GroupBy::new(
            |r: &EnrichedRecord| r.region_label().map(str::to_string),
            GroupTotals,
        ),
    )?;

    let mut out: Vec<RegionSummary> = groups
        .into_iter()
        .map(|(region, t)| RegionSummary {
            region,
            customers: t.customers,
            revenue: t.revenue,
            avg_revenue: t.avg_revenue(),
            avg_visits: t.avg_visits(),
        })
        .collect();
    // stable: equal revenue keeps first-seen order
    out.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    Ok(out)
}

/// Per age-group summaries, first-seen order.
///
/// # Errors
/// See [`aggregate`].
pub fn by_age_group(records: &[EnrichedRecord], runner: &Runner) -> Result<Vec<AgeGroupSummary>> {
    let groups: Vec<(Option<String>, Totals)> = runner.combine(
        records,
        &GroupBy::new(
            |r: &EnrichedRecord| r.age_label().map(str::to_string),
            GroupTotals,
        ),
    )?;

    Ok(groups
        .into_iter()
        .map(|(age_group, t)| AgeGroupSummary {
            age_group,
            customers: t.customers,
            revenue: t.revenue,
            avg_revenue: t.avg_revenue(),
            retention_rate: t.retention_rate(),
        })
        .collect())
}

/// Per grade summaries in fixed grade order, skipping empty grades.
///
/// # Errors
/// See [`aggregate`].
#[allow(clippy::cast_possible_truncation)]
pub fn by_grade(records: &[EnrichedRecord], runner: &Runner) -> Result<Vec<GradeSummary>> {
    let groups: Vec<(CustomerGrade, Totals)> = runner.combine(
        records,
        &GroupBy::new(|r: &EnrichedRecord| r.customer_grade, GroupTotals),
    )?;

    Ok(CustomerGrade::ALL
        .iter()
        .filter_map(|grade| {
            let (_, t) = groups.iter().find(|(g, _)| g == grade)?;
            (t.customers > 0).then(|| GradeSummary {
                grade: *grade,
                customers: t.customers,
                revenue: t.revenue,
                percentage: percentage(t.customers as usize, records.len()),
            })
        })
        .collect())
}
