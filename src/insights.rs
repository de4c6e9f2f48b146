//! Supplementary analytics for the reporting layer.
//!
//! These complement the [`StatisticsBundle`](crate::aggregate::StatisticsBundle)
//! with the views the dashboard serves: the retention funnel, a region ×
//! age-group revenue heat-map, the visit-frequency distribution and
//! activity/churn rates.

use crate::aggregate::{GroupTotals, Totals};
use crate::combiners::{Count, GroupBy, Sum};
use crate::record::{EnrichedRecord, RawRecord, VisitCategory};
use crate::runner::Runner;
use crate::utils::percentage;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub retention_funnel: RetentionFunnel,
    pub region_age_heatmap: Vec<HeatmapCell>,
    pub visit_distribution: Vec<VisitShare>,
    pub activity: Activity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionStep {
    pub count: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionFunnel {
    pub total: u64,
    pub june: RetentionStep,
    pub july: RetentionStep,
    pub august: RetentionStep,
    pub ninety_days: RetentionStep,
    /// Retained in June, July and August.
    pub fully_retained: RetentionStep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub region: Option<String>,
    pub age_group: Option<String>,
    pub revenue: i64,
    pub customers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitShare {
    pub category: VisitCategory,
    pub customers: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub active: u64,
    pub active_rate: f64,
    pub churned: u64,
    pub churn_rate: f64,
}

/// Compute every insight view.
///
/// # Errors
/// Fails only if the runner cannot build its thread pool.
pub fn insights(records: &[EnrichedRecord], runner: &Runner) -> Result<Insights> {
    Ok(Insights {
        retention_funnel: retention_funnel(records, runner)?,
        region_age_heatmap: region_age_heatmap(records, runner)?,
        visit_distribution: visit_distribution(records, runner)?,
        activity: activity(records, runner)?,
    })
}

/// Retention counts and rates at every checkpoint.
///
/// # Errors
/// See [`insights`].
pub fn retention_funnel(records: &[EnrichedRecord], runner: &Runner) -> Result<RetentionFunnel> {
    let total: u64 = runner.combine(records, &Count)?;
    let step = |flag: fn(&RawRecord) -> bool| {
        let count = records.iter().filter(|r| flag(r.raw())).count();
        RetentionStep {
            count: count as u64,
            rate: percentage(count, records.len()),
        }
    };

    Ok(RetentionFunnel {
        total,
        june: step(|r| r.retained_june.unwrap_or(false)),
        july: step(|r| r.retained_july.unwrap_or(false)),
        august: step(|r| r.retained_august.unwrap_or(false)),
        ninety_days: step(RawRecord::retained),
        fully_retained: step(|r| {
            r.retained_june.unwrap_or(false)
                && r.retained_july.unwrap_or(false)
                && r.retained_august.unwrap_or(false)
        }),
    })
}

/// Region × age-group cells, revenue descending, ties in first-seen order.
///
/// # Errors
/// See [`insights`].
pub fn region_age_heatmap(records: &[EnrichedRecord], runner: &Runner) -> Result<Vec<HeatmapCell>> {
    let groups: Vec<((Option<String>, Option<String>), Totals)> = runner.combine(
        records,
        &GroupBy::new(
            |r: &EnrichedRecord| {
                (
                    r.region_label().map(str::to_string),
                    r.age_label().map(str::to_string),
                )
            },
            GroupTotals,
        ),
    )?;

    let mut cells: Vec<HeatmapCell> = groups
        .into_iter()
        .map(|((region, age_group), t)| HeatmapCell {
            region,
            age_group,
            revenue: t.revenue,
            customers: t.customers,
        })
        .collect();
    cells.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    Ok(cells)
}

/// Customers per visit category in bucket order, empty buckets omitted.
///
/// # Errors
/// See [`insights`].
#[allow(clippy::cast_possible_truncation)]
pub fn visit_distribution(records: &[EnrichedRecord], runner: &Runner) -> Result<Vec<VisitShare>> {
    let counts: Vec<(VisitCategory, u64)> = runner.combine(
        records,
        &GroupBy::new(|r: &EnrichedRecord| r.visit_category, Count),
    )?;

    Ok(VisitCategory::ALL
        .iter()
        .filter_map(|category| {
            let (_, n) = counts.iter().find(|(c, _)| c == category)?;
            Some(VisitShare {
                category: *category,
                customers: *n,
                percentage: percentage(*n as usize, records.len()),
            })
        })
        .collect())
}

/// Active and churned head-counts with their rates.
///
/// # Errors
/// See [`insights`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn activity(records: &[EnrichedRecord], runner: &Runner) -> Result<Activity> {
    let active = runner.combine(records, &Sum::by(|r: &EnrichedRecord| i64::from(r.is_active)))?;
    let churned = runner.combine(records, &Sum::by(|r: &EnrichedRecord| i64::from(r.is_churned)))?;

    Ok(Activity {
        active: active as u64,
        active_rate: percentage(active as usize, records.len()),
        churned: churned as u64,
        churn_rate: percentage(churned as usize, records.len()),
    })
}
