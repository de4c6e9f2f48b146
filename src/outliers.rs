//! Outlier analysis against fixed upper thresholds.
//!
//! Each threshold is counted independently, so one record can show up in
//! several counts. Removal is opt-in; when enabled a record survives only if
//! it breaches none of the thresholds.

use crate::record::EnrichedRecord;
use serde::{Deserialize, Serialize};

/// Strict upper bounds: a value *above* the bound is an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierThresholds {
    pub max_payment: i64,
    pub max_visit_days: i64,
    pub max_duration_min: i64,
}

impl Default for OutlierThresholds {
    fn default() -> Self {
        Self {
            max_payment: 500_000,
            max_visit_days: 25,
            max_duration_min: 10_000,
        }
    }
}

impl OutlierThresholds {
    #[must_use]
    pub fn payment_breached(&self, r: &EnrichedRecord) -> bool {
        r.raw().total_payment.is_some_and(|v| v > self.max_payment)
    }

    #[must_use]
    pub fn visits_breached(&self, r: &EnrichedRecord) -> bool {
        r.raw().visit_days.is_some_and(|v| v > self.max_visit_days)
    }

    #[must_use]
    pub fn duration_breached(&self, r: &EnrichedRecord) -> bool {
        r.raw().total_duration_min.is_some_and(|v| v > self.max_duration_min)
    }

    /// `true` if the record breaches at least one threshold.
    #[must_use]
    pub fn is_outlier(&self, r: &EnrichedRecord) -> bool {
        self.payment_breached(r) || self.visits_breached(r) || self.duration_breached(r)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub extreme_payment: usize,
    pub extreme_visits: usize,
    pub extreme_duration: usize,
    /// Whether removal was requested for this run.
    pub removal_enabled: bool,
    /// Records dropped; always 0 when removal is disabled.
    pub removed: usize,
}

/// Count threshold breaches and, if `remove` is set, drop breaching records.
///
/// With `remove == false` the returned records are the input, untouched.
#[must_use]
pub fn analyze(
    records: Vec<EnrichedRecord>,
    thresholds: &OutlierThresholds,
    remove: bool,
) -> (Vec<EnrichedRecord>, OutlierReport) {
    let mut report = OutlierReport {
        removal_enabled: remove,
        ..OutlierReport::default()
    };
    for r in &records {
        report.extreme_payment += usize::from(thresholds.payment_breached(r));
        report.extreme_visits += usize::from(thresholds.visits_breached(r));
        report.extreme_duration += usize::from(thresholds.duration_breached(r));
    }

    if !remove {
        return (records, report);
    }

    let before = records.len();
    let kept: Vec<EnrichedRecord> = records
        .into_iter()
        .filter(|r| !thresholds.is_outlier(r))
        .collect();
    report.removed = before - kept.len();
    (kept, report)
}
