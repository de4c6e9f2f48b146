//! Advisory data-quality checks over the enriched record set.
//!
//! Every check runs regardless of what earlier checks found, and nothing here
//! stops the pipeline: the result is a [`ValidationReport`] handed back to the
//! caller. Checks:
//!
//! 1. missing values, counted per input column
//! 2. exact duplicate rows
//! 3. zero-payment customers (informational, never an issue)
//! 4. negative values in `age`, `visit_days`, `total_duration_min`, `total_payment_may`
//!
//! Duplicate `uid`s are reported alongside exact duplicates, since uid
//! uniqueness is part of the input contract.

use crate::record::{EnrichedRecord, NUMERIC_COLUMNS, RawRecord};
use crate::utils::percentage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// One advisory finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// The column the finding is about (optional)
    pub field: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Category, e.g. `missing_values`, `duplicate_rows`
    pub code: String,
}

impl ValidationIssue {
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            field: None,
            message: message.into(),
            code: code.into(),
        }
    }

    #[must_use]
    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "[{}] {}", field, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        write!(f, " (code: {})", self.code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub records: usize,
    /// Missing-value count per column; only columns with at least one gap.
    pub missing: BTreeMap<String, usize>,
    pub duplicate_rows: usize,
    pub duplicate_uids: usize,
    pub zero_payment_customers: usize,
    /// Share of zero-payment customers in percent, 0 for an empty set.
    pub zero_payment_pct: f64,
    /// Columns holding at least one negative value, in check order.
    pub negative_fields: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// `true` when no check produced an issue.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run every check over `records`.
#[must_use]
pub fn validate(records: &[EnrichedRecord]) -> ValidationReport {
    let raws: Vec<&RawRecord> = records.iter().map(EnrichedRecord::raw).collect();
    let mut report = ValidationReport {
        records: records.len(),
        ..ValidationReport::default()
    };

    report.missing = missing_values(&raws);
    if !report.missing.is_empty() {
        let detail = report
            .missing
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        report
            .issues
            .push(ValidationIssue::new("missing_values", format!("missing values found: {detail}")));
    }

    report.duplicate_rows = duplicate_rows(records);
    if report.duplicate_rows > 0 {
        report.issues.push(ValidationIssue::new(
            "duplicate_rows",
            format!("{} duplicate rows found", report.duplicate_rows),
        ));
    }

    report.duplicate_uids = duplicate_uids(&raws);
    if report.duplicate_uids > 0 {
        report.issues.push(
            ValidationIssue::new(
                "duplicate_uid",
                format!("{} records reuse an earlier uid", report.duplicate_uids),
            )
            .with_field("uid"),
        );
    }

    report.zero_payment_customers = raws.iter().filter(|r| r.total_payment == Some(0)).count();
    report.zero_payment_pct = percentage(report.zero_payment_customers, records.len());

    report.negative_fields = negative_fields(&raws);
    for field in &report.negative_fields {
        report.issues.push(
            ValidationIssue::new("negative_values", format!("{field} has negative values"))
                .with_field(field.clone()),
        );
    }

    report
}

fn missing_values(raws: &[&RawRecord]) -> BTreeMap<String, usize> {
    let mut missing = BTreeMap::new();
    for r in raws {
        for (field, present) in r.field_presence() {
            if !present {
                *missing.entry(field.to_string()).or_insert(0) += 1;
            }
        }
    }
    missing
}

/// Rows equal to an earlier row in every column.
fn duplicate_rows(records: &[EnrichedRecord]) -> usize {
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().filter(|r| !seen.insert(*r)).count()
}

fn duplicate_uids(raws: &[&RawRecord]) -> usize {
    let mut seen = HashSet::with_capacity(raws.len());
    let mut reused = 0;
    for &r in raws {
        if !r.uid.is_empty() && !seen.insert(r.uid.as_str()) {
            reused += 1;
        }
    }
    reused
}

fn negative_fields(raws: &[&RawRecord]) -> Vec<String> {
    NUMERIC_COLUMNS
        .iter()
        .enumerate()
        .filter(|(i, _)| raws.iter().any(|r| r.numeric_values()[*i].is_some_and(|v| v < 0)))
        .map(|(_, name)| (*name).to_string())
        .collect()
}
