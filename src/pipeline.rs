//! The pipeline driver.
//!
//! Stages run in a fixed order, each consuming the previous stage's output:
//!
//! ```text
//! load → normalize → derive → validate → outliers → aggregate → insights
//! ```
//!
//! Validation looks at every enriched record before any outlier removal. Only
//! loading can fail the run; every other finding lands in a report on
//! [`PipelineOutput`].

use crate::aggregate::{StatisticsBundle, aggregate};
use crate::config::PipelineConfig;
use crate::derive::derive_all;
use crate::insights::{Insights, insights};
use crate::io::csv::read_raw_records;
use crate::mappings::MappingTables;
use crate::metrics::MetricsCollector;
use crate::normalize::{NormalizeReport, normalize_all};
use crate::outliers::{OutlierReport, OutlierThresholds, analyze};
use crate::record::{EnrichedRecord, RawRecord};
use crate::runner::{ExecMode, Runner};
use crate::validation::{ValidationReport, validate};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Distinct unmapped city codes listed in the log.
const UNMAPPED_CODES_LOGGED: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub mode: ExecMode,
    pub thresholds: OutlierThresholds,
    pub remove_outliers: bool,
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            mode: cfg.execution.exec_mode(),
            thresholds: cfg.outliers.thresholds,
            remove_outliers: cfg.outliers.remove,
        }
    }
}

/// Everything a run produces.
#[derive(Clone)]
pub struct PipelineOutput {
    /// Final record set, input order, minus removed outliers.
    pub records: Vec<EnrichedRecord>,
    pub statistics: StatisticsBundle,
    pub insights: Insights,
    pub normalize: NormalizeReport,
    pub validation: ValidationReport,
    pub outliers: OutlierReport,
    pub metrics: MetricsCollector,
}

/// Load `path` and run the pipeline over it.
///
/// # Errors
/// Returns an error, before any stage runs, if the input cannot be read or
/// parsed.
pub fn run_file(
    path: impl AsRef<Path>,
    has_headers: bool,
    tables: &MappingTables,
    opts: &PipelineOptions,
) -> Result<PipelineOutput> {
    let path = path.as_ref();
    let started = Instant::now();
    let raw = read_raw_records(path, has_headers).with_context(|| format!("load {}", path.display()))?;
    info!(path = %path.display(), records = raw.len(), "input loaded");

    let out = run(raw, tables, opts)?;
    out.metrics.record_stage("load", started.elapsed());
    Ok(out)
}

/// Run every stage over already-loaded records.
///
/// # Errors
/// Fails only if a parallel runner cannot build its thread pool.
pub fn run(raw: Vec<RawRecord>, tables: &MappingTables, opts: &PipelineOptions) -> Result<PipelineOutput> {
    let runner = Runner::new(opts.mode);
    let metrics = MetricsCollector::new();
    metrics.record_start();
    metrics.set_counter("records_loaded", raw.len() as u64);
    debug!(mode = ?opts.mode, "pipeline starting");

    let t = Instant::now();
    let (canonical, normalize) = normalize_all(raw, tables, &runner)?;
    metrics.record_stage("normalize", t.elapsed());
    metrics.set_counter("unmapped_city_records", normalize.unmapped_city_records as u64);
    metrics.set_counter("unmapped_region_group_records", normalize.unmapped_region_group_records as u64);
    metrics.set_counter("unmapped_age_group_records", normalize.unmapped_age_group_records as u64);
    log_normalize(&normalize);

    let t = Instant::now();
    let enriched = derive_all(canonical, &runner)?;
    metrics.record_stage("derive", t.elapsed());
    info!(records = enriched.len(), "derived attributes");

    let t = Instant::now();
    let validation = validate(&enriched);
    metrics.record_stage("validate", t.elapsed());
    metrics.set_counter("validation_issues", validation.issues.len() as u64);
    log_validation(&validation);

    let (records, outliers) = analyze(enriched, &opts.thresholds, opts.remove_outliers);
    metrics.set_counter("outliers_removed", outliers.removed as u64);
    info!(
        extreme_payment = outliers.extreme_payment,
        extreme_visits = outliers.extreme_visits,
        extreme_duration = outliers.extreme_duration,
        removed = outliers.removed,
        "outlier analysis"
    );

    let t = Instant::now();
    let statistics = aggregate(&records, &runner)?;
    let insights = insights(&records, &runner)?;
    metrics.record_stage("aggregate", t.elapsed());
    metrics.set_counter("records_aggregated", records.len() as u64);
    info!(
        regions = statistics.by_region.len(),
        age_groups = statistics.by_age_group.len(),
        grades = statistics.by_grade.len(),
        "statistics built"
    );

    metrics.record_end();
    Ok(PipelineOutput {
        records,
        statistics,
        insights,
        normalize,
        validation,
        outliers,
        metrics,
    })
}

fn log_normalize(report: &NormalizeReport) {
    info!(
        converted = report.region_groups_converted,
        records = report.records,
        "region groups converted"
    );
    if report.all_cities_mapped() {
        info!("all city codes mapped");
    } else {
        let shown: Vec<&str> = report
            .unmapped_city_codes
            .iter()
            .take(UNMAPPED_CODES_LOGGED)
            .map(String::as_str)
            .collect();
        warn!(
            unmapped = report.unmapped_city_codes.len(),
            records = report.unmapped_city_records,
            codes = ?shown,
            "city codes without a mapping kept verbatim"
        );
    }
    if report.unmapped_age_group_records > 0 {
        warn!(records = report.unmapped_age_group_records, "age group codes without a mapping");
    }
}

fn log_validation(report: &ValidationReport) {
    info!(
        zero_payment = report.zero_payment_customers,
        pct = report.zero_payment_pct,
        "zero-payment customers"
    );
    if report.is_clean() {
        info!("all validation checks passed");
    }
    for issue in &report.issues {
        warn!(code = %issue.code, field = issue.field.as_deref(), "{}", issue.message);
    }
}
