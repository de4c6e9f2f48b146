//! The full output set of a run.
//!
//! | file                    | contents                                   |
//! |-------------------------|--------------------------------------------|
//! | `customers.json`        | enriched records, input order              |
//! | `statistics.json`       | [`StatisticsBundle`](crate::aggregate::StatisticsBundle) |
//! | `insights.json`         | [`Insights`](crate::insights::Insights)    |
//! | `metadata.json`         | [`RunMetadata`]                            |
//! | `cleaning_report.txt`   | human-readable summary                     |
//! | `customers_cleaned.csv` | flat CSV export (optional)                 |

use crate::config::OutputConfig;
use crate::io::csv::write_enriched_csv;
use crate::io::json::write_json;
use crate::io::report;
use crate::pipeline::PipelineOutput;
use crate::record::ENRICHED_COLUMNS;
use crate::utils::sha256_hex;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CUSTOMERS_FILE: &str = "customers.json";
pub const STATISTICS_FILE: &str = "statistics.json";
pub const INSIGHTS_FILE: &str = "insights.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const REPORT_FILE: &str = "cleaning_report.txt";
pub const CSV_FILE: &str = "customers_cleaned.csv";

/// Reporting period covered by the export.
pub const DATE_RANGE: &str = "2024년 5월";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// RFC 3339, local time.
    pub generated_at: String,
    pub total_records: usize,
    pub columns: Vec<String>,
    pub data_summary: DataSummary,
    /// SHA-256 of the exact `statistics.json` bytes.
    pub statistics_sha256: String,
    pub metrics: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_revenue: i64,
    pub total_customers: u64,
    pub date_range: String,
}

/// Paths written by [`write_all`], in write order.
#[derive(Debug, Clone, Default)]
pub struct WrittenArtifacts {
    pub files: Vec<PathBuf>,
    pub statistics_sha256: String,
}

/// Write every artifact for `out` under `cfg.directory`, creating it if missing.
///
/// `source` only labels the input in the report.
///
/// # Errors
/// Returns an error if the directory or any file cannot be written.
pub fn write_all(out: &PipelineOutput, cfg: &OutputConfig, source: &Path) -> Result<WrittenArtifacts> {
    write_all_at(out, cfg, source, Local::now())
}

/// [`write_all`] with a fixed generation time.
///
/// # Errors
/// See [`write_all`].
pub fn write_all_at(
    out: &PipelineOutput,
    cfg: &OutputConfig,
    source: &Path,
    generated_at: DateTime<Local>,
) -> Result<WrittenArtifacts> {
    let dir = &cfg.directory;
    create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))?;
    let mut written = WrittenArtifacts::default();

    let path = dir.join(CUSTOMERS_FILE);
    write_json(&path, &out.records, cfg.pretty)?;
    info!(path = %path.display(), records = out.records.len(), "customers written");
    written.files.push(path);

    let path = dir.join(STATISTICS_FILE);
    let stats_bytes = write_json(&path, &out.statistics, cfg.pretty)?;
    written.statistics_sha256 = sha256_hex(&stats_bytes);
    info!(path = %path.display(), sha256 = %written.statistics_sha256, "statistics written");
    written.files.push(path);

    let path = dir.join(INSIGHTS_FILE);
    write_json(&path, &out.insights, cfg.pretty)?;
    written.files.push(path);

    let metadata = RunMetadata {
        generated_at: generated_at.to_rfc3339(),
        total_records: out.records.len(),
        columns: ENRICHED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        data_summary: DataSummary {
            total_revenue: out.statistics.overall.total_revenue,
            total_customers: out.statistics.overall.total_customers,
            date_range: DATE_RANGE.to_string(),
        },
        statistics_sha256: written.statistics_sha256.clone(),
        metrics: out.metrics.to_json(),
    };
    let path = dir.join(METADATA_FILE);
    write_json(&path, &metadata, cfg.pretty)?;
    written.files.push(path);

    let path = dir.join(REPORT_FILE);
    let text = report::render(
        out,
        &generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        &source.display().to_string(),
        ENRICHED_COLUMNS.len(),
    );
    fs::write(&path, text).with_context(|| format!("create {}", path.display()))?;
    written.files.push(path);

    if cfg.write_csv {
        let path = dir.join(CSV_FILE);
        write_enriched_csv(&path, &out.records, cfg.csv_bom)?;
        written.files.push(path);
    }

    info!(dir = %dir.display(), files = written.files.len(), "artifacts written");
    Ok(written)
}
