//! Tests for the on-disk artifact set.

use chrono::{Local, TimeZone};
use std::fs;
use visitbeam::config::OutputConfig;
use visitbeam::io::artifacts::{
    CSV_FILE, CUSTOMERS_FILE, INSIGHTS_FILE, METADATA_FILE, REPORT_FILE, RunMetadata, STATISTICS_FILE, write_all,
    write_all_at,
};
use visitbeam::testing::sample_raw_records;
use visitbeam::utils::sha256_hex;
use visitbeam::*;

fn sample_output() -> anyhow::Result<PipelineOutput> {
    run(sample_raw_records(), &MappingTables::default(), &PipelineOptions::default())
}

#[test]
fn test_writes_full_set_into_new_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = OutputConfig {
        directory: dir.path().join("cleaned_data"),
        ..OutputConfig::default()
    };
    let written = write_all(&sample_output()?, &cfg, "data.csv".as_ref())?;

    for name in [CUSTOMERS_FILE, STATISTICS_FILE, INSIGHTS_FILE, METADATA_FILE, REPORT_FILE, CSV_FILE] {
        assert!(cfg.directory.join(name).is_file(), "{name} missing");
    }
    assert_eq!(written.files.len(), 6);
    Ok(())
}

#[test]
fn test_csv_export_is_optional() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = OutputConfig {
        directory: dir.path().to_path_buf(),
        write_csv: false,
        ..OutputConfig::default()
    };
    let written = write_all(&sample_output()?, &cfg, "data.csv".as_ref())?;
    assert_eq!(written.files.len(), 5);
    assert!(!dir.path().join(CSV_FILE).exists());
    Ok(())
}

#[test]
fn test_metadata_contents() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = OutputConfig {
        directory: dir.path().to_path_buf(),
        ..OutputConfig::default()
    };
    let at = Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).single().ok_or_else(|| anyhow::anyhow!("ambiguous time"))?;
    let written = write_all_at(&sample_output()?, &cfg, "data.csv".as_ref(), at)?;

    let meta: RunMetadata = serde_json::from_slice(&fs::read(dir.path().join(METADATA_FILE))?)?;
    assert!(meta.generated_at.starts_with("2024-06-01T09:30:00"));
    assert_eq!(meta.total_records, 6);
    assert_eq!(meta.columns.len(), 20);
    assert_eq!(meta.columns[0], "uid");
    assert_eq!(meta.data_summary.total_revenue, 1_060_000);
    assert_eq!(meta.data_summary.total_customers, 6);
    assert_eq!(meta.statistics_sha256, written.statistics_sha256);
    assert_eq!(meta.metrics["records_loaded"]["value"], 6);

    let stats_bytes = fs::read(dir.path().join(STATISTICS_FILE))?;
    assert_eq!(sha256_hex(&stats_bytes), meta.statistics_sha256);
    Ok(())
}

#[test]
fn test_statistics_file_is_deterministic() -> anyhow::Result<()> {
    let a = tempfile::tempdir()?;
    let b = tempfile::tempdir()?;
    for dir in [&a, &b] {
        let cfg = OutputConfig {
            directory: dir.path().to_path_buf(),
            ..OutputConfig::default()
        };
        write_all(&sample_output()?, &cfg, "data.csv".as_ref())?;
    }
    assert_eq!(
        fs::read(a.path().join(STATISTICS_FILE))?,
        fs::read(b.path().join(STATISTICS_FILE))?
    );
    Ok(())
}

#[test]
fn test_customers_json_keeps_korean_labels_verbatim() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = OutputConfig {
        directory: dir.path().to_path_buf(),
        ..OutputConfig::default()
    };
    write_all(&sample_output()?, &cfg, "data.csv".as_ref())?;

    let text = fs::read_to_string(dir.path().join(CUSTOMERS_FILE))?;
    assert!(text.contains("\"region_city_group_kr\": \"경기도\""));
    assert!(text.contains("\"customer_grade\": \"VIP\""));
    assert!(text.contains("\"total_payment_may\": 250000"));

    let records: Vec<EnrichedRecord> = serde_json::from_str(&text)?;
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].payment_per_visit, 25_000);
    Ok(())
}

#[test]
fn test_report_lists_totals_and_steps() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = OutputConfig {
        directory: dir.path().to_path_buf(),
        ..OutputConfig::default()
    };
    write_all(&sample_output()?, &cfg, "data.csv".as_ref())?;

    let report = fs::read_to_string(dir.path().join(REPORT_FILE))?;
    assert!(report.contains("Source data: data.csv"));
    assert!(report.contains("Total revenue: 1,060,000 KRW"));
    assert!(report.contains("90-day retention: 66.67%"));
    assert!(report.contains("[ ] Outliers removed"));
    assert!(report.contains("[x] Statistics generated"));
    Ok(())
}
