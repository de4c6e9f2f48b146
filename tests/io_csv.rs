//! Tests for CSV loading and the enriched CSV export.

use std::fs;
use std::io::Write;
use visitbeam::io::csv::{read_raw_records, read_raw_records_from, write_enriched_csv};
use visitbeam::record::ENRICHED_COLUMNS;
use visitbeam::testing::{sample_csv, sample_raw_records};
use visitbeam::*;

#[test]
fn test_read_sample_with_extra_columns() -> anyhow::Result<()> {
    let records = read_raw_records_from(sample_csv().as_bytes(), true)?;
    assert_eq!(records, sample_raw_records());
    Ok(())
}

#[test]
fn test_bom_and_empty_cells() -> anyhow::Result<()> {
    let text = "\u{feff}uid,region_city_group,region_city,age_group,age,visit_days,total_duration_min,\
                total_payment_may,retained_june,retained_july,retained_august,retained_90\n\
                u1,Seoul,,Teens,,3,,1000,true,FALSE,,1\n";
    let records = read_raw_records_from(text.as_bytes(), true)?;

    let r = &records[0];
    assert_eq!(r.uid, "u1");
    assert_eq!(r.region_city_group.as_deref(), Some("Seoul"));
    assert_eq!(r.region_city, None);
    assert_eq!(r.age, None);
    assert_eq!(r.visit_days, Some(3));
    assert_eq!(r.total_duration_min, None);
    assert_eq!(r.total_payment, Some(1000));
    assert_eq!(r.retained_june, Some(true));
    assert_eq!(r.retained_july, Some(false));
    assert_eq!(r.retained_august, None);
    assert_eq!(r.retained_90, Some(true));
    Ok(())
}

#[test]
fn test_headerless_input_is_positional() -> anyhow::Result<()> {
    let text = "u9,Busan,Busan,Teens,16,2,40,3000,0,0,0,1\n";
    let records = read_raw_records_from(text.as_bytes(), false)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].region_city.as_deref(), Some("Busan"));
    assert_eq!(records[0].retained_90, Some(true));
    Ok(())
}

#[test]
fn test_bad_flag_reports_record_number() {
    let text = "uid,retained_90\nu1,1\nu2,maybe\n";
    let err = read_raw_records_from(text.as_bytes(), true).err();
    let msg = err.map(|e| format!("{e:#}")).unwrap_or_default();
    assert!(msg.contains("parse CSV record #2"), "got: {msg}");
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_gzip_input_detected_by_magic_bytes() -> anyhow::Result<()> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let dir = tempfile::tempdir()?;
    // no .gz extension: detection falls back to the header bytes
    let path = dir.path().join("export.csv");
    let mut enc = GzEncoder::new(fs::File::create(&path)?, Compression::default());
    enc.write_all(sample_csv().as_bytes())?;
    enc.finish()?;

    assert_eq!(read_raw_records(&path, true)?, sample_raw_records());
    Ok(())
}

#[cfg(feature = "compression-zstd")]
#[test]
fn test_zstd_input_by_extension() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("export.csv.zst");
    fs::write(&path, zstd::encode_all(sample_csv().as_bytes(), 3)?)?;

    assert_eq!(read_raw_records(&path, true)?, sample_raw_records());
    Ok(())
}

#[test]
fn test_enriched_export_columns_and_bom() -> anyhow::Result<()> {
    let out = run(sample_raw_records(), &MappingTables::default(), &PipelineOptions::default())?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("customers_cleaned.csv");

    let n = write_enriched_csv(&path, &out.records, true)?;
    assert_eq!(n, 6);

    let bytes = fs::read(&path)?;
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec())?;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(ENRICHED_COLUMNS.join(",").as_str()));
    assert_eq!(
        lines.next(),
        Some("u001,Gyeonggi-do,Suwon,Twenties,25,10,600,250000,1,1,1,1,경기도,수원,20대,25000,VIP,true,false,8-14")
    );
    assert_eq!(text.lines().count(), 7);
    Ok(())
}

#[test]
fn test_export_reads_back_as_raw_records() -> anyhow::Result<()> {
    let out = run(sample_raw_records(), &MappingTables::default(), &PipelineOptions::default())?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("customers_cleaned.csv");
    write_enriched_csv(&path, &out.records, true)?;

    assert_eq!(read_raw_records(&path, true)?, sample_raw_records());
    Ok(())
}
