//! Tests for region normalization and its diagnostics.

use std::collections::HashMap;
use visitbeam::normalize::normalize_all;
use visitbeam::testing::{RawRecordBuilder, sample_raw_records};
use visitbeam::*;

#[test]
fn test_mapped_codes_resolve() {
    let raw = RawRecordBuilder::new("u1")
        .region("Gyeonggi-do", "Suwon")
        .age_group("Twenties")
        .build();
    let c = normalize(raw.clone(), &MappingTables::default());

    assert_eq!(c.region_city_group_kr.as_deref(), Some("경기도"));
    assert_eq!(c.region_city_kr.as_deref(), Some("수원"));
    assert_eq!(c.age_group_kr.as_deref(), Some("20대"));
    assert_eq!(c.raw, raw, "raw fields are carried unchanged");
}

#[test]
fn test_unmapped_city_falls_back_but_region_and_age_stay_absent() {
    let raw = RawRecordBuilder::new("u1")
        .region("Atlantis", "Poseidonia")
        .age_group("Ancients")
        .build();
    let c = normalize(raw, &MappingTables::default());

    assert_eq!(c.region_city_kr.as_deref(), Some("Poseidonia"));
    assert_eq!(c.region_city_group_kr, None);
    assert_eq!(c.age_group_kr, None);
}

#[test]
fn test_absent_codes_stay_absent() {
    let c = normalize(RawRecordBuilder::new("u1").build(), &MappingTables::default());
    assert_eq!(c.region_city_kr, None);
    assert_eq!(c.region_city_group_kr, None);
    assert_eq!(c.age_group_kr, None);
}

#[test]
fn test_report_counts_unmapped_once_per_run() -> anyhow::Result<()> {
    let mut raws = sample_raw_records();
    raws.push(RawRecordBuilder::new("u007").region("Jeju-do", "Seogwipo").build());
    raws.push(RawRecordBuilder::new("u008").region("Seoul", "Gangneung").build());

    let (canonical, report) = normalize_all(raws, &MappingTables::default(), &Runner::sequential())?;

    assert_eq!(canonical.len(), 8);
    assert_eq!(report.records, 8);
    assert_eq!(report.unmapped_city_records, 3);
    assert_eq!(report.unmapped_city_codes, vec!["Seogwipo", "Gangneung"]);
    assert_eq!(report.unmapped_region_group_records, 2);
    assert_eq!(report.region_groups_converted, 6);
    // u006 "Unknown", u007 and u008 without an age group
    assert_eq!(report.unmapped_age_group_records, 3);
    assert!(!report.all_cities_mapped());
    Ok(())
}

#[test]
fn test_custom_tables_extend_builtin() -> anyhow::Result<()> {
    let extra = MappingTables {
        city: HashMap::from([("Seogwipo".to_string(), "서귀포".to_string())]),
        region_group: HashMap::from([("Jeju-do".to_string(), "제주특별자치도".to_string())]),
        age_group: HashMap::new(),
    };
    let tables = MappingTables::default().merged(extra);

    let (canonical, report) = normalize_all(sample_raw_records(), &tables, &Runner::sequential())?;
    assert!(report.all_cities_mapped());
    assert_eq!(canonical[4].region_city_kr.as_deref(), Some("서귀포"));
    assert_eq!(canonical[4].region_city_group_kr.as_deref(), Some("제주특별자치도"));
    Ok(())
}

#[test]
fn test_mapping_file_overrides() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mappings.json");
    std::fs::write(&path, r#"{"city": {"Suwon": "수원시"}, "age_group": {"Unknown": "미상"}}"#)?;

    let tables = MappingTables::load(&path)?;
    assert_eq!(tables.city("Suwon"), Some("수원시"));
    assert_eq!(tables.city("Seoul"), Some("서울"));
    assert_eq!(tables.age_group("Unknown"), Some("미상"));
    Ok(())
}

#[test]
fn test_parallel_normalize_keeps_order() -> anyhow::Result<()> {
    let tables = MappingTables::default();
    let raws: Vec<RawRecord> = (0..500)
        .map(|i| RawRecordBuilder::new(format!("u{i:04}")).region("Busan", "Busan").build())
        .collect();

    let (canonical, _) = normalize_all(raws, &tables, &Runner::new(ExecMode::Parallel { threads: Some(4) }))?;
    for (i, c) in canonical.iter().enumerate() {
        assert_eq!(c.raw.uid, format!("u{i:04}"));
    }
    Ok(())
}
