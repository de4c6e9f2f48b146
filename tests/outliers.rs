//! Tests for outlier analysis and optional removal.

use visitbeam::testing::{RawRecordBuilder, sample_raw_records};
use visitbeam::*;

fn enrich_all(raws: Vec<RawRecord>) -> Vec<EnrichedRecord> {
    let tables = MappingTables::default();
    raws.into_iter().map(|r| derive(normalize(r, &tables))).collect()
}

#[test]
fn test_observational_mode_keeps_every_record() {
    let records = enrich_all(sample_raw_records());
    let (kept, report) = analyze(records.clone(), &OutlierThresholds::default(), false);

    assert_eq!(kept, records);
    assert_eq!(report.extreme_payment, 1);
    assert_eq!(report.extreme_visits, 1);
    assert_eq!(report.extreme_duration, 1);
    assert!(!report.removal_enabled);
    assert_eq!(report.removed, 0);
}

#[test]
fn test_record_breaching_two_of_three_is_dropped() {
    let records = enrich_all(vec![
        RawRecordBuilder::new("ok").payment(100_000).visits(10).duration(500).build(),
        RawRecordBuilder::new("two").payment(900_000).visits(40).duration(500).build(),
    ]);
    let (kept, report) = analyze(records, &OutlierThresholds::default(), true);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].raw().uid, "ok");
    assert_eq!(report.removed, 1);
    assert!(report.removal_enabled);
}

#[test]
fn test_single_breach_is_enough_for_removal() {
    let records = enrich_all(vec![
        RawRecordBuilder::new("a").duration(10_001).build(),
        RawRecordBuilder::new("b").visits(26).build(),
        RawRecordBuilder::new("c").payment(500_001).build(),
        RawRecordBuilder::new("d").payment(500_000).visits(25).duration(10_000).build(),
    ]);
    let (kept, report) = analyze(records, &OutlierThresholds::default(), true);

    let uids: Vec<&str> = kept.iter().map(|r| r.raw().uid.as_str()).collect();
    assert_eq!(uids, vec!["d"], "thresholds are strict upper bounds");
    assert_eq!(report.removed, 3);
}

#[test]
fn test_counts_are_independent() {
    let records = enrich_all(vec![
        RawRecordBuilder::new("all").payment(600_000).visits(30).duration(20_000).build(),
        RawRecordBuilder::new("pay").payment(600_000).build(),
    ]);
    let (_, report) = analyze(records, &OutlierThresholds::default(), false);
    assert_eq!(report.extreme_payment, 2);
    assert_eq!(report.extreme_visits, 1);
    assert_eq!(report.extreme_duration, 1);
}

#[test]
fn test_custom_thresholds() {
    let thresholds = OutlierThresholds {
        max_payment: 100_000,
        ..OutlierThresholds::default()
    };
    let (kept, report) = analyze(enrich_all(sample_raw_records()), &thresholds, true);

    // u001 250000 and u005 600000 exceed 100000; u004 sits exactly on it
    assert_eq!(report.extreme_payment, 2);
    assert_eq!(kept.len(), 4);
}
