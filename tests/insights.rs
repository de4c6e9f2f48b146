//! Tests for the supplementary analytics.

use visitbeam::insights::{activity, insights, region_age_heatmap, retention_funnel, visit_distribution};
use visitbeam::testing::{RawRecordBuilder, sample_raw_records};
use visitbeam::*;

fn sample_enriched() -> Vec<EnrichedRecord> {
    let tables = MappingTables::default();
    sample_raw_records()
        .into_iter()
        .map(|r| derive(normalize(r, &tables)))
        .collect()
}

#[test]
fn test_retention_funnel_on_sample() -> anyhow::Result<()> {
    let f = retention_funnel(&sample_enriched(), &Runner::sequential())?;

    assert_eq!(f.total, 6);
    assert_eq!((f.june.count, f.june.rate), (5, 83.33));
    assert_eq!((f.july.count, f.july.rate), (4, 66.67));
    assert_eq!((f.august.count, f.august.rate), (3, 50.0));
    assert_eq!((f.ninety_days.count, f.ninety_days.rate), (4, 66.67));
    assert_eq!((f.fully_retained.count, f.fully_retained.rate), (3, 50.0));
    Ok(())
}

#[test]
fn test_heatmap_sorted_by_revenue() -> anyhow::Result<()> {
    let cells = region_age_heatmap(&sample_enriched(), &Runner::sequential())?;

    let top = &cells[0];
    assert_eq!((top.region.as_deref(), top.age_group.as_deref()), (None, Some("20대")));
    assert_eq!(top.revenue, 600_000);
    assert!(cells.windows(2).all(|w| w[0].revenue >= w[1].revenue));
    assert_eq!(cells.iter().map(|c| c.revenue).sum::<i64>(), 1_060_000);
    assert_eq!(cells.len(), 6);
    Ok(())
}

#[test]
fn test_visit_distribution_skips_empty_buckets() -> anyhow::Result<()> {
    let records: Vec<EnrichedRecord> = {
        let tables = MappingTables::default();
        [1, 1, 20, 2]
            .into_iter()
            .enumerate()
            .map(|(i, days)| derive(normalize(RawRecordBuilder::new(format!("v{i}")).visits(days).build(), &tables)))
            .collect()
    };
    let dist = visit_distribution(&records, &Runner::sequential())?;

    let shares: Vec<(VisitCategory, u64, f64)> = dist.iter().map(|s| (s.category, s.customers, s.percentage)).collect();
    assert_eq!(
        shares,
        vec![
            (VisitCategory::Once, 2, 50.0),
            (VisitCategory::TwoToThree, 1, 25.0),
            (VisitCategory::FifteenPlus, 1, 25.0),
        ]
    );
    Ok(())
}

#[test]
fn test_activity_rates() -> anyhow::Result<()> {
    let a = activity(&sample_enriched(), &Runner::sequential())?;
    assert_eq!((a.active, a.active_rate), (3, 50.0));
    assert_eq!((a.churned, a.churn_rate), (2, 33.33));
    Ok(())
}

#[test]
fn test_insights_serialize_category_labels() -> anyhow::Result<()> {
    let all = insights(&sample_enriched(), &Runner::sequential())?;
    let json = serde_json::to_value(&all)?;

    let labels: Vec<&str> = json["visit_distribution"]
        .as_array()
        .map(|a| a.iter().filter_map(|s| s["category"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(labels, vec!["1", "2-3", "4-7", "8-14", "15+"]);
    assert_eq!(json["retention_funnel"]["fully_retained"]["count"], 3);
    Ok(())
}

#[test]
fn test_empty_input_has_zero_rates() -> anyhow::Result<()> {
    let all = insights(&[], &Runner::sequential())?;
    assert_eq!(all.retention_funnel.total, 0);
    assert_eq!(all.retention_funnel.june.rate, 0.0);
    assert!(all.region_age_heatmap.is_empty());
    assert!(all.visit_distribution.is_empty());
    assert_eq!(all.activity.churn_rate, 0.0);
    Ok(())
}
