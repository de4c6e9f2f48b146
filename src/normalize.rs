//! Region normalization: raw locale codes → canonical labels.
//!
//! Lookup misses are a defined outcome, not an error, and the three
//! dimensions deliberately handle them differently:
//!
//! | dimension    | on miss                         |
//! |--------------|---------------------------------|
//! | city         | raw code kept verbatim          |
//! | region group | left absent                     |
//! | age group    | left absent                     |

use crate::mappings::MappingTables;
use crate::record::{CanonicalRecord, RawRecord};
use crate::runner::Runner;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Canonicalize one record against `tables`.
#[must_use]
pub fn normalize(raw: RawRecord, tables: &MappingTables) -> CanonicalRecord {
    let region_city_group_kr = raw
        .region_city_group
        .as_deref()
        .and_then(|code| tables.region_group(code))
        .map(str::to_string);
    let region_city_kr = raw
        .region_city
        .as_deref()
        .map(|code| tables.city(code).unwrap_or(code).to_string());
    let age_group_kr = raw
        .age_group
        .as_deref()
        .and_then(|code| tables.age_group(code))
        .map(str::to_string);

    CanonicalRecord {
        raw,
        region_city_group_kr,
        region_city_kr,
        age_group_kr,
    }
}

/// Per-run lookup diagnostics, reported once rather than per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub records: usize,
    /// Records whose region-group code resolved to a label.
    pub region_groups_converted: usize,
    /// Records whose city code had no mapping (city label fell back to the code).
    pub unmapped_city_records: usize,
    /// Distinct unmapped city codes, first-seen order.
    pub unmapped_city_codes: Vec<String>,
    pub unmapped_region_group_records: usize,
    pub unmapped_age_group_records: usize,
}

impl NormalizeReport {
    /// Build the report from the raw inputs of a normalization pass.
    #[must_use]
    pub fn from_raw(records: &[RawRecord], tables: &MappingTables) -> Self {
        let mut report = Self {
            records: records.len(),
            ..Self::default()
        };
        let mut seen = HashSet::new();

        for r in records {
            match r.region_city_group.as_deref().and_then(|c| tables.region_group(c)) {
                Some(_) => report.region_groups_converted += 1,
                None => report.unmapped_region_group_records += 1,
            }
            if let Some(code) = r.region_city.as_deref()
                && tables.city(code).is_none()
            {
                report.unmapped_city_records += 1;
                if seen.insert(code) {
                    report.unmapped_city_codes.push(code.to_string());
                }
            }
            if r.age_group.as_deref().and_then(|c| tables.age_group(c)).is_none() {
                report.unmapped_age_group_records += 1;
            }
        }
        report
    }

    #[must_use]
    pub fn all_cities_mapped(&self) -> bool {
        self.unmapped_city_records == 0
    }
}

/// Canonicalize a whole record set, in input order, and report lookup misses.
///
/// # Errors
/// Fails only if the runner cannot build its thread pool.
pub fn normalize_all(
    records: Vec<RawRecord>,
    tables: &MappingTables,
    runner: &Runner,
) -> Result<(Vec<CanonicalRecord>, NormalizeReport)> {
    let report = NormalizeReport::from_raw(&records, tables);
    let canonical = runner.map(records, |r| normalize(r, tables))?;
    Ok((canonical, report))
}
