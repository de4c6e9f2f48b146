//! CSV input and the flat CSV export of enriched records.
//!
//! - [`read_raw_records`] loads the customer export into [`RawRecord`]s,
//!   tolerating a UTF-8 BOM and compressed input.
//! - [`write_enriched_csv`] writes one row per [`EnrichedRecord`] with the
//!   columns of [`ENRICHED_COLUMNS`](crate::record::ENRICHED_COLUMNS).

use crate::io::compression::{auto_detect_writer, open_reader};
use crate::record::{CustomerGrade, EnrichedRecord, RawRecord, VisitCategory};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read raw customer records from a CSV file.
///
/// Errors are annotated with the 1-based record number. Columns not known to
/// [`RawRecord`] are ignored when `has_headers` is set; without headers the
/// columns are taken positionally.
///
/// # Errors
/// Returns an error if the file cannot be opened or decompressed, or if a
/// non-empty cell does not parse into its column type.
pub fn read_raw_records(path: impl AsRef<Path>, has_headers: bool) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let reader = open_reader(path)?;
    read_raw_records_from(reader, has_headers).with_context(|| format!("read {}", path.display()))
}

/// Like [`read_raw_records`], over any reader.
///
/// # Errors
/// See [`read_raw_records`].
pub fn read_raw_records_from<R: Read>(reader: R, has_headers: bool) -> Result<Vec<RawRecord>> {
    let mut reader = BufReader::new(reader);
    if reader.fill_buf().context("read input header")?.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<RawRecord>().enumerate() {
        out.push(rec.with_context(|| format!("parse CSV record #{}", i + 1))?);
    }
    Ok(out)
}

/// Flat view of an [`EnrichedRecord`] for CSV, which cannot express nesting.
#[derive(Serialize)]
struct CsvRow<'a> {
    uid: &'a str,
    region_city_group: Option<&'a str>,
    region_city: Option<&'a str>,
    age_group: Option<&'a str>,
    age: Option<i64>,
    visit_days: Option<i64>,
    total_duration_min: Option<i64>,
    total_payment_may: Option<i64>,
    retained_june: Option<u8>,
    retained_july: Option<u8>,
    retained_august: Option<u8>,
    retained_90: Option<u8>,
    region_city_group_kr: Option<&'a str>,
    region_city_kr: Option<&'a str>,
    age_group_kr: Option<&'a str>,
    payment_per_visit: i64,
    customer_grade: CustomerGrade,
    is_active: bool,
    is_churned: bool,
    visit_category: VisitCategory,
}

impl<'a> From<&'a EnrichedRecord> for CsvRow<'a> {
    fn from(r: &'a EnrichedRecord) -> Self {
        let raw = r.raw();
        let c = &r.canonical;
        Self {
            uid: &raw.uid,
            region_city_group: raw.region_city_group.as_deref(),
            region_city: raw.region_city.as_deref(),
            age_group: raw.age_group.as_deref(),
            age: raw.age,
            visit_days: raw.visit_days,
            total_duration_min: raw.total_duration_min,
            total_payment_may: raw.total_payment,
            retained_june: raw.retained_june.map(u8::from),
            retained_july: raw.retained_july.map(u8::from),
            retained_august: raw.retained_august.map(u8::from),
            retained_90: raw.retained_90.map(u8::from),
            region_city_group_kr: c.region_city_group_kr.as_deref(),
            region_city_kr: c.region_city_kr.as_deref(),
            age_group_kr: c.age_group_kr.as_deref(),
            payment_per_visit: r.payment_per_visit,
            customer_grade: r.customer_grade,
            is_active: r.is_active,
            is_churned: r.is_churned,
            visit_category: r.visit_category,
        }
    }
}

/// Write enriched records as CSV with a header row.
///
/// Creates parent directories as needed. With `bom` set the file starts with
/// a UTF-8 byte-order mark. A `.gz`/`.zst` extension compresses the output.
///
/// # Returns
/// The number of rows written.
///
/// # Errors
/// Returns an error if the file or its directories cannot be created, or a
/// row fails to serialize.
pub fn write_enriched_csv(path: impl AsRef<Path>, records: &[EnrichedRecord], bom: bool) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = auto_detect_writer(f, path).with_context(|| format!("setup compression for {}", path.display()))?;
    if bom {
        w.write_all(UTF8_BOM)?;
    }

    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(w);
    for (i, r) in records.iter().enumerate() {
        wtr.serialize(CsvRow::from(r))
            .with_context(|| format!("serialize CSV row #{}", i + 1))?;
    }
    wtr.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(records.len())
}
