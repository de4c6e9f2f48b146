//! A small, fully characterised customer dataset.
//!
//! | uid  | region / city          | age group | visits | payment | june july aug 90 |
//! |------|------------------------|-----------|--------|---------|------------------|
//! | u001 | Gyeonggi-do / Suwon    | Twenties  | 10     | 250000  | 1 1 1 1          |
//! | u002 | Seoul / Seoul          | Thirties  | 0      | 0       | 0 0 0 0          |
//! | u003 | Gyeonggi-do / Yongin   | Forties+  | 3      | 60000   | 1 1 0 0          |
//! | u004 | Busan / Busan          | Teens     | 1      | 100000  | 1 0 0 1          |
//! | u005 | Jeju-do / Seogwipo     | Twenties  | 30     | 600000  | 1 1 1 1          |
//! | u006 | Seoul / Seoul          | Unknown   | 5      | 50000   | 1 1 1 1          |
//!
//! `u005` breaches every outlier threshold and carries an unmapped region
//! group and city; `u006` carries an unmapped age group.

use crate::record::RawRecord;
use crate::testing::RawRecordBuilder;

/// The six records tabled above, in order.
#[must_use]
pub fn sample_raw_records() -> Vec<RawRecord> {
    vec![
        RawRecordBuilder::new("u001")
            .region("Gyeonggi-do", "Suwon")
            .age_group("Twenties")
            .age(25)
            .visits(10)
            .duration(600)
            .payment(250_000)
            .retention(true, true, true, true)
            .build(),
        RawRecordBuilder::new("u002")
            .region("Seoul", "Seoul")
            .age_group("Thirties")
            .age(32)
            .visits(0)
            .duration(0)
            .payment(0)
            .retention(false, false, false, false)
            .build(),
        RawRecordBuilder::new("u003")
            .region("Gyeonggi-do", "Yongin")
            .age_group("Forties+")
            .age(45)
            .visits(3)
            .duration(120)
            .payment(60_000)
            .retention(true, true, false, false)
            .build(),
        RawRecordBuilder::new("u004")
            .region("Busan", "Busan")
            .age_group("Teens")
            .age(17)
            .visits(1)
            .duration(30)
            .payment(100_000)
            .retention(true, false, false, true)
            .build(),
        RawRecordBuilder::new("u005")
            .region("Jeju-do", "Seogwipo")
            .age_group("Twenties")
            .age(28)
            .visits(30)
            .duration(12_000)
            .payment(600_000)
            .retention(true, true, true, true)
            .build(),
        RawRecordBuilder::new("u006")
            .region("Seoul", "Seoul")
            .age_group("Unknown")
            .age(38)
            .visits(5)
            .duration(300)
            .payment(50_000)
            .retention(true, true, true, true)
            .build(),
    ]
}

/// [`sample_raw_records`] as CSV text in the export's column layout,
/// including the extra columns the loader ignores.
#[must_use]
pub fn sample_csv() -> String {
    let mut csv = String::from(
        "uid,region_city_group,region_city_group_no,region_city,age_group,age,visit_days,\
         total_duration_min,avg_duration_min,total_payment_may,retained_june,retained_july,\
         retained_august,retained_90\n",
    );
    for r in sample_raw_records() {
        let flag = |f: Option<bool>| f.map_or(String::new(), |b| u8::from(b).to_string());
        let num = |n: Option<i64>| n.map_or(String::new(), |v| v.to_string());
        csv.push_str(&format!(
            "{},{},1,{},{},{},{},{},0,{},{},{},{},{}\n",
            r.uid,
            r.region_city_group.unwrap_or_default(),
            r.region_city.unwrap_or_default(),
            r.age_group.unwrap_or_default(),
            num(r.age),
            num(r.visit_days),
            num(r.total_duration_min),
            num(r.total_payment),
            flag(r.retained_june),
            flag(r.retained_july),
            flag(r.retained_august),
            flag(r.retained_90),
        ));
    }
    csv
}
