//! Record shapes flowing through the pipeline.
//!
//! A row moves through three stages, each owning the next shape:
//!
//! - [`RawRecord`] - one input row, exactly as exported
//! - [`CanonicalRecord`] - the raw row plus localized labels
//! - [`EnrichedRecord`] - the canonical row plus derived analytic attributes
//!
//! Every raw cell except `uid` is optional. Empty cells deserialize to `None`
//! so the validator can count them instead of the loader rejecting the file.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Column list of an enriched record, in serialization order.
pub const ENRICHED_COLUMNS: [&str; 20] = [
    "uid",
    "region_city_group",
    "region_city",
    "age_group",
    "age",
    "visit_days",
    "total_duration_min",
    "total_payment_may",
    "retained_june",
    "retained_july",
    "retained_august",
    "retained_90",
    "region_city_group_kr",
    "region_city_kr",
    "age_group_kr",
    "payment_per_visit",
    "customer_grade",
    "is_active",
    "is_churned",
    "visit_category",
];

/// Numeric input columns that must not be negative.
pub const NUMERIC_COLUMNS: [&str; 4] = ["age", "visit_days", "total_duration_min", "total_payment_may"];

/// One row of the input export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawRecord {
    pub uid: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub region_city_group: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub region_city: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub age_group: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub visit_days: Option<i64>,
    #[serde(default)]
    pub total_duration_min: Option<i64>,
    #[serde(rename = "total_payment_may", default)]
    pub total_payment: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub retained_june: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub retained_july: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub retained_august: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub retained_90: Option<bool>,
}

impl RawRecord {
    /// Values of [`NUMERIC_COLUMNS`], in the same order.
    #[must_use]
    pub const fn numeric_values(&self) -> [Option<i64>; 4] {
        [self.age, self.visit_days, self.total_duration_min, self.total_payment]
    }

    /// Presence of every raw column, in input order.
    #[must_use]
    pub fn field_presence(&self) -> [(&'static str, bool); 12] {
        [
            ("uid", !self.uid.is_empty()),
            ("region_city_group", self.region_city_group.is_some()),
            ("region_city", self.region_city.is_some()),
            ("age_group", self.age_group.is_some()),
            ("age", self.age.is_some()),
            ("visit_days", self.visit_days.is_some()),
            ("total_duration_min", self.total_duration_min.is_some()),
            ("total_payment_may", self.total_payment.is_some()),
            ("retained_june", self.retained_june.is_some()),
            ("retained_july", self.retained_july.is_some()),
            ("retained_august", self.retained_august.is_some()),
            ("retained_90", self.retained_90.is_some()),
        ]
    }

    /// Total payment, with an absent value counted as zero.
    #[must_use]
    pub fn payment(&self) -> i64 {
        self.total_payment.unwrap_or(0)
    }

    /// Visit-day count, with an absent value counted as zero.
    #[must_use]
    pub fn visits(&self) -> i64 {
        self.visit_days.unwrap_or(0)
    }

    /// 90-day retention flag, with an absent value counted as not retained.
    #[must_use]
    pub fn retained(&self) -> bool {
        self.retained_90.unwrap_or(false)
    }
}

/// A raw record with its locale codes resolved to canonical labels.
///
/// `region_city_kr` falls back to the raw city code when unmapped, while
/// `region_city_group_kr` and `age_group_kr` stay absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(flatten)]
    pub raw: RawRecord,
    pub region_city_group_kr: Option<String>,
    pub region_city_kr: Option<String>,
    pub age_group_kr: Option<String>,
}

/// A canonical record plus derived attributes. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub canonical: CanonicalRecord,
    pub payment_per_visit: i64,
    pub customer_grade: CustomerGrade,
    pub is_active: bool,
    pub is_churned: bool,
    pub visit_category: VisitCategory,
}

impl EnrichedRecord {
    #[must_use]
    pub fn raw(&self) -> &RawRecord {
        &self.canonical.raw
    }

    #[must_use]
    pub fn region_label(&self) -> Option<&str> {
        self.canonical.region_city_group_kr.as_deref()
    }

    #[must_use]
    pub fn age_label(&self) -> Option<&str> {
        self.canonical.age_group_kr.as_deref()
    }
}

/// Four-tier classification driven by total payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CustomerGrade {
    #[serde(rename = "VIP")]
    Vip,
    Gold,
    Silver,
    Bronze,
}

impl CustomerGrade {
    /// Reporting order, highest tier first.
    pub const ALL: [Self; 4] = [Self::Vip, Self::Gold, Self::Silver, Self::Bronze];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vip => "VIP",
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
        }
    }
}

impl fmt::Display for CustomerGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visit-count bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VisitCategory {
    #[serde(rename = "1")]
    Once,
    #[serde(rename = "2-3")]
    TwoToThree,
    #[serde(rename = "4-7")]
    FourToSeven,
    #[serde(rename = "8-14")]
    EightToFourteen,
    #[serde(rename = "15+")]
    FifteenPlus,
}

impl VisitCategory {
    pub const ALL: [Self; 5] = [
        Self::Once,
        Self::TwoToThree,
        Self::FourToSeven,
        Self::EightToFourteen,
        Self::FifteenPlus,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Once => "1",
            Self::TwoToThree => "2-3",
            Self::FourToSeven => "4-7",
            Self::EightToFourteen => "8-14",
            Self::FifteenPlus => "15+",
        }
    }
}

impl fmt::Display for VisitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Accepts `0`/`1`, `true`/`false` (any case) and JSON booleans.
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    let Some(value) = Option::<Flag>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match value {
        Flag::Bool(b) => Ok(Some(b)),
        Flag::Int(0) => Ok(Some(false)),
        Flag::Int(1) => Ok(Some(true)),
        Flag::Int(n) => Err(serde::de::Error::custom(format!(
            "retention flag must be 0 or 1, got {n}"
        ))),
        Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "0" | "false" => Ok(Some(false)),
            "1" | "true" => Ok(Some(true)),
            other => Err(serde::de::Error::custom(format!(
                "retention flag must be 0/1 or true/false, got '{other}'"
            ))),
        },
    }
}
