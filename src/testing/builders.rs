//! Fluent construction of raw records.

use crate::record::RawRecord;

/// Builds a [`RawRecord`] field by field. Unset fields stay absent.
///
/// # Example
///
/// ```
/// use visitbeam::testing::RawRecordBuilder;
///
/// let r = RawRecordBuilder::new("u1")
///     .region("Gyeonggi-do", "Suwon")
///     .payment(250_000)
///     .visits(10)
///     .retained_90(true)
///     .build();
///
/// assert_eq!(r.total_payment, Some(250_000));
/// assert_eq!(r.age, None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawRecordBuilder {
    record: RawRecord,
}

impl RawRecordBuilder {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            record: RawRecord {
                uid: uid.into(),
                ..RawRecord::default()
            },
        }
    }

    /// Set the region-group and city codes.
    #[must_use]
    pub fn region(mut self, group: &str, city: &str) -> Self {
        self.record.region_city_group = Some(group.to_string());
        self.record.region_city = Some(city.to_string());
        self
    }

    #[must_use]
    pub fn age_group(mut self, code: &str) -> Self {
        self.record.age_group = Some(code.to_string());
        self
    }

    #[must_use]
    pub fn age(mut self, age: i64) -> Self {
        self.record.age = Some(age);
        self
    }

    #[must_use]
    pub fn visits(mut self, days: i64) -> Self {
        self.record.visit_days = Some(days);
        self
    }

    #[must_use]
    pub fn duration(mut self, minutes: i64) -> Self {
        self.record.total_duration_min = Some(minutes);
        self
    }

    #[must_use]
    pub fn payment(mut self, amount: i64) -> Self {
        self.record.total_payment = Some(amount);
        self
    }

    /// Set all four retention flags: June, July, August, 90-day.
    #[must_use]
    pub fn retention(mut self, june: bool, july: bool, august: bool, ninety: bool) -> Self {
        self.record.retained_june = Some(june);
        self.record.retained_july = Some(july);
        self.record.retained_august = Some(august);
        self.record.retained_90 = Some(ninety);
        self
    }

    #[must_use]
    pub fn retained_90(mut self, retained: bool) -> Self {
        self.record.retained_90 = Some(retained);
        self
    }

    #[must_use]
    pub fn build(self) -> RawRecord {
        self.record
    }
}
