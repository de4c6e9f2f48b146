//! Per-record derived attributes.
//!
//! Each attribute is a small total function of the record. Absent numeric
//! cells count as zero and an absent retention flag as "not retained".

use crate::record::{CanonicalRecord, CustomerGrade, EnrichedRecord, VisitCategory};
use crate::runner::Runner;
use anyhow::Result;

pub const VIP_MIN_PAYMENT: i64 = 200_000;
pub const GOLD_MIN_PAYMENT: i64 = 100_000;
pub const SILVER_MIN_PAYMENT: i64 = 50_000;
pub const ACTIVE_MIN_VISIT_DAYS: i64 = 5;

/// Enrich one canonical record.
#[must_use]
pub fn derive(c: CanonicalRecord) -> EnrichedRecord {
    let payment = c.raw.payment();
    let visits = c.raw.visits();
    EnrichedRecord {
        payment_per_visit: payment_per_visit(payment, visits),
        customer_grade: customer_grade(payment),
        is_active: visits >= ACTIVE_MIN_VISIT_DAYS,
        is_churned: !c.raw.retained(),
        visit_category: visit_category(visits),
        canonical: c,
    }
}

/// Enrich a record set, preserving order.
///
/// # Errors
/// Fails only if the runner cannot build its thread pool.
pub fn derive_all(records: Vec<CanonicalRecord>, runner: &Runner) -> Result<Vec<EnrichedRecord>> {
    runner.map(records, derive)
}

/// Average payment per visit day, rounded half to even. Zero when there were
/// no visit days.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn payment_per_visit(total_payment: i64, visit_days: i64) -> i64 {
    if visit_days == 0 {
        return 0;
    }
    (total_payment as f64 / visit_days as f64).round_ties_even() as i64
}

/// Grade by inclusive lower payment bounds.
#[must_use]
pub const fn customer_grade(total_payment: i64) -> CustomerGrade {
    if total_payment >= VIP_MIN_PAYMENT {
        CustomerGrade::Vip
    } else if total_payment >= GOLD_MIN_PAYMENT {
        CustomerGrade::Gold
    } else if total_payment >= SILVER_MIN_PAYMENT {
        CustomerGrade::Silver
    } else {
        CustomerGrade::Bronze
    }
}

/// Bucket by visit days. Upper bucket edges are inclusive; anything that is
/// not exactly one visit and at most three (including zero) lands in `2-3`.
#[must_use]
pub const fn visit_category(visit_days: i64) -> VisitCategory {
    if visit_days == 1 {
        VisitCategory::Once
    } else if visit_days <= 3 {
        VisitCategory::TwoToThree
    } else if visit_days <= 7 {
        VisitCategory::FourToSeven
    } else if visit_days <= 14 {
        VisitCategory::EightToFourteen
    } else {
        VisitCategory::FifteenPlus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_per_visit_rounds_half_to_even() {
        assert_eq!(payment_per_visit(5, 2), 2);
        assert_eq!(payment_per_visit(7, 2), 4);
        assert_eq!(payment_per_visit(10, 3), 3);
        assert_eq!(payment_per_visit(20, 3), 7);
    }

    #[test]
    fn payment_per_visit_zero_days() {
        assert_eq!(payment_per_visit(123_456, 0), 0);
        assert_eq!(payment_per_visit(0, 0), 0);
    }
}
