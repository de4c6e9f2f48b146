//! Plain-text cleaning report.

use crate::pipeline::PipelineOutput;
use std::fmt::{self, Write as _};

const RULE_WIDTH: usize = 80;

/// Group an integer with thousands separators: `1234567` → `1,234,567`.
#[must_use]
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the human-readable report for a run.
///
/// `generated_at` and `source` are printed verbatim in the header.
#[must_use]
pub fn render(out: &PipelineOutput, generated_at: &str, source: &str, columns: usize) -> String {
    let mut s = String::new();
    // formatting into a String never fails
    let _ = write_report(&mut s, out, generated_at, source, columns);
    s
}

#[allow(clippy::cast_possible_wrap)]
fn write_report(
    s: &mut String,
    out: &PipelineOutput,
    generated_at: &str,
    source: &str,
    columns: usize,
) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    let o = &out.statistics.overall;

    writeln!(s, "{rule}\nData cleaning report\n{rule}\n")?;
    writeln!(s, "Generated at: {generated_at}")?;
    writeln!(s, "Source data: {source}")?;
    writeln!(s, "Total records: {}", thousands(out.records.len() as i64))?;
    writeln!(s, "Total columns: {columns}\n")?;

    writeln!(s, "Key statistics:")?;
    writeln!(s, "  - Total revenue: {} KRW", thousands(o.total_revenue))?;
    writeln!(s, "  - Total customers: {}", thousands(o.total_customers as i64))?;
    writeln!(s, "  - Average revenue: {} KRW", thousands(o.avg_revenue))?;
    writeln!(s, "  - Average visit days: {}", o.avg_visits)?;
    writeln!(s, "  - 90-day retention: {}%\n", o.retention_rate_90)?;

    writeln!(s, "Data quality:")?;
    writeln!(
        s,
        "  - Unmapped city codes: {} ({} records)",
        out.normalize.unmapped_city_codes.len(),
        out.normalize.unmapped_city_records
    )?;
    writeln!(
        s,
        "  - Zero-payment customers: {} ({}%)",
        out.validation.zero_payment_customers, out.validation.zero_payment_pct
    )?;
    if out.validation.is_clean() {
        writeln!(s, "  - All validation checks passed")?;
    }
    for issue in &out.validation.issues {
        writeln!(s, "  - {issue}")?;
    }
    writeln!(
        s,
        "  - Outliers: payment {}, visits {}, duration {}, removed {}\n",
        out.outliers.extreme_payment, out.outliers.extreme_visits, out.outliers.extreme_duration, out.outliers.removed
    )?;

    writeln!(s, "Cleaning steps:")?;
    writeln!(s, "  [x] Region names localized")?;
    writeln!(s, "  [x] Age groups localized")?;
    writeln!(s, "  [x] Derived attributes (payment per visit, grade, activity, churn, visit category)")?;
    let mark = if out.outliers.removal_enabled { 'x' } else { ' ' };
    writeln!(s, "  [{mark}] Outliers removed")?;
    writeln!(s, "  [x] Statistics generated")
}
