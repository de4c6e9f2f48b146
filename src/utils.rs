//! Numeric and hashing helpers shared by the reporting stages.

use sha2::{Digest, Sha256};

/// Round to two decimals, exact halves to even.
///
/// ```
/// use visitbeam::utils::round2;
///
/// assert_eq!(round2(33.333_333), 33.33);
/// assert_eq!(round2(66.666_666), 66.67);
/// assert_eq!(round2(1.125), 1.12);
/// ```
#[must_use]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// `part / total` as a percentage rounded to two decimals; 0 when `total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}

/// Integer part of a mean, truncated toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn trunc(x: f64) -> i64 {
    x.trunc() as i64
}

/// Lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
