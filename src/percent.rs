//! # Percent Math
//! Integer percent shared by the analyzer and the decider.
//!
//! Rounding is half-away-from-zero (`f64::round`). A zero denominator
//! yields 0 instead of an error so a missing baseline month never poisons
//! the downstream metrics.

/// Percentage of `numerator` against `denominator`, rounded to the nearest
/// whole percent. Returns 0 when `denominator` is 0.
pub fn percent(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    ((numerator as f64 / denominator as f64) * 100.0).round() as i64
}
