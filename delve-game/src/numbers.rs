//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(f64::MAX)
}

/// Round a f64 half-to-even and clamp it to the u64 range, returning 0 for NaN values.
///
/// Balance formulas were tuned against banker's rounding, so `2.5` rounds to `2`.
#[must_use]
pub fn round_half_even_to_u64(value: f64) -> u64 {
    if value.is_nan() {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).round_ties_even();
    cast::<f64, u64>(clamped).unwrap_or(u64::MAX)
}

/// Convert u64 to i64, saturating at `i64::MAX`.
#[must_use]
pub fn u64_to_i64_saturating(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Narrow a u64 to u32, returning `None` when it does not fit.
#[must_use]
pub fn narrow_u32(value: u64) -> Option<u32> {
    u32::try_from(value).ok()
}
