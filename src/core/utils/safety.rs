//! Numeric guards
//!
//! Nothing non-finite may reach the draw list. Interpolation over a
//! degenerate path or a zero-length delta can produce NaN/Infinity; these
//! helpers substitute a known-good value instead of propagating it.
//!
//! Usage:
//! ```rust
//! use cosmos_fx::finite_or;
//!
//! let last_good = 12.0_f32;
//! let x = finite_or!(0.0_f32 / 0.0, last_good);
//! assert_eq!(x, 12.0);
//! ```

/// Evaluate `$value` once; yield it if finite, otherwise `$fallback`.
#[macro_export]
macro_rules! finite_or {
    ($value:expr, $fallback:expr) => {{
        let v = $value;
        if v.is_finite() {
            v
        } else {
            $fallback
        }
    }};
}

/// Clamp a progress value into [0, 1]; NaN maps to 0.
#[inline]
pub fn clamp_unit(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// True when every value is finite.
#[inline]
pub fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}
