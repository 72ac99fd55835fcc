// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized comparison tolerance used across the crate.
/// Defaults depend on precision (`f32` vs `f64`), but can be overridden:
///  1) **Build-time**: set env var `XFORMRS_FLOAT_ACCURACY`
///     (e.g. `XFORMRS_FLOAT_ACCURACY=1e-9 cargo build`)
///  2) **Runtime**: call [`set_float_accuracy`] once before using the library
static FLOAT_ACCURACY_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_float_accuracy() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-4
    }
    #[cfg(feature = "f64")]
    {
        1e-7
    }
}

/// Returns the tolerance used for singularity checks and approximate equality.
/// If not set yet, it tries `XFORMRS_FLOAT_ACCURACY` (parsed as the active `Real`) and
/// falls back to `1e-7` (`f64`) or `1e-4` (`f32`).
pub fn float_accuracy() -> Real {
    *FLOAT_ACCURACY_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("XFORMRS_FLOAT_ACCURACY") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_float_accuracy()
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `xformrs::float_types::set_float_accuracy(1e-9);`
pub fn set_float_accuracy(value: Real) {
    let _ = FLOAT_ACCURACY_CELL.set(value.max(Real::EPSILON));
}

/// `true` when `value` is within [`float_accuracy`] of zero.
#[inline]
pub fn approx_zero(value: Real) -> bool {
    value.abs() < float_accuracy()
}

/// `true` when `a` and `b` differ by less than [`float_accuracy`].
#[inline]
pub fn approx_equal(a: Real, b: Real) -> bool {
    (a - b).abs() < float_accuracy()
}

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Frac Pi 2
/// π/2
#[cfg(feature = "f32")]
pub const FRAC_PI_2: Real = core::f32::consts::FRAC_PI_2;
/// π/2
#[cfg(feature = "f64")]
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

// Tau
/// The full circle constant (τ)
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
/// The full circle constant (τ)
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;
