//! Numerical constants and tuning defaults shared across the crate.

/// Machine epsilon for `f64`.
pub const EPS: f64 = f64::EPSILON;

/// Largest finite value the solver works with. Non-finite objective and
/// constraint values are moderated to this sentinel.
pub const REALMAX: f64 = f64::MAX;

/// Bounds at or beyond this magnitude (and NaN bounds) are treated as absent.
pub const BOUNDMAX: f64 = 0.25 * f64::MAX;

/// Default initial trust-region radius.
pub const RHOBEG_DEFAULT: f64 = 1.0;

/// Default final trust-region radius.
pub const RHOEND_DEFAULT: f64 = 1.0e-6;

/// Default target objective value: no target.
pub const FTARGET_DEFAULT: f64 = f64::NEG_INFINITY;

/// Default lower ratio threshold of the trust-region update.
pub const ETA1_DEFAULT: f64 = 0.1;

/// Default upper ratio threshold of the trust-region update.
pub const ETA2_DEFAULT: f64 = 0.7;

/// Default contraction factor of the trust-region radius.
pub const GAMMA1_DEFAULT: f64 = 0.5;

/// Default expansion factor of the trust-region radius.
pub const GAMMA2_DEFAULT: f64 = 2.0;

/// Default weight of the constraint violation in the selection merit.
pub const CWEIGHT_DEFAULT: f64 = 1.0e8;

/// The default evaluation budget is this multiple of the variable count.
pub const MAXFUN_DIM_DEFAULT: usize = 500;

/// Default capacity of the filter archive.
pub const MAXFILT_DEFAULT: usize = 2000;

/// Ceiling on the memory the history buffers may claim, in bytes.
pub const MAXHISTMEM: usize = 300 * 1024 * 1024;

/// Default feasibility tolerance: `sqrt(EPS)`. X is considered feasible if
/// its constraint violation does not exceed this value. The tolerance is
/// absolute and only affects which point is returned, never the iterations.
pub fn ctol_default() -> f64 {
    EPS.sqrt()
}
