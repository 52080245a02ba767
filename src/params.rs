//! Reconcile the optional tuning parameters into a consistent set.

use crate::consts::{
    CWEIGHT_DEFAULT, EPS, ETA1_DEFAULT, ETA2_DEFAULT, FTARGET_DEFAULT, GAMMA1_DEFAULT,
    GAMMA2_DEFAULT, MAXFILT_DEFAULT, MAXFUN_DIM_DEFAULT, MAXHISTMEM, RHOBEG_DEFAULT,
    RHOEND_DEFAULT, ctol_default,
};
use log::info;

/// User-facing tuning options. Every field is optional; [`Params::reconcile`]
/// fills the gaps with the documented defaults and revises invalid values.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Initial trust-region radius.
    pub rhobeg: Option<f64>,
    /// Final trust-region radius.
    pub rhoend: Option<f64>,
    /// Target objective value; the solver stops at a feasible point at or
    /// below it.
    pub ftarget: Option<f64>,
    /// Feasibility tolerance used when selecting the returned point.
    pub ctol: Option<f64>,
    /// Weight of the constraint violation in the selection merit.
    pub cweight: Option<f64>,
    /// Evaluation budget.
    pub maxfun: Option<usize>,
    /// History capacity; 0 disables recording.
    pub maxhist: Option<usize>,
    /// Filter capacity; 0 disables the filter.
    pub maxfilt: Option<usize>,
    /// Lower ratio threshold of the trust-region update.
    pub eta1: Option<f64>,
    /// Upper ratio threshold of the trust-region update.
    pub eta2: Option<f64>,
    /// Contraction factor of the trust-region radius.
    pub gamma1: Option<f64>,
    /// Expansion factor of the trust-region radius.
    pub gamma2: Option<f64>,
}

/// A fully specified, mutually consistent parameter set.
///
/// Guarantees after reconciliation: `0 < rhoend <= rhobeg`,
/// `0 < eta1 <= eta2 < 1`, `0 < gamma1 < 1 < gamma2`, `maxfun >= n + 2`.
#[derive(Debug, Clone)]
pub struct Params {
    pub rhobeg: f64,
    pub rhoend: f64,
    pub ftarget: f64,
    pub ctol: f64,
    pub cweight: f64,
    pub maxfun: usize,
    /// Effective history capacity, after the memory-ceiling shrink.
    pub maxhist: usize,
    pub maxfilt: usize,
    pub eta1: f64,
    pub eta2: f64,
    pub gamma1: f64,
    pub gamma2: f64,
}

impl Params {
    /// Resolve `options` for a problem with `n` variables and `m`
    /// constraints.
    ///
    /// The defaults are interdependent, so the resolution order below
    /// matters: later defaults consult earlier results. User-specified
    /// capacities are never grown, only filled in when absent or shrunk for
    /// memory safety.
    pub fn reconcile(options: &Options, n: usize, m: usize) -> Params {
        debug_assert!(n >= 1, "the problem must have at least one variable");

        let mut rhobeg = match options.rhobeg {
            Some(v) => v,
            None => match options.rhoend {
                Some(re) if re.is_finite() && re > 0.0 => (10.0 * re).max(RHOBEG_DEFAULT),
                _ => RHOBEG_DEFAULT,
            },
        };
        if !(rhobeg.is_finite() && rhobeg > 0.0) {
            rhobeg = RHOBEG_DEFAULT;
        }
        let mut rhoend = match options.rhoend {
            Some(v) => v,
            None => (RHOEND_DEFAULT / RHOBEG_DEFAULT * rhobeg).clamp(EPS, RHOEND_DEFAULT),
        };
        if !(rhoend.is_finite() && rhoend > 0.0 && rhoend <= rhobeg) {
            rhoend = (RHOEND_DEFAULT / RHOBEG_DEFAULT * rhobeg)
                .clamp(EPS, RHOEND_DEFAULT)
                .min(rhobeg);
        }

        let mut eta1 = match options.eta1 {
            Some(v) => v,
            None => match options.eta2 {
                Some(e2) if e2 > 0.0 && e2 < 1.0 => EPS.max(e2 / 7.0),
                _ => ETA1_DEFAULT,
            },
        };
        // Derive eta2 from eta1 only when the user actually gave eta1;
        // with both absent the pair takes the fixed defaults.
        let mut eta2 = match (options.eta2, options.eta1) {
            (Some(v), _) => v,
            (None, Some(_)) if eta1 > 0.0 && eta1 < 1.0 => (eta1 + 2.0) / 3.0,
            _ => ETA2_DEFAULT,
        };
        if !(0.0 < eta1 && eta1 <= eta2 && eta2 < 1.0) {
            eta1 = ETA1_DEFAULT;
            eta2 = ETA2_DEFAULT;
        }

        let mut gamma1 = options.gamma1.unwrap_or(GAMMA1_DEFAULT);
        let mut gamma2 = options.gamma2.unwrap_or(GAMMA2_DEFAULT);
        if !(0.0 < gamma1 && gamma1 < 1.0 && gamma2 > 1.0 && gamma2.is_finite()) {
            gamma1 = GAMMA1_DEFAULT;
            gamma2 = GAMMA2_DEFAULT;
        }

        let mut maxfun = options.maxfun.unwrap_or(MAXFUN_DIM_DEFAULT * n);
        if maxfun < n + 2 {
            // n + 1 simplex vertices plus at least one trial step.
            info!("maxfun raised from {} to the minimum {}", maxfun, n + 2);
            maxfun = n + 2;
        }

        let mut maxhist = options
            .maxhist
            .unwrap_or_else(|| maxfun.max(n + 2).max(MAXFUN_DIM_DEFAULT * n));
        let record_bytes = (n + m + 2) * size_of::<f64>();
        let ceiling = MAXHISTMEM / record_bytes;
        if maxhist > ceiling {
            info!(
                "history capacity reduced from {maxhist} to {ceiling} to respect the \
                 {MAXHISTMEM}-byte memory ceiling"
            );
            maxhist = ceiling;
        }

        let maxfilt = options.maxfilt.unwrap_or(MAXFILT_DEFAULT);

        let ftarget = match options.ftarget {
            Some(v) if !v.is_nan() => v,
            _ => FTARGET_DEFAULT,
        };
        let ctol = match options.ctol {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            _ => ctol_default(),
        };
        let cweight = match options.cweight {
            Some(v) if !v.is_nan() && v >= 0.0 => v,
            _ => CWEIGHT_DEFAULT,
        };

        let params = Params {
            rhobeg,
            rhoend,
            ftarget,
            ctol,
            cweight,
            maxfun,
            maxhist,
            maxfilt,
            eta1,
            eta2,
            gamma1,
            gamma2,
        };
        debug_assert!(0.0 < params.rhoend && params.rhoend <= params.rhobeg);
        debug_assert!(0.0 < params.eta1 && params.eta1 <= params.eta2 && params.eta2 < 1.0);
        debug_assert!(0.0 < params.gamma1 && params.gamma1 < 1.0 && params.gamma2 > 1.0);
        debug_assert!(params.maxfun >= n + 2);
        params
    }
}
