//! Sequencing of one run: linearize the constraints, reconcile the
//! parameters, initialize the simplex, seed the filter, hand the state to
//! the iteration engine and package the result.

use crate::consts::BOUNDMAX;
use crate::error::InputError;
use crate::evaluate::{ObjCon, evaluate, moderate_c, moderate_f, moderate_x};
use crate::filter::{Filter, seed_filter};
use crate::history::History;
use crate::initialize::{Callback, InitOutcome, SimplexState, init_simplex};
use crate::lincon::LinearConstraints;
use crate::params::{Options, Params};
use crate::status::ExitStatus;
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, s};

/// Bound and linear constraints of a problem. All fields are optional;
/// matrices come with their right-hand side or not at all.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Lower bounds; entries at or below `-BOUNDMAX`, and NaN entries,
    /// mean unbounded.
    pub xl: Option<Array1<f64>>,
    /// Upper bounds, symmetric to `xl`.
    pub xu: Option<Array1<f64>>,
    /// Linear equalities `aeq·x = beq`.
    pub aeq: Option<Array2<f64>>,
    pub beq: Option<Array1<f64>>,
    /// Linear inequalities `aineq·x <= bineq`.
    pub aineq: Option<Array2<f64>>,
    pub bineq: Option<Array1<f64>>,
}

/// Everything reported at the end of a run.
///
/// The constraint vector holds the linear residuals `A·x - b` first,
/// then the nonlinear constraint values, matching the layout of
/// [`LinearConstraints::build`]. History arrays are present only when
/// recording was enabled, truncated to the most recent `maxhist`
/// evaluations in chronological order.
#[derive(Debug)]
pub struct CobylaResult {
    pub x: Array1<f64>,
    pub f: f64,
    pub constr: Array1<f64>,
    pub cstrv: f64,
    /// Number of objective/constraint evaluations, the starting point
    /// included.
    pub nf: usize,
    pub status: ExitStatus,
    pub xhist: Option<Array2<f64>>,
    pub fhist: Option<Array1<f64>>,
    pub chist: Option<Array1<f64>>,
    pub conhist: Option<Array2<f64>>,
}

/// Mutable view of the run state handed to the iteration engine. The engine
/// must resume evaluation counting and history/filter population from here.
#[derive(Debug)]
pub struct EngineContext<'a> {
    pub params: &'a Params,
    pub lincon: Option<&'a LinearConstraints>,
    pub state: &'a mut SimplexState,
    pub nf: &'a mut usize,
    pub history: &'a mut History,
    pub filter: &'a mut Filter,
}

/// Seam for the external trust-region iteration loop.
pub trait IterationEngine {
    /// Run the main loop to completion, starting from an initialized
    /// simplex, and report why it stopped.
    fn run(&mut self, calcfc: &mut ObjCon<'_>, ctx: EngineContext<'_>) -> ExitStatus;
}

/// Engine that performs no trust-region iterations: the initial radius is
/// treated as already at its floor, so the best initialization vertex is
/// returned. Useful on its own for exercising the driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEngine;

impl IterationEngine for NullEngine {
    fn run(&mut self, _calcfc: &mut ObjCon<'_>, _ctx: EngineContext<'_>) -> ExitStatus {
        ExitStatus::SmallTrRadius
    }
}

/// Minimize `calcfc`'s objective subject to its `m_nlcon` nonlinear
/// constraints and the linear constraints in `constraints`, starting from
/// `x0`, with the trust-region loop supplied by [`NullEngine`].
///
/// Feasibility means every constraint value is `<= 0`.
pub fn cobyla<F>(
    calcfc: F,
    m_nlcon: usize,
    x0: Array1<f64>,
    constraints: &Constraints,
    options: &Options,
) -> Result<CobylaResult, InputError>
where
    F: FnMut(ArrayView1<'_, f64>) -> (f64, Array1<f64>),
{
    cobyla_with_engine(
        calcfc,
        m_nlcon,
        x0,
        constraints,
        options,
        None,
        None,
        None,
        &mut NullEngine,
    )
}

/// Full-control variant of [`cobyla`].
///
/// `f0` and `nlconstr0` optionally supply the already-known objective and
/// nonlinear constraint values at `x0`; they must be given together, and
/// they are trusted even when `f0` is NaN (a caller may deliberately force
/// this; the value is moderated, not re-evaluated). The callback is invoked
/// after every evaluation and may request cooperative termination.
#[allow(clippy::too_many_arguments)]
pub fn cobyla_with_engine<F, E>(
    mut calcfc: F,
    m_nlcon: usize,
    mut x0: Array1<f64>,
    constraints: &Constraints,
    options: &Options,
    f0: Option<f64>,
    nlconstr0: Option<Array1<f64>>,
    callback: Option<&mut Callback<'_>>,
    engine: &mut E,
) -> Result<CobylaResult, InputError>
where
    F: FnMut(ArrayView1<'_, f64>) -> (f64, Array1<f64>),
    E: IterationEngine,
{
    let n = x0.len();
    debug_assert!(n >= 1, "the problem must have at least one variable");
    debug_assert!(constraints.aeq.is_some() == constraints.beq.is_some());
    debug_assert!(constraints.aineq.is_some() == constraints.bineq.is_some());
    debug_assert!(constraints.xl.as_ref().is_none_or(|v| v.len() == n));
    debug_assert!(constraints.xu.as_ref().is_none_or(|v| v.len() == n));
    // If nlconstr0 is given then f0 must be too; a lone f0 is only
    // meaningful as NaN, which is read as "not provided".
    debug_assert!(nlconstr0.is_none() || f0.is_some());
    debug_assert!(f0.is_none_or(|v| v.is_nan() || nlconstr0.is_some()));

    if let Some(nl0) = &nlconstr0 {
        if nl0.len() != m_nlcon {
            return Err(InputError::NlConstr0Size {
                got: nl0.len(),
                expected: m_nlcon,
            });
        }
    }

    // Clamp ill-defined bounds onto the no-bound sentinel.
    let xl = constraints
        .xl
        .as_ref()
        .map(|v| v.mapv(|b| if b.is_nan() || b < -BOUNDMAX { -BOUNDMAX } else { b }));
    let xu = constraints
        .xu
        .as_ref()
        .map(|v| v.mapv(|b| if b.is_nan() || b > BOUNDMAX { BOUNDMAX } else { b }));

    let lincon = LinearConstraints::build(
        xl.as_ref().map(Array1::view),
        xu.as_ref().map(Array1::view),
        constraints.aeq.as_ref().map(Array2::view),
        constraints.beq.as_ref().map(Array1::view),
        constraints.aineq.as_ref().map(Array2::view),
        constraints.bineq.as_ref().map(Array1::view),
    );
    let m_lin = lincon.as_ref().map_or(0, LinearConstraints::len);
    let m = m_lin + m_nlcon;

    // Resolve the starting objective/constraint values so initialization
    // has a single interface: reuse the supplied values when possible,
    // evaluate otherwise.
    let (f, constr0) = match (f0, &nlconstr0) {
        (Some(f0), Some(nl0)) if x0.iter().all(|v| v.is_finite()) => {
            let mut constr = Array1::<f64>::zeros(m);
            if let Some(lc) = &lincon {
                constr.slice_mut(s![..m_lin]).assign(&lc.residuals(x0.view()));
            }
            constr.slice_mut(s![m_lin..]).assign(nl0);
            moderate_c(&mut constr);
            (moderate_f(f0), constr)
        }
        _ => {
            moderate_x(&mut x0);
            evaluate(&mut calcfc, x0.view(), m_nlcon, lincon.as_ref())
        }
    };

    let params = Params::reconcile(options, n, m);
    let mut history = History::new(params.maxhist);
    let mut filter = Filter::new(params.maxfilt);

    let InitOutcome {
        mut state,
        mut nf,
        status,
    } = init_simplex(
        &mut calcfc,
        lincon.as_ref(),
        &x0,
        f,
        &constr0,
        &params,
        &mut history,
        callback,
    );

    let nfilt = seed_filter(&state, &mut filter, params.ctol, params.cweight);
    debug!("initialization done: nf = {nf}, filter holds {nfilt} points");

    let status = match status {
        // An early stop during initialization skips the iterations; the
        // partial state still selects a return value below.
        Some(code) => code,
        None => engine.run(
            &mut calcfc,
            EngineContext {
                params: &params,
                lincon: lincon.as_ref(),
                state: &mut state,
                nf: &mut nf,
                history: &mut history,
                filter: &mut filter,
            },
        ),
    };

    let (x, f, constr, cstrv) = match filter.select(params.ctol, params.cweight) {
        Some(i) => (
            filter.point(i).clone(),
            filter.objective(i),
            filter.constraint(i).clone(),
            filter.violation(i),
        ),
        // Filter capacity 0: fall back to the base vertex, which is always
        // evaluated.
        None => (
            state.sim.column(n).to_owned(),
            state.fval[n],
            state.conmat.column(n).to_owned(),
            state.cval[n],
        ),
    };
    debug!("returning with status {status:?}: f = {f:.6e}, cstrv = {cstrv:.6e}");

    let (xhist, fhist, chist, conhist) = if history.is_empty() {
        (None, None, None, None)
    } else {
        let (xh, fh, ch, conh) = history.export();
        (Some(xh), Some(fh), Some(ch), Some(conh))
    };

    Ok(CobylaResult {
        x,
        f,
        constr,
        cstrv,
        nf,
        status,
        xhist,
        fhist,
        chist,
        conhist,
    })
}
