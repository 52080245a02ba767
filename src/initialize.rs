//! Build and condition the initial simplex of n+1 evaluated points.

use crate::consts::REALMAX;
use crate::evaluate::{ObjCon, evaluate, violation};
use crate::history::History;
use crate::linalg::inv;
use crate::lincon::LinearConstraints;
use crate::params::Params;
use crate::status::ExitStatus;
use log::trace;
use ndarray::{Array1, Array2, ArrayView1, s};

/// Progress/cancellation callback, invoked with `(x, f, nf, cstrv, constr)`
/// after every evaluation. Returning `true` requests cooperative
/// termination, honored exactly like budget exhaustion.
pub type Callback<'a> =
    dyn FnMut(ArrayView1<'_, f64>, f64, usize, f64, ArrayView1<'_, f64>) -> bool + 'a;

/// The simplex and its per-vertex evaluation cache.
///
/// `sim` is n x (n+1): the first n columns are edge vectors from the base
/// vertex (the last column) to the other vertices, and `simi` is the
/// inverse of that edge block. The edge vectors must stay linearly
/// independent; a degenerate simplex would silently corrupt the linear
/// models solved through `simi`, so non-degeneracy is a correctness
/// invariant, not a performance concern.
#[derive(Debug, Clone)]
pub struct SimplexState {
    /// n x (n+1) simplex; column n holds the base vertex.
    pub sim: Array2<f64>,
    /// Inverse of `sim[:, ..n]`; a running estimate until initialization
    /// finishes, the directly recomputed inverse afterwards.
    pub simi: Array2<f64>,
    /// Objective value per vertex.
    pub fval: Array1<f64>,
    /// Scalar constraint violation per vertex.
    pub cval: Array1<f64>,
    /// m x (n+1) constraint values, one column per vertex.
    pub conmat: Array2<f64>,
    /// Whether each vertex has been evaluated; evaluation may stop early.
    pub evaluated: Vec<bool>,
}

/// What simplex initialization produced.
///
/// `status` is `None` when every vertex was evaluated, or the code behind
/// an early stop; in that case the cache is only partially filled and
/// `simi` is the unfinished running inverse. Both outcomes are normal and
/// the consumer must handle either.
#[derive(Debug)]
pub struct InitOutcome {
    pub state: SimplexState,
    /// Number of vertices holding evaluation data, the starting point
    /// included.
    pub nf: usize,
    pub status: Option<ExitStatus>,
}

/// Decide whether initialization must stop after the current evaluation.
fn check_break(
    maxfun: usize,
    nf: usize,
    cstrv: f64,
    ctol: f64,
    f: f64,
    ftarget: f64,
    x: &Array1<f64>,
) -> Option<ExitStatus> {
    if x.iter().any(|v| !v.is_finite()) {
        return Some(ExitStatus::NanInfX);
    }
    if f <= ftarget && cstrv <= ctol {
        return Some(ExitStatus::FtargetAchieved);
    }
    if nf >= maxfun {
        return Some(ExitStatus::MaxFunReached);
    }
    None
}

/// Evaluate the objective and constraints at the n+1 vertices of the
/// initial simplex and keep it numerically well conditioned.
///
/// The simplex starts as `rhobeg * I` for the edge columns with `x0` as the
/// base. Vertex 0 is the starting point and reuses the supplied `f0` and
/// `constr0` (even a deliberately forced NaN objective, which the driver
/// has already moderated); vertices 1..=n are `x0 + rhobeg * e_i`. Whenever
/// a non-base vertex strictly improves on the base objective the two are
/// exchanged and the affected simplex row is rewritten so the edge block
/// stays lower triangular. The exchange changes the geometry seen by every
/// later vertex, which is what makes this loop inherently sequential.
#[allow(clippy::too_many_arguments)]
pub fn init_simplex(
    calcfc: &mut ObjCon<'_>,
    lincon: Option<&LinearConstraints>,
    x0: &Array1<f64>,
    f0: f64,
    constr0: &Array1<f64>,
    params: &Params,
    history: &mut History,
    mut callback: Option<&mut Callback<'_>>,
) -> InitOutcome {
    let n = x0.len();
    let m = constr0.len();
    let m_lin = lincon.map_or(0, LinearConstraints::len);
    debug_assert!(n >= 1, "the problem must have at least one variable");
    debug_assert!(m >= m_lin);
    debug_assert!(params.rhobeg > 0.0);
    let m_nlcon = m - m_lin;
    let rhobeg = params.rhobeg;

    let mut sim = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        sim[[i, i]] = rhobeg;
    }
    sim.column_mut(n).assign(x0);
    // Mostly overwritten at the end, but not when evaluation stops early.
    let mut simi = Array2::<f64>::eye(n) / rhobeg;

    let mut evaluated = vec![false; n + 1];
    let mut fval = Array1::<f64>::from_elem(n + 1, REALMAX);
    let mut cval = Array1::<f64>::from_elem(n + 1, REALMAX);
    let mut conmat = Array2::<f64>::from_elem((m, n + 1), REALMAX);
    let mut status = None;

    for k in 0..=n {
        let mut x = sim.column(n).to_owned();
        let (j, f, constr) = if k == 0 {
            (n, f0, constr0.clone())
        } else {
            let j = k - 1;
            x[j] += rhobeg;
            let (f, constr) = evaluate(calcfc, x.view(), m_nlcon, lincon);
            (j, f, constr)
        };
        let cstrv = violation(&constr);
        trace!("initialization: vertex {k}: f = {f:.6e}, cstrv = {cstrv:.6e}");

        history.record(&x, f, cstrv, &constr);
        evaluated[j] = true;
        fval[j] = f;
        cval[j] = cstrv;
        conmat.column_mut(j).assign(&constr);

        // On an early stop the remaining vertices stay unevaluated. The
        // budget counts evaluations performed, the starting point included.
        if let Some(code) =
            check_break(params.maxfun, k + 1, cstrv, params.ctol, f, params.ftarget, &x)
        {
            status = Some(code);
            break;
        }
        if let Some(cb) = callback.as_mut() {
            let nf = evaluated.iter().filter(|&&e| e).count();
            if cb(x.view(), f, nf, cstrv, constr.view()) {
                status = Some(ExitStatus::CallbackTerminate);
                break;
            }
        }

        // Exchange the new vertex with the base when it improves on the
        // base objective. Each exchange changes which point is the base,
        // hence the geometry used by every subsequent column.
        if j < n && fval[j] < fval[n] {
            fval.swap(j, n);
            cval.swap(j, n);
            for r in 0..m {
                conmat.swap([r, j], [r, n]);
            }
            sim.column_mut(n).assign(&x);
            // Keep sim[:, ..=j] lower triangular.
            for c in 0..=j {
                sim[[j, c]] = -rhobeg;
            }
        }
    }

    let nf = evaluated.iter().filter(|&&e| e).count();

    if evaluated.iter().all(|&e| e) {
        // The running inverse is no longer trusted once vertices may have
        // been exchanged; rebuild it from the finalized edge block.
        match inv(sim.slice(s![.., ..n])) {
            Some(inverse) => simi = inverse,
            None => status = Some(ExitStatus::NanInfModel),
        }
    }

    debug_assert!(nf <= params.maxfun);
    debug_assert!((0..=n).all(|j| !evaluated[j] || (!fval[j].is_nan() && fval[j] < f64::INFINITY)));
    debug_assert!(
        (0..=n).all(|j| !evaluated[j] || (cval[j] >= 0.0 && cval[j] < f64::INFINITY))
    );
    debug_assert!((0..n).all(|c| sim.column(c).iter().any(|&v| v != 0.0)));
    #[cfg(debug_assertions)]
    if status.is_none() {
        let prod = sim.slice(s![.., ..n]).dot(&simi);
        let eye = Array2::<f64>::eye(n);
        debug_assert!(
            prod.iter()
                .zip(eye.iter())
                .all(|(p, e)| (p - e).abs() < 0.1),
            "simi is not the inverse of the simplex edge block"
        );
    }

    InitOutcome {
        state: SimplexState {
            sim,
            simi,
            fval,
            cval,
            conmat,
            evaluated,
        },
        nf,
        status,
    }
}
