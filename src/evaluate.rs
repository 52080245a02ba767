//! Objective/constraint evaluation and moderation of non-finite values.
//!
//! The solver never carries NaN or infinity through its internal
//! arithmetic: everything the evaluator returns is moderated to a large
//! finite sentinel first.

use crate::consts::REALMAX;
use crate::lincon::LinearConstraints;
use ndarray::{Array1, ArrayView1, s};

/// The objective/constraint evaluator: maps `x` to the objective value and
/// the nonlinear constraint vector, feasibility meaning every entry `<= 0`.
///
/// The evaluator must be deterministic; the solver assumes that repeated
/// evaluation at the same point reproduces the same values.
pub type ObjCon<'a> = dyn FnMut(ArrayView1<'_, f64>) -> (f64, Array1<f64>) + 'a;

/// Replace a NaN objective value with `REALMAX` and clamp the rest into the
/// finite range.
pub fn moderate_f(f: f64) -> f64 {
    if f.is_nan() {
        REALMAX
    } else {
        f.clamp(-REALMAX, REALMAX)
    }
}

/// Moderate a constraint vector in place. NaN entries become `REALMAX`,
/// i.e. maximally violated.
pub fn moderate_c(constr: &mut Array1<f64>) {
    constr.mapv_inplace(|c| if c.is_nan() { REALMAX } else { c.clamp(-REALMAX, REALMAX) });
}

/// Clamp infinite components of an iterate so later arithmetic stays
/// finite. NaN components are left alone; the termination checks report
/// them as `NanInfX`.
pub fn moderate_x(x: &mut Array1<f64>) {
    x.mapv_inplace(|v| if v.is_nan() { v } else { v.clamp(-REALMAX, REALMAX) });
}

/// Scalar constraint violation: `max(0, max(constr))`.
pub fn violation(constr: &Array1<f64>) -> f64 {
    constr.iter().fold(0.0_f64, |acc, &c| acc.max(c))
}

/// Evaluate the objective and the full constraint vector
/// `[A·x - b, nlconstr(x)]` at `x`, with moderation applied to both.
pub fn evaluate(
    calcfc: &mut ObjCon<'_>,
    x: ArrayView1<'_, f64>,
    m_nlcon: usize,
    lincon: Option<&LinearConstraints>,
) -> (f64, Array1<f64>) {
    let (f, nlconstr) = calcfc(x);
    debug_assert_eq!(nlconstr.len(), m_nlcon, "evaluator returned a constraint vector of the wrong length");
    let m_lin = lincon.map_or(0, LinearConstraints::len);
    let mut constr = Array1::<f64>::zeros(m_lin + m_nlcon);
    if let Some(lc) = lincon {
        constr.slice_mut(s![..m_lin]).assign(&lc.residuals(x));
    }
    constr.slice_mut(s![m_lin..]).assign(&nlconstr);
    moderate_c(&mut constr);
    (moderate_f(f), constr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn moderation_removes_non_finite_values() {
        assert_eq!(moderate_f(f64::NAN), REALMAX);
        assert_eq!(moderate_f(f64::INFINITY), REALMAX);
        assert_eq!(moderate_f(f64::NEG_INFINITY), -REALMAX);
        assert_eq!(moderate_f(1.5), 1.5);

        let mut c = array![f64::NAN, f64::NEG_INFINITY, -2.0];
        moderate_c(&mut c);
        assert_eq!(c, array![REALMAX, -REALMAX, -2.0]);
    }

    #[test]
    fn violation_is_nonnegative() {
        assert_eq!(violation(&array![-3.0, -1.0]), 0.0);
        assert_eq!(violation(&array![-3.0, 2.0]), 2.0);
        assert_eq!(violation(&array![]), 0.0);
    }

    #[test]
    fn evaluate_prepends_linear_residuals() {
        let lc = LinearConstraints {
            a: array![[1.0, 0.0]],
            b: array![1.0],
        };
        let mut calcfc =
            |x: ArrayView1<'_, f64>| (x[0] + x[1], array![x[1] - 4.0]);
        let (f, constr) = evaluate(&mut calcfc, array![2.0, 3.0].view(), 1, Some(&lc));
        assert_eq!(f, 5.0);
        assert_eq!(constr, array![1.0, -1.0]);
    }

    #[test]
    fn evaluate_moderates_a_nan_objective() {
        let mut calcfc = |_x: ArrayView1<'_, f64>| (f64::NAN, array![f64::NAN]);
        let (f, constr) = evaluate(&mut calcfc, array![0.0].view(), 1, None);
        assert_eq!(f, REALMAX);
        assert_eq!(constr, array![REALMAX]);
    }
}
