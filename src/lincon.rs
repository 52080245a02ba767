//! Collapse bounds and linear constraints into a single `A·x <= b` system.

use crate::consts::BOUNDMAX;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// The homogeneous linear-inequality system `A·x <= b`.
///
/// Built once before the iterations start and immutable afterwards. An empty
/// system is represented as an absent `LinearConstraints`, never as a matrix
/// with zero rows.
#[derive(Debug, Clone)]
pub struct LinearConstraints {
    /// Coefficient matrix, one row per constraint.
    pub a: Array2<f64>,
    /// Right-hand side, one entry per constraint.
    pub b: Array1<f64>,
}

impl LinearConstraints {
    /// Number of linear constraints.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Residuals `A·x - b` at `x`; an entry is positive iff its constraint
    /// is violated.
    pub fn residuals(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        self.a.dot(&x) - &self.b
    }

    /// Wrap the bound and linear constraints into one inequality system.
    ///
    /// Row order is fixed and the rest of the solver depends on it: lower
    /// bounds, upper bounds, negated equalities, equalities, inequalities.
    /// The bound `xl <= x <= xu` becomes the rows `-x <= -xl` and `x <= xu`;
    /// lower bounds at or below `-BOUNDMAX` and upper bounds at or above
    /// `BOUNDMAX` (as well as NaN bounds) are dropped. The equality
    /// `Aeq·x = beq` is handled naively as the pair `-Aeq·x <= -beq`,
    /// `Aeq·x <= beq`; no elimination of equality constraints is attempted.
    ///
    /// Returns `None` when no linear constraint exists at all.
    pub fn build(
        xl: Option<ArrayView1<'_, f64>>,
        xu: Option<ArrayView1<'_, f64>>,
        aeq: Option<ArrayView2<'_, f64>>,
        beq: Option<ArrayView1<'_, f64>>,
        aineq: Option<ArrayView2<'_, f64>>,
        bineq: Option<ArrayView1<'_, f64>>,
    ) -> Option<LinearConstraints> {
        let n = if let Some(aeq) = aeq {
            aeq.ncols()
        } else if let Some(aineq) = aineq {
            aineq.ncols()
        } else if let Some(xl) = xl {
            xl.len()
        } else if let Some(xu) = xu {
            xu.len()
        } else {
            return None;
        };

        debug_assert!(aeq.is_some() == beq.is_some());
        debug_assert!(aineq.is_some() == bineq.is_some());
        if let (Some(aeq), Some(beq)) = (aeq, beq) {
            debug_assert_eq!(aeq.nrows(), beq.len());
            debug_assert_eq!(aeq.ncols(), n);
        }
        if let (Some(aineq), Some(bineq)) = (aineq, bineq) {
            debug_assert_eq!(aineq.nrows(), bineq.len());
            debug_assert_eq!(aineq.ncols(), n);
        }
        debug_assert!(xl.is_none_or(|v| v.len() == n));
        debug_assert!(xu.is_none_or(|v| v.len() == n));

        // Indices of the nontrivial bound constraints. NaN bounds fail both
        // comparisons and are dropped with the sentinels.
        let ixl: Vec<usize> = match xl {
            Some(xl) => (0..n).filter(|&i| xl[i] > -BOUNDMAX).collect(),
            None => Vec::new(),
        };
        let ixu: Vec<usize> = match xu {
            Some(xu) => (0..n).filter(|&i| xu[i] < BOUNDMAX).collect(),
            None => Vec::new(),
        };
        let meq = beq.map_or(0, |v| v.len());
        let mineq = bineq.map_or(0, |v| v.len());

        let rows = ixl.len() + ixu.len() + 2 * meq + mineq;
        if rows == 0 {
            return None;
        }

        let mut a = Array2::<f64>::zeros((rows, n));
        let mut b = Array1::<f64>::zeros(rows);
        let mut r = 0;
        if let Some(xl) = xl {
            for &i in &ixl {
                a[[r, i]] = -1.0;
                b[r] = -xl[i];
                r += 1;
            }
        }
        if let Some(xu) = xu {
            for &i in &ixu {
                a[[r, i]] = 1.0;
                b[r] = xu[i];
                r += 1;
            }
        }
        if let (Some(aeq), Some(beq)) = (aeq, beq) {
            for k in 0..meq {
                a.row_mut(r).assign(&aeq.row(k).mapv(|v| -v));
                b[r] = -beq[k];
                r += 1;
            }
            for k in 0..meq {
                a.row_mut(r).assign(&aeq.row(k));
                b[r] = beq[k];
                r += 1;
            }
        }
        if let (Some(aineq), Some(bineq)) = (aineq, bineq) {
            for k in 0..mineq {
                a.row_mut(r).assign(&aineq.row(k));
                b[r] = bineq[k];
                r += 1;
            }
        }
        debug_assert_eq!(r, rows);

        Some(LinearConstraints { a, b })
    }
}
