//! Small dense linear-algebra helpers.
//!
//! The solver only ever inverts the n x n simplex edge matrix, so a
//! self-contained Gauss-Jordan elimination is enough and keeps the results
//! reproducible without a LAPACK backend.

use ndarray::{Array2, ArrayView2};

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting.
///
/// Returns `None` when a pivot column collapses to zero or a non-finite
/// entry appears. The simplex construction keeps its edge matrix
/// non-degenerate, so the caller treats `None` as an internal bug.
pub(crate) fn inv(a: ArrayView2<'_, f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols(), "inv expects a square matrix");
    let mut work = a.to_owned();
    let mut out = Array2::<f64>::eye(n);
    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if work[[row, col]].abs() > work[[pivot, col]].abs() {
                pivot = row;
            }
        }
        let p = work[[pivot, col]];
        if p == 0.0 || !p.is_finite() {
            return None;
        }
        if pivot != col {
            for j in 0..n {
                work.swap([pivot, j], [col, j]);
                out.swap([pivot, j], [col, j]);
            }
        }
        for j in 0..n {
            work[[col, j]] /= p;
            out[[col, j]] /= p;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = work[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                let w = work[[col, j]];
                let o = out[[col, j]];
                work[[row, j]] -= factor * w;
                out[[row, j]] -= factor * o;
            }
        }
    }
    Some(out)
}
