//! Bounded archive of promising objective/feasibility trade-offs.
//!
//! The filter is consulted only when the solver returns, to pick the best
//! compromise among everything evaluated; it never steers the search.

use crate::initialize::SimplexState;
use ndarray::{Array1, ArrayView1};

/// Fixed-capacity archive of `(x, f, cstrv, constr)` tuples, none of which
/// dominates another.
#[derive(Debug, Clone)]
pub struct Filter {
    cap: usize,
    x: Vec<Array1<f64>>,
    f: Vec<f64>,
    cstrv: Vec<f64>,
    constr: Vec<Array1<f64>>,
}

impl Filter {
    pub fn new(cap: usize) -> Filter {
        Filter {
            cap,
            x: Vec::new(),
            f: Vec::new(),
            cstrv: Vec::new(),
            constr: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.f.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f.is_empty()
    }

    pub fn point(&self, i: usize) -> &Array1<f64> {
        &self.x[i]
    }

    pub fn objective(&self, i: usize) -> f64 {
        self.f[i]
    }

    pub fn violation(&self, i: usize) -> f64 {
        self.cstrv[i]
    }

    pub fn constraint(&self, i: usize) -> &Array1<f64> {
        &self.constr[i]
    }

    /// Whether entry `a` dominates a candidate with values `(f, cstrv)`.
    ///
    /// Domination holds when both are within the feasibility tolerance and
    /// `a` has the better objective, or when `a` is no worse in both the
    /// scalarized merit `f + cweight * cstrv` and the violation itself.
    fn dominates(&self, a: usize, f: f64, cstrv: f64, ctol: f64, cweight: f64) -> bool {
        (self.cstrv[a] <= ctol && cstrv <= ctol && self.f[a] <= f)
            || (self.f[a] + cweight * self.cstrv[a] <= f + cweight * cstrv
                && self.cstrv[a] <= cstrv)
    }

    /// Insert a candidate unless an existing entry dominates it.
    ///
    /// On insertion, entries the candidate dominates are evicted; when the
    /// filter is full, the weakest entry by the merit comparison makes room.
    /// Returns whether the candidate was stored.
    pub fn save(
        &mut self,
        x: ArrayView1<'_, f64>,
        f: f64,
        cstrv: f64,
        constr: ArrayView1<'_, f64>,
        ctol: f64,
        cweight: f64,
    ) -> bool {
        if self.cap == 0 {
            return false;
        }
        debug_assert!(cstrv >= 0.0 && cstrv.is_finite());
        debug_assert!(f.is_finite());

        if (0..self.f.len()).any(|i| self.dominates(i, f, cstrv, ctol, cweight)) {
            return false;
        }

        // Evict entries now dominated by the candidate: same rule with the
        // roles swapped.
        let phi = f + cweight * cstrv;
        let mut i = 0;
        while i < self.f.len() {
            let dominated = (cstrv <= ctol && self.cstrv[i] <= ctol && f <= self.f[i])
                || (phi <= self.f[i] + cweight * self.cstrv[i] && cstrv <= self.cstrv[i]);
            if dominated {
                self.remove(i);
            } else {
                i += 1;
            }
        }

        if self.f.len() == self.cap {
            self.remove(self.weakest(cweight));
        }

        self.x.push(x.to_owned());
        self.f.push(f);
        self.cstrv.push(cstrv);
        self.constr.push(constr.to_owned());
        debug_assert!(self.f.len() <= self.cap);
        true
    }

    /// Pick the returned solution: the lowest objective among entries within
    /// the feasibility tolerance if any, otherwise the lowest merit
    /// `f + cweight * max(cstrv - ctol, 0)` with the violation as tie-break.
    pub fn select(&self, ctol: f64, cweight: f64) -> Option<usize> {
        if self.f.is_empty() {
            return None;
        }
        let mut best: Option<usize> = None;
        for i in 0..self.f.len() {
            if self.cstrv[i] <= ctol {
                best = match best {
                    Some(b) if self.f[b] <= self.f[i] => Some(b),
                    _ => Some(i),
                };
            }
        }
        if best.is_some() {
            return best;
        }
        let phi = |i: usize| self.f[i] + cweight * (self.cstrv[i] - ctol).max(0.0);
        let mut best = 0;
        for i in 1..self.f.len() {
            if phi(i) < phi(best) || (phi(i) == phi(best) && self.cstrv[i] < self.cstrv[best]) {
                best = i;
            }
        }
        Some(best)
    }

    /// Index of the entry with the largest merit, ties broken by violation.
    fn weakest(&self, cweight: f64) -> usize {
        let phi = |i: usize| self.f[i] + cweight * self.cstrv[i];
        let mut worst = 0;
        for i in 1..self.f.len() {
            if phi(i) > phi(worst) || (phi(i) == phi(worst) && self.cstrv[i] > self.cstrv[worst]) {
                worst = i;
            }
        }
        worst
    }

    fn remove(&mut self, i: usize) {
        self.x.remove(i);
        self.f.remove(i);
        self.cstrv.remove(i);
        self.constr.remove(i);
    }
}

/// Insert every evaluated vertex of the initial simplex into `filter`.
///
/// Vertex `i < n` lives at `sim[:, i] + sim[:, n]` (edge plus base); vertex
/// `n` is the base column itself. Returns the number of points the filter
/// holds afterwards.
pub fn seed_filter(state: &SimplexState, filter: &mut Filter, ctol: f64, cweight: f64) -> usize {
    let n = state.sim.nrows();
    for i in 0..=n {
        if !state.evaluated[i] {
            continue;
        }
        let x = if i < n {
            &state.sim.column(i) + &state.sim.column(n)
        } else {
            state.sim.column(n).to_owned()
        };
        filter.save(
            x.view(),
            state.fval[i],
            state.cval[i],
            state.conmat.column(i),
            ctol,
            cweight,
        );
    }
    filter.len()
}
