//! Bounded, best-effort logs of every evaluation.

use ndarray::{Array1, Array2};

/// Circular history of `(x, f, cstrv, constr)` across all evaluations.
///
/// Capacity is fixed at construction and independent of the problem size;
/// zero capacity disables recording entirely. Once full, the oldest record
/// is overwritten first, so the history always holds the most recent
/// `capacity` evaluations.
#[derive(Debug, Clone)]
pub struct History {
    cap: usize,
    total: usize,
    head: usize,
    x: Vec<Array1<f64>>,
    f: Vec<f64>,
    cstrv: Vec<f64>,
    constr: Vec<Array1<f64>>,
}

impl History {
    pub fn new(cap: usize) -> History {
        History {
            cap,
            total: 0,
            head: 0,
            x: Vec::new(),
            f: Vec::new(),
            cstrv: Vec::new(),
            constr: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.f.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f.is_empty()
    }

    /// Total number of evaluations offered, including any already
    /// overwritten or dropped.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Best-effort record of one evaluation.
    pub fn record(&mut self, x: &Array1<f64>, f: f64, cstrv: f64, constr: &Array1<f64>) {
        self.total += 1;
        if self.cap == 0 {
            return;
        }
        if self.f.len() < self.cap {
            self.x.push(x.clone());
            self.f.push(f);
            self.cstrv.push(cstrv);
            self.constr.push(constr.clone());
        } else {
            self.x[self.head].assign(x);
            self.f[self.head] = f;
            self.cstrv[self.head] = cstrv;
            self.constr[self.head].assign(constr);
        }
        self.head = (self.head + 1) % self.cap;
    }

    /// Export the kept records in chronological order as
    /// `(xhist, fhist, chist, conhist)`, with one column of `xhist` (n x k)
    /// and `conhist` (m x k) per record.
    pub fn export(&self) -> (Array2<f64>, Array1<f64>, Array1<f64>, Array2<f64>) {
        let k = self.f.len();
        if k == 0 {
            return (
                Array2::zeros((0, 0)),
                Array1::zeros(0),
                Array1::zeros(0),
                Array2::zeros((0, 0)),
            );
        }
        let n = self.x[0].len();
        let m = self.constr[0].len();
        let mut xhist = Array2::zeros((n, k));
        let mut fhist = Array1::zeros(k);
        let mut chist = Array1::zeros(k);
        let mut conhist = Array2::zeros((m, k));
        for out in 0..k {
            // Once full, `head` points at the oldest record.
            let idx = (self.head + out) % k;
            xhist.column_mut(out).assign(&self.x[idx]);
            fhist[out] = self.f[idx];
            chist[out] = self.cstrv[idx];
            conhist.column_mut(out).assign(&self.constr[idx]);
        }
        (xhist, fhist, chist, conhist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn record_scalar(h: &mut History, v: f64) {
        h.record(&array![v], v, 0.0, &array![-v]);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut h = History::new(0);
        record_scalar(&mut h, 1.0);
        assert_eq!(h.len(), 0);
        assert_eq!(h.total(), 1);
        assert_eq!(h.export().1.len(), 0);
    }

    #[test]
    fn keeps_the_most_recent_records() {
        let mut h = History::new(2);
        record_scalar(&mut h, 1.0);
        record_scalar(&mut h, 2.0);
        record_scalar(&mut h, 3.0);
        assert_eq!(h.len(), 2);
        assert_eq!(h.total(), 3);
        let (xhist, fhist, chist, conhist) = h.export();
        assert_eq!(fhist, array![2.0, 3.0]);
        assert_eq!(chist, array![0.0, 0.0]);
        assert_eq!(xhist, array![[2.0, 3.0]]);
        assert_eq!(conhist, array![[-2.0, -3.0]]);
    }

    #[test]
    fn chronological_order_below_capacity() {
        let mut h = History::new(8);
        for v in [4.0, 1.0, 3.0] {
            record_scalar(&mut h, v);
        }
        let (_, fhist, _, _) = h.export();
        assert_eq!(fhist, array![4.0, 1.0, 3.0]);
    }
}
