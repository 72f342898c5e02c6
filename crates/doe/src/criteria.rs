use linfa::Float;
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};

use crate::errors::{DoeError, Result};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Minkowski exponent used for inter-point distances, restricted to the
/// two norms meaningful for space-filling designs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum DistanceNorm {
    /// Manhattan distance (t = 1)
    L1,
    /// Euclidean distance (t = 2)
    L2,
}

impl DistanceNorm {
    /// Builds the norm from its integer exponent `t in {1, 2}`
    pub fn from_exponent(t: u32) -> Result<Self> {
        match t {
            1 => Ok(DistanceNorm::L1),
            2 => Ok(DistanceNorm::L2),
            _ => Err(DoeError::InvalidValue(format!(
                "distance exponent must be 1 or 2, got {t}"
            ))),
        }
    }

    /// Contribution of a single coordinate difference to the distance
    /// raised to the exponent t
    pub(crate) fn coord_pow<F: Float>(&self, v: F) -> F {
        match self {
            DistanceNorm::L1 => v.abs(),
            DistanceNorm::L2 => v * v,
        }
    }

    /// t-th root restoring a distance from its t-power
    pub(crate) fn root<F: Float>(&self, v: F) -> F {
        match self {
            DistanceNorm::L1 => v,
            DistanceNorm::L2 => v.sqrt(),
        }
    }

    pub(crate) fn exponent<F: Float>(&self) -> F {
        match self {
            DistanceNorm::L1 => F::one(),
            DistanceNorm::L2 => F::cast(2.),
        }
    }
}

/// Sum over coordinates of the rows distance raised to the exponent t
pub(crate) fn dist_pow<F: Float>(a: &ArrayView1<F>, b: &ArrayView1<F>, norm: DistanceNorm) -> F {
    a.iter()
        .zip(b.iter())
        .fold(F::zero(), |acc, (&x, &y)| acc + norm.coord_pow(x - y))
}

/// Morris-Mitchell PhiP space-filling criterion of a design.
///
/// `PhiP = (sum over row pairs of d_ij^-p)^(1/p)` with `d_ij` the Minkowski
/// distance of rows i and j. The lower the value the better the design
/// spreads over the hypercube; large `p` approximates the maximin criterion.
/// Runs in O(n^2 * dim), the design is not modified. Designs with less than
/// two rows score zero.
pub fn phip<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>, norm: DistanceNorm, p: i32) -> F {
    let n = x.nrows();
    let fp = F::cast(p as f64);
    let mut acc = F::zero();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = norm.root(dist_pow(&x.row(i), &x.row(j), norm));
            acc = acc + F::powf(d, -fp);
        }
    }
    F::powf(acc, F::one() / fp)
}

/// Converts a column to 1-based ranks.
///
/// Values of an LHS column are distinct by construction so ties are
/// resolved by position.
fn ranks<F: Float>(col: &ArrayView1<F>) -> Array1<F> {
    let mut order: Vec<usize> = (0..col.len()).collect();
    order.sort_by(|&a, &b| col[a].partial_cmp(&col[b]).unwrap());
    let mut r = Array1::zeros(col.len());
    for (rank, &i) in order.iter().enumerate() {
        r[i] = F::cast((rank + 1) as f64);
    }
    r
}

fn pearson<F: Float>(a: &Array1<F>, b: &Array1<F>) -> F {
    let n = F::cast(a.len() as f64);
    let ma = a.sum() / n;
    let mb = b.sum() / n;
    let mut cov = F::zero();
    let mut va = F::zero();
    let mut vb = F::zero();
    for (&x, &y) in a.iter().zip(b.iter()) {
        cov = cov + (x - ma) * (y - mb);
        va = va + (x - ma) * (x - ma);
        vb = vb + (y - mb) * (y - mb);
    }
    let denom = (va * vb).sqrt();
    if denom == F::zero() {
        F::zero()
    } else {
        cov / denom
    }
}

/// Signed Spearman rank correlation of two columns.
///
/// Returns 0 for columns with less than two entries.
pub fn spearman<F: Float>(a: &ArrayView1<F>, b: &ArrayView1<F>) -> F {
    if a.len() < 2 {
        return F::zero();
    }
    pearson(&ranks(a), &ranks(b))
}

/// Correlation criterion of a design: the largest absolute pairwise
/// Spearman coefficient over all column pairs. Zero is ideal
/// (perfectly uncorrelated columns).
pub fn corr_score<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> F {
    let d = x.ncols();
    let mut worst = F::zero();
    for i in 0..d {
        for j in (i + 1)..d {
            let r = spearman(&x.column(i), &x.column(j)).abs();
            if r > worst {
                worst = r;
            }
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_phip_two_points_l2() {
        // single pair at distance sqrt(2): PhiP = (d^-2)^(1/2) = 1/d
        let x = array![[0., 0.], [1., 1.]];
        let expected = 1. / 2f64.sqrt();
        assert_abs_diff_eq!(phip(&x, DistanceNorm::L2, 2), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_phip_two_points_l1() {
        // single pair at Manhattan distance 2: PhiP = 1/2 for p = 1
        let x = array![[0., 0.], [1., 1.]];
        assert_abs_diff_eq!(phip(&x, DistanceNorm::L1, 1), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_phip_degenerate_designs() {
        let empty = ndarray::Array2::<f64>::zeros((0, 3));
        assert_abs_diff_eq!(phip(&empty, DistanceNorm::L2, 10), 0., epsilon = 1e-12);
        let single = array![[0.3, 0.7]];
        assert_abs_diff_eq!(phip(&single, DistanceNorm::L2, 10), 0., epsilon = 1e-12);
    }

    #[test]
    fn test_spearman_anticorrelated_pair() {
        // ranks [1, 2] against [2, 1]
        let x = array![[0.1, 0.9], [0.6, 0.4]];
        let r = spearman(&x.column(0), &x.column(1));
        assert_abs_diff_eq!(r, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spearman_monotone_is_one() {
        let a = array![0.1, 0.5, 0.7, 0.9];
        let b = array![1., 2., 30., 400.];
        assert_abs_diff_eq!(spearman(&a.view(), &b.view()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_corr_score_aggregates_worst_pair() {
        let x: ndarray::Array2<f64> = array![[0.1, 0.9, 0.2], [0.6, 0.4, 0.3], [0.8, 0.1, 0.9]];
        let s = corr_score(&x);
        let worst = spearman(&x.column(0), &x.column(1)).abs();
        assert_abs_diff_eq!(s, worst, epsilon = 1e-12);
    }

    #[test]
    fn test_distance_norm_from_exponent() {
        assert_eq!(DistanceNorm::from_exponent(1).unwrap(), DistanceNorm::L1);
        assert_eq!(DistanceNorm::from_exponent(2).unwrap(), DistanceNorm::L2);
        assert!(DistanceNorm::from_exponent(3).is_err());
    }
}
