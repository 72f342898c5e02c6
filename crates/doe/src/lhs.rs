use std::cmp;
use std::marker::PhantomData;
use std::str::FromStr;

use linfa::Float;
use ndarray::{Array, Array1, Array2};
use ndarray_stats::QuantileExt;
use ndarray_rand::{
    rand::seq::SliceRandom, rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt,
};
use rand_xoshiro::Xoshiro256Plus;

use crate::criteria::{corr_score, phip, DistanceNorm};
use crate::errors::{DoeError, Result};
use crate::ese::Ese;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Number of candidate designs drawn when minimizing the correlation score
const CORR_CANDIDATES: usize = 100;
/// Number of candidate designs drawn when minimizing the PhiP score
const MAXIMIN_CANDIDATES: usize = 20;

/// Kinds of Latin Hypercube design, one per supported optimization criterion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsKind {
    /// plain stratified sampling, no optimization
    Classic,
    /// best design out of a batch of candidates by rank correlation score
    Correlation,
    /// best design out of a batch of candidates by PhiP score
    Maximin,
    /// design refined by the Enhanced Stochastic Evolutionary algorithm ([Ese])
    Optimized,
}

impl FromStr for LhsKind {
    type Err = DoeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" | "classic" => Ok(LhsKind::Classic),
            "corr" => Ok(LhsKind::Correlation),
            "maximin" => Ok(LhsKind::Maximin),
            "ese" => Ok(LhsKind::Optimized),
            other => Err(DoeError::UnknownCriterion(other.to_string())),
        }
    }
}

/// Latin Hypercube sampling over the unit hypercube `[0, 1)^dim`.
///
/// Each dimension is divided into `n` strata and every stratum is sampled
/// exactly once per dimension: for each column a random permutation π of
/// `{0, .., n-1}` assigns a stratum to every row and the cell value is
/// `(π[i] + u) / n` with an independent uniform jitter `u in [0, 1)` drawn
/// per cell. The per-cell jitter keeps values strictly below 1 so that
/// inverse CDF mappings of unbounded distributions stay finite.
///
/// The resulting design can be left as is ([LhsKind::Classic]) or improved
/// by one of the selection criteria (see [LhsKind]).
///
/// ```
/// use polychaos_doe::{Lhs, LhsKind};
/// use ndarray_rand::rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256Plus;
///
/// let design = Lhs::<f64, _>::new(3)
///     .unwrap()
///     .kind(LhsKind::Classic)
///     .with_rng(Xoshiro256Plus::seed_from_u64(42))
///     .sample(10);
/// assert_eq!(design.dim(), (10, 3));
/// ```
pub struct Lhs<F: Float, R: Rng + Clone> {
    /// Number of sampling dimensions
    dim: usize,
    /// The requested kind of LHS
    kind: LhsKind,
    /// Random generator used for reproducibility
    rng: R,
    phantom: PhantomData<F>,
}

/// LHS with default random generator
impl<F: Float> Lhs<F, Xoshiro256Plus> {
    /// Constructor given the dimension of the sample space.
    ///
    /// Fails with [DoeError::InvalidDimension] when `dim` is zero.
    pub fn new(dim: usize) -> Result<Self> {
        Self::new_with_rng(dim, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> Lhs<F, R> {
    /// Constructor with given dimension and random generator
    pub fn new_with_rng(dim: usize, rng: R) -> Result<Self> {
        if dim == 0 {
            return Err(DoeError::InvalidDimension(
                "cannot build a design over zero dimensions".to_string(),
            ));
        }
        Ok(Lhs {
            dim,
            kind: LhsKind::Optimized,
            rng,
            phantom: PhantomData,
        })
    }

    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Lhs<F, R2> {
        Lhs {
            dim: self.dim,
            kind: self.kind,
            rng,
            phantom: PhantomData,
        }
    }

    /// Generates a `(n, dim)` design in the unit hypercube.
    ///
    /// `n = 0` yields an empty design with the configured dimension.
    pub fn sample(&self, n: usize) -> Array2<F> {
        let mut rng = self.rng.clone();
        if n == 0 {
            return Array2::zeros((0, self.dim));
        }
        match self.kind {
            LhsKind::Classic => self.classic_lhs(n, &mut rng),
            LhsKind::Correlation => {
                self.best_candidate(n, CORR_CANDIDATES, &mut rng, |x| corr_score(x))
            }
            LhsKind::Maximin => self.best_candidate(n, MAXIMIN_CANDIDATES, &mut rng, |x| {
                phip(x, DistanceNorm::L2, 10)
            }),
            LhsKind::Optimized => {
                let doe = self.classic_lhs(n, &mut rng);
                let outer = cmp::min((1.5 * self.dim as f64) as usize, 30);
                let inner = cmp::min(20 * self.dim, 100);
                let (best, _) = Ese::new(outer, inner).optimize(&doe, &mut rng);
                best
            }
        }
    }

    fn classic_lhs(&self, n: usize, rng: &mut R) -> Array2<F> {
        let rnd = Array::random_using((n, self.dim), Uniform::new(0., 1.), rng);
        let mut lhs = Array2::zeros((n, self.dim));
        for j in 0..self.dim {
            let mut perm: Vec<usize> = (0..n).collect();
            perm.as_mut_slice().shuffle(rng);
            for i in 0..n {
                lhs[[i, j]] = F::cast((perm[i] as f64 + rnd[[i, j]]) / n as f64);
            }
        }
        lhs
    }

    /// Draws `n_candidates` independent classic designs and keeps the one
    /// minimizing the given score
    fn best_candidate(
        &self,
        n: usize,
        n_candidates: usize,
        rng: &mut R,
        score: impl Fn(&Array2<F>) -> F,
    ) -> Array2<F> {
        let mut candidates: Vec<Array2<F>> = (0..n_candidates)
            .map(|_| self.classic_lhs(n, rng))
            .collect();
        let scores: Array1<F> = candidates.iter().map(&score).collect();
        let k = scores.argmin().unwrap();
        candidates.swap_remove(k)
    }
}
