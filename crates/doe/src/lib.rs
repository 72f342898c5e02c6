/*!
This library implements the experimental-design layer of a surrogate modeling
toolbox: [Latin Hypercube sampling](https://en.wikipedia.org/wiki/Latin_hypercube_sampling)
designs with selectable optimality criteria, together with the parameter
space used to map unit-hypercube designs into the true domain of each
random variable.

A design is an `(n, dim)` matrix of samples where each of the `dim` columns
samples every one of its `n` strata exactly once. The initial design can be
improved with one of the supported criteria: minimum rank correlation,
maximin distance (through the Morris-Mitchell PhiP score) or the Enhanced
Stochastic Evolutionary algorithm ([Ese]).

Example:
```
use polychaos_doe::{LhsKind, Parameter, ParameterSpace};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// Two random variables on [-pi, pi], one deterministic constant.
let space = ParameterSpace::new()
    .add("x1", Parameter::Beta { shape: (1., 1.), limits: (-3.14, 3.14) }).unwrap()
    .add("x2", Parameter::Beta { shape: (1., 1.), limits: (-3.14, 3.14) }).unwrap()
    .add("a", Parameter::Deterministic(7.)).unwrap();

// Ten samples, ESE-optimized, mapped into the true domain.
let rng = Xoshiro256Plus::seed_from_u64(42);
let design = space.lhs_design(10, LhsKind::Optimized, rng).unwrap();
assert_eq!(design.dim(), (10, 2));
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod criteria;
mod errors;
mod ese;
mod lhs;
mod params;

pub use criteria::*;
pub use errors::*;
pub use ese::*;
pub use lhs::*;
pub use params::*;
