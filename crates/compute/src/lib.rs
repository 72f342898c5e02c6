//! Model evaluation layer for gradient-enhanced polynomial chaos workflows.
//!
//! This crate runs user models over design matrices produced by
//! [`polychaos_doe`] and augments the results with derivative information:
//!
//! * [`Model`] is the trait a simulation implements, vectorized over sample
//!   batches, with an optional closed-form derivative rule.
//! * [`Evaluator`] dispatches a batch in vectorized, serial or thread-pooled
//!   parallel mode with identical results.
//! * [`GradientEngine`] produces the `(n, n_out, dim)` derivative array,
//!   either analytically or through batched finite differences, scaled
//!   to standardized coordinates.
//!
//! ```
//! use polychaos_compute::{Evaluator, GradientEngine, GradientMode, Ishigami};
//! use polychaos_doe::LhsKind;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//!
//! let space = Ishigami::space();
//! let rng = Xoshiro256Plus::seed_from_u64(42);
//! let design = space.lhs_design(16, LhsKind::Maximin, rng).unwrap();
//!
//! let results = Evaluator::default().evaluate(&Ishigami, &space, &design).unwrap();
//! let grads = GradientEngine::new(&space, GradientMode::Analytic)
//!     .gradient(&Ishigami, &design, &results.y)
//!     .unwrap();
//! assert_eq!(grads.dim(), (16, 1, 3));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

mod errors;
mod evaluator;
mod functions;
mod gradient;
mod model;

pub use errors::{ComputeError, Result};
pub use evaluator::{EvalMode, Evaluator};
pub use functions::Ishigami;
pub use gradient::{DiffScheme, FdStep, GradientEngine, GradientMode};
pub use model::{Model, SimResult};
