use log::debug;
use ndarray::{Array2, Array3};
use polychaos_doe::ParameterSpace;

use crate::errors::{ComputeError, Result};
use crate::evaluator::Evaluator;
use crate::model::Model;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Finite-difference stencil
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum DiffScheme {
    /// One extra evaluation per dimension, first-order accurate
    #[default]
    Forward,
    /// Two extra evaluations per dimension, second-order accurate
    Central,
}

/// Finite-difference step size policy
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum FdStep {
    /// Fixed step in true-domain units
    Absolute(f64),
    /// Step proportional to the coordinate magnitude, falling back to the
    /// raw factor at zero
    Relative(f64),
}

impl Default for FdStep {
    fn default() -> Self {
        FdStep::Absolute(1e-6)
    }
}

impl FdStep {
    fn at(&self, x: f64) -> f64 {
        match self {
            FdStep::Absolute(h) => *h,
            FdStep::Relative(r) => {
                if x == 0. {
                    *r
                } else {
                    r * x.abs()
                }
            }
        }
    }

    fn factor(&self) -> f64 {
        match self {
            FdStep::Absolute(h) => *h,
            FdStep::Relative(r) => *r,
        }
    }
}

/// How partial derivatives are obtained
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum GradientMode {
    /// Closed-form derivative rules of the model ([Model::partials]).
    /// Fails when the model has none, there is no silent fallback.
    Analytic,
    /// Derivatives estimated by perturbing each random dimension
    FiniteDifference {
        /// Step size policy
        step: FdStep,
        /// Differencing stencil
        scheme: DiffScheme,
    },
}

impl Default for GradientMode {
    fn default() -> Self {
        GradientMode::FiniteDifference {
            step: FdStep::default(),
            scheme: DiffScheme::default(),
        }
    }
}

/// Produces the per-sample, per-output, per-dimension derivative array that
/// gradient-enhances the surrogate regression system.
///
/// Derivatives are expressed in the standardized coordinate of each random
/// variable: the raw derivative `dy/dx_k` is scaled by the distribution
/// specific coefficient [`Parameter::grad_coef`](polychaos_doe::Parameter::grad_coef).
/// The output shape is `(n_grid, n_out, dim)` in both modes, covering random
/// dimensions only.
pub struct GradientEngine<'a> {
    space: &'a ParameterSpace,
    mode: GradientMode,
    evaluator: Evaluator,
}

impl<'a> GradientEngine<'a> {
    /// Builds a gradient engine over the given parameter space
    pub fn new(space: &'a ParameterSpace, mode: GradientMode) -> Self {
        GradientEngine {
            space,
            mode,
            evaluator: Evaluator::default(),
        }
    }

    /// Sets the evaluator used for finite-difference re-evaluations
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Computes the gradient array at every row of a `(n, dim)` true-domain
    /// design, given the already computed model outputs `values` of shape
    /// `(n, n_out)`.
    ///
    /// In finite-difference mode every perturbed point of the whole batch is
    /// submitted to the evaluator in a single call: `n * dim` extra model
    /// evaluations forward, `2 * n * dim` central.
    pub fn gradient(
        &self,
        model: &dyn Model,
        design: &Array2<f64>,
        values: &Array2<f64>,
    ) -> Result<Array3<f64>> {
        let n = design.nrows();
        let n_out = model.n_out();
        if design.ncols() != self.space.dim() {
            return Err(ComputeError::InvalidConfig(format!(
                "design has {} columns, parameter space has {} random parameters",
                design.ncols(),
                self.space.dim()
            )));
        }
        if values.nrows() != n || values.ncols() != n_out {
            return Err(ComputeError::InvalidConfig(format!(
                "values shape {:?} does not match {} samples with {} outputs",
                values.dim(),
                n,
                n_out
            )));
        }
        match self.mode {
            GradientMode::Analytic => self.analytic(model, design),
            GradientMode::FiniteDifference { step, scheme } => {
                if step.factor() <= 0. {
                    return Err(ComputeError::InvalidConfig(
                        "finite_difference_step must be > 0".to_string(),
                    ));
                }
                self.finite_difference(model, design, values, step, scheme)
            }
        }
    }

    fn analytic(&self, model: &dyn Model, design: &Array2<f64>) -> Result<Array3<f64>> {
        let n = design.nrows();
        let n_out = model.n_out();
        let dim = self.space.dim();
        let coords = self.space.expand(design)?;
        let partials = model.partials(&coords.view()).ok_or_else(|| {
            ComputeError::UnsupportedParameterKind(
                "model exposes no closed-form derivative rule for its parameters; \
                 finite-difference mode must be requested explicitly"
                    .to_string(),
            )
        })?;
        if partials.dim() != (n, n_out, self.space.len()) {
            return Err(ComputeError::InvalidConfig(format!(
                "model partials have shape {:?}, expected ({}, {}, {})",
                partials.dim(),
                n,
                n_out,
                self.space.len()
            )));
        }
        let coefs = self.space.grad_coefs();
        let indices = self.space.random_indices();
        let mut grad = Array3::zeros((n, n_out, dim));
        for (k, &jk) in indices.iter().enumerate() {
            for i in 0..n {
                for o in 0..n_out {
                    grad[[i, o, k]] = coefs[k] * partials[[i, o, jk]];
                }
            }
        }
        Ok(grad)
    }

    fn finite_difference(
        &self,
        model: &dyn Model,
        design: &Array2<f64>,
        values: &Array2<f64>,
        step: FdStep,
        scheme: DiffScheme,
    ) -> Result<Array3<f64>> {
        let n = design.nrows();
        let n_out = model.n_out();
        let dim = self.space.dim();
        let coefs = self.space.grad_coefs();
        let mut grad = Array3::zeros((n, n_out, dim));
        if n == 0 {
            return Ok(grad);
        }

        let points_per_sample = match scheme {
            DiffScheme::Forward => dim,
            DiffScheme::Central => 2 * dim,
        };
        debug!(
            "finite differences over {n} samples: {} extra evaluations",
            n * points_per_sample
        );

        // one perturbed design row per (sample, dimension, stencil point),
        // batched into a single evaluator call
        let mut batch = Array2::zeros((n * points_per_sample, dim));
        let mut steps = Array2::zeros((n, dim));
        for i in 0..n {
            for k in 0..dim {
                let h = step.at(design[[i, k]]);
                steps[[i, k]] = h;
                match scheme {
                    DiffScheme::Forward => {
                        let r = i * dim + k;
                        batch.row_mut(r).assign(&design.row(i));
                        batch[[r, k]] += h;
                    }
                    DiffScheme::Central => {
                        let r = 2 * (i * dim + k);
                        batch.row_mut(r).assign(&design.row(i));
                        batch[[r, k]] += h;
                        batch.row_mut(r + 1).assign(&design.row(i));
                        batch[[r + 1, k]] -= h;
                    }
                }
            }
        }
        let perturbed = self.evaluator.evaluate(model, self.space, &batch)?.y;

        for i in 0..n {
            for k in 0..dim {
                let h = steps[[i, k]];
                for o in 0..n_out {
                    let d = match scheme {
                        DiffScheme::Forward => {
                            (perturbed[[i * dim + k, o]] - values[[i, o]]) / h
                        }
                        DiffScheme::Central => {
                            let r = 2 * (i * dim + k);
                            (perturbed[[r, o]] - perturbed[[r + 1, o]]) / (2. * h)
                        }
                    };
                    grad[[i, o, k]] = coefs[k] * d;
                }
            }
        }
        Ok(grad)
    }
}
