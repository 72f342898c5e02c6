use ndarray::{Array2, Array3, ArrayView2};
use serde_json::Value;

use crate::errors::Result;

/// Quantity-of-interest values of an evaluation batch.
///
/// Row `i` corresponds to sample row `i` of the submitted coordinates,
/// whatever the execution mode. `aux` optionally carries one record of
/// model-specific data per row.
#[derive(Clone, Debug)]
pub struct SimResult {
    /// `(n, n_out)` quantity-of-interest values
    pub y: Array2<f64>,
    /// Optional per-row auxiliary data
    pub aux: Option<Vec<Value>>,
}

impl SimResult {
    /// Wraps plain output values without auxiliary data
    pub fn new(y: Array2<f64>) -> Self {
        SimResult { y, aux: None }
    }
}

/// A black-box model under parametric uncertainty.
///
/// `simulate` receives a `(n, n_params)` coordinate array whose columns
/// follow the parameter declaration order of the owning
/// [`ParameterSpace`](polychaos_doe::ParameterSpace), deterministic
/// parameters included, and returns one output row per input row.
/// Implementations must be able to handle any number of rows in one call;
/// the execution mode of the [`Evaluator`](crate::Evaluator) decides whether
/// they actually see the whole batch or one row at a time.
pub trait Model: Send + Sync {
    /// Number of quantity-of-interest outputs per sample
    fn n_out(&self) -> usize {
        1
    }

    /// Evaluates the model at the given coordinates
    fn simulate(&self, x: &ArrayView2<f64>) -> Result<SimResult>;

    /// Closed-form partial derivatives `dy/dx` of shape
    /// `(n, n_out, n_params)`, when the model has them.
    ///
    /// The default is `None`: gradients of such models can only be obtained
    /// by explicitly requesting finite differences.
    fn partials(&self, _x: &ArrayView2<f64>) -> Option<Array3<f64>> {
        None
    }
}
