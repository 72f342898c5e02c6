use std::str::FromStr;

use log::debug;
use ndarray::{Array2, Axis};
use polychaos_doe::ParameterSpace;
use rayon::prelude::*;
use serde_json::Value;

use crate::errors::{ComputeError, Result};
use crate::model::{Model, SimResult};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// How a batch of sample points is dispatched to the model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum EvalMode {
    /// whole coordinate arrays are passed to the model in a single call
    Vectorized,
    /// the model is called once per sample row, in row order
    Serial,
    /// rows are fanned out over a bounded worker pool, one call per row
    Parallel,
}

impl FromStr for EvalMode {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vectorized" => Ok(EvalMode::Vectorized),
            "serial" => Ok(EvalMode::Serial),
            "parallel" => Ok(EvalMode::Parallel),
            other => Err(ComputeError::InvalidConfig(format!(
                "unknown evaluation mode: {other} (expected vectorized, serial or parallel)"
            ))),
        }
    }
}

/// Dispatches model evaluations over a batch of sample points.
///
/// All three modes produce the same result for a deterministic model, row
/// `i` of the output always corresponds to row `i` of the input design. In
/// parallel mode the first failing task aborts the batch and is surfaced as
/// [ComputeError::WorkerFailure]; partial results are never returned.
#[derive(Clone, Copy, Debug)]
pub struct Evaluator {
    mode: EvalMode,
    n_workers: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new(EvalMode::Vectorized)
    }
}

impl Evaluator {
    /// Builds an evaluator for the given execution mode
    pub fn new(mode: EvalMode) -> Self {
        Evaluator { mode, n_workers: 4 }
    }

    /// Sets the worker pool size used in parallel mode
    pub fn workers(mut self, n_workers: usize) -> Result<Self> {
        if n_workers == 0 {
            return Err(ComputeError::InvalidConfig(
                "worker_count must be at least 1".to_string(),
            ));
        }
        self.n_workers = n_workers;
        Ok(self)
    }

    /// Evaluates the model over a `(n, dim)` true-domain design, expanding
    /// deterministic parameters into the model inputs.
    pub fn evaluate(
        &self,
        model: &dyn Model,
        space: &ParameterSpace,
        design: &Array2<f64>,
    ) -> Result<SimResult> {
        let coords = space.expand(design)?;
        self.evaluate_coords(model, &coords)
    }

    /// Evaluates the model over already expanded `(n, n_params)` coordinates
    pub fn evaluate_coords(&self, model: &dyn Model, coords: &Array2<f64>) -> Result<SimResult> {
        let n = coords.nrows();
        if n == 0 {
            return Ok(SimResult::new(Array2::zeros((0, model.n_out()))));
        }
        debug!("evaluating {n} samples in {:?} mode", self.mode);
        match self.mode {
            EvalMode::Vectorized => {
                let res = model.simulate(&coords.view())?;
                if res.y.nrows() != n {
                    return Err(ComputeError::ModeMismatch {
                        expected: n,
                        actual: res.y.nrows(),
                    });
                }
                Ok(res)
            }
            EvalMode::Serial => {
                let mut rows = Vec::with_capacity(n);
                for i in 0..n {
                    rows.push(eval_row(model, coords, i)?);
                }
                Ok(assemble(rows, model.n_out()))
            }
            EvalMode::Parallel => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(self.n_workers)
                    .build()?;
                let rows = pool.install(|| {
                    (0..n)
                        .into_par_iter()
                        .map(|i| {
                            eval_row(model, coords, i).map_err(|e| match e {
                                e @ ComputeError::ModeMismatch { .. } => e,
                                other => ComputeError::WorkerFailure {
                                    row: i,
                                    source: Box::new(other),
                                },
                            })
                        })
                        .collect::<Result<Vec<_>>>()
                })?;
                Ok(assemble(rows, model.n_out()))
            }
        }
    }
}

/// Evaluates a single sample row, returning its output row and auxiliary data
fn eval_row(
    model: &dyn Model,
    coords: &Array2<f64>,
    i: usize,
) -> Result<(Vec<f64>, Option<Value>)> {
    let x = coords.row(i).insert_axis(Axis(0));
    let res = model.simulate(&x)?;
    if res.y.nrows() != 1 {
        return Err(ComputeError::ModeMismatch {
            expected: 1,
            actual: res.y.nrows(),
        });
    }
    let aux = res
        .aux
        .and_then(|mut v| if v.is_empty() { None } else { Some(v.remove(0)) });
    Ok((res.y.row(0).to_vec(), aux))
}

/// Reassembles per-row outputs into a single result, row order preserved.
/// Auxiliary data is kept only when every row reported some.
fn assemble(rows: Vec<(Vec<f64>, Option<Value>)>, n_out: usize) -> SimResult {
    let n = rows.len();
    let mut y = Array2::zeros((n, n_out));
    let mut aux = Vec::with_capacity(n);
    for (i, (row, a)) in rows.into_iter().enumerate() {
        for (o, v) in row.into_iter().enumerate().take(n_out) {
            y[[i, o]] = v;
        }
        aux.push(a);
    }
    let aux = aux.into_iter().collect::<Option<Vec<_>>>();
    SimResult { y, aux }
}
