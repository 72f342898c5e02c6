use thiserror::Error;

/// A result type for evaluation and gradient computation errors
pub type Result<T> = std::result::Result<T, ComputeError>;

/// An error raised during model evaluation or gradient computation
#[derive(Error, Debug)]
pub enum ComputeError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// When analytic gradients are requested for a parameter set the model
    /// has no closed-form rule for
    #[error("Unsupported parameter kind: {0}")]
    UnsupportedParameterKind(String),
    /// When a parallel evaluation task fails during model execution.
    /// Remaining work is abandoned, partial results are never returned.
    #[error("Worker failure at row {row}: {source}")]
    WorkerFailure {
        /// Index of the sample row whose evaluation failed
        row: usize,
        /// Underlying model error
        source: Box<ComputeError>,
    },
    /// When a model returns an output shape inconsistent with its input
    #[error("Mode mismatch: model returned {actual} output rows for {expected} input rows")]
    ModeMismatch {
        /// Number of input rows submitted to the model
        expected: usize,
        /// Number of output rows the model produced
        actual: usize,
    },
    /// When the model itself fails to evaluate
    #[error("Model error: {0}")]
    ModelError(String),
    /// When a design or parameter space operation fails
    #[error(transparent)]
    DoeError(#[from] polychaos_doe::DoeError),
    /// When the evaluation worker pool cannot be built
    #[error("Worker pool error: {0}")]
    PoolError(#[from] rayon::ThreadPoolBuildError),
}
