use thiserror::Error;

/// A result type for design of experiments errors
pub type Result<T> = std::result::Result<T, DoeError>;

/// An error raised during design construction or evaluation
#[derive(Error, Debug)]
pub enum DoeError {
    /// When a design is requested over a zero or inconsistent dimension
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    /// When an optimization criterion name is not recognized
    #[error("Unknown criterion: {0} (expected one of none, corr, maximin, ese)")]
    UnknownCriterion(String),
    /// When an error is due to a bad value
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// When an underlying probability distribution cannot be built
    #[error("Distribution error: {0}")]
    DistributionError(#[from] statrs::StatsError),
}
