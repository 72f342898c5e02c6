use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand::Rng;
use statrs::distribution::{Beta, ContinuousCDF, Gamma, Normal};

use crate::errors::{DoeError, Result};
use crate::lhs::{Lhs, LhsKind};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A single model parameter, either fixed to a constant or distributed
/// as one of the supported random variable kinds.
///
/// Random kinds carry the parameterization used to map unit-hypercube
/// samples into the true domain through the inverse CDF.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Parameter {
    /// Constant parameter, excluded from the sampling dimensions
    Deterministic(f64),
    /// Beta distributed variable over `[limits.0, limits.1]` with shape parameters `(p, q)`
    Beta {
        /// Shape parameters (p, q) of the beta pdf
        shape: (f64, f64),
        /// Lower and upper bound of the variable domain
        limits: (f64, f64),
    },
    /// Normally distributed variable
    Normal {
        /// Mean of the pdf
        mean: f64,
        /// Standard deviation of the pdf
        std_dev: f64,
    },
    /// Gamma distributed variable with given shape and rate, shifted by `loc`
    Gamma {
        /// Shape parameter of the gamma pdf
        shape: f64,
        /// Rate parameter of the gamma pdf
        rate: f64,
        /// Location shift of the variable domain
        loc: f64,
    },
}

impl Parameter {
    /// Returns true if the parameter occupies a sampling dimension
    pub fn is_random(&self) -> bool {
        !matches!(self, Parameter::Deterministic(_))
    }

    /// Scale coefficient relating a derivative in the true domain to the
    /// derivative in the standardized coordinate of the variable.
    ///
    /// Deterministic parameters have zero sensitivity and never occupy a
    /// gradient dimension.
    pub fn grad_coef(&self) -> f64 {
        match self {
            Parameter::Deterministic(_) => 0.,
            Parameter::Beta { limits, .. } => 0.5 * (limits.1 - limits.0),
            Parameter::Normal { std_dev, .. } => *std_dev,
            Parameter::Gamma { rate, .. } => *rate,
        }
    }

    /// Maps a probability `u` in `[0, 1)` to the true domain of the variable
    /// through the inverse CDF. Fails on deterministic parameters.
    pub fn inv_cdf(&self, u: f64) -> Result<f64> {
        match self {
            Parameter::Deterministic(_) => Err(DoeError::InvalidValue(
                "inverse CDF is undefined for a deterministic parameter".to_string(),
            )),
            Parameter::Beta { shape, limits } => {
                let dist = Beta::new(shape.0, shape.1)?;
                Ok(limits.0 + (limits.1 - limits.0) * dist.inverse_cdf(u))
            }
            Parameter::Normal { mean, std_dev } => {
                let dist = Normal::new(*mean, *std_dev)?;
                Ok(dist.inverse_cdf(u))
            }
            Parameter::Gamma { shape, rate, loc } => {
                let dist = Gamma::new(*shape, *rate)?;
                Ok(loc + dist.inverse_cdf(u))
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Parameter::Deterministic(_) => "deterministic",
            Parameter::Beta { .. } => "beta",
            Parameter::Normal { .. } => "normal",
            Parameter::Gamma { .. } => "gamma",
        }
    }
}

/// An ordered collection of named parameters.
///
/// Insertion order is significant: it defines the column order of every
/// design matrix and coordinate array exchanged with the evaluation layer.
/// The sampling dimension [`ParameterSpace::dim`] counts random parameters
/// only, deterministic ones are reinserted as constants by
/// [`ParameterSpace::expand`].
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct ParameterSpace {
    params: Vec<(String, Parameter)>,
}

impl ParameterSpace {
    /// Creates an empty parameter space
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Appends a named parameter. Names have to be unique.
    pub fn add(mut self, name: impl Into<String>, param: Parameter) -> Result<Self> {
        let name = name.into();
        if self.params.iter().any(|(n, _)| *n == name) {
            return Err(DoeError::InvalidValue(format!(
                "duplicate parameter name: {name}"
            )));
        }
        self.params.push((name, param));
        Ok(self)
    }

    /// Total number of parameters, deterministic ones included
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameter was declared
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of sampling dimensions (random parameters only)
    pub fn dim(&self) -> usize {
        self.params.iter().filter(|(_, p)| p.is_random()).count()
    }

    /// Iterates over `(name, parameter)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.params.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Positions of the random parameters within the full parameter list
    pub fn random_indices(&self) -> Vec<usize> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, (_, p))| p.is_random())
            .map(|(i, _)| i)
            .collect()
    }

    /// Gradient scale coefficients of the random parameters, in column order
    pub fn grad_coefs(&self) -> Array1<f64> {
        self.params
            .iter()
            .filter(|(_, p)| p.is_random())
            .map(|(_, p)| p.grad_coef())
            .collect()
    }

    /// Maps a `(n, dim)` unit-hypercube design into the true domain,
    /// column by column through each random parameter inverse CDF.
    pub fn map_design(
        &self,
        design: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<Array2<f64>> {
        let dim = self.dim();
        if design.ncols() != dim {
            return Err(DoeError::InvalidDimension(format!(
                "design has {} columns, parameter space has {} random parameters",
                design.ncols(),
                dim
            )));
        }
        let mut mapped = Array2::zeros(design.raw_dim());
        let randoms: Vec<&Parameter> = self
            .params
            .iter()
            .filter(|(_, p)| p.is_random())
            .map(|(_, p)| p)
            .collect();
        for (j, param) in randoms.iter().enumerate() {
            for (i, &u) in design.column(j).iter().enumerate() {
                mapped[[i, j]] = param.inv_cdf(u)?;
            }
        }
        Ok(mapped)
    }

    /// Expands a `(n, dim)` true-domain design into the full `(n, len)`
    /// coordinate array expected by model evaluation, filling deterministic
    /// parameters with their constant value.
    pub fn expand(&self, design: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array2<f64>> {
        if design.ncols() != self.dim() {
            return Err(DoeError::InvalidDimension(format!(
                "design has {} columns, parameter space has {} random parameters",
                design.ncols(),
                self.dim()
            )));
        }
        let mut coords = Array2::zeros((design.nrows(), self.len()));
        let mut next_col = 0;
        for (j, (_, param)) in self.params.iter().enumerate() {
            match param {
                Parameter::Deterministic(value) => coords.column_mut(j).fill(*value),
                _ => {
                    coords.column_mut(j).assign(&design.column(next_col));
                    next_col += 1;
                }
            }
        }
        Ok(coords)
    }

    /// Draws `n` samples with the requested LHS criterion and maps them into
    /// the true parameter domain.
    pub fn lhs_design<R: Rng + Clone>(
        &self,
        n: usize,
        kind: LhsKind,
        rng: R,
    ) -> Result<Array2<f64>> {
        let design = Lhs::<f64, _>::new(self.dim())?
            .kind(kind)
            .with_rng(rng)
            .sample(n);
        self.map_design(&design)
    }

    /// Names of the declared parameters in order
    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Kind names of the declared parameters, mainly for diagnostics
    pub fn kinds(&self) -> Vec<&'static str> {
        self.params.iter().map(|(_, p)| p.kind_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_beta_grad_coef() {
        let param = Parameter::Beta {
            shape: (1., 1.),
            limits: (1.2, 2.),
        };
        assert_abs_diff_eq!(param.grad_coef(), 0.4, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_grad_coefs_per_kind() {
        let space = ParameterSpace::new()
            .add(
                "x1",
                Parameter::Normal {
                    mean: 0.,
                    std_dev: 2.5,
                },
            )
            .unwrap()
            .add("a", Parameter::Deterministic(7.))
            .unwrap()
            .add(
                "x2",
                Parameter::Gamma {
                    shape: 3.,
                    rate: 1.5,
                    loc: 0.,
                },
            )
            .unwrap();
        assert_eq!(space.dim(), 2);
        assert_abs_diff_eq!(space.grad_coefs(), array![2.5, 1.5], epsilon = 1e-12);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let res = ParameterSpace::new()
            .add("x1", Parameter::Deterministic(0.))
            .unwrap()
            .add("x1", Parameter::Deterministic(1.));
        assert!(matches!(res, Err(DoeError::InvalidValue(_))));
    }

    #[test]
    fn test_uniform_beta_maps_affinely() {
        // Beta(1, 1) is the uniform distribution: the mapping is affine
        let space = ParameterSpace::new()
            .add(
                "x1",
                Parameter::Beta {
                    shape: (1., 1.),
                    limits: (-2., 2.),
                },
            )
            .unwrap();
        let design = array![[0.25], [0.5], [0.75]];
        let mapped = space.map_design(&design).unwrap();
        assert_abs_diff_eq!(mapped, array![[-1.], [0.], [1.]], epsilon = 1e-9);
    }

    #[test]
    fn test_expand_reinserts_constants() {
        let space = ParameterSpace::new()
            .add(
                "x1",
                Parameter::Beta {
                    shape: (1., 1.),
                    limits: (0., 1.),
                },
            )
            .unwrap()
            .add("a", Parameter::Deterministic(7.))
            .unwrap()
            .add(
                "x2",
                Parameter::Normal {
                    mean: 0.,
                    std_dev: 1.,
                },
            )
            .unwrap();
        let design = array![[0.1, -1.], [0.9, 1.]];
        let coords = space.expand(&design).unwrap();
        assert_abs_diff_eq!(
            coords,
            array![[0.1, 7., -1.], [0.9, 7., 1.]],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_expand_dimension_checked() {
        let space = ParameterSpace::new()
            .add(
                "x1",
                Parameter::Normal {
                    mean: 0.,
                    std_dev: 1.,
                },
            )
            .unwrap();
        let design = array![[0.1, 0.2]];
        assert!(matches!(
            space.expand(&design),
            Err(DoeError::InvalidDimension(_))
        ));
    }
}
