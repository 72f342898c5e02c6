//! Reference test functions with known closed-form derivatives.

use ndarray::{Array2, Array3, ArrayView2};
use polychaos_doe::{Parameter, ParameterSpace};
use std::f64::consts::PI;

use crate::errors::Result;
use crate::model::{Model, SimResult};

/// Three-dimensional Ishigami function,
/// `y = sin(x1) + a sin^2(x2) + b x3^4 sin(x1)`,
/// a standard benchmark for sensitivity analysis with strongly nonlinear
/// and non-monotonic behavior.
///
/// The coefficients `a` and `b` are declared as deterministic parameters of
/// [`Ishigami::space`] so the evaluation layer passes them alongside the
/// random coordinates.
pub struct Ishigami;

impl Ishigami {
    /// Customary coefficient values
    pub const A: f64 = 7.0;
    /// Customary coefficient values
    pub const B: f64 = 0.1;

    /// The usual parameterization: `x1..x3` uniform over `(-pi, pi)`,
    /// coefficients fixed to [`Ishigami::A`] and [`Ishigami::B`]
    pub fn space() -> ParameterSpace {
        ParameterSpace::new()
            .add(
                "x1",
                Parameter::Beta {
                    shape: (1., 1.),
                    limits: (-PI, PI),
                },
            )
            .and_then(|s| {
                s.add(
                    "x2",
                    Parameter::Beta {
                        shape: (1., 1.),
                        limits: (-PI, PI),
                    },
                )
            })
            .and_then(|s| {
                s.add(
                    "x3",
                    Parameter::Beta {
                        shape: (1., 1.),
                        limits: (-PI, PI),
                    },
                )
            })
            .and_then(|s| s.add("a", Parameter::Deterministic(Self::A)))
            .and_then(|s| s.add("b", Parameter::Deterministic(Self::B)))
            .expect("fixed parameter names are unique")
    }
}

impl Model for Ishigami {
    fn simulate(&self, x: &ArrayView2<f64>) -> Result<SimResult> {
        let n = x.nrows();
        let mut y = Array2::zeros((n, 1));
        for i in 0..n {
            let (x1, x2, x3) = (x[[i, 0]], x[[i, 1]], x[[i, 2]]);
            let (a, b) = (x[[i, 3]], x[[i, 4]]);
            y[[i, 0]] = x1.sin() + a * x2.sin().powi(2) + b * x3.powi(4) * x1.sin();
        }
        Ok(SimResult::new(y))
    }

    fn partials(&self, x: &ArrayView2<f64>) -> Option<Array3<f64>> {
        let n = x.nrows();
        let mut d = Array3::zeros((n, 1, 5));
        for i in 0..n {
            let (x1, x2, x3) = (x[[i, 0]], x[[i, 1]], x[[i, 2]]);
            let (a, b) = (x[[i, 3]], x[[i, 4]]);
            d[[i, 0, 0]] = x1.cos() * (1. + b * x3.powi(4));
            d[[i, 0, 1]] = 2. * a * x2.sin() * x2.cos();
            d[[i, 0, 2]] = 4. * b * x3.powi(3) * x1.sin();
            d[[i, 0, 3]] = x2.sin().powi(2);
            d[[i, 0, 4]] = x3.powi(4) * x1.sin();
        }
        Some(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_known_values() {
        // sin(0) = 0, so only the a sin^2(x2) term survives at x1 = x3 = 0
        let coords = array![
            [0., 0., 0., Ishigami::A, Ishigami::B],
            [0., PI / 2., 0., Ishigami::A, Ishigami::B],
            [PI / 2., 0., 0., Ishigami::A, Ishigami::B],
        ];
        let res = Ishigami.simulate(&coords.view()).unwrap();
        assert_abs_diff_eq!(res.y.column(0).to_owned(), array![0., 7., 1.], epsilon = 1e-12);
    }

    #[test]
    fn test_partials_against_manual_differences() {
        let coords = array![[0.7, -1.2, 2.1, Ishigami::A, Ishigami::B]];
        let d = Ishigami.partials(&coords.view()).unwrap();
        assert_eq!(d.dim(), (1, 1, 5));
        let h = 1e-6;
        for k in 0..5 {
            let mut up = coords.clone();
            let mut lo = coords.clone();
            up[[0, k]] += h;
            lo[[0, k]] -= h;
            let fu = Ishigami.simulate(&up.view()).unwrap().y[[0, 0]];
            let fl = Ishigami.simulate(&lo.view()).unwrap().y[[0, 0]];
            assert_abs_diff_eq!(d[[0, 0, k]], (fu - fl) / (2. * h), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_space_layout() {
        let space = Ishigami::space();
        assert_eq!(space.len(), 5);
        assert_eq!(space.dim(), 3);
        assert_eq!(space.random_indices(), vec![0, 1, 2]);
    }
}
