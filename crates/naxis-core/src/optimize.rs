//! Secant root finding over named vector domains
//!
//! The solver works on independent problems laid out on a named grid: every
//! element of the broadcast shape of the domain and the residual is its own
//! `n`-dimensional root search, where `n` is the number of domain components.
//! The Jacobian at each element is estimated by forward differences with a
//! fixed step per component.

use crate::error::{NamedArrayError, Result};
use crate::matrices::solve_dense;
use crate::scalar::ScalarArray;
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use crate::vectors::{CartesianNdVectorArray, CartesianVector};
use scirs2_core::ndarray_ext::{Array1, Array2};

/// Settings of the secant search.
///
/// # Examples
///
/// ```
/// use naxis_core::SecantConfig;
///
/// let config = SecantConfig::default().with_max_iterations(20);
/// assert_eq!(config.max_iterations, 20);
/// assert_eq!(config.step_size, 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SecantConfig {
    /// Finite-difference step used to estimate derivatives
    pub step_size: f64,
    /// The search stops once every residual is below this magnitude
    pub max_abs_error: f64,
    /// Number of iterations before giving up
    pub max_iterations: usize,
}

impl Default for SecantConfig {
    fn default() -> Self {
        Self {
            step_size: 1e-6,
            max_abs_error: 1e-9,
            max_iterations: 100,
        }
    }
}

impl SecantConfig {
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_max_abs_error(mut self, max_abs_error: f64) -> Self {
        self.max_abs_error = max_abs_error;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Row-major values of `array` broadcast to `shape`.
fn flat(array: &ScalarArray<f64>, shape: &NamedShape) -> Result<Vec<f64>> {
    Ok(array.broadcast_data(shape)?.iter().cloned().collect())
}

fn components(x: &CartesianNdVectorArray) -> Vec<ScalarArray<f64>> {
    x.components().into_iter().map(|(_, c)| c.clone()).collect()
}

fn domain(names: &[String], values: Vec<ScalarArray<f64>>) -> Result<CartesianNdVectorArray> {
    CartesianNdVectorArray::new(names.iter().cloned().zip(values).collect())
}

/// Find `x` such that every component of `func(x)` vanishes.
///
/// `func` must return one residual component per component of the domain.
/// The search starts at `guess` and stops once every residual element is
/// smaller than [`SecantConfig::max_abs_error`].
///
/// # Errors
///
/// - [`NamedArrayError::Dimension`] if the residual has a different number of
///   components than the domain
/// - [`NamedArrayError::Convergence`] if the iteration limit is reached or the
///   estimated Jacobian is singular
///
/// # Examples
///
/// ```
/// use naxis_core::{optimize::root_secant, CartesianNdVectorArray, CartesianVector, ScalarArray, SecantConfig};
///
/// let guess = CartesianNdVectorArray::new(vec![("x".to_string(), ScalarArray::scalar(1.0))]).unwrap();
/// let root = root_secant(
///     |v: &CartesianNdVectorArray| {
///         let x = v.component("x").unwrap();
///         Ok(vec![x.checked_mul(x)?.checked_sub(&ScalarArray::scalar(2.0))?])
///     },
///     &guess,
///     &SecantConfig::default(),
/// )
/// .unwrap();
/// let x = root.component("x").unwrap().item().unwrap();
/// assert!((x - 2.0_f64.sqrt()).abs() < 1e-8);
/// ```
pub fn root_secant<F>(
    func: F,
    guess: &CartesianNdVectorArray,
    config: &SecantConfig,
) -> Result<CartesianNdVectorArray>
where
    F: Fn(&CartesianNdVectorArray) -> Result<Vec<ScalarArray<f64>>>,
{
    let names = guess.names();
    let n = names.len();
    let mut x = components(guess);

    for iteration in 0..config.max_iterations {
        let residual = func(&domain(&names, x.clone())?)?;
        if residual.len() != n {
            return Err(NamedArrayError::Dimension(format!(
                "residual has {} components but the domain has {}",
                residual.len(),
                n
            )));
        }

        let shapes: Vec<NamedShape> = x
            .iter()
            .chain(residual.iter())
            .map(|a| a.shape())
            .collect();
        let shape = broadcast_shapes(&shapes.iter().collect::<Vec<_>>())?;
        let xs = x
            .iter()
            .map(|c| flat(c, &shape))
            .collect::<Result<Vec<_>>>()?;
        let fs = residual
            .iter()
            .map(|c| flat(c, &shape))
            .collect::<Result<Vec<_>>>()?;

        let error = fs
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        tracing::debug!(iteration, error, "secant iteration");
        if fs.iter().flatten().any(|v| !v.is_finite()) {
            tracing::warn!(iteration, "secant search produced a non-finite residual");
            return Err(NamedArrayError::Convergence {
                iterations: iteration,
                reason: "residual is not finite".to_string(),
            });
        }
        if error < config.max_abs_error {
            let solution = x
                .iter()
                .map(|c| c.broadcast_to(&shape))
                .collect::<Result<Vec<_>>>()?;
            return domain(&names, solution);
        }

        // jacobian[j][i][e] = d residual_i / d x_j at element e
        let mut jacobian = Vec::with_capacity(n);
        for j in 0..n {
            let mut shifted = x.clone();
            shifted[j] = x[j].checked_add(&ScalarArray::scalar(config.step_size))?;
            let f_shifted = func(&domain(&names, shifted)?)?;
            let column = f_shifted
                .iter()
                .zip(&fs)
                .map(|(f1, f0)| -> Result<Vec<f64>> {
                    Ok(flat(f1, &shape)?
                        .iter()
                        .zip(f0)
                        .map(|(a, b)| (a - b) / config.step_size)
                        .collect::<Vec<f64>>())
                })
                .collect::<Result<Vec<_>>>()?;
            jacobian.push(column);
        }

        let size = shape.size();
        let mut next: Vec<Vec<f64>> = xs.clone();
        for e in 0..size {
            let f_e: Vec<f64> = fs.iter().map(|f| f[e]).collect();
            if f_e.iter().all(|v| v.abs() < config.max_abs_error) {
                continue;
            }
            let a = Array2::from_shape_fn((n, n), |(i, j)| jacobian[j][i][e]);
            let delta = solve_dense(&a, &Array1::from_vec(f_e)).map_err(|err| {
                tracing::warn!(iteration, element = e, %err, "secant search hit a singular jacobian");
                NamedArrayError::Convergence {
                    iterations: iteration,
                    reason: format!("singular jacobian: {}", err),
                }
            })?;
            for (component, d) in next.iter_mut().zip(delta.iter()) {
                component[e] -= *d;
            }
        }

        x = next
            .into_iter()
            .zip(&x)
            .map(|(values, old)| -> Result<ScalarArray<f64>> {
                let updated = ScalarArray::from_vec(values, &shape)?;
                Ok(match old.unit() {
                    Some(unit) => updated.with_unit(unit.clone()),
                    None => updated,
                })
            })
            .collect::<Result<Vec<_>>>()?;
    }

    tracing::warn!(
        iterations = config.max_iterations,
        "secant search did not converge"
    );
    Err(NamedArrayError::Convergence {
        iterations: config.max_iterations,
        reason: format!(
            "residual still above {} after {} iterations",
            config.max_abs_error, config.max_iterations
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_domain(pairs: &[(&str, f64)]) -> CartesianNdVectorArray {
        CartesianNdVectorArray::new(
            pairs
                .iter()
                .map(|(n, v)| (n.to_string(), ScalarArray::scalar(*v)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_linear_system_2d() {
        // x + y = 3, x - y = 1
        let root = root_secant(
            |v: &CartesianNdVectorArray| {
                let (x, y) = (v.component("x").unwrap(), v.component("y").unwrap());
                Ok(vec![
                    x.checked_add(y)?.checked_sub(&ScalarArray::scalar(3.0))?,
                    x.checked_sub(y)?.checked_sub(&ScalarArray::scalar(1.0))?,
                ])
            },
            &scalar_domain(&[("x", 0.0), ("y", 0.0)]),
            &SecantConfig::default(),
        )
        .unwrap();
        assert!((root.component("x").unwrap().item().unwrap() - 2.0).abs() < 1e-6);
        assert!((root.component("y").unwrap().item().unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_elementwise_targets() {
        let targets = ScalarArray::from_vec(
            vec![1.0, 4.0, 9.0],
            &NamedShape::from_pairs([("k", 3)]).unwrap(),
        )
        .unwrap();
        let root = root_secant(
            |v: &CartesianNdVectorArray| {
                let x = v.component("x").unwrap();
                Ok(vec![x.checked_mul(x)?.checked_sub(&targets)?])
            },
            &scalar_domain(&[("x", 1.0)]),
            &SecantConfig::default(),
        )
        .unwrap();
        let x = root.component("x").unwrap();
        assert_eq!(x.shape().get("k"), Some(3));
        for (k, expected) in [1.0, 2.0, 3.0].iter().enumerate() {
            assert!((x.value_at(&[("k", k)]).unwrap() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_component_mismatch() {
        let err = root_secant(
            |v: &CartesianNdVectorArray| Ok(vec![v.component("x").unwrap().clone(); 2]),
            &scalar_domain(&[("x", 1.0)]),
            &SecantConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NamedArrayError::Dimension(_)));
    }

    #[test]
    fn test_nan_residual_stops_the_search() {
        let err = root_secant(
            |v: &CartesianNdVectorArray| {
                let x = v.component("x").unwrap();
                Ok(vec![x.checked_mul(&ScalarArray::scalar(f64::NAN))?])
            },
            &scalar_domain(&[("x", 1.0)]),
            &SecantConfig::default(),
        )
        .unwrap_err();
        match err {
            NamedArrayError::Convergence { iterations, .. } => assert_eq!(iterations, 0),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_no_root_fails_to_converge() {
        // x^2 + 1 has no real root; the flat region at x = 0 is singular.
        let err = root_secant(
            |v: &CartesianNdVectorArray| {
                let x = v.component("x").unwrap();
                Ok(vec![x.checked_mul(x)?.checked_add(&ScalarArray::scalar(1.0))?])
            },
            &scalar_domain(&[("x", 3.0)]),
            &SecantConfig::default().with_max_iterations(10),
        )
        .unwrap_err();
        assert!(matches!(err, NamedArrayError::Convergence { .. }));
    }
}
