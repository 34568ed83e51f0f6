//! Multilinear interpolation and inverse index lookup
//!
//! Coordinates are fractional positions along named axes. Interpolation
//! blends the two neighboring samples along each requested axis in turn, so
//! interpolating over `k` axes reads `2^k` gathered arrays. Beyond the first
//! or last sample the boundary interval is extended linearly.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{Array, Interpolate, NamedShape, ScalarArray};
//! use std::collections::BTreeMap;
//!
//! let shape = NamedShape::from_pairs([("i", 4)]).unwrap();
//! let a = ScalarArray::from_vec(vec![0.0, 10.0, 20.0, 40.0], &shape).unwrap();
//!
//! let item = BTreeMap::from([("i".to_string(), Array::from(2.5))]);
//! let y = a.interp_linear(&item).unwrap();
//! assert_eq!(y.to_scalar().unwrap().item().unwrap(), 30.0);
//! ```

use crate::array::{Array, NamedArray};
use crate::error::{NamedArrayError, Result};
use crate::indexing::{getitem, IndexSpec, Item};
use crate::ops::{apply_ufunc, Ufunc};
use crate::optimize::{root_secant, SecantConfig};
use crate::scalar::ScalarArray;
use crate::shape::HasShape;
use crate::vectors::{CartesianNdVectorArray, CartesianVector};
use std::collections::BTreeMap;

/// Coordinate array as floats.
fn coordinate(axis: &str, value: &Array) -> Result<ScalarArray<f64>> {
    match value {
        Array::Scalar(a) => Ok(a.clone()),
        Array::Int(a) => a.cast::<f64>(),
        other => Err(NamedArrayError::IncompatibleKinds {
            from: other.type_name(),
            to: format!("coordinate along '{}'", axis),
        }),
    }
}

fn interp_recursive(
    host: &Array,
    remaining: &[(String, ScalarArray<f64>)],
    fixed: &mut Vec<(String, IndexSpec)>,
) -> Result<Array> {
    let Some(((axis, x), rest)) = remaining.split_first() else {
        return getitem(host, &Item::Axes(fixed.clone()));
    };

    let size = host
        .shape()
        .get(axis)
        .ok_or_else(|| NamedArrayError::axis_not_found(axis, &host.axes()))?;
    let upper = size.saturating_sub(2) as f64;
    let x0 = x.map(|v| v.floor().clamp(0.0, upper));
    let x1 = x0.map(|v| (v + 1.0).min(size.saturating_sub(1) as f64));

    fixed.push((axis.clone(), IndexSpec::from(x0.cast::<i64>()?)));
    let y0 = interp_recursive(host, rest, fixed)?;
    fixed.pop();
    fixed.push((axis.clone(), IndexSpec::from(x1.cast::<i64>()?)));
    let y1 = interp_recursive(host, rest, fixed)?;
    fixed.pop();

    // y0 (1 - t) + y1 t stays exact at both neighbors
    let t = Array::Scalar(x.checked_sub(&x0)?);
    let s = Array::Scalar(ScalarArray::scalar(1.0).checked_sub(&x.checked_sub(&x0)?)?);
    apply_ufunc(
        Ufunc::Add,
        &[
            &apply_ufunc(Ufunc::Mul, &[&y0, &s])?,
            &apply_ufunc(Ufunc::Mul, &[&y1, &t])?,
        ],
    )
}

/// Multilinear interpolation of `host` at fractional coordinates.
///
/// `item` maps axis names of `host` to coordinate arrays; axes of `host` not
/// named by `item` are kept. Coordinates below 0 or above `size - 1`
/// extrapolate from the first or last interval.
///
/// # Errors
///
/// - [`NamedArrayError::EmptyItem`] for an empty `item`
/// - [`NamedArrayError::AxisNotFound`] if `item` names an axis `host` lacks
/// - [`NamedArrayError::IncompatibleKinds`] for non-scalar coordinates
pub fn interp_linear(host: &Array, item: &BTreeMap<String, Array>) -> Result<Array> {
    if item.is_empty() {
        return Err(NamedArrayError::EmptyItem);
    }
    let coordinates = item
        .iter()
        .map(|(axis, value)| Ok((axis.clone(), coordinate(axis, value)?)))
        .collect::<Result<Vec<_>>>()?;
    interp_recursive(host, &coordinates, &mut Vec::with_capacity(coordinates.len()))
}

/// Interpolation and inverse lookup for any named array.
pub trait Interpolate: NamedArray {
    /// See [`interp_linear`].
    fn interp_linear(&self, item: &BTreeMap<String, Array>) -> Result<Array> {
        interp_linear(&self.to_array()?, item)
    }

    /// Fractional coordinates along `axis` (every axis when `None`) at which
    /// this array, interpolated, equals `value`.
    fn index(&self, value: &Array, axis: Option<&[&str]>) -> Result<BTreeMap<String, Array>> {
        self.index_secant(value, axis)
    }

    /// [`index`](Self::index) with the default [`SecantConfig`].
    fn index_secant(
        &self,
        value: &Array,
        axis: Option<&[&str]>,
    ) -> Result<BTreeMap<String, Array>> {
        self.index_secant_with(value, axis, &SecantConfig::default())
    }

    /// Secant search for the coordinates at which this array equals `value`.
    ///
    /// The search starts at the center of the searched axes. The residual
    /// must have one component per searched axis: one axis for scalar
    /// arrays, two for 2D vectors and so on.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::Convergence`] when the search fails, plus any
    /// error from interpolating or subtracting `value`.
    fn index_secant_with(
        &self,
        value: &Array,
        axis: Option<&[&str]>,
        config: &SecantConfig,
    ) -> Result<BTreeMap<String, Array>> {
        let host = self.to_array()?;
        let shape = host.shape();
        let axes: Vec<String> = match axis {
            Some(axes) => axes.iter().map(|a| a.to_string()).collect(),
            None => shape.names(),
        };

        let guess = axes
            .iter()
            .map(|a| {
                let size = shape
                    .get(a)
                    .ok_or_else(|| NamedArrayError::axis_not_found(a, &shape.names()))?;
                Ok((a.clone(), ScalarArray::scalar((size / 2) as f64)))
            })
            .collect::<Result<Vec<_>>>()?;
        let guess = CartesianNdVectorArray::new(guess)?;

        let residual = |x: &CartesianNdVectorArray| -> Result<Vec<ScalarArray<f64>>> {
            let item: BTreeMap<String, Array> = x
                .components()
                .into_iter()
                .map(|(name, c)| (name.to_string(), Array::Scalar(c.clone())))
                .collect();
            let difference = apply_ufunc(Ufunc::Sub, &[&interp_linear(&host, &item)?, value])?;
            Ok(difference.leaves()?.into_iter().map(|(_, leaf)| leaf).collect())
        };

        let root = root_secant(residual, &guess, config)?;
        Ok(root
            .components()
            .into_iter()
            .map(|(name, c)| (name.to_string(), Array::Scalar(c.clone())))
            .collect())
    }
}

impl<T: NamedArray + ?Sized> Interpolate for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::NamedShape;
    use crate::vectors::Cartesian2dVectorArray;

    fn line() -> ScalarArray<f64> {
        let shape = NamedShape::from_pairs([("i", 5)]).unwrap();
        ScalarArray::from_vec(vec![0.0, 1.0, 4.0, 9.0, 16.0], &shape).unwrap()
    }

    fn at(axis: &str, x: f64) -> BTreeMap<String, Array> {
        BTreeMap::from([(axis.to_string(), Array::from(x))])
    }

    fn value(a: &Array) -> f64 {
        a.to_scalar().unwrap().item().unwrap()
    }

    #[test]
    fn test_exact_at_grid_points() {
        let a = line();
        for k in 0..5 {
            let y = a.interp_linear(&at("i", k as f64)).unwrap();
            assert_eq!(value(&y), (k * k) as f64);
        }
    }

    #[test]
    fn test_between_and_beyond_samples() {
        let a = line();
        assert_eq!(value(&a.interp_linear(&at("i", 1.5)).unwrap()), 2.5);
        // slope of the first interval is 1
        assert_eq!(value(&a.interp_linear(&at("i", -5.0)).unwrap()), -5.0);
        // slope of the last interval is 7
        assert_eq!(value(&a.interp_linear(&at("i", 5.0)).unwrap()), 23.0);
    }

    #[test]
    fn test_bilinear() {
        let shape = NamedShape::from_pairs([("x", 2), ("y", 2)]).unwrap();
        let a = ScalarArray::from_vec(vec![0.0, 1.0, 2.0, 3.0], &shape).unwrap();
        let item = BTreeMap::from([
            ("x".to_string(), Array::from(0.5)),
            ("y".to_string(), Array::from(0.5)),
        ]);
        assert_eq!(value(&a.interp_linear(&item).unwrap()), 1.5);
    }

    #[test]
    fn test_partial_axes_keep_the_rest() {
        let shape = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
        let a = ScalarArray::from_vec(vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0], &shape).unwrap();
        let y = a.interp_linear(&at("x", 0.5)).unwrap().to_scalar().unwrap();
        assert_eq!(y.axes(), vec!["y"]);
        assert_eq!(y.value_at(&[("y", 2)]).unwrap(), 7.0);
    }

    #[test]
    fn test_array_coordinates_broadcast() {
        let a = line();
        let xs = ScalarArray::from_vec(
            vec![0.5, 2.5],
            &NamedShape::from_pairs([("q", 2)]).unwrap(),
        )
        .unwrap();
        let item = BTreeMap::from([("i".to_string(), Array::Scalar(xs))]);
        let y = a.interp_linear(&item).unwrap().to_scalar().unwrap();
        assert_eq!(y.value_at(&[("q", 0)]).unwrap(), 0.5);
        assert_eq!(y.value_at(&[("q", 1)]).unwrap(), 6.5);
    }

    #[test]
    fn test_vector_interpolation() {
        let shape = NamedShape::from_pairs([("i", 2)]).unwrap();
        let v = Cartesian2dVectorArray::new(
            ScalarArray::from_vec(vec![0.0, 2.0], &shape).unwrap(),
            ScalarArray::from_vec(vec![10.0, 20.0], &shape).unwrap(),
        )
        .unwrap();
        match v.interp_linear(&at("i", 0.25)).unwrap() {
            Array::Vector2d(r) => {
                assert_eq!(r.x().item().unwrap(), 0.5);
                assert_eq!(r.y().item().unwrap(), 12.5);
            }
            other => panic!("unexpected {}", other.type_name()),
        }
    }

    #[test]
    fn test_empty_item_and_missing_axis() {
        let a = line();
        assert!(matches!(
            a.interp_linear(&BTreeMap::new()),
            Err(NamedArrayError::EmptyItem)
        ));
        assert!(matches!(
            a.interp_linear(&at("j", 0.0)),
            Err(NamedArrayError::AxisNotFound { .. })
        ));
    }

    #[test]
    fn test_index_round_trip() {
        let a = line();
        let target = a.interp_linear(&at("i", 2.37)).unwrap();
        let index = a.index(&target, None).unwrap();
        assert!((value(&index["i"]) - 2.37).abs() < 1e-6);
        let back = a.interp_linear(&index).unwrap();
        assert!((value(&back) - value(&target)).abs() < 1e-8);
    }

    #[test]
    fn test_index_along_one_axis_of_many() {
        let shape = NamedShape::from_pairs([("row", 2), ("i", 4)]).unwrap();
        let a = ScalarArray::from_vec(
            vec![0.0, 1.0, 2.0, 3.0, 0.0, 2.0, 4.0, 6.0],
            &shape,
        )
        .unwrap();
        let index = a.index(&Array::from(1.0), Some(&["i"][..])).unwrap();
        let i = index["i"].to_scalar().unwrap();
        assert!((i.value_at(&[("row", 0)]).unwrap() - 1.0).abs() < 1e-6);
        assert!((i.value_at(&[("row", 1)]).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_index_component_mismatch() {
        let a = line();
        let shape = NamedShape::from_pairs([("x", 2), ("y", 2)]).unwrap();
        let grid = ScalarArray::from_vec(vec![0.0, 1.0, 2.0, 3.0], &shape).unwrap();
        assert!(matches!(
            grid.index(&Array::from(1.0), None),
            Err(NamedArrayError::Dimension(_))
        ));
        assert!(a.index(&Array::from(1.0), Some(&["missing"][..])).is_err());
    }
}
