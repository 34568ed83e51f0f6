//! Scalar array type definition and basic operations
//!
//! This module defines the core `ScalarArray<T>` type and provides creation,
//! accessor, copy and cast methods. Additional operations are organized in
//! separate modules.

use crate::error::{NamedArrayError, Result};
use crate::shape::{HasShape, NamedShape};
use crate::types::{DType, Element};
use crate::units::{unit_normalized, Unit};
use scirs2_core::ndarray_ext::{Array, ArrayD, IxDyn};
use scirs2_core::numeric::{NumCast, One, ToPrimitive, Zero};
use std::sync::Arc;

/// Explicit named array backed by scirs2_core's ndarray
///
/// Every dimension of the backing array carries a unique axis name. The
/// backing storage is reference counted: [`Clone`] and
/// [`copy_shallow`](Self::copy_shallow) share it, [`copy`](Self::copy)
/// duplicates it.
///
/// # Examples
///
/// ```
/// use naxis_core::{HasShape, NamedShape, ScalarArray};
///
/// let shape = NamedShape::from_pairs([("t", 2), ("x", 3)]).unwrap();
/// let a = ScalarArray::<f64>::zeros(&shape);
/// assert_eq!(a.shape(), shape);
/// assert_eq!(a.ndim(), 2);
/// assert_eq!(a.size(), 6);
/// ```
#[derive(Clone)]
pub struct ScalarArray<T> {
    /// Underlying ndarray storage (via scirs2_core)
    pub(crate) data: Arc<ArrayD<T>>,
    /// One name per dimension of `data`
    pub(crate) axes: Vec<String>,
    /// Physical unit, `None` for plain numbers
    pub(crate) unit: Option<Unit>,
}

impl<T: Element> ScalarArray<T> {
    /// Wrap an existing ndarray, naming each of its dimensions.
    ///
    /// # Errors
    ///
    /// Fails if the number of names differs from the number of dimensions or
    /// if a name repeats.
    ///
    /// # Examples
    ///
    /// ```
    /// use scirs2_core::ndarray_ext::{ArrayD, IxDyn};
    /// use naxis_core::ScalarArray;
    ///
    /// let raw = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
    /// let a = ScalarArray::new(raw, ["row", "col"]).unwrap();
    /// assert_eq!(a.axis_names(), &["row".to_string(), "col".to_string()]);
    /// ```
    pub fn new<I, S>(data: ArrayD<T>, axes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let axes: Vec<String> = axes.into_iter().map(Into::into).collect();
        // Validates the name count and uniqueness.
        NamedShape::from_names_and_sizes(&axes, data.shape())?;
        Ok(Self {
            data: Arc::new(data),
            axes,
            unit: None,
        })
    }

    /// Create an array from row-major data with the given named shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{NamedShape, ScalarArray};
    ///
    /// let shape = NamedShape::from_pairs([("i", 2), ("j", 2)]).unwrap();
    /// let a = ScalarArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &shape).unwrap();
    /// assert_eq!(a.value_at(&[("i", 1), ("j", 0)]).unwrap(), 3.0);
    ///
    /// assert!(ScalarArray::from_vec(vec![1.0, 2.0], &shape).is_err());
    /// ```
    pub fn from_vec(vec: Vec<T>, shape: &NamedShape) -> Result<Self> {
        let len = vec.len();
        let data = Array::from_shape_vec(IxDyn(&shape.sizes()), vec).map_err(|_| {
            NamedArrayError::InvalidShape(format!(
                "{} elements cannot be arranged into shape {}",
                len, shape
            ))
        })?;
        Ok(Self::from_parts(data, shape.names(), None))
    }

    /// Create an array filled with one value.
    pub fn full(shape: &NamedShape, value: T) -> Self {
        Self::from_parts(
            ArrayD::from_elem(IxDyn(&shape.sizes()), value),
            shape.names(),
            None,
        )
    }

    /// Create a zero-dimensional array holding a single value.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{HasShape, ScalarArray};
    ///
    /// let s = ScalarArray::scalar(2.5);
    /// assert_eq!(s.ndim(), 0);
    /// assert_eq!(s.item().unwrap(), 2.5);
    /// ```
    pub fn scalar(value: T) -> Self {
        Self::from_parts(ArrayD::from_elem(IxDyn(&[]), value), Vec::new(), None)
    }

    pub(crate) fn from_parts(data: ArrayD<T>, axes: Vec<String>, unit: Option<Unit>) -> Self {
        Self {
            data: Arc::new(data),
            axes,
            unit,
        }
    }

    /// Attach a unit to this array, replacing any existing unit.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Drop the unit of this array.
    pub fn without_unit(mut self) -> Self {
        self.unit = None;
        self
    }

    /// Underlying ndarray, dimensions ordered as [`axis_names`](Self::axis_names).
    pub fn ndarray(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Axis names, one per dimension.
    pub fn axis_names(&self) -> &[String] {
        &self.axes
    }

    /// Physical unit, if any.
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    /// Physical unit, with `None` replaced by the dimensionless unit.
    pub fn unit_normalized(&self) -> Unit {
        unit_normalized(self.unit.as_ref())
    }

    /// Element data type.
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Copy that shares the backing storage of `self`.
    pub fn copy_shallow(&self) -> Self {
        self.clone()
    }

    /// Fully independent copy of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{NamedShape, ScalarArray};
    ///
    /// let a = ScalarArray::<f64>::zeros(&NamedShape::from_pairs([("t", 4)]).unwrap());
    /// assert!(a.copy_shallow().shares_data(&a));
    /// assert!(!a.copy().shares_data(&a));
    /// ```
    pub fn copy(&self) -> Self {
        Self {
            data: Arc::new(self.data.as_ref().clone()),
            axes: self.axes.clone(),
            unit: self.unit.clone(),
        }
    }

    /// Whether `self` and `other` reference the same backing storage.
    pub fn shares_data(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Apply a function to every element, keeping axes and unit.
    pub fn map<U: Element>(&self, f: impl Fn(&T) -> U) -> ScalarArray<U> {
        ScalarArray {
            data: Arc::new(self.data.map(f)),
            axes: self.axes.clone(),
            unit: self.unit.clone(),
        }
    }

    /// The only element of a size-1 array.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::AmbiguousTruth`] for arrays with more than one element.
    pub fn item(&self) -> Result<T> {
        if self.data.len() != 1 {
            return Err(NamedArrayError::AmbiguousTruth {
                size: self.data.len(),
            });
        }
        self.data
            .iter()
            .next()
            .cloned()
            .ok_or(NamedArrayError::AmbiguousTruth { size: 0 })
    }

    /// Element at a full integer coordinate given as `(axis, index)` pairs.
    pub fn value_at(&self, index: &[(&str, usize)]) -> Result<T> {
        let shape = self.shape();
        let mut coords = vec![0usize; self.axes.len()];
        for (axis, i) in index {
            let position = shape
                .position(axis)
                .ok_or_else(|| NamedArrayError::axis_not_found(axis, &self.axes))?;
            let size = self.data.shape()[position];
            if *i >= size {
                return Err(NamedArrayError::IndexOutOfBounds {
                    axis: axis.to_string(),
                    index: *i as i64,
                    size,
                });
            }
            coords[position] = *i;
        }
        if index.len() != self.axes.len() {
            return Err(NamedArrayError::InvalidArgument(format!(
                "index {:?} does not address every axis of {}",
                index, shape
            )));
        }
        Ok(self.data[IxDyn(&coords)].clone())
    }

    /// Relayout the data to the axis order of `shape`.
    ///
    /// Axes of `shape` missing from `self` are inserted with size 1, so the
    /// result broadcasts against `shape` positionally. Sizes are not stretched.
    ///
    /// # Errors
    ///
    /// Fails when `self` has an axis that `shape` lacks.
    pub fn ndarray_aligned(&self, shape: &NamedShape) -> Result<ArrayD<T>> {
        let mut order: Vec<(usize, usize)> = Vec::with_capacity(self.axes.len());
        for (i, axis) in self.axes.iter().enumerate() {
            let target = shape
                .position(axis)
                .ok_or_else(|| NamedArrayError::axis_not_found(axis, &shape.names()))?;
            order.push((target, i));
        }
        order.sort_unstable();
        let permutation: Vec<usize> = order.iter().map(|&(_, i)| i).collect();

        let permuted = self.data.view().permuted_axes(IxDyn(&permutation));
        let standard = permuted.as_standard_layout().into_owned();

        let dims: Vec<usize> = shape
            .iter()
            .map(|(name, _)| match self.axes.iter().position(|a| a == name) {
                Some(i) => self.data.shape()[i],
                None => 1,
            })
            .collect();
        standard
            .into_shape_with_order(IxDyn(&dims))
            .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))
    }

    /// Raw data broadcast to `shape`, dimensions ordered like `shape`.
    pub(crate) fn broadcast_data(&self, shape: &NamedShape) -> Result<ArrayD<T>> {
        let aligned = self.ndarray_aligned(shape)?;
        let dims = shape.sizes();
        let view = aligned.broadcast(IxDyn(&dims)).ok_or_else(|| {
            NamedArrayError::shape_mismatch(&[self.shape(), shape.clone()])
        })?;
        Ok(view.to_owned())
    }
}

impl<T: Element + Zero> ScalarArray<T> {
    /// Array of zeros with the given named shape.
    pub fn zeros(shape: &NamedShape) -> Self {
        Self::full(shape, T::zero())
    }

    /// Uninitialized-equivalent array; elements are zero.
    pub fn empty(shape: &NamedShape) -> Self {
        Self::zeros(shape)
    }
}

impl<T: Element + One> ScalarArray<T> {
    /// Array of ones with the given named shape.
    pub fn ones(shape: &NamedShape) -> Self {
        Self::full(shape, T::one())
    }
}

impl<T: Element + ToPrimitive> ScalarArray<T> {
    /// Element-wise type change; the result has the same named shape.
    ///
    /// # Errors
    ///
    /// Fails when an element is not representable in `U`.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{DType, NamedShape, ScalarArray};
    ///
    /// let shape = NamedShape::from_pairs([("n", 3)]).unwrap();
    /// let a = ScalarArray::from_vec(vec![1.7, 2.2, -0.5], &shape).unwrap();
    /// let b = a.cast::<i64>().unwrap();
    /// assert_eq!(b.dtype(), DType::I64);
    /// assert_eq!(b.value_at(&[("n", 0)]).unwrap(), 1);
    /// ```
    pub fn cast<U: Element + NumCast>(&self) -> Result<ScalarArray<U>> {
        let mut values = Vec::with_capacity(self.data.len());
        for value in self.data.iter() {
            let cast = U::from(value.clone()).ok_or_else(|| {
                NamedArrayError::InvalidArgument(format!(
                    "cannot cast {:?} to {}",
                    value,
                    U::DTYPE
                ))
            })?;
            values.push(cast);
        }
        let data = Array::from_shape_vec(IxDyn(self.data.shape()), values)
            .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))?;
        Ok(ScalarArray::from_parts(
            data,
            self.axes.clone(),
            self.unit.clone(),
        ))
    }
}

impl ScalarArray<bool> {
    /// Boolean array as 0.0 / 1.0 values.
    pub fn to_f64(&self) -> ScalarArray<f64> {
        self.map(|&b| if b { 1.0 } else { 0.0 })
    }
}

impl ScalarArray<f64> {
    /// Convert to another unit.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::IncompatibleUnits`] when the units measure different
    /// dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{ScalarArray, Unit};
    ///
    /// let km = Unit::scaled("km", 1000.0, &Unit::meter());
    /// let d = ScalarArray::scalar(2.0).with_unit(km);
    /// let m = d.to(&Unit::meter()).unwrap();
    /// assert_eq!(m.item().unwrap(), 2000.0);
    /// assert!(d.to(&Unit::second()).is_err());
    /// ```
    pub fn to(&self, unit: &Unit) -> Result<Self> {
        let factor = self.unit_normalized().conversion_factor(unit)?;
        Ok(Self {
            data: Arc::new(self.data.mapv(|v| v * factor)),
            axes: self.axes.clone(),
            unit: Some(unit.clone()),
        })
    }

    /// Raw values expressed in `unit`.
    pub fn to_value(&self, unit: &Unit) -> Result<ArrayD<f64>> {
        let factor = self.unit_normalized().conversion_factor(unit)?;
        Ok(self.data.mapv(|v| v * factor))
    }
}

impl<T> HasShape for ScalarArray<T> {
    fn shape(&self) -> NamedShape {
        NamedShape::from_parts_unchecked(&self.axes, self.data.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(pairs: &[(&str, usize)]) -> NamedShape {
        NamedShape::from_pairs(pairs.iter().map(|(n, s)| (*n, *s))).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_names() {
        let raw = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
        assert!(ScalarArray::new(raw.clone(), ["a"]).is_err());
        assert!(ScalarArray::new(raw.clone(), ["a", "a"]).is_err());
        assert!(ScalarArray::new(raw, ["a", "b"]).is_ok());
    }

    #[test]
    fn test_ndarray_aligned_inserts_missing_axes() {
        let a = ScalarArray::from_vec(vec![1.0, 2.0, 3.0], &shape(&[("x", 3)])).unwrap();
        let target = shape(&[("t", 4), ("x", 3)]);
        let aligned = a.ndarray_aligned(&target).unwrap();
        assert_eq!(aligned.shape(), &[1, 3]);
    }

    #[test]
    fn test_ndarray_aligned_permutes() {
        let a = ScalarArray::from_vec(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &shape(&[("x", 2), ("y", 3)]),
        )
        .unwrap();
        let aligned = a.ndarray_aligned(&shape(&[("y", 3), ("x", 2)])).unwrap();
        assert_eq!(aligned.shape(), &[3, 2]);
        assert_eq!(aligned[IxDyn(&[2, 1])], 6.0);
        assert_eq!(aligned[IxDyn(&[1, 0])], 2.0);
    }

    #[test]
    fn test_ndarray_aligned_rejects_foreign_axis() {
        let a = ScalarArray::<f64>::zeros(&shape(&[("x", 2)]));
        assert!(a.ndarray_aligned(&shape(&[("y", 2)])).is_err());
    }

    #[test]
    fn test_item_requires_single_element() {
        let a = ScalarArray::<f64>::ones(&shape(&[("x", 2)]));
        assert!(matches!(
            a.item(),
            Err(NamedArrayError::AmbiguousTruth { size: 2 })
        ));
        assert_eq!(ScalarArray::scalar(3i64).item().unwrap(), 3);
    }

    #[test]
    fn test_unit_conversion_preserves_shape() {
        let a = ScalarArray::<f64>::ones(&shape(&[("x", 2)])).with_unit(Unit::meter());
        let cm = Unit::scaled("cm", 0.01, &Unit::meter());
        let b = a.to(&cm).unwrap();
        assert_eq!(b.shape(), a.shape());
        assert!((b.value_at(&[("x", 1)]).unwrap() - 100.0).abs() < 1e-9);
    }
}
