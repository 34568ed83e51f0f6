//! Shape operations on scalar arrays
//!
//! Every operation here is named-shape bookkeeping plus a data relayout:
//! broadcasting to a target shape, positional reshape, axis permutation,
//! insertion of size-1 axes, flattening several axes into one and stacking.

use super::types::ScalarArray;
use crate::error::{NamedArrayError, Result};
use crate::shape::{broadcast_shapes, flatten_axes, HasShape, NamedShape};
use crate::types::Element;
use scirs2_core::ndarray_ext::{Array, ArrayD, Axis, IxDyn};

impl<T: Element> ScalarArray<T> {
    /// Broadcast this array to `shape`, adopting its axis order.
    ///
    /// # Errors
    ///
    /// Fails if `self` has an axis missing from `shape` or if a size is not
    /// broadcast-compatible.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{HasShape, NamedShape, ScalarArray};
    ///
    /// let a = ScalarArray::from_vec(vec![1.0, 2.0], &NamedShape::from_pairs([("x", 2)]).unwrap()).unwrap();
    /// let target = NamedShape::from_pairs([("x", 2), ("t", 3)]).unwrap();
    /// let b = a.broadcast_to(&target).unwrap();
    /// assert_eq!(b.shape(), target);
    /// assert_eq!(b.value_at(&[("x", 1), ("t", 2)]).unwrap(), 2.0);
    /// ```
    pub fn broadcast_to(&self, shape: &NamedShape) -> Result<Self> {
        let data = self.broadcast_data(shape)?;
        Ok(Self::from_parts(data, shape.names(), self.unit.clone()))
    }

    /// Reinterpret the data, in row-major order, with a new named shape.
    ///
    /// # Errors
    ///
    /// Fails if the total number of elements differs.
    pub fn reshape(&self, shape: &NamedShape) -> Result<Self> {
        if shape.size() != self.data.len() {
            return Err(NamedArrayError::InvalidShape(format!(
                "cannot reshape {} into {}",
                self.shape(),
                shape
            )));
        }
        let standard = self.data.as_standard_layout().into_owned();
        let data = standard
            .into_shape_with_order(IxDyn(&shape.sizes()))
            .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))?;
        Ok(Self::from_parts(data, shape.names(), self.unit.clone()))
    }

    /// Permute the axes into the given order, or reverse them when `axes` is `None`.
    ///
    /// # Errors
    ///
    /// Fails unless `axes` names every axis exactly once.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{NamedShape, ScalarArray};
    ///
    /// let shape = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
    /// let a = ScalarArray::<f64>::zeros(&shape);
    /// assert_eq!(a.transpose(None).unwrap().axis_names(), &["y", "x"]);
    /// assert!(a.transpose(Some(&["x"][..])).is_err());
    /// ```
    pub fn transpose(&self, axes: Option<&[&str]>) -> Result<Self> {
        let shape = self.shape();
        let order: Vec<String> = match axes {
            Some(axes) => axes.iter().map(|a| a.to_string()).collect(),
            None => self.axes.iter().rev().cloned().collect(),
        };
        if order.len() != self.axes.len() {
            return Err(NamedArrayError::InvalidArgument(format!(
                "transpose order {:?} does not match axes {:?}",
                order, self.axes
            )));
        }
        let mut target = NamedShape::new();
        for axis in &order {
            let size = shape
                .get(axis)
                .ok_or_else(|| NamedArrayError::axis_not_found(axis, &self.axes))?;
            target.push(axis.clone(), size)?;
        }
        let data = self.ndarray_aligned(&target)?;
        Ok(Self::from_parts(data, order, self.unit.clone()))
    }

    /// Insert new size-1 axes.
    ///
    /// The new axes are merged with the broadcasting rule, which places them
    /// ahead of the existing axes. Names that already exist are left alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{HasShape, NamedShape, ScalarArray};
    ///
    /// let a = ScalarArray::<f64>::ones(&NamedShape::from_pairs([("x", 4)]).unwrap());
    /// let b = a.add_axes(&["t", "x"]).unwrap();
    /// assert_eq!(b.axis_names(), &["t", "x"]);
    /// assert_eq!(b.shape().get("t"), Some(1));
    /// ```
    pub fn add_axes(&self, names: &[&str]) -> Result<Self> {
        let mut extra = NamedShape::new();
        for name in names {
            if !extra.contains(name) {
                extra.push(*name, 1)?;
            }
        }
        let own = self.shape();
        let target = broadcast_shapes(&[&own, &extra])?;
        let data = self.ndarray_aligned(&target)?;
        Ok(Self::from_parts(data, target.names(), self.unit.clone()))
    }

    /// Flatten the listed axes, in the given order, into one trailing axis.
    ///
    /// The new axis is called `name`, or the listed names joined by
    /// [`AXIS_SEPARATOR`](crate::AXIS_SEPARATOR) when `name` is `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{HasShape, NamedShape, ScalarArray};
    ///
    /// let shape = NamedShape::from_pairs([("x", 2), ("y", 3), ("t", 4)]).unwrap();
    /// let a = ScalarArray::<f64>::zeros(&shape);
    /// let b = a.combine_axes(&["y", "x"], None).unwrap();
    /// assert_eq!(b.axis_names(), &["t", "y*x"]);
    /// assert_eq!(b.shape().get("y*x"), Some(6));
    /// ```
    pub fn combine_axes(&self, axes: &[&str], name: Option<&str>) -> Result<Self> {
        let shape = self.shape();
        let kept = shape.without(axes);
        let mut order = kept.clone();
        for axis in axes {
            let size = shape
                .get(axis)
                .ok_or_else(|| NamedArrayError::axis_not_found(axis, &self.axes))?;
            order.push(*axis, size)?;
        }
        let new_name = match name {
            Some(name) => name.to_string(),
            None => flatten_axes(axes),
        };
        let combined: usize = axes.iter().filter_map(|a| shape.get(a)).product();
        let mut target = kept;
        target.push(new_name, combined)?;

        let data = self
            .ndarray_aligned(&order)?
            .into_shape_with_order(IxDyn(&target.sizes()))
            .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))?;
        Ok(Self::from_parts(data, target.names(), self.unit.clone()))
    }

    /// Stack arrays along a new leading axis.
    ///
    /// The inputs are broadcast against each other first; the unit of the
    /// first array is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{HasShape, NamedShape, ScalarArray};
    ///
    /// let x = NamedShape::from_pairs([("x", 3)]).unwrap();
    /// let a = ScalarArray::<f64>::zeros(&x);
    /// let b = ScalarArray::<f64>::ones(&x);
    /// let s = ScalarArray::stack(&[a, b], "run").unwrap();
    /// assert_eq!(s.axis_names(), &["run", "x"]);
    /// assert_eq!(s.value_at(&[("run", 1), ("x", 2)]).unwrap(), 1.0);
    /// ```
    pub fn stack(arrays: &[Self], axis: &str) -> Result<Self> {
        let first = arrays.first().ok_or_else(|| {
            NamedArrayError::InvalidArgument("need at least one array to stack".to_string())
        })?;
        let shapes: Vec<NamedShape> = arrays.iter().map(|a| a.shape()).collect();
        let refs: Vec<&NamedShape> = shapes.iter().collect();
        let common = broadcast_shapes(&refs)?;
        if common.contains(axis) {
            return Err(NamedArrayError::DuplicateAxis(axis.to_string()));
        }

        let mut parts: Vec<ArrayD<T>> = Vec::with_capacity(arrays.len());
        for array in arrays {
            parts.push(array.broadcast_data(&common)?.insert_axis(Axis(0)));
        }
        let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
        let data = scirs2_core::ndarray::concatenate(Axis(0), &views)
            .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))?;

        let mut axes = vec![axis.to_string()];
        axes.extend(common.names());
        Ok(Self::from_parts(data, axes, first.unit.clone()))
    }

    /// Drop every axis of size 1.
    pub fn squeeze(&self) -> Result<Self> {
        let shape = self.shape();
        let ones: Vec<&str> = shape
            .iter()
            .filter(|(_, size)| *size == 1)
            .map(|(name, _)| name)
            .collect();
        let target = shape.without(&ones);
        let data = Array::from_shape_vec(
            IxDyn(&target.sizes()),
            self.data.iter().cloned().collect(),
        )
        .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))?;
        Ok(Self::from_parts(data, target.names(), self.unit.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(pairs: &[(&str, usize)]) -> NamedShape {
        NamedShape::from_pairs(pairs.iter().map(|(n, s)| (*n, *s))).unwrap()
    }

    fn iota(pairs: &[(&str, usize)]) -> ScalarArray<f64> {
        let s = shape(pairs);
        ScalarArray::from_vec((0..s.size()).map(|v| v as f64).collect(), &s).unwrap()
    }

    #[test]
    fn test_broadcast_to_incompatible() {
        let a = iota(&[("x", 2)]);
        assert!(a.broadcast_to(&shape(&[("x", 3)])).is_err());
        assert!(a.broadcast_to(&shape(&[("y", 2)])).is_err());
    }

    #[test]
    fn test_reshape_round_trip() {
        let a = iota(&[("x", 2), ("y", 3)]);
        let b = a.reshape(&shape(&[("n", 6)])).unwrap();
        let c = b.reshape(&a.shape()).unwrap();
        assert_eq!(c.ndarray(), a.ndarray());
        assert!(a.reshape(&shape(&[("n", 5)])).is_err());
    }

    #[test]
    fn test_transpose_explicit_order() {
        let a = iota(&[("x", 2), ("y", 3), ("z", 4)]);
        let b = a.transpose(Some(&["z", "x", "y"][..])).unwrap();
        assert_eq!(b.ndarray().shape(), &[4, 2, 3]);
        assert_eq!(
            b.value_at(&[("x", 1), ("y", 2), ("z", 3)]).unwrap(),
            a.value_at(&[("x", 1), ("y", 2), ("z", 3)]).unwrap()
        );
    }

    #[test]
    fn test_combine_axes_values() {
        let a = iota(&[("x", 2), ("y", 3)]);
        let b = a.combine_axes(&["y", "x"], Some("flat")).unwrap();
        // y varies slowest, x fastest
        let values: Vec<f64> = b.ndarray().iter().cloned().collect();
        assert_eq!(values, vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn test_stack_broadcasts_inputs() {
        let a = iota(&[("x", 3)]);
        let b = ScalarArray::scalar(7.0);
        let s = ScalarArray::stack(&[a, b], "k").unwrap();
        assert_eq!(s.ndarray().shape(), &[2, 3]);
        assert_eq!(s.value_at(&[("k", 1), ("x", 0)]).unwrap(), 7.0);
        assert!(ScalarArray::<f64>::stack(&[], "k").is_err());
    }

    #[test]
    fn test_squeeze() {
        let a = iota(&[("x", 1), ("y", 3)]);
        assert_eq!(a.squeeze().unwrap().axis_names(), &["y"]);
    }
}
