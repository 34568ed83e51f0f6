//! Named shapes and the name-keyed broadcasting rules.
//!
//! A [`NamedShape`] is an ordered mapping from axis name to size. Broadcasting
//! matches axes by name instead of by position: two shapes are compatible along
//! an axis when the sizes agree or either size is 1.
//!
//! # Broadcast ordering
//!
//! [`broadcast_shapes`] scans every input from its trailing axis to its leading
//! axis, in input order, appending names that have not been seen yet. The merged
//! sequence is reversed at the end, so axes that trail later inputs end up near
//! the trailing end of the result.
//!
//! ```
//! use naxis_core::{broadcast_shapes, NamedShape};
//!
//! let a = NamedShape::from_pairs([("x", 3), ("y", 1)]).unwrap();
//! let b = NamedShape::from_pairs([("y", 4), ("z", 2)]).unwrap();
//! let c = broadcast_shapes(&[&a, &b]).unwrap();
//!
//! assert_eq!(c.get("x"), Some(3));
//! assert_eq!(c.get("y"), Some(4));
//! assert_eq!(c.get("z"), Some(2));
//! assert_eq!(c.names(), vec!["z", "x", "y"]);
//! ```

use crate::error::{NamedArrayError, Result};
use crate::types::AxisMeta;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// Separator used when several axes are flattened into one.
pub const AXIS_SEPARATOR: &str = "*";

/// Integer coordinate keyed by axis name.
pub type NamedIndex = BTreeMap<String, usize>;

/// Ordered mapping from axis name to axis size.
///
/// Axis names are unique within one shape. Equality is order-sensitive; use
/// [`NamedShape::equivalent`] to compare the name/size sets only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NamedShape {
    axes: SmallVec<[AxisMeta; 6]>,
}

impl NamedShape {
    /// Create an empty (zero-dimensional) shape.
    pub fn new() -> Self {
        Self {
            axes: SmallVec::new(),
        }
    }

    /// Build a shape from `(name, size)` pairs, rejecting duplicate names.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::NamedShape;
    ///
    /// let shape = NamedShape::from_pairs([("t", 3), ("x", 5)]).unwrap();
    /// assert_eq!(shape.len(), 2);
    /// assert_eq!(shape.size(), 15);
    ///
    /// assert!(NamedShape::from_pairs([("t", 3), ("t", 5)]).is_err());
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut shape = Self::new();
        for (name, size) in pairs {
            shape.push(name, size)?;
        }
        Ok(shape)
    }

    /// Build a shape from axis names and sizes given as parallel slices.
    pub fn from_names_and_sizes(names: &[String], sizes: &[usize]) -> Result<Self> {
        if names.len() != sizes.len() {
            return Err(NamedArrayError::InvalidShape(format!(
                "{} axis names for {} dimensions",
                names.len(),
                sizes.len()
            )));
        }
        Self::from_pairs(names.iter().cloned().zip(sizes.iter().copied()))
    }

    /// Build a shape whose names are already known to be unique.
    pub(crate) fn from_parts_unchecked(names: &[String], sizes: &[usize]) -> Self {
        Self {
            axes: names
                .iter()
                .zip(sizes.iter())
                .map(|(name, &size)| AxisMeta::new(name.clone(), size))
                .collect(),
        }
    }

    /// Append a new trailing axis.
    pub fn push(&mut self, name: impl Into<String>, size: usize) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(NamedArrayError::DuplicateAxis(name));
        }
        self.axes.push(AxisMeta::new(name, size));
        Ok(())
    }

    /// Set the size of an existing axis, or append it if missing.
    pub fn set(&mut self, name: &str, size: usize) {
        match self.axes.iter_mut().find(|a| a.name == name) {
            Some(axis) => axis.size = size,
            None => self.axes.push(AxisMeta::new(name, size)),
        }
    }

    /// Remove an axis, returning its size.
    pub fn remove(&mut self, name: &str) -> Option<usize> {
        let position = self.position(name)?;
        Some(self.axes.remove(position).size)
    }

    /// Copy of this shape without the listed axes.
    pub fn without<S: AsRef<str>>(&self, names: &[S]) -> Self {
        Self {
            axes: self
                .axes
                .iter()
                .filter(|a| !names.iter().any(|n| n.as_ref() == a.name))
                .cloned()
                .collect(),
        }
    }

    /// Size of the named axis, if present.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.axes.iter().find(|a| a.name == name).map(|a| a.size)
    }

    /// Position of the named axis, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    /// Whether the named axis is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Whether this is the zero-dimensional shape.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Total number of elements (product of all sizes).
    pub fn size(&self) -> usize {
        self.axes.iter().map(|a| a.size).product()
    }

    /// Axis names in order.
    pub fn names(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.name.clone()).collect()
    }

    /// Axis sizes in order.
    pub fn sizes(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.size).collect()
    }

    /// Axis metadata in order.
    pub fn axes(&self) -> &[AxisMeta] {
        &self.axes
    }

    /// Iterate over `(name, size)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.axes.iter().map(|a| (a.name.as_str(), a.size))
    }

    /// Whether both shapes contain the same names with the same sizes, in any order.
    pub fn equivalent(&self, other: &NamedShape) -> bool {
        self.len() == other.len() && self.iter().all(|(name, size)| other.get(name) == Some(size))
    }
}

impl fmt::Display for NamedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, size)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, size)?;
        }
        f.write_str("}")
    }
}

/// Anything that exposes a named shape.
///
/// Plain `f64` values implement this trait with the empty shape, so scalars
/// broadcast against anything.
pub trait HasShape {
    /// Named shape of this value
    fn shape(&self) -> NamedShape;

    /// Number of axes
    fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements
    fn size(&self) -> usize {
        self.shape().size()
    }

    /// Axis names in order
    fn axes(&self) -> Vec<String> {
        self.shape().names()
    }

    /// Every integer coordinate of this value, skipping the ignored axes
    fn ndindex(&self, axis_ignored: &[&str]) -> NdIndex {
        ndindex(&self.shape(), axis_ignored)
    }
}

impl HasShape for NamedShape {
    fn shape(&self) -> NamedShape {
        self.clone()
    }
}

impl HasShape for f64 {
    fn shape(&self) -> NamedShape {
        NamedShape::new()
    }
}

/// Merge shapes by axis name.
///
/// Every axis name appearing in any input appears exactly once in the result.
/// Sizes for a shared name must agree, or be 1 on all but one common size.
///
/// # Errors
///
/// Returns [`NamedArrayError::ShapeMismatch`] naming every input shape when two
/// inputs disagree on a non-1 size.
pub fn broadcast_shapes(shapes: &[&NamedShape]) -> Result<NamedShape> {
    let mut merged: SmallVec<[AxisMeta; 6]> = SmallVec::new();
    for shape in shapes {
        for axis in shape.axes.iter().rev() {
            match merged.iter_mut().find(|m| m.name == axis.name) {
                Some(existing) => {
                    if existing.size == axis.size || axis.size == 1 {
                        continue;
                    } else if existing.size == 1 {
                        existing.size = axis.size;
                    } else {
                        return Err(NamedArrayError::shape_mismatch(shapes));
                    }
                }
                None => merged.push(axis.clone()),
            }
        }
    }
    merged.reverse();
    let result = NamedShape { axes: merged };
    tracing::debug!(inputs = shapes.len(), shape = %result, "broadcast shapes");
    Ok(result)
}

/// Broadcast the shapes of every value; plain scalars contribute nothing.
///
/// # Examples
///
/// ```
/// use naxis_core::{shape_broadcasted, HasShape, NamedShape, ScalarArray};
///
/// let a = ScalarArray::<f64>::zeros(&NamedShape::from_pairs([("t", 3)]).unwrap());
/// let shape = shape_broadcasted(&[&a as &dyn HasShape, &2.0]).unwrap();
/// assert_eq!(shape.get("t"), Some(3));
/// ```
pub fn shape_broadcasted(values: &[&dyn HasShape]) -> Result<NamedShape> {
    let shapes: Vec<NamedShape> = values.iter().map(|v| v.shape()).collect();
    let refs: Vec<&NamedShape> = shapes.iter().collect();
    broadcast_shapes(&refs)
}

/// Join axis names into the name of a flattened axis.
///
/// # Examples
///
/// ```
/// use naxis_core::flatten_axes;
///
/// assert_eq!(flatten_axes(&["x", "y"]), "x*y");
/// ```
pub fn flatten_axes<S: AsRef<str>>(axes: &[S]) -> String {
    axes.iter()
        .map(|a| a.as_ref())
        .collect::<Vec<_>>()
        .join(AXIS_SEPARATOR)
}

/// Lazy sequence of every integer coordinate of `shape` minus the ignored axes.
///
/// The trailing axis varies fastest. The iterator is finite and can be
/// restarted by cloning it before consumption.
///
/// # Examples
///
/// ```
/// use naxis_core::{ndindex, NamedShape};
///
/// let shape = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
/// let all: Vec<_> = ndindex(&shape, &[]).collect();
/// assert_eq!(all.len(), 6);
/// assert_eq!(all[1]["x"], 0);
/// assert_eq!(all[1]["y"], 1);
///
/// let rows: Vec<_> = ndindex(&shape, &["y"]).collect();
/// assert_eq!(rows.len(), 2);
/// ```
pub fn ndindex(shape: &NamedShape, axis_ignored: &[&str]) -> NdIndex {
    let kept = shape.without(axis_ignored);
    NdIndex {
        names: kept.names(),
        odometer: Odometer::new(kept.sizes()),
    }
}

/// Iterator returned by [`ndindex`].
#[derive(Clone, Debug)]
pub struct NdIndex {
    names: Vec<String>,
    odometer: Odometer,
}

impl Iterator for NdIndex {
    type Item = NamedIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let coords = self.odometer.next()?;
        Some(self.names.iter().cloned().zip(coords).collect())
    }
}

/// Row-major counter over a list of dimension sizes.
#[derive(Clone, Debug)]
pub(crate) struct Odometer {
    dims: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl Odometer {
    pub(crate) fn new(dims: Vec<usize>) -> Self {
        let done = dims.contains(&0);
        let current = vec![0; dims.len()];
        Self {
            dims,
            current,
            done,
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let out = self.current.clone();
        let mut axis = self.dims.len();
        loop {
            if axis == 0 {
                self.done = true;
                break;
            }
            axis -= 1;
            self.current[axis] += 1;
            if self.current[axis] < self.dims[axis] {
                break;
            }
            self.current[axis] = 0;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(pairs: &[(&str, usize)]) -> NamedShape {
        NamedShape::from_pairs(pairs.iter().map(|(n, s)| (*n, *s))).unwrap()
    }

    #[test]
    fn test_broadcast_merges_by_name() {
        let a = shape(&[("x", 3), ("y", 1)]);
        let b = shape(&[("y", 4), ("z", 2)]);
        let c = broadcast_shapes(&[&a, &b]).unwrap();
        assert!(c.equivalent(&shape(&[("z", 2), ("y", 4), ("x", 3)])));
    }

    #[test]
    fn test_broadcast_trailing_order() {
        let a = shape(&[("x", 3), ("y", 1)]);
        let b = shape(&[("y", 4), ("z", 2)]);
        let c = broadcast_shapes(&[&a, &b]).unwrap();
        assert_eq!(c.names(), vec!["z", "x", "y"]);
        assert_eq!(c.sizes(), vec![2, 3, 4]);
    }

    #[test]
    fn test_broadcast_mismatch() {
        let a = shape(&[("x", 3), ("y", 4)]);
        let b = shape(&[("y", 5), ("z", 2)]);
        let err = broadcast_shapes(&[&a, &b]).unwrap_err();
        assert!(matches!(err, NamedArrayError::ShapeMismatch { .. }));
        assert!(err.to_string().contains("{x: 3, y: 4}"));
    }

    #[test]
    fn test_broadcast_single_and_empty() {
        let a = shape(&[("x", 3), ("y", 4)]);
        assert_eq!(broadcast_shapes(&[&a]).unwrap(), a);
        assert!(broadcast_shapes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_broadcast_size_one_stretches_either_side() {
        let a = shape(&[("t", 1)]);
        let b = shape(&[("t", 7)]);
        assert_eq!(broadcast_shapes(&[&a, &b]).unwrap().get("t"), Some(7));
        assert_eq!(broadcast_shapes(&[&b, &a]).unwrap().get("t"), Some(7));
    }

    #[test]
    fn test_shape_broadcasted_ignores_scalars() {
        let a = shape(&[("t", 3)]);
        let result = shape_broadcasted(&[&a as &dyn HasShape, &1.5]).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn test_ndindex_order_and_restart() {
        let s = shape(&[("x", 2), ("y", 2)]);
        let it = ndindex(&s, &[]);
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        let pairs: Vec<(usize, usize)> = first.iter().map(|i| (i["x"], i["y"])).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_ndindex_zero_dim_and_empty_axis() {
        assert_eq!(ndindex(&NamedShape::new(), &[]).count(), 1);
        assert_eq!(ndindex(&shape(&[("x", 0)]), &[]).count(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(shape(&[("x", 2), ("y", 3)]).to_string(), "{x: 2, y: 3}");
    }
}
