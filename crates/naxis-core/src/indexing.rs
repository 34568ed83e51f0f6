//! Name-keyed indexing with double dispatch
//!
//! An [`Item`] is either a single boolean array used as a mask or a list of
//! `(axis, IndexSpec)` pairs. [`getitem`] resolves an item in two phases:
//!
//! 1. the host array tries its own handler;
//! 2. otherwise every array-valued index entry (or the mask itself) is asked,
//!    through [`IndexKey::try_index_as_key`], to index the host.
//!
//! The first handler that accepts the item wins. When nobody does, indexing
//! fails with [`NamedArrayError::UnsupportedIndex`].
//!
//! # Examples
//!
//! ```
//! use naxis_core::{getitem, Array, HasShape, Item, NamedShape, ScalarArray, SliceSpec};
//!
//! let shape = NamedShape::from_pairs([("x", 3), ("y", 4)]).unwrap();
//! let a: Array = ScalarArray::from_vec((0..12).map(f64::from).collect(), &shape)
//!     .unwrap()
//!     .into();
//!
//! let row = getitem(&a, &Item::axes([("x", 1)])).unwrap();
//! assert_eq!(row.axes(), vec!["y"]);
//!
//! let part = getitem(&a, &Item::axes([("y", SliceSpec::new(Some(1), Some(3)))])).unwrap();
//! assert_eq!(part.shape().get("y"), Some(2));
//! ```

use crate::array::Array;
use crate::error::{NamedArrayError, Result};
use crate::scalar::ScalarArray;
use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::sync::Arc;

/// Half-open slice over one axis with optional negative bounds and step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceSpec {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceSpec {
    /// Slice from `start` (inclusive) to `stop` (exclusive) with unit step.
    pub fn new(start: Option<i64>, stop: Option<i64>) -> Self {
        Self {
            start,
            stop,
            step: None,
        }
    }

    /// Slice selecting a whole axis.
    pub fn full() -> Self {
        Self::default()
    }

    /// Same slice with another step.
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Selected positions along an axis of `size` elements.
    ///
    /// Negative bounds count from the end and out-of-range bounds are clamped.
    ///
    /// # Errors
    ///
    /// Fails when the step is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::SliceSpec;
    ///
    /// assert_eq!(SliceSpec::new(Some(-2), None).indices(5).unwrap(), vec![3, 4]);
    /// assert_eq!(SliceSpec::full().with_step(-2).indices(5).unwrap(), vec![4, 2, 0]);
    /// assert_eq!(SliceSpec::new(Some(3), Some(1)).indices(5).unwrap(), Vec::<usize>::new());
    /// ```
    pub fn indices(&self, size: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(NamedArrayError::InvalidArgument(
                "slice step cannot be zero".to_string(),
            ));
        }
        let n = size as i64;
        let resolve = |bound: i64, lower: i64, upper: i64| {
            let bound = if bound < 0 { bound + n } else { bound };
            bound.clamp(lower, upper)
        };
        let mut out = Vec::new();
        if step > 0 {
            let start = self.start.map_or(0, |s| resolve(s, 0, n));
            let stop = self.stop.map_or(n, |s| resolve(s, 0, n));
            let mut i = start;
            while i < stop {
                out.push(i as usize);
                i += step;
            }
        } else {
            let start = self.start.map_or(n - 1, |s| resolve(s, -1, n - 1));
            let stop = self.stop.map_or(-1, |s| resolve(s, -1, n - 1));
            let mut i = start;
            while i > stop {
                out.push(i as usize);
                i += step;
            }
        }
        Ok(out)
    }
}

impl From<Range<i64>> for SliceSpec {
    fn from(range: Range<i64>) -> Self {
        Self::new(Some(range.start), Some(range.end))
    }
}

impl From<RangeFrom<i64>> for SliceSpec {
    fn from(range: RangeFrom<i64>) -> Self {
        Self::new(Some(range.start), None)
    }
}

impl From<RangeTo<i64>> for SliceSpec {
    fn from(range: RangeTo<i64>) -> Self {
        Self::new(None, Some(range.end))
    }
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

/// Value that can index an arbitrary host array in place of the host's own
/// handler (the reversed half of the indexing double dispatch).
pub trait IndexKey: Send + Sync {
    /// Index `host` with `item`, or return `None` to decline.
    fn try_index_as_key(&self, host: &Array, item: &Item) -> Option<Result<Array>>;
}

/// Index specification for a single axis.
#[derive(Clone)]
pub enum IndexSpec {
    /// Select one position and drop the axis
    Int(i64),
    /// Select a strided range and keep the axis
    Slice(SliceSpec),
    /// Per-element index given by another named array
    Array(Array),
    /// Custom index value resolved by reversed dispatch only
    Key(Arc<dyn IndexKey>),
}

impl fmt::Debug for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSpec::Int(i) => write!(f, "Int({})", i),
            IndexSpec::Slice(s) => write!(f, "Slice({:?})", s),
            IndexSpec::Array(a) => write!(f, "Array({})", a.type_name()),
            IndexSpec::Key(_) => f.write_str("Key(..)"),
        }
    }
}

impl From<i64> for IndexSpec {
    fn from(index: i64) -> Self {
        IndexSpec::Int(index)
    }
}

impl From<i32> for IndexSpec {
    fn from(index: i32) -> Self {
        IndexSpec::Int(index as i64)
    }
}

impl From<usize> for IndexSpec {
    fn from(index: usize) -> Self {
        IndexSpec::Int(index as i64)
    }
}

impl From<SliceSpec> for IndexSpec {
    fn from(slice: SliceSpec) -> Self {
        IndexSpec::Slice(slice)
    }
}

impl From<Range<i64>> for IndexSpec {
    fn from(range: Range<i64>) -> Self {
        IndexSpec::Slice(range.into())
    }
}

impl From<RangeFull> for IndexSpec {
    fn from(range: RangeFull) -> Self {
        IndexSpec::Slice(range.into())
    }
}

impl From<Array> for IndexSpec {
    fn from(array: Array) -> Self {
        IndexSpec::Array(array)
    }
}

impl From<ScalarArray<i64>> for IndexSpec {
    fn from(array: ScalarArray<i64>) -> Self {
        IndexSpec::Array(Array::Int(array))
    }
}

/// Indexing request.
#[derive(Clone, Debug)]
pub enum Item {
    /// Boolean mask selecting elements over the mask's axes
    Array(Array),
    /// Per-axis index specifications; axes the host lacks are ignored
    Axes(Vec<(String, IndexSpec)>),
}

impl Item {
    /// Build an axis-keyed item from `(axis, spec)` pairs.
    pub fn axes<I, S, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<IndexSpec>,
    {
        Item::Axes(
            pairs
                .into_iter()
                .map(|(axis, spec)| (axis.into(), spec.into()))
                .collect(),
        )
    }

    /// Build a mask item.
    pub fn mask(mask: impl Into<Array>) -> Self {
        Item::Array(mask.into())
    }

    /// Index specification for `axis`, if the item names it.
    pub fn get(&self, axis: &str) -> Option<&IndexSpec> {
        match self {
            Item::Array(_) => None,
            Item::Axes(pairs) => pairs.iter().find(|(a, _)| a == axis).map(|(_, s)| s),
        }
    }

    /// Same item with every array-valued entry replaced by `f(entry)`.
    pub(crate) fn map_arrays(&self, f: impl Fn(&Array) -> Result<Array>) -> Result<Item> {
        Ok(match self {
            Item::Array(a) => Item::Array(f(a)?),
            Item::Axes(pairs) => Item::Axes(
                pairs
                    .iter()
                    .map(|(axis, spec)| {
                        let spec = match spec {
                            IndexSpec::Array(a) => IndexSpec::Array(f(a)?),
                            other => other.clone(),
                        };
                        Ok((axis.clone(), spec))
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }
}

impl From<Array> for Item {
    fn from(mask: Array) -> Self {
        Item::Array(mask)
    }
}

/// Index `host` with `item`, trying the host first and every array-valued
/// index entry second.
///
/// # Errors
///
/// [`NamedArrayError::UnsupportedIndex`] when no handler accepts the item, or
/// whatever error the accepting handler produced.
pub fn getitem(host: &Array, item: &Item) -> Result<Array> {
    if let Some(result) = host.getitem_direct(item) {
        return result;
    }
    let keys: Vec<&dyn IndexKey> = match item {
        Item::Array(a) => vec![a as &dyn IndexKey],
        Item::Axes(pairs) => pairs
            .iter()
            .filter_map(|(_, spec)| match spec {
                IndexSpec::Array(a) => Some(a as &dyn IndexKey),
                IndexSpec::Key(k) => Some(k.as_ref()),
                _ => None,
            })
            .collect(),
    };
    for key in keys {
        if let Some(result) = key.try_index_as_key(host, item) {
            tracing::trace!(host = %host.type_name(), "index resolved by reversed handler");
            return result;
        }
    }
    Err(NamedArrayError::UnsupportedIndex {
        host: host.type_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{HasShape, NamedShape};

    fn grid() -> Array {
        let shape = NamedShape::from_pairs([("x", 3), ("y", 4)]).unwrap();
        ScalarArray::from_vec((0..12).map(f64::from).collect(), &shape)
            .unwrap()
            .into()
    }

    fn values(a: &Array) -> Vec<f64> {
        match a {
            Array::Scalar(s) => s.ndarray().iter().cloned().collect(),
            _ => panic!("expected a scalar array"),
        }
    }

    #[test]
    fn test_slice_indices_negative_bounds_and_steps() {
        let s = |a, b| SliceSpec::new(a, b);
        assert_eq!(s(None, None).indices(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(s(Some(1), Some(100)).indices(3).unwrap(), vec![1, 2]);
        assert_eq!(s(Some(-100), Some(-1)).indices(3).unwrap(), vec![0, 1]);
        assert_eq!(s(Some(2), Some(0)).with_step(-1).indices(3).unwrap(), vec![2, 1]);
        assert!(s(None, None).with_step(0).indices(3).is_err());
    }

    #[test]
    fn test_int_and_slice() {
        let a = grid();
        let r = getitem(&a, &Item::axes([("x", IndexSpec::from(2)), ("y", SliceSpec::new(Some(1), Some(3)).into())])).unwrap();
        assert_eq!(r.axes(), vec!["y"]);
        assert_eq!(values(&r), vec![9.0, 10.0]);
    }

    #[test]
    fn test_negative_and_out_of_bounds() {
        let a = grid();
        let r = getitem(&a, &Item::axes([("x", -1), ("y", -1)])).unwrap();
        assert_eq!(values(&r), vec![11.0]);
        assert!(matches!(
            getitem(&a, &Item::axes([("x", 3)])),
            Err(NamedArrayError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_unknown_axis_is_ignored() {
        let a = grid();
        let r = getitem(&a, &Item::axes([("t", 0)])).unwrap();
        assert_eq!(r.shape(), a.shape());
    }

    #[test]
    fn test_index_array_gathers_along_new_axis() {
        let a = grid();
        let shape = NamedShape::from_pairs([("k", 2)]).unwrap();
        let idx = ScalarArray::from_vec(vec![3i64, 0], &shape).unwrap();
        let r = getitem(&a, &Item::axes([("y", idx)])).unwrap();
        assert!(r.shape().equivalent(&NamedShape::from_pairs([("x", 3), ("k", 2)]).unwrap()));
        let r = getitem(&r, &Item::axes([("x", 1)])).unwrap();
        assert_eq!(values(&r), vec![7.0, 4.0]);
    }

    #[test]
    fn test_index_array_pointwise_on_shared_axis() {
        let a = grid();
        let shape = NamedShape::from_pairs([("x", 3)]).unwrap();
        let idx = ScalarArray::from_vec(vec![0i64, 1, 2], &shape).unwrap();
        let diag = getitem(&a, &Item::axes([("y", idx)])).unwrap();
        assert_eq!(diag.axes(), vec!["x"]);
        assert_eq!(values(&diag), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_mask_flattens_mask_axes() {
        let a = grid();
        let Array::Scalar(s) = &a else { unreachable!() };
        let mask = s.gt(&ScalarArray::scalar(8.5)).unwrap();
        let r = getitem(&a, &Item::mask(mask)).unwrap();
        assert_eq!(r.axes(), vec!["x*y"]);
        assert_eq!(values(&r), vec![9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_float_mask_is_unsupported() {
        let a = grid();
        let err = getitem(&a, &Item::mask(ScalarArray::scalar(1.0))).unwrap_err();
        assert!(matches!(err, NamedArrayError::UnsupportedIndex { .. }));
        assert!(err.to_string().contains("ScalarArray"));
    }

    struct FirstElement;

    impl IndexKey for FirstElement {
        fn try_index_as_key(&self, host: &Array, _item: &Item) -> Option<Result<Array>> {
            let zeros: Vec<(String, IndexSpec)> = host
                .axes()
                .into_iter()
                .map(|a| (a, IndexSpec::Int(0)))
                .collect();
            Some(getitem(host, &Item::Axes(zeros)))
        }
    }

    #[test]
    fn test_custom_key_reversed_dispatch() {
        let a = grid();
        let item = Item::axes([("x", IndexSpec::Key(Arc::new(FirstElement)))]);
        let r = getitem(&a, &item).unwrap();
        assert_eq!(values(&r), vec![0.0]);
    }
}
