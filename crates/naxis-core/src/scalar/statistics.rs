//! Reductions over named axes
//!
//! Every reduction takes an [`AxisSelection`] and an optional boolean `where`
//! mask. The selected axes are moved to the trailing end of the data and
//! folded into one lane per kept coordinate; the mask filters each lane
//! before the reducing function sees it. Empty selections reduce to NaN,
//! except for `sum` (0) and the boolean reductions. `min`, `max` and `ptp`
//! propagate NaN.

use super::types::ScalarArray;
use crate::error::{NamedArrayError, Result};
use crate::shape::{HasShape, NamedShape};
use crate::types::{AxisSelection, Element};
use scirs2_core::ndarray_ext::{Array1, ArrayView1, Axis};

impl<T: Element> ScalarArray<T> {
    /// Generic reduction engine shared by every reducing operation.
    pub(crate) fn reduce_with<U: Element>(
        &self,
        axis: &AxisSelection,
        mask: Option<&ScalarArray<bool>>,
        f: impl Fn(ArrayView1<T>) -> U,
    ) -> Result<ScalarArray<U>> {
        let shape = self.shape();
        let reduced = axis.resolve(&shape)?;
        let kept = shape.without(&reduced);

        let mut order: NamedShape = kept.clone();
        for axis in &reduced {
            order.push(axis.clone(), shape.get(axis).unwrap_or(1))?;
        }
        let outer = kept.size();
        let inner: usize = reduced.iter().filter_map(|a| shape.get(a)).product();
        let lanes = self
            .ndarray_aligned(&order)?
            .into_shape_with_order((outer, inner))
            .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))?;

        let out: Array1<U> = match mask {
            None => lanes.map_axis(Axis(1), f),
            Some(mask) => {
                let flags = mask
                    .broadcast_data(&order)?
                    .into_shape_with_order((outer, inner))
                    .map_err(|e| NamedArrayError::InvalidShape(e.to_string()))?;
                lanes
                    .outer_iter()
                    .zip(flags.outer_iter())
                    .map(|(lane, keep)| {
                        let selected: Array1<T> = lane
                            .iter()
                            .zip(keep.iter())
                            .filter(|(_, keep)| **keep)
                            .map(|(v, _)| v.clone())
                            .collect();
                        f(selected.view())
                    })
                    .collect()
            }
        };
        let mut result = ScalarArray::from_vec(out.to_vec(), &kept)?;
        result.unit = self.unit.clone();
        Ok(result)
    }
}

fn min_of(values: ArrayView1<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.fold(f64::INFINITY, |acc, &v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            acc.min(v)
        }
    })
}

fn max_of(values: ArrayView1<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.fold(f64::NEG_INFINITY, |acc, &v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            acc.max(v)
        }
    })
}

fn mean_of(values: ArrayView1<f64>) -> f64 {
    values.mean().unwrap_or(f64::NAN)
}

fn std_of(values: ArrayView1<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.var(0.0).sqrt()
}

/// Linear-interpolation percentile of unsorted values, `q` in `[0, 100]`.
fn percentile_of(values: ArrayView1<f64>, q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
}

impl ScalarArray<f64> {
    /// Minimum along the selected axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{AxisSelection, HasShape, NamedShape, ScalarArray};
    ///
    /// let s = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
    /// let a = ScalarArray::from_vec(vec![3.0, 1.0, 2.0, 6.0, 5.0, 4.0], &s).unwrap();
    /// let m = a.min(&AxisSelection::from("y"), None).unwrap();
    /// assert_eq!(m.axis_names(), &["x"]);
    /// assert_eq!(m.ndarray().iter().cloned().collect::<Vec<_>>(), vec![1.0, 4.0]);
    /// ```
    pub fn min(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, min_of)
    }

    /// Maximum along the selected axes.
    pub fn max(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, max_of)
    }

    /// Sum along the selected axes.
    pub fn sum(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, |v| v.sum())
    }

    /// Arithmetic mean along the selected axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{AxisSelection, NamedShape, ScalarArray};
    ///
    /// let s = NamedShape::from_pairs([("t", 4)]).unwrap();
    /// let a = ScalarArray::from_vec(vec![1.0, 2.0, 3.0, 10.0], &s).unwrap();
    /// let mask = a.lt(&ScalarArray::scalar(5.0)).unwrap();
    /// let m = a.mean(&AxisSelection::All, Some(&mask)).unwrap();
    /// assert_eq!(m.item().unwrap(), 2.0);
    /// ```
    pub fn mean(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, mean_of)
    }

    /// Population standard deviation along the selected axes.
    pub fn std(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, std_of)
    }

    /// Peak-to-peak range (`max - min`) along the selected axes.
    pub fn ptp(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, |v| max_of(v) - min_of(v))
    }

    /// Root mean square along the selected axes.
    pub fn rms(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, |v| {
            v.mapv(|x| x * x).mean().map_or(f64::NAN, f64::sqrt)
        })
    }

    /// The `q`-th percentile (`0..=100`) along the selected axes, with linear
    /// interpolation between samples.
    pub fn percentile(
        &self,
        q: f64,
        axis: &AxisSelection,
        mask: Option<&ScalarArray<bool>>,
    ) -> Result<Self> {
        if !(0.0..=100.0).contains(&q) {
            return Err(NamedArrayError::InvalidArgument(format!(
                "percentile {} outside of [0, 100]",
                q
            )));
        }
        self.reduce_with(axis, mask, |v| percentile_of(v, q))
    }
}

impl ScalarArray<bool> {
    /// Whether every selected element is true.
    pub fn all(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, |v| v.iter().all(|&b| b))
    }

    /// Whether any selected element is true.
    pub fn any(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Self> {
        self.reduce_with(axis, mask, |v| v.iter().any(|&b| b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ScalarArray<f64> {
        let s = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
        ScalarArray::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &s).unwrap()
    }

    fn values(a: &ScalarArray<f64>) -> Vec<f64> {
        a.ndarray().iter().cloned().collect()
    }

    #[test]
    fn test_sum_over_each_axis() {
        let a = grid();
        assert_eq!(values(&a.sum(&"x".into(), None).unwrap()), vec![5.0, 7.0, 9.0]);
        assert_eq!(values(&a.sum(&"y".into(), None).unwrap()), vec![6.0, 15.0]);
        assert_eq!(a.sum(&AxisSelection::All, None).unwrap().item().unwrap(), 21.0);
    }

    #[test]
    fn test_missing_axis_fails() {
        assert!(matches!(
            grid().max(&"t".into(), None),
            Err(NamedArrayError::AxisNotFound { .. })
        ));
    }

    #[test]
    fn test_mask_broadcasts() {
        let a = grid();
        let s = NamedShape::from_pairs([("y", 3)]).unwrap();
        let mask =
            ScalarArray::from_vec(vec![true, false, true], &s).unwrap();
        let m = a.sum(&"y".into(), Some(&mask)).unwrap();
        assert_eq!(values(&m), vec![4.0, 10.0]);
    }

    #[test]
    fn test_empty_selection() {
        let a = grid();
        let none = ScalarArray::full(&a.shape(), false);
        assert_eq!(a.sum(&AxisSelection::All, Some(&none)).unwrap().item().unwrap(), 0.0);
        assert!(a.mean(&AxisSelection::All, Some(&none)).unwrap().item().unwrap().is_nan());
    }

    #[test]
    fn test_std_ptp_rms_percentile() {
        let s = NamedShape::from_pairs([("t", 4)]).unwrap();
        let a = ScalarArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &s).unwrap();
        let all = AxisSelection::All;
        assert!((a.std(&all, None).unwrap().item().unwrap() - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(a.ptp(&all, None).unwrap().item().unwrap(), 3.0);
        assert!((a.rms(&all, None).unwrap().item().unwrap() - 7.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(a.percentile(50.0, &all, None).unwrap().item().unwrap(), 2.5);
        assert_eq!(a.percentile(100.0, &all, None).unwrap().item().unwrap(), 4.0);
        assert!(a.percentile(101.0, &all, None).is_err());
    }

    #[test]
    fn test_min_max_propagate_nan() {
        let s = NamedShape::from_pairs([("t", 3)]).unwrap();
        let a = ScalarArray::from_vec(vec![1.0, f64::NAN, 3.0], &s).unwrap();
        let all = AxisSelection::All;
        assert!(a.min(&all, None).unwrap().item().unwrap().is_nan());
        assert!(a.max(&all, None).unwrap().item().unwrap().is_nan());
        assert!(a.ptp(&all, None).unwrap().item().unwrap().is_nan());
        assert!(a.mean(&all, None).unwrap().item().unwrap().is_nan());
    }

    #[test]
    fn test_nan_is_confined_to_its_lane() {
        let s = NamedShape::from_pairs([("x", 2), ("y", 2)]).unwrap();
        let a = ScalarArray::from_vec(vec![f64::NAN, 2.0, 5.0, 4.0], &s).unwrap();
        let m = values(&a.min(&"y".into(), None).unwrap());
        assert!(m[0].is_nan());
        assert_eq!(m[1], 4.0);

        // Masking the NaN out restores a finite result.
        let mask = ScalarArray::from_vec(vec![false, true, true, true], &s).unwrap();
        assert_eq!(values(&a.min(&"y".into(), Some(&mask)).unwrap()), vec![2.0, 4.0]);
    }

    #[test]
    fn test_all_any() {
        let s = NamedShape::from_pairs([("x", 2), ("y", 2)]).unwrap();
        let b = ScalarArray::from_vec(vec![true, false, true, true], &s).unwrap();
        let all: Vec<bool> = b.all(&"y".into(), None).unwrap().ndarray().iter().cloned().collect();
        let any: Vec<bool> = b.any(&"x".into(), None).unwrap().ndarray().iter().cloned().collect();
        assert_eq!(all, vec![false, true]);
        assert_eq!(any, vec![true, true]);
    }
}
