//! Scalar arrays carrying a sampled uncertainty
//!
//! An [`UncertainScalarArray`] pairs a nominal value with a set of samples
//! stored along a dedicated distribution axis. Arithmetic applies to the
//! nominal value and to every sample independently. The distribution axis
//! is not part of the array's named shape.
//!
//! Uncertain arrays also act as index values: indexing any host with an
//! uncertain index gives an uncertain result whose nominal value is the host
//! indexed by the nominal index, and whose distribution is the host indexed
//! by the sampled indices.

use crate::array::{Array, ArrayKind, NamedArray};
use crate::error::{NamedArrayError, Result};
use crate::indexing::{getitem, Item};
use crate::scalar::ScalarArray;
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use crate::types::DType;
use crate::units::Unit;

/// Default name of the axis holding the samples.
pub const AXIS_DISTRIBUTION: &str = "_distribution";

/// Nominal value plus samples of its distribution.
///
/// # Examples
///
/// ```
/// use naxis_core::{HasShape, NamedShape, ScalarArray, UncertainScalarArray};
///
/// let samples = NamedShape::from_pairs([("_distribution", 3)]).unwrap();
/// let u = UncertainScalarArray::new(
///     ScalarArray::scalar(1.0),
///     ScalarArray::from_vec(vec![0.9, 1.0, 1.1], &samples).unwrap(),
/// )
/// .unwrap();
/// assert!(u.shape().is_empty());
/// assert_eq!(u.num_distribution(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct UncertainScalarArray {
    nominal: ScalarArray<f64>,
    distribution: ScalarArray<f64>,
    axis_distribution: String,
    shape: NamedShape,
}

impl UncertainScalarArray {
    /// Build an uncertain array whose samples lie along [`AXIS_DISTRIBUTION`].
    pub fn new(nominal: ScalarArray<f64>, distribution: ScalarArray<f64>) -> Result<Self> {
        Self::with_axis(nominal, distribution, AXIS_DISTRIBUTION)
    }

    /// Build an uncertain array with a custom distribution axis name.
    ///
    /// # Errors
    ///
    /// Fails if the nominal value has the distribution axis, or if nominal
    /// and distribution do not broadcast together.
    pub fn with_axis(
        nominal: ScalarArray<f64>,
        distribution: ScalarArray<f64>,
        axis_distribution: impl Into<String>,
    ) -> Result<Self> {
        let axis_distribution = axis_distribution.into();
        let nominal_shape = nominal.shape();
        if nominal_shape.contains(&axis_distribution) {
            return Err(NamedArrayError::InvalidShape(format!(
                "nominal value {} cannot have the distribution axis '{}'",
                nominal_shape, axis_distribution
            )));
        }
        let sampled = distribution.shape().without(&[axis_distribution.as_str()]);
        let shape = broadcast_shapes(&[&nominal_shape, &sampled])?;
        Ok(Self {
            nominal,
            distribution,
            axis_distribution,
            shape,
        })
    }

    /// Uncertain array without spread: every sample equals the nominal value.
    pub fn from_scalar(value: ScalarArray<f64>) -> Self {
        let shape = value.shape();
        Self {
            nominal: value.clone(),
            distribution: value,
            axis_distribution: AXIS_DISTRIBUTION.to_string(),
            shape,
        }
    }

    pub fn nominal(&self) -> &ScalarArray<f64> {
        &self.nominal
    }

    pub fn distribution(&self) -> &ScalarArray<f64> {
        &self.distribution
    }

    pub fn axis_distribution(&self) -> &str {
        &self.axis_distribution
    }

    /// Number of samples (1 when the distribution has no sample axis).
    pub fn num_distribution(&self) -> usize {
        self.distribution
            .shape()
            .get(&self.axis_distribution)
            .unwrap_or(1)
    }

    /// Shape of the broadcast distribution: the array shape plus the
    /// trailing distribution axis.
    pub fn shape_distribution(&self) -> NamedShape {
        let mut shape = self.shape.clone();
        shape.set(&self.axis_distribution, self.num_distribution());
        shape
    }

    /// Nominal value broadcast to the full shape.
    pub fn nominal_full(&self) -> Result<ScalarArray<f64>> {
        self.nominal.broadcast_to(&self.shape)
    }

    /// Samples broadcast to [`shape_distribution`](Self::shape_distribution).
    pub fn distribution_full(&self) -> Result<ScalarArray<f64>> {
        self.distribution.broadcast_to(&self.shape_distribution())
    }

    /// Same samples with new nominal and distribution values.
    pub(crate) fn with_parts(
        &self,
        nominal: ScalarArray<f64>,
        distribution: ScalarArray<f64>,
    ) -> Result<Self> {
        Self::with_axis(nominal, distribution, self.axis_distribution.clone())
    }

    /// Sample mean along the distribution axis.
    pub fn mean_distribution(&self) -> Result<ScalarArray<f64>> {
        self.distribution_full()?
            .mean(&self.axis_distribution.as_str().into(), None)
    }

    /// Sample standard deviation along the distribution axis.
    pub fn std_distribution(&self) -> Result<ScalarArray<f64>> {
        self.distribution_full()?
            .std(&self.axis_distribution.as_str().into(), None)
    }

    /// Fully independent copy.
    pub fn copy(&self) -> Self {
        Self {
            nominal: self.nominal.copy(),
            distribution: self.distribution.copy(),
            axis_distribution: self.axis_distribution.clone(),
            shape: self.shape.clone(),
        }
    }

    /// Broadcast both parts to `shape`.
    pub fn broadcast_to(&self, shape: &NamedShape) -> Result<Self> {
        let mut sampled = shape.clone();
        sampled.push(self.axis_distribution.clone(), self.num_distribution())?;
        self.with_parts(
            self.nominal.broadcast_to(shape)?,
            self.distribution.broadcast_to(&sampled)?,
        )
    }

    /// Positional reshape of both parts; samples stay on their own axis.
    pub fn reshape(&self, shape: &NamedShape) -> Result<Self> {
        let mut sampled = shape.clone();
        sampled.push(self.axis_distribution.clone(), self.num_distribution())?;
        self.with_parts(
            self.nominal_full()?.reshape(shape)?,
            self.distribution_full()?.reshape(&sampled)?,
        )
    }

    /// Permute the axes of both parts; the distribution axis stays last.
    pub fn transpose(&self, axes: Option<&[&str]>) -> Result<Self> {
        let nominal = self.nominal_full()?.transpose(axes)?;
        let mut order: Vec<&str> = nominal.axis_names().iter().map(String::as_str).collect();
        order.push(&self.axis_distribution);
        let distribution = self.distribution_full()?.transpose(Some(&order[..]))?;
        self.with_parts(nominal, distribution)
    }

    /// Direct indexing handler.
    ///
    /// Uncertain index values inside `item` are split the same way the host
    /// is: the nominal part indexes the nominal value, the sampled part the
    /// distribution.
    pub(crate) fn getitem_direct(&self, item: &Item) -> Option<Result<Self>> {
        if let Item::Array(mask) = item {
            if !matches!(mask, Array::Bool(_)) {
                return None;
            }
        }
        Some(self.getitem_split(item))
    }

    fn getitem_split(&self, item: &Item) -> Result<Self> {
        let item_nominal = item.map_arrays(|a| split_index(a, Part::Nominal))?;
        let item_distribution = item.map_arrays(|a| split_index(a, Part::Distribution))?;
        let nominal = getitem(&Array::Scalar(self.nominal_full()?), &item_nominal)?;
        let distribution = getitem(&Array::Scalar(self.distribution_full()?), &item_distribution)?;
        self.assemble(nominal, distribution)
    }

    /// Reversed indexing handler: index an arbitrary `host` with this array.
    pub(crate) fn index_host(&self, host: &Array, item: &Item) -> Option<Result<Array>> {
        if matches!(item, Item::Array(_)) {
            return None;
        }
        Some(self.index_host_split(host, item))
    }

    fn index_host_split(&self, host: &Array, item: &Item) -> Result<Array> {
        let item_nominal = item.map_arrays(|a| split_index(a, Part::Nominal))?;
        let item_distribution = item.map_arrays(|a| split_index(a, Part::Distribution))?;
        let nominal = getitem(host, &item_nominal)?;
        let distribution = getitem(host, &item_distribution)?;
        Ok(Array::Uncertain(self.assemble(nominal, distribution)?))
    }

    fn assemble(&self, nominal: Array, distribution: Array) -> Result<Self> {
        match (nominal, distribution) {
            (Array::Scalar(n), Array::Scalar(d)) => self.with_parts(n, d),
            (n, _) => Err(NamedArrayError::IncompatibleKinds {
                from: n.type_name(),
                to: ArrayKind::Uncertain.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy)]
enum Part {
    Nominal,
    Distribution,
}

/// Replace an uncertain index value by one of its parts as an integer array.
fn split_index(index: &Array, part: Part) -> Result<Array> {
    let Array::Uncertain(u) = index else {
        return Ok(index.clone());
    };
    let values = match part {
        Part::Nominal => &u.nominal,
        Part::Distribution => &u.distribution,
    };
    if values.ndarray().iter().any(|v| v.fract() != 0.0) {
        return Err(NamedArrayError::InvalidArgument(format!(
            "uncertain index {} has non-integral values",
            values
        )));
    }
    Ok(Array::Int(values.cast::<i64>()?))
}

impl HasShape for UncertainScalarArray {
    fn shape(&self) -> NamedShape {
        self.shape.clone()
    }
}

impl NamedArray for UncertainScalarArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Uncertain
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        self.nominal.unit().cloned()
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::Uncertain(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexing::IndexSpec;

    fn samples(values: Vec<f64>) -> ScalarArray<f64> {
        let shape = NamedShape::from_pairs([(AXIS_DISTRIBUTION, values.len())]).unwrap();
        ScalarArray::from_vec(values, &shape).unwrap()
    }

    fn line(axis: &str, values: Vec<f64>) -> ScalarArray<f64> {
        let shape = NamedShape::from_pairs([(axis, values.len())]).unwrap();
        ScalarArray::from_vec(values, &shape).unwrap()
    }

    #[test]
    fn test_shape_excludes_distribution_axis() {
        let u = UncertainScalarArray::new(line("t", vec![1.0, 2.0]), samples(vec![0.0, 1.0, 2.0]))
            .unwrap();
        assert_eq!(u.axes(), vec!["t"]);
        let full = u.distribution_full().unwrap();
        assert_eq!(full.axis_names(), &["t", AXIS_DISTRIBUTION]);
        assert_eq!(full.size(), 6);
    }

    #[test]
    fn test_nominal_with_distribution_axis_fails() {
        let bad = samples(vec![1.0, 2.0]);
        assert!(UncertainScalarArray::new(bad.clone(), bad).is_err());
    }

    #[test]
    fn test_distribution_statistics() {
        let u = UncertainScalarArray::new(ScalarArray::scalar(2.0), samples(vec![1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(u.mean_distribution().unwrap().item().unwrap(), 2.0);
        assert!((u.std_distribution().unwrap().item().unwrap() - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_uncertain_index_reversed_dispatch() {
        let host: Array = line("x", vec![10.0, 11.0, 12.0, 13.0]).into();
        let index = UncertainScalarArray::new(ScalarArray::scalar(1.0), samples(vec![0.0, 2.0]))
            .unwrap();
        let item = Item::axes([("x", IndexSpec::Array(Array::Uncertain(index)))]);
        let Array::Uncertain(r) = getitem(&host, &item).unwrap() else {
            panic!("expected an uncertain result");
        };
        assert_eq!(r.nominal().item().unwrap(), 11.0);
        let d: Vec<f64> = r.distribution().ndarray().iter().cloned().collect();
        assert_eq!(d, vec![10.0, 12.0]);
    }

    #[test]
    fn test_fractional_uncertain_index_fails() {
        let host: Array = line("x", vec![10.0, 11.0]).into();
        let index = UncertainScalarArray::from_scalar(ScalarArray::scalar(0.5));
        let item = Item::axes([("x", IndexSpec::Array(Array::Uncertain(index)))]);
        assert!(matches!(
            getitem(&host, &item),
            Err(NamedArrayError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_direct_indexing_keeps_samples() {
        let u = UncertainScalarArray::new(
            line("t", vec![1.0, 2.0, 3.0]),
            samples(vec![-1.0, 1.0]),
        )
        .unwrap();
        let host = Array::Uncertain(u);
        let Array::Uncertain(r) = getitem(&host, &Item::axes([("t", 2)])).unwrap() else {
            panic!("expected an uncertain result");
        };
        assert_eq!(r.nominal().item().unwrap(), 3.0);
        assert_eq!(r.num_distribution(), 2);
    }

    #[test]
    fn test_transpose_keeps_distribution_last() {
        let s = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
        let u = UncertainScalarArray::new(ScalarArray::zeros(&s), samples(vec![0.0, 1.0])).unwrap();
        let t = u.transpose(None).unwrap();
        assert_eq!(t.axes(), vec!["y", "x"]);
        assert_eq!(
            t.distribution().axis_names(),
            &["y".to_string(), "x".to_string(), AXIS_DISTRIBUTION.to_string()]
        );
    }
}
