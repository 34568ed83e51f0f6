//! Lazily materialized parameterized sequences
//!
//! Every sequence stores only its parameters plus a write-once cache. Calling
//! [`Materialize::explicit`] computes the explicit array the first time and
//! returns a shallow copy of the cached result afterwards, so repeated calls
//! are cheap and always give equal arrays.
//!
//! The named shape of a sequence is known at construction: the broadcast of
//! its parameters with the new `{axis: num}` axis placed last.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{HasShape, LinearSpace, Materialize, ScalarArray};
//!
//! let t = LinearSpace::new(0.0, 1.0, "t", 5).unwrap();
//! assert_eq!(t.shape().get("t"), Some(5));
//!
//! let values = t.explicit().unwrap();
//! assert_eq!(values.value_at(&[("t", 4)]).unwrap(), 1.0);
//! assert_eq!(values.value_at(&[("t", 1)]).unwrap(), 0.25);
//! ```

use crate::array::{Array, ArrayKind, Materialize, NamedArray};
use crate::error::{NamedArrayError, Result};
use crate::scalar::ScalarArray;
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use crate::types::DType;
use crate::units::Unit;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Sequences defined by a `start` and a `stop` value.
pub trait RangeLike {
    fn start(&self) -> &ScalarArray<f64>;

    fn stop(&self) -> &ScalarArray<f64>;

    /// `stop - start`
    fn range(&self) -> Result<ScalarArray<f64>> {
        self.stop().checked_sub(self.start())
    }
}

/// Sequences laid out along one new named axis.
pub trait Parameterized {
    /// Name of the new axis
    fn axis(&self) -> &str;

    /// Number of samples along the new axis
    fn num(&self) -> usize;
}

/// Sequences with a constant spacing between samples.
pub trait LinearlyStepped: RangeLike + Parameterized {
    /// Whether `stop` is the last sample
    fn endpoint(&self) -> bool;
}

/// Spacing between the samples of a linearly stepped sequence.
///
/// `range / (num - 1)` with an endpoint and `range / num` without one. A
/// single-sample sequence uses the whole range as its step.
pub fn step<S: LinearlyStepped + ?Sized>(space: &S) -> Result<ScalarArray<f64>> {
    let divisor = if space.endpoint() {
        space.num().saturating_sub(1)
    } else {
        space.num()
    };
    space
        .range()?
        .checked_div(&ScalarArray::scalar(divisor.max(1) as f64))
}

/// Named shape of a sequence: the parameter shapes with `{axis: num}` last.
pub(crate) fn sequence_shape(params: &[&ScalarArray<f64>], axis: &NamedShape) -> Result<NamedShape> {
    let mut shapes: Vec<NamedShape> = vec![axis.clone()];
    shapes.extend(params.iter().map(|p| p.shape()));
    let refs: Vec<&NamedShape> = shapes.iter().collect();
    broadcast_shapes(&refs)
}

pub(crate) fn axis_shape(axis: &str, num: usize) -> Result<NamedShape> {
    NamedShape::from_pairs([(axis, num)])
}

/// `0, 1, ..., num - 1` along `axis`.
pub(crate) fn axis_index(axis: &str, num: usize) -> Result<ScalarArray<f64>> {
    ScalarArray::from_vec((0..num).map(|i| i as f64).collect(), &axis_shape(axis, num)?)
}

/// Fetch the cached explicit array, computing it on the first call.
pub(crate) fn cached<T: Clone>(
    cache: &OnceLock<T>,
    name: &str,
    compute: impl FnOnce() -> Result<T>,
) -> Result<T> {
    if let Some(value) = cache.get() {
        return Ok(value.clone());
    }
    let value = compute()?;
    tracing::debug!(sequence = name, "materialized implicit array");
    Ok(cache.get_or_init(|| value).clone())
}

/// Evenly spaced values between `start` and `stop` along `axis`.
pub(crate) fn linear_values(
    start: &ScalarArray<f64>,
    stop: &ScalarArray<f64>,
    axis: &str,
    num: usize,
    endpoint: bool,
) -> Result<ScalarArray<f64>> {
    let divisor = if endpoint { num.saturating_sub(1) } else { num };
    let step = stop
        .checked_sub(start)?
        .checked_div(&ScalarArray::scalar(divisor.max(1) as f64))?;
    let offsets = axis_index(axis, num)?.checked_mul(&step)?;
    // The offsets carry the unit of `start` after the subtraction.
    start.checked_add(&offsets)
}

macro_rules! impl_implicit_scalar {
    ($t:ty) => {
        impl $crate::shape::HasShape for $t {
            fn shape(&self) -> $crate::shape::NamedShape {
                self.shape.clone()
            }
        }

        impl $crate::array::NamedArray for $t {
            fn kind(&self) -> $crate::array::ArrayKind {
                $crate::array::ArrayKind::Scalar
            }

            fn dtype(&self) -> $crate::types::DType {
                $crate::types::DType::F64
            }

            /// Unit of `start`, which every sample carries.
            fn unit(&self) -> Option<$crate::units::Unit> {
                $crate::sequences::RangeLike::start(self).unit().cloned()
            }

            fn to_array(&self) -> $crate::error::Result<$crate::array::Array> {
                Ok($crate::array::Array::Scalar(
                    $crate::array::Materialize::explicit(self)?,
                ))
            }
        }
    };
}

pub(crate) use impl_implicit_scalar;

/// Integers from `start` (inclusive) to `stop` (exclusive) by `step`.
///
/// # Examples
///
/// ```
/// use naxis_core::{ArrayRange, HasShape, Materialize};
///
/// let r = ArrayRange::new(2, 9, "i").unwrap().with_step(3).unwrap();
/// assert_eq!(r.num(), 3);
/// let values: Vec<i64> = r.explicit().unwrap().ndarray().iter().cloned().collect();
/// assert_eq!(values, vec![2, 5, 8]);
/// ```
#[derive(Clone, Debug)]
pub struct ArrayRange {
    start: i64,
    stop: i64,
    step: i64,
    axis: String,
    cache: OnceLock<ScalarArray<i64>>,
}

impl ArrayRange {
    /// Unit-step range along `axis`.
    pub fn new(start: i64, stop: i64, axis: impl Into<String>) -> Result<Self> {
        Ok(Self {
            start,
            stop,
            step: 1,
            axis: axis.into(),
            cache: OnceLock::new(),
        })
    }

    /// Same range with another step.
    ///
    /// # Errors
    ///
    /// Fails for a zero step.
    pub fn with_step(self, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(NamedArrayError::InvalidArgument(
                "range step cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            step,
            cache: OnceLock::new(),
            ..self
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn axis(&self) -> &str {
        &self.axis
    }

    /// Number of values, `ceil((stop - start) / step)` clamped at zero.
    pub fn num(&self) -> usize {
        let span = self.stop - self.start;
        let n = span / self.step + i64::from(span % self.step != 0);
        n.max(0) as usize
    }
}

impl Materialize for ArrayRange {
    type Output = ScalarArray<i64>;

    fn explicit(&self) -> Result<ScalarArray<i64>> {
        cached(&self.cache, "ArrayRange", || {
            let values = (0..self.num() as i64)
                .map(|i| self.start + i * self.step)
                .collect();
            ScalarArray::from_vec(values, &axis_shape(&self.axis, self.num())?)
        })
    }
}

impl HasShape for ArrayRange {
    fn shape(&self) -> NamedShape {
        NamedShape::from_parts_unchecked(&[self.axis.clone()], &[self.num()])
    }
}

impl NamedArray for ArrayRange {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Int
    }

    fn dtype(&self) -> DType {
        DType::I64
    }

    fn unit(&self) -> Option<Unit> {
        None
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::Int(self.explicit()?))
    }
}

/// Integer index range `0..size` for every axis of `shape`.
///
/// # Examples
///
/// ```
/// use naxis_core::{indices, HasShape, NamedShape};
///
/// let shape = NamedShape::from_pairs([("x", 3), ("y", 2)]).unwrap();
/// let idx = indices(&shape).unwrap();
/// assert_eq!(idx["x"].num(), 3);
/// assert_eq!(idx["y"].axes(), vec!["y"]);
/// ```
pub fn indices(shape: &NamedShape) -> Result<BTreeMap<String, ArrayRange>> {
    shape
        .iter()
        .map(|(axis, size)| Ok((axis.to_string(), ArrayRange::new(0, size as i64, axis)?)))
        .collect()
}

/// `num` evenly spaced samples from `start` to `stop` along `axis`.
#[derive(Clone, Debug)]
pub struct LinearSpace {
    start: ScalarArray<f64>,
    stop: ScalarArray<f64>,
    axis: String,
    num: usize,
    endpoint: bool,
    shape: NamedShape,
    cache: OnceLock<ScalarArray<f64>>,
}

impl LinearSpace {
    /// Linear space including its endpoint.
    ///
    /// # Errors
    ///
    /// Fails if `start` and `stop` do not broadcast together or already
    /// have `axis` with a size other than `num` or 1.
    pub fn new(
        start: impl Into<ScalarArray<f64>>,
        stop: impl Into<ScalarArray<f64>>,
        axis: impl Into<String>,
        num: usize,
    ) -> Result<Self> {
        let (start, stop, axis) = (start.into(), stop.into(), axis.into());
        let shape = sequence_shape(&[&start, &stop], &axis_shape(&axis, num)?)?;
        Ok(Self {
            start,
            stop,
            axis,
            num,
            endpoint: true,
            shape,
            cache: OnceLock::new(),
        })
    }

    /// Same space with or without its endpoint.
    pub fn with_endpoint(self, endpoint: bool) -> Self {
        Self {
            endpoint,
            cache: OnceLock::new(),
            ..self
        }
    }
}

impl RangeLike for LinearSpace {
    fn start(&self) -> &ScalarArray<f64> {
        &self.start
    }

    fn stop(&self) -> &ScalarArray<f64> {
        &self.stop
    }
}

impl Parameterized for LinearSpace {
    fn axis(&self) -> &str {
        &self.axis
    }

    fn num(&self) -> usize {
        self.num
    }
}

impl LinearlyStepped for LinearSpace {
    fn endpoint(&self) -> bool {
        self.endpoint
    }
}

impl Materialize for LinearSpace {
    type Output = ScalarArray<f64>;

    fn explicit(&self) -> Result<ScalarArray<f64>> {
        cached(&self.cache, "LinearSpace", || {
            linear_values(&self.start, &self.stop, &self.axis, self.num, self.endpoint)?
                .broadcast_to(&self.shape)
        })
    }
}

impl_implicit_scalar!(LinearSpace);

/// Samples `base ** e` for exponents `e` evenly spaced from
/// `start_exponent` to `stop_exponent`.
///
/// # Examples
///
/// ```
/// use naxis_core::{LogarithmicSpace, Materialize, RangeLike};
///
/// let s = LogarithmicSpace::new(0.0, 3.0, 10.0, "f", 4).unwrap();
/// assert_eq!(s.stop().item().unwrap(), 1000.0);
/// let v = s.explicit().unwrap();
/// assert!((v.value_at(&[("f", 2)]).unwrap() - 100.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct LogarithmicSpace {
    start_exponent: ScalarArray<f64>,
    stop_exponent: ScalarArray<f64>,
    base: ScalarArray<f64>,
    start: ScalarArray<f64>,
    stop: ScalarArray<f64>,
    axis: String,
    num: usize,
    endpoint: bool,
    shape: NamedShape,
    cache: OnceLock<ScalarArray<f64>>,
}

impl LogarithmicSpace {
    pub fn new(
        start_exponent: impl Into<ScalarArray<f64>>,
        stop_exponent: impl Into<ScalarArray<f64>>,
        base: impl Into<ScalarArray<f64>>,
        axis: impl Into<String>,
        num: usize,
    ) -> Result<Self> {
        let (start_exponent, stop_exponent) = (start_exponent.into(), stop_exponent.into());
        let (base, axis) = (base.into(), axis.into());
        let start = base.checked_pow(&start_exponent)?;
        let stop = base.checked_pow(&stop_exponent)?;
        let shape = sequence_shape(
            &[&start_exponent, &stop_exponent, &base],
            &axis_shape(&axis, num)?,
        )?;
        Ok(Self {
            start_exponent,
            stop_exponent,
            base,
            start,
            stop,
            axis,
            num,
            endpoint: true,
            shape,
            cache: OnceLock::new(),
        })
    }

    /// Same space with or without its endpoint.
    pub fn with_endpoint(self, endpoint: bool) -> Self {
        Self {
            endpoint,
            cache: OnceLock::new(),
            ..self
        }
    }

    pub fn start_exponent(&self) -> &ScalarArray<f64> {
        &self.start_exponent
    }

    pub fn stop_exponent(&self) -> &ScalarArray<f64> {
        &self.stop_exponent
    }

    pub fn base(&self) -> &ScalarArray<f64> {
        &self.base
    }

    pub fn endpoint(&self) -> bool {
        self.endpoint
    }
}

impl RangeLike for LogarithmicSpace {
    fn start(&self) -> &ScalarArray<f64> {
        &self.start
    }

    fn stop(&self) -> &ScalarArray<f64> {
        &self.stop
    }
}

impl Parameterized for LogarithmicSpace {
    fn axis(&self) -> &str {
        &self.axis
    }

    fn num(&self) -> usize {
        self.num
    }
}

impl Materialize for LogarithmicSpace {
    type Output = ScalarArray<f64>;

    fn explicit(&self) -> Result<ScalarArray<f64>> {
        cached(&self.cache, "LogarithmicSpace", || {
            let exponents = linear_values(
                &self.start_exponent,
                &self.stop_exponent,
                &self.axis,
                self.num,
                self.endpoint,
            )?;
            self.base.checked_pow(&exponents)?.broadcast_to(&self.shape)
        })
    }
}

impl_implicit_scalar!(LogarithmicSpace);

/// Samples in geometric progression from `start` to `stop`.
///
/// # Examples
///
/// ```
/// use naxis_core::{GeometricSpace, Materialize};
///
/// let g = GeometricSpace::new(1.0, 8.0, "k", 4).unwrap();
/// let v: Vec<f64> = g.explicit().unwrap().ndarray().iter().cloned().collect();
/// for (a, b) in v.iter().zip([1.0, 2.0, 4.0, 8.0]) {
///     assert!((a - b).abs() < 1e-12);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct GeometricSpace {
    start: ScalarArray<f64>,
    stop: ScalarArray<f64>,
    axis: String,
    num: usize,
    endpoint: bool,
    shape: NamedShape,
    cache: OnceLock<ScalarArray<f64>>,
}

impl GeometricSpace {
    pub fn new(
        start: impl Into<ScalarArray<f64>>,
        stop: impl Into<ScalarArray<f64>>,
        axis: impl Into<String>,
        num: usize,
    ) -> Result<Self> {
        let (start, stop, axis) = (start.into(), stop.into(), axis.into());
        let shape = sequence_shape(&[&start, &stop], &axis_shape(&axis, num)?)?;
        Ok(Self {
            start,
            stop,
            axis,
            num,
            endpoint: true,
            shape,
            cache: OnceLock::new(),
        })
    }

    /// Same space with or without its endpoint.
    pub fn with_endpoint(self, endpoint: bool) -> Self {
        Self {
            endpoint,
            cache: OnceLock::new(),
            ..self
        }
    }

    pub fn endpoint(&self) -> bool {
        self.endpoint
    }
}

impl RangeLike for GeometricSpace {
    fn start(&self) -> &ScalarArray<f64> {
        &self.start
    }

    fn stop(&self) -> &ScalarArray<f64> {
        &self.stop
    }
}

impl Parameterized for GeometricSpace {
    fn axis(&self) -> &str {
        &self.axis
    }

    fn num(&self) -> usize {
        self.num
    }
}

impl Materialize for GeometricSpace {
    type Output = ScalarArray<f64>;

    fn explicit(&self) -> Result<ScalarArray<f64>> {
        cached(&self.cache, "GeometricSpace", || {
            let ratio = self
                .stop
                .checked_div(&self.start)?
                .to(&Unit::dimensionless())?
                .without_unit();
            let t = linear_values(
                &ScalarArray::scalar(0.0),
                &ScalarArray::scalar(1.0),
                &self.axis,
                self.num,
                self.endpoint,
            )?;
            self.start
                .checked_mul(&ratio.checked_pow(&t)?)?
                .broadcast_to(&self.shape)
        })
    }
}

impl_implicit_scalar!(GeometricSpace);
