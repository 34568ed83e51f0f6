//! Seeded random samples
//!
//! Random sequences keep a seed instead of their values. A missing seed is
//! replaced by a fresh one when the sample is constructed, so every later
//! materialization of the same object draws the same values.
//!
//! `shape_random` lists the axes along which draws are independent. Any other
//! axis of the sample, coming from array-valued parameters, reuses the same
//! draws: a uniform sample with `start` along `x` and `shape_random` along `s`
//! draws `s` values once and rescales them for every `x`. Pass the parameter
//! axes in `shape_random` as well to decorrelate them.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{Materialize, NamedShape, RandomSeeded, UniformRandomSample};
//!
//! let shape = NamedShape::from_pairs([("s", 100)]).unwrap();
//! let a = UniformRandomSample::new(-1.0, 1.0, shape.clone(), Some(42)).unwrap();
//! let b = UniformRandomSample::new(-1.0, 1.0, shape, Some(42)).unwrap();
//! assert_eq!(a.seed(), 42);
//! assert_eq!(a.explicit().unwrap().ndarray(), b.explicit().unwrap().ndarray());
//! ```

use crate::array::Materialize;
use crate::error::Result;
use crate::scalar::ScalarArray;
use crate::sequences::{
    axis_shape, cached, impl_implicit_scalar, linear_values, sequence_shape, step,
    LinearlyStepped, Parameterized, RangeLike,
};
use crate::shape::{broadcast_shapes, NamedShape};
use scirs2_core::random::{rngs::StdRng, Rng, SeedableRng};
use scirs2_core::StandardNormal;
use std::sync::OnceLock;

/// Sequences whose values come from a seeded generator.
pub trait RandomSeeded {
    /// Seed of the generator, fixed at construction
    fn seed(&self) -> u64;
}

/// Draw a new seed in `0..10^12`.
pub fn fresh_seed() -> u64 {
    use scirs2_core::random::quick::random_f64;
    (random_f64() * 1e12) as u64
}

pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(fresh_seed)
}

/// Uniform draws in `[0, 1)` laid out with `shape`.
fn uniform_draws(seed: u64, shape: &NamedShape) -> Result<ScalarArray<f64>> {
    tracing::trace!(seed, size = shape.size(), "drawing uniform samples");
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..shape.size())
        .map(|_| rng.random_range(0.0..1.0))
        .collect();
    ScalarArray::from_vec(values, shape)
}

/// Standard normal draws laid out with `shape`.
fn normal_draws(seed: u64, shape: &NamedShape) -> Result<ScalarArray<f64>> {
    tracing::trace!(seed, size = shape.size(), "drawing normal samples");
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..shape.size())
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    ScalarArray::from_vec(values, shape)
}

/// Samples drawn uniformly between `start` and `stop`.
#[derive(Clone, Debug)]
pub struct UniformRandomSample {
    start: ScalarArray<f64>,
    stop: ScalarArray<f64>,
    shape_random: NamedShape,
    seed: u64,
    shape: NamedShape,
    cache: OnceLock<ScalarArray<f64>>,
}

impl UniformRandomSample {
    /// Uniform sample with independent draws along `shape_random`.
    ///
    /// A `None` seed is replaced by [`fresh_seed`].
    pub fn new(
        start: impl Into<ScalarArray<f64>>,
        stop: impl Into<ScalarArray<f64>>,
        shape_random: NamedShape,
        seed: Option<u64>,
    ) -> Result<Self> {
        let (start, stop) = (start.into(), stop.into());
        let shape = sequence_shape(&[&start, &stop], &shape_random)?;
        Ok(Self {
            start,
            stop,
            shape_random,
            seed: resolve_seed(seed),
            shape,
            cache: OnceLock::new(),
        })
    }

    pub fn shape_random(&self) -> &NamedShape {
        &self.shape_random
    }
}

impl RangeLike for UniformRandomSample {
    fn start(&self) -> &ScalarArray<f64> {
        &self.start
    }

    fn stop(&self) -> &ScalarArray<f64> {
        &self.stop
    }
}

impl RandomSeeded for UniformRandomSample {
    fn seed(&self) -> u64 {
        self.seed
    }
}

impl Materialize for UniformRandomSample {
    type Output = ScalarArray<f64>;

    fn explicit(&self) -> Result<ScalarArray<f64>> {
        cached(&self.cache, "UniformRandomSample", || {
            let u = uniform_draws(self.seed, &self.shape_random)?;
            self.start
                .checked_add(&u.checked_mul(&self.range()?)?)?
                .broadcast_to(&self.shape)
        })
    }
}

impl_implicit_scalar!(UniformRandomSample);

/// Normally distributed samples with mean `center` and standard deviation `width`.
///
/// # Examples
///
/// ```
/// use naxis_core::{Materialize, NamedShape, NormalRandomSample, RangeLike};
///
/// let shape = NamedShape::from_pairs([("s", 10)]).unwrap();
/// let n = NormalRandomSample::new(5.0, 2.0, shape, Some(7)).unwrap();
/// assert_eq!(n.start().item().unwrap(), 3.0);
/// assert_eq!(n.stop().item().unwrap(), 7.0);
/// assert_eq!(n.explicit().unwrap().ndarray().len(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct NormalRandomSample {
    center: ScalarArray<f64>,
    width: ScalarArray<f64>,
    start: ScalarArray<f64>,
    stop: ScalarArray<f64>,
    shape_random: NamedShape,
    seed: u64,
    shape: NamedShape,
    cache: OnceLock<ScalarArray<f64>>,
}

impl NormalRandomSample {
    pub fn new(
        center: impl Into<ScalarArray<f64>>,
        width: impl Into<ScalarArray<f64>>,
        shape_random: NamedShape,
        seed: Option<u64>,
    ) -> Result<Self> {
        let (center, width) = (center.into(), width.into());
        let start = center.checked_sub(&width)?;
        let stop = center.checked_add(&width)?;
        let shape = sequence_shape(&[&center, &width], &shape_random)?;
        Ok(Self {
            center,
            width,
            start,
            stop,
            shape_random,
            seed: resolve_seed(seed),
            shape,
            cache: OnceLock::new(),
        })
    }

    pub fn center(&self) -> &ScalarArray<f64> {
        &self.center
    }

    pub fn width(&self) -> &ScalarArray<f64> {
        &self.width
    }

    pub fn shape_random(&self) -> &NamedShape {
        &self.shape_random
    }
}

/// `center - width` and `center + width`
impl RangeLike for NormalRandomSample {
    fn start(&self) -> &ScalarArray<f64> {
        &self.start
    }

    fn stop(&self) -> &ScalarArray<f64> {
        &self.stop
    }
}

impl RandomSeeded for NormalRandomSample {
    fn seed(&self) -> u64 {
        self.seed
    }
}

impl Materialize for NormalRandomSample {
    type Output = ScalarArray<f64>;

    fn explicit(&self) -> Result<ScalarArray<f64>> {
        cached(&self.cache, "NormalRandomSample", || {
            let z = normal_draws(self.seed, &self.shape_random)?;
            self.center
                .checked_add(&z.checked_mul(&self.width)?)?
                .broadcast_to(&self.shape)
        })
    }
}

impl_implicit_scalar!(NormalRandomSample);

/// Linear space whose samples are jittered uniformly within half a step of
/// their evenly spaced positions.
///
/// # Examples
///
/// ```
/// use naxis_core::{Materialize, NamedShape, StratifiedRandomSpace};
///
/// let s = StratifiedRandomSpace::new(0.0, 10.0, "t", 11, NamedShape::new(), Some(3)).unwrap();
/// let v = s.explicit().unwrap();
/// for (i, value) in v.ndarray().iter().enumerate() {
///     assert!((value - i as f64).abs() <= 0.5);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct StratifiedRandomSpace {
    start: ScalarArray<f64>,
    stop: ScalarArray<f64>,
    axis: String,
    num: usize,
    endpoint: bool,
    shape_random: NamedShape,
    seed: u64,
    shape: NamedShape,
    cache: OnceLock<ScalarArray<f64>>,
}

impl StratifiedRandomSpace {
    /// Jittered linear space; the jitter is independent along `axis` and
    /// along every axis of `shape_random`.
    pub fn new(
        start: impl Into<ScalarArray<f64>>,
        stop: impl Into<ScalarArray<f64>>,
        axis: impl Into<String>,
        num: usize,
        shape_random: NamedShape,
        seed: Option<u64>,
    ) -> Result<Self> {
        let (start, stop, axis) = (start.into(), stop.into(), axis.into());
        let draws = broadcast_shapes(&[&axis_shape(&axis, num)?, &shape_random])?;
        let shape = sequence_shape(&[&start, &stop], &draws)?;
        Ok(Self {
            start,
            stop,
            axis,
            num,
            endpoint: true,
            shape_random,
            seed: resolve_seed(seed),
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

    pub fn shape_random(&self) -> &NamedShape {
        &self.shape_random
    }
}

impl RangeLike for StratifiedRandomSpace {
    fn start(&self) -> &ScalarArray<f64> {
        &self.start
    }

    fn stop(&self) -> &ScalarArray<f64> {
        &self.stop
    }
}

impl Parameterized for StratifiedRandomSpace {
    fn axis(&self) -> &str {
        &self.axis
    }

    fn num(&self) -> usize {
        self.num
    }
}

impl LinearlyStepped for StratifiedRandomSpace {
    fn endpoint(&self) -> bool {
        self.endpoint
    }
}

impl RandomSeeded for StratifiedRandomSpace {
    fn seed(&self) -> u64 {
        self.seed
    }
}

impl Materialize for StratifiedRandomSpace {
    type Output = ScalarArray<f64>;

    fn explicit(&self) -> Result<ScalarArray<f64>> {
        cached(&self.cache, "StratifiedRandomSpace", || {
            let centers =
                linear_values(&self.start, &self.stop, &self.axis, self.num, self.endpoint)?;
            let draws = broadcast_shapes(&[&axis_shape(&self.axis, self.num)?, &self.shape_random])?;
            let jitter = uniform_draws(self.seed, &draws)?
                .checked_sub(&ScalarArray::scalar(0.5))?
                .checked_mul(&step(self)?)?;
            centers.checked_add(&jitter)?.broadcast_to(&self.shape)
        })
    }
}

impl_implicit_scalar!(StratifiedRandomSpace);
