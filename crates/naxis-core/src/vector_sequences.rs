//! Cartesian vector sequences
//!
//! A vector sequence holds one scalar sequence per component and materializes
//! to the matching explicit vector. Components keep their own axis and sample
//! count, so a 2D linear space with axes `px` and `py` is a regular grid over
//! both axes. Random vector samples draw every component from its own seed,
//! `seed + i` for the `i`-th component, so components are uncorrelated while
//! the whole vector stays reproducible from one seed.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{Cartesian2dVectorArray, Cartesian2dVectorLinearSpace, HasShape, Materialize};
//!
//! let grid = Cartesian2dVectorLinearSpace::new(
//!     Cartesian2dVectorArray::constant(-1.0, 0.0),
//!     Cartesian2dVectorArray::constant(1.0, 10.0),
//!     ["px", "py"],
//!     [3, 11],
//! )
//! .unwrap();
//! assert_eq!(grid.shape().size(), 33);
//! let v = grid.explicit().unwrap();
//! assert_eq!(v.y().value_at(&[("py", 10)]).unwrap(), 10.0);
//! ```

use crate::array::{Array, ArrayKind, Materialize, NamedArray};
use crate::error::{NamedArrayError, Result};
use crate::random::{
    resolve_seed, NormalRandomSample, RandomSeeded, StratifiedRandomSpace, UniformRandomSample,
};
use crate::scalar::ScalarArray;
use crate::sequences::{cached, ArrayRange, GeometricSpace, LinearSpace, LogarithmicSpace};
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use crate::types::DType;
use crate::units::Unit;
use crate::vectors::{Cartesian2dVectorArray, Cartesian3dVectorArray};
use std::sync::OnceLock;

/// Scalar sequences usable as one component of a vector sequence.
pub trait ComponentSequence: HasShape + NamedArray {
    /// Materialized component values as floats
    fn component(&self) -> Result<ScalarArray<f64>>;
}

impl ComponentSequence for ArrayRange {
    fn component(&self) -> Result<ScalarArray<f64>> {
        self.explicit()?.cast::<f64>()
    }
}

macro_rules! impl_float_component {
    ($($t:ty),+) => {
        $(
            impl ComponentSequence for $t {
                fn component(&self) -> Result<ScalarArray<f64>> {
                    self.explicit()
                }
            }
        )+
    };
}

impl_float_component!(
    LinearSpace,
    LogarithmicSpace,
    GeometricSpace,
    UniformRandomSample,
    NormalRandomSample,
    StratifiedRandomSpace
);

/// Per-component results gathered into a fixed-size array.
fn per_component<S, const N: usize>(items: impl Iterator<Item = Result<S>>) -> Result<[S; N]> {
    let items = items.collect::<Result<Vec<S>>>()?;
    let count = items.len();
    <[S; N]>::try_from(items).map_err(|_| {
        NamedArrayError::Dimension(format!("expected {} components, got {}", N, count))
    })
}

/// Seeds of the components of a random vector sample.
fn component_seeds<const N: usize>(seed: Option<u64>) -> [u64; N] {
    let base = resolve_seed(seed);
    std::array::from_fn(|i| base.wrapping_add(i as u64))
}

macro_rules! vector_sequence {
    (
        $(#[$meta:meta])*
        $name:ident, $vector:ident, $kind:ident, $n:literal, [$($c:ident),+]
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name<S> {
            $($c: S,)+
            shape: NamedShape,
            cache: OnceLock<$vector>,
        }

        impl<S: ComponentSequence> $name<S> {
            /// Vector sequence from one scalar sequence per component.
            ///
            /// # Errors
            ///
            /// Fails if the component shapes do not broadcast together.
            pub fn from_components($($c: S),+) -> Result<Self> {
                let shape = broadcast_shapes(&[$(&$c.shape()),+])?;
                Ok(Self {
                    $($c,)+
                    shape,
                    cache: OnceLock::new(),
                })
            }

            $(
                pub fn $c(&self) -> &S {
                    &self.$c
                }
            )+
        }

        impl<S: ComponentSequence> Materialize for $name<S> {
            type Output = $vector;

            fn explicit(&self) -> Result<$vector> {
                cached(&self.cache, stringify!($name), || {
                    $vector::new($(self.$c.component()?),+)
                })
            }
        }

        impl<S: ComponentSequence> HasShape for $name<S> {
            fn shape(&self) -> NamedShape {
                self.shape.clone()
            }
        }

        impl<S: ComponentSequence> NamedArray for $name<S> {
            fn kind(&self) -> ArrayKind {
                ArrayKind::$kind
            }

            fn dtype(&self) -> DType {
                DType::F64
            }

            /// Unit of the first component
            fn unit(&self) -> Option<Unit> {
                NamedArray::unit([$(&self.$c),+][0])
            }

            fn to_array(&self) -> Result<Array> {
                Ok(Array::$kind(self.explicit()?))
            }
        }

        /// Seed of the first component; component `i` uses `seed + i`.
        impl<S: ComponentSequence + RandomSeeded> RandomSeeded for $name<S> {
            fn seed(&self) -> u64 {
                [$(&self.$c),+][0].seed()
            }
        }

        impl $name<ArrayRange> {
            /// Unit-step integer ranges, one per component.
            pub fn new(start: [i64; $n], stop: [i64; $n], axis: [&str; $n]) -> Result<Self> {
                let [$($c),+] = per_component::<_, $n>(
                    start
                        .into_iter()
                        .zip(stop)
                        .zip(axis)
                        .map(|((start, stop), axis)| ArrayRange::new(start, stop, axis)),
                )?;
                Self::from_components($($c),+)
            }

            /// Same ranges with per-component steps.
            ///
            /// # Errors
            ///
            /// Fails for a zero step.
            pub fn with_step(self, step: [i64; $n]) -> Result<Self> {
                let [$($c),+] = step;
                Self::from_components($(self.$c.with_step($c)?),+)
            }
        }

        impl $name<LinearSpace> {
            /// Grid from component-wise starts, stops, axis names and sample counts.
            pub fn new(
                start: $vector,
                stop: $vector,
                axis: [&str; $n],
                num: [usize; $n],
            ) -> Result<Self> {
                let [$($c),+] = per_component::<_, $n>(
                    [$(start.$c().clone()),+]
                        .into_iter()
                        .zip([$(stop.$c().clone()),+])
                        .zip(axis)
                        .zip(num)
                        .map(|(((start, stop), axis), num)| LinearSpace::new(start, stop, axis, num)),
                )?;
                Self::from_components($($c),+)
            }

            /// Same grid with or without the endpoint of every component.
            pub fn with_endpoint(self, endpoint: bool) -> Result<Self> {
                Self::from_components($(self.$c.with_endpoint(endpoint)),+)
            }
        }

        impl $name<LogarithmicSpace> {
            /// Component-wise powers of a shared `base`.
            pub fn new(
                start_exponent: $vector,
                stop_exponent: $vector,
                base: impl Into<ScalarArray<f64>>,
                axis: [&str; $n],
                num: [usize; $n],
            ) -> Result<Self> {
                let base = base.into();
                let [$($c),+] = per_component::<_, $n>(
                    [$(start_exponent.$c().clone()),+]
                        .into_iter()
                        .zip([$(stop_exponent.$c().clone()),+])
                        .zip(axis)
                        .zip(num)
                        .map(|(((start, stop), axis), num)| {
                            LogarithmicSpace::new(start, stop, base.clone(), axis, num)
                        }),
                )?;
                Self::from_components($($c),+)
            }
        }

        impl $name<GeometricSpace> {
            pub fn new(
                start: $vector,
                stop: $vector,
                axis: [&str; $n],
                num: [usize; $n],
            ) -> Result<Self> {
                let [$($c),+] = per_component::<_, $n>(
                    [$(start.$c().clone()),+]
                        .into_iter()
                        .zip([$(stop.$c().clone()),+])
                        .zip(axis)
                        .zip(num)
                        .map(|(((start, stop), axis), num)| GeometricSpace::new(start, stop, axis, num)),
                )?;
                Self::from_components($($c),+)
            }
        }

        impl $name<UniformRandomSample> {
            /// Uniform draws between component-wise bounds, independent along
            /// `shape_random`. A `None` seed is replaced by a fresh one.
            pub fn new(
                start: $vector,
                stop: $vector,
                shape_random: NamedShape,
                seed: Option<u64>,
            ) -> Result<Self> {
                let [$($c),+] = per_component::<_, $n>(
                    [$(start.$c().clone()),+]
                        .into_iter()
                        .zip([$(stop.$c().clone()),+])
                        .zip(component_seeds::<$n>(seed))
                        .map(|((start, stop), seed)| {
                            UniformRandomSample::new(start, stop, shape_random.clone(), Some(seed))
                        }),
                )?;
                Self::from_components($($c),+)
            }
        }

        impl $name<NormalRandomSample> {
            /// Normal draws with component-wise `center` and `width`.
            pub fn new(
                center: $vector,
                width: $vector,
                shape_random: NamedShape,
                seed: Option<u64>,
            ) -> Result<Self> {
                let [$($c),+] = per_component::<_, $n>(
                    [$(center.$c().clone()),+]
                        .into_iter()
                        .zip([$(width.$c().clone()),+])
                        .zip(component_seeds::<$n>(seed))
                        .map(|((center, width), seed)| {
                            NormalRandomSample::new(center, width, shape_random.clone(), Some(seed))
                        }),
                )?;
                Self::from_components($($c),+)
            }
        }

        impl $name<StratifiedRandomSpace> {
            /// Jittered grid; the jitter of every component is independent
            /// along its own axis and along `shape_random`.
            pub fn new(
                start: $vector,
                stop: $vector,
                axis: [&str; $n],
                num: [usize; $n],
                shape_random: NamedShape,
                seed: Option<u64>,
            ) -> Result<Self> {
                let [$($c),+] = per_component::<_, $n>(
                    [$(start.$c().clone()),+]
                        .into_iter()
                        .zip([$(stop.$c().clone()),+])
                        .zip(axis)
                        .zip(num)
                        .zip(component_seeds::<$n>(seed))
                        .map(|((((start, stop), axis), num), seed)| {
                            StratifiedRandomSpace::new(
                                start,
                                stop,
                                axis,
                                num,
                                shape_random.clone(),
                                Some(seed),
                            )
                        }),
                )?;
                Self::from_components($($c),+)
            }
        }
    };
}

vector_sequence!(
    /// Planar vector whose `x` and `y` components are scalar sequences.
    Cartesian2dVectorSequence, Cartesian2dVectorArray, Vector2d, 2, [x, y]
);

vector_sequence!(
    /// Spatial vector whose `x`, `y` and `z` components are scalar sequences.
    Cartesian3dVectorSequence, Cartesian3dVectorArray, Vector3d, 3, [x, y, z]
);

pub type Cartesian2dVectorArrayRange = Cartesian2dVectorSequence<ArrayRange>;
pub type Cartesian2dVectorLinearSpace = Cartesian2dVectorSequence<LinearSpace>;
pub type Cartesian2dVectorLogarithmicSpace = Cartesian2dVectorSequence<LogarithmicSpace>;
pub type Cartesian2dVectorGeometricSpace = Cartesian2dVectorSequence<GeometricSpace>;
pub type Cartesian2dVectorUniformRandomSample = Cartesian2dVectorSequence<UniformRandomSample>;
pub type Cartesian2dVectorNormalRandomSample = Cartesian2dVectorSequence<NormalRandomSample>;
pub type Cartesian2dVectorStratifiedRandomSpace = Cartesian2dVectorSequence<StratifiedRandomSpace>;

pub type Cartesian3dVectorArrayRange = Cartesian3dVectorSequence<ArrayRange>;
pub type Cartesian3dVectorLinearSpace = Cartesian3dVectorSequence<LinearSpace>;
pub type Cartesian3dVectorLogarithmicSpace = Cartesian3dVectorSequence<LogarithmicSpace>;
pub type Cartesian3dVectorGeometricSpace = Cartesian3dVectorSequence<GeometricSpace>;
pub type Cartesian3dVectorUniformRandomSample = Cartesian3dVectorSequence<UniformRandomSample>;
pub type Cartesian3dVectorNormalRandomSample = Cartesian3dVectorSequence<NormalRandomSample>;
pub type Cartesian3dVectorStratifiedRandomSpace = Cartesian3dVectorSequence<StratifiedRandomSpace>;
