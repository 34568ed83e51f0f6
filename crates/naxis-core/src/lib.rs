//! # naxis-core
//!
//! Named-dimension arrays: axes are identified by name instead of position.
//!
//! This crate provides the engine of the naxis stack:
//!
//! - **Named shapes** ([`NamedShape`]) and the broadcasting rule that merges
//!   them by axis name ([`broadcast_shapes`])
//! - **Scalar arrays** ([`ScalarArray`]) with units, reductions, shape
//!   operations and elementwise math
//! - **Uncertain scalars** ([`UncertainScalarArray`]) carrying a nominal value
//!   and a set of samples along a distribution axis
//! - **Cartesian vectors and matrices** built from scalar components
//! - **Double-dispatch indexing** ([`getitem`]) where either the host or the
//!   index may handle the request
//! - **Lazy sequences** ([`LinearSpace`], [`UniformRandomSample`], ...) that
//!   materialize on demand, and their vector forms
//!   ([`Cartesian3dVectorLinearSpace`], ...) built one component at a time
//! - **Interpolation and inverse lookup** ([`Interpolate`])
//!
//! ## Broadcasting by Name
//!
//! Shapes are merged by axis name, never by position. The result has every
//! axis of every input exactly once:
//!
//! ```
//! use naxis_core::{broadcast_shapes, NamedShape};
//!
//! let a = NamedShape::from_pairs([("x", 3), ("y", 1)]).unwrap();
//! let b = NamedShape::from_pairs([("y", 4), ("z", 2)]).unwrap();
//! let c = broadcast_shapes(&[&a, &b]).unwrap();
//! assert_eq!(c.get("x"), Some(3));
//! assert_eq!(c.get("y"), Some(4));
//! assert_eq!(c.get("z"), Some(2));
//! ```
//!
//! ## Mixed-Type Arithmetic
//!
//! Operands of different kinds are promoted to the kind with the highest
//! priority before the operation runs:
//!
//! ```
//! use naxis_core::{Array, ArrayMath, Cartesian2dVectorArray};
//!
//! let v = Cartesian2dVectorArray::constant(1.0, 2.0);
//! let scaled = 3.0_f64.try_mul(&v).unwrap();
//! match scaled {
//!     Array::Vector2d(r) => assert_eq!(r.y().item().unwrap(), 6.0),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! ## Indexing
//!
//! ```
//! use naxis_core::{getitem, Array, HasShape, Item, NamedShape, ScalarArray};
//!
//! let shape = NamedShape::from_pairs([("t", 4), ("c", 2)]).unwrap();
//! let a: Array = ScalarArray::from_vec((0..8).map(f64::from).collect(), &shape)
//!     .unwrap()
//!     .into();
//! let row = getitem(&a, &Item::axes([("t", 2)])).unwrap();
//! assert_eq!(row.shape().names(), vec!["c"]);
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result`] with a [`NamedArrayError`]:
//!
//! ```
//! use naxis_core::{NamedShape, ScalarArray};
//!
//! let a = ScalarArray::<f64>::zeros(&NamedShape::from_pairs([("t", 3)]).unwrap());
//! let b = ScalarArray::<f64>::zeros(&NamedShape::from_pairs([("t", 4)]).unwrap());
//! assert!(a.checked_add(&b).is_err());
//! ```

pub mod array;
pub mod error;
pub mod indexing;
pub mod interp;
pub mod matrices;
pub mod ops;
pub mod optimize;
pub mod random;
pub mod scalar;
pub mod sequences;
pub mod shape;
pub mod types;
pub mod uncertain;
pub mod units;
pub mod vector_sequences;
pub mod vectors;

#[cfg(test)]
mod property_tests;

pub use array::{type_array, Array, ArrayKind, Comparison, Materialize, NamedArray, Reduction};
pub use error::{NamedArrayError, Result};
pub use indexing::{getitem, IndexKey, IndexSpec, Item, SliceSpec};
pub use interp::{interp_linear, Interpolate};
pub use matrices::{
    Cartesian2dMatrixArray, Cartesian3dMatrixArray, CartesianMatrix, CartesianNdMatrixArray,
};
pub use ops::{apply_ufunc, ArrayMath, Ufunc};
pub use optimize::{root_secant, SecantConfig};
pub use random::{
    fresh_seed, NormalRandomSample, RandomSeeded, StratifiedRandomSpace, UniformRandomSample,
};
pub use scalar::ScalarArray;
pub use sequences::{
    indices, step, ArrayRange, GeometricSpace, LinearSpace, LinearlyStepped, LogarithmicSpace,
    Parameterized, RangeLike,
};
pub use shape::{
    broadcast_shapes, flatten_axes, ndindex, shape_broadcasted, HasShape, NamedIndex, NamedShape,
    NdIndex, AXIS_SEPARATOR,
};
pub use types::{AxisMeta, AxisSelection, DType, Element};
pub use uncertain::{UncertainScalarArray, AXIS_DISTRIBUTION};
pub use units::{unit_normalized, Unit};
pub use vector_sequences::{
    Cartesian2dVectorArrayRange, Cartesian2dVectorGeometricSpace, Cartesian2dVectorLinearSpace,
    Cartesian2dVectorLogarithmicSpace, Cartesian2dVectorNormalRandomSample,
    Cartesian2dVectorSequence, Cartesian2dVectorStratifiedRandomSpace,
    Cartesian2dVectorUniformRandomSample, Cartesian3dVectorArrayRange,
    Cartesian3dVectorGeometricSpace, Cartesian3dVectorLinearSpace,
    Cartesian3dVectorLogarithmicSpace, Cartesian3dVectorNormalRandomSample,
    Cartesian3dVectorSequence, Cartesian3dVectorStratifiedRandomSpace,
    Cartesian3dVectorUniformRandomSample, ComponentSequence,
};
pub use vectors::{
    Cartesian2dVectorArray, Cartesian3dVectorArray, CartesianNdVectorArray, CartesianVector,
};
