//! # naxis - Named-Axis Arrays
//!
//! Arrays whose axes are identified by name, with broadcasting by name,
//! composite vector and matrix types, lazily materialized sequences and
//! multilinear interpolation.
//!
//! This is the **meta crate** that re-exports the naxis components for
//! convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use naxis::prelude::*;
//!
//! let t = LinearSpace::new(0.0, 1.0, "t", 11)?;
//! let x = ScalarArray::from_vec(vec![1.0, 2.0, 3.0], &NamedShape::from_pairs([("x", 3)])?)?;
//!
//! // Broadcasting by name: the product has both axes.
//! let grid = t.explicit()?.checked_mul(&x)?;
//! assert_eq!(grid.size(), 33);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Core ([`core`])
//!
//! Named shapes, scalar and uncertain arrays, Cartesian vectors and matrices,
//! indexing, sequences, interpolation and the secant solver.
//!
//! ```
//! use naxis::core::{Cartesian3dVectorArray, CartesianVector};
//!
//! let v = Cartesian3dVectorArray::constant(3.0, 4.0, 12.0);
//! assert_eq!(v.length().unwrap().item().unwrap(), 13.0);
//! ```

pub use naxis_core as core;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use naxis::prelude::*;
    //!
    //! let shape = NamedShape::from_pairs([("x", 10), ("y", 20)]).unwrap();
    //! let zeros = ScalarArray::<f64>::zeros(&shape);
    //! assert_eq!(zeros.ndim(), 2);
    //! ```

    // Shapes and arrays
    pub use crate::core::{
        broadcast_shapes, Array, ArrayKind, AxisSelection, HasShape, NamedArray, NamedShape,
        ScalarArray, UncertainScalarArray,
    };

    // Arithmetic and reductions
    pub use crate::core::{ArrayMath, Comparison, Reduction, Ufunc};

    // Indexing
    pub use crate::core::{getitem, IndexSpec, Item, SliceSpec};

    // Composite types
    pub use crate::core::{
        Cartesian2dMatrixArray, Cartesian2dVectorArray, Cartesian3dMatrixArray,
        Cartesian3dVectorArray, CartesianMatrix, CartesianNdMatrixArray, CartesianNdVectorArray,
        CartesianVector,
    };

    // Sequences
    pub use crate::core::{
        ArrayRange, GeometricSpace, LinearSpace, LogarithmicSpace, Materialize,
        NormalRandomSample, StratifiedRandomSpace, UniformRandomSample,
    };

    // Vector sequences
    pub use crate::core::{
        Cartesian2dVectorLinearSpace, Cartesian2dVectorNormalRandomSample,
        Cartesian2dVectorUniformRandomSample, Cartesian3dVectorLinearSpace,
        Cartesian3dVectorNormalRandomSample, Cartesian3dVectorUniformRandomSample, RandomSeeded,
    };

    // Interpolation
    pub use crate::core::{Interpolate, SecantConfig};

    // Errors and units
    pub use crate::core::{NamedArrayError, Unit};
}
