//! Unified error type for named-array operations
//!
//! Every fallible operation in this crate returns [`Result<T>`], an alias over
//! [`NamedArrayError`]. Errors are local and synchronous: operations produce new
//! values, so a failure never leaves an input partially modified.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{broadcast_shapes, NamedArrayError, NamedShape};
//!
//! let a = NamedShape::from_pairs([("y", 4)]).unwrap();
//! let b = NamedShape::from_pairs([("y", 5)]).unwrap();
//!
//! match broadcast_shapes(&[&a, &b]) {
//!     Err(NamedArrayError::ShapeMismatch { .. }) => {}
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use thiserror::Error;

/// Top-level error type for all named-array operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NamedArrayError {
    /// Two shapes disagree on a non-1 size for a shared axis name
    #[error("shapes {shapes} are not compatible")]
    ShapeMismatch { shapes: String },

    /// An axis name was requested that the array does not have
    #[error("axis '{axis}' not found in axes {axes:?}")]
    AxisNotFound { axis: String, axes: Vec<String> },

    /// The same axis name appears twice in one shape
    #[error("duplicate axis name '{0}'")]
    DuplicateAxis(String),

    /// Raw data does not match the declared named shape
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Neither the host nor any index value accepted an indexing request
    #[error("item not supported by array with type {host}")]
    UnsupportedIndex { host: String },

    /// An integer index fell outside of an axis
    #[error("index {index} is out of bounds for axis '{axis}' with size {size}")]
    IndexOutOfBounds {
        axis: String,
        index: i64,
        size: usize,
    },

    /// Operation requires a square matrix (or matching component counts)
    #[error("dimension error: {0}")]
    Dimension(String),

    /// Interpolation was invoked with an empty coordinate mapping
    #[error("item must contain at least one key")]
    EmptyItem,

    /// The secant inverse lookup did not converge
    #[error("secant search did not converge after {iterations} iterations: {reason}")]
    Convergence { iterations: usize, reason: String },

    /// Truth value requested for an array with more than one element
    #[error("the truth value of an array with {size} elements is ambiguous")]
    AmbiguousTruth { size: usize },

    /// Units cannot be converted into each other
    #[error("unit '{from}' cannot be converted to '{to}'")]
    IncompatibleUnits { from: String, to: String },

    /// Operands whose concrete kinds cannot be combined
    #[error("cannot convert array of kind {from} to kind {to}")]
    IncompatibleKinds { from: String, to: String },

    /// A dense linear-algebra kernel failed (singular or ill-formed matrix)
    #[error("linear algebra error: {0}")]
    Linalg(String),

    /// Generic invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<scirs2_linalg::LinalgError> for NamedArrayError {
    fn from(err: scirs2_linalg::LinalgError) -> Self {
        Self::Linalg(err.to_string())
    }
}

impl NamedArrayError {
    /// Shape mismatch error naming every shape that took part in the operation
    pub(crate) fn shape_mismatch<D: std::fmt::Display>(shapes: &[D]) -> Self {
        let listed: Vec<String> = shapes.iter().map(|s| s.to_string()).collect();
        Self::ShapeMismatch {
            shapes: format!("[{}]", listed.join(", ")),
        }
    }

    pub(crate) fn axis_not_found(axis: &str, axes: &[String]) -> Self {
        Self::AxisNotFound {
            axis: axis.to_string(),
            axes: axes.to_vec(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, NamedArrayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message_lists_shapes() {
        let err = NamedArrayError::shape_mismatch(&["{y: 4}", "{y: 5}"]);
        assert_eq!(
            err.to_string(),
            "shapes [{y: 4}, {y: 5}] are not compatible"
        );
    }

    #[test]
    fn test_unsupported_index_names_host() {
        let err = NamedArrayError::UnsupportedIndex {
            host: "ScalarArray".to_string(),
        };
        assert!(err.to_string().contains("ScalarArray"));
    }
}
