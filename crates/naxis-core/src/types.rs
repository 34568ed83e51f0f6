//! Core type definitions shared by every named array.
//!
//! This module defines the small vocabulary types used throughout naxis:
//!
//! - Axis metadata ([`AxisMeta`]) pairing a symbolic name with a size
//! - Element data types ([`DType`], [`Element`])
//! - Axis selections for reductions ([`AxisSelection`])
//!
//! # Examples
//!
//! ```
//! use naxis_core::{AxisMeta, AxisSelection, NamedShape};
//!
//! let axis = AxisMeta::new("time", 100);
//! assert_eq!(axis.name, "time");
//! assert_eq!(axis.size, 100);
//!
//! let shape = NamedShape::from_pairs([("time", 100), ("channel", 4)]).unwrap();
//! let axes = AxisSelection::from("time").resolve(&shape).unwrap();
//! assert_eq!(axes, vec!["time".to_string()]);
//! ```

use crate::error::{NamedArrayError, Result};
use crate::shape::NamedShape;
use std::fmt;

/// Metadata for a single named axis.
///
/// # Examples
///
/// ```
/// use naxis_core::AxisMeta;
///
/// let batch_axis = AxisMeta::new("batch", 32);
/// assert_eq!(batch_axis.name, "batch");
/// assert_eq!(batch_axis.size, 32);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AxisMeta {
    /// Symbolic name for this axis (e.g., "time", "wavelength", "x")
    pub name: String,
    /// Number of elements along this axis
    pub size: usize,
}

impl AxisMeta {
    /// Create new axis metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::AxisMeta;
    ///
    /// let axis = AxisMeta::new("time_steps", 100);
    /// assert_eq!(axis.name, "time_steps");
    /// assert_eq!(axis.size, 100);
    /// ```
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Element data type of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean elements (masks, comparison results)
    Bool,
    /// 64-bit signed integers (index arrays, ranges)
    I64,
    /// 32-bit floats
    F32,
    /// 64-bit floats
    F64,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::I64 => "int64",
            DType::F32 => "float32",
            DType::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// Element types that can be stored in a [`ScalarArray`](crate::ScalarArray).
pub trait Element: Clone + fmt::Debug + Send + Sync + 'static {
    /// Data type tag for this element type
    const DTYPE: DType;
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;
}

impl Element for i64 {
    const DTYPE: DType = DType::I64;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
}

/// Axes along which a reduction operates.
///
/// Mirrors the three accepted forms of an `axis` argument: every axis, a single
/// name, or a set of names.
///
/// # Examples
///
/// ```
/// use naxis_core::{AxisSelection, NamedShape};
///
/// let shape = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
///
/// assert_eq!(AxisSelection::All.resolve(&shape).unwrap().len(), 2);
/// assert_eq!(AxisSelection::from(["y"]).resolve(&shape).unwrap(), vec!["y"]);
/// assert!(AxisSelection::from("z").resolve(&shape).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum AxisSelection {
    /// Reduce over every axis
    #[default]
    All,
    /// Reduce over a single named axis
    One(String),
    /// Reduce over several named axes
    Many(Vec<String>),
}

impl AxisSelection {
    /// Normalize into a list of axis names, failing on names missing from `shape`.
    pub fn resolve(&self, shape: &NamedShape) -> Result<Vec<String>> {
        let axes = self.names(shape);
        for axis in &axes {
            if !shape.contains(axis) {
                return Err(NamedArrayError::axis_not_found(axis, &shape.names()));
            }
        }
        Ok(axes)
    }

    /// Normalize into a list of axis names, silently dropping names missing from `shape`.
    pub fn resolve_present(&self, shape: &NamedShape) -> Vec<String> {
        self.names(shape)
            .into_iter()
            .filter(|axis| shape.contains(axis))
            .collect()
    }

    fn names(&self, shape: &NamedShape) -> Vec<String> {
        match self {
            AxisSelection::All => shape.names(),
            AxisSelection::One(axis) => vec![axis.clone()],
            AxisSelection::Many(axes) => {
                let mut unique: Vec<String> = Vec::with_capacity(axes.len());
                for axis in axes {
                    if !unique.contains(axis) {
                        unique.push(axis.clone());
                    }
                }
                unique
            }
        }
    }
}

impl From<&str> for AxisSelection {
    fn from(axis: &str) -> Self {
        AxisSelection::One(axis.to_string())
    }
}

impl From<String> for AxisSelection {
    fn from(axis: String) -> Self {
        AxisSelection::One(axis)
    }
}

impl From<Vec<String>> for AxisSelection {
    fn from(axes: Vec<String>) -> Self {
        AxisSelection::Many(axes)
    }
}

impl From<Vec<&str>> for AxisSelection {
    fn from(axes: Vec<&str>) -> Self {
        AxisSelection::Many(axes.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for AxisSelection {
    fn from(axes: &[&str]) -> Self {
        AxisSelection::Many(axes.iter().map(|a| a.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AxisSelection {
    fn from(axes: [&str; N]) -> Self {
        AxisSelection::Many(axes.iter().map(|a| a.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_selection_dedups_names() {
        let shape = NamedShape::from_pairs([("x", 2), ("y", 3)]).unwrap();
        let axes = AxisSelection::from(vec!["x", "x", "y"])
            .resolve(&shape)
            .unwrap();
        assert_eq!(axes, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_axis_selection_present_drops_missing() {
        let shape = NamedShape::from_pairs([("x", 2)]).unwrap();
        let axes = AxisSelection::from(["x", "t"]).resolve_present(&shape);
        assert_eq!(axes, vec!["x".to_string()]);
    }

    #[test]
    fn test_dtype_tags() {
        assert_eq!(<f64 as Element>::DTYPE, DType::F64);
        assert_eq!(<bool as Element>::DTYPE, DType::Bool);
        assert_eq!(DType::I64.to_string(), "int64");
    }
}
