//! The array capability contract and the closed set of array kinds
//!
//! Every named array exposes its shape through [`HasShape`] and the rest of
//! its capabilities through [`NamedArray`]. Implicit arrays (ranges, spaces,
//! random samples) additionally implement [`Materialize`] and compute an
//! explicit array on demand.
//!
//! [`Array`] is the tagged union of every explicit array kind. Mixed-kind
//! operations pick a winning kind with [`type_array`] using the priorities of
//! [`ArrayKind`], promote the other operands to it and then work on the
//! float *leaves* of the winner: the single leaf of a scalar array, the
//! nominal value and distribution of an uncertain array, the components of a
//! vector or the entries of a matrix.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{type_array, ArrayKind};
//!
//! let winner = type_array(&[ArrayKind::Scalar, ArrayKind::Vector3d, ArrayKind::Uncertain]);
//! assert_eq!(winner, Some(ArrayKind::Vector3d));
//! assert_eq!(type_array(&[]), None);
//! ```

use crate::error::{NamedArrayError, Result};
use crate::indexing::{IndexKey, Item};
use crate::matrices::{
    Cartesian2dMatrixArray, Cartesian3dMatrixArray, CartesianMatrix, CartesianNdMatrixArray,
};
use crate::scalar::ScalarArray;
use crate::shape::{HasShape, NamedShape};
use crate::types::{AxisSelection, DType};
use crate::uncertain::UncertainScalarArray;
use crate::units::{unit_normalized, Unit};
use crate::vectors::{
    Cartesian2dVectorArray, Cartesian3dVectorArray, CartesianNdVectorArray, CartesianVector,
};
use std::fmt;

/// Closed set of concrete array kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// [`ScalarArray<f64>`]
    Scalar,
    /// [`ScalarArray<i64>`]
    Int,
    /// [`ScalarArray<bool>`]
    Bool,
    /// [`UncertainScalarArray`]
    Uncertain,
    /// [`Cartesian2dVectorArray`]
    Vector2d,
    /// [`Cartesian3dVectorArray`]
    Vector3d,
    /// [`CartesianNdVectorArray`]
    VectorNd,
    /// [`Cartesian2dMatrixArray`]
    Matrix2d,
    /// [`Cartesian3dMatrixArray`]
    Matrix3d,
    /// [`CartesianNdMatrixArray`]
    MatrixNd,
}

impl ArrayKind {
    /// Rank used to pick the result kind of a mixed-kind operation.
    ///
    /// | kind | priority |
    /// |---|---|
    /// | scalar (float, int, bool) | 1 |
    /// | uncertain scalar | 10 |
    /// | vectors | 100 |
    /// | matrices | 1000 |
    pub fn priority(&self) -> u32 {
        match self {
            ArrayKind::Scalar | ArrayKind::Int | ArrayKind::Bool => 1,
            ArrayKind::Uncertain => 10,
            ArrayKind::Vector2d | ArrayKind::Vector3d | ArrayKind::VectorNd => 100,
            ArrayKind::Matrix2d | ArrayKind::Matrix3d | ArrayKind::MatrixNd => 1000,
        }
    }

    /// Whether this is one of the plain scalar kinds.
    pub fn is_scalar(&self) -> bool {
        matches!(self, ArrayKind::Scalar | ArrayKind::Int | ArrayKind::Bool)
    }
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArrayKind::Scalar => "ScalarArray<float64>",
            ArrayKind::Int => "ScalarArray<int64>",
            ArrayKind::Bool => "ScalarArray<bool>",
            ArrayKind::Uncertain => "UncertainScalarArray",
            ArrayKind::Vector2d => "Cartesian2dVectorArray",
            ArrayKind::Vector3d => "Cartesian3dVectorArray",
            ArrayKind::VectorNd => "CartesianNdVectorArray",
            ArrayKind::Matrix2d => "Cartesian2dMatrixArray",
            ArrayKind::Matrix3d => "Cartesian3dMatrixArray",
            ArrayKind::MatrixNd => "CartesianNdMatrixArray",
        };
        f.write_str(name)
    }
}

/// Kind with the highest priority; ties keep the first maximum.
pub fn type_array(kinds: &[ArrayKind]) -> Option<ArrayKind> {
    let mut winner: Option<ArrayKind> = None;
    for &kind in kinds {
        match winner {
            Some(w) if w.priority() >= kind.priority() => {}
            _ => winner = Some(kind),
        }
    }
    winner
}

/// Capabilities shared by every named array.
pub trait NamedArray: HasShape {
    /// Concrete kind of this array
    fn kind(&self) -> ArrayKind;

    /// Priority of this array's kind
    fn priority(&self) -> u32 {
        self.kind().priority()
    }

    /// Element data type
    fn dtype(&self) -> DType;

    /// Physical unit, if any
    fn unit(&self) -> Option<Unit>;

    /// Physical unit, with `None` replaced by the dimensionless unit
    fn unit_normalized(&self) -> Unit {
        unit_normalized(self.unit().as_ref())
    }

    /// Equivalent explicit array
    fn to_array(&self) -> Result<Array>;
}

/// Implicit arrays, computed from their own parameters on demand.
///
/// Materialization is deterministic: repeated calls give equal arrays.
pub trait Materialize {
    /// Explicit array type produced by [`explicit`](Self::explicit)
    type Output;

    /// Compute (or fetch the cached) explicit equivalent of this array.
    fn explicit(&self) -> Result<Self::Output>;
}

impl NamedArray for f64 {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Scalar
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        None
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::Scalar(ScalarArray::scalar(*self)))
    }
}

macro_rules! impl_named_scalar {
    ($t:ty, $kind:ident) => {
        impl NamedArray for ScalarArray<$t> {
            fn kind(&self) -> ArrayKind {
                ArrayKind::$kind
            }

            fn dtype(&self) -> DType {
                ScalarArray::dtype(self)
            }

            fn unit(&self) -> Option<Unit> {
                ScalarArray::unit(self).cloned()
            }

            fn to_array(&self) -> Result<Array> {
                Ok(Array::$kind(self.clone()))
            }
        }

        impl From<ScalarArray<$t>> for Array {
            fn from(array: ScalarArray<$t>) -> Self {
                Array::$kind(array)
            }
        }
    };
}

impl_named_scalar!(f64, Scalar);
impl_named_scalar!(i64, Int);
impl_named_scalar!(bool, Bool);

/// Reduction applied by [`Array::reduce`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reduction {
    Min,
    Max,
    Sum,
    Mean,
    Std,
    Ptp,
    Rms,
    /// Percentile in `[0, 100]`
    Percentile(f64),
}

/// Element-wise comparison applied by [`Array::compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Any explicit named array.
#[derive(Clone)]
pub enum Array {
    Scalar(ScalarArray<f64>),
    Int(ScalarArray<i64>),
    Bool(ScalarArray<bool>),
    Uncertain(UncertainScalarArray),
    Vector2d(Cartesian2dVectorArray),
    Vector3d(Cartesian3dVectorArray),
    VectorNd(CartesianNdVectorArray),
    Matrix2d(Cartesian2dMatrixArray),
    Matrix3d(Cartesian3dMatrixArray),
    MatrixNd(CartesianNdMatrixArray),
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Array::Scalar(a) => fmt::Debug::fmt(a, f),
            Array::Int(a) => fmt::Debug::fmt(a, f),
            Array::Bool(a) => fmt::Debug::fmt(a, f),
            other => write!(f, "{}{}", other.type_name(), other.shape()),
        }
    }
}

impl From<f64> for Array {
    fn from(value: f64) -> Self {
        Array::Scalar(ScalarArray::scalar(value))
    }
}

impl From<UncertainScalarArray> for Array {
    fn from(array: UncertainScalarArray) -> Self {
        Array::Uncertain(array)
    }
}

impl From<Cartesian2dVectorArray> for Array {
    fn from(array: Cartesian2dVectorArray) -> Self {
        Array::Vector2d(array)
    }
}

impl From<Cartesian3dVectorArray> for Array {
    fn from(array: Cartesian3dVectorArray) -> Self {
        Array::Vector3d(array)
    }
}

impl From<CartesianNdVectorArray> for Array {
    fn from(array: CartesianNdVectorArray) -> Self {
        Array::VectorNd(array)
    }
}

impl From<Cartesian2dMatrixArray> for Array {
    fn from(array: Cartesian2dMatrixArray) -> Self {
        Array::Matrix2d(array)
    }
}

impl From<Cartesian3dMatrixArray> for Array {
    fn from(array: Cartesian3dMatrixArray) -> Self {
        Array::Matrix3d(array)
    }
}

impl From<CartesianNdMatrixArray> for Array {
    fn from(array: CartesianNdMatrixArray) -> Self {
        Array::MatrixNd(array)
    }
}

fn vector_leaves<V: CartesianVector>(v: &V) -> Vec<(String, ScalarArray<f64>)> {
    v.components()
        .into_iter()
        .map(|(name, c)| (name.to_string(), c.clone()))
        .collect()
}

fn matrix_leaves<M: CartesianMatrix>(m: &M) -> Vec<(String, ScalarArray<f64>)> {
    let mut leaves = Vec::new();
    for (row, vector) in m.rows() {
        for (component, c) in vector.components() {
            leaves.push((format!("{}.{}", row, component), c.clone()));
        }
    }
    leaves
}

fn matrix_rebuild<M: CartesianMatrix>(m: &M, leaves: Vec<ScalarArray<f64>>) -> Result<M> {
    let mut leaves = leaves.into_iter();
    let rows = m
        .rows()
        .into_iter()
        .map(|(_, vector)| {
            let n = vector.components().len();
            vector.with_components(leaves.by_ref().take(n).collect())
        })
        .collect::<Result<Vec<_>>>()?;
    m.with_rows(rows)
}

impl Array {
    /// Concrete kind of this array.
    pub fn kind(&self) -> ArrayKind {
        match self {
            Array::Scalar(_) => ArrayKind::Scalar,
            Array::Int(_) => ArrayKind::Int,
            Array::Bool(_) => ArrayKind::Bool,
            Array::Uncertain(_) => ArrayKind::Uncertain,
            Array::Vector2d(_) => ArrayKind::Vector2d,
            Array::Vector3d(_) => ArrayKind::Vector3d,
            Array::VectorNd(_) => ArrayKind::VectorNd,
            Array::Matrix2d(_) => ArrayKind::Matrix2d,
            Array::Matrix3d(_) => ArrayKind::Matrix3d,
            Array::MatrixNd(_) => ArrayKind::MatrixNd,
        }
    }

    /// Type name used in error messages, e.g. `ScalarArray<float64>`.
    pub fn type_name(&self) -> String {
        self.kind().to_string()
    }

    /// Shallow copy sharing every backing buffer.
    pub fn copy_shallow(&self) -> Self {
        self.clone()
    }

    /// Fully independent copy.
    pub fn copy(&self) -> Self {
        match self {
            Array::Scalar(a) => Array::Scalar(a.copy()),
            Array::Int(a) => Array::Int(a.copy()),
            Array::Bool(a) => Array::Bool(a.copy()),
            Array::Uncertain(a) => Array::Uncertain(a.copy()),
            Array::Vector2d(a) => Array::Vector2d(a.copy()),
            Array::Vector3d(a) => Array::Vector3d(a.copy()),
            Array::VectorNd(a) => Array::VectorNd(a.copy()),
            Array::Matrix2d(a) => Array::Matrix2d(a.copy()),
            Array::Matrix3d(a) => Array::Matrix3d(a.copy()),
            Array::MatrixNd(a) => Array::MatrixNd(a.copy()),
        }
    }

    /// Plain float array, converting integer and boolean arrays.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::IncompatibleKinds`] for uncertain and composite arrays.
    pub fn to_scalar(&self) -> Result<ScalarArray<f64>> {
        match self {
            Array::Scalar(a) => Ok(a.clone()),
            Array::Int(a) => a.cast::<f64>(),
            Array::Bool(a) => Ok(a.to_f64()),
            other => Err(NamedArrayError::IncompatibleKinds {
                from: other.type_name(),
                to: ArrayKind::Scalar.to_string(),
            }),
        }
    }

    /// Named float leaves of this array. Integer and boolean arrays are
    /// converted to floats.
    pub(crate) fn leaves(&self) -> Result<Vec<(String, ScalarArray<f64>)>> {
        Ok(match self {
            Array::Scalar(a) => vec![(String::new(), a.clone())],
            Array::Int(a) => vec![(String::new(), a.cast::<f64>()?)],
            Array::Bool(a) => vec![(String::new(), a.to_f64())],
            Array::Uncertain(a) => vec![
                ("nominal".to_string(), a.nominal().clone()),
                ("distribution".to_string(), a.distribution().clone()),
            ],
            Array::Vector2d(v) => vector_leaves(v),
            Array::Vector3d(v) => vector_leaves(v),
            Array::VectorNd(v) => vector_leaves(v),
            Array::Matrix2d(m) => matrix_leaves(m),
            Array::Matrix3d(m) => matrix_leaves(m),
            Array::MatrixNd(m) => matrix_leaves(m),
        })
    }

    /// Leaves broadcast to the full shape of this array. The distribution of
    /// an uncertain array keeps its trailing sample axis.
    pub(crate) fn leaves_full(&self) -> Result<Vec<(String, ScalarArray<f64>)>> {
        if let Array::Uncertain(u) = self {
            return Ok(vec![
                ("nominal".to_string(), u.nominal_full()?),
                ("distribution".to_string(), u.distribution_full()?),
            ]);
        }
        let shape = self.shape();
        self.leaves()?
            .into_iter()
            .map(|(name, leaf)| Ok((name, leaf.broadcast_to(&shape)?)))
            .collect()
    }

    /// Array of the same kind built from new leaves, given in the order of
    /// [`leaves`](Self::leaves). Integer and boolean arrays rebuild as floats.
    pub(crate) fn rebuild(&self, leaves: Vec<ScalarArray<f64>>) -> Result<Array> {
        let count = leaves.len();
        let wrong_count = || {
            NamedArrayError::Dimension(format!(
                "{} cannot be rebuilt from {} leaves",
                self.type_name(),
                count
            ))
        };
        Ok(match self {
            Array::Scalar(_) | Array::Int(_) | Array::Bool(_) => {
                let [leaf] = <[ScalarArray<f64>; 1]>::try_from(leaves).map_err(|_| wrong_count())?;
                Array::Scalar(leaf)
            }
            Array::Uncertain(u) => {
                let [nominal, distribution] =
                    <[ScalarArray<f64>; 2]>::try_from(leaves).map_err(|_| wrong_count())?;
                Array::Uncertain(u.with_parts(nominal, distribution)?)
            }
            Array::Vector2d(v) => Array::Vector2d(v.with_components(leaves)?),
            Array::Vector3d(v) => Array::Vector3d(v.with_components(leaves)?),
            Array::VectorNd(v) => Array::VectorNd(v.with_components(leaves)?),
            Array::Matrix2d(m) => Array::Matrix2d(matrix_rebuild(m, leaves)?),
            Array::Matrix3d(m) => Array::Matrix3d(matrix_rebuild(m, leaves)?),
            Array::MatrixNd(m) => Array::MatrixNd(matrix_rebuild(m, leaves)?),
        })
    }

    /// Apply a fallible function to every full-shape leaf.
    pub(crate) fn map_leaves(
        &self,
        f: impl Fn(&ScalarArray<f64>) -> Result<ScalarArray<f64>>,
    ) -> Result<Array> {
        let mapped = self
            .leaves_full()?
            .iter()
            .map(|(_, leaf)| f(leaf))
            .collect::<Result<Vec<_>>>()?;
        self.rebuild(mapped)
    }

    /// Convert this array to `kind`, taking missing structure (component or
    /// row names, distribution axis) from `like`.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::IncompatibleKinds`] unless `self` is already of
    /// `kind`, is a plain scalar kind, or is a 2D vector lifted to 3D with a
    /// zero `z` component. Vector and matrix entries are plain scalar arrays,
    /// so an uncertain array never promotes to a vector or matrix kind.
    pub fn promote(&self, kind: ArrayKind, like: &Array) -> Result<Array> {
        if self.kind() == kind {
            return Ok(self.clone());
        }
        let incompatible = || NamedArrayError::IncompatibleKinds {
            from: self.type_name(),
            to: kind.to_string(),
        };
        if let (Array::Vector2d(v), ArrayKind::Vector3d) = (self, kind) {
            let zero = ScalarArray::scalar(0.0);
            let z = match v.x().unit() {
                Some(unit) => zero.with_unit(unit.clone()),
                None => zero,
            };
            return Ok(Array::Vector3d(Cartesian3dVectorArray::from_xy(v, z)?));
        }
        let value = match self {
            Array::Scalar(a) => a.clone(),
            Array::Int(a) => a.cast::<f64>()?,
            Array::Bool(a) => a.to_f64(),
            _ => return Err(incompatible()),
        };
        Ok(match (kind, like) {
            (ArrayKind::Scalar, _) => Array::Scalar(value),
            (ArrayKind::Uncertain, Array::Uncertain(u)) => Array::Uncertain(
                UncertainScalarArray::with_axis(value.clone(), value, u.axis_distribution())?,
            ),
            (ArrayKind::Uncertain, _) => {
                Array::Uncertain(UncertainScalarArray::from_scalar(value))
            }
            (ArrayKind::Vector2d, _) => {
                Array::Vector2d(Cartesian2dVectorArray::from_scalar(value))
            }
            (ArrayKind::Vector3d, _) => {
                Array::Vector3d(Cartesian3dVectorArray::from_scalar(value))
            }
            (ArrayKind::VectorNd, Array::VectorNd(v)) => {
                Array::VectorNd(CartesianNdVectorArray::from_scalar(&v.names(), value))
            }
            (ArrayKind::Matrix2d, _) => {
                Array::Matrix2d(Cartesian2dMatrixArray::from_scalar(value))
            }
            (ArrayKind::Matrix3d, _) => {
                Array::Matrix3d(Cartesian3dMatrixArray::from_scalar(value))
            }
            (ArrayKind::MatrixNd, Array::MatrixNd(m)) => Array::MatrixNd(
                CartesianNdMatrixArray::from_scalar(&m.row_names(), &m.component_names(), value),
            ),
            _ => return Err(incompatible()),
        })
    }

    /// Direct indexing handler of this array.
    pub(crate) fn getitem_direct(&self, item: &Item) -> Option<Result<Array>> {
        match self {
            Array::Scalar(a) => a.getitem_direct(item).map(|r| r.map(Array::Scalar)),
            Array::Int(a) => a.getitem_direct(item).map(|r| r.map(Array::Int)),
            Array::Bool(a) => a.getitem_direct(item).map(|r| r.map(Array::Bool)),
            Array::Uncertain(a) => a.getitem_direct(item).map(|r| r.map(Array::Uncertain)),
            _ => self.getitem_leaves(item),
        }
    }

    fn getitem_leaves(&self, item: &Item) -> Option<Result<Array>> {
        let leaves = match self.leaves_full() {
            Ok(leaves) => leaves,
            Err(e) => return Some(Err(e)),
        };
        let mut indexed = Vec::with_capacity(leaves.len());
        for (_, leaf) in &leaves {
            match leaf.getitem_direct(item)? {
                Ok(leaf) => indexed.push(leaf),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(self.rebuild(indexed))
    }

    /// Reduce every leaf over the selected axes.
    ///
    /// The selection is resolved against the shape of this array, so the
    /// sample axis of an uncertain array is never reduced.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{Array, AxisSelection, HasShape, NamedShape, Reduction, ScalarArray};
    ///
    /// let s = NamedShape::from_pairs([("t", 4)]).unwrap();
    /// let a: Array = ScalarArray::from_vec(vec![1.0, 2.0, 3.0, 6.0], &s).unwrap().into();
    /// let m = a.reduce(Reduction::Mean, &AxisSelection::All, None).unwrap();
    /// assert_eq!(m.ndim(), 0);
    /// ```
    pub fn reduce(
        &self,
        reduction: Reduction,
        axis: &AxisSelection,
        mask: Option<&ScalarArray<bool>>,
    ) -> Result<Array> {
        let axes = AxisSelection::Many(axis.resolve(&self.shape())?);
        self.map_leaves(|leaf| match reduction {
            Reduction::Min => leaf.min(&axes, mask),
            Reduction::Max => leaf.max(&axes, mask),
            Reduction::Sum => leaf.sum(&axes, mask),
            Reduction::Mean => leaf.mean(&axes, mask),
            Reduction::Std => leaf.std(&axes, mask),
            Reduction::Ptp => leaf.ptp(&axes, mask),
            Reduction::Rms => leaf.rms(&axes, mask),
            Reduction::Percentile(q) => leaf.percentile(q, &axes, mask),
        })
    }

    /// Boolean view of a plain scalar array (non-zero is true).
    fn booleans(&self) -> Result<ScalarArray<bool>> {
        match self {
            Array::Bool(a) => Ok(a.clone()),
            Array::Int(a) => Ok(a.map(|&v| v != 0)),
            Array::Scalar(a) => Ok(a.map(|&v| v != 0.0)),
            other => Err(NamedArrayError::IncompatibleKinds {
                from: other.type_name(),
                to: ArrayKind::Bool.to_string(),
            }),
        }
    }

    /// Whether every selected element is true.
    pub fn all(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Array> {
        Ok(Array::Bool(self.booleans()?.all(axis, mask)?))
    }

    /// Whether any selected element is true.
    pub fn any(&self, axis: &AxisSelection, mask: Option<&ScalarArray<bool>>) -> Result<Array> {
        Ok(Array::Bool(self.booleans()?.any(axis, mask)?))
    }

    /// Truth value of a size-1 plain scalar array.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::AmbiguousTruth`] for larger arrays,
    /// [`NamedArrayError::IncompatibleKinds`] for composite arrays.
    pub fn truth(&self) -> Result<bool> {
        self.booleans()?.truth()
    }

    /// Element-wise comparison of two plain scalar arrays.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{Array, Comparison, HasShape, NamedShape, ScalarArray};
    ///
    /// let s = NamedShape::from_pairs([("i", 3)]).unwrap();
    /// let a: Array = ScalarArray::from_vec(vec![1i64, 5, 9], &s).unwrap().into();
    /// let r = a.compare(&Array::from(4.0), Comparison::Gt).unwrap();
    /// assert_eq!(r.shape(), s);
    /// ```
    pub fn compare(&self, other: &Array, comparison: Comparison) -> Result<Array> {
        let lhs = self.promote(ArrayKind::Scalar, self)?;
        let rhs = other.promote(ArrayKind::Scalar, other)?;
        let (Array::Scalar(a), Array::Scalar(b)) = (&lhs, &rhs) else {
            return Err(NamedArrayError::IncompatibleKinds {
                from: other.type_name(),
                to: self.type_name(),
            });
        };
        let result = match comparison {
            Comparison::Lt => a.lt(b)?,
            Comparison::Le => a.le(b)?,
            Comparison::Gt => a.gt(b)?,
            Comparison::Ge => a.ge(b)?,
            Comparison::Eq => a.eq_elementwise(b)?,
            Comparison::Ne => a.ne_elementwise(b)?,
        };
        Ok(Array::Bool(result))
    }

    /// Element-wise type change of a plain scalar array.
    ///
    /// Composite arrays only support [`DType::F64`].
    pub fn cast(&self, dtype: DType) -> Result<Array> {
        match (self, dtype) {
            (a, DType::F64) if !a.kind().is_scalar() => Ok(a.clone()),
            (_, DType::F64) => self.promote(ArrayKind::Scalar, self),
            (Array::Bool(a), DType::I64) => Ok(Array::Int(a.map(|&b| b as i64))),
            (Array::Int(a), DType::I64) => Ok(Array::Int(a.clone())),
            (Array::Scalar(a), DType::I64) => Ok(Array::Int(a.cast::<i64>()?)),
            (a, DType::Bool) if a.kind().is_scalar() => Ok(Array::Bool(a.booleans()?)),
            (a, dtype) => Err(NamedArrayError::IncompatibleKinds {
                from: a.type_name(),
                to: dtype.to_string(),
            }),
        }
    }

    /// Convert every leaf to `unit`.
    pub fn to(&self, unit: &Unit) -> Result<Array> {
        self.map_leaves(|leaf| leaf.to(unit))
    }

    /// Broadcast every leaf to `shape`.
    pub fn broadcast_to(&self, shape: &NamedShape) -> Result<Array> {
        match self {
            Array::Int(a) => Ok(Array::Int(a.broadcast_to(shape)?)),
            Array::Bool(a) => Ok(Array::Bool(a.broadcast_to(shape)?)),
            Array::Uncertain(u) => Ok(Array::Uncertain(u.broadcast_to(shape)?)),
            _ => self.map_leaves(|leaf| leaf.broadcast_to(shape)),
        }
    }

    /// Positional reshape of every leaf.
    pub fn reshape(&self, shape: &NamedShape) -> Result<Array> {
        match self {
            Array::Int(a) => Ok(Array::Int(a.reshape(shape)?)),
            Array::Bool(a) => Ok(Array::Bool(a.reshape(shape)?)),
            Array::Uncertain(u) => Ok(Array::Uncertain(u.reshape(shape)?)),
            _ => self.map_leaves(|leaf| leaf.reshape(shape)),
        }
    }

    /// Permute the axes of every leaf.
    pub fn transpose(&self, axes: Option<&[&str]>) -> Result<Array> {
        match self {
            Array::Int(a) => Ok(Array::Int(a.transpose(axes)?)),
            Array::Bool(a) => Ok(Array::Bool(a.transpose(axes)?)),
            Array::Uncertain(u) => Ok(Array::Uncertain(u.transpose(axes)?)),
            _ => self.map_leaves(|leaf| leaf.transpose(axes)),
        }
    }

    /// Insert new size-1 axes in every leaf.
    pub fn add_axes(&self, names: &[&str]) -> Result<Array> {
        match self {
            Array::Int(a) => Ok(Array::Int(a.add_axes(names)?)),
            Array::Bool(a) => Ok(Array::Bool(a.add_axes(names)?)),
            _ => self.map_leaves(|leaf| leaf.add_axes(names)),
        }
    }

    /// Flatten the listed axes of every leaf into one axis.
    pub fn combine_axes(&self, axes: &[&str], name: Option<&str>) -> Result<Array> {
        match self {
            Array::Int(a) => Ok(Array::Int(a.combine_axes(axes, name)?)),
            Array::Bool(a) => Ok(Array::Bool(a.combine_axes(axes, name)?)),
            _ => self.map_leaves(|leaf| leaf.combine_axes(axes, name)),
        }
    }
}

impl HasShape for Array {
    fn shape(&self) -> NamedShape {
        match self {
            Array::Scalar(a) => a.shape(),
            Array::Int(a) => a.shape(),
            Array::Bool(a) => a.shape(),
            Array::Uncertain(a) => a.shape(),
            Array::Vector2d(a) => a.shape(),
            Array::Vector3d(a) => a.shape(),
            Array::VectorNd(a) => a.shape(),
            Array::Matrix2d(a) => a.shape(),
            Array::Matrix3d(a) => a.shape(),
            Array::MatrixNd(a) => a.shape(),
        }
    }
}

impl NamedArray for Array {
    fn kind(&self) -> ArrayKind {
        Array::kind(self)
    }

    fn dtype(&self) -> DType {
        match self {
            Array::Int(_) => DType::I64,
            Array::Bool(_) => DType::Bool,
            _ => DType::F64,
        }
    }

    fn unit(&self) -> Option<Unit> {
        match self {
            Array::Scalar(a) => a.unit().cloned(),
            Array::Int(a) => a.unit().cloned(),
            Array::Bool(_) => None,
            Array::Uncertain(a) => NamedArray::unit(a),
            Array::Vector2d(a) => NamedArray::unit(a),
            Array::Vector3d(a) => NamedArray::unit(a),
            Array::VectorNd(a) => NamedArray::unit(a),
            Array::Matrix2d(a) => NamedArray::unit(a),
            Array::Matrix3d(a) => NamedArray::unit(a),
            Array::MatrixNd(a) => NamedArray::unit(a),
        }
    }

    fn to_array(&self) -> Result<Array> {
        Ok(self.clone())
    }
}

impl IndexKey for Array {
    fn try_index_as_key(&self, host: &Array, item: &Item) -> Option<Result<Array>> {
        match self {
            Array::Uncertain(u) => u.index_host(host, item),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexing::getitem;

    fn line(values: Vec<f64>) -> ScalarArray<f64> {
        let shape = NamedShape::from_pairs([("t", values.len())]).unwrap();
        ScalarArray::from_vec(values, &shape).unwrap()
    }

    #[test]
    fn test_priorities_order_kinds() {
        assert!(ArrayKind::Scalar.priority() < ArrayKind::Uncertain.priority());
        assert!(ArrayKind::Uncertain.priority() < ArrayKind::Vector2d.priority());
        assert!(ArrayKind::Vector3d.priority() < ArrayKind::Matrix2d.priority());
    }

    #[test]
    fn test_type_array_ties_keep_first() {
        assert_eq!(
            type_array(&[ArrayKind::Vector3d, ArrayKind::Vector2d]),
            Some(ArrayKind::Vector3d)
        );
        assert_eq!(
            type_array(&[ArrayKind::Int, ArrayKind::Scalar]),
            Some(ArrayKind::Int)
        );
    }

    #[test]
    fn test_promote_scalar_to_vector() {
        let s = Array::Scalar(line(vec![1.0, 2.0]));
        let like = Array::Vector2d(Cartesian2dVectorArray::constant(0.0, 0.0));
        let v = s.promote(ArrayKind::Vector2d, &like).unwrap();
        assert_eq!(v.kind(), ArrayKind::Vector2d);
        assert_eq!(v.shape().get("t"), Some(2));
    }

    #[test]
    fn test_promote_planar_vector_to_3d() {
        let v = Cartesian2dVectorArray::new(
            line(vec![1.0, 2.0]).with_unit(Unit::meter()),
            ScalarArray::scalar(3.0).with_unit(Unit::meter()),
        )
        .unwrap();
        let like = Array::Vector3d(Cartesian3dVectorArray::constant(0.0, 0.0, 0.0));
        let Array::Vector3d(lifted) = Array::Vector2d(v).promote(ArrayKind::Vector3d, &like).unwrap()
        else {
            panic!("expected a 3D vector")
        };
        assert_eq!(lifted.y().item().unwrap(), 3.0);
        assert_eq!(lifted.z().item().unwrap(), 0.0);
        assert_eq!(lifted.z().unit(), Some(&Unit::meter()));
        assert_eq!(lifted.shape().get("t"), Some(2));
    }

    #[test]
    fn test_promote_uncertain_to_vector_fails() {
        let u = Array::Uncertain(UncertainScalarArray::from_scalar(ScalarArray::scalar(1.0)));
        let like = Array::Vector2d(Cartesian2dVectorArray::constant(0.0, 0.0));
        for kind in [ArrayKind::Vector2d, ArrayKind::Vector3d, ArrayKind::Matrix2d] {
            assert!(matches!(
                u.promote(kind, &like),
                Err(NamedArrayError::IncompatibleKinds { .. })
            ));
        }
    }

    #[test]
    fn test_promote_3d_vector_to_2d_fails() {
        let v = Array::Vector3d(Cartesian3dVectorArray::constant(1.0, 2.0, 3.0));
        assert!(matches!(
            v.promote(ArrayKind::Vector2d, &v),
            Err(NamedArrayError::IncompatibleKinds { .. })
        ));
    }

    #[test]
    fn test_reduce_with_nan_leaf() {
        let v = Cartesian2dVectorArray::new(line(vec![1.0, f64::NAN]), line(vec![2.0, 5.0])).unwrap();
        let Array::Vector2d(m) = Array::Vector2d(v)
            .reduce(Reduction::Max, &AxisSelection::All, None)
            .unwrap()
        else {
            panic!("expected a vector")
        };
        assert!(m.x().item().unwrap().is_nan());
        assert_eq!(m.y().item().unwrap(), 5.0);
    }

    #[test]
    fn test_promote_vector_to_scalar_fails() {
        let v = Array::Vector2d(Cartesian2dVectorArray::constant(1.0, 2.0));
        assert!(matches!(
            v.promote(ArrayKind::Scalar, &v),
            Err(NamedArrayError::IncompatibleKinds { .. })
        ));
    }

    #[test]
    fn test_vector_reduction_per_component() {
        let v = Cartesian2dVectorArray::new(line(vec![1.0, 3.0]), ScalarArray::scalar(5.0)).unwrap();
        let r = Array::Vector2d(v)
            .reduce(Reduction::Sum, &AxisSelection::All, None)
            .unwrap();
        let Array::Vector2d(r) = r else { panic!("expected a vector") };
        assert_eq!(r.x().item().unwrap(), 4.0);
        assert_eq!(r.y().item().unwrap(), 10.0);
    }

    #[test]
    fn test_vector_indexing_per_component() {
        let v = Cartesian2dVectorArray::new(line(vec![1.0, 3.0]), line(vec![2.0, 4.0])).unwrap();
        let r = getitem(&Array::Vector2d(v), &Item::axes([("t", 1)])).unwrap();
        let Array::Vector2d(r) = r else { panic!("expected a vector") };
        assert_eq!(r.x().item().unwrap(), 3.0);
        assert_eq!(r.y().item().unwrap(), 4.0);
    }

    #[test]
    fn test_truth_and_compare() {
        assert!(Array::from(2.0).truth().unwrap());
        assert!(matches!(
            Array::Scalar(line(vec![1.0, 2.0])).truth(),
            Err(NamedArrayError::AmbiguousTruth { size: 2 })
        ));
        let v = Array::Vector2d(Cartesian2dVectorArray::constant(1.0, 2.0));
        assert!(v.compare(&Array::from(1.0), Comparison::Lt).is_err());
    }

    #[test]
    fn test_cast_round_trip() {
        let a = Array::Scalar(line(vec![0.0, 2.0]));
        let b = a.cast(DType::Bool).unwrap();
        assert_eq!(b.kind(), ArrayKind::Bool);
        let i = b.cast(DType::I64).unwrap();
        let Array::Int(i) = i else { panic!("expected ints") };
        assert_eq!(i.ndarray().iter().cloned().collect::<Vec<_>>(), vec![0, 1]);
        assert!(a.cast(DType::F32).is_err());
    }

    #[test]
    fn test_copy_is_deep() {
        let Array::Scalar(a) = Array::Scalar(line(vec![1.0])).copy() else { unreachable!() };
        let b = line(vec![1.0]);
        assert!(!a.shares_data(&b));
    }
}
