//! Universal-function dispatch over mixed array kinds.
//!
//! Every element-wise numeric operation on [`Array`] values flows through
//! [`apply_ufunc`]:
//!
//! 1. plain numbers are normalized into zero-dimensional scalar arrays
//!    (through [`NamedArray::to_array`]);
//! 2. the named shapes of all operands are broadcast, failing early with a
//!    shape mismatch;
//! 3. the winning kind is chosen by [`type_array`] and every operand is
//!    promoted to it;
//! 4. the operation is applied leaf by leaf (scalar value, nominal value and
//!    distribution, vector components, matrix entries) and the result is
//!    rebuilt as the winning kind.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{Array, ArrayKind, ArrayMath, Cartesian2dVectorArray, NamedArray};
//!
//! let v = Cartesian2dVectorArray::constant(1.0, 2.0);
//! let scaled = 3.0_f64.try_mul(&v).unwrap();
//! assert_eq!(NamedArray::kind(&scaled), ArrayKind::Vector2d);
//! let Array::Vector2d(scaled) = scaled else { unreachable!() };
//! assert_eq!(scaled.y().item().unwrap(), 6.0);
//! ```

use crate::array::{type_array, Array, ArrayKind, NamedArray};
use crate::error::{NamedArrayError, Result};
use crate::scalar::ScalarArray;
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use std::fmt;

/// Element-wise operation applied by [`apply_ufunc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ufunc {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    Abs,
    Square,
    Sqrt,
    Exp,
    Ln,
    Sin,
    Cos,
}

impl Ufunc {
    /// Number of operands the operation takes.
    pub fn arity(&self) -> usize {
        match self {
            Ufunc::Add | Ufunc::Sub | Ufunc::Mul | Ufunc::Div | Ufunc::Pow => 2,
            _ => 1,
        }
    }

    fn apply(&self, leaves: &[&ScalarArray<f64>]) -> Result<ScalarArray<f64>> {
        let a = leaves[0];
        match self {
            Ufunc::Add => a.checked_add(leaves[1]),
            Ufunc::Sub => a.checked_sub(leaves[1]),
            Ufunc::Mul => a.checked_mul(leaves[1]),
            Ufunc::Div => a.checked_div(leaves[1]),
            Ufunc::Pow => a.checked_pow(leaves[1]),
            Ufunc::Neg => Ok(a.neg()),
            Ufunc::Abs => Ok(a.abs()),
            Ufunc::Square => Ok(a.square()),
            Ufunc::Sqrt => a.sqrt(),
            Ufunc::Exp => a.exp(),
            Ufunc::Ln => a.ln(),
            Ufunc::Sin => a.sin(),
            Ufunc::Cos => a.cos(),
        }
    }
}

impl fmt::Display for Ufunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Apply `op` to `operands`, producing an array of the winning kind.
///
/// # Errors
///
/// - [`NamedArrayError::InvalidArgument`] for a wrong number of operands
/// - [`NamedArrayError::ShapeMismatch`] when the operands do not broadcast
/// - [`NamedArrayError::IncompatibleKinds`] when an operand cannot be
///   promoted to the winning kind, or composites disagree on their leaves
/// - any unit or domain error of the element-wise operation
pub fn apply_ufunc(op: Ufunc, operands: &[&Array]) -> Result<Array> {
    if operands.len() != op.arity() {
        return Err(NamedArrayError::InvalidArgument(format!(
            "{} takes {} operands, got {}",
            op,
            op.arity(),
            operands.len()
        )));
    }
    let shapes: Vec<NamedShape> = operands.iter().map(|a| a.shape()).collect();
    let refs: Vec<&NamedShape> = shapes.iter().collect();
    broadcast_shapes(&refs)?;

    let kinds: Vec<ArrayKind> = operands.iter().map(|a| a.kind()).collect();
    let winner = match type_array(&kinds) {
        Some(kind) if kind.is_scalar() => ArrayKind::Scalar,
        // A planar vector is a 3D vector in the z = 0 plane.
        Some(ArrayKind::Vector2d) if kinds.contains(&ArrayKind::Vector3d) => ArrayKind::Vector3d,
        Some(kind) => kind,
        None => ArrayKind::Scalar,
    };
    tracing::trace!(op = %op, winner = %winner, "ufunc dispatch");

    let like = operands
        .iter()
        .find(|a| a.kind() == winner)
        .copied()
        .unwrap_or(operands[0]);
    let promoted = operands
        .iter()
        .map(|a| a.promote(winner, like))
        .collect::<Result<Vec<_>>>()?;
    let leaves = promoted
        .iter()
        .map(|a| a.leaves())
        .collect::<Result<Vec<_>>>()?;

    let template = &leaves[0];
    for other in &leaves[1..] {
        let same = other.len() == template.len()
            && other.iter().zip(template).all(|((m, _), (n, _))| m == n);
        if !same {
            return Err(NamedArrayError::IncompatibleKinds {
                from: format!("{:?}", other.iter().map(|(n, _)| n).collect::<Vec<_>>()),
                to: format!("{:?}", template.iter().map(|(n, _)| n).collect::<Vec<_>>()),
            });
        }
    }

    let mut results = Vec::with_capacity(template.len());
    for i in 0..template.len() {
        let args: Vec<&ScalarArray<f64>> = leaves.iter().map(|l| &l[i].1).collect();
        results.push(op.apply(&args)?);
    }
    promoted[0].rebuild(results)
}

fn binary<A: NamedArray + ?Sized>(op: Ufunc, a: &A, b: &dyn NamedArray) -> Result<Array> {
    apply_ufunc(op, &[&a.to_array()?, &b.to_array()?])
}

/// Checked arithmetic on anything that converts to an [`Array`].
pub trait ArrayMath: NamedArray {
    fn try_add(&self, other: &dyn NamedArray) -> Result<Array> {
        binary(Ufunc::Add, self, other)
    }

    fn try_sub(&self, other: &dyn NamedArray) -> Result<Array> {
        binary(Ufunc::Sub, self, other)
    }

    fn try_mul(&self, other: &dyn NamedArray) -> Result<Array> {
        binary(Ufunc::Mul, self, other)
    }

    fn try_div(&self, other: &dyn NamedArray) -> Result<Array> {
        binary(Ufunc::Div, self, other)
    }

    fn try_pow(&self, exponent: &dyn NamedArray) -> Result<Array> {
        binary(Ufunc::Pow, self, exponent)
    }

    /// Apply a one-operand ufunc.
    fn ufunc(&self, op: Ufunc) -> Result<Array> {
        apply_ufunc(op, &[&self.to_array()?])
    }
}

impl<T: NamedArray + ?Sized> ArrayMath for T {}

macro_rules! impl_array_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl<'b> std::ops::$trait<&'b Array> for &Array {
            type Output = Array;
            fn $method(self, rhs: &'b Array) -> Self::Output {
                apply_ufunc(Ufunc::$op, &[self, rhs]).unwrap_or_else(|e| {
                    panic!("{} of {} and {} failed: {}", Ufunc::$op, self.type_name(), rhs.type_name(), e)
                })
            }
        }
    };
}

impl_array_op!(Add, add, Add);
impl_array_op!(Sub, sub, Sub);
impl_array_op!(Mul, mul, Mul);
impl_array_op!(Div, div, Div);

impl std::ops::Neg for &Array {
    type Output = Array;
    fn neg(self) -> Self::Output {
        apply_ufunc(Ufunc::Neg, &[self])
            .unwrap_or_else(|e| panic!("Neg of {} failed: {}", self.type_name(), e))
    }
}
