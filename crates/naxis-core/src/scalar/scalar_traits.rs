//! # ScalarArray - Trait Implementations
//!
//! ## Implemented Traits
//!
//! - `Debug`, `Display`
//! - `From` for plain element values
//! - `Add`, `Sub`, `Mul`, `Div`, `Neg` on references to float arrays
//!
//! The operator impls panic on incompatible shapes or units; use the
//! `checked_*` methods to get a [`Result`](crate::Result) instead.

use super::types::ScalarArray;
use crate::shape::HasShape;
use crate::types::Element;
use std::fmt;

impl<T: Element> fmt::Debug for ScalarArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarArray")
            .field("shape", &self.shape())
            .field("dtype", &T::DTYPE)
            .field("unit", &self.unit)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: Element> fmt::Display for ScalarArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScalarArray<{}>{}", T::DTYPE, self.shape())?;
        if let Some(unit) = &self.unit {
            write!(f, " [{}]", unit.symbol())?;
        }
        Ok(())
    }
}

impl From<f64> for ScalarArray<f64> {
    fn from(value: f64) -> Self {
        ScalarArray::scalar(value)
    }
}

impl From<i64> for ScalarArray<i64> {
    fn from(value: i64) -> Self {
        ScalarArray::scalar(value)
    }
}

impl From<bool> for ScalarArray<bool> {
    fn from(value: bool) -> Self {
        ScalarArray::scalar(value)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $checked:ident, $what:literal) => {
        impl<'b> std::ops::$trait<&'b ScalarArray<f64>> for &ScalarArray<f64> {
            type Output = ScalarArray<f64>;
            fn $method(self, rhs: &'b ScalarArray<f64>) -> Self::Output {
                self.$checked(rhs)
                    .unwrap_or_else(|e| panic!("{} of incompatible arrays: {}", $what, e))
            }
        }

        impl std::ops::$trait<f64> for &ScalarArray<f64> {
            type Output = ScalarArray<f64>;
            fn $method(self, rhs: f64) -> Self::Output {
                self.$checked(&ScalarArray::scalar(rhs))
                    .unwrap_or_else(|e| panic!("{} of incompatible arrays: {}", $what, e))
            }
        }
    };
}

impl_binary_op!(Add, add, checked_add, "addition");
impl_binary_op!(Sub, sub, checked_sub, "subtraction");
impl_binary_op!(Mul, mul, checked_mul, "multiplication");
impl_binary_op!(Div, div, checked_div, "division");

impl std::ops::Neg for &ScalarArray<f64> {
    type Output = ScalarArray<f64>;
    fn neg(self) -> Self::Output {
        ScalarArray::neg(self)
    }
}
