//! Element-wise operations on scalar arrays
//!
//! Binary operations broadcast both operands by axis name, align their data
//! to the broadcast shape and combine them with `Zip`. Units follow the usual
//! rules: addition, subtraction and comparisons express the right operand in
//! the unit of the left one; multiplication and division combine units;
//! transcendental functions require dimensionless input.

use super::types::ScalarArray;
use crate::error::{NamedArrayError, Result};
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use crate::types::Element;
use crate::units::Unit;
use scirs2_core::ndarray_ext::{ArrayD, Zip};

fn same_unit(a: Option<&Unit>, b: Option<&Unit>) -> Option<Unit> {
    a.or(b).cloned()
}

impl<T: Element> ScalarArray<T> {
    /// Broadcast `self` and `other`, then combine them element by element.
    pub(crate) fn zip_with<U: Element, V: Element>(
        &self,
        other: &ScalarArray<U>,
        unit: Option<Unit>,
        f: impl Fn(&T, &U) -> V,
    ) -> Result<ScalarArray<V>> {
        let (lhs, rhs) = (self.shape(), other.shape());
        let shape = broadcast_shapes(&[&lhs, &rhs])?;
        let a = self.broadcast_data(&shape)?;
        let b = other.broadcast_data(&shape)?;
        let data: ArrayD<V> = Zip::from(&a).and(&b).map_collect(|x, y| f(x, y));
        Ok(ScalarArray::from_parts(data, shape.names(), unit))
    }
}

impl ScalarArray<f64> {
    /// Factor that expresses `other` in the unit of `self`.
    fn factor_into_self(&self, other: &Self) -> Result<f64> {
        if self.unit.is_none() && other.unit.is_none() {
            return Ok(1.0);
        }
        other
            .unit_normalized()
            .conversion_factor(&self.unit_normalized())
    }

    fn require_dimensionless(&self, op: &str) -> Result<()> {
        let unit = self.unit_normalized();
        if unit.is_dimensionless() {
            Ok(())
        } else {
            Err(NamedArrayError::IncompatibleUnits {
                from: unit.to_string(),
                to: format!("dimensionless (required by {})", op),
            })
        }
    }

    /// Element-wise sum, broadcasting by axis name.
    ///
    /// # Errors
    ///
    /// Fails on incompatible shapes or units.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{HasShape, NamedShape, ScalarArray};
    ///
    /// let a = ScalarArray::<f64>::ones(&NamedShape::from_pairs([("x", 3), ("y", 1)]).unwrap());
    /// let b = ScalarArray::<f64>::ones(&NamedShape::from_pairs([("y", 4), ("z", 2)]).unwrap());
    /// let c = a.checked_add(&b).unwrap();
    /// assert_eq!(c.size(), 24);
    /// assert!(c.ndarray().iter().all(|&v| v == 2.0));
    /// ```
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        let factor = self.factor_into_self(other)?;
        let unit = same_unit(self.unit(), other.unit());
        self.zip_with(other, unit, |a, b| a + b * factor)
    }

    /// Element-wise difference, broadcasting by axis name.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        let factor = self.factor_into_self(other)?;
        let unit = same_unit(self.unit(), other.unit());
        self.zip_with(other, unit, |a, b| a - b * factor)
    }

    /// Element-wise product; units multiply.
    pub fn checked_mul(&self, other: &Self) -> Result<Self> {
        let unit = match (self.unit(), other.unit()) {
            (None, None) => None,
            (a, b) => Some(
                a.cloned()
                    .unwrap_or_default()
                    .mul(&b.cloned().unwrap_or_default()),
            ),
        };
        self.zip_with(other, unit, |a, b| a * b)
    }

    /// Element-wise quotient; units divide.
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        let unit = match (self.unit(), other.unit()) {
            (None, None) => None,
            (a, b) => Some(
                a.cloned()
                    .unwrap_or_default()
                    .div(&b.cloned().unwrap_or_default()),
            ),
        };
        self.zip_with(other, unit, |a, b| a / b)
    }

    /// Element-wise power.
    ///
    /// The exponent must be dimensionless. A base with a unit additionally
    /// needs a single integral exponent so the resulting unit is well defined.
    pub fn checked_pow(&self, exponent: &Self) -> Result<Self> {
        exponent.require_dimensionless("pow")?;
        let unit = match self.unit() {
            Some(unit) if !unit.is_dimensionless() => {
                let n = exponent
                    .item()
                    .ok()
                    .filter(|n| n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX))
                    .ok_or_else(|| NamedArrayError::IncompatibleUnits {
                        from: unit.to_string(),
                        to: "a non-integer, out-of-range or array-valued power".to_string(),
                    })?;
                Some(unit.powi(n as i32))
            }
            other => other.cloned(),
        };
        self.zip_with(exponent, unit, |a, b| a.powf(*b))
    }

    /// Negate every element.
    pub fn neg(&self) -> Self {
        self.map(|v| -v)
    }

    /// Absolute value of every element.
    pub fn abs(&self) -> Self {
        self.map(|v| v.abs())
    }

    /// Square every element; the unit is squared too.
    pub fn square(&self) -> Self {
        let mut out = self.map(|v| v * v);
        out.unit = self.unit.as_ref().map(|u| u.powi(2));
        out
    }

    /// Square root of every element.
    ///
    /// # Errors
    ///
    /// Fails if the unit has no square root.
    pub fn sqrt(&self) -> Result<Self> {
        let unit = self.unit.as_ref().map(|u| u.root(2)).transpose()?;
        let mut out = self.map(|v| v.sqrt());
        out.unit = unit;
        Ok(out)
    }

    fn transcendental(&self, op: &str, f: impl Fn(f64) -> f64) -> Result<Self> {
        self.require_dimensionless(op)?;
        let mut out = self.map(|&v| f(v));
        out.unit = None;
        Ok(out)
    }

    /// Exponential of every element; requires dimensionless input.
    pub fn exp(&self) -> Result<Self> {
        self.transcendental("exp", f64::exp)
    }

    /// Natural logarithm of every element; requires dimensionless input.
    pub fn ln(&self) -> Result<Self> {
        self.transcendental("ln", f64::ln)
    }

    /// Sine of every element; requires dimensionless input.
    pub fn sin(&self) -> Result<Self> {
        self.transcendental("sin", f64::sin)
    }

    /// Cosine of every element; requires dimensionless input.
    pub fn cos(&self) -> Result<Self> {
        self.transcendental("cos", f64::cos)
    }

    fn compare(&self, other: &Self, f: impl Fn(f64, f64) -> bool) -> Result<ScalarArray<bool>> {
        let factor = self.factor_into_self(other)?;
        self.zip_with(other, None, |&a, &b| f(a, b * factor))
    }

    /// Element-wise `<`, returning a boolean array.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{NamedShape, ScalarArray};
    ///
    /// let s = NamedShape::from_pairs([("i", 3)]).unwrap();
    /// let a = ScalarArray::from_vec(vec![1.0, 2.0, 3.0], &s).unwrap();
    /// let mask = a.lt(&ScalarArray::scalar(2.5)).unwrap();
    /// assert_eq!(mask.ndarray().iter().cloned().collect::<Vec<_>>(), vec![true, true, false]);
    /// ```
    pub fn lt(&self, other: &Self) -> Result<ScalarArray<bool>> {
        self.compare(other, |a, b| a < b)
    }

    /// Element-wise `<=`.
    pub fn le(&self, other: &Self) -> Result<ScalarArray<bool>> {
        self.compare(other, |a, b| a <= b)
    }

    /// Element-wise `>`.
    pub fn gt(&self, other: &Self) -> Result<ScalarArray<bool>> {
        self.compare(other, |a, b| a > b)
    }

    /// Element-wise `>=`.
    pub fn ge(&self, other: &Self) -> Result<ScalarArray<bool>> {
        self.compare(other, |a, b| a >= b)
    }

    /// Element-wise `==`; never collapses to a single boolean.
    pub fn eq_elementwise(&self, other: &Self) -> Result<ScalarArray<bool>> {
        self.compare(other, |a, b| a == b)
    }

    /// Element-wise `!=`.
    pub fn ne_elementwise(&self, other: &Self) -> Result<ScalarArray<bool>> {
        self.compare(other, |a, b| a != b)
    }

    /// In-place `self += other`.
    ///
    /// The receiver keeps its named shape, so `other` must broadcast into it.
    /// On failure `self` is left untouched.
    pub fn add_assign_checked(&mut self, other: &Self) -> Result<()> {
        let result = self.checked_add(other)?;
        self.assign_same_shape(result)
    }

    /// In-place `self -= other`; `self` is unchanged on failure.
    pub fn sub_assign_checked(&mut self, other: &Self) -> Result<()> {
        let result = self.checked_sub(other)?;
        self.assign_same_shape(result)
    }

    /// In-place `self *= other`; `self` is unchanged on failure.
    pub fn mul_assign_checked(&mut self, other: &Self) -> Result<()> {
        let result = self.checked_mul(other)?;
        self.assign_same_shape(result)
    }

    /// In-place `self /= other`; `self` is unchanged on failure.
    pub fn div_assign_checked(&mut self, other: &Self) -> Result<()> {
        let result = self.checked_div(other)?;
        self.assign_same_shape(result)
    }

    fn assign_same_shape(&mut self, result: Self) -> Result<()> {
        let own: NamedShape = self.shape();
        if !result.shape().equivalent(&own) {
            return Err(NamedArrayError::shape_mismatch(&[own, result.shape()]));
        }
        let data = result.ndarray_aligned(&own)?;
        *self = Self::from_parts(data, own.names(), result.unit);
        Ok(())
    }
}

impl ScalarArray<bool> {
    /// Element-wise logical and.
    pub fn and(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, None, |&a, &b| a && b)
    }

    /// Element-wise logical or.
    pub fn or(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, None, |&a, &b| a || b)
    }

    /// Element-wise logical not.
    pub fn not(&self) -> Self {
        self.map(|&v| !v)
    }
}

impl<T: Element> ScalarArray<T> {
    /// Truth value of a size-1 array.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::AmbiguousTruth`] if the array has more than one element.
    pub fn truth(&self) -> Result<bool>
    where
        T: PartialEq + Default,
    {
        Ok(self.item()? != T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(pairs: &[(&str, usize)], values: Vec<f64>) -> ScalarArray<f64> {
        let shape = NamedShape::from_pairs(pairs.iter().map(|(n, s)| (*n, *s))).unwrap();
        ScalarArray::from_vec(values, &shape).unwrap()
    }

    #[test]
    fn test_add_broadcasts_by_name() {
        let a = arr(&[("x", 2)], vec![1.0, 2.0]);
        let b = arr(&[("y", 3)], vec![10.0, 20.0, 30.0]);
        let c = a.checked_add(&b).unwrap();
        assert_eq!(c.value_at(&[("x", 1), ("y", 2)]).unwrap(), 32.0);
    }

    #[test]
    fn test_add_mismatch_fails() {
        let a = arr(&[("x", 2)], vec![1.0, 2.0]);
        let b = arr(&[("x", 3)], vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            a.checked_add(&b),
            Err(NamedArrayError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_add_converts_units() {
        let km = Unit::scaled("km", 1000.0, &Unit::meter());
        let a = ScalarArray::scalar(1.0).with_unit(Unit::meter());
        let b = ScalarArray::scalar(2.0).with_unit(km);
        let c = a.checked_add(&b).unwrap();
        assert_eq!(c.item().unwrap(), 2001.0);
        assert_eq!(c.unit(), Some(&Unit::meter()));

        let t = ScalarArray::scalar(1.0).with_unit(Unit::second());
        assert!(a.checked_add(&t).is_err());
    }

    #[test]
    fn test_mul_combines_units() {
        let a = ScalarArray::scalar(3.0).with_unit(Unit::meter());
        let b = ScalarArray::scalar(2.0).with_unit(Unit::second());
        let speed = a.checked_div(&b).unwrap();
        assert_eq!(speed.item().unwrap(), 1.5);
        assert!(speed
            .unit_normalized()
            .is_compatible(&Unit::meter().div(&Unit::second())));
    }

    #[test]
    fn test_pow_with_unit() {
        let a = ScalarArray::scalar(3.0).with_unit(Unit::meter());
        let area = a.checked_pow(&ScalarArray::scalar(2.0)).unwrap();
        assert_eq!(area.item().unwrap(), 9.0);
        assert!(area.unit_normalized().is_compatible(&Unit::meter().powi(2)));
        assert!(a.checked_pow(&ScalarArray::scalar(0.5)).is_err());
    }

    #[test]
    fn test_pow_with_unit_rejects_huge_exponent() {
        let a = ScalarArray::scalar(1.0).with_unit(Unit::meter());
        for n in [1e10, -1e10, f64::INFINITY] {
            assert!(matches!(
                a.checked_pow(&ScalarArray::scalar(n)),
                Err(NamedArrayError::IncompatibleUnits { .. })
            ));
        }
        let unitless = ScalarArray::scalar(1.0);
        assert_eq!(unitless.checked_pow(&ScalarArray::scalar(1e10)).unwrap().item().unwrap(), 1.0);
    }

    #[test]
    fn test_transcendental_requires_dimensionless() {
        let a = ScalarArray::scalar(0.0);
        assert_eq!(a.exp().unwrap().item().unwrap(), 1.0);
        assert!(a.with_unit(Unit::meter()).sin().is_err());
    }

    #[test]
    fn test_in_place_unchanged_on_failure() {
        let mut a = arr(&[("x", 2)], vec![1.0, 2.0]);
        let b = arr(&[("y", 2)], vec![1.0, 1.0]);
        assert!(a.add_assign_checked(&b).is_err());
        assert_eq!(a.axis_names(), &["x"]);
        assert_eq!(a.ndarray().iter().cloned().collect::<Vec<_>>(), vec![1.0, 2.0]);

        a.add_assign_checked(&ScalarArray::scalar(1.0)).unwrap();
        assert_eq!(a.ndarray().iter().cloned().collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_truth() {
        assert!(ScalarArray::scalar(1.0).truth().unwrap());
        assert!(!ScalarArray::scalar(false).truth().unwrap());
        let a = arr(&[("x", 2)], vec![1.0, 2.0]);
        assert!(matches!(
            a.truth(),
            Err(NamedArrayError::AmbiguousTruth { size: 2 })
        ));
    }

    #[test]
    fn test_comparisons() {
        let a = arr(&[("x", 3)], vec![1.0, 2.0, 3.0]);
        let eq = a.eq_elementwise(&ScalarArray::scalar(2.0)).unwrap();
        let ge = a.ge(&ScalarArray::scalar(2.0)).unwrap();
        let both = eq.and(&ge).unwrap();
        assert_eq!(
            both.ndarray().iter().cloned().collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_eq!(
            ge.not().ndarray().iter().cloned().collect::<Vec<_>>(),
            vec![true, false, false]
        );
    }
}
