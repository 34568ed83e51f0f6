//! Cartesian vector arrays
//!
//! A vector array is a fixed set of named scalar components. Components are
//! broadcast independently; the vector's shape is the broadcast of all of its
//! component shapes. The component names of the 2D and 3D kinds are fixed
//! (`x`, `y` and `x`, `y`, `z`); [`CartesianNdVectorArray`] carries an arbitrary
//! ordered set of names and is the domain type of the secant search.
//!
//! # Examples
//!
//! ```
//! use naxis_core::{Cartesian2dVectorArray, CartesianVector, HasShape, NamedShape, ScalarArray};
//!
//! let t3 = NamedShape::from_pairs([("t", 3)]).unwrap();
//! let t1 = NamedShape::from_pairs([("t", 1)]).unwrap();
//! let v = Cartesian2dVectorArray::new(
//!     ScalarArray::full(&t3, 3.0),
//!     ScalarArray::full(&t1, 4.0),
//! )
//! .unwrap();
//! assert_eq!(v.shape(), t3);
//! assert!(v.length().unwrap().ndarray().iter().all(|&l| l == 5.0));
//! ```

use crate::array::{Array, ArrayKind, NamedArray};
use crate::error::{NamedArrayError, Result};
use crate::scalar::ScalarArray;
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use crate::types::DType;
use crate::units::Unit;

/// Broadcast shape of a list of components.
fn components_shape(components: &[&ScalarArray<f64>]) -> Result<NamedShape> {
    let shapes: Vec<NamedShape> = components.iter().map(|c| c.shape()).collect();
    let refs: Vec<&NamedShape> = shapes.iter().collect();
    broadcast_shapes(&refs)
}

/// Operations shared by every Cartesian vector kind.
pub trait CartesianVector: NamedArray + Sized {
    /// `(name, component)` pairs in their fixed order.
    fn components(&self) -> Vec<(&str, &ScalarArray<f64>)>;

    /// Rebuild a vector of the same kind from new components, in the order
    /// returned by [`components`](Self::components).
    fn with_components(&self, components: Vec<ScalarArray<f64>>) -> Result<Self>;

    /// Component by name.
    fn component(&self, name: &str) -> Option<&ScalarArray<f64>> {
        self.components()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c)
    }

    /// Apply a fallible function to every component.
    fn map_components(
        &self,
        f: impl Fn(&ScalarArray<f64>) -> Result<ScalarArray<f64>>,
    ) -> Result<Self> {
        let mapped = self
            .components()
            .into_iter()
            .map(|(_, c)| f(c))
            .collect::<Result<Vec<_>>>()?;
        self.with_components(mapped)
    }

    /// Combine the components of two vectors of the same kind pairwise.
    fn zip_components(
        &self,
        other: &Self,
        f: impl Fn(&ScalarArray<f64>, &ScalarArray<f64>) -> Result<ScalarArray<f64>>,
    ) -> Result<Self> {
        let (a, b) = (self.components(), other.components());
        if a.len() != b.len() || a.iter().zip(&b).any(|((n, _), (m, _))| n != m) {
            return Err(NamedArrayError::IncompatibleKinds {
                from: format!("{:?}", b.iter().map(|(n, _)| *n).collect::<Vec<_>>()),
                to: format!("{:?}", a.iter().map(|(n, _)| *n).collect::<Vec<_>>()),
            });
        }
        let combined = a
            .iter()
            .zip(&b)
            .map(|((_, x), (_, y))| f(x, y))
            .collect::<Result<Vec<_>>>()?;
        self.with_components(combined)
    }

    /// Dot product with another vector of the same kind.
    fn dot(&self, other: &Self) -> Result<ScalarArray<f64>> {
        let products = self.zip_components(other, |a, b| a.checked_mul(b))?;
        let mut terms = products.components().into_iter().map(|(_, c)| c);
        let first = terms.next().ok_or_else(|| {
            NamedArrayError::Dimension("dot product of a vector without components".to_string())
        })?;
        terms.try_fold(first.clone(), |acc, c| acc.checked_add(c))
    }

    /// Euclidean (L2) length of every vector.
    fn length(&self) -> Result<ScalarArray<f64>> {
        self.dot(self)?.sqrt()
    }

    /// Same components as an N-dimensional vector.
    fn to_nd(&self) -> Result<CartesianNdVectorArray> {
        CartesianNdVectorArray::new(
            self.components()
                .into_iter()
                .map(|(n, c)| (n.to_string(), c.clone()))
                .collect(),
        )
    }
}

/// 2D Cartesian vector array with components `x` and `y`.
#[derive(Clone, Debug)]
pub struct Cartesian2dVectorArray {
    x: ScalarArray<f64>,
    y: ScalarArray<f64>,
    shape: NamedShape,
}

impl Cartesian2dVectorArray {
    /// Build a vector, checking that the components broadcast together.
    pub fn new(x: ScalarArray<f64>, y: ScalarArray<f64>) -> Result<Self> {
        let shape = components_shape(&[&x, &y])?;
        Ok(Self { x, y, shape })
    }

    /// Vector whose components all equal `value`.
    pub fn from_scalar(value: ScalarArray<f64>) -> Self {
        let shape = value.shape();
        Self {
            x: value.clone(),
            y: value,
            shape,
        }
    }

    /// Zero-dimensional vector with the given components.
    pub fn constant(x: f64, y: f64) -> Self {
        Self {
            x: ScalarArray::scalar(x),
            y: ScalarArray::scalar(y),
            shape: NamedShape::new(),
        }
    }

    pub fn x(&self) -> &ScalarArray<f64> {
        &self.x
    }

    pub fn y(&self) -> &ScalarArray<f64> {
        &self.y
    }

    /// Fully independent copy.
    pub fn copy(&self) -> Self {
        Self {
            x: self.x.copy(),
            y: self.y.copy(),
            shape: self.shape.clone(),
        }
    }
}

impl HasShape for Cartesian2dVectorArray {
    fn shape(&self) -> NamedShape {
        self.shape.clone()
    }
}

impl NamedArray for Cartesian2dVectorArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Vector2d
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        self.x.unit().cloned()
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::Vector2d(self.clone()))
    }
}

impl CartesianVector for Cartesian2dVectorArray {
    fn components(&self) -> Vec<(&str, &ScalarArray<f64>)> {
        vec![("x", &self.x), ("y", &self.y)]
    }

    fn with_components(&self, components: Vec<ScalarArray<f64>>) -> Result<Self> {
        match <[ScalarArray<f64>; 2]>::try_from(components) {
            Ok([x, y]) => Self::new(x, y),
            Err(c) => Err(NamedArrayError::Dimension(format!(
                "2D vector needs 2 components, got {}",
                c.len()
            ))),
        }
    }
}

/// 3D Cartesian vector array with components `x`, `y` and `z`.
#[derive(Clone, Debug)]
pub struct Cartesian3dVectorArray {
    x: ScalarArray<f64>,
    y: ScalarArray<f64>,
    z: ScalarArray<f64>,
    shape: NamedShape,
}

impl Cartesian3dVectorArray {
    /// Build a vector, checking that the components broadcast together.
    pub fn new(x: ScalarArray<f64>, y: ScalarArray<f64>, z: ScalarArray<f64>) -> Result<Self> {
        let shape = components_shape(&[&x, &y, &z])?;
        Ok(Self { x, y, z, shape })
    }

    /// Vector whose components all equal `value`.
    pub fn from_scalar(value: ScalarArray<f64>) -> Self {
        let shape = value.shape();
        Self {
            x: value.clone(),
            y: value.clone(),
            z: value,
            shape,
        }
    }

    /// Zero-dimensional vector with the given components.
    pub fn constant(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: ScalarArray::scalar(x),
            y: ScalarArray::scalar(y),
            z: ScalarArray::scalar(z),
            shape: NamedShape::new(),
        }
    }

    /// Extend a 2D vector with a `z` component.
    pub fn from_xy(xy: &Cartesian2dVectorArray, z: ScalarArray<f64>) -> Result<Self> {
        Self::new(xy.x.clone(), xy.y.clone(), z)
    }

    pub fn x(&self) -> &ScalarArray<f64> {
        &self.x
    }

    pub fn y(&self) -> &ScalarArray<f64> {
        &self.y
    }

    pub fn z(&self) -> &ScalarArray<f64> {
        &self.z
    }

    /// The `x`, `y` part of this vector.
    pub fn xy(&self) -> Result<Cartesian2dVectorArray> {
        Cartesian2dVectorArray::new(self.x.clone(), self.y.clone())
    }

    /// Fully independent copy.
    pub fn copy(&self) -> Self {
        Self {
            x: self.x.copy(),
            y: self.y.copy(),
            z: self.z.copy(),
            shape: self.shape.clone(),
        }
    }

    /// Cross product `self × other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{Cartesian3dVectorArray, ScalarArray};
    ///
    /// let s = |v: f64| ScalarArray::scalar(v);
    /// let ex = Cartesian3dVectorArray::new(s(1.0), s(0.0), s(0.0)).unwrap();
    /// let ey = Cartesian3dVectorArray::new(s(0.0), s(1.0), s(0.0)).unwrap();
    /// let ez = ex.cross(&ey).unwrap();
    /// assert_eq!(ez.z().item().unwrap(), 1.0);
    /// assert_eq!(ez.x().item().unwrap(), 0.0);
    /// ```
    pub fn cross(&self, other: &Self) -> Result<Self> {
        let term = |a: &ScalarArray<f64>,
                    b: &ScalarArray<f64>,
                    c: &ScalarArray<f64>,
                    d: &ScalarArray<f64>| { a.checked_mul(b)?.checked_sub(&c.checked_mul(d)?) };
        Self::new(
            term(&self.y, &other.z, &self.z, &other.y)?,
            term(&self.z, &other.x, &self.x, &other.z)?,
            term(&self.x, &other.y, &self.y, &other.x)?,
        )
    }
}

impl HasShape for Cartesian3dVectorArray {
    fn shape(&self) -> NamedShape {
        self.shape.clone()
    }
}

impl NamedArray for Cartesian3dVectorArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Vector3d
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        self.x.unit().cloned()
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::Vector3d(self.clone()))
    }
}

impl CartesianVector for Cartesian3dVectorArray {
    fn components(&self) -> Vec<(&str, &ScalarArray<f64>)> {
        vec![("x", &self.x), ("y", &self.y), ("z", &self.z)]
    }

    fn with_components(&self, components: Vec<ScalarArray<f64>>) -> Result<Self> {
        match <[ScalarArray<f64>; 3]>::try_from(components) {
            Ok([x, y, z]) => Self::new(x, y, z),
            Err(c) => Err(NamedArrayError::Dimension(format!(
                "3D vector needs 3 components, got {}",
                c.len()
            ))),
        }
    }
}

/// Vector array with an arbitrary ordered set of named components.
#[derive(Clone, Debug)]
pub struct CartesianNdVectorArray {
    components: Vec<(String, ScalarArray<f64>)>,
    shape: NamedShape,
}

impl CartesianNdVectorArray {
    /// Build a vector from `(name, component)` pairs.
    ///
    /// # Errors
    ///
    /// Fails on duplicate component names or non-broadcastable components.
    pub fn new(components: Vec<(String, ScalarArray<f64>)>) -> Result<Self> {
        for (i, (name, _)) in components.iter().enumerate() {
            if components[..i].iter().any(|(n, _)| n == name) {
                return Err(NamedArrayError::DuplicateAxis(name.clone()));
            }
        }
        let refs: Vec<&ScalarArray<f64>> = components.iter().map(|(_, c)| c).collect();
        let shape = components_shape(&refs)?;
        Ok(Self { components, shape })
    }

    /// Vector with the given component names, each equal to `value`.
    pub fn from_scalar<S: AsRef<str>>(names: &[S], value: ScalarArray<f64>) -> Self {
        let shape = value.shape();
        Self {
            components: names
                .iter()
                .map(|n| (n.as_ref().to_string(), value.clone()))
                .collect(),
            shape,
        }
    }

    /// Component names in order.
    pub fn names(&self) -> Vec<String> {
        self.components.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Fully independent copy.
    pub fn copy(&self) -> Self {
        Self {
            components: self
                .components
                .iter()
                .map(|(n, c)| (n.clone(), c.copy()))
                .collect(),
            shape: self.shape.clone(),
        }
    }
}

impl HasShape for CartesianNdVectorArray {
    fn shape(&self) -> NamedShape {
        self.shape.clone()
    }
}

impl NamedArray for CartesianNdVectorArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::VectorNd
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        self.components.first().and_then(|(_, c)| c.unit().cloned())
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::VectorNd(self.clone()))
    }
}

impl CartesianVector for CartesianNdVectorArray {
    fn components(&self) -> Vec<(&str, &ScalarArray<f64>)> {
        self.components
            .iter()
            .map(|(n, c)| (n.as_str(), c))
            .collect()
    }

    fn with_components(&self, components: Vec<ScalarArray<f64>>) -> Result<Self> {
        if components.len() != self.components.len() {
            return Err(NamedArrayError::Dimension(format!(
                "vector with components {:?} cannot take {} components",
                self.names(),
                components.len()
            )));
        }
        Self::new(self.names().into_iter().zip(components).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: Vec<f64>) -> ScalarArray<f64> {
        let shape = NamedShape::from_pairs([("t", values.len())]).unwrap();
        ScalarArray::from_vec(values, &shape).unwrap()
    }

    #[test]
    fn test_component_broadcast_shape() {
        let v = Cartesian2dVectorArray::new(line(vec![1.0, 2.0, 3.0]), line(vec![0.0])).unwrap();
        assert_eq!(v.shape().get("t"), Some(3));
        assert!(Cartesian2dVectorArray::new(line(vec![1.0, 2.0]), line(vec![1.0, 2.0, 3.0])).is_err());
    }

    #[test]
    fn test_dot_and_length() {
        let a = Cartesian3dVectorArray::new(line(vec![1.0, 0.0]), line(vec![2.0, 3.0]), line(vec![2.0, 4.0])).unwrap();
        let len: Vec<f64> = a.length().unwrap().ndarray().iter().cloned().collect();
        assert_eq!(len, vec![3.0, 5.0]);
    }

    #[test]
    fn test_cross_is_orthogonal() {
        let s = ScalarArray::scalar;
        let a = Cartesian3dVectorArray::new(s(1.0), s(2.0), s(3.0)).unwrap();
        let b = Cartesian3dVectorArray::new(s(-2.0), s(0.5), s(4.0)).unwrap();
        let c = a.cross(&b).unwrap();
        assert!(c.dot(&a).unwrap().item().unwrap().abs() < 1e-12);
        assert!(c.dot(&b).unwrap().item().unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_nd_rejects_duplicate_names() {
        let s = ScalarArray::scalar(1.0);
        let err = CartesianNdVectorArray::new(vec![("i".into(), s.clone()), ("i".into(), s)]);
        assert!(matches!(err, Err(NamedArrayError::DuplicateAxis(_))));
    }

    #[test]
    fn test_zip_components_checks_names() {
        let s = ScalarArray::scalar(1.0);
        let a = CartesianNdVectorArray::from_scalar(&["i", "j"], s.clone());
        let b = CartesianNdVectorArray::from_scalar(&["i", "k"], s);
        assert!(a.zip_components(&b, |x, y| x.checked_add(y)).is_err());
        assert_eq!(a.to_nd().unwrap().names(), vec!["i", "j"]);
    }

    #[test]
    fn test_copy_is_deep() {
        let v = Cartesian2dVectorArray::from_scalar(line(vec![1.0, 2.0]));
        let c = v.copy();
        assert!(!c.x().shares_data(v.x()));
        assert!(v.clone().x().shares_data(v.x()));
    }
}
