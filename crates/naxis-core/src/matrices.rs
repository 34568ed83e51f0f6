//! Cartesian matrix arrays
//!
//! A matrix array is a set of named rows, each row a Cartesian vector array.
//! Arithmetic is component-wise like for vectors. `determinant` and `inverse`
//! are evaluated independently at every element of the broadcast shape and
//! require a square matrix (row count equal to the component count of each
//! row). Both return plain numbers; units of the entries are not propagated.

use crate::array::{Array, ArrayKind, NamedArray};
use crate::error::{NamedArrayError, Result};
use crate::scalar::ScalarArray;
use crate::shape::{broadcast_shapes, HasShape, NamedShape};
use crate::types::DType;
use crate::units::Unit;
use crate::vectors::{
    Cartesian2dVectorArray, Cartesian3dVectorArray, CartesianNdVectorArray, CartesianVector,
};
use scirs2_core::ndarray_ext::{Array1, Array2};

/// Solve `a x = b` for one dense system.
pub(crate) fn solve_dense(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    Ok(scirs2_linalg::solve(&a.view(), &b.view(), None)?)
}

/// Entries of a matrix broadcast to a common shape, row-major.
struct Entries {
    shape: NamedShape,
    rows: Vec<Vec<Vec<f64>>>,
}

impl Entries {
    fn gather(entries: Vec<Vec<&ScalarArray<f64>>>, shape: &NamedShape) -> Result<Self> {
        let rows = entries
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|e| -> Result<Vec<f64>> { Ok(e.broadcast_data(shape)?.iter().cloned().collect()) })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            shape: shape.clone(),
            rows,
        })
    }

    /// Dense `n x n` matrix at one flat element of the shape.
    fn at(&self, flat: usize) -> Array2<f64> {
        let n = self.rows.len();
        Array2::from_shape_fn((n, n), |(r, c)| self.rows[r][c][flat])
    }

    fn wrap(&self, values: Vec<f64>) -> Result<ScalarArray<f64>> {
        ScalarArray::from_vec(values, &self.shape)
    }

    fn determinant(&self) -> Result<ScalarArray<f64>> {
        let values = (0..self.shape.size())
            .map(|i| Ok(scirs2_linalg::det(&self.at(i).view(), None)?))
            .collect::<Result<Vec<f64>>>()?;
        self.wrap(values)
    }

    /// Inverse entries, `result[i][j]` indexed like the transposed name roles.
    fn inverse(&self) -> Result<Vec<Vec<ScalarArray<f64>>>> {
        let n = self.rows.len();
        let size = self.shape.size();
        let mut out: Vec<Vec<Vec<f64>>> = vec![vec![Vec::with_capacity(size); n]; n];
        for i in 0..size {
            let inv = scirs2_linalg::inv(&self.at(i).view(), None)?;
            for ((r, c), v) in inv.indexed_iter() {
                out[r][c].push(*v);
            }
        }
        out.into_iter()
            .map(|row| row.into_iter().map(|v| self.wrap(v)).collect())
            .collect()
    }
}

/// Operations shared by every Cartesian matrix kind.
pub trait CartesianMatrix: NamedArray + Sized {
    /// Row vector type.
    type Row: CartesianVector;

    /// `(name, row)` pairs in their fixed order.
    fn rows(&self) -> Vec<(&str, &Self::Row)>;

    /// Rebuild a matrix of the same kind from new rows.
    fn with_rows(&self, rows: Vec<Self::Row>) -> Result<Self>;

    /// Vector whose components are named like the rows of this matrix.
    fn column_vector(&self, components: Vec<ScalarArray<f64>>) -> Result<Self::Row>;

    /// Matrix from inverse entries, rows named after the original components.
    fn from_inverse_entries(&self, entries: Vec<Vec<ScalarArray<f64>>>) -> Result<Self>;

    /// Whether the row count equals the component count of every row.
    fn is_square(&self) -> bool {
        let rows = self.rows();
        rows.iter().all(|(_, r)| r.components().len() == rows.len())
    }

    /// Entry at `(row, component)`.
    fn entry(&self, row: &str, component: &str) -> Option<&ScalarArray<f64>> {
        self.rows()
            .into_iter()
            .find(|(n, _)| *n == row)
            .and_then(|(_, r)| r.component(component))
    }

    /// Determinant at every element of the matrix shape.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::Dimension`] for non-square matrices.
    fn determinant(&self) -> Result<ScalarArray<f64>> {
        square_entries(self, "determinant")?.determinant()
    }

    /// Inverse at every element of the matrix shape.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::Dimension`] for non-square matrices, and
    /// [`NamedArrayError::Linalg`] if any element is singular.
    fn inverse(&self) -> Result<Self> {
        let entries = square_entries(self, "inverse")?.inverse()?;
        self.from_inverse_entries(entries)
    }

    /// Matrix-vector product: one dot product per row.
    fn matmul_vector(&self, vector: &Self::Row) -> Result<Self::Row> {
        let dots = self
            .rows()
            .into_iter()
            .map(|(_, row)| row.dot(vector))
            .collect::<Result<Vec<_>>>()?;
        self.column_vector(dots)
    }
}

/// Entries of a square matrix broadcast to the matrix shape.
fn square_entries<M: CartesianMatrix>(matrix: &M, op: &str) -> Result<Entries> {
    let rows = matrix.rows();
    if !matrix.is_square() {
        return Err(NamedArrayError::Dimension(format!(
            "{} requires a square matrix, got {} rows of {:?} components",
            op,
            rows.len(),
            rows.iter().map(|(_, r)| r.components().len()).collect::<Vec<_>>()
        )));
    }
    let entries: Vec<Vec<&ScalarArray<f64>>> = rows
        .iter()
        .map(|(_, r)| r.components().into_iter().map(|(_, c)| c).collect())
        .collect();
    Entries::gather(entries, &matrix.shape())
}

fn rows_shape<V: HasShape>(rows: &[&V]) -> Result<NamedShape> {
    let shapes: Vec<NamedShape> = rows.iter().map(|r| r.shape()).collect();
    let refs: Vec<&NamedShape> = shapes.iter().collect();
    broadcast_shapes(&refs)
}

fn take<const N: usize, T>(items: Vec<T>, what: &str) -> Result<[T; N]> {
    <[T; N]>::try_from(items).map_err(|v| {
        NamedArrayError::Dimension(format!("{} needs {} entries, got {}", what, N, v.len()))
    })
}

/// 2x2 matrix array with rows `x` and `y`.
#[derive(Clone, Debug)]
pub struct Cartesian2dMatrixArray {
    x: Cartesian2dVectorArray,
    y: Cartesian2dVectorArray,
    shape: NamedShape,
}

impl Cartesian2dMatrixArray {
    /// Build a matrix from its rows.
    pub fn new(x: Cartesian2dVectorArray, y: Cartesian2dVectorArray) -> Result<Self> {
        let shape = rows_shape(&[&x, &y])?;
        Ok(Self { x, y, shape })
    }

    /// Identity matrix.
    pub fn identity() -> Self {
        Self {
            x: Cartesian2dVectorArray::constant(1.0, 0.0),
            y: Cartesian2dVectorArray::constant(0.0, 1.0),
            shape: NamedShape::new(),
        }
    }

    /// Matrix whose entries all equal `value`.
    pub fn from_scalar(value: ScalarArray<f64>) -> Self {
        let row = Cartesian2dVectorArray::from_scalar(value);
        Self {
            shape: row.shape(),
            x: row.clone(),
            y: row,
        }
    }

    pub fn x(&self) -> &Cartesian2dVectorArray {
        &self.x
    }

    pub fn y(&self) -> &Cartesian2dVectorArray {
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

impl HasShape for Cartesian2dMatrixArray {
    fn shape(&self) -> NamedShape {
        self.shape.clone()
    }
}

impl NamedArray for Cartesian2dMatrixArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Matrix2d
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        self.x.unit()
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::Matrix2d(self.clone()))
    }
}

impl CartesianMatrix for Cartesian2dMatrixArray {
    type Row = Cartesian2dVectorArray;

    fn rows(&self) -> Vec<(&str, &Self::Row)> {
        vec![("x", &self.x), ("y", &self.y)]
    }

    fn with_rows(&self, rows: Vec<Self::Row>) -> Result<Self> {
        let [x, y] = take(rows, "2D matrix")?;
        Self::new(x, y)
    }

    fn column_vector(&self, components: Vec<ScalarArray<f64>>) -> Result<Self::Row> {
        let [x, y] = take(components, "2D vector")?;
        Cartesian2dVectorArray::new(x, y)
    }

    fn from_inverse_entries(&self, entries: Vec<Vec<ScalarArray<f64>>>) -> Result<Self> {
        let rows = entries
            .into_iter()
            .map(|row| self.column_vector(row))
            .collect::<Result<Vec<_>>>()?;
        self.with_rows(rows)
    }
}

/// 3x3 matrix array with rows `x`, `y` and `z`.
#[derive(Clone, Debug)]
pub struct Cartesian3dMatrixArray {
    x: Cartesian3dVectorArray,
    y: Cartesian3dVectorArray,
    z: Cartesian3dVectorArray,
    shape: NamedShape,
}

impl Cartesian3dMatrixArray {
    /// Build a matrix from its rows.
    pub fn new(
        x: Cartesian3dVectorArray,
        y: Cartesian3dVectorArray,
        z: Cartesian3dVectorArray,
    ) -> Result<Self> {
        let shape = rows_shape(&[&x, &y, &z])?;
        Ok(Self { x, y, z, shape })
    }

    /// Matrix whose entries all equal `value`.
    pub fn from_scalar(value: ScalarArray<f64>) -> Self {
        let row = Cartesian3dVectorArray::from_scalar(value);
        Self {
            shape: row.shape(),
            x: row.clone(),
            y: row.clone(),
            z: row,
        }
    }

    /// Rotation by `angle` radians about the `z` axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use naxis_core::{Cartesian3dMatrixArray, CartesianMatrix, ScalarArray};
    ///
    /// let r = Cartesian3dMatrixArray::rotation_z(&ScalarArray::scalar(0.3)).unwrap();
    /// let det = r.determinant().unwrap().item().unwrap();
    /// assert!((det - 1.0).abs() < 1e-12);
    /// ```
    pub fn rotation_z(angle: &ScalarArray<f64>) -> Result<Self> {
        let (cos, sin) = (angle.cos()?, angle.sin()?);
        let zero = ScalarArray::scalar(0.0);
        let one = ScalarArray::scalar(1.0);
        Self::new(
            Cartesian3dVectorArray::new(cos.clone(), sin.neg(), zero.clone())?,
            Cartesian3dVectorArray::new(sin, cos, zero.clone())?,
            Cartesian3dVectorArray::new(zero.clone(), zero, one)?,
        )
    }

    pub fn x(&self) -> &Cartesian3dVectorArray {
        &self.x
    }

    pub fn y(&self) -> &Cartesian3dVectorArray {
        &self.y
    }

    pub fn z(&self) -> &Cartesian3dVectorArray {
        &self.z
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
}

impl HasShape for Cartesian3dMatrixArray {
    fn shape(&self) -> NamedShape {
        self.shape.clone()
    }
}

impl NamedArray for Cartesian3dMatrixArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Matrix3d
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        self.x.unit()
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::Matrix3d(self.clone()))
    }
}

impl CartesianMatrix for Cartesian3dMatrixArray {
    type Row = Cartesian3dVectorArray;

    fn rows(&self) -> Vec<(&str, &Self::Row)> {
        vec![("x", &self.x), ("y", &self.y), ("z", &self.z)]
    }

    fn with_rows(&self, rows: Vec<Self::Row>) -> Result<Self> {
        let [x, y, z] = take(rows, "3D matrix")?;
        Self::new(x, y, z)
    }

    fn column_vector(&self, components: Vec<ScalarArray<f64>>) -> Result<Self::Row> {
        let [x, y, z] = take(components, "3D vector")?;
        Cartesian3dVectorArray::new(x, y, z)
    }

    fn from_inverse_entries(&self, entries: Vec<Vec<ScalarArray<f64>>>) -> Result<Self> {
        let rows = entries
            .into_iter()
            .map(|row| self.column_vector(row))
            .collect::<Result<Vec<_>>>()?;
        self.with_rows(rows)
    }
}

/// Matrix array with arbitrary named rows of N-dimensional vectors.
///
/// Every row must have the same component names. The matrix need not be
/// square; `determinant` and `inverse` fail with a dimension error if it
/// is not.
///
/// # Examples
///
/// ```
/// use naxis_core::{CartesianMatrix, CartesianNdMatrixArray, CartesianNdVectorArray, NamedArrayError, ScalarArray};
///
/// let row = CartesianNdVectorArray::from_scalar(&["a", "b", "c"], ScalarArray::scalar(1.0));
/// let m = CartesianNdMatrixArray::new(vec![("r".into(), row.clone()), ("s".into(), row)]).unwrap();
/// assert!(!m.is_square());
/// assert!(matches!(m.determinant(), Err(NamedArrayError::Dimension(_))));
/// ```
#[derive(Clone, Debug)]
pub struct CartesianNdMatrixArray {
    rows: Vec<(String, CartesianNdVectorArray)>,
    shape: NamedShape,
}

impl CartesianNdMatrixArray {
    /// Build a matrix from `(name, row)` pairs.
    pub fn new(rows: Vec<(String, CartesianNdVectorArray)>) -> Result<Self> {
        if let Some((_, first)) = rows.first() {
            let names = first.names();
            if let Some((name, _)) = rows.iter().find(|(_, r)| r.names() != names) {
                return Err(NamedArrayError::IncompatibleKinds {
                    from: format!("row '{}'", name),
                    to: format!("row with components {:?}", names),
                });
            }
        }
        for (i, (name, _)) in rows.iter().enumerate() {
            if rows[..i].iter().any(|(n, _)| n == name) {
                return Err(NamedArrayError::DuplicateAxis(name.clone()));
            }
        }
        let refs: Vec<&CartesianNdVectorArray> = rows.iter().map(|(_, r)| r).collect();
        let shape = rows_shape(&refs)?;
        Ok(Self { rows, shape })
    }

    /// Matrix with the given row and component names, every entry `value`.
    pub fn from_scalar<S: AsRef<str>>(rows: &[S], components: &[S], value: ScalarArray<f64>) -> Self {
        let row = CartesianNdVectorArray::from_scalar(components, value);
        Self {
            shape: row.shape(),
            rows: rows
                .iter()
                .map(|n| (n.as_ref().to_string(), row.clone()))
                .collect(),
        }
    }

    /// Row names in order.
    pub fn row_names(&self) -> Vec<String> {
        self.rows.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Component names shared by every row.
    pub fn component_names(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|(_, r)| r.names())
            .unwrap_or_default()
    }
    /// Fully independent copy.
    pub fn copy(&self) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|(n, r)| (n.clone(), r.copy()))
                .collect(),
            shape: self.shape.clone(),
        }
    }
}

impl HasShape for CartesianNdMatrixArray {
    fn shape(&self) -> NamedShape {
        self.shape.clone()
    }
}

impl NamedArray for CartesianNdMatrixArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::MatrixNd
    }

    fn dtype(&self) -> DType {
        DType::F64
    }

    fn unit(&self) -> Option<Unit> {
        self.rows.first().and_then(|(_, r)| r.unit())
    }

    fn to_array(&self) -> Result<Array> {
        Ok(Array::MatrixNd(self.clone()))
    }
}

impl CartesianMatrix for CartesianNdMatrixArray {
    type Row = CartesianNdVectorArray;

    fn rows(&self) -> Vec<(&str, &Self::Row)> {
        self.rows.iter().map(|(n, r)| (n.as_str(), r)).collect()
    }

    fn with_rows(&self, rows: Vec<Self::Row>) -> Result<Self> {
        if rows.len() != self.rows.len() {
            return Err(NamedArrayError::Dimension(format!(
                "matrix with rows {:?} cannot take {} rows",
                self.row_names(),
                rows.len()
            )));
        }
        Self::new(self.row_names().into_iter().zip(rows).collect())
    }

    fn column_vector(&self, components: Vec<ScalarArray<f64>>) -> Result<Self::Row> {
        if components.len() != self.rows.len() {
            return Err(NamedArrayError::Dimension(format!(
                "{} rows but {} components",
                self.rows.len(),
                components.len()
            )));
        }
        CartesianNdVectorArray::new(self.row_names().into_iter().zip(components).collect())
    }

    fn from_inverse_entries(&self, entries: Vec<Vec<ScalarArray<f64>>>) -> Result<Self> {
        // Inverse rows are indexed by the original components and vice versa.
        let row_names = self.row_names();
        let rows = self
            .component_names()
            .into_iter()
            .zip(entries)
            .map(|(name, row)| {
                let vector = CartesianNdVectorArray::new(row_names.iter().cloned().zip(row).collect())?;
                Ok((name, vector))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: f64) -> ScalarArray<f64> {
        ScalarArray::scalar(v)
    }

    fn m2(a: f64, b: f64, c: f64, d: f64) -> Cartesian2dMatrixArray {
        Cartesian2dMatrixArray::new(
            Cartesian2dVectorArray::new(s(a), s(b)).unwrap(),
            Cartesian2dVectorArray::new(s(c), s(d)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_determinant_signs_and_singular() {
        let det = |m: Cartesian2dMatrixArray| m.determinant().unwrap().item().unwrap();
        assert!((det(m2(1.0, 2.0, 3.0, 4.0)) + 2.0).abs() < 1e-12);
        assert!((det(m2(0.0, 1.0, 1.0, 0.0)) + 1.0).abs() < 1e-12);
        assert!(det(m2(1.0, 2.0, 2.0, 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_solve_dense() {
        let a = Array2::from_shape_vec((2, 2), vec![3.0, 1.0, 1.0, 2.0]).unwrap();
        let b = Array1::from_vec(vec![9.0, 8.0]);
        let x = solve_dense(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_2d_determinant_and_inverse() {
        let m = m2(4.0, 7.0, 2.0, 6.0);
        assert!((m.determinant().unwrap().item().unwrap() - 10.0).abs() < 1e-12);
        let inv = m.inverse().unwrap();
        assert!((inv.x().x().item().unwrap() - 0.6).abs() < 1e-12);
        assert!((inv.x().y().item().unwrap() + 0.7).abs() < 1e-12);
        assert!((inv.y().x().item().unwrap() + 0.2).abs() < 1e-12);
        assert!((inv.y().y().item().unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_singular_inverse_fails() {
        assert!(matches!(
            m2(1.0, 2.0, 2.0, 4.0).inverse(),
            Err(NamedArrayError::Linalg(_))
        ));
    }

    #[test]
    fn test_identity_matmul() {
        let v = Cartesian2dVectorArray::new(s(3.0), s(-1.0)).unwrap();
        let w = Cartesian2dMatrixArray::identity().matmul_vector(&v).unwrap();
        assert_eq!(w.x().item().unwrap(), 3.0);
        assert_eq!(w.y().item().unwrap(), -1.0);
    }

    #[test]
    fn test_determinant_per_element() {
        let shape = NamedShape::from_pairs([("t", 2)]).unwrap();
        let diag = ScalarArray::from_vec(vec![2.0, 3.0], &shape).unwrap();
        let m = Cartesian2dMatrixArray::new(
            Cartesian2dVectorArray::new(diag.clone(), s(0.0)).unwrap(),
            Cartesian2dVectorArray::new(s(0.0), diag).unwrap(),
        )
        .unwrap();
        let det: Vec<f64> = m.determinant().unwrap().ndarray().iter().cloned().collect();
        assert!((det[0] - 4.0).abs() < 1e-12);
        assert!((det[1] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_nd_inverse_swaps_name_roles() {
        let row_a = CartesianNdVectorArray::new(vec![("i".into(), s(2.0)), ("j".into(), s(0.0))]).unwrap();
        let row_b = CartesianNdVectorArray::new(vec![("i".into(), s(0.0)), ("j".into(), s(4.0))]).unwrap();
        let m = CartesianNdMatrixArray::new(vec![("a".into(), row_a), ("b".into(), row_b)]).unwrap();
        let inv = m.inverse().unwrap();
        assert_eq!(inv.row_names(), vec!["i", "j"]);
        assert_eq!(inv.component_names(), vec!["a", "b"]);
        assert!((inv.entry("j", "b").unwrap().item().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_nd_rejects_mismatched_rows() {
        let a = CartesianNdVectorArray::from_scalar(&["i"], s(1.0));
        let b = CartesianNdVectorArray::from_scalar(&["j"], s(1.0));
        assert!(CartesianNdMatrixArray::new(vec![("a".into(), a), ("b".into(), b)]).is_err());
    }
}
