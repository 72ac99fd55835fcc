//! Dense matrix over `Real` with in-place multiplication, block editing and
//! tolerance-aware comparison.
//!
//! A `Matrix` carries a [`MatrixKind`] tag. Matrices tagged `Translate`, `Rotate` or
//! `Scale` are 4×4 homogeneous transforms whose `multiply`/`inverse` take closed-form
//! shortcuts instead of the general O(n³) paths; see [`kind`].

use crate::errors::TransformError;
use crate::float_types::{Real, float_accuracy};
use nalgebra::{DMatrix, Matrix4};
use std::fmt::Display;
use std::ops::{Index, IndexMut};

pub mod kind;
pub mod vector;

pub use kind::{MatrixKind, SkewAxis};
pub use vector::{Axis, ColVector3};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: DMatrix<Real>,
    kind: MatrixKind,
}

impl Matrix {
    /// Build a `rows × cols` matrix from row-major `data`.
    pub fn new(rows: usize, cols: usize, data: &[Real]) -> Result<Self, TransformError> {
        if data.len() != rows * cols {
            return Err(TransformError::DimensionMismatch {
                op: "Matrix::new",
                left: (rows, cols),
                right: (data.len(), 1),
            });
        }
        Ok(Matrix::from_dmatrix(DMatrix::from_row_slice(rows, cols, data)))
    }

    /// Build a matrix from nested row arrays.
    pub fn from_rows<const R: usize, const C: usize>(rows: [[Real; C]; R]) -> Self {
        Matrix::from_dmatrix(DMatrix::from_fn(R, C, |r, c| rows[r][c]))
    }

    pub fn identity(n: usize) -> Self {
        Matrix::from_dmatrix(DMatrix::identity(n, n))
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::from_dmatrix(DMatrix::zeros(rows, cols))
    }

    pub const fn from_dmatrix(data: DMatrix<Real>) -> Self {
        Matrix {
            data,
            kind: MatrixKind::General,
        }
    }

    pub(crate) const fn with_kind(data: DMatrix<Real>, kind: MatrixKind) -> Self {
        Matrix { data, kind }
    }

    pub fn from_matrix4(matrix: &Matrix4<Real>) -> Self {
        Matrix::from_dmatrix(DMatrix::from_column_slice(4, 4, matrix.as_slice()))
    }

    pub fn to_matrix4(&self) -> Result<Matrix4<Real>, TransformError> {
        if self.shape() != (4, 4) {
            return Err(TransformError::DimensionMismatch {
                op: "Matrix::to_matrix4",
                left: (4, 4),
                right: self.shape(),
            });
        }
        Ok(Matrix4::from_column_slice(self.data.as_slice()))
    }

    pub const fn as_dmatrix(&self) -> &DMatrix<Real> {
        &self.data
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    pub const fn kind(&self) -> MatrixKind {
        self.kind
    }

    /// Re-tag this matrix without inspecting its entries.
    ///
    /// A cheap up/down-cast: callers vouch that the data really has the shape `kind`
    /// promises (e.g. only the last column differs from identity for `Translate`).
    pub fn into_kind(mut self, kind: MatrixKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn transpose(&self) -> Matrix {
        let kind = match self.kind {
            MatrixKind::Scale => MatrixKind::Scale,
            _ => MatrixKind::General,
        };
        Matrix::with_kind(self.data.transpose(), kind)
    }

    /// Determinant, or `None` for a non-square matrix.
    pub fn determinant(&self) -> Option<Real> {
        self.is_square().then(|| self.data.determinant())
    }

    /// Right-multiply in place: `self = self · other`.
    pub fn multiply(&mut self, other: &Matrix) -> Result<&mut Self, TransformError> {
        if self.cols() != other.rows() {
            return Err(TransformError::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }
        *self = self.mul_unchecked(other);
        Ok(self)
    }

    /// Left-multiply in place: `self = other · self`.
    pub fn multiply_left(&mut self, other: &Matrix) -> Result<&mut Self, TransformError> {
        if other.cols() != self.rows() {
            return Err(TransformError::DimensionMismatch {
                op: "multiply_left",
                left: other.shape(),
                right: self.shape(),
            });
        }
        *self = other.mul_unchecked(self);
        Ok(self)
    }

    /// `self · other` as a new matrix.
    pub fn product(&self, other: &Matrix) -> Result<Matrix, TransformError> {
        let mut out = self.clone();
        out.multiply(other)?;
        Ok(out)
    }

    /// Product for operands whose shapes are already known to agree.
    pub(crate) fn mul_unchecked(&self, other: &Matrix) -> Matrix {
        kind::multiply_special(self, other)
            .unwrap_or_else(|| Matrix::from_dmatrix(&self.data * &other.data))
    }

    /// Inverse, or `None` when the matrix is non-square or singular
    /// (`|det| <` [`float_accuracy`]).
    pub fn inverse(&self) -> Option<Matrix> {
        if !self.is_square() {
            return None;
        }
        let is_homogeneous = self.shape() == (4, 4);
        match self.kind {
            MatrixKind::Translate if is_homogeneous => Some(kind::translate_inverse(self)),
            MatrixKind::Scale if is_homogeneous => kind::scale_inverse(self),
            MatrixKind::Rotate if is_homogeneous => kind::rotate_inverse(self),
            _ => self.general_inverse(),
        }
    }

    pub(crate) fn general_inverse(&self) -> Option<Matrix> {
        if self.data.determinant().abs() < float_accuracy() {
            return None;
        }
        self.data.clone().try_inverse().map(Matrix::from_dmatrix)
    }

    fn check_block(
        &self,
        op: &'static str,
        shape: (usize, usize),
        offset: (usize, usize),
    ) -> Result<(), TransformError> {
        if offset.0 + shape.0 > self.rows() || offset.1 + shape.1 > self.cols() {
            return Err(TransformError::DimensionMismatch {
                op,
                left: self.shape(),
                right: (offset.0 + shape.0, offset.1 + shape.1),
            });
        }
        Ok(())
    }

    /// Copy of the `shape` block starting at `offset` (row, col).
    pub fn sub_matrix(
        &self,
        shape: (usize, usize),
        offset: (usize, usize),
    ) -> Result<Matrix, TransformError> {
        self.check_block("sub_matrix", shape, offset)?;
        Ok(Matrix::from_dmatrix(self.data.view(offset, shape).into_owned()))
    }

    /// Overwrite the block at `offset` with `sub`. The result is tagged `General`.
    pub fn set_sub_matrix(
        &mut self,
        sub: &Matrix,
        offset: (usize, usize),
    ) -> Result<(), TransformError> {
        self.check_block("set_sub_matrix", sub.shape(), offset)?;
        self.data.view_mut(offset, sub.shape()).copy_from(&sub.data);
        self.kind = MatrixKind::General;
        Ok(())
    }

    /// Replace the square block at `offset` with `other · block`, without touching the
    /// rest of the matrix. The kind tag is kept.
    pub fn multiply_left_sub_matrix(
        &mut self,
        other: &Matrix,
        offset: (usize, usize),
    ) -> Result<(), TransformError> {
        if !other.is_square() {
            return Err(TransformError::DimensionMismatch {
                op: "multiply_left_sub_matrix",
                left: other.shape(),
                right: other.shape(),
            });
        }
        let shape = other.shape();
        self.check_block("multiply_left_sub_matrix", shape, offset)?;
        let product = &other.data * self.data.view(offset, shape);
        self.data.view_mut(offset, shape).copy_from(&product);
        Ok(())
    }

    /// Replace the square block at `offset` with `block · other`. The kind tag is kept.
    pub fn multiply_sub_matrix(
        &mut self,
        other: &Matrix,
        offset: (usize, usize),
    ) -> Result<(), TransformError> {
        if !other.is_square() {
            return Err(TransformError::DimensionMismatch {
                op: "multiply_sub_matrix",
                left: other.shape(),
                right: other.shape(),
            });
        }
        let shape = other.shape();
        self.check_block("multiply_sub_matrix", shape, offset)?;
        let product = self.data.view(offset, shape) * &other.data;
        self.data.view_mut(offset, shape).copy_from(&product);
        Ok(())
    }

    fn take_data(&mut self) -> DMatrix<Real> {
        self.kind = MatrixKind::General;
        std::mem::replace(&mut self.data, DMatrix::zeros(0, 0))
    }

    pub fn delete_row(&mut self, row: usize) -> Result<(), TransformError> {
        if row >= self.rows() {
            return Err(TransformError::DimensionMismatch {
                op: "delete_row",
                left: self.shape(),
                right: (row + 1, self.cols()),
            });
        }
        self.data = self.take_data().remove_row(row);
        Ok(())
    }

    pub fn delete_col(&mut self, col: usize) -> Result<(), TransformError> {
        if col >= self.cols() {
            return Err(TransformError::DimensionMismatch {
                op: "delete_col",
                left: self.shape(),
                right: (self.rows(), col + 1),
            });
        }
        self.data = self.take_data().remove_column(col);
        Ok(())
    }

    /// Insert the rows of `rows` before row index `at` (`at == self.rows()` appends).
    pub fn insert_rows(&mut self, at: usize, rows: &Matrix) -> Result<(), TransformError> {
        if at > self.rows() || rows.cols() != self.cols() {
            return Err(TransformError::DimensionMismatch {
                op: "insert_rows",
                left: self.shape(),
                right: rows.shape(),
            });
        }
        let count = rows.rows();
        let cols = self.cols();
        self.data = self.take_data().insert_rows(at, count, 0.0);
        self.data.view_mut((at, 0), (count, cols)).copy_from(&rows.data);
        Ok(())
    }

    /// Insert the columns of `cols` before column index `at` (`at == self.cols()` appends).
    pub fn insert_cols(&mut self, at: usize, cols: &Matrix) -> Result<(), TransformError> {
        if at > self.cols() || cols.rows() != self.rows() {
            return Err(TransformError::DimensionMismatch {
                op: "insert_cols",
                left: self.shape(),
                right: cols.shape(),
            });
        }
        let count = cols.cols();
        let rows = self.rows();
        self.data = self.take_data().insert_columns(at, count, 0.0);
        self.data.view_mut((0, at), (rows, count)).copy_from(&cols.data);
        Ok(())
    }

    /// Copy resized to `rows × cols`: growing pads with identity rows/columns,
    /// shrinking truncates. Moves between the 3×3 linear part and the 4×4
    /// homogeneous form.
    pub fn resize(&self, rows: usize, cols: usize) -> Matrix {
        let (old_rows, old_cols) = self.shape();
        let mut data = self.data.clone().resize(rows, cols, 0.0);
        for i in 0..rows.min(cols) {
            if i >= old_rows || i >= old_cols {
                data[(i, i)] = 1.0;
            }
        }
        Matrix::from_dmatrix(data)
    }

    /// Element-wise comparison within [`float_accuracy`].
    pub fn approx_eq(&self, other: &Matrix) -> bool {
        self.shape() == other.shape() && (&self.data - &other.data).amax() < float_accuracy()
    }

    pub fn is_identity(&self) -> bool {
        self.is_square() && self.approx_eq(&Matrix::identity(self.rows()))
    }

    /// Rows 0..3 of column `col`, e.g. a transformed basis axis of a homogeneous matrix.
    pub fn column3(&self, col: usize) -> ColVector3 {
        ColVector3::new(self.data[(0, col)], self.data[(1, col)], self.data[(2, col)])
    }

    pub(crate) fn set_column3(&mut self, col: usize, value: &ColVector3) {
        self.data[(0, col)] = value.x();
        self.data[(1, col)] = value.y();
        self.data[(2, col)] = value.z();
    }

    /// Apply a homogeneous (≥3×4) matrix to a point; the projective row is ignored.
    pub(crate) fn transform_point(&self, point: &ColVector3) -> ColVector3 {
        self.transform_vector(point) + self.column3(3)
    }

    /// Apply the linear 3×3 part only.
    pub(crate) fn transform_vector(&self, vector: &ColVector3) -> ColVector3 {
        self.column3(0) * vector.x() + self.column3(1) * vector.y() + self.column3(2) * vector.z()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Real;

    fn index(&self, index: (usize, usize)) -> &Real {
        &self.data[index]
    }
}

/// Direct element writes keep the kind tag: the caller vouches for the structure.
impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Real {
        &mut self.data[index]
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for r in 0..self.rows() {
            write!(f, "[")?;
            for c in 0..self.cols() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.data[(r, c)])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

impl approx::AbsDiffEq for Matrix {
    type Epsilon = Real;

    fn default_epsilon() -> Self::Epsilon {
        float_accuracy()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.shape() == other.shape()
            && approx::AbsDiffEq::abs_diff_eq(&self.data, &other.data, epsilon)
    }
}

impl approx::RelativeEq for Matrix {
    fn default_max_relative() -> Self::Epsilon {
        <DMatrix<Real> as approx::RelativeEq>::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.shape() == other.shape()
            && approx::RelativeEq::relative_eq(&self.data, &other.data, epsilon, max_relative)
    }
}
