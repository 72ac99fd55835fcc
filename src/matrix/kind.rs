//! Specialised 4×4 sub-matrices: translate, rotate and scale.
//!
//! Rather than separate types, a [`Matrix`] carries a [`MatrixKind`] tag and
//! `multiply`/`inverse` dispatch on it:
//!
//! | kind        | multiply (same kind)        | inverse                                   |
//! |-------------|-----------------------------|-------------------------------------------|
//! | `Translate` | add translation columns     | negate translation column                 |
//! | `Scale`     | multiply diagonals          | reciprocal diagonal, `None` if any is ~0  |
//! | `Rotate`    | 3×3 block product           | 2×2 cofactor when planar, else general    |
//!
//! Mixed-kind products fall back to the general dense product and are tagged `General`.
//!
//! ## Rotation convention
//! Every rotation builder here follows the right-hand rule about its axis. About +Z this
//! turns +X towards +Y, so `(10, 0)` rotated by π/2 lands on `(0, 10)`: counter-clockwise
//! with y up, clockwise on a y-down screen.

use crate::errors::TransformError;
use crate::float_types::{Real, approx_zero};
use crate::matrix::{Axis, ColVector3, Matrix};
use nalgebra::DMatrix;

/// Which closed-form algebra a [`Matrix`] may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatrixKind {
    #[default]
    General,
    /// Identity except rows 0..3 of the last column.
    Translate,
    /// Upper-left 3×3 is a proper rotation, translation column is zero.
    Rotate,
    /// Diagonal.
    Scale,
}

/// Planar shear direction, as in CSS `skewX()` / `skewY()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkewAxis {
    /// `x' = x + tan(θ)·y`: the Y axis leans towards X.
    X,
    /// `y' = y + tan(θ)·x`: the X axis leans towards Y.
    Y,
}

impl Matrix {
    pub fn translation(x: Real, y: Real, z: Real) -> Matrix {
        let mut data = DMatrix::identity(4, 4);
        data[(0, 3)] = x;
        data[(1, 3)] = y;
        data[(2, 3)] = z;
        Matrix::with_kind(data, MatrixKind::Translate)
    }

    pub fn translation_vector(offset: &ColVector3) -> Matrix {
        Matrix::translation(offset.x(), offset.y(), offset.z())
    }

    pub fn scaling(x: Real, y: Real, z: Real) -> Matrix {
        let mut data = DMatrix::identity(4, 4);
        data[(0, 0)] = x;
        data[(1, 1)] = y;
        data[(2, 2)] = z;
        Matrix::with_kind(data, MatrixKind::Scale)
    }

    pub fn scaling_vector(factors: &ColVector3) -> Matrix {
        Matrix::scaling(factors.x(), factors.y(), factors.z())
    }

    /// Reflection across the plane orthogonal to `axis` through the origin.
    pub fn mirror(axis: Axis) -> Matrix {
        let mut factors = ColVector3::new(1.0, 1.0, 1.0);
        match axis {
            Axis::X => factors.set_x(-1.0),
            Axis::Y => factors.set_y(-1.0),
            Axis::Z => factors.set_z(-1.0),
        }
        Matrix::scaling_vector(&factors)
    }

    fn rotation_from_3x3(r: [[Real; 3]; 3]) -> Matrix {
        let mut data = DMatrix::identity(4, 4);
        for (i, row) in r.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                data[(i, j)] = *value;
            }
        }
        Matrix::with_kind(data, MatrixKind::Rotate)
    }

    pub fn rotation_x(angle: Real) -> Matrix {
        let (s, c) = angle.sin_cos();
        Matrix::rotation_from_3x3([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    pub fn rotation_y(angle: Real) -> Matrix {
        let (s, c) = angle.sin_cos();
        Matrix::rotation_from_3x3([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    pub fn rotation_z(angle: Real) -> Matrix {
        let (s, c) = angle.sin_cos();
        Matrix::rotation_from_3x3([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Rotation about an arbitrary axis (Rodrigues' formula).
    ///
    /// With unit axis `(x, y, z)`, `c = cos θ`, `s = sin θ`, `t = 1 − c`:
    /// ```text
    /// [ 1+t(x²−1)   xyt−zs      xzt+ys    ]
    /// [ xyt+zs      1+t(y²−1)   yzt−xs    ]
    /// [ xzt−ys      yzt+xs      1+t(z²−1) ]
    /// ```
    /// The axis need not be unit length, but must not be zero.
    pub fn rotation_axis_angle(axis: &ColVector3, angle: Real) -> Result<Matrix, TransformError> {
        let axis = axis.normalize()?;
        let (x, y, z) = (axis.x(), axis.y(), axis.z());
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Ok(Matrix::rotation_from_3x3([
            [1.0 + t * (x * x - 1.0), x * y * t - z * s, x * z * t + y * s],
            [x * y * t + z * s, 1.0 + t * (y * y - 1.0), y * z * t - x * s],
            [x * z * t - y * s, y * z * t + x * s, 1.0 + t * (z * z - 1.0)],
        ]))
    }

    /// Rotation from Euler angles applied in ZXY order: `Rz(e.z) · Rx(e.x) · Ry(e.y)`.
    pub fn rotation_euler(euler: &ColVector3) -> Matrix {
        let mut out = Matrix::rotation_z(euler.z());
        out.multiply_sub_matrix_3x3(&Matrix::rotation_x(euler.x()));
        out.multiply_sub_matrix_3x3(&Matrix::rotation_y(euler.y()));
        out
    }

    /// Planar shear by `angle` (radians).
    pub fn shear(axis: SkewAxis, angle: Real) -> Matrix {
        let mut data = DMatrix::identity(4, 4);
        match axis {
            SkewAxis::X => data[(0, 1)] = angle.tan(),
            SkewAxis::Y => data[(1, 0)] = angle.tan(),
        }
        Matrix::from_dmatrix(data)
    }

    /// Rows 0..3 of the last column.
    pub fn translation_part(&self) -> ColVector3 {
        self.column3(3)
    }

    /// `true` when the rotation has no tilt out of the XY plane
    /// (`m02`, `m12`, `m20`, `m21` all ~0).
    pub fn is_planar_rotation(&self) -> bool {
        approx_zero(self[(0, 2)])
            && approx_zero(self[(1, 2)])
            && approx_zero(self[(2, 0)])
            && approx_zero(self[(2, 1)])
    }

    fn multiply_sub_matrix_3x3(&mut self, other: &Matrix) {
        let product = self.data_3x3() * other.data_3x3();
        for i in 0..3 {
            for j in 0..3 {
                self[(i, j)] = product[(i, j)];
            }
        }
    }

    fn data_3x3(&self) -> nalgebra::Matrix3<Real> {
        nalgebra::Matrix3::from_fn(|i, j| self[(i, j)])
    }
}

/// Closed-form product when both operands are 4×4 and share a specialised kind.
pub(crate) fn multiply_special(a: &Matrix, b: &Matrix) -> Option<Matrix> {
    if a.kind() != b.kind() || a.shape() != (4, 4) || b.shape() != (4, 4) {
        return None;
    }
    match a.kind() {
        MatrixKind::Translate => {
            Some(Matrix::translation_vector(&(a.translation_part() + b.translation_part())))
        },
        MatrixKind::Scale => Some(Matrix::scaling(
            a[(0, 0)] * b[(0, 0)],
            a[(1, 1)] * b[(1, 1)],
            a[(2, 2)] * b[(2, 2)],
        )),
        MatrixKind::Rotate => {
            let mut out = a.clone();
            out.multiply_sub_matrix_3x3(b);
            Some(out)
        },
        MatrixKind::General => None,
    }
}

pub(crate) fn translate_inverse(m: &Matrix) -> Matrix {
    Matrix::translation_vector(&-m.translation_part())
}

pub(crate) fn scale_inverse(m: &Matrix) -> Option<Matrix> {
    let (x, y, z) = (m[(0, 0)], m[(1, 1)], m[(2, 2)]);
    if approx_zero(x) || approx_zero(y) || approx_zero(z) {
        return None;
    }
    Some(Matrix::scaling(1.0 / x, 1.0 / y, 1.0 / z))
}

pub(crate) fn rotate_inverse(m: &Matrix) -> Option<Matrix> {
    if !m.is_planar_rotation() {
        return m
            .general_inverse()
            .map(|inv| inv.into_kind(MatrixKind::Rotate));
    }
    let (a, b, c, d) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
    let det = a * d - b * c;
    let zz = m[(2, 2)];
    if approx_zero(det) || approx_zero(zz) {
        return None;
    }
    let mut out = Matrix::rotation_from_3x3([
        [d / det, -b / det, 0.0],
        [-c / det, a / det, 0.0],
        [0.0, 0.0, 1.0 / zz],
    ]);
    // a pure rotation has no translation, but keep the affine inverse exact if one slipped in
    let t = out.transform_vector(&m.translation_part());
    out.set_column3(3, &-t);
    Some(out)
}
