//! Splitting a composite matrix into `translate · rotate · skew · scale`, and reading
//! Euler angles and skew axis-angles back out of the factors.

use super::SubMatrices;
use crate::errors::TransformError;
use crate::float_types::{FRAC_PI_2, Real, float_accuracy};
use crate::matrix::{Axis, ColVector3, Matrix, MatrixKind};

/// A rotation of `angle` radians about a unit `axis`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub axis: ColVector3,
    pub angle: Real,
}

impl AxisAngle {
    /// A zero rotation, reported about `axis`.
    pub fn zero(axis: Axis) -> Self {
        AxisAngle {
            axis: ColVector3::axis(axis),
            angle: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.angle.abs() < float_accuracy()
    }

    /// Rodrigues: `v·cosθ + (k×v)·sinθ + k·(k·v)·(1 − cosθ)`.
    pub fn rotate_vector(&self, v: &ColVector3) -> ColVector3 {
        let (sin, cos) = self.angle.sin_cos();
        *v * cos + self.axis.cross(v) * sin + self.axis * (self.axis.dot(v) * (1.0 - cos))
    }

    pub fn to_matrix(&self) -> Result<Matrix, TransformError> {
        Matrix::rotation_axis_angle(&self.axis, self.angle)
    }
}

/// How each basis column of the skew matrix leans away from its axis.
///
/// `x` is always zero for skews built by decomposition; it is populated only when a
/// skew matrix with a modified first column is supplied directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skew {
    pub x: AxisAngle,
    pub y: AxisAngle,
    pub z: AxisAngle,
}

impl Default for Skew {
    fn default() -> Self {
        Skew {
            x: AxisAngle::zero(Axis::Z),
            y: AxisAngle::zero(Axis::Z),
            z: AxisAngle::zero(Axis::X),
        }
    }
}

/// Everything the sub-matrices say about a transform, in readable form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    pub translate: ColVector3,
    /// Euler angles in radians, ZXY order.
    pub rotate: ColVector3,
    pub skew: Skew,
    pub scale: ColVector3,
}

/// Factor `matrix` (4×4 affine) as `T · R · K · S`.
///
/// The rotation keeps the direction of the first column. A left-handed basis is
/// folded into a negative Y scale so `R` stays a proper rotation. `K` carries the
/// deviation of the Y column from perpendicular (about local Z) and of the Z column
/// from the XY normal (about a local axis).
///
/// Only the affine part is factored: a projective bottom row is replaced by `0 0 0 1`.
pub(crate) fn decompose(matrix: &Matrix) -> SubMatrices {
    let matrix = &affine_part(matrix);
    let translate = Matrix::translation_vector(&matrix.translation_part());

    let x = matrix.column3(0);
    let mut y = matrix.column3(1);
    let z = matrix.column3(2);

    let mut scale = ColVector3::new(x.norm(), y.norm(), z.norm());
    if x.cross(&y).dot(&z) < 0.0 {
        scale.set_y(-scale.y());
        y = -y;
    }

    if x.is_zero() {
        tracing::debug!("zero X column, deriving the decomposition frame from Y and Z");
    }
    let (x_dir, y_dir, z_dir) = frame(&x, &y, &z);

    let angle_xy = if y.is_zero() {
        FRAC_PI_2
    } else {
        y.dot(&y_dir).atan2(y.dot(&x_dir))
    };
    let skew_y = AxisAngle {
        axis: ColVector3::axis(Axis::Z),
        angle: angle_xy - FRAC_PI_2,
    };

    let skew_z = match z.try_normalize() {
        Some(z_hat) => {
            let angle = z_dir.angle_to(&z_hat);
            // the lean axis, expressed in the (x_dir, y_dir, z_dir) frame
            let axis = z_dir
                .cross(&z_hat)
                .try_normalize()
                .map(|a| ColVector3::new(a.dot(&x_dir), a.dot(&y_dir), a.dot(&z_dir)))
                .unwrap_or_else(|| ColVector3::axis(Axis::X));
            AxisAngle { axis, angle }
        },
        None => AxisAngle::zero(Axis::X),
    };

    let mut skew = Matrix::identity(4);
    skew.set_column3(1, &skew_y.rotate_vector(&ColVector3::axis(Axis::Y)));
    skew.set_column3(2, &skew_z.rotate_vector(&ColVector3::axis(Axis::Z)));

    let scale = Matrix::scaling_vector(&scale);

    let rotate = remainder(matrix, &translate, &skew, &scale).unwrap_or_else(|| {
        tracing::debug!("singular scale or skew, taking the rotation from the column frame");
        frame_rotation(&x_dir, &y_dir, &z_dir)
    });

    tracing::trace!(?scale, "decomposed transform matrix");
    SubMatrices {
        translate,
        rotate,
        skew,
        scale,
    }
}

fn affine_part(matrix: &Matrix) -> Matrix {
    let mut affine = matrix.clone();
    let is_affine = (0..3).all(|col| affine[(3, col)] == 0.0) && affine[(3, 3)] == 1.0;
    if !is_affine {
        tracing::debug!("dropping the projective row of a decomposed matrix");
        for col in 0..3 {
            affine[(3, col)] = 0.0;
        }
        affine[(3, 3)] = 1.0;
    }
    affine
}

/// Right-handed orthonormal frame with `x_dir` along the X column and `y` in the
/// `x_dir`/`y_dir` half-plane. Zero or parallel columns fall back to whatever the
/// remaining columns pin down.
fn frame(x: &ColVector3, y: &ColVector3, z: &ColVector3) -> (ColVector3, ColVector3, ColVector3) {
    let x_dir = x
        .try_normalize()
        .or_else(|| y.cross(z).try_normalize())
        .or_else(|| y.try_normalize().and_then(|v| v.any_perpendicular().ok()))
        .or_else(|| z.try_normalize().and_then(|v| v.any_perpendicular().ok()))
        .unwrap_or_else(|| ColVector3::axis(Axis::X));
    let z_dir = x_dir
        .cross(y)
        .try_normalize()
        .or_else(|| (*z - x_dir * z.dot(&x_dir)).try_normalize())
        .or_else(|| x_dir.any_perpendicular().ok())
        .unwrap_or_else(|| ColVector3::axis(Axis::Z));
    let y_dir = z_dir.cross(&x_dir);
    (x_dir, y_dir, z_dir)
}

/// `R = T⁻¹ · M · S⁻¹ · K⁻¹`, or `None` when `S` or `K` is singular.
fn remainder(matrix: &Matrix, translate: &Matrix, skew: &Matrix, scale: &Matrix) -> Option<Matrix> {
    let mut rotate = match translate.inverse() {
        Some(inverse) if !translate.is_identity() => inverse.mul_unchecked(matrix),
        _ => matrix.clone(),
    };
    if !scale.is_identity() {
        rotate = rotate.mul_unchecked(&scale.inverse()?);
    }
    if !skew.is_identity() {
        rotate = rotate.mul_unchecked(&skew.inverse()?);
    }
    Some(rotate.into_kind(MatrixKind::Rotate))
}

fn frame_rotation(x_dir: &ColVector3, y_dir: &ColVector3, z_dir: &ColVector3) -> Matrix {
    let mut rotate = Matrix::identity(4);
    rotate.set_column3(0, x_dir);
    rotate.set_column3(1, y_dir);
    rotate.set_column3(2, z_dir);
    rotate.into_kind(MatrixKind::Rotate)
}

/// Euler angles `(x, y, z)` of a rotation built as `Rz · Rx · Ry`.
///
/// At gimbal lock (`|m21| ≈ 1`) the Y angle is reported as zero and the whole
/// in-plane turn goes to Z.
pub(crate) fn euler_zxy(rotate: &Matrix) -> ColVector3 {
    let m21 = rotate[(2, 1)].clamp(-1.0, 1.0);
    let x = m21.asin();
    if m21.abs() < 1.0 - float_accuracy() {
        let y = (-rotate[(2, 0)]).atan2(rotate[(2, 2)]);
        let z = (-rotate[(0, 1)]).atan2(rotate[(1, 1)]);
        ColVector3::new(x, y, z)
    } else {
        ColVector3::new(x, 0.0, rotate[(1, 0)].atan2(rotate[(0, 0)]))
    }
}

pub(crate) fn skew_from_matrix(skew: &Matrix) -> Skew {
    Skew {
        x: column_lean(skew, Axis::X, Axis::Z),
        y: column_lean(skew, Axis::Y, Axis::Z),
        z: column_lean(skew, Axis::Z, Axis::X),
    }
}

/// Axis-angle taking basis `axis` onto the direction of the matching column.
/// Leans about `±reference` are reported about `+reference` with a signed angle.
fn column_lean(skew: &Matrix, axis: Axis, reference: Axis) -> AxisAngle {
    let basis = ColVector3::axis(axis);
    let column = skew.column3(axis.index());
    let angle = basis.angle_to(&column);
    if angle < float_accuracy() {
        return AxisAngle::zero(reference);
    }
    let reference_dir = ColVector3::axis(reference);
    match basis.cross(&column).try_normalize() {
        Some(lean) if lean.approx_eq(&-reference_dir) => AxisAngle {
            axis: reference_dir,
            angle: -angle,
        },
        Some(lean) => AxisAngle { axis: lean, angle },
        // antiparallel column: half a turn about the reference axis
        None => AxisAngle {
            axis: reference_dir,
            angle,
        },
    }
}
