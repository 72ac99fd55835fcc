//! Frame-change constructors: transforms that carry one direction, plane or line onto
//! another.

use super::{SubMatrices, Transform};
use crate::errors::TransformError;
use crate::float_types::PI;
use crate::line::Line;
use crate::matrix::{Axis, ColVector3, Matrix, MatrixKind};
use crate::plane::Plane;

/// Rotation taking the direction of `from` onto the direction of `to`.
fn rotation_between(from: &ColVector3, to: &ColVector3) -> Result<Matrix, TransformError> {
    let (Some(from), Some(to)) = (from.try_normalize(), to.try_normalize()) else {
        return Err(TransformError::DegenerateInput(
            "from_vector_to_vector requires non-zero vectors",
        ));
    };
    let angle = from.angle_to(&to);
    match from.cross(&to).try_normalize() {
        Some(axis) => Matrix::rotation_axis_angle(&axis, angle),
        None if angle < PI / 2.0 => Ok(Matrix::identity(4).into_kind(MatrixKind::Rotate)),
        // antiparallel: any axis perpendicular to `from` gives the half turn
        None => Matrix::rotation_axis_angle(&from.any_perpendicular()?, PI),
    }
}

impl Transform {
    /// Pure rotation turning `from` onto `to`.
    pub fn from_vector_to_vector(
        from: &ColVector3,
        to: &ColVector3,
    ) -> Result<Transform, TransformError> {
        let mut parts = SubMatrices::identity();
        parts.rotate = rotation_between(from, to)?;
        Ok(Transform::from_parts_unchecked(parts))
    }

    /// Rigid motion carrying plane `from` onto plane `to`, normals included.
    pub fn from_plane_to_plane(from: &Plane, to: &Plane) -> Result<Transform, TransformError> {
        let rotate = rotation_between(&from.normal(), &to.normal())?;
        let rotated = rotate.transform_point(&from.point_on_plane());
        let mut parts = SubMatrices::identity();
        parts.translate = Matrix::translation_vector(&(to.project_point(&rotated) - rotated));
        parts.rotate = rotate;
        Ok(Transform::from_parts_unchecked(parts))
    }

    /// Rigid motion carrying `line` onto the Z axis: its direction onto `+Z` and its
    /// anchor point onto the origin.
    pub fn from_line_to_z_axis(line: &Line) -> Result<Transform, TransformError> {
        let rotate = rotation_between(&line.direction(), &ColVector3::axis(Axis::Z))?;
        let mut parts = SubMatrices::identity();
        parts.translate = Matrix::translation_vector(&-rotate.transform_point(&line.point()));
        parts.rotate = rotate;
        Ok(Transform::from_parts_unchecked(parts))
    }
}
