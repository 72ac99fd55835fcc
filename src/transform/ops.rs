//! Mutating operations. Each public method edits once and then fires the change
//! listener once.
//!
//! | mode     | effect                                           |
//! |----------|--------------------------------------------------|
//! | `Global` | `matrix = E · matrix` (parent frame)             |
//! | `Local`  | `part = E · part` for the matching sub-matrix    |
//! | `pre_*`  | `matrix = matrix · E` (applied before the rest)  |
//!
//! Pivot variants keep the image of the pivot fixed. A `Global` pivot is a point in
//! the parent frame; a `Local` pivot is a point in the transform's own (untransformed)
//! frame.

use super::{Part, Transform, TransformMode};
use crate::errors::TransformError;
use crate::float_types::Real;
use crate::line::Line;
use crate::matrix::{Axis, ColVector3, Matrix, MatrixKind, SkewAxis};
use crate::plane::Plane;

impl Transform {
    fn apply(&mut self, e: &Matrix, part: Part, mode: TransformMode) {
        match mode {
            TransformMode::Global => self.edit_matrix(|m| *m = e.mul_unchecked(m)),
            TransformMode::Local => self.edit_parts(|parts| {
                let target = parts.part_mut(part);
                *target = e.mul_unchecked(target);
                if part == Part::Skew {
                    parts.resplit_skew();
                }
            }),
        }
    }

    fn apply_about(&mut self, e: &Matrix, part: Part, pivot: &ColVector3, mode: TransformMode) {
        match mode {
            TransformMode::Global => {
                // E about p is E followed by a shift of p − E·p
                let mut about = e.clone().into_kind(MatrixKind::General);
                about.set_column3(3, &(e.translation_part() + *pivot - e.transform_point(pivot)));
                self.edit_matrix(|m| *m = about.mul_unchecked(m));
            },
            TransformMode::Local => self.edit_parts(|parts| {
                let before = parts.part(part).clone();
                let target = parts.part_mut(part);
                *target = e.mul_unchecked(target);
                let shift = parts.pivot_shift(part, &before, pivot);
                if part == Part::Skew {
                    parts.resplit_skew();
                }
                parts.translate =
                    Matrix::translation_vector(&(parts.translate.translation_part() + shift));
            }),
        }
    }

    pub fn translate(&mut self, offset: &ColVector3, mode: TransformMode) {
        self.apply(&Matrix::translation_vector(offset), Part::Translate, mode);
        self.notify();
    }

    pub fn translate_x(&mut self, dx: Real, mode: TransformMode) {
        self.translate(&ColVector3::new(dx, 0.0, 0.0), mode);
    }

    pub fn translate_y(&mut self, dy: Real, mode: TransformMode) {
        self.translate(&ColVector3::new(0.0, dy, 0.0), mode);
    }

    pub fn translate_z(&mut self, dz: Real, mode: TransformMode) {
        self.translate(&ColVector3::new(0.0, 0.0, dz), mode);
    }

    /// Move the origin of the transform's frame to `position` (absolute).
    pub fn set_translate(&mut self, position: &ColVector3) {
        self.edit_parts(|parts| parts.translate = Matrix::translation_vector(position));
        self.notify();
    }

    /// `matrix = matrix · translate(offset)`: offset expressed in the local frame.
    pub fn pre_translate(&mut self, offset: &ColVector3) {
        let e = Matrix::translation_vector(offset);
        self.edit_matrix(|m| *m = m.mul_unchecked(&e));
        self.notify();
    }

    /// Rotate about `axis` through the origin. Zero-length axes are rejected.
    pub fn rotate(
        &mut self,
        axis: &ColVector3,
        angle: Real,
        mode: TransformMode,
    ) -> Result<(), TransformError> {
        let e = Matrix::rotation_axis_angle(axis, angle)?;
        self.apply(&e, Part::Rotate, mode);
        self.notify();
        Ok(())
    }

    pub fn rotate_x(&mut self, angle: Real, mode: TransformMode) {
        self.apply(&Matrix::rotation_x(angle), Part::Rotate, mode);
        self.notify();
    }

    pub fn rotate_y(&mut self, angle: Real, mode: TransformMode) {
        self.apply(&Matrix::rotation_y(angle), Part::Rotate, mode);
        self.notify();
    }

    pub fn rotate_z(&mut self, angle: Real, mode: TransformMode) {
        self.apply(&Matrix::rotation_z(angle), Part::Rotate, mode);
        self.notify();
    }

    /// Rotate about `axis` through `pivot`.
    pub fn rotate_at(
        &mut self,
        axis: &ColVector3,
        angle: Real,
        pivot: &ColVector3,
        mode: TransformMode,
    ) -> Result<(), TransformError> {
        let e = Matrix::rotation_axis_angle(axis, angle)?;
        self.apply_about(&e, Part::Rotate, pivot, mode);
        self.notify();
        Ok(())
    }

    /// Rotate about an arbitrary line in the parent frame.
    ///
    /// Conjugates a Z rotation by the frame change that maps `line` onto the Z axis.
    pub fn rotate_about_line(&mut self, line: &Line, angle: Real) -> Result<(), TransformError> {
        let to_axis = Transform::from_line_to_z_axis(line)?;
        let from_axis = to_axis.inverse()?;
        let e = from_axis
            .matrix()
            .mul_unchecked(&Matrix::rotation_z(angle))
            .mul_unchecked(to_axis.matrix());
        self.edit_matrix(|m| *m = e.mul_unchecked(m));
        self.notify();
        Ok(())
    }

    /// Replace the rotation with Euler angles `(x, y, z)` in ZXY order (absolute).
    pub fn set_rotation(&mut self, euler: &ColVector3) {
        self.edit_parts(|parts| parts.rotate = Matrix::rotation_euler(euler));
        self.notify();
    }

    /// `matrix = matrix · rotate(axis, angle)`.
    pub fn pre_rotate(&mut self, axis: &ColVector3, angle: Real) -> Result<(), TransformError> {
        let e = Matrix::rotation_axis_angle(axis, angle)?;
        self.edit_matrix(|m| *m = m.mul_unchecked(&e));
        self.notify();
        Ok(())
    }

    pub fn scale(&mut self, factors: &ColVector3, mode: TransformMode) {
        self.apply(&Matrix::scaling_vector(factors), Part::Scale, mode);
        self.notify();
    }

    pub fn scale_axis(&mut self, axis: Axis, factor: Real, mode: TransformMode) {
        let mut factors = ColVector3::new(1.0, 1.0, 1.0);
        match axis {
            Axis::X => factors.set_x(factor),
            Axis::Y => factors.set_y(factor),
            Axis::Z => factors.set_z(factor),
        }
        self.scale(&factors, mode);
    }

    /// Scale about `pivot`.
    pub fn scale_at(&mut self, factors: &ColVector3, pivot: &ColVector3, mode: TransformMode) {
        self.apply_about(&Matrix::scaling_vector(factors), Part::Scale, pivot, mode);
        self.notify();
    }

    /// Replace the scale factors (absolute).
    pub fn set_scale(&mut self, factors: &ColVector3) {
        self.edit_parts(|parts| parts.scale = Matrix::scaling_vector(factors));
        self.notify();
    }

    /// `matrix = matrix · scale(factors)`.
    pub fn pre_scale(&mut self, factors: &ColVector3) {
        let e = Matrix::scaling_vector(factors);
        self.edit_matrix(|m| *m = m.mul_unchecked(&e));
        self.notify();
    }

    /// Shear by `angle` radians, CSS `skewX`/`skewY` style.
    ///
    /// In `Local` mode the shear lands on `skew · scale`, which is then split again
    /// into a unit-column skew and a scale. A `skewY` turns the X column, so part of
    /// it ends up in the rotation.
    pub fn skew(&mut self, axis: SkewAxis, angle: Real, mode: TransformMode) {
        self.apply(&Matrix::shear(axis, angle), Part::Skew, mode);
        self.notify();
    }

    pub fn skew_at(
        &mut self,
        axis: SkewAxis,
        angle: Real,
        pivot: &ColVector3,
        mode: TransformMode,
    ) {
        self.apply_about(&Matrix::shear(axis, angle), Part::Skew, pivot, mode);
        self.notify();
    }

    /// Mirror across `plane` (parent frame).
    ///
    /// The plane is mapped onto `x = 0`, mirrored in X, and mapped back.
    pub fn flip(&mut self, plane: &Plane) -> Result<(), TransformError> {
        let to_yz = Transform::from_plane_to_plane(plane, &Plane::yz())?;
        let back = to_yz.inverse()?;
        let e = back
            .matrix()
            .mul_unchecked(&Matrix::mirror(Axis::X))
            .mul_unchecked(to_yz.matrix());
        self.edit_matrix(|m| *m = e.mul_unchecked(m));
        self.notify();
        Ok(())
    }

    /// Apply `other` after this transform: `matrix = other · matrix`.
    pub fn add_transform(&mut self, other: &Transform) {
        let e = other.matrix().clone();
        self.edit_matrix(|m| *m = e.mul_unchecked(m));
        self.notify();
    }

    /// Apply `other` before this transform: `matrix = matrix · other`.
    pub fn pre_transform(&mut self, other: &Transform) {
        let e = other.matrix().clone();
        self.edit_matrix(|m| *m = m.mul_unchecked(&e));
        self.notify();
    }
}
