use crate::errors::TransformError;
use crate::float_types::Real;
use crate::matrix::ColVector3;
use crate::plane::Plane;
use crate::transform::{Transform, TransformMode};

/// Geometry that can be carried through an affine [`Transform`].
pub trait Transformable: Sized {
    fn transform(&self, transform: &Transform) -> Result<Self, TransformError>;

    /// Returns a new Self translated by x, y, and z.
    fn translate(&self, x: Real, y: Real, z: Real) -> Result<Self, TransformError> {
        let mut t = Transform::identity();
        t.translate(&ColVector3::new(x, y, z), TransformMode::Global);
        self.transform(&t)
    }

    /// Returns a new Self rotated `angle` radians about `axis` through the origin.
    fn rotate(&self, axis: &ColVector3, angle: Real) -> Result<Self, TransformError> {
        let mut t = Transform::identity();
        t.rotate(axis, angle, TransformMode::Global)?;
        self.transform(&t)
    }

    /// Returns a new Self scaled by sx, sy, sz about the origin.
    fn scale(&self, sx: Real, sy: Real, sz: Real) -> Result<Self, TransformError> {
        let mut t = Transform::identity();
        t.scale(&ColVector3::new(sx, sy, sz), TransformMode::Global);
        self.transform(&t)
    }

    /// Reflect (mirror) about `plane`.
    fn mirror(&self, plane: &Plane) -> Result<Self, TransformError> {
        let mut t = Transform::identity();
        t.flip(plane)?;
        self.transform(&t)
    }
}

/// Points.
impl Transformable for ColVector3 {
    fn transform(&self, transform: &Transform) -> Result<Self, TransformError> {
        Ok(transform.transform_point(self))
    }
}
