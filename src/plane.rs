//! Planes in Hessian normal form.

use crate::errors::TransformError;
use crate::float_types::{Real, float_accuracy};
use crate::line::Line;
use crate::matrix::{Axis, ColVector3};
use crate::traits::Transformable;
use crate::transform::Transform;

/// The plane `normal · x + d = 0`, with `normal` of unit length.
///
/// `d` is the negated signed distance of the plane from the origin along `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: ColVector3,
    d: Real,
}

impl Plane {
    /// From any non-zero normal; `d` is rescaled together with the normal so the
    /// plane stays the same.
    pub fn from_normal_d(normal: &ColVector3, d: Real) -> Result<Self, TransformError> {
        let length = normal.norm();
        let normal = normal.normalize()?;
        Ok(Plane {
            normal,
            d: d / length,
        })
    }

    pub fn from_point_normal(
        point: &ColVector3,
        normal: &ColVector3,
    ) -> Result<Self, TransformError> {
        let normal = normal.normalize()?;
        Ok(Plane {
            normal,
            d: -normal.dot(point),
        })
    }

    /// Plane through three points, normal `(b − a) × (c − a)` (counter-clockwise
    /// points face the viewer).
    pub fn from_points(
        a: &ColVector3,
        b: &ColVector3,
        c: &ColVector3,
    ) -> Result<Self, TransformError> {
        let normal = (*b - *a)
            .cross(&(*c - *a))
            .try_normalize()
            .ok_or(TransformError::DegenerateInput("points are collinear"))?;
        Ok(Plane {
            normal,
            d: -normal.dot(a),
        })
    }

    /// `z = 0`, normal `+Z`.
    pub fn xy() -> Self {
        Plane::axis_aligned(Axis::Z, 0.0)
    }

    /// `x = 0`, normal `+X`.
    pub fn yz() -> Self {
        Plane::axis_aligned(Axis::X, 0.0)
    }

    /// `y = 0`, normal `+Y`.
    pub fn xz() -> Self {
        Plane::axis_aligned(Axis::Y, 0.0)
    }

    /// The plane `axis = offset`, normal `+axis`.
    pub fn axis_aligned(axis: Axis, offset: Real) -> Self {
        Plane {
            normal: ColVector3::axis(axis),
            d: -offset,
        }
    }

    pub const fn normal(&self) -> ColVector3 {
        self.normal
    }

    pub const fn d(&self) -> Real {
        self.d
    }

    /// The point of the plane closest to the origin.
    pub fn point_on_plane(&self) -> ColVector3 {
        self.normal * -self.d
    }

    /// Positive on the side the normal points to.
    pub fn signed_distance_to_point(&self, p: &ColVector3) -> Real {
        self.normal.dot(p) + self.d
    }

    pub fn distance_to_point(&self, p: &ColVector3) -> Real {
        self.signed_distance_to_point(p).abs()
    }

    pub fn contains_point(&self, p: &ColVector3) -> bool {
        self.distance_to_point(p) < float_accuracy()
    }

    pub fn project_point(&self, p: &ColVector3) -> ColVector3 {
        *p - self.normal * self.signed_distance_to_point(p)
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.d = -self.d;
    }

    pub fn flipped(&self) -> Self {
        let mut out = *self;
        out.flip();
        out
    }

    /// Where `line` crosses the plane, or `None` when it runs parallel to it.
    pub fn intersection_with_line(&self, line: &Line) -> Option<ColVector3> {
        let denom = self.normal.dot(&line.direction());
        if denom.abs() < float_accuracy() {
            return None;
        }
        Some(line.point_at(-self.signed_distance_to_point(&line.point()) / denom))
    }

    /// The common line of two planes, directed along `self.normal × other.normal`,
    /// or `None` for parallel planes.
    pub fn intersection_with_plane(&self, other: &Plane) -> Option<Line> {
        let direction = self.normal.cross(&other.normal);
        if direction.is_zero() {
            return None;
        }
        // point = c₁·n₁ + c₂·n₂ satisfying both plane equations
        let cos = self.normal.dot(&other.normal);
        let det = 1.0 - cos * cos;
        let (h1, h2) = (-self.d, -other.d);
        let c1 = (h1 - h2 * cos) / det;
        let c2 = (h2 - h1 * cos) / det;
        let point = self.normal * c1 + other.normal * c2;
        Line::from_direction_point(&direction, &point).ok()
    }
}

impl Transformable for Plane {
    /// Maps a point and two in-plane directions, then keeps the normal on the side
    /// the mapped original normal points to.
    fn transform(&self, transform: &Transform) -> Result<Self, TransformError> {
        let origin = self.point_on_plane();
        let u = self.normal.any_perpendicular()?;
        let v = self.normal.cross(&u);
        let plane = Plane::from_points(
            &transform.transform_point(&origin),
            &transform.transform_point(&(origin + u)),
            &transform.transform_point(&(origin + v)),
        )?;
        if plane.normal.dot(&transform.transform_vector(&self.normal)) < 0.0 {
            return Ok(plane.flipped());
        }
        Ok(plane)
    }
}

/// A plane through the origin, described by its unit normal only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneThroughOrigin {
    normal: ColVector3,
}

impl PlaneThroughOrigin {
    pub fn new(normal: &ColVector3) -> Result<Self, TransformError> {
        Ok(PlaneThroughOrigin {
            normal: normal.normalize()?,
        })
    }

    /// The plane spanned by two directions, normal `a × b`.
    pub fn from_vectors(a: &ColVector3, b: &ColVector3) -> Result<Self, TransformError> {
        let normal = a
            .cross(b)
            .try_normalize()
            .ok_or(TransformError::DegenerateInput("spanning vectors are parallel"))?;
        Ok(PlaneThroughOrigin { normal })
    }

    pub const fn normal(&self) -> ColVector3 {
        self.normal
    }

    pub fn contains_vector(&self, v: &ColVector3) -> bool {
        self.normal.dot(v).abs() < float_accuracy()
    }

    pub fn project_vector(&self, v: &ColVector3) -> ColVector3 {
        *v - self.normal * self.normal.dot(v)
    }
}

impl From<PlaneThroughOrigin> for Plane {
    fn from(plane: PlaneThroughOrigin) -> Self {
        Plane {
            normal: plane.normal,
            d: 0.0,
        }
    }
}
