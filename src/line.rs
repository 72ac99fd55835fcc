//! Infinite lines in 3D.

use crate::errors::TransformError;
use crate::float_types::{Real, float_accuracy};
use crate::matrix::{Axis, ColVector3, Matrix};
use crate::traits::Transformable;
use crate::transform::Transform;

/// An infinite line `point + t · direction`, with `direction` of unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    direction: ColVector3,
    point: ColVector3,
}

impl Line {
    /// Line through `a` and `b`, directed from `a` to `b`.
    pub fn from_points(a: &ColVector3, b: &ColVector3) -> Result<Self, TransformError> {
        let direction = (*b - *a)
            .try_normalize()
            .ok_or(TransformError::DegenerateInput("a line needs two distinct points"))?;
        Ok(Line {
            direction,
            point: *a,
        })
    }

    pub fn from_direction_point(
        direction: &ColVector3,
        point: &ColVector3,
    ) -> Result<Self, TransformError> {
        Ok(Line {
            direction: direction.normalize()?,
            point: *point,
        })
    }

    /// Line through `point` along `+axis`.
    pub fn parallel_to_axis(axis: Axis, point: &ColVector3) -> Self {
        Line {
            direction: ColVector3::axis(axis),
            point: *point,
        }
    }

    pub const fn direction(&self) -> ColVector3 {
        self.direction
    }

    pub const fn point(&self) -> ColVector3 {
        self.point
    }

    pub fn set_direction(&mut self, direction: &ColVector3) -> Result<(), TransformError> {
        self.direction = direction.normalize()?;
        Ok(())
    }

    pub fn set_point(&mut self, point: &ColVector3) {
        self.point = *point;
    }

    pub fn point_at(&self, t: Real) -> ColVector3 {
        self.point + self.direction * t
    }

    /// Foot of the perpendicular from `p`.
    pub fn projection_point(&self, p: &ColVector3) -> ColVector3 {
        self.point_at((*p - self.point).dot(&self.direction))
    }

    pub fn distance_to_point(&self, p: &ColVector3) -> Real {
        (*p - self.point).cross(&self.direction).norm()
    }

    pub fn contains_point(&self, p: &ColVector3) -> bool {
        self.distance_to_point(p) < float_accuracy()
    }

    pub fn is_parallel_to(&self, other: &Line) -> bool {
        self.direction.cross(&other.direction).is_zero()
    }

    /// The common point of two lines, or `None` when they are parallel or skew.
    ///
    /// Solves `p₀ + t·d₀ = p₁ + s·d₁` on the best-conditioned pair of coordinate rows
    /// and checks the candidate against the remaining row.
    pub fn intersection_with_line(&self, other: &Line) -> Option<ColVector3> {
        let (d0, d1) = (self.direction, other.direction);
        let rhs = other.point - self.point;

        let (i, j) = [(0, 1), (0, 2), (1, 2)]
            .into_iter()
            .max_by(|&(a, b), &(c, d)| {
                let det_ab = d0.0[a] * d1.0[b] - d0.0[b] * d1.0[a];
                let det_cd = d0.0[c] * d1.0[d] - d0.0[d] * d1.0[c];
                det_ab.abs().total_cmp(&det_cd.abs())
            })?;

        let system = Matrix::from_rows([[d0.0[i], -d1.0[i]], [d0.0[j], -d1.0[j]]]);
        let inverse = system.inverse()?;
        let t = inverse[(0, 0)] * rhs.0[i] + inverse[(0, 1)] * rhs.0[j];

        let candidate = self.point_at(t);
        let scale = 1.0 + candidate.norm();
        (other.distance_to_point(&candidate) < float_accuracy() * scale).then_some(candidate)
    }
}

impl Transformable for Line {
    /// Maps the anchor point and a second point one unit along the line.
    fn transform(&self, transform: &Transform) -> Result<Self, TransformError> {
        let a = transform.transform_point(&self.point);
        let b = transform.transform_point(&(self.point + self.direction));
        Line::from_points(&a, &b)
    }
}

/// A line through the origin, described by its unit direction only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineThroughOrigin {
    direction: ColVector3,
}

impl LineThroughOrigin {
    pub fn new(direction: &ColVector3) -> Result<Self, TransformError> {
        Ok(LineThroughOrigin {
            direction: direction.normalize()?,
        })
    }

    pub const fn direction(&self) -> ColVector3 {
        self.direction
    }

    pub fn projection_point(&self, p: &ColVector3) -> ColVector3 {
        self.direction * p.dot(&self.direction)
    }

    pub fn distance_to_point(&self, p: &ColVector3) -> Real {
        p.cross(&self.direction).norm()
    }
}

impl From<LineThroughOrigin> for Line {
    fn from(line: LineThroughOrigin) -> Self {
        Line {
            direction: line.direction,
            point: ColVector3::zeros(),
        }
    }
}
