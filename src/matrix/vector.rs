//! `ColVector3`, the three-row column vector the kernel uses for points, directions and
//! Euler/scale triples.

use crate::errors::TransformError;
use crate::float_types::{Real, float_accuracy};
use crate::matrix::Matrix;
use nalgebra::Vector3;
use std::fmt::Display;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Cartesian axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Row (or column) index of this axis in a homogeneous matrix.
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A 3×1 column vector.
///
/// Equivalent to a `Matrix` with three rows and one column, but stored inline so
/// vector algebra stays allocation free. Convert with [`ColVector3::to_matrix`] and
/// `ColVector3::try_from(&Matrix)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColVector3(pub Vector3<Real>);

impl ColVector3 {
    #[inline]
    pub fn new(x: Real, y: Real, z: Real) -> Self {
        ColVector3(Vector3::new(x, y, z))
    }

    #[inline]
    pub fn zeros() -> Self {
        ColVector3(Vector3::zeros())
    }

    /// Unit vector along `axis`.
    pub fn axis(axis: Axis) -> Self {
        match axis {
            Axis::X => ColVector3(Vector3::x()),
            Axis::Y => ColVector3(Vector3::y()),
            Axis::Z => ColVector3(Vector3::z()),
        }
    }

    #[inline]
    pub fn x(&self) -> Real {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> Real {
        self.0.y
    }

    #[inline]
    pub fn z(&self) -> Real {
        self.0.z
    }

    #[inline]
    pub fn set_x(&mut self, value: Real) {
        self.0.x = value;
    }

    #[inline]
    pub fn set_y(&mut self, value: Real) {
        self.0.y = value;
    }

    #[inline]
    pub fn set_z(&mut self, value: Real) {
        self.0.z = value;
    }

    /// Component along `axis`.
    #[inline]
    pub fn component(&self, axis: Axis) -> Real {
        self.0[axis.index()]
    }

    pub const fn as_vector3(&self) -> &Vector3<Real> {
        &self.0
    }

    pub fn dot(&self, other: &ColVector3) -> Real {
        self.0.dot(&other.0)
    }

    pub fn cross(&self, other: &ColVector3) -> ColVector3 {
        ColVector3(self.0.cross(&other.0))
    }

    pub fn norm(&self) -> Real {
        self.0.norm()
    }

    pub fn norm_squared(&self) -> Real {
        self.0.norm_squared()
    }

    /// `true` when the norm is below the crate tolerance.
    pub fn is_zero(&self) -> bool {
        self.norm() < float_accuracy()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn try_normalize(&self) -> Option<ColVector3> {
        self.0.try_normalize(float_accuracy()).map(ColVector3)
    }

    /// Unit vector in the same direction.
    ///
    /// Zero-length input is a caller error: there is no direction to keep.
    pub fn normalize(&self) -> Result<ColVector3, TransformError> {
        self.try_normalize()
            .ok_or(TransformError::DegenerateInput("cannot normalize a zero-length vector"))
    }

    /// Unsigned angle to `other` in `[0, π]`. Zero vectors yield `0`.
    pub fn angle_to(&self, other: &ColVector3) -> Real {
        let denom = self.norm() * other.norm();
        if denom < float_accuracy() {
            return 0.0;
        }
        // atan2 of |a×b| and a·b stays accurate near 0 and π where acos does not
        self.cross(other).norm().atan2(self.dot(other))
    }

    /// Angle to `other` in `(-π, π]`, positive when `self × other` points along
    /// `reference` (right-hand rule).
    pub fn signed_angle_to(&self, other: &ColVector3, reference: &ColVector3) -> Real {
        let angle = self.angle_to(other);
        if self.cross(other).dot(reference) < 0.0 {
            -angle
        } else {
            angle
        }
    }

    /// Some unit vector orthogonal to `self`.
    ///
    /// Picks the basis axis least aligned with `self` so the cross product stays well
    /// conditioned.
    pub fn any_perpendicular(&self) -> Result<ColVector3, TransformError> {
        let v = self.0.abs();
        let helper = if v.x <= v.y && v.x <= v.z {
            Vector3::x()
        } else if v.y <= v.z {
            Vector3::y()
        } else {
            Vector3::z()
        };
        ColVector3(self.0.cross(&helper)).normalize()
    }

    /// Component-wise comparison within the crate tolerance.
    pub fn approx_eq(&self, other: &ColVector3) -> bool {
        (self.0 - other.0).amax() < float_accuracy()
    }

    /// The 3×1 `Matrix` with the same entries.
    pub fn to_matrix(&self) -> Matrix {
        Matrix::from_rows([[self.0.x], [self.0.y], [self.0.z]])
    }
}

impl From<Vector3<Real>> for ColVector3 {
    fn from(v: Vector3<Real>) -> Self {
        ColVector3(v)
    }
}

impl From<ColVector3> for Vector3<Real> {
    fn from(v: ColVector3) -> Self {
        v.0
    }
}

impl From<[Real; 3]> for ColVector3 {
    fn from(v: [Real; 3]) -> Self {
        ColVector3::new(v[0], v[1], v[2])
    }
}

impl TryFrom<&Matrix> for ColVector3 {
    type Error = TransformError;

    fn try_from(matrix: &Matrix) -> Result<Self, Self::Error> {
        if matrix.rows() != 3 || matrix.cols() != 1 {
            return Err(TransformError::DimensionMismatch {
                op: "ColVector3::try_from",
                left: (3, 1),
                right: (matrix.rows(), matrix.cols()),
            });
        }
        Ok(ColVector3::new(matrix[(0, 0)], matrix[(1, 0)], matrix[(2, 0)]))
    }
}

impl Display for ColVector3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

impl Add for ColVector3 {
    type Output = ColVector3;
    fn add(self, rhs: ColVector3) -> ColVector3 {
        ColVector3(self.0 + rhs.0)
    }
}

impl Sub for ColVector3 {
    type Output = ColVector3;
    fn sub(self, rhs: ColVector3) -> ColVector3 {
        ColVector3(self.0 - rhs.0)
    }
}

impl AddAssign for ColVector3 {
    fn add_assign(&mut self, rhs: ColVector3) {
        self.0 += rhs.0;
    }
}

impl SubAssign for ColVector3 {
    fn sub_assign(&mut self, rhs: ColVector3) {
        self.0 -= rhs.0;
    }
}

impl Neg for ColVector3 {
    type Output = ColVector3;
    fn neg(self) -> ColVector3 {
        ColVector3(-self.0)
    }
}

impl Mul<Real> for ColVector3 {
    type Output = ColVector3;
    fn mul(self, rhs: Real) -> ColVector3 {
        ColVector3(self.0 * rhs)
    }
}

impl Div<Real> for ColVector3 {
    type Output = ColVector3;
    fn div(self, rhs: Real) -> ColVector3 {
        ColVector3(self.0 / rhs)
    }
}

impl approx::AbsDiffEq for ColVector3 {
    type Epsilon = Real;

    fn default_epsilon() -> Self::Epsilon {
        float_accuracy()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.0, &other.0, epsilon)
    }
}

impl approx::RelativeEq for ColVector3 {
    fn default_max_relative() -> Self::Epsilon {
        <Vector3<Real> as approx::RelativeEq>::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        approx::RelativeEq::relative_eq(&self.0, &other.0, epsilon, max_relative)
    }
}
