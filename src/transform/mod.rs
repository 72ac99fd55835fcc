//! `Transform`: a 3D affine transform held as two interchangeable representations.
//!
//! - the **composite** 4×4 matrix `M`, and
//! - the **sub-matrices** `T`, `R`, `K`, `S` with `M = T · R · K · S`
//!   (translate, rotate, skew, scale).
//!
//! Mutations edit one representation directly and mark the other stale. Reading the
//! stale side reconciles it on demand:
//!
//! ```text
//!          edit composite (Global)            edit a sub-matrix (Local)
//!   ┌────────────────────────────┐      ┌────────────────────────────┐
//!   │ MatrixAuthoritative        │      │ PartsAuthoritative         │
//!   │   matrix                   │      │   parts                    │
//!   │   parts: OnceLock (lazy)   │      │   matrix: OnceLock (lazy)  │
//!   └────────────────────────────┘      └────────────────────────────┘
//! ```
//!
//! "Both latest" is the state where the lazy side has been filled. There is no way to
//! express "neither is latest".
//!
//! Every edit also drops the derived caches (decomposed translate, Euler angles, skew,
//! scale, and the inverse). Edits go through [`Transform::edit_matrix`] and
//! [`Transform::edit_parts`], which do both in one step.

use crate::errors::TransformError;
use crate::float_types::{Real, approx_equal, approx_zero, float_accuracy};
use crate::matrix::{ColVector3, Matrix, MatrixKind};
use nalgebra::Matrix4;
use std::fmt::{Debug, Display};
use std::sync::{Arc, OnceLock};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

mod decompose;
mod frames;
mod ops;

pub use decompose::{AxisAngle, Decomposition, Skew};

/// Where an operation composes its elementary matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformMode {
    /// `matrix = E · matrix`, in the parent frame.
    #[default]
    Global,
    /// Into the matching sub-matrix only (`rotate = E · rotate`, ...).
    Local,
}

/// The four factors of a decomposed transform, `matrix = translate · rotate · skew · scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMatrices {
    pub(crate) translate: Matrix,
    pub(crate) rotate: Matrix,
    pub(crate) skew: Matrix,
    pub(crate) scale: Matrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Part {
    Translate,
    Rotate,
    Skew,
    Scale,
}

impl SubMatrices {
    pub(crate) fn identity() -> Self {
        SubMatrices {
            translate: Matrix::identity(4).into_kind(MatrixKind::Translate),
            rotate: Matrix::identity(4).into_kind(MatrixKind::Rotate),
            skew: Matrix::identity(4),
            scale: Matrix::identity(4).into_kind(MatrixKind::Scale),
        }
    }

    pub const fn translate(&self) -> &Matrix {
        &self.translate
    }

    pub const fn rotate(&self) -> &Matrix {
        &self.rotate
    }

    pub const fn skew(&self) -> &Matrix {
        &self.skew
    }

    pub const fn scale(&self) -> &Matrix {
        &self.scale
    }

    pub(crate) const fn part(&self, part: Part) -> &Matrix {
        match part {
            Part::Translate => &self.translate,
            Part::Rotate => &self.rotate,
            Part::Skew => &self.skew,
            Part::Scale => &self.scale,
        }
    }

    pub(crate) fn part_mut(&mut self, part: Part) -> &mut Matrix {
        match part {
            Part::Translate => &mut self.translate,
            Part::Rotate => &mut self.rotate,
            Part::Skew => &mut self.skew,
            Part::Scale => &mut self.scale,
        }
    }

    /// `translate · rotate · skew · scale`.
    pub(crate) fn compose(&self) -> Matrix {
        self.translate
            .mul_unchecked(&self.rotate)
            .mul_unchecked(&self.skew)
            .mul_unchecked(&self.scale)
            .into_kind(MatrixKind::General)
    }

    /// Linear factors left of `part` (translate excluded).
    fn prefix(&self, part: Part) -> Matrix {
        match part {
            Part::Translate | Part::Rotate => Matrix::identity(4),
            Part::Skew => self.rotate.clone(),
            Part::Scale => self.rotate.mul_unchecked(&self.skew),
        }
    }

    /// Factors right of `part`.
    fn suffix(&self, part: Part) -> Matrix {
        match part {
            Part::Translate => self.rotate.mul_unchecked(&self.skew).mul_unchecked(&self.scale),
            Part::Rotate => self.skew.mul_unchecked(&self.scale),
            Part::Skew => self.scale.clone(),
            Part::Scale => Matrix::identity(4),
        }
    }

    /// Re-split `skew · scale` so the skew is back in decomposed form: unit columns and
    /// an untouched X column. A turn of the X column moves into `rotate` and column
    /// lengths move into `scale`; the composite does not change.
    pub(crate) fn resplit_skew(&mut self) {
        let split = decompose::decompose(&self.skew.mul_unchecked(&self.scale));
        self.rotate = self
            .rotate
            .mul_unchecked(&split.rotate)
            .into_kind(MatrixKind::Rotate);
        self.skew = split.skew;
        self.scale = split.scale;
    }

    /// Translation that keeps the image of `pivot` fixed after `part` changed from
    /// `before` to its current value: `δ = prefix · (before − after) · suffix · pivot`.
    pub(crate) fn pivot_shift(
        &self,
        part: Part,
        before: &Matrix,
        pivot: &ColVector3,
    ) -> ColVector3 {
        let local = self.suffix(part).transform_point(pivot);
        let diff = before.transform_point(&local) - self.part(part).transform_point(&local);
        self.prefix(part).transform_vector(&diff)
    }
}

#[derive(Debug, Clone)]
enum Representation {
    MatrixAuthoritative {
        matrix: Matrix,
        parts: OnceLock<SubMatrices>,
    },
    PartsAuthoritative {
        parts: SubMatrices,
        matrix: OnceLock<Matrix>,
    },
}

impl Default for Representation {
    fn default() -> Self {
        Representation::MatrixAuthoritative {
            matrix: Matrix::identity(4),
            parts: OnceLock::from(SubMatrices::identity()),
        }
    }
}

impl Representation {
    fn matrix(&self) -> &Matrix {
        match self {
            Representation::MatrixAuthoritative { matrix, .. } => matrix,
            Representation::PartsAuthoritative { parts, matrix } => matrix.get_or_init(|| {
                tracing::trace!("recomposing transform matrix from sub-matrices");
                parts.compose()
            }),
        }
    }

    fn parts(&self) -> &SubMatrices {
        match self {
            Representation::MatrixAuthoritative { matrix, parts } => parts.get_or_init(|| {
                tracing::trace!("decomposing transform matrix into sub-matrices");
                decompose::decompose(matrix)
            }),
            Representation::PartsAuthoritative { parts, .. } => parts,
        }
    }

    fn into_matrix(self) -> Matrix {
        match self {
            Representation::MatrixAuthoritative { matrix, .. } => matrix,
            Representation::PartsAuthoritative { parts, matrix } => {
                matrix.into_inner().unwrap_or_else(|| parts.compose())
            },
        }
    }

    fn into_parts(self) -> SubMatrices {
        match self {
            Representation::MatrixAuthoritative { matrix, parts } => {
                parts.into_inner().unwrap_or_else(|| decompose::decompose(&matrix))
            },
            Representation::PartsAuthoritative { parts, .. } => parts,
        }
    }

    fn is_matrix_latest(&self) -> bool {
        match self {
            Representation::MatrixAuthoritative { .. } => true,
            Representation::PartsAuthoritative { matrix, .. } => matrix.get().is_some(),
        }
    }

    fn is_parts_latest(&self) -> bool {
        match self {
            Representation::MatrixAuthoritative { parts, .. } => parts.get().is_some(),
            Representation::PartsAuthoritative { .. } => true,
        }
    }
}

/// Values derived from the current state, computed on first read.
#[derive(Debug, Clone, Default)]
struct Caches {
    translate: OnceLock<ColVector3>,
    rotate: OnceLock<ColVector3>,
    skew: OnceLock<Skew>,
    scale: OnceLock<ColVector3>,
    inverse: OnceLock<Option<Box<Transform>>>,
}

/// Callback fired after every mutating operation.
pub type ChangeListener = Arc<dyn Fn(&Transform) + Send + Sync>;

pub struct Transform {
    repr: Representation,
    caches: Caches,
    listener: Option<ChangeListener>,
}

fn require_4x4(matrix: &Matrix, what: &str) -> Result<(), TransformError> {
    if matrix.shape() != (4, 4) {
        return Err(TransformError::InvalidState(format!(
            "transform requires a 4×4 {} matrix, got {}×{}",
            what,
            matrix.rows(),
            matrix.cols()
        )));
    }
    Ok(())
}

impl Transform {
    pub fn identity() -> Self {
        Transform::from_repr(Representation::default())
    }

    fn from_repr(repr: Representation) -> Self {
        Transform {
            repr,
            caches: Caches {
                translate: OnceLock::new(),
                rotate: OnceLock::new(),
                skew: OnceLock::new(),
                scale: OnceLock::new(),
                inverse: OnceLock::new(),
            },
            listener: None,
        }
    }

    pub(crate) fn from_matrix_unchecked(matrix: Matrix) -> Self {
        Transform::from_repr(Representation::MatrixAuthoritative {
            matrix: matrix.into_kind(MatrixKind::General),
            parts: OnceLock::new(),
        })
    }

    pub(crate) fn from_parts_unchecked(parts: SubMatrices) -> Self {
        Transform::from_repr(Representation::PartsAuthoritative {
            parts,
            matrix: OnceLock::new(),
        })
    }

    /// Build from a composite matrix. The sub-matrices are derived on first use.
    ///
    /// Anything but a 4×4 matrix is rejected with `InvalidState`.
    pub fn from_matrix(matrix: Matrix) -> Result<Self, TransformError> {
        require_4x4(&matrix, "composite")?;
        Ok(Transform::from_matrix_unchecked(matrix))
    }

    pub fn from_matrix4(matrix: &Matrix4<Real>) -> Self {
        Transform::from_matrix_unchecked(Matrix::from_matrix4(matrix))
    }

    /// Build from explicit factors; the composite is derived on first use.
    ///
    /// Each factor must be 4×4. They are re-tagged with their role's [`MatrixKind`]
    /// without further validation.
    pub fn from_sub_matrices(
        translate: Matrix,
        rotate: Matrix,
        skew: Matrix,
        scale: Matrix,
    ) -> Result<Self, TransformError> {
        require_4x4(&translate, "translate")?;
        require_4x4(&rotate, "rotate")?;
        require_4x4(&skew, "skew")?;
        require_4x4(&scale, "scale")?;
        Ok(Transform::from_parts_unchecked(SubMatrices {
            translate: translate.into_kind(MatrixKind::Translate),
            rotate: rotate.into_kind(MatrixKind::Rotate),
            skew: skew.into_kind(MatrixKind::General),
            scale: scale.into_kind(MatrixKind::Scale),
        }))
    }

    /// Build from a 2D affine 6-tuple `[a, b, c, d, e, f]` (CSS `matrix()` order):
    /// `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
    pub fn from_2d(m: [Real; 6]) -> Self {
        let [a, b, c, d, e, f] = m;
        Transform::from_matrix_unchecked(Matrix::from_rows([
            [a, c, 0.0, e],
            [b, d, 0.0, f],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// The 2D affine 6-tuple `[a, b, c, d, e, f]` of the XY part.
    pub fn to_2d(&self) -> [Real; 6] {
        let m = self.matrix();
        [m[(0, 0)], m[(1, 0)], m[(0, 1)], m[(1, 1)], m[(0, 3)], m[(1, 3)]]
    }

    /// Bring both representations up to date. A no-op when they already are.
    pub fn reconcile(&self) {
        self.repr.matrix();
        self.repr.parts();
    }

    pub fn is_matrix_latest(&self) -> bool {
        self.repr.is_matrix_latest()
    }

    pub fn is_sub_matrix_latest(&self) -> bool {
        self.repr.is_parts_latest()
    }

    /// The composite 4×4 matrix.
    pub fn matrix(&self) -> &Matrix {
        self.repr.matrix()
    }

    pub fn sub_matrices(&self) -> &SubMatrices {
        self.repr.parts()
    }

    pub fn translate_matrix(&self) -> &Matrix {
        self.sub_matrices().translate()
    }

    pub fn rotate_matrix(&self) -> &Matrix {
        self.sub_matrices().rotate()
    }

    pub fn skew_matrix(&self) -> &Matrix {
        self.sub_matrices().skew()
    }

    pub fn scale_matrix(&self) -> &Matrix {
        self.sub_matrices().scale()
    }

    /// The top three rows of the composite (the 3×4 coordinate-system view).
    pub fn coordinate_system_matrix(&self) -> Matrix {
        self.matrix().resize(3, 4)
    }

    pub fn decompose_translate(&self) -> ColVector3 {
        *self
            .caches
            .translate
            .get_or_init(|| self.sub_matrices().translate.translation_part())
    }

    /// Rotation as Euler angles in radians, ZXY order (see [`Matrix::rotation_euler`]).
    pub fn decompose_rotate(&self) -> ColVector3 {
        *self
            .caches
            .rotate
            .get_or_init(|| decompose::euler_zxy(&self.sub_matrices().rotate))
    }

    pub fn decompose_skew(&self) -> Skew {
        *self
            .caches
            .skew
            .get_or_init(|| decompose::skew_from_matrix(&self.sub_matrices().skew))
    }

    pub fn decompose_scale(&self) -> ColVector3 {
        *self.caches.scale.get_or_init(|| {
            let s = &self.sub_matrices().scale;
            ColVector3::new(s[(0, 0)], s[(1, 1)], s[(2, 2)])
        })
    }

    pub fn decompose(&self) -> Decomposition {
        Decomposition {
            translate: self.decompose_translate(),
            rotate: self.decompose_rotate(),
            skew: self.decompose_skew(),
            scale: self.decompose_scale(),
        }
    }

    /// The inverse transform.
    ///
    /// A singular composite (`|det| <` [`float_accuracy`], e.g. a zero scale) is an
    /// error: callers must guard degenerate shapes before asking. The outcome depends
    /// only on the composite, not on which representation is fresh.
    pub fn inverse(&self) -> Result<Transform, TransformError> {
        self.caches
            .inverse
            .get_or_init(|| self.compute_inverse().map(Box::new))
            .as_deref()
            .cloned()
            .ok_or(TransformError::NotInvertible("transform matrix"))
    }

    fn compute_inverse(&self) -> Option<Transform> {
        let det = self.matrix().determinant()?;
        if det.abs() < float_accuracy() {
            return None;
        }
        if self.is_sub_matrix_latest() {
            if let Some(inverse) = inverse_chain(self.sub_matrices()) {
                return Some(Transform::from_matrix_unchecked(inverse));
            }
        }
        self.matrix()
            .general_inverse()
            .map(Transform::from_matrix_unchecked)
    }

    pub fn transform_point(&self, point: &ColVector3) -> ColVector3 {
        self.matrix().transform_point(point)
    }

    /// Map a direction: the translation column is ignored.
    pub fn transform_vector(&self, vector: &ColVector3) -> ColVector3 {
        self.matrix().transform_vector(vector)
    }

    pub fn transform_points(&self, points: &[ColVector3]) -> Vec<ColVector3> {
        let matrix = self.matrix();

        #[cfg(feature = "parallel")]
        let mapped = points.par_iter().map(|p| matrix.transform_point(p)).collect();

        #[cfg(not(feature = "parallel"))]
        let mapped = points.iter().map(|p| matrix.transform_point(p)).collect();

        mapped
    }

    /// Map a 2D point (z = 0) and drop the z coordinate.
    pub fn compute_coord(&self, x: Real, y: Real) -> (Real, Real) {
        let p = self.transform_point(&ColVector3::new(x, y, 0.0));
        (p.x(), p.y())
    }

    /// Map a 2D point through the inverse transform.
    pub fn inverse_coord(&self, x: Real, y: Real) -> Result<(Real, Real), TransformError> {
        Ok(self.inverse()?.compute_coord(x, y))
    }

    /// Composite matrices equal within [`float_accuracy`].
    pub fn approx_eq(&self, other: &Transform) -> bool {
        self.matrix().approx_eq(other.matrix())
    }

    /// Register the callback fired after every mutating operation, replacing any
    /// previous one. It fires even when the edit leaves the matrix unchanged.
    pub fn on_change(&mut self, listener: impl Fn(&Transform) + Send + Sync + 'static) {
        self.listener = Some(Arc::new(listener));
    }

    pub fn clear_on_change(&mut self) {
        self.listener = None;
    }

    pub(crate) fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener(self);
        }
    }

    fn invalidate(&mut self) {
        self.caches = Caches::default();
    }

    /// Edit the composite. The sub-matrices become stale and the caches are dropped.
    pub(crate) fn edit_matrix<R>(&mut self, edit: impl FnOnce(&mut Matrix) -> R) -> R {
        let mut matrix = std::mem::take(&mut self.repr).into_matrix();
        let out = edit(&mut matrix);
        self.repr = Representation::MatrixAuthoritative {
            matrix,
            parts: OnceLock::new(),
        };
        self.invalidate();
        out
    }

    /// Edit the sub-matrices. The composite becomes stale and the caches are dropped.
    pub(crate) fn edit_parts<R>(&mut self, edit: impl FnOnce(&mut SubMatrices) -> R) -> R {
        let mut parts = std::mem::take(&mut self.repr).into_parts();
        let out = edit(&mut parts);
        self.repr = Representation::PartsAuthoritative {
            parts,
            matrix: OnceLock::new(),
        };
        self.invalidate();
        out
    }

    /// Replace the composite matrix. Anything but 4×4 is rejected.
    pub fn set_matrix(&mut self, matrix: Matrix) -> Result<(), TransformError> {
        require_4x4(&matrix, "composite")?;
        self.edit_matrix(|m| *m = matrix.into_kind(MatrixKind::General));
        self.notify();
        Ok(())
    }

    /// Read a composite element, reconciling first if needed.
    pub(crate) fn element(&self, row: usize, col: usize) -> Real {
        self.matrix()[(row, col)]
    }

    /// Write a composite element; the sub-matrices become stale.
    pub(crate) fn set_element(&mut self, row: usize, col: usize, value: Real) {
        self.edit_matrix(|m| m[(row, col)] = value);
        self.notify();
    }
}

/// `(T·R·K·S)⁻¹ = S⁻¹·K⁻¹·R⁻¹·T⁻¹` through the closed-form inverses.
fn inverse_chain(parts: &SubMatrices) -> Option<Matrix> {
    let inverse = parts
        .scale
        .inverse()?
        .mul_unchecked(&parts.skew.inverse()?)
        .mul_unchecked(&parts.rotate.inverse()?)
        .mul_unchecked(&parts.translate.inverse()?);
    Some(inverse)
}

macro_rules! projective_row_note {
    () => {
        concat!(
            "A bottom row other than `0 0 0 1` makes the matrix projective. The sub-matrices ",
            "only describe the affine part, so the next `Local` edit resets that row."
        )
    };
}

macro_rules! element_accessors {
    ($(($get:ident, $set:ident, $row:literal, $col:literal $(, $note:expr)?)),* $(,)?) => {
        impl Transform {
            $(
                #[doc = concat!("Composite element at row ", $row, ", column ", $col, ".")]
                pub fn $get(&self) -> Real {
                    self.element($row, $col)
                }

                #[doc = concat!(
                    "Overwrite the composite element at row ", $row, ", column ", $col, "."
                )]
                $(
                    #[doc = ""]
                    #[doc = $note]
                )?
                pub fn $set(&mut self, value: Real) {
                    self.set_element($row, $col, value);
                }
            )*
        }
    };
}

element_accessors!(
    (m00, set_m00, 0, 0),
    (m01, set_m01, 0, 1),
    (m02, set_m02, 0, 2),
    (m03, set_m03, 0, 3),
    (m10, set_m10, 1, 0),
    (m11, set_m11, 1, 1),
    (m12, set_m12, 1, 2),
    (m13, set_m13, 1, 3),
    (m20, set_m20, 2, 0),
    (m21, set_m21, 2, 1),
    (m22, set_m22, 2, 2),
    (m23, set_m23, 2, 3),
    (m30, set_m30, 3, 0, projective_row_note!()),
    (m31, set_m31, 3, 1, projective_row_note!()),
    (m32, set_m32, 3, 2, projective_row_note!()),
    (m33, set_m33, 3, 3, projective_row_note!()),
);

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

/// Copies representation and caches. The change listener stays with the original.
impl Clone for Transform {
    fn clone(&self) -> Self {
        Transform {
            repr: self.repr.clone(),
            caches: self.caches.clone(),
            listener: None,
        }
    }
}

impl Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("repr", &self.repr)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

/// `matrix(a, b, c, d, e, f)` when the transform only acts in the XY plane,
/// `matrix3d(...)` (column-major) otherwise.
impl Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.matrix();
        let planar = [(0, 2), (1, 2), (2, 0), (2, 1), (2, 3), (3, 0), (3, 1), (3, 2)]
            .iter()
            .all(|&index| approx_zero(m[index]))
            && approx_equal(m[(2, 2)], 1.0)
            && approx_equal(m[(3, 3)], 1.0);
        if planar {
            let [a, b, c, d, e, g] = self.to_2d();
            return write!(f, "matrix({a}, {b}, {c}, {d}, {e}, {g})");
        }
        write!(f, "matrix3d(")?;
        for col in 0..4 {
            for row in 0..4 {
                if col + row > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", m[(row, col)])?;
            }
        }
        write!(f, ")")
    }
}

/// Exact equality of the composite matrices. Use [`Transform::approx_eq`] for the
/// tolerance-aware comparison.
impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.matrix().as_dmatrix() == other.matrix().as_dmatrix()
    }
}

impl approx::AbsDiffEq for Transform {
    type Epsilon = Real;

    fn default_epsilon() -> Self::Epsilon {
        float_accuracy()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        approx::AbsDiffEq::abs_diff_eq(self.matrix(), other.matrix(), epsilon)
    }
}
