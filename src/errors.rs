//! Transform kernel errors

use std::fmt::Display;

/// All the contract violations the kernel reports.
///
/// Geometric "no result" outcomes (parallel lines, singular `Matrix` inverse) are
/// modelled as `Option` at the call site instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// (DimensionMismatch) Two matrices (or a matrix and its backing data) have incompatible shapes
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// (NotInvertible) A transform or sub-matrix that must be inverted is singular
    NotInvertible(&'static str),
    /// (DegenerateInput) A zero-length direction or collinear points where a frame is required
    DegenerateInput(&'static str),
    /// (InvalidState) A transform was built from something other than a 4×4 matrix
    InvalidState(String),
}

impl Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::DimensionMismatch { op, left, right } => write!(
                f,
                "(DimensionMismatch) {} cannot combine a {}×{} with a {}×{}",
                op, left.0, left.1, right.0, right.1
            ),
            TransformError::NotInvertible(what) => {
                write!(f, "(NotInvertible) {} is not invertible", what)
            },
            TransformError::DegenerateInput(what) => write!(f, "(DegenerateInput) {}", what),
            TransformError::InvalidState(what) => write!(f, "(InvalidState) {}", what),
        }
    }
}

// Transform::from_matrix / from_sub_matrices / set_matrix
//     "transform requires a 4×4 {what} matrix, got {r}×{c}"
// Transform::inverse "transform matrix"
// ColVector3::normalize "cannot normalize a zero-length vector"
// Line::from_points "a line needs two distinct points"
// Plane::from_points "points are collinear"
// PlaneThroughOrigin::from_vectors "spanning vectors are parallel"
// Transform::from_vector_to_vector "from_vector_to_vector requires non-zero vectors"
