//! A **3D affine transform kernel**: homogeneous 4×4 matrices, a [`Transform`] that
//! keeps a composite matrix and its `translate · rotate · skew · scale` factors in sync,
//! and the [`Line`]/[`Plane`] primitives used to build frame changes and reflections.
//!
//! Angles are radians. Rotations follow the right-hand rule: a positive angle about
//! `+Z` turns `+X` toward `+Y`. Euler angles are applied in ZXY order.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for [`Transform::transform_points`]

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod line;
pub mod matrix;
pub mod plane;
pub mod traits;
pub mod transform;

#[cfg(any(
    all(feature = "f64", feature = "f32"),
    not(any(feature = "f64", feature = "f32"))
))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::TransformError;
pub use line::{Line, LineThroughOrigin};
pub use matrix::{Axis, ColVector3, Matrix, MatrixKind, SkewAxis};
pub use plane::{Plane, PlaneThroughOrigin};
pub use traits::Transformable;
pub use transform::{AxisAngle, Decomposition, Skew, SubMatrices, Transform, TransformMode};
