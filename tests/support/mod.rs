//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;
use xformrs::{Axis, ColVector3, Matrix, SkewAxis, float_types::Real};

/// Route `tracing` output to the test harness for the lifetime of the guard.
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=xformrs=trace`.
pub fn trace_guard() -> tracing::subscriber::DefaultGuard {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .finish()
        .set_default()
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

pub fn assert_points_close(actual: &ColVector3, expected: &ColVector3, eps: Real) {
    assert!(
        (*actual - *expected).norm() < eps,
        "expected {expected}, got {actual}"
    );
}

pub fn assert_matrices_close(actual: &Matrix, expected: &Matrix, eps: Real) {
    assert_eq!(actual.shape(), expected.shape());
    for row in 0..actual.rows() {
        for col in 0..actual.cols() {
            assert!(
                approx_eq(actual[(row, col)], expected[(row, col)], eps),
                "element ({row}, {col}) differs\nexpected\n{expected}\ngot\n{actual}"
            );
        }
    }
}

/// The 2D affine fixture `[a, b, c, d, e, f]`: a reflection combined with a small
/// rotation and a large offset.
pub const FIXTURE_2D: [Real; 6] = [
    -0.9848077530122080,
    0.1736481776669303,
    0.1736481776669303,
    0.9848077530122080,
    1010.5809781340822,
    150.9268434975672,
];

/// A spread of invertible affine matrices: rigid, scaled, sheared, mirrored.
pub fn sample_matrices() -> Vec<Matrix> {
    let euler = ColVector3::new(0.3, -0.7, 1.1);
    let trs = Matrix::translation(100.0, 50.0, -3.0)
        .product(&Matrix::rotation_euler(&euler))
        .and_then(|m| m.product(&Matrix::scaling(0.1, 0.2, 4.0)))
        .unwrap();
    let sheared = Matrix::rotation_x(0.2)
        .product(&Matrix::shear(SkewAxis::Y, -0.4))
        .and_then(|m| m.product(&Matrix::scaling(2.0, 3.0, 1.5)))
        .unwrap();
    let mirrored = Matrix::mirror(Axis::Z)
        .product(&Matrix::rotation_y(0.9))
        .unwrap();
    let leaning = Matrix::from_rows([
        [1.0, 0.2, 0.3, 4.0],
        [0.0, 1.0, -0.2, -2.0],
        [0.1, 0.0, 1.0, 1.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    let [a, b, c, d, e, f] = FIXTURE_2D;
    let fixture = Matrix::from_rows([
        [a, c, 0.0, e],
        [b, d, 0.0, f],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    vec![Matrix::identity(4), trs, sheared, mirrored, leaning, fixture]
}
