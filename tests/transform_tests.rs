mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::{
    FIXTURE_2D, approx_eq, assert_matrices_close, assert_points_close, sample_matrices, trace_guard,
};
use xformrs::float_types::{FRAC_PI_2, PI, Real};
use xformrs::{
    Axis, ColVector3, Line, Matrix, Plane, SkewAxis, Transform, TransformError, TransformMode,
};

fn sample_point() -> ColVector3 {
    ColVector3::new(3.0, -2.0, 1.5)
}

/// `T · R · K · S` with a non-trivial factor in every slot.
fn layered() -> Transform {
    Transform::from_sub_matrices(
        Matrix::translation(4.0, -1.0, 2.0),
        Matrix::rotation_euler(&ColVector3::new(0.2, 0.5, -0.3)),
        Matrix::shear(SkewAxis::X, 0.25),
        Matrix::scaling(2.0, 0.5, 1.5),
    )
    .unwrap()
}

#[test]
fn fixture_coordinates_round_trip() {
    let _guard = trace_guard();
    let t = Transform::from_2d(FIXTURE_2D);
    let (x, y) = t.compute_coord(100.0, 100.0);
    let (bx, by) = t.inverse_coord(x, y).unwrap();
    assert!((bx - 100.0).abs() < 1e-7 && (by - 100.0).abs() < 1e-7, "({bx}, {by})");
    assert_eq!(t.to_2d(), FIXTURE_2D);
}

#[test]
fn inverse_of_translate_rotate_scale() {
    let mut t = Transform::identity();
    t.scale(&ColVector3::new(0.1, 0.2, 1.0), TransformMode::Global);
    t.rotate_z(FRAC_PI_2, TransformMode::Global);
    t.translate(&ColVector3::new(100.0, 50.0, 0.0), TransformMode::Global);

    let inverse = t.inverse().unwrap();
    let product = t.matrix().product(inverse.matrix()).unwrap();
    assert_matrices_close(&product, &Matrix::identity(4), 1e-9);

    // the cached inverse is reused until the next edit
    assert!(t.inverse().unwrap().approx_eq(&inverse));
    t.translate_x(1.0, TransformMode::Global);
    assert!(!t.inverse().unwrap().approx_eq(&inverse));
}

#[test]
fn inverse_of_sub_matrix_form_matches_composite() {
    let t = layered();
    assert!(!t.is_matrix_latest());
    let inverse = t.inverse().unwrap();
    assert_matrices_close(
        &inverse.matrix().product(t.matrix()).unwrap(),
        &Matrix::identity(4),
        1e-9,
    );
}

#[test]
fn singular_transform_is_not_invertible() {
    let mut t = Transform::identity();
    t.scale(&ColVector3::new(0.0, 1.0, 1.0), TransformMode::Local);
    assert_eq!(
        t.inverse().unwrap_err(),
        TransformError::NotInvertible("transform matrix")
    );
    assert!(t.inverse_coord(1.0, 1.0).is_err());
}

#[test]
fn decompose_then_recompose_is_stable() {
    let _guard = trace_guard();
    for m in sample_matrices() {
        let t = Transform::from_matrix(m.clone()).unwrap();
        let parts = t.sub_matrices();
        let rebuilt = Transform::from_sub_matrices(
            parts.translate().clone(),
            parts.rotate().clone(),
            parts.skew().clone(),
            parts.scale().clone(),
        )
        .unwrap();
        assert_matrices_close(rebuilt.matrix(), &m, 1e-9);

        // decomposing the recomposition gives the same factors back
        let again = Transform::from_matrix(rebuilt.matrix().clone()).unwrap();
        assert_matrices_close(again.rotate_matrix(), parts.rotate(), 1e-9);
        assert_matrices_close(again.scale_matrix(), parts.scale(), 1e-9);
    }
}

#[test]
fn decomposition_reads_back_inputs() {
    let mut t = Transform::identity();
    t.set_scale(&ColVector3::new(2.0, 3.0, 4.0));
    t.set_rotation(&ColVector3::new(0.1, 0.2, 0.3));
    t.set_translate(&ColVector3::new(-5.0, 6.0, 7.0));

    let d = t.decompose();
    assert_points_close(&d.translate, &ColVector3::new(-5.0, 6.0, 7.0), 1e-9);
    assert_points_close(&d.rotate, &ColVector3::new(0.1, 0.2, 0.3), 1e-9);
    assert_points_close(&d.scale, &ColVector3::new(2.0, 3.0, 4.0), 1e-9);
    assert!(d.skew.x.is_zero() && d.skew.y.is_zero() && d.skew.z.is_zero());

    // the same values come back after a round trip through the composite only
    let from_matrix = Transform::from_matrix(t.matrix().clone()).unwrap();
    assert_points_close(&from_matrix.decompose_rotate(), &d.rotate, 1e-9);
    assert_points_close(&from_matrix.decompose_scale(), &d.scale, 1e-9);
}

#[test]
fn skew_is_reported_about_z() {
    let mut t = Transform::identity();
    t.skew(SkewAxis::X, 0.3, TransformMode::Local);
    let skew = t.decompose_skew();
    assert!((skew.y.angle + 0.3).abs() < 1e-9, "{}", skew.y.angle);
    assert!(skew.y.axis.approx_eq(&ColVector3::axis(Axis::Z)));
}

#[test]
fn mirrored_matrix_decomposes_with_negative_y_scale() {
    let t = Transform::from_2d(FIXTURE_2D);
    let scale = t.decompose_scale();
    assert!(scale.y() < 0.0);
    let rotate = t.rotate_matrix();
    assert!((rotate.determinant().unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn local_and_global_agree_without_translation() {
    let base = Transform::from_sub_matrices(
        Matrix::identity(4),
        Matrix::rotation_x(0.4),
        Matrix::shear(SkewAxis::Y, 0.1),
        Matrix::scaling(1.0, 2.0, 3.0),
    )
    .unwrap();
    let axis = ColVector3::new(1.0, 2.0, -1.0);

    let mut global = base.clone();
    global.rotate(&axis, 0.7, TransformMode::Global).unwrap();
    let mut local = base.clone();
    local.rotate(&axis, 0.7, TransformMode::Local).unwrap();
    assert_matrices_close(global.matrix(), local.matrix(), 1e-9);

    let offset = ColVector3::new(1.0, -1.0, 2.0);
    let mut global = layered();
    global.translate(&offset, TransformMode::Global);
    let mut local = layered();
    local.translate(&offset, TransformMode::Local);
    assert_matrices_close(global.matrix(), local.matrix(), 1e-9);
}

#[test]
fn local_pivots_stay_fixed() {
    let pivot = sample_point();
    let before = layered().transform_point(&pivot);

    let mut rotated = layered();
    rotated
        .rotate_at(&ColVector3::new(0.0, 1.0, 1.0), 1.2, &pivot, TransformMode::Local)
        .unwrap();
    let mut scaled = layered();
    scaled.scale_at(&ColVector3::new(3.0, 0.5, 2.0), &pivot, TransformMode::Local);
    let mut skewed = layered();
    skewed.skew_at(SkewAxis::Y, 0.4, &pivot, TransformMode::Local);

    for t in [&rotated, &scaled, &skewed] {
        assert_points_close(&t.transform_point(&pivot), &before, 1e-9);
        assert!(!t.approx_eq(&layered()));
    }
}

#[test]
fn global_pivots_stay_fixed() {
    let pivot = sample_point();
    let base = layered();
    // the local point that currently lands on the pivot
    let preimage = base.inverse().unwrap().transform_point(&pivot);

    let mut rotated = base.clone();
    rotated
        .rotate_at(&ColVector3::axis(Axis::Z), -0.6, &pivot, TransformMode::Global)
        .unwrap();
    let mut scaled = base.clone();
    scaled.scale_at(&ColVector3::new(2.0, 2.0, 0.5), &pivot, TransformMode::Global);
    let mut skewed = base.clone();
    skewed.skew_at(SkewAxis::X, -0.2, &pivot, TransformMode::Global);

    for t in [&rotated, &scaled, &skewed] {
        assert_points_close(&t.transform_point(&preimage), &pivot, 1e-9);
    }
}

#[test]
fn quarter_turn_maps_x_to_y() {
    let mut t = Transform::identity();
    t.rotate(&ColVector3::axis(Axis::Z), FRAC_PI_2, TransformMode::Global)
        .unwrap();
    let (x, y) = t.compute_coord(10.0, 0.0);
    assert!(x.abs() < 1e-9 && (y - 10.0).abs() < 1e-9, "({x}, {y})");
}

#[test]
fn flipping_twice_restores() {
    let plane = Plane::from_point_normal(
        &ColVector3::new(1.0, 2.0, 0.0),
        &ColVector3::new(1.0, -1.0, 0.5),
    )
    .unwrap();
    let base = layered();
    let mut t = base.clone();
    t.flip(&plane).unwrap();

    let on_plane = plane.project_point(&ColVector3::new(5.0, 5.0, 5.0));
    let preimage = base.inverse().unwrap().transform_point(&on_plane);
    assert_points_close(&t.transform_point(&preimage), &on_plane, 1e-9);
    assert!(!t.approx_eq(&base));

    t.flip(&plane).unwrap();
    assert_matrices_close(t.matrix(), base.matrix(), 1e-9);
}

#[test]
fn rotation_about_line_matches_pivot_rotation() {
    let point = ColVector3::new(1.0, -2.0, 3.0);
    let direction = ColVector3::new(0.3, 0.4, -1.0);
    let line = Line::from_direction_point(&direction, &point).unwrap();

    let mut about_line = layered();
    about_line.rotate_about_line(&line, 0.9).unwrap();
    let mut about_pivot = layered();
    about_pivot
        .rotate_at(&direction, 0.9, &point, TransformMode::Global)
        .unwrap();
    assert_matrices_close(about_line.matrix(), about_pivot.matrix(), 1e-9);

    // a line pointing down -Z takes the antiparallel frame path
    let down = Line::from_direction_point(
        &ColVector3::new(0.0, 0.0, -1.0),
        &ColVector3::new(1.0, 0.0, 0.0),
    )
    .unwrap();
    let mut t = Transform::identity();
    t.rotate_about_line(&down, PI).unwrap();
    assert_points_close(
        &t.transform_point(&ColVector3::zeros()),
        &ColVector3::new(2.0, 0.0, 0.0),
        1e-9,
    );
}

#[test]
fn pre_composition_applies_first() {
    let mut t = Transform::identity();
    t.rotate_z(FRAC_PI_2, TransformMode::Global);
    t.pre_translate(&ColVector3::new(1.0, 0.0, 0.0));
    assert_points_close(
        &t.transform_point(&ColVector3::zeros()),
        &ColVector3::new(0.0, 1.0, 0.0),
        1e-9,
    );

    let mut shift = Transform::identity();
    shift.translate_y(5.0, TransformMode::Global);
    let mut after = t.clone();
    after.add_transform(&shift);
    let mut before = t.clone();
    before.pre_transform(&shift);
    assert_points_close(
        &after.transform_point(&ColVector3::zeros()),
        &ColVector3::new(0.0, 6.0, 0.0),
        1e-9,
    );
    assert_points_close(
        &before.transform_point(&ColVector3::zeros()),
        &ColVector3::new(-5.0, 1.0, 0.0),
        1e-9,
    );
}

#[test]
fn listener_fires_once_per_operation() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut t = Transform::identity();
    let seen = Arc::clone(&count);
    t.on_change(move |transform| {
        // the listener sees the edited state
        assert!(transform.is_matrix_latest() || transform.is_sub_matrix_latest());
        seen.fetch_add(1, Ordering::SeqCst);
    });

    t.translate(&ColVector3::new(1.0, 2.0, 3.0), TransformMode::Local);
    t.rotate_at(&ColVector3::axis(Axis::X), 0.3, &sample_point(), TransformMode::Global)
        .unwrap();
    t.scale_at(&ColVector3::new(2.0, 2.0, 2.0), &sample_point(), TransformMode::Local);
    t.skew(SkewAxis::Y, 0.1, TransformMode::Global);
    t.set_matrix(Matrix::identity(4)).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 5);

    // failed edits and clones do not notify
    assert!(t.set_matrix(Matrix::identity(3)).is_err());
    let mut copy = t.clone();
    copy.translate_x(1.0, TransformMode::Global);
    assert_eq!(count.load(Ordering::SeqCst), 5);
}

#[test]
fn construction_requires_4x4() {
    assert!(matches!(
        Transform::from_matrix(Matrix::identity(3)),
        Err(TransformError::InvalidState(_))
    ));
    assert!(
        Transform::from_sub_matrices(
            Matrix::identity(4),
            Matrix::identity(3),
            Matrix::identity(4),
            Matrix::identity(4)
        )
        .is_err()
    );
}

#[test]
fn freshness_follows_edits() {
    let mut t = Transform::identity();
    t.translate_x(2.0, TransformMode::Global);
    assert!(t.is_matrix_latest() && !t.is_sub_matrix_latest());
    t.reconcile();
    assert!(t.is_matrix_latest() && t.is_sub_matrix_latest());
    t.rotate_y(0.5, TransformMode::Local);
    assert!(!t.is_matrix_latest() && t.is_sub_matrix_latest());
    assert_eq!(t.m03(), 2.0);
    assert!(t.is_matrix_latest());
}

#[test]
fn element_accessors() {
    let mut t = Transform::identity();
    t.set_m13(4.0);
    t.set_m00(2.0);
    assert_eq!(t.m13(), 4.0);
    assert_eq!(t.m00(), 2.0);
    assert_points_close(&t.decompose_translate(), &ColVector3::new(0.0, 4.0, 0.0), 1e-12);
    assert_eq!(t.coordinate_system_matrix().shape(), (3, 4));
}

#[test]
fn display_uses_css_notation() {
    let mut t = Transform::identity();
    t.translate_x(5.0, TransformMode::Global);
    assert_eq!(t.to_string(), "matrix(1, 0, 0, 1, 5, 0)");

    let mut t = Transform::identity();
    t.translate_z(2.0, TransformMode::Global);
    assert_eq!(
        t.to_string(),
        "matrix3d(1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 2, 1)"
    );
}

#[test]
fn frame_changes() {
    let t = Transform::from_vector_to_vector(
        &ColVector3::axis(Axis::X),
        &ColVector3::new(0.0, 3.0, 0.0),
    )
    .unwrap();
    assert_points_close(
        &t.transform_vector(&ColVector3::axis(Axis::X)),
        &ColVector3::axis(Axis::Y),
        1e-9,
    );
    assert!(matches!(
        Transform::from_vector_to_vector(&ColVector3::zeros(), &ColVector3::axis(Axis::X)),
        Err(TransformError::DegenerateInput(_))
    ));
}

#[test]
fn batch_mapping_matches_single_points() {
    let t = layered();
    let points: Vec<ColVector3> = (0..32)
        .map(|i| {
            let r = i as Real;
            ColVector3::new(r, 2.0 * r, -r)
        })
        .collect();
    let mapped = t.transform_points(&points);
    for (p, q) in points.iter().zip(&mapped) {
        assert_points_close(q, &t.transform_point(p), 1e-12);
    }
}

fn assert_decompositions_close(actual: &Transform, expected: &Transform) {
    let (a, e) = (actual.decompose(), expected.decompose());
    assert_points_close(&a.translate, &e.translate, 1e-9);
    assert_points_close(&a.rotate, &e.rotate, 1e-9);
    assert_points_close(&a.scale, &e.scale, 1e-9);
    for (a, e) in [(a.skew.x, e.skew.x), (a.skew.y, e.skew.y), (a.skew.z, e.skew.z)] {
        assert!(
            (a.angle - e.angle).abs() < 1e-9,
            "skew angle {} vs {}",
            a.angle,
            e.angle
        );
        if !e.is_zero() {
            assert_points_close(&a.axis, &e.axis, 1e-9);
        }
    }
}

#[test]
fn local_skew_keeps_the_decomposed_form() {
    let mut t = Transform::identity();
    t.skew(SkewAxis::Y, 0.3, TransformMode::Local);
    t.scale(&ColVector3::new(2.0, 3.0, 1.0), TransformMode::Local);
    assert!(t.is_sub_matrix_latest() && !t.is_matrix_latest());

    let skew = t.skew_matrix();
    for col in 0..3 {
        assert!(approx_eq(skew.column3(col).norm(), 1.0, 1e-9), "column {col}");
    }
    assert_points_close(&skew.column3(0), &ColVector3::axis(Axis::X), 1e-9);
    assert!(t.decompose_skew().x.is_zero());

    let from_matrix = Transform::from_matrix(t.matrix().clone()).unwrap();
    assert_decompositions_close(&t, &from_matrix);

    // same result when the skew is applied on top of every other factor
    let mut layered_skew = layered();
    layered_skew.skew(SkewAxis::X, -0.4, TransformMode::Local);
    layered_skew.skew(SkewAxis::Y, 0.2, TransformMode::Local);
    let from_matrix = Transform::from_matrix(layered_skew.matrix().clone()).unwrap();
    assert_decompositions_close(&from_matrix, &layered_skew);
}

#[test]
fn local_skew_composes_into_skew_times_scale() {
    let base = layered();
    let mut t = base.clone();
    t.skew(SkewAxis::Y, 0.35, TransformMode::Local);

    let parts = base.sub_matrices();
    let expected = parts
        .translate()
        .product(parts.rotate())
        .unwrap()
        .product(&Matrix::shear(SkewAxis::Y, 0.35))
        .unwrap()
        .product(parts.skew())
        .unwrap()
        .product(parts.scale())
        .unwrap();
    assert_matrices_close(t.matrix(), &expected, 1e-9);
}

#[test]
fn invertibility_does_not_depend_on_freshness() {
    let tiny = Matrix::scaling(1e-3, 1e-3, 1e-3);

    let cold = Transform::from_matrix(tiny.clone()).unwrap();
    let warm = Transform::from_matrix(tiny.clone()).unwrap();
    warm.reconcile();
    let from_parts = Transform::from_sub_matrices(
        Matrix::identity(4),
        Matrix::identity(4),
        Matrix::identity(4),
        tiny,
    )
    .unwrap();
    for t in [&cold, &warm, &from_parts] {
        assert!(matches!(t.inverse(), Err(TransformError::NotInvertible(_))));
    }

    let small = Matrix::scaling(0.01, 0.1, 1.0);
    let cold = Transform::from_matrix(small.clone()).unwrap();
    let warm = Transform::from_matrix(small).unwrap();
    warm.reconcile();
    assert_matrices_close(
        cold.inverse().unwrap().matrix(),
        warm.inverse().unwrap().matrix(),
        1e-9,
    );
    assert!(approx_eq(cold.inverse().unwrap().m00(), 100.0, 1e-9));
}

#[test]
fn projective_row_is_dropped_by_local_edits() {
    let mut t = Transform::identity();
    t.translate_x(2.0, TransformMode::Global);
    t.set_m32(0.5);
    assert_eq!(t.m32(), 0.5);
    assert!(t.sub_matrices().rotate().approx_eq(&Matrix::identity(4)));

    t.rotate_z(0.0, TransformMode::Local);
    assert_eq!(t.m32(), 0.0);
    assert_eq!(t.m33(), 1.0);
    assert_eq!(t.m03(), 2.0);
}

#[test]
fn transforms_compare_through_the_composite() {
    let mut by_parts = Transform::identity();
    by_parts.set_translate(&ColVector3::new(1.0, 2.0, 3.0));
    let by_matrix = Transform::from_matrix(Matrix::translation(1.0, 2.0, 3.0)).unwrap();
    assert_eq!(by_parts, by_matrix);
    approx::assert_abs_diff_eq!(by_parts, by_matrix);

    let mut nudged = by_matrix.clone();
    nudged.translate_x(1e-3, TransformMode::Global);
    assert_ne!(nudged, by_matrix);
    approx::assert_abs_diff_ne!(nudged, by_matrix);
}
