use faceswap::error::{BlendError, Error, GeometryError, InputError, SkipReason};
use faceswap::mask::Mask;
use faceswap::triangulation::{Mesh, Triangle};
use faceswap::{FaceSwapConfig, FaceSwapProcessor, Photo, PointSet};

fn uniform(width: usize, height: usize, rgba: [u8; 4]) -> Photo {
    Photo::from_fn(width, height, |_, _| rgba)
}

fn textured(width: usize, height: usize) -> Photo {
    Photo::from_fn(width, height, |x, y| {
        [
            (40 + (x * 3 + y * 2) % 150) as u8,
            (60 + (x * y) % 120) as u8,
            (30 + (x + 4 * y) % 170) as u8,
            255,
        ]
    })
}

fn processor(source: Photo, destination: Photo) -> FaceSwapProcessor {
    FaceSwapProcessor::new(source, destination, FaceSwapConfig::default()).unwrap()
}

fn mean_abs_diff(a: &Photo, b: &Photo) -> f64 {
    let total: u64 = a
        .img_data
        .iter()
        .zip(&b.img_data)
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
        .sum();
    total as f64 / a.img_data.len() as f64
}

#[test]
fn uniform_square_is_left_exactly_unchanged() {
    let photo = uniform(10, 10, [90, 140, 200, 255]);
    let points = PointSet::from(vec![(0, 0), (10, 0), (10, 10), (0, 10)]);
    let report = processor(photo.clone(), photo.clone()).run(&points, &points).unwrap();
    assert_eq!(report.hull_size, 4);
    assert_eq!(report.triangle_count, 2);
    assert_eq!(report.output, photo);
}

#[test]
fn swapping_a_photo_with_itself_is_a_no_op() {
    let photo = textured(48, 48);
    let points = PointSet::from(vec![(5, 5), (40, 6), (42, 38), (20, 44), (6, 30), (22, 22), (30, 15)]);
    let report = processor(photo.clone(), photo.clone()).run(&points, &points).unwrap();
    assert!(report.skipped.is_empty());
    assert!(mean_abs_diff(&report.output, &photo) < 1.0);
}

#[test]
fn two_landmarks_are_a_geometry_error() {
    let photo = textured(16, 16);
    let points = PointSet::from(vec![(2, 2), (12, 12)]);
    match processor(photo.clone(), photo).run(&points, &points) {
        Err(Error::Geometry(GeometryError::DegenerateHull { points })) => assert_eq!(points, 2),
        other => panic!("expected a degenerate hull, got {other:?}"),
    }
}

#[test]
fn collinear_landmarks_are_a_geometry_error() {
    let photo = textured(16, 16);
    let points = PointSet::from(vec![(1, 1), (5, 5), (9, 9), (13, 13)]);
    assert!(matches!(
        processor(photo.clone(), photo).run(&points, &points),
        Err(Error::Geometry(GeometryError::DegenerateHull { .. }))
    ));
}

#[test]
fn landmarks_outside_the_photo_leave_an_empty_mesh() {
    let photo = textured(16, 16);
    let points = PointSet::from(vec![(100, 100), (140, 100), (120, 130)]);
    assert!(matches!(
        processor(photo.clone(), photo).run(&points, &points),
        Err(Error::Geometry(GeometryError::EmptyMesh { hull_points: 3 }))
    ));
}

#[test]
fn point_count_mismatch_is_an_input_error() {
    let photo = textured(16, 16);
    let source = PointSet::from(vec![(1, 1), (12, 2), (6, 12)]);
    let destination = PointSet::from(vec![(1, 1), (12, 2), (6, 12), (8, 8)]);
    assert!(matches!(
        processor(photo.clone(), photo).run(&source, &destination),
        Err(Error::Input(InputError::PointCountMismatch { .. }))
    ));
}

#[test]
fn missing_point_file_names_the_path() {
    let path = std::env::temp_dir().join("faceswap-no-such-landmarks.txt");
    let err = PointSet::read_from_file(&path).unwrap_err();
    assert!(matches!(err, InputError::Io { .. }));
    assert!(err.to_string().contains("faceswap-no-such-landmarks.txt"));
}

#[test]
fn point_file_is_read_from_disk() {
    let path = std::env::temp_dir().join(format!("faceswap-landmarks-{}.txt", std::process::id()));
    std::fs::write(&path, "1 2\n3 4\n\n5 6\n").unwrap();
    let set = PointSet::read_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!((set[2].x, set[2].y), (5.0, 6.0));
}

#[test]
fn zero_area_triangle_is_skipped_and_the_rest_composites() {
    let source = uniform(20, 20, [200, 200, 200, 255]);
    let destination = uniform(20, 20, [20, 20, 20, 255]);
    let swap = processor(source, destination.clone());
    let points = PointSet::from(vec![(2, 2), (17, 2), (2, 17), (5, 5), (8, 8), (11, 11)]);
    let mesh = Mesh::new(vec![Triangle::new(0, 1, 2), Triangle::new(3, 4, 5)]);

    let (warped, skipped) = swap.composite(&mesh, &points, &points);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].landmarks, vec![3, 4, 5]);
    assert!(matches!(skipped[0].reason, SkipReason::Degenerate { .. }));

    let face = Photo::from_raster(&warped);
    assert_eq!(face.get_rgba(4, 4), [200, 200, 200, 255]);
    assert_eq!(face.get_rgba(15, 15), [20, 20, 20, 255]);

    let hull = swap.select_hull(&points).unwrap();
    let blended = Photo::from_raster(&swap.blend(&warped, &hull, &points).unwrap());
    assert_eq!(blended.get_rgba(18, 18), destination.get_rgba(18, 18));
}

#[test]
fn source_detail_is_carried_and_the_outside_is_untouched() {
    // Vertical stripes, period 6, on the source; flat grey on the destination.
    let source = Photo::from_fn(32, 32, |x, _| {
        let v = if (x / 3) % 2 == 0 { 40 } else { 200 };
        [v, v, v, 255]
    });
    let destination = uniform(32, 32, [120, 120, 120, 255]);
    let points = PointSet::from(vec![(4, 4), (28, 4), (28, 28), (4, 28)]);
    let report = processor(source, destination.clone()).run(&points, &points).unwrap();

    let mask = Mask::fill_convex_polygon(32, 32, points.points());
    for y in 0..32 {
        for x in 0..32 {
            if mask.get(x, y) == 0.0 {
                assert_eq!(report.output.get_rgba(x, y), destination.get_rgba(x, y));
            }
        }
    }
    let bright = report.output.get_rgba(15, 16)[0] as i32;
    let dark = report.output.get_rgba(18, 16)[0] as i32;
    assert!(bright - dark > 100, "stripe contrast lost: {bright} vs {dark}");
}

#[test]
fn face_moves_between_different_outlines() {
    let source = textured(40, 40);
    let destination = uniform(40, 40, [100, 100, 100, 255]);
    let source_points = PointSet::from(vec![(2, 2), (18, 2), (18, 18), (2, 18), (10, 10)]);
    let destination_points = PointSet::from(vec![(10, 10), (34, 12), (32, 34), (12, 32), (22, 22)]);
    let report = processor(source, destination.clone())
        .run(&source_points, &destination_points)
        .unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(report.output.get_rgba(2, 38), destination.get_rgba(2, 38));
    assert_ne!(report.output, destination);
}

#[test]
fn exhausted_solver_budget_is_a_blend_error() {
    let source = textured(24, 24);
    let destination = uniform(24, 24, [10, 10, 10, 255]);
    let config = FaceSwapConfig::default().with_max_iterations(1).with_tolerance(1e-12);
    let swap = FaceSwapProcessor::new(source, destination, config).unwrap();
    let points = PointSet::from(vec![(3, 3), (20, 3), (20, 20), (3, 20)]);
    assert!(matches!(
        swap.run(&points, &points),
        Err(Error::Blend(BlendError::NotConverged { iterations: 1, .. }))
    ));
}

#[test]
fn flat_face_leaves_no_seam_in_a_flat_destination() {
    let source = uniform(40, 40, [200, 200, 200, 255]);
    let destination = uniform(40, 40, [20, 20, 20, 255]);
    let points = PointSet::from(vec![(8, 8), (32, 8), (32, 32), (8, 32)]);
    let report = processor(source, destination.clone()).run(&points, &points).unwrap();
    for (x, y) in [(20, 20), (9, 20), (8, 8), (31, 25), (7, 20)] {
        let [r, g, b, _] = report.output.get_rgba(x, y);
        for v in [r, g, b] {
            assert!(v.abs_diff(20) <= 1, "seam at ({x}, {y}): {v}");
        }
    }
    assert!(mean_abs_diff(&report.output, &destination) < 0.5);
}

#[test]
fn far_outlier_landmarks_are_skipped_not_fatal() {
    let photo = textured(40, 40);
    let points = PointSet::from(vec![
        (5, 5),
        (30, 5),
        (30, 30),
        (5, 30),
        (-2_000_000_000, 20),
        (2_000_000_000, 20),
    ]);
    let report = processor(photo.clone(), photo.clone()).run(&points, &points).unwrap();
    assert_eq!(report.hull_size, 6);
    assert_eq!(report.triangle_count, 2);
    assert!(!report.skipped.is_empty());
    for skip in &report.skipped {
        assert_eq!(skip.reason, SkipReason::OutsideBounds);
        assert!(skip.landmarks.contains(&4) || skip.landmarks.contains(&5));
    }
    assert!(mean_abs_diff(&report.output, &photo) < 1.0);
}
