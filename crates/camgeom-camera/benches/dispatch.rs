use camgeom_camera::{
    Camera, CameraSys, CameraSysPrefix, Detector, DetectorCollection, DetectorParams, DetectorType,
    Orientation, PlaneTransform, Point2, TransformMap,
};
use camgeom_core::{Box2I, RadialMap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A 13x13 grid of 4k x 4k detectors, 10 um pixels, 42 mm pitch.
fn grid_camera() -> Camera {
    let mut detectors = Vec::new();
    for row in 0..13 {
        for col in 0..13 {
            let params = DetectorParams {
                name: format!("R{row:02}C{col:02}"),
                id: row * 13 + col,
                kind: DetectorType::Science,
                serial: String::new(),
                bbox: Box2I::from_dimensions([0, 0], 4000, 4000),
                pixel_size: [0.01, 0.01],
                orientation: Orientation {
                    fp_position: [(col - 6) as f64 * 42.0, (row - 6) as f64 * 42.0],
                    ref_point: [1999.5, 1999.5],
                    yaw: 0.001 * (row - col) as f64,
                    ..Orientation::default()
                },
            };
            detectors.push(Detector::new(params, CameraSys::focal_plane(), []).expect("detector"));
        }
    }
    let radial = RadialMap::new(vec![0.0, 1.0 / 3600.0, 0.0, 1e-12]).expect("radial");
    let transforms = TransformMap::new(
        CameraSys::focal_plane(),
        [(CameraSys::pupil(), PlaneTransform::Radial(radial))],
    )
    .expect("registry");
    Camera::new(
        "grid",
        DetectorCollection::new(detectors).expect("collection"),
        transforms,
    )
    .expect("camera")
}

fn bench_dispatch(c: &mut Criterion) {
    let cam = grid_camera();
    let fp = cam
        .make_camera_point(Point2::new(101.3, -57.9), CameraSys::focal_plane())
        .expect("point");
    let pupil = cam.transform(&fp, CameraSys::pupil()).expect("pupil");

    c.bench_function("find_detectors_169", |b| {
        b.iter(|| cam.find_detectors(black_box(&fp)).expect("find"))
    });
    c.bench_function("pupil_to_pixels_prefix", |b| {
        b.iter(|| {
            cam.transform(black_box(&pupil), CameraSysPrefix::pixels())
                .expect("transform")
        })
    });
    c.bench_function("fp_to_pupil", |b| {
        b.iter(|| cam.transform(black_box(&fp), CameraSys::pupil()).expect("transform"))
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
