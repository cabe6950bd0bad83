use approx::assert_abs_diff_eq;
use camgeom_camera::{
    Camera, CameraConfig, CameraError, CameraSys, CameraSysPrefix, DetectorType, Point2, SysRef,
    PIXELS, TAN_PIXELS,
};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

fn testdata_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata")
        .join(name)
}

fn camera() -> Camera {
    CameraConfig::load_json(testdata_path("two_detector_camera.json"))
        .expect("load config")
        .build_camera()
        .expect("build camera")
}

fn pixels(det: &str) -> CameraSys {
    CameraSys::with_detector(PIXELS, det)
}

#[test]
fn pixel_in_a_resolves_to_a() {
    let cam = camera();
    let p = cam
        .make_camera_point(Point2::new(5.0, 5.0), pixels("A"))
        .expect("point");
    let out = cam.transform(&p, CameraSysPrefix::pixels()).expect("transform");
    assert_eq!(out.sys(), &pixels("A"));
    assert_abs_diff_eq!(out.point().x, 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(out.point().y, 5.0, epsilon = 1e-12);
}

#[test]
fn far_native_point_finds_no_detector() {
    let cam = camera();
    let p = cam
        .make_camera_point(Point2::new(-500.0, 400.0), CameraSys::focal_plane())
        .expect("point");
    assert!(cam.find_detectors(&p).expect("find").is_empty());
    match cam.transform(&p, CameraSysPrefix::pixels()) {
        Err(CameraError::NoDetectors { point }) => {
            assert_eq!(point.sys(), &CameraSys::focal_plane());
        }
        other => panic!("expected NoDetectors, got {other:?}"),
    }
}

#[test]
fn find_detectors_reports_the_covering_detector() {
    let cam = camera();
    let p = cam
        .make_camera_point(Point2::new(25.0, 21.0), CameraSys::focal_plane())
        .expect("point");
    let names: Vec<_> = cam
        .find_detectors(&p)
        .expect("find")
        .into_iter()
        .map(|d| d.name())
        .collect();
    assert_eq!(names, ["B"]);
}

#[test]
fn box_edges_are_half_open() {
    let cam = camera();
    let on_min = cam
        .make_camera_point(Point2::new(-0.5, -0.5), CameraSys::focal_plane())
        .expect("point");
    let on_max = cam
        .make_camera_point(Point2::new(10.5, 5.0), CameraSys::focal_plane())
        .expect("point");
    assert_eq!(cam.find_detectors(&on_min).expect("find").len(), 1);
    assert!(cam.find_detectors(&on_max).expect("find").is_empty());
}

#[test]
fn guider_tan_pixels_follow_correspondences() {
    let cam = camera();
    assert_eq!(cam["G"].kind(), DetectorType::Guider);
    let center = cam["G"].center(CameraSys::focal_plane()).expect("center");
    assert_abs_diff_eq!(center.x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(center.y, 0.0, epsilon = 1e-9);

    let fp = cam
        .make_camera_point(center, CameraSys::focal_plane())
        .expect("point");
    let tan = cam
        .transform(&fp, CameraSysPrefix::tan_pixels())
        .expect("tan pixels");
    assert_eq!(tan.sys(), &CameraSys::with_detector(TAN_PIXELS, "G"));
    assert_abs_diff_eq!(tan.point().x, 50.0, epsilon = 1e-7);
    assert_abs_diff_eq!(tan.point().y, 50.0, epsilon = 1e-7);
}

#[test]
fn camera_systems_chain_through_native() {
    let cam = camera();
    let p = cam
        .make_camera_point(Point2::new(3.0, 4.0), pixels("A"))
        .expect("point");
    let microns = cam
        .transform(&p, CameraSys::new("FocalPlaneMicrons"))
        .expect("microns");
    assert_abs_diff_eq!(microns.point().x, 3000.0, epsilon = 1e-9);
    assert_abs_diff_eq!(microns.point().y, 4000.0, epsilon = 1e-9);

    let pupil = cam.transform(&microns, CameraSys::pupil()).expect("pupil");
    let back = cam.transform(&pupil, pixels("A")).expect("back");
    assert_abs_diff_eq!(back.point().x, 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(back.point().y, 4.0, epsilon = 1e-9);
}

#[test]
fn sys_refs_parse_from_text() {
    let cam = camera();
    let p = cam
        .make_camera_point(Point2::new(22.0, 28.0), CameraSys::focal_plane())
        .expect("point");
    let to: SysRef = "Pixels:*".parse().expect("parse");
    let out = cam.transform(&p, to).expect("transform");
    assert_eq!(out.sys().to_string(), "Pixels:B");
}

#[test]
fn fp_bbox_covers_every_detector() {
    let cam = camera();
    let bbox = cam.fp_bbox().expect("bbox");
    for det in &cam {
        let c = det.center(CameraSys::focal_plane()).expect("center");
        assert!(bbox.contains(c), "{} center {c:?} outside {bbox:?}", det.name());
    }
}

proptest! {
    #[test]
    fn pixel_round_trip_through_native(x in -0.5f64..10.5, y in -0.5f64..10.5) {
        let cam = camera();
        let p = cam.make_camera_point(Point2::new(x, y), pixels("A")).expect("point");
        let native = cam.transform(&p, cam.native_sys().clone()).expect("native");
        let back = cam.transform(&native, p.sys().clone()).expect("back");
        prop_assert!((back.point() - p.point()).norm() < 1e-9);
    }

    #[test]
    fn guider_round_trip_through_pupil(x in 0.0f64..99.0, y in 0.0f64..99.0) {
        let cam = camera();
        let p = cam.make_camera_point(Point2::new(x, y), pixels("G")).expect("point");
        let pupil = cam.transform(&p, CameraSys::pupil()).expect("pupil");
        let back = cam.transform(&pupil, CameraSysPrefix::pixels()).expect("back");
        prop_assert_eq!(back.sys(), p.sys());
        prop_assert!((back.point() - p.point()).norm() < 1e-6);
    }

    #[test]
    fn prefixes_never_make_points(name in "[A-Za-z]{1,12}") {
        let cam = camera();
        let err = cam
            .make_camera_point(Point2::origin(), CameraSysPrefix::new(name))
            .unwrap_err();
        prop_assert!(matches!(err, CameraError::UnqualifiedSys(_)));
    }
}
