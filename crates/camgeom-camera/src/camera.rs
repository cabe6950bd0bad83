//! Coordinate dispatch across a camera's detectors and its shared registry.

use crate::{
    CameraBuildError, CameraError, CameraPoint, CameraSys, CameraSysPrefix, Detector,
    DetectorCollection, SysRef, TransformMap,
};
use camgeom_core::{Box2D, Point2};
use std::ops::Index;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A set of detectors sharing one native coordinate system.
///
/// Camera-level systems (focal plane, pupil, ...) live in the shared
/// [`TransformMap`]; detector-bound systems live in each detector's own map.
/// Both are rooted at the same native system, which is what lets
/// [`Camera::transform`] chain them.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    name: String,
    detectors: DetectorCollection,
    transforms: TransformMap,
}

impl Camera {
    pub fn new(
        name: impl Into<String>,
        detectors: DetectorCollection,
        transforms: TransformMap,
    ) -> Result<Self, CameraBuildError> {
        let native = transforms.native_sys();
        if let Some(det) = detectors.iter().find(|d| d.native_sys() != native) {
            return Err(CameraBuildError::NativeMismatch {
                detector: det.name().to_string(),
                expected: native.clone(),
                found: det.native_sys().clone(),
            });
        }
        Ok(Self {
            name: name.into(),
            detectors,
            transforms,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native_sys(&self) -> &CameraSys {
        self.transforms.native_sys()
    }

    pub fn transform_map(&self) -> &TransformMap {
        &self.transforms
    }

    pub fn detectors(&self) -> &DetectorCollection {
        &self.detectors
    }

    pub fn detector(&self, name: &str) -> Option<&Detector> {
        self.detectors.get(name)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detector> {
        self.detectors.iter()
    }

    /// Box in the native system covering every detector.
    pub fn fp_bbox(&self) -> Result<Box2D, CameraError> {
        self.detectors.fp_bbox()
    }

    /// Tag `point` with `sys` after checking that some registry knows it.
    pub fn make_camera_point(
        &self,
        point: Point2<f64>,
        sys: impl Into<SysRef>,
    ) -> Result<CameraPoint, CameraError> {
        let sys = match sys.into() {
            SysRef::Prefix(prefix) => return Err(CameraError::UnqualifiedSys(prefix)),
            SysRef::Qualified(sys) => sys,
        };
        if self.transforms.contains(&sys) || self.owning_detector(&sys).is_some() {
            Ok(CameraPoint::new(point, sys))
        } else {
            Err(CameraError::UnknownSys(sys))
        }
    }

    /// Move `point` into `to`, always passing through the native system.
    ///
    /// A prefix destination is bound to the single detector that contains
    /// the point.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(from = %point.sys()))
    )]
    pub fn transform(
        &self,
        point: &CameraPoint,
        to: impl Into<SysRef>,
    ) -> Result<CameraPoint, CameraError> {
        let native = self.transform_single_sys(point, self.native_sys())?;
        self.transform_from_native_sys(&native, &to.into())
    }

    /// [`Camera::transform`] over a batch; stops at the first failure.
    pub fn transform_points(
        &self,
        points: &[CameraPoint],
        to: impl Into<SysRef>,
    ) -> Result<Vec<CameraPoint>, CameraError> {
        let to = to.into();
        points.iter().map(|p| self.transform(p, to.clone())).collect()
    }

    /// Detectors whose pixel box contains `point`, in collection order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(point = %point))
    )]
    pub fn find_detectors(&self, point: &CameraPoint) -> Result<Vec<&Detector>, CameraError> {
        let native = self.transform_single_sys(point, self.native_sys())?;
        let pixels = CameraSysPrefix::pixels();
        let mut found = Vec::new();
        for det in &self.detectors {
            let px = det.transform(&native, &pixels)?;
            let inside = Box2D::from(det.bbox()).contains(px.point());
            log::trace!("{}: {px} inside={inside}", det.name());
            if inside {
                found.push(det);
            }
        }
        Ok(found)
    }

    fn owning_detector(&self, sys: &CameraSys) -> Option<&Detector> {
        sys.detector_name()
            .and_then(|name| self.detectors.get(name))
            .filter(|det| det.has_sys(sys))
    }

    /// One hop: through a named detector, or through the shared registry.
    ///
    /// `to` must be reachable from `point` without choosing a detector.
    pub fn transform_single_sys(
        &self,
        point: &CameraPoint,
        to: &CameraSys,
    ) -> Result<CameraPoint, CameraError> {
        if let Some(name) = to.detector_name() {
            let det = self
                .detectors
                .get(name)
                .ok_or_else(|| CameraError::DetectorNotFound(name.to_string()))?;
            log::debug!("{} -> {to}: detector {name}", point.sys());
            return det.transform(point, to);
        }

        if self.transforms.contains(to) {
            if self.transforms.contains(point.sys()) {
                log::debug!("{} -> {to}: camera registry", point.sys());
                let p = self.transforms.transform(point.point(), point.sys(), to)?;
                return Ok(CameraPoint::new(p, to.clone()));
            }
            // Detector-bound source: its detector shares our native root.
            if let Some(det) = self.owning_detector(point.sys()) {
                log::debug!(
                    "{} -> {to}: detector {} then camera registry",
                    point.sys(),
                    det.name()
                );
                let native = det.transform(point, self.native_sys())?;
                let p = self.transforms.from_native(native.point(), to)?;
                return Ok(CameraPoint::new(p, to.clone()));
            }
        }

        Err(CameraError::NoMapping {
            from: point.sys().clone(),
            to: to.clone(),
        })
    }

    /// Move a point already in the native system into `to`, binding a
    /// prefix to the single detector under the point.
    pub fn transform_from_native_sys(
        &self,
        native: &CameraPoint,
        to: &SysRef,
    ) -> Result<CameraPoint, CameraError> {
        match to {
            SysRef::Prefix(prefix) => {
                let found = self.find_detectors(native)?;
                match found.as_slice() {
                    [] => Err(CameraError::NoDetectors {
                        point: native.clone(),
                    }),
                    [det] => det.transform(native, prefix),
                    many => Err(CameraError::MultipleDetectors {
                        point: native.clone(),
                        names: many.iter().map(|d| d.name().to_string()).collect(),
                    }),
                }
            }
            SysRef::Qualified(sys) => self.transform_single_sys(native, sys),
        }
    }
}

impl Index<usize> for Camera {
    type Output = Detector;

    fn index(&self, index: usize) -> &Detector {
        &self.detectors[index]
    }
}

impl Index<&str> for Camera {
    type Output = Detector;

    fn index(&self, name: &str) -> &Detector {
        &self.detectors[name]
    }
}

impl<'a> IntoIterator for &'a Camera {
    type Item = &'a Detector;
    type IntoIter = std::slice::Iter<'a, Detector>;

    fn into_iter(self) -> Self::IntoIter {
        self.detectors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DetectorParams, DetectorType, TransformMapError, PIXELS};
    use approx::assert_abs_diff_eq;
    use camgeom_core::{Box2I, Homography, Orientation, PlaneTransform, RadialMap, TransformError};

    /// Detector with unit pixels whose pixel (x, y) sits at `origin + (x, y)`
    /// on the focal plane.
    fn detector(name: &str, id: i32, bbox: Box2I, origin: [f64; 2]) -> Detector {
        let params = DetectorParams {
            name: name.to_string(),
            id,
            kind: DetectorType::Science,
            serial: String::new(),
            bbox,
            pixel_size: [1.0, 1.0],
            orientation: Orientation {
                fp_position: origin,
                ref_point: [0.0, 0.0],
                ..Orientation::default()
            },
        };
        Detector::new(params, CameraSys::focal_plane(), []).expect("detector")
    }

    fn camera() -> Camera {
        let detectors = DetectorCollection::new([
            detector("A", 0, Box2I::new([0, 0], [10, 10]), [0.0, 0.0]),
            detector("B", 1, Box2I::new([20, 20], [30, 30]), [0.0, 0.0]),
        ])
        .expect("detectors");
        let radial = RadialMap::new(vec![0.0, 0.5, 0.0, 1e-4]).expect("radial");
        let transforms = TransformMap::new(
            CameraSys::focal_plane(),
            [(CameraSys::pupil(), PlaneTransform::Radial(radial))],
        )
        .expect("registry");
        Camera::new("test", detectors, transforms).expect("camera")
    }

    fn pixels(det: &str) -> CameraSys {
        CameraSys::with_detector(PIXELS, det)
    }

    #[test]
    fn prefix_destination_resolves_to_the_covering_detector() {
        let cam = camera();
        let p = cam
            .make_camera_point(Point2::new(5.0, 5.0), pixels("A"))
            .expect("point");
        let out = cam.transform(&p, CameraSysPrefix::pixels()).expect("transform");
        assert_eq!(out.sys(), &pixels("A"));
        assert_abs_diff_eq!(out.point().x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn far_point_has_no_detector() {
        let cam = camera();
        let p = cam
            .make_camera_point(Point2::new(1000.0, 1000.0), CameraSys::focal_plane())
            .expect("point");
        let err = cam.transform(&p, CameraSysPrefix::pixels()).unwrap_err();
        assert!(matches!(err, CameraError::NoDetectors { .. }), "{err}");
        assert!(cam.find_detectors(&p).expect("find").is_empty());
    }

    #[test]
    fn overlapping_detectors_are_ambiguous() {
        let detectors = DetectorCollection::new([
            detector("A", 0, Box2I::new([0, 0], [10, 10]), [0.0, 0.0]),
            detector("C", 2, Box2I::new([0, 0], [10, 10]), [5.0, 5.0]),
        ])
        .expect("detectors");
        let cam = Camera::new(
            "overlap",
            detectors,
            TransformMap::native_only(CameraSys::focal_plane()),
        )
        .expect("camera");
        let p = cam
            .make_camera_point(Point2::new(7.0, 7.0), CameraSys::focal_plane())
            .expect("point");
        match cam.transform(&p, CameraSysPrefix::pixels()) {
            Err(CameraError::MultipleDetectors { names, .. }) => assert_eq!(names, ["A", "C"]),
            other => panic!("expected MultipleDetectors, got {other:?}"),
        }
    }

    #[test]
    fn detector_source_reaches_camera_systems() {
        let cam = camera();
        let p = cam
            .make_camera_point(Point2::new(25.0, 25.0), pixels("B"))
            .expect("point");
        let pupil = cam.transform(&p, CameraSys::pupil()).expect("to pupil");
        let back = cam.transform(&pupil, pixels("B")).expect("back");
        assert_abs_diff_eq!(back.point().x, 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.point().y, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn cross_detector_transform_goes_through_native() {
        let cam = camera();
        let p = cam
            .make_camera_point(Point2::new(3.0, 4.0), pixels("A"))
            .expect("point");
        let out = cam.transform(&p, pixels("B")).expect("transform");
        assert_eq!(out.sys(), &pixels("B"));
        assert_abs_diff_eq!(out.point().x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.point().y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn unknown_detector_is_reported() {
        let cam = camera();
        let p = cam
            .make_camera_point(Point2::new(1.0, 1.0), CameraSys::focal_plane())
            .expect("point");
        let err = cam.transform(&p, pixels("Z")).unwrap_err();
        assert_eq!(err, CameraError::DetectorNotFound("Z".to_string()));
    }

    #[test]
    fn unregistered_camera_system_has_no_mapping() {
        let cam = camera();
        let p = cam
            .make_camera_point(Point2::new(1.0, 1.0), CameraSys::focal_plane())
            .expect("point");
        let err = cam.transform(&p, CameraSys::new("FieldAngle")).unwrap_err();
        assert!(matches!(err, CameraError::NoMapping { .. }), "{err}");
    }

    #[test]
    fn make_camera_point_validates_systems() {
        let cam = camera();
        assert!(matches!(
            cam.make_camera_point(Point2::origin(), CameraSysPrefix::pixels()),
            Err(CameraError::UnqualifiedSys(_))
        ));
        assert!(matches!(
            cam.make_camera_point(Point2::origin(), pixels("Z")),
            Err(CameraError::UnknownSys(_))
        ));
        assert!(matches!(
            cam.make_camera_point(Point2::origin(), CameraSys::new("Nowhere")),
            Err(CameraError::UnknownSys(_))
        ));
        assert!(cam.make_camera_point(Point2::origin(), CameraSys::pupil()).is_ok());
    }

    #[test]
    fn native_mismatch_is_rejected() {
        let detectors = DetectorCollection::new([detector(
            "A",
            0,
            Box2I::new([0, 0], [10, 10]),
            [0.0, 0.0],
        )])
        .expect("detectors");
        let err = Camera::new("bad", detectors, TransformMap::native_only(CameraSys::pupil()))
            .unwrap_err();
        assert!(matches!(err, CameraBuildError::NativeMismatch { .. }));
    }

    #[test]
    fn batch_transform_stops_at_first_error() {
        let cam = camera();
        let inside = cam
            .make_camera_point(Point2::new(5.0, 5.0), CameraSys::focal_plane())
            .expect("point");
        let outside = cam
            .make_camera_point(Point2::new(15.0, 15.0), CameraSys::focal_plane())
            .expect("point");
        let ok = cam
            .transform_points(std::slice::from_ref(&inside), CameraSysPrefix::pixels())
            .expect("batch");
        assert_eq!(ok.len(), 1);
        assert!(cam
            .transform_points(&[inside, outside], CameraSysPrefix::pixels())
            .is_err());
    }

    #[test]
    fn batch_transform_matches_single_transforms() {
        let cam = camera();
        let points: Vec<_> = [(5.0, 5.0), (25.0, 21.0), (0.5, 9.5)]
            .into_iter()
            .map(|(x, y)| {
                cam.make_camera_point(Point2::new(x, y), CameraSys::focal_plane())
                    .expect("point")
            })
            .collect();
        let batch = cam
            .transform_points(&points, CameraSysPrefix::pixels())
            .expect("batch");
        for (p, out) in points.iter().zip(&batch) {
            assert_eq!(out, &cam.transform(p, CameraSysPrefix::pixels()).expect("single"));
        }
    }

    /// Camera with one detector `H` whose pixel frame is a degenerate
    /// homography of the focal plane: points with x == 0 map to infinity.
    fn degenerate_camera() -> Camera {
        let params = DetectorParams {
            name: "H".to_string(),
            id: 0,
            kind: DetectorType::Science,
            serial: String::new(),
            bbox: Box2I::new([0, 0], [10, 10]),
            pixel_size: [1.0, 1.0],
            orientation: Orientation::default(),
        };
        let h = Homography::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
        let transforms = TransformMap::new(
            CameraSys::focal_plane(),
            [(pixels("H"), PlaneTransform::Homography(h))],
        )
        .expect("registry");
        let det = Detector::with_transform_map(params, transforms).expect("detector");
        let detectors = DetectorCollection::new([det]).expect("detectors");
        Camera::new(
            "degenerate",
            detectors,
            TransformMap::native_only(CameraSys::focal_plane()),
        )
        .expect("camera")
    }

    #[test]
    fn numerical_failure_propagates_from_detector_search() {
        let cam = degenerate_camera();
        let p = cam
            .make_camera_point(Point2::new(0.0, 3.0), CameraSys::focal_plane())
            .expect("point");
        let at_infinity = CameraError::TransformMap(TransformMapError::Transform(
            TransformError::PointAtInfinity,
        ));
        assert_eq!(cam.find_detectors(&p).unwrap_err(), at_infinity);
        assert_eq!(
            cam.transform(&p, CameraSysPrefix::pixels()).unwrap_err(),
            at_infinity
        );
        assert_eq!(
            cam.transform_points(&[p], CameraSysPrefix::pixels()).unwrap_err(),
            at_infinity
        );
    }

    #[test]
    fn fp_bbox_reports_unmappable_detector() {
        let cam = degenerate_camera();
        let err = cam.fp_bbox().unwrap_err();
        assert_eq!(
            err,
            CameraError::TransformMap(TransformMapError::Transform(TransformError::Singular))
        );
        assert!(camera().fp_bbox().is_ok());
    }

    #[test]
    fn camera_indexes_like_its_collection() {
        let cam = camera();
        assert_eq!(cam.len(), 2);
        assert_eq!(cam[1].name(), "B");
        assert_eq!(cam["A"].id(), 0);
        let names: Vec<_> = cam.iter().map(Detector::name).collect();
        assert_eq!(names, ["A", "B"]);
        assert!(cam.detector("A").is_some());
        assert!(cam.detector("Z").is_none());
    }
}
