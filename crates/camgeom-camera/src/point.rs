use crate::CameraSys;
use camgeom_core::Point2;
use serde::Serialize;
use std::fmt;

/// A 2D point tagged with the coordinate system it is expressed in.
///
/// Values are immutable; transforms always return a new point. Points are
/// serialized for output but never deserialized: the only way to get one is
/// [`crate::Camera::make_camera_point`], which checks the system.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CameraPoint {
    point: Point2<f64>,
    sys: CameraSys,
}

impl CameraPoint {
    pub(crate) fn new(point: Point2<f64>, sys: CameraSys) -> Self {
        Self { point, sys }
    }

    pub fn point(&self) -> Point2<f64> {
        self.point
    }

    pub fn sys(&self) -> &CameraSys {
        &self.sys
    }

    pub fn into_parts(self) -> (Point2<f64>, CameraSys) {
        (self.point, self.sys)
    }
}

impl fmt::Display for CameraPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) @ {}", self.point.x, self.point.y, self.sys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_point_and_system() {
        let p = CameraPoint::new(Point2::new(1.5, -2.0), CameraSys::with_detector("Pixels", "A"));
        let json = serde_json::to_value(&p).expect("json");
        assert_eq!(
            json,
            serde_json::json!({"point": [1.5, -2.0], "sys": {"name": "Pixels", "detector": "A"}})
        );
        assert_eq!(p.to_string(), "(1.5, -2) @ Pixels:A");
    }
}
