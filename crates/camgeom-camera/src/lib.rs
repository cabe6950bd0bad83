//! Camera geometry: detectors on a focal plane and coordinate dispatch.
//!
//! A [`Camera`] owns an ordered [`DetectorCollection`] and a shared
//! [`TransformMap`] rooted at the camera's native system (normally the focal
//! plane). [`Camera::transform`] moves a [`CameraPoint`] between any two
//! systems by going through the native system; a destination given as a bare
//! [`CameraSysPrefix`] is resolved by finding the one detector under the
//! point.
//!
//! Plane geometry (boxes, affine maps, distortion) lives in `camgeom-core`.

mod camera;
mod collection;
mod detector;
mod error;
mod io;
mod point;
mod sys;
mod transform_map;

pub use camera::Camera;
pub use collection::DetectorCollection;
pub use detector::{Detector, DetectorParams, DetectorType};
pub use error::{CameraBuildError, CameraError, TransformMapError};
pub use io::{
    CameraConfig, CameraConfigError, CameraIoError, DetectorConfig, SysTransformConfig,
    TransformSpec,
};
pub use point::CameraPoint;
pub use sys::{
    CameraSys, CameraSysPrefix, ParseSysError, SysRef, ACTUAL_PIXELS, FOCAL_PLANE, PIXELS, PUPIL,
    TAN_PIXELS,
};
pub use transform_map::TransformMap;

pub use camgeom_core::{Box2D, Box2I, Orientation, PlaneTransform, Point2};
