//! High-level facade crate for the `camgeom-*` workspace.
//!
//! This crate provides stable re-exports of the underlying crates and, behind
//! the default `cli` feature, the `camgeom` command-line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use camgeom::{CameraConfig, CameraSys, CameraSysPrefix, Point2, PIXELS};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let camera = CameraConfig::load_json("camera.json")?.build_camera()?;
//! let p = camera.make_camera_point(
//!     Point2::new(5.0, 5.0),
//!     CameraSys::with_detector(PIXELS, "A"),
//! )?;
//! let fp = camera.transform(&p, CameraSys::focal_plane())?;
//! let back = camera.transform(&fp, CameraSysPrefix::pixels())?;
//! println!("{fp} -> {back}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `camgeom::core`: boxes, affine maps, homographies, radial distortion.
//! - `camgeom::camera`: coordinate systems, detectors, camera dispatch, JSON
//!   configuration.
//! - `camgeom::typehandling`: heterogeneous maps and their conformance checks.

pub use camgeom_camera as camera;
pub use camgeom_core as core;
pub use camgeom_typehandling as typehandling;

pub use camgeom_camera::{
    Camera, CameraConfig, CameraError, CameraPoint, CameraSys, CameraSysPrefix, Detector,
    DetectorType, SysRef, ACTUAL_PIXELS, FOCAL_PLANE, PIXELS, PUPIL, TAN_PIXELS,
};
pub use camgeom_core::{init_with_level, Point2};
pub use camgeom_typehandling::{HeteroMap, MutableHeteroMap, SimpleHeteroMap};
