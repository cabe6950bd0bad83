//! Plane geometry used by camera coordinate systems.
//!
//! This crate is intentionally small and purely geometric. It knows nothing
//! about detectors or coordinate-system names; it only provides the boxes and
//! the invertible 2D maps that the camera layer composes.

mod affine;
mod bbox;
mod homography;
mod logger;
mod orientation;
mod radial;
mod transform;

pub use affine::AffineMap;
pub use bbox::{Box2D, Box2I};
pub use homography::{homography_from_4pt, Homography};
pub use orientation::Orientation;
pub use radial::RadialMap;
pub use transform::{PlaneTransform, TransformError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

pub use nalgebra::{Point2, Vector2};
