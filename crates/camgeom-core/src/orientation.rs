//! Detector placement on the focal plane.

use crate::AffineMap;
use nalgebra::{Matrix2, Point2, Rotation3, Vector2};
use serde::{Deserialize, Serialize};

/// Position and attitude of a detector relative to the focal plane.
///
/// Angles are in radians. The rotation is `Rz(yaw) * Ry(pitch) * Rx(roll)`:
/// yaw turns the detector in the focal plane, pitch and roll tilt it, which
/// foreshortens its projection onto the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Focal-plane position (mm) of the reference point.
    pub fp_position: [f64; 2],
    /// Reference point in pixel coordinates.
    pub ref_point: [f64; 2],
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            fp_position: [0.0, 0.0],
            ref_point: [0.0, 0.0],
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }
}

impl Orientation {
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_euler_angles(self.roll, self.pitch, self.yaw)
    }

    /// Map from detector pixels to focal-plane millimetres.
    ///
    /// `fp = fp_position + R2 * diag(pixel_size) * (pixel - ref_point)`, with
    /// `R2` the in-plane block of [`Orientation::rotation`].
    pub fn pixel_to_focal_plane(&self, pixel_size: [f64; 2]) -> AffineMap {
        let r = self.rotation();
        let m = r.matrix();
        let r2 = Matrix2::new(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
        let linear = r2 * Matrix2::new(pixel_size[0], 0.0, 0.0, pixel_size[1]);
        let ref_point = Point2::new(self.ref_point[0], self.ref_point[1]);
        let fp = Vector2::new(self.fp_position[0], self.fp_position[1]);
        AffineMap::new(linear, fp - linear * ref_point.coords)
    }
}
