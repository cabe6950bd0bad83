//! A single detector and its own coordinate-system registry.

use crate::{
    CameraBuildError, CameraError, CameraPoint, CameraSys, CameraSysPrefix, SysRef, TransformMap,
};
use camgeom_core::{Box2D, Box2I, Orientation, PlaneTransform, Point2};
use serde::{Deserialize, Serialize};

/// Role of a detector in the focal plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorType {
    #[default]
    Science,
    Focus,
    Guider,
    Wavefront,
}

/// Static description of a detector, independent of any registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    pub name: String,
    pub id: i32,
    #[serde(default, rename = "type")]
    pub kind: DetectorType,
    #[serde(default)]
    pub serial: String,
    pub bbox: Box2I,
    /// Pixel pitch in focal-plane units (mm), `[x, y]`.
    pub pixel_size: [f64; 2],
    #[serde(default)]
    pub orientation: Orientation,
}

impl DetectorParams {
    fn validate(&self) -> Result<(), CameraBuildError> {
        let invalid = |reason: &str| CameraBuildError::InvalidDetector {
            detector: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.bbox.is_empty() {
            return Err(invalid("bounding box is empty"));
        }
        if !self.pixel_size.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(invalid("pixel size must be finite and positive"));
        }
        Ok(())
    }
}

/// A detector placed on the focal plane.
///
/// Its registry is rooted at the camera's native system and always knows
/// `PIXELS:<name>` and `ACTUAL_PIXELS:<name>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Detector {
    params: DetectorParams,
    transforms: TransformMap,
}

impl Detector {
    /// Build a detector whose pixel mapping comes from its orientation and
    /// pixel size.
    ///
    /// `extra` adds further detector-bound systems; each transform maps the
    /// native system into the named system. An `ACTUAL_PIXELS` entry replaces
    /// the default, which is the nominal pixel mapping.
    pub fn new<I>(params: DetectorParams, native: CameraSys, extra: I) -> Result<Self, CameraBuildError>
    where
        I: IntoIterator<Item = (CameraSysPrefix, PlaneTransform)>,
    {
        params.validate()?;
        let to_focal_plane = params.orientation.pixel_to_focal_plane(params.pixel_size);
        let from_native = PlaneTransform::Affine(to_focal_plane).inverted()?;

        let extra: Vec<_> = extra
            .into_iter()
            .map(|(prefix, t)| (prefix.bind(params.name.as_str()), t))
            .collect();
        let actual = CameraSysPrefix::actual_pixels().bind(params.name.as_str());

        let mut entries = vec![(
            CameraSysPrefix::pixels().bind(params.name.as_str()),
            from_native.clone(),
        )];
        if !extra.iter().any(|(sys, _)| *sys == actual) {
            entries.push((actual, from_native));
        }
        entries.extend(extra);

        let transforms = TransformMap::new(native, entries)?;
        log::debug!(
            "detector {} (id {}) registered {} systems",
            params.name,
            params.id,
            transforms.systems().count()
        );
        Ok(Self { params, transforms })
    }

    /// Use a prebuilt registry. It must contain `PIXELS:<name>`.
    pub fn with_transform_map(
        params: DetectorParams,
        transforms: TransformMap,
    ) -> Result<Self, CameraBuildError> {
        params.validate()?;
        let pixels = CameraSysPrefix::pixels().bind(params.name.as_str());
        if !transforms.contains(&pixels) {
            return Err(CameraBuildError::MissingPixels {
                detector: params.name,
                sys: pixels,
            });
        }
        Ok(Self { params, transforms })
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn id(&self) -> i32 {
        self.params.id
    }

    pub fn kind(&self) -> DetectorType {
        self.params.kind
    }

    pub fn serial(&self) -> &str {
        &self.params.serial
    }

    pub fn bbox(&self) -> Box2I {
        self.params.bbox
    }

    pub fn pixel_size(&self) -> [f64; 2] {
        self.params.pixel_size
    }

    pub fn orientation(&self) -> &Orientation {
        &self.params.orientation
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn transform_map(&self) -> &TransformMap {
        &self.transforms
    }

    pub fn native_sys(&self) -> &CameraSys {
        self.transforms.native_sys()
    }

    pub fn make_camera_sys(&self, prefix: &CameraSysPrefix) -> CameraSys {
        prefix.bind(self.params.name.as_str())
    }

    pub fn has_sys(&self, sys: &CameraSys) -> bool {
        self.transforms.contains(sys)
    }

    fn resolve(&self, sys: SysRef) -> CameraSys {
        match sys {
            SysRef::Prefix(prefix) => self.make_camera_sys(&prefix),
            SysRef::Qualified(sys) => sys,
        }
    }

    /// Transform `point` into `to` using only this detector's registry.
    pub fn transform(
        &self,
        point: &CameraPoint,
        to: impl Into<SysRef>,
    ) -> Result<CameraPoint, CameraError> {
        let to = self.resolve(to.into());
        let p = self.transforms.transform(point.point(), point.sys(), &to)?;
        Ok(CameraPoint::new(p, to))
    }

    /// Corners of the pixel-center bounding box, expressed in `sys`.
    pub fn corners(&self, sys: impl Into<SysRef>) -> Result<[Point2<f64>; 4], CameraError> {
        let to = self.resolve(sys.into());
        let pixels = CameraSysPrefix::pixels().bind(self.params.name.as_str());
        let mut corners = Box2D::from(self.params.bbox).corners();
        for p in corners.iter_mut() {
            *p = self.transforms.transform(*p, &pixels, &to)?;
        }
        Ok(corners)
    }

    /// Center of the pixel-center bounding box, expressed in `sys`.
    pub fn center(&self, sys: impl Into<SysRef>) -> Result<Point2<f64>, CameraError> {
        let to = self.resolve(sys.into());
        let pixels = CameraSysPrefix::pixels().bind(self.params.name.as_str());
        let center = Box2D::from(self.params.bbox).center();
        Ok(self.transforms.transform(center, &pixels, &to)?)
    }
}
