//! JSON camera descriptions.

use crate::{
    Camera, CameraBuildError, CameraSys, CameraSysPrefix, Detector, DetectorCollection,
    DetectorParams, ParseSysError, TransformMap, FOCAL_PLANE,
};
use camgeom_core::{
    homography_from_4pt, AffineMap, Homography, PlaneTransform, Point2, RadialMap, TransformError,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum CameraIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum CameraConfigError {
    #[error("transform for {sys}: {source}")]
    Transform {
        sys: String,
        #[source]
        source: TransformError,
    },
    #[error("detector {detector:?}: {sys:?} must be a bare system name")]
    QualifiedDetectorSys { detector: String, sys: String },
    #[error(transparent)]
    Sys(#[from] ParseSysError),
    #[error(transparent)]
    Build(#[from] CameraBuildError),
}

/// Serializable description of a [`PlaneTransform`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformSpec {
    Identity,
    /// Row-major 2x2 linear part plus translation.
    Affine {
        linear: [[f64; 2]; 2],
        #[serde(default)]
        translation: [f64; 2],
    },
    Homography {
        matrix: [[f64; 3]; 3],
    },
    /// Homography through four point pairs.
    Correspondences {
        src: [[f64; 2]; 4],
        dst: [[f64; 2]; 4],
    },
    Radial {
        coeffs: Vec<f64>,
    },
    /// Steps applied in order in the forward direction.
    Chain {
        steps: Vec<TransformSpec>,
    },
    Inverse {
        of: Box<TransformSpec>,
    },
}

impl TransformSpec {
    pub fn build(&self) -> Result<PlaneTransform, TransformError> {
        Ok(match self {
            TransformSpec::Identity => PlaneTransform::Identity,
            TransformSpec::Affine {
                linear,
                translation,
            } => AffineMap::from_arrays(*linear, *translation).into(),
            TransformSpec::Homography { matrix } => Homography::from_array(*matrix).into(),
            TransformSpec::Correspondences { src, dst } => {
                let src = src.map(|p| Point2::new(p[0], p[1]));
                let dst = dst.map(|p| Point2::new(p[0], p[1]));
                homography_from_4pt(&src, &dst)
                    .ok_or(TransformError::Singular)?
                    .into()
            }
            TransformSpec::Radial { coeffs } => RadialMap::new(coeffs.clone())?.into(),
            TransformSpec::Chain { steps } => {
                let steps = steps
                    .iter()
                    .map(TransformSpec::build)
                    .collect::<Result<Vec<_>, _>>()?;
                PlaneTransform::Chain(steps)
            }
            TransformSpec::Inverse { of } => of.build()?.inverted()?,
        })
    }
}

impl From<&PlaneTransform> for TransformSpec {
    fn from(t: &PlaneTransform) -> Self {
        match t {
            PlaneTransform::Identity => TransformSpec::Identity,
            PlaneTransform::Affine(a) => {
                let (linear, translation) = a.to_arrays();
                TransformSpec::Affine {
                    linear,
                    translation,
                }
            }
            PlaneTransform::Homography(h) => TransformSpec::Homography {
                matrix: h.to_array(),
            },
            PlaneTransform::Radial(r) => TransformSpec::Radial {
                coeffs: r.coeffs().to_vec(),
            },
            PlaneTransform::Chain(steps) => TransformSpec::Chain {
                steps: steps.iter().map(TransformSpec::from).collect(),
            },
            PlaneTransform::Inverted(inner) => TransformSpec::Inverse {
                of: Box::new(TransformSpec::from(inner.as_ref())),
            },
        }
    }
}

/// One registry entry: `transform` maps the native system into `sys`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysTransformConfig {
    pub sys: String,
    pub transform: TransformSpec,
}

impl SysTransformConfig {
    fn build(&self) -> Result<PlaneTransform, CameraConfigError> {
        self.transform
            .build()
            .map_err(|source| CameraConfigError::Transform {
                sys: self.sys.clone(),
                source,
            })
    }
}

/// A detector entry. `transforms` name bare system prefixes (e.g.
/// `"TanPixels"`); they are bound to this detector when built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(flatten)]
    pub params: DetectorParams,
    #[serde(default)]
    pub transforms: Vec<SysTransformConfig>,
}

impl DetectorConfig {
    pub fn build(&self, native: &CameraSys) -> Result<Detector, CameraConfigError> {
        let mut extra = Vec::with_capacity(self.transforms.len());
        for entry in &self.transforms {
            let name = entry.sys.trim();
            if name.is_empty() {
                return Err(ParseSysError::EmptyName(entry.sys.clone()).into());
            }
            if name.contains(':') {
                return Err(CameraConfigError::QualifiedDetectorSys {
                    detector: self.params.name.clone(),
                    sys: entry.sys.clone(),
                });
            }
            extra.push((CameraSysPrefix::new(name), entry.build()?));
        }
        Ok(Detector::new(self.params.clone(), native.clone(), extra)?)
    }
}

fn default_native_sys() -> String {
    FOCAL_PLANE.to_string()
}

/// Camera description loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,
    #[serde(default = "default_native_sys")]
    pub native_sys: String,
    /// Camera-level systems such as the pupil.
    #[serde(default)]
    pub transforms: Vec<SysTransformConfig>,
    #[serde(default)]
    pub detectors: Vec<DetectorConfig>,
}

impl CameraConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CameraIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CameraIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn native(&self) -> Result<CameraSys, CameraConfigError> {
        Ok(self.native_sys.parse()?)
    }

    pub fn build_transform_map(&self) -> Result<TransformMap, CameraConfigError> {
        let native = self.native()?;
        let mut entries = Vec::with_capacity(self.transforms.len());
        for entry in &self.transforms {
            entries.push((entry.sys.parse::<CameraSys>()?, entry.build()?));
        }
        TransformMap::new(native, entries)
            .map_err(|e| CameraConfigError::Build(CameraBuildError::from(e)))
    }

    /// Build a validated camera from the config.
    pub fn build_camera(&self) -> Result<Camera, CameraConfigError> {
        let transforms = self.build_transform_map()?;
        let detectors = self
            .detectors
            .iter()
            .map(|d| d.build(transforms.native_sys()))
            .collect::<Result<Vec<_>, _>>()?;
        let detectors = DetectorCollection::new(detectors)?;
        log::debug!(
            "camera {} built: {} detectors, {} camera systems",
            self.name,
            detectors.len(),
            transforms.systems().count()
        );
        Ok(Camera::new(self.name.as_str(), detectors, transforms)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PIXELS, PUPIL, TAN_PIXELS};
    use approx::assert_abs_diff_eq;

    const SAMPLE: &str = r#"{
        "name": "mini",
        "transforms": [
            { "sys": "Pupil", "transform": { "kind": "radial", "coeffs": [0.0, 0.5] } }
        ],
        "detectors": [
            {
                "name": "A",
                "id": 0,
                "type": "science",
                "bbox": { "min": [0, 0], "max": [99, 99] },
                "pixel_size": [0.01, 0.01],
                "orientation": { "fp_position": [0.0, 0.0], "ref_point": [49.5, 49.5] },
                "transforms": [
                    {
                        "sys": "TanPixels",
                        "transform": {
                            "kind": "chain",
                            "steps": [
                                { "kind": "affine", "linear": [[100.0, 0.0], [0.0, 100.0]] },
                                { "kind": "affine", "linear": [[1.0, 0.0], [0.0, 1.0]], "translation": [49.5, 49.5] }
                            ]
                        }
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn builds_camera_from_json() {
        let cfg: CameraConfig = serde_json::from_str(SAMPLE).expect("parse");
        assert_eq!(cfg.native_sys, FOCAL_PLANE);
        let cam = cfg.build_camera().expect("camera");
        assert_eq!(cam.len(), 1);
        assert!(cam.transform_map().contains(&CameraSys::new(PUPIL)));
        assert!(cam["A"].has_sys(&CameraSys::with_detector(TAN_PIXELS, "A")));

        let fp = cam
            .make_camera_point(Point2::new(0.1, -0.2), CameraSys::focal_plane())
            .expect("point");
        let tan = cam
            .transform(&fp, CameraSysPrefix::tan_pixels())
            .expect("tan pixels");
        assert_abs_diff_eq!(tan.point().x, 59.5, epsilon = 1e-9);
        assert_abs_diff_eq!(tan.point().y, 29.5, epsilon = 1e-9);
    }

    #[test]
    fn qualified_detector_system_is_rejected() {
        let mut cfg: CameraConfig = serde_json::from_str(SAMPLE).expect("parse");
        cfg.detectors[0].transforms[0].sys = "TanPixels:A".to_string();
        assert!(matches!(
            cfg.build_camera(),
            Err(CameraConfigError::QualifiedDetectorSys { .. })
        ));
    }

    #[test]
    fn bad_radial_coefficients_name_the_system() {
        let mut cfg: CameraConfig = serde_json::from_str(SAMPLE).expect("parse");
        cfg.transforms[0].transform = TransformSpec::Radial {
            coeffs: vec![1.0, 0.5],
        };
        let err = cfg.build_camera().unwrap_err();
        assert!(err.to_string().contains("Pupil"), "{err}");
    }

    #[test]
    fn degenerate_correspondences_fail() {
        let spec = TransformSpec::Correspondences {
            src: [[0.0, 0.0]; 4],
            dst: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        };
        assert_eq!(spec.build().unwrap_err(), TransformError::Singular);
    }

    #[test]
    fn spec_mirrors_built_transform() {
        let spec = TransformSpec::Inverse {
            of: Box::new(TransformSpec::Radial {
                coeffs: vec![0.0, 1.0, 0.0, 0.01],
            }),
        };
        let built = spec.build().expect("build");
        assert_eq!(TransformSpec::from(&built), spec);
    }

    #[test]
    fn json_round_trip_on_disk() {
        let cfg: CameraConfig = serde_json::from_str(SAMPLE).expect("parse");
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("camera.json");
        cfg.write_json(&path).expect("write");
        let back = CameraConfig::load_json(&path).expect("load");
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = CameraConfig::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CameraIoError::Io(_)));
    }

    #[test]
    fn pupil_round_trip() {
        let cam = serde_json::from_str::<CameraConfig>(SAMPLE)
            .expect("parse")
            .build_camera()
            .expect("camera");
        let px = cam
            .make_camera_point(Point2::new(10.0, 90.0), CameraSys::with_detector(PIXELS, "A"))
            .expect("point");
        let pupil = cam.transform(&px, CameraSys::pupil()).expect("pupil");
        let back = cam.transform(&pupil, CameraSysPrefix::pixels()).expect("back");
        assert_eq!(back.sys(), px.sys());
        assert_abs_diff_eq!(back.point().x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.point().y, 90.0, epsilon = 1e-9);
    }
}
