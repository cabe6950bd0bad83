use crate::{CameraPoint, CameraSys, CameraSysPrefix};
use camgeom_core::TransformError;

/// Errors from a [`crate::TransformMap`] lookup or build.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformMapError {
    #[error("coordinate system {0} is not in this transform map")]
    UnknownSys(CameraSys),
    #[error("coordinate system {0} is registered twice")]
    DuplicateSys(CameraSys),
    #[error("native system {0} cannot be registered explicitly")]
    NativeEntry(CameraSys),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Errors from coordinate dispatch on a [`crate::Camera`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("no detector contains {point}")]
    NoDetectors { point: CameraPoint },
    #[error("{point} lies on more than one detector: {}", names.join(", "))]
    MultipleDetectors {
        point: CameraPoint,
        names: Vec<String>,
    },
    #[error("no mapping from {from} to {to}")]
    NoMapping { from: CameraSys, to: CameraSys },
    #[error("{0} is not a fully qualified coordinate system")]
    UnqualifiedSys(CameraSysPrefix),
    #[error("coordinate system {0} not found in any transform map")]
    UnknownSys(CameraSys),
    #[error("detector {0:?} not found")]
    DetectorNotFound(String),
    #[error(transparent)]
    TransformMap(#[from] TransformMapError),
}

impl From<TransformError> for CameraError {
    fn from(err: TransformError) -> Self {
        CameraError::TransformMap(TransformMapError::Transform(err))
    }
}

/// Errors while assembling detectors and cameras.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CameraBuildError {
    #[error("duplicate detector name {0:?}")]
    DuplicateName(String),
    #[error("duplicate detector id {id} ({first:?} and {second:?})")]
    DuplicateId {
        id: i32,
        first: String,
        second: String,
    },
    #[error("detector {detector:?} is rooted at {found}, camera native system is {expected}")]
    NativeMismatch {
        detector: String,
        expected: CameraSys,
        found: CameraSys,
    },
    #[error("detector {detector:?} has no {sys} mapping")]
    MissingPixels { detector: String, sys: CameraSys },
    #[error("detector {detector:?}: {reason}")]
    InvalidDetector { detector: String, reason: String },
    #[error(transparent)]
    TransformMap(#[from] TransformMapError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}
