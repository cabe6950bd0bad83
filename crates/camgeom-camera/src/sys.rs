//! Coordinate-system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Focal plane, in millimetres. The usual native system of a camera.
pub const FOCAL_PLANE: &str = "FocalPlane";
/// Pupil (field angle) coordinates.
pub const PUPIL: &str = "Pupil";
/// Nominal detector pixels.
pub const PIXELS: &str = "Pixels";
/// Detector pixels including per-detector non-idealities.
pub const ACTUAL_PIXELS: &str = "ActualPixels";
/// Detector pixels with optical distortion removed.
pub const TAN_PIXELS: &str = "TanPixels";

/// A fully qualified coordinate system, optionally bound to one detector.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CameraSys {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detector: Option<String>,
}

impl CameraSys {
    /// A camera-level system (no detector).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detector: None,
        }
    }

    pub fn with_detector(name: impl Into<String>, detector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detector: Some(detector.into()),
        }
    }

    pub fn focal_plane() -> Self {
        Self::new(FOCAL_PLANE)
    }

    pub fn pupil() -> Self {
        Self::new(PUPIL)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn detector_name(&self) -> Option<&str> {
        self.detector.as_deref()
    }

    pub fn has_detector_name(&self) -> bool {
        self.detector.is_some()
    }

    /// The system name with the detector binding dropped.
    pub fn prefix(&self) -> CameraSysPrefix {
        CameraSysPrefix::new(self.name.clone())
    }
}

impl fmt::Display for CameraSys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detector {
            Some(det) => write!(f, "{}:{}", self.name, det),
            None => f.write_str(&self.name),
        }
    }
}

/// A system name that still needs a detector before it can be used.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraSysPrefix {
    name: String,
}

impl CameraSysPrefix {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn pixels() -> Self {
        Self::new(PIXELS)
    }

    pub fn actual_pixels() -> Self {
        Self::new(ACTUAL_PIXELS)
    }

    pub fn tan_pixels() -> Self {
        Self::new(TAN_PIXELS)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind this prefix to a detector.
    pub fn bind(&self, detector: impl Into<String>) -> CameraSys {
        CameraSys::with_detector(self.name.clone(), detector)
    }
}

impl fmt::Display for CameraSysPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:*", self.name)
    }
}

/// Destination of a transform: either a concrete system or a prefix whose
/// detector is discovered from the point's position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SysRef {
    Prefix(CameraSysPrefix),
    Qualified(CameraSys),
}

impl SysRef {
    pub fn name(&self) -> &str {
        match self {
            SysRef::Prefix(p) => p.name(),
            SysRef::Qualified(s) => s.name(),
        }
    }
}

impl From<CameraSys> for SysRef {
    fn from(sys: CameraSys) -> Self {
        SysRef::Qualified(sys)
    }
}

impl From<&CameraSys> for SysRef {
    fn from(sys: &CameraSys) -> Self {
        SysRef::Qualified(sys.clone())
    }
}

impl From<CameraSysPrefix> for SysRef {
    fn from(prefix: CameraSysPrefix) -> Self {
        SysRef::Prefix(prefix)
    }
}

impl From<&CameraSysPrefix> for SysRef {
    fn from(prefix: &CameraSysPrefix) -> Self {
        SysRef::Prefix(prefix.clone())
    }
}

impl fmt::Display for SysRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SysRef::Prefix(p) => p.fmt(f),
            SysRef::Qualified(s) => s.fmt(f),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSysError {
    #[error("empty coordinate system name in {0:?}")]
    EmptyName(String),
    #[error("empty detector name in {0:?}")]
    EmptyDetector(String),
    #[error("{0:?} is a prefix; a qualified system is required")]
    UnexpectedPrefix(String),
}

/// Parses `Name`, `Name:Detector` or `Name:*` (prefix).
impl FromStr for SysRef {
    type Err = ParseSysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, detector) = match s.split_once(':') {
            Some((name, det)) => (name.trim(), Some(det.trim())),
            None => (s, None),
        };
        if name.is_empty() {
            return Err(ParseSysError::EmptyName(s.to_string()));
        }
        Ok(match detector {
            None => SysRef::Qualified(CameraSys::new(name)),
            Some("*") => SysRef::Prefix(CameraSysPrefix::new(name)),
            Some("") => return Err(ParseSysError::EmptyDetector(s.to_string())),
            Some(det) => SysRef::Qualified(CameraSys::with_detector(name, det)),
        })
    }
}

impl FromStr for CameraSys {
    type Err = ParseSysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<SysRef>()? {
            SysRef::Qualified(sys) => Ok(sys),
            SysRef::Prefix(_) => Err(ParseSysError::UnexpectedPrefix(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_includes_detector() {
        let a = CameraSys::with_detector(PIXELS, "A");
        let b = CameraSys::with_detector(PIXELS, "B");
        let plain = CameraSys::new(PIXELS);
        assert_ne!(a, b);
        assert_ne!(a, plain);
        let set: HashSet<_> = [a.clone(), b, plain, a].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn display_and_parse_agree() {
        for text in ["FocalPlane", "Pixels:R22_S11", "TanPixels:*"] {
            let parsed: SysRef = text.parse().expect("parse");
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn parse_rejects_malformed_names() {
        assert!(matches!(
            ":A".parse::<SysRef>(),
            Err(ParseSysError::EmptyName(_))
        ));
        assert!(matches!(
            "Pixels:".parse::<SysRef>(),
            Err(ParseSysError::EmptyDetector(_))
        ));
        assert!(matches!(
            "Pixels:*".parse::<CameraSys>(),
            Err(ParseSysError::UnexpectedPrefix(_))
        ));
    }

    #[test]
    fn prefix_binds_to_detector() {
        let sys = CameraSysPrefix::pixels().bind("A");
        assert_eq!(sys.detector_name(), Some("A"));
        assert_eq!(sys.prefix(), CameraSysPrefix::pixels());
    }
}
