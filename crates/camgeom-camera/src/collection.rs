use crate::{CameraBuildError, CameraError, Detector};
use camgeom_core::Box2D;
use std::collections::HashMap;
use std::ops::Index;

/// Detectors in insertion order, indexable by position, name and id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectorCollection {
    detectors: Vec<Detector>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<i32, usize>,
}

impl DetectorCollection {
    pub fn new<I>(detectors: I) -> Result<Self, CameraBuildError>
    where
        I: IntoIterator<Item = Detector>,
    {
        let mut out = Self::default();
        for det in detectors {
            let index = out.detectors.len();
            if out.by_name.contains_key(det.name()) {
                return Err(CameraBuildError::DuplicateName(det.name().to_string()));
            }
            if let Some(&first) = out.by_id.get(&det.id()) {
                return Err(CameraBuildError::DuplicateId {
                    id: det.id(),
                    first: out.detectors[first].name().to_string(),
                    second: det.name().to_string(),
                });
            }
            out.by_name.insert(det.name().to_string(), index);
            out.by_id.insert(det.id(), index);
            out.detectors.push(det);
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Detector> {
        self.by_name.get(name).map(|&i| &self.detectors[i])
    }

    pub fn get_index(&self, index: usize) -> Option<&Detector> {
        self.detectors.get(index)
    }

    pub fn by_id(&self, id: i32) -> Option<&Detector> {
        self.by_id.get(&id).map(|&i| &self.detectors[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detector> {
        self.detectors.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.detectors.iter().map(Detector::name)
    }

    /// Box in the native system covering every detector's corners.
    pub fn fp_bbox(&self) -> Result<Box2D, CameraError> {
        let mut bbox = Box2D::empty();
        for det in &self.detectors {
            let corners = det.corners(det.native_sys().clone())?;
            corners.into_iter().for_each(|c| bbox.include(c));
        }
        Ok(bbox)
    }
}

impl Index<usize> for DetectorCollection {
    type Output = Detector;

    fn index(&self, index: usize) -> &Detector {
        &self.detectors[index]
    }
}

impl Index<&str> for DetectorCollection {
    type Output = Detector;

    fn index(&self, name: &str) -> &Detector {
        match self.get(name) {
            Some(det) => det,
            None => panic!("no detector named {name:?}"),
        }
    }
}

impl<'a> IntoIterator for &'a DetectorCollection {
    type Item = &'a Detector;
    type IntoIter = std::slice::Iter<'a, Detector>;

    fn into_iter(self) -> Self::IntoIter {
        self.detectors.iter()
    }
}
