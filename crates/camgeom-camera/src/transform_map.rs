use crate::{CameraSys, TransformMapError};
use camgeom_core::{PlaneTransform, Point2};
use std::collections::BTreeMap;

/// Registry of coordinate systems reachable from one native system.
///
/// Every entry stores a [`PlaneTransform`] whose forward direction maps the
/// native system into the entry's system. The native system itself is always
/// present and maps through the identity.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformMap {
    native: CameraSys,
    transforms: BTreeMap<CameraSys, PlaneTransform>,
}

impl TransformMap {
    /// A map that only knows its native system.
    pub fn native_only(native: CameraSys) -> Self {
        Self {
            native,
            transforms: BTreeMap::new(),
        }
    }

    pub fn new<I>(native: CameraSys, entries: I) -> Result<Self, TransformMapError>
    where
        I: IntoIterator<Item = (CameraSys, PlaneTransform)>,
    {
        let mut map = Self::native_only(native);
        for (sys, transform) in entries {
            map.insert(sys, transform)?;
        }
        Ok(map)
    }

    fn insert(&mut self, sys: CameraSys, transform: PlaneTransform) -> Result<(), TransformMapError> {
        if sys == self.native {
            return Err(TransformMapError::NativeEntry(sys));
        }
        if self.transforms.contains_key(&sys) {
            return Err(TransformMapError::DuplicateSys(sys));
        }
        self.transforms.insert(sys, transform);
        Ok(())
    }

    pub fn native_sys(&self) -> &CameraSys {
        &self.native
    }

    pub fn contains(&self, sys: &CameraSys) -> bool {
        *sys == self.native || self.transforms.contains_key(sys)
    }

    /// The registered transform for `sys`; `None` for the native system and
    /// for unknown systems.
    pub fn get(&self, sys: &CameraSys) -> Option<&PlaneTransform> {
        self.transforms.get(sys)
    }

    /// Native system first, then the registered systems in sorted order.
    pub fn systems(&self) -> impl Iterator<Item = &CameraSys> + '_ {
        std::iter::once(&self.native).chain(self.transforms.keys())
    }

    pub fn to_native(&self, point: Point2<f64>, from: &CameraSys) -> Result<Point2<f64>, TransformMapError> {
        if *from == self.native {
            return Ok(point);
        }
        let t = self
            .transforms
            .get(from)
            .ok_or_else(|| TransformMapError::UnknownSys(from.clone()))?;
        Ok(t.reverse(point)?)
    }

    pub fn from_native(&self, point: Point2<f64>, to: &CameraSys) -> Result<Point2<f64>, TransformMapError> {
        if *to == self.native {
            return Ok(point);
        }
        let t = self
            .transforms
            .get(to)
            .ok_or_else(|| TransformMapError::UnknownSys(to.clone()))?;
        Ok(t.forward(point)?)
    }

    /// Move `point` from `from` to `to` through the native system.
    pub fn transform(
        &self,
        point: Point2<f64>,
        from: &CameraSys,
        to: &CameraSys,
    ) -> Result<Point2<f64>, TransformMapError> {
        if from == to {
            if self.contains(from) {
                return Ok(point);
            }
            return Err(TransformMapError::UnknownSys(from.clone()));
        }
        // Check both ends before doing any arithmetic.
        if !self.contains(to) {
            return Err(TransformMapError::UnknownSys(to.clone()));
        }
        let native = self.to_native(point, from)?;
        self.from_native(native, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FOCAL_PLANE, PIXELS};
    use approx::assert_abs_diff_eq;
    use camgeom_core::{AffineMap, Vector2};

    fn pixels_a() -> CameraSys {
        CameraSys::with_detector(PIXELS, "A")
    }

    fn sample() -> TransformMap {
        TransformMap::new(
            CameraSys::new(FOCAL_PLANE),
            [
                (pixels_a(), AffineMap::scaling(100.0, 100.0).into()),
                (
                    CameraSys::new("Shifted"),
                    AffineMap::translation_only(Vector2::new(1.0, -2.0)).into(),
                ),
            ],
        )
        .expect("build map")
    }

    #[test]
    fn native_is_always_present() {
        let map = TransformMap::native_only(CameraSys::focal_plane());
        assert!(map.contains(&CameraSys::focal_plane()));
        assert_eq!(map.systems().count(), 1);
    }

    #[test]
    fn transforms_through_native() {
        let map = sample();
        let p = map
            .transform(Point2::new(150.0, 250.0), &pixels_a(), &CameraSys::new("Shifted"))
            .expect("transform");
        assert_abs_diff_eq!(p.x, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn unknown_system_is_reported() {
        let map = sample();
        let missing = CameraSys::with_detector(PIXELS, "B");
        let err = map
            .transform(Point2::origin(), &missing, &CameraSys::focal_plane())
            .unwrap_err();
        assert_eq!(err, TransformMapError::UnknownSys(missing));
    }

    #[test]
    fn build_rejects_duplicates_and_native_entries() {
        let dup = TransformMap::new(
            CameraSys::focal_plane(),
            [
                (pixels_a(), PlaneTransform::Identity),
                (pixels_a(), PlaneTransform::Identity),
            ],
        );
        assert_eq!(dup.unwrap_err(), TransformMapError::DuplicateSys(pixels_a()));

        let native = TransformMap::new(
            CameraSys::focal_plane(),
            [(CameraSys::focal_plane(), PlaneTransform::Identity)],
        );
        assert!(matches!(native, Err(TransformMapError::NativeEntry(_))));
    }

    #[test]
    fn systems_list_native_first() {
        let names: Vec<String> = sample().systems().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["FocalPlane", "Pixels:A", "Shifted"]);
    }
}
