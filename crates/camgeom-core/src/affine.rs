use nalgebra::{Matrix2, Point2, Vector2};

/// Affine map `p' = linear * p + translation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMap {
    pub linear: Matrix2<f64>,
    pub translation: Vector2<f64>,
}

impl AffineMap {
    pub fn identity() -> Self {
        Self::translation_only(Vector2::zeros())
    }

    pub fn new(linear: Matrix2<f64>, translation: Vector2<f64>) -> Self {
        Self {
            linear,
            translation,
        }
    }

    pub fn translation_only(translation: Vector2<f64>) -> Self {
        Self {
            linear: Matrix2::identity(),
            translation,
        }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            linear: Matrix2::new(sx, 0.0, 0.0, sy),
            translation: Vector2::zeros(),
        }
    }

    /// Build from a row-major 2x2 linear part and a translation.
    pub fn from_arrays(linear: [[f64; 2]; 2], translation: [f64; 2]) -> Self {
        Self::new(
            Matrix2::new(linear[0][0], linear[0][1], linear[1][0], linear[1][1]),
            Vector2::new(translation[0], translation[1]),
        )
    }

    pub fn to_arrays(&self) -> ([[f64; 2]; 2], [f64; 2]) {
        (
            [
                [self.linear[(0, 0)], self.linear[(0, 1)]],
                [self.linear[(1, 0)], self.linear[(1, 1)]],
            ],
            [self.translation.x, self.translation.y],
        )
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        Point2::from(self.linear * p.coords + self.translation)
    }

    pub fn inverse(&self) -> Option<Self> {
        let inv = self.linear.try_inverse()?;
        Some(Self {
            linear: inv,
            translation: -(inv * self.translation),
        })
    }

    /// The map that applies `self` first and `next` second.
    pub fn then(&self, next: &AffineMap) -> Self {
        Self {
            linear: next.linear * self.linear,
            translation: next.linear * self.translation + next.translation,
        }
    }
}

impl Default for AffineMap {
    fn default() -> Self {
        Self::identity()
    }
}
