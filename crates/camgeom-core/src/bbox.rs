use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer pixel box with inclusive bounds.
///
/// `min` and `max` are both pixel indices inside the box, so a box from
/// `[0, 0]` to `[9, 9]` covers 10x10 pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Box2I {
    pub min: [i32; 2],
    pub max: [i32; 2],
}

impl Box2I {
    pub fn new(min: [i32; 2], max: [i32; 2]) -> Self {
        Self { min, max }
    }

    /// Box starting at `min` with the given pixel dimensions.
    pub fn from_dimensions(min: [i32; 2], width: i32, height: i32) -> Self {
        Self {
            min,
            max: [min[0] + width - 1, min[1] + height - 1],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max[0] < self.min[0] || self.max[1] < self.min[1]
    }

    pub fn width(&self) -> i32 {
        (self.max[0] - self.min[0] + 1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.max[1] - self.min[1] + 1).max(0)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min[0]..=self.max[0]).contains(&x) && (self.min[1]..=self.max[1]).contains(&y)
    }
}

/// Floating-point box, half-open: `min <= p < max` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Box2D {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Box2D {
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// A box that contains nothing and grows on the first `include`.
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x < self.max.x && self.min.y < self.max.y)
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::from((self.min.coords + self.max.coords) * 0.5)
    }

    #[inline]
    pub fn contains(&self, p: Point2<f64>) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Grow the box so `p` lies on or inside its boundary.
    pub fn include(&mut self, p: Point2<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}

impl From<Box2I> for Box2D {
    /// Pixel centers sit on integer coordinates, so the float box extends
    /// half a pixel beyond the outermost centers.
    fn from(b: Box2I) -> Self {
        if b.is_empty() {
            return Box2D::empty();
        }
        Box2D {
            min: Point2::new(b.min[0] as f64 - 0.5, b.min[1] as f64 - 0.5),
            max: Point2::new(b.max[0] as f64 + 0.5, b.max[1] as f64 + 0.5),
        }
    }
}
