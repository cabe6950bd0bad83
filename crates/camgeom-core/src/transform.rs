use crate::{AffineMap, Homography, RadialMap};
use nalgebra::Point2;

/// Numerical failures of a plane transform.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("transform is not invertible")]
    Singular,
    #[error("point maps to infinity")]
    PointAtInfinity,
    #[error("invalid radial coefficients: {0}")]
    InvalidCoefficients(&'static str),
    #[error("inverse did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}

/// An invertible 2D map between two coordinate frames.
///
/// `forward` maps from the source frame to the target frame, `reverse` goes
/// back. Registries store one of these per coordinate system, with the
/// forward direction leaving the native frame.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaneTransform {
    Identity,
    Affine(AffineMap),
    Homography(Homography),
    Radial(RadialMap),
    /// Applied left to right in the forward direction.
    Chain(Vec<PlaneTransform>),
    /// A transform with its directions swapped.
    Inverted(Box<PlaneTransform>),
}

impl PlaneTransform {
    pub fn forward(&self, p: Point2<f64>) -> Result<Point2<f64>, TransformError> {
        match self {
            PlaneTransform::Identity => Ok(p),
            PlaneTransform::Affine(a) => Ok(a.apply(p)),
            PlaneTransform::Homography(h) => h.apply(p),
            PlaneTransform::Radial(r) => Ok(r.forward(p)),
            PlaneTransform::Chain(steps) => steps.iter().try_fold(p, |q, t| t.forward(q)),
            PlaneTransform::Inverted(inner) => inner.reverse(p),
        }
    }

    pub fn reverse(&self, p: Point2<f64>) -> Result<Point2<f64>, TransformError> {
        match self {
            PlaneTransform::Identity => Ok(p),
            PlaneTransform::Affine(a) => Ok(a.inverse().ok_or(TransformError::Singular)?.apply(p)),
            PlaneTransform::Homography(h) => h.inverse().ok_or(TransformError::Singular)?.apply(p),
            PlaneTransform::Radial(r) => r.reverse(p),
            PlaneTransform::Chain(steps) => steps.iter().rev().try_fold(p, |q, t| t.reverse(q)),
            PlaneTransform::Inverted(inner) => inner.forward(p),
        }
    }

    /// Swap the forward and reverse directions.
    ///
    /// Affine maps and homographies are inverted eagerly so the result stays
    /// cheap to apply; other variants are wrapped.
    pub fn inverted(self) -> Result<Self, TransformError> {
        Ok(match self {
            PlaneTransform::Identity => PlaneTransform::Identity,
            PlaneTransform::Affine(a) => {
                PlaneTransform::Affine(a.inverse().ok_or(TransformError::Singular)?)
            }
            PlaneTransform::Homography(h) => {
                PlaneTransform::Homography(h.inverse().ok_or(TransformError::Singular)?)
            }
            PlaneTransform::Inverted(inner) => *inner,
            other => PlaneTransform::Inverted(Box::new(other)),
        })
    }

    /// Append `next` after `self` in the forward direction.
    pub fn then(self, next: PlaneTransform) -> Self {
        match (self, next) {
            (PlaneTransform::Identity, t) | (t, PlaneTransform::Identity) => t,
            (PlaneTransform::Affine(a), PlaneTransform::Affine(b)) => {
                PlaneTransform::Affine(a.then(&b))
            }
            (PlaneTransform::Chain(mut steps), t) => {
                steps.push(t);
                PlaneTransform::Chain(steps)
            }
            (a, b) => PlaneTransform::Chain(vec![a, b]),
        }
    }
}

impl From<AffineMap> for PlaneTransform {
    fn from(a: AffineMap) -> Self {
        PlaneTransform::Affine(a)
    }
}

impl From<Homography> for PlaneTransform {
    fn from(h: Homography) -> Self {
        PlaneTransform::Homography(h)
    }
}

impl From<RadialMap> for PlaneTransform {
    fn from(r: RadialMap) -> Self {
        PlaneTransform::Radial(r)
    }
}
