use crate::TransformError;
use nalgebra::Point2;

const MAX_ITERATIONS: usize = 50;
const REL_TOLERANCE: f64 = 1e-12;

/// Radially symmetric polynomial distortion about the origin.
///
/// A point at radius `r` moves to radius `r' = c1*r + c2*r^2 + ...` along the
/// same direction. `coeffs[0]` must be zero so the origin is fixed, and
/// `coeffs[1]` must be nonzero so the map is locally invertible there.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialMap {
    coeffs: Vec<f64>,
}

impl RadialMap {
    pub fn new(coeffs: Vec<f64>) -> Result<Self, TransformError> {
        if coeffs.len() < 2 {
            return Err(TransformError::InvalidCoefficients(
                "need at least two coefficients",
            ));
        }
        if coeffs[0] != 0.0 {
            return Err(TransformError::InvalidCoefficients("coeffs[0] must be 0"));
        }
        if coeffs[1] == 0.0 {
            return Err(TransformError::InvalidCoefficients("coeffs[1] must be nonzero"));
        }
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(TransformError::InvalidCoefficients("coefficients must be finite"));
        }
        Ok(Self { coeffs })
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    fn poly(&self, r: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * r + c)
    }

    fn poly_derivative(&self, r: f64) -> f64 {
        self.coeffs
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (i, c)| acc * r + i as f64 * c)
    }

    /// Solve `poly(r) = target` for `r` with Newton iteration.
    fn poly_inverse(&self, target: f64) -> Result<f64, TransformError> {
        let mut r = target / self.coeffs[1];
        for _ in 0..MAX_ITERATIONS {
            let slope = self.poly_derivative(r);
            if slope == 0.0 || !slope.is_finite() {
                break;
            }
            let step = (self.poly(r) - target) / slope;
            r -= step;
            if step.abs() <= REL_TOLERANCE * r.abs().max(1.0) {
                return Ok(r);
            }
        }
        Err(TransformError::NoConvergence {
            iterations: MAX_ITERATIONS,
        })
    }

    pub fn forward(&self, p: Point2<f64>) -> Point2<f64> {
        let r = p.coords.norm();
        if r == 0.0 {
            return p;
        }
        Point2::from(p.coords * (self.poly(r) / r))
    }

    pub fn reverse(&self, p: Point2<f64>) -> Result<Point2<f64>, TransformError> {
        let r_out = p.coords.norm();
        if r_out == 0.0 {
            return Ok(p);
        }
        let r = self.poly_inverse(r_out)?;
        Ok(Point2::from(p.coords * (r / r_out)))
    }
}
