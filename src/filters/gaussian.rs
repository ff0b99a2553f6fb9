// Copyright @yucwang 2026

use crate::core::error::ConstructionError;
use crate::core::filter::FilmFilter;
use crate::math::constants::Float;

/// Separable Gaussian shifted to reach zero at `radius`.
pub struct GaussianFilter {
    radius: Float,
    alpha: Float,
    edge: Float,
}

impl GaussianFilter {
    pub fn new(radius: Float, alpha: Float) -> Result<Self, ConstructionError> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(ConstructionError::parameter("radius", format!("{} is not a positive radius", radius)));
        }
        if !(alpha > 0.0) || !alpha.is_finite() {
            return Err(ConstructionError::parameter("alpha", format!("{} is not a positive falloff", alpha)));
        }
        Ok(Self { radius, alpha, edge: (-alpha * radius * radius).exp() })
    }

    fn eval_1d(&self, d: Float) -> Float {
        ((-self.alpha * d * d).exp() - self.edge).max(0.0)
    }
}

impl FilmFilter for GaussianFilter {
    fn radius(&self) -> Float {
        self.radius
    }

    fn eval(&self, dx: Float, dy: Float) -> Float {
        self.eval_1d(dx) * self.eval_1d(dy)
    }
}
