// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Pixel reconstruction filter. Offsets are absolute distances from the pixel center.
pub trait FilmFilter: Send + Sync {
    fn radius(&self) -> Float;
    fn eval(&self, dx: Float, dy: Float) -> Float;
}
