// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;

/// Two-colour checkerboard in uv space with `frequency` checks per unit.
pub struct CheckerTexture {
    even: RGBSpectrum,
    odd: RGBSpectrum,
    frequency: Float,
}

impl CheckerTexture {
    pub fn new(even: RGBSpectrum, odd: RGBSpectrum, frequency: Float) -> Self {
        Self { even, odd, frequency: frequency.abs().max(1e-3) }
    }
}

impl Texture for CheckerTexture {
    fn eval(&self, uv: Vector2f) -> RGBSpectrum {
        let iu = (uv.x * self.frequency).floor() as i64;
        let iv = (uv.y * self.frequency).floor() as i64;
        if (iu + iv).rem_euclid(2) == 0 {
            self.even
        } else {
            self.odd
        }
    }
}
