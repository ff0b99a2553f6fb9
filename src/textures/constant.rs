// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;

/// Uniform parameter, the usual input for albedo, roughness and scale slots.
pub struct ConstantTexture(RGBSpectrum);

impl ConstantTexture {
    pub fn new(value: RGBSpectrum) -> Self {
        Self(value)
    }

    pub fn grey(v: Float) -> Self {
        Self(RGBSpectrum::splat(v))
    }
}

impl Texture for ConstantTexture {
    fn eval(&self, _uv: Vector2f) -> RGBSpectrum {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_uv() {
        let tex = ConstantTexture::new(RGBSpectrum::new(0.25, 0.5, 0.75));
        assert_eq!(tex.eval(Vector2f::new(0.1, 0.9)), tex.eval(Vector2f::new(7.0, -3.0)));
        assert_eq!(ConstantTexture::grey(0.5).eval(Vector2f::zeros()), RGBSpectrum::splat(0.5));
    }
}
