// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

/// Linear RGB radiometric quantity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

pub const SPECTRUM_COMPONENT_COUNT: usize = 3;

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn one() -> Self {
        Self::splat(1.0)
    }

    pub fn from_vec(v: Vector3f) -> Self {
        Self { rgb: v }
    }

    pub fn to_vec(&self) -> Vector3f {
        self.rgb
    }

    pub fn r(&self) -> Float {
        self.rgb.x
    }

    pub fn g(&self) -> Float {
        self.rgb.y
    }

    pub fn b(&self) -> Float {
        self.rgb.z
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|c| *c == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    pub fn max_component(&self) -> Float {
        self.rgb.x.max(self.rgb.y).max(self.rgb.z)
    }

    pub fn average(&self) -> Float {
        (self.rgb.x + self.rgb.y + self.rgb.z) / 3.0
    }

    pub fn luminance(&self) -> Float {
        0.2126 * self.rgb.x + 0.7152 * self.rgb.y + 0.0722 * self.rgb.z
    }

    pub fn exp(&self) -> Self {
        Self::new(self.rgb.x.exp(), self.rgb.y.exp(), self.rgb.z.exp())
    }

    pub fn sqrt(&self) -> Self {
        Self::new(self.rgb.x.max(0.0).sqrt(), self.rgb.y.max(0.0).sqrt(), self.rgb.z.max(0.0).sqrt())
    }

    pub fn clamp(&self, lo: Float, hi: Float) -> Self {
        Self::new(self.rgb.x.clamp(lo, hi), self.rgb.y.clamp(lo, hi), self.rgb.z.clamp(lo, hi))
    }

    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self::new(f(self.rgb.x), f(self.rgb.y), f(self.rgb.z))
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.rgb[idx]
    }
}

impl ops::IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, idx: usize) -> &mut Float {
        &mut self.rgb[idx]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { rgb: self.rgb - rhs.rgb }
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        self.rgb.component_mul_assign(&rhs.rgb);
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl ops::Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        rhs * self
    }
}

impl ops::MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        self.rgb *= rhs;
    }
}

impl ops::Div for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_div(&rhs.rgb) }
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}

impl ops::DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, rhs: Float) {
        self.rgb /= rhs;
    }
}

impl ops::Neg for RGBSpectrum {
    type Output = Self;

    fn neg(self) -> Self {
        Self { rgb: -self.rgb }
    }
}
