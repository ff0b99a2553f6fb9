// Copyright @yucwang 2026

use crate::core::sampler::Sample5;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterFlag(u8);

impl EmitterFlag {
    pub const NONE: Self = Self(0);
    pub const DIRECTION: Self = Self(1 << 0);
    pub const SURFACE: Self = Self(1 << 1);
    pub const DELTA: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for EmitterFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EmitterFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Incident radiance sampled from a reference point.
///
/// `pdf` is a solid angle density at the reference point, or the discrete
/// probability 1 for delta emitters.
#[derive(Debug, Clone, Copy)]
pub struct LightSampleRecord {
    pub ref_p: Vector3f,
    pub pos: Vector3f,
    pub nor: Vector3f,
    pub radiance: RGBSpectrum,
    pub pdf: Float,
    pub is_delta: bool,
}

impl LightSampleRecord {
    pub fn ref_to_light(&self) -> Vector3f {
        (self.pos - self.ref_p).normalize()
    }
}

/// Emitted ray sampled from the light itself.
#[derive(Debug, Clone, Copy)]
pub struct LightEmitRecord {
    pub pos: Vector3f,
    pub dir: Vector3f,
    pub nor: Vector3f,
    pub radiance: RGBSpectrum,
    /// Area density of `pos`.
    pub pdf_pos: Float,
    /// Solid angle density of `dir` at `pos`.
    pub pdf_dir: Float,
}

/// Light source. Area emitters are bound to an entity's shape; all others
/// live at infinity and see the scene bounds through `preprocess`.
pub trait Emitter: Send + Sync {
    fn flag(&self) -> EmitterFlag;

    fn is_area(&self) -> bool {
        self.flag().contains(EmitterFlag::SURFACE)
    }

    fn is_delta(&self) -> bool {
        self.flag().contains(EmitterFlag::DELTA)
    }

    /// Receives the scene bounds once the scene is assembled.
    fn preprocess(&mut self, _scene_bounds: &AABB) {}

    fn sample_li(&self, ref_p: &Vector3f, sam: &Sample5) -> Option<LightSampleRecord>;

    fn sample_le(&self, sam: &Sample5) -> Option<LightEmitRecord>;

    /// Densities of `sample_le` producing `(pos, dir)`, as `(pdf_pos, pdf_dir)`.
    fn pdf_le(&self, pos: &Vector3f, dir: &Vector3f, nor: &Vector3f) -> (Float, Float);

    fn power(&self) -> RGBSpectrum;

    /// Radiance leaving an area emitter at `pos` towards `light_to_out`.
    fn radiance(&self, _pos: &Vector3f, _nor: &Vector3f, _light_to_out: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    /// Solid angle density of `sample_li` hitting `pos` on an area emitter.
    fn pdf_li(&self, _ref_p: &Vector3f, _pos: &Vector3f, _nor: &Vector3f) -> Float {
        0.0
    }

    /// Radiance arriving along a ray that escapes the scene in direction `dir`.
    fn non_area_le(&self, _dir: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    /// Solid angle density of `sample_li` choosing the direction `ref_to_light`.
    fn pdf_li_dir(&self, _ref_p: &Vector3f, _ref_to_light: &Vector3f) -> Float {
        0.0
    }
}

/// Converts an area density at `pos` into a solid angle density at `ref_p`.
pub fn area_to_solid_angle(pdf_area: Float, ref_p: &Vector3f, pos: &Vector3f, nor: &Vector3f) -> Float {
    let to_ref = ref_p - pos;
    let dist2 = to_ref.norm_squared();
    if dist2 <= 0.0 {
        return 0.0;
    }
    let cos = nor.dot(&to_ref).abs() / dist2.sqrt();
    if cos <= 0.0 {
        return 0.0;
    }
    pdf_area * dist2 / cos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let flag = EmitterFlag::DIRECTION | EmitterFlag::DELTA;
        assert!(flag.contains(EmitterFlag::DELTA));
        assert!(!flag.contains(EmitterFlag::SURFACE));
        let mut flag = EmitterFlag::NONE;
        flag |= EmitterFlag::SURFACE;
        assert!(flag.contains(EmitterFlag::SURFACE));
    }

    #[test]
    fn test_area_to_solid_angle() {
        let nor = Vector3f::new(0.0, 0.0, 1.0);
        let pos = Vector3f::zeros();
        let pdf = area_to_solid_angle(0.5, &Vector3f::new(0.0, 0.0, 2.0), &pos, &nor);
        assert!((pdf - 2.0).abs() < 1e-5);
        let grazing = area_to_solid_angle(0.5, &Vector3f::new(2.0, 0.0, 0.0), &pos, &nor);
        assert_eq!(grazing, 0.0);
    }
}
