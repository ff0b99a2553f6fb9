// Copyright @yucwang 2026

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{ BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF };
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Passes every ray straight through. Bounds participating media.
pub struct InvisibleBSDF;

impl BSDF for InvisibleBSDF {
    fn eval(&self, _wi: &Vector3f, _wo: &Vector3f, _mode: TransportMode) -> BSDFValue {
        BSDFValue::default()
    }

    fn sample(&self, wo: &Vector3f, _mode: TransportMode, _u: &Vector3f) -> Option<BSDFSampleRecord> {
        let cos_theta = wo.z.abs();
        if cos_theta <= 1e-6 {
            return None;
        }
        let value = 1.0 / cos_theta;
        Some(BSDFSampleRecord {
            wi: -wo,
            f: RGBSpectrum::splat(value),
            pdf: 1.0,
            is_delta: true,
        })
    }

    fn pdf(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        0.0
    }

    fn albedo(&self) -> RGBSpectrum {
        RGBSpectrum::one()
    }

    fn is_delta(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct InvisibleSurface;

impl InvisibleSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Material for InvisibleSurface {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        ShadingPoint::new(arena.alloc(InvisibleBSDF), it)
    }

    fn is_null_interface(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector2f;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "expected {} ~ {}", a, b);
    }

    #[test]
    fn test_sample_opposite_direction() {
        let wo = Vector3f::new(0.1, -0.2, 0.97).normalize();
        let sample = InvisibleBSDF.sample(&wo, TransportMode::Radiance, &Vector3f::new(0.3, 0.7, 0.1))
            .expect("sample");
        assert_close(sample.wi.x, -wo.x);
        assert_close(sample.wi.y, -wo.y);
        assert_close(sample.wi.z, -wo.z);
        assert_close(sample.pdf, 1.0);
        assert!(sample.is_delta);
        let weight = sample.f * sample.wi.z.abs() / sample.pdf;
        assert_close(weight.r(), 1.0);
    }

    #[test]
    fn test_eval_is_zero() {
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let result = InvisibleBSDF.eval(&wi, &-wi, TransportMode::Radiance);
        assert!(result.is_black());
        assert_close(InvisibleBSDF.pdf(&wi, &-wi), 0.0);
    }

    #[test]
    fn test_shading_point_passes_through() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.3, 0.0, 0.9).normalize();
        let it = SurfaceIntersection::new(Vector3f::zeros(), n, n, Vector2f::zeros(), 1.0, wo);
        let arena = ScratchArena::new();
        let sp = InvisibleSurface::new().shade(&it, &arena);
        let rec = sp.sample(&wo, TransportMode::Radiance, &Vector3f::zeros()).expect("pass");
        assert!((rec.wi + wo).norm() < 1e-5);
    }
}
