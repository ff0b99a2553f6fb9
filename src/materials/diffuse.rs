// Copyright @yucwang 2023

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{ BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF };
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::texture::Texture;
use crate::math::constants::{ Float, Vector2f, Vector3f, INV_PI };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Two-sided Lambertian reflection.
pub struct DiffuseBSDF {
    albedo: RGBSpectrum,
}

impl DiffuseBSDF {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self { albedo: albedo.clamp(0.0, 1.0) }
    }
}

impl BSDF for DiffuseBSDF {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, _mode: TransportMode) -> BSDFValue {
        if wi.z * wo.z <= 0.0 {
            return BSDFValue::default();
        }
        self.albedo * INV_PI
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        if wo.z == 0.0 {
            return None;
        }
        let mut wi = sample_cosine_hemisphere(&Vector2f::new(u.x, u.y));
        if wo.z < 0.0 {
            wi.z *= -1.0;
        }
        let pdf = sample_cosine_hemisphere_pdf(wi.z.abs());
        if pdf <= 0.0 {
            return None;
        }

        Some(BSDFSampleRecord { wi, f: self.eval(&wi, wo, mode), pdf, is_delta: false })
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        if wi.z * wo.z <= 0.0 {
            return 0.0;
        }
        sample_cosine_hemisphere_pdf(wi.z.abs())
    }

    fn albedo(&self) -> RGBSpectrum {
        self.albedo
    }
}

pub struct DiffuseMaterial {
    albedo: Arc<dyn Texture>,
}

impl DiffuseMaterial {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for DiffuseMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let bsdf = arena.alloc(DiffuseBSDF::new(self.albedo.eval(it.uv())));
        ShadingPoint::new(bsdf, it)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    fn assert_close(a: Float, b: Float, tol: Float) {
        assert!((a - b).abs() < tol, "expected {} ~ {}", a, b);
    }

    #[test]
    fn test_energy_conservation() {
        let rho = RGBSpectrum::new(0.8, 0.5, 0.2);
        let bsdf = DiffuseBSDF::new(rho);
        let wo = Vector3f::new(0.2, 0.1, 0.9).normalize();

        // Uniform hemisphere estimate of the directional albedo.
        let mut rng = LcgRng::new(3);
        let n = 20000;
        let mut sum = RGBSpectrum::default();
        for _ in 0..n {
            let u = Vector2f::new(rng.next_f32(), rng.next_f32());
            let wi = crate::math::warp::sample_uniform_hemisphere(&u);
            let pdf = crate::math::warp::sample_uniform_hemisphere_pdf();
            sum += bsdf.eval(&wi, &wo, TransportMode::Radiance) * (wi.z / pdf);
        }
        let estimate = sum / n as Float;
        assert_close(estimate.r(), 0.8, 0.03);
        assert_close(estimate.g(), 0.5, 0.03);
        assert_close(estimate.b(), 0.2, 0.03);
    }

    #[test]
    fn test_sample_matches_pdf_and_side() {
        let bsdf = DiffuseBSDF::new(RGBSpectrum::splat(0.5));
        let wo = Vector3f::new(0.0, 0.3, -0.9).normalize();
        let rec = bsdf.sample(&wo, TransportMode::Radiance, &Vector3f::new(0.4, 0.7, 0.1)).expect("sample");
        assert!(rec.wi.z < 0.0);
        assert!(!rec.is_delta);
        assert_close(rec.pdf, bsdf.pdf(&rec.wi, &wo), 1e-6);
        let weight = rec.f * rec.wi.z.abs() / rec.pdf;
        assert_close(weight.r(), 0.5, 1e-4);
        assert!(bsdf.eval(&Vector3f::new(0.0, 0.0, 1.0), &wo, TransportMode::Radiance).is_black());
    }
}
