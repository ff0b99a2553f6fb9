// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, TransportMode, BSDF};
use crate::materials::microfacet::{clearcoat_gloss_to_alpha, fresnel_schlick, ggx_g, gtr1_d,
                                   reflect, sample_gtr1};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

const CLEARCOAT_F0: Float = 0.04;
/// Fixed shadowing roughness of the coat.
const CLEARCOAT_G_ALPHA: Float = 0.25;

/// Thin glossy coat: GTR1 highlight with a fixed index-1.5 Fresnel.
///
/// Reflective only, upper hemisphere only. `weight` is saturated into `[0, 1]`.
pub struct ClearcoatBSDF {
    weight: Float,
    alpha: Float,
}

impl ClearcoatBSDF {
    pub fn new(weight: Float, gloss: Float) -> Self {
        let weight = if weight.is_finite() { weight.clamp(0.0, 1.0) } else { 0.0 };
        Self { weight, alpha: clearcoat_gloss_to_alpha(gloss) }
    }

    fn half_vector(wi: &Vector3f, wo: &Vector3f) -> Option<Vector3f> {
        if wi.z <= 1e-6 || wo.z <= 1e-6 {
            return None;
        }
        let m = wi + wo;
        if m.norm_squared() <= 0.0 {
            return None;
        }
        Some(m.normalize())
    }
}

impl BSDF for ClearcoatBSDF {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, _mode: TransportMode) -> BSDFValue {
        let m = match Self::half_vector(wi, wo) {
            Some(m) => m,
            None => return BSDFValue::default(),
        };
        let d = gtr1_d(m.z, self.alpha);
        let g = ggx_g(wi.z, wo.z, CLEARCOAT_G_ALPHA);
        let f = fresnel_schlick(RGBSpectrum::splat(CLEARCOAT_F0), wo.dot(&m));
        f * (self.weight * d * g / (4.0 * wi.z * wo.z))
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        if wo.z <= 1e-6 {
            return None;
        }
        let m = sample_gtr1(&Vector2f::new(u.x, u.y), self.alpha);
        let wi = reflect(wo, &m).normalize();
        if wi.z <= 1e-6 {
            return None;
        }
        let cos_o_m = wo.dot(&m);
        if cos_o_m <= 1e-6 {
            return None;
        }
        let pdf = gtr1_d(m.z, self.alpha) * m.z / (4.0 * cos_o_m);
        if !(pdf > 0.0) || !pdf.is_finite() {
            return None;
        }
        Some(BSDFSampleRecord { wi, f: self.eval(&wi, wo, mode), pdf, is_delta: false })
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        let m = match Self::half_vector(wi, wo) {
            Some(m) => m,
            None => return 0.0,
        };
        let cos_o_m = wo.dot(&m);
        if cos_o_m <= 1e-6 {
            return 0.0;
        }
        gtr1_d(m.z, self.alpha) * m.z / (4.0 * cos_o_m)
    }

    fn albedo(&self) -> RGBSpectrum {
        RGBSpectrum::splat(self.weight * CLEARCOAT_F0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    #[test]
    fn test_sampled_pdf_matches_eval_pdf() {
        let coat = ClearcoatBSDF::new(1.0, 0.0);
        let wo = Vector3f::new(0.5, -0.2, 0.8).normalize();
        let mut rng = LcgRng::new(5);
        let n = 2000;
        let mut accepted = 0;
        let mut sum = 0.0;
        for _ in 0..n {
            let u = Vector3f::new(rng.next_f32(), rng.next_f32(), rng.next_f32());
            if let Some(rec) = coat.sample(&wo, TransportMode::Radiance, &u) {
                accepted += 1;
                let pdf = coat.pdf(&rec.wi, &wo);
                assert!((rec.pdf - pdf).abs() <= 5e-2 * pdf, "sampled {} evaluated {}", rec.pdf, pdf);
                assert_eq!(rec.f, coat.eval(&rec.wi, &wo, TransportMode::Radiance));
                let weight = (rec.f * rec.wi.z / rec.pdf).r();
                assert!(weight.is_finite() && weight >= 0.0);
                sum += weight;
            }
        }
        assert!(accepted > 1800);
        let albedo = sum / n as Float;
        assert!(albedo > 0.0 && albedo < 0.5, "albedo {}", albedo);
    }

    #[test]
    fn test_weight_is_saturated() {
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.1, 0.0, 1.0).normalize();
        let full = ClearcoatBSDF::new(1.0, 0.5).eval(&wi, &wo, TransportMode::Radiance);
        let over = ClearcoatBSDF::new(7.0, 0.5).eval(&wi, &wo, TransportMode::Radiance);
        assert_eq!(full, over);
        assert!(ClearcoatBSDF::new(-1.0, 0.5).eval(&wi, &wo, TransportMode::Radiance).is_black());
        assert!(ClearcoatBSDF::new(1.0, 0.5).eval(&Vector3f::new(0.0, 0.3, -0.9), &wo, TransportMode::Radiance).is_black());
    }
}
