// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF};
use crate::core::error::ConstructionError;
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::texture::Texture;
use crate::materials::microfacet::{fresnel_dielectric, ggx_d, ggx_g, pdf_ggx_vndf, reflect, refract,
                                   roughness_to_alpha, sample_ggx_vndf};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

fn flip_z(v: &Vector3f) -> Vector3f {
    Vector3f::new(v.x, v.y, -v.z)
}

/// GGX rough dielectric boundary (Walter et al. 2007). The outside has index 1,
/// the inside `eta`.
pub struct RoughDielectricBSDF {
    alpha: Float,
    eta: Float,
    reflection: RGBSpectrum,
    transmission: RGBSpectrum,
}

impl RoughDielectricBSDF {
    pub fn new(roughness: Float, eta: Float, reflection: RGBSpectrum, transmission: RGBSpectrum) -> Self {
        Self {
            alpha: roughness_to_alpha(roughness),
            eta,
            reflection: reflection.clamp(0.0, 1.0),
            transmission: transmission.clamp(0.0, 1.0),
        }
    }

    /// `wo` mirrored into the upper hemisphere (with `wi` following it), plus
    /// the indices on the `wo` side and the far side.
    fn upper_frame(&self, wi: &Vector3f, wo: &Vector3f) -> (Vector3f, Vector3f, Float, Float) {
        if wo.z >= 0.0 {
            (*wi, *wo, 1.0, self.eta)
        } else {
            (flip_z(wi), flip_z(wo), self.eta, 1.0)
        }
    }

    /// Generalized half vector of a refraction pair, oriented along `+z`.
    fn refraction_half_vector(wi: &Vector3f, wo: &Vector3f, eta_rel: Float) -> Option<Vector3f> {
        let m = wo + wi * eta_rel;
        if m.norm_squared() <= 0.0 {
            return None;
        }
        let m = m.normalize();
        let m = if m.z < 0.0 { -m } else { m };
        if wo.dot(&m) <= 0.0 || wi.dot(&m) >= 0.0 {
            return None;
        }
        Some(m)
    }

    fn reflection_pdf(&self, wo: &Vector3f, m: &Vector3f, fr: Float) -> Float {
        let cos_o_m = wo.dot(m);
        if cos_o_m <= 1e-6 {
            return 0.0;
        }
        fr * pdf_ggx_vndf(wo, m, self.alpha) / (4.0 * cos_o_m)
    }

    fn transmission_pdf(&self, wi: &Vector3f, wo: &Vector3f, m: &Vector3f, fr: Float, eta_rel: Float) -> Float {
        let denom = wo.dot(m) + eta_rel * wi.dot(m);
        if denom.abs() <= 1e-6 {
            return 0.0;
        }
        (1.0 - fr) * pdf_ggx_vndf(wo, m, self.alpha) * eta_rel * eta_rel * wi.dot(m).abs() / (denom * denom)
    }
}

impl BSDF for RoughDielectricBSDF {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, mode: TransportMode) -> BSDFValue {
        let (wi, wo, eta_o, eta_t) = self.upper_frame(wi, wo);
        let cos_i = wi.z;
        let cos_o = wo.z;
        if cos_i.abs() <= 1e-6 || cos_o <= 1e-6 {
            return BSDFValue::default();
        }

        if cos_i > 0.0 {
            let m = (wi + wo).normalize();
            let fr = fresnel_dielectric(wo.dot(&m), eta_o, eta_t);
            let d = ggx_d(m.z, self.alpha);
            let g = ggx_g(cos_i, cos_o, self.alpha);
            return self.reflection * (fr * d * g / (4.0 * cos_i * cos_o));
        }

        let eta_rel = eta_t / eta_o;
        let m = match Self::refraction_half_vector(&wi, &wo, eta_rel) {
            Some(m) => m,
            None => return BSDFValue::default(),
        };
        let cos_o_m = wo.dot(&m);
        let cos_i_m = wi.dot(&m);
        let denom = cos_o_m + eta_rel * cos_i_m;
        if denom.abs() <= 1e-6 {
            return BSDFValue::default();
        }

        let fr = fresnel_dielectric(cos_o_m, eta_o, eta_t);
        let d = ggx_d(m.z, self.alpha);
        let g = ggx_g(cos_i, cos_o, self.alpha);
        // Radiance is compressed by the squared index ratio when crossing.
        let factor = match mode {
            TransportMode::Radiance => 1.0 / eta_rel,
            TransportMode::Importance => 1.0,
        };
        let value = (1.0 - fr) * d * g * eta_rel * eta_rel * cos_i_m.abs() * cos_o_m * factor * factor
            / ((cos_i * cos_o).abs() * denom * denom);
        self.transmission * value.abs()
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        if wo.z.abs() <= 1e-6 {
            return None;
        }
        let flip = wo.z < 0.0;
        let (_, wo_up, eta_o, eta_t) = self.upper_frame(wo, wo);

        let m = sample_ggx_vndf(&wo_up, &Vector2f::new(u.x, u.y), self.alpha);
        let cos_o_m = wo_up.dot(&m);
        if cos_o_m <= 1e-6 {
            return None;
        }
        let fr = fresnel_dielectric(cos_o_m, eta_o, eta_t);

        let (wi_up, pdf) = if u.z < fr {
            let wi_up = reflect(&wo_up, &m).normalize();
            if wi_up.z <= 1e-6 {
                return None;
            }
            (wi_up, self.reflection_pdf(&wo_up, &m, fr))
        } else {
            let wi_up = refract(&wo_up, &m, eta_o / eta_t)?.normalize();
            if wi_up.z >= -1e-6 {
                return None;
            }
            (wi_up, self.transmission_pdf(&wi_up, &wo_up, &m, fr, eta_t / eta_o))
        };
        if !(pdf > 0.0) || !pdf.is_finite() {
            return None;
        }

        let wi = if flip { flip_z(&wi_up) } else { wi_up };
        let f = self.eval(&wi, wo, mode);
        if f.is_black() {
            return None;
        }
        Some(BSDFSampleRecord { wi, f, pdf, is_delta: false })
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        let (wi, wo, eta_o, eta_t) = self.upper_frame(wi, wo);
        if wi.z.abs() <= 1e-6 || wo.z <= 1e-6 {
            return 0.0;
        }

        if wi.z > 0.0 {
            let m = (wi + wo).normalize();
            let fr = fresnel_dielectric(wo.dot(&m), eta_o, eta_t);
            return self.reflection_pdf(&wo, &m, fr);
        }

        let eta_rel = eta_t / eta_o;
        match Self::refraction_half_vector(&wi, &wo, eta_rel) {
            Some(m) => {
                let fr = fresnel_dielectric(wo.dot(&m), eta_o, eta_t);
                self.transmission_pdf(&wi, &wo, &m, fr, eta_rel)
            }
            None => 0.0,
        }
    }

    fn albedo(&self) -> RGBSpectrum {
        (self.reflection + self.transmission) * 0.5
    }
}

/// Frosted glass: a dielectric boundary with a textured GGX roughness.
pub struct RoughGlassMaterial {
    eta: Float,
    roughness: Arc<dyn Texture>,
    reflection: Arc<dyn Texture>,
    transmission: Arc<dyn Texture>,
}

impl RoughGlassMaterial {
    /// `roughness` is read from the first channel of its texture.
    pub fn new(eta: Float,
               roughness: Arc<dyn Texture>,
               reflection: Arc<dyn Texture>,
               transmission: Arc<dyn Texture>) -> Result<Self, ConstructionError> {
        if !(eta > 0.0) || !eta.is_finite() {
            return Err(ConstructionError::parameter("eta", format!("{} is not a positive index", eta)));
        }
        Ok(Self { eta, roughness, reflection, transmission })
    }
}

impl Material for RoughGlassMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let uv = it.uv();
        let bsdf = arena.alloc(RoughDielectricBSDF::new(self.roughness.eval(uv).r(),
                                                        self.eta,
                                                        self.reflection.eval(uv),
                                                        self.transmission.eval(uv)));
        ShadingPoint::new(bsdf, it)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::textures::constant::ConstantTexture;

    fn run_samples(bsdf: &RoughDielectricBSDF, wo: &Vector3f, mode: TransportMode, seed: u64)
                   -> (Float, usize, usize) {
        let mut rng = LcgRng::new(seed);
        let n = 4000;
        let mut sum = 0.0;
        let mut reflected = 0;
        let mut transmitted = 0;
        for _ in 0..n {
            let u = Vector3f::new(rng.next_f32(), rng.next_f32(), rng.next_f32());
            if let Some(rec) = bsdf.sample(wo, mode, &u) {
                let pdf = bsdf.pdf(&rec.wi, wo);
                assert!((rec.pdf - pdf).abs() <= 1e-2 * pdf, "sampled {} evaluated {}", rec.pdf, pdf);
                assert_eq!(rec.f, bsdf.eval(&rec.wi, wo, mode));
                let weight = (rec.f * rec.wi.z.abs() / rec.pdf).r();
                assert!(weight <= 1.0 + 1e-3, "weight {}", weight);
                sum += weight;
                if rec.wi.z * wo.z > 0.0 { reflected += 1; } else { transmitted += 1; }
            }
        }
        (sum / n as Float, reflected, transmitted)
    }

    #[test]
    fn test_sampled_pdf_matches_eval_pdf() {
        let bsdf = RoughDielectricBSDF::new(0.3, 1.5, RGBSpectrum::one(), RGBSpectrum::one());

        let outside = Vector3f::new(0.4, 0.1, 0.9).normalize();
        let (albedo, reflected, transmitted) = run_samples(&bsdf, &outside, TransportMode::Importance, 3);
        assert!(albedo > 0.8, "albedo {}", albedo);
        assert!(reflected > 0 && transmitted > reflected);

        let inside = Vector3f::new(-0.2, 0.3, -0.8).normalize();
        let (_, reflected, transmitted) = run_samples(&bsdf, &inside, TransportMode::Importance, 4);
        assert!(reflected > 0 && transmitted > 0);
    }

    #[test]
    fn test_radiance_is_compressed_on_entry() {
        let bsdf = RoughDielectricBSDF::new(0.2, 1.5, RGBSpectrum::one(), RGBSpectrum::one());
        let wo = Vector3f::new(0.1, 0.0, 1.0).normalize();
        let wi = Vector3f::new(-0.05, 0.02, -1.0).normalize();
        let radiance = bsdf.eval(&wi, &wo, TransportMode::Radiance).r();
        let importance = bsdf.eval(&wi, &wo, TransportMode::Importance).r();
        assert!(importance > 0.0);
        assert!((radiance * 2.25 - importance).abs() < 1e-3 * importance);
        assert_eq!(bsdf.pdf(&Vector3f::new(0.0, 0.0, 1.0), &Vector3f::new(1.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_invalid_eta() {
        let white: Arc<dyn Texture> = Arc::new(ConstantTexture::grey(1.0));
        let rough: Arc<dyn Texture> = Arc::new(ConstantTexture::grey(0.3));
        assert!(RoughGlassMaterial::new(0.0, rough.clone(), white.clone(), white.clone()).is_err());
        assert!(RoughGlassMaterial::new(Float::NAN, rough.clone(), white.clone(), white.clone()).is_err());
        assert!(RoughGlassMaterial::new(1.5, rough, white.clone(), white).is_ok());
    }
}
