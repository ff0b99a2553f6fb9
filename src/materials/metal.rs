// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::texture::Texture;
use crate::materials::microfacet::{fresnel_schlick, ggx_d, ggx_g, pdf_ggx_vndf, reflect,
                                   roughness_to_alpha, sample_ggx_vndf};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// GGX rough conductor with a Schlick Fresnel term. Two-sided.
pub struct GGXConductorBSDF {
    alpha: Float,
    specular_reflectance: RGBSpectrum,
}

impl GGXConductorBSDF {
    pub fn new(roughness: Float, specular_reflectance: RGBSpectrum) -> Self {
        Self {
            alpha: roughness_to_alpha(roughness),
            specular_reflectance: specular_reflectance.clamp(0.0, 1.0),
        }
    }

    /// Both directions mirrored into the upper hemisphere, or None for transmission.
    fn upper(wi: &Vector3f, wo: &Vector3f) -> Option<(Vector3f, Vector3f)> {
        if wi.z * wo.z <= 0.0 {
            return None;
        }
        if wo.z > 0.0 {
            Some((*wi, *wo))
        } else {
            Some((Vector3f::new(wi.x, wi.y, -wi.z), Vector3f::new(wo.x, wo.y, -wo.z)))
        }
    }
}

impl BSDF for GGXConductorBSDF {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, _mode: TransportMode) -> BSDFValue {
        let (wi, wo) = match Self::upper(wi, wo) {
            Some(pair) => pair,
            None => return BSDFValue::default(),
        };

        let cos_i = wi.z;
        let cos_o = wo.z;
        if cos_i <= 1e-6 || cos_o <= 1e-6 {
            return BSDFValue::default();
        }

        let m = wi + wo;
        if m.norm_squared() <= 0.0 {
            return BSDFValue::default();
        }
        let m = m.normalize();
        let cos_o_m = wo.dot(&m);
        if cos_o_m <= 0.0 {
            return BSDFValue::default();
        }

        let d = ggx_d(m.z, self.alpha);
        let g = ggx_g(cos_i, cos_o, self.alpha);
        let f = fresnel_schlick(self.specular_reflectance, cos_o_m);
        f * (d * g / (4.0 * cos_i * cos_o))
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        if wo.z.abs() <= 1e-6 {
            return None;
        }
        let flip = wo.z < 0.0;
        let wo_up = if flip { Vector3f::new(wo.x, wo.y, -wo.z) } else { *wo };

        let m = sample_ggx_vndf(&wo_up, &Vector2f::new(u.x, u.y), self.alpha);
        let wi_up = reflect(&wo_up, &m);
        if wi_up.z <= 0.0 {
            return None;
        }
        let wi = if flip { Vector3f::new(wi_up.x, wi_up.y, -wi_up.z) } else { wi_up };

        let pdf = self.pdf(&wi, wo);
        if pdf <= 0.0 {
            return None;
        }
        Some(BSDFSampleRecord { wi, f: self.eval(&wi, wo, mode), pdf, is_delta: false })
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        let (wi, wo) = match Self::upper(wi, wo) {
            Some(pair) => pair,
            None => return 0.0,
        };
        let m = wi + wo;
        if m.norm_squared() <= 0.0 {
            return 0.0;
        }
        let m = m.normalize();
        let cos_o_m = wo.dot(&m);
        if cos_o_m <= 1e-6 {
            return 0.0;
        }
        pdf_ggx_vndf(&wo, &m, self.alpha) / (4.0 * cos_o_m)
    }

    fn albedo(&self) -> RGBSpectrum {
        self.specular_reflectance
    }
}

pub struct MetalMaterial {
    roughness: Arc<dyn Texture>,
    reflectance: Arc<dyn Texture>,
}

impl MetalMaterial {
    /// `roughness` is read from the first channel of its texture.
    pub fn new(roughness: Arc<dyn Texture>, reflectance: Arc<dyn Texture>) -> Self {
        Self { roughness, reflectance }
    }
}

impl Material for MetalMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let uv = it.uv();
        let bsdf = arena.alloc(GGXConductorBSDF::new(self.roughness.eval(uv).r(),
                                                     self.reflectance.eval(uv)));
        ShadingPoint::new(bsdf, it)
    }
}
