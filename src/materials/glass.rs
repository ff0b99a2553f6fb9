// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{ BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF };
use crate::core::error::ConstructionError;
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::texture::Texture;
use crate::materials::microfacet::{ fresnel_dielectric, refract };
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Smooth dielectric boundary. The outside has index 1, the inside `eta`.
pub struct DielectricBSDF {
    eta: Float,
    reflection: RGBSpectrum,
    transmission: RGBSpectrum,
}

impl DielectricBSDF {
    pub fn new(eta: Float, reflection: RGBSpectrum, transmission: RGBSpectrum) -> Self {
        Self { eta, reflection: reflection.clamp(0.0, 1.0), transmission: transmission.clamp(0.0, 1.0) }
    }
}

impl BSDF for DielectricBSDF {
    fn eval(&self, _wi: &Vector3f, _wo: &Vector3f, _mode: TransportMode) -> BSDFValue {
        BSDFValue::default()
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        let cos_o = wo.z;
        if cos_o.abs() < 1e-6 {
            return None;
        }

        let fr = fresnel_dielectric(cos_o, 1.0, self.eta);
        if u.x < fr {
            let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
            let f = self.reflection * (fr / wi.z.abs());
            return Some(BSDFSampleRecord { wi, f, pdf: fr, is_delta: true });
        }

        let entering = cos_o > 0.0;
        let (eta_i, eta_t) = if entering { (1.0, self.eta) } else { (self.eta, 1.0) };
        let n = if entering { Vector3f::new(0.0, 0.0, 1.0) } else { Vector3f::new(0.0, 0.0, -1.0) };
        let wi = refract(wo, &n, eta_i / eta_t)?.normalize();
        let cos_i = wi.z.abs();
        if cos_i < 1e-6 {
            return None;
        }

        let mut f = self.transmission * ((1.0 - fr) / cos_i);
        if mode == TransportMode::Radiance {
            f *= (eta_i / eta_t) * (eta_i / eta_t);
        }
        Some(BSDFSampleRecord { wi, f, pdf: 1.0 - fr, is_delta: true })
    }

    fn pdf(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        0.0
    }

    fn albedo(&self) -> RGBSpectrum {
        (self.reflection + self.transmission) * 0.5
    }

    fn is_delta(&self) -> bool {
        true
    }
}

pub struct GlassMaterial {
    eta: Float,
    reflection: Arc<dyn Texture>,
    transmission: Arc<dyn Texture>,
}

impl GlassMaterial {
    pub fn new(eta: Float,
               reflection: Arc<dyn Texture>,
               transmission: Arc<dyn Texture>) -> Result<Self, ConstructionError> {
        if !(eta > 0.0) || !eta.is_finite() {
            return Err(ConstructionError::parameter("eta", format!("{} is not a positive index", eta)));
        }
        Ok(Self { eta, reflection, transmission })
    }
}

impl Material for GlassMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let uv = it.uv();
        let bsdf = arena.alloc(DielectricBSDF::new(self.eta,
                                                   self.reflection.eval(uv),
                                                   self.transmission.eval(uv)));
        ShadingPoint::new(bsdf, it)
    }
}
