// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{ BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF };
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::texture::Texture;
use crate::materials::microfacet::fresnel_schlick;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Perfect specular reflection tinted by a Schlick conductor term.
pub struct MirrorBSDF {
    rc: RGBSpectrum,
}

impl MirrorBSDF {
    pub fn new(rc: RGBSpectrum) -> Self {
        Self { rc: rc.clamp(0.0, 1.0) }
    }
}

impl BSDF for MirrorBSDF {
    fn eval(&self, _wi: &Vector3f, _wo: &Vector3f, _mode: TransportMode) -> BSDFValue {
        BSDFValue::default()
    }

    fn sample(&self, wo: &Vector3f, _mode: TransportMode, _u: &Vector3f) -> Option<BSDFSampleRecord> {
        let cos_o = wo.z.abs();
        if cos_o < 1e-6 {
            return None;
        }
        let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
        let f = fresnel_schlick(self.rc, cos_o) / cos_o;

        Some(BSDFSampleRecord { wi, f, pdf: 1.0, is_delta: true })
    }

    fn pdf(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        0.0
    }

    fn albedo(&self) -> RGBSpectrum {
        self.rc
    }

    fn is_delta(&self) -> bool {
        true
    }
}

pub struct MirrorMaterial {
    rc: Arc<dyn Texture>,
}

impl MirrorMaterial {
    pub fn new(rc: Arc<dyn Texture>) -> Self {
        Self { rc }
    }
}

impl Material for MirrorMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let bsdf = arena.alloc(MirrorBSDF::new(self.rc.eval(it.uv())));
        ShadingPoint::new(bsdf, it)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_reflects_about_normal() {
        let bsdf = MirrorBSDF::new(RGBSpectrum::one());
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let rec = bsdf.sample(&wo, TransportMode::Radiance, &Vector3f::zeros()).expect("sample");
        assert!(rec.is_delta);
        assert!((rec.wi - Vector3f::new(-0.6, 0.0, 0.8)).norm() < 1e-6);
        let weight = rec.f * rec.wi.z.abs() / rec.pdf;
        assert!((weight.g() - 1.0).abs() < 1e-5);
        assert!(bsdf.eval(&rec.wi, &wo, TransportMode::Radiance).is_black());
        assert_eq!(bsdf.pdf(&rec.wi, &wo), 0.0);
    }
}
