// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Another BSDF multiplied by a constant spectrum. Densities are unchanged.
pub struct ScaledBSDF<'a> {
    inner: &'a dyn BSDF,
    scale: RGBSpectrum,
}

impl<'a> ScaledBSDF<'a> {
    pub fn new(inner: &'a dyn BSDF, scale: RGBSpectrum) -> Self {
        Self { inner, scale }
    }
}

impl<'a> BSDF for ScaledBSDF<'a> {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, mode: TransportMode) -> BSDFValue {
        self.inner.eval(wi, wo, mode) * self.scale
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        let mut rec = self.inner.sample(wo, mode, u)?;
        rec.f = rec.f * self.scale;
        Some(rec)
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        self.inner.pdf(wi, wo)
    }

    fn albedo(&self) -> RGBSpectrum {
        self.inner.albedo() * self.scale
    }

    fn is_delta(&self) -> bool {
        self.inner.is_delta()
    }
}

pub struct ScaledMaterial {
    inner: Arc<dyn Material>,
    scale: Arc<dyn Texture>,
}

impl ScaledMaterial {
    pub fn new(inner: Arc<dyn Material>, scale: Arc<dyn Texture>) -> Self {
        Self { inner, scale }
    }
}

impl Material for ScaledMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let sp = self.inner.shade(it, arena);
        let bsdf = arena.alloc(ScaledBSDF::new(sp.bsdf(), self.scale.eval(it.uv())));
        sp.with_bsdf(bsdf)
    }
}
