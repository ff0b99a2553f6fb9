// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::texture::Texture;
use crate::materials::aggregate::AggregateBSDF;
use crate::materials::clearcoat::ClearcoatBSDF;
use crate::materials::diffuse::DiffuseBSDF;
use crate::materials::metal::GGXConductorBSDF;
use crate::materials::microfacet::fresnel_schlick;
use crate::materials::scaled::ScaledBSDF;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Normal-incidence reflectance of the coating.
const COATING_F0: Float = 0.04;

/// Base lobe seen through a coating of strength `weight`: light the coating
/// reflects at `wo` never reaches the base.
struct CoatedBaseBSDF<'a> {
    base: &'a dyn BSDF,
    weight: Float,
}

impl<'a> CoatedBaseBSDF<'a> {
    fn transmitted(&self, wo: &Vector3f) -> RGBSpectrum {
        let reflected = fresnel_schlick(RGBSpectrum::splat(COATING_F0), wo.z.abs());
        RGBSpectrum::one() - reflected * self.weight
    }
}

impl<'a> BSDF for CoatedBaseBSDF<'a> {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, mode: TransportMode) -> BSDFValue {
        self.base.eval(wi, wo, mode) * self.transmitted(wo)
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        let mut rec = self.base.sample(wo, mode, u)?;
        rec.f = rec.f * self.transmitted(wo);
        Some(rec)
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        self.base.pdf(wi, wo)
    }

    fn albedo(&self) -> RGBSpectrum {
        self.base.albedo() * (1.0 - COATING_F0 * self.weight)
    }
}

/// Diffuse base under a glossy GGX coating.
pub struct PlasticMaterial {
    albedo: Arc<dyn Texture>,
    diffuse_weight: Float,
    specular_weight: Float,
    roughness: Float,
    clearcoat: Option<(Float, Float)>,
}

impl PlasticMaterial {
    pub fn new(albedo: Arc<dyn Texture>,
               diffuse_weight: Float,
               specular_weight: Float,
               roughness: Float) -> Self {
        Self {
            albedo,
            diffuse_weight: diffuse_weight.clamp(0.0, 1.0),
            specular_weight: specular_weight.clamp(0.0, 1.0),
            roughness,
            clearcoat: None,
        }
    }

    /// Adds a GTR1 clearcoat lobe on top. `weight` is saturated into `[0, 1]`.
    pub fn with_clearcoat(mut self, weight: Float, gloss: Float) -> Self {
        let weight = if weight.is_finite() { weight.clamp(0.0, 1.0) } else { 0.0 };
        self.clearcoat = if weight > 0.0 { Some((weight, gloss)) } else { None };
        self
    }
}

impl Material for PlasticMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let diffuse: &'a dyn BSDF = arena.alloc(DiffuseBSDF::new(self.albedo.eval(it.uv())));
        let diffuse: &'a dyn BSDF = arena.alloc(
            ScaledBSDF::new(diffuse, RGBSpectrum::splat(self.diffuse_weight)));
        let diffuse: &'a dyn BSDF = arena.alloc(
            CoatedBaseBSDF { base: diffuse, weight: self.specular_weight });

        // Untinted coating.
        let specular: &'a dyn BSDF = arena.alloc(
            GGXConductorBSDF::new(self.roughness, RGBSpectrum::splat(COATING_F0)));
        let specular: &'a dyn BSDF = arena.alloc(
            ScaledBSDF::new(specular, RGBSpectrum::splat(self.specular_weight)));

        let lobes: &'a [&'a dyn BSDF] = match self.clearcoat {
            Some((weight, gloss)) => {
                let coat: &'a dyn BSDF = arena.alloc(ClearcoatBSDF::new(weight, gloss));
                arena.alloc_slice_copy(&[diffuse, specular, coat])
            }
            None => arena.alloc_slice_copy(&[diffuse, specular]),
        };
        let bsdf = arena.alloc(AggregateBSDF::new(lobes));
        ShadingPoint::new(bsdf, it)
    }
}
