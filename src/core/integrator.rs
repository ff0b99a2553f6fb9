// Copyright @yucwang 2026

use crate::core::arena::ScratchArena;
use crate::core::film::GBufferPixel;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Radiance carried by one camera ray, with its first-hit attributes.
#[derive(Debug, Copy, Clone, Default)]
pub struct PixelSample {
    pub radiance: RGBSpectrum,
    pub gbuffer: GBufferPixel,
}

/// Estimates the radiance arriving along a camera ray.
///
/// Implementations are shared read-only between workers; all mutable state
/// lives in the sampler and the scratch arena passed in.
pub trait Integrator: Send + Sync {
    fn eval(&self,
            ray: &Ray3f,
            scene: &Scene,
            sampler: &mut dyn Sampler,
            arena: &ScratchArena) -> PixelSample;

    fn describe(&self) -> String {
        String::from("Integrator")
    }
}
