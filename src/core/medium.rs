// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::interaction::{ MediumIntersection, SurfaceIntersection };
use crate::core::phase::HenyeyGreensteinPhase;
use crate::core::sampler::Sampler;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Outcome of free-flight sampling along a segment.
///
/// The path throughput is multiplied by `tr / pdf`. On a scattering event
/// `tr` already includes the scattering coefficient.
#[derive(Debug, Copy, Clone)]
pub struct MediumSampleRecord {
    pub scatter: Option<MediumIntersection>,
    pub tr: RGBSpectrum,
    pub pdf: Float,
}

impl MediumSampleRecord {
    pub fn passed(tr: RGBSpectrum, pdf: Float) -> Self {
        Self { scatter: None, tr, pdf }
    }

    pub fn weight(&self) -> RGBSpectrum {
        if self.pdf > 0.0 {
            self.tr / self.pdf
        } else {
            RGBSpectrum::default()
        }
    }
}

/// Participating medium filling the space on one side of a surface.
pub trait Medium: Send + Sync {
    fn sigma_t(&self, p_world: Vector3f) -> RGBSpectrum;
    fn albedo(&self, p_world: Vector3f) -> RGBSpectrum;

    fn sigma_s(&self, p_world: Vector3f) -> RGBSpectrum {
        self.sigma_t(p_world) * self.albedo(p_world)
    }

    fn bbox(&self) -> Option<AABB> {
        None
    }

    /// Transmittance between `a` and `b`. May be a stochastic estimate.
    fn tr(&self, a: &Vector3f, b: &Vector3f, sampler: &mut dyn Sampler) -> RGBSpectrum;

    /// Samples a scattering distance along the segment from `a` to `b`.
    fn sample_scattering(&self, a: &Vector3f, b: &Vector3f, sampler: &mut dyn Sampler) -> MediumSampleRecord;

    fn phase(&self, p_world: &Vector3f) -> HenyeyGreensteinPhase;
}

/// Media on both sides of a surface; `None` is vacuum.
#[derive(Clone, Default)]
pub struct MediumInterface {
    pub inside: Option<Arc<dyn Medium>>,
    pub outside: Option<Arc<dyn Medium>>,
}

impl MediumInterface {
    pub fn new(inside: Option<Arc<dyn Medium>>, outside: Option<Arc<dyn Medium>>) -> Self {
        Self { inside, outside }
    }

    pub fn vacuum() -> Self {
        Self::default()
    }

    pub fn is_vacuum(&self) -> bool {
        self.inside.is_none() && self.outside.is_none()
    }

    /// Medium a direction `w` travels through when leaving the surface at `it`.
    pub fn medium_for(&self, it: &SurfaceIntersection, w: &Vector3f) -> Option<&dyn Medium> {
        if it.is_outside(w) {
            self.outside.as_deref()
        } else {
            self.inside.as_deref()
        }
    }
}
