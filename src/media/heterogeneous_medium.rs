// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::error::ConstructionError;
use crate::core::interaction::MediumIntersection;
use crate::core::medium::{ Medium, MediumSampleRecord };
use crate::core::phase::HenyeyGreensteinPhase;
use crate::core::sampler::Sampler;
use crate::core::volume::Volume;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::media::homogeneous_medium::validate_g;

/// Medium whose extinction follows a density field.
///
/// Extinction is grey: `scale * density(p).x`. Free-flight distances are
/// sampled by delta tracking and transmittance is estimated by ratio
/// tracking, both against the majorant `scale * max density`.
pub struct HeterogeneousMedium {
    density: Arc<dyn Volume>,
    albedo: Arc<dyn Volume>,
    scale: Float,
    majorant: Float,
    g: Float,
    bbox: Option<AABB>,
}

impl HeterogeneousMedium {
    pub fn new(density: Arc<dyn Volume>,
               albedo: Arc<dyn Volume>,
               scale: Float,
               g: Float) -> Result<Self, ConstructionError> {
        validate_g(g)?;
        if !(scale >= 0.0 && scale.is_finite()) {
            return Err(ConstructionError::parameter("scale", "must be finite and non-negative"));
        }
        let majorant = scale * density.max_value();
        let bbox = density.bbox();
        Ok(Self { density, albedo, scale, majorant, g, bbox })
    }

    fn density_at(&self, p: &Vector3f) -> Float {
        if let Some(bbox) = &self.bbox {
            if !bbox.contains(p) {
                return 0.0;
            }
        }
        (self.scale * self.density.eval(p).x).max(0.0)
    }

    /// Part of the segment `a + t * dir, t in [0, dist]` covered by the field.
    fn clip(&self, a: &Vector3f, dir: &Vector3f, dist: Float) -> Option<(Float, Float)> {
        match &self.bbox {
            Some(bbox) => {
                let inv_dir = Vector3f::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
                bbox.intersect_range_inv(a, &inv_dir, 0.0, dist)
            }
            None => Some((0.0, dist)),
        }
    }

    fn free_flight(&self, sampler: &mut dyn Sampler) -> Float {
        -(1.0 - sampler.sample1()).ln() / self.majorant
    }
}

impl Medium for HeterogeneousMedium {
    fn sigma_t(&self, p_world: Vector3f) -> RGBSpectrum {
        RGBSpectrum::splat(self.density_at(&p_world))
    }

    fn albedo(&self, p_world: Vector3f) -> RGBSpectrum {
        RGBSpectrum::from_vec(self.albedo.eval(&p_world)).clamp(0.0, 1.0)
    }

    fn bbox(&self) -> Option<AABB> {
        self.bbox
    }

    fn tr(&self, a: &Vector3f, b: &Vector3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let seg = b - a;
        let dist = seg.norm();
        if dist <= 0.0 || self.majorant <= 0.0 {
            return RGBSpectrum::one();
        }
        let dir = seg / dist;
        let (t_min, t_max) = match self.clip(a, &dir, dist) {
            Some(range) => range,
            None => return RGBSpectrum::one(),
        };

        let mut tr = 1.0;
        let mut t = t_min;
        loop {
            t += self.free_flight(sampler);
            if t >= t_max {
                break;
            }
            tr *= 1.0 - self.density_at(&(a + dir * t)) / self.majorant;
            if tr <= 0.0 {
                return RGBSpectrum::default();
            }
        }
        RGBSpectrum::splat(tr)
    }

    fn sample_scattering(&self, a: &Vector3f, b: &Vector3f, sampler: &mut dyn Sampler) -> MediumSampleRecord {
        let seg = b - a;
        let dist = seg.norm();
        if dist <= 0.0 || self.majorant <= 0.0 {
            return MediumSampleRecord::passed(RGBSpectrum::one(), 1.0);
        }
        let dir = seg / dist;
        let (t_min, t_max) = match self.clip(a, &dir, dist) {
            Some(range) => range,
            None => return MediumSampleRecord::passed(RGBSpectrum::one(), 1.0),
        };

        let mut t = t_min;
        loop {
            t += self.free_flight(sampler);
            if t >= t_max {
                return MediumSampleRecord::passed(RGBSpectrum::one(), 1.0);
            }
            let p = a + dir * t;
            if sampler.sample1() * self.majorant < self.density_at(&p) {
                let point = MediumIntersection { p, wo: -dir, t };
                return MediumSampleRecord { scatter: Some(point), tr: self.albedo(p), pdf: 1.0 };
            }
        }
    }

    fn phase(&self, p_world: &Vector3f) -> HenyeyGreensteinPhase {
        HenyeyGreensteinPhase::new(self.g, self.albedo(*p_world))
    }
}
