// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, TransportMode, BSDF};
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::extract_uniform_int;

/// Sum of several lobes sampled with the one-sample rule.
///
/// A lobe is picked uniformly. A delta lobe reports its own density divided
/// by the lobe count; otherwise values are summed over all lobes and the
/// densities are averaged.
pub struct AggregateBSDF<'a> {
    lobes: &'a [&'a dyn BSDF],
}

impl<'a> AggregateBSDF<'a> {
    pub fn new(lobes: &'a [&'a dyn BSDF]) -> Self {
        Self { lobes }
    }
}

impl<'a> BSDF for AggregateBSDF<'a> {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, mode: TransportMode) -> BSDFValue {
        let mut value = BSDFValue::default();
        for lobe in self.lobes {
            value += lobe.eval(wi, wo, mode);
        }
        value
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        if self.lobes.is_empty() {
            return None;
        }
        let count = self.lobes.len() as Float;
        let (idx, ux) = extract_uniform_int(u.x, self.lobes.len());
        let mut rec = self.lobes[idx].sample(wo, mode, &Vector3f::new(ux, u.y, u.z))?;

        if rec.is_delta {
            rec.pdf /= count;
            return Some(rec);
        }

        rec.f = self.eval(&rec.wi, wo, mode);
        rec.pdf = self.pdf(&rec.wi, wo);
        if rec.pdf <= 0.0 {
            return None;
        }
        Some(rec)
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        if self.lobes.is_empty() {
            return 0.0;
        }
        let total: Float = self.lobes.iter().map(|lobe| lobe.pdf(wi, wo)).sum();
        total / self.lobes.len() as Float
    }

    fn albedo(&self) -> RGBSpectrum {
        let mut albedo = RGBSpectrum::default();
        for lobe in self.lobes {
            albedo += lobe.albedo();
        }
        albedo
    }

    fn is_delta(&self) -> bool {
        self.lobes.iter().all(|lobe| lobe.is_delta())
    }
}
