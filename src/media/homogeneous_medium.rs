// Copyright @yucwang 2026

use crate::core::error::ConstructionError;
use crate::core::interaction::MediumIntersection;
use crate::core::medium::{ Medium, MediumSampleRecord };
use crate::core::phase::HenyeyGreensteinPhase;
use crate::core::sampler::Sampler;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::extract_uniform_int;

/// Medium with constant coefficients and a Henyey-Greenstein phase function.
pub struct HomogeneousMedium {
    sigma_s: RGBSpectrum,
    sigma_t: RGBSpectrum,
    g: Float,
}

pub(crate) fn validate_g(g: Float) -> Result<(), ConstructionError> {
    if !(g > -1.0 && g < 1.0) {
        return Err(ConstructionError::parameter("g", "must lie in (-1, 1)"));
    }
    Ok(())
}

impl HomogeneousMedium {
    pub fn new(sigma_a: RGBSpectrum, sigma_s: RGBSpectrum, g: Float) -> Result<Self, ConstructionError> {
        validate_g(g)?;
        for (name, s) in [("sigma_a", sigma_a), ("sigma_s", sigma_s)] {
            if !s.is_finite() || (0..3).any(|c| s[c] < 0.0) {
                return Err(ConstructionError::parameter(name, "must be finite and non-negative"));
            }
        }
        Ok(Self { sigma_s, sigma_t: sigma_a + sigma_s, g })
    }

    fn transmittance(&self, dist: Float) -> RGBSpectrum {
        (-self.sigma_t * dist).exp()
    }
}

impl Medium for HomogeneousMedium {
    fn sigma_t(&self, _p_world: Vector3f) -> RGBSpectrum {
        self.sigma_t
    }

    fn albedo(&self, _p_world: Vector3f) -> RGBSpectrum {
        let mut albedo = RGBSpectrum::default();
        for c in 0..3 {
            if self.sigma_t[c] > 0.0 {
                albedo[c] = self.sigma_s[c] / self.sigma_t[c];
            }
        }
        albedo
    }

    fn tr(&self, a: &Vector3f, b: &Vector3f, _sampler: &mut dyn Sampler) -> RGBSpectrum {
        self.transmittance((b - a).norm())
    }

    fn sample_scattering(&self, a: &Vector3f, b: &Vector3f, sampler: &mut dyn Sampler) -> MediumSampleRecord {
        let seg = b - a;
        let dist = seg.norm();
        if dist <= 0.0 {
            return MediumSampleRecord::passed(RGBSpectrum::one(), 1.0);
        }
        let dir = seg / dist;

        let (channel, u) = extract_uniform_int(sampler.sample1(), 3);
        let st = if self.sigma_t[channel] > 0.0 {
            -(1.0 - u).ln() / self.sigma_t[channel]
        } else {
            Float::INFINITY
        };

        if st < dist {
            let tr = self.transmittance(st);
            let pdf = (self.sigma_t * tr).average();
            let point = MediumIntersection { p: a + dir * st, wo: -dir, t: st };
            MediumSampleRecord { scatter: Some(point), tr: tr * self.sigma_s, pdf }
        } else {
            let tr = self.transmittance(dist);
            MediumSampleRecord::passed(tr, tr.average())
        }
    }

    fn phase(&self, p_world: &Vector3f) -> HenyeyGreensteinPhase {
        HenyeyGreensteinPhase::new(self.g, self.albedo(*p_world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samplers::independent::IndependentSampler;

    fn fog() -> HomogeneousMedium {
        HomogeneousMedium::new(RGBSpectrum::new(0.1, 0.2, 0.3),
                               RGBSpectrum::new(0.4, 0.2, 0.1),
                               0.3).expect("medium")
    }

    #[test]
    fn test_transmittance_is_multiplicative() {
        let medium = fog();
        let mut sampler = IndependentSampler::new(1, 0);
        let a = Vector3f::new(0.0, 0.0, 0.0);
        let b = Vector3f::new(1.0, 2.0, 0.5);
        let c = Vector3f::new(3.0, 6.0, 1.5);
        let ac = medium.tr(&a, &c, &mut sampler);
        let ab_bc = medium.tr(&a, &b, &mut sampler) * medium.tr(&b, &c, &mut sampler);
        for i in 0..3 {
            assert!((ac[i] - ab_bc[i]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pass_weight_is_unbiased() {
        let medium = fog();
        let mut sampler = IndependentSampler::new(1, 3);
        let a = Vector3f::zeros();
        let b = Vector3f::new(0.0, 0.0, 2.0);
        let n = 40000;
        let mut acc = RGBSpectrum::default();
        for _ in 0..n {
            let rec = medium.sample_scattering(&a, &b, &mut sampler);
            match rec.scatter {
                None => acc += rec.weight(),
                Some(mi) => {
                    assert!(mi.t > 0.0 && mi.t < 2.0);
                    assert!(rec.weight().is_finite());
                }
            }
        }
        let expected = medium.tr(&a, &b, &mut sampler);
        for i in 0..3 {
            let estimate = acc[i] / n as Float;
            assert!((estimate - expected[i]).abs() < 0.02, "channel {}: {} vs {}", i, estimate, expected[i]);
        }
    }

    #[test]
    fn test_rejects_invalid_g() {
        assert!(HomogeneousMedium::new(RGBSpectrum::one(), RGBSpectrum::one(), 1.0).is_err());
        assert!(HomogeneousMedium::new(RGBSpectrum::one(), RGBSpectrum::one(), -1.5).is_err());
        assert!(HomogeneousMedium::new(RGBSpectrum::splat(-1.0), RGBSpectrum::one(), 0.0).is_err());
    }
}
