// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f, Vector3f, INV_4PI, PI };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;

/// Sampled incident direction at a medium vertex.
#[derive(Debug, Copy, Clone)]
pub struct PhaseSampleRecord {
    pub wi: Vector3f,
    pub value: Float,
    pub pdf: Float,
}

/// Henyey-Greenstein phase function.
///
/// `wo` points back along the incoming ray and `wi` towards the next vertex.
/// Positive `g` favours forward scattering, i.e. `wi` close to `-wo`. The
/// value is not weighted by `albedo`; the medium accounts for it.
#[derive(Debug, Copy, Clone)]
pub struct HenyeyGreensteinPhase {
    g: Float,
    albedo: RGBSpectrum,
}

fn henyey_greenstein(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g - 2.0 * g * cos_theta;
    INV_4PI * (1.0 - g * g) / (denom * denom.max(0.0).sqrt()).max(1e-12)
}

impl HenyeyGreensteinPhase {
    pub fn new(g: Float, albedo: RGBSpectrum) -> Self {
        Self { g, albedo }
    }

    pub fn g(&self) -> Float {
        self.g
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.albedo
    }

    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        henyey_greenstein((-wo).dot(wi), self.g)
    }

    pub fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        self.eval(wi, wo)
    }

    pub fn sample(&self, wo: &Vector3f, u: &Vector2f) -> Option<PhaseSampleRecord> {
        let g = self.g;
        let cos_theta = if g.abs() < 1e-3 {
            1.0 - 2.0 * u.x
        } else {
            let sq = (1.0 - g * g) / (1.0 + g - 2.0 * g * u.x);
            ((1.0 + g * g - sq * sq) / (2.0 * g)).clamp(-1.0, 1.0)
        };
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;

        let frame = Frame::from_z(-wo);
        let wi = frame.from_local(&Vector3f::new(sin_theta * phi.cos(),
                                                 sin_theta * phi.sin(),
                                                 cos_theta)).normalize();
        let value = henyey_greenstein(cos_theta, g);
        if value <= 0.0 {
            return None;
        }
        Some(PhaseSampleRecord { wi, value, pdf: value })
    }
}
