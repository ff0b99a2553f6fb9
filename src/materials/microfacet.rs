// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;

/// Smallest roughness handed to the GGX distribution.
pub const MIN_ROUGHNESS: Float = 0.01;

/// Perceptual roughness to GGX `alpha`, clamped into `[MIN_ROUGHNESS, 1]`.
pub fn roughness_to_alpha(roughness: Float) -> Float {
    let r = if roughness.is_finite() { roughness.clamp(MIN_ROUGHNESS, 1.0) } else { 1.0 };
    r * r
}

pub fn ggx_d(cos_theta: Float, alpha: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let cos2 = cos_theta * cos_theta;
    let denom = cos2 * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

pub fn ggx_g1(cos_theta: Float, alpha: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let cos2 = cos_theta * cos_theta;
    let sin2 = (1.0 - cos2).max(0.0);
    if sin2 <= 0.0 {
        return 1.0;
    }
    let tan2 = sin2 / cos2.max(1e-6);
    let root = (1.0 + alpha * alpha * tan2).sqrt();
    2.0 / (1.0 + root)
}

/// Separable Smith shadowing-masking.
pub fn ggx_g(cos_i: Float, cos_o: Float, alpha: Float) -> Float {
    ggx_g1(cos_i.abs(), alpha) * ggx_g1(cos_o.abs(), alpha)
}

/// Density of `sample_ggx_vndf` producing the half vector `m` seen from `wo`.
pub fn pdf_ggx_vndf(wo: &Vector3f, m: &Vector3f, alpha: Float) -> Float {
    if wo.z <= 1e-6 || m.z <= 0.0 {
        return 0.0;
    }
    ggx_d(m.z, alpha) * ggx_g1(wo.z, alpha) * wo.dot(m).max(0.0) / wo.z
}

/// Samples a visible normal (Heitz 2018). `wo` must lie in the upper hemisphere.
pub fn sample_ggx_vndf(wo: &Vector3f, u: &Vector2f, alpha: Float) -> Vector3f {
    let wh = Vector3f::new(alpha * wo.x, alpha * wo.y, wo.z).normalize();

    let t1 = if wh.z < 0.9999 {
        Vector3f::new(0.0, 0.0, 1.0).cross(&wh).normalize()
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    let t2 = wh.cross(&t1);

    let r = u.x.clamp(0.0, 1.0).sqrt();
    let phi = 2.0 * PI * u.y.clamp(0.0, 1.0);
    let p1 = r * phi.cos();
    let s = 0.5 * (1.0 + wh.z);
    let p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * r * phi.sin();

    let nh = t1 * p1 + t2 * p2 + wh * (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt();
    Vector3f::new(alpha * nh.x, alpha * nh.y, nh.z.max(1e-6)).normalize()
}

/// Clearcoat gloss in `[0, 1]` to the GTR1 `alpha`.
pub fn clearcoat_gloss_to_alpha(gloss: Float) -> Float {
    let g = if gloss.is_finite() { gloss.clamp(0.0, 1.0) } else { 0.0 };
    let r = 0.1 * (1.0 - g);
    (r * r).max(1e-4)
}

/// Berry (GTR1) distribution, normalized so that `D * cos` integrates to one.
pub fn gtr1_d(cos_theta: Float, alpha: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let cos2 = cos_theta * cos_theta;
    (a2 - 1.0) / (PI * a2.ln() * (1.0 + (a2 - 1.0) * cos2))
}

/// Samples a half vector with density `gtr1_d(m.z) * m.z`.
pub fn sample_gtr1(u: &Vector2f, alpha: Float) -> Vector3f {
    let a2 = alpha * alpha;
    let cos2 = ((alpha.powf(2.0 - 2.0 * u.y.clamp(0.0, 1.0)) - 1.0) / (a2 - 1.0)).clamp(0.0, 1.0);
    let cos_theta = cos2.sqrt();
    let sin_theta = (1.0 - cos2).max(0.0).sqrt();
    let phi = 2.0 * PI * u.x;
    Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

pub fn reflect(w: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * w.dot(m) * m - w
}

/// Refracts `w` (on the side `m` points to) with relative index `eta = eta_i / eta_t`.
pub fn refract(w: &Vector3f, m: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_i = w.dot(m).clamp(-1.0, 1.0);
    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(-eta * w + (eta * cos_i - cos_t) * m)
}

/// Unpolarised dielectric Fresnel reflectance. A negative `cos_i` means the
/// direction lies on the `eta_t` side.
pub fn fresnel_dielectric(cos_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let cos_i = cos_i.clamp(-1.0, 1.0);
    let (eta_i, eta_t) = if cos_i > 0.0 { (eta_i, eta_t) } else { (eta_t, eta_i) };
    let cos_i = cos_i.abs();

    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let eta = eta_i / eta_t;
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let r_parl = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    0.5 * (r_parl * r_parl + r_perp * r_perp)
}

pub fn fresnel_schlick(f0: RGBSpectrum, cos_theta: Float) -> RGBSpectrum {
    let one_minus = (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5);
    f0 + (RGBSpectrum::one() - f0) * one_minus
}

/// First moment of the dielectric Fresnel term (d'Eon and Irving 2011 fit).
pub fn fresnel_moment1(eta: Float) -> Float {
    let eta2 = eta * eta;
    let eta3 = eta2 * eta;
    let eta4 = eta2 * eta2;
    let eta5 = eta4 * eta;
    if eta < 1.0 {
        0.45966 - 1.73965 * eta + 3.37668 * eta2 - 3.904945 * eta3 + 2.49277 * eta4
            - 0.68441 * eta5
    } else {
        -4.61686 + 11.1136 * eta - 10.4646 * eta2 + 5.11455 * eta3 - 1.27198 * eta4
            + 0.12746 * eta5
    }
}
