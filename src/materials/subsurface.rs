// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::{ BSDFSampleRecord, BSDFValue, ShadingPoint, TransportMode, BSDF };
use crate::core::bssrdf::{ BSSRDFSample, BSSRDF };
use crate::core::error::ConstructionError;
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::scene::Scene;
use crate::core::texture::Texture;
use crate::materials::glass::DielectricBSDF;
use crate::materials::microfacet::{ fresnel_dielectric, fresnel_moment1 };
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f, INV_PI, PI };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ extract_uniform_int, sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Exit search rays stop after this many surface crossings.
const MAX_EXIT_HITS: usize = 32;

/// Probability of projecting along the local x, y and z (normal) axes.
const AXIS_PROB: [Float; 3] = [0.25, 0.25, 0.5];

/// Fraction of the radial profile covered by `r_max`.
const PROFILE_COVERAGE: Float = 0.997;

/// Burley's normalized diffusion, scaled to one channel.
#[derive(Debug, Copy, Clone)]
struct DiffusionProfile {
    rate: Float,
}

impl DiffusionProfile {
    fn new(albedo: Float, mfp: Float) -> Self {
        let s = 1.85 - albedo + 7.0 * (albedo - 0.8).abs().powi(3);
        Self { rate: s / mfp.max(1e-4) }
    }

    /// Radial reflectance per unit area, without the albedo factor.
    fn eval(&self, r: Float) -> Float {
        if r <= 0.0 {
            return 0.0;
        }
        self.rate * ((-self.rate * r).exp() + (-self.rate * r / 3.0).exp()) / (8.0 * PI * r)
    }

    /// Density of `sample` in the radial measure.
    fn pdf(&self, r: Float) -> Float {
        if r < 0.0 {
            return 0.0;
        }
        0.25 * self.rate * ((-self.rate * r).exp() + (-self.rate * r / 3.0).exp())
    }

    fn sample(&self, u: Float) -> Float {
        if u < 0.25 {
            let u = (u / 0.25).min(1.0 - Float::EPSILON);
            -(1.0 - u).ln() / self.rate
        } else {
            let u = ((u - 0.25) / 0.75).min(1.0 - Float::EPSILON);
            -3.0 * (1.0 - u).ln() / self.rate
        }
    }
}

/// Lobe at the exit point of a subsurface path: Fresnel transmission out of
/// the boundary with a cosine falloff.
pub struct SeparableExitBSDF {
    eta: Float,
    norm: Float,
}

impl SeparableExitBSDF {
    pub fn new(eta: Float) -> Self {
        Self { eta, norm: 1.0 - 2.0 * fresnel_moment1(1.0 / eta) }
    }
}

impl BSDF for SeparableExitBSDF {
    fn eval(&self, wi: &Vector3f, _wo: &Vector3f, mode: TransportMode) -> BSDFValue {
        if wi.z <= 0.0 {
            return BSDFValue::default();
        }
        let mut value = (1.0 - fresnel_dielectric(wi.z, 1.0, self.eta)) / (self.norm * PI);
        if mode == TransportMode::Radiance {
            value *= self.eta * self.eta;
        }
        BSDFValue::splat(value)
    }

    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        let wi = sample_cosine_hemisphere(&Vector2f::new(u.x, u.y));
        if wi.z <= 0.0 {
            return None;
        }
        Some(BSDFSampleRecord {
            wi,
            f: self.eval(&wi, wo, mode),
            pdf: sample_cosine_hemisphere_pdf(wi.z),
            is_delta: false,
        })
    }

    fn pdf(&self, wi: &Vector3f, _wo: &Vector3f) -> Float {
        if wi.z <= 0.0 {
            return 0.0;
        }
        wi.z * INV_PI
    }

    fn albedo(&self) -> RGBSpectrum {
        RGBSpectrum::one()
    }
}

/// Separable BSSRDF bound to an entry point on entity `entity`.
pub struct NormalizedDiffusionBSSRDF {
    entry: SurfaceIntersection,
    entity: usize,
    eta: Float,
    albedo: RGBSpectrum,
    profiles: [DiffusionProfile; 3],
    r_max: [Float; 3],
}

impl NormalizedDiffusionBSSRDF {
    pub fn new(entry: SurfaceIntersection,
               entity: usize,
               eta: Float,
               albedo: RGBSpectrum,
               mfp: RGBSpectrum) -> Self {
        let profiles = [
            DiffusionProfile::new(albedo[0], mfp[0]),
            DiffusionProfile::new(albedo[1], mfp[1]),
            DiffusionProfile::new(albedo[2], mfp[2]),
        ];
        let r_max = [
            profiles[0].sample(PROFILE_COVERAGE),
            profiles[1].sample(PROFILE_COVERAGE),
            profiles[2].sample(PROFILE_COVERAGE),
        ];
        Self { entry, entity, eta, albedo, profiles, r_max }
    }

    fn eval_r(&self, r: Float) -> RGBSpectrum {
        RGBSpectrum::new(self.albedo[0] * self.profiles[0].eval(r),
                         self.albedo[1] * self.profiles[1].eval(r),
                         self.albedo[2] * self.profiles[2].eval(r))
    }

    /// Area density of reaching `exit` over every channel and projection axis.
    fn pdf_pi(&self, exit: &SurfaceIntersection) -> Float {
        let geo = self.entry.geo_frame();
        let ld = geo.to_local(&(exit.p() - self.entry.p()));
        let n_local = geo.to_local(&exit.geo_normal());
        let r_proj = [
            (ld.y * ld.y + ld.z * ld.z).sqrt(),
            (ld.z * ld.z + ld.x * ld.x).sqrt(),
            (ld.x * ld.x + ld.y * ld.y).sqrt(),
        ];

        let mut pdf = 0.0;
        for axis in 0..3 {
            if r_proj[axis] <= 0.0 {
                continue;
            }
            for ch in 0..3 {
                if r_proj[axis] > self.r_max[ch] {
                    continue;
                }
                pdf += n_local[axis].abs() * self.profiles[ch].pdf(r_proj[axis]) * AXIS_PROB[axis]
                    / (3.0 * 2.0 * PI * r_proj[axis]);
            }
        }
        pdf
    }
}

impl BSSRDF for NormalizedDiffusionBSSRDF {
    fn sample_pi<'a>(&self,
                     u: &Vector3f,
                     scene: &Scene,
                     arena: &'a ScratchArena) -> Option<BSSRDFSample<'a>> {
        let (channel, ux) = extract_uniform_int(u.x, 3);
        let r = self.profiles[channel].sample(ux);
        let r_max = self.r_max[channel];
        if !(r > 0.0 && r <= r_max) {
            return None;
        }

        let geo = self.entry.geo_frame();
        let (frame, v) = if u.y < 0.5 {
            (*geo, u.y / 0.5)
        } else if u.y < 0.75 {
            (Frame::new(geo.y, geo.z, geo.x), (u.y - 0.5) / 0.25)
        } else {
            (Frame::new(geo.z, geo.x, geo.y), (u.y - 0.75) / 0.25)
        };
        let phi = 2.0 * PI * v;
        let half_len = (r_max * r_max - r * r).max(0.0).sqrt();

        let shape = scene.entity(self.entity)?.shape();
        let dir = -frame.z;
        let mut origin = self.entry.p() + frame.from_local(&Vector3f::new(r * phi.cos(), r * phi.sin(), half_len));
        let mut remaining = 2.0 * half_len;

        // Uniform choice among all crossings in one pass, reusing `u.z`.
        let mut chosen: Option<SurfaceIntersection> = None;
        let mut count = 0usize;
        let mut uz = u.z;
        while count < MAX_EXIT_HITS && remaining > EPSILON {
            let ray = Ray3f::new(origin, dir, Some(EPSILON), Some(remaining));
            let hit = match shape.ray_intersection(&ray) {
                Some(hit) => hit,
                None => break,
            };
            count += 1;
            let keep = 1.0 / count as Float;
            if uz < keep {
                chosen = Some(hit);
                uz /= keep;
            } else {
                uz = (uz - keep) / (1.0 - keep);
            }
            origin = hit.p();
            remaining -= hit.t();
        }

        let normal = chosen?;
        let exit = normal.with_entity(self.entity).with_wo(-normal.geo_normal());

        let pdf = self.pdf_pi(&exit) / count as Float;
        if pdf <= 0.0 {
            return None;
        }

        let cos_o = self.entry.wo().dot(&self.entry.geo_normal());
        let fr = fresnel_dielectric(cos_o, 1.0, self.eta);
        let coef = self.eval_r((exit.p() - self.entry.p()).norm()) * (1.0 - fr);

        let bsdf = arena.alloc(SeparableExitBSDF::new(self.eta));
        let shading = ShadingPoint::with_frame(bsdf, *exit.geo_frame(), exit.geo_normal());
        Some(BSSRDFSample { exit, shading, coef, pdf })
    }
}

/// Translucent dielectric: smooth boundary plus diffusion below the surface.
pub struct SubsurfaceMaterial {
    eta: Float,
    albedo: Arc<dyn Texture>,
    mfp: Arc<dyn Texture>,
}

impl SubsurfaceMaterial {
    /// `albedo` is the surface albedo `A`, `mfp` the mean free path `d` per channel.
    pub fn new(eta: Float, albedo: Arc<dyn Texture>, mfp: Arc<dyn Texture>) -> Result<Self, ConstructionError> {
        if !(eta > 0.0) || !eta.is_finite() {
            return Err(ConstructionError::parameter("eta", format!("{} is not a positive index", eta)));
        }
        Ok(Self { eta, albedo, mfp })
    }
}

impl Material for SubsurfaceMaterial {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a> {
        let bsdf = arena.alloc(DielectricBSDF::new(self.eta, RGBSpectrum::one(), RGBSpectrum::one()));
        let sp = ShadingPoint::new(bsdf, it);
        match it.entity() {
            Some(entity) => {
                let uv = it.uv();
                let albedo = self.albedo.eval(uv).clamp(0.0, 1.0);
                let mfp = self.mfp.eval(uv);
                let bssrdf = arena.alloc(NormalizedDiffusionBSSRDF::new(*it, entity, self.eta, albedo, mfp));
                sp.with_bssrdf(bssrdf)
            }
            None => sp,
        }
    }
}
