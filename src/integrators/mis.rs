// Copyright @yucwang 2026

use crate::core::bsdf::{ ShadingPoint, TransportMode };
use crate::core::emitter::Emitter;
use crate::core::interaction::{ MediumIntersection, SurfaceIntersection };
use crate::core::medium::{ Medium, MediumInterface };
use crate::core::phase::HenyeyGreensteinPhase;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Densities below this are treated as failed samples.
pub const PDF_EPSILON: Float = 1e-6;

/// Balance heuristic weight of strategy `a` against strategy `b`.
pub fn balance_heuristic(pdf_a: Float, pdf_b: Float) -> Float {
    let sum = pdf_a + pdf_b;
    if sum <= 0.0 {
        return 0.0;
    }
    pdf_a / sum
}

/// A path vertex as seen by light sampling.
pub trait ScatteringVertex {
    fn position(&self) -> Vector3f;
    /// Start of a shadow segment towards `target`.
    fn shadow_origin(&self, target: &Vector3f) -> Vector3f;
    /// Medium the direction `wi` leaves into.
    fn medium_towards(&self, wi: &Vector3f) -> Option<&dyn Medium>;
    /// Scattered value towards the viewer, cosine included, and the
    /// density of sampling `wi` at this vertex.
    fn scatter(&self, wi: &Vector3f) -> (RGBSpectrum, Float);
}

pub struct SurfaceVertex<'s, 'a> {
    it: &'s SurfaceIntersection,
    shading: &'s ShadingPoint<'a>,
    interface: Option<&'s MediumInterface>,
}

impl<'s, 'a> SurfaceVertex<'s, 'a> {
    pub fn new(it: &'s SurfaceIntersection,
               shading: &'s ShadingPoint<'a>,
               interface: Option<&'s MediumInterface>) -> Self {
        Self { it, shading, interface }
    }
}

impl<'s, 'a> ScatteringVertex for SurfaceVertex<'s, 'a> {
    fn position(&self) -> Vector3f {
        self.it.p()
    }

    fn shadow_origin(&self, target: &Vector3f) -> Vector3f {
        self.it.spawn_ray_to(target).origin()
    }

    fn medium_towards(&self, wi: &Vector3f) -> Option<&dyn Medium> {
        self.interface.and_then(|m| m.medium_for(self.it, wi))
    }

    fn scatter(&self, wi: &Vector3f) -> (RGBSpectrum, Float) {
        let wo = self.it.wo();
        let f = self.shading.eval(wi, &wo, TransportMode::Radiance);
        if f.is_black() {
            return (f, 0.0);
        }
        let cos = wi.dot(&self.shading.shading_normal()).abs();
        (f * cos, self.shading.pdf(wi, &wo))
    }
}

pub struct MediumVertex<'s> {
    mi: &'s MediumIntersection,
    medium: &'s dyn Medium,
    phase: &'s HenyeyGreensteinPhase,
}

impl<'s> MediumVertex<'s> {
    pub fn new(mi: &'s MediumIntersection, medium: &'s dyn Medium, phase: &'s HenyeyGreensteinPhase) -> Self {
        Self { mi, medium, phase }
    }
}

impl<'s> ScatteringVertex for MediumVertex<'s> {
    fn position(&self) -> Vector3f {
        self.mi.p
    }

    fn shadow_origin(&self, _target: &Vector3f) -> Vector3f {
        self.mi.p
    }

    fn medium_towards(&self, _wi: &Vector3f) -> Option<&dyn Medium> {
        Some(self.medium)
    }

    fn scatter(&self, wi: &Vector3f) -> (RGBSpectrum, Float) {
        let value = self.phase.eval(wi, &self.mi.wo);
        (RGBSpectrum::splat(value), self.phase.pdf(wi, &self.mi.wo))
    }
}

/// Light sampling strategy for one light chosen with probability `sel_pdf`.
pub fn sample_light(scene: &Scene,
                    light: &dyn Emitter,
                    sel_pdf: Float,
                    vertex: &dyn ScatteringVertex,
                    sampler: &mut dyn Sampler) -> RGBSpectrum {
    let sam = sampler.sample5();
    let rec = match light.sample_li(&vertex.position(), &sam) {
        Some(rec) => rec,
        None => return RGBSpectrum::default(),
    };
    if rec.radiance.is_black() || rec.pdf < PDF_EPSILON {
        return RGBSpectrum::default();
    }

    let wi = rec.ref_to_light();
    let (f, pdf_scatter) = vertex.scatter(&wi);
    if f.is_black() {
        return RGBSpectrum::default();
    }

    let origin = vertex.shadow_origin(&rec.pos);
    let tr = scene.shadow_transmittance(&origin, &rec.pos, vertex.medium_towards(&wi), sampler);
    if tr.is_black() {
        return RGBSpectrum::default();
    }

    let light_pdf = sel_pdf * rec.pdf;
    let denom = if rec.is_delta { light_pdf } else { light_pdf + pdf_scatter };
    f * rec.radiance * tr / denom
}

/// Direct illumination at a vertex, from every light or from one picked by power.
pub fn direct_illumination(scene: &Scene,
                           vertex: &dyn ScatteringVertex,
                           sampler: &mut dyn Sampler,
                           sample_all_lights: bool) -> RGBSpectrum {
    let mut result = RGBSpectrum::default();
    if sample_all_lights {
        for light in scene.lights() {
            result += sample_light(scene, light, 1.0, vertex, sampler);
        }
    } else if let Some((light, sel_pdf)) = scene.sample_light(sampler.sample1()) {
        result = sample_light(scene, light, sel_pdf, vertex, sampler);
    }
    result
}

/// Scattering-sampled vertex that a later light hit is weighted against.
#[derive(Debug, Copy, Clone)]
pub struct PreviousVertex {
    pub p: Vector3f,
    pub pdf: Float,
    pub is_delta: bool,
}

/// Weight of hitting a light by scattering from `prev`, given the light's
/// solid angle density `light_pdf` and selection probability `sel_pdf`.
pub fn scatter_strategy_weight(prev: Option<&PreviousVertex>, sel_pdf: Float, light_pdf: Float) -> Float {
    match prev {
        Some(pv) if !pv.is_delta => balance_heuristic(pv.pdf, sel_pdf * light_pdf),
        _ => 1.0,
    }
}

/// Selection probability matching what `direct_illumination` used.
pub fn effective_selection_pdf(sel_pdf: Float, sample_all_lights: bool) -> Float {
    if sample_all_lights { 1.0 } else { sel_pdf }
}

/// Emission of an area light hit at `it`, weighted against light sampling at `prev`.
pub fn area_emission(scene: &Scene,
                     it: &SurfaceIntersection,
                     prev: Option<&PreviousVertex>,
                     sample_all_lights: bool) -> RGBSpectrum {
    let (light, sel_pdf) = match it.entity().and_then(|idx| scene.emitter_of(idx)) {
        Some(found) => found,
        None => return RGBSpectrum::default(),
    };
    let le = light.radiance(&it.p(), &it.geo_normal(), &it.wo());
    if le.is_black() {
        return le;
    }
    let light_pdf = match prev {
        Some(pv) => light.pdf_li(&pv.p, &it.p(), &it.geo_normal()),
        None => 0.0,
    };
    le * scatter_strategy_weight(prev, effective_selection_pdf(sel_pdf, sample_all_lights), light_pdf)
}

/// Radiance of non-area lights along an escaping ray, weighted against light sampling at `prev`.
pub fn escaped_radiance(scene: &Scene,
                        ray: &Ray3f,
                        prev: Option<&PreviousVertex>,
                        sample_all_lights: bool) -> RGBSpectrum {
    let dir = ray.dir();
    let mut result = RGBSpectrum::default();
    for (light, sel_pdf) in scene.non_area_lights() {
        let le = light.non_area_le(&dir);
        if le.is_black() {
            continue;
        }
        let light_pdf = match prev {
            Some(pv) => light.pdf_li_dir(&pv.p, &dir),
            None => 0.0,
        };
        result += le * scatter_strategy_weight(prev, effective_selection_pdf(sel_pdf, sample_all_lights), light_pdf);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::arena::ScratchArena;
    use crate::core::config::BvhSettings;
    use crate::core::entity::Entity;
    use crate::core::material::Material;
    use crate::core::scene::SceneBuilder;
    use crate::core::sensor::{ CameraRay, Sensor };
    use crate::emitters::sky::SkyEmitter;
    use crate::materials::diffuse::DiffuseMaterial;
    use crate::math::constants::Vector2f;
    use crate::samplers::independent::IndependentSampler;
    use crate::shapes::quad::Quad;
    use crate::textures::constant::ConstantTexture;

    fn assert_close(a: Float, b: Float, tol: Float) {
        assert!((a - b).abs() < tol, "expected {} ~ {}", a, b);
    }

    struct NoCamera;

    impl Sensor for NoCamera {
        fn generate_ray(&self, _film: &Vector2f, _lens: &Vector2f) -> Option<CameraRay> {
            None
        }
    }

    #[test]
    fn test_balance_weights_partition_unity() {
        for &(a, b) in &[(0.1, 0.9), (3.0, 0.25), (1e-3, 50.0), (2.0, 2.0)] {
            assert_close(balance_heuristic(a, b) + balance_heuristic(b, a), 1.0, 1e-6);
        }
        assert_eq!(balance_heuristic(0.0, 0.0), 0.0);
        let delta = PreviousVertex { p: Vector3f::zeros(), pdf: 1.0, is_delta: true };
        assert_eq!(scatter_strategy_weight(Some(&delta), 1.0, 5.0), 1.0);
        assert_eq!(scatter_strategy_weight(None, 1.0, 5.0), 1.0);
        let smooth = PreviousVertex { is_delta: false, ..delta };
        assert_close(scatter_strategy_weight(Some(&smooth), 0.5, 2.0), 0.5, 1e-6);
    }

    #[test]
    fn test_uniform_sky_on_diffuse_floor() {
        // Under a uniform sky of radiance 1 a Lambertian floor reflects its albedo.
        let white: Arc<dyn Material> = Arc::new(DiffuseMaterial::new(
            Arc::new(ConstantTexture::new(RGBSpectrum::splat(0.5)))));
        let floor = Quad::new(Vector3f::new(-50.0, -50.0, 0.0),
                              Vector3f::new(100.0, 0.0, 0.0),
                              Vector3f::new(0.0, 100.0, 0.0));
        let mut builder = SceneBuilder::new();
        builder.add_entity(Entity::new(Arc::new(floor), white.clone()));
        builder.add_light(Box::new(SkyEmitter::uniform(RGBSpectrum::one())));
        builder.set_camera(Box::new(NoCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let it = scene.closest_intersection(&ray).expect("hit");
        assert!(it.geo_normal().z > 0.0);
        let arena = ScratchArena::new();
        let shading = white.shade(&it, &arena);
        let vertex = SurfaceVertex::new(&it, &shading, None);

        let mut sampler = IndependentSampler::new(1, 21);
        let n = 20000;
        let mut light_sum = 0.0;
        let mut scatter_sum = 0.0;
        for _ in 0..n {
            light_sum += direct_illumination(&scene, &vertex, &mut sampler, true).r();

            let wo = it.wo();
            if let Some(rec) = shading.sample(&wo, TransportMode::Radiance, &sampler.sample3()) {
                let prev = PreviousVertex { p: it.p(), pdf: rec.pdf, is_delta: rec.is_delta };
                let escaped = Ray3f::new(it.p(), rec.wi, None, None);
                let beta = rec.f * rec.wi.dot(&shading.shading_normal()).abs() / rec.pdf;
                scatter_sum += (beta * escaped_radiance(&scene, &escaped, Some(&prev), true)).r();
            }
        }
        let total = (light_sum + scatter_sum) / n as Float;
        assert_close(total, 0.5, 0.03);
        // Neither strategy alone carries everything.
        assert!(light_sum / (n as Float) < 0.45);
    }
}
