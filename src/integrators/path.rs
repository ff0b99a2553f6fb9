// Copyright @yucwang 2026

use crate::core::arena::ScratchArena;
use crate::core::bsdf::TransportMode;
use crate::core::config::PathTracingSettings;
use crate::core::error::ConstructionError;
use crate::core::film::GBufferPixel;
use crate::core::integrator::{ Integrator, PixelSample };
use crate::core::medium::MediumInterface;
use crate::core::sampler::Sampler;
use crate::core::scene::{ Scene, ScatteringPoint };
use crate::integrators::mis::{ area_emission, direct_illumination, escaped_radiance,
                               MediumVertex, PreviousVertex, SurfaceVertex, PDF_EPSILON };
use crate::core::interaction::SurfaceIntersection;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Medium boundaries a single segment may pass before the path is dropped.
const MAX_NULL_CROSSINGS: usize = 64;

/// Unidirectional path tracer with next event estimation, Russian roulette,
/// participating media and subsurface scattering.
pub struct PathTracingIntegrator {
    settings: PathTracingSettings,
}

impl PathTracingIntegrator {
    pub fn new(settings: PathTracingSettings) -> Result<Self, ConstructionError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &PathTracingSettings {
        &self.settings
    }

    /// Next non-null scattering point along `ray`. Medium boundaries are
    /// crossed in place and their free-flight weights folded into `beta`.
    fn next_vertex<'a>(&self,
                       scene: &'a Scene,
                       ray: &mut Ray3f,
                       beta: &mut RGBSpectrum,
                       sampler: &mut dyn Sampler,
                       arena: &'a ScratchArena) -> Option<ScatteringPoint<'a>> {
        for _ in 0..MAX_NULL_CROSSINGS {
            let event = scene.next_scattering_point(ray, sampler, arena);
            *beta *= event.throughput;
            match event.point {
                Some(ScatteringPoint::Surface { it, .. }) if is_null(scene, &it) => {
                    *ray = it.spawn_ray(&ray.dir());
                }
                point => return point,
            }
        }
        *beta = RGBSpectrum::default();
        None
    }

    fn trace(&self,
             camera_ray: &Ray3f,
             scene: &Scene,
             sampler: &mut dyn Sampler,
             arena: &ScratchArena) -> PixelSample {
        let settings = &self.settings;
        let sample_all = settings.sample_all_lights;

        let mut radiance = RGBSpectrum::default();
        let mut gbuffer = GBufferPixel::default();
        let mut beta = RGBSpectrum::one();
        let mut ray = *camera_ray;
        let mut prev: Option<PreviousVertex> = None;
        let mut depth = 1;

        loop {
            let point = self.next_vertex(scene, &mut ray, &mut beta, sampler, arena);
            if beta.is_black() {
                break;
            }

            let point = match point {
                Some(point) => point,
                None => {
                    radiance += beta * escaped_radiance(scene, &ray, prev.as_ref(), sample_all);
                    break;
                }
            };

            if let ScatteringPoint::Surface { it, .. } = &point {
                radiance += beta * area_emission(scene, it, prev.as_ref(), sample_all);
            }
            if depth > settings.max_depth {
                break;
            }

            if depth > settings.min_depth {
                if sampler.sample1() >= settings.cont_prob {
                    break;
                }
                beta /= settings.cont_prob;
            }

            match point {
                ScatteringPoint::Medium { mi, medium, phase } => {
                    if depth == 1 {
                        gbuffer = GBufferPixel { albedo: phase.albedo(), normal: Vector3f::zeros(), depth: mi.t };
                    }
                    let vertex = MediumVertex::new(&mi, medium, &phase);
                    radiance += beta * direct_illumination(scene, &vertex, sampler, sample_all);

                    let rec = match phase.sample(&mi.wo, &sampler.sample2()) {
                        Some(rec) if rec.pdf >= PDF_EPSILON => rec,
                        _ => break,
                    };
                    beta *= rec.value / rec.pdf;
                    prev = Some(PreviousVertex { p: mi.p, pdf: rec.pdf, is_delta: false });
                    ray = Ray3f::new(mi.p, rec.wi, None, None);
                }
                ScatteringPoint::Surface { it, shading } => {
                    if depth == 1 {
                        gbuffer = GBufferPixel {
                            albedo: shading.albedo(),
                            normal: shading.shading_normal(),
                            depth: it.t(),
                        };
                    }
                    let interface = medium_interface(scene, &it);
                    let vertex = SurfaceVertex::new(&it, &shading, interface);
                    radiance += beta * direct_illumination(scene, &vertex, sampler, sample_all);

                    let wo = it.wo();
                    let rec = match shading.sample(&wo, TransportMode::Radiance, &sampler.sample3()) {
                        Some(rec) if !rec.f.is_black() && rec.pdf >= PDF_EPSILON => rec,
                        _ => break,
                    };
                    beta *= rec.f * (rec.wi.dot(&shading.shading_normal()).abs() / rec.pdf);

                    let enters = it.is_outside(&wo) && !it.is_outside(&rec.wi);
                    match shading.bssrdf() {
                        Some(bssrdf) if enters => {
                            let sss = match bssrdf.sample_pi(&sampler.sample3(), scene, arena) {
                                Some(sss) if sss.pdf >= PDF_EPSILON => sss,
                                _ => break,
                            };
                            beta *= sss.coef / sss.pdf;
                            if beta.is_black() {
                                break;
                            }

                            let exit = sss.exit;
                            let exit_vertex = SurfaceVertex::new(&exit, &sss.shading, medium_interface(scene, &exit));
                            radiance += beta * direct_illumination(scene, &exit_vertex, sampler, sample_all);

                            let exit_wo = exit.wo();
                            let erec = match sss.shading.sample(&exit_wo, TransportMode::Radiance, &sampler.sample3()) {
                                Some(erec) if !erec.f.is_black() && erec.pdf >= PDF_EPSILON => erec,
                                _ => break,
                            };
                            beta *= erec.f * (erec.wi.dot(&exit.geo_normal()).abs() / erec.pdf);
                            prev = Some(PreviousVertex { p: exit.p(), pdf: erec.pdf, is_delta: false });
                            ray = exit.spawn_ray(&erec.wi);
                        }
                        _ => {
                            prev = Some(PreviousVertex { p: it.p(), pdf: rec.pdf, is_delta: rec.is_delta });
                            ray = it.spawn_ray(&rec.wi);
                        }
                    }
                }
            }

            if beta.is_black() {
                break;
            }
            depth += 1;
        }

        PixelSample { radiance, gbuffer }
    }
}

fn is_null(scene: &Scene, it: &SurfaceIntersection) -> bool {
    it.entity()
        .and_then(|idx| scene.entity(idx))
        .map_or(false, |e| e.material().is_null_interface())
}

fn medium_interface<'s>(scene: &'s Scene, it: &SurfaceIntersection) -> Option<&'s MediumInterface> {
    it.entity().and_then(|idx| scene.entity(idx)).map(|e| e.medium_interface())
}

impl Integrator for PathTracingIntegrator {
    fn eval(&self,
            ray: &Ray3f,
            scene: &Scene,
            sampler: &mut dyn Sampler,
            arena: &ScratchArena) -> PixelSample {
        let mut sample = self.trace(ray, scene, sampler, arena);
        if !sample.radiance.is_finite() {
            sample.radiance = RGBSpectrum::default();
        }
        sample
    }

    fn describe(&self) -> String {
        format!("PathTracingIntegrator [ min_depth = {}, max_depth = {}, cont_prob = {}, sample_all_lights = {} ]",
                self.settings.min_depth, self.settings.max_depth,
                self.settings.cont_prob, self.settings.sample_all_lights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::config::BvhSettings;
    use crate::core::entity::Entity;
    use crate::core::material::Material;
    use crate::core::medium::Medium;
    use crate::core::scene::SceneBuilder;
    use crate::core::sensor::{ CameraRay, Sensor };
    use crate::emitters::sky::SkyEmitter;
    use crate::materials::diffuse::DiffuseMaterial;
    use crate::materials::invisible::InvisibleSurface;
    use crate::media::homogeneous_medium::HomogeneousMedium;
    use crate::math::constants::{ Float, Vector2f };
    use crate::samplers::independent::IndependentSampler;
    use crate::shapes::sphere::Sphere;
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

    fn settings(max_depth: i32) -> PathTracingSettings {
        PathTracingSettings { min_depth: max_depth.min(5), max_depth, cont_prob: 0.9, sample_all_lights: true }
    }

    fn mean_radiance(integrator: &PathTracingIntegrator, scene: &Scene, ray: &Ray3f, n: usize) -> RGBSpectrum {
        let arena = ScratchArena::new();
        let mut sampler = IndependentSampler::new(1, 99);
        let mut sum = RGBSpectrum::default();
        for _ in 0..n {
            sum += integrator.eval(ray, scene, &mut sampler, &arena).radiance;
        }
        sum / n as Float
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut s = settings(5);
        s.min_depth = 8;
        assert!(PathTracingIntegrator::new(s).is_err());
    }

    #[test]
    fn test_escaped_camera_ray_sees_sky() {
        let mut builder = SceneBuilder::new();
        builder.add_light(Box::new(SkyEmitter::new(RGBSpectrum::new(0.2, 0.4, 0.6), RGBSpectrum::one())));
        builder.set_camera(Box::new(NoCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");
        let integrator = PathTracingIntegrator::new(settings(5)).expect("integrator");

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let arena = ScratchArena::new();
        let mut sampler = IndependentSampler::new(1, 1);
        let sample = integrator.eval(&ray, &scene, &mut sampler, &arena);
        assert_eq!(sample.radiance, scene.non_area_le(&ray));
        assert_eq!(sample.gbuffer, GBufferPixel::default());
    }

    #[test]
    fn test_white_furnace() {
        // A non-absorbing sphere under a uniform sky looks exactly like the sky.
        let white: Arc<dyn Material> = Arc::new(DiffuseMaterial::new(
            Arc::new(ConstantTexture::new(RGBSpectrum::one()))));
        let mut builder = SceneBuilder::new();
        builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::zeros(), 1.0)), white));
        builder.add_light(Box::new(SkyEmitter::uniform(RGBSpectrum::splat(0.5))));
        builder.set_camera(Box::new(NoCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");
        let integrator = PathTracingIntegrator::new(settings(50)).expect("integrator");

        let ray = Ray3f::new(Vector3f::new(0.3, 0.2, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let mean = mean_radiance(&integrator, &scene, &ray, 4000);
        assert_close(mean.r(), 0.5, 0.03);

        let arena = ScratchArena::new();
        let mut sampler = IndependentSampler::new(1, 4);
        let sample = integrator.eval(&ray, &scene, &mut sampler, &arena);
        assert!(sample.gbuffer.depth > 3.9 && sample.gbuffer.depth < 4.1);
        assert_eq!(sample.gbuffer.albedo, RGBSpectrum::one());
        assert!(sample.gbuffer.normal.z > 0.9);
    }

    #[test]
    fn test_emitter_seen_directly() {
        let black: Arc<dyn Material> = Arc::new(DiffuseMaterial::new(
            Arc::new(ConstantTexture::new(RGBSpectrum::default()))));
        let mut builder = SceneBuilder::new();
        builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::zeros(), 1.0)), black)
            .with_emission(RGBSpectrum::splat(3.0)));
        builder.set_camera(Box::new(NoCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");
        let integrator = PathTracingIntegrator::new(settings(1)).expect("integrator");

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let mean = mean_radiance(&integrator, &scene, &ray, 16);
        assert_close(mean.g(), 3.0, 1e-4);
    }

    #[test]
    fn test_medium_boundary_attenuates_sky() {
        // Purely absorbing fog: the sky is seen through exp(-sigma_a * 2r).
        let fog: Arc<dyn Medium> = Arc::new(HomogeneousMedium::new(
            RGBSpectrum::splat(0.5), RGBSpectrum::default(), 0.0).expect("medium"));
        let boundary = Entity::new(Arc::new(Sphere::new(Vector3f::zeros(), 1.0)), Arc::new(InvisibleSurface::new()))
            .with_medium_interface(MediumInterface::new(Some(fog), None));
        let mut builder = SceneBuilder::new();
        builder.add_entity(boundary);
        builder.add_light(Box::new(SkyEmitter::uniform(RGBSpectrum::one())));
        builder.set_camera(Box::new(NoCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");
        let integrator = PathTracingIntegrator::new(settings(5)).expect("integrator");

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let mean = mean_radiance(&integrator, &scene, &ray, 20000);
        assert_close(mean.r(), (-1.0 as Float).exp(), 0.015);
    }
}
