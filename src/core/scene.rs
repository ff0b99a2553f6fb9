// Copyright @yucwang 2026

use log::info;

use crate::core::arena::ScratchArena;
use crate::core::bsdf::ShadingPoint;
use crate::core::bvh::BVH;
use crate::core::config::BvhSettings;
use crate::core::emitter::Emitter;
use crate::core::entity::Entity;
use crate::core::error::ConstructionError;
use crate::core::interaction::{ MediumIntersection, SurfaceIntersection };
use crate::core::medium::Medium;
use crate::core::phase::HenyeyGreensteinPhase;
use crate::core::sampler::Sampler;
use crate::core::sensor::Sensor;
use crate::emitters::area::AreaEmitter;
use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector3f };

use crate::math::distribution::DiscreteDistribution;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Null surfaces a shadow ray may cross before it is considered blocked.
const MAX_NULL_CROSSINGS: usize = 16;

/// Where a ray interacts next.
pub enum ScatteringPoint<'a> {
    Surface {
        it: SurfaceIntersection,
        shading: ShadingPoint<'a>,
    },
    Medium {
        mi: MediumIntersection,
        medium: &'a dyn Medium,
        phase: HenyeyGreensteinPhase,
    },
}

/// Result of `Scene::next_scattering_point`. `point` is `None` when the ray
/// escapes; `throughput` is the free-flight weight along the traversed segment.
pub struct ScatteringEvent<'a> {
    pub point: Option<ScatteringPoint<'a>>,
    pub throughput: RGBSpectrum,
}

/// Collects entities, lights and the camera before the scene is frozen.
#[derive(Default)]
pub struct SceneBuilder {
    entities: Vec<Entity>,
    lights: Vec<Box<dyn Emitter>>,
    camera: Option<Box<dyn Sensor>>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Adds a light that is not bound to an entity.
    pub fn add_light(&mut self, light: Box<dyn Emitter>) {
        self.lights.push(light);
    }

    pub fn set_camera(&mut self, camera: Box<dyn Sensor>) {
        self.camera = Some(camera);
    }

    pub fn build(self, settings: &BvhSettings) -> Result<Scene, ConstructionError> {
        settings.validate()?;
        let camera = self.camera.ok_or(ConstructionError::MissingCamera)?;

        let prim_bounds: Vec<AABB> = self.entities.iter().map(|e| e.shape().bounding_box()).collect();
        let bvh = BVH::new(&prim_bounds, settings.max_leaf_size as i64)?;
        let mut bounds = AABB::default();
        for b in &prim_bounds {
            bounds.expand_by_aabb(b);
        }

        let mut lights: Vec<Box<dyn Emitter>> = Vec::new();
        let mut entity_light = vec![None; self.entities.len()];
        for (idx, entity) in self.entities.iter().enumerate() {
            if entity.is_emissive() {
                entity_light[idx] = Some(lights.len());
                lights.push(Box::new(AreaEmitter::from_shape(entity.shape().clone(), entity.emission())));
            }
        }

        let mut non_area = Vec::new();
        for mut light in self.lights {
            light.preprocess(&bounds);
            if light.is_area() {
                return Err(ConstructionError::parameter("light", "area lights must be attached to an entity"));
            }
            non_area.push(lights.len());
            lights.push(light);
        }

        let powers: Vec<Float> = lights.iter().map(|l| l.power().luminance()).collect();
        let light_distribution = DiscreteDistribution::new(&powers);

        info!("scene built: {} entities, {} lights ({} non-area), {} BVH nodes",
              self.entities.len(), lights.len(), non_area.len(), bvh.node_count());

        Ok(Scene {
            entities: self.entities,
            entity_light,
            lights,
            non_area,
            light_distribution,
            camera,
            bvh,
            bounds,
        })
    }
}

/// Immutable scene shared by all render workers.
pub struct Scene {
    entities: Vec<Entity>,
    entity_light: Vec<Option<usize>>,
    lights: Vec<Box<dyn Emitter>>,
    non_area: Vec<usize>,
    light_distribution: DiscreteDistribution,
    camera: Box<dyn Sensor>,
    bvh: BVH,
    bounds: AABB,
}

impl Scene {
    pub fn camera(&self) -> &dyn Sensor {
        self.camera.as_ref()
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, idx: usize) -> Option<&Entity> {
        self.entities.get(idx)
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn light(&self, idx: usize) -> Option<&dyn Emitter> {
        self.lights.get(idx).map(|l| l.as_ref())
    }

    /// Selection probability of light `idx` in `sample_light`.
    pub fn light_pdf(&self, idx: usize) -> Float {
        self.light_distribution.pmf(idx)
    }

    /// Picks a light proportionally to its power.
    pub fn sample_light(&self, u: Float) -> Option<(&dyn Emitter, Float)> {
        let (idx, pdf) = self.light_distribution.sample(u)?;
        Some((self.lights[idx].as_ref(), pdf))
    }

    pub fn lights(&self) -> impl Iterator<Item = &dyn Emitter> + '_ {
        self.lights.iter().map(|l| l.as_ref())
    }

    /// Non-area lights with their selection probabilities.
    pub fn non_area_lights(&self) -> impl Iterator<Item = (&dyn Emitter, Float)> + '_ {
        self.non_area.iter().map(move |&idx| (self.lights[idx].as_ref(), self.light_pdf(idx)))
    }

    /// Area light attached to entity `idx`, with its selection probability.
    pub fn emitter_of(&self, idx: usize) -> Option<(&dyn Emitter, Float)> {
        let light = (*self.entity_light.get(idx)?)?;
        Some((self.lights[light].as_ref(), self.light_pdf(light)))
    }

    /// Radiance from every non-area light along an escaping ray.
    pub fn non_area_le(&self, ray: &Ray3f) -> RGBSpectrum {
        let dir = ray.dir();
        let mut le = RGBSpectrum::default();
        for (light, _) in self.non_area_lights() {
            le += light.non_area_le(&dir);
        }
        le
    }

    fn closest_entity_intersection(&self, ray: &Ray3f) -> Option<(usize, SurfaceIntersection)> {
        let mut r = *ray;
        self.bvh.closest_intersection(&mut r, |idx, ray| {
            self.entities[idx].shape().ray_intersection(ray).map(|hit| {
                let t = hit.t();
                (hit, t)
            })
        })
    }

    pub fn closest_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        self.closest_entity_intersection(ray).map(|(idx, hit)| hit.with_entity(idx))
    }

    pub fn has_intersection(&self, ray: &Ray3f) -> bool {
        self.bvh.has_intersection(ray, |idx, ray| self.entities[idx].shape().ray_intersection_t(ray))
    }

    /// True when nothing blocks the open segment between `a` and `b`.
    pub fn visible(&self, a: &Vector3f, b: &Vector3f) -> bool {
        !self.has_intersection(&Ray3f::between(*a, *b))
    }

    /// Transmittance from `a` to `b` starting in `medium`. Medium boundaries
    /// are crossed; any other surface blocks the segment.
    pub fn shadow_transmittance(&self,
                                a: &Vector3f,
                                b: &Vector3f,
                                medium: Option<&dyn Medium>,
                                sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut tr = RGBSpectrum::one();
        let mut origin = *a;
        let mut medium = medium;
        for _ in 0..MAX_NULL_CROSSINGS {
            let ray = Ray3f::between(origin, *b);
            let (idx, hit) = match self.closest_entity_intersection(&ray) {
                Some(found) => found,
                None => {
                    if let Some(m) = medium {
                        tr *= m.tr(&origin, b, sampler);
                    }
                    return tr;
                }
            };
            let entity = &self.entities[idx];
            if !entity.material().is_null_interface() {
                return RGBSpectrum::default();
            }
            if let Some(m) = medium {
                tr *= m.tr(&origin, &hit.p(), sampler);
            }
            if tr.is_black() {
                return tr;
            }
            let dir = ray.dir();
            medium = entity.medium_interface().medium_for(&hit, &dir);
            origin = hit.p() + dir * EPSILON;
        }
        RGBSpectrum::default()
    }

    /// Finds the closest surface along `ray` and samples the medium on the
    /// side the ray arrives from. Escaping rays travel through vacuum.
    pub fn next_scattering_point<'a>(&'a self,
                                     ray: &Ray3f,
                                     sampler: &mut dyn Sampler,
                                     arena: &'a ScratchArena) -> ScatteringEvent<'a> {
        let (idx, hit) = match self.closest_entity_intersection(ray) {
            Some(found) => found,
            None => return ScatteringEvent { point: None, throughput: RGBSpectrum::one() },
        };
        let it = hit.with_entity(idx);
        let entity = &self.entities[idx];

        let mut throughput = RGBSpectrum::one();
        if let Some(medium) = entity.medium_interface().medium_for(&it, &it.wo()) {
            let rec = medium.sample_scattering(&ray.at(ray.min_t), &it.p(), sampler);
            throughput = rec.weight();
            if let Some(mi) = rec.scatter {
                let phase = medium.phase(&mi.p);
                return ScatteringEvent {
                    point: Some(ScatteringPoint::Medium { mi, medium, phase }),
                    throughput,
                };
            }
        }

        let shading = entity.material().shade(&it, arena);
        ScatteringEvent { point: Some(ScatteringPoint::Surface { it, shading }), throughput }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::medium::MediumInterface;
    use crate::core::sensor::CameraRay;
    use crate::emitters::sky::SkyEmitter;
    use crate::materials::diffuse::DiffuseMaterial;
    use crate::materials::invisible::InvisibleSurface;
    use crate::media::homogeneous_medium::HomogeneousMedium;
    use crate::math::constants::Vector2f;
    use crate::samplers::independent::IndependentSampler;
    use crate::shapes::sphere::Sphere;
    use crate::textures::constant::ConstantTexture;

    struct FixedCamera;

    impl Sensor for FixedCamera {
        fn generate_ray(&self, _film: &Vector2f, _lens: &Vector2f) -> Option<CameraRay> {
            let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
            Some(CameraRay { ray, weight: 1.0 })
        }
    }

    fn grey() -> Arc<DiffuseMaterial> {
        Arc::new(DiffuseMaterial::new(Arc::new(ConstantTexture::new(RGBSpectrum::splat(0.5)))))
    }

    fn sphere_entity(z: Float, r: Float) -> Entity {
        Entity::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, z), r)), grey())
    }

    #[test]
    fn test_closest_hit_and_entity_index() {
        let mut builder = SceneBuilder::new();
        builder.add_entity(sphere_entity(5.0, 1.0));
        builder.add_entity(sphere_entity(2.0, 0.5));
        builder.add_entity(sphere_entity(10.0, 1.0));
        builder.set_camera(Box::new(FixedCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = scene.closest_intersection(&ray).expect("hit");
        assert!((hit.t() - 1.5).abs() < 1e-4);
        assert_eq!(hit.entity(), Some(1));
        assert!(scene.has_intersection(&ray));
        assert!(!scene.visible(&Vector3f::zeros(), &Vector3f::new(0.0, 0.0, 4.0)));
        assert!(scene.visible(&Vector3f::zeros(), &Vector3f::new(0.0, 4.0, 0.0)));
    }

    #[test]
    fn test_build_requires_camera_and_valid_leaf_size() {
        assert_eq!(SceneBuilder::new().build(&BvhSettings::default()).err(),
                   Some(ConstructionError::MissingCamera));
        let mut builder = SceneBuilder::new();
        builder.set_camera(Box::new(FixedCamera));
        assert_eq!(builder.build(&BvhSettings { max_leaf_size: 0 }).err(),
                   Some(ConstructionError::InvalidLeafSize(0)));
    }

    #[test]
    fn test_light_selection_follows_power() {
        let mut builder = SceneBuilder::new();
        builder.add_entity(sphere_entity(0.0, 1.0).with_emission(RGBSpectrum::splat(1.0)));
        builder.add_entity(sphere_entity(5.0, 1.0));
        builder.add_entity(sphere_entity(-5.0, 1.0).with_emission(RGBSpectrum::splat(3.0)));
        builder.set_camera(Box::new(FixedCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");

        assert_eq!(scene.light_count(), 2);
        let (_, p0) = scene.emitter_of(0).expect("light");
        let (_, p2) = scene.emitter_of(2).expect("light");
        assert!(scene.emitter_of(1).is_none());
        assert!((p0 - 0.25).abs() < 1e-5);
        assert!((p2 - 0.75).abs() < 1e-5);
        let (_, pdf) = scene.sample_light(0.9).expect("light");
        assert!((pdf - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_empty_scene_returns_environment() {
        let mut builder = SceneBuilder::new();
        builder.add_light(Box::new(SkyEmitter::uniform(RGBSpectrum::new(0.1, 0.2, 0.3))));
        builder.set_camera(Box::new(FixedCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.3, 0.4, 0.5), None, None);
        assert!(scene.closest_intersection(&ray).is_none());
        assert_eq!(scene.non_area_le(&ray), RGBSpectrum::new(0.1, 0.2, 0.3));
        assert_eq!(scene.non_area_lights().count(), 1);

        let arena = ScratchArena::new();
        let mut sampler = IndependentSampler::new(1, 0);
        let event = scene.next_scattering_point(&ray, &mut sampler, &arena);
        assert!(event.point.is_none());
        assert_eq!(event.throughput, RGBSpectrum::one());
    }

    #[test]
    fn test_scattering_inside_dense_medium() {
        let fog: Arc<dyn Medium> = Arc::new(HomogeneousMedium::new(
            RGBSpectrum::splat(0.0), RGBSpectrum::splat(50.0), 0.0).expect("medium"));
        let boundary = Entity::new(Arc::new(Sphere::new(Vector3f::zeros(), 1.0)), Arc::new(InvisibleSurface::new()))
            .with_medium_interface(MediumInterface::new(Some(fog), None));

        let mut builder = SceneBuilder::new();
        builder.add_entity(boundary);
        builder.set_camera(Box::new(FixedCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");

        let arena = ScratchArena::new();
        let mut sampler = IndependentSampler::new(1, 5);
        // From the centre outwards: the ray arrives at the boundary from inside.
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let mut scattered = 0;
        for _ in 0..100 {
            let event = scene.next_scattering_point(&ray, &mut sampler, &arena);
            if let Some(ScatteringPoint::Medium { mi, .. }) = event.point {
                assert!(mi.t < 1.0);
                scattered += 1;
            }
        }
        assert!(scattered > 95);

        // From outside the ray sees vacuum up to the boundary.
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -3.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let event = scene.next_scattering_point(&ray, &mut sampler, &arena);
        assert!(matches!(event.point, Some(ScatteringPoint::Surface { .. })));
        assert_eq!(event.throughput, RGBSpectrum::one());
    }

    #[test]
    fn test_shadow_transmittance_crosses_medium_boundary() {
        let fog: Arc<dyn Medium> = Arc::new(HomogeneousMedium::new(
            RGBSpectrum::splat(0.5), RGBSpectrum::splat(0.5), 0.0).expect("medium"));
        let boundary = Entity::new(Arc::new(Sphere::new(Vector3f::zeros(), 1.0)), Arc::new(InvisibleSurface::new()))
            .with_medium_interface(MediumInterface::new(Some(fog.clone()), None));

        let mut builder = SceneBuilder::new();
        builder.add_entity(boundary);
        builder.add_entity(sphere_entity(10.0, 1.0));
        builder.set_camera(Box::new(FixedCamera));
        let scene = builder.build(&BvhSettings::default()).expect("scene");
        let mut sampler = IndependentSampler::new(1, 3);

        // Centre to far outside: one unit of medium with sigma_t = 1.
        let tr = scene.shadow_transmittance(&Vector3f::zeros(), &Vector3f::new(0.0, 5.0, 0.0),
                                            Some(fog.as_ref()), &mut sampler);
        assert!((tr.r() - (-1.0 as Float).exp()).abs() < 1e-3);

        // Straight through the whole sphere from outside.
        let tr = scene.shadow_transmittance(&Vector3f::new(-3.0, 0.0, 0.0), &Vector3f::new(3.0, 0.0, 0.0),
                                            None, &mut sampler);
        assert!((tr.r() - (-2.0 as Float).exp()).abs() < 1e-3);

        // The opaque sphere blocks.
        let tr = scene.shadow_transmittance(&Vector3f::new(0.0, 0.0, 5.0), &Vector3f::new(0.0, 0.0, 15.0),
                                            None, &mut sampler);
        assert!(tr.is_black());
    }
}
