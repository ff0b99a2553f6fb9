// Copyright @yucwang 2023

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;

pub trait Shape: Send + Sync {
    fn bounding_box(&self) -> AABB;
    /// Closest hit with `t` inside the ray interval.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection>;
    /// Any hit inside the ray interval.
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool;
    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord;
    fn surface_area(&self) -> Float;

    /// Samples a point as seen from `ref_p`. The returned pdf is in area measure.
    fn sample_ref(&self, _ref_p: &Vector3f, u: &Vector2f) -> SurfaceSampleRecord {
        self.sample(u)
    }

    /// Area density of `sample_ref` producing `p`.
    fn pdf_ref(&self, _ref_p: &Vector3f, _p: &Vector3f) -> Float {
        let area = self.surface_area();
        if area > 0.0 { 1.0 / area } else { 0.0 }
    }
}
