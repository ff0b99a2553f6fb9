// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;

/// Parallelogram `p0 + u * e1 + v * e2` with `u, v` in `[0, 1]`.
pub struct Quad {
    p0: Vector3f,
    e1: Vector3f,
    e2: Vector3f,
    frame: Frame,
    w: Vector3f,
    area: Float,
}

impl Quad {
    pub fn new(p0: Vector3f, e1: Vector3f, e2: Vector3f) -> Self {
        let n = e1.cross(&e2);
        let area = n.norm();
        let w = if area > 0.0 { n / (area * area) } else { Vector3f::zeros() };
        let frame = if area > 0.0 {
            Frame::from_xz(e1, n / area)
        } else {
            Frame::default()
        };

        Self { p0, e1, e2, frame, w, area }
    }

    pub fn normal(&self) -> Vector3f {
        self.frame.z
    }

    fn intersect_local(&self, ray: &Ray3f) -> Option<(Float, Vector2f)> {
        let n = self.frame.z;
        let denom = n.dot(&ray.dir());
        if denom.abs() < EPSILON * EPSILON {
            return None;
        }

        let t = n.dot(&(self.p0 - ray.origin())) / denom;
        if !ray.test_segment(t) {
            return None;
        }

        let local = ray.at(t) - self.p0;
        let u = self.w.dot(&local.cross(&self.e2));
        let v = self.w.dot(&self.e1.cross(&local));
        if u < 0.0 || u > 1.0 || v < 0.0 || v > 1.0 {
            return None;
        }
        Some((t, Vector2f::new(u, v)))
    }
}

impl Shape for Quad {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::from_point(self.p0);
        bbox.expand_by_point(&(self.p0 + self.e1));
        bbox.expand_by_point(&(self.p0 + self.e2));
        bbox.expand_by_point(&(self.p0 + self.e1 + self.e2));
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, uv) = self.intersect_local(ray)?;
        let p = self.p0 + self.e1 * uv.x + self.e2 * uv.y;
        Some(SurfaceIntersection::from_frames(p, self.frame, self.frame, uv, t, -ray.dir()))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_local(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let p = self.p0 + self.e1 * u.x + self.e2 * u.y;
        let pdf = if self.area > 0.0 { 1.0 / self.area } else { 0.0 };
        SurfaceSampleRecord { p, n: self.frame.z, uv: *u, pdf }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}
