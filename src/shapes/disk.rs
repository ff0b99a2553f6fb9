// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f, INV_2PI, PI};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_disk_concentric;

pub struct Disk {
    center: Vector3f,
    radius: Float,
    frame: Frame,
}

impl Disk {
    pub fn new(center: Vector3f, normal: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.abs(), frame: Frame::from_z(normal) }
    }

    fn intersect_local(&self, ray: &Ray3f) -> Option<(Float, Vector3f)> {
        let n = self.frame.z;
        let denom = n.dot(&ray.dir());
        if denom.abs() < EPSILON * EPSILON {
            return None;
        }
        let t = n.dot(&(self.center - ray.origin())) / denom;
        if !ray.test_segment(t) {
            return None;
        }
        let local = self.frame.to_local(&(ray.at(t) - self.center));
        if local.x * local.x + local.y * local.y > self.radius * self.radius {
            return None;
        }
        Some((t, local))
    }
}

impl Shape for Disk {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        for (sx, sy) in [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)] {
            let corner = self.frame.from_local(&Vector3f::new(sx * self.radius, sy * self.radius, 0.0));
            bbox.expand_by_point(&(self.center + corner));
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, local) = self.intersect_local(ray)?;
        let r = (local.x * local.x + local.y * local.y).sqrt();
        let mut phi = local.y.atan2(local.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let uv = Vector2f::new(r / self.radius.max(EPSILON), phi * INV_2PI);
        let p = self.center + self.frame.from_local(&Vector3f::new(local.x, local.y, 0.0));
        Some(SurfaceIntersection::from_frames(p, self.frame, self.frame, uv, t, -ray.dir()))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_local(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let d = sample_uniform_disk_concentric(u) * self.radius;
        let p = self.center + self.frame.from_local(&Vector3f::new(d.x, d.y, 0.0));
        let area = self.surface_area();
        SurfaceSampleRecord {
            p,
            n: self.frame.z,
            uv: *u,
            pdf: if area > 0.0 { 1.0 / area } else { 0.0 },
        }
    }

    fn surface_area(&self) -> Float {
        PI * self.radius * self.radius
    }
}
