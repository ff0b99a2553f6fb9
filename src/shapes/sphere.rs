// Copyright @yucwang 2026

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f, INV_PI, INV_2PI, PI };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::warp::{ sample_uniform_cone, sample_uniform_cone_pdf, sample_uniform_sphere };

pub struct Sphere {
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.abs() }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    /// Both roots of the ray/sphere quadratic, ordered.
    fn solve(&self, ray: &Ray3f) -> Option<(Float, Float)> {
        let oc = ray.origin() - self.center;
        let d = ray.dir();
        let b = oc.dot(&d);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        Some((-b - sq, -b + sq))
    }

    fn surface_point(&self, p: Vector3f) -> (Vector3f, Vector2f) {
        let n = (p - self.center) / self.radius;
        let mut phi = n.y.atan2(n.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let theta = n.z.max(-1.0).min(1.0).acos();
        (n, Vector2f::new(phi * INV_2PI, theta * INV_PI))
    }

    fn make_intersection(&self, ray: &Ray3f, t: Float) -> SurfaceIntersection {
        let hit = ray.at(t);
        let (n, uv) = self.surface_point(hit);
        // Project back onto the surface to limit drift.
        let p = self.center + n * self.radius;
        let dpdu = Vector3f::new(-n.y, n.x, 0.0);
        let frame = Frame::from_xz(dpdu, n);
        SurfaceIntersection::from_frames(p, frame, frame, uv, t, -ray.dir())
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t0, t1) = self.solve(ray)?;
        let t = if ray.test_segment(t0) {
            t0
        } else if ray.test_segment(t1) {
            t1
        } else {
            return None;
        };
        Some(self.make_intersection(ray, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        match self.solve(ray) {
            Some((t0, t1)) => ray.test_segment(t0) || ray.test_segment(t1),
            None => false,
        }
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let n = sample_uniform_sphere(u);
        let p = self.center + n * self.radius;
        let (_, uv) = self.surface_point(p);
        SurfaceSampleRecord { p, n, uv, pdf: 1.0 / self.surface_area() }
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }

    fn sample_ref(&self, ref_p: &Vector3f, u: &Vector2f) -> SurfaceSampleRecord {
        let to_center = self.center - ref_p;
        let dist2 = to_center.norm_squared();
        let r2 = self.radius * self.radius;
        if dist2 <= r2 * 1.0001 {
            return self.sample(u);
        }

        // Sample the cone of directions subtended by the sphere.
        let dist = dist2.sqrt();
        let cos_max = (1.0 - r2 / dist2).max(0.0).sqrt();
        let frame = Frame::from_z(to_center / dist);
        let dir = frame.from_local(&sample_uniform_cone(u, cos_max));

        let ray = Ray3f::new(*ref_p, dir, None, None);
        let p = match self.solve(&ray) {
            Some((t0, _)) if t0 > 0.0 => ray.at(t0),
            // Grazing direction: take the closest point on the ray.
            _ => {
                let t = to_center.dot(&ray.dir());
                let q = ray.at(t) - self.center;
                self.center + q.normalize() * self.radius
            }
        };
        let (n, uv) = self.surface_point(p);
        SurfaceSampleRecord { p, n, uv, pdf: self.pdf_ref(ref_p, &p) }
    }

    fn pdf_ref(&self, ref_p: &Vector3f, p: &Vector3f) -> Float {
        let dist2_center = (self.center - ref_p).norm_squared();
        let r2 = self.radius * self.radius;
        if dist2_center <= r2 * 1.0001 {
            return 1.0 / self.surface_area();
        }

        let cos_max = (1.0 - r2 / dist2_center).max(0.0).sqrt();
        let to_ref = ref_p - p;
        let dist2 = to_ref.norm_squared();
        if dist2 <= 0.0 {
            return 0.0;
        }
        let n = (p - self.center) / self.radius;
        let cos_light = n.dot(&to_ref).abs() / dist2.sqrt();
        sample_uniform_cone_pdf(cos_max) * cos_light / dist2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_intersection() {
        let sphere = Sphere::new(Vector3f::zeros(), 1.0);
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("hit");
        assert!((hit.t() - 4.0).abs() < 1e-4);
        assert!((hit.geo_normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-4);
        assert!(sphere.ray_intersection_t(&ray));

        let inside = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&inside).expect("hit from inside");
        assert!((hit.t() - 1.0).abs() < 1e-4);

        let miss = Ray3f::new(Vector3f::new(0.0, 2.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(sphere.ray_intersection(&miss).is_none());
        let short = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, Some(3.0));
        assert!(!sphere.ray_intersection_t(&short));
    }

    #[test]
    fn test_sphere_sample_ref_pdf_matches_cone() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 0.0), 0.5);
        let ref_p = Vector3f::new(0.0, 0.0, 3.0);
        let cos_max = (1.0 - 0.25 / 9.0 as Float).sqrt();
        let cone_pdf = sample_uniform_cone_pdf(cos_max);

        for i in 0..8 {
            let u = Vector2f::new((i as Float + 0.5) / 8.0, 0.37);
            let s = sphere.sample_ref(&ref_p, &u);
            assert!(((s.p - sphere.center()).norm() - 0.5).abs() < 1e-3);
            let to_ref = ref_p - s.p;
            let dist2 = to_ref.norm_squared();
            let cos_light = s.n.dot(&to_ref.normalize()).abs();
            let solid_angle_pdf = s.pdf * dist2 / cos_light;
            assert!((solid_angle_pdf - cone_pdf).abs() / cone_pdf < 1e-2);
        }
    }

    #[test]
    fn test_sphere_area() {
        let sphere = Sphere::new(Vector3f::zeros(), 2.0);
        assert!((sphere.surface_area() - 16.0 * PI).abs() < 1e-3);
        let s = sphere.sample(&Vector2f::new(0.2, 0.7));
        assert!((s.p.norm() - 2.0).abs() < 1e-4);
        assert!((s.pdf - 1.0 / (16.0 * PI)).abs() < 1e-6);
    }
}
