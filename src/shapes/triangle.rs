// Copyright @yucwang 2023

use crate::core::shape::Shape;
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f,
    normals: Option<[Vector3f; 3]>,
    uvs: Option<[Vector2f; 3]>,
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p0, self.p1);
        bound.expand_by_point(&self.p2);

        bound
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, b1, b2) = self.moller_trumbore(ray)?;
        let b0 = 1.0 - b1 - b2;
        let p = self.p0 * b0 + self.p1 * b1 + self.p2 * b2;

        let mut geo_normal = self.geometric_normal();
        let sh_normal = match &self.normals {
            Some(ns) => {
                let n = ns[0] * b0 + ns[1] * b1 + ns[2] * b2;
                if n.norm_squared() > 0.0 { n.normalize() } else { geo_normal }
            }
            None => geo_normal,
        };
        // Keep the geometric side consistent with the interpolated normals.
        if geo_normal.dot(&sh_normal) < 0.0 {
            geo_normal = -geo_normal;
        }

        let uv = self.interpolate_uv(b1, b2);
        let dpdu = self.p1 - self.p0;
        let geo_frame = Frame::from_xz(dpdu, geo_normal);
        let sh_frame = Frame::from_xz(dpdu, sh_normal);
        Some(SurfaceIntersection::from_frames(p, geo_frame, sh_frame, uv, t, -ray.dir()))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.moller_trumbore(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let b = square_to_triangle(u);
        let p = self.p0 * b.x + self.p1 * b.y + self.p2 * b.z;

        SurfaceSampleRecord {
            p,
            n: self.geometric_normal(),
            uv: self.interpolate_uv(b.y, b.z),
            pdf: 1.0 / self.surface_area(),
        }
    }

    fn surface_area(&self) -> Float {
        0.5 * ((self.p1 - self.p0).cross(&(self.p2 - self.p0))).norm()
    }
}

impl Triangle {
    pub fn new(new_p0: Vector3f, new_p1: Vector3f, new_p2: Vector3f) -> Self {
        Triangle {
            p0: new_p0,
            p1: new_p1,
            p2: new_p2,
            normals: None,
            uvs: None,
        }
    }

    pub fn with_normals(mut self, normals: [Vector3f; 3]) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: [Vector2f; 3]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Returns `(t, b1, b2)` for a hit inside the ray interval.
    fn moller_trumbore(&self, ray: &Ray3f) -> Option<(Float, Float, Float)> {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        let d = ray.dir();
        let pvec = d.cross(&e2);
        let det = e1.dot(&pvec);
        if det.abs() < 1e-10 {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.p0;
        let b1 = tvec.dot(&pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let b2 = d.dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        if !ray.test_segment(t) {
            return None;
        }
        Some((t, b1, b2))
    }

    fn interpolate_uv(&self, b1: Float, b2: Float) -> Vector2f {
        match &self.uvs {
            Some(uvs) => uvs[0] * (1.0 - b1 - b2) + uvs[1] * b1 + uvs[2] * b2,
            None => Vector2f::new(b1, b2),
        }
    }

    pub fn geometric_normal(&self) -> Vector3f {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        edge0.cross(&edge1).normalize()
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box1() {
        let p0 = Vector3f::new(1.0, 1.0, 1.0);
        let p1 = Vector3f::new(1.5, 4.0, -1.0);
        let p2 = Vector3f::new(-1.0, 2.0, 2.5);

        let triangle = Triangle::new(p0, p1, p2);
        let bounding_box = triangle.bounding_box();

        assert_eq!(bounding_box.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bounding_box.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_ray_intersection_t() {
        let triangle = Triangle::new(Vector3f::new(1.0, 1.0, 0.0),
                                     Vector3f::new(2.0, 2.0, 0.0),
                                     Vector3f::new(2.0, 1.0, 0.0));

        let ray1 = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None);
        let ray2 = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0),
            Vector3f::new(0.0, 0.0, 1.0),
            None,
            None);
        let ray3 = Ray3f::new(Vector3f::new(1.5, 2.0, 3.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None);

        assert_eq!(triangle.ray_intersection_t(&ray1), true);
        assert_eq!(triangle.ray_intersection_t(&ray2), false);
        assert_eq!(triangle.ray_intersection_t(&ray3), false);

        let hit = triangle.ray_intersection(&ray1).expect("hit");
        assert!((hit.t() - 3.0).abs() < 1e-5);
        assert!((hit.p() - Vector3f::new(1.5, 1.1, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_shading_normals_and_uvs() {
        let n = Vector3f::new(0.0, 0.0, -1.0);
        let triangle = Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                                     Vector3f::new(1.0, 0.0, 0.0),
                                     Vector3f::new(0.0, 1.0, 0.0))
            .with_normals([n, n, n])
            .with_uvs([Vector2f::new(0.0, 0.0), Vector2f::new(2.0, 0.0), Vector2f::new(0.0, 2.0)]);
        let ray = Ray3f::new(Vector3f::new(0.25, 0.25, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = triangle.ray_intersection(&ray).expect("hit");
        assert!((hit.sh_normal() - n).norm() < 1e-5);
        assert!(hit.geo_normal().dot(&hit.sh_normal()) > 0.0);
        assert!((hit.uv() - Vector2f::new(0.5, 0.5)).norm() < 1e-5);
    }

    #[test]
    fn test_sample_lies_on_triangle() {
        let triangle = Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                                     Vector3f::new(2.0, 0.0, 0.0),
                                     Vector3f::new(0.0, 2.0, 0.0));
        let s = triangle.sample(&Vector2f::new(0.4, 0.6));
        assert!(s.p.z.abs() < 1e-6);
        assert!(s.p.x + s.p.y <= 2.0 + 1e-5);
        assert!((s.pdf - 0.5).abs() < 1e-6);
    }
}
