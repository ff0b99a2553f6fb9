// Copyright 2020 @TwoCookingMice

use super::constants::{ Int, Float, Vector3f,
                       FLOAT_MIN, FLOAT_MAX };

use std::ops;

/// Axis-aligned box. The default value is the empty box (`p_min = +inf`,
/// `p_max = -inf`), which is the identity of the union.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::repeat(FLOAT_MAX),
               p_max: Vector3f::repeat(FLOAT_MIN) }
    }
}

impl AABB {
    /// Box spanned by two opposite corners given in any order.
    pub fn new(a: Vector3f, b: Vector3f) -> Self {
        Self { p_min: a.inf(&b), p_max: a.sup(&b) }
    }

    pub fn from_point(p: Vector3f) -> Self {
        Self { p_min: p, p_max: p }
    }

    pub fn center(&self) -> Vector3f {
        0.5 * (self.p_min + self.p_max)
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    pub fn union(&self, other: &AABB) -> AABB {
        let mut ret = *self;
        ret.expand_by_aabb(other);
        ret
    }

    pub fn contains(&self, p: &Vector3f) -> bool {
        (0..3).all(|idx| p[idx] >= self.p_min[idx] && p[idx] <= self.p_max[idx])
    }

    /// Slab test against a precomputed reciprocal direction.
    pub fn intersect_inv(&self, origin: &Vector3f, inv_dir: &Vector3f,
                         t_min: Float, t_max: Float) -> bool {
        self.intersect_range_inv(origin, inv_dir, t_min, t_max).is_some()
    }

    /// Parametric range of `[t_min, t_max]` that lies inside the box.
    pub fn intersect_range_inv(&self, origin: &Vector3f, inv_dir: &Vector3f,
                               mut t_min: Float, mut t_max: Float) -> Option<(Float, Float)> {
        if !self.is_valid() {
            return None;
        }

        for idx in 0..3 {
            let near = (self.p_min[idx] - origin[idx]) * inv_dir[idx];
            let far = (self.p_max[idx] - origin[idx]) * inv_dir[idx];
            let (near, far) = if near > far { (far, near) } else { (near, far) };

            // 0 * inf when the origin lies on a slab plane.
            if !near.is_nan() {
                t_min = t_min.max(near);
            }
            if !far.is_nan() {
                t_max = t_max.min(far);
            }
            if t_max < t_min {
                return None;
            }
        }

        Some((t_min, t_max))
    }

    /// Axis of the longest edge, used as the BVH split axis.
    pub fn max_extent(&self) -> Int {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Center and radius of a sphere enclosing the box.
    pub fn bounding_sphere(&self) -> (Vector3f, Float) {
        if !self.is_valid() {
            return (Vector3f::zeros(), 1.0);
        }
        let center = self.center();
        let radius = (self.p_max - center).norm().max(1e-3);
        (center, radius)
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] <= self.p_max[idx])
    }
}

impl ops::BitOr for AABB {
    type Output = AABB;

    fn bitor(self, rhs: AABB) -> AABB {
        self.union(&rhs)
    }
}

impl ops::BitOrAssign for AABB {
    fn bitor_assign(&mut self, rhs: AABB) {
        self.expand_by_aabb(&rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ray::Ray3f;

    fn hits(bbox: &AABB, ray: &Ray3f) -> bool {
        bbox.intersect_inv(&ray.origin(), &ray.inv_dir(), ray.min_t, ray.max_t)
    }

    #[test]
    fn test_aabb_corners_and_growth() {
        let mut bbox = AABB::new(Vector3f::new(1.0, 7.0, 3.0), Vector3f::new(4.0, 4.0, 4.0));
        assert_eq!(bbox.p_min, Vector3f::new(1.0, 4.0, 3.0));
        assert_eq!(bbox.center(), Vector3f::new(2.5, 5.5, 3.5));
        assert_eq!(bbox.max_extent(), 0);

        bbox.expand_by_point(&Vector3f::new(-1.0, 5.0, 9.0));
        assert_eq!(bbox.p_min.x, -1.0);
        assert_eq!(bbox.p_max.z, 9.0);
        assert_eq!(bbox.max_extent(), 2);
        assert!(bbox.contains(&Vector3f::new(0.0, 5.0, 5.0)));
        assert!(!bbox.contains(&Vector3f::new(0.0, 8.0, 5.0)));
    }

    #[test]
    fn test_aabb_union_identity_and_laws() {
        let a = AABB::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 2.0, 3.0));
        let b = AABB::new(Vector3f::new(-1.0, 0.5, 2.0), Vector3f::new(0.5, 4.0, 2.5));
        let c = AABB::new(Vector3f::new(3.0, -2.0, 0.0), Vector3f::new(3.5, -1.0, 1.0));

        assert!(!AABB::default().is_valid());
        assert_eq!(AABB::default() | a, a);
        assert_eq!(a | AABB::default(), a);
        assert_eq!(a | b, b | a);
        assert_eq!((a | b) | c, a | (b | c));
    }

    #[test]
    fn test_slab_test() {
        let bbox = AABB::new(Vector3f::repeat(-1.0), Vector3f::repeat(1.0));
        let diag = Vector3f::new(1.0, 1.0, 1.0);

        assert!(hits(&bbox, &Ray3f::new(Vector3f::zeros(), diag, Some(0.0), Some(1.0))));
        assert!(!hits(&bbox, &Ray3f::new(Vector3f::new(-1.1, 0.0, 0.0), Vector3f::new(-0.1, 10.0, 10.0), None, None)));

        // Axis-parallel rays, where one slab gives 0 * inf.
        let z = Vector3f::new(0.0, 0.0, 1.0);
        assert!(!hits(&bbox, &Ray3f::new(Vector3f::new(2.0, 0.0, -5.0), z, None, None)));
        assert!(hits(&bbox, &Ray3f::new(Vector3f::new(0.5, 0.0, -5.0), z, None, None)));
        assert!(hits(&bbox, &Ray3f::new(Vector3f::new(1.0, 0.0, -5.0), z, None, None)));

        // The interval ends before the box.
        assert!(!hits(&bbox, &Ray3f::new(Vector3f::new(0.0, 0.0, -5.0), z, Some(0.0), Some(3.0))));

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -5.0), z, None, None);
        let (t0, t1) = bbox.intersect_range_inv(&ray.origin(), &ray.inv_dir(), ray.min_t, ray.max_t).expect("hit");
        assert!((t0 - 4.0).abs() < 1e-5 && (t1 - 6.0).abs() < 1e-5);
    }
}
