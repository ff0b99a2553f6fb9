// Copyright @yucwang 2023

use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;

/// Ray/surface hit. `wo` points back towards the ray origin.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceIntersection {
    p: Vector3f,
    geo_frame: Frame,
    sh_frame: Frame,
    uv: Vector2f,
    t: Float,
    wo: Vector3f,
    entity: Option<usize>,
}

/// Point sampled on a shape, with its density in area measure.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceSampleRecord {
    pub p: Vector3f,
    pub n: Vector3f,
    pub uv: Vector2f,
    pub pdf: Float,
}

/// Scattering event inside a participating medium.
#[derive(Debug, Copy, Clone)]
pub struct MediumIntersection {
    pub p: Vector3f,
    pub wo: Vector3f,
    pub t: Float,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f,
               new_geo_normal: Vector3f,
               new_sh_normal: Vector3f,
               new_uv: Vector2f,
               new_t: Float,
               new_wo: Vector3f) -> Self {
        Self { p: new_p,
               geo_frame: Frame::from_z(new_geo_normal),
               sh_frame: Frame::from_z(new_sh_normal),
               uv: new_uv, t: new_t, wo: new_wo, entity: None }
    }

    pub fn from_frames(new_p: Vector3f,
                       new_geo_frame: Frame,
                       new_sh_frame: Frame,
                       new_uv: Vector2f,
                       new_t: Float,
                       new_wo: Vector3f) -> Self {
        Self { p: new_p, geo_frame: new_geo_frame, sh_frame: new_sh_frame,
               uv: new_uv, t: new_t, wo: new_wo, entity: None }
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    pub fn wo(&self) -> Vector3f {
        self.wo
    }

    pub fn geo_normal(&self) -> Vector3f {
        self.geo_frame.z
    }

    pub fn sh_normal(&self) -> Vector3f {
        self.sh_frame.z
    }

    pub fn geo_frame(&self) -> &Frame {
        &self.geo_frame
    }

    pub fn sh_frame(&self) -> &Frame {
        &self.sh_frame
    }

    pub fn entity(&self) -> Option<usize> {
        self.entity
    }

    pub fn with_entity(mut self, entity: usize) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_wo(mut self, wo: Vector3f) -> Self {
        self.wo = wo;
        self
    }

    /// True when `w` leaves the surface on the side the geometric normal points to.
    pub fn is_outside(&self, w: &Vector3f) -> bool {
        w.dot(&self.geo_frame.z) > 0.0
    }

    fn offset_origin(&self, dir: &Vector3f) -> Vector3f {
        let n = self.geo_frame.z;
        if dir.dot(&n) >= 0.0 {
            self.p + n * EPSILON
        } else {
            self.p - n * EPSILON
        }
    }

    /// Ray leaving the surface along `dir`, offset to avoid self intersection.
    pub fn spawn_ray(&self, dir: &Vector3f) -> Ray3f {
        Ray3f::new(self.offset_origin(dir), *dir, Some(0.0), None)
    }

    /// Segment from the surface to `target`, shortened at both ends.
    pub fn spawn_ray_to(&self, target: &Vector3f) -> Ray3f {
        let dir = target - self.p;
        Ray3f::between(self.offset_origin(&dir), *target)
    }
}
