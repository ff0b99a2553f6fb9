// Copyright @yucwang 2026

use crate::core::error::ConstructionError;
use crate::core::sensor::{ CameraRay, Sensor };
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_disk_concentric;

/// Pinhole or thin lens camera looking from `origin` at `target`.
pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    lens_radius: Float,
    focal_distance: Float,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               aspect: Float) -> Result<Self, ConstructionError> {
        if !(fov_y_radians > 0.0 && fov_y_radians < std::f32::consts::PI) {
            return Err(ConstructionError::parameter("fov", "must lie in (0, pi)"));
        }
        if !(aspect > 0.0) {
            return Err(ConstructionError::parameter("aspect", "must be positive"));
        }
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        if !right.iter().all(|c| c.is_finite()) {
            return Err(ConstructionError::parameter("up", "must not be parallel to the view direction"));
        }
        let up = right.cross(&forward).normalize();

        Ok(Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            aspect,
            lens_radius: 0.0,
            focal_distance: 1.0,
        })
    }

    pub fn with_lens(mut self, lens_radius: Float, focal_distance: Float) -> Result<Self, ConstructionError> {
        if !(lens_radius >= 0.0) || !(focal_distance > 0.0) {
            return Err(ConstructionError::parameter("lens", "radius must be non-negative and focal distance positive"));
        }
        self.lens_radius = lens_radius;
        self.focal_distance = focal_distance;
        Ok(self)
    }
}

impl Sensor for PerspectiveCamera {
    fn generate_ray(&self, film_coord: &Vector2f, lens_sample: &Vector2f) -> Option<CameraRay> {
        let px = (2.0 * film_coord.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * film_coord.y) * self.tan_half_fov_y;
        let d_camera = Vector3f::new(px, py, 1.0);

        let (o_camera, d_camera) = if self.lens_radius > 0.0 {
            let lens = sample_uniform_disk_concentric(lens_sample) * self.lens_radius;
            let focus = d_camera * self.focal_distance;
            let o = Vector3f::new(lens.x, lens.y, 0.0);
            (o, focus - o)
        } else {
            (Vector3f::zeros(), d_camera)
        };

        let to_world = |v: Vector3f| self.right * v.x + self.up * v.y + self.forward * v.z;
        let origin = self.origin + to_world(o_camera);
        let dir = to_world(d_camera).normalize();
        Some(CameraRay { ray: Ray3f::new(origin, dir, Some(0.0), None), weight: 1.0 })
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera(origin: {:?}, forward: {:?}, lens_radius: {})",
                self.origin, self.forward, self.lens_radius)
    }
}
