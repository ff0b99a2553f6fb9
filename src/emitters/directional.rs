// Copyright @yucwang 2026

use crate::core::emitter::{ Emitter, EmitterFlag, LightEmitRecord, LightSampleRecord };
use crate::core::error::ConstructionError;
use crate::core::sampler::Sample5;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f, PI };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::sample_uniform_disk_concentric;

/// Parallel light travelling along `direction` with irradiance `irradiance`.
pub struct DirectionalEmitter {
    direction: Vector3f,
    irradiance: RGBSpectrum,
    bsphere_center: Vector3f,
    bsphere_radius: Float,
}

impl DirectionalEmitter {
    pub fn new(direction: Vector3f, irradiance: RGBSpectrum) -> Result<Self, ConstructionError> {
        let len = direction.norm();
        if !(len > 0.0 && len.is_finite()) {
            return Err(ConstructionError::parameter("direction", "must be a non-zero vector"));
        }
        Ok(Self {
            direction: direction / len,
            irradiance,
            bsphere_center: Vector3f::zeros(),
            bsphere_radius: 1.0,
        })
    }
}

impl Emitter for DirectionalEmitter {
    fn flag(&self) -> EmitterFlag {
        EmitterFlag::DIRECTION | EmitterFlag::DELTA
    }

    fn preprocess(&mut self, scene_bounds: &AABB) {
        let (center, radius) = scene_bounds.bounding_sphere();
        self.bsphere_center = center;
        self.bsphere_radius = radius;
    }

    fn sample_li(&self, ref_p: &Vector3f, _sam: &Sample5) -> Option<LightSampleRecord> {
        // Outside the bounding sphere, so shadow rays cover the whole scene.
        let pos = ref_p - self.direction * (2.0 * self.bsphere_radius);
        Some(LightSampleRecord {
            ref_p: *ref_p,
            pos,
            nor: self.direction,
            radiance: self.irradiance,
            pdf: 1.0,
            is_delta: true,
        })
    }

    fn sample_le(&self, sam: &Sample5) -> Option<LightEmitRecord> {
        let frame = Frame::from_z(self.direction);
        let disk = sample_uniform_disk_concentric(&Vector2f::new(sam[0], sam[1]));
        let offset = frame.x * disk.x + frame.y * disk.y;
        let pos = self.bsphere_center + (offset - self.direction) * self.bsphere_radius;
        Some(LightEmitRecord {
            pos,
            dir: self.direction,
            nor: self.direction,
            radiance: self.irradiance,
            pdf_pos: 1.0 / (PI * self.bsphere_radius * self.bsphere_radius),
            pdf_dir: 1.0,
        })
    }

    fn pdf_le(&self, _pos: &Vector3f, _dir: &Vector3f, _nor: &Vector3f) -> (Float, Float) {
        (1.0 / (PI * self.bsphere_radius * self.bsphere_radius), 0.0)
    }

    fn power(&self) -> RGBSpectrum {
        self.irradiance * (PI * self.bsphere_radius * self.bsphere_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_sample_is_delta_and_outside_scene() {
        let mut light = DirectionalEmitter::new(Vector3f::new(0.0, -2.0, 0.0), RGBSpectrum::splat(2.0))
            .expect("light");
        let bounds = AABB::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0));
        light.preprocess(&bounds);

        let rec = light.sample_li(&Vector3f::zeros(), &[0.3; 5]).expect("sample");
        assert!(rec.is_delta);
        assert_eq!(rec.pdf, 1.0);
        assert!((rec.ref_to_light() - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-5);
        assert!(!bounds.contains(&rec.pos));
        assert!(light.non_area_le(&Vector3f::new(0.0, 1.0, 0.0)).is_black());
        let r2 = 3.0;
        assert!((light.power().r() - 2.0 * PI * r2).abs() < 1e-3);

        assert!(DirectionalEmitter::new(Vector3f::zeros(), RGBSpectrum::one()).is_err());
    }
}
