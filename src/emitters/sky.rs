// Copyright @yucwang 2026

use crate::core::emitter::{ Emitter, EmitterFlag, LightEmitRecord, LightSampleRecord };
use crate::core::sampler::Sample5;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f, PI };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_uniform_disk_concentric, sample_uniform_sphere, sample_uniform_sphere_pdf };

/// Environment blending from `bottom` (looking down) to `top` (looking up) along `y`.
pub struct SkyEmitter {
    top: RGBSpectrum,
    bottom: RGBSpectrum,
    bsphere_center: Vector3f,
    bsphere_radius: Float,
}

impl SkyEmitter {
    pub fn new(top: RGBSpectrum, bottom: RGBSpectrum) -> Self {
        Self { top, bottom, bsphere_center: Vector3f::zeros(), bsphere_radius: 1.0 }
    }

    pub fn uniform(radiance: RGBSpectrum) -> Self {
        Self::new(radiance, radiance)
    }

    fn le(&self, dir: &Vector3f) -> RGBSpectrum {
        let t = (0.5 * (dir.normalize().y + 1.0)).clamp(0.0, 1.0);
        self.bottom * (1.0 - t) + self.top * t
    }
}

impl Emitter for SkyEmitter {
    fn flag(&self) -> EmitterFlag {
        EmitterFlag::DIRECTION
    }

    fn preprocess(&mut self, scene_bounds: &AABB) {
        let (center, radius) = scene_bounds.bounding_sphere();
        self.bsphere_center = center;
        self.bsphere_radius = radius;
    }

    fn sample_li(&self, ref_p: &Vector3f, sam: &Sample5) -> Option<LightSampleRecord> {
        let dir = sample_uniform_sphere(&Vector2f::new(sam[0], sam[1]));
        Some(LightSampleRecord {
            ref_p: *ref_p,
            pos: ref_p + dir * (2.0 * self.bsphere_radius),
            nor: -dir,
            radiance: self.le(&dir),
            pdf: sample_uniform_sphere_pdf(),
            is_delta: false,
        })
    }

    fn sample_le(&self, sam: &Sample5) -> Option<LightEmitRecord> {
        let to_light = sample_uniform_sphere(&Vector2f::new(sam[0], sam[1]));
        let dir = -to_light;
        let frame = Frame::from_z(dir);
        let disk = sample_uniform_disk_concentric(&Vector2f::new(sam[2], sam[3]));
        let offset = frame.x * disk.x + frame.y * disk.y;
        let pos = self.bsphere_center + (offset - dir) * self.bsphere_radius;
        Some(LightEmitRecord {
            pos,
            dir,
            nor: dir,
            radiance: self.le(&to_light),
            pdf_pos: 1.0 / (PI * self.bsphere_radius * self.bsphere_radius),
            pdf_dir: sample_uniform_sphere_pdf(),
        })
    }

    fn pdf_le(&self, _pos: &Vector3f, _dir: &Vector3f, _nor: &Vector3f) -> (Float, Float) {
        (1.0 / (PI * self.bsphere_radius * self.bsphere_radius), sample_uniform_sphere_pdf())
    }

    fn power(&self) -> RGBSpectrum {
        (self.top + self.bottom) * (0.5 * PI * self.bsphere_radius * self.bsphere_radius)
    }

    fn non_area_le(&self, dir: &Vector3f) -> RGBSpectrum {
        self.le(dir)
    }

    fn pdf_li_dir(&self, _ref_p: &Vector3f, _ref_to_light: &Vector3f) -> Float {
        sample_uniform_sphere_pdf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sky_gradient() {
        let sky = SkyEmitter::new(RGBSpectrum::new(0.2, 0.4, 1.0), RGBSpectrum::splat(0.0));
        let up = sky.non_area_le(&Vector3f::new(0.0, 1.0, 0.0));
        let down = sky.non_area_le(&Vector3f::new(0.0, -1.0, 0.0));
        let side = sky.non_area_le(&Vector3f::new(1.0, 0.0, 0.0));
        assert!((up.b() - 1.0).abs() < 1e-6);
        assert!(down.is_black());
        assert!((side.g() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_sky_sample_consistent() {
        let sky = SkyEmitter::uniform(RGBSpectrum::one());
        let ref_p = Vector3f::new(0.1, 0.2, 0.3);
        let rec = sky.sample_li(&ref_p, &[0.2, 0.7, 0.0, 0.0, 0.0]).expect("sample");
        assert!(!rec.is_delta);
        assert!((rec.pdf - sky.pdf_li_dir(&ref_p, &rec.ref_to_light())).abs() < 1e-6);
        assert_eq!(rec.radiance, sky.non_area_le(&rec.ref_to_light()));
    }
}
