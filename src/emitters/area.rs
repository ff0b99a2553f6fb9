// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::emitter::{ area_to_solid_angle, Emitter, EmitterFlag, LightEmitRecord, LightSampleRecord };
use crate::core::sampler::Sample5;
use crate::core::shape::Shape;
use crate::math::constants::{ Float, Vector2f, Vector3f, PI };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// One-sided diffuse emitter over a shape. Emits on the side the
/// geometric normal points to.
pub struct AreaEmitter {
    shape: Arc<dyn Shape>,
    radiance: RGBSpectrum,
}

impl AreaEmitter {
    pub fn from_shape(shape: Arc<dyn Shape>, radiance: RGBSpectrum) -> Self {
        Self { shape, radiance }
    }
}

impl Emitter for AreaEmitter {
    fn flag(&self) -> EmitterFlag {
        EmitterFlag::SURFACE
    }

    fn sample_li(&self, ref_p: &Vector3f, sam: &Sample5) -> Option<LightSampleRecord> {
        let rec = self.shape.sample_ref(ref_p, &Vector2f::new(sam[0], sam[1]));
        if rec.n.dot(&(ref_p - rec.p)) <= 0.0 {
            return None;
        }
        let pdf = area_to_solid_angle(rec.pdf, ref_p, &rec.p, &rec.n);
        if pdf <= 0.0 {
            return None;
        }
        Some(LightSampleRecord {
            ref_p: *ref_p,
            pos: rec.p,
            nor: rec.n,
            radiance: self.radiance,
            pdf,
            is_delta: false,
        })
    }

    fn sample_le(&self, sam: &Sample5) -> Option<LightEmitRecord> {
        let rec = self.shape.sample(&Vector2f::new(sam[0], sam[1]));
        let local = sample_cosine_hemisphere(&Vector2f::new(sam[2], sam[3]));
        if rec.pdf <= 0.0 || local.z <= 0.0 {
            return None;
        }
        let dir = Frame::from_z(rec.n).from_local(&local).normalize();
        Some(LightEmitRecord {
            pos: rec.p,
            dir,
            nor: rec.n,
            radiance: self.radiance,
            pdf_pos: rec.pdf,
            pdf_dir: sample_cosine_hemisphere_pdf(local.z),
        })
    }

    fn pdf_le(&self, _pos: &Vector3f, dir: &Vector3f, nor: &Vector3f) -> (Float, Float) {
        let area = self.shape.surface_area();
        let pdf_pos = if area > 0.0 { 1.0 / area } else { 0.0 };
        let cos = nor.dot(dir);
        let pdf_dir = if cos > 0.0 { sample_cosine_hemisphere_pdf(cos) } else { 0.0 };
        (pdf_pos, pdf_dir)
    }

    fn power(&self) -> RGBSpectrum {
        self.radiance * (PI * self.shape.surface_area())
    }

    fn radiance(&self, _pos: &Vector3f, nor: &Vector3f, light_to_out: &Vector3f) -> RGBSpectrum {
        if nor.dot(light_to_out) > 0.0 {
            self.radiance
        } else {
            RGBSpectrum::default()
        }
    }

    fn pdf_li(&self, ref_p: &Vector3f, pos: &Vector3f, nor: &Vector3f) -> Float {
        if nor.dot(&(ref_p - pos)) <= 0.0 {
            return 0.0;
        }
        area_to_solid_angle(self.shape.pdf_ref(ref_p, pos), ref_p, pos, nor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::shapes::quad::Quad;
    use crate::shapes::sphere::Sphere;

    #[test]
    fn test_sample_matches_pdf() {
        let quad = Arc::new(Quad::new(Vector3f::new(-1.0, -1.0, 2.0),
                                      Vector3f::new(0.0, 2.0, 0.0),
                                      Vector3f::new(2.0, 0.0, 0.0)));
        let light = AreaEmitter::from_shape(quad, RGBSpectrum::splat(3.0));
        let ref_p = Vector3f::new(0.2, 0.1, 0.0);
        let mut rng = LcgRng::new(1);
        let mut hits = 0;
        for _ in 0..64 {
            let sam = [rng.next_f32(), rng.next_f32(), rng.next_f32(), rng.next_f32(), rng.next_f32()];
            if let Some(rec) = light.sample_li(&ref_p, &sam) {
                hits += 1;
                let pdf = light.pdf_li(&ref_p, &rec.pos, &rec.nor);
                assert!((pdf - rec.pdf).abs() < 1e-3 * pdf);
                assert_eq!(light.radiance(&rec.pos, &rec.nor, &-rec.ref_to_light()), RGBSpectrum::splat(3.0));
            }
        }
        // e1 x e2 points down, towards the reference point.
        assert_eq!(hits, 64);
        assert!(light.sample_li(&Vector3f::new(0.0, 0.0, 3.0), &[0.5; 5]).is_none());
        assert!((light.power().r() - 3.0 * PI * 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_light_pdf_integrates_to_one() {
        let sphere = Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0));
        let light = AreaEmitter::from_shape(sphere, RGBSpectrum::one());
        let ref_p = Vector3f::zeros();
        let mut rng = LcgRng::new(4);
        let n = 4000;
        let mut inv_sum = 0.0;
        for _ in 0..n {
            let sam = [rng.next_f32(), rng.next_f32(), 0.0, 0.0, 0.0];
            let rec = light.sample_li(&ref_p, &sam).expect("visible cap");
            inv_sum += 1.0 / rec.pdf;
        }
        // E[1 / pdf] is the solid angle of the cap.
        let cos_max = (1.0 - 1.0 / 25.0 as Float).sqrt();
        let cap = 2.0 * PI * (1.0 - cos_max);
        assert!((inv_sum / n as Float - cap).abs() < 0.02 * cap);
    }
}
