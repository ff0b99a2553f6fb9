// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f };
use crate::math::ray::Ray3f;

/// Primary ray with its importance weight.
#[derive(Debug, Copy, Clone)]
pub struct CameraRay {
    pub ray: Ray3f,
    pub weight: Float,
}

pub trait Sensor: Send + Sync {
    /// `film_coord` is in `[0, 1]^2` with `y` growing downward.
    fn generate_ray(&self, film_coord: &Vector2f, lens_sample: &Vector2f) -> Option<CameraRay>;

    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
