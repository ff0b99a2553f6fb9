// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, EPSILON};

/// Ray with a mutable parametric interval `[min_t, max_t]`.
#[derive(Debug, Copy, Clone)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::INFINITY)}
    }

    /// Segment from `a` towards `b`, shortened by `EPSILON` at both ends.
    pub fn between(a: Vector3f, b: Vector3f) -> Self {
        let d = b - a;
        let len = d.norm();
        Self::new(a, d, Some(EPSILON), Some((len - EPSILON).max(EPSILON)))
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn inv_dir(&self) -> Vector3f {
        Vector3f::new(1.0 / self.dir.x, 1.0 / self.dir.y, 1.0 / self.dir.z)
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn update(&mut self, t: Float) -> bool {
        if t < self.min_t || t > self.max_t {
            false
        } else {
            self.max_t = t;
            true
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }

    pub fn is_degenerate(&self) -> bool {
        self.min_t >= self.max_t
    }
}

/* Tests for Ray */
