// Copyright @yucwang 2026

use crate::core::error::ConstructionError;
use crate::core::volume::Volume;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

/// Voxel grid stretched over a box and filtered trilinearly.
///
/// Samples sit on the lattice `p_min + diag * i / (res - 1)`, so the outermost
/// samples lie on the box faces. Lookups are clamped to the box.
pub struct GridVolume {
    values: Vec<Vector3f>,
    res: [usize; 3],
    bbox: AABB,
    max_value: Float,
}

impl GridVolume {
    /// `data` holds `channels` (1 or 3) values per voxel, x varying fastest, then y, then z.
    pub fn new(res: (usize, usize, usize),
               channels: usize,
               data: Vec<Float>,
               bbox: AABB) -> Result<Self, ConstructionError> {
        let res = [res.0, res.1, res.2];
        if res.iter().any(|&n| n == 0) {
            return Err(ConstructionError::parameter("resolution", "grid dimensions must be positive"));
        }
        if channels != 1 && channels != 3 {
            return Err(ConstructionError::parameter("channels", format!("unsupported channel count {}", channels)));
        }
        let voxels = res[0] * res[1] * res[2];
        if data.len() != voxels * channels {
            return Err(ConstructionError::parameter(
                "data", format!("expected {} values, got {}", voxels * channels, data.len())));
        }
        if !bbox.is_valid() {
            return Err(ConstructionError::parameter("bbox", "grid bounds are empty"));
        }
        if data.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConstructionError::parameter("data", "grid values must be finite and non-negative"));
        }

        let values: Vec<Vector3f> = data.chunks_exact(channels)
            .map(|c| if channels == 1 { Vector3f::repeat(c[0]) } else { Vector3f::new(c[0], c[1], c[2]) })
            .collect();
        let max_value = values.iter().fold(0.0, |m: Float, v| m.max(v.max()));
        Ok(Self { values, res, bbox, max_value })
    }

    fn at(&self, x: usize, y: usize, z: usize) -> Vector3f {
        self.values[(z * self.res[1] + y) * self.res[0] + x]
    }

    /// Lattice coordinate of `p` along `axis`, split into a base index and a fraction.
    fn cell(&self, p: &Vector3f, axis: usize) -> (usize, usize, Float) {
        let n = self.res[axis];
        if n == 1 {
            return (0, 0, 0.0);
        }
        let extent = (self.bbox.p_max[axis] - self.bbox.p_min[axis]).max(1e-8);
        let u = ((p[axis] - self.bbox.p_min[axis]) / extent).clamp(0.0, 1.0) * (n - 1) as Float;
        let i0 = (u.floor() as usize).min(n - 2);
        (i0, i0 + 1, u - i0 as Float)
    }
}

impl Volume for GridVolume {
    fn bbox(&self) -> Option<AABB> {
        Some(self.bbox)
    }

    fn eval(&self, p: &Vector3f) -> Vector3f {
        let (x0, x1, tx) = self.cell(p, 0);
        let (y0, y1, ty) = self.cell(p, 1);
        let (z0, z1, tz) = self.cell(p, 2);

        let lerp = |a: Vector3f, b: Vector3f, t: Float| a * (1.0 - t) + b * t;
        let near = lerp(lerp(self.at(x0, y0, z0), self.at(x1, y0, z0), tx),
                        lerp(self.at(x0, y1, z0), self.at(x1, y1, z0), tx), ty);
        let far = lerp(lerp(self.at(x0, y0, z1), self.at(x1, y0, z1), tx),
                       lerp(self.at(x0, y1, z1), self.at(x1, y1, z1), tx), ty);
        lerp(near, far, tz)
    }

    fn max_value(&self) -> Float {
        self.max_value
    }
}
