// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f };

/// Orthonormal basis. Local coordinates put `z` along the normal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub x: Vector3f,
    pub y: Vector3f,
    pub z: Vector3f
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            x: Vector3f::new(1.0, 0.0, 0.0),
            y: Vector3f::new(0.0, 1.0, 0.0),
            z: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    pub fn new(new_x: Vector3f, new_y: Vector3f, new_z: Vector3f) -> Frame {
        Frame {
            x: new_x,
            y: new_y,
            z: new_z
        }
    }

    /// Builds a frame around `n` (Duff et al. 2017).
    pub fn from_z(n: Vector3f) -> Frame {
        let n = n.normalize();
        let sign = (1.0 as Float).copysign(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;
        let x = Vector3f::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let y = Vector3f::new(b, sign + n.y * n.y * a, -n.y);

        Frame { x, y, z: n }
    }

    /// Frame around `n` whose `x` axis follows `dpdu` projected onto the tangent plane.
    pub fn from_xz(dpdu: Vector3f, n: Vector3f) -> Frame {
        let n = n.normalize();
        let x = dpdu - n * n.dot(&dpdu);
        if x.norm_squared() < 1e-12 {
            return Frame::from_z(n);
        }
        let x = x.normalize();
        Frame {
            x,
            y: n.cross(&x),
            z: n
        }
    }

    pub fn flipped(&self) -> Frame {
        Frame { x: -self.x, y: self.y, z: -self.z }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }

    pub fn in_positive_hemisphere(&self, v: &Vector3f) -> bool {
        v.dot(&self.z) > 0.0
    }
}

pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

pub fn abs_cos_theta(w: &Vector3f) -> Float {
    w.z.abs()
}

pub fn same_hemisphere(a: &Vector3f, b: &Vector3f) -> bool {
    a.z * b.z > 0.0
}
