// Copyright @yucwang 2023

use super::constants::{ INV_PI, INV_4PI, PI, Float, Vector2f, Vector3f };

pub fn sample_uniform_hemisphere(u: &Vector2f) -> Vector3f {
    let z: Float = u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = 2. * PI * u.y;

    return Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_hemisphere_pdf() -> Float {
    return INV_PI / 2.
}

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z: Float = 1. - 2. * u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = 2. * PI * u.y;

    return Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_sphere_pdf() -> Float {
    return INV_4PI
}

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    return Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn sample_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = sample_uniform_disk_concentric(&u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    return Vector3f::new(p.x, p.y, z)
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    return cos_theta.max(0.0) * INV_PI;
}

/// Uniform direction inside the cone around `+z` with half-angle `acos(cos_max)`.
pub fn sample_uniform_cone(u: &Vector2f, cos_max: Float) -> Vector3f {
    let cos_theta = (1.0 - u.x) + u.x * cos_max;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;

    Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

pub fn sample_uniform_cone_pdf(cos_max: Float) -> Float {
    1.0 / (2.0 * PI * (1.0 - cos_max))
}

/// Barycentric coordinates `(b0, b1, b2)` uniformly distributed over a triangle.
pub fn square_to_triangle(u: &Vector2f) -> Vector3f {
    let su = u.x.sqrt();
    let b1 = 1.0 - su;
    let b2 = u.y * su;

    Vector3f::new(1.0 - b1 - b2, b1, b2)
}

/// Picks an integer in `[0, n)` from `u` and returns it with `u` rescaled to `[0, 1)`.
pub fn extract_uniform_int(u: Float, n: usize) -> (usize, Float) {
    if n == 0 {
        return (0, u);
    }
    let scaled = u * n as Float;
    let idx = (scaled as usize).min(n - 1);
    let remapped = (scaled - idx as Float).max(0.0).min(1.0 - Float::EPSILON);

    (idx, remapped)
}
