// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

/// Density or albedo field driving a heterogeneous medium.
pub trait Volume: Send + Sync {
    /// Support of the field; `None` when it extends everywhere.
    fn bbox(&self) -> Option<AABB> {
        None
    }
    fn eval(&self, p: &Vector3f) -> Vector3f;
    /// Majorant over every channel, used by delta tracking.
    fn max_value(&self) -> Float;
}
