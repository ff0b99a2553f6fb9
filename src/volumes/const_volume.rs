// Copyright @yucwang 2026

use crate::core::volume::Volume;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

/// The same value everywhere, or everywhere inside `support`.
pub struct ConstantVolume {
    value: Vector3f,
    support: Option<AABB>,
}

impl ConstantVolume {
    pub fn new(value: Vector3f) -> Self {
        Self { value, support: None }
    }

    pub fn uniform(value: Float) -> Self {
        Self::new(Vector3f::repeat(value))
    }

    /// Restricts the field to `bbox`; lookups outside it return zero.
    pub fn within(mut self, bbox: AABB) -> Self {
        self.support = Some(bbox);
        self
    }
}

impl Volume for ConstantVolume {
    fn bbox(&self) -> Option<AABB> {
        self.support
    }

    fn eval(&self, p: &Vector3f) -> Vector3f {
        match &self.support {
            Some(bbox) if !bbox.contains(p) => Vector3f::zeros(),
            _ => self.value,
        }
    }

    fn max_value(&self) -> Float {
        self.value.max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_cuts_the_field() {
        let bbox = AABB::new(Vector3f::new(-1.0, 0.0, 1.0), Vector3f::new(2.0, 3.0, 4.0));
        let field = ConstantVolume::new(Vector3f::new(1.0, 2.0, 3.0)).within(bbox);
        assert_eq!(field.eval(&Vector3f::new(-0.5, 1.0, 2.0)), Vector3f::new(1.0, 2.0, 3.0));
        assert_eq!(field.eval(&Vector3f::new(5.0, 1.0, 2.0)), Vector3f::zeros());
        assert_eq!(field.max_value(), 3.0);

        let fog = ConstantVolume::uniform(0.25);
        assert!(fog.bbox().is_none());
        assert_eq!(fog.eval(&Vector3f::new(1e4, -1e4, 0.0)), Vector3f::repeat(0.25));
    }
}
