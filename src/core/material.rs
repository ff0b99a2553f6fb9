// Copyright @yucwang 2026

use crate::core::arena::ScratchArena;
use crate::core::bsdf::ShadingPoint;
use crate::core::interaction::SurfaceIntersection;

/// Surface appearance. `shade` may be called any number of times concurrently.
pub trait Material: Send + Sync {
    fn shade<'a>(&self, it: &SurfaceIntersection, arena: &'a ScratchArena) -> ShadingPoint<'a>;

    /// True for pure medium boundaries that shadow rays pass through.
    fn is_null_interface(&self) -> bool {
        false
    }
}
