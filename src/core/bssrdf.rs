// Copyright @yucwang 2026

use crate::core::arena::ScratchArena;
use crate::core::bsdf::ShadingPoint;
use crate::core::interaction::SurfaceIntersection;
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Exit vertex chosen by `BSSRDF::sample_pi`.
pub struct BSSRDFSample<'a> {
    pub exit: SurfaceIntersection,
    pub shading: ShadingPoint<'a>,
    /// Spatial part of the BSSRDF between entry and exit.
    pub coef: RGBSpectrum,
    /// Area density of the exit point.
    pub pdf: Float,
}

/// Subsurface transport bound to an entry point.
pub trait BSSRDF: Send + Sync {
    fn sample_pi<'a>(&self,
                     u: &Vector3f,
                     scene: &Scene,
                     arena: &'a ScratchArena) -> Option<BSSRDFSample<'a>>;
}
