// Copyright @yucwang 2023

use crate::core::bssrdf::BSSRDF;
use crate::core::interaction::SurfaceIntersection;
use crate::math::constants::{ Float, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval
// processes
pub type BSDFValue = RGBSpectrum;

/// Which quantity a path carries. Refraction scales radiance but not importance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

/// Result of importance sampling a BSDF.
///
/// The path throughput update is always `f * |cos(wi)| / pdf`. For delta
/// lobes `pdf` is the discrete probability of the chosen lobe and `f` is
/// scaled so that this update still holds.
#[derive(Debug, Copy, Clone)]
pub struct BSDFSampleRecord {
    pub wi: Vector3f,
    pub f: BSDFValue,
    pub pdf: Float,
    pub is_delta: bool,
}

/// Scattering function in the local shading frame, `z` along the shading normal.
///
/// `wo` points towards the viewer, `wi` towards the light. Both are unit vectors.
pub trait BSDF: Send + Sync {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, mode: TransportMode) -> BSDFValue;
    fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord>;
    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float;
    /// Rough reflectance, used for the albedo g-buffer.
    fn albedo(&self) -> RGBSpectrum;

    fn is_delta(&self) -> bool {
        false
    }
}

/// BSDF (and optional BSSRDF) bound to a surface point.
///
/// Instances are built by `Material::shade` inside a scratch arena and only
/// live for one path vertex.
#[derive(Copy, Clone)]
pub struct ShadingPoint<'a> {
    bsdf: &'a dyn BSDF,
    bssrdf: Option<&'a dyn BSSRDF>,
    sh_frame: Frame,
    geo_normal: Vector3f,
}

impl<'a> ShadingPoint<'a> {
    pub fn new(bsdf: &'a dyn BSDF, it: &SurfaceIntersection) -> Self {
        Self { bsdf, bssrdf: None, sh_frame: *it.sh_frame(), geo_normal: it.geo_normal() }
    }

    pub fn with_frame(bsdf: &'a dyn BSDF, sh_frame: Frame, geo_normal: Vector3f) -> Self {
        Self { bsdf, bssrdf: None, sh_frame, geo_normal }
    }

    pub fn with_bssrdf(mut self, bssrdf: &'a dyn BSSRDF) -> Self {
        self.bssrdf = Some(bssrdf);
        self
    }

    pub fn with_bsdf(mut self, bsdf: &'a dyn BSDF) -> Self {
        self.bsdf = bsdf;
        self
    }

    pub fn bsdf(&self) -> &'a dyn BSDF {
        self.bsdf
    }

    pub fn bssrdf(&self) -> Option<&'a dyn BSSRDF> {
        self.bssrdf
    }

    pub fn shading_normal(&self) -> Vector3f {
        self.sh_frame.z
    }

    /// Rejects pairs whose reflect/transmit classification differs between
    /// the geometric and the shading normal. Such pairs leak light through
    /// surfaces with interpolated normals.
    fn is_consistent(&self, wi: &Vector3f, wo: &Vector3f) -> bool {
        let geo_reflect = wi.dot(&self.geo_normal) * wo.dot(&self.geo_normal) > 0.0;
        let sh_reflect = wi.dot(&self.sh_frame.z) * wo.dot(&self.sh_frame.z) > 0.0;
        geo_reflect == sh_reflect
    }

    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f, mode: TransportMode) -> BSDFValue {
        if !self.is_consistent(wi, wo) {
            return BSDFValue::default();
        }
        let lwi = self.sh_frame.to_local(wi);
        let lwo = self.sh_frame.to_local(wo);
        self.bsdf.eval(&lwi, &lwo, mode)
    }

    /// Samples an incident direction. `wi` of the result is in world space.
    pub fn sample(&self, wo: &Vector3f, mode: TransportMode, u: &Vector3f) -> Option<BSDFSampleRecord> {
        let lwo = self.sh_frame.to_local(wo);
        let mut rec = self.bsdf.sample(&lwo, mode, u)?;
        rec.wi = self.sh_frame.from_local(&rec.wi).normalize();
        if !self.is_consistent(&rec.wi, wo) {
            return None;
        }
        Some(rec)
    }

    pub fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        if !self.is_consistent(wi, wo) {
            return 0.0;
        }
        let lwi = self.sh_frame.to_local(wi);
        let lwo = self.sh_frame.to_local(wo);
        self.bsdf.pdf(&lwi, &lwo)
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.bsdf.albedo()
    }

    pub fn is_delta(&self) -> bool {
        self.bsdf.is_delta()
    }
}
