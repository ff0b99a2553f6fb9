// Copyright @yucwang 2026

pub mod aggregate;
pub mod clearcoat;
pub mod diffuse;
pub mod glass;
pub mod invisible;
pub mod metal;
pub mod microfacet;
pub mod mirror;
pub mod plastic;
pub mod rough_glass;
pub mod scaled;
pub mod subsurface;
