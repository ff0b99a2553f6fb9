// Copyright @yucwang 2021

pub mod core;
pub mod emitters;
pub mod filters;
pub mod integrators;
pub mod io;
pub mod materials;
pub mod math;
pub mod media;
pub mod renderers;
pub mod reporters;
pub mod samplers;
pub mod sensors;
pub mod shapes;
pub mod textures;
pub mod volumes;
