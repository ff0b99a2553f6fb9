// Copyright @yucwang 2021

pub mod arena;
pub mod bsdf;
pub mod bssrdf;
pub mod bvh;
pub mod config;
pub mod emitter;
pub mod entity;
pub mod error;
pub mod film;
pub mod filter;
pub mod integrator;
pub mod interaction;
pub mod material;
pub mod medium;
pub mod phase;
pub mod reporter;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod sensor;
pub mod shape;
pub mod texture;
pub mod volume;
