// Copyright @yucwang 2026

pub mod path_tracer;
pub mod renderer;
