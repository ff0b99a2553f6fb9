// Copyright @yucwang 2026

pub mod const_volume;
pub mod grid_volume;
