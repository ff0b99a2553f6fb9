// Copyright @yucwang 2026

pub mod mis;
pub mod path;
