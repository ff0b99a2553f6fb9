// Copyright @yucwang 2026

pub mod console;
pub mod log_reporter;
