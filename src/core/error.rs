// Copyright @yucwang 2026

use thiserror::Error;

/// Invalid construction-time configuration. Never reaches the render loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("invalid BVH leaf size {0}, must be at least 1")]
    InvalidLeafSize(i64),
    #[error("invalid path depth: min_depth = {min_depth}, max_depth = {max_depth}")]
    InvalidDepth { min_depth: i64, max_depth: i64 },
    #[error("invalid continue probability {0}, must lie in (0, 1]")]
    InvalidContinueProbability(f64),
    #[error("invalid task grid size {0}, must be positive")]
    InvalidTaskGridSize(i64),
    #[error("invalid sample count {0}, must be positive")]
    InvalidSampleCount(i64),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("scene has no camera")]
    MissingCamera,
    #[error("film resolution {0}x{1} is empty")]
    EmptyResolution(usize, usize),
}

impl ConstructionError {
    pub fn parameter(name: &str, reason: impl Into<String>) -> Self {
        ConstructionError::InvalidParameter { name: name.to_string(), reason: reason.into() }
    }
}

/// Misuse of the asynchronous render controls.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("a render is already running")]
    AlreadyRunning,
    #[error("no render is running")]
    NotRunning,
    #[error("failed to spawn render worker: {0}")]
    Spawn(String),
}
