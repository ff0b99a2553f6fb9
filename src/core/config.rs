// Copyright @yucwang 2026

use crate::core::error::ConstructionError;
use crate::math::constants::Float;

use serde::Deserialize;

/// Tile scheduler options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Thread pool size; zero or negative means hardware concurrency.
    pub worker_count: i32,
    /// Edge length of a task grid in pixels.
    pub task_grid_size: i32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self { worker_count: 0, task_grid_size: 32 }
    }
}

impl RendererSettings {
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.task_grid_size <= 0 {
            return Err(ConstructionError::InvalidTaskGridSize(self.task_grid_size as i64));
        }
        Ok(())
    }

    pub fn resolved_worker_count(&self) -> usize {
        if self.worker_count > 0 {
            self.worker_count as usize
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathTracingSettings {
    pub min_depth: i32,
    pub max_depth: i32,
    pub cont_prob: Float,
    pub sample_all_lights: bool,
}

impl Default for PathTracingSettings {
    fn default() -> Self {
        Self { min_depth: 5, max_depth: 20, cont_prob: 0.9, sample_all_lights: true }
    }
}

impl PathTracingSettings {
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.min_depth < 1 || self.max_depth < self.min_depth {
            return Err(ConstructionError::InvalidDepth {
                min_depth: self.min_depth as i64,
                max_depth: self.max_depth as i64,
            });
        }
        if !(self.cont_prob > 0.0 && self.cont_prob <= 1.0) {
            return Err(ConstructionError::InvalidContinueProbability(self.cont_prob as f64));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BvhSettings {
    pub max_leaf_size: i32,
}

impl Default for BvhSettings {
    fn default() -> Self {
        Self { max_leaf_size: 5 }
    }
}

impl BvhSettings {
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.max_leaf_size < 1 {
            return Err(ConstructionError::InvalidLeafSize(self.max_leaf_size as i64));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    pub samples_per_pixel: i32,
    pub seed: u64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self { samples_per_pixel: 16, seed: 0 }
    }
}

impl SamplerSettings {
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.samples_per_pixel < 1 {
            return Err(ConstructionError::InvalidSampleCount(self.samples_per_pixel as i64));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterSettings {
    Box { radius: Float },
    Gaussian { radius: Float, alpha: Float },
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings::Box { radius: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilmSettings {
    pub width: usize,
    pub height: usize,
    pub filter: FilterSettings,
}

impl Default for FilmSettings {
    fn default() -> Self {
        Self { width: 640, height: 480, filter: FilterSettings::default() }
    }
}

impl FilmSettings {
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConstructionError::EmptyResolution(self.width, self.height));
        }
        Ok(())
    }
}

/// Everything a demo render needs besides the scene itself.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub renderer: RendererSettings,
    pub path_tracing: PathTracingSettings,
    pub bvh: BvhSettings,
    pub sampler: SamplerSettings,
    pub film: FilmSettings,
}

impl RenderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConstructionError> {
        let config: RenderConfig = toml::from_str(text)
            .map_err(|e| ConstructionError::parameter("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        self.renderer.validate()?;
        self.path_tracing.validate()?;
        self.bvh.validate()?;
        self.sampler.validate()?;
        self.film.validate()
    }
}
