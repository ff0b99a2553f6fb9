// Copyright @yucwang 2026

pub mod box_filter;
pub mod gaussian;

use std::sync::Arc;

use crate::core::config::FilterSettings;
use crate::core::error::ConstructionError;
use crate::core::filter::FilmFilter;

pub fn create_filter(settings: &FilterSettings) -> Result<Arc<dyn FilmFilter>, ConstructionError> {
    Ok(match *settings {
        FilterSettings::Box { radius } => Arc::new(box_filter::BoxFilter::new(radius)?),
        FilterSettings::Gaussian { radius, alpha } => Arc::new(gaussian::GaussianFilter::new(radius, alpha)?),
    })
}
