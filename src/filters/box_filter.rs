// Copyright @yucwang 2026

use crate::core::error::ConstructionError;
use crate::core::filter::FilmFilter;
use crate::math::constants::Float;

pub struct BoxFilter {
    radius: Float,
}

impl BoxFilter {
    pub fn new(radius: Float) -> Result<Self, ConstructionError> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(ConstructionError::parameter("radius", format!("{} is not a positive radius", radius)));
        }
        Ok(Self { radius })
    }
}

impl FilmFilter for BoxFilter {
    fn radius(&self) -> Float {
        self.radius
    }

    fn eval(&self, dx: Float, dy: Float) -> Float {
        if dx.abs() <= self.radius && dy.abs() <= self.radius { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_filter_support() {
        let filter = BoxFilter::new(0.5).expect("filter");
        assert_eq!(filter.eval(0.0, 0.0), 1.0);
        assert_eq!(filter.eval(0.5, 0.49), 1.0);
        assert_eq!(filter.eval(0.51, 0.0), 0.0);
        assert!(BoxFilter::new(0.0).is_err());
    }
}
