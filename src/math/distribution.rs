// Copyright @yucwang 2026

use super::constants::Float;

/// Piecewise-constant distribution over `n` discrete items.
///
/// Falls back to a uniform choice when every weight is zero (or the weights
/// are not finite), so sampling stays well defined for scenes whose lights
/// report no power.
#[derive(Debug, Clone)]
pub struct DiscreteDistribution {
    pmf: Vec<Float>,
    cdf: Vec<Float>,
}

impl DiscreteDistribution {
    pub fn new(weights: &[Float]) -> Self {
        let n = weights.len();
        let total: Float = weights.iter().map(|w| w.max(0.0)).sum();
        let pmf: Vec<Float> = if total > 0.0 && total.is_finite() {
            weights.iter().map(|w| w.max(0.0) / total).collect()
        } else {
            vec![1.0 / n.max(1) as Float; n]
        };

        let mut cdf = Vec::with_capacity(n);
        let mut acc = 0.0;
        for p in &pmf {
            acc += p;
            cdf.push(acc);
        }
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }

        Self { pmf, cdf }
    }

    pub fn len(&self) -> usize {
        self.pmf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pmf.is_empty()
    }

    pub fn pmf(&self, idx: usize) -> Float {
        self.pmf.get(idx).copied().unwrap_or(0.0)
    }

    /// Returns the chosen index and its probability, or `None` when empty.
    pub fn sample(&self, u: Float) -> Option<(usize, Float)> {
        if self.cdf.is_empty() {
            return None;
        }
        let idx = self.cdf.partition_point(|c| *c <= u).min(self.cdf.len() - 1);
        Some((idx, self.pmf[idx]))
    }
}
