// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::sampler::Sampler;
use crate::math::constants::Float;

/// Uncorrelated uniform samples from the LCG stream.
#[derive(Debug, Clone)]
pub struct IndependentSampler {
    rng: LcgRng,
    spp: u32,
    current: u32,
}

impl IndependentSampler {
    pub fn new(spp: u32, seed: u64) -> Self {
        Self { rng: LcgRng::new(seed), spp: spp.max(1), current: 0 }
    }
}

impl Sampler for IndependentSampler {
    fn clone_seeded(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(IndependentSampler::new(self.spp, seed))
    }

    fn samples_per_pixel(&self) -> u32 {
        self.spp
    }

    fn start_pixel(&mut self, _x: u32, _y: u32) {
        self.current = 0;
    }

    fn next_sample(&mut self) -> bool {
        if self.current >= self.spp {
            return false;
        }
        self.current += 1;
        true
    }

    fn sample1(&mut self) -> Float {
        self.rng.next_f32()
    }
}
