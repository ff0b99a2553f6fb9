// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Scrambles a seed so nearby seeds start far apart in the LCG sequence.
pub fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: splitmix64(seed) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f32(&mut self) -> Float {
        // 24 random bits keep the result strictly below one.
        ((self.next_u32() >> 8) as Float) * (1.0 / 16_777_216.0)
    }
}
