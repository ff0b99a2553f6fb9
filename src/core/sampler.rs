// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Five uniform numbers, consumed by light sampling.
pub type Sample5 = [Float; 5];

/// Per-worker random stream.
///
/// A prototype sampler is shared read-only between workers; each worker
/// calls `clone_seeded` to get its own stream.
pub trait Sampler: Send + Sync {
    fn clone_seeded(&self, seed: u64) -> Box<dyn Sampler>;
    fn samples_per_pixel(&self) -> u32;
    fn start_pixel(&mut self, x: u32, y: u32);
    /// Advances to the next sample of the current pixel. Returns false when done.
    fn next_sample(&mut self) -> bool;

    fn sample1(&mut self) -> Float;

    fn sample2(&mut self) -> Vector2f {
        let u = self.sample1();
        let v = self.sample1();
        Vector2f::new(u, v)
    }

    fn sample3(&mut self) -> Vector3f {
        let u = self.sample1();
        let v = self.sample1();
        let w = self.sample1();
        Vector3f::new(u, v, w)
    }

    fn sample5(&mut self) -> Sample5 {
        [self.sample1(), self.sample1(), self.sample1(), self.sample1(), self.sample1()]
    }
}
