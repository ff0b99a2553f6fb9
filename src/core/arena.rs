// Copyright @yucwang 2026

use bumpalo::Bump;

/// Bytes a worker may hold in its scratch arena before it is reset.
pub const ARENA_RELEASE_THRESHOLD: usize = 16 * 1024 * 1024;

/// Per-worker bump allocator for shading objects.
///
/// Objects are never freed one by one; the whole arena is reset between
/// pixel samples once it grows past a threshold. `Drop` is not run for
/// allocated values, so only plain-data shading objects are placed here.
pub struct ScratchArena {
    bump: Bump,
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchArena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    pub fn alloc<T>(&self, value: T) -> &mut T {
        self.bump.alloc(value)
    }

    pub fn alloc_slice_copy<T: Copy>(&self, values: &[T]) -> &mut [T] {
        self.bump.alloc_slice_copy(values)
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    pub fn release(&mut self) {
        self.bump.reset();
    }

    /// Resets the arena if it holds more than `threshold` bytes. Returns whether it did.
    pub fn release_if_exceeds(&mut self, threshold: usize) -> bool {
        if self.bump.allocated_bytes() > threshold {
            self.bump.reset();
            true
        } else {
            false
        }
    }
}
