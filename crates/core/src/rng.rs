//! Seedable random source shared by every simulation decision in a level.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

#[derive(Clone, Debug)]
pub struct SimRng {
    rng: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Uniform float in `[0, 1)`.
    pub fn uniform(&mut self) -> f32 {
        // 24 random bits fill the f32 mantissa exactly.
        (self.rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    pub fn uniform_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.uniform() * (max - min)
    }

    pub fn coin_flip(&mut self) -> bool {
        self.uniform() > 0.5
    }

    /// Uniform integer in `[0, n)`, or 0 when `n` is 0.
    pub fn random_int(&mut self, n: usize) -> usize {
        ((self.uniform() * n as f32) as usize).min(n.saturating_sub(1))
    }

    pub fn random_item<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.random_int(items.len());
        items.get(index)
    }

    /// `count` distinct elements in random order; the whole slice when it is shorter.
    pub fn random_subset<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        let mut pool = items.to_vec();
        let count = count.min(pool.len());
        for i in 0..count {
            let j = i + self.random_int(pool.len() - i);
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool
    }
}
