//! Eight-lane kernels built on the `wide` crate.

use wide::f32x8;

use super::{PortableMath, VectorMath};

/// Backend selected on hosts that report AVX2 or NEON.
#[derive(Debug, Default, Clone, Copy)]
pub struct WideMath;

#[inline]
fn load(chunk: &[f32]) -> f32x8 {
    let mut lanes = [0.0f32; 8];
    lanes.copy_from_slice(chunk);
    f32x8::new(lanes)
}

impl VectorMath for WideMath {
    fn name(&self) -> &'static str {
        "wide"
    }

    #[inline]
    fn dot_product(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        let chunks_a = a.chunks_exact(8);
        let chunks_b = b.chunks_exact(8);
        let tail_a = chunks_a.remainder();
        let tail_b = chunks_b.remainder();

        let mut acc = f32x8::splat(0.0);
        for (ca, cb) in chunks_a.zip(chunks_b) {
            acc += load(ca) * load(cb);
        }

        let mut sum: f32 = acc.to_array().iter().sum();
        for (x, y) in tail_a.iter().zip(tail_b.iter()) {
            sum += x * y;
        }
        sum
    }

    /// Same kernel as [`PortableMath`]; `wide` has no lane-wise popcount.
    #[inline]
    fn population_count(&self, words: &[u64]) -> u64 {
        PortableMath.population_count(words)
    }
}
