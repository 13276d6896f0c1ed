//! Vector math primitives used by the distance metric.
//!
//! The hot loops of every index (brute-force scan, leaf re-ranking, hyperplane
//! tests) reduce to dot products, and the hash-bucket index additionally needs
//! population counts. Both live behind the [`VectorMath`] capability trait.
//! One backend is picked the first time [`accelerator`] is called, based on
//! the features the host CPU reports, and reused for the rest of the process.

pub mod simd_wide;

use std::fmt::Debug;
use std::sync::OnceLock;

use self::simd_wide::WideMath;

/// Dot product and population count primitives.
pub trait VectorMath: Send + Sync + Debug {
    /// Short backend name, reported by the CLI and in logs.
    fn name(&self) -> &'static str;

    /// Inner product of two equally long slices.
    ///
    /// Callers validate lengths; implementations only debug-assert them.
    fn dot_product(&self, a: &[f32], b: &[f32]) -> f32;

    /// Total number of set bits across `words`.
    fn population_count(&self, words: &[u64]) -> u64;
}

/// Scalar fallback that works on every target.
#[derive(Debug, Default, Clone, Copy)]
pub struct PortableMath;

impl VectorMath for PortableMath {
    fn name(&self) -> &'static str {
        "portable"
    }

    #[inline]
    fn dot_product(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        // Four independent accumulators so the compiler can vectorize.
        let mut sums = [0.0f32; 4];
        let chunks_a = a.chunks_exact(4);
        let chunks_b = b.chunks_exact(4);
        let tail_a = chunks_a.remainder();
        let tail_b = chunks_b.remainder();

        for (ca, cb) in chunks_a.zip(chunks_b) {
            sums[0] += ca[0] * cb[0];
            sums[1] += ca[1] * cb[1];
            sums[2] += ca[2] * cb[2];
            sums[3] += ca[3] * cb[3];
        }

        let mut sum = (sums[0] + sums[1]) + (sums[2] + sums[3]);
        for (x, y) in tail_a.iter().zip(tail_b.iter()) {
            sum += x * y;
        }
        sum
    }

    #[inline]
    fn population_count(&self, words: &[u64]) -> u64 {
        words.iter().map(|w| u64::from(w.count_ones())).sum()
    }
}

static ACCELERATOR: OnceLock<&'static dyn VectorMath> = OnceLock::new();

/// The process-wide vector math backend.
///
/// Detection runs once; later calls return the cached choice.
pub fn accelerator() -> &'static dyn VectorMath {
    *ACCELERATOR.get_or_init(|| {
        let math = detect();
        tracing::debug!(backend = math.name(), "selected vector math backend");
        math
    })
}

/// The scalar backend, for callers that want reproducible results across hosts.
pub fn portable() -> &'static dyn VectorMath {
    &PortableMath
}

fn detect() -> &'static dyn VectorMath {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if std::arch::is_x86_feature_detected!("avx2") {
            return &WideMath;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return &WideMath;
        }
    }

    &PortableMath
}
