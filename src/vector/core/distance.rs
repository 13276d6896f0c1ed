//! Squared Euclidean distance between document vectors.

use crate::error::{HalberdError, Result};
use crate::util::simd::{self, VectorMath};

/// Squared L2 distance for vectors of one fixed dimensionality.
///
/// The difference `a - b` is written into a caller-owned scratch buffer and
/// then dotted with itself through the configured [`VectorMath`] backend. This
/// keeps the inner loop on the accelerated dot product while matching direct
/// summation up to float rounding. The result is exactly symmetric and exactly
/// zero for identical inputs.
#[derive(Debug, Clone, Copy)]
pub struct L2Distance {
    dimension: usize,
    math: &'static dyn VectorMath,
}

impl L2Distance {
    /// Create a metric that uses the process-wide accelerated backend.
    pub fn new(dimension: usize) -> Self {
        Self::with_math(dimension, simd::accelerator())
    }

    /// Create a metric with an explicit math backend.
    pub fn with_math(dimension: usize, math: &'static dyn VectorMath) -> Self {
        Self { dimension, math }
    }

    /// The configured dimensionality.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The math backend in use.
    pub fn math(&self) -> &'static dyn VectorMath {
        self.math
    }

    /// A zeroed scratch buffer of the right length.
    pub fn scratch(&self) -> Vec<f32> {
        vec![0.0; self.dimension]
    }

    /// Fail with `DimensionMismatch` unless `values` has the configured length.
    pub fn check_dimension(&self, values: &[f32]) -> Result<()> {
        if values.len() != self.dimension {
            return Err(HalberdError::dimension_mismatch(
                self.dimension,
                values.len(),
            ));
        }
        Ok(())
    }

    /// Squared Euclidean distance between `a` and `b`.
    ///
    /// `scratch` is overwritten and not retained.
    pub fn distance(&self, a: &[f32], b: &[f32], scratch: &mut [f32]) -> Result<f64> {
        self.check_dimension(a)?;
        self.check_dimension(b)?;
        self.check_dimension(scratch)?;
        Ok(self.distance_unchecked(a, b, scratch))
    }

    /// Same as [`distance`](Self::distance) without the length checks.
    ///
    /// Used in scan loops after the query has been validated once. Stored
    /// vectors come from the storage provider, which only hands out vectors
    /// of the configured dimensionality.
    #[inline]
    pub(crate) fn distance_unchecked(&self, a: &[f32], b: &[f32], scratch: &mut [f32]) -> f64 {
        debug_assert_eq!(a.len(), self.dimension);
        debug_assert_eq!(b.len(), self.dimension);
        debug_assert_eq!(scratch.len(), self.dimension);

        for ((diff, x), y) in scratch.iter_mut().zip(a.iter()).zip(b.iter()) {
            *diff = x - y;
        }
        f64::from(self.math.dot_product(scratch, scratch))
    }

    /// Inner product through the configured backend.
    #[inline]
    pub(crate) fn dot_product(&self, a: &[f32], b: &[f32]) -> f32 {
        self.math.dot_product(a, b)
    }
}
