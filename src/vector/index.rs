//! Nearest-neighbor index implementations.
//!
//! Every index is built incrementally with `add_doc` and can be queried after
//! each insertion. The variants differ only in how they pick the candidates
//! that get re-ranked exactly:
//!
//! - `flat`: every document (the exact oracle)
//! - `forest`: leaves of a forest of random hyperplane trees
//! - `lsh`: sign-hash buckets ordered by Hamming distance

pub mod config;
pub mod factory;
pub mod flat;
pub mod forest;
pub mod lsh;
pub mod shared;

use crate::error::{HalberdError, Result};
use crate::vector::core::distance::L2Distance;
use crate::vector::core::hit::TopK;

pub use self::config::{ForestIndexConfig, IndexConfig, IndexKind, LshIndexConfig};
pub use self::factory::create_index;
pub use self::flat::FlatIndex;
pub use self::forest::ForestIndex;
pub use self::lsh::LshIndex;
pub use self::shared::SharedIndex;

/// Common interface of all nearest-neighbor indexes.
///
/// Queries take `&self` and allocate their own scratch space, so a built
/// index can be searched from several threads at once. Insertion needs
/// `&mut self`; wrap the index in a [`SharedIndex`] to interleave the two.
pub trait NearestNeighborIndex: Send + Sync {
    /// Short name of the index variant.
    fn name(&self) -> &'static str;

    /// Dimensionality of indexed vectors.
    fn dimension(&self) -> usize;

    /// Number of indexed documents.
    fn len(&self) -> usize;

    /// True when no document has been indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index a document whose vector the storage provider can return.
    ///
    /// Adding an id that is already indexed does nothing.
    fn add_doc(&mut self, doc_id: u32) -> Result<()>;

    /// The `k` nearest indexed documents to `query`, closest first.
    ///
    /// `budget` bounds how many candidates an approximate index examines
    /// before re-ranking; it must be at least `k`.
    fn top_k(&self, k: usize, query: &[f32], budget: usize) -> Result<TopK>;
}

impl<T: NearestNeighborIndex + ?Sized> NearestNeighborIndex for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn add_doc(&mut self, doc_id: u32) -> Result<()> {
        (**self).add_doc(doc_id)
    }

    fn top_k(&self, k: usize, query: &[f32], budget: usize) -> Result<TopK> {
        (**self).top_k(k, query, budget)
    }
}

/// Argument checks shared by every `top_k` implementation.
pub(crate) fn validate_query(
    metric: &L2Distance,
    k: usize,
    query: &[f32],
    budget: usize,
    available: usize,
) -> Result<()> {
    if k == 0 {
        return Err(HalberdError::invalid_argument("k must be at least 1"));
    }
    if budget == 0 {
        return Err(HalberdError::invalid_argument(
            "search budget must be at least 1",
        ));
    }
    if budget < k {
        return Err(HalberdError::invalid_argument(format!(
            "search budget {budget} is smaller than k = {k}"
        )));
    }
    if k > available {
        return Err(HalberdError::insufficient_data(k, available));
    }
    metric.check_dimension(query)
}

/// Dimension check for a vector about to be indexed.
pub(crate) fn validate_doc_vector(metric: &L2Distance, doc_id: u32, vector: &[f32]) -> Result<()> {
    metric.check_dimension(vector).map_err(|err| {
        tracing::warn!(doc_id, len = vector.len(), "rejecting document vector");
        err
    })
}

/// Constructor check for the index dimensionality.
pub(crate) fn validate_dimension(dimension: usize) -> Result<()> {
    if dimension == 0 {
        return Err(HalberdError::invalid_argument(
            "index dimensionality must be at least 1",
        ));
    }
    Ok(())
}
