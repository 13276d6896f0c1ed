//! Exact re-ranking of a candidate set.

use crate::error::Result;
use crate::vector::core::distance::L2Distance;
use crate::vector::core::hit::{Hit, TopK};
use crate::vector::core::vector::DocVectorAccess;
use crate::vector::search::top_k::TopKHeap;

/// Compute exact distances for `doc_ids` and keep the `k` closest.
///
/// Callers pass ids in ascending order so that boundary ties resolve the same
/// way no matter how the candidates were gathered. `query` must already have
/// been checked against the metric's dimensionality.
pub fn exact_top_k<S, I>(
    metric: &L2Distance,
    store: &S,
    query: &[f32],
    doc_ids: I,
    k: usize,
) -> Result<TopK>
where
    S: DocVectorAccess + ?Sized,
    I: IntoIterator<Item = u32>,
{
    let mut heap = TopKHeap::new(k)?;
    let mut scratch = metric.scratch();

    for doc_id in doc_ids {
        let distance = metric.distance_unchecked(query, store.get(doc_id), &mut scratch);
        heap.maybe_use(Hit::new(doc_id, distance));
    }

    Ok(heap.best_hits())
}
